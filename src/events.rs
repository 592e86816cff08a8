//! Player notifications consumed by the segmentation controller.
//!
//! The player adapter turns whatever the player speaks into these two event
//! kinds and delivers them, in arrival order, over a single channel.

/// The playback state reported by the player.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    Stopped,
    Playing,
    Paused,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::Stopped
    }
}

impl PlaybackState {
    /// Map an MPRIS `PlaybackStatus` string. Unknown values count as stopped.
    pub fn from_mpris(status: &str) -> Self {
        match status {
            "Playing" => Self::Playing,
            "Paused" => Self::Paused,
            _ => Self::Stopped,
        }
    }
}

/// Raw metadata for the track the player is currently on.
///
/// Every field is optional because players are inconsistent about what they
/// publish; `Track::from_metadata` decides what is usable.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrackMetadata {
    pub track_id: Option<String>,
    pub title: Option<String>,
    pub artists: Vec<String>,
    pub album: Option<String>,
    pub album_artists: Vec<String>,
    pub track_number: Option<i32>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlayerEvent {
    /// Playback status changed.
    Status(PlaybackState),
    /// The player moved to (or re-announced) a track.
    Metadata(TrackMetadata),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_mpris_maps_known_statuses() {
        assert_eq!(PlaybackState::from_mpris("Playing"), PlaybackState::Playing);
        assert_eq!(PlaybackState::from_mpris("Paused"), PlaybackState::Paused);
        assert_eq!(PlaybackState::from_mpris("Stopped"), PlaybackState::Stopped);
    }

    #[test]
    fn from_mpris_treats_unknown_as_stopped() {
        assert_eq!(PlaybackState::from_mpris(""), PlaybackState::Stopped);
        assert_eq!(PlaybackState::from_mpris("playing"), PlaybackState::Stopped);
    }
}
