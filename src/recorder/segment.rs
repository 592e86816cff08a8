use std::sync::mpsc::SyncSender;

use tracing::{debug, error, warn};

use crate::events::{PlaybackState, PlayerEvent, TrackMetadata};
use crate::track::{MusicLibrary, Retirement, Track, TrackInfo};

use super::state::StateHandle;

/// What a single event did to the pipeline.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SegmentOutcome {
    /// A status event updated the playing flag.
    Status,
    /// Recording is disabled; the metadata event was dropped.
    Disabled,
    /// The event announced the track that is already active.
    SameTrack,
    /// The metadata had no usable title; the active track was kept.
    Unusable,
    /// A new track became active. `queued` is true when the outgoing track
    /// went to the encoder, false when it was retired on the spot.
    Boundary { queued: bool },
}

/// Decides where tracks begin and end, driven by player events.
///
/// Runs on a single dispatch thread. Only this type replaces the active
/// track; the capture thread only appends to it.
pub struct Segmenter {
    state: StateHandle,
    queue: Option<SyncSender<Track>>,
    library: MusicLibrary,
}

impl Segmenter {
    pub fn new(state: StateHandle, queue: SyncSender<Track>, library: MusicLibrary) -> Self {
        Self {
            state,
            queue: Some(queue),
            library,
        }
    }

    pub fn handle(&mut self, event: PlayerEvent) -> SegmentOutcome {
        match event {
            PlayerEvent::Status(status) => self.on_status(status),
            PlayerEvent::Metadata(metadata) => self.on_metadata(&metadata),
        }
    }

    pub fn on_status(&mut self, status: PlaybackState) -> SegmentOutcome {
        debug!(?status, "playback status");
        self.state.set_playing(status == PlaybackState::Playing);
        SegmentOutcome::Status
    }

    pub fn on_metadata(&mut self, metadata: &TrackMetadata) -> SegmentOutcome {
        if !self.state.is_recording() {
            debug!("recording disabled, metadata ignored");
            return SegmentOutcome::Disabled;
        }

        if self.is_active(metadata) {
            return SegmentOutcome::SameTrack;
        }

        let next = match Track::from_metadata(metadata, &self.library) {
            Ok(track) => track,
            Err(e) => {
                warn!(error = %e, track_id = ?metadata.track_id, "no usable track in metadata");
                return SegmentOutcome::Unusable;
            }
        };

        let outgoing = self.state.swap(next);
        let queued = self.dispatch(outgoing);
        SegmentOutcome::Boundary { queued }
    }

    /// Whether `metadata` describes the active track.
    ///
    /// Ids are compared when the event carries one. Without an id the
    /// computed relative path decides. A placeholder never matches.
    fn is_active(&self, metadata: &TrackMetadata) -> bool {
        let extension = self.library.extension();
        self.state.with_active(|active| {
            let Some(info) = active.info() else {
                return false;
            };
            match (metadata.track_id.as_deref(), active.track_id()) {
                (Some(incoming), Some(current)) => incoming == current,
                (Some(_), None) => false,
                (None, _) => TrackInfo::describe(metadata, extension)
                    .map(|candidate| candidate.relative_path == info.relative_path)
                    .unwrap_or(false),
            }
        })
    }

    /// Send a finished track to the encoder, or retire it if it has nothing
    /// worth encoding. May block while the encode queue is full.
    fn dispatch(&mut self, track: Track) -> bool {
        if let Some(reason) = track.discard_reason() {
            track.retire(reason);
            return false;
        }

        let Some(queue) = &self.queue else {
            track.retire(Retirement::Abandoned);
            return false;
        };

        match queue.send(track) {
            Ok(()) => true,
            Err(rejected) => {
                error!("encode worker is gone, dropping finished track");
                rejected.0.retire(Retirement::Abandoned);
                self.queue = None;
                false
            }
        }
    }

    /// Stop segmenting: retire the active track and release the encode queue
    /// so the worker can drain and exit.
    pub fn finish(mut self) {
        let active = self.state.swap(Track::placeholder());
        active.retire(Retirement::Abandoned);
        self.queue = None;
    }
}
