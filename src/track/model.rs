use std::path::PathBuf;

use tracing::{info, warn};

use crate::error::TrackError;
use crate::events::TrackMetadata;

use super::library::MusicLibrary;
use super::naming::{
    UNKNOWN_ALBUM, UNKNOWN_ARTIST, directory_component, file_name, join_names, relative_path,
    sanitize_component,
};

/// Descriptive fields of a track, already sanitized for use in paths.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackInfo {
    pub track_id: Option<String>,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub album_artist: String,
    pub track_number: i32,
    /// `<albumArtist>/<album>/<NN> <title> - <artist>.<ext>`
    pub relative_path: PathBuf,
}

impl TrackInfo {
    /// Build the descriptive fields and relative path for `metadata`.
    ///
    /// Touches no file system state.
    pub fn describe(metadata: &TrackMetadata, extension: &str) -> Result<Self, TrackError> {
        let title = metadata
            .title
            .as_deref()
            .map(sanitize_component)
            .filter(|t| !t.trim().is_empty())
            .ok_or(TrackError::MissingTitle)?;

        let joined_artist = join_names(&metadata.artists);
        let artist = directory_component(Some(&joined_artist), UNKNOWN_ARTIST);

        let joined_album_artist = join_names(&metadata.album_artists);
        let album_artist = if joined_album_artist.trim().is_empty() {
            artist.clone()
        } else {
            directory_component(Some(&joined_album_artist), UNKNOWN_ARTIST)
        };

        let album = directory_component(metadata.album.as_deref(), UNKNOWN_ALBUM);
        let track_number = metadata.track_number.unwrap_or(0);

        let name = file_name(track_number, &title, &artist, extension);
        let relative_path = relative_path(&album_artist, &album, &name);

        Ok(Self {
            track_id: metadata.track_id.clone(),
            title,
            artist,
            album,
            album_artist,
            track_number,
            relative_path,
        })
    }
}

/// How a track left the pipeline. Passed to [`Track::retire`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Retirement {
    /// Encoded (and backed up, when configured).
    Encoded,
    /// The encoder or backup step failed.
    EncodeFailed,
    /// The destination existed when the track started.
    AlreadyExists,
    /// Startup placeholder with no metadata.
    Placeholder,
    /// Nothing was captured.
    Empty,
    /// Dropped because the pipeline is shutting down.
    Abandoned,
}

/// One segment of captured audio plus the metadata to name and tag it.
#[derive(Debug)]
pub struct Track {
    data: Vec<u8>,
    info: Option<TrackInfo>,
    already_exists: bool,
}

impl Track {
    /// The startup track: no metadata, never encoded.
    pub fn placeholder() -> Self {
        Self {
            data: Vec::new(),
            info: None,
            already_exists: false,
        }
    }

    /// Create a track for `metadata`, checking once whether it is already in
    /// `library`. The result of that check is fixed for the track's lifetime.
    pub fn from_metadata(metadata: &TrackMetadata, library: &MusicLibrary) -> Result<Self, TrackError> {
        let info = TrackInfo::describe(metadata, library.extension())?;
        let already_exists = library.contains(&info.relative_path);

        if already_exists {
            info!(title = %info.title, path = %info.relative_path.display(), "track already exists");
        } else {
            info!(title = %info.title, path = %info.relative_path.display(), "recording track");
        }

        Ok(Self {
            data: Vec::new(),
            info: Some(info),
            already_exists,
        })
    }

    pub fn info(&self) -> Option<&TrackInfo> {
        self.info.as_ref()
    }

    pub fn track_id(&self) -> Option<&str> {
        self.info.as_ref().and_then(|i| i.track_id.as_deref())
    }

    pub fn is_placeholder(&self) -> bool {
        self.info.is_none()
    }

    pub fn already_exists(&self) -> bool {
        self.already_exists
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn append(&mut self, chunk: &[u8]) {
        self.data.extend_from_slice(chunk);
    }

    /// Why the track would be dropped instead of encoded, if it would be.
    /// `None` means it goes to the encoder once it stops being active.
    pub fn discard_reason(&self) -> Option<Retirement> {
        if self.is_placeholder() {
            Some(Retirement::Placeholder)
        } else if self.already_exists() {
            Some(Retirement::AlreadyExists)
        } else if self.is_empty() {
            Some(Retirement::Empty)
        } else {
            None
        }
    }

    /// Release the track and its audio, logging whether it was recorded.
    ///
    /// Called exactly once per track, wherever it leaves the pipeline.
    pub fn retire(self, how: Retirement) {
        let bytes = self.data.len();
        let Some(info) = self.info else {
            info!(bytes, "placeholder track released, not recorded");
            return;
        };

        match how {
            Retirement::Encoded => {
                info!(title = %info.title, bytes, "track data released, recorded");
            }
            Retirement::EncodeFailed => {
                warn!(title = %info.title, bytes, "track data released, not recorded (encode failed)");
            }
            other => {
                info!(title = %info.title, bytes, reason = ?other, "track data released, not recorded");
            }
        }
    }
}
