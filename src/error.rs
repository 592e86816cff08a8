//! Error types for the recorder.
//!
//! `RecorderError` is what ends the process; `TrackError` and `EncodeError`
//! are logged and absorbed by the pipeline.

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Process-level failures. Any of these terminates `mrec` with a non-zero status.
#[derive(Error, Debug)]
pub enum RecorderError {
    /// The raw audio stream reached end of file.
    #[error("raw audio stream closed")]
    UpstreamClosed,

    /// Reading from the raw audio stream failed.
    #[error("failed to read raw audio: {0}")]
    Read(#[source] io::Error),

    /// Player discovery gave up.
    #[error("no MPRIS player found after {attempts} attempts")]
    NoPlayer { attempts: u32 },

    #[error("D-Bus error: {0}")]
    DBus(#[from] zbus::Error),

    #[error("failed to install signal handler: {0}")]
    Signal(#[from] ctrlc::Error),

    #[error("failed to spawn {name} thread: {source}")]
    Spawn {
        name: &'static str,
        #[source]
        source: io::Error,
    },

    /// A worker thread panicked instead of returning.
    #[error("{0} thread panicked")]
    ThreadPanicked(&'static str),
}

/// Metadata that cannot be turned into a track.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TrackError {
    #[error("metadata has no usable title")]
    MissingTitle,
}

/// Failures while encoding or backing up a finished track.
#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("failed to create directory {path}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to start encoder `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to feed raw audio to the encoder: {0}")]
    Feed(#[source] io::Error),

    #[error("encoder exited with {status}: {stderr}")]
    Failed { status: ExitStatus, stderr: String },

    #[error("failed to copy {from} to {to}: {source}")]
    Backup {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Placeholder tracks carry no metadata and cannot be encoded.
    #[error("track has no metadata")]
    NoMetadata,
}
