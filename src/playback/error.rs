//! Error types for the playback core

use std::path::PathBuf;

use thiserror::Error;

/// Failures raised by an audio backend or one of its track handles.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The source could not be opened
    #[error("cannot open source: {0}")]
    Io(#[from] std::io::Error),

    /// The source is corrupt or uses an unsupported codec
    #[error("cannot decode source: {0}")]
    Decode(String),

    /// The handle refused to seek
    #[error("seek failed: {0}")]
    Seek(String),

    /// No usable audio output device
    #[error("audio output unavailable: {0}")]
    Output(String),
}

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// A track could not be bound to the session; the session is unchanged
    #[error("failed to load {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: BackendError,
    },

    /// The operation needs a loaded track
    #[error("No track loaded")]
    NoTrackLoaded,
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
