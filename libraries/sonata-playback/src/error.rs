//! Error types for the playback engine and its audio backend

use thiserror::Error;

/// Errors reported by an [`AudioBackend`](crate::AudioBackend) implementation
#[derive(Debug, Error)]
pub enum BackendError {
    /// The media locator is empty or cannot be opened
    #[error("Invalid audio source: {0:?}")]
    InvalidSource(String),

    /// Operation requires a prepared source
    #[error("No prepared source")]
    NotPrepared,

    /// Backend (device, decoder, network) is not usable right now
    #[error("Audio backend unavailable: {0}")]
    Unavailable(String),

    /// IO error while opening or reading the source
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Playback engine errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Audio backend error
    #[error("Audio backend error: {0}")]
    Backend(#[from] BackendError),

    /// The engine task has shut down
    #[error("Playback engine is closed")]
    EngineClosed,

    /// Configuration value out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for backend operations
pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
