//! Error types for media streams

use thiserror::Error;

use crate::types::StreamId;

/// Media stream errors
#[derive(Debug, Error)]
pub enum StreamError {
    /// URL could not be turned into a backend location
    #[error("Invalid media URL: {0}")]
    InvalidUrl(String),

    /// Seek target lies beyond the declared stream size
    #[error("Seek to {position} is beyond the declared stream size {size}")]
    SeekOutOfBounds {
        /// Requested byte offset
        position: u64,
        /// Declared stream size (0 = unknown)
        size: i64,
    },

    /// No live stream is registered under this identifier
    #[error("Stream not registered: {0}")]
    NotRegistered(StreamId),

    /// IO error from the underlying byte source
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for stream operations
pub type Result<T> = std::result::Result<T, StreamError>;
