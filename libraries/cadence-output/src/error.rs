//! Error types for the audio output

use cadence_stream::StreamError;
use thiserror::Error;

/// Result type for output operations
pub type Result<T> = std::result::Result<T, OutputError>;

/// Audio output errors
#[derive(Debug, Error)]
pub enum OutputError {
    /// Native library instance or player could not be created
    #[error("Backend initialization failed: {0}")]
    BackendInit(String),

    /// The backend is not initialized (degraded output)
    #[error("Backend unavailable")]
    BackendUnavailable,

    /// Native library reported a failure
    #[error("Backend error: {0}")]
    Backend(String),

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Stream could not be bound
    #[error("Stream error: {0}")]
    Stream(#[from] StreamError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for OutputError {
    fn from(err: config::ConfigError) -> Self {
        OutputError::Config(err.to_string())
    }
}
