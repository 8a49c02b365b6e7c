//! Error types for Heartflow

use thiserror::Error;

/// Core Heartflow errors
///
/// Missing landmarks are never reported through this type: an absent
/// detection is an expected per-frame condition, not a failure.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HeartflowError {
    // Configuration errors
    #[error("Invalid configuration: {field}: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("Invalid display size: {width}x{height}")]
    InvalidDisplaySize { width: f32, height: f32 },

    #[error("Config parse error: {0}")]
    ConfigParse(String),

    // Input errors
    #[error("Malformed landmark recording at line {line}: {reason}")]
    MalformedRecording { line: usize, reason: String },

    #[error("Video buffer size mismatch: expected {expected} bytes, got {actual}")]
    VideoBufferMismatch { expected: usize, actual: usize },

    #[error("I/O error: {0}")]
    Io(String),
}

impl HeartflowError {
    pub(crate) fn config(field: &'static str, reason: impl Into<String>) -> Self {
        HeartflowError::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

impl From<std::io::Error> for HeartflowError {
    fn from(err: std::io::Error) -> Self {
        HeartflowError::Io(err.to_string())
    }
}

/// Result type for Heartflow operations
pub type HeartflowResult<T> = Result<T, HeartflowError>;
