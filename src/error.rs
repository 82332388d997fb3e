//! HimbaVoice Error Types
//!
//! Centralized error handling for the voice coordinator and its collaborators.

use thiserror::Error;

/// Central error type for HimbaVoice
#[derive(Error, Debug)]
pub enum VoiceError {
    #[error("Recognizer error: {0}")]
    RecognitionOther(String),

    #[error("Synthesizer error: {0}")]
    Synthesis(String),

    #[error("Unrecognized command: '{0}'")]
    UnrecognizedCommand(String),

    #[error("{collaborator} failed: {message}")]
    Collaborator {
        collaborator: &'static str,
        message: String,
    },

    #[error("Lock poisoned: {0}")]
    Lock(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl VoiceError {
    /// Shorthand for a failed side effect in an external collaborator
    pub fn collaborator(collaborator: &'static str, message: impl Into<String>) -> Self {
        VoiceError::Collaborator {
            collaborator,
            message: message.into(),
        }
    }
}

/// Result type alias for HimbaVoice operations
pub type VoiceResult<T> = Result<T, VoiceError>;

/// Helper to convert Mutex poison errors
impl<T> From<std::sync::PoisonError<T>> for VoiceError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        VoiceError::Lock(err.to_string())
    }
}
