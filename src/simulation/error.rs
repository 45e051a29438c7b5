//! Stage error taxonomy
//!
//! This module contains the error taxonomy of the stage engine. Every error is
//! recovered locally: speech and microphone failures degrade the stage to
//! text-only mode, rejected state machine moves leave state untouched.

use crate::types::StagePhase;
use thiserror::Error;

/// Errors that can occur while running a stage
#[derive(Debug, Error)]
pub enum StageError {
    /// Speech provider credential missing or rejected; disables voice generation only
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Microphone access denied; disables voice recording only
    #[error("Permission error: {0}")]
    PermissionError(String),

    /// Speech provider unreachable or returned a non-success status
    #[error("Network error: {0}")]
    NetworkError(String),

    /// A state machine move that violates the stage lifecycle
    #[error("Invalid transition from {phase}: {reason}")]
    InvalidTransition {
        /// Phase the stage was in when the move was attempted
        phase: StagePhase,
        /// What was attempted
        reason: String,
    },

    /// User supplied content that cannot be accepted
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Local store could not be read or written
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Local file access failed
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Persisted JSON could not be encoded or decoded
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl StageError {
    /// Create a configuration error
    pub fn configuration_error(msg: impl Into<String>) -> Self {
        Self::ConfigurationError(msg.into())
    }

    /// Create a permission error
    pub fn permission_error(msg: impl Into<String>) -> Self {
        Self::PermissionError(msg.into())
    }

    /// Create a network error
    pub fn network_error(msg: impl Into<String>) -> Self {
        Self::NetworkError(msg.into())
    }

    /// Create an invalid transition error
    pub fn invalid_transition(phase: StagePhase, reason: impl Into<String>) -> Self {
        Self::InvalidTransition { phase, reason: reason.into() }
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a storage error
    pub fn storage_error(msg: impl Into<String>) -> Self {
        Self::StorageError(msg.into())
    }

    /// Whether the error only disables speech features rather than the stage
    pub fn degrades_to_text_only(&self) -> bool {
        matches!(
            self,
            Self::ConfigurationError(_) | Self::PermissionError(_) | Self::NetworkError(_)
        )
    }

    /// Short label used in user-facing notifications
    pub fn category(&self) -> &'static str {
        match self {
            Self::ConfigurationError(_) => "Configuration",
            Self::PermissionError(_) => "Permission",
            Self::NetworkError(_) => "Network",
            Self::InvalidTransition { .. } => "Invalid Transition",
            Self::InvalidInput(_) => "Invalid Input",
            Self::StorageError(_) | Self::IoError(_) | Self::SerializationError(_) => "Storage",
        }
    }
}

/// Result type for stage operations
pub type StageResult<T> = Result<T, StageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_phase() {
        let err = StageError::configuration_error("missing key");
        assert_eq!(err.to_string(), "Configuration error: missing key");

        let err = StageError::invalid_transition(StagePhase::UserSpeaking, "join queue");
        assert_eq!(err.to_string(), "Invalid transition from User Speaking: join queue");
    }

    #[test]
    fn test_store_failures_share_a_category() {
        let io: StageError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(io, StageError::IoError(_)));
        assert_eq!(io.category(), "Storage");
        assert_eq!(StageError::storage_error("x").category(), "Storage");
        assert!(!io.degrades_to_text_only());
    }

    #[test]
    fn test_speech_errors_degrade_to_text_only() {
        for err in [
            StageError::network_error("503"),
            StageError::permission_error("denied"),
            StageError::configuration_error("no key"),
        ] {
            assert!(err.degrades_to_text_only(), "{} should only disable speech", err);
        }
        assert!(!StageError::invalid_input("empty").degrades_to_text_only());
        assert!(!StageError::invalid_transition(StagePhase::Idle, "x").degrades_to_text_only());
    }
}
