//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("No participants configured for the group chat")]
    EmptyRegistry,

    #[error("Participant name cannot be empty")]
    EmptyParticipantName,

    #[error("Duplicate participant: {0}")]
    DuplicateParticipant(String),

    #[error("Unknown participant: {0}")]
    UnknownParticipant(String),

    #[error("Invalid persona: {0}")]
    InvalidPersona(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl DomainError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DomainError::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancelled_error_display() {
        let error = DomainError::Cancelled;
        assert_eq!(error.to_string(), "Operation cancelled");
    }

    #[test]
    fn test_is_cancelled_check() {
        assert!(DomainError::Cancelled.is_cancelled());
        assert!(!DomainError::EmptyRegistry.is_cancelled());
        assert!(!DomainError::UnknownParticipant("Chef".to_string()).is_cancelled());
    }

    #[test]
    fn test_participant_errors_name_the_participant() {
        let error = DomainError::DuplicateParticipant("VeganReviewer".to_string());
        assert_eq!(error.to_string(), "Duplicate participant: VeganReviewer");
    }
}
