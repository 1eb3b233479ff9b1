//! Turn decision value objects

use serde::{Deserialize, Serialize};

/// Which participant speaks next, and why
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionDecision {
    pub next_speaker: String,
    pub reason: String,
}

impl SelectionDecision {
    pub fn new(next_speaker: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            next_speaker: next_speaker.into(),
            reason: reason.into(),
        }
    }
}

/// Whether the conversation should end, and why
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminationDecision {
    pub should_terminate: bool,
    pub reason: String,
}

impl TerminationDecision {
    pub fn terminate(reason: impl Into<String>) -> Self {
        Self {
            should_terminate: true,
            reason: reason.into(),
        }
    }

    pub fn proceed(reason: impl Into<String>) -> Self {
        Self {
            should_terminate: false,
            reason: reason.into(),
        }
    }
}

/// Why a turn cycle finished
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CompletionReason {
    /// The termination policy decided the conversation is over
    Terminated { reason: String },
    /// The iteration cap was reached before the policy agreed to stop
    MaximumIterations { limit: usize },
}

impl CompletionReason {
    pub fn describe(&self) -> String {
        match self {
            CompletionReason::Terminated { reason } => reason.clone(),
            CompletionReason::MaximumIterations { limit } => {
                format!("Maximum iterations ({limit}) reached")
            }
        }
    }

    pub fn is_forced(&self) -> bool {
        matches!(self, CompletionReason::MaximumIterations { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_termination_constructors() {
        assert!(TerminationDecision::terminate("done").should_terminate);
        assert!(!TerminationDecision::proceed("keep going").should_terminate);
    }

    #[test]
    fn test_completion_reason_describe() {
        let forced = CompletionReason::MaximumIterations { limit: 2 };
        assert!(forced.is_forced());
        assert_eq!(forced.describe(), "Maximum iterations (2) reached");

        let natural = CompletionReason::Terminated {
            reason: "user satisfied".to_string(),
        };
        assert!(!natural.is_forced());
        assert_eq!(natural.describe(), "user satisfied");
    }

    #[test]
    fn test_completion_reason_serializes_with_kind() {
        let json = serde_json::to_value(CompletionReason::MaximumIterations { limit: 4 }).unwrap();
        assert_eq!(json["kind"], "maximum_iterations");
        assert_eq!(json["limit"], 4);
    }
}
