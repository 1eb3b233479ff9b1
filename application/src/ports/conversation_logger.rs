//! Port for structured conversation logging.
//!
//! Defines the [`ConversationLogger`] trait for recording group chat events
//! (user messages, speaker selections, replies, termination decisions) to a
//! structured log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures the full
//! conversation transcript in a machine-readable format (JSONL).

use recipe_chat_domain::{ChatMessage, CompletionReason, SelectionDecision, TerminationDecision};
use serde_json::{Value, json};

/// A structured conversation event for logging.
///
/// Each event has a type string and a JSON payload containing
/// event-specific fields. Timestamps are added by the logger.
pub struct ConversationEvent {
    /// Event type identifier (e.g., "user_message", "speaker_selected").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl ConversationEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }

    pub fn user_message(conversation_id: &str, message: &ChatMessage) -> Self {
        Self::new(
            "user_message",
            json!({
                "conversation_id": conversation_id,
                "sequence": message.sequence(),
                "content": message.content(),
            }),
        )
    }

    pub fn speaker_selected(conversation_id: &str, decision: &SelectionDecision) -> Self {
        Self::new(
            "speaker_selected",
            json!({
                "conversation_id": conversation_id,
                "speaker": decision.next_speaker,
                "reason": decision.reason,
            }),
        )
    }

    pub fn participant_message(
        conversation_id: &str,
        message_id: &str,
        message: &ChatMessage,
    ) -> Self {
        Self::new(
            "participant_message",
            json!({
                "conversation_id": conversation_id,
                "message_id": message_id,
                "sequence": message.sequence(),
                "author": message.author(),
                "content": message.content(),
            }),
        )
    }

    pub fn termination_evaluated(
        conversation_id: &str,
        iteration: usize,
        decision: &TerminationDecision,
    ) -> Self {
        Self::new(
            "termination_evaluated",
            json!({
                "conversation_id": conversation_id,
                "iteration": iteration,
                "should_terminate": decision.should_terminate,
                "reason": decision.reason,
            }),
        )
    }

    pub fn conversation_complete(conversation_id: &str, reason: &CompletionReason) -> Self {
        Self::new(
            "conversation_complete",
            json!({
                "conversation_id": conversation_id,
                "reason": reason,
            }),
        )
    }
}

/// Port for logging conversation events to a structured log.
///
/// The `log` method is synchronous and non-fallible: logging failures must
/// not interrupt a turn cycle.
pub trait ConversationLogger: Send + Sync {
    /// Record a conversation event.
    fn log(&self, event: ConversationEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_participant_message_payload() {
        let event = ConversationEvent::participant_message(
            "conv-1",
            "msg-1",
            &ChatMessage::participant("VeganReviewer", "APPROVED"),
        );
        assert_eq!(event.event_type, "participant_message");
        assert_eq!(event.payload["author"], "VeganReviewer");
        assert_eq!(event.payload["content"], "APPROVED");
    }

    #[test]
    fn test_completion_payload_embeds_reason() {
        let event = ConversationEvent::conversation_complete(
            "conv-1",
            &CompletionReason::MaximumIterations { limit: 10 },
        );
        assert_eq!(event.payload["reason"]["kind"], "maximum_iterations");
        assert_eq!(event.payload["reason"]["limit"], 10);
    }
}
