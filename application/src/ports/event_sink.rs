//! Group chat event sink port
//!
//! Defines the interface through which the orchestrator reports what
//! happens in a turn cycle.

use recipe_chat_domain::{
    ChatMessage, CompletionReason, SelectionDecision, TerminationDecision,
};

/// Receiver of group chat events
///
/// Implementations live in the presentation layer (console renderer, web
/// hub). Callbacks run inline on the orchestrator task, so they must not
/// block: hand work off to a channel instead of awaiting I/O.
///
/// Call order within one turn is fixed: `on_speaker_selected`, zero or more
/// `on_message_chunk`, `on_message`, then `on_termination_evaluated` when
/// the speaker is eligible, and `on_conversation_complete` once per cycle.
pub trait GroupChatEventSink: Send + Sync {
    /// A participant was selected to speak next
    fn on_speaker_selected(&self, decision: &SelectionDecision);

    /// A streamed chunk of a reply that is not final yet
    fn on_message_chunk(&self, _message_id: &str, _author: &str, _chunk: &str) {}

    /// A message was appended to the transcript
    fn on_message(&self, message_id: &str, message: &ChatMessage);

    /// The termination policy produced a decision
    fn on_termination_evaluated(&self, decision: &TerminationDecision);

    /// The turn cycle finished
    fn on_conversation_complete(&self, reason: &CompletionReason);
}

/// No-op sink for when nobody is watching
pub struct NoEvents;

impl GroupChatEventSink for NoEvents {
    fn on_speaker_selected(&self, _decision: &SelectionDecision) {}
    fn on_message(&self, _message_id: &str, _message: &ChatMessage) {}
    fn on_termination_evaluated(&self, _decision: &TerminationDecision) {}
    fn on_conversation_complete(&self, _reason: &CompletionReason) {}
}

/// Forwards every event to each inner sink in order
pub struct CompositeEventSink<'a> {
    sinks: Vec<&'a dyn GroupChatEventSink>,
}

impl<'a> CompositeEventSink<'a> {
    pub fn new(sinks: Vec<&'a dyn GroupChatEventSink>) -> Self {
        Self { sinks }
    }
}

impl GroupChatEventSink for CompositeEventSink<'_> {
    fn on_speaker_selected(&self, decision: &SelectionDecision) {
        for sink in &self.sinks {
            sink.on_speaker_selected(decision);
        }
    }

    fn on_message_chunk(&self, message_id: &str, author: &str, chunk: &str) {
        for sink in &self.sinks {
            sink.on_message_chunk(message_id, author, chunk);
        }
    }

    fn on_message(&self, message_id: &str, message: &ChatMessage) {
        for sink in &self.sinks {
            sink.on_message(message_id, message);
        }
    }

    fn on_termination_evaluated(&self, decision: &TerminationDecision) {
        for sink in &self.sinks {
            sink.on_termination_evaluated(decision);
        }
    }

    fn on_conversation_complete(&self, reason: &CompletionReason) {
        for sink in &self.sinks {
            sink.on_conversation_complete(reason);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Counting {
        events: Mutex<Vec<&'static str>>,
    }

    impl GroupChatEventSink for Counting {
        fn on_speaker_selected(&self, _decision: &SelectionDecision) {
            self.events.lock().unwrap().push("speaker");
        }
        fn on_message_chunk(&self, _id: &str, _author: &str, _chunk: &str) {
            self.events.lock().unwrap().push("chunk");
        }
        fn on_message(&self, _id: &str, _message: &ChatMessage) {
            self.events.lock().unwrap().push("message");
        }
        fn on_termination_evaluated(&self, _decision: &TerminationDecision) {
            self.events.lock().unwrap().push("termination");
        }
        fn on_conversation_complete(&self, _reason: &CompletionReason) {
            self.events.lock().unwrap().push("complete");
        }
    }

    #[test]
    fn test_composite_forwards_to_all_sinks() {
        let a = Counting::default();
        let b = Counting::default();
        let composite = CompositeEventSink::new(vec![&a, &b, &NoEvents]);

        composite.on_speaker_selected(&SelectionDecision::new("Chef", "first"));
        composite.on_message_chunk("m", "Chef", "x");
        composite.on_message("m", &ChatMessage::participant("Chef", "x"));
        composite.on_termination_evaluated(&TerminationDecision::proceed("no"));
        composite.on_conversation_complete(&CompletionReason::MaximumIterations { limit: 1 });

        let expected = vec!["speaker", "chunk", "message", "termination", "complete"];
        assert_eq!(*a.events.lock().unwrap(), expected);
        assert_eq!(*b.events.lock().unwrap(), expected);
    }
}
