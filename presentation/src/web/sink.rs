//! Group chat events as hub notifications

use recipe_chat_application::GroupChatEventSink;
use recipe_chat_domain::{
    ChatMessage, CompletionReason, ConversationNotification, SelectionDecision,
    TerminationDecision,
};
use std::sync::Mutex;
use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

/// Pushes notifications to one connection's outbound channel.
///
/// Streamed assistant messages are sent once per chunk under a stable
/// `message_id`, each carrying the text accumulated so far; the final
/// notification for that id carries the complete reply.
pub struct HubEventSink {
    outbound: UnboundedSender<ConversationNotification>,
    streaming: Mutex<Option<ConversationNotification>>,
}

impl HubEventSink {
    pub fn new(outbound: UnboundedSender<ConversationNotification>) -> Self {
        Self {
            outbound,
            streaming: Mutex::new(None),
        }
    }

    /// Send a notification; a closed connection drops it
    pub fn notify(&self, notification: ConversationNotification) {
        let _ = self.outbound.send(notification);
    }

    fn fresh_id() -> String {
        Uuid::new_v4().to_string()
    }
}

impl GroupChatEventSink for HubEventSink {
    fn on_speaker_selected(&self, decision: &SelectionDecision) {
        self.notify(ConversationNotification::speaker_change(
            Self::fresh_id(),
            decision,
        ));
    }

    fn on_message_chunk(&self, message_id: &str, author: &str, chunk: &str) {
        let Ok(mut streaming) = self.streaming.lock() else {
            return;
        };
        let snapshot = match streaming.as_mut() {
            Some(current) if current.message_id == message_id => {
                current.add_text_chunk(chunk);
                current.clone()
            }
            _ => {
                let started = ConversationNotification::assistant_chunk(message_id, author, chunk);
                *streaming = Some(started.clone());
                started
            }
        };
        drop(streaming);
        self.notify(snapshot);
    }

    fn on_message(&self, message_id: &str, message: &ChatMessage) {
        if let Ok(mut streaming) = self.streaming.lock() {
            streaming.take();
        }
        self.notify(ConversationNotification::message(message_id, message));
    }

    fn on_termination_evaluated(&self, decision: &TerminationDecision) {
        self.notify(ConversationNotification::termination_update(
            Self::fresh_id(),
            decision,
        ));
    }

    fn on_conversation_complete(&self, reason: &CompletionReason) {
        self.notify(ConversationNotification::complete(Self::fresh_id(), reason));
    }
}
