//! Conversation transcript

use super::entities::{ChatMessage, Role};

/// Ordered message history of a single conversation (Aggregate)
///
/// Grows monotonically. Sequence numbers start at 1 and increase by one
/// per appended message, so they are strictly increasing in insertion order.
#[derive(Debug, Clone)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
    next_sequence: u64,
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

impl Transcript {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            next_sequence: 1,
        }
    }

    /// Append a message, stamping its sequence number. Returns the stored copy.
    pub fn push(&mut self, message: ChatMessage) -> &ChatMessage {
        let message = message.with_sequence(self.next_sequence);
        self.next_sequence += 1;
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// The last `k` messages (all of them when fewer exist)
    pub fn window(&self, k: usize) -> &[ChatMessage] {
        let start = self.messages.len().saturating_sub(k);
        &self.messages[start..]
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// Most recent participant message
    pub fn last_participant_message(&self) -> Option<&ChatMessage> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role() == Role::Participant)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Drop all messages and restart numbering (new conversation)
    pub fn clear(&mut self) {
        self.messages.clear();
        self.next_sequence = 1;
    }
}
