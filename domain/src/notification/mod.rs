//! Conversation notifications.
//!
//! The payload pushed to viewers of a conversation (console or web hub).
//! Message notifications may grow chunk by chunk before they are final.

use crate::decision::{CompletionReason, SelectionDecision, TerminationDecision};
use crate::transcript::{ChatMessage, Role};
use serde::{Deserialize, Serialize};

/// Kind of a conversation notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationType {
    UserMessage,
    AssistantMessage,
    SpeakerChange,
    AgentGroupChatTerminationUpdate,
    AgentGroupChatComplete,
    Error,
}

/// A notification about one event in a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationNotification {
    pub notification_type: NotificationType,
    pub message_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub text: String,
}

impl ConversationNotification {
    pub fn new(
        notification_type: NotificationType,
        message_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            notification_type,
            message_id: message_id.into(),
            author: None,
            text: text.into(),
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Notification for a finalized transcript message
    pub fn message(message_id: impl Into<String>, message: &ChatMessage) -> Self {
        let kind = match message.role() {
            Role::User => NotificationType::UserMessage,
            Role::Participant | Role::System => NotificationType::AssistantMessage,
        };
        let notification = Self::new(kind, message_id, message.content());
        match message.author() {
            Some(author) => notification.with_author(author),
            None => notification,
        }
    }

    /// A streaming assistant message that starts with its first chunk
    pub fn assistant_chunk(
        message_id: impl Into<String>,
        author: impl Into<String>,
        chunk: impl Into<String>,
    ) -> Self {
        Self::new(NotificationType::AssistantMessage, message_id, chunk).with_author(author)
    }

    pub fn speaker_change(message_id: impl Into<String>, decision: &SelectionDecision) -> Self {
        Self::new(
            NotificationType::SpeakerChange,
            message_id,
            decision.next_speaker.clone(),
        )
    }

    pub fn termination_update(
        message_id: impl Into<String>,
        decision: &TerminationDecision,
    ) -> Self {
        Self::new(
            NotificationType::AgentGroupChatTerminationUpdate,
            message_id,
            decision.reason.clone(),
        )
    }

    pub fn complete(message_id: impl Into<String>, reason: &CompletionReason) -> Self {
        Self::new(
            NotificationType::AgentGroupChatComplete,
            message_id,
            reason.describe(),
        )
    }

    pub fn error(message_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(NotificationType::Error, message_id, text)
    }

    /// Append a streamed chunk to the text
    pub fn add_text_chunk(&mut self, chunk: &str) {
        self.text.push_str(chunk);
    }
}
