//! Transcript entities

use serde::{Deserialize, Serialize};

/// Role of a message in the group chat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    System,
    User,
    Participant,
}

impl Role {
    /// Upper-case label used by the console renderer
    pub fn label(&self) -> &'static str {
        match self {
            Role::System => "SYSTEM",
            Role::User => "USER",
            Role::Participant => "ASSISTANT",
        }
    }
}

/// A finalized message in the transcript (Entity)
///
/// `sequence` is assigned by [`Transcript::push`](super::Transcript::push);
/// a message that has not been appended yet carries sequence 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    author: Option<String>,
    content: String,
    #[serde(default)]
    sequence: u64,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            author: None,
            content: content.into(),
            sequence: 0,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            author: None,
            content: content.into(),
            sequence: 0,
        }
    }

    pub fn participant(author: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Participant,
            author: Some(author.into()),
            content: content.into(),
            sequence: 0,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Author name; present only for participant messages
    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn is_from(&self, participant: &str) -> bool {
        self.role == Role::Participant && self.author.as_deref() == Some(participant)
    }

    pub(super) fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = sequence;
        self
    }
}

/// A participant reply still being streamed
///
/// Chunks only ever append. The draft becomes a [`ChatMessage`] through
/// [`finish`](Self::finish); a dropped draft leaves no trace.
#[derive(Debug, Clone)]
pub struct MessageDraft {
    id: String,
    author: String,
    content: String,
}

impl MessageDraft {
    pub fn new(id: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            author: author.into(),
            content: String::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn push_chunk(&mut self, chunk: &str) {
        self.content.push_str(chunk);
    }

    /// Replace the content when the provider sends the full text at the end
    /// without having streamed any deltas.
    pub fn complete_with(&mut self, full_text: &str) {
        if self.content.is_empty() {
            self.content.push_str(full_text);
        }
    }

    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }

    pub fn finish(self) -> ChatMessage {
        ChatMessage::participant(self.author, self.content)
    }
}
