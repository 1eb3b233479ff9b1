//! Domain layer for recipe-chat
//!
//! This crate contains the core entities and value objects of the group
//! chat. It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Participants
//!
//! A [`ParticipantRegistry`] holds the fixed cast of the conversation: one
//! builder and any number of reviewers, each bound to a [`Persona`].
//!
//! ## Transcript
//!
//! The [`Transcript`] is the ordered log every strategy and participant
//! reads. Participant replies stream into a [`MessageDraft`] and only enter
//! the transcript once finalized.
//!
//! ## Decisions
//!
//! Each turn yields a [`SelectionDecision`] and, for eligible speakers, a
//! [`TerminationDecision`]. Their JSON wire shapes are parsed in
//! [`decision::parsing`].

pub mod core;
pub mod decision;
pub mod notification;
pub mod participant;
pub mod prompt;
pub mod session;
pub mod transcript;

// Re-export commonly used types
pub use core::{error::DomainError, string::preview, string::truncate};
pub use decision::{
    CompletionReason, DecisionParseError, SelectionDecision, SelectionResponse,
    TerminationDecision, TerminationResponse, parse_selection_response,
    parse_termination_response,
};
pub use notification::{ConversationNotification, NotificationType};
pub use participant::{Participant, ParticipantRegistry};
pub use prompt::{ExecutionSettings, Persona, PromptTemplate};
pub use session::StreamEvent;
pub use transcript::{ChatMessage, MessageDraft, Role, Transcript};
