//! Transcript domain.
//!
//! - [`entities::ChatMessage`]: a finalized message
//! - [`entities::MessageDraft`]: a participant reply still being streamed
//! - [`Transcript`]: the ordered message log owned by one conversation

pub mod entities;
#[allow(clippy::module_inception)]
mod transcript;

pub use entities::{ChatMessage, MessageDraft, Role};
pub use transcript::Transcript;
