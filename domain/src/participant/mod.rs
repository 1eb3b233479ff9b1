//! Participant domain.
//!
//! - [`entities::Participant`]: a named conversation member bound to a persona
//! - [`registry::ParticipantRegistry`]: the fixed, ordered set of participants

pub mod entities;
pub mod registry;

pub use entities::Participant;
pub use registry::ParticipantRegistry;
