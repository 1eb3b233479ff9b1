//! Prompt domain
//!
//! Personas (the behaviour bound to each participant) and the templates
//! rendered for participants and for the selection/termination strategies.

pub mod persona;
mod template;

pub use persona::{ExecutionSettings, Persona};
pub use template::{AGENTS_VARIABLE, HISTORY_VARIABLE, PromptTemplate};
