//! Infrastructure layer for recipe-chat
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer (LLM gateway, conversation logger), configuration and
//! persona file loading, and the assembly of a group chat from config.

pub mod config;
pub mod logging;
pub mod openai;
pub mod personas;
pub mod wiring;

// Re-export commonly used types
pub use config::{ConfigLoader, ConfigValidationError, FileConfig};
pub use logging::JsonlConversationLogger;
pub use openai::{ApiFlavor, OpenAiConfig, OpenAiGateway};
pub use personas::{PersonaLoadError, PersonaLoader};
pub use wiring::{ConfigurationError, build_gateway, build_template, load_registry};
