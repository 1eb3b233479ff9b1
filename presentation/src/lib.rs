//! Presentation layer for recipe-chat
//!
//! This crate contains the CLI definition, the console REPL and its event
//! renderer, and the WebSocket chat hub.

pub mod chat;
pub mod cli;
pub mod config;
pub mod output;
pub mod progress;
pub mod web;

// Re-export commonly used types
pub use chat::{ChatRepl, LineAction};
pub use cli::commands::Cli;
pub use config::ConsoleOptions;
pub use output::console::ConsoleFormatter;
pub use progress::reporter::ConsoleReporter;
pub use web::{ClientFrame, HubEventSink};
