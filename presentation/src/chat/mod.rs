//! Interactive chat module
//!
//! Provides a reedline-based console interface for the group chat.

mod repl;

pub use repl::{ChatRepl, LineAction};
