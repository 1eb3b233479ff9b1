//! Presentation-level configuration
//!
//! Options for console rendering and REPL behavior.

use std::path::PathBuf;

/// Console configuration for the presentation layer
#[derive(Debug, Clone)]
pub struct ConsoleOptions {
    /// Show a spinner while a participant is thinking
    pub show_progress: bool,
    /// Print selection and termination decisions
    pub show_decisions: bool,
    /// Path to the REPL history file
    pub history_file: Option<PathBuf>,
}

impl Default for ConsoleOptions {
    fn default() -> Self {
        Self {
            show_progress: true,
            show_decisions: true,
            history_file: dirs::data_dir().map(|p| p.join("recipe-chat").join("history.txt")),
        }
    }
}

impl ConsoleOptions {
    /// No spinner, no decision lines
    pub fn quiet(mut self) -> Self {
        self.show_progress = false;
        self.show_decisions = false;
        self
    }
}
