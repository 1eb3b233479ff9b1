//! Console rendering of group chat events
//!
//! Replies are printed as they stream in; a spinner fills the gap between
//! the speaker selection and the first chunk.

use crate::config::ConsoleOptions;
use crate::output::console::ConsoleFormatter;
use indicatif::{ProgressBar, ProgressStyle};
use recipe_chat_application::GroupChatEventSink;
use recipe_chat_domain::{
    ChatMessage, CompletionReason, Role, SelectionDecision, TerminationDecision,
};
use std::io::Write;
use std::sync::Mutex;
use std::time::Duration;

/// Prints group chat events to the terminal
pub struct ConsoleReporter {
    options: ConsoleOptions,
    out: Mutex<Box<dyn Write + Send>>,
    spinner: Mutex<Option<ProgressBar>>,
    /// Id of the reply currently being streamed
    streaming: Mutex<Option<String>>,
}

impl ConsoleReporter {
    pub fn new(options: ConsoleOptions) -> Self {
        Self::with_writer(options, Box::new(std::io::stdout()))
    }

    pub fn with_writer(options: ConsoleOptions, out: Box<dyn Write + Send>) -> Self {
        Self {
            options,
            out: Mutex::new(out),
            spinner: Mutex::new(None),
            streaming: Mutex::new(None),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn start_spinner(&self, speaker: &str) {
        if !self.options.show_progress {
            return;
        }
        let pb = ProgressBar::new_spinner();
        pb.set_style(Self::spinner_style());
        pb.set_prefix(speaker.to_string());
        pb.set_message("is thinking...");
        pb.enable_steady_tick(Duration::from_millis(100));
        if let Ok(mut slot) = self.spinner.lock()
            && let Some(previous) = slot.replace(pb)
        {
            previous.finish_and_clear();
        }
    }

    fn clear_spinner(&self) {
        if let Ok(mut slot) = self.spinner.lock()
            && let Some(pb) = slot.take()
        {
            pb.finish_and_clear();
        }
    }

    /// Write to the output, ignoring I/O errors
    fn write(&self, text: &str, newline: bool) {
        if let Ok(mut out) = self.out.lock() {
            let _ = if newline {
                writeln!(out, "{}", text)
            } else {
                write!(out, "{}", text)
            };
            let _ = out.flush();
        }
    }

    /// Print a user message the way participant messages are printed
    pub fn print_user_message(&self, message: &ChatMessage) {
        self.write(&ConsoleFormatter::message(message), true);
    }

    pub fn print_error(&self, error: &dyn std::fmt::Display) {
        self.clear_spinner();
        self.end_stream();
        self.write(&ConsoleFormatter::error(error), true);
    }

    /// Close an unfinished streamed line
    fn end_stream(&self) {
        let open = self.streaming.lock().ok().and_then(|mut s| s.take());
        if open.is_some() {
            self.write("", true);
        }
    }
}

impl GroupChatEventSink for ConsoleReporter {
    fn on_speaker_selected(&self, decision: &SelectionDecision) {
        if self.options.show_decisions {
            self.write(&ConsoleFormatter::speaker_selected(decision), true);
        }
        self.start_spinner(&decision.next_speaker);
    }

    fn on_message_chunk(&self, message_id: &str, author: &str, chunk: &str) {
        let first = match self.streaming.lock() {
            Ok(mut streaming) => {
                let first = streaming.as_deref() != Some(message_id);
                if first {
                    *streaming = Some(message_id.to_string());
                }
                first
            }
            Err(_) => false,
        };
        if first {
            self.clear_spinner();
            let header = ConsoleFormatter::message_header(Role::Participant, Some(author));
            self.write(&format!("{} ", header), false);
        }
        self.write(chunk, false);
    }

    fn on_message(&self, message_id: &str, message: &ChatMessage) {
        self.clear_spinner();
        let streamed = self
            .streaming
            .lock()
            .ok()
            .and_then(|mut s| s.take())
            .is_some_and(|id| id == message_id);
        if streamed {
            self.write("", true);
        } else {
            self.write(&ConsoleFormatter::message(message), true);
        }
    }

    fn on_termination_evaluated(&self, decision: &TerminationDecision) {
        if self.options.show_decisions {
            self.write(&ConsoleFormatter::termination(decision), true);
        }
    }

    fn on_conversation_complete(&self, reason: &CompletionReason) {
        self.clear_spinner();
        self.end_stream();
        self.write(&ConsoleFormatter::completion(reason), true);
    }
}
