//! Console output formatter for group chat events

use colored::Colorize;
use recipe_chat_domain::{
    ChatMessage, CompletionReason, Role, SelectionDecision, TerminationDecision,
};

/// Formats group chat events for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// `ROLE [author]:` colored by role
    pub fn message_header(role: Role, author: Option<&str>) -> String {
        let label = match author {
            Some(author) => format!("{} [{}]:", role.label(), author),
            None => format!("{}:", role.label()),
        };
        match role {
            Role::User => label.green().bold().to_string(),
            Role::Participant => label.cyan().bold().to_string(),
            Role::System => label.dimmed().to_string(),
        }
    }

    /// A full message line: `ROLE [author]: text`
    pub fn message(message: &ChatMessage) -> String {
        format!(
            "{} {}",
            Self::message_header(message.role(), message.author()),
            message.content()
        )
    }

    pub fn speaker_selected(decision: &SelectionDecision) -> String {
        format!(
            "{} {} {}",
            "->".cyan(),
            decision.next_speaker.bold(),
            format!("({})", decision.reason).dimmed()
        )
    }

    pub fn termination(decision: &TerminationDecision) -> String {
        let verdict = if decision.should_terminate {
            "done".green().bold()
        } else {
            "continue".yellow()
        };
        format!("   [{}] {}", verdict, decision.reason.dimmed())
    }

    pub fn completion(reason: &CompletionReason) -> String {
        if reason.is_forced() {
            format!("{} {}", "Stopped:".yellow().bold(), reason.describe())
        } else {
            format!("{} {}", "Complete:".green().bold(), reason.describe())
        }
    }

    pub fn error(error: &dyn std::fmt::Display) -> String {
        format!("{} {}", "Error:".red().bold(), error)
    }
}
