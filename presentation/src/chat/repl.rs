//! REPL (Read-Eval-Print Loop) for the console group chat

use crate::config::ConsoleOptions;
use crate::progress::reporter::ConsoleReporter;
use reedline::{DefaultPrompt, DefaultPromptSegment, FileBackedHistory, Reedline, Signal};
use recipe_chat_application::{GroupChat, GroupChatError, GroupChatTemplate, TurnCycleOutcome};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

const HISTORY_CAPACITY: usize = 1000;

/// What to do with one line of input
#[derive(Debug, PartialEq, Eq)]
pub enum LineAction<'a> {
    Exit,
    Skip,
    Send(&'a str),
}

impl<'a> LineAction<'a> {
    pub fn parse(line: &'a str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            LineAction::Skip
        } else if line.eq_ignore_ascii_case("exit") {
            LineAction::Exit
        } else {
            LineAction::Send(line)
        }
    }
}

/// Interactive console chat
pub struct ChatRepl {
    chat: GroupChat,
    reporter: ConsoleReporter,
    options: ConsoleOptions,
}

impl ChatRepl {
    pub fn new(template: Arc<GroupChatTemplate>, options: ConsoleOptions) -> Self {
        Self {
            chat: GroupChat::new(template),
            reporter: ConsoleReporter::new(options.clone()),
            options,
        }
    }

    /// Replace the console reporter
    pub fn with_reporter(mut self, reporter: ConsoleReporter) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn chat(&self) -> &GroupChat {
        &self.chat
    }

    /// Run the interactive REPL
    pub async fn run(&mut self) -> std::io::Result<()> {
        let mut editor = Reedline::create();

        if let Some(path) = &self.options.history_file {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            match FileBackedHistory::with_file(HISTORY_CAPACITY, path.clone()) {
                Ok(history) => editor = editor.with_history(Box::new(history)),
                Err(e) => warn!("REPL history unavailable at {}: {}", path.display(), e),
            }
        }

        let prompt = DefaultPrompt::new(
            DefaultPromptSegment::Basic("you".to_string()),
            DefaultPromptSegment::Empty,
        );

        self.print_welcome();

        loop {
            match editor.read_line(&prompt)? {
                Signal::Success(line) => match LineAction::parse(&line) {
                    LineAction::Skip => continue,
                    LineAction::Exit => {
                        println!("Bye!");
                        break;
                    }
                    LineAction::Send(text) => {
                        println!();
                        if let Err(e) = self.send(text).await {
                            self.report(&e);
                        }
                        println!();
                    }
                },
                Signal::CtrlC => {
                    println!("^C");
                    continue;
                }
                Signal::CtrlD => {
                    println!("Bye!");
                    break;
                }
            }
        }

        Ok(())
    }

    /// Run each message as one turn cycle, stopping at the first failure
    pub async fn run_script<I, S>(&mut self, messages: I) -> Result<(), GroupChatError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for text in messages {
            let text = text.as_ref().trim();
            if text.is_empty() {
                continue;
            }
            let message = self.chat.append_user_message(text).clone();
            self.reporter.print_user_message(&message);
            if let Err(e) = self.run_cycle().await {
                self.report(&e);
                return Err(e);
            }
        }
        Ok(())
    }

    /// Append a user message and run one turn cycle.
    ///
    /// Ctrl-C while the cycle runs cancels it.
    pub async fn send(&mut self, text: &str) -> Result<TurnCycleOutcome, GroupChatError> {
        self.chat.append_user_message(text);
        self.run_cycle().await
    }

    async fn run_cycle(&mut self) -> Result<TurnCycleOutcome, GroupChatError> {
        let cancellation = CancellationToken::new();
        let watcher = {
            let token = cancellation.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    token.cancel();
                }
            })
        };

        let result = self.chat.run_turn_cycle(&self.reporter, &cancellation).await;
        watcher.abort();

        if let Ok(outcome) = &result {
            info!(
                "Turn cycle finished after {} turns: {}",
                outcome.messages.len(),
                outcome.completion.describe()
            );
        }
        result
    }

    fn report(&self, error: &GroupChatError) {
        if error.is_cancelled() {
            self.reporter.print_error(&"cancelled, no reply was kept");
        } else {
            self.reporter.print_error(error);
        }
    }

    fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│            Recipe Chat - Console            │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        println!(
            "Participants: {}",
            self.chat.template().registry().names().join(", ")
        );
        println!();
        println!("Type a request to start cooking. Ctrl-C stops a running reply.");
        println!("Type exit (or Ctrl-D) to quit.");
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use recipe_chat_application::{
        ApprovalTerminationPolicy, ChatRequest, GatewayError, LlmGateway, SelectionSettings,
        SelectionStrategy, SequentialSelectionPolicy, StreamHandle, TerminationSettings,
        TerminationStrategy,
    };
    use recipe_chat_domain::{ParticipantRegistry, Persona, Role};
    use std::io::Write;
    use std::sync::Mutex;

    /// Builder proposes, reviewer approves
    struct KitchenGateway;

    #[async_trait]
    impl LlmGateway for KitchenGateway {
        async fn stream_chat(&self, request: ChatRequest) -> Result<StreamHandle, GatewayError> {
            if request.system_prompt.starts_with("Review") {
                Ok(StreamHandle::from_text("I APPROVE this dish"))
            } else {
                Ok(StreamHandle::from_text("Chickpea curry"))
            }
        }
    }

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn repl(automatic_reset: bool) -> (ChatRepl, SharedBuffer) {
        let registry = ParticipantRegistry::from_personas(vec![
            Persona::new("Builder", "Build a recipe"),
            Persona::new("Reviewer", "Review the recipe"),
        ])
        .unwrap();
        let template = GroupChatTemplate::new(
            Arc::new(registry),
            Arc::new(KitchenGateway),
            SelectionStrategy::new(
                Arc::new(SequentialSelectionPolicy),
                SelectionSettings::default()
                    .with_initial_participant("Builder")
                    .with_fallback(true),
            ),
            TerminationStrategy::new(
                Arc::new(ApprovalTerminationPolicy),
                TerminationSettings::default()
                    .with_eligible_participants(["Reviewer"])
                    .with_automatic_reset(automatic_reset),
            ),
        )
        .unwrap();

        let options = ConsoleOptions::default().quiet();
        let buffer = SharedBuffer::default();
        let reporter = ConsoleReporter::with_writer(options.clone(), Box::new(buffer.clone()));
        (
            ChatRepl::new(Arc::new(template), options).with_reporter(reporter),
            buffer,
        )
    }

    #[test]
    fn test_line_actions() {
        assert_eq!(LineAction::parse("   "), LineAction::Skip);
        assert_eq!(LineAction::parse("EXIT"), LineAction::Exit);
        assert_eq!(LineAction::parse(" Exit "), LineAction::Exit);
        assert_eq!(
            LineAction::parse(" make soup "),
            LineAction::Send("make soup")
        );
        assert_eq!(LineAction::parse("exit now"), LineAction::Send("exit now"));
    }

    #[tokio::test]
    async fn test_send_runs_one_turn_cycle() {
        let (mut repl, buffer) = repl(true);

        let outcome = repl.send("Something with chickpeas").await.unwrap();

        assert_eq!(outcome.messages.len(), 2);
        assert!(!outcome.completion.is_forced());
        let roles: Vec<Role> = repl
            .chat()
            .transcript()
            .messages()
            .iter()
            .map(|m| m.role())
            .collect();
        assert_eq!(roles, vec![Role::User, Role::Participant, Role::Participant]);

        let printed = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        assert!(printed.contains("ASSISTANT [Builder]:"));
        assert!(printed.contains("Chickpea curry"));
        assert!(printed.contains("Reviewer approved the recipe"));
    }

    #[tokio::test]
    async fn test_script_runs_every_message() {
        let (mut repl, buffer) = repl(true);

        repl.run_script(["Make dinner", "  ", "Now dessert"])
            .await
            .unwrap();

        let users = repl
            .chat()
            .transcript()
            .messages()
            .iter()
            .filter(|m| m.role() == Role::User)
            .count();
        assert_eq!(users, 2);
        let printed = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        assert_eq!(printed.matches("USER:").count(), 2);
        assert!(printed.contains("Make dinner"));
        assert!(printed.contains("Now dessert"));
    }

    #[tokio::test]
    async fn test_script_stops_on_completed_conversation() {
        let (mut repl, buffer) = repl(false);

        let err = repl
            .run_script(["Make dinner", "Now dessert"])
            .await
            .unwrap_err();

        assert!(matches!(err, GroupChatError::ConversationComplete));
        let printed = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        assert!(printed.contains("Error:"));
    }
}
