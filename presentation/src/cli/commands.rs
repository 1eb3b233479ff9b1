//! CLI command definitions

use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for recipe-chat
#[derive(Parser, Debug)]
#[command(name = "recipe-chat")]
#[command(author, version, about = "Recipe group chat - a builder and reviewers cook up a dish together")]
#[command(long_about = r#"
Recipe Chat runs a group chat between a RecipeBuilder and dietary reviewers
(GlutenFreeReviewer, VeganReviewer by default).

Each user message starts a turn cycle:
1. Selection: a strategy picks the next participant to speak
2. Generation: that participant streams a reply
3. Termination: a strategy decides whether the conversation is done

Configuration files are loaded from (in priority order):
1. --config <path>     Explicit config file
2. ./recipe-chat.toml  Project-level config
3. ~/.config/recipe-chat/config.toml   Global config

Azure OpenAI settings can also come from AZURE_OPENAI_ENDPOINT,
AZURE_OPENAI_DEPLOYMENT_NAME and AZURE_OPENAI_API_KEY (a .env file is read).

Example:
  recipe-chat
  recipe-chat "Please create a main dish from the ingredients" "Make it vegan"
  recipe-chat --web --bind 0.0.0.0:5000
"#)]
pub struct Cli {
    /// Messages to run as a scripted conversation (interactive when empty)
    pub messages: Vec<String>,

    /// Serve the WebSocket chat hub instead of the console
    #[arg(long)]
    pub web: bool,

    /// Address for the chat hub (overrides web.bind)
    #[arg(long, value_name = "ADDR", requires = "web")]
    pub bind: Option<String>,

    /// Directory of persona files (overrides chat.personas_dir)
    #[arg(long, value_name = "DIR")]
    pub personas: Option<PathBuf>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators and decision lines
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Write diagnostic logs to daily files in this directory
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_positional() {
        let cli = Cli::parse_from(["recipe-chat", "Make a soup", "No gluten please"]);
        assert_eq!(cli.messages, vec!["Make a soup", "No gluten please"]);
        assert!(!cli.web);
    }

    #[test]
    fn test_verbosity_counts() {
        let cli = Cli::parse_from(["recipe-chat", "-vv", "--quiet"]);
        assert_eq!(cli.verbose, 2);
        assert!(cli.quiet);
        assert!(cli.messages.is_empty());
    }

    #[test]
    fn test_bind_requires_web() {
        assert!(Cli::try_parse_from(["recipe-chat", "--bind", "0.0.0.0:1"]).is_err());
        let cli = Cli::try_parse_from(["recipe-chat", "--web", "--bind", "0.0.0.0:1"]).unwrap();
        assert_eq!(cli.bind.as_deref(), Some("0.0.0.0:1"));
    }
}
