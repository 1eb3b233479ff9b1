//! CLI entrypoint for Recipe Chat
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::Result;
use clap::Parser;
use recipe_chat_application::{ConversationLogger, NoConversationLogger};
use recipe_chat_infrastructure::{
    ConfigLoader, ConfigurationError, JsonlConversationLogger, build_gateway, build_template,
    load_registry,
};
use recipe_chat_presentation::{ChatRepl, Cli, ConsoleOptions, web};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> Result<()> {
    // .env values become environment variables before config is read
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _log_guard = init_tracing(&cli);

    if cli.show_config {
        ConfigLoader::print_config_sources();
        return Ok(());
    }

    info!("Starting Recipe Chat");

    // === Configuration ===
    let loaded = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
    };
    let mut config = loaded.map_err(ConfigurationError::Load)?;

    if let Some(dir) = &cli.personas {
        config.chat.personas_dir = Some(dir.clone());
    }
    if let Some(bind) = &cli.bind {
        config.web.bind = bind.clone();
    }
    config.validate().map_err(ConfigurationError::Invalid)?;

    if cli.no_color || !config.output.color {
        colored::control::set_override(false);
    }

    // === Dependency Injection ===
    let registry = load_registry(&config)?;
    let gateway = build_gateway(&config)?;
    let logger: Arc<dyn ConversationLogger> = match &config.logging.conversation_dir {
        Some(dir) => match JsonlConversationLogger::in_dir(dir) {
            Some(logger) => {
                info!("Conversation log: {}", logger.path().display());
                Arc::new(logger)
            }
            None => {
                warn!(
                    "Could not open a conversation log in {}, continuing without one",
                    dir.display()
                );
                Arc::new(NoConversationLogger)
            }
        },
        None => Arc::new(NoConversationLogger),
    };
    let template = Arc::new(build_template(&config, registry, gateway, logger)?);

    // Web mode
    if cli.web {
        web::serve(&config.web.bind, template).await?;
        return Ok(());
    }

    let mut options = ConsoleOptions {
        show_progress: config.output.show_progress,
        show_decisions: config.output.show_decisions,
        ..ConsoleOptions::default()
    };
    if cli.quiet {
        options = options.quiet();
    }
    let mut repl = ChatRepl::new(template, options);

    // Scripted conversation
    if !cli.messages.is_empty() {
        repl.run_script(&cli.messages).await?;
        return Ok(());
    }

    repl.run().await?;
    Ok(())
}

/// Install the tracing subscriber.
///
/// Verbosity picks the level (warn, info, debug, trace); `RUST_LOG` is not
/// consulted. With `--log-dir`, events are also written to a daily file; the
/// returned guard flushes it on drop.
fn init_tracing(cli: &Cli) -> Option<WorkerGuard> {
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let (file_layer, guard) = match &cli.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "recipe-chat.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .init();

    guard
}
