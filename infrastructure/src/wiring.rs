//! Assembly of a group chat from configuration
//!
//! Turns a validated [`FileConfig`] into the shared
//! [`GroupChatTemplate`] used by both the console and the web hub.

use crate::config::{
    ConfigLoader, ConfigValidationError, FileConfig, SelectionPolicyKind, TerminationPolicyKind,
};
use crate::openai::OpenAiGateway;
use crate::personas::{PersonaLoadError, PersonaLoader};
use recipe_chat_application::{
    ApprovalTerminationPolicy, ConversationLogger, ExecutionParams, GatewayError, GroupChatError,
    GroupChatTemplate, LlmGateway, PromptSelectionPolicy, PromptTerminationPolicy,
    SelectionPolicy, SelectionSettings, SelectionStrategy, SequentialSelectionPolicy,
    TerminationPolicy, TerminationSettings, TerminationStrategy,
};
use recipe_chat_domain::{DomainError, ParticipantRegistry};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Startup failures; all of them are fatal
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] ConfigValidationError),

    #[error(transparent)]
    Personas(#[from] PersonaLoadError),

    #[error("Invalid participants: {0}")]
    Participants(#[from] DomainError),

    #[error("Failed to read template {path}: {source}")]
    Template {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create LLM gateway: {0}")]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    GroupChat(#[from] GroupChatError),
}

/// Participants from the configured persona directory or the built-in cast
pub fn load_registry(config: &FileConfig) -> Result<ParticipantRegistry, ConfigurationError> {
    let personas = PersonaLoader::load_or_default(config.chat.personas_dir.as_deref())?;
    let registry = ParticipantRegistry::from_personas(personas)?;
    info!("Participants: {}", registry.names().join(", "));
    Ok(registry)
}

/// Gateway for the configured LLM endpoint
pub fn build_gateway(config: &FileConfig) -> Result<Arc<dyn LlmGateway>, ConfigurationError> {
    let settings = config.llm.resolve()?;
    Ok(Arc::new(OpenAiGateway::new(settings)?))
}

fn read_template(path: &Path) -> Result<String, ConfigurationError> {
    ConfigLoader::read_template(path).map_err(|source| ConfigurationError::Template {
        path: path.to_path_buf(),
        source,
    })
}

/// Build the shared group chat template
pub fn build_template(
    config: &FileConfig,
    registry: ParticipantRegistry,
    gateway: Arc<dyn LlmGateway>,
    logger: Arc<dyn ConversationLogger>,
) -> Result<GroupChatTemplate, ConfigurationError> {
    config.validate()?;

    let selection_policy: Arc<dyn SelectionPolicy> = match config.selection.policy {
        SelectionPolicyKind::Prompt => {
            let mut policy = PromptSelectionPolicy::new(Arc::clone(&gateway));
            if let Some(path) = &config.selection.template_file {
                policy = policy.with_template(read_template(path)?);
            }
            Arc::new(policy)
        }
        SelectionPolicyKind::Sequential => Arc::new(SequentialSelectionPolicy),
    };

    let termination_policy: Arc<dyn TerminationPolicy> = match config.termination.policy {
        TerminationPolicyKind::Prompt => {
            let mut policy = PromptTerminationPolicy::new(Arc::clone(&gateway));
            if let Some(path) = &config.termination.template_file {
                policy = policy.with_template(read_template(path)?);
            }
            Arc::new(policy)
        }
        TerminationPolicyKind::Approval => Arc::new(ApprovalTerminationPolicy),
    };

    let selection_settings = SelectionSettings {
        initial_participant: config.selection.initial_participant.clone(),
        use_initial_as_fallback: config.selection.use_initial_as_fallback,
    };
    let termination_settings = TerminationSettings {
        history_window: config.termination.history_window,
        maximum_iterations: config.termination.maximum_iterations,
        eligible_participants: config.termination.eligible_participants.clone(),
        automatic_reset: config.termination.automatic_reset,
    };

    let template = GroupChatTemplate::new(
        Arc::new(registry),
        gateway,
        SelectionStrategy::new(selection_policy, selection_settings),
        TerminationStrategy::new(termination_policy, termination_settings),
    )?
    .with_params(
        ExecutionParams::default().with_generation_timeout(Some(config.generation_timeout())),
    )
    .with_logger(logger);

    info!(
        "Group chat ready: {:?} selection, {:?} termination, at most {} turns per cycle",
        config.selection.policy, config.termination.policy, config.termination.maximum_iterations
    );
    Ok(template)
}
