//! Speaker selection
//!
//! A [`SelectionPolicy`] proposes who speaks next. The [`SelectionStrategy`]
//! wraps a policy with the initial-participant rules and validates the
//! proposal against the registry before the orchestrator acts on it.

use crate::ports::llm_gateway::{ChatRequest, GatewayError, LlmGateway};
use async_trait::async_trait;
use recipe_chat_domain::{
    ChatMessage, DecisionParseError, DomainError, ExecutionSettings, ParticipantRegistry,
    PromptTemplate, Role, SelectionDecision, parse_selection_response,
};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur while selecting the next speaker
#[derive(Error, Debug)]
pub enum SelectionError {
    #[error("Selection gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Unreadable selection: {0}")]
    Parse(#[from] DecisionParseError),

    #[error("Selected participant '{0}' is not registered")]
    UnknownParticipant(String),

    #[error("Selection policy failed: {0}")]
    PolicyFailed(String),
}

impl From<DomainError> for SelectionError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::UnknownParticipant(name) => SelectionError::UnknownParticipant(name),
            other => SelectionError::PolicyFailed(other.to_string()),
        }
    }
}

/// Proposes the next speaker for a conversation
#[async_trait]
pub trait SelectionPolicy: Send + Sync {
    /// Pick the next speaker from `registry` given the full transcript.
    ///
    /// The returned name is validated by [`SelectionStrategy`]; policies may
    /// return a name that turns out not to be registered.
    async fn select(
        &self,
        messages: &[ChatMessage],
        registry: &ParticipantRegistry,
    ) -> Result<SelectionDecision, SelectionError>;
}

/// Asks a model to classify who should speak next.
///
/// The template sees `{{$agents}}` and `{{$history}}`; the answer must
/// contain a `{"next_agent", "selection_reason"}` object.
pub struct PromptSelectionPolicy {
    gateway: Arc<dyn LlmGateway>,
    template: String,
    settings: ExecutionSettings,
}

impl PromptSelectionPolicy {
    pub fn new(gateway: Arc<dyn LlmGateway>) -> Self {
        Self {
            gateway,
            template: PromptTemplate::selection_template().to_string(),
            settings: ExecutionSettings {
                temperature: Some(0.0),
                max_tokens: None,
            },
        }
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    pub fn with_settings(mut self, settings: ExecutionSettings) -> Self {
        self.settings = settings;
        self
    }
}

#[async_trait]
impl SelectionPolicy for PromptSelectionPolicy {
    async fn select(
        &self,
        messages: &[ChatMessage],
        registry: &ParticipantRegistry,
    ) -> Result<SelectionDecision, SelectionError> {
        let arguments = PromptTemplate::strategy_arguments(registry.iter(), messages);
        let prompt = PromptTemplate::render(&self.template, &arguments);
        let request = ChatRequest::new(prompt).with_settings(self.settings.clone());

        let response = self.gateway.complete(request).await?;
        debug!("Selection response: {}", response);
        Ok(parse_selection_response(&response)?)
    }
}

/// Round-robin over registry order.
///
/// Starts after the participant who spoke last; with no participant
/// message yet, starts with the first registered participant.
pub struct SequentialSelectionPolicy;

#[async_trait]
impl SelectionPolicy for SequentialSelectionPolicy {
    async fn select(
        &self,
        messages: &[ChatMessage],
        registry: &ParticipantRegistry,
    ) -> Result<SelectionDecision, SelectionError> {
        let last_speaker = messages
            .iter()
            .rev()
            .find(|m| m.role() == Role::Participant)
            .and_then(|m| m.author());

        let next_index = last_speaker
            .and_then(|name| registry.position(name))
            .map(|i| (i + 1) % registry.len())
            .unwrap_or(0);

        let next = registry
            .as_slice()
            .get(next_index)
            .ok_or_else(|| SelectionError::PolicyFailed("registry is empty".to_string()))?;

        let reason = match last_speaker {
            Some(previous) => format!("Next in turn after {previous}"),
            None => "First in turn order".to_string(),
        };
        Ok(SelectionDecision::new(next.name(), reason))
    }
}

/// Initial-participant rules applied around a selection policy
#[derive(Debug, Clone, Default)]
pub struct SelectionSettings {
    /// Participant that opens a conversation
    pub initial_participant: Option<String>,
    /// Select the initial participant when the policy fails or names an
    /// unknown participant
    pub use_initial_as_fallback: bool,
}

impl SelectionSettings {
    pub fn with_initial_participant(mut self, name: impl Into<String>) -> Self {
        self.initial_participant = Some(name.into());
        self
    }

    pub fn with_fallback(mut self, enabled: bool) -> Self {
        self.use_initial_as_fallback = enabled;
        self
    }
}

/// A selection policy plus its settings
pub struct SelectionStrategy {
    policy: Arc<dyn SelectionPolicy>,
    settings: SelectionSettings,
}

impl SelectionStrategy {
    pub fn new(policy: Arc<dyn SelectionPolicy>, settings: SelectionSettings) -> Self {
        Self { policy, settings }
    }

    pub fn settings(&self) -> &SelectionSettings {
        &self.settings
    }

    /// Check the settings against a registry
    pub fn validate(&self, registry: &ParticipantRegistry) -> Result<(), SelectionError> {
        if let Some(initial) = &self.settings.initial_participant {
            registry.resolve(initial)?;
        }
        Ok(())
    }

    /// Select the next speaker.
    ///
    /// The returned decision always names a registered participant, using
    /// its canonical spelling. A policy that outlives `limit` counts as a
    /// gateway timeout and takes the fallback path like any other failure.
    pub async fn next(
        &self,
        messages: &[ChatMessage],
        registry: &ParticipantRegistry,
        limit: Option<Duration>,
    ) -> Result<SelectionDecision, SelectionError> {
        if messages.is_empty()
            && let Some(initial) = &self.settings.initial_participant
        {
            let participant = registry.resolve(initial)?;
            debug!("Empty transcript, opening with {}", participant.name());
            return Ok(SelectionDecision::new(
                participant.name(),
                "Initial participant",
            ));
        }

        let select = self.policy.select(messages, registry);
        let proposal = match limit {
            Some(limit) => tokio::time::timeout(limit, select)
                .await
                .unwrap_or_else(|_| {
                    warn!("Selection policy did not answer within {:?}", limit);
                    Err(SelectionError::Gateway(GatewayError::Timeout))
                }),
            None => select.await,
        };
        let proposal = proposal.and_then(|decision| {
            let participant = registry.resolve(&decision.next_speaker)?;
            Ok(SelectionDecision::new(participant.name(), decision.reason))
        });

        match proposal {
            Ok(decision) => Ok(decision),
            Err(e) => match self.fallback(registry) {
                Some(participant) => {
                    warn!("Selection failed ({}), falling back to {}", e, participant);
                    Ok(SelectionDecision::new(
                        participant,
                        format!("Fallback to initial participant: {e}"),
                    ))
                }
                None => Err(e),
            },
        }
    }

    fn fallback<'a>(&self, registry: &'a ParticipantRegistry) -> Option<&'a str> {
        if !self.settings.use_initial_as_fallback {
            return None;
        }
        let initial = self.settings.initial_participant.as_deref()?;
        registry.resolve(initial).ok().map(|p| p.name())
    }
}
