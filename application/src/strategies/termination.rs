//! Termination evaluation
//!
//! A [`TerminationPolicy`] decides whether the conversation is finished.
//! The [`TerminationStrategy`] carries the settings the orchestrator
//! enforces around it: the history window the policy sees, the iteration
//! cap, which speakers trigger an evaluation and automatic reset.

use crate::ports::llm_gateway::{ChatRequest, GatewayError, LlmGateway};
use async_trait::async_trait;
use recipe_chat_domain::{
    ChatMessage, DecisionParseError, ExecutionSettings, Participant, PromptTemplate, Role,
    TerminationDecision, parse_termination_response,
};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur while evaluating termination
#[derive(Error, Debug)]
pub enum TerminationEvaluationError {
    #[error("Termination gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Unreadable termination decision: {0}")]
    Parse(#[from] DecisionParseError),

    #[error("Termination policy failed: {0}")]
    PolicyFailed(String),
}

/// Decides whether a conversation should end
#[async_trait]
pub trait TerminationPolicy: Send + Sync {
    /// Evaluate the most recent messages.
    ///
    /// `window` holds at most `history_window` messages; `participants`
    /// are the participants eligible to end the conversation.
    async fn evaluate(
        &self,
        window: &[ChatMessage],
        participants: &[&Participant],
    ) -> Result<TerminationDecision, TerminationEvaluationError>;
}

/// Asks a model whether the conversation is finished.
///
/// The template sees `{{$agents}}` and `{{$history}}`; the answer must
/// contain a `{"should_terminate", "termination_reason"}` object.
pub struct PromptTerminationPolicy {
    gateway: Arc<dyn LlmGateway>,
    template: String,
    settings: ExecutionSettings,
}

impl PromptTerminationPolicy {
    pub fn new(gateway: Arc<dyn LlmGateway>) -> Self {
        Self {
            gateway,
            template: PromptTemplate::termination_template().to_string(),
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
impl TerminationPolicy for PromptTerminationPolicy {
    async fn evaluate(
        &self,
        window: &[ChatMessage],
        participants: &[&Participant],
    ) -> Result<TerminationDecision, TerminationEvaluationError> {
        let arguments =
            PromptTemplate::strategy_arguments(participants.iter().copied(), window);
        let prompt = PromptTemplate::render(&self.template, &arguments);
        let request = ChatRequest::new(prompt).with_settings(self.settings.clone());

        let response = self.gateway.complete(request).await?;
        debug!("Termination response: {}", response);
        Ok(parse_termination_response(&response)?)
    }
}

/// Ends the conversation once the latest participant message approves.
///
/// Looks for the APPROVE keyword and rejects negated or contradicted
/// forms ("NOT APPROVE", "CANNOT APPROVE", "REJECT", "REVISE").
pub struct ApprovalTerminationPolicy;

impl ApprovalTerminationPolicy {
    /// Whether a reply reads as an approval
    pub fn is_approval(text: &str) -> bool {
        let upper = text.to_uppercase();

        let approved = upper.contains("APPROVE")
            && !upper.contains("NOT APPROVE")
            && !upper.contains("DON'T APPROVE")
            && !upper.contains("CANNOT APPROVE");

        let rejected = upper.contains("REJECT") || upper.contains("REVISE");

        approved && !rejected
    }
}

#[async_trait]
impl TerminationPolicy for ApprovalTerminationPolicy {
    async fn evaluate(
        &self,
        window: &[ChatMessage],
        _participants: &[&Participant],
    ) -> Result<TerminationDecision, TerminationEvaluationError> {
        let Some(last) = window.iter().rev().find(|m| m.role() == Role::Participant) else {
            return Ok(TerminationDecision::proceed("No participant reply yet"));
        };
        let author = last.author().unwrap_or("participant");

        if Self::is_approval(last.content()) {
            Ok(TerminationDecision::terminate(format!(
                "{author} approved the recipe"
            )))
        } else {
            Ok(TerminationDecision::proceed(format!(
                "{author} has not approved yet"
            )))
        }
    }
}

/// Limits applied around a termination policy
#[derive(Debug, Clone)]
pub struct TerminationSettings {
    /// Number of most recent messages the policy sees
    pub history_window: usize,
    /// Turns per cycle before the orchestrator stops by itself
    pub maximum_iterations: usize,
    /// Speakers whose turns are evaluated (`None` = everyone)
    pub eligible_participants: Option<Vec<String>>,
    /// Start a fresh cycle when a completed conversation gets new input
    pub automatic_reset: bool,
}

impl Default for TerminationSettings {
    fn default() -> Self {
        Self {
            history_window: 3,
            maximum_iterations: 10,
            eligible_participants: None,
            automatic_reset: true,
        }
    }
}

impl TerminationSettings {
    pub fn with_history_window(mut self, window: usize) -> Self {
        self.history_window = window;
        self
    }

    pub fn with_maximum_iterations(mut self, max: usize) -> Self {
        self.maximum_iterations = max;
        self
    }

    pub fn with_eligible_participants<S: Into<String>>(
        mut self,
        names: impl IntoIterator<Item = S>,
    ) -> Self {
        self.eligible_participants = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_automatic_reset(mut self, enabled: bool) -> Self {
        self.automatic_reset = enabled;
        self
    }

    /// Whether a turn by `speaker` is evaluated
    pub fn is_eligible(&self, speaker: &str) -> bool {
        match &self.eligible_participants {
            Some(names) => names.iter().any(|n| n == speaker),
            None => true,
        }
    }
}

/// A termination policy plus its settings
pub struct TerminationStrategy {
    policy: Arc<dyn TerminationPolicy>,
    settings: TerminationSettings,
}

impl TerminationStrategy {
    pub fn new(policy: Arc<dyn TerminationPolicy>, settings: TerminationSettings) -> Self {
        Self { policy, settings }
    }

    pub fn settings(&self) -> &TerminationSettings {
        &self.settings
    }

    /// Evaluate the window; a policy that outlives `limit` fails with a
    /// gateway timeout.
    pub async fn evaluate(
        &self,
        window: &[ChatMessage],
        participants: &[&Participant],
        limit: Option<Duration>,
    ) -> Result<TerminationDecision, TerminationEvaluationError> {
        let evaluate = self.policy.evaluate(window, participants);
        match limit {
            Some(limit) => tokio::time::timeout(limit, evaluate)
                .await
                .unwrap_or_else(|_| {
                    warn!("Termination policy did not answer within {:?}", limit);
                    Err(TerminationEvaluationError::Gateway(GatewayError::Timeout))
                }),
            None => evaluate.await,
        }
    }
}
