//! Group chat use case
//!
//! Drives a bounded conversation among the registered participants:
//! select a speaker, stream their reply, evaluate termination, repeat.
//!
//! A [`GroupChatTemplate`] holds everything that is shared and immutable
//! (registry, gateway, strategies, limits). Each [`GroupChat`] built from it
//! owns one transcript, so conversations never see each other's messages.

use crate::config::ExecutionParams;
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::event_sink::GroupChatEventSink;
use crate::ports::llm_gateway::{ChatRequest, GatewayError, LlmGateway, StreamHandle};
use crate::strategies::{SelectionError, SelectionStrategy, TerminationStrategy};
use recipe_chat_domain::{
    ChatMessage, CompletionReason, MessageDraft, Participant, ParticipantRegistry, StreamEvent,
    TerminationDecision, Transcript, preview,
};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Errors raised while a participant generates a reply
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Stream error from {participant}: {message}")]
    Stream {
        participant: String,
        message: String,
    },

    #[error("{0} produced an empty reply")]
    EmptyReply(String),

    #[error("{participant} did not finish within {after:?}")]
    Timeout {
        participant: String,
        after: Duration,
    },
}

/// Errors that end a turn cycle
#[derive(Error, Debug)]
pub enum GroupChatError {
    #[error("Invalid group chat configuration: {0}")]
    Configuration(String),

    #[error("Selection failed: {0}")]
    Selection(#[from] SelectionError),

    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("Turn cycle cancelled")]
    Cancelled,

    #[error("Conversation is complete; start a new conversation to continue")]
    ConversationComplete,
}

impl GroupChatError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, GroupChatError::Cancelled)
    }
}

/// What one turn cycle produced
#[derive(Debug, Clone)]
pub struct TurnCycleOutcome {
    /// Participant messages appended during the cycle, in order
    pub messages: Vec<ChatMessage>,
    /// Termination decisions, one per evaluated turn
    pub evaluations: Vec<TerminationDecision>,
    pub completion: CompletionReason,
}

/// Shared, immutable configuration of a group chat
pub struct GroupChatTemplate {
    registry: Arc<ParticipantRegistry>,
    gateway: Arc<dyn LlmGateway>,
    selection: SelectionStrategy,
    termination: TerminationStrategy,
    params: ExecutionParams,
    logger: Arc<dyn ConversationLogger>,
}

impl GroupChatTemplate {
    /// Build a template, checking the strategy settings against the registry.
    pub fn new(
        registry: Arc<ParticipantRegistry>,
        gateway: Arc<dyn LlmGateway>,
        selection: SelectionStrategy,
        termination: TerminationStrategy,
    ) -> Result<Self, GroupChatError> {
        selection
            .validate(&registry)
            .map_err(|e| GroupChatError::Configuration(e.to_string()))?;

        let settings = termination.settings();
        if settings.maximum_iterations == 0 {
            return Err(GroupChatError::Configuration(
                "maximum_iterations must be at least 1".to_string(),
            ));
        }
        if settings.history_window == 0 {
            return Err(GroupChatError::Configuration(
                "history_window must be at least 1".to_string(),
            ));
        }
        if let Some(names) = &settings.eligible_participants {
            registry
                .subset(names)
                .map_err(|e| GroupChatError::Configuration(e.to_string()))?;
        }

        Ok(Self {
            registry,
            gateway,
            selection,
            termination,
            params: ExecutionParams::default(),
            logger: Arc::new(NoConversationLogger),
        })
    }

    pub fn with_params(mut self, params: ExecutionParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn registry(&self) -> &ParticipantRegistry {
        &self.registry
    }

    /// Participants allowed to end the conversation
    fn eligible_participants(&self) -> Vec<&Participant> {
        match &self.termination.settings().eligible_participants {
            // Names were checked in `new`
            Some(names) => self.registry.subset(names).unwrap_or_default(),
            None => self.registry.iter().collect(),
        }
    }
}

/// One conversation
pub struct GroupChat {
    id: String,
    template: Arc<GroupChatTemplate>,
    transcript: Transcript,
    iterations: usize,
    completion: Option<CompletionReason>,
}

impl GroupChat {
    pub fn new(template: Arc<GroupChatTemplate>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            template,
            transcript: Transcript::new(),
            iterations: 0,
            completion: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn template(&self) -> &GroupChatTemplate {
        &self.template
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn is_complete(&self) -> bool {
        self.completion.is_some()
    }

    /// Why the last cycle finished, if the conversation is complete
    pub fn completion(&self) -> Option<&CompletionReason> {
        self.completion.as_ref()
    }

    /// Turns taken in the current cycle
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Append a user message to the transcript.
    pub fn append_user_message(&mut self, text: impl Into<String>) -> &ChatMessage {
        let message = self.transcript.push(ChatMessage::user(text));
        self.template
            .logger
            .log(ConversationEvent::user_message(&self.id, message));
        message
    }

    /// Start a new conversation with an empty transcript
    pub fn reset(&mut self) {
        info!("Resetting conversation {}", self.id);
        self.transcript.clear();
        self.iterations = 0;
        self.completion = None;
        self.id = Uuid::new_v4().to_string();
    }

    /// Run turns until the termination policy agrees or the iteration cap
    /// is reached.
    ///
    /// A failed selection or generation leaves the transcript as it was
    /// before that turn; replies from earlier turns in the cycle stay.
    pub async fn run_turn_cycle(
        &mut self,
        sink: &dyn GroupChatEventSink,
        cancellation: &CancellationToken,
    ) -> Result<TurnCycleOutcome, GroupChatError> {
        let template = Arc::clone(&self.template);
        let settings = template.termination.settings();

        if self.is_complete() {
            if !settings.automatic_reset {
                return Err(GroupChatError::ConversationComplete);
            }
            debug!("Automatic reset of conversation {}", self.id);
            self.completion = None;
        }
        // The cap counts turns of this cycle only
        self.iterations = 0;
        let limit = template.params.generation_timeout;

        info!(
            "Starting turn cycle for conversation {} ({} messages)",
            self.id,
            self.transcript.len()
        );

        let mut messages = Vec::new();
        let mut evaluations = Vec::new();

        loop {
            if cancellation.is_cancelled() {
                return Err(GroupChatError::Cancelled);
            }

            // Selection
            let decision = tokio::select! {
                biased;
                _ = cancellation.cancelled() => return Err(GroupChatError::Cancelled),
                result = template.selection.next(self.transcript.messages(), &template.registry, limit) => result?,
            };
            debug!(
                "Selected {} ({})",
                decision.next_speaker, decision.reason
            );
            sink.on_speaker_selected(&decision);
            template
                .logger
                .log(ConversationEvent::speaker_selected(&self.id, &decision));

            let participant = template
                .registry
                .get(&decision.next_speaker)
                .ok_or_else(|| SelectionError::UnknownParticipant(decision.next_speaker.clone()))?;

            // Generation
            let draft = self
                .generate(&template, participant, sink, cancellation)
                .await?;
            let message_id = draft.id().to_string();
            let message = self.transcript.push(draft.finish()).clone();
            info!(
                "{} replied: {}",
                participant.name(),
                preview(message.content(), 80)
            );
            sink.on_message(&message_id, &message);
            template.logger.log(ConversationEvent::participant_message(
                &self.id,
                &message_id,
                &message,
            ));
            messages.push(message);

            self.iterations += 1;

            // Termination
            let mut completion = None;
            if settings.is_eligible(participant.name()) {
                let eligible = template.eligible_participants();
                let window = self.transcript.window(settings.history_window);
                let evaluation = tokio::select! {
                    biased;
                    _ = cancellation.cancelled() => return Err(GroupChatError::Cancelled),
                    result = template.termination.evaluate(window, &eligible, limit) => result,
                };
                let decision = match evaluation {
                    Ok(decision) => decision,
                    Err(e) => {
                        warn!("Termination evaluation failed, continuing: {}", e);
                        TerminationDecision::proceed(format!("Termination evaluation failed: {e}"))
                    }
                };
                debug!(
                    "Termination after turn {}: {} ({})",
                    self.iterations, decision.should_terminate, decision.reason
                );
                sink.on_termination_evaluated(&decision);
                template.logger.log(ConversationEvent::termination_evaluated(
                    &self.id,
                    self.iterations,
                    &decision,
                ));
                if decision.should_terminate {
                    completion = Some(CompletionReason::Terminated {
                        reason: decision.reason.clone(),
                    });
                }
                evaluations.push(decision);
            } else {
                debug!(
                    "{} is not eligible to terminate, skipping evaluation",
                    participant.name()
                );
            }

            if completion.is_none() && self.iterations >= settings.maximum_iterations {
                warn!(
                    "Conversation {} reached the iteration cap ({})",
                    self.id, settings.maximum_iterations
                );
                completion = Some(CompletionReason::MaximumIterations {
                    limit: settings.maximum_iterations,
                });
            }

            if let Some(reason) = completion {
                info!(
                    "Conversation {} complete after {} turns: {}",
                    self.id,
                    self.iterations,
                    reason.describe()
                );
                sink.on_conversation_complete(&reason);
                template
                    .logger
                    .log(ConversationEvent::conversation_complete(&self.id, &reason));
                self.completion = Some(reason.clone());
                return Ok(TurnCycleOutcome {
                    messages,
                    evaluations,
                    completion: reason,
                });
            }
        }
    }

    /// Stream one reply into a draft.
    ///
    /// The draft is only returned once the stream completed with text; on
    /// any failure it is dropped.
    async fn generate(
        &self,
        template: &GroupChatTemplate,
        participant: &Participant,
        sink: &dyn GroupChatEventSink,
        cancellation: &CancellationToken,
    ) -> Result<MessageDraft, GroupChatError> {
        let persona = participant.persona();
        let request = ChatRequest::new(persona.system_prompt())
            .with_messages(self.transcript.messages())
            .with_settings(persona.execution_settings.clone());

        let mut draft = MessageDraft::new(Uuid::new_v4().to_string(), participant.name());

        let stream = async {
            match template.gateway.stream_chat(request).await {
                Ok(handle) => consume_stream(handle, &mut draft, sink).await,
                Err(e) => Err(GenerationError::Gateway(e)),
            }
        };

        let generation = async {
            match template.params.generation_timeout {
                Some(limit) => match tokio::time::timeout(limit, stream).await {
                    Ok(result) => result,
                    Err(_) => Err(GenerationError::Timeout {
                        participant: participant.name().to_string(),
                        after: limit,
                    }),
                },
                None => stream.await,
            }
        };

        tokio::select! {
            biased;
            _ = cancellation.cancelled() => {
                debug!("Discarding draft from {} after cancellation", participant.name());
                return Err(GroupChatError::Cancelled);
            }
            result = generation => result?,
        }

        if draft.is_blank() {
            return Err(GenerationError::EmptyReply(participant.name().to_string()).into());
        }
        Ok(draft)
    }
}

/// Feed stream events into a draft until the stream completes
async fn consume_stream(
    mut handle: StreamHandle,
    draft: &mut MessageDraft,
    sink: &dyn GroupChatEventSink,
) -> Result<(), GenerationError> {
    while let Some(event) = handle.next().await {
        match event {
            StreamEvent::Delta(chunk) => {
                sink.on_message_chunk(draft.id(), draft.author(), &chunk);
                draft.push_chunk(&chunk);
            }
            StreamEvent::Completed(text) => {
                draft.complete_with(&text);
                return Ok(());
            }
            StreamEvent::Error(message) => {
                return Err(GenerationError::Stream {
                    participant: draft.author().to_string(),
                    message,
                });
            }
        }
    }
    Err(GenerationError::Gateway(GatewayError::StreamClosed))
}
