//! LLM Gateway port
//!
//! Defines the interface for communicating with LLM providers. Participants
//! stream their replies through it; the prompt-based strategies use the
//! collected text.

use async_trait::async_trait;
use recipe_chat_domain::{ChatMessage, ExecutionSettings, StreamEvent};
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors that can occur during LLM gateway operations
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Stream closed")]
    StreamClosed,

    #[error("Other error: {0}")]
    Other(String),
}

/// One chat completion request
#[derive(Debug, Clone, Default)]
pub struct ChatRequest {
    /// Rendered system prompt (persona instructions or strategy prompt)
    pub system_prompt: String,
    /// Conversation messages sent after the system prompt
    pub messages: Vec<ChatMessage>,
    pub settings: ExecutionSettings,
}

impl ChatRequest {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            messages: Vec::new(),
            settings: ExecutionSettings::default(),
        }
    }

    pub fn with_messages(mut self, messages: &[ChatMessage]) -> Self {
        self.messages = messages.to_vec();
        self
    }

    pub fn with_settings(mut self, settings: ExecutionSettings) -> Self {
        self.settings = settings;
        self
    }
}

/// Gateway for LLM communication
///
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Start a streaming completion.
    async fn stream_chat(&self, request: ChatRequest) -> Result<StreamHandle, GatewayError>;

    /// Run a completion and return the full text.
    ///
    /// Default implementation collects [`stream_chat`](Self::stream_chat).
    async fn complete(&self, request: ChatRequest) -> Result<String, GatewayError> {
        self.stream_chat(request).await?.collect_text().await
    }
}

/// Handle for receiving streaming events from a completion.
///
/// Wraps an `mpsc::Receiver<StreamEvent>`; dropping the handle tells the
/// producer to stop.
pub struct StreamHandle {
    pub receiver: mpsc::Receiver<StreamEvent>,
}

impl StreamHandle {
    pub fn new(receiver: mpsc::Receiver<StreamEvent>) -> Self {
        Self { receiver }
    }

    /// A stream that yields one complete text, for non-streaming adapters
    pub fn from_text(text: impl Into<String>) -> Self {
        let (tx, rx) = mpsc::channel(1);
        // Capacity 1 and a fresh receiver: this send cannot fail
        let _ = tx.try_send(StreamEvent::Completed(text.into()));
        Self::new(rx)
    }

    /// Receive the next event, `None` once the producer is gone
    pub async fn next(&mut self) -> Option<StreamEvent> {
        self.receiver.recv().await
    }

    /// Consume the stream and collect all text into a single string.
    pub async fn collect_text(mut self) -> Result<String, GatewayError> {
        let mut full_text = String::new();
        while let Some(event) = self.receiver.recv().await {
            match event {
                StreamEvent::Delta(chunk) => full_text.push_str(&chunk),
                StreamEvent::Completed(text) => {
                    if full_text.is_empty() {
                        return Ok(text);
                    }
                    return Ok(full_text);
                }
                StreamEvent::Error(e) => {
                    return Err(GatewayError::RequestFailed(e));
                }
            }
        }
        // Channel closed without Completed
        Err(GatewayError::StreamClosed)
    }
}
