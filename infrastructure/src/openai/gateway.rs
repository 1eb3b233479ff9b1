//! OpenAI-compatible LLM Gateway implementation

use super::protocol::{ChatCompletionChunk, ChatCompletionRequest, error_message};
use super::sse::{SseBuffer, SseData};
use async_trait::async_trait;
use futures::StreamExt;
use recipe_chat_application::ports::llm_gateway::{
    ChatRequest, GatewayError, LlmGateway, StreamHandle,
};
use recipe_chat_domain::StreamEvent;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Default Azure OpenAI REST API version
pub const DEFAULT_API_VERSION: &str = "2024-06-01";

/// Which URL and auth scheme the endpoint expects
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiFlavor {
    /// Azure OpenAI: deployment in the URL, `api-key` header
    #[default]
    Azure,
    /// OpenAI and compatible servers: model in the body, bearer token
    OpenAi,
}

/// Connection settings for [`OpenAiGateway`]
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub flavor: ApiFlavor,
    /// Base URL, e.g. `https://my-resource.openai.azure.com`
    pub endpoint: String,
    /// Azure deployment name, or model name for OpenAI
    pub deployment: String,
    pub api_key: String,
    /// Azure `api-version` query parameter
    pub api_version: String,
    pub connect_timeout: Duration,
}

impl OpenAiConfig {
    /// Chat completions URL for this endpoint
    pub fn chat_url(&self) -> String {
        let base = self.endpoint.trim_end_matches('/');
        match self.flavor {
            ApiFlavor::Azure => format!(
                "{base}/openai/deployments/{}/chat/completions?api-version={}",
                self.deployment, self.api_version
            ),
            ApiFlavor::OpenAi => format!("{base}/chat/completions"),
        }
    }

    /// Model field for the request body
    fn model(&self) -> Option<String> {
        match self.flavor {
            ApiFlavor::Azure => None,
            ApiFlavor::OpenAi => Some(self.deployment.clone()),
        }
    }
}

/// LLM Gateway for Azure OpenAI and OpenAI-compatible endpoints
pub struct OpenAiGateway {
    client: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiGateway {
    pub fn new(config: OpenAiConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| GatewayError::ConnectionError(e.to_string()))?;

        info!(
            "OpenAiGateway initialized ({:?}, deployment {})",
            config.flavor, config.deployment
        );

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.config.flavor {
            ApiFlavor::Azure => request.header("api-key", &self.config.api_key),
            ApiFlavor::OpenAi => request.bearer_auth(&self.config.api_key),
        }
    }
}

#[async_trait]
impl LlmGateway for OpenAiGateway {
    async fn stream_chat(&self, request: ChatRequest) -> Result<StreamHandle, GatewayError> {
        let body = ChatCompletionRequest::streaming(&request, self.config.model());
        debug!(
            "Sending chat completion with {} messages",
            body.messages.len()
        );

        let response = self
            .authorize(self.client.post(self.config.chat_url()))
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = error_message(&text);
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    GatewayError::AuthenticationFailed(message)
                }
                StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => GatewayError::Timeout,
                _ => GatewayError::RequestFailed(format!("HTTP {status}: {message}")),
            });
        }

        let (tx, rx) = mpsc::channel(64);
        tokio::spawn(pump_events(response, tx));
        Ok(StreamHandle::new(rx))
    }
}

fn map_transport_error(error: reqwest::Error) -> GatewayError {
    if error.is_timeout() {
        GatewayError::Timeout
    } else if error.is_connect() {
        GatewayError::ConnectionError(error.to_string())
    } else {
        GatewayError::RequestFailed(error.to_string())
    }
}

/// Forward SSE chunks from the response body into the stream channel.
///
/// Stops early when the receiving [`StreamHandle`] is dropped.
async fn pump_events(response: reqwest::Response, tx: mpsc::Sender<StreamEvent>) {
    let mut bytes = response.bytes_stream();
    let mut buffer = SseBuffer::new();
    let mut finished = false;

    loop {
        let next = tokio::select! {
            biased;
            _ = tx.closed() => {
                debug!("Stream receiver dropped, abandoning response");
                return;
            }
            next = bytes.next() => next,
        };

        let data = match next {
            Some(Ok(chunk)) => match buffer.push(&chunk) {
                Ok(data) => data,
                Err(e) => {
                    let _ = tx.send(invalid_text(e)).await;
                    return;
                }
            },
            Some(Err(e)) => {
                let _ = tx.send(StreamEvent::Error(e.to_string())).await;
                return;
            }
            None => {
                let tail = match buffer.finish() {
                    Ok(tail) => tail.into_iter().collect::<Vec<_>>(),
                    Err(e) => {
                        let _ = tx.send(invalid_text(e)).await;
                        return;
                    }
                };
                if forward(&tx, tail, &mut finished).await {
                    return;
                }
                let terminal = if finished {
                    StreamEvent::Completed(String::new())
                } else {
                    StreamEvent::Error("Stream ended before completion".to_string())
                };
                let _ = tx.send(terminal).await;
                return;
            }
        };

        if forward(&tx, data, &mut finished).await {
            return;
        }
    }
}

fn invalid_text(error: std::string::FromUtf8Error) -> StreamEvent {
    StreamEvent::Error(format!("Stream is not valid UTF-8: {error}"))
}

/// Send parsed events; returns `true` once the stream is over
async fn forward(
    tx: &mpsc::Sender<StreamEvent>,
    data: Vec<SseData>,
    finished: &mut bool,
) -> bool {
    for item in data {
        match item {
            SseData::Done => {
                let _ = tx.send(StreamEvent::Completed(String::new())).await;
                return true;
            }
            SseData::Payload(json) => match serde_json::from_str::<ChatCompletionChunk>(&json) {
                Ok(chunk) => {
                    if let Some(text) = chunk.content()
                        && tx.send(StreamEvent::Delta(text.to_string())).await.is_err()
                    {
                        return true;
                    }
                    *finished |= chunk.is_finished();
                }
                Err(e) => warn!("Skipping unreadable stream chunk: {}", e),
            },
        }
    }
    false
}
