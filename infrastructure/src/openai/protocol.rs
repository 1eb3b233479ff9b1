//! Chat completions wire types.
//!
//! Only the fields the gateway reads or writes are modelled; unknown fields
//! in responses are ignored.

use recipe_chat_application::ChatRequest;
use recipe_chat_domain::{ChatMessage, Role};
use serde::{Deserialize, Serialize};

/// Request body for `POST .../chat/completions`
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    /// Model name; omitted for Azure where the deployment is in the URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub messages: Vec<WireMessage>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl ChatCompletionRequest {
    /// Build a streaming request: system prompt first, then the transcript
    pub fn streaming(request: &ChatRequest, model: Option<String>) -> Self {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if !request.system_prompt.is_empty() {
            messages.push(WireMessage {
                role: "system",
                content: request.system_prompt.clone(),
                name: None,
            });
        }
        messages.extend(request.messages.iter().map(WireMessage::from));

        Self {
            model,
            messages,
            stream: true,
            temperature: request.settings.temperature,
            max_tokens: request.settings.max_tokens,
        }
    }
}

/// One message in a chat completions request
#[derive(Debug, Clone, Serialize)]
pub struct WireMessage {
    pub role: &'static str,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl From<&ChatMessage> for WireMessage {
    fn from(message: &ChatMessage) -> Self {
        let role = match message.role() {
            Role::System => "system",
            Role::User => "user",
            Role::Participant => "assistant",
        };
        Self {
            role,
            content: message.content().to_string(),
            name: message.author().map(sanitize_name).filter(|n| !n.is_empty()),
        }
    }
}

/// The `name` field only accepts `[A-Za-z0-9_-]`
fn sanitize_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .take(64)
        .collect()
}

/// One streamed completion chunk
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionChunk {
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
}

impl ChatCompletionChunk {
    /// Text carried by the first choice, if any
    pub fn content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.delta.content.as_deref())
            .filter(|s| !s.is_empty())
    }

    pub fn is_finished(&self) -> bool {
        self.choices.iter().any(|c| c.finish_reason.is_some())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChunkChoice {
    #[serde(default)]
    pub delta: ChunkDelta,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChunkDelta {
    #[serde(default)]
    pub content: Option<String>,
}

/// Error body returned with non-2xx statuses
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    pub message: String,
}

/// Best-effort extraction of an error message from a response body
pub fn error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use recipe_chat_domain::ExecutionSettings;

    #[test]
    fn test_streaming_request_shape() {
        let request = ChatRequest::new("You are a chef.")
            .with_messages(&[
                ChatMessage::user("Pancakes?"),
                ChatMessage::participant("Recipe Builder", "Sure"),
            ])
            .with_settings(ExecutionSettings {
                temperature: Some(0.7),
                max_tokens: None,
            });

        let body = serde_json::to_value(ChatCompletionRequest::streaming(&request, None)).unwrap();

        assert!(body.get("model").is_none());
        assert!(body.get("max_tokens").is_none());
        assert_eq!(body["stream"], true);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["role"], "user");
        assert!(body["messages"][1].get("name").is_none());
        assert_eq!(body["messages"][2]["role"], "assistant");
        assert_eq!(body["messages"][2]["name"], "RecipeBuilder");
    }

    #[test]
    fn test_chunk_content_and_finish() {
        let chunk: ChatCompletionChunk = serde_json::from_str(
            r#"{"id":"x","choices":[{"index":0,"delta":{"content":"Pan"},"finish_reason":null}]}"#,
        )
        .unwrap();
        assert_eq!(chunk.content(), Some("Pan"));
        assert!(!chunk.is_finished());

        let last: ChatCompletionChunk = serde_json::from_str(
            r#"{"choices":[{"index":0,"delta":{},"finish_reason":"stop"}]}"#,
        )
        .unwrap();
        assert_eq!(last.content(), None);
        assert!(last.is_finished());

        // Azure sends prompt filter results with no choices
        let filter: ChatCompletionChunk =
            serde_json::from_str(r#"{"choices":[],"prompt_filter_results":[]}"#).unwrap();
        assert_eq!(filter.content(), None);
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            error_message(r#"{"error":{"message":"Invalid API key","code":"401"}}"#),
            "Invalid API key"
        );
        assert_eq!(error_message("Bad gateway\n"), "Bad gateway");
    }
}
