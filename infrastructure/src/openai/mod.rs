//! OpenAI-compatible chat completions adapter
//!
//! Talks to either Azure OpenAI (deployment-scoped URLs, `api-key` header)
//! or any OpenAI-compatible endpoint (bearer token) and streams replies as
//! server-sent events.

mod gateway;
pub mod protocol;
pub mod sse;

pub use gateway::{ApiFlavor, DEFAULT_API_VERSION, OpenAiConfig, OpenAiGateway};
