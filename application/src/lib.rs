//! Application layer for recipe-chat
//!
//! This crate contains the group chat use case, the turn-taking strategies,
//! port definitions and application configuration. It depends only on the
//! domain layer.

pub mod config;
pub mod ports;
pub mod strategies;
pub mod use_cases;

// Re-export commonly used types
pub use config::ExecutionParams;
pub use ports::{
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    event_sink::{CompositeEventSink, GroupChatEventSink, NoEvents},
    llm_gateway::{ChatRequest, GatewayError, LlmGateway, StreamHandle},
};
pub use strategies::{
    ApprovalTerminationPolicy, PromptSelectionPolicy, PromptTerminationPolicy, SelectionError,
    SelectionPolicy, SelectionSettings, SelectionStrategy, SequentialSelectionPolicy,
    TerminationEvaluationError, TerminationPolicy, TerminationSettings, TerminationStrategy,
};
pub use use_cases::group_chat::{
    GenerationError, GroupChat, GroupChatError, GroupChatTemplate, TurnCycleOutcome,
};
