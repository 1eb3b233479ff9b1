//! Ports (interfaces) for external dependencies
//!
//! These traits define the boundaries between the application layer
//! and the infrastructure/presentation layers.

pub mod conversation_logger;
pub mod event_sink;
pub mod llm_gateway;
