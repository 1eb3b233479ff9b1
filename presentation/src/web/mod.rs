//! Web chat hub
//!
//! A WebSocket endpoint that runs one group chat per connection.

pub mod hub;
pub mod sink;

pub use hub::{ClientFrame, router, serve};
pub use sink::HubEventSink;
