//! Participant generation session types.
//!
//! - [`stream::StreamEvent`]: one event of a streamed participant reply

pub mod stream;

pub use stream::StreamEvent;
