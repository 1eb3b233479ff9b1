//! Streaming events for participant generation.

/// One event of a streamed participant reply.
///
/// Viewers render [`Delta`](StreamEvent::Delta)s as they arrive; the
/// orchestrator only finalizes the reply once a terminal event is seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Next piece of reply text
    Delta(String),
    /// End of a successful stream.
    ///
    /// Carries the whole reply for adapters that do not stream; streaming
    /// adapters send an empty string and the deltas stand.
    Completed(String),
    /// End of a failed stream
    Error(String),
}
