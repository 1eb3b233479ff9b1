//! Execution parameters for the group chat loop.
//!
//! [`ExecutionParams`] groups the static limits applied while a
//! [`GroupChat`](crate::use_cases::group_chat::GroupChat) runs. Turn-taking
//! policy settings live with the strategies instead.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default upper bound on a single participant generation
pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(120);

/// Execution loop control parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionParams {
    /// Timeout for one participant reply, and for each selection or
    /// termination call (`None` waits forever).
    pub generation_timeout: Option<Duration>,
}

impl Default for ExecutionParams {
    fn default() -> Self {
        Self {
            generation_timeout: Some(DEFAULT_GENERATION_TIMEOUT),
        }
    }
}

impl ExecutionParams {
    pub fn with_generation_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.generation_timeout = timeout;
        self
    }
}
