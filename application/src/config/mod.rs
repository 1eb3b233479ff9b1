//! Application-level configuration.
//!
//! - [`ExecutionParams`]: per-conversation execution limits (generation timeout)

pub mod execution_params;

pub use execution_params::ExecutionParams;
