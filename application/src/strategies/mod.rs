//! Turn-taking strategies
//!
//! Selection decides who speaks next; termination decides when to stop.
//! Both are trait objects so deterministic policies can replace the
//! model-backed ones.

pub mod selection;
pub mod termination;

pub use selection::{
    PromptSelectionPolicy, SelectionError, SelectionPolicy, SelectionSettings, SelectionStrategy,
    SequentialSelectionPolicy,
};
pub use termination::{
    ApprovalTerminationPolicy, PromptTerminationPolicy, TerminationEvaluationError,
    TerminationPolicy, TerminationSettings, TerminationStrategy,
};
