//! Turn decisions.
//!
//! Every turn produces one [`SelectionDecision`] (who speaks) and, for
//! eligible speakers, one [`TerminationDecision`] (whether to stop). The
//! [`parsing`] module reads both from model output.

pub mod parsing;
pub mod value_objects;

pub use parsing::{
    DecisionParseError, SelectionResponse, TerminationResponse, parse_selection_response,
    parse_termination_response,
};
pub use value_objects::{CompletionReason, SelectionDecision, TerminationDecision};
