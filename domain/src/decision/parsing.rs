//! Decision payload parsing.
//!
//! Strategy prompts ask the model for a small JSON object. Models often wrap
//! it in prose or a markdown fence, so the parsers locate the outermost
//! `{ ... }` span before deserializing. Field names are a wire contract shared
//! with existing prompt templates and must not change.
//!
//! | Payload | Fields |
//! |---------|--------|
//! | [`SelectionResponse`] | `next_agent`, `selection_reason` |
//! | [`TerminationResponse`] | `should_terminate`, `termination_reason` |

use super::value_objects::{SelectionDecision, TerminationDecision};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while reading a decision payload
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecisionParseError {
    #[error("No JSON object found in response: {0}")]
    NoJson(String),

    #[error("Failed to parse decision: {error}\nRaw response: {raw}")]
    Malformed { error: String, raw: String },
}

/// Selection payload produced by the selection prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionResponse {
    pub next_agent: String,
    pub selection_reason: String,
}

impl From<SelectionResponse> for SelectionDecision {
    fn from(response: SelectionResponse) -> Self {
        SelectionDecision::new(response.next_agent, response.selection_reason)
    }
}

/// Termination payload produced by the termination prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminationResponse {
    pub should_terminate: bool,
    pub termination_reason: String,
}

impl From<TerminationResponse> for TerminationDecision {
    fn from(response: TerminationResponse) -> Self {
        TerminationDecision {
            should_terminate: response.should_terminate,
            reason: response.termination_reason,
        }
    }
}

/// Locate the outermost JSON object in a model response
fn extract_json_object(response: &str) -> Option<&str> {
    let start = response.find('{')?;
    let end = response.rfind('}')?;
    (end > start).then(|| &response[start..=end])
}

fn parse_payload<T: for<'de> Deserialize<'de>>(response: &str) -> Result<T, DecisionParseError> {
    let json = extract_json_object(response)
        .ok_or_else(|| DecisionParseError::NoJson(response.to_string()))?;
    serde_json::from_str(json).map_err(|e| DecisionParseError::Malformed {
        error: e.to_string(),
        raw: response.to_string(),
    })
}

/// Parse a selection response into a decision.
///
/// # Examples
///
/// ```
/// use recipe_chat_domain::decision::parsing::parse_selection_response;
///
/// let decision = parse_selection_response(
///     r#"{"next_agent": "VeganReviewer", "selection_reason": "User asked for vegan"}"#,
/// )
/// .unwrap();
/// assert_eq!(decision.next_speaker, "VeganReviewer");
/// ```
pub fn parse_selection_response(response: &str) -> Result<SelectionDecision, DecisionParseError> {
    let payload: SelectionResponse = parse_payload(response)?;
    if payload.next_agent.trim().is_empty() {
        return Err(DecisionParseError::Malformed {
            error: "next_agent is empty".to_string(),
            raw: response.to_string(),
        });
    }
    Ok(payload.into())
}

/// Parse a termination response into a decision.
///
/// # Examples
///
/// ```
/// use recipe_chat_domain::decision::parsing::parse_termination_response;
///
/// let decision = parse_termination_response(
///     "```json\n{\"should_terminate\": true, \"termination_reason\": \"approved\"}\n```",
/// )
/// .unwrap();
/// assert!(decision.should_terminate);
/// ```
pub fn parse_termination_response(
    response: &str,
) -> Result<TerminationDecision, DecisionParseError> {
    let payload: TerminationResponse = parse_payload(response)?;
    Ok(payload.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_bare_json() {
        let decision = parse_selection_response(
            r#"{"next_agent": "RecipeBuilder", "selection_reason": "User asked for a dish"}"#,
        )
        .unwrap();
        assert_eq!(decision.next_speaker, "RecipeBuilder");
        assert_eq!(decision.reason, "User asked for a dish");
    }

    #[test]
    fn test_selection_inside_prose_and_fence() {
        let response = r#"
Sure, here is my choice:
```json
{"next_agent": "GlutenFreeReviewer", "selection_reason": "Gluten question"}
```
"#;
        let decision = parse_selection_response(response).unwrap();
        assert_eq!(decision.next_speaker, "GlutenFreeReviewer");
    }

    #[test]
    fn test_selection_missing_field_is_malformed() {
        let err = parse_selection_response(r#"{"next_agent": "RecipeBuilder"}"#).unwrap_err();
        assert!(matches!(err, DecisionParseError::Malformed { .. }));
    }

    #[test]
    fn test_selection_blank_agent_is_malformed() {
        let err = parse_selection_response(r#"{"next_agent": " ", "selection_reason": "?"}"#)
            .unwrap_err();
        assert!(matches!(err, DecisionParseError::Malformed { .. }));
    }

    #[test]
    fn test_no_json() {
        let err = parse_termination_response("I think we are done.").unwrap_err();
        assert_eq!(
            err,
            DecisionParseError::NoJson("I think we are done.".to_string())
        );
    }

    #[test]
    fn test_termination_wrong_type_is_malformed() {
        let err = parse_termination_response(
            r#"{"should_terminate": "yes", "termination_reason": "done"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, DecisionParseError::Malformed { .. }));
    }

    #[test]
    fn test_termination_false() {
        let decision = parse_termination_response(
            r#"{"should_terminate": false, "termination_reason": "Vegan review pending"}"#,
        )
        .unwrap();
        assert!(!decision.should_terminate);
        assert_eq!(decision.reason, "Vegan review pending");
    }

    #[test]
    fn test_wire_field_names_are_preserved() {
        let json = serde_json::to_value(TerminationResponse {
            should_terminate: true,
            termination_reason: "done".to_string(),
        })
        .unwrap();
        assert_eq!(json["should_terminate"], true);
        assert_eq!(json["termination_reason"], "done");

        let json = serde_json::to_value(SelectionResponse {
            next_agent: "A".to_string(),
            selection_reason: "b".to_string(),
        })
        .unwrap();
        assert_eq!(json["next_agent"], "A");
        assert_eq!(json["selection_reason"], "b");
    }
}
