//! Prompt templates for the group chat

use crate::participant::Participant;
use crate::transcript::{ChatMessage, Role};
use std::collections::BTreeMap;

/// Variable holding the participant list in strategy templates
pub const AGENTS_VARIABLE: &str = "agents";
/// Variable holding the rendered transcript in strategy templates
pub const HISTORY_VARIABLE: &str = "history";

/// Templates and rendering for persona and strategy prompts
pub struct PromptTemplate;

impl PromptTemplate {
    /// Substitute `{{$name}}` placeholders from `arguments`.
    ///
    /// Whitespace inside the braces is ignored and the `$` sigil is optional.
    /// Unknown variables render as an empty string; an unterminated `{{` is
    /// copied through verbatim.
    pub fn render(template: &str, arguments: &BTreeMap<String, String>) -> String {
        let mut output = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find("{{") {
            output.push_str(&rest[..start]);
            let after_open = &rest[start + 2..];
            let Some(end) = after_open.find("}}") else {
                output.push_str(&rest[start..]);
                return output;
            };
            let key = after_open[..end].trim();
            let key = key.strip_prefix('$').unwrap_or(key);
            if let Some(value) = arguments.get(key) {
                output.push_str(value);
            }
            rest = &after_open[end + 2..];
        }

        output.push_str(rest);
        output
    }

    /// Render the participant list for the `{{$agents}}` variable
    pub fn agents_variable<'a>(participants: impl IntoIterator<Item = &'a Participant>) -> String {
        participants
            .into_iter()
            .map(|p| {
                if p.description().is_empty() {
                    format!("- {}", p.name())
                } else {
                    format!("- {}: {}", p.name(), p.description())
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Render transcript messages for the `{{$history}}` variable
    pub fn history_variable(messages: &[ChatMessage]) -> String {
        messages
            .iter()
            .map(|m| match m.role() {
                Role::User => format!("USER: {}", m.content()),
                Role::System => format!("SYSTEM: {}", m.content()),
                Role::Participant => {
                    format!("{}: {}", m.author().unwrap_or("ASSISTANT"), m.content())
                }
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Arguments for a strategy template
    pub fn strategy_arguments<'a>(
        participants: impl IntoIterator<Item = &'a Participant>,
        messages: &[ChatMessage],
    ) -> BTreeMap<String, String> {
        BTreeMap::from([
            (
                AGENTS_VARIABLE.to_string(),
                Self::agents_variable(participants),
            ),
            (
                HISTORY_VARIABLE.to_string(),
                Self::history_variable(messages),
            ),
        ])
    }

    /// Ingredients the builder may cook with
    pub fn default_ingredients() -> &'static [&'static str] {
        &["Flour", "Sugar", "Eggs", "Butter", "Milk"]
    }

    pub fn recipe_builder_instructions() -> &'static str {
        r#"You are RecipeBuilder, a creative home cook collaborating with dietary reviewers.
Create recipes using only the available ingredients unless the user explicitly allows more.

Available ingredients: {{$ingredients}}

When reviewers raise concerns, revise the recipe and explain what changed.
Always present recipes with a title, an ingredient list with quantities and numbered steps.
Keep your answers concise."#
    }

    pub fn gluten_free_reviewer_instructions() -> &'static str {
        r#"You are GlutenFreeReviewer. Review the most recent recipe in the conversation.
Identify every ingredient that contains or may contain gluten and suggest a safe substitution.
If the recipe is already gluten free, say so and reply with APPROVED.
Do not write a new recipe yourself; give feedback to RecipeBuilder."#
    }

    pub fn vegan_reviewer_instructions() -> &'static str {
        r#"You are VeganReviewer. Review the most recent recipe in the conversation.
Identify every animal product and suggest a plant-based alternative.
If the recipe is already vegan, say so and reply with APPROVED.
Do not write a new recipe yourself; give feedback to RecipeBuilder."#
    }

    /// Selection strategy template
    ///
    /// The model must answer with `{"next_agent": ..., "selection_reason": ...}`.
    pub fn selection_template() -> &'static str {
        r#"You coordinate a group chat about cooking. Decide which participant should speak next.

Participants:
{{$agents}}

Rules:
- After a user message, the builder answers first.
- After the builder presents or revises a recipe, the reviewer whose concern the user raised reviews it.
- After a reviewer gives feedback, the builder revises the recipe.
- Never pick the participant who spoke last unless no other choice makes sense.

Conversation so far:
{{$history}}

Respond with JSON only, no prose:
{"next_agent": "<participant name>", "selection_reason": "<one sentence>"}"#
    }

    /// Termination strategy template
    ///
    /// The model must answer with `{"should_terminate": ..., "termination_reason": ...}`.
    pub fn termination_template() -> &'static str {
        r#"You monitor a group chat about cooking and decide whether it is finished.

Participants:
{{$agents}}

Most recent messages:
{{$history}}

The conversation is finished when the latest recipe satisfies the user's request and every
relevant reviewer has approved it. It is not finished while a reviewer still requests changes.

Respond with JSON only, no prose:
{"should_terminate": true|false, "termination_reason": "<one sentence>"}"#
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::persona::Persona;
    use crate::transcript::Transcript;

    fn args(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_render_substitutes_variables() {
        let out = PromptTemplate::render(
            "Agents: {{$agents}} / History: {{ $history }}",
            &args(&[("agents", "A, B"), ("history", "none")]),
        );
        assert_eq!(out, "Agents: A, B / History: none");
    }

    #[test]
    fn test_render_without_sigil() {
        let out = PromptTemplate::render("{{name}}!", &args(&[("name", "Hi")]));
        assert_eq!(out, "Hi!");
    }

    #[test]
    fn test_render_unknown_variable_is_empty() {
        let out = PromptTemplate::render("[{{$missing}}]", &BTreeMap::new());
        assert_eq!(out, "[]");
    }

    #[test]
    fn test_render_unterminated_placeholder() {
        let out = PromptTemplate::render("keep {{$this", &BTreeMap::new());
        assert_eq!(out, "keep {{$this");
    }

    #[test]
    fn test_history_variable_labels_authors() {
        let mut transcript = Transcript::new();
        transcript.push(ChatMessage::user("Make dessert"));
        transcript.push(ChatMessage::participant("RecipeBuilder", "Crepes"));
        let history = PromptTemplate::history_variable(transcript.messages());
        assert_eq!(history, "USER: Make dessert\n\nRecipeBuilder: Crepes");
    }

    #[test]
    fn test_agents_variable_includes_descriptions() {
        let participants: Vec<Participant> = vec![
            Participant::new(Persona::new("Chef", "cook").with_description("cooks")).unwrap(),
            Participant::new(Persona::new("Critic", "review")).unwrap(),
        ];
        assert_eq!(
            PromptTemplate::agents_variable(&participants),
            "- Chef: cooks\n- Critic"
        );
    }

    #[test]
    fn test_strategy_templates_reference_both_variables() {
        for template in [
            PromptTemplate::selection_template(),
            PromptTemplate::termination_template(),
        ] {
            assert!(template.contains("{{$agents}}"));
            assert!(template.contains("{{$history}}"));
        }
        assert!(PromptTemplate::selection_template().contains("next_agent"));
        assert!(PromptTemplate::termination_template().contains("should_terminate"));
    }
}
