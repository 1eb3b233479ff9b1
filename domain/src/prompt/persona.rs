//! Persona definitions
//!
//! A persona is the behaviour behind a participant: its instructions
//! template, the arguments substituted into that template and the model
//! execution settings used when it speaks.

use super::template::PromptTemplate;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Model execution settings attached to a persona
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionSettings {
    /// Sampling temperature (provider default when unset)
    pub temperature: Option<f32>,
    /// Upper bound on generated tokens (provider default when unset)
    pub max_tokens: Option<u32>,
}

/// A participant persona (Value Object)
///
/// Deserializes directly from a persona file:
///
/// ```
/// use recipe_chat_domain::Persona;
///
/// let persona: Persona = serde_json::from_value(serde_json::json!({
///     "name": "VeganReviewer",
///     "description": "Checks recipes for animal products",
///     "instructions": "You review recipes. Pantry: {{$pantry}}",
///     "arguments": { "pantry": "oats, lentils" }
/// }))
/// .unwrap();
///
/// assert_eq!(persona.system_prompt(), "You review recipes. Pantry: oats, lentils");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Persona {
    /// Participant name this persona speaks as
    pub name: String,
    /// Short description shown to the selection strategy
    #[serde(default)]
    pub description: String,
    /// Instructions template (`{{$name}}` placeholders)
    pub instructions: String,
    /// Values substituted into the instructions template
    #[serde(default)]
    pub arguments: BTreeMap<String, String>,
    #[serde(default)]
    pub execution_settings: ExecutionSettings,
}

impl Persona {
    pub fn new(name: impl Into<String>, instructions: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            instructions: instructions.into(),
            arguments: BTreeMap::new(),
            execution_settings: ExecutionSettings::default(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_argument(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    pub fn with_execution_settings(mut self, settings: ExecutionSettings) -> Self {
        self.execution_settings = settings;
        self
    }

    /// Render the instructions template into the system prompt
    pub fn system_prompt(&self) -> String {
        PromptTemplate::render(&self.instructions, &self.arguments)
    }

    /// Check that the persona can be bound to a participant
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::EmptyParticipantName);
        }
        if self.instructions.trim().is_empty() {
            return Err(DomainError::InvalidPersona(format!(
                "{} has no instructions",
                self.name
            )));
        }
        Ok(())
    }

    /// Built-in recipe builder persona
    pub fn recipe_builder() -> Self {
        Self::new("RecipeBuilder", PromptTemplate::recipe_builder_instructions())
            .with_description("Creates and revises recipes from the available ingredients")
            .with_argument("ingredients", PromptTemplate::default_ingredients().join(", "))
    }

    /// Built-in gluten-free reviewer persona
    pub fn gluten_free_reviewer() -> Self {
        Self::new(
            "GlutenFreeReviewer",
            PromptTemplate::gluten_free_reviewer_instructions(),
        )
        .with_description("Reviews recipes for gluten and suggests safe substitutions")
    }

    /// Built-in vegan reviewer persona
    pub fn vegan_reviewer() -> Self {
        Self::new("VeganReviewer", PromptTemplate::vegan_reviewer_instructions())
            .with_description("Reviews recipes for animal products and suggests plant-based swaps")
    }

    /// The default cast: one builder followed by the reviewers
    pub fn default_cast() -> Vec<Persona> {
        vec![
            Self::recipe_builder(),
            Self::gluten_free_reviewer(),
            Self::vegan_reviewer(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_renders_arguments() {
        let persona = Persona::new("Chef", "Cook with {{$ingredients}}.")
            .with_argument("ingredients", "eggs, milk");
        assert_eq!(persona.system_prompt(), "Cook with eggs, milk.");
    }

    #[test]
    fn test_builder_prompt_lists_ingredients() {
        let prompt = Persona::recipe_builder().system_prompt();
        for ingredient in PromptTemplate::default_ingredients() {
            assert!(prompt.contains(ingredient), "missing {ingredient}");
        }
        assert!(!prompt.contains("{{"));
    }

    #[test]
    fn test_validate_rejects_blank_fields() {
        assert_eq!(
            Persona::new("  ", "x").validate(),
            Err(DomainError::EmptyParticipantName)
        );
        assert!(matches!(
            Persona::new("Chef", "").validate(),
            Err(DomainError::InvalidPersona(_))
        ));
        assert!(Persona::recipe_builder().validate().is_ok());
    }

    #[test]
    fn test_default_cast_order() {
        let names: Vec<_> = Persona::default_cast().into_iter().map(|p| p.name).collect();
        assert_eq!(
            names,
            vec!["RecipeBuilder", "GlutenFreeReviewer", "VeganReviewer"]
        );
    }

    #[test]
    fn test_deserialize_defaults() {
        let persona: Persona = serde_json::from_str(
            r#"{"name": "Chef", "instructions": "Cook."}"#,
        )
        .unwrap();
        assert!(persona.description.is_empty());
        assert!(persona.arguments.is_empty());
        assert_eq!(persona.execution_settings, ExecutionSettings::default());
    }
}
