//! Participant entity

use crate::core::error::DomainError;
use crate::prompt::Persona;

/// A named member of the group chat (Entity)
///
/// The name is taken from the persona and never changes once the
/// participant is registered.
#[derive(Debug, Clone, PartialEq)]
pub struct Participant {
    persona: Persona,
}

impl Participant {
    /// Bind a persona to a new participant, validating it first
    pub fn new(persona: Persona) -> Result<Self, DomainError> {
        persona.validate()?;
        Ok(Self { persona })
    }

    pub fn name(&self) -> &str {
        &self.persona.name
    }

    pub fn description(&self) -> &str {
        &self.persona.description
    }

    pub fn persona(&self) -> &Persona {
        &self.persona
    }
}

impl std::fmt::Display for Participant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
