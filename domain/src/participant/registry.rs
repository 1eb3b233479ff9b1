//! Participant registry

use super::entities::Participant;
use crate::core::error::DomainError;
use crate::prompt::Persona;

/// The fixed set of conversation participants (Aggregate)
///
/// Registration order is preserved: it is the order shown to strategies
/// and the rotation order of sequential selection. Names are unique.
#[derive(Debug, Clone)]
pub struct ParticipantRegistry {
    participants: Vec<Participant>,
}

impl ParticipantRegistry {
    pub fn new(participants: Vec<Participant>) -> Result<Self, DomainError> {
        if participants.is_empty() {
            return Err(DomainError::EmptyRegistry);
        }

        for (i, participant) in participants.iter().enumerate() {
            if participants[..i]
                .iter()
                .any(|p| p.name() == participant.name())
            {
                return Err(DomainError::DuplicateParticipant(
                    participant.name().to_string(),
                ));
            }
        }

        Ok(Self { participants })
    }

    /// Build a registry directly from personas
    pub fn from_personas(personas: Vec<Persona>) -> Result<Self, DomainError> {
        let participants = personas
            .into_iter()
            .map(Participant::new)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(participants)
    }

    /// Exact lookup by name
    pub fn get(&self, name: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.name() == name)
    }

    /// Resolve a name produced by a strategy.
    ///
    /// Surrounding whitespace is ignored. An exact match wins; otherwise a
    /// single case-insensitive match is accepted.
    pub fn resolve(&self, name: &str) -> Result<&Participant, DomainError> {
        let wanted = name.trim();
        if let Some(participant) = self.get(wanted) {
            return Ok(participant);
        }

        let mut matches = self
            .participants
            .iter()
            .filter(|p| p.name().eq_ignore_ascii_case(wanted));
        match (matches.next(), matches.next()) {
            (Some(participant), None) => Ok(participant),
            _ => Err(DomainError::UnknownParticipant(wanted.to_string())),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Registration index of a participant
    pub fn position(&self, name: &str) -> Option<usize> {
        self.participants.iter().position(|p| p.name() == name)
    }

    /// Resolve a list of names into participants, failing on the first unknown name
    pub fn subset<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<&Participant>, DomainError> {
        names
            .iter()
            .map(|name| {
                self.get(name.as_ref())
                    .ok_or_else(|| DomainError::UnknownParticipant(name.as_ref().to_string()))
            })
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Participant> {
        self.participants.iter()
    }

    pub fn as_slice(&self) -> &[Participant] {
        &self.participants
    }

    pub fn names(&self) -> Vec<&str> {
        self.participants.iter().map(|p| p.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    /// Always false for a constructed registry; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ParticipantRegistry {
        ParticipantRegistry::from_personas(Persona::default_cast()).unwrap()
    }

    #[test]
    fn test_empty_registry_is_rejected() {
        assert_eq!(
            ParticipantRegistry::new(vec![]).unwrap_err(),
            DomainError::EmptyRegistry
        );
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let result = ParticipantRegistry::from_personas(vec![
            Persona::new("Chef", "a"),
            Persona::new("Critic", "b"),
            Persona::new("Chef", "c"),
        ]);
        assert_eq!(
            result.unwrap_err(),
            DomainError::DuplicateParticipant("Chef".to_string())
        );
    }

    #[test]
    fn test_resolve_exact_and_trimmed() {
        let registry = registry();
        assert_eq!(registry.resolve("VeganReviewer").unwrap().name(), "VeganReviewer");
        assert_eq!(
            registry.resolve("  RecipeBuilder\n").unwrap().name(),
            "RecipeBuilder"
        );
    }

    #[test]
    fn test_resolve_case_insensitive_fallback() {
        let registry = registry();
        assert_eq!(
            registry.resolve("glutenfreereviewer").unwrap().name(),
            "GlutenFreeReviewer"
        );
    }

    #[test]
    fn test_resolve_ambiguous_case_is_unknown() {
        let registry = ParticipantRegistry::from_personas(vec![
            Persona::new("chef", "a"),
            Persona::new("Chef", "b"),
        ])
        .unwrap();
        assert!(registry.resolve("CHEF").is_err());
        assert_eq!(registry.resolve("Chef").unwrap().name(), "Chef");
    }

    #[test]
    fn test_resolve_unknown() {
        assert_eq!(
            registry().resolve("Nonexistent").unwrap_err(),
            DomainError::UnknownParticipant("Nonexistent".to_string())
        );
    }

    #[test]
    fn test_subset_and_positions() {
        let registry = registry();
        let reviewers = registry
            .subset(&["GlutenFreeReviewer", "VeganReviewer"])
            .unwrap();
        assert_eq!(reviewers.len(), 2);
        assert_eq!(registry.position("VeganReviewer"), Some(2));
        assert!(registry.subset(&["Sommelier"]).is_err());
        assert_eq!(
            registry.names(),
            vec!["RecipeBuilder", "GlutenFreeReviewer", "VeganReviewer"]
        );
    }
}
