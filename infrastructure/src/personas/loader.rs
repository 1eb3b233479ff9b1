//! Persona loader

use recipe_chat_domain::{DomainError, Persona};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Errors raised while loading persona files
#[derive(Debug, Error)]
pub enum PersonaLoadError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid persona file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid persona in {path}: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: DomainError,
    },

    #[error("No persona files (*.toml) found in {0}")]
    Empty(PathBuf),
}

/// Loads personas from a directory of TOML files
pub struct PersonaLoader;

impl PersonaLoader {
    /// Load every `*.toml` file in `dir`, ordered by file name.
    ///
    /// File order becomes registration order, so prefixes such as
    /// `01-builder.toml` control turn order for sequential selection.
    pub fn load_dir(dir: &Path) -> Result<Vec<Persona>, PersonaLoadError> {
        let entries = std::fs::read_dir(dir).map_err(|source| PersonaLoadError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| PersonaLoadError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "toml") {
                paths.push(path);
            }
        }
        paths.sort();

        if paths.is_empty() {
            return Err(PersonaLoadError::Empty(dir.to_path_buf()));
        }

        let personas = paths
            .iter()
            .map(|path| Self::load_file(path))
            .collect::<Result<Vec<_>, _>>()?;
        info!("Loaded {} personas from {}", personas.len(), dir.display());
        Ok(personas)
    }

    /// Load and validate a single persona file
    pub fn load_file(path: &Path) -> Result<Persona, PersonaLoadError> {
        let content = std::fs::read_to_string(path).map_err(|source| PersonaLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let persona: Persona = toml::from_str(&content).map_err(|source| PersonaLoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        persona.validate().map_err(|source| PersonaLoadError::Invalid {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded persona {} from {}", persona.name, path.display());
        Ok(persona)
    }

    /// Personas from `dir` when given, otherwise the built-in cast
    pub fn load_or_default(dir: Option<&Path>) -> Result<Vec<Persona>, PersonaLoadError> {
        match dir {
            Some(dir) => Self::load_dir(dir),
            None => Ok(Persona::default_cast()),
        }
    }
}
