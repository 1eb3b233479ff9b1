//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain and adapter types where
//! appropriate.

use crate::openai::{ApiFlavor, OpenAiConfig};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("termination.maximum_iterations cannot be 0")]
    ZeroMaximumIterations,

    #[error("termination.history_window cannot be 0")]
    ZeroHistoryWindow,

    #[error("chat.generation_timeout_secs cannot be 0")]
    ZeroGenerationTimeout,

    #[error("selection.initial_participant cannot be empty")]
    EmptyInitialParticipant,

    #[error("selection.use_initial_as_fallback requires selection.initial_participant")]
    FallbackWithoutInitialParticipant,

    #[error("Missing LLM {setting}: set {env} or llm.{key} in the config file")]
    MissingLlmSetting {
        setting: &'static str,
        env: &'static str,
        key: &'static str,
    },
}

/// Raw LLM connection configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLlmConfig {
    /// `azure` or `openai`
    pub provider: ApiFlavor,
    /// Base URL of the service
    pub endpoint: Option<String>,
    /// Azure deployment name, or model name for OpenAI
    pub deployment: Option<String>,
    pub api_key: Option<String>,
    /// Azure REST API version
    pub api_version: String,
    /// TCP connect timeout in seconds
    pub connect_timeout_secs: u64,
}

impl Default for FileLlmConfig {
    fn default() -> Self {
        Self {
            provider: ApiFlavor::Azure,
            endpoint: None,
            deployment: None,
            api_key: None,
            api_version: crate::openai::DEFAULT_API_VERSION.to_string(),
            connect_timeout_secs: 30,
        }
    }
}

impl FileLlmConfig {
    /// Turn the raw settings into gateway settings, failing on the first
    /// missing value.
    pub fn resolve(&self) -> Result<OpenAiConfig, ConfigValidationError> {
        let endpoint = match (&self.endpoint, self.provider) {
            (Some(endpoint), _) if !endpoint.trim().is_empty() => endpoint.clone(),
            (_, ApiFlavor::OpenAi) => "https://api.openai.com/v1".to_string(),
            _ => {
                return Err(ConfigValidationError::MissingLlmSetting {
                    setting: "endpoint",
                    env: "AZURE_OPENAI_ENDPOINT",
                    key: "endpoint",
                });
            }
        };
        let deployment = required(
            &self.deployment,
            "deployment name",
            "AZURE_OPENAI_DEPLOYMENT_NAME",
            "deployment",
        )?;
        let api_key = required(&self.api_key, "API key", "AZURE_OPENAI_API_KEY", "api_key")?;

        Ok(OpenAiConfig {
            flavor: self.provider,
            endpoint,
            deployment,
            api_key,
            api_version: self.api_version.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
        })
    }
}

fn required(
    value: &Option<String>,
    setting: &'static str,
    env: &'static str,
    key: &'static str,
) -> Result<String, ConfigValidationError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or(ConfigValidationError::MissingLlmSetting { setting, env, key })
}

/// Raw chat configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileChatConfig {
    /// Directory of persona TOML files (built-in cast when unset)
    pub personas_dir: Option<PathBuf>,
    /// Upper bound on one participant reply, in seconds
    pub generation_timeout_secs: u64,
}

impl Default for FileChatConfig {
    fn default() -> Self {
        Self {
            personas_dir: None,
            generation_timeout_secs: 120,
        }
    }
}

/// Selection policy kinds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionPolicyKind {
    /// Model-backed classifier
    #[default]
    Prompt,
    /// Round-robin in registration order
    Sequential,
}

/// Raw selection configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSelectionConfig {
    pub policy: SelectionPolicyKind,
    pub initial_participant: Option<String>,
    pub use_initial_as_fallback: bool,
    /// Replaces the built-in selection prompt
    pub template_file: Option<PathBuf>,
}

impl Default for FileSelectionConfig {
    fn default() -> Self {
        Self {
            policy: SelectionPolicyKind::Prompt,
            initial_participant: Some("RecipeBuilder".to_string()),
            use_initial_as_fallback: true,
            template_file: None,
        }
    }
}

/// Termination policy kinds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerminationPolicyKind {
    /// Model-backed classifier
    #[default]
    Prompt,
    /// Stop when the latest reply approves
    Approval,
}

/// Raw termination configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileTerminationConfig {
    pub policy: TerminationPolicyKind,
    pub history_window: usize,
    pub maximum_iterations: usize,
    /// Participants whose turns are evaluated (all when unset)
    pub eligible_participants: Option<Vec<String>>,
    pub automatic_reset: bool,
    /// Replaces the built-in termination prompt
    pub template_file: Option<PathBuf>,
}

impl Default for FileTerminationConfig {
    fn default() -> Self {
        Self {
            policy: TerminationPolicyKind::Prompt,
            history_window: 3,
            maximum_iterations: 10,
            eligible_participants: None,
            automatic_reset: true,
            template_file: None,
        }
    }
}

/// Raw web hub configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileWebConfig {
    /// Address the hub listens on
    pub bind: String,
}

impl Default for FileWebConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5000".to_string(),
        }
    }
}

/// Raw logging configuration from TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Directory for JSONL conversation logs (disabled when unset)
    pub conversation_dir: Option<PathBuf>,
}

/// Raw output configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    /// Enable colored terminal output
    pub color: bool,
    /// Show a spinner while waiting for a reply
    pub show_progress: bool,
    /// Print selection and termination reasons
    pub show_decisions: bool,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            color: true,
            show_progress: true,
            show_decisions: true,
        }
    }
}

/// Complete file configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub llm: FileLlmConfig,
    pub chat: FileChatConfig,
    pub selection: FileSelectionConfig,
    pub termination: FileTerminationConfig,
    pub web: FileWebConfig,
    pub logging: FileLoggingConfig,
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the settings that do not depend on the LLM connection
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.termination.maximum_iterations == 0 {
            return Err(ConfigValidationError::ZeroMaximumIterations);
        }
        if self.termination.history_window == 0 {
            return Err(ConfigValidationError::ZeroHistoryWindow);
        }
        if self.chat.generation_timeout_secs == 0 {
            return Err(ConfigValidationError::ZeroGenerationTimeout);
        }
        match &self.selection.initial_participant {
            Some(name) if name.trim().is_empty() => {
                return Err(ConfigValidationError::EmptyInitialParticipant);
            }
            None if self.selection.use_initial_as_fallback => {
                return Err(ConfigValidationError::FallbackWithoutInitialParticipant);
            }
            _ => {}
        }
        Ok(())
    }

    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.chat.generation_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = FileConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.termination.history_window, 3);
        assert_eq!(config.termination.maximum_iterations, 10);
        assert_eq!(config.generation_timeout(), Duration::from_secs(120));
        assert_eq!(
            config.selection.initial_participant.as_deref(),
            Some("RecipeBuilder")
        );
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: FileConfig = toml::from_str(
            r#"
[llm]
provider = "openai"
deployment = "gpt-4o-mini"

[termination]
policy = "approval"
maximum_iterations = 4
eligible_participants = ["VeganReviewer"]
"#,
        )
        .unwrap();

        assert_eq!(config.llm.provider, ApiFlavor::OpenAi);
        assert_eq!(config.termination.policy, TerminationPolicyKind::Approval);
        assert_eq!(config.termination.maximum_iterations, 4);
        // Unset fields keep their defaults
        assert_eq!(config.termination.history_window, 3);
        assert_eq!(config.selection.policy, SelectionPolicyKind::Prompt);
    }

    #[test]
    fn test_validation_errors() {
        let mut config = FileConfig::default();
        config.termination.maximum_iterations = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::ZeroMaximumIterations)
        ));

        let mut config = FileConfig::default();
        config.selection.initial_participant = None;
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::FallbackWithoutInitialParticipant)
        ));
    }

    #[test]
    fn test_llm_resolve_reports_missing_settings() {
        let llm = FileLlmConfig::default();
        let err = llm.resolve().unwrap_err();
        assert!(err.to_string().contains("AZURE_OPENAI_ENDPOINT"));

        let llm = FileLlmConfig {
            endpoint: Some("https://chef.openai.azure.com".to_string()),
            deployment: Some("gpt-4o".to_string()),
            ..Default::default()
        };
        let err = llm.resolve().unwrap_err();
        assert!(err.to_string().contains("AZURE_OPENAI_API_KEY"));
    }

    #[test]
    fn test_llm_resolve_openai_defaults_endpoint() {
        let llm = FileLlmConfig {
            provider: ApiFlavor::OpenAi,
            deployment: Some("gpt-4o".to_string()),
            api_key: Some("sk-test".to_string()),
            ..Default::default()
        };
        let resolved = llm.resolve().unwrap();
        assert_eq!(
            resolved.chat_url(),
            "https://api.openai.com/v1/chat/completions"
        );
    }
}
