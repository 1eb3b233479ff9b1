//! Configuration file loading for recipe-chat
//!
//! This module handles file I/O and merging of configuration from multiple
//! sources. The priority order (highest to lowest):
//!
//! 1. `RECIPE_CHAT_*` environment variables
//! 2. `AZURE_OPENAI_ENDPOINT`, `AZURE_OPENAI_DEPLOYMENT_NAME`, `AZURE_OPENAI_API_KEY`
//! 3. `--config <path>` specified file
//! 4. Project root: `./recipe-chat.toml` or `./.recipe-chat.toml`
//! 5. Global: `~/.config/recipe-chat/config.toml`
//! 6. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileChatConfig, FileConfig, FileLlmConfig, FileLoggingConfig,
    FileOutputConfig, FileSelectionConfig, FileTerminationConfig, FileWebConfig,
    SelectionPolicyKind, TerminationPolicyKind,
};
pub use loader::{ConfigLoader, ENV_PREFIX};
