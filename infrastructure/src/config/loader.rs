//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Prefix for environment overrides (`RECIPE_CHAT_TERMINATION__MAXIMUM_ITERATIONS=4`)
pub const ENV_PREFIX: &str = "RECIPE_CHAT_";

/// Conventional Azure OpenAI variables and the `llm` keys they fill
const AZURE_ENV: [(&str, &str); 3] = [
    ("AZURE_OPENAI_ENDPOINT", "endpoint"),
    ("AZURE_OPENAI_DEPLOYMENT_NAME", "deployment"),
    ("AZURE_OPENAI_API_KEY", "api_key"),
];

const PROJECT_FILES: [&str; 2] = ["recipe-chat.toml", ".recipe-chat.toml"];

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `RECIPE_CHAT_*` environment variables (`__` separates sections)
    /// 2. `AZURE_OPENAI_*` environment variables
    /// 3. Explicit config path (if provided)
    /// 4. Project root: `./recipe-chat.toml` or `./.recipe-chat.toml`
    /// 5. Global: `$XDG_CONFIG_HOME/recipe-chat/config.toml`
    /// 6. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, Box<figment::Error>> {
        Self::with_environment(Self::file_figment(config_path))
            .extract()
            .map_err(Box::new)
    }

    fn with_environment(figment: Figment) -> Figment {
        figment
            .merge(Serialized::default("llm", Self::azure_overrides()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Defaults plus config files, without environment overrides
    fn file_figment(config_path: Option<&PathBuf>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            debug!("Merging global config {}", global_path.display());
            figment = figment.merge(Toml::file(&global_path));
        }

        if let Some(path) = Self::project_config_path() {
            debug!("Merging project config {}", path.display());
            figment = figment.merge(Toml::file(&path));
        }

        if let Some(path) = config_path {
            debug!("Merging explicit config {}", path.display());
            figment = figment.merge(Toml::file(path));
        }

        figment
    }

    /// `AZURE_OPENAI_*` values that are set and non-empty, keyed by `llm` field
    ///
    /// Read as plain strings so keys that look numeric stay strings.
    fn azure_overrides() -> std::collections::BTreeMap<&'static str, String> {
        AZURE_ENV
            .iter()
            .filter_map(|(var, key)| {
                std::env::var(var)
                    .ok()
                    .filter(|v| !v.trim().is_empty())
                    .map(|v| (*key, v))
            })
            .collect()
    }

    /// Defaults plus environment overrides, skipping every config file
    /// (for --no-config)
    pub fn load_defaults() -> Result<FileConfig, Box<figment::Error>> {
        Self::with_environment(Figment::new().merge(Serialized::defaults(FileConfig::default())))
            .extract()
            .map_err(Box::new)
    }

    /// Get the global config file path
    ///
    /// Returns XDG_CONFIG_HOME/recipe-chat/config.toml if set,
    /// otherwise falls back to ~/.config/recipe-chat/config.toml
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("recipe-chat").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Read a prompt template override
    pub fn read_template(path: &Path) -> std::io::Result<String> {
        std::fs::read_to_string(path)
    }

    /// Print the config file locations being used (for debugging)
    pub fn print_config_sources() {
        println!("Configuration sources (in priority order):");

        let overrides: Vec<_> = std::env::vars()
            .map(|(key, _)| key)
            .filter(|key| key.starts_with(ENV_PREFIX))
            .collect();
        if overrides.is_empty() {
            println!("  [     ] Env:     {ENV_PREFIX}*");
        } else {
            println!("  [FOUND] Env:     {}", overrides.join(", "));
        }

        for (var, _) in AZURE_ENV {
            let marker = if std::env::var(var).is_ok() { "FOUND" } else { "     " };
            println!("  [{marker}] Env:     {var}");
        }

        if let Some(path) = Self::project_config_path() {
            println!("  [FOUND] Project: {}", path.display());
        } else {
            println!("  [     ] Project: ./recipe-chat.toml or ./.recipe-chat.toml");
        }

        if let Some(path) = Self::global_config_path() {
            if path.exists() {
                println!("  [FOUND] Global:  {}", path.display());
            } else {
                println!("  [     ] Global:  {}", path.display());
            }
        }

        println!("  [     ] Default: built-in defaults");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults().unwrap();
        assert_eq!(config.termination.maximum_iterations, 10);
        assert!(config.termination.automatic_reset);
    }

    #[test]
    fn test_global_config_path_returns_some() {
        let path = ConfigLoader::global_config_path();
        assert!(path.is_some());
        let path = path.unwrap();
        assert!(path.to_string_lossy().contains("recipe-chat"));
    }

    #[test]
    fn test_explicit_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(
            &path,
            "[termination]\nhistory_window = 5\n\n[web]\nbind = \"0.0.0.0:8080\"\n",
        )
        .unwrap();

        let config: FileConfig = ConfigLoader::file_figment(Some(&path)).extract().unwrap();
        assert_eq!(config.termination.history_window, 5);
        assert_eq!(config.web.bind, "0.0.0.0:8080");
        assert_eq!(config.termination.maximum_iterations, 10);
    }
}
