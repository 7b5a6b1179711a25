//! Configuration management for md2rfc.
//!
//! Parses `md2rfc.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! Configuration sections:
//!
//! - `[output]` - output mode (`standalone`)
//! - `[document]` - defaults merged into title blocks that omit them
//!   (`ipr`, `category`)

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override standalone output mode.
    pub standalone: Option<bool>,
    /// Override the default IPR value.
    pub ipr: Option<String>,
    /// Override the default document category.
    pub category: Option<String>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "md2rfc.toml";

/// Document categories accepted by xml2rfc.
const CATEGORIES: [&str; 5] = ["std", "bcp", "info", "exp", "historic"];

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Output configuration.
    pub output: OutputConfig,
    /// Document defaults.
    pub document: DocumentConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Output configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Whether to emit a complete document with preamble and `<rfc>` envelope.
    ///
    /// When false, only inner block markup is produced, suitable for
    /// inclusion in a larger document.
    pub standalone: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { standalone: true }
    }
}

/// Document defaults merged into title blocks that omit them.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Default IPR declaration.
    pub ipr: String,
    /// Default document category.
    pub category: String,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            ipr: "trust200902".to_owned(),
            category: "info".to_owned(),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a known document category.
fn require_category(value: &str) -> Result<(), ConfigError> {
    if !CATEGORIES.contains(&value) {
        return Err(ConfigError::Validation(format!(
            "document.category must be one of {CATEGORIES:?}, got \"{value}\""
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `md2rfc.toml` in current directory and parents,
    /// falling back to defaults when nothing is found.
    ///
    /// CLI settings are applied after loading, allowing CLI arguments to take
    /// precedence over config file values. Validation runs last, so invalid
    /// overrides are rejected the same way invalid file values are.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the final values fail validation.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(standalone) = settings.standalone {
            self.output.standalone = standalone;
        }
        if let Some(ipr) = &settings.ipr {
            self.document.ipr.clone_from(ipr);
        }
        if let Some(category) = &settings.category {
            self.document.category.clone_from(category);
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically at the end of [`Config::load`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.document.ipr, "document.ipr")?;
        require_category(&self.document.category)?;
        Ok(())
    }
}
