//! Runtime configuration
//!
//! Loaded from `sqlpilot.toml` in the home directory. Every field has a
//! default, so a missing file (or a missing section) is not an error.
//!
//! ```toml
//! [llm]
//! provider = "ollama"          # or "stub"
//! host = "127.0.0.1"
//! port = 11434
//! generation_model = "sqls"
//! validation_model = "checker"
//! timeout_secs = 60
//!
//! [store]
//! path = "sqlpilot.db"         # relative paths resolve against home
//! schema_context = true
//!
//! [audit]
//! log_dir = "logs"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Config file name inside the home directory
pub const CONFIG_FILE_NAME: &str = "sqlpilot.toml";

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub llm: LlmConfig,
    pub store: StoreConfig,
    pub audit: AuditConfig,
}

/// `[llm]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: String,
    pub host: String,
    pub port: u16,
    pub generation_model: String,
    pub validation_model: String,
    pub timeout_secs: u64,
}

/// `[store]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite database file
    pub path: PathBuf,

    /// Embed the rendered schema in generation prompts
    pub schema_context: bool,
}

/// `[audit]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    pub log_dir: PathBuf,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            host: "127.0.0.1".to_string(),
            port: 11434,
            generation_model: "sqls".to_string(),
            validation_model: "checker".to_string(),
            timeout_secs: 60,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("sqlpilot.db"),
            schema_context: true,
        }
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("logs"),
        }
    }
}

impl Config {
    /// Parse TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `<home>/sqlpilot.toml`, falling back to defaults when absent
    ///
    /// Relative store and log paths are resolved against `home`.
    pub fn load(home: &Path) -> Result<Self, ConfigError> {
        let path = home.join(CONFIG_FILE_NAME);
        let config = if path.exists() {
            let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })?;
            info!(path = %path.display(), "Loaded configuration");
            Self::from_toml_str(&text)?
        } else {
            debug!(path = %path.display(), "No config file, using defaults");
            Self::default()
        };
        Ok(config.resolve_paths(home))
    }

    /// Anchor relative paths at `home`
    pub fn resolve_paths(mut self, home: &Path) -> Self {
        if self.store.path.is_relative() {
            self.store.path = home.join(&self.store.path);
        }
        if self.audit.log_dir.is_relative() {
            self.audit.log_dir = home.join(&self.audit.log_dir);
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "llm.timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.llm.provider.trim().is_empty() {
            return Err(ConfigError::Invalid("llm.provider cannot be empty".to_string()));
        }
        Ok(())
    }
}
