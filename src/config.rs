//! Runtime configuration, persisted as TOML.
//!
//! ```toml
//! [engine]
//! strategy = "priority"
//! iteration_ceiling = 50
//!
//! [advisor]
//! timeout_ms = 10000
//! background_facts = false
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chain::EngineConfig;

/// Errors from loading configuration.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(destino::config::read),
        help("Ensure the config file exists and is valid TOML.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {path}: {message}")]
    #[diagnostic(
        code(destino::config::parse),
        help("Check the TOML syntax. Known tables are [engine] and [advisor].")
    )]
    Parse { path: String, message: String },

    #[error("invalid config: {message}")]
    #[diagnostic(
        code(destino::config::invalid),
        help("iteration_ceiling, repetition_window and timeout_ms must all be > 0.")
    )]
    Invalid { message: String },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Settings for the advisor that wraps the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisorSettings {
    /// Wall-clock budget for one inference run, in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Seed runs with the knowledge base's background facts.
    #[serde(default)]
    pub background_facts: bool,
    /// Replace the bundled rule file.
    #[serde(default)]
    pub knowledge_file: Option<PathBuf>,
    /// Replace the bundled destination catalog.
    #[serde(default)]
    pub destinations_file: Option<PathBuf>,
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl Default for AdvisorSettings {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            background_facts: false,
            knowledge_file: None,
            destinations_file: None,
        }
    }
}

impl AdvisorSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DestinoConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub advisor: AdvisorSettings,
}

impl DestinoConfig {
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content, &path.display().to_string())
    }

    /// Load `path` if given, otherwise use defaults.
    pub fn load_or_default(path: Option<&Path>) -> ConfigResult<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn from_toml_str(toml_str: &str, origin: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::Parse {
            path: origin.to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.engine
            .validate()
            .map_err(|e| ConfigError::Invalid {
                message: e.to_string(),
            })?;
        if self.advisor.timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                message: "timeout_ms must be > 0".into(),
            });
        }
        Ok(())
    }

    pub fn to_toml(&self) -> ConfigResult<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid {
            message: e.to_string(),
        })
    }
}
