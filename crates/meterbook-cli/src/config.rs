//! # CLI Configuration
//!
//! Loaded from the YAML file named by `--config`, or defaults when absent,
//! then overridden by environment variables:
//!
//! - `METERBOOK_CATALOGUE`: default catalogue file for `validate` and `presets`
//! - `METERBOOK_ROOT_CONTEXT`: top-level error context (default `meter`)
//! - `METERBOOK_LOG_JSON`: `1`/`true` for JSON log output
//!
//! ```yaml
//! root_context: meter
//! catalogue: ./catalogue.yaml
//! install_presets: true
//! log:
//!   filter: meterbook_validate=debug
//!   json: false
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MeterbookConfig {
    /// Root of every error context path.
    pub root_context: String,
    /// Catalogue used when `validate` or `presets` is not given `--catalogue`.
    pub catalogue: Option<PathBuf>,
    /// Add the built-in presets to every loaded catalogue. `presets` lists
    /// them alongside any presets the catalogue file declares.
    pub install_presets: bool,
    pub log: LogConfig,
}

impl Default for MeterbookConfig {
    fn default() -> Self {
        Self {
            root_context: "meter".to_string(),
            catalogue: None,
            install_presets: true,
            log: LogConfig::default(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// `EnvFilter` directive. Takes precedence over `-v` and `RUST_LOG`.
    pub filter: Option<String>,
    /// Emit JSON lines instead of human-readable logs.
    pub json: bool,
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid value for {var}: {value:?}")]
    InvalidEnv { var: &'static str, value: String },
}

impl MeterbookConfig {
    /// Load from `path` (or defaults), then apply process environment
    /// overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|var| std::env::var(var).ok())?;
        Ok(config)
    }

    /// Parse a YAML config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply overrides looked up through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(catalogue) = lookup("METERBOOK_CATALOGUE") {
            self.catalogue = Some(PathBuf::from(catalogue));
        }
        if let Some(root) = lookup("METERBOOK_ROOT_CONTEXT") {
            self.root_context = root;
        }
        if let Some(json) = lookup("METERBOOK_LOG_JSON") {
            self.log.json = parse_flag(&json).ok_or(ConfigError::InvalidEnv {
                var: "METERBOOK_LOG_JSON",
                value: json.clone(),
            })?;
        }
        Ok(())
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
