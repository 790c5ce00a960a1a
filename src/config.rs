//! Configuration loading
//!
//! Layered, lowest precedence first:
//! 1. built-in defaults
//! 2. a TOML file: the explicit path, else `DONOTATION_CONFIG_PATH`, else
//!    `donotation.toml` in the working directory (optional)
//! 3. `DONOTATION__*` environment variables, e.g.
//!    `DONOTATION__VALIDATION__WARNINGS_AS_ERRORS=true`

use std::env;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const CONFIG_PATH_ENV: &str = "DONOTATION_CONFIG_PATH";
const DEFAULT_CONFIG_FILE: &str = "donotation.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Default tracing filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Refuse to compile bodies that only have warnings
    #[serde(default)]
    pub warnings_as_errors: bool,
}

impl Config {
    /// Load configuration; an explicitly given file must exist.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut builder = config::Config::builder().add_source(
            config::Config::try_from(&Config::default()).context("Failed to encode defaults")?,
        );

        builder = match path {
            Some(path) => builder.add_source(config::File::with_name(path).required(true)),
            None => {
                let path = env::var(CONFIG_PATH_ENV).ok();
                let required = path.is_some();
                let path = path.unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());
                builder.add_source(config::File::with_name(&path).required(required))
            }
        };

        builder = builder.add_source(
            config::Environment::with_prefix("DONOTATION")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        builder
            .build()
            .context("Failed to load configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }
}
