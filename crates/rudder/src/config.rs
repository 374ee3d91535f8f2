//! Configuration
//!
//! Loaded by merging, in override order: built-in defaults, an optional
//! TOML file, environment variables prefixed `RUDDER_`.

use std::env;
use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use rudder_core::HandlerFailurePolicy;
use rudder_domain::error::{Error, Result};

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = "rudder.toml";
/// Default environment prefix
pub const CONFIG_ENV_PREFIX: &str = "RUDDER";

/// Top-level configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RudderConfig {
    /// Interception engine settings
    pub interception: InterceptionConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

/// Interception engine settings.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterceptionConfig {
    /// What happens when a controller handler fails
    pub failure_policy: HandlerFailurePolicy,
}

/// Logging settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn or error
    pub level: String,
    /// Emit JSON-structured records instead of human-readable lines
    pub json_format: bool,
    /// Optional file to mirror log output into (daily rotation)
    pub file_output: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            file_output: None,
        }
    }
}

/// Configuration loader service.
#[derive(Clone)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
    env_prefix: String,
}

impl ConfigLoader {
    /// A loader with default settings
    pub fn new() -> Self {
        Self {
            config_path: None,
            env_prefix: CONFIG_ENV_PREFIX.to_string(),
        }
    }

    /// Set the configuration file path
    pub fn with_config_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the environment variable prefix
    pub fn with_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Load configuration from all sources.
    ///
    /// Sources merge in this order (later overrides earlier):
    /// 1. `RudderConfig::default()`
    /// 2. TOML configuration file, if present
    /// 3. Environment variables. The first underscore after the prefix
    ///    separates section from key, so `RUDDER_LOGGING_LEVEL` addresses
    ///    `logging.level` and `RUDDER_INTERCEPTION_FAILURE_POLICY`
    ///    addresses `interception.failure_policy`.
    pub fn load(&self) -> Result<RudderConfig> {
        let mut figment = Figment::new().merge(Serialized::defaults(RudderConfig::default()));

        if let Some(config_path) = &self.config_path {
            if config_path.exists() {
                figment = figment.merge(Toml::file(config_path));
                info!("Configuration loaded from {}", config_path.display());
            } else {
                warn!("Configuration file not found: {}", config_path.display());
            }
        } else if let Some(default_path) = Self::find_default_config_path() {
            figment = figment.merge(Toml::file(&default_path));
            info!("Configuration loaded from {}", default_path.display());
        }

        // only the first underscore nests, so snake_case leaf keys like
        // failure_policy stay addressable from the environment
        figment = figment.merge(
            Env::prefixed(&format!("{}_", self.env_prefix))
                .map(|key| key.as_str().replacen('_', ".", 1).into()),
        );

        let config: RudderConfig = figment
            .extract()
            .map_err(|e| Error::configuration_with_source("Failed to extract configuration", e))?;

        validate_config(&config)?;
        Ok(config)
    }

    /// Save a configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, config: &RudderConfig, path: P) -> Result<()> {
        let toml_string = toml::to_string_pretty(config).map_err(|e| {
            Error::configuration_with_source("Failed to serialize config to TOML", e)
        })?;
        std::fs::write(path.as_ref(), toml_string)
            .map_err(|e| Error::configuration_with_source("Failed to write config file", e))?;
        Ok(())
    }

    /// The configured file path, if any
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    fn find_default_config_path() -> Option<PathBuf> {
        let current_dir = env::current_dir().ok()?;
        let candidate = current_dir.join(DEFAULT_CONFIG_FILENAME);
        candidate.exists().then_some(candidate)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_config(config: &RudderConfig) -> Result<()> {
    crate::logging::parse_log_level(&config.logging.level)?;
    Ok(())
}
