//! Monitor Configuration Module
//!
//! Loads the configuration shared by the `readout` tools from an optional
//! TOML file, overridden by `READOUT_`-prefixed environment variables.
//! Nested keys use a double underscore: `READOUT_ANALYZER__OUTPUT_INTERVAL`
//! sets `[analyzer] output_interval`.

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat, Map};
use readout_codec::AnalyzerConfig;
use readout_network::{PublisherConfig, SubscriberConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Environment variable prefix
pub const ENV_PREFIX: &str = "READOUT";

/// Logging settings for the tools
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter directive, e.g. `info` or `readout_network=debug`
    pub level: String,
    /// Emit JSON log lines
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Complete tool configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub analyzer: AnalyzerConfig,
    pub subscriber: SubscriberConfig,
    pub publisher: PublisherConfig,
    pub logging: LoggingConfig,
}

impl MonitorConfig {
    /// Load from `path` (if given) and the process environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    /// Load with an explicit environment map instead of the process environment
    pub fn load_with_env(path: Option<&Path>, env: Option<Map<String, String>>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            info!("Loading configuration: {:?}", path);
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let mut config: MonitorConfig = builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.expand_env_vars()?;
        config.validate()?;
        debug!(?config, "Configuration loaded");
        Ok(config)
    }

    /// Parse TOML text, without environment overrides
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let mut config: MonitorConfig = Config::builder()
            .add_source(File::from_str(text, FileFormat::Toml))
            .build()
            .context("Failed to parse configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        config.expand_env_vars()?;
        config.validate()?;
        Ok(config)
    }

    /// Expand `$VAR` / `${VAR}` and `~` in addresses and the output prefix
    pub fn expand_env_vars(&mut self) -> Result<()> {
        self.subscriber.address = expand(&self.subscriber.address)
            .context("Failed to expand subscriber address")?;
        self.publisher.bind_address = expand(&self.publisher.bind_address)
            .context("Failed to expand publisher bind address")?;
        self.analyzer.output_prefix = expand(&self.analyzer.output_prefix)
            .context("Failed to expand output prefix")?;
        Ok(())
    }

    /// Reject values the components would refuse at construction
    pub fn validate(&self) -> Result<()> {
        self.analyzer
            .output_interval()
            .context("Invalid [analyzer] section")?;
        if self.subscriber.max_message_size == 0 {
            anyhow::bail!("Invalid [subscriber] section: max_message_size must be positive");
        }
        if self.publisher.max_message_size == 0 {
            anyhow::bail!("Invalid [publisher] section: max_message_size must be positive");
        }
        Ok(())
    }
}

fn expand(value: &str) -> Result<String> {
    Ok(shellexpand::full(value)?.into_owned())
}
