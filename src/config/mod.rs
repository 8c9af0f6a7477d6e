//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Prefix for environment overrides, e.g. `TRANSFER_MONITOR__MONITOR__DISMISS_DELAY_MS`
pub const ENV_PREFIX: &str = "TRANSFER_MONITOR";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub monitor: MonitorConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Delay between the first terminal transfer status and the automatic dismissal
    pub dismiss_delay_ms: u64,
}

impl MonitorConfig {
    pub fn dismiss_delay(&self) -> Duration {
        Duration::from_millis(self.dismiss_delay_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            monitor: MonitorConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            dismiss_delay_ms: 2000,
        }
    }
}

impl Config {
    /// Defaults, then the optional TOML file, then environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, ::config::ConfigError> {
        let mut builder =
            ::config::Config::builder().add_source(::config::Config::try_from(&Config::default())?);

        if let Some(path) = path {
            builder = builder.add_source(
                ::config::File::from(path)
                    .format(::config::FileFormat::Toml)
                    .required(false),
            );
        }

        builder
            .add_source(::config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()
    }

    /// Parse a TOML document layered over the defaults
    pub fn from_toml_str(toml: &str) -> Result<Self, ::config::ConfigError> {
        ::config::Config::builder()
            .add_source(::config::Config::try_from(&Config::default())?)
            .add_source(::config::File::from_str(toml, ::config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
