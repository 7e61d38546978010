use serde::{Deserialize, Serialize};

use super::dns::DnsConfig;
use super::errors::ConfigError;
use super::interception::InterceptionConfig;
use super::logging::LoggingConfig;

const LOCAL_CONFIG_PATH: &str = "warden.toml";
const SYSTEM_CONFIG_PATH: &str = "/etc/warden/config.toml";

/// Main configuration structure for Warden
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Secure DNS resolution
    #[serde(default)]
    pub dns: DnsConfig,

    /// Capture driver and telemetry polling
    #[serde(default)]
    pub interception: InterceptionConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. warden.toml in current directory
    /// 3. /etc/warden/config.toml
    /// 4. Default configuration
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if std::path::Path::new(LOCAL_CONFIG_PATH).exists() {
            Self::from_file(LOCAL_CONFIG_PATH)?
        } else if std::path::Path::new(SYSTEM_CONFIG_PATH).exists() {
            Self::from_file(SYSTEM_CONFIG_PATH)?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides);
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead {
                path: path.to_string(),
                reason: e.to_string(),
            })?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
        if let Some(store) = overrides.driver_store {
            self.interception.driver_store = store;
        }
        if !overrides.resolvers.is_empty() {
            self.dns.resolvers = overrides.resolvers;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dns.query_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "dns.query_timeout_ms cannot be 0".to_string(),
            ));
        }

        self.dns
            .resolver_descriptors()
            .map_err(ConfigError::Validation)?;

        if self.interception.poll_interval_ms == 0 {
            return Err(ConfigError::Validation(
                "interception.poll_interval_ms cannot be 0".to_string(),
            ));
        }

        if self.interception.packet_queue_size == 0 || self.interception.bandwidth_queue_size == 0 {
            return Err(ConfigError::Validation(
                "interception queue sizes must be greater than 0".to_string(),
            ));
        }

        if self.interception.driver_artifact.is_empty() {
            return Err(ConfigError::Validation(
                "interception.driver_artifact cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    pub fn save(&self, path: &str) -> Result<(), ConfigError> {
        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;
        std::fs::write(path, toml_string)
            .map_err(|e| ConfigError::FileWrite {
                path: path.to_string(),
                reason: e.to_string(),
            })?;
        Ok(())
    }

    /// Get the path to the configuration file being used
    pub fn get_config_path() -> Option<String> {
        if std::path::Path::new(LOCAL_CONFIG_PATH).exists() {
            Some(LOCAL_CONFIG_PATH.to_string())
        } else if std::path::Path::new(SYSTEM_CONFIG_PATH).exists() {
            Some(SYSTEM_CONFIG_PATH.to_string())
        } else {
            None
        }
    }
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub log_level: Option<String>,
    pub driver_store: Option<String>,
    pub resolvers: Vec<String>,
}
