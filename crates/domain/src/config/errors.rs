use thiserror::Error;

/// Failure loading, checking or saving `warden.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {reason}")]
    FileRead { path: String, reason: String },

    #[error("cannot write config file {path}: {reason}")]
    FileWrite { path: String, reason: String },

    #[error("invalid config syntax: {0}")]
    Parse(String),

    #[error("cannot serialize config: {0}")]
    Serialize(String),

    #[error("invalid config: {0}")]
    Validation(String),
}
