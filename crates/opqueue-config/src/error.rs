//! Configuration errors.

use thiserror::Error;

/// Errors raised while loading `opqueue.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No configuration at {0}")]
    NotFound(String),

    #[error("Bad value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    #[error("${{{0}}} is referenced in the config but not set in the environment")]
    EnvVarNotSet(String),

    #[error("Cannot read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
}
