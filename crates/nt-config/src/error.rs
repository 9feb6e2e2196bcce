use thiserror::Error;

/// Errors loading, parsing, or validating workspace configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error reading configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config.toml: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config.toml: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

impl ConfigError {
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
