use crate::error::ConfigError;
use crate::schema::Config;

/// Checks a loaded configuration is internally consistent before it's used
/// to drive the builder or remote sync.
pub trait Validate {
    fn validate(&self) -> Result<(), ConfigError>;
}

impl Validate for Config {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.engine.parallel_workers == 0 {
            return Err(ConfigError::invalid_value(
                "engine.parallel_workers",
                "must be at least 1",
            ));
        }
        if self.notes.kinds.is_empty() {
            return Err(ConfigError::invalid_value(
                "notes.kinds",
                "must recognise at least one note kind",
            ));
        }
        if let Some(remote) = &self.remote {
            if remote.url.trim().is_empty() {
                return Err(ConfigError::invalid_value("remote.url", "must not be empty"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn zero_workers_is_invalid() {
        let mut config = Config::default();
        config.engine.parallel_workers = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_note_kinds_is_invalid() {
        let mut config = Config::default();
        config.notes.kinds.clear();
        assert!(config.validate().is_err());
    }
}
