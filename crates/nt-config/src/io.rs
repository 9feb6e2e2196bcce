use crate::error::ConfigError;
use crate::schema::Config;
use crate::validation::Validate;
use std::path::Path;
use tracing::{debug, info};

/// Load `<state_dir>/config` if present, validating it; falls back to
/// [`Config::default`] when no file exists yet (a fresh `init` has not
/// written one).
pub fn load(config_path: &Path) -> Result<Config, ConfigError> {
    if !config_path.exists() {
        debug!(path = %config_path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }

    let raw = std::fs::read_to_string(config_path)?;
    let config: Config = toml::from_str(&raw)?;
    config.validate()?;
    info!(path = %config_path.display(), "loaded configuration");
    Ok(config)
}

/// Serialise `config` and write it to `config_path`, creating parent
/// directories as needed.
pub fn save(config_path: &Path, config: &Config) -> Result<(), ConfigError> {
    config.validate()?;
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let rendered = toml::to_string_pretty(config)?;
    std::fs::write(config_path, rendered)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_default_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = load(&dir.path().join("config")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn save_then_load_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config");
        let mut config = Config::default();
        config.engine.parallel_workers = 4;
        save(&path, &config).unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(loaded.engine.parallel_workers, 4);
    }

    #[test]
    fn unknown_keys_are_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config");
        std::fs::write(&path, "unknown_future_field = true\n\n[engine]\nparallel_workers = 2\n")
            .unwrap();
        let loaded = load(&path).unwrap();
        assert_eq!(loaded.engine.parallel_workers, 2);
    }
}
