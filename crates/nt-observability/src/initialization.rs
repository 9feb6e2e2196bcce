use crate::config::{LogConfig, LogError, LogFormat, LogOutput};
use tracing_subscriber::{fmt, EnvFilter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Registry;

/// Install a global subscriber with sensible defaults for `format` and an
/// optional explicit level (falling back to `RUST_LOG`, then `info`).
pub fn init_tracing(format: LogFormat, level: Option<&str>) -> Result<(), LogError> {
    let mut config = LogConfig::default().with_format(format);
    if let Some(level) = level {
        config = config.with_level(level);
    }
    init_tracing_with_config(config)
}

/// Install a global subscriber from a fully specified [`LogConfig`].
pub fn init_tracing_with_config(config: LogConfig) -> Result<(), LogError> {
    let env_filter = build_env_filter(&config.get_effective_level())?;

    let result = match config.format {
        LogFormat::Pretty => {
            let layer = fmt::layer()
                .with_ansi(config.use_color)
                .with_thread_ids(config.include_thread_ids)
                .with_target(config.include_targets)
                .with_writer(get_writer(config.output));
            Registry::default().with(env_filter).with(layer).try_init()
        }
        LogFormat::Compact => {
            let layer = fmt::layer()
                .compact()
                .with_ansi(config.use_color)
                .with_thread_ids(config.include_thread_ids)
                .with_target(config.include_targets)
                .with_writer(get_writer(config.output));
            Registry::default().with(env_filter).with(layer).try_init()
        }
        LogFormat::Json => {
            let layer = fmt::layer()
                .json()
                .with_thread_ids(config.include_thread_ids)
                .with_target(config.include_targets)
                .with_writer(get_writer(config.output));
            Registry::default().with(env_filter).with(layer).try_init()
        }
    };

    result.map_err(|e| LogError::Install(e.to_string()))
}

fn get_writer(output: LogOutput) -> fn() -> Box<dyn std::io::Write> {
    match output {
        LogOutput::Stderr => || Box::new(std::io::stderr()),
        LogOutput::Stdout => || Box::new(std::io::stdout()),
    }
}

fn build_env_filter(level: &str) -> Result<EnvFilter, LogError> {
    EnvFilter::try_new(level).map_err(|e| LogError::Install(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_filter_for_each_level() {
        for level in ["error", "warn", "info", "debug", "trace"] {
            assert!(build_env_filter(level).is_ok());
        }
    }

    #[test]
    fn effective_level_falls_back_to_info() {
        std::env::remove_var("RUST_LOG");
        let config = LogConfig::default();
        assert_eq!(config.get_effective_level(), "info");
    }

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(LogConfig::from_verbosity(0).level.as_deref(), Some("info"));
        assert_eq!(LogConfig::from_verbosity(1).level.as_deref(), Some("debug"));
        assert_eq!(LogConfig::from_verbosity(5).level.as_deref(), Some("trace"));
    }
}
