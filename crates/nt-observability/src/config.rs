use thiserror::Error;

/// Errors configuring or installing the global tracing subscriber.
#[derive(Debug, Error)]
pub enum LogError {
    #[error("unrecognised log format '{0}' (expected pretty, compact, or json)")]
    InvalidFormat(String),

    #[error("failed to install tracing subscriber: {0}")]
    Install(String),
}

/// Output rendering for tracing events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line, human-oriented (default for interactive terminals).
    #[default]
    Pretty,
    /// Single line per event, still human-oriented.
    Compact,
    /// Newline-delimited JSON, for log aggregation.
    Json,
}

impl LogFormat {
    pub fn from_str(s: &str) -> Result<Self, LogError> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            other => Err(LogError::InvalidFormat(other.to_string())),
        }
    }
}

/// Where tracing events are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogOutput {
    #[default]
    Stderr,
    Stdout,
}

/// Full tracing configuration for a single process lifetime.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub format: LogFormat,
    pub level: Option<String>,
    pub use_color: bool,
    pub use_timestamps: bool,
    pub include_thread_ids: bool,
    pub include_targets: bool,
    pub output: LogOutput,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            format: LogFormat::default(),
            level: None,
            use_color: true,
            use_timestamps: true,
            include_thread_ids: false,
            include_targets: false,
            output: LogOutput::default(),
        }
    }
}

impl LogConfig {
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = Some(level.into());
        self
    }

    pub fn with_color(mut self, use_color: bool) -> Self {
        self.use_color = use_color;
        self
    }

    pub fn with_timestamps(mut self, use_timestamps: bool) -> Self {
        self.use_timestamps = use_timestamps;
        self
    }

    pub fn with_thread_ids(mut self, include: bool) -> Self {
        self.include_thread_ids = include;
        self
    }

    pub fn with_targets(mut self, include: bool) -> Self {
        self.include_targets = include;
        self
    }

    pub fn with_output(mut self, output: LogOutput) -> Self {
        self.output = output;
        self
    }

    /// The level filter that will actually be applied: an explicit level on
    /// this config, else `RUST_LOG`, else `info`.
    pub fn get_effective_level(&self) -> String {
        if let Some(level) = &self.level {
            return level.clone();
        }
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string())
    }

    /// Build a config from `-v` repeat count: 0 = info, 1 = debug, 2+ = trace.
    pub fn from_verbosity(verbosity: u8) -> Self {
        let level = match verbosity {
            0 => "info",
            1 => "debug",
            _ => "trace",
        };
        LogConfig::default().with_level(level)
    }
}
