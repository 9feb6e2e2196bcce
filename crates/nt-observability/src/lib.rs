//! Tracing setup shared by `nt` and any tooling built on top of it.
//!
//! A workspace operator controls verbosity with `-v`/`-vv`/`-vvv` on the
//! CLI; everything else (format, color, timestamps) comes from here so the
//! behaviour is identical across commands.

mod config;
mod initialization;

pub use config::{LogConfig, LogError, LogFormat, LogOutput};
pub use initialization::{init_tracing, init_tracing_with_config};

pub use tracing::{debug, error, info, trace, warn};
