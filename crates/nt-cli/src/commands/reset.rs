//! `reset`: discard staged state (§4.8, §6).

use crate::commands::{load_builder, CliError};
use crate::output;
use clap::Parser;

/// Discard staged changes, restoring the index's committed state
#[derive(Parser, Debug)]
pub struct ResetCmd {
    #[arg(value_name = "PATHSPEC")]
    pub pathspecs: Vec<String>,
}

impl ResetCmd {
    pub fn execute(&self) -> Result<(), CliError> {
        let builder = load_builder()?;
        let report = builder
            .reset(&self.pathspecs)
            .map_err(|e| CliError::Internal(e.into()))?;

        for path in &report.unstaged {
            output::detail("unstaged", path);
        }
        for path in &report.dropped {
            output::detail("dropped", path);
        }
        if report.unstaged.is_empty() && report.dropped.is_empty() {
            output::section("nothing to reset");
        }
        Ok(())
    }
}
