//! `add`: walk, parse, pack, and stage (§4.7, §6).

use crate::commands::{load_builder, CliError};
use crate::output;
use clap::Parser;

/// Stage file contents for the next commit
#[derive(Parser, Debug)]
pub struct AddCmd {
    /// Path specs to add; `!`-prefixed specs exclude. Defaults to the
    /// whole workspace.
    #[arg(value_name = "PATHSPEC")]
    pub pathspecs: Vec<String>,
}

impl AddCmd {
    pub fn execute(&self) -> Result<(), CliError> {
        let builder = load_builder()?;
        let report = builder
            .add(&self.pathspecs)
            .map_err(|e| CliError::Internal(e.into()))?;

        for path in &report.staged {
            output::detail("staged", path);
        }
        for path in &report.removed {
            output::detail("removed", path);
        }

        if !report.parse_errors.is_empty() {
            for (path, error) in &report.parse_errors {
                output::error(&format!("{}: {}", path, error));
            }
            return Err(CliError::Internal(anyhow::anyhow!(
                "{} file(s) failed to parse",
                report.parse_errors.len()
            )));
        }

        if report.staged.is_empty() && report.removed.is_empty() {
            output::section("nothing to add");
        }
        Ok(())
    }
}
