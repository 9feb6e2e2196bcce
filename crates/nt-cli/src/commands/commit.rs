//! `commit`: flip staged entries to primary (§4.8, §6).

use crate::commands::{load_builder, CliError};
use crate::output;
use clap::Parser;

/// Flip staged pack files to committed
#[derive(Parser, Debug)]
pub struct CommitCmd {}

impl CommitCmd {
    pub fn execute(&self) -> Result<(), CliError> {
        let builder = load_builder()?;
        let report = builder.commit().map_err(|e| CliError::Internal(e.into()))?;

        if report.committed.is_empty() {
            output::section("nothing staged to commit");
        } else {
            for path in &report.committed {
                output::detail("committed", path);
            }
        }
        Ok(())
    }
}
