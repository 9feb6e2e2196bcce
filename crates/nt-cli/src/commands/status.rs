//! `status`: report staged/unstaged/untracked paths without mutating
//! anything (§4.8, §6).

use crate::commands::{load_builder, CliError};
use crate::output;
use clap::Parser;

/// Show which files are staged, modified, or untracked
#[derive(Parser, Debug)]
pub struct StatusCmd {
    #[arg(value_name = "PATHSPEC")]
    pub pathspecs: Vec<String>,
}

impl StatusCmd {
    pub fn execute(&self) -> Result<(), CliError> {
        let builder = load_builder()?;
        let report = builder
            .status(&self.pathspecs)
            .map_err(|e| CliError::Internal(e.into()))?;

        if !report.staged.is_empty() {
            output::section("Changes to be committed:");
            for path in &report.staged {
                output::detail("staged", path);
            }
        }
        if !report.not_staged.is_empty() {
            output::section("Changes not staged for commit:");
            for path in &report.not_staged {
                output::detail("modified", path);
            }
        }
        if !report.untracked.is_empty() {
            output::section("Untracked files:");
            for path in &report.untracked {
                output::detail("untracked", path);
            }
        }
        if report.staged.is_empty() && report.not_staged.is_empty() && report.untracked.is_empty() {
            output::section("nothing to commit, working tree clean");
        }
        Ok(())
    }
}
