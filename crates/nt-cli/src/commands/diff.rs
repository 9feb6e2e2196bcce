//! `diff`: render the unified per-entity patch `nt_builder::diff` produces
//! (§4.8, §6), piping through `$PAGER` when output is a terminal.

use crate::commands::{load_builder, CliError};
use clap::Parser;
use std::io::Write;
use std::process::{Command, Stdio};

/// Show changes between the staged and committed (or working-tree) state
#[derive(Parser, Debug)]
pub struct DiffCmd {
    /// Compare committed vs staged instead of staged vs working tree
    #[arg(long)]
    pub staged: bool,

    #[arg(value_name = "PATHSPEC")]
    pub pathspecs: Vec<String>,
}

impl DiffCmd {
    pub fn execute(&self) -> Result<(), CliError> {
        let builder = load_builder()?;
        let diffs = builder
            .diff(self.staged, &self.pathspecs)
            .map_err(|e| CliError::Internal(e.into()))?;

        let rendered = nt_builder::render_diff(&diffs);
        if rendered.is_empty() {
            return Ok(());
        }
        page(&rendered)
    }
}

/// Write `text` to a `$PAGER` subprocess when stdout is a terminal and
/// `PAGER` is set (§6 "Environment variables"); otherwise print directly.
fn page(text: &str) -> Result<(), CliError> {
    let pager = std::env::var("PAGER").ok().filter(|p| !p.is_empty());
    let Some(pager) = pager else {
        print!("{text}");
        return Ok(());
    };
    if !console::Term::stdout().is_term() {
        print!("{text}");
        return Ok(());
    }

    let mut child = match Command::new(&pager).stdin(Stdio::piped()).spawn() {
        Ok(child) => child,
        Err(_) => {
            print!("{text}");
            return Ok(());
        }
    };
    if let Some(mut stdin) = child.stdin.take() {
        let _ = stdin.write_all(text.as_bytes());
    }
    let _ = child.wait();
    Ok(())
}
