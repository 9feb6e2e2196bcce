//! `pull`: download remote packs this workspace lacks and apply them
//! locally (§4.9, §6).

use crate::commands::{load_builder, CliError};
use crate::output;
use clap::Parser;

/// Fetch and apply remote packs the local workspace lacks
#[derive(Parser, Debug)]
pub struct PullCmd {
    /// Also clear the staged shadow of any path the remote touched
    #[arg(long)]
    pub force: bool,

    /// Prompt before clearing staged local changes
    #[arg(long)]
    pub interactive: bool,
}

impl PullCmd {
    pub async fn execute(&self) -> Result<(), CliError> {
        let builder = load_builder()?;
        let remote = builder
            .config()
            .remote
            .as_ref()
            .ok_or_else(|| CliError::UserInput("no remote configured (set [remote] in config)".to_string()))?;

        let backend = nt_sync::backend_from_config(remote, builder.state_dir())
            .await
            .map_err(|e| CliError::Internal(e.into()))?;

        let force = if self.interactive && !self.force {
            dialoguer::Confirm::new()
                .with_prompt("clear local staged changes touched by this pull?")
                .default(false)
                .interact()
                .map_err(|e| CliError::Internal(e.into()))?
        } else {
            self.force
        };

        let database_path = builder.state_dir().join(nt_builder::DATABASE_FILE_NAME);
        let report = nt_sync::pull(builder.state_dir(), &database_path, backend.as_ref(), force)
            .await
            .map_err(|e| CliError::Internal(e.into()))?;

        for path in &report.updated {
            output::detail("updated", path);
        }
        output::detail("blobs fetched", &report.fetched_blobs.to_string());
        Ok(())
    }
}
