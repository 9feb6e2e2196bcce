//! `push`: upload committed packs/blobs and the local index to the
//! configured remote (§4.9, §6).

use crate::commands::{load_builder, CliError};
use crate::output;
use clap::Parser;

/// Upload committed packs and the index to the configured remote
#[derive(Parser, Debug)]
pub struct PushCmd {
    /// Push even if the remote has moved since this workspace last synced
    #[arg(long)]
    pub force: bool,

    /// Prompt before overwriting remote state that has moved
    #[arg(long)]
    pub interactive: bool,
}

impl PushCmd {
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
            confirm("remote has moved since this workspace last synced; push anyway?")?
        } else {
            self.force
        };

        let result = nt_sync::push(builder.state_dir(), backend.as_ref(), force).await;
        match result {
            Ok(report) => {
                for path in &report.uploaded_packs {
                    output::detail("uploaded", path);
                }
                output::detail("blobs uploaded", &report.uploaded_blobs.to_string());
                Ok(())
            }
            Err(nt_sync::SyncError::RemoteAhead) => Err(CliError::UserInput(
                "remote has moved since this workspace last synced; re-run with --force or --interactive".to_string(),
            )),
            Err(e) => Err(CliError::Internal(e.into())),
        }
    }
}

fn confirm(prompt: &str) -> Result<bool, CliError> {
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| CliError::Internal(e.into()))
}
