//! `gc` / `origin gc`: sweep objects unreachable from the index (§4.9, §6).

use crate::commands::{load_builder, CliError};
use crate::output;
use clap::Parser;

/// Sweep unreachable pack files and blobs from the local object store
#[derive(Parser, Debug)]
pub struct GcCmd {}

impl GcCmd {
    pub fn execute(&self) -> Result<(), CliError> {
        let builder = load_builder()?;
        let report =
            nt_sync::gc_local(builder.state_dir()).map_err(|e| CliError::Internal(e.into()))?;

        output::detail("packs removed", &report.removed_packs.to_string());
        output::detail("blobs removed", &report.removed_blobs.to_string());
        Ok(())
    }
}

/// Sweep unreachable objects from the configured remote
#[derive(Parser, Debug)]
pub struct OriginGcCmd {}

impl OriginGcCmd {
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

        let report = nt_sync::gc_remote(builder.state_dir(), backend.as_ref())
            .await
            .map_err(|e| CliError::Internal(e.into()))?;

        output::detail("packs removed", &report.removed_packs.to_string());
        output::detail("blobs removed", &report.removed_blobs.to_string());
        Ok(())
    }
}
