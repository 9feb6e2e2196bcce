mod add;
mod cat_file;
mod commit;
mod count_objects;
mod diff;
mod gc;
mod init;
mod pull;
mod push;
mod reset;
mod status;

pub use add::AddCmd;
pub use cat_file::CatFileCmd;
pub use commit::CommitCmd;
pub use count_objects::CountObjectsCmd;
pub use diff::DiffCmd;
pub use gc::{GcCmd, OriginGcCmd};
pub use init::InitCmd;
pub use pull::PullCmd;
pub use push::PushCmd;
pub use reset::ResetCmd;
pub use status::StatusCmd;

/// An error the CLI boundary can map directly to an exit code (§6/§7):
/// `1` for user-caused problems, `2` for everything else (parse/conflict/
/// integrity/remote failures the underlying crates already distinguish).
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    UserInput(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::UserInput(_) => 1,
            CliError::Internal(_) => 2,
        }
    }
}

pub type CliResult = Result<(), CliError>;

/// The `-t/--parallel` override (§6), set once from `main` before any
/// command runs and read back by every [`load_builder`] call.
static PARALLEL_OVERRIDE: std::sync::OnceLock<usize> = std::sync::OnceLock::new();

pub fn set_parallel_override(n: usize) {
    let _ = PARALLEL_OVERRIDE.set(n);
}

/// Resolve the current workspace and load its `Builder`, the entry point
/// every local command (`add`/`commit`/`reset`/`status`/`diff`) shares.
pub fn load_builder() -> Result<nt_builder::Builder, CliError> {
    let root = crate::workspace::find_workspace_root()
        .map_err(|e| CliError::UserInput(e.to_string()))?;
    let config_path = root.join(nt_config::STATE_DIR_NAME).join(nt_config::CONFIG_FILE_NAME);
    let mut config = nt_config::load(&config_path).map_err(|e| CliError::Internal(e.into()))?;
    if let Some(&n) = PARALLEL_OVERRIDE.get() {
        config.engine.parallel_workers = n;
    }
    Ok(nt_builder::Builder::new(root, config))
}

