//! Orchestrates one workspace pass: walk, diff-by-stat, parse, extract,
//! pack, and stage (`add`); plus the lighter `commit`/`reset`/`status`/`diff`
//! operations that only move state between the index's primary and staged
//! slots.
//!
//! Nothing here talks YAML or SQL directly — that is [`nt_markdown`],
//! [`nt_entities`], [`nt_objects`], [`nt_index`], and [`nt_query`]'s job.
//! This crate is the conductor: it owns the synchronisation barrier between
//! the parallel parse/pack phase and the single-threaded index/DB phase.

mod add;
mod commit;
mod diff;
mod error;
mod inherit;
mod lock;
mod reconcile;
mod reset;
mod status;
mod walk;

pub use add::AddReport;
pub use commit::CommitReport;
pub use diff::{render_diff, EntityChange, EntityDiff};
pub use error::BuildError;
pub use lock::ProcessLock;
pub use reconcile::reconcile_index_from_db;
pub use reset::ResetReport;
pub use status::StatusReport;
pub use walk::{sibling_index_path, walk_workspace, WalkEntry};

use nt_config::Config;
use std::path::{Path, PathBuf};

/// The index file's name inside the state directory (§6).
pub const INDEX_FILE_NAME: &str = "index";
/// The query database's file name inside the state directory (§6).
pub const DATABASE_FILE_NAME: &str = "database.db";

/// The entry point for every workspace operation: holds the paths a build
/// needs and the configuration tuning how it behaves. Cheap to construct;
/// each operation opens its own handles to the object store, index, and
/// database and releases them when it returns.
#[derive(Debug, Clone)]
pub struct Builder {
    root: PathBuf,
    state_dir: PathBuf,
    config: Config,
}

impl Builder {
    /// A builder rooted at `root`, with its state directory resolved as
    /// `root/<nt_config::STATE_DIR_NAME>`.
    pub fn new(root: PathBuf, config: Config) -> Self {
        let state_dir = root.join(nt_config::STATE_DIR_NAME);
        Builder { root, state_dir, config }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn index_path(&self) -> PathBuf {
        self.state_dir.join(INDEX_FILE_NAME)
    }

    fn database_path(&self) -> PathBuf {
        self.state_dir.join(DATABASE_FILE_NAME)
    }

    fn objects_dir(&self) -> PathBuf {
        self.state_dir.join("objects")
    }
}
