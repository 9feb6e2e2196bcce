//! `commit`: flip every staged entry's shadow into its primary fields
//! (§4.8). Unlike `add`, this never touches the object store or the query
//! database — `add` already made the database agree with the staged pack
//! files; `commit` just makes the index agree that those packs are now
//! the committed truth.

use crate::error::BuildError;
use crate::lock::ProcessLock;
use crate::Builder;
use chrono::Utc;
use nt_index::Index;

/// What one `commit` run did.
#[derive(Debug, Default)]
pub struct CommitReport {
    /// Relative paths whose staged shadow became primary.
    pub committed: Vec<String>,
}

impl Builder {
    pub fn commit(&self) -> Result<CommitReport, BuildError> {
        let _lock = ProcessLock::acquire(&self.state_dir)?;
        let mut index = Index::load(&self.index_path())?;

        let committed: Vec<String> = index
            .iter()
            .filter(|e| e.staged)
            .map(|e| e.relative_path.clone())
            .collect();

        index.commit(Utc::now());
        index.persist(&self.index_path())?;

        Ok(CommitReport { committed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nt_config::Config;
    use nt_test_utils::TestWorkspace;

    #[test]
    fn commit_moves_staged_entries_to_primary() {
        let ws = TestWorkspace::new().with_note("notes.md", "## Note: Hi\nbody\n");
        let builder = Builder::new(ws.root().to_path_buf(), Config::default());
        builder.add(&[]).unwrap();

        let report = builder.commit().unwrap();
        assert_eq!(report.committed, vec!["notes.md".to_string()]);

        let index = Index::load(&ws.index_path()).unwrap();
        let entry = index.get("notes.md").unwrap();
        assert!(!entry.staged);
        assert!(entry.oid.is_some());
    }

    #[test]
    fn commit_with_nothing_staged_is_a_no_op() {
        let ws = TestWorkspace::new();
        let builder = Builder::new(ws.root().to_path_buf(), Config::default());
        let report = builder.commit().unwrap();
        assert!(report.committed.is_empty());
    }
}
