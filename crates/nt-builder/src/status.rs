//! `status`: report what `commit` would flip and what `add` would touch,
//! without mutating anything (§4.8).

use crate::error::BuildError;
use crate::reconcile;
use crate::walk;
use crate::Builder;
use nt_index::{Index, PathSpecSet};
use nt_objects::ObjectStore;
use nt_query::Database;
use std::collections::HashSet;

/// What `status` found, split the way `git status` splits its sections.
#[derive(Debug, Default)]
pub struct StatusReport {
    /// Entries with `staged=true` matching the pathspec: "Changes to be
    /// committed".
    pub staged: Vec<String>,
    /// Entries known to the index whose on-disk mtime/size no longer match
    /// what the index recorded: "Changes not staged for commit".
    pub not_staged: Vec<String>,
    /// Files present on disk, selected by the pathspec, with no index
    /// entry at all.
    pub untracked: Vec<String>,
}

impl Builder {
    pub fn status(&self, pathspecs: &[String]) -> Result<StatusReport, BuildError> {
        let store = ObjectStore::open(&self.state_dir)?;
        let index = Index::load(&self.index_path())?;
        let mut db = Database::open(&self.database_path())?;
        reconcile::reconcile_index_from_db(&index, &store, &self.objects_dir(), &mut db)?;

        let pathspec_set = PathSpecSet::parse(pathspecs)?;
        let walk_entries =
            walk::walk_workspace(&self.root, nt_config::STATE_DIR_NAME, &pathspec_set)?;

        let mut staged = Vec::new();
        let mut not_staged = Vec::new();
        let known: HashSet<&str> = walk_entries
            .iter()
            .map(|e| e.relative_path.as_str())
            .collect();

        for entry in index.iter() {
            if !pathspec_set.matches(&entry.relative_path) {
                continue;
            }
            if entry.staged {
                staged.push(entry.relative_path.clone());
            }
            if known.contains(entry.relative_path.as_str()) {
                let abs_path = self.root.join(&entry.relative_path);
                if let Ok(metadata) = std::fs::metadata(&abs_path) {
                    if let Ok(modified) = metadata.modified() {
                        let mtime = chrono::DateTime::<chrono::Utc>::from(modified);
                        if index.modified(&entry.relative_path, mtime, metadata.len()) {
                            not_staged.push(entry.relative_path.clone());
                        }
                    }
                }
            }
        }

        let mut untracked: Vec<String> = walk_entries
            .into_iter()
            .map(|e| e.relative_path)
            .filter(|p| index.get(p).is_none())
            .collect();
        untracked.sort();

        Ok(StatusReport {
            staged,
            not_staged,
            untracked,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nt_config::Config;
    use nt_test_utils::TestWorkspace;

    #[test]
    fn status_lists_staged_entry_after_add() {
        let ws = TestWorkspace::new().with_note("notes.md", "## Note: Hi\nbody\n");
        let builder = Builder::new(ws.root().to_path_buf(), Config::default());
        builder.add(&[]).unwrap();

        let report = builder.status(&[]).unwrap();
        assert_eq!(report.staged, vec!["notes.md".to_string()]);
        assert!(report.not_staged.is_empty());
        assert!(report.untracked.is_empty());
    }

    #[test]
    fn status_reports_unstaged_edit_after_commit() {
        let ws = TestWorkspace::new().with_note("notes.md", "## Note: Hi\nbody\n");
        let builder = Builder::new(ws.root().to_path_buf(), Config::default());
        builder.add(&[]).unwrap();
        builder.commit().unwrap();

        std::thread::sleep(std::time::Duration::from_millis(10));
        std::fs::write(ws.root().join("notes.md"), "## Note: Hi\nedited\n").unwrap();

        let report = builder.status(&[]).unwrap();
        assert!(report.staged.is_empty());
        assert_eq!(report.not_staged, vec!["notes.md".to_string()]);
    }

    #[test]
    fn status_reports_untracked_file() {
        let ws = TestWorkspace::new();
        std::fs::write(ws.root().join("new.md"), "## Note: New\nbody\n").unwrap();

        let builder = Builder::new(ws.root().to_path_buf(), Config::default());
        let report = builder.status(&[]).unwrap();
        assert_eq!(report.untracked, vec!["new.md".to_string()]);
    }
}
