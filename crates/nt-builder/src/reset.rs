//! `reset`: discard the staged shadow for a pathspec, restoring the query
//! database to whatever the index's primary (committed) pack files say
//! (§4.8). A path staged for the first time — primary fields still
//! `None` — is dropped from the index entirely: there is nothing
//! committed to fall back to.

use crate::error::BuildError;
use crate::lock::ProcessLock;
use crate::Builder;
use nt_entities::{Entity, EntityKind};
use nt_hash::Oid;
use nt_index::{Index, PathSpecSet};
use nt_objects::ObjectStore;
use nt_query::Database;

/// What one `reset` run did.
#[derive(Debug, Default)]
pub struct ResetReport {
    /// Relative paths whose staged shadow was discarded.
    pub unstaged: Vec<String>,
    /// Relative paths that had never been committed, dropped entirely.
    pub dropped: Vec<String>,
}

impl Builder {
    pub fn reset(&self, pathspecs: &[String]) -> Result<ResetReport, BuildError> {
        let _lock = ProcessLock::acquire(&self.state_dir)?;
        let store = ObjectStore::open(&self.state_dir)?;
        let mut index = Index::load(&self.index_path())?;
        let mut db = Database::open(&self.database_path())?;
        let pathspec_set = PathSpecSet::parse(pathspecs)?;

        let mut unstaged = Vec::new();
        let mut dropped = Vec::new();
        let mut upserts: Vec<(Entity, Oid)> = Vec::new();
        let mut deletes: Vec<(Oid, EntityKind)> = Vec::new();

        for entry in index.iter() {
            if !entry.staged || !pathspec_set.matches(&entry.relative_path) {
                continue;
            }

            let staged_entities = match &entry.staged_packfile_oid {
                Some(oid) => store.read_pack(oid)?.decode_entities()?,
                None => Vec::new(),
            };
            let primary_entities = match &entry.oid {
                Some(oid) => store.read_pack(oid)?.decode_entities()?,
                None => Vec::new(),
            };

            let primary_keys: std::collections::HashSet<(EntityKind, Oid)> = primary_entities
                .iter()
                .map(|e| (e.kind(), e.oid().clone()))
                .collect();
            for entity in &staged_entities {
                if !primary_keys.contains(&(entity.kind(), entity.oid().clone())) {
                    deletes.push((entity.oid().clone(), entity.kind()));
                }
            }
            if let Some(primary_oid) = &entry.oid {
                for entity in primary_entities {
                    upserts.push((entity, primary_oid.clone()));
                }
                unstaged.push(entry.relative_path.clone());
            } else {
                dropped.push(entry.relative_path.clone());
            }
        }

        db.apply_batch(&upserts, &deletes)?;

        index.reset(&pathspec_set);
        for path in &dropped {
            index.remove(path);
        }
        index.persist(&self.index_path())?;

        Ok(ResetReport { unstaged, dropped })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nt_config::Config;
    use nt_test_utils::TestWorkspace;

    #[test]
    fn reset_after_commit_restores_committed_content() {
        let ws = TestWorkspace::new().with_note("notes.md", "## Note: Stable\noriginal\n");
        let builder = Builder::new(ws.root().to_path_buf(), Config::default());
        builder.add(&[]).unwrap();
        builder.commit().unwrap();

        std::fs::write(ws.root().join("notes.md"), "## Note: Stable\nedited\n").unwrap();
        std::thread::sleep(std::time::Duration::from_millis(10));
        builder.add(&[]).unwrap();

        let report = builder.reset(&[]).unwrap();
        assert_eq!(report.unstaged, vec!["notes.md".to_string()]);

        let index = Index::load(&ws.index_path()).unwrap();
        assert!(!index.get("notes.md").unwrap().staged);

        let db = Database::open(&ws.database_path()).unwrap();
        let file = db.find_file_by_path("notes.md").unwrap().unwrap();
        let notes = db.find_notes_by_file_oid(&file.oid).unwrap();
        assert_eq!(notes[0].content, "original");
    }

    #[test]
    fn reset_of_never_committed_file_drops_it_entirely() {
        let ws = TestWorkspace::new().with_note("notes.md", "## Note: New\nbody\n");
        let builder = Builder::new(ws.root().to_path_buf(), Config::default());
        builder.add(&[]).unwrap();

        let report = builder.reset(&[]).unwrap();
        assert_eq!(report.dropped, vec!["notes.md".to_string()]);

        let index = Index::load(&ws.index_path()).unwrap();
        assert!(index.get("notes.md").is_none());

        let db = Database::open(&ws.database_path()).unwrap();
        assert!(db.find_file_by_path("notes.md").unwrap().is_none());
    }
}
