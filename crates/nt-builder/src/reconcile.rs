//! Crash reconciliation (§9 "Recovery under crash").
//!
//! A crash between a build's pack-file writes and its index/DB commit can
//! leave the query database stale relative to what the index considers
//! committed. `reconcile_index_from_db` detects that window and rebuilds
//! the database from the index's own primary pack references, which are
//! the durable source of truth for "what is committed" — the database is
//! always a derived projection, never authoritative.

use crate::error::BuildError;
use nt_index::Index;
use nt_objects::ObjectStore;
use nt_query::Database;
use std::path::Path;

/// If the newest pack file on disk is newer than the index's last
/// `committed_at`, a build wrote objects but never reached its own commit.
/// Rebuild the database from the index's primary entries so queries never
/// observe that half-finished state. Returns `true` if a rebuild happened.
pub fn reconcile_index_from_db(
    index: &Index,
    store: &ObjectStore,
    objects_dir: &Path,
    db: &mut Database,
) -> Result<bool, BuildError> {
    let newest_pack_mtime = newest_pack_mtime(objects_dir)?;
    let Some(newest_pack_mtime) = newest_pack_mtime else {
        return Ok(false);
    };

    let needs_rebuild = match index.committed_at {
        None => true,
        Some(committed_at) => newest_pack_mtime > committed_at,
    };
    if !needs_rebuild {
        return Ok(false);
    }

    tracing::warn!(
        "index commit time predates newest pack file on disk; rebuilding query database from the index"
    );

    let mut entities = Vec::new();
    for pack_oid in index.list_reachable_pack_oids() {
        let pack = match store.read_pack(&pack_oid) {
            Ok(pack) => pack,
            Err(e) => {
                tracing::warn!(oid = %pack_oid, error = %e, "reachable pack missing during reconciliation, skipping");
                continue;
            }
        };
        for entity in pack.decode_entities()? {
            entities.push((entity, pack_oid.clone()));
        }
    }
    db.rebuild_from(entities)?;
    Ok(true)
}

fn newest_pack_mtime(objects_dir: &Path) -> std::io::Result<Option<chrono::DateTime<chrono::Utc>>> {
    let mut newest: Option<std::time::SystemTime> = None;
    if !objects_dir.exists() {
        return Ok(None);
    }
    for entry in walkdir::WalkDir::new(objects_dir).min_depth(2).max_depth(2) {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.file_name().to_string_lossy().ends_with(".pack") {
            let mtime = entry.metadata().map_err(std::io::Error::from)?.modified()?;
            newest = Some(match newest {
                Some(current) if current >= mtime => current,
                _ => mtime,
            });
        }
    }
    Ok(newest.map(chrono::DateTime::<chrono::Utc>::from))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use nt_entities::{Entity, File as FileEntity};
    use nt_hash::Oid;
    use nt_objects::PackFile;
    use tempfile::tempdir;

    fn sample_pack() -> PackFile {
        let entity = Entity::File(FileEntity {
            oid: Oid::from_content(b"seed"),
            relative_path: "notes.md".to_string(),
            size: 1,
            content_hash: Oid::from_content(b"body"),
            mtime: Utc::now(),
            body: "body".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        });
        PackFile::from_entities("notes.md".to_string(), Utc::now(), 1, Utc::now(), vec![entity]).unwrap()
    }

    #[test]
    fn no_packs_means_no_reconciliation() {
        let dir = tempdir().unwrap();
        let store = ObjectStore::open(dir.path()).unwrap();
        let index = Index::new();
        let mut db = Database::open_in_memory().unwrap();
        let rebuilt =
            reconcile_index_from_db(&index, &store, &dir.path().join("objects"), &mut db).unwrap();
        assert!(!rebuilt);
    }

    #[test]
    fn stale_index_commit_triggers_rebuild() {
        let dir = tempdir().unwrap();
        let store = ObjectStore::open(dir.path()).unwrap();
        let pack = sample_pack();
        let oid = store.write_pack(&pack).unwrap();

        let mut index = Index::new();
        index.stage("notes.md", oid, Utc::now(), 1);
        index.commit(Utc::now() - chrono::Duration::seconds(3600));

        let mut db = Database::open_in_memory().unwrap();
        let rebuilt =
            reconcile_index_from_db(&index, &store, &dir.path().join("objects"), &mut db).unwrap();
        assert!(rebuilt);
        assert_eq!(db.stats().unwrap().files, 1);
    }
}
