//! `pull` (§4.9): download every remote pack this workspace lacks or
//! disagrees with, apply it to the local object store and query database,
//! then adopt the remote index's primary fields. The staged shadow survives
//! unless `--force` is given, matching `reset`'s own staged/primary split.

use crate::backend::RemoteBackend;
use crate::error::SyncError;
use crate::tracking::RemoteTrackingState;
use nt_entities::{Entity, EntityKind};
use nt_hash::Oid;
use nt_index::Index;
use nt_objects::ObjectStore;
use nt_query::Database;
use std::collections::HashSet;
use std::path::Path;

/// What one `pull` run did.
#[derive(Debug, Default)]
pub struct PullReport {
    /// Paths whose pack file was fetched and applied.
    pub updated: Vec<String>,
    /// Media blob OIDs fetched alongside those packs.
    pub fetched_blobs: usize,
}

pub async fn pull(
    state_dir: &Path,
    database_path: &Path,
    backend: &dyn RemoteBackend,
    force: bool,
) -> Result<PullReport, SyncError> {
    let store = ObjectStore::open(state_dir)?;
    let mut local_index = Index::load(&state_dir.join("index"))?;
    let mut db = Database::open(database_path)?;

    let Some(remote_index) = backend.get_index().await? else {
        return Ok(PullReport::default());
    };

    let mut report = PullReport::default();

    for remote_entry in remote_index.iter() {
        let Some(remote_oid) = &remote_entry.oid else { continue };
        let local_oid = local_index.get(&remote_entry.relative_path).and_then(|e| e.oid.as_ref());
        if local_oid == Some(remote_oid) {
            continue;
        }

        let pack_bytes = backend.get_object(remote_oid, ".pack").await?;
        store.write_pack_bytes(remote_oid, &pack_bytes)?;

        let pack = store.read_pack(remote_oid)?;
        let entities = pack.decode_entities()?;

        // Rows for OIDs present in the previous local pack but absent from
        // the fetched one must be deleted, or they orphan in the query DB
        // (§4.9, §4.6 rebuild coherence).
        let previous_oid = local_index.get(&remote_entry.relative_path).and_then(|e| e.oid.clone());
        let previous_decoded: Vec<Entity> = match &previous_oid {
            Some(oid) => store.read_pack(oid)?.decode_entities()?,
            None => Vec::new(),
        };
        let new_oids: HashSet<(EntityKind, Oid)> = entities
            .iter()
            .map(|e| (e.kind(), e.oid().clone()))
            .collect();
        let deletes: Vec<(Oid, EntityKind)> = previous_decoded
            .iter()
            .filter(|e| !new_oids.contains(&(e.kind(), e.oid().clone())))
            .map(|e| (e.oid().clone(), e.kind()))
            .collect();

        for entity in &entities {
            if let Entity::Media(media) = entity {
                if !store.exists(&media.content_hash, "") {
                    let blob = backend.get_object(&media.content_hash, "").await?;
                    store.write_blob_bytes(&media.content_hash, &blob)?;
                    report.fetched_blobs += 1;
                }
            }
        }

        let upserts: Vec<_> = entities
            .iter()
            .cloned()
            .map(|entity| (entity, remote_oid.clone()))
            .collect();
        db.apply_batch(&upserts, &deletes)?;

        let mtime = remote_entry.mtime.unwrap_or_else(chrono::Utc::now);
        let size = remote_entry.size.unwrap_or(0);
        local_index.set_primary(&remote_entry.relative_path, remote_oid.clone(), mtime, size);
        if force {
            local_index.clear_staged(&remote_entry.relative_path);
        }

        report.updated.push(remote_entry.relative_path.clone());
    }

    local_index.persist(&state_dir.join("index"))?;
    RemoteTrackingState {
        last_known_committed_at: remote_index.committed_at,
    }
    .persist(state_dir)?;

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local::LocalBackend;
    use nt_builder::Builder;
    use nt_config::Config;
    use nt_test_utils::TestWorkspace;

    #[tokio::test]
    async fn pull_fetches_remote_pack_into_fresh_workspace() {
        let source = TestWorkspace::new().with_note("notes.md", "## Note: Hi\nbody\n");
        let source_builder = Builder::new(source.root().to_path_buf(), Config::default());
        source_builder.add(&[]).unwrap();
        source_builder.commit().unwrap();

        let remote_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new(remote_dir.path()).await.unwrap();
        crate::push::push(&source.state_dir(), &backend, false).await.unwrap();

        let clone = TestWorkspace::new();
        let report = pull(&clone.state_dir(), &clone.database_path(), &backend, false)
            .await
            .unwrap();
        assert_eq!(report.updated, vec!["notes.md".to_string()]);

        let index = Index::load(&clone.index_path()).unwrap();
        assert!(index.get("notes.md").unwrap().oid.is_some());
    }

    #[tokio::test]
    async fn pull_deletes_rows_for_notes_dropped_upstream() {
        let source = TestWorkspace::new().with_note(
            "notes.md",
            "## Note: Keep\nstays.\n\n## Note: Drop\ngoes away.\n",
        );
        let source_builder = Builder::new(source.root().to_path_buf(), Config::default());
        source_builder.add(&[]).unwrap();
        source_builder.commit().unwrap();

        let remote_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new(remote_dir.path()).await.unwrap();
        crate::push::push(&source.state_dir(), &backend, false).await.unwrap();

        let clone = TestWorkspace::new();
        pull(&clone.state_dir(), &clone.database_path(), &backend, false)
            .await
            .unwrap();
        let db = Database::open(&clone.database_path()).unwrap();
        let file = db.find_file_by_path("notes.md").unwrap().unwrap();
        assert_eq!(db.find_notes_by_file_oid(&file.oid).unwrap().len(), 2);

        std::fs::write(source.root().join("notes.md"), "## Note: Keep\nstays.\n").unwrap();
        std::thread::sleep(std::time::Duration::from_millis(10));
        source_builder.add(&[]).unwrap();
        source_builder.commit().unwrap();
        crate::push::push(&source.state_dir(), &backend, false).await.unwrap();

        pull(&clone.state_dir(), &clone.database_path(), &backend, false)
            .await
            .unwrap();
        let db = Database::open(&clone.database_path()).unwrap();
        let file = db.find_file_by_path("notes.md").unwrap().unwrap();
        let remaining = db.find_notes_by_file_oid(&file.oid).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].short_title, "Keep");
    }

    #[tokio::test]
    async fn pull_with_nothing_on_remote_is_a_no_op() {
        let clone = TestWorkspace::new();
        let remote_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new(remote_dir.path()).await.unwrap();

        let report = pull(&clone.state_dir(), &clone.database_path(), &backend, false)
            .await
            .unwrap();
        assert!(report.updated.is_empty());
    }

    #[tokio::test]
    async fn pull_preserves_staged_shadow_without_force() {
        let source = TestWorkspace::new().with_note("notes.md", "## Note: Hi\nbody\n");
        let source_builder = Builder::new(source.root().to_path_buf(), Config::default());
        source_builder.add(&[]).unwrap();
        source_builder.commit().unwrap();

        let remote_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new(remote_dir.path()).await.unwrap();
        crate::push::push(&source.state_dir(), &backend, false).await.unwrap();

        let clone = TestWorkspace::new().with_note("notes.md", "## Note: Hi\nlocal edit\n");
        let clone_builder = Builder::new(clone.root().to_path_buf(), Config::default());
        clone_builder.add(&[]).unwrap();

        pull(&clone.state_dir(), &clone.database_path(), &backend, false)
            .await
            .unwrap();

        let index = Index::load(&clone.index_path()).unwrap();
        let entry = index.get("notes.md").unwrap();
        assert!(entry.staged);
        assert!(entry.oid.is_some());
    }
}
