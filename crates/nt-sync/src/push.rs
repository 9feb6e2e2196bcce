//! `push` (§4.9): upload every locally-committed pack the remote lacks or
//! disagrees with, upload the blobs its Media entities reference, then
//! upload the local index. Rejects unless `--force` when the remote has
//! moved since this workspace last observed it.

use crate::backend::RemoteBackend;
use crate::error::SyncError;
use crate::tracking::RemoteTrackingState;
use nt_entities::Entity;
use nt_index::Index;
use nt_objects::ObjectStore;
use std::path::Path;

/// What one `push` run did.
#[derive(Debug, Default)]
pub struct PushReport {
    /// Paths whose pack file was uploaded.
    pub uploaded_packs: Vec<String>,
    /// Media blob OIDs uploaded alongside those packs.
    pub uploaded_blobs: usize,
}

pub async fn push(
    state_dir: &Path,
    backend: &dyn RemoteBackend,
    force: bool,
) -> Result<PushReport, SyncError> {
    let store = ObjectStore::open(state_dir)?;
    let local_index = Index::load(&state_dir.join("index"))?;
    let tracking = RemoteTrackingState::load(state_dir)?;

    let remote_index = backend.get_index().await?.unwrap_or_default();
    if !force && remote_index.committed_at != tracking.last_known_committed_at {
        return Err(SyncError::RemoteAhead);
    }

    let mut report = PushReport::default();

    for entry in local_index.iter() {
        let Some(local_oid) = &entry.oid else { continue };
        let remote_oid = remote_index.get(&entry.relative_path).and_then(|e| e.oid.as_ref());
        if remote_oid == Some(local_oid) {
            continue;
        }

        let pack_bytes = store.read_pack_bytes(local_oid)?;
        backend.put_object(local_oid, ".pack", &pack_bytes).await?;
        report.uploaded_packs.push(entry.relative_path.clone());

        let pack = store.read_pack(local_oid)?;
        for entity in pack.decode_entities()? {
            if let Entity::Media(media) = entity {
                if !backend.object_exists(&media.content_hash, "").await? {
                    let blob = store.read_blob(&media.content_hash)?;
                    backend.put_object(&media.content_hash, "", &blob).await?;
                    report.uploaded_blobs += 1;
                }
            }
        }
    }

    backend.put_index(&committed_only(&local_index)).await?;
    RemoteTrackingState {
        last_known_committed_at: local_index.committed_at,
    }
    .persist(state_dir)?;

    Ok(report)
}

/// A copy of `index` carrying only what has been committed: paths never
/// committed (primary fields still empty) are dropped, and every entry's
/// staged shadow is cleared. The remote only ever sees committed state.
fn committed_only(index: &Index) -> Index {
    let mut out = Index::new();
    for entry in index.iter() {
        if let (Some(oid), Some(mtime), Some(size)) = (&entry.oid, entry.mtime, entry.size) {
            out.set_primary(&entry.relative_path, oid.clone(), mtime, size);
        }
    }
    out.commit(index.committed_at.unwrap_or_else(chrono::Utc::now));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local::LocalBackend;
    use chrono::Utc;
    use nt_builder::Builder;
    use nt_config::Config;
    use nt_hash::Oid;
    use nt_test_utils::TestWorkspace;

    #[tokio::test]
    async fn push_uploads_committed_pack_and_index() {
        let ws = TestWorkspace::new().with_note("notes.md", "## Note: Hi\nbody\n");
        let builder = Builder::new(ws.root().to_path_buf(), Config::default());
        builder.add(&[]).unwrap();
        builder.commit().unwrap();

        let remote_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new(remote_dir.path()).await.unwrap();

        let report = push(&ws.state_dir(), &backend, false).await.unwrap();
        assert_eq!(report.uploaded_packs, vec!["notes.md".to_string()]);

        let remote_index = backend.get_index().await.unwrap().unwrap();
        assert!(remote_index.get("notes.md").unwrap().oid.is_some());
    }

    #[tokio::test]
    async fn push_is_idempotent_with_no_local_changes() {
        let ws = TestWorkspace::new().with_note("notes.md", "## Note: Hi\nbody\n");
        let builder = Builder::new(ws.root().to_path_buf(), Config::default());
        builder.add(&[]).unwrap();
        builder.commit().unwrap();

        let remote_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new(remote_dir.path()).await.unwrap();
        push(&ws.state_dir(), &backend, false).await.unwrap();

        let second = push(&ws.state_dir(), &backend, false).await.unwrap();
        assert!(second.uploaded_packs.is_empty());
    }

    #[tokio::test]
    async fn push_rejects_when_remote_moved_without_force() {
        let ws = TestWorkspace::new().with_note("notes.md", "## Note: Hi\nbody\n");
        let builder = Builder::new(ws.root().to_path_buf(), Config::default());
        builder.add(&[]).unwrap();
        builder.commit().unwrap();

        let remote_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new(remote_dir.path()).await.unwrap();

        let mut foreign_index = Index::new();
        foreign_index.set_primary("other.md", Oid::from_content(b"x"), Utc::now(), 1);
        foreign_index.commit(Utc::now());
        backend.put_index(&foreign_index).await.unwrap();

        let result = push(&ws.state_dir(), &backend, false).await;
        assert!(matches!(result, Err(SyncError::RemoteAhead)));

        let forced = push(&ws.state_dir(), &backend, true).await;
        assert!(forced.is_ok());
    }
}
