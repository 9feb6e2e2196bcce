//! `gc`/`origin gc` (§4.9): sweep objects no longer reachable from an
//! index. Reachability is always computed from the *local* index — `origin
//! gc` trusts the local workspace's view of what matters rather than
//! trying to reconstruct reachability from the remote's own index, since a
//! remote may be shared by clones that haven't pushed yet.

use crate::backend::RemoteBackend;
use crate::error::SyncError;
use nt_entities::Entity;
use nt_hash::Oid;
use nt_index::Index;
use nt_objects::ObjectStore;
use std::collections::HashSet;
use std::path::Path;

/// What one `gc` run removed.
#[derive(Debug, Default)]
pub struct GcReport {
    pub removed_packs: usize,
    pub removed_blobs: usize,
}

fn reachable_blobs(store: &ObjectStore, reachable_packs: &HashSet<Oid>) -> Result<HashSet<Oid>, SyncError> {
    let mut blobs = HashSet::new();
    for pack_oid in reachable_packs {
        let pack = store.read_pack(pack_oid)?;
        for entity in pack.decode_entities()? {
            if let Entity::Media(media) = entity {
                blobs.insert(media.content_hash);
            }
        }
    }
    Ok(blobs)
}

/// Sweep `<state_dir>/objects/` for packs and blobs no longer reachable
/// from the local index.
pub fn gc_local(state_dir: &Path) -> Result<GcReport, SyncError> {
    let store = ObjectStore::open(state_dir)?;
    let index = Index::load(&state_dir.join("index"))?;

    let reachable_packs = index.list_reachable_pack_oids();
    let reachable_blobs = reachable_blobs(&store, &reachable_packs)?;

    let mut report = GcReport::default();
    for object in store.iter_objects()? {
        if object.is_pack {
            if !reachable_packs.contains(&object.oid) {
                store.delete(&object.oid, ".pack")?;
                report.removed_packs += 1;
            }
        } else if !reachable_blobs.contains(&object.oid) {
            store.delete(&object.oid, "")?;
            report.removed_blobs += 1;
        }
    }
    Ok(report)
}

/// Sweep a remote for packs and blobs the local index no longer
/// references.
pub async fn gc_remote(state_dir: &Path, backend: &dyn RemoteBackend) -> Result<GcReport, SyncError> {
    let store = ObjectStore::open(state_dir)?;
    let index = Index::load(&state_dir.join("index"))?;

    let reachable_packs = index.list_reachable_pack_oids();
    let reachable_blobs = reachable_blobs(&store, &reachable_packs)?;

    let mut report = GcReport::default();
    for object in backend.list_objects().await? {
        if object.is_pack {
            if !reachable_packs.contains(&object.oid) {
                backend.delete_object(&object.oid, ".pack").await?;
                report.removed_packs += 1;
            }
        } else if !reachable_blobs.contains(&object.oid) {
            backend.delete_object(&object.oid, "").await?;
            report.removed_blobs += 1;
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local::LocalBackend;
    use nt_builder::Builder;
    use nt_config::Config;
    use nt_test_utils::TestWorkspace;

    #[test]
    fn gc_local_removes_unreferenced_pack() {
        let ws = TestWorkspace::new().with_note("notes.md", "## Note: Hi\nbody\n");
        let builder = Builder::new(ws.root().to_path_buf(), Config::default());
        builder.add(&[]).unwrap();
        builder.commit().unwrap();

        let store = ws.open_object_store();
        let stray_pack = nt_objects::PackFile::from_entities(
            "stray.md".to_string(),
            chrono::Utc::now(),
            0,
            chrono::Utc::now(),
            vec![],
        )
        .unwrap();
        store.write_pack(&stray_pack).unwrap();

        let report = gc_local(&ws.state_dir()).unwrap();
        assert_eq!(report.removed_packs, 1);

        let index = Index::load(&ws.index_path()).unwrap();
        let reachable = index.list_reachable_pack_oids();
        for object in store.iter_objects().unwrap() {
            if object.is_pack {
                assert!(reachable.contains(&object.oid));
            }
        }
    }

    #[test]
    fn gc_local_keeps_staged_but_uncommitted_pack() {
        let ws = TestWorkspace::new().with_note("notes.md", "## Note: Hi\nbody\n");
        let builder = Builder::new(ws.root().to_path_buf(), Config::default());
        builder.add(&[]).unwrap();

        let report = gc_local(&ws.state_dir()).unwrap();
        assert_eq!(report.removed_packs, 0);
    }

    #[tokio::test]
    async fn gc_remote_removes_pack_no_local_entry_references() {
        let ws = TestWorkspace::new().with_note("notes.md", "## Note: Hi\nbody\n");
        let builder = Builder::new(ws.root().to_path_buf(), Config::default());
        builder.add(&[]).unwrap();
        builder.commit().unwrap();

        let remote_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new(remote_dir.path()).await.unwrap();
        crate::push::push(&ws.state_dir(), &backend, false).await.unwrap();

        let stray_oid = Oid::from_content(b"orphaned pack bytes");
        backend.put_object(&stray_oid, ".pack", b"orphaned pack bytes").await.unwrap();

        let report = gc_remote(&ws.state_dir(), &backend).await.unwrap();
        assert_eq!(report.removed_packs, 1);
        assert!(!backend.object_exists(&stray_oid, ".pack").await.unwrap());
    }
}
