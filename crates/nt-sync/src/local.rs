//! A filesystem-mount remote: another directory with the same
//! `objects/xx/<oid>(.pack)?` sharding a local workspace uses, plus an
//! `index` file at its root. Pushing to one is pushing to a shared mount
//! (NFS, a synced folder, a removable drive) rather than a service.

use crate::backend::RemoteBackend;
use crate::error::SyncError;
use async_trait::async_trait;
use nt_hash::Oid;
use nt_index::Index;
use nt_objects::ObjectRef;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

#[derive(Debug, Clone)]
pub struct LocalBackend {
    root: PathBuf,
}

impl LocalBackend {
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self, SyncError> {
        let root = root.into();
        fs::create_dir_all(root.join("objects")).await?;
        Ok(LocalBackend { root })
    }

    fn object_path(&self, oid: &Oid, suffix: &str) -> PathBuf {
        self.root.join("objects").join(oid.to_relative_path(suffix))
    }

    fn index_path(&self) -> PathBuf {
        self.root.join("index")
    }

    async fn write_atomic(&self, path: &Path, bytes: &[u8]) -> Result<(), SyncError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).await?;
        }
        let tmp_path = path.with_extension(format!("tmp-{}", std::process::id()));
        {
            let mut file = fs::File::create(&tmp_path).await?;
            file.write_all(bytes).await?;
            file.sync_all().await?;
        }
        fs::rename(&tmp_path, path).await?;
        Ok(())
    }
}

#[async_trait]
impl RemoteBackend for LocalBackend {
    async fn get_object(&self, oid: &Oid, suffix: &str) -> Result<Vec<u8>, SyncError> {
        let path = self.object_path(oid, suffix);
        fs::read(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SyncError::NotFound { oid: oid.as_str().to_string() }
            } else {
                SyncError::Io(e)
            }
        })
    }

    async fn put_object(&self, oid: &Oid, suffix: &str, bytes: &[u8]) -> Result<(), SyncError> {
        let path = self.object_path(oid, suffix);
        if fs::try_exists(&path).await? {
            return Ok(());
        }
        self.write_atomic(&path, bytes).await
    }

    async fn object_exists(&self, oid: &Oid, suffix: &str) -> Result<bool, SyncError> {
        Ok(fs::try_exists(self.object_path(oid, suffix)).await?)
    }

    async fn delete_object(&self, oid: &Oid, suffix: &str) -> Result<(), SyncError> {
        match fs::remove_file(self.object_path(oid, suffix)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SyncError::Io(e)),
        }
    }

    async fn list_objects(&self) -> Result<Vec<ObjectRef>, SyncError> {
        let objects_dir = self.root.join("objects");
        let mut out = Vec::new();
        let mut shards = match fs::read_dir(&objects_dir).await {
            Ok(rd) => rd,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(out),
            Err(e) => return Err(SyncError::Io(e)),
        };
        while let Some(shard) = shards.next_entry().await? {
            if !shard.file_type().await?.is_dir() {
                continue;
            }
            let mut files = fs::read_dir(shard.path()).await?;
            while let Some(file) = files.next_entry().await? {
                let name = file.file_name().to_string_lossy().into_owned();
                if let Some(hex) = name.strip_suffix(".pack") {
                    if let Ok(oid) = Oid::from_hex(hex) {
                        out.push(ObjectRef { oid, is_pack: true });
                    }
                } else if name.starts_with('.') {
                    continue;
                } else if let Ok(oid) = Oid::from_hex(&name) {
                    out.push(ObjectRef { oid, is_pack: false });
                }
            }
        }
        Ok(out)
    }

    async fn get_index(&self) -> Result<Option<Index>, SyncError> {
        match fs::read(self.index_path()).await {
            Ok(bytes) => Ok(Some(serde_yaml::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SyncError::Io(e)),
        }
    }

    async fn put_index(&self, index: &Index) -> Result<(), SyncError> {
        let bytes = serde_yaml::to_string(index)?.into_bytes();
        self.write_atomic(&self.index_path(), &bytes).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::tempdir;

    #[tokio::test]
    async fn put_then_get_object_roundtrips() {
        let dir = tempdir().unwrap();
        let backend = LocalBackend::new(dir.path()).await.unwrap();
        let oid = Oid::from_content(b"hello");
        backend.put_object(&oid, ".pack", b"hello").await.unwrap();
        assert!(backend.object_exists(&oid, ".pack").await.unwrap());
        assert_eq!(backend.get_object(&oid, ".pack").await.unwrap(), b"hello");
    }

    #[tokio::test]
    async fn missing_object_is_not_found() {
        let dir = tempdir().unwrap();
        let backend = LocalBackend::new(dir.path()).await.unwrap();
        let oid = Oid::from_content(b"nothing");
        assert!(matches!(
            backend.get_object(&oid, "").await,
            Err(SyncError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn get_index_is_none_before_first_push() {
        let dir = tempdir().unwrap();
        let backend = LocalBackend::new(dir.path()).await.unwrap();
        assert!(backend.get_index().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn put_then_get_index_roundtrips() {
        let dir = tempdir().unwrap();
        let backend = LocalBackend::new(dir.path()).await.unwrap();
        let mut index = Index::new();
        index.set_primary("a.md", Oid::from_content(b"a"), Utc::now(), 1);
        backend.put_index(&index).await.unwrap();

        let fetched = backend.get_index().await.unwrap().unwrap();
        assert!(fetched.get("a.md").is_some());
    }

    #[tokio::test]
    async fn delete_object_is_idempotent() {
        let dir = tempdir().unwrap();
        let backend = LocalBackend::new(dir.path()).await.unwrap();
        let oid = Oid::from_content(b"gone");
        backend.delete_object(&oid, "").await.unwrap();
        backend.put_object(&oid, "", b"x").await.unwrap();
        backend.delete_object(&oid, "").await.unwrap();
        assert!(!backend.object_exists(&oid, "").await.unwrap());
    }

    #[tokio::test]
    async fn list_objects_finds_pack_and_blob() {
        let dir = tempdir().unwrap();
        let backend = LocalBackend::new(dir.path()).await.unwrap();
        backend
            .put_object(&Oid::from_content(b"pack"), ".pack", b"p")
            .await
            .unwrap();
        backend
            .put_object(&Oid::from_content(b"blob"), "", b"b")
            .await
            .unwrap();
        let objects = backend.list_objects().await.unwrap();
        assert_eq!(objects.len(), 2);
        assert!(objects.iter().any(|o| o.is_pack));
        assert!(objects.iter().any(|o| !o.is_pack));
    }
}
