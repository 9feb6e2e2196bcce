//! The four remote operations §4.9 models sync around: `get_object`,
//! `put_object`, `get_index`, `put_index`, plus `delete_object`/
//! `list_objects` for `origin gc`. Anything that can do those six things —
//! an S3-compatible bucket, a filesystem mount, a mock for tests — is a
//! valid remote.

use crate::error::SyncError;
use async_trait::async_trait;
use nt_hash::Oid;
use nt_index::Index;
use nt_objects::ObjectRef;
use std::fmt::Debug;

/// A pluggable remote object store. `suffix` is `".pack"` for pack files and
/// `""` for blobs, the same convention [`nt_objects::ObjectStore`] uses, so
/// callers never have to branch on object kind beyond that one string.
#[async_trait]
pub trait RemoteBackend: Send + Sync + Debug {
    async fn get_object(&self, oid: &Oid, suffix: &str) -> Result<Vec<u8>, SyncError>;
    async fn put_object(&self, oid: &Oid, suffix: &str, bytes: &[u8]) -> Result<(), SyncError>;
    async fn object_exists(&self, oid: &Oid, suffix: &str) -> Result<bool, SyncError>;
    async fn delete_object(&self, oid: &Oid, suffix: &str) -> Result<(), SyncError>;
    /// Every object the remote currently holds, for `origin gc`'s
    /// reachability sweep.
    async fn list_objects(&self) -> Result<Vec<ObjectRef>, SyncError>;
    /// `None` if the remote has never received a `put_index` (a fresh,
    /// never-pushed-to remote).
    async fn get_index(&self) -> Result<Option<Index>, SyncError>;
    async fn put_index(&self, index: &Index) -> Result<(), SyncError>;
}
