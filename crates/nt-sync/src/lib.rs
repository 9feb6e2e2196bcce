//! Remote push/pull/gc (§4.9): a pluggable [`RemoteBackend`] plus the three
//! operations that move objects and the index between a workspace and
//! whatever that backend fronts — a filesystem mount, an S3-compatible
//! bucket, or (in tests) another [`LocalBackend`] pointed at a temp dir.
//!
//! Nothing here acquires [`nt_builder::ProcessLock`] — that crate isn't a
//! dependency of this one, to avoid a cycle. Callers that also run `add`/
//! `commit` concurrently with sync are responsible for serialising the two.

mod backend;
mod error;
mod gc;
mod local;
mod pull;
mod push;
mod retry;
mod s3;
mod tracking;

pub use backend::RemoteBackend;
pub use error::SyncError;
pub use gc::{gc_local, gc_remote, GcReport};
pub use local::LocalBackend;
pub use pull::{pull, PullReport};
pub use push::{push, PushReport};
pub use s3::{S3Backend, S3Config};
pub use tracking::RemoteTrackingState;

use nt_config::{RemoteConfig, RemoteKind};
use std::path::Path;

/// Build the configured remote backend. `state_dir` is used only by
/// `RemoteKind::Local`, whose `url` is a filesystem path possibly relative
/// to the workspace; S3 remotes parse `url` as `s3://bucket/prefix`.
pub async fn backend_from_config(
    remote: &RemoteConfig,
    state_dir: &Path,
) -> Result<Box<dyn RemoteBackend>, SyncError> {
    match remote.kind {
        RemoteKind::Local => {
            let path = Path::new(&remote.url);
            let resolved = if path.is_absolute() {
                path.to_path_buf()
            } else {
                state_dir.join(path)
            };
            Ok(Box::new(LocalBackend::new(resolved).await?))
        }
        RemoteKind::S3 => {
            let without_scheme = remote
                .url
                .strip_prefix("s3://")
                .ok_or_else(|| SyncError::Backend(format!("not an s3:// url: {}", remote.url)))?;
            let (bucket, prefix) = without_scheme
                .split_once('/')
                .unwrap_or((without_scheme, ""));
            let config = S3Config {
                bucket: bucket.to_string(),
                prefix: prefix.trim_end_matches('/').to_string(),
                endpoint: None,
            };
            Ok(Box::new(S3Backend::new(config).await?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn backend_from_config_resolves_local_relative_to_state_dir() {
        let state_dir = tempfile::tempdir().unwrap();
        let remote = RemoteConfig {
            url: "remote-mount".to_string(),
            kind: RemoteKind::Local,
        };
        let backend = backend_from_config(&remote, state_dir.path()).await.unwrap();
        assert!(backend.get_index().await.unwrap().is_none());
        assert!(state_dir.path().join("remote-mount").join("objects").is_dir());
    }

    #[tokio::test]
    async fn backend_from_config_rejects_malformed_s3_url() {
        let state_dir = tempfile::tempdir().unwrap();
        let remote = RemoteConfig {
            url: "not-an-s3-url".to_string(),
            kind: RemoteKind::S3,
        };
        let result = backend_from_config(&remote, state_dir.path()).await;
        assert!(matches!(result, Err(SyncError::Backend(_))));
    }
}
