//! The one bit of state sync needs that the core index doesn't carry: what
//! the remote's `committed_at` looked like the last time this workspace
//! observed it. §9 leaves "remote push behaviour when the remote index is
//! ahead" ambiguous and mandates reject-unless-forced; detecting "ahead"
//! needs a fixed point to compare against, so `push`/`pull` persist one
//! here after every successful round trip.

use crate::error::SyncError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

const TRACKING_FILE_NAME: &str = "remote-tracking";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoteTrackingState {
    pub last_known_committed_at: Option<DateTime<Utc>>,
}

impl RemoteTrackingState {
    pub fn load(state_dir: &Path) -> Result<Self, SyncError> {
        let path = state_dir.join(TRACKING_FILE_NAME);
        match std::fs::read(&path) {
            Ok(bytes) => Ok(serde_yaml::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(SyncError::Io(e)),
        }
    }

    pub fn persist(&self, state_dir: &Path) -> Result<(), SyncError> {
        let path = state_dir.join(TRACKING_FILE_NAME);
        let bytes = serde_yaml::to_string(self)?.into_bytes();
        let tmp_path = state_dir.join(format!(".tmp-{}-{}", TRACKING_FILE_NAME, std::process::id()));
        std::fs::write(&tmp_path, bytes)?;
        std::fs::rename(&tmp_path, &path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_loads_as_default() {
        let dir = tempdir().unwrap();
        let state = RemoteTrackingState::load(dir.path()).unwrap();
        assert_eq!(state.last_known_committed_at, None);
    }

    #[test]
    fn persist_then_load_roundtrips() {
        let dir = tempdir().unwrap();
        let state = RemoteTrackingState { last_known_committed_at: Some(Utc::now()) };
        state.persist(dir.path()).unwrap();

        let loaded = RemoteTrackingState::load(dir.path()).unwrap();
        assert_eq!(loaded, state);
    }
}
