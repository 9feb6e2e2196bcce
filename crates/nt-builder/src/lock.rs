//! A process lock serialising `add`/`commit` against the same workspace
//! (§5: "the caller is expected to serialise via a process lock file in the
//! state directory").

use crate::error::BuildError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// An RAII guard holding `<state_dir>/lock` exclusively for its lifetime.
///
/// The lock is an exclusive create (`O_EXCL`-equivalent): a second `acquire`
/// against the same state directory fails immediately rather than
/// blocking, since a crashed holder would otherwise wedge the workspace
/// forever. The file is removed on drop, including on an early return via
/// `?` from the guarded section.
#[derive(Debug)]
pub struct ProcessLock {
    path: PathBuf,
}

impl ProcessLock {
    /// Acquire the lock, failing with [`BuildError::Locked`] if another
    /// process already holds it.
    pub fn acquire(state_dir: &Path) -> Result<Self, BuildError> {
        let path = state_dir.join("lock");
        match fs::OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                use std::io::Write;
                let _ = write!(file, "{}", std::process::id());
                Ok(ProcessLock { path })
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                Err(BuildError::Locked(path.display().to_string()))
            }
            Err(e) => Err(BuildError::Io(e)),
        }
    }
}

impl Drop for ProcessLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to remove build lock file");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn acquire_then_drop_releases_lock() {
        let dir = tempdir().unwrap();
        {
            let _lock = ProcessLock::acquire(dir.path()).unwrap();
            assert!(dir.path().join("lock").exists());
        }
        assert!(!dir.path().join("lock").exists());
    }

    #[test]
    fn second_acquire_fails_while_held() {
        let dir = tempdir().unwrap();
        let _lock = ProcessLock::acquire(dir.path()).unwrap();
        assert!(matches!(
            ProcessLock::acquire(dir.path()),
            Err(BuildError::Locked(_))
        ));
    }
}
