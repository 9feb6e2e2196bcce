//! Workspace discovery: locate the directory containing `nt_config::STATE_DIR_NAME`,
//! honouring `NT_HOME` when set (§6 "Environment variables").

use anyhow::{bail, Result};
use std::path::PathBuf;

/// Find the workspace root, walking up from the current directory unless
/// `NT_HOME` overrides the search entirely.
pub fn find_workspace_root() -> Result<PathBuf> {
    if let Ok(home) = std::env::var("NT_HOME") {
        let path = PathBuf::from(home);
        if !path.join(nt_config::STATE_DIR_NAME).exists() {
            bail!("NT_HOME={} is not an nt workspace (no {} directory)", path.display(), nt_config::STATE_DIR_NAME);
        }
        return Ok(path);
    }

    let mut current = std::env::current_dir()?;
    loop {
        if current.join(nt_config::STATE_DIR_NAME).exists() {
            return Ok(current);
        }
        if !current.pop() {
            bail!("not an nt workspace (or any parent up to mount point)");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // current_dir/env are process-global; serialise tests that touch them.
    static GUARD: Mutex<()> = Mutex::new(());

    #[test]
    fn finds_root_from_nested_directory() {
        let _guard = GUARD.lock().unwrap();
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join(nt_config::STATE_DIR_NAME)).unwrap();
        let nested = temp.path().join("a/b/c");
        std::fs::create_dir_all(&nested).unwrap();

        let original = std::env::current_dir().unwrap();
        std::env::set_current_dir(&nested).unwrap();
        std::env::remove_var("NT_HOME");
        let found = find_workspace_root();
        std::env::set_current_dir(original).unwrap();

        assert_eq!(found.unwrap(), temp.path());
    }

    #[test]
    fn nt_home_overrides_search() {
        let _guard = GUARD.lock().unwrap();
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join(nt_config::STATE_DIR_NAME)).unwrap();

        std::env::set_var("NT_HOME", temp.path());
        let found = find_workspace_root();
        std::env::remove_var("NT_HOME");

        assert_eq!(found.unwrap(), temp.path());
    }
}
