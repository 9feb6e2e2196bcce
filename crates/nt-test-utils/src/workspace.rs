use nt_config::{Config, STATE_DIR_NAME};
use nt_index::Index;
use nt_objects::ObjectStore;
use nt_query::Database;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A throwaway workspace rooted in a temp directory, with the state
/// directory already initialised: empty index, default config, empty
/// object store, empty query database.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Create a freshly initialised workspace.
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("create temp dir for test workspace");
        let workspace = TestWorkspace { temp_dir };

        std::fs::create_dir_all(workspace.state_dir()).expect("create state dir");
        ObjectStore::open(&workspace.state_dir()).expect("open object store");
        Index::new()
            .persist(&workspace.index_path())
            .expect("persist empty index");
        nt_config::save(&workspace.config_path(), &Config::default()).expect("save default config");
        Database::open(&workspace.database_path()).expect("open query database");

        workspace
    }

    /// Write `content` to `relative_path` under the workspace root,
    /// creating parent directories as needed. Consumes and returns `self`
    /// to support fluent construction: `TestWorkspace::new().with_note(...)`.
    pub fn with_note(self, relative_path: &str, content: &str) -> Self {
        let path = self.root().join(relative_path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create note's parent directory");
        }
        std::fs::write(&path, content).expect("write note file");
        self
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn state_dir(&self) -> PathBuf {
        self.root().join(STATE_DIR_NAME)
    }

    pub fn index_path(&self) -> PathBuf {
        self.state_dir().join("index")
    }

    pub fn config_path(&self) -> PathBuf {
        self.state_dir().join(nt_config::CONFIG_FILE_NAME)
    }

    pub fn database_path(&self) -> PathBuf {
        self.state_dir().join("database.db")
    }

    pub fn open_index(&self) -> Index {
        Index::load(&self.index_path()).expect("load index")
    }

    pub fn open_object_store(&self) -> ObjectStore {
        ObjectStore::open(&self.state_dir()).expect("open object store")
    }

    pub fn open_database(&self) -> Database {
        Database::open(&self.database_path()).expect("open query database")
    }
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_workspace_has_empty_index_and_config() {
        let workspace = TestWorkspace::new();
        let index = workspace.open_index();
        assert_eq!(index.iter().count(), 0);
    }

    #[test]
    fn with_note_writes_file_under_root() {
        let workspace = TestWorkspace::new().with_note("notes/a.md", "## Note: Hi\nbody\n");
        let content = std::fs::read_to_string(workspace.root().join("notes/a.md")).unwrap();
        assert!(content.contains("Hi"));
    }
}
