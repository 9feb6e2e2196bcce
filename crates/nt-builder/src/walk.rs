//! Workspace walk: find every `.md` file under the workspace root that a
//! pathspec selects, skipping the state directory, ordered so each
//! directory's `index.md` is visited before its siblings (§9: attribute
//! inheritance reads the nearest `index.md`, so it must already be parsed
//! when a sibling note asks for it).

use nt_index::PathSpecSet;
use std::path::{Path, PathBuf};

const INDEX_FILE_NAME: &str = "index.md";

/// One candidate file found by the walk, paired with its workspace-relative
/// path (forward-slash separated).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    pub abs_path: PathBuf,
    pub relative_path: String,
}

/// Walk `root`, returning every Markdown file selected by `pathspecs`,
/// excluding anything under `state_dir_name`, ordered index-file-first
/// within each directory and then lexicographically.
pub fn walk_workspace(
    root: &Path,
    state_dir_name: &str,
    pathspecs: &PathSpecSet,
) -> std::io::Result<Vec<WalkEntry>> {
    let mut entries = Vec::new();
    let walker = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| e.file_type().is_file() || e.file_name() != state_dir_name);
    for entry in walker {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().and_then(|e| e.to_str()) != Some("md") {
            continue;
        }
        let relative_path = entry
            .path()
            .strip_prefix(root)
            .unwrap_or(entry.path())
            .to_string_lossy()
            .replace('\\', "/");
        if !pathspecs.matches(&relative_path) {
            continue;
        }
        entries.push(WalkEntry {
            abs_path: entry.path().to_path_buf(),
            relative_path,
        });
    }
    entries.sort_by(|a, b| sort_key(&a.relative_path).cmp(&sort_key(&b.relative_path)));
    Ok(entries)
}

/// `(directory, is-not-index.md, file-name)` — `index.md` sorts first
/// within its own directory, then everything else lexicographically.
fn sort_key(relative_path: &str) -> (String, bool, String) {
    let (dir, name) = match relative_path.rsplit_once('/') {
        Some((dir, name)) => (dir.to_string(), name.to_string()),
        None => (String::new(), relative_path.to_string()),
    };
    let is_not_index = name != INDEX_FILE_NAME;
    (dir, is_not_index, name)
}

/// The nearest `index.md` in the same directory as `relative_path`, if any
/// (non-recursive: only that one directory, per §9).
pub fn sibling_index_path(relative_path: &str) -> Option<String> {
    let dir = relative_path.rsplit_once('/').map(|(d, _)| d);
    let candidate = match dir {
        Some(dir) => format!("{dir}/{INDEX_FILE_NAME}"),
        None => INDEX_FILE_NAME.to_string(),
    };
    if candidate == relative_path {
        None
    } else {
        Some(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn index_md_sorts_before_siblings() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.md"), "# Note: B\n").unwrap();
        fs::write(dir.path().join("a.md"), "# Note: A\n").unwrap();
        fs::write(dir.path().join("index.md"), "---\ntags: [shared]\n---\n").unwrap();

        let spec = PathSpecSet::parse(&[]).unwrap();
        let entries = walk_workspace(dir.path(), ".nt", &spec).unwrap();
        assert_eq!(entries[0].relative_path, "index.md");
        assert_eq!(entries[1].relative_path, "a.md");
        assert_eq!(entries[2].relative_path, "b.md");
    }

    #[test]
    fn skips_state_directory() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join(".nt")).unwrap();
        fs::write(dir.path().join(".nt/config"), "").unwrap();
        fs::write(dir.path().join("note.md"), "# Note: X\n").unwrap();

        let spec = PathSpecSet::parse(&[]).unwrap();
        let entries = walk_workspace(dir.path(), ".nt", &spec).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].relative_path, "note.md");
    }

    #[test]
    fn sibling_index_path_is_none_for_index_itself() {
        assert_eq!(sibling_index_path("notes/index.md"), None);
        assert_eq!(
            sibling_index_path("notes/a.md").as_deref(),
            Some("notes/index.md")
        );
        assert_eq!(sibling_index_path("a.md").as_deref(), Some("index.md"));
    }
}
