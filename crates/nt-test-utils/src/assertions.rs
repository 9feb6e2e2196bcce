use nt_index::{Index, IndexEntry};
use nt_query::{Database, FileRow};

/// Assert `relative_path` has an entry in `index` and return it for further
/// inspection (e.g. `.staged`, `.oid`).
pub fn assert_index_entry<'a>(index: &'a Index, relative_path: &str) -> &'a IndexEntry {
    index
        .get(relative_path)
        .unwrap_or_else(|| panic!("expected index entry for {relative_path:?}, found none"))
}

/// Assert `relative_path` has a `file` row in the query database and
/// return it for further inspection.
pub fn assert_query_row(db: &Database, relative_path: &str) -> FileRow {
    db.find_file_by_path(relative_path)
        .expect("query database lookup failed")
        .unwrap_or_else(|| panic!("expected query row for {relative_path:?}, found none"))
}
