use thiserror::Error;

/// Errors from walking, parsing, packing, or indexing a workspace.
#[derive(Debug, Error)]
pub enum BuildError {
    /// An I/O operation outside the object/index/query layers failed (the
    /// workspace walk, reading a source file's metadata, the lock file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A source file failed to parse. Collected per-file rather than
    /// aborting the whole build (§4.7: a malformed file does not block
    /// unrelated files from being packed).
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: nt_markdown::ParseError,
    },

    /// Writing or reading a pack file or blob failed.
    #[error("object store error: {0}")]
    Object(#[from] nt_objects::ObjectError),

    /// Staging or persisting the index failed.
    #[error("index error: {0}")]
    Index(#[from] nt_index::IndexError),

    /// The relational projection failed to upsert or delete rows.
    #[error("query database error: {0}")]
    Query(#[from] nt_query::QueryError),

    /// Another process already holds the workspace's build lock.
    #[error("another nt process is already building this workspace ({0})")]
    Locked(String),
}
