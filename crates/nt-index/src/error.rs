use thiserror::Error;

/// Errors from loading, persisting, or querying the index.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Reading or writing the index file failed.
    #[error("I/O error on index file: {0}")]
    Io(#[from] std::io::Error),

    /// The index file's YAML was malformed.
    #[error("malformed index file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A path specification was not a valid glob.
    #[error("invalid path specification: {0}")]
    Glob(#[from] globset::Error),
}
