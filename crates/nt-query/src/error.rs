use thiserror::Error;

/// Errors opening, migrating, or querying the relational projection.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("I/O error opening query database: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed timestamp in query database: {0}")]
    Timestamp(#[from] chrono::ParseError),
}
