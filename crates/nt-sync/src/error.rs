use thiserror::Error;

/// Errors from talking to a remote object store, or from the local
/// reconciliation `push`/`pull`/`gc` perform around it (§7 "Remote").
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Object(#[from] nt_objects::ObjectError),

    #[error(transparent)]
    Index(#[from] nt_index::IndexError),

    #[error(transparent)]
    Query(#[from] nt_query::QueryError),

    #[error("malformed remote index: {0}")]
    Serialize(#[from] serde_yaml::Error),

    #[error("{oid} not found on remote")]
    NotFound { oid: String },

    #[error("remote transport failure: {0}")]
    Backend(String),

    #[error("remote has changes this workspace has not seen; pull first or pass --force")]
    RemoteAhead,

    #[error("unsupported remote kind: {0}")]
    UnsupportedRemoteKind(String),
}
