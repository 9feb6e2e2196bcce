use nt_hash::Oid;
use thiserror::Error;

/// Errors from reading or writing the object store.
#[derive(Debug, Error)]
pub enum ObjectError {
    /// No object exists at the path the given OID hashes to.
    #[error("object not found: {0}")]
    NotFound(Oid),

    /// The on-disk I/O operation itself failed.
    #[error("I/O error on object store: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to serialise or deserialise a pack file's YAML.
    #[error("pack file serialisation error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Failed to base64-decode an entry's `data` field.
    #[error("malformed base64 in pack entry: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Failed to zlib-compress or decompress an entry's payload.
    #[error("compression error: {0}")]
    Compression(#[from] nt_compression::CompressionError),
}
