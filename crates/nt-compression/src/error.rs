use thiserror::Error;

/// Errors from zlib compression/decompression.
#[derive(Debug, Error)]
pub enum CompressionError {
    /// The zlib encoder failed.
    #[error("compression failed: {0}")]
    Compress(String),

    /// The zlib decoder failed, or the input was not valid zlib data.
    #[error("decompression failed: {0}")]
    Decompress(String),
}
