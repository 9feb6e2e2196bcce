use thiserror::Error;

/// Errors from parsing a note file.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Reading the file from disk failed.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The front matter block's YAML could not be parsed.
    #[error("malformed front matter: {0}")]
    FrontMatter(#[from] serde_yaml::Error),

    /// The file was not valid UTF-8.
    #[error("file is not valid UTF-8: {0}")]
    Encoding(String),
}
