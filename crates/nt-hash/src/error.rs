use thiserror::Error;

/// Errors constructing or validating an [`crate::Oid`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HashError {
    /// The hex string was not exactly 40 characters.
    #[error("OID must be 40 hex characters, got {0}")]
    InvalidLength(usize),

    /// The string contained non-hex or uppercase characters.
    #[error("not a valid lowercase hex OID: {0}")]
    InvalidHex(String),
}
