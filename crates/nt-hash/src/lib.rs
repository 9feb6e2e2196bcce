//! Object identifiers for the note engine's content-addressed stores.
//!
//! An [`Oid`] is a 40-character lowercase hexadecimal string. Two flavours
//! share the representation but come from different sources:
//!
//! - **Content OIDs** are the SHA-1 digest of canonicalised bytes. They
//!   identify blobs and pack files; identical content always produces the
//!   identical OID, which is what makes duplicate-pack detection and
//!   idempotent writes possible.
//! - **Entity OIDs** are drawn from a CSPRNG and have no relationship to the
//!   entity's content. They identify File/Note/Flashcard/Media/Link/Reminder
//!   entities and are carried across re-packs so that an entity keeps its
//!   identity while its content changes.
//!
//! Both flavours are represented by the same [`Oid`] type; nothing in the
//! type distinguishes them after construction, mirroring how the rest of the
//! system treats them identically once minted.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::fmt;
use std::sync::Arc;

mod error;

pub use error::HashError;

/// A 40-character lowercase hex object identifier.
///
/// `Oid` is immutable once constructed: there is no mutating method, and the
/// inner string is shared via `Arc` so clones are cheap.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Oid(Arc<str>);

const OID_LEN: usize = 40;

impl Oid {
    /// Hash `data` with SHA-1 to produce a content OID.
    ///
    /// # Examples
    ///
    /// ```
    /// use nt_hash::Oid;
    ///
    /// let a = Oid::from_content(b"hello");
    /// let b = Oid::from_content(b"hello");
    /// assert_eq!(a, b);
    /// assert_eq!(a.as_str().len(), 40);
    /// ```
    pub fn from_content(data: &[u8]) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(data);
        let digest = hasher.finalize();
        Self(Arc::from(hex::encode(digest)))
    }

    /// Parse a 40-character lowercase hex string into an `Oid`.
    pub fn from_hex(s: &str) -> Result<Self, HashError> {
        if s.len() != OID_LEN {
            return Err(HashError::InvalidLength(s.len()));
        }
        if !s.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase()) {
            return Err(HashError::InvalidHex(s.to_string()));
        }
        Ok(Self(Arc::from(s)))
    }

    /// Borrow the OID as its hex string representation.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The relative path an object named by this OID lives at under
    /// `objects/`: `xx/<oid><suffix>`, where `xx` is the first two hex
    /// characters (the sharding prefix that keeps any one directory from
    /// growing unbounded).
    pub fn to_relative_path(&self, suffix: &str) -> String {
        format!("{}/{}{}", &self.0[..2], self.0, suffix)
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Oid({})", self.0)
    }
}

impl TryFrom<String> for Oid {
    type Error = HashError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Oid> for String {
    fn from(oid: Oid) -> Self {
        oid.0.to_string()
    }
}

impl AsRef<str> for Oid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Source of entity OIDs.
///
/// Production code uses [`RandomIdGenerator`]; tests use
/// [`SequentialIdGenerator`] to get reproducible OIDs without relying on
/// timing or RNG seeding.
pub trait EntityIdGenerator: Send + Sync {
    /// Mint a new, unused entity OID.
    fn next_oid(&self) -> Oid;
}

/// Mints entity OIDs from the operating system's CSPRNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIdGenerator;

impl EntityIdGenerator for RandomIdGenerator {
    fn next_oid(&self) -> Oid {
        let mut bytes = [0u8; 20];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Oid(Arc::from(hex::encode(bytes)))
    }
}

/// Mints entity OIDs from a deterministic counter, for tests.
///
/// Each call returns `<prefix>0..0<counter>` zero-padded to 40 hex
/// characters, so a test can assert on exact OID values without caring how
/// many entities were minted before it.
pub struct SequentialIdGenerator {
    counter: std::sync::atomic::AtomicU64,
}

impl SequentialIdGenerator {
    /// Create a generator whose first call returns counter value 0.
    pub fn new() -> Self {
        Self {
            counter: std::sync::atomic::AtomicU64::new(0),
        }
    }
}

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityIdGenerator for SequentialIdGenerator {
    fn next_oid(&self) -> Oid {
        let n = self.counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Oid(Arc::from(format!("{:040x}", n)))
    }
}
