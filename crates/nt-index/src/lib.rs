//! The workspace's staging index: a persistent map from relative path to
//! the pack file currently representing it, with a staged shadow per entry
//! that lets `add`/`commit`/`reset` work the way Git's index does.

mod error;
mod index;
mod pathspec;

pub use error::IndexError;
pub use index::{Index, IndexEntry};
pub use pathspec::PathSpecSet;
