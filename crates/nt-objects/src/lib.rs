//! Content-addressed storage for pack files and blobs.
//!
//! A [`store::ObjectStore`] is a thin, synchronous wrapper around
//! `<state_dir>/objects/`; callers (the builder, `gc`, remote sync) do the
//! higher-level reachability and reconciliation work. See [`pack::PackFile`]
//! for the on-disk schema.

mod error;
mod pack;
mod store;

pub use error::ObjectError;
pub use pack::{PackEntry, PackFile};
pub use store::{ObjectRef, ObjectStore};
