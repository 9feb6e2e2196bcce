//! A rebuildable SQLite projection of the object store.
//!
//! The query database is never a source of truth — every row in it is
//! derived from pack files already committed to the object store. Losing
//! it, or finding it out of sync with the index, is recoverable by
//! [`Database::rebuild_from`]; nothing here persists state the rest of the
//! system cannot regenerate.

mod database;
mod error;
mod rows;
mod schema;

pub use database::Database;
pub use error::QueryError;
pub use rows::{
    FileRow, FlashcardRow, LinkRow, MediaRow, NoteRow, ReminderRow, Stats, WikilinkResolution,
};
