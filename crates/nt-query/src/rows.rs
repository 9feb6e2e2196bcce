use chrono::{DateTime, Utc};
use nt_hash::Oid;
use std::collections::{BTreeMap, BTreeSet};

/// A `file` row, plus whatever tags/attributes joins have populated.
#[derive(Debug, Clone, PartialEq)]
pub struct FileRow {
    pub oid: Oid,
    pub packfile_oid: Oid,
    pub relative_path: String,
    pub size: u64,
    pub content_hash: Oid,
    pub mtime: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NoteRow {
    pub oid: Oid,
    pub packfile_oid: Oid,
    pub relative_path: String,
    pub file_oid: Oid,
    pub parent_note_oid: Option<Oid>,
    pub kind: String,
    pub short_title: String,
    pub long_title: String,
    pub slug: String,
    pub content: String,
    pub content_hash: Oid,
    pub tags: BTreeSet<String>,
    pub attributes: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlashcardRow {
    pub oid: Oid,
    pub packfile_oid: Oid,
    pub relative_path: String,
    pub note_oid: Oid,
    pub front: String,
    pub back: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MediaRow {
    pub oid: Oid,
    pub packfile_oid: Oid,
    pub relative_path: String,
    pub source_note_oid: Oid,
    pub content_hash: Oid,
    pub size: u64,
    pub mtime: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinkRow {
    pub oid: Oid,
    pub packfile_oid: Oid,
    pub relative_path: String,
    pub note_oid: Oid,
    pub url: String,
    pub title: Option<String>,
    pub go_name: Option<String>,
    pub line: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReminderRow {
    pub oid: Oid,
    pub packfile_oid: Oid,
    pub relative_path: String,
    pub note_oid: Oid,
    pub scheduled_at: DateTime<Utc>,
    pub recurrence: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Result of resolving a wikilink target (§4.6).
///
/// `[[X]]` (no anchor) resolves against file paths; `[[X#S]]` resolves
/// against note long titles within the file matched by `X`.
#[derive(Debug, Clone, PartialEq)]
pub enum WikilinkResolution {
    /// Exactly one file's path (minus extension) ends in the target.
    File(FileRow),
    /// Exactly one note's long title ends in the anchor, inside the
    /// uniquely matched file.
    Note(NoteRow),
    /// No file or note matched.
    NotFound,
    /// More than one candidate matched; the candidates' paths (file
    /// targets) or long titles (anchored targets), for error reporting.
    Ambiguous(Vec<String>),
}

/// Aggregate counts reported by `nt count-objects` / `nt status --stats`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stats {
    pub files: u64,
    pub notes: u64,
    pub flashcards: u64,
    pub media: u64,
    pub links: u64,
    pub reminders: u64,
    /// Distinct tag -> usage count, across every note.
    pub tags: BTreeMap<String, u64>,
    /// Distinct attribute key -> usage count, across every note.
    pub attributes: BTreeMap<String, u64>,
}
