//! The typed entities a parsed note file decomposes into, and the
//! extractor that builds them.
//!
//! An [`ExtractedEntities`] value is what the builder hands to the pack-file
//! writer; none of these types know about YAML, compression, or the object
//! store — that is [`nt_objects`]'s job.

pub mod extract;
pub mod kind;
pub mod tags;

use chrono::{DateTime, Utc};
use nt_hash::Oid;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::time::SystemTime;

/// The kind tag stored alongside each entry in a pack file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    File,
    Note,
    Flashcard,
    Media,
    Link,
    Reminder,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::File => "file",
            EntityKind::Note => "note",
            EntityKind::Flashcard => "flashcard",
            EntityKind::Media => "media",
            EntityKind::Link => "link",
            EntityKind::Reminder => "reminder",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `.md` file. Exactly one per source path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct File {
    pub oid: Oid,
    pub relative_path: String,
    pub size: u64,
    pub content_hash: Oid,
    pub mtime: DateTime<Utc>,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One heading section recognised as `<Kind>: <Title>`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Note {
    pub oid: Oid,
    pub relative_path: String,
    pub file_oid: Oid,
    pub parent_note_oid: Option<Oid>,
    pub kind: String,
    pub short_title: String,
    pub long_title: String,
    pub slug: String,
    pub content: String,
    pub content_hash: Oid,
    pub attributes: BTreeMap<String, String>,
    pub tags: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A Note of `Flashcard` kind, split into front/back at the first
/// horizontal rule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Flashcard {
    pub oid: Oid,
    pub relative_path: String,
    pub note_oid: Oid,
    pub front: String,
    pub back: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A referenced binary asset. Its payload lives in a blob, not the pack
/// file this record belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Media {
    pub oid: Oid,
    pub relative_path: String,
    pub source_note_oid: Oid,
    pub content_hash: Oid,
    pub size: u64,
    pub mtime: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A Markdown link or wikilink found in a note's body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Link {
    pub oid: Oid,
    pub relative_path: String,
    pub note_oid: Oid,
    pub url: String,
    pub title: Option<String>,
    pub go_name: Option<String>,
    pub line: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A `@reminder: <RFC3339>` attribute on a note.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reminder {
    pub oid: Oid,
    pub relative_path: String,
    pub note_oid: Oid,
    pub scheduled_at: DateTime<Utc>,
    pub recurrence: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Any one persisted entity, tagged by kind for pack-file storage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Entity {
    File(File),
    Note(Note),
    Flashcard(Flashcard),
    Media(Media),
    Link(Link),
    Reminder(Reminder),
}

impl Entity {
    pub fn oid(&self) -> &Oid {
        match self {
            Entity::File(e) => &e.oid,
            Entity::Note(e) => &e.oid,
            Entity::Flashcard(e) => &e.oid,
            Entity::Media(e) => &e.oid,
            Entity::Link(e) => &e.oid,
            Entity::Reminder(e) => &e.oid,
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::File(_) => EntityKind::File,
            Entity::Note(_) => EntityKind::Note,
            Entity::Flashcard(_) => EntityKind::Flashcard,
            Entity::Media(_) => EntityKind::Media,
            Entity::Link(_) => EntityKind::Link,
            Entity::Reminder(_) => EntityKind::Reminder,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            Entity::File(e) => e.created_at,
            Entity::Note(e) => e.created_at,
            Entity::Flashcard(e) => e.created_at,
            Entity::Media(e) => e.created_at,
            Entity::Link(e) => e.created_at,
            Entity::Reminder(e) => e.created_at,
        }
    }
}

/// Everything extracted from one source file, grouped by kind.
#[derive(Debug, Clone, Default)]
pub struct ExtractedEntities {
    pub file: Option<File>,
    pub notes: Vec<Note>,
    pub flashcards: Vec<Flashcard>,
    pub media: Vec<Media>,
    pub links: Vec<Link>,
    pub reminders: Vec<Reminder>,
}

impl ExtractedEntities {
    /// Flatten into the order a pack file stores entries in: file first,
    /// then notes, flashcards, media, links, reminders.
    pub fn into_entities(self) -> Vec<Entity> {
        let mut out = Vec::new();
        if let Some(file) = self.file {
            out.push(Entity::File(file));
        }
        out.extend(self.notes.into_iter().map(Entity::Note));
        out.extend(self.flashcards.into_iter().map(Entity::Flashcard));
        out.extend(self.media.into_iter().map(Entity::Media));
        out.extend(self.links.into_iter().map(Entity::Link));
        out.extend(self.reminders.into_iter().map(Entity::Reminder));
        out
    }
}

pub(crate) fn system_time_to_utc(t: SystemTime) -> DateTime<Utc> {
    DateTime::<Utc>::from(t)
}
