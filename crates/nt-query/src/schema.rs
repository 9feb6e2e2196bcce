use crate::error::QueryError;
use rusqlite::Connection;

/// Create every table, index, and the FTS5 virtual table if they don't
/// already exist. Safe to call on every open: the database is a pure
/// projection, never a source of truth, so there is no versioned migration
/// history to track.
pub fn migrate(conn: &Connection) -> Result<(), QueryError> {
    conn.execute_batch(
        r#"
        PRAGMA foreign_keys = OFF;

        CREATE TABLE IF NOT EXISTS file (
            oid TEXT PRIMARY KEY,
            packfile_oid TEXT NOT NULL,
            relative_path TEXT NOT NULL,
            size INTEGER NOT NULL,
            content_hash TEXT NOT NULL,
            mtime TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS file_relative_path_idx ON file (relative_path);

        CREATE TABLE IF NOT EXISTS note (
            oid TEXT PRIMARY KEY,
            packfile_oid TEXT NOT NULL,
            relative_path TEXT NOT NULL,
            file_oid TEXT NOT NULL,
            parent_note_oid TEXT,
            kind TEXT NOT NULL,
            short_title TEXT NOT NULL,
            long_title TEXT NOT NULL,
            slug TEXT NOT NULL,
            content TEXT NOT NULL,
            content_hash TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS note_file_oid_idx ON note (file_oid);
        CREATE INDEX IF NOT EXISTS note_slug_idx ON note (slug);
        CREATE INDEX IF NOT EXISTS note_kind_idx ON note (kind);

        CREATE TABLE IF NOT EXISTS note_tag (
            note_oid TEXT NOT NULL,
            tag TEXT NOT NULL,
            PRIMARY KEY (note_oid, tag)
        );
        CREATE INDEX IF NOT EXISTS note_tag_tag_idx ON note_tag (tag);

        CREATE TABLE IF NOT EXISTS note_attribute (
            note_oid TEXT NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            PRIMARY KEY (note_oid, key)
        );
        CREATE INDEX IF NOT EXISTS note_attribute_key_idx ON note_attribute (key);

        CREATE VIRTUAL TABLE IF NOT EXISTS note_fts USING fts5(
            oid UNINDEXED,
            long_title,
            content
        );

        CREATE TABLE IF NOT EXISTS flashcard (
            oid TEXT PRIMARY KEY,
            packfile_oid TEXT NOT NULL,
            relative_path TEXT NOT NULL,
            note_oid TEXT NOT NULL,
            front TEXT NOT NULL,
            back TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS flashcard_note_oid_idx ON flashcard (note_oid);

        CREATE TABLE IF NOT EXISTS media (
            oid TEXT PRIMARY KEY,
            packfile_oid TEXT NOT NULL,
            relative_path TEXT NOT NULL,
            source_note_oid TEXT NOT NULL,
            content_hash TEXT NOT NULL,
            size INTEGER NOT NULL,
            mtime TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS media_source_note_oid_idx ON media (source_note_oid);

        CREATE TABLE IF NOT EXISTS link (
            oid TEXT PRIMARY KEY,
            packfile_oid TEXT NOT NULL,
            relative_path TEXT NOT NULL,
            note_oid TEXT NOT NULL,
            url TEXT NOT NULL,
            title TEXT,
            go_name TEXT,
            line INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS link_note_oid_idx ON link (note_oid);
        CREATE INDEX IF NOT EXISTS link_go_name_idx ON link (go_name);

        CREATE TABLE IF NOT EXISTS reminder (
            oid TEXT PRIMARY KEY,
            packfile_oid TEXT NOT NULL,
            relative_path TEXT NOT NULL,
            note_oid TEXT NOT NULL,
            scheduled_at TEXT NOT NULL,
            recurrence TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS reminder_note_oid_idx ON reminder (note_oid);
        CREATE INDEX IF NOT EXISTS reminder_scheduled_at_idx ON reminder (scheduled_at);
        "#,
    )?;
    Ok(())
}
