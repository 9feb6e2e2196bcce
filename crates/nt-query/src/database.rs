use crate::error::QueryError;
use crate::rows::{
    FileRow, FlashcardRow, LinkRow, MediaRow, NoteRow, ReminderRow, Stats, WikilinkResolution,
};
use crate::schema;
use chrono::{DateTime, Utc};
use nt_entities::{Entity, EntityKind};
use nt_hash::Oid;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// The relational projection of the object store.
///
/// Every row here is derived from pack files already written to the object
/// store; the database itself is disposable and [`Database::rebuild`] can
/// always regenerate it from scratch. `nt` keeps a single writer at a time
/// (the builder holds the only open handle during `add`/`commit`).
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (creating if absent) the query database at `path`.
    pub fn open(path: &Path) -> Result<Self, QueryError> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", false)?;
        schema::migrate(&conn)?;
        Ok(Database { conn })
    }

    /// Open a private in-memory database, for tests and one-shot queries.
    pub fn open_in_memory() -> Result<Self, QueryError> {
        let conn = Connection::open_in_memory()?;
        schema::migrate(&conn)?;
        Ok(Database { conn })
    }

    /// Start a transaction; callers commit or roll it back explicitly.
    /// The builder wraps an entire `add`/`commit` pass in one transaction
    /// so a crash mid-pass never leaves the database half-updated.
    pub fn transaction(&mut self) -> Result<Transaction<'_>, QueryError> {
        Ok(self.conn.transaction()?)
    }

    /// Delete every row. Used before [`rebuild_from`].
    pub fn clear_all(&self) -> Result<(), QueryError> {
        self.conn.execute_batch(
            "DELETE FROM file; DELETE FROM note; DELETE FROM note_tag;
             DELETE FROM note_attribute; DELETE FROM note_fts;
             DELETE FROM flashcard; DELETE FROM media; DELETE FROM link;
             DELETE FROM reminder;",
        )?;
        Ok(())
    }

    /// Rebuild the whole projection from an iterator of decoded entities.
    /// Purely a function of its input: given the same entities in the same
    /// order, the resulting database is the same every time.
    pub fn rebuild_from<I>(&mut self, entities: I) -> Result<(), QueryError>
    where
        I: IntoIterator<Item = (Entity, Oid)>,
    {
        self.clear_all()?;
        let tx = self.conn.transaction()?;
        for (entity, packfile_oid) in entities {
            upsert_in(&tx, &entity, &packfile_oid)?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Insert or replace one entity's row(s).
    pub fn upsert(&self, entity: &Entity, packfile_oid: &Oid) -> Result<(), QueryError> {
        upsert_in(&self.conn, entity, packfile_oid)
    }

    /// Remove every row belonging to `oid` (of the given kind).
    pub fn delete(&self, oid: &Oid, kind: EntityKind) -> Result<(), QueryError> {
        delete_in(&self.conn, oid, kind)
    }

    /// Apply a generation's worth of upserts and deletes inside one
    /// transaction, so a crash between the two never leaves the projection
    /// half-updated (§4.7: the builder's DB phase is one transaction).
    pub fn apply_batch(
        &mut self,
        upserts: &[(Entity, Oid)],
        deletes: &[(Oid, EntityKind)],
    ) -> Result<(), QueryError> {
        let tx = self.conn.transaction()?;
        for (oid, kind) in deletes {
            delete_in(&tx, oid, *kind)?;
        }
        for (entity, packfile_oid) in upserts {
            upsert_in(&tx, entity, packfile_oid)?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn find_file_by_path(&self, relative_path: &str) -> Result<Option<FileRow>, QueryError> {
        self.conn
            .query_row(
                "SELECT oid, packfile_oid, relative_path, size, content_hash, mtime,
                        created_at, updated_at
                 FROM file WHERE relative_path = ?1",
                params![relative_path],
                file_row,
            )
            .optional()
            .map_err(QueryError::from)
    }

    pub fn find_notes_by_file_oid(&self, file_oid: &Oid) -> Result<Vec<NoteRow>, QueryError> {
        let mut stmt = self.conn.prepare(
            "SELECT oid, packfile_oid, relative_path, file_oid, parent_note_oid, kind,
                    short_title, long_title, slug, content, content_hash,
                    created_at, updated_at
             FROM note WHERE file_oid = ?1 ORDER BY oid",
        )?;
        let rows = stmt
            .query_map(params![file_oid.as_str()], note_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter()
            .map(|row| self.hydrate_note(row))
            .collect()
    }

    /// Resolve a wikilink target per §4.6: `[[X]]` (no anchor) matches a
    /// file whose relative path, minus its extension, ends in `X`
    /// (case-insensitive); `[[X#S]]` matches the note whose long title
    /// ends in `S` inside the file matched by `X`. Either half reports
    /// [`WikilinkResolution::Ambiguous`] when more than one candidate
    /// qualifies, matching the spec's "uniquely; otherwise ambiguous".
    pub fn find_notes_by_wikilink(&self, target: &str) -> Result<WikilinkResolution, QueryError> {
        match target.split_once('#') {
            Some((file_part, anchor)) => self.resolve_note_wikilink(file_part, anchor),
            None => self.resolve_file_wikilink(target),
        }
    }

    fn resolve_file_wikilink(&self, target: &str) -> Result<WikilinkResolution, QueryError> {
        let needle = target.to_lowercase();
        let mut stmt = self.conn.prepare(
            "SELECT oid, packfile_oid, relative_path, size, content_hash, mtime,
                    created_at, updated_at
             FROM file",
        )?;
        let matches: Vec<FileRow> = stmt
            .query_map([], file_row)?
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .filter(|f| strip_extension(&f.relative_path).to_lowercase().ends_with(&needle))
            .collect();

        match matches.len() {
            0 => Ok(WikilinkResolution::NotFound),
            1 => Ok(WikilinkResolution::File(matches.into_iter().next().unwrap())),
            _ => Ok(WikilinkResolution::Ambiguous(
                matches.into_iter().map(|f| f.relative_path).collect(),
            )),
        }
    }

    fn resolve_note_wikilink(&self, file_part: &str, anchor: &str) -> Result<WikilinkResolution, QueryError> {
        let file = match self.resolve_file_wikilink(file_part)? {
            WikilinkResolution::File(file) => file,
            other => return Ok(other),
        };

        let needle = anchor.to_lowercase();
        let notes = self.find_notes_by_file_oid(&file.oid)?;
        let matches: Vec<NoteRow> = notes
            .into_iter()
            .filter(|n| n.long_title.to_lowercase().ends_with(&needle))
            .collect();

        match matches.len() {
            0 => Ok(WikilinkResolution::NotFound),
            1 => Ok(WikilinkResolution::Note(matches.into_iter().next().unwrap())),
            _ => Ok(WikilinkResolution::Ambiguous(
                matches.into_iter().map(|n| n.long_title).collect(),
            )),
        }
    }

    pub fn find_link_by_go_name(&self, go_name: &str) -> Result<Option<LinkRow>, QueryError> {
        self.conn
            .query_row(
                "SELECT oid, packfile_oid, relative_path, note_oid, url, title, go_name, line,
                        created_at, updated_at
                 FROM link WHERE go_name = ?1",
                params![go_name],
                link_row,
            )
            .optional()
            .map_err(QueryError::from)
    }

    pub fn find_flashcards_by_note_oid(
        &self,
        note_oid: &Oid,
    ) -> Result<Vec<FlashcardRow>, QueryError> {
        let mut stmt = self.conn.prepare(
            "SELECT oid, packfile_oid, relative_path, note_oid, front, back,
                    created_at, updated_at
             FROM flashcard WHERE note_oid = ?1 ORDER BY oid",
        )?;
        let rows = stmt
            .query_map(params![note_oid.as_str()], flashcard_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn find_reminders_due_before(
        &self,
        before: DateTime<Utc>,
    ) -> Result<Vec<ReminderRow>, QueryError> {
        let mut stmt = self.conn.prepare(
            "SELECT oid, packfile_oid, relative_path, note_oid, scheduled_at, recurrence,
                    created_at, updated_at
             FROM reminder WHERE scheduled_at <= ?1 ORDER BY scheduled_at",
        )?;
        let rows = stmt
            .query_map(params![before.to_rfc3339()], reminder_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn find_media_by_source_note(&self, note_oid: &Oid) -> Result<Vec<MediaRow>, QueryError> {
        let mut stmt = self.conn.prepare(
            "SELECT oid, packfile_oid, relative_path, source_note_oid, content_hash, size,
                    mtime, created_at, updated_at
             FROM media WHERE source_note_oid = ?1 ORDER BY oid",
        )?;
        let rows = stmt
            .query_map(params![note_oid.as_str()], media_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Full-text search over note titles and bodies via FTS5, ranked by
    /// relevance (sqlite's default `bm25` ordering).
    pub fn full_text_search(&self, query: &str) -> Result<Vec<NoteRow>, QueryError> {
        let mut stmt = self.conn.prepare(
            "SELECT note.oid, note.packfile_oid, note.relative_path, note.file_oid,
                    note.parent_note_oid, note.kind, note.short_title, note.long_title,
                    note.slug, note.content, note.content_hash, note.created_at, note.updated_at
             FROM note_fts
             JOIN note ON note.oid = note_fts.oid
             WHERE note_fts MATCH ?1
             ORDER BY rank",
        )?;
        let rows = stmt
            .query_map(params![query], note_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter()
            .map(|row| self.hydrate_note(row))
            .collect()
    }

    /// Aggregate counts across every entity kind, plus tag/attribute usage.
    pub fn stats(&self) -> Result<Stats, QueryError> {
        let mut stats = Stats {
            files: self.count_table("file")?,
            notes: self.count_table("note")?,
            flashcards: self.count_table("flashcard")?,
            media: self.count_table("media")?,
            links: self.count_table("link")?,
            reminders: self.count_table("reminder")?,
            ..Default::default()
        };

        let mut stmt = self
            .conn
            .prepare("SELECT tag, COUNT(*) FROM note_tag GROUP BY tag ORDER BY tag")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64)))?;
        for row in rows {
            let (tag, count) = row?;
            stats.tags.insert(tag, count);
        }

        let mut stmt = self
            .conn
            .prepare("SELECT key, COUNT(*) FROM note_attribute GROUP BY key ORDER BY key")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64)))?;
        for row in rows {
            let (key, count) = row?;
            stats.attributes.insert(key, count);
        }

        Ok(stats)
    }

    fn count_table(&self, table: &str) -> Result<u64, QueryError> {
        let sql = format!("SELECT COUNT(*) FROM {table}");
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn hydrate_note(&self, mut row: NoteRow) -> Result<NoteRow, QueryError> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT tag FROM note_tag WHERE note_oid = ?1")?;
        let tags = stmt
            .query_map(params![row.oid.as_str()], |r| r.get::<_, String>(0))?
            .collect::<Result<BTreeSet<_>, _>>()?;
        row.tags = tags;

        let mut stmt = self
            .conn
            .prepare_cached("SELECT key, value FROM note_attribute WHERE note_oid = ?1")?;
        let attrs = stmt
            .query_map(params![row.oid.as_str()], |r| {
                Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?))
            })?
            .collect::<Result<BTreeMap<_, _>, _>>()?;
        row.attributes = attrs;

        Ok(row)
    }
}

fn upsert_in(conn: &Connection, entity: &Entity, packfile_oid: &Oid) -> Result<(), QueryError> {
    match entity {
        Entity::File(f) => {
            conn.execute(
                "INSERT OR REPLACE INTO file
                 (oid, packfile_oid, relative_path, size, content_hash, mtime, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    f.oid.as_str(),
                    packfile_oid.as_str(),
                    f.relative_path,
                    f.size,
                    f.content_hash.as_str(),
                    f.mtime.to_rfc3339(),
                    f.created_at.to_rfc3339(),
                    f.updated_at.to_rfc3339(),
                ],
            )?;
        }
        Entity::Note(n) => {
            conn.execute(
                "INSERT OR REPLACE INTO note
                 (oid, packfile_oid, relative_path, file_oid, parent_note_oid, kind,
                  short_title, long_title, slug, content, content_hash, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                params![
                    n.oid.as_str(),
                    packfile_oid.as_str(),
                    n.relative_path,
                    n.file_oid.as_str(),
                    n.parent_note_oid.as_ref().map(Oid::as_str),
                    n.kind,
                    n.short_title,
                    n.long_title,
                    n.slug,
                    n.content,
                    n.content_hash.as_str(),
                    n.created_at.to_rfc3339(),
                    n.updated_at.to_rfc3339(),
                ],
            )?;
            conn.execute(
                "DELETE FROM note_tag WHERE note_oid = ?1",
                params![n.oid.as_str()],
            )?;
            for tag in &n.tags {
                conn.execute(
                    "INSERT OR REPLACE INTO note_tag (note_oid, tag) VALUES (?1, ?2)",
                    params![n.oid.as_str(), tag],
                )?;
            }
            conn.execute(
                "DELETE FROM note_attribute WHERE note_oid = ?1",
                params![n.oid.as_str()],
            )?;
            for (key, value) in &n.attributes {
                conn.execute(
                    "INSERT OR REPLACE INTO note_attribute (note_oid, key, value) VALUES (?1, ?2, ?3)",
                    params![n.oid.as_str(), key, value],
                )?;
            }
            conn.execute(
                "DELETE FROM note_fts WHERE oid = ?1",
                params![n.oid.as_str()],
            )?;
            conn.execute(
                "INSERT INTO note_fts (oid, long_title, content) VALUES (?1, ?2, ?3)",
                params![n.oid.as_str(), n.long_title, n.content],
            )?;
        }
        Entity::Flashcard(c) => {
            conn.execute(
                "INSERT OR REPLACE INTO flashcard
                 (oid, packfile_oid, relative_path, note_oid, front, back, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    c.oid.as_str(),
                    packfile_oid.as_str(),
                    c.relative_path,
                    c.note_oid.as_str(),
                    c.front,
                    c.back,
                    c.created_at.to_rfc3339(),
                    c.updated_at.to_rfc3339(),
                ],
            )?;
        }
        Entity::Media(m) => {
            conn.execute(
                "INSERT OR REPLACE INTO media
                 (oid, packfile_oid, relative_path, source_note_oid, content_hash, size, mtime,
                  created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    m.oid.as_str(),
                    packfile_oid.as_str(),
                    m.relative_path,
                    m.source_note_oid.as_str(),
                    m.content_hash.as_str(),
                    m.size,
                    m.mtime.to_rfc3339(),
                    m.created_at.to_rfc3339(),
                    m.updated_at.to_rfc3339(),
                ],
            )?;
        }
        Entity::Link(l) => {
            conn.execute(
                "INSERT OR REPLACE INTO link
                 (oid, packfile_oid, relative_path, note_oid, url, title, go_name, line,
                  created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    l.oid.as_str(),
                    packfile_oid.as_str(),
                    l.relative_path,
                    l.note_oid.as_str(),
                    l.url,
                    l.title,
                    l.go_name,
                    l.line as i64,
                    l.created_at.to_rfc3339(),
                    l.updated_at.to_rfc3339(),
                ],
            )?;
        }
        Entity::Reminder(r) => {
            conn.execute(
                "INSERT OR REPLACE INTO reminder
                 (oid, packfile_oid, relative_path, note_oid, scheduled_at, recurrence,
                  created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    r.oid.as_str(),
                    packfile_oid.as_str(),
                    r.relative_path,
                    r.note_oid.as_str(),
                    r.scheduled_at.to_rfc3339(),
                    r.recurrence,
                    r.created_at.to_rfc3339(),
                    r.updated_at.to_rfc3339(),
                ],
            )?;
        }
    }
    Ok(())
}

fn delete_in(conn: &Connection, oid: &Oid, kind: EntityKind) -> Result<(), QueryError> {
    let table = match kind {
        EntityKind::File => "file",
        EntityKind::Note => "note",
        EntityKind::Flashcard => "flashcard",
        EntityKind::Media => "media",
        EntityKind::Link => "link",
        EntityKind::Reminder => "reminder",
    };
    conn.execute(
        &format!("DELETE FROM {table} WHERE oid = ?1"),
        params![oid.as_str()],
    )?;
    if kind == EntityKind::Note {
        conn.execute("DELETE FROM note_tag WHERE note_oid = ?1", params![oid.as_str()])?;
        conn.execute(
            "DELETE FROM note_attribute WHERE note_oid = ?1",
            params![oid.as_str()],
        )?;
        conn.execute("DELETE FROM note_fts WHERE oid = ?1", params![oid.as_str()])?;
    }
    Ok(())
}

fn parse_oid(s: String) -> rusqlite::Result<Oid> {
    Oid::from_hex(&s).map_err(|e| rusqlite::Error::FromSqlConversionFailure(
        0,
        rusqlite::types::Type::Text,
        Box::new(e),
    ))
}

fn parse_timestamp(s: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(e),
        ))
}

/// A path's directory component plus stem, dropping the final extension
/// (e.g. `notes/Example.md` -> `notes/Example`).
fn strip_extension(relative_path: &str) -> &str {
    match relative_path.rfind('/') {
        Some(slash) => match relative_path[slash..].rfind('.') {
            Some(dot) => &relative_path[..slash + dot],
            None => relative_path,
        },
        None => match relative_path.rfind('.') {
            Some(dot) => &relative_path[..dot],
            None => relative_path,
        },
    }
}

fn file_row(row: &Row<'_>) -> rusqlite::Result<FileRow> {
    Ok(FileRow {
        oid: parse_oid(row.get(0)?)?,
        packfile_oid: parse_oid(row.get(1)?)?,
        relative_path: row.get(2)?,
        size: row.get::<_, i64>(3)? as u64,
        content_hash: parse_oid(row.get(4)?)?,
        mtime: parse_timestamp(row.get(5)?)?,
        created_at: parse_timestamp(row.get(6)?)?,
        updated_at: parse_timestamp(row.get(7)?)?,
    })
}

fn note_row(row: &Row<'_>) -> rusqlite::Result<NoteRow> {
    let parent: Option<String> = row.get(4)?;
    Ok(NoteRow {
        oid: parse_oid(row.get(0)?)?,
        packfile_oid: parse_oid(row.get(1)?)?,
        relative_path: row.get(2)?,
        file_oid: parse_oid(row.get(3)?)?,
        parent_note_oid: parent.map(|s| Oid::from_hex(&s)).transpose().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?,
        kind: row.get(5)?,
        short_title: row.get(6)?,
        long_title: row.get(7)?,
        slug: row.get(8)?,
        content: row.get(9)?,
        content_hash: parse_oid(row.get(10)?)?,
        tags: BTreeSet::new(),
        attributes: BTreeMap::new(),
        created_at: parse_timestamp(row.get(11)?)?,
        updated_at: parse_timestamp(row.get(12)?)?,
    })
}

fn flashcard_row(row: &Row<'_>) -> rusqlite::Result<FlashcardRow> {
    Ok(FlashcardRow {
        oid: parse_oid(row.get(0)?)?,
        packfile_oid: parse_oid(row.get(1)?)?,
        relative_path: row.get(2)?,
        note_oid: parse_oid(row.get(3)?)?,
        front: row.get(4)?,
        back: row.get(5)?,
        created_at: parse_timestamp(row.get(6)?)?,
        updated_at: parse_timestamp(row.get(7)?)?,
    })
}

fn media_row(row: &Row<'_>) -> rusqlite::Result<MediaRow> {
    Ok(MediaRow {
        oid: parse_oid(row.get(0)?)?,
        packfile_oid: parse_oid(row.get(1)?)?,
        relative_path: row.get(2)?,
        source_note_oid: parse_oid(row.get(3)?)?,
        content_hash: parse_oid(row.get(4)?)?,
        size: row.get::<_, i64>(5)? as u64,
        mtime: parse_timestamp(row.get(6)?)?,
        created_at: parse_timestamp(row.get(7)?)?,
        updated_at: parse_timestamp(row.get(8)?)?,
    })
}

fn link_row(row: &Row<'_>) -> rusqlite::Result<LinkRow> {
    Ok(LinkRow {
        oid: parse_oid(row.get(0)?)?,
        packfile_oid: parse_oid(row.get(1)?)?,
        relative_path: row.get(2)?,
        note_oid: parse_oid(row.get(3)?)?,
        url: row.get(4)?,
        title: row.get(5)?,
        go_name: row.get(6)?,
        line: row.get::<_, i64>(7)? as u64,
        created_at: parse_timestamp(row.get(8)?)?,
        updated_at: parse_timestamp(row.get(9)?)?,
    })
}

fn reminder_row(row: &Row<'_>) -> rusqlite::Result<ReminderRow> {
    Ok(ReminderRow {
        oid: parse_oid(row.get(0)?)?,
        packfile_oid: parse_oid(row.get(1)?)?,
        relative_path: row.get(2)?,
        note_oid: parse_oid(row.get(3)?)?,
        scheduled_at: parse_timestamp(row.get(4)?)?,
        recurrence: row.get(5)?,
        created_at: parse_timestamp(row.get(6)?)?,
        updated_at: parse_timestamp(row.get(7)?)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nt_entities::{File, Note};
    use nt_hash::{EntityIdGenerator, RandomIdGenerator};

    fn sample_file(path: &str) -> (File, Oid) {
        let gen = RandomIdGenerator;
        let now = Utc::now();
        let content_hash = Oid::from_content(b"hello");
        (
            File {
                oid: gen.next_oid(),
                relative_path: path.to_string(),
                size: 5,
                content_hash,
                mtime: now,
                body: "hello".to_string(),
                created_at: now,
                updated_at: now,
            },
            Oid::from_content(b"packfile"),
        )
    }

    #[test]
    fn upsert_and_find_file_by_path() {
        let db = Database::open_in_memory().unwrap();
        let (file, pack_oid) = sample_file("notes/a.md");
        db.upsert(&Entity::File(file.clone()), &pack_oid).unwrap();

        let found = db.find_file_by_path("notes/a.md").unwrap().unwrap();
        assert_eq!(found.oid, file.oid);
        assert_eq!(found.relative_path, "notes/a.md");
    }

    #[test]
    fn upsert_note_populates_tags_and_fts() {
        let db = Database::open_in_memory().unwrap();
        let gen = RandomIdGenerator;
        let now = Utc::now();
        let (file, pack_oid) = sample_file("notes/b.md");
        db.upsert(&Entity::File(file.clone()), &pack_oid).unwrap();
        let mut tags = BTreeSet::new();
        tags.insert("work".to_string());
        let note = Note {
            oid: gen.next_oid(),
            relative_path: "notes/b.md".to_string(),
            file_oid: file.oid.clone(),
            parent_note_oid: None,
            kind: "Note".to_string(),
            short_title: "Example".to_string(),
            long_title: "Example".to_string(),
            slug: "example".to_string(),
            content: "some searchable body text".to_string(),
            content_hash: Oid::from_content(b"body"),
            attributes: BTreeMap::new(),
            tags,
            created_at: now,
            updated_at: now,
        };
        db.upsert(&Entity::Note(note.clone()), &pack_oid).unwrap();

        let results = db.full_text_search("searchable").unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].tags.contains("work"));

        match db.find_notes_by_wikilink("b#Example").unwrap() {
            WikilinkResolution::Note(found) => assert_eq!(found.oid, note.oid),
            other => panic!("expected a unique note match, got {other:?}"),
        }
        match db.find_notes_by_wikilink("notes/b").unwrap() {
            WikilinkResolution::File(found) => assert_eq!(found.oid, file.oid),
            other => panic!("expected a unique file match, got {other:?}"),
        }
    }

    #[test]
    fn delete_removes_note_and_its_joins() {
        let db = Database::open_in_memory().unwrap();
        let gen = RandomIdGenerator;
        let now = Utc::now();
        let (file, pack_oid) = sample_file("notes/c.md");
        db.upsert(&Entity::File(file.clone()), &pack_oid).unwrap();
        let note = Note {
            oid: gen.next_oid(),
            relative_path: "notes/c.md".to_string(),
            file_oid: file.oid.clone(),
            parent_note_oid: None,
            kind: "Note".to_string(),
            short_title: "Gone".to_string(),
            long_title: "Gone".to_string(),
            slug: "gone".to_string(),
            content: "temporary".to_string(),
            content_hash: Oid::from_content(b"temp"),
            attributes: BTreeMap::new(),
            tags: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        };
        db.upsert(&Entity::Note(note.clone()), &pack_oid).unwrap();
        db.delete(&note.oid, EntityKind::Note).unwrap();

        assert_eq!(
            db.find_notes_by_wikilink("c#Gone").unwrap(),
            WikilinkResolution::NotFound
        );
        assert!(db.full_text_search("temporary").unwrap().is_empty());
    }

    #[test]
    fn wikilink_file_match_is_ambiguous_across_two_paths() {
        let db = Database::open_in_memory().unwrap();
        let (file_a, pack_a) = sample_file("work/example.md");
        let (file_b, pack_b) = sample_file("journal/example.md");
        db.upsert(&Entity::File(file_a), &pack_a).unwrap();
        db.upsert(&Entity::File(file_b), &pack_b).unwrap();

        match db.find_notes_by_wikilink("example").unwrap() {
            WikilinkResolution::Ambiguous(paths) => assert_eq!(paths.len(), 2),
            other => panic!("expected ambiguity between two files, got {other:?}"),
        }
    }

    #[test]
    fn stats_counts_kinds_and_tags() {
        let db = Database::open_in_memory().unwrap();
        let (file, pack_oid) = sample_file("notes/d.md");
        db.upsert(&Entity::File(file), &pack_oid).unwrap();
        let stats = db.stats().unwrap();
        assert_eq!(stats.files, 1);
        assert_eq!(stats.notes, 0);
    }

    #[test]
    fn rebuild_from_replaces_prior_contents() {
        let mut db = Database::open_in_memory().unwrap();
        let (file_a, pack_oid) = sample_file("notes/a.md");
        db.upsert(&Entity::File(file_a), &pack_oid).unwrap();

        let (file_b, pack_oid_b) = sample_file("notes/b.md");
        db.rebuild_from(vec![(Entity::File(file_b), pack_oid_b)])
            .unwrap();

        assert!(db.find_file_by_path("notes/a.md").unwrap().is_none());
        assert!(db.find_file_by_path("notes/b.md").unwrap().is_some());
    }
}
