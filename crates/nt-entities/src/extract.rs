//! Turns a [`nt_markdown::ParsedFile`] into an [`ExtractedEntities`].

use crate::kind::{self, DEFAULT_KINDS};
use crate::tags::{self, TagsAttrs};
use crate::{
    system_time_to_utc, EntityKind, ExtractedEntities, Flashcard, Link, Media, Note, Reminder,
};
use crate::File as FileEntity;
use chrono::{DateTime, Utc};
use nt_hash::{EntityIdGenerator, Oid};
use nt_markdown::ParsedFile;
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

/// Tunables the workspace configuration hands to the extractor.
pub struct ExtractConfig {
    /// Note kinds recognised in `<Kind>: <Title>` headings.
    pub recognized_kinds: Vec<String>,
    /// Whether an unkinded heading is still extracted as a plain `Note`.
    pub treat_unkinded_as_note: bool,
    /// Whether a note inherits attributes set on the file's index entry.
    /// Reserved for the builder's attribute-inheritance wiring; unused by
    /// the extractor itself, which always applies front-matter inheritance.
    pub inherit_index_attributes: bool,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        ExtractConfig {
            recognized_kinds: DEFAULT_KINDS.iter().map(|s| s.to_string()).collect(),
            treat_unkinded_as_note: false,
            inherit_index_attributes: false,
        }
    }
}

/// A previously extracted entity's identity, used to keep OIDs stable
/// across re-packs. `long_title` is the file's own `relative_path` for a
/// [`EntityKind::File`] entry.
#[derive(Debug, Clone)]
pub struct PreviousEntity {
    pub kind: EntityKind,
    pub long_title: String,
    pub oid: Oid,
    pub created_at: DateTime<Utc>,
}

fn go_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"#go/([A-Za-z0-9_-]+)").expect("static go-link regex"))
}

fn go_link_name(haystack: &str) -> Option<String> {
    go_name_re()
        .captures(haystack)
        .map(|c| c[1].to_string())
}

/// Resolve an internal media reference's bytes, for hashing. Injected so the
/// extractor stays pure and testable; the builder passes `std::fs::read`.
pub trait MediaReader {
    fn read(&self, path: &Path) -> Option<Vec<u8>>;
}

impl<F: Fn(&Path) -> Option<Vec<u8>>> MediaReader for F {
    fn read(&self, path: &Path) -> Option<Vec<u8>> {
        self(path)
    }
}

/// Extract every entity carried by `parsed`.
///
/// `previous` is the prior pack file's entity index for the same source
/// path (empty for a file seen for the first time); it is how extraction
/// keeps entity OIDs stable across edits.
pub fn extract(
    parsed: &ParsedFile,
    config: &ExtractConfig,
    previous: &[PreviousEntity],
    now: DateTime<Utc>,
    id_gen: &dyn EntityIdGenerator,
    media_reader: &dyn MediaReader,
) -> ExtractedEntities {
    let recognized_kinds: Vec<&str> = config.recognized_kinds.iter().map(String::as_str).collect();
    let find_prev = |kind: EntityKind, title: &str| {
        previous
            .iter()
            .find(|p| p.kind == kind && p.long_title == title)
    };

    let file_oid = find_prev(EntityKind::File, &parsed.rel_path)
        .map(|p| p.oid.clone())
        .unwrap_or_else(|| id_gen.next_oid());
    let file_created_at = find_prev(EntityKind::File, &parsed.rel_path)
        .map(|p| p.created_at)
        .unwrap_or(now);

    let file = FileEntity {
        oid: file_oid.clone(),
        relative_path: parsed.rel_path.clone(),
        size: parsed.size,
        content_hash: parsed.content_hash.clone(),
        mtime: system_time_to_utc(parsed.mtime),
        body: parsed.body.clone(),
        created_at: file_created_at,
        updated_at: now,
    };

    let front_matter_tags_attrs = parsed
        .front_matter
        .as_ref()
        .map(|fm| tags::extract_front_matter(&fm.data))
        .unwrap_or_default();

    let mut notes = Vec::new();
    let mut flashcards = Vec::new();
    let mut links = Vec::new();
    let mut media = Vec::new();
    let mut reminders = Vec::new();

    let mut note_oid_by_section: HashMap<usize, Oid> = HashMap::new();
    let mut tags_attrs_by_section: HashMap<usize, TagsAttrs> = HashMap::new();

    for (idx, section) in parsed.sections.iter().enumerate() {
        let Some(hk) = kind::parse_heading_kind(
            &section.heading,
            &recognized_kinds,
            config.treat_unkinded_as_note,
        ) else {
            continue;
        };

        let own = tags::extract(&section.body);
        tags_attrs_by_section.insert(idx, own.clone());

        let mut ancestors = Vec::new();
        let mut cursor = section.parent;
        while let Some(p) = cursor {
            if let Some(ta) = tags_attrs_by_section.get(&p) {
                ancestors.push(ta.clone());
            }
            cursor = parsed.sections[p].parent;
        }
        let (tags, attributes) = {
            let merged = tags::merge(&own, &ancestors, &front_matter_tags_attrs);
            (merged.tags, merged.attrs)
        };

        let slug = kind::slugify(&hk.title);
        let long_title = format!("{}: {}", hk.kind, hk.title);
        let parent_note_oid = section.parent.and_then(|p| note_oid_by_section.get(&p).cloned());

        let prev = find_prev(EntityKind::Note, &long_title);
        let note_oid = prev.map(|p| p.oid.clone()).unwrap_or_else(|| id_gen.next_oid());
        let note_created_at = prev.map(|p| p.created_at).unwrap_or(now);
        let content_hash = Oid::from_content(section.body.as_bytes());

        if hk.kind.eq_ignore_ascii_case("flashcard") {
            let blocks = nt_markdown::split_on_horizontal_rules(&section.body);
            let front = blocks.first().map(|s| s.trim().to_string()).unwrap_or_default();
            let back = blocks.get(1).map(|s| s.trim().to_string()).unwrap_or_default();
            let fc_prev = find_prev(EntityKind::Flashcard, &long_title);
            flashcards.push(Flashcard {
                oid: fc_prev.map(|p| p.oid.clone()).unwrap_or_else(|| id_gen.next_oid()),
                relative_path: parsed.rel_path.clone(),
                note_oid: note_oid.clone(),
                front,
                back,
                created_at: fc_prev.map(|p| p.created_at).unwrap_or(now),
                updated_at: now,
            });
        }

        for wl in nt_markdown::extract_wikilinks(&section.body) {
            let go_name = go_link_name(&wl.target)
                .or_else(|| wl.display_text.as_deref().and_then(go_link_name));
            let link_prev = find_prev(
                EntityKind::Link,
                &format!("{}#{}", long_title, wl.line),
            );
            links.push(Link {
                oid: link_prev.map(|p| p.oid.clone()).unwrap_or_else(|| id_gen.next_oid()),
                relative_path: parsed.rel_path.clone(),
                note_oid: note_oid.clone(),
                url: wl.target.clone(),
                title: wl.display_text.clone(),
                go_name,
                line: wl.line,
                created_at: link_prev.map(|p| p.created_at).unwrap_or(now),
                updated_at: now,
            });
        }
        for ml in nt_markdown::extract_markdown_links(&section.body) {
            let go_name = go_link_name(&ml.text).or_else(|| {
                ml.title.as_deref().and_then(go_link_name)
            });
            let link_prev = find_prev(
                EntityKind::Link,
                &format!("{}#{}", long_title, ml.line),
            );
            links.push(Link {
                oid: link_prev.map(|p| p.oid.clone()).unwrap_or_else(|| id_gen.next_oid()),
                relative_path: parsed.rel_path.clone(),
                note_oid: note_oid.clone(),
                url: ml.url.clone(),
                title: ml.title.clone().or(Some(ml.text.clone())).filter(|s| !s.is_empty()),
                go_name,
                line: ml.line,
                created_at: link_prev.map(|p| p.created_at).unwrap_or(now),
                updated_at: now,
            });
        }

        let base_dir = parsed.dir();
        for img in nt_markdown::extract_images(&section.body, &base_dir) {
            if !img.is_internal {
                continue;
            }
            let Some(resolved) = img.resolved_path.as_ref() else {
                continue;
            };
            let Some(bytes) = media_reader.read(resolved) else {
                tracing::warn!(path = %resolved.display(), "referenced media file not found, skipping");
                continue;
            };
            let rel = pathdiff(resolved, &parsed.abs_path);
            let media_prev = find_prev(EntityKind::Media, &rel);
            media.push(Media {
                oid: media_prev.map(|p| p.oid.clone()).unwrap_or_else(|| id_gen.next_oid()),
                relative_path: rel,
                source_note_oid: note_oid.clone(),
                content_hash: Oid::from_content(&bytes),
                size: bytes.len() as u64,
                mtime: now,
                created_at: media_prev.map(|p| p.created_at).unwrap_or(now),
                updated_at: now,
            });
        }

        if let Some(reminder_at) = attributes.get("reminder") {
            if let Ok(scheduled_at) = DateTime::parse_from_rfc3339(reminder_at) {
                let reminder_prev = find_prev(EntityKind::Reminder, &long_title);
                reminders.push(Reminder {
                    oid: reminder_prev
                        .map(|p| p.oid.clone())
                        .unwrap_or_else(|| id_gen.next_oid()),
                    relative_path: parsed.rel_path.clone(),
                    note_oid: note_oid.clone(),
                    scheduled_at: scheduled_at.with_timezone(&Utc),
                    recurrence: attributes.get("recurrence").cloned(),
                    created_at: reminder_prev.map(|p| p.created_at).unwrap_or(now),
                    updated_at: now,
                });
            } else {
                tracing::warn!(note = %long_title, value = %reminder_at, "malformed @reminder attribute, ignoring");
            }
        }

        note_oid_by_section.insert(idx, note_oid.clone());
        notes.push(Note {
            oid: note_oid,
            relative_path: parsed.rel_path.clone(),
            file_oid: file_oid.clone(),
            parent_note_oid,
            kind: hk.kind,
            short_title: hk.title,
            long_title,
            slug,
            content: section.body.clone(),
            content_hash,
            attributes,
            tags,
            created_at: note_created_at,
            updated_at: now,
        });
    }

    ExtractedEntities {
        file: Some(file),
        notes,
        flashcards,
        media,
        links,
        reminders,
    }
}

/// Rebuild the `previous` slice [`extract`] expects from a prior pack's
/// decoded entities, so OIDs stay stable across re-packs. Mirrors the
/// `long_title` keys `extract` itself assigns to each entity kind.
pub fn previous_entities(entities: &[crate::Entity]) -> Vec<PreviousEntity> {
    use crate::Entity;

    let mut note_long_titles: HashMap<Oid, String> = HashMap::new();
    for entity in entities {
        if let Entity::Note(n) = entity {
            note_long_titles.insert(n.oid.clone(), n.long_title.clone());
        }
    }

    entities
        .iter()
        .filter_map(|entity| {
            let (kind, long_title, oid, created_at) = match entity {
                Entity::File(f) => (
                    EntityKind::File,
                    f.relative_path.clone(),
                    f.oid.clone(),
                    f.created_at,
                ),
                Entity::Note(n) => (
                    EntityKind::Note,
                    n.long_title.clone(),
                    n.oid.clone(),
                    n.created_at,
                ),
                Entity::Flashcard(fc) => (
                    EntityKind::Flashcard,
                    note_long_titles.get(&fc.note_oid)?.clone(),
                    fc.oid.clone(),
                    fc.created_at,
                ),
                Entity::Media(m) => (
                    EntityKind::Media,
                    m.relative_path.clone(),
                    m.oid.clone(),
                    m.created_at,
                ),
                Entity::Link(l) => (
                    EntityKind::Link,
                    format!("{}#{}", note_long_titles.get(&l.note_oid)?, l.line),
                    l.oid.clone(),
                    l.created_at,
                ),
                Entity::Reminder(r) => (
                    EntityKind::Reminder,
                    note_long_titles.get(&r.note_oid)?.clone(),
                    r.oid.clone(),
                    r.created_at,
                ),
            };
            Some(PreviousEntity {
                kind,
                long_title,
                oid,
                created_at,
            })
        })
        .collect()
}

fn pathdiff(resolved: &Path, file_abs_path: &Path) -> String {
    let root = file_abs_path.parent().unwrap_or(Path::new(""));
    resolved
        .strip_prefix(root)
        .unwrap_or(resolved)
        .to_string_lossy()
        .replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use nt_hash::RandomIdGenerator;

    fn no_media(_: &Path) -> Option<Vec<u8>> {
        None
    }

    #[test]
    fn extracts_file_and_notes() {
        let parsed = ParsedFile::parse_text(
            "notes.md",
            "## Note: Example 1\nA first note.\n\n## Note: Example 2\nA second note.\n",
        );
        let gen = RandomIdGenerator;
        let result = extract(
            &parsed,
            &ExtractConfig::default(),
            &[],
            Utc::now(),
            &gen,
            &no_media,
        );
        assert!(result.file.is_some());
        assert_eq!(result.notes.len(), 2);
        assert_eq!(result.notes[0].long_title, "Note: Example 1");
    }

    #[test]
    fn flashcard_kind_splits_front_and_back() {
        let parsed = ParsedFile::parse_text(
            "cards.md",
            "## Flashcard: Capitals\nWhat is the capital of France?\n\n---\n\nParis\n",
        );
        let gen = RandomIdGenerator;
        let result = extract(
            &parsed,
            &ExtractConfig::default(),
            &[],
            Utc::now(),
            &gen,
            &no_media,
        );
        assert_eq!(result.flashcards.len(), 1);
        assert_eq!(result.flashcards[0].front, "What is the capital of France?");
        assert_eq!(result.flashcards[0].back, "Paris");
    }

    #[test]
    fn entity_oid_is_reused_across_reparse() {
        let parsed = ParsedFile::parse_text("notes.md", "## Note: Stable\nbody\n");
        let gen = RandomIdGenerator;
        let first = extract(&parsed, &ExtractConfig::default(), &[], Utc::now(), &gen, &no_media);
        let prev_oid = first.notes[0].oid.clone();
        let prev_created = first.notes[0].created_at;

        let previous = vec![PreviousEntity {
            kind: EntityKind::Note,
            long_title: "Note: Stable".to_string(),
            oid: prev_oid.clone(),
            created_at: prev_created,
        }];

        let reparsed = ParsedFile::parse_text("notes.md", "## Note: Stable\nedited body\n");
        let second = extract(&reparsed, &ExtractConfig::default(), &previous, Utc::now(), &gen, &no_media);
        assert_eq!(second.notes[0].oid, prev_oid);
        assert_eq!(second.notes[0].created_at, prev_created);
    }

    #[test]
    fn go_link_is_detected_in_wikilink_display_text() {
        let parsed = ParsedFile::parse_text(
            "notes.md",
            "## Note: Hub\nSee [[Home|#go/home]] for the dashboard.\n",
        );
        let gen = RandomIdGenerator;
        let result = extract(&parsed, &ExtractConfig::default(), &[], Utc::now(), &gen, &no_media);
        assert_eq!(result.links.len(), 1);
        assert_eq!(result.links[0].go_name.as_deref(), Some("home"));
    }

    #[test]
    fn reminder_attribute_produces_reminder_entity() {
        let parsed = ParsedFile::parse_text(
            "notes.md",
            "## TODO: Pay rent\nDue `@reminder: 2026-08-01T09:00:00Z`.\n",
        );
        let gen = RandomIdGenerator;
        let result = extract(&parsed, &ExtractConfig::default(), &[], Utc::now(), &gen, &no_media);
        assert_eq!(result.reminders.len(), 1);
    }

    #[test]
    fn previous_entities_reconstructs_stable_oids_across_repack() {
        let parsed = ParsedFile::parse_text(
            "notes.md",
            "## Note: Hub\nSee [[Home]].\n\n`@reminder: 2026-08-01T09:00:00Z`\n",
        );
        let gen = RandomIdGenerator;
        let first = extract(&parsed, &ExtractConfig::default(), &[], Utc::now(), &gen, &no_media);
        let previous = previous_entities(&first.clone().into_entities());

        let link_oid = first.links[0].oid.clone();
        let reminder_oid = first.reminders[0].oid.clone();

        let reparsed = ParsedFile::parse_text(
            "notes.md",
            "## Note: Hub\nSee [[Home]].\n\n`@reminder: 2026-08-01T09:00:00Z`\n",
        );
        let second = extract(&reparsed, &ExtractConfig::default(), &previous, Utc::now(), &gen, &no_media);
        assert_eq!(second.links[0].oid, link_oid);
        assert_eq!(second.reminders[0].oid, reminder_oid);
    }

    #[test]
    fn favorite_tag_does_not_propagate_to_child_heading() {
        let parsed = ParsedFile::parse_text(
            "notes.md",
            "# Note: Parent `#favorite`\nouter\n## Note: Child\ninner\n",
        );
        let gen = RandomIdGenerator;
        let result = extract(&parsed, &ExtractConfig::default(), &[], Utc::now(), &gen, &no_media);
        let child = result.notes.iter().find(|n| n.short_title == "Child").unwrap();
        assert!(!child.tags.contains("favorite"));
    }
}
