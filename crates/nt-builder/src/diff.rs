//! `diff`: render a unified, per-entity textual diff between two
//! generations of a pack file (§4.8).
//!
//! `--staged` compares the committed (primary) pack against the staged
//! one; the default compares the staged pack (or primary, if nothing is
//! staged) against a throwaway re-parse of the working tree.

use crate::error::BuildError;
use crate::reconcile;
use crate::walk;
use crate::Builder;
use chrono::Utc;
use nt_entities::extract::{self, ExtractConfig};
use nt_entities::{Entity, EntityKind};
use nt_hash::{Oid, RandomIdGenerator};
use nt_index::{Index, PathSpecSet};
use nt_markdown::ParsedFile;
use nt_objects::ObjectStore;
use nt_query::Database;
use std::collections::HashMap;

/// What happened to one identified entity between the two generations
/// compared.
#[derive(Debug, Clone)]
pub enum EntityChange {
    Added(Entity),
    Removed(Entity),
    Modified { old: Entity, new: Entity },
}

/// One entity's change, identified the same way the builder keeps entity
/// OIDs stable across edits: `(kind, long_title)`.
#[derive(Debug, Clone)]
pub struct EntityDiff {
    pub relative_path: String,
    pub kind: EntityKind,
    pub long_title: String,
    pub change: EntityChange,
}

impl Builder {
    /// Diff every index entry selected by `pathspecs`. `staged` selects
    /// committed-vs-staged; otherwise staged-vs-working-tree.
    pub fn diff(&self, staged: bool, pathspecs: &[String]) -> Result<Vec<EntityDiff>, BuildError> {
        let store = ObjectStore::open(&self.state_dir)?;
        let index = Index::load(&self.index_path())?;
        let mut db = Database::open(&self.database_path())?;
        reconcile::reconcile_index_from_db(&index, &store, &self.objects_dir(), &mut db)?;

        let pathspec_set = PathSpecSet::parse(pathspecs)?;
        let extract_config = ExtractConfig {
            recognized_kinds: self.config.notes.kinds.clone(),
            treat_unkinded_as_note: self.config.notes.treat_unkinded_as_note,
            inherit_index_attributes: self.config.notes.inherit_index_attributes,
        };
        let id_gen = RandomIdGenerator;
        let now = Utc::now();

        let mut diffs = Vec::new();

        for entry in index.iter() {
            if !pathspec_set.matches(&entry.relative_path) {
                continue;
            }

            let (old_entities, new_entities) = if staged {
                let old = match &entry.oid {
                    Some(oid) => store.read_pack(oid)?.decode_entities()?,
                    None => Vec::new(),
                };
                let new = match &entry.staged_packfile_oid {
                    Some(oid) => store.read_pack(oid)?.decode_entities()?,
                    None => Vec::new(),
                };
                (old, new)
            } else {
                let baseline_oid = if entry.staged {
                    &entry.staged_packfile_oid
                } else {
                    &entry.oid
                };
                let old = match baseline_oid {
                    Some(oid) => store.read_pack(oid)?.decode_entities()?,
                    None => Vec::new(),
                };
                let abs_path = self.root.join(&entry.relative_path);
                let new = if abs_path.exists() {
                    let parsed = ParsedFile::parse(&abs_path, &entry.relative_path)
                        .map_err(|source| BuildError::Parse {
                            path: entry.relative_path.clone(),
                            source,
                        })?;
                    let previous = extract::previous_entities(&old);
                    let media_reader = |path: &std::path::Path| std::fs::read(path).ok();
                    extract::extract(&parsed, &extract_config, &previous, now, &id_gen, &media_reader)
                        .into_entities()
                } else {
                    Vec::new()
                };
                (old, new)
            };

            diffs.extend(diff_entities(&entry.relative_path, &old_entities, &new_entities));
        }

        Ok(diffs)
    }
}

/// `(kind, long_title) -> entity`, using the same identity scheme the
/// builder uses to keep OIDs stable across re-packs.
fn keyed(entities: &[Entity]) -> HashMap<(EntityKind, String), Entity> {
    let by_oid: HashMap<(EntityKind, Oid), &Entity> = entities
        .iter()
        .map(|e| ((e.kind(), e.oid().clone()), e))
        .collect();
    extract::previous_entities(entities)
        .into_iter()
        .filter_map(|p| {
            by_oid
                .get(&(p.kind, p.oid.clone()))
                .map(|e| ((p.kind, p.long_title), (*e).clone()))
        })
        .collect()
}

fn diff_entities(relative_path: &str, old: &[Entity], new: &[Entity]) -> Vec<EntityDiff> {
    let old_by_key = keyed(old);
    let new_by_key = keyed(new);

    let mut keys: Vec<&(EntityKind, String)> = old_by_key.keys().chain(new_by_key.keys()).collect();
    keys.sort();
    keys.dedup();

    keys.into_iter()
        .filter_map(|key| {
            let change = match (old_by_key.get(key), new_by_key.get(key)) {
                (None, Some(new)) => Some(EntityChange::Added(new.clone())),
                (Some(old), None) => Some(EntityChange::Removed(old.clone())),
                (Some(old), Some(new)) if old != new => Some(EntityChange::Modified {
                    old: old.clone(),
                    new: new.clone(),
                }),
                _ => None,
            };
            change.map(|change| EntityDiff {
                relative_path: relative_path.to_string(),
                kind: key.0,
                long_title: key.1.clone(),
                change,
            })
        })
        .collect()
}

/// Render a list of entity diffs as a concatenated unified-style patch,
/// one hunk per entity, YAML on either side of the `---`/`+++` markers.
pub fn render_diff(diffs: &[EntityDiff]) -> String {
    let mut out = String::new();
    for diff in diffs {
        out.push_str(&format!(
            "--- {} [{}] {}\n",
            diff.relative_path, diff.kind, diff.long_title
        ));
        let (old_text, new_text) = match &diff.change {
            EntityChange::Added(new) => (String::new(), to_yaml(new)),
            EntityChange::Removed(old) => (to_yaml(old), String::new()),
            EntityChange::Modified { old, new } => (to_yaml(old), to_yaml(new)),
        };
        out.push_str(&format!(
            "+++ {} [{}] {}\n",
            diff.relative_path, diff.kind, diff.long_title
        ));
        out.push_str(&render_lines(&old_text, &new_text));
        out.push('\n');
    }
    out
}

fn to_yaml(entity: &Entity) -> String {
    serde_yaml::to_string(entity).unwrap_or_default()
}

/// A minimal LCS-based line diff; entity YAML bodies are small enough that
/// quadratic time is not a concern.
fn render_lines(old_text: &str, new_text: &str) -> String {
    let old_lines: Vec<&str> = old_text.lines().collect();
    let new_lines: Vec<&str> = new_text.lines().collect();
    let n = old_lines.len();
    let m = new_lines.len();

    let mut lcs = vec![vec![0usize; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            lcs[i][j] = if old_lines[i] == new_lines[j] {
                lcs[i + 1][j + 1] + 1
            } else {
                lcs[i + 1][j].max(lcs[i][j + 1])
            };
        }
    }

    let mut out = String::new();
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if old_lines[i] == new_lines[j] {
            out.push_str("  ");
            out.push_str(old_lines[i]);
            out.push('\n');
            i += 1;
            j += 1;
        } else if lcs[i + 1][j] >= lcs[i][j + 1] {
            out.push_str("- ");
            out.push_str(old_lines[i]);
            out.push('\n');
            i += 1;
        } else {
            out.push_str("+ ");
            out.push_str(new_lines[j]);
            out.push('\n');
            j += 1;
        }
    }
    for line in &old_lines[i..n] {
        out.push_str("- ");
        out.push_str(line);
        out.push('\n');
    }
    for line in &new_lines[j..m] {
        out.push_str("+ ");
        out.push_str(line);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use nt_config::Config;
    use nt_test_utils::TestWorkspace;

    #[test]
    fn staged_diff_shows_added_note_after_first_add() {
        let ws = TestWorkspace::new().with_note("notes.md", "## Note: Hi\nbody\n");
        let builder = Builder::new(ws.root().to_path_buf(), Config::default());
        builder.add(&[]).unwrap();

        let diffs = builder.diff(true, &[]).unwrap();
        assert_eq!(diffs.len(), 1);
        assert!(matches!(diffs[0].change, EntityChange::Added(_)));
        assert_eq!(diffs[0].long_title, "Note: Hi");
    }

    #[test]
    fn staged_diff_is_empty_after_commit() {
        let ws = TestWorkspace::new().with_note("notes.md", "## Note: Hi\nbody\n");
        let builder = Builder::new(ws.root().to_path_buf(), Config::default());
        builder.add(&[]).unwrap();
        builder.commit().unwrap();

        let diffs = builder.diff(true, &[]).unwrap();
        assert!(diffs.is_empty());
    }

    #[test]
    fn working_tree_diff_shows_modified_body_without_writing_pack() {
        let ws = TestWorkspace::new().with_note("notes.md", "## Note: Hi\noriginal\n");
        let builder = Builder::new(ws.root().to_path_buf(), Config::default());
        builder.add(&[]).unwrap();
        builder.commit().unwrap();

        std::fs::write(ws.root().join("notes.md"), "## Note: Hi\nedited\n").unwrap();
        let diffs = builder.diff(false, &[]).unwrap();

        let note_change = diffs
            .iter()
            .find(|d| d.kind == EntityKind::Note)
            .expect("note diff present");
        assert!(matches!(note_change.change, EntityChange::Modified { .. }));

        // Re-running status confirms the working-tree re-parse wrote nothing.
        let status = builder.status(&[]).unwrap();
        assert_eq!(status.not_staged, vec!["notes.md".to_string()]);
    }

    #[test]
    fn render_diff_includes_entity_headers() {
        let ws = TestWorkspace::new().with_note("notes.md", "## Note: Hi\nbody\n");
        let builder = Builder::new(ws.root().to_path_buf(), Config::default());
        builder.add(&[]).unwrap();

        let diffs = builder.diff(true, &[]).unwrap();
        let rendered = render_diff(&diffs);
        assert!(rendered.contains("notes.md"));
        assert!(rendered.contains("Note: Hi"));
    }
}
