//! `add`: walk, diff-by-stat, parse, extract, pack, and stage (§4.7).

use crate::error::BuildError;
use crate::inherit::{self, IndexFrontMatterCache};
use crate::lock::ProcessLock;
use crate::walk::{self, WalkEntry};
use crate::Builder;
use chrono::{DateTime, Utc};
use nt_entities::extract::{self, ExtractConfig, PreviousEntity};
use nt_entities::{Entity, EntityKind};
use nt_hash::{EntityIdGenerator, Oid, RandomIdGenerator};
use nt_index::{Index, PathSpecSet};
use nt_markdown::ParsedFile;
use nt_objects::{ObjectStore, PackFile};
use nt_query::Database;
use rayon::prelude::*;
use serde_yaml::Mapping;
use std::collections::HashSet;
use std::path::Path;

/// What one `add` run did.
#[derive(Debug, Default)]
pub struct AddReport {
    /// Relative paths whose pack file was (re)written and staged.
    pub staged: Vec<String>,
    /// Relative paths that existed in the index but vanished from disk.
    pub removed: Vec<String>,
    /// Files that failed to parse; the path and the reason. These do not
    /// abort the run (§4.7).
    pub parse_errors: Vec<(String, nt_markdown::ParseError)>,
}

struct FileResult {
    relative_path: String,
    pack_oid: Oid,
    mtime: DateTime<Utc>,
    size: u64,
    new_entities: Vec<Entity>,
    stale: Vec<(Oid, EntityKind)>,
    front_matter: Option<nt_markdown::FrontMatter>,
}

impl Builder {
    /// Build once over `pathspecs`: parse and re-pack every changed file,
    /// upsert the query database in one transaction, and stage the new
    /// pack files in the index.
    pub fn add(&self, pathspecs: &[String]) -> Result<AddReport, BuildError> {
        let _lock = ProcessLock::acquire(&self.state_dir)?;
        let store = ObjectStore::open(&self.state_dir)?;
        let mut index = Index::load(&self.index_path())?;
        let mut db = Database::open(&self.database_path())?;
        crate::reconcile::reconcile_index_from_db(&index, &store, &self.objects_dir(), &mut db)?;

        let pathspec_set = PathSpecSet::parse(pathspecs)?;
        let walk_entries =
            walk::walk_workspace(&self.root, nt_config::STATE_DIR_NAME, &pathspec_set)?;

        let extract_config = ExtractConfig {
            recognized_kinds: self.config.notes.kinds.clone(),
            treat_unkinded_as_note: self.config.notes.treat_unkinded_as_note,
            inherit_index_attributes: self.config.notes.inherit_index_attributes,
        };
        let id_gen = RandomIdGenerator;
        let now = Utc::now();

        // Index files are processed first and sequentially so their
        // front matter is available to the parallel phase that follows
        // (§4.7 ordering note).
        let (index_entries, other_entries): (Vec<WalkEntry>, Vec<WalkEntry>) = walk_entries
            .iter()
            .cloned()
            .partition(|e| e.relative_path.rsplit('/').next() == Some("index.md"));

        let mut front_matter_cache = IndexFrontMatterCache::new();
        let mut results = Vec::new();
        let mut parse_errors = Vec::new();

        for entry in &index_entries {
            match process_file(entry, &index, &store, &extract_config, now, &id_gen, None) {
                Ok(Some(result)) => {
                    front_matter_cache.record(&entry.relative_path, result.front_matter.as_ref());
                    results.push(result);
                }
                Ok(None) => {}
                Err(BuildError::Parse { path, source }) => parse_errors.push((path, source)),
                Err(other) => return Err(other),
            }
        }

        // Bounded by the configured worker count (§5, §6 `-t/--parallel`)
        // rather than rayon's global pool, so a workspace operator's
        // tuning actually takes effect.
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.engine.parallel_workers.max(1))
            .build()
            .map_err(|e| BuildError::Io(std::io::Error::other(e)))?;
        let parallel_outcomes: Vec<_> = pool.install(|| {
            other_entries
                .par_iter()
                .map(|entry| {
                    let index_fm = if extract_config.inherit_index_attributes {
                        walk::sibling_index_path(&entry.relative_path)
                            .and_then(|p| front_matter_cache.get(&p).cloned())
                    } else {
                        None
                    };
                    (
                        entry.relative_path.clone(),
                        process_file(entry, &index, &store, &extract_config, now, &id_gen, index_fm.as_ref()),
                    )
                })
                .collect()
        });

        for (path, outcome) in parallel_outcomes {
            match outcome {
                Ok(Some(result)) => results.push(result),
                Ok(None) => {}
                Err(BuildError::Parse { source, .. }) => parse_errors.push((path, source)),
                Err(other) => return Err(other),
            }
        }

        // Deleted files: known to the index, selected by the pathspec, but
        // no longer present on disk.
        let present: HashSet<&str> = walk_entries.iter().map(|e| e.relative_path.as_str()).collect();
        let known_paths: Vec<String> = index.known_paths().map(str::to_string).collect();
        let mut removed = Vec::new();
        let mut deletes: Vec<(Oid, EntityKind)> = Vec::new();

        for path in &known_paths {
            if present.contains(path.as_str()) || !pathspec_set.matches(path) {
                continue;
            }
            if let Some(entry) = index.get(path) {
                let current_oid = if entry.staged {
                    entry.staged_packfile_oid.clone()
                } else {
                    entry.oid.clone()
                };
                if let Some(oid) = current_oid {
                    if let Ok(pack) = store.read_pack(&oid) {
                        for entity in pack.decode_entities()? {
                            deletes.push((entity.oid().clone(), entity.kind()));
                        }
                    }
                }
            }
            removed.push(path.clone());
        }

        let upserts: Vec<(Entity, Oid)> = results
            .iter()
            .flat_map(|r| r.new_entities.iter().cloned().map(|e| (e, r.pack_oid.clone())))
            .collect();
        for result in &results {
            deletes.extend(result.stale.iter().cloned());
        }

        db.apply_batch(&upserts, &deletes)?;

        for result in &results {
            index.stage(&result.relative_path, result.pack_oid.clone(), result.mtime, result.size);
        }
        for path in &removed {
            index.remove(path);
        }
        index.persist(&self.index_path())?;

        Ok(AddReport {
            staged: results.into_iter().map(|r| r.relative_path).collect(),
            removed,
            parse_errors,
        })
    }
}

#[allow(clippy::too_many_arguments)]
fn process_file(
    entry: &WalkEntry,
    index: &Index,
    store: &ObjectStore,
    extract_config: &ExtractConfig,
    now: DateTime<Utc>,
    id_gen: &dyn EntityIdGenerator,
    index_front_matter: Option<&Mapping>,
) -> Result<Option<FileResult>, BuildError> {
    let metadata = std::fs::metadata(&entry.abs_path)?;
    let mtime = DateTime::<Utc>::from(metadata.modified()?);
    let size = metadata.len();
    if !index.modified(&entry.relative_path, mtime, size) {
        return Ok(None);
    }

    let parsed = ParsedFile::parse(&entry.abs_path, &entry.relative_path).map_err(|source| {
        BuildError::Parse {
            path: entry.relative_path.clone(),
            source,
        }
    })?;
    let parsed = match index_front_matter {
        Some(index_data) => {
            let merged = inherit::merge_front_matter(parsed.front_matter.as_ref(), index_data);
            ParsedFile {
                front_matter: Some(merged),
                ..parsed
            }
        }
        None => parsed,
    };

    let existing = index.get(&entry.relative_path);
    let previous_pack_oid = existing.and_then(|e| {
        if e.staged {
            e.staged_packfile_oid.clone()
        } else {
            e.oid.clone()
        }
    });
    let previous_decoded: Vec<Entity> = match &previous_pack_oid {
        Some(oid) => store.read_pack(oid)?.decode_entities()?,
        None => Vec::new(),
    };
    let previous: Vec<PreviousEntity> = extract::previous_entities(&previous_decoded);

    let media_reader = |path: &Path| -> Option<Vec<u8>> {
        let bytes = std::fs::read(path).ok()?;
        if let Err(e) = store.write_blob(&bytes) {
            tracing::warn!(path = %path.display(), error = %e, "failed to write referenced media blob");
        }
        Some(bytes)
    };

    let extracted = extract::extract(&parsed, extract_config, &previous, now, id_gen, &media_reader);
    let new_entities = extracted.into_entities();

    let pack = PackFile::from_entities(
        entry.relative_path.clone(),
        mtime,
        size,
        now,
        new_entities.clone(),
    )?;
    let pack_oid = store.write_pack(&pack)?;

    let new_oids: HashSet<(EntityKind, Oid)> = new_entities
        .iter()
        .map(|e| (e.kind(), e.oid().clone()))
        .collect();
    let stale: Vec<(Oid, EntityKind)> = previous_decoded
        .iter()
        .filter(|e| !new_oids.contains(&(e.kind(), e.oid().clone())))
        .map(|e| (e.oid().clone(), e.kind()))
        .collect();

    Ok(Some(FileResult {
        relative_path: entry.relative_path.clone(),
        pack_oid,
        mtime,
        size,
        new_entities,
        stale,
        front_matter: parsed.front_matter,
    }))
}
