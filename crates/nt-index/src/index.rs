//! The staging index: one entry per source file, each carrying a committed
//! ("primary") pack-file reference and an uncommitted ("staged") shadow.

use crate::error::IndexError;
use crate::pathspec::PathSpecSet;
use chrono::{DateTime, Utc};
use nt_hash::Oid;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::Write;
use std::path::Path;

/// One source file's committed state plus its uncommitted shadow.
///
/// `oid`/`mtime`/`size` are `None` until the entry's first `commit` — an
/// entry can exist purely in the staged shadow between `add` and `commit`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct IndexEntry {
    pub relative_path: String,
    pub oid: Option<Oid>,
    pub mtime: Option<DateTime<Utc>>,
    pub size: Option<u64>,

    pub staged: bool,
    pub staged_packfile_oid: Option<Oid>,
    pub staged_mtime: Option<DateTime<Utc>>,
    pub staged_size: Option<u64>,
}

impl IndexEntry {
    fn new(relative_path: String) -> Self {
        IndexEntry {
            relative_path,
            ..Default::default()
        }
    }
}

/// The on-disk index: `entries` preserves insertion order, `by_path` is a
/// lookup accelerator rebuilt on load and never itself serialised.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Index {
    pub committed_at: Option<DateTime<Utc>>,
    entries: Vec<IndexEntry>,

    #[serde(skip)]
    by_path: HashMap<String, usize>,
}

impl Index {
    /// An empty index, as for a freshly initialised workspace.
    pub fn new() -> Self {
        Index::default()
    }

    /// Load the index from `path`, or return an empty index if it doesn't
    /// exist yet.
    pub fn load(path: &Path) -> Result<Self, IndexError> {
        if !path.exists() {
            return Ok(Index::new());
        }
        let bytes = fs::read(path)?;
        let mut index: Index = serde_yaml::from_slice(&bytes)?;
        index.rebuild_lookup();
        Ok(index)
    }

    /// Persist the index to `path` via create-temp-and-rename.
    pub fn persist(&self, path: &Path) -> Result<(), IndexError> {
        let bytes = serde_yaml::to_string(self)?.into_bytes();
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir)?;
        let tmp_path = dir.join(format!(".tmp-index-{}", std::process::id()));
        {
            let mut tmp = fs::File::create(&tmp_path)?;
            tmp.write_all(&bytes)?;
            tmp.sync_all()?;
        }
        fs::rename(&tmp_path, path)?;
        Ok(())
    }

    fn rebuild_lookup(&mut self) {
        self.by_path = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.relative_path.clone(), i))
            .collect();
    }

    /// Look up the entry for `path`, if one exists.
    pub fn get(&self, path: &str) -> Option<&IndexEntry> {
        self.by_path.get(path).map(|&i| &self.entries[i])
    }

    /// Iterate every entry in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.iter()
    }

    fn get_or_create_mut(&mut self, path: &str) -> &mut IndexEntry {
        if let Some(&i) = self.by_path.get(path) {
            return &mut self.entries[i];
        }
        self.entries.push(IndexEntry::new(path.to_string()));
        let i = self.entries.len() - 1;
        self.by_path.insert(path.to_string(), i);
        &mut self.entries[i]
    }

    /// Stage a newly written pack file for `relative_path`.
    pub fn stage(
        &mut self,
        relative_path: &str,
        pack_oid: Oid,
        file_mtime: DateTime<Utc>,
        file_size: u64,
    ) {
        let entry = self.get_or_create_mut(relative_path);
        entry.staged = true;
        entry.staged_packfile_oid = Some(pack_oid);
        entry.staged_mtime = Some(file_mtime);
        entry.staged_size = Some(file_size);
    }

    /// Flip every staged entry's shadow into its primary fields.
    pub fn commit(&mut self, now: DateTime<Utc>) {
        for entry in &mut self.entries {
            if !entry.staged {
                continue;
            }
            entry.oid = entry.staged_packfile_oid.take();
            entry.mtime = entry.staged_mtime.take();
            entry.size = entry.staged_size.take();
            entry.staged = false;
        }
        self.committed_at = Some(now);
    }

    /// Clear the staged shadow of every entry matching `path_specs`,
    /// leaving primary fields untouched.
    pub fn reset(&mut self, path_specs: &PathSpecSet) {
        for entry in &mut self.entries {
            if path_specs.matches(&entry.relative_path) {
                entry.staged = false;
                entry.staged_packfile_oid = None;
                entry.staged_mtime = None;
                entry.staged_size = None;
            }
        }
    }

    /// Remove the entry for `path` entirely (the source file is gone).
    pub fn remove(&mut self, path: &str) -> Option<IndexEntry> {
        let i = self.by_path.remove(path)?;
        let removed = self.entries.remove(i);
        self.rebuild_lookup();
        Some(removed)
    }

    /// The union of every primary and staged pack-file OID still
    /// referenced by the index.
    pub fn list_reachable_pack_oids(&self) -> HashSet<Oid> {
        let mut out = HashSet::new();
        for entry in &self.entries {
            if let Some(oid) = &entry.oid {
                out.insert(oid.clone());
            }
            if let Some(oid) = &entry.staged_packfile_oid {
                out.insert(oid.clone());
            }
        }
        out
    }

    /// True if `path` has no entry, or its recorded mtime/size (staged if
    /// staged, else primary) disagree with the values on disk now.
    pub fn modified(&self, path: &str, mtime: DateTime<Utc>, size: u64) -> bool {
        let Some(entry) = self.get(path) else {
            return true;
        };
        let (known_mtime, known_size) = if entry.staged {
            (entry.staged_mtime, entry.staged_size)
        } else {
            (entry.mtime, entry.size)
        };
        match (known_mtime, known_size) {
            (Some(known_mtime), Some(known_size)) => mtime > known_mtime || size != known_size,
            _ => true,
        }
    }

    /// Set an entry's primary fields directly, leaving its staged shadow
    /// untouched. Used by `pull` to adopt a remote pack without routing it
    /// through `stage`/`commit`.
    pub fn set_primary(&mut self, path: &str, oid: Oid, mtime: DateTime<Utc>, size: u64) {
        let entry = self.get_or_create_mut(path);
        entry.oid = Some(oid);
        entry.mtime = Some(mtime);
        entry.size = Some(size);
    }

    /// Clear one entry's staged shadow, leaving its primary fields
    /// untouched. Used by `pull --force` to discard local uncommitted work
    /// that conflicts with the fetched remote state.
    pub fn clear_staged(&mut self, path: &str) {
        if let Some(&i) = self.by_path.get(path) {
            let entry = &mut self.entries[i];
            entry.staged = false;
            entry.staged_packfile_oid = None;
            entry.staged_mtime = None;
            entry.staged_size = None;
        }
    }

    /// Paths present in the index but missing a corresponding pathspec
    /// match against the live workspace walk — used by the builder to find
    /// deleted files. Returns every relative path currently indexed.
    pub fn known_paths(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.relative_path.as_str())
    }
}
