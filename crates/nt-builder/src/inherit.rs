//! Nearest-`index.md` front-matter inheritance (§9: "single-directory
//! inheritance, not recursive up the tree").
//!
//! The extractor (`nt_entities::extract::extract`) only ever reads a file's
//! own front matter; it has no notion of a sibling `index.md`. This module
//! bridges that gap by synthesising a merged front matter before handing a
//! file to the extractor, so the rest of the pipeline stays unaware that
//! inheritance happened at all.

use nt_markdown::FrontMatter;
use serde_yaml::{Mapping, Value};
use std::collections::HashMap;

/// Front matter already parsed for every `index.md` seen so far in this
/// generation, keyed by workspace-relative path. Populated sequentially
/// before the parallel phase starts, then only ever read.
#[derive(Debug, Default)]
pub struct IndexFrontMatterCache {
    by_path: HashMap<String, Mapping>,
}

impl IndexFrontMatterCache {
    pub fn new() -> Self {
        IndexFrontMatterCache::default()
    }

    /// Record `index.md`'s own front-matter map under its relative path.
    pub fn record(&mut self, relative_path: &str, front_matter: Option<&FrontMatter>) {
        let data = front_matter.map(|fm| fm.data.clone()).unwrap_or_default();
        self.by_path.insert(relative_path.to_string(), data);
    }

    pub fn get(&self, relative_path: &str) -> Option<&Mapping> {
        self.by_path.get(relative_path)
    }
}

/// Merge a sibling `index.md`'s front-matter map into `own`, with `own`'s
/// keys taking precedence. `tags` sequences are unioned rather than
/// overwritten, since both levels may contribute independent tags.
pub fn merge_front_matter(own: Option<&FrontMatter>, index_data: &Mapping) -> FrontMatter {
    let own_data = own.map(|fm| fm.data.clone()).unwrap_or_default();
    let own_raw = own.map(|fm| fm.raw.clone()).unwrap_or_default();

    let mut merged = index_data.clone();
    let tags_key = Value::String("tags".to_string());
    let inherited_tags = index_data.get(&tags_key).and_then(Value::as_sequence).cloned();
    let own_tags = own_data.get(&tags_key).and_then(Value::as_sequence).cloned();

    for (key, value) in &own_data {
        merged.insert(key.clone(), value.clone());
    }

    if inherited_tags.is_some() || own_tags.is_some() {
        let mut union: Vec<Value> = Vec::new();
        let mut seen = std::collections::HashSet::new();
        for seq in [inherited_tags, own_tags].into_iter().flatten() {
            for item in seq {
                if let Some(s) = item.as_str() {
                    if seen.insert(s.to_string()) {
                        union.push(Value::String(s.to_string()));
                    }
                }
            }
        }
        merged.insert(tags_key, Value::Sequence(union));
    }

    FrontMatter {
        raw: own_raw,
        data: merged,
    }
}
