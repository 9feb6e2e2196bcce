//! Inline tag/attribute tokens (`` `#tag` `` / `` `@key: value` ``) and the
//! inheritance rules applied when merging a note's own tokens with those of
//! its ancestor sections and the file's front matter.

use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

/// Tags never carried down from a parent section or the front matter.
pub const NON_INHERITED_TAGS: &[&str] = &["favorite"];

/// Attribute keys never carried down from a parent section or the front
/// matter. `priority` is populated by the `high`/`medium`/`low`
/// short-circuit tags below and is local to the section that set it.
pub const NON_INHERITED_ATTRS: &[&str] = &["priority"];

/// Tags that collapse into a `priority` attribute instead of staying tags.
const PRIORITY_TAGS: &[&str] = &["high", "medium", "low"];

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"`#([A-Za-z0-9_/-]+)`").expect("static tag regex"))
}

fn attr_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"`@([A-Za-z0-9_-]+):\s*([^`]+)`").expect("static attribute regex")
    })
}

/// Tags and attributes belonging to a single note, section, or front-matter
/// block, before inheritance is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagsAttrs {
    pub tags: BTreeSet<String>,
    pub attrs: BTreeMap<String, String>,
}

/// Scan `text` for inline `` `#tag` `` and `` `@key: value` `` tokens.
///
/// A tag matching one of the [`PRIORITY_TAGS`] is folded into the `priority`
/// attribute instead of being kept as a tag.
pub fn extract(text: &str) -> TagsAttrs {
    let mut tags = BTreeSet::new();
    let mut attrs = BTreeMap::new();

    for caps in tag_re().captures_iter(text) {
        let tag = caps[1].to_string();
        if PRIORITY_TAGS.contains(&tag.as_str()) {
            attrs.insert("priority".to_string(), tag);
        } else {
            tags.insert(tag);
        }
    }
    for caps in attr_re().captures_iter(text) {
        attrs.insert(caps[1].to_string(), caps[2].trim().to_string());
    }

    TagsAttrs { tags, attrs }
}

/// Parse tags/attributes out of a front-matter map's scalar/sequence values.
///
/// Front matter has no inline-token syntax; a `tags:` sequence contributes
/// tags directly, and every other top-level scalar key/value contributes an
/// attribute.
pub fn extract_front_matter(data: &serde_yaml::Mapping) -> TagsAttrs {
    let mut tags = BTreeSet::new();
    let mut attrs = BTreeMap::new();

    for (key, value) in data {
        let Some(key) = key.as_str() else { continue };
        if key == "tags" {
            if let Some(seq) = value.as_sequence() {
                for item in seq {
                    if let Some(s) = item.as_str() {
                        tags.insert(s.to_string());
                    }
                }
            }
            continue;
        }
        match value.as_str() {
            Some(s) => {
                attrs.insert(key.to_string(), s.to_string());
            }
            None if value.is_bool() || value.is_number() => {
                attrs.insert(key.to_string(), serde_yaml::to_string(value).unwrap_or_default().trim().to_string());
            }
            _ => {}
        }
    }

    TagsAttrs { tags, attrs }
}

/// Merge `own` tags/attributes with inherited ones.
///
/// `ancestors` runs from nearest enclosing section to outermost, and
/// `front_matter` is the file-level fallback. Precedence (lowest to
/// highest): front matter, outermost ancestor, ..., nearest ancestor, own.
/// Tags/attributes named in [`NON_INHERITED_TAGS`]/[`NON_INHERITED_ATTRS`]
/// only apply to the level that set them and are dropped when inherited.
pub fn merge(own: &TagsAttrs, ancestors: &[TagsAttrs], front_matter: &TagsAttrs) -> TagsAttrs {
    let mut tags = BTreeSet::new();
    let mut attrs = BTreeMap::new();

    let inherited_layers = std::iter::once(front_matter).chain(ancestors.iter().rev());
    for layer in inherited_layers {
        for tag in &layer.tags {
            if !NON_INHERITED_TAGS.contains(&tag.as_str()) {
                tags.insert(tag.clone());
            }
        }
        for (k, v) in &layer.attrs {
            if !NON_INHERITED_ATTRS.contains(&k.as_str()) {
                attrs.insert(k.clone(), v.clone());
            }
        }
    }

    for tag in &own.tags {
        tags.insert(tag.clone());
    }
    for (k, v) in &own.attrs {
        attrs.insert(k.clone(), v.clone());
    }

    TagsAttrs { tags, attrs }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_tags_and_attributes() {
        let ta = extract("A note `#work` `#urgent` with `@reminder: 2026-01-01T00:00:00Z`.");
        assert!(ta.tags.contains("work"));
        assert!(ta.tags.contains("urgent"));
        assert_eq!(ta.attrs.get("reminder").unwrap(), "2026-01-01T00:00:00Z");
    }

    #[test]
    fn priority_tags_become_attribute() {
        let ta = extract("`#high` priority item");
        assert!(!ta.tags.contains("high"));
        assert_eq!(ta.attrs.get("priority").unwrap(), "high");
    }

    #[test]
    fn favorite_and_priority_are_not_inherited() {
        let own = TagsAttrs::default();
        let parent = extract("`#favorite` `#high`");
        let merged = merge(&own, &[parent], &TagsAttrs::default());
        assert!(!merged.tags.contains("favorite"));
        assert!(!merged.attrs.contains_key("priority"));
    }

    #[test]
    fn ordinary_tags_and_attrs_are_inherited() {
        let own = TagsAttrs::default();
        let parent = extract("`#work` `@project: nt`");
        let merged = merge(&own, &[parent], &TagsAttrs::default());
        assert!(merged.tags.contains("work"));
        assert_eq!(merged.attrs.get("project").unwrap(), "nt");
    }

    #[test]
    fn own_tokens_override_inherited_ones() {
        let own = extract("`@project: override`");
        let parent = extract("`@project: base`");
        let merged = merge(&own, &[parent], &TagsAttrs::default());
        assert_eq!(merged.attrs.get("project").unwrap(), "override");
    }
}
