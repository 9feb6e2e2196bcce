//! Heading-kind recognition: `<Kind>: <Title>`.

/// Note kinds recognised out of the box. Workspaces may widen this set via
/// `notes.kinds` in configuration; the extractor takes the recognised set
/// as a parameter so it never needs to know about configuration itself.
pub const DEFAULT_KINDS: &[&str] = &[
    "Note",
    "Flashcard",
    "TODO",
    "Quote",
    "Journal",
    "Reference",
    "Artwork",
    "Snippet",
];

/// A heading decomposed into its kind prefix and title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingKind {
    pub kind: String,
    pub title: String,
}

/// Parse `heading` as `<Kind>: <Title>` against `recognized_kinds`.
///
/// When the heading has no recognised kind prefix, it is treated as a plain
/// `Note` iff `treat_unkinded_as_note` is set; otherwise `None` is returned
/// and the section produces no Note entity.
pub fn parse_heading_kind(
    heading: &str,
    recognized_kinds: &[&str],
    treat_unkinded_as_note: bool,
) -> Option<HeadingKind> {
    if let Some((prefix, rest)) = heading.split_once(':') {
        let prefix = prefix.trim();
        if recognized_kinds
            .iter()
            .any(|k| k.eq_ignore_ascii_case(prefix))
        {
            return Some(HeadingKind {
                kind: canonical_case(prefix, recognized_kinds),
                title: rest.trim().to_string(),
            });
        }
    }
    if treat_unkinded_as_note {
        return Some(HeadingKind {
            kind: "Note".to_string(),
            title: heading.trim().to_string(),
        });
    }
    None
}

fn canonical_case(prefix: &str, recognized_kinds: &[&str]) -> String {
    recognized_kinds
        .iter()
        .find(|k| k.eq_ignore_ascii_case(prefix))
        .map(|k| k.to_string())
        .unwrap_or_else(|| prefix.to_string())
}

/// Lowercase, hyphenate, and strip punctuation from a title to form a slug.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_was_hyphen = true;
    for ch in title.chars() {
        if ch.is_alphanumeric() {
            slug.extend(ch.to_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
