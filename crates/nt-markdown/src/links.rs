//! Wikilink, image, and inline Markdown link extraction.

use crate::section::fenced_line_ranges;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// A `[[link]]` / `[[link|text]]` / `![[link]]` reference.
#[derive(Debug, Clone, PartialEq)]
pub struct WikiLink {
    /// The target before any `#anchor` or `|text` was stripped off.
    pub target: String,
    /// The `#anchor` portion, if present, without the `#`.
    pub anchor: Option<String>,
    /// The `|text` display override, if present.
    pub display_text: Option<String>,
    /// True for the `![[...]]` embedded-content form.
    pub is_embed: bool,
    /// 1-based line number within the text that was scanned.
    pub line: usize,
}

/// An internal or external image reference: `![text](url "title")`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRef {
    /// Alt text.
    pub alt_text: String,
    /// The URL as written in the source.
    pub url: String,
    /// Optional title.
    pub title: Option<String>,
    /// False when the URL carries a scheme (`http://`, `https://`, ...).
    pub is_internal: bool,
    /// For internal images, the URL resolved against the file's directory.
    pub resolved_path: Option<PathBuf>,
    /// 1-based line number.
    pub line: usize,
}

/// An inline Markdown link: `[text](url "title")`.
#[derive(Debug, Clone, PartialEq)]
pub struct MdLink {
    /// Link text.
    pub text: String,
    /// The URL as written in the source.
    pub url: String,
    /// Optional title.
    pub title: Option<String>,
    /// 1-based line number.
    pub line: usize,
}

fn wikilink_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(!)?\[\[([^\[\]|]+)(?:\|([^\[\]]+))?\]\]").expect("static wikilink regex")
    })
}

fn link_like_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"\[([^\[\]]*)\]\(([^\s)]+)(?:\s+"([^"]*)")?\)"#).expect("static link regex")
    })
}

fn scheme_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.\-]*:").expect("static scheme regex"))
}

fn line_number_at(text: &str, byte_offset: usize) -> usize {
    text[..byte_offset].matches('\n').count() + 1
}

/// Extract `[[wikilink]]` / `![[wikilink]]` references from `text`.
///
/// References inside fenced code blocks are ignored.
pub fn extract_wikilinks(text: &str) -> Vec<WikiLink> {
    let fenced = fenced_line_ranges(text);
    let mut out = Vec::new();
    for caps in wikilink_re().captures_iter(text) {
        let whole = caps.get(0).expect("capture 0 always present");
        let line = line_number_at(text, whole.start());
        if fenced.iter().any(|&(s, e)| line - 1 >= s && line - 1 < e) {
            continue;
        }
        let raw_target = caps[2].trim();
        let (target, anchor) = match raw_target.split_once('#') {
            Some((t, a)) => (t.to_string(), Some(a.to_string())),
            None => (raw_target.to_string(), None),
        };
        out.push(WikiLink {
            target,
            anchor,
            display_text: caps.get(3).map(|m| m.as_str().trim().to_string()),
            is_embed: caps.get(1).is_some(),
            line,
        });
    }
    out
}

/// Extract `![alt](url "title")` image references from `text`, resolving
/// internal URLs (no scheme) against `base_dir`.
pub fn extract_images(text: &str, base_dir: &Path) -> Vec<ImageRef> {
    let fenced = fenced_line_ranges(text);
    let mut out = Vec::new();
    for caps in link_like_re().captures_iter(text) {
        let whole = caps.get(0).expect("capture 0 always present");
        if whole.start() == 0 || text.as_bytes()[whole.start() - 1] != b'!' {
            continue;
        }
        let line = line_number_at(text, whole.start());
        if fenced.iter().any(|&(s, e)| line - 1 >= s && line - 1 < e) {
            continue;
        }
        let url = caps[2].to_string();
        let is_internal = !scheme_re().is_match(&url);
        out.push(ImageRef {
            alt_text: caps[1].to_string(),
            resolved_path: is_internal.then(|| base_dir.join(&url)),
            url,
            title: caps.get(3).map(|m| m.as_str().to_string()),
            is_internal,
            line,
        });
    }
    out
}

/// Extract inline `[text](url "title")` links from `text`, excluding image
/// syntax (`![...]`).
pub fn extract_markdown_links(text: &str) -> Vec<MdLink> {
    let fenced = fenced_line_ranges(text);
    let mut out = Vec::new();
    for caps in link_like_re().captures_iter(text) {
        let whole = caps.get(0).expect("capture 0 always present");
        if whole.start() > 0 && text.as_bytes()[whole.start() - 1] == b'!' {
            continue;
        }
        let line = line_number_at(text, whole.start());
        if fenced.iter().any(|&(s, e)| line - 1 >= s && line - 1 < e) {
            continue;
        }
        out.push(MdLink {
            text: caps[1].to_string(),
            url: caps[2].to_string(),
            title: caps.get(3).map(|m| m.as_str().to_string()),
            line,
        });
    }
    out
}

fn hr_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(-{3,}|_{3,}|\*{3,})$").expect("static hr regex"))
}

/// Split `text` into blocks at blank-line-surrounded horizontal rules.
///
/// A horizontal rule is a line of 3+ identical `-`, `_`, or `*` characters
/// with a blank line (or document boundary) on each side.
pub fn split_on_horizontal_rules(text: &str) -> Vec<String> {
    let lines: Vec<&str> = text.lines().collect();
    let mut rule_indices = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        if !hr_re().is_match(line.trim()) {
            continue;
        }
        let before_ok = i == 0 || lines[i - 1].trim().is_empty();
        let after_ok = i + 1 == lines.len() || lines[i + 1].trim().is_empty();
        if before_ok && after_ok {
            rule_indices.push(i);
        }
    }

    if rule_indices.is_empty() {
        return vec![text.to_string()];
    }

    let mut blocks = Vec::new();
    let mut start = 0;
    for &idx in &rule_indices {
        blocks.push(lines[start..idx].join("\n"));
        start = idx + 1;
    }
    blocks.push(lines[start..].join("\n"));
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_wikilink() {
        let links = extract_wikilinks("see [[Other Note]] for more");
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].target, "Other Note");
        assert!(!links[0].is_embed);
    }

    #[test]
    fn wikilink_with_anchor_and_text() {
        let links = extract_wikilinks("[[Page#Section|shown text]]");
        let l = &links[0];
        assert_eq!(l.target, "Page");
        assert_eq!(l.anchor.as_deref(), Some("Section"));
        assert_eq!(l.display_text.as_deref(), Some("shown text"));
    }

    #[test]
    fn embedded_wikilink() {
        let links = extract_wikilinks("![[diagram.md]]");
        assert!(links[0].is_embed);
    }

    #[test]
    fn wikilinks_in_code_fences_ignored() {
        let text = "```\n[[not a link]]\n```\n[[a link]]";
        let links = extract_wikilinks(text);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].target, "a link");
    }

    #[test]
    fn image_vs_link_distinguished() {
        let text = "![alt](pic.png \"t\") and [text](https://example.com)";
        let images = extract_images(text, Path::new("/notes"));
        let links = extract_markdown_links(text);
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].url, "pic.png");
        assert!(images[0].is_internal);
        assert_eq!(images[0].resolved_path, Some(PathBuf::from("/notes/pic.png")));
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].url, "https://example.com");
    }

    #[test]
    fn external_image_has_no_resolved_path() {
        let images = extract_images("![alt](https://example.com/x.png)", Path::new("/notes"));
        assert!(!images[0].is_internal);
        assert!(images[0].resolved_path.is_none());
    }

    #[test]
    fn horizontal_rule_splits_front_and_back() {
        let text = "front text\n\n---\n\nback text";
        let blocks = split_on_horizontal_rules(text);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].trim(), "front text");
        assert_eq!(blocks[1].trim(), "back text");
    }

    #[test]
    fn no_rule_means_single_block() {
        let blocks = split_on_horizontal_rules("just one block");
        assert_eq!(blocks.len(), 1);
    }

    #[test]
    fn rule_not_surrounded_by_blank_lines_is_not_a_rule() {
        let text = "front\n---\nback";
        let blocks = split_on_horizontal_rules(text);
        assert_eq!(blocks.len(), 1);
    }
}
