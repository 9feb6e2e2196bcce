//! ATX heading detection and the section tree built from it.

use regex::Regex;
use std::sync::OnceLock;

/// One heading-delimited section of a file's body.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    /// Heading level, 1-6.
    pub level: u8,
    /// Heading text with the leading `#`s and one space stripped.
    pub heading: String,
    /// 1-based line number of the heading within the file (front matter counted).
    pub file_line: usize,
    /// 1-based line number of the heading within the body (front matter excluded).
    pub body_line: usize,
    /// Index of the enclosing section in the same tree, if this heading is nested.
    pub parent: Option<usize>,
    /// Text between this heading and the next heading of any level (or EOF).
    /// Does not include nested subsections' own text.
    pub body: String,
}

fn heading_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(#{1,6}) (.+?)\s*$").expect("static heading regex"))
}

fn fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s{0,3}```").expect("static fence regex"))
}

/// Line ranges (0-based, inclusive start, exclusive end) that fall inside a
/// fenced code block, computed over `text`'s lines.
pub fn fenced_line_ranges(text: &str) -> Vec<(usize, usize)> {
    let mut ranges = Vec::new();
    let mut fence_start: Option<usize> = None;
    for (i, line) in text.lines().enumerate() {
        if fence_re().is_match(line) {
            match fence_start {
                Some(start) => {
                    ranges.push((start, i + 1));
                    fence_start = None;
                }
                None => fence_start = Some(i),
            }
        }
    }
    if let Some(start) = fence_start {
        ranges.push((start, text.lines().count()));
    }
    ranges
}

fn line_is_fenced(ranges: &[(usize, usize)], line_idx: usize) -> bool {
    ranges.iter().any(|&(s, e)| line_idx >= s && line_idx < e)
}

/// Build the section tree for a file's body text.
///
/// `body_line_offset` is the file line number corresponding to the first
/// line of `body`, used to populate [`Section::file_line`].
pub fn build_sections(body: &str, body_line_offset: usize) -> Vec<Section> {
    let fenced = fenced_line_ranges(body);
    let lines: Vec<&str> = body.lines().collect();

    struct Heading {
        level: u8,
        text: String,
        line_idx: usize,
    }

    let mut headings = Vec::new();
    for (idx, line) in lines.iter().enumerate() {
        if line_is_fenced(&fenced, idx) {
            continue;
        }
        if let Some(caps) = heading_re().captures(line) {
            let hashes = &caps[1];
            headings.push(Heading {
                level: hashes.len() as u8,
                text: caps[2].trim().to_string(),
                line_idx: idx,
            });
        }
    }

    let mut sections = Vec::with_capacity(headings.len());
    let mut stack: Vec<(u8, usize)> = Vec::new();

    for (i, h) in headings.iter().enumerate() {
        while let Some(&(top_level, _)) = stack.last() {
            if top_level >= h.level {
                stack.pop();
            } else {
                break;
            }
        }
        let parent = stack.last().map(|&(_, idx)| idx);

        let body_end_idx = headings
            .get(i + 1)
            .map(|next| next.line_idx)
            .unwrap_or(lines.len());
        let body_start_idx = h.line_idx + 1;
        let section_body = if body_start_idx < body_end_idx {
            lines[body_start_idx..body_end_idx].join("\n")
        } else {
            String::new()
        };

        sections.push(Section {
            level: h.level,
            heading: h.text.clone(),
            file_line: body_line_offset + h.line_idx,
            body_line: h.line_idx + 1,
            parent,
            body: section_body,
        });

        stack.push((h.level, i));
    }

    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_sections() {
        let body = "## Note: Example 1\nA first note.\n\n## Note: Example 2\nA second note.\n";
        let sections = build_sections(body, 1);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].heading, "Note: Example 1");
        assert_eq!(sections[0].body.trim(), "A first note.");
        assert_eq!(sections[1].heading, "Note: Example 2");
        assert!(sections[0].parent.is_none());
        assert!(sections[1].parent.is_none());
    }

    #[test]
    fn nested_sections_track_parent() {
        let body = "# Note: Parent\nouter\n## Note: Child\ninner\n";
        let sections = build_sections(body, 1);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[1].parent, Some(0));
    }

    #[test]
    fn headings_in_fenced_blocks_are_ignored() {
        let body = "## Note: Real\nsee:\n```\n## Not a heading\n```\nmore text\n";
        let sections = build_sections(body, 1);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].heading, "Real");
    }

    #[test]
    fn requires_trailing_space_after_hashes() {
        let body = "##NoSpace\n## Note: Real\n";
        let sections = build_sections(body, 1);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].heading, "Real");
    }

    #[test]
    fn file_line_accounts_for_front_matter_offset() {
        let body = "## Note: X\nbody\n";
        let sections = build_sections(body, 5);
        assert_eq!(sections[0].file_line, 5);
        assert_eq!(sections[0].body_line, 1);
    }
}
