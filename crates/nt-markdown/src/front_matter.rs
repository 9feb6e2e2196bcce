//! Front matter extraction.
//!
//! Front matter is the text between a leading `---` line and the next `---`
//! line; it is parsed as YAML into an untyped map. A file with no leading
//! `---` has no front matter at all.

use serde_yaml::{Mapping, Value};

/// A file's parsed front matter: the raw text (for round-tripping /
/// `diff --cached`) and the parsed map.
#[derive(Debug, Clone, PartialEq)]
pub struct FrontMatter {
    /// The raw YAML text between the delimiters, not including them.
    pub raw: String,
    /// The parsed YAML map. Empty front matter parses to an empty mapping.
    pub data: Mapping,
}

/// Split `text` into `(front_matter, rest_of_body, body_line_offset)`.
///
/// `body_line_offset` is the 1-based file line number of the first line of
/// `rest_of_body`, so callers can translate body-relative line numbers back
/// to file-relative ones.
pub fn split_front_matter(text: &str) -> (Option<FrontMatter>, &str, usize) {
    let mut lines = text.split_inclusive('\n');
    let Some(first_line) = lines.next() else {
        return (None, text, 1);
    };
    if first_line.trim_end_matches(['\n', '\r']) != "---" {
        return (None, text, 1);
    }

    let mut consumed = first_line.len();
    let mut closing_found = false;
    for line in lines {
        consumed += line.len();
        if line.trim_end_matches(['\n', '\r']) == "---" {
            closing_found = true;
            break;
        }
    }

    if !closing_found {
        return (None, text, 1);
    }

    let raw_start = first_line.len();
    let raw_end = consumed - "---".len() - trailing_newline_len(&text[..consumed]);
    let raw = text[raw_start..raw_end].to_string();
    let body = &text[consumed..];
    let body_line_offset = text[..consumed].lines().count() + 1;

    let data = match serde_yaml::from_str::<Option<Mapping>>(&raw) {
        Ok(Some(map)) => map,
        Ok(None) => Mapping::new(),
        Err(_) => Mapping::new(),
    };

    (Some(FrontMatter { raw, data }), body, body_line_offset)
}

fn trailing_newline_len(consumed_text: &str) -> usize {
    if consumed_text.ends_with("\r\n") {
        2
    } else if consumed_text.ends_with('\n') {
        1
    } else {
        0
    }
}

impl FrontMatter {
    /// Look up a top-level scalar string value.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.data.get(Value::String(key.to_string()))?.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_front_matter() {
        let (fm, body, offset) = split_front_matter("# Hello\nworld\n");
        assert!(fm.is_none());
        assert_eq!(body, "# Hello\nworld\n");
        assert_eq!(offset, 1);
    }

    #[test]
    fn basic_front_matter() {
        let text = "---\ntitle: Foo\ntags: [a, b]\n---\n# Body\n";
        let (fm, body, offset) = split_front_matter(text);
        let fm = fm.unwrap();
        assert_eq!(fm.get_str("title"), Some("Foo"));
        assert_eq!(body, "# Body\n");
        assert_eq!(offset, 5);
    }

    #[test]
    fn unterminated_front_matter_is_not_front_matter() {
        let text = "---\ntitle: Foo\n# Body\n";
        let (fm, body, _) = split_front_matter(text);
        assert!(fm.is_none());
        assert_eq!(body, text);
    }

    #[test]
    fn empty_front_matter() {
        let text = "---\n---\nbody\n";
        let (fm, body, _) = split_front_matter(text);
        let fm = fm.unwrap();
        assert!(fm.data.is_empty());
        assert_eq!(body, "body\n");
    }
}
