//! Splits a Markdown note file into front matter, a body, and a section
//! tree, and extracts the inline references (wikilinks, images, Markdown
//! links) a body contains.
//!
//! The parser is stateless and does no I/O beyond reading the one file it is
//! asked to parse, so it is safe to call from any number of worker threads
//! at once — exactly what the builder's parallel `add` phase does.

mod blockquote;
mod error;
mod front_matter;
mod links;
mod section;

pub use blockquote::extract_trailing_comment;
pub use error::ParseError;
pub use front_matter::{split_front_matter, FrontMatter};
pub use links::{
    extract_images, extract_markdown_links, extract_wikilinks, split_on_horizontal_rules,
    ImageRef, MdLink, WikiLink,
};
pub use section::{build_sections, Section};

use nt_hash::Oid;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// A parsed `.md` file: transient, rebuilt from disk on every `add`, never
/// persisted directly (the entity extractor turns it into entities first).
#[derive(Debug, Clone)]
pub struct ParsedFile {
    /// Absolute path on disk.
    pub abs_path: PathBuf,
    /// Workspace-relative path, forward-slash separated.
    pub rel_path: String,
    /// Last-modified time at parse time.
    pub mtime: SystemTime,
    /// File size in bytes at parse time.
    pub size: u64,
    /// Content hash (SHA-1 of the raw file bytes).
    pub content_hash: Oid,
    /// Parsed front matter, if the file had any.
    pub front_matter: Option<FrontMatter>,
    /// Body text (front matter stripped).
    pub body: String,
    /// The heading-delimited section tree of `body`.
    pub sections: Vec<Section>,
}

impl ParsedFile {
    /// Read and parse `abs_path`, recording it under `rel_path`.
    pub fn parse(abs_path: &Path, rel_path: &str) -> Result<Self, ParseError> {
        let bytes = fs::read(abs_path).map_err(|source| ParseError::Io {
            path: abs_path.display().to_string(),
            source,
        })?;
        let metadata = fs::metadata(abs_path).map_err(|source| ParseError::Io {
            path: abs_path.display().to_string(),
            source,
        })?;

        let text = String::from_utf8(bytes.clone())
            .map_err(|e| ParseError::Encoding(e.utf8_error().to_string()))?;

        let content_hash = Oid::from_content(&bytes);
        let (front_matter, body, body_line_offset) = split_front_matter(&text);
        let sections = build_sections(body, body_line_offset);

        Ok(ParsedFile {
            abs_path: abs_path.to_path_buf(),
            rel_path: rel_path.replace('\\', "/"),
            mtime: metadata.modified().map_err(|source| ParseError::Io {
                path: abs_path.display().to_string(),
                source,
            })?,
            size: metadata.len(),
            content_hash,
            front_matter,
            body: body.to_string(),
            sections,
        })
    }

    /// Parse already-in-memory text, for tests and for `diff`'s on-the-fly
    /// working-tree re-parse (which never touches `mtime`/`size` on disk).
    pub fn parse_text(rel_path: &str, text: &str) -> Self {
        let content_hash = Oid::from_content(text.as_bytes());
        let (front_matter, body, body_line_offset) = split_front_matter(text);
        let sections = build_sections(body, body_line_offset);
        ParsedFile {
            abs_path: PathBuf::from(rel_path),
            rel_path: rel_path.replace('\\', "/"),
            mtime: SystemTime::UNIX_EPOCH,
            size: text.len() as u64,
            content_hash,
            front_matter,
            body: body.to_string(),
            sections,
        }
    }

    /// The file's parent directory, used to resolve internal image URLs.
    pub fn dir(&self) -> PathBuf {
        self.abs_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn parses_front_matter_and_sections() {
        let parsed = ParsedFile::parse_text(
            "notes.md",
            "---\ntags: [work]\n---\n## Note: Example 1\nA first note.\n\n## Note: Example 2\nA second note.\n",
        );
        assert!(parsed.front_matter.is_some());
        assert_eq!(parsed.sections.len(), 2);
        assert_eq!(parsed.sections[0].heading, "Note: Example 1");
    }

    #[test]
    fn parse_from_disk_records_metadata() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.md");
        let mut f = fs::File::create(&path).unwrap();
        writeln!(f, "## Note: Example\nbody").unwrap();
        drop(f);

        let parsed = ParsedFile::parse(&path, "notes.md").unwrap();
        assert_eq!(parsed.rel_path, "notes.md");
        assert_eq!(parsed.sections.len(), 1);
        assert!(parsed.size > 0);
    }

    #[test]
    fn content_hash_is_stable_for_identical_text() {
        let a = ParsedFile::parse_text("a.md", "# X\nbody");
        let b = ParsedFile::parse_text("b.md", "# X\nbody");
        assert_eq!(a.content_hash, b.content_hash);
    }
}
