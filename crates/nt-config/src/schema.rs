use serde::{Deserialize, Serialize};

/// Note kinds recognised when no workspace override is configured.
pub const DEFAULT_NOTE_KINDS: &[&str] = &[
    "Note",
    "Flashcard",
    "TODO",
    "Quote",
    "Journal",
    "Reference",
    "Artwork",
    "Snippet",
];

/// Top-level workspace configuration, loaded from `<state_dir>/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub engine: EngineConfig,
    pub remote: Option<RemoteConfig>,
    pub notes: NotesConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            engine: EngineConfig::default(),
            remote: None,
            notes: NotesConfig::default(),
        }
    }
}

/// Tuning for the builder's parallel walk/parse/pack pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EngineConfig {
    /// Worker thread count for `add`. Defaults to the CPU count (§5).
    pub parallel_workers: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            parallel_workers: num_cpus::get(),
        }
    }
}

/// The kind of object store a remote points at.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RemoteKind {
    Local,
    S3,
}

/// Where `push`/`pull`/`origin gc` read and write.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoteConfig {
    /// Filesystem path (for `kind = "local"`) or `s3://bucket/prefix` (for
    /// `kind = "s3"`).
    pub url: String,
    pub kind: RemoteKind,
}

/// Entity-extraction tunables surfaced to the workspace operator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NotesConfig {
    /// Recognised `<Kind>:` heading prefixes (§4.3).
    pub kinds: Vec<String>,
    /// Whether an index.md's front-matter attributes are inherited by
    /// sibling notes in the same directory, in addition to a note's own
    /// file's front matter.
    pub inherit_index_attributes: bool,
    /// Whether an unkinded heading is still extracted as a plain `Note`.
    pub treat_unkinded_as_note: bool,
}

impl Default for NotesConfig {
    fn default() -> Self {
        NotesConfig {
            kinds: DEFAULT_NOTE_KINDS.iter().map(|s| s.to_string()).collect(),
            inherit_index_attributes: true,
            treat_unkinded_as_note: false,
        }
    }
}
