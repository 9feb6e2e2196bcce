//! Workspace configuration: `<state_dir>/config`, a TOML file tuning the
//! builder's worker count, the remote sync target, and note-kind
//! recognition. Unrecognised keys are preserved by `serde`'s default
//! "ignore what I don't understand" behaviour, so a newer `nt` binary's
//! config additions don't get stripped by an older one round-tripping it.

mod error;
mod io;
mod schema;
mod validation;

pub use error::ConfigError;
pub use io::{load, save};
pub use schema::{Config, EngineConfig, NotesConfig, RemoteConfig, RemoteKind, DEFAULT_NOTE_KINDS};
pub use validation::Validate;

/// Name of the hidden per-workspace directory holding the index, the
/// query database, and the object store.
pub const STATE_DIR_NAME: &str = ".nt";

/// The config file's name inside the state directory.
pub const CONFIG_FILE_NAME: &str = "config";
