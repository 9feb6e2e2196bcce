//! `count-objects`: loose pack/blob counts, cumulative bytes, and the
//! query database's aggregate stats (§6).

use crate::commands::{load_builder, CliError};
use crate::output;
use clap::Parser;
use nt_objects::ObjectStore;
use nt_query::Database;
use std::path::Path;

/// Print object-database and query-database statistics
#[derive(Parser, Debug)]
pub struct CountObjectsCmd {}

impl CountObjectsCmd {
    pub fn execute(&self) -> Result<(), CliError> {
        let builder = load_builder()?;
        let store = ObjectStore::open(builder.state_dir()).map_err(|e| CliError::Internal(e.into()))?;
        let objects = store.iter_objects().map_err(|e| CliError::Internal(e.into()))?;

        let (mut pack_count, mut blob_count, mut bytes) = (0u64, 0u64, 0u64);
        for object in &objects {
            let suffix = if object.is_pack { ".pack" } else { "" };
            let path = builder
                .state_dir()
                .join("objects")
                .join(object.oid.to_relative_path(suffix));
            bytes += file_size(&path);
            if object.is_pack {
                pack_count += 1;
            } else {
                blob_count += 1;
            }
        }

        output::detail("packs", &pack_count.to_string());
        output::detail("blobs", &blob_count.to_string());
        output::detail("bytes", &bytes.to_string());

        let db = Database::open(&builder.state_dir().join(nt_builder::DATABASE_FILE_NAME))
            .map_err(|e| CliError::Internal(e.into()))?;
        let stats = db.stats().map_err(|e| CliError::Internal(e.into()))?;
        output::detail("files", &stats.files.to_string());
        output::detail("notes", &stats.notes.to_string());
        output::detail("flashcards", &stats.flashcards.to_string());
        output::detail("media", &stats.media.to_string());
        output::detail("links", &stats.links.to_string());
        output::detail("reminders", &stats.reminders.to_string());
        output::detail("distinct tags", &stats.tags.len().to_string());
        output::detail("distinct attributes", &stats.attributes.len().to_string());
        Ok(())
    }
}

fn file_size(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}
