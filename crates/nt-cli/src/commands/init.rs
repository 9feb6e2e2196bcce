//! `init`: create the state directory and an empty index (§6).

use crate::commands::CliError;
use crate::output;
use anyhow::Context;
use clap::Parser;
use nt_config::{Config, STATE_DIR_NAME};
use nt_index::Index;
use nt_objects::ObjectStore;
use nt_query::Database;
use std::path::PathBuf;

/// Initialize a new nt workspace
#[derive(Parser, Debug)]
pub struct InitCmd {
    /// Path to initialize (defaults to current directory)
    #[arg(value_name = "PATH")]
    pub path: Option<String>,
}

impl InitCmd {
    pub fn execute(&self) -> Result<(), CliError> {
        let root = match &self.path {
            Some(p) => PathBuf::from(p),
            None => std::env::current_dir().map_err(anyhow::Error::from)?,
        };

        let state_dir = root.join(STATE_DIR_NAME);
        if state_dir.exists() {
            return Err(CliError::UserInput(format!(
                "workspace already initialized at {}",
                root.display()
            )));
        }

        std::fs::create_dir_all(&state_dir)
            .with_context(|| format!("creating state directory at {}", state_dir.display()))?;
        ObjectStore::open(&state_dir).with_context(|| "creating object store")?;
        Index::new()
            .persist(&state_dir.join("index"))
            .with_context(|| "writing empty index")?;
        nt_config::save(&state_dir.join(nt_config::CONFIG_FILE_NAME), &Config::default())
            .with_context(|| "writing default config")?;
        Database::open(&state_dir.join("database.db")).with_context(|| "creating query database")?;

        output::success(&format!("Initialized empty nt workspace in {}", state_dir.display()));
        Ok(())
    }
}
