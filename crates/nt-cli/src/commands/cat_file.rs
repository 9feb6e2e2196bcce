//! `cat-file`: dump an object's contents in YAML, JSON, or a readable
//! Markdown rendering (§6, SPEC_FULL.md §F).

use crate::commands::{load_builder, CliError};
use clap::{Parser, ValueEnum};
use nt_entities::Entity;
use nt_hash::Oid;
use nt_objects::{ObjectStore, PackFile};

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum CatFileFormat {
    Yaml,
    Json,
    Markdown,
}

/// Dump a pack file or blob's contents
#[derive(Parser, Debug)]
pub struct CatFileCmd {
    /// A 40-hex object id, or a workspace-relative path
    #[arg(value_name = "OID_OR_PATH")]
    pub target: String,

    #[arg(long, value_enum, default_value = "yaml")]
    pub format: CatFileFormat,
}

impl CatFileCmd {
    pub fn execute(&self) -> Result<(), CliError> {
        let builder = load_builder()?;
        let store = ObjectStore::open(builder.state_dir()).map_err(|e| CliError::Internal(e.into()))?;

        let pack = if let Ok(oid) = Oid::from_hex(&self.target) {
            store
                .read_pack(&oid)
                .map_err(|e| CliError::UserInput(format!("no pack file for object {oid}: {e}")))?
        } else {
            let index = nt_index::Index::load(&builder.state_dir().join("index"))
                .map_err(|e| CliError::Internal(e.into()))?;
            let entry = index
                .get(&self.target)
                .ok_or_else(|| CliError::UserInput(format!("no index entry for path {}", self.target)))?;
            let oid = entry
                .staged_packfile_oid
                .as_ref()
                .or(entry.oid.as_ref())
                .ok_or_else(|| CliError::UserInput(format!("{} has no pack file yet", self.target)))?;
            store
                .read_pack(oid)
                .map_err(|e| CliError::Internal(e.into()))?
        };

        print!("{}", render(&pack, self.format).map_err(|e| CliError::Internal(e.into()))?);
        Ok(())
    }
}

fn render(pack: &PackFile, format: CatFileFormat) -> anyhow::Result<String> {
    match format {
        CatFileFormat::Yaml => Ok(serde_yaml::to_string(pack)?),
        CatFileFormat::Json => {
            let entities = pack.decode_entities()?;
            Ok(serde_json::to_string_pretty(&entities)? + "\n")
        }
        CatFileFormat::Markdown => Ok(render_markdown(pack)?),
    }
}

fn render_markdown(pack: &PackFile) -> anyhow::Result<String> {
    let mut out = String::new();
    for entity in pack.decode_entities()? {
        match entity {
            Entity::File(f) => out.push_str(&format!("# {}\n\n{}\n\n", f.relative_path, f.body)),
            Entity::Note(n) => out.push_str(&format!("## {}\n\n{}\n\n", n.long_title, n.content)),
            Entity::Flashcard(c) => {
                out.push_str(&format!("### Flashcard\n\n{}\n\n---\n\n{}\n\n", c.front, c.back))
            }
            Entity::Media(m) => out.push_str(&format!("- media: {} ({} bytes)\n", m.relative_path, m.size)),
            Entity::Link(l) => out.push_str(&format!("- link: [{}]({})\n", l.title.as_deref().unwrap_or(&l.url), l.url)),
            Entity::Reminder(r) => out.push_str(&format!("- reminder: {}\n", r.scheduled_at)),
        }
    }
    Ok(out)
}
