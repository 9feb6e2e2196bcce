//! Shared fixtures and assertions for testing `nt` crates without each one
//! reimplementing a throwaway workspace.

mod assertions;
mod cli;
mod workspace;

pub use assertions::{assert_index_entry, assert_query_row};
pub use cli::nt;
pub use nt_config::STATE_DIR_NAME;
pub use workspace::TestWorkspace;
