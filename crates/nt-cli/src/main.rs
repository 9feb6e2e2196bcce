mod commands;
mod output;
mod workspace;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use commands::*;
use nt_observability::{init_tracing, LogFormat};
use std::io;

#[derive(Parser)]
#[command(name = "nt")]
#[command(version, about = "A personal note-management storage and sync engine")]
#[command(propagate_version = true)]
#[command(arg_required_else_help = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase verbosity; repeatable (-v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Worker count for `add` (defaults to the configured or CPU count)
    #[arg(short = 't', long = "parallel", global = true, value_name = "N")]
    parallel: Option<usize>,

    /// Colored output (always|auto|never)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the state directory and an empty index
    Init(InitCmd),

    /// Stage file contents for the next commit
    Add(AddCmd),

    /// Flip staged pack files to committed
    Commit(CommitCmd),

    /// Discard staged changes
    Reset(ResetCmd),

    /// Show staged/modified/untracked files
    Status(StatusCmd),

    /// Show changes between generations of a pack file
    Diff(DiffCmd),

    /// Upload committed packs and the index to the configured remote
    Push(PushCmd),

    /// Fetch and apply remote packs the local workspace lacks
    Pull(PullCmd),

    /// Sweep unreachable pack files and blobs from the local object store
    Gc(GcCmd),

    /// Remote-scoped operations
    #[command(subcommand)]
    Origin(OriginCommands),

    /// Dump a pack file's contents
    #[command(name = "cat-file")]
    CatFile(CatFileCmd),

    /// Print object-database and query-database statistics
    #[command(name = "count-objects")]
    CountObjects(CountObjectsCmd),

    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum OriginCommands {
    /// Sweep unreachable objects from the configured remote
    Gc(OriginGcCmd),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    init_tracing(LogFormat::Pretty, Some(level)).ok();

    match cli.color.as_str() {
        "never" => console::set_colors_enabled(false),
        "always" => console::set_colors_enabled(true),
        "auto" => {}
        other => {
            output::error(&format!("invalid --color value: {other}"));
            std::process::exit(1);
        }
    }

    if let Some(n) = cli.parallel {
        commands::set_parallel_override(n);
    }

    let result = match cli.command {
        Commands::Init(cmd) => cmd.execute(),
        Commands::Add(cmd) => cmd.execute(),
        Commands::Commit(cmd) => cmd.execute(),
        Commands::Reset(cmd) => cmd.execute(),
        Commands::Status(cmd) => cmd.execute(),
        Commands::Diff(cmd) => cmd.execute(),
        Commands::Push(cmd) => cmd.execute().await,
        Commands::Pull(cmd) => cmd.execute().await,
        Commands::Gc(cmd) => cmd.execute(),
        Commands::Origin(OriginCommands::Gc(cmd)) => cmd.execute().await,
        Commands::CatFile(cmd) => cmd.execute(),
        Commands::CountObjects(cmd) => cmd.execute(),
        Commands::Completions { shell } => {
            generate_completions(shell);
            Ok(())
        }
    };

    if let Err(e) = result {
        output::error(&e.to_string());
        std::process::exit(e.exit_code());
    }

    Ok(())
}

fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "nt", &mut io::stdout());
}
