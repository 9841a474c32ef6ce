use clap::{Parser, Subcommand};
use photosort::cli::{run_cli, SortCommand};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "photosort",
    version,
    about = "Organize media files into date-bucketed directories by capture date"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan the ingest directory and sort files into the output tree
    Sort {
        /// Path to the TOML configuration file
        #[arg(long, default_value = "photosort.toml")]
        config: PathBuf,
        /// Simulate the run without touching the filesystem
        #[arg(long)]
        dry_run: bool,
    },
    /// Revert a previous run from its operation log
    Revert {
        /// Path to the operation log written by a sort run
        log: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let command = match cli.command {
        Commands::Sort { config, dry_run } => SortCommand::Sort {
            config_path: config,
            dry_run,
        },
        Commands::Revert { log } => SortCommand::Revert { log_path: log },
    };

    if let Err(e) = run_cli(command) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
