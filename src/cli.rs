//! Command-line orchestration.
//!
//! Wires the pipeline stages together: scan the ingest tree, resolve a
//! capture date per file, plan the moves, persist the scan data, then hand
//! it to the executor. Revert runs independently from an operation log.

use chrono::Local;
use std::path::Path;

use crate::config::{RunMode, SortConfig};
use crate::date_resolver::{self, ExifDateSource, FileRecord};
use crate::executor::Executor;
use crate::output::{ConsoleSink, OutputFormatter};
use crate::planner;
use crate::reverter::Reverter;
use crate::scanner::Scanner;
use crate::task_file;

/// A CLI command to execute.
#[derive(Debug, Clone)]
pub enum SortCommand {
    /// Scan, plan and execute a sort run.
    Sort {
        /// Path to the TOML configuration file.
        config_path: std::path::PathBuf,
        /// Force simulate mode regardless of the configured run mode.
        dry_run: bool,
    },
    /// Revert a previous run from its operation log.
    Revert {
        /// Path to the operation log written by a sort run.
        log_path: std::path::PathBuf,
    },
}

/// Runs the CLI application with the given command.
pub fn run_cli(command: SortCommand) -> Result<(), String> {
    match command {
        SortCommand::Sort {
            config_path,
            dry_run,
        } => run_sort(&config_path, dry_run),
        SortCommand::Revert { log_path } => run_revert(&log_path),
    }
}

/// Runs the full sort pipeline.
fn run_sort(config_path: &Path, dry_run: bool) -> Result<(), String> {
    let mut config = SortConfig::load(config_path)
        .map_err(|e| format!("Error loading configuration: {}", e))?;
    if dry_run {
        config.run_mode = RunMode::Simulate;
    }
    if config.run_mode == RunMode::Simulate {
        OutputFormatter::dry_run_notice("No files will be moved.");
    }

    let started = Local::now();
    let sink = ConsoleSink;

    OutputFormatter::info(&format!("Scanning {}", config.ingest_path.display()));
    let files = Scanner::find_files(&config.ingest_path, &sink)
        .map_err(|e| format!("Error scanning ingest directory: {}", e))?;

    let source = ExifDateSource;
    let progress = OutputFormatter::create_progress_bar(files.len() as u64);
    progress.set_message("Resolving capture dates");
    let records: Vec<FileRecord> = files
        .iter()
        .map(|file| {
            let record = date_resolver::resolve(&source, file);
            progress.inc(1);
            record
        })
        .collect();
    progress.finish_and_clear();

    let outcome = planner::plan(records, &config.output_path, &config.folder_pattern);
    if !outcome.problematic_files.is_empty() {
        OutputFormatter::warning(&format!(
            "{} file(s) without a resolvable date were excluded from planning.",
            outcome.problematic_files.len()
        ));
    }

    let import_path = task_file::write_scan_outcome(&config.output_path, &outcome, &started)
        .map_err(|e| format!("Error saving scan data: {}", e))?;
    OutputFormatter::success(&format!(
        "Import done. Saved scan data as {}",
        import_path.display()
    ));

    let executor = Executor::new(&config);
    let log_path = executor
        .execute(&import_path, &started, &sink)
        .map_err(|e| format!("Error during sorting: {}", e))?;
    OutputFormatter::success(&format!(
        "Sort done. Log of operations saved as {}",
        log_path.display()
    ));

    Ok(())
}

/// Reverts a previous run from its operation log.
fn run_revert(log_path: &Path) -> Result<(), String> {
    OutputFormatter::info(&format!("Reverting from {}", log_path.display()));

    let sink = ConsoleSink;
    let report = Reverter::new(log_path.to_path_buf())
        .revert(&sink)
        .map_err(|e| format!("Unable to revert: {}", e))?;

    OutputFormatter::success("Revert complete!");
    println!("  Restored: {}", report.restored);
    if report.skipped > 0 {
        println!("  Skipped: {}", report.skipped);
    }
    if !report.failed.is_empty() {
        OutputFormatter::error(&format!("  Failed: {}", report.failed.len()));
        for (path, reason) in &report.failed {
            eprintln!("    - {}: {}", path, reason);
        }
        return Err("Some operations could not be reverted. Please review errors above.".into());
    }

    Ok(())
}
