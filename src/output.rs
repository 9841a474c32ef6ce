//! Structured progress and error reporting.
//!
//! The pipeline stages never print directly: they emit [`SortEvent`]s through
//! an injectable [`EventSink`], so tests can assert on the emitted events
//! while the CLI renders them with consistent styling. This module also owns
//! the progress bar used during date resolution.

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Mutex;

/// A non-fatal condition reported by one of the pipeline stages.
///
/// Fatal errors travel through `Result` return values; events cover
/// everything that is reported but does not stop the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortEvent {
    /// The scanner met a directory entry that is neither a regular file
    /// nor a directory (socket, fifo, broken symlink, ...).
    UnsupportedEntry { path: PathBuf },
    /// A planned move could not be applied; both files are left in place.
    MoveFailed {
        old: String,
        new: String,
        reason: String,
    },
    /// A planned move's destination already exists; the move is skipped.
    DestinationOccupied { old: String, new: String },
    /// The reverter met a log line with an operation it does not know.
    UnknownLogOperation { operation: String },
    /// A reverted `mv` found the original path occupied and refused to
    /// overwrite it.
    RevertSkippedExisting { path: String },
    /// A single revert step failed; the batch continues.
    RevertFailed { path: String, reason: String },
}

/// Receiver for [`SortEvent`]s.
pub trait EventSink {
    fn emit(&self, event: SortEvent);
}

/// Renders events to the console with colored glyph prefixes.
pub struct ConsoleSink;

impl EventSink for ConsoleSink {
    fn emit(&self, event: SortEvent) {
        match event {
            SortEvent::UnsupportedEntry { path } => {
                println!(
                    "{} Skipping unsupported entry: {}",
                    "⚠".yellow(),
                    path.display()
                );
            }
            SortEvent::MoveFailed { old, new, reason } => {
                eprintln!(
                    "{} Unable to move \"{}\" -> \"{}\": {}",
                    "✗".red(),
                    old,
                    new,
                    reason
                );
            }
            SortEvent::DestinationOccupied { old, new } => {
                println!(
                    "{} Destination already exists, skipping \"{}\" -> \"{}\"",
                    "⚠".yellow(),
                    old,
                    new
                );
            }
            SortEvent::UnknownLogOperation { operation } => {
                println!("{} Unknown log operation: {}", "⚠".yellow(), operation);
            }
            SortEvent::RevertSkippedExisting { path } => {
                println!(
                    "{} Original file exists, it will not be overwritten: {}",
                    "⚠".yellow(),
                    path
                );
            }
            SortEvent::RevertFailed { path, reason } => {
                eprintln!("{} Failed to revert {}: {}", "✗".red(), path, reason);
            }
        }
    }
}

/// Collects events in memory so tests can assert on them.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<SortEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the events emitted so far.
    pub fn events(&self) -> Vec<SortEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: SortEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

/// Manages direct CLI output with consistent styling.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a dry-run notice message.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Creates and returns a progress bar for file operations.
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .expect("Invalid progress bar template")
                .progress_chars("█▓░"),
        );
        pb
    }
}
