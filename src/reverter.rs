//! Operation-log parsing and inversion.
//!
//! The operation log is the sole source of truth for undo. Each line is
//! parsed into a tagged [`LogEntry`]; `mkdir` and `ignore` entries are
//! recognized but produce no revert work, and unrecognized operations are
//! skipped with a warning so future log formats stay revertible. Each
//! extracted move is inverted independently: a failure is reported and the
//! batch continues.
//!
//! Inversion is safe to run twice. A second pass finds the original path
//! already present (`mv`) or the copy already removed (`cp`/`cpRm`) and
//! performs no further mutation.

use std::fs;
use std::path::{Path, PathBuf};

use crate::output::{EventSink, SortEvent};

/// The move flavor recorded in a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveKind {
    /// `mv` — the file was renamed.
    Move,
    /// `cp` — the file was duplicated, original kept.
    Copy,
    /// `cpRm` — the file was duplicated, original deleted.
    CopyAndDeleteOld,
}

/// One parsed line of the operation log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEntry {
    Mkdir(String),
    Move {
        kind: MoveKind,
        old: String,
        new: String,
    },
    Ignore {
        old: String,
        new: String,
    },
    Unknown(String),
}

/// Parses one log line.
///
/// The line is tokenized by the quote delimiter; the first
/// whitespace-trimmed token is the operation. Returns `None` for lines with
/// no operation token (blank lines), `LogEntry::Unknown` for operations
/// that are not recognized or are missing their path arguments.
pub fn parse_line(line: &str) -> Option<LogEntry> {
    let parts: Vec<&str> = line.split('"').collect();
    let operation = parts[0].trim();
    if operation.is_empty() {
        return None;
    }

    let old = parts.get(1).map(|s| s.to_string());
    let new = parts.get(3).map(|s| s.to_string());

    let entry = match (operation, old, new) {
        ("mkdir", Some(path), _) => LogEntry::Mkdir(path),
        ("ignore", Some(old), Some(new)) => LogEntry::Ignore { old, new },
        ("mv", Some(old), Some(new)) => LogEntry::Move {
            kind: MoveKind::Move,
            old,
            new,
        },
        ("cp", Some(old), Some(new)) => LogEntry::Move {
            kind: MoveKind::Copy,
            old,
            new,
        },
        ("cpRm", Some(old), Some(new)) => LogEntry::Move {
            kind: MoveKind::CopyAndDeleteOld,
            old,
            new,
        },
        _ => LogEntry::Unknown(line.to_string()),
    };

    Some(entry)
}

/// Errors that abort a revert before any step runs.
#[derive(Debug)]
pub enum RevertError {
    /// The operation log does not exist.
    LogNotFound(PathBuf),
    /// The operation log exists but could not be read.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl std::fmt::Display for RevertError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RevertError::LogNotFound(path) => {
                write!(f, "Operation log does not exist: {}", path.display())
            }
            RevertError::Io { path, source } => {
                write!(
                    f,
                    "Failed to read operation log {}: {}",
                    path.display(),
                    source
                )
            }
        }
    }
}

impl std::error::Error for RevertError {}

/// Outcome of a single inverted move.
enum StepOutcome {
    /// The filesystem changed.
    Restored,
    /// A `mv` revert found the original path occupied and refused to
    /// overwrite it.
    SkippedExisting,
    /// Nothing left to do (already reverted, or old == new).
    AlreadyReverted,
}

/// Summary of a revert run.
#[derive(Debug, Default)]
pub struct RevertReport {
    /// Moves whose inversion mutated the filesystem.
    pub restored: usize,
    /// Moves that needed no action (already reverted, refused overwrite).
    pub skipped: usize,
    /// Moves whose inversion failed, with the reason.
    pub failed: Vec<(String, String)>,
}

impl RevertReport {
    /// True when every extracted move was inverted or safely skipped.
    pub fn is_complete_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Inverts the operations recorded in an operation log.
pub struct Reverter {
    log_path: PathBuf,
}

impl Reverter {
    pub fn new(log_path: PathBuf) -> Self {
        Self { log_path }
    }

    /// Parses the log and applies the inverse of every recorded move.
    ///
    /// # Errors
    ///
    /// Fatal only when the log file is missing or unreadable; individual
    /// revert-step failures are reported through the sink and collected in
    /// the returned report.
    pub fn revert(&self, sink: &dyn EventSink) -> Result<RevertReport, RevertError> {
        if !self.log_path.exists() {
            return Err(RevertError::LogNotFound(self.log_path.clone()));
        }

        let contents = fs::read_to_string(&self.log_path).map_err(|e| RevertError::Io {
            path: self.log_path.clone(),
            source: e,
        })?;

        let mut report = RevertReport::default();
        for entry in Self::extract_moves(&contents, sink) {
            let (kind, old, new) = entry;
            match Self::revert_move(kind, &old, &new) {
                Ok(StepOutcome::Restored) => report.restored += 1,
                Ok(StepOutcome::SkippedExisting) => {
                    sink.emit(SortEvent::RevertSkippedExisting { path: old.clone() });
                    report.skipped += 1;
                }
                Ok(StepOutcome::AlreadyReverted) => report.skipped += 1,
                Err(reason) => {
                    sink.emit(SortEvent::RevertFailed {
                        path: old.clone(),
                        reason: reason.clone(),
                    });
                    report.failed.push((old, reason));
                }
            }
        }

        Ok(report)
    }

    /// Extracts the revertible moves from the log, warning on unknown
    /// operations.
    fn extract_moves(contents: &str, sink: &dyn EventSink) -> Vec<(MoveKind, String, String)> {
        let mut moves = Vec::new();
        for line in contents.lines() {
            match parse_line(line) {
                Some(LogEntry::Move { kind, old, new }) => moves.push((kind, old, new)),
                Some(LogEntry::Unknown(raw)) => {
                    sink.emit(SortEvent::UnknownLogOperation { operation: raw });
                }
                Some(LogEntry::Mkdir(_)) | Some(LogEntry::Ignore { .. }) | None => {}
            }
        }
        moves
    }

    /// Applies the inverse of one logged move.
    fn revert_move(kind: MoveKind, old: &str, new: &str) -> Result<StepOutcome, String> {
        let old_path = Path::new(old);
        let new_path = Path::new(new);

        match kind {
            MoveKind::Move => {
                if old_path.exists() {
                    return Ok(StepOutcome::SkippedExisting);
                }
                fs::rename(new_path, old_path)
                    .map_err(|e| format!("Failed to rename \"{}\" into \"{}\": {}", new, old, e))?;
                Ok(StepOutcome::Restored)
            }
            MoveKind::Copy | MoveKind::CopyAndDeleteOld => {
                if old == new {
                    return Ok(StepOutcome::AlreadyReverted);
                }

                let mut mutated = false;
                if !old_path.exists() {
                    fs::copy(new_path, old_path).map_err(|e| {
                        format!("Failed to copy \"{}\" into \"{}\": {}", new, old, e)
                    })?;
                    mutated = true;
                }
                if new_path.exists() {
                    fs::remove_file(new_path)
                        .map_err(|e| format!("Failed to remove \"{}\": {}", new, e))?;
                    mutated = true;
                }

                Ok(if mutated {
                    StepOutcome::Restored
                } else {
                    StepOutcome::AlreadyReverted
                })
            }
        }
    }
}
