//! Persisted run artifacts.
//!
//! A run writes three timestamp-suffixed files under the output root:
//!
//! * `import-<ts>.json` — the scan outcome (directories, moves, problems)
//! * `sort-task-list-<ts>.json` — the execution plan derived from it
//! * `sort-tasks-done-<ts>.txt` — the operation log, written by the executor
//!
//! `<ts>` is the run's start time with `:` replaced by `.` so the names are
//! filesystem safe, lexically sortable and unique per second. The start time
//! is threaded in explicitly so tests can supply a fixed value.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::planner::ScanOutcome;

/// One entry of the execution plan's move list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedMove {
    pub old: String,
    pub new: String,
}

/// The executable form of a scan outcome.
///
/// Derived 1:1 from [`ScanOutcome`]; persisted separately so a plan can be
/// re-executed without re-scanning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionPlan {
    pub mkdir: Vec<String>,
    pub mv: Vec<PlannedMove>,
}

impl ExecutionPlan {
    pub fn from_outcome(outcome: &ScanOutcome) -> Self {
        Self {
            mkdir: outcome.required_directories.clone(),
            mv: outcome
                .move_tasks
                .iter()
                .map(|task| PlannedMove {
                    old: task.in_path.clone(),
                    new: task.out_path.clone(),
                })
                .collect(),
        }
    }
}

/// Errors that can occur while reading or writing run artifacts.
#[derive(Debug)]
pub enum TaskFileError {
    /// The artifact does not exist at the given path.
    NotFound(PathBuf),
    /// The artifact exists but does not match the expected schema.
    Format { path: PathBuf, reason: String },
    /// IO failure while reading or writing an artifact.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl std::fmt::Display for TaskFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskFileError::NotFound(path) => {
                write!(f, "Task file does not exist: {}", path.display())
            }
            TaskFileError::Format { path, reason } => {
                write!(f, "Invalid task file format {}: {}", path.display(), reason)
            }
            TaskFileError::Io { path, source } => {
                write!(f, "Failed to access task file {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for TaskFileError {}

/// Formats a run start time for use in artifact file names.
///
/// ISO-8601-like, truncated to whole seconds, with `:` replaced by `.`
/// (e.g. `2021-12-31T12.34.56`).
pub fn timestamp_for_file_name(time: &DateTime<Local>) -> String {
    time.format("%Y-%m-%dT%H.%M.%S").to_string()
}

/// Writes the scan outcome JSON, creating the output root if needed.
///
/// Returns the path of the written file.
pub fn write_scan_outcome(
    output_root: &Path,
    outcome: &ScanOutcome,
    started: &DateTime<Local>,
) -> Result<PathBuf, TaskFileError> {
    let path = output_root.join(format!("import-{}.json", timestamp_for_file_name(started)));
    write_json(output_root, &path, outcome)?;
    Ok(path)
}

/// Writes the execution plan JSON, creating the output root if needed.
///
/// Returns the path of the written file.
pub fn write_execution_plan(
    output_root: &Path,
    plan: &ExecutionPlan,
    started: &DateTime<Local>,
) -> Result<PathBuf, TaskFileError> {
    let path = output_root.join(format!(
        "sort-task-list-{}.json",
        timestamp_for_file_name(started)
    ));
    write_json(output_root, &path, plan)?;
    Ok(path)
}

/// The path the operation log for this run is appended to.
pub fn operation_log_path(output_root: &Path, started: &DateTime<Local>) -> PathBuf {
    output_root.join(format!(
        "sort-tasks-done-{}.txt",
        timestamp_for_file_name(started)
    ))
}

/// Loads and validates a scan outcome JSON file.
pub fn load_scan_outcome(path: &Path) -> Result<ScanOutcome, TaskFileError> {
    if !path.exists() {
        return Err(TaskFileError::NotFound(path.to_path_buf()));
    }

    let contents = fs::read_to_string(path).map_err(|e| TaskFileError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    serde_json::from_str(&contents).map_err(|e| TaskFileError::Format {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn write_json<T: Serialize>(
    output_root: &Path,
    path: &Path,
    value: &T,
) -> Result<(), TaskFileError> {
    fs::create_dir_all(output_root).map_err(|e| TaskFileError::Io {
        path: output_root.to_path_buf(),
        source: e,
    })?;

    let json = serde_json::to_string_pretty(value).map_err(|e| TaskFileError::Format {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    fs::write(path, json).map_err(|e| TaskFileError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}
