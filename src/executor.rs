//! Plan execution under a move strategy and run mode.
//!
//! Execution runs in two phases. Phase one creates every required directory
//! in order; a failure there is fatal and aborts the run before any move is
//! attempted (directories already created are harmless and left in place).
//! Phase two applies the moves in list order; a failure on a single move is
//! reported through the event sink and the run continues.
//!
//! Every attempted operation is appended to the operation log one line at a
//! time, so a killed process leaves an accurate partial record. In simulate
//! mode nothing on the filesystem changes, but the log is written exactly as
//! it would be in apply mode.
//!
//! A move whose destination already exists is failed and skipped: both files
//! are left in place and no log line is written, instead of inheriting the
//! platform's rename/copy overwrite behavior.

use chrono::{DateTime, Local};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::{MoveStrategy, RunMode, SortConfig};
use crate::output::{EventSink, SortEvent};
use crate::task_file::{self, ExecutionPlan, PlannedMove, TaskFileError};

/// Errors that abort an execution run.
#[derive(Debug)]
pub enum ExecuteError {
    /// The scan data could not be read, or the plan could not be persisted.
    TaskFile(TaskFileError),
    /// A required directory could not be created.
    DirectoryCreationFailed {
        path: String,
        source: std::io::Error,
    },
    /// The operation log could not be appended to. The log is the sole
    /// source of truth for undo, so losing it is fatal.
    LogWriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl std::fmt::Display for ExecuteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecuteError::TaskFile(e) => write!(f, "{}", e),
            ExecuteError::DirectoryCreationFailed { path, source } => {
                write!(
                    f,
                    "Unable to make directory {}. Operation cannot continue: {}",
                    path, source
                )
            }
            ExecuteError::LogWriteFailed { path, source } => {
                write!(
                    f,
                    "Failed to write operation log {}: {}",
                    path.display(),
                    source
                )
            }
        }
    }
}

impl std::error::Error for ExecuteError {}

impl From<TaskFileError> for ExecuteError {
    fn from(e: TaskFileError) -> Self {
        ExecuteError::TaskFile(e)
    }
}

/// Applies (or simulates) a persisted scan outcome.
pub struct Executor<'a> {
    config: &'a SortConfig,
}

impl<'a> Executor<'a> {
    pub fn new(config: &'a SortConfig) -> Self {
        Self { config }
    }

    /// Executes the scan outcome stored at `import_data_path`.
    ///
    /// Derives the execution plan, persists it next to the other run
    /// artifacts, then runs the mkdir and move phases. Returns the path of
    /// the operation log.
    pub fn execute(
        &self,
        import_data_path: &Path,
        started: &DateTime<Local>,
        sink: &dyn EventSink,
    ) -> Result<PathBuf, ExecuteError> {
        let outcome = task_file::load_scan_outcome(import_data_path)?;
        let plan = ExecutionPlan::from_outcome(&outcome);
        task_file::write_execution_plan(&self.config.output_path, &plan, started)?;

        self.run_tasks(&plan, started, sink)
    }

    /// Runs a prepared execution plan directly.
    pub fn run_tasks(
        &self,
        plan: &ExecutionPlan,
        started: &DateTime<Local>,
        sink: &dyn EventSink,
    ) -> Result<PathBuf, ExecuteError> {
        let log_path = task_file::operation_log_path(&self.config.output_path, started);
        fs::create_dir_all(&self.config.output_path).map_err(|e| ExecuteError::LogWriteFailed {
            path: log_path.clone(),
            source: e,
        })?;
        let mut log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .map_err(|e| ExecuteError::LogWriteFailed {
                path: log_path.clone(),
                source: e,
            })?;

        for dir in &plan.mkdir {
            if self.config.run_mode == RunMode::Apply {
                fs::create_dir_all(dir).map_err(|e| ExecuteError::DirectoryCreationFailed {
                    path: dir.clone(),
                    source: e,
                })?;
            }
            append_line(&mut log, &log_path, &format!("mkdir \"{}\"", dir))?;
        }

        for task in &plan.mv {
            if let Some(token) = self.apply_move(task, sink) {
                append_line(
                    &mut log,
                    &log_path,
                    &format!("{} \"{}\" \"{}\"", token, task.old, task.new),
                )?;
            }
        }

        Ok(log_path)
    }

    /// Applies one move under the configured strategy.
    ///
    /// Returns the operation token to log, or `None` when the move was
    /// skipped or failed and must not appear in the log (the reverter would
    /// otherwise invert an operation that never happened).
    fn apply_move(&self, task: &PlannedMove, sink: &dyn EventSink) -> Option<&'static str> {
        let token = self.config.move_strategy.log_token();

        if self.config.move_strategy == MoveStrategy::Ignore
            || self.config.run_mode == RunMode::Simulate
        {
            return Some(token);
        }

        let old = Path::new(&task.old);
        let new = Path::new(&task.new);

        if new.exists() {
            sink.emit(SortEvent::DestinationOccupied {
                old: task.old.clone(),
                new: task.new.clone(),
            });
            return None;
        }

        let result = match self.config.move_strategy {
            MoveStrategy::Move => fs::rename(old, new),
            MoveStrategy::Copy => fs::copy(old, new).map(|_| ()),
            MoveStrategy::CopyAndDeleteOld => {
                fs::copy(old, new).and_then(|_| fs::remove_file(old))
            }
            MoveStrategy::Ignore => Ok(()),
        };

        match result {
            Ok(()) => Some(token),
            Err(e) => {
                sink.emit(SortEvent::MoveFailed {
                    old: task.old.clone(),
                    new: task.new.clone(),
                    reason: e.to_string(),
                });
                None
            }
        }
    }
}

fn append_line(
    log: &mut std::fs::File,
    log_path: &Path,
    line: &str,
) -> Result<(), ExecuteError> {
    writeln!(log, "{}", line).map_err(|e| ExecuteError::LogWriteFailed {
        path: log_path.to_path_buf(),
        source: e,
    })
}
