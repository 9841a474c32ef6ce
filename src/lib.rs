//! photosort - capture-date driven media organization
//!
//! This library organizes a tree of media files into a date-bucketed
//! directory layout. It scans an ingest root, resolves a capture date per
//! file (EXIF metadata, falling back to the modification time), plans the
//! required directories and moves, executes the plan under a configurable
//! move strategy and run mode, and can later revert an executed run by
//! replaying its operation log.

pub mod cli;
pub mod config;
pub mod date_resolver;
pub mod executor;
pub mod output;
pub mod planner;
pub mod reverter;
pub mod scanner;
pub mod task_file;

pub use config::{ConfigError, MoveStrategy, RunMode, SortConfig};
pub use date_resolver::{CaptureDateSource, CapturedDate, ExifDateSource, FileRecord};
pub use executor::{ExecuteError, Executor};
pub use output::{ConsoleSink, EventSink, RecordingSink, SortEvent};
pub use planner::{MoveTask, ScanOutcome};
pub use reverter::{LogEntry, MoveKind, RevertError, RevertReport, Reverter};
pub use scanner::{FilePath, ScanError, Scanner};
pub use task_file::{ExecutionPlan, TaskFileError};

pub use cli::{run_cli, SortCommand};
