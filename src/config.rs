//! Sort run configuration.
//!
//! A run is described by a TOML file with the ingest and output roots, the
//! move strategy, the run mode and the folder-naming pattern:
//!
//! ```toml
//! ingest_path = "./ingest"
//! output_path = "./sorted"
//! move_strategy = "copy"       # move | copy | copyAndDeleteOld | ignore
//! run_mode = "simulate"        # simulate | apply
//! folder_pattern = "YYYY/MM/DD"
//! ```
//!
//! The folder pattern is a plain string template over the tokens `YYYY`,
//! `MM` and `DD`, substituted with the resolved capture date of each file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Tokens recognized in the folder-naming pattern.
pub const PATTERN_TOKENS: [&str; 3] = ["YYYY", "MM", "DD"];

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    ConfigNotFound(PathBuf),
    /// Invalid TOML syntax or structure.
    ConfigInvalid(String),
    /// The folder pattern contains no substitution token.
    InvalidPattern(String),
    /// IO error while reading configuration.
    IoError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ConfigNotFound(path) => {
                write!(f, "Configuration file not found: {}", path.display())
            }
            ConfigError::ConfigInvalid(msg) => write!(f, "Invalid configuration: {}", msg),
            ConfigError::InvalidPattern(pattern) => {
                write!(
                    f,
                    "Invalid folder pattern '{}': expected at least one of YYYY, MM, DD",
                    pattern
                )
            }
            ConfigError::IoError(msg) => write!(f, "IO error reading configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// The policy applied to every planned relocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MoveStrategy {
    /// Atomic rename into the destination.
    Move,
    /// Duplicate into the destination, keep the original.
    Copy,
    /// Duplicate into the destination, then delete the original.
    CopyAndDeleteOld,
    /// Plan only; no filesystem action is ever taken for the move.
    Ignore,
}

impl MoveStrategy {
    /// The operation token recorded in the operation log for this strategy.
    pub fn log_token(self) -> &'static str {
        match self {
            MoveStrategy::Move => "mv",
            MoveStrategy::Copy => "cp",
            MoveStrategy::CopyAndDeleteOld => "cpRm",
            MoveStrategy::Ignore => "ignore",
        }
    }
}

/// Whether a run mutates the filesystem or only records what it would do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RunMode {
    /// No filesystem mutation; the operation log is still written.
    Simulate,
    /// Directories are created and moves are applied.
    Apply,
}

/// Configuration for a single sort run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SortConfig {
    /// Root directory scanned for media files.
    pub ingest_path: PathBuf,
    /// Root directory the date-bucketed tree is built under. Run artifacts
    /// (scan data, task list, operation log) are also written here.
    pub output_path: PathBuf,
    #[serde(default = "default_move_strategy")]
    pub move_strategy: MoveStrategy,
    #[serde(default = "default_run_mode")]
    pub run_mode: RunMode,
    #[serde(default = "default_folder_pattern")]
    pub folder_pattern: String,
}

fn default_move_strategy() -> MoveStrategy {
    MoveStrategy::Copy
}

// Simulate by default so a config without an explicit mode never mutates.
fn default_run_mode() -> RunMode {
    RunMode::Simulate
}

fn default_folder_pattern() -> String {
    "YYYY/MM/DD".to_string()
}

impl SortConfig {
    /// Loads and validates configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ConfigNotFound` if the file does not exist,
    /// `ConfigError::ConfigInvalid` if TOML parsing fails, and
    /// `ConfigError::InvalidPattern` if the folder pattern carries no token.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        let config: SortConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validates field values beyond what deserialization enforces.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ingest_path.as_os_str().is_empty() {
            return Err(ConfigError::ConfigInvalid(
                "ingest_path must not be empty".to_string(),
            ));
        }
        if self.output_path.as_os_str().is_empty() {
            return Err(ConfigError::ConfigInvalid(
                "output_path must not be empty".to_string(),
            ));
        }
        if !PATTERN_TOKENS
            .iter()
            .any(|token| self.folder_pattern.contains(token))
        {
            return Err(ConfigError::InvalidPattern(self.folder_pattern.clone()));
        }
        Ok(())
    }
}
