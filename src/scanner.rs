//! Recursive file discovery under the ingest root.
//!
//! The scanner walks the ingest tree depth-first and produces a [`FilePath`]
//! per regular file. Directory entries that are neither files nor
//! directories (sockets, fifos, broken symlinks) are skipped with a warning
//! event; they are invisible to the later stages.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::output::{EventSink, SortEvent};

/// Location of a discovered file, split into its directory and name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilePath {
    /// Directory containing the file.
    #[serde(rename = "path")]
    pub directory: PathBuf,
    /// File name including extension.
    pub name: String,
}

impl FilePath {
    /// The full path of the file, directory joined with name.
    pub fn full_path(&self) -> PathBuf {
        self.directory.join(&self.name)
    }
}

/// Errors that can occur while walking the ingest tree.
#[derive(Debug)]
pub enum ScanError {
    /// A directory could not be read; the scan cannot continue.
    ReadDirFailed {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl std::fmt::Display for ScanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanError::ReadDirFailed { path, source } => {
                write!(f, "Failed to read directory {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for ScanError {}

/// Walks a directory tree and lists the regular files in it.
pub struct Scanner;

impl Scanner {
    /// Finds all regular files inside `root` and its subdirectories.
    ///
    /// Entries are visited in name order so repeated scans of the same tree
    /// produce the same file list. Subdirectories are expanded depth-first,
    /// each one's files appended after the files found before it.
    ///
    /// # Errors
    ///
    /// Returns `ScanError::ReadDirFailed` if `root` or any subdirectory
    /// cannot be listed.
    pub fn find_files(root: &Path, sink: &dyn EventSink) -> Result<Vec<FilePath>, ScanError> {
        let entries = fs::read_dir(root).map_err(|e| ScanError::ReadDirFailed {
            path: root.to_path_buf(),
            source: e,
        })?;

        let mut entries: Vec<fs::DirEntry> = entries.flatten().collect();
        entries.sort_by_key(|entry| entry.file_name());

        let mut files = Vec::new();
        for entry in entries {
            let file_type = match entry.file_type() {
                Ok(file_type) => file_type,
                Err(_) => {
                    sink.emit(SortEvent::UnsupportedEntry { path: entry.path() });
                    continue;
                }
            };

            if file_type.is_dir() {
                files.extend(Self::find_files(&entry.path(), sink)?);
            } else if file_type.is_file() {
                files.push(FilePath {
                    directory: root.to_path_buf(),
                    name: entry.file_name().to_string_lossy().into_owned(),
                });
            } else {
                sink.emit(SortEvent::UnsupportedEntry { path: entry.path() });
            }
        }

        Ok(files)
    }
}
