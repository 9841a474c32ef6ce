//! Per-file capture-date resolution.
//!
//! Resolution tries the embedded metadata first and falls back to the
//! filesystem modification time. The three outcomes are observably
//! distinct:
//!
//! 1. Extraction failed (unsupported format, unreadable file): the record
//!    carries a best-effort date derived from the modification time plus the
//!    extraction failure reason in `error`.
//! 2. Extraction succeeded but the timestamp could not be parsed: the record
//!    carries no date and `error` is "unable to parse date".
//! 3. Extraction succeeded and the file simply has no capture timestamp: the
//!    record carries no date and no error.

use chrono::{DateTime, Datelike, Local};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::scanner::FilePath;

/// A capture date as text components ready for pattern substitution.
///
/// Components are strings rather than integers because their only uses are
/// textual substitution into the folder pattern and lexical ordering. Month
/// and day are always two digits when present; the year is unpadded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedDate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<String>,
}

impl CapturedDate {
    /// True iff year, month and day are all present.
    pub fn is_complete(&self) -> bool {
        self.year.is_some() && self.month.is_some() && self.day.is_some()
    }

    /// Builds a complete date from a local timestamp.
    pub fn from_datetime(time: &DateTime<Local>) -> Self {
        Self {
            year: Some(time.year().to_string()),
            month: Some(format!("{:02}", time.month())),
            day: Some(format!("{:02}", time.day())),
        }
    }
}

/// One scanned file with its resolution outcome.
///
/// Created once by the scanner and resolver, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    #[serde(flatten)]
    pub path: FilePath,
    pub date: Option<CapturedDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A source of raw capture timestamps.
///
/// Given a file path, a source answers one of three ways: a raw timestamp
/// string, `None` when the format is supported but carries no timestamp, or
/// an error reason when extraction failed altogether.
pub trait CaptureDateSource {
    fn capture_timestamp(&self, path: &Path) -> Result<Option<String>, String>;
}

/// Reads capture timestamps from EXIF metadata.
///
/// `DateTimeOriginal` is preferred; `DateTimeDigitized` is the fallback tag.
pub struct ExifDateSource;

impl CaptureDateSource for ExifDateSource {
    fn capture_timestamp(&self, path: &Path) -> Result<Option<String>, String> {
        let file = File::open(path).map_err(|e| format!("Unable to open file: {}", e))?;
        let mut reader = BufReader::new(file);
        let exif = exif::Reader::new()
            .read_from_container(&mut reader)
            .map_err(|e| e.to_string())?;

        for tag in [exif::Tag::DateTimeOriginal, exif::Tag::DateTimeDigitized] {
            if let Some(field) = exif.get_field(tag, exif::In::PRIMARY) {
                if let exif::Value::Ascii(ref values) = field.value {
                    if let Some(bytes) = values.first() {
                        if !bytes.is_empty() {
                            return Ok(Some(String::from_utf8_lossy(bytes).into_owned()));
                        }
                    }
                }
            }
        }

        Ok(None)
    }
}

/// Resolves a scanned file into a [`FileRecord`].
pub fn resolve(source: &dyn CaptureDateSource, file: &FilePath) -> FileRecord {
    let full_path = file.full_path();

    match source.capture_timestamp(&full_path) {
        Ok(Some(raw)) => match parse_capture_timestamp(&raw) {
            Ok(date) => FileRecord {
                path: file.clone(),
                date: Some(date),
                error: None,
            },
            Err(_) => FileRecord {
                path: file.clone(),
                date: None,
                error: Some("unable to parse date".to_string()),
            },
        },
        Ok(None) => FileRecord {
            path: file.clone(),
            date: None,
            error: None,
        },
        Err(reason) => FileRecord {
            path: file.clone(),
            date: modification_date(&full_path),
            error: Some(reason),
        },
    }
}

/// Parses a raw EXIF-style timestamp (`YYYY:MM:DD HH:MM:SS`) into a date.
fn parse_capture_timestamp(raw: &str) -> Result<CapturedDate, String> {
    let date_part = raw
        .split_whitespace()
        .next()
        .ok_or_else(|| "empty timestamp".to_string())?;

    let mut components = date_part.split(':');
    let year = parse_component(components.next())?;
    let month = parse_component(components.next())?;
    let day = parse_component(components.next())?;

    Ok(CapturedDate {
        year: Some(year.to_string()),
        month: Some(format!("{:02}", month)),
        day: Some(format!("{:02}", day)),
    })
}

fn parse_component(component: Option<&str>) -> Result<u32, String> {
    component
        .ok_or_else(|| "missing date component".to_string())?
        .parse::<u32>()
        .map_err(|e| e.to_string())
}

/// Best-effort date from the file's last-modified time.
fn modification_date(path: &Path) -> Option<CapturedDate> {
    let modified = std::fs::metadata(path).and_then(|m| m.modified()).ok()?;
    let local: DateTime<Local> = modified.into();
    Some(CapturedDate::from_datetime(&local))
}
