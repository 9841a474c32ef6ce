//! Pure planning stage: resolved records to directories and move tasks.
//!
//! `plan` performs no I/O. A record is eligible when it carries no error and
//! a complete date; everything else is routed verbatim to the problematic
//! list. Destination directories are deduplicated in first-seen order.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::date_resolver::{CapturedDate, FileRecord};

/// A planned relocation of one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveTask {
    #[serde(rename = "inPath")]
    pub in_path: String,
    #[serde(rename = "outPath")]
    pub out_path: String,
}

/// The complete output of a scan-and-plan run, persisted as JSON.
///
/// Every directory referenced by a move task appears exactly once in
/// `required_directories`, in the order its first referencing file was
/// processed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanOutcome {
    pub required_directories: Vec<String>,
    pub move_tasks: Vec<MoveTask>,
    pub problematic_files: Vec<FileRecord>,
}

/// Plans directory creation and moves for the given records.
///
/// `pattern` is a string template over the tokens `YYYY`, `MM` and `DD`;
/// the substituted result is joined under `output_root` to form each file's
/// destination directory.
pub fn plan(records: Vec<FileRecord>, output_root: &Path, pattern: &str) -> ScanOutcome {
    let mut required_directories: Vec<String> = Vec::new();
    let mut move_tasks: Vec<MoveTask> = Vec::new();
    let mut problematic_files: Vec<FileRecord> = Vec::new();

    for record in records {
        let date = match (&record.error, &record.date) {
            (None, Some(date)) if date.is_complete() => date.clone(),
            _ => {
                problematic_files.push(record);
                continue;
            }
        };

        let destination_dir = output_root
            .join(substitute(pattern, &date))
            .display()
            .to_string();

        if !required_directories.contains(&destination_dir) {
            required_directories.push(destination_dir.clone());
        }

        move_tasks.push(MoveTask {
            in_path: record.path.full_path().display().to_string(),
            out_path: Path::new(&destination_dir)
                .join(&record.path.name)
                .display()
                .to_string(),
        });
    }

    ScanOutcome {
        required_directories,
        move_tasks,
        problematic_files,
    }
}

/// Globally replaces the `YYYY`, `MM` and `DD` tokens with the date's
/// components. The pattern may combine the tokens in any arrangement, e.g.
/// `YYYY/MM-DD` or `YYYY/YYYY-MM-DD`.
pub fn substitute(pattern: &str, date: &CapturedDate) -> String {
    pattern
        .replace("YYYY", date.year.as_deref().unwrap_or(""))
        .replace("MM", date.month.as_deref().unwrap_or(""))
        .replace("DD", date.day.as_deref().unwrap_or(""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::FilePath;
    use std::path::PathBuf;

    fn complete_date(year: &str, month: &str, day: &str) -> CapturedDate {
        CapturedDate {
            year: Some(year.to_string()),
            month: Some(month.to_string()),
            day: Some(day.to_string()),
        }
    }

    fn record(directory: &str, name: &str, date: Option<CapturedDate>) -> FileRecord {
        FileRecord {
            path: FilePath {
                directory: PathBuf::from(directory),
                name: name.to_string(),
            },
            date,
            error: None,
        }
    }

    #[test]
    fn test_plan_single_file() {
        let records = vec![record("/a", "img1.jpg", Some(complete_date("2021", "12", "31")))];
        let outcome = plan(records, Path::new("/out"), "YYYY/MM-DD");

        assert_eq!(outcome.required_directories, vec!["/out/2021/12-31"]);
        assert_eq!(
            outcome.move_tasks,
            vec![MoveTask {
                in_path: "/a/img1.jpg".to_string(),
                out_path: "/out/2021/12-31/img1.jpg".to_string(),
            }]
        );
        assert!(outcome.problematic_files.is_empty());
    }

    #[test]
    fn test_plan_dedups_directories_in_first_seen_order() {
        let records = vec![
            record("/a", "one.jpg", Some(complete_date("2021", "12", "31"))),
            record("/a", "two.jpg", Some(complete_date("2022", "01", "01"))),
            record("/b", "three.jpg", Some(complete_date("2021", "12", "31"))),
        ];
        let outcome = plan(records, Path::new("/out"), "YYYY/MM/DD");

        assert_eq!(
            outcome.required_directories,
            vec!["/out/2021/12/31", "/out/2022/01/01"]
        );
        assert_eq!(outcome.move_tasks.len(), 3);
    }

    #[test]
    fn test_plan_routes_incomplete_dates_to_problematic() {
        let partial = CapturedDate {
            year: Some("2021".to_string()),
            month: Some("12".to_string()),
            day: None,
        };
        let records = vec![
            record("/a", "partial.jpg", Some(partial)),
            record("/a", "dateless.jpg", None),
        ];
        let outcome = plan(records, Path::new("/out"), "YYYY/MM/DD");

        assert!(outcome.required_directories.is_empty());
        assert!(outcome.move_tasks.is_empty());
        assert_eq!(outcome.problematic_files.len(), 2);
        assert_eq!(outcome.problematic_files[0].path.name, "partial.jpg");
        assert_eq!(outcome.problematic_files[1].path.name, "dateless.jpg");
    }

    #[test]
    fn test_plan_routes_errored_records_to_problematic() {
        let mut errored = record("/a", "odd.bin", Some(complete_date("2021", "12", "31")));
        errored.error = Some("unsupported format".to_string());

        let outcome = plan(vec![errored.clone()], Path::new("/out"), "YYYY/MM/DD");

        assert!(outcome.move_tasks.is_empty());
        // Problematic records are carried verbatim, date and error included.
        assert_eq!(outcome.problematic_files, vec![errored]);
    }

    #[test]
    fn test_substitute_repeated_tokens() {
        let date = complete_date("2021", "12", "31");
        assert_eq!(substitute("YYYY/YYYY-MM-DD", &date), "2021/2021-12-31");
        assert_eq!(substitute("YYYY-MM-DD", &date), "2021-12-31");
        assert_eq!(substitute("MM/DD", &date), "12/31");
    }

    #[test]
    fn test_scan_outcome_json_field_names() {
        let outcome = plan(
            vec![record("/a", "img1.jpg", Some(complete_date("2021", "12", "31")))],
            Path::new("/out"),
            "YYYY/MM/DD",
        );

        let json = serde_json::to_value(&outcome).expect("Serialization failed");
        assert!(json["requiredDirectories"].is_array());
        assert_eq!(json["moveTasks"][0]["inPath"], "/a/img1.jpg");
        assert_eq!(json["moveTasks"][0]["outPath"], "/out/2021/12/31/img1.jpg");
        assert!(json["problematicFiles"].is_array());
    }
}
