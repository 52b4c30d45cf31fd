//! File-backed activity-log source.
//!
//! Reads an export produced by `az monitor activity-log list` (a JSON
//! array) or a Log Analytics export (JSON lines), normalizes the records,
//! and filters them to the query's caller and window. Live transport to
//! the log store is deliberately not implemented here; captures are fed
//! in as files.

pub mod model;

use crate::core::event::ActivityEvent;
use crate::core::traits::{ActivityLogSource, ActivityQuery};
use model::ActivityLogRecord;
use std::fs;
use std::path::PathBuf;

use super::SourceError;

/// Activity-log source backed by an export file.
pub struct ExportFileSource {
    path: PathBuf,
    skipped: u64,
}

impl ExportFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            skipped: 0,
        }
    }

    /// Records skipped during the last fetch because their timestamp was
    /// missing or unparseable.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    fn parse_records(&self, contents: &str) -> Result<Vec<ActivityLogRecord>, SourceError> {
        let trimmed = contents.trim_start();
        if trimmed.starts_with('[') {
            return Ok(serde_json::from_str(trimmed)?);
        }

        // JSON lines: one record per non-empty line.
        let mut records = Vec::new();
        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            records.push(serde_json::from_str(line)?);
        }
        Ok(records)
    }
}

impl ActivityLogSource for ExportFileSource {
    fn fetch(&mut self, query: &ActivityQuery) -> Result<Vec<ActivityEvent>, SourceError> {
        let contents = fs::read_to_string(&self.path)?;
        let records = self.parse_records(&contents)?;

        self.skipped = 0;
        let mut events = Vec::new();
        for record in records {
            let Some(event) = record.into_event() else {
                self.skipped += 1;
                continue;
            };
            if event.caller != query.caller {
                continue;
            }
            if event.timestamp < query.start || event.timestamp > query.end {
                continue;
            }
            events.push(event);
        }
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::event::EventStatus;
    use chrono::{TimeZone, Utc};
    use std::io::Write;

    fn query() -> ActivityQuery {
        ActivityQuery {
            caller: "deploy-sp@example.com".to_string(),
            start: Utc.with_ymd_and_hms(2026, 3, 14, 0, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2026, 3, 14, 23, 59, 59).unwrap(),
        }
    }

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("rolescope-test-{name}-{}", std::process::id()));
        let mut file = std::fs::File::create(&path).expect("temp file");
        file.write_all(contents.as_bytes()).expect("write");
        path
    }

    #[test]
    fn reads_json_array_and_filters_caller_and_window() {
        let contents = r#"[
            {"operationName": {"value": "Microsoft.Web/sites/write"}, "status": {"value": "Succeeded"},
             "eventTimestamp": "2026-03-14T10:00:00Z", "caller": "deploy-sp@example.com"},
            {"operationName": {"value": "Microsoft.Web/sites/read"}, "status": {"value": "Succeeded"},
             "eventTimestamp": "2026-03-14T10:01:00Z", "caller": "someone-else@example.com"},
            {"operationName": {"value": "Microsoft.Web/sites/delete"}, "status": {"value": "Succeeded"},
             "eventTimestamp": "2026-03-15T10:00:00Z", "caller": "deploy-sp@example.com"}
        ]"#;
        let path = write_temp("array", contents);
        let mut source = ExportFileSource::new(&path);

        let events = source.fetch(&query()).expect("events");
        std::fs::remove_file(&path).ok();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].operation_name, "Microsoft.Web/sites/write");
        assert_eq!(events[0].status, EventStatus::Succeeded);
    }

    #[test]
    fn reads_json_lines_and_counts_skipped() {
        let contents = concat!(
            r#"{"OperationNameValue": "Microsoft.Storage/storageAccounts/write", "ActivityStatusValue": "Success", "TimeGenerated": "2026-03-14T09:30:00Z", "Caller": "deploy-sp@example.com"}"#,
            "\n",
            r#"{"OperationNameValue": "Microsoft.Storage/storageAccounts/read", "ActivityStatusValue": "Success", "Caller": "deploy-sp@example.com"}"#,
            "\n",
        );
        let path = write_temp("jsonl", contents);
        let mut source = ExportFileSource::new(&path);

        let events = source.fetch(&query()).expect("events");
        std::fs::remove_file(&path).ok();

        assert_eq!(events.len(), 1);
        assert_eq!(source.skipped(), 1);
    }

    #[test]
    fn malformed_export_is_an_error() {
        let path = write_temp("bad", "not json at all");
        let mut source = ExportFileSource::new(&path);
        let err = source.fetch(&query()).expect_err("parse failure");
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, SourceError::Parse(_)));
    }
}
