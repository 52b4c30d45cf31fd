//! Artifact writer for analysis runs.
//!
//! Every run writes a fresh, independently named artifact set into the
//! output directory; nothing is ever rewritten in place. File names carry
//! a UTC stamp plus a random suffix so concurrent or repeated runs never
//! collide.

use chrono::{DateTime, Utc};
use flate2::write::GzEncoder;
use flate2::Compression as GzLevel;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::core::aggregate::Analysis;
use crate::core::config::Compression;
use crate::core::event::ActivityEvent;
use crate::core::role::RoleDefinition;
use crate::core::traits::ActivityQuery;

/// Grouped-analysis artifact: the query it answers, when it was produced,
/// and the ordered aggregates with drop diagnostics.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport<'a> {
    pub caller: &'a str,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub generated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub analysis: &'a Analysis,
}

impl<'a> AnalysisReport<'a> {
    pub fn new(analysis: &'a Analysis, query: &'a ActivityQuery, generated_at: DateTime<Utc>) -> Self {
        Self {
            caller: &query.caller,
            window_start: query.start,
            window_end: query.end,
            generated_at,
            analysis,
        }
    }
}

/// Writes one run's artifact set under a shared stamp.
pub struct ArtifactWriter {
    dir: PathBuf,
    stamp: String,
    unique: String,
}

impl ArtifactWriter {
    pub fn new(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            stamp: current_stamp(),
            unique: unique_id(),
        })
    }

    /// Grouped analysis document (`analysis_*.json`).
    pub fn write_analysis(&self, report: &AnalysisReport<'_>) -> io::Result<PathBuf> {
        self.write_json("analysis", report)
    }

    /// Flat CSV (`operations_*.csv`).
    pub fn write_csv(&self, csv: &str) -> io::Result<PathBuf> {
        let path = self.artifact_path("operations", "csv");
        fs::write(&path, csv)?;
        Ok(path)
    }

    /// Human summary (`summary_*.txt`).
    pub fn write_summary(&self, text: &str) -> io::Result<PathBuf> {
        let path = self.artifact_path("summary", "txt");
        fs::write(&path, text)?;
        Ok(path)
    }

    /// Role definition (`role_*.json`), submittable as-is.
    pub fn write_role(&self, role: &RoleDefinition) -> io::Result<PathBuf> {
        self.write_json("role", role)
    }

    /// Write-once audit copy of the captured events
    /// (`events_*.json` or `events_*.json.gz`).
    pub fn write_events(
        &self,
        events: &[ActivityEvent],
        compression: Compression,
    ) -> io::Result<PathBuf> {
        let bytes = to_json_bytes(events)?;
        match compression {
            Compression::None => {
                let path = self.artifact_path("events", "json");
                fs::write(&path, bytes)?;
                Ok(path)
            }
            Compression::Gzip => {
                let path = self.artifact_path("events", "json.gz");
                let file = File::create(&path)?;
                let mut encoder = GzEncoder::new(file, GzLevel::default());
                encoder.write_all(&bytes)?;
                encoder.finish()?;
                Ok(path)
            }
        }
    }

    fn write_json<T: Serialize>(&self, kind: &str, value: &T) -> io::Result<PathBuf> {
        let path = self.artifact_path(kind, "json");
        fs::write(&path, to_json_bytes(value)?)?;
        Ok(path)
    }

    fn artifact_path(&self, kind: &str, ext: &str) -> PathBuf {
        artifact_path(&self.dir, kind, &self.stamp, &self.unique, ext)
    }
}

fn artifact_path(dir: &Path, kind: &str, stamp: &str, unique: &str, ext: &str) -> PathBuf {
    dir.join(format!("{kind}_{stamp}_{unique}.{ext}"))
}

fn to_json_bytes<T: Serialize + ?Sized>(value: &T) -> io::Result<Vec<u8>> {
    let mut bytes =
        serde_json::to_vec_pretty(value).map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
    bytes.push(b'\n');
    Ok(bytes)
}

fn current_stamp() -> String {
    let now = Utc::now();
    format!("{}", now.format("%Y%m%dT%H%M%SZ"))
}

fn unique_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect::<String>()
        .to_lowercase()
}
