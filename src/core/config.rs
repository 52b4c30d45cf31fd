//! Layered settings for an analysis run.
//!
//! Sources merge once at startup, lowest to highest precedence: built-in
//! defaults, an environment snapshot, a TOML config file, then explicit
//! CLI overrides. The result is a single immutable [`Settings`] value;
//! nothing downstream reads the process environment.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Error while loading or merging configuration.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    InvalidTime { field: &'static str, source: chrono::ParseError },
    UnsupportedCompression(String),
    MissingCaller,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "config io error: {err}"),
            ConfigError::Parse(err) => write!(f, "config parse error: {err}"),
            ConfigError::InvalidTime { field, source } => {
                write!(f, "invalid {field} timestamp: {source}")
            }
            ConfigError::UnsupportedCompression(value) => {
                write!(f, "unsupported audit compression: {value}")
            }
            ConfigError::MissingCaller => {
                write!(f, "no caller configured; set caller in the config file, AZURE_CLIENT_ID, or --caller")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Parse(err)
    }
}

/// Compression applied to the raw-events audit artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
}

impl Compression {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_lowercase().as_str() {
            "" | "none" => Ok(Compression::None),
            "gzip" | "gz" => Ok(Compression::Gzip),
            other => Err(ConfigError::UnsupportedCompression(other.to_string())),
        }
    }
}

/// Fully merged, immutable run settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Target subscription for the role's assignable scope.
    pub subscription_id: Option<String>,
    /// Principal whose calls are analyzed.
    pub caller: String,
    /// Capture window start; defaults to 24h before `end` when unset.
    pub start: Option<DateTime<Utc>>,
    /// Capture window end; defaults to now when unset.
    pub end: Option<DateTime<Utc>>,
    /// Operation-name prefixes excluded from the generated role.
    pub denylist_prefixes: Vec<String>,
    pub role_name: String,
    pub role_description: String,
    /// Number of operations shown in the summary ranking.
    pub top: usize,
    pub output_dir: String,
    pub audit_compression: Compression,
}

/// CLI-level overrides, highest precedence.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub caller: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub role_name: Option<String>,
    pub output_dir: Option<String>,
    pub top: Option<usize>,
}

impl Settings {
    /// Merges all configuration sources into one settings value.
    ///
    /// `env` is a snapshot of environment pairs rather than ambient state;
    /// Terraform-style `ARM_*` keys are accepted as aliases for their
    /// `AZURE_*` counterparts, at lower precedence than the `AZURE_*` key
    /// itself.
    pub fn load(
        config_path: Option<&Path>,
        env: impl IntoIterator<Item = (String, String)>,
        overrides: Overrides,
    ) -> Result<Self, ConfigError> {
        let mut subscription_id = None;
        let mut caller = None;

        let mut arm_subscription = None;
        let mut arm_client = None;
        for (key, value) in env {
            if value.is_empty() {
                continue;
            }
            match key.as_str() {
                "AZURE_SUBSCRIPTION_ID" => subscription_id = Some(value),
                "AZURE_CLIENT_ID" => caller = Some(value),
                "ARM_SUBSCRIPTION_ID" => arm_subscription = Some(value),
                "ARM_CLIENT_ID" => arm_client = Some(value),
                _ => {}
            }
        }
        subscription_id = subscription_id.or(arm_subscription);
        caller = caller.or(arm_client);

        let file = match config_path {
            Some(path) => ConfigFile::from_path(path)?,
            None => ConfigFile::default(),
        };

        if let Some(value) = file.subscription_id {
            subscription_id = Some(value);
        }
        if let Some(value) = file.caller {
            caller = Some(value);
        }
        if let Some(value) = overrides.caller {
            caller = Some(value);
        }

        let window = file.window.unwrap_or_default();
        let start_raw = overrides.start.or(window.start);
        let end_raw = overrides.end.or(window.end);
        let start = start_raw.as_deref().map(|raw| parse_time(raw, "start")).transpose()?;
        let end = end_raw.as_deref().map(|raw| parse_time(raw, "end")).transpose()?;

        let role = file.role.unwrap_or_default();
        let output = file.output.unwrap_or_default();
        let summary = file.summary.unwrap_or_default();

        Ok(Settings {
            subscription_id,
            caller: caller.ok_or(ConfigError::MissingCaller)?,
            start,
            end,
            denylist_prefixes: role
                .denylist_prefixes
                .unwrap_or_else(|| vec!["Microsoft.Authorization/".to_string()]),
            role_name: overrides
                .role_name
                .or(role.name)
                .unwrap_or_else(|| "deployment-minimal".to_string()),
            role_description: role.description.unwrap_or_else(|| {
                "Least-privilege role derived from captured deployment activity".to_string()
            }),
            top: overrides.top.or(summary.top).unwrap_or(10),
            output_dir: overrides
                .output_dir
                .or(output.dir)
                .unwrap_or_else(|| "artifacts".to_string()),
            audit_compression: match output.compression.as_deref() {
                Some(value) => Compression::parse(value)?,
                None => Compression::None,
            },
        })
    }

    /// Resolves the capture window against a reference `now`, defaulting
    /// to the 24 hours before `end`.
    pub fn window(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let end = self.end.unwrap_or(now);
        let start = self.start.unwrap_or(end - Duration::hours(24));
        (start, end)
    }
}

fn parse_time(raw: &str, field: &'static str) -> Result<DateTime<Utc>, ConfigError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|source| ConfigError::InvalidTime { field, source })
}

/// On-disk TOML config shape; every section is optional.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct ConfigFile {
    subscription_id: Option<String>,
    caller: Option<String>,
    window: Option<WindowConfig>,
    role: Option<RoleConfig>,
    output: Option<OutputConfig>,
    summary: Option<SummaryConfig>,
}

impl ConfigFile {
    fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct WindowConfig {
    /// Window start (RFC3339).
    start: Option<String>,
    /// Window end (RFC3339).
    end: Option<String>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct RoleConfig {
    name: Option<String>,
    description: Option<String>,
    denylist_prefixes: Option<Vec<String>>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct OutputConfig {
    dir: Option<String>,
    compression: Option<String>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct SummaryConfig {
    top: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn env(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn arm_keys_are_renamed_to_azure() {
        let settings = Settings::load(
            None,
            env(&[("ARM_SUBSCRIPTION_ID", "sub-arm"), ("ARM_CLIENT_ID", "sp-arm")]),
            Overrides::default(),
        )
        .expect("settings");
        assert_eq!(settings.subscription_id.as_deref(), Some("sub-arm"));
        assert_eq!(settings.caller, "sp-arm");
    }

    #[test]
    fn azure_keys_take_precedence_over_arm() {
        let settings = Settings::load(
            None,
            env(&[
                ("ARM_SUBSCRIPTION_ID", "sub-arm"),
                ("AZURE_SUBSCRIPTION_ID", "sub-azure"),
                ("AZURE_CLIENT_ID", "sp-azure"),
            ]),
            Overrides::default(),
        )
        .expect("settings");
        assert_eq!(settings.subscription_id.as_deref(), Some("sub-azure"));
        assert_eq!(settings.caller, "sp-azure");
    }

    #[test]
    fn overrides_outrank_environment() {
        let settings = Settings::load(
            None,
            env(&[("AZURE_CLIENT_ID", "sp-env")]),
            Overrides {
                caller: Some("sp-cli".to_string()),
                top: Some(3),
                ..Overrides::default()
            },
        )
        .expect("settings");
        assert_eq!(settings.caller, "sp-cli");
        assert_eq!(settings.top, 3);
    }

    #[test]
    fn missing_caller_is_an_error() {
        let err = Settings::load(None, env(&[]), Overrides::default())
            .expect_err("caller required");
        assert!(matches!(err, ConfigError::MissingCaller));
    }

    #[test]
    fn default_denylist_covers_authorization() {
        let settings = Settings::load(
            None,
            env(&[("AZURE_CLIENT_ID", "sp")]),
            Overrides::default(),
        )
        .expect("settings");
        assert_eq!(settings.denylist_prefixes, vec!["Microsoft.Authorization/".to_string()]);
    }

    #[test]
    fn window_defaults_to_last_day() {
        let settings = Settings::load(
            None,
            env(&[("AZURE_CLIENT_ID", "sp")]),
            Overrides::default(),
        )
        .expect("settings");
        let now = Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap();
        let (start, end) = settings.window(now);
        assert_eq!(end, now);
        assert_eq!(end - start, Duration::hours(24));
    }

    #[test]
    fn explicit_window_is_parsed() {
        let settings = Settings::load(
            None,
            env(&[("AZURE_CLIENT_ID", "sp")]),
            Overrides {
                start: Some("2026-03-14T09:00:00Z".to_string()),
                end: Some("2026-03-14T11:00:00Z".to_string()),
                ..Overrides::default()
            },
        )
        .expect("settings");
        let now = Utc.with_ymd_and_hms(2026, 3, 20, 0, 0, 0).unwrap();
        let (start, end) = settings.window(now);
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2026, 3, 14, 11, 0, 0).unwrap());
    }

    #[test]
    fn bad_compression_is_rejected() {
        assert!(matches!(
            Compression::parse("zstd"),
            Err(ConfigError::UnsupportedCompression(_))
        ));
        assert_eq!(Compression::parse("gz").expect("gz"), Compression::Gzip);
        assert_eq!(Compression::parse("none").expect("none"), Compression::None);
    }
}
