//! Wire models for activity-log exports.
//!
//! Two export shapes are accepted: the camelCase records emitted by
//! `az monitor activity-log list`, and rows exported from the
//! `AzureActivity` Log Analytics table. The CLI wraps several fields in
//! localized `{value, localizedValue}` objects where the table export
//! carries plain strings, so those fields deserialize from either form.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::core::event::{ActivityEvent, EventStatus};

/// A field that is either a bare string or an `{value, localizedValue}`
/// object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LocalizedValue {
    Plain(String),
    Localized {
        value: Option<String>,
        #[serde(rename = "localizedValue")]
        localized_value: Option<String>,
    },
}

impl LocalizedValue {
    /// The machine value, preferring `value` over the localized display
    /// string.
    pub fn value(&self) -> Option<&str> {
        match self {
            LocalizedValue::Plain(value) => Some(value.as_str()),
            LocalizedValue::Localized { value, localized_value } => value
                .as_deref()
                .or(localized_value.as_deref()),
        }
    }
}

/// One raw activity-log record, as exported.
#[derive(Debug, Clone, Deserialize)]
pub struct ActivityLogRecord {
    #[serde(rename = "operationName", alias = "OperationNameValue")]
    pub operation_name: Option<LocalizedValue>,
    #[serde(rename = "status", alias = "ActivityStatusValue")]
    pub status: Option<LocalizedValue>,
    #[serde(rename = "eventTimestamp", alias = "TimeGenerated")]
    pub event_timestamp: Option<String>,
    #[serde(rename = "resourceId", alias = "_ResourceId")]
    pub resource_id: Option<String>,
    #[serde(rename = "resourceGroupName", alias = "ResourceGroup")]
    pub resource_group_name: Option<String>,
    #[serde(rename = "caller", alias = "Caller")]
    pub caller: Option<String>,
}

impl ActivityLogRecord {
    /// Converts the raw record into a normalized event.
    ///
    /// Returns `None` when the timestamp is missing or unparseable; such
    /// records cannot be placed in the capture window and are skipped at
    /// the boundary. A missing operation name is preserved as an empty
    /// string so the aggregator can count the drop.
    pub fn into_event(self) -> Option<ActivityEvent> {
        let timestamp = self
            .event_timestamp
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|parsed| parsed.with_timezone(&Utc))?;

        let operation_name = self
            .operation_name
            .as_ref()
            .and_then(LocalizedValue::value)
            .unwrap_or_default()
            .to_string();
        let status = self
            .status
            .as_ref()
            .and_then(LocalizedValue::value)
            .map(EventStatus::parse)
            .unwrap_or(EventStatus::Unknown);

        Some(ActivityEvent {
            operation_name,
            status,
            timestamp,
            resource_id: self.resource_id,
            resource_group: self.resource_group_name,
            caller: self.caller.unwrap_or_default(),
        })
    }
}
