use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single control-plane API call captured from the activity log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEvent {
    /// Fully-qualified action identifier (e.g. `Microsoft.Web/sites/write`).
    pub operation_name: String,
    /// Outcome reported by the log.
    pub status: EventStatus,
    /// When the call occurred.
    pub timestamp: DateTime<Utc>,
    /// ARM path of the target resource, when the log carried one.
    pub resource_id: Option<String>,
    /// Resource group of the target, when the log carried one.
    pub resource_group: Option<String>,
    /// Principal that issued the call.
    pub caller: String,
}

/// Activity-log event status. Anything the log reports outside the known
/// set maps to `Unknown` and is treated as not-succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventStatus {
    Succeeded,
    Failed,
    Started,
    Accepted,
    Unknown,
}

impl EventStatus {
    /// Maps a raw status string from either log shape.
    pub fn parse(value: &str) -> Self {
        match value {
            "Succeeded" | "Success" => EventStatus::Succeeded,
            "Failed" | "Failure" => EventStatus::Failed,
            "Started" | "Start" => EventStatus::Started,
            "Accepted" | "Accept" => EventStatus::Accepted,
            _ => EventStatus::Unknown,
        }
    }

    pub fn is_succeeded(self) -> bool {
        matches!(self, EventStatus::Succeeded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_maps_both_log_shapes() {
        assert_eq!(EventStatus::parse("Succeeded"), EventStatus::Succeeded);
        assert_eq!(EventStatus::parse("Success"), EventStatus::Succeeded);
        assert_eq!(EventStatus::parse("Failure"), EventStatus::Failed);
        assert_eq!(EventStatus::parse("InProgress"), EventStatus::Unknown);
        assert!(!EventStatus::Unknown.is_succeeded());
    }
}
