use chrono::{DateTime, Utc};

use crate::core::event::ActivityEvent;
use crate::sources::SourceError;

/// Parameters for one activity-log capture.
#[derive(Debug, Clone)]
pub struct ActivityQuery {
    /// Principal whose calls are selected.
    pub caller: String,
    /// Inclusive window start.
    pub start: DateTime<Utc>,
    /// Inclusive window end.
    pub end: DateTime<Utc>,
}

/// Yields activity events for a query.
///
/// The boundary to the activity-log store; implementations own transport,
/// authentication, and retry concerns. The aggregator only ever sees the
/// returned events.
pub trait ActivityLogSource {
    /// Fetches every event attributable to the query's caller within its
    /// window. An empty result is a valid (if inconclusive) capture.
    fn fetch(&mut self, query: &ActivityQuery) -> Result<Vec<ActivityEvent>, SourceError>;
}
