//! Permission aggregation.
//!
//! Collapses captured activity events into one record per distinct
//! successful operation, and derives the minimal action set for a custom
//! role from that.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::core::event::ActivityEvent;
use crate::core::resource::{self, UNKNOWN};

/// One distinct successful operation observed during the capture window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationAggregate {
    /// Grouping key, unique across the aggregate set.
    pub operation: String,
    /// Number of successful calls with this operation name.
    pub count: u64,
    /// Provider from the first contributing event's resource id.
    pub resource_provider: String,
    /// Resource type from the first contributing event's resource id.
    pub resource_type: String,
    /// Earliest contributing event timestamp.
    pub first_seen: DateTime<Utc>,
    /// Latest contributing event timestamp.
    pub last_seen: DateTime<Utc>,
}

/// Events excluded from aggregation, by reason.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropCounts {
    /// Events whose status was anything other than `Succeeded`.
    pub not_succeeded: u64,
    /// Events with an empty operation name.
    pub missing_operation: u64,
}

impl DropCounts {
    pub fn total(&self) -> u64 {
        self.not_succeeded + self.missing_operation
    }
}

/// Result of one aggregation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub aggregates: Vec<OperationAggregate>,
    pub dropped: DropCounts,
}

impl Analysis {
    /// Distinct resource providers across the aggregate set, sorted.
    pub fn providers(&self) -> BTreeSet<&str> {
        self.aggregates
            .iter()
            .map(|aggregate| aggregate.resource_provider.as_str())
            .collect()
    }

    /// Distinct resource types across the aggregate set, sorted.
    pub fn resource_types(&self) -> BTreeSet<&str> {
        self.aggregates
            .iter()
            .map(|aggregate| aggregate.resource_type.as_str())
            .collect()
    }
}

/// Groups successful events by operation name.
///
/// Pure and deterministic: the same input sequence always produces the same
/// aggregates, sorted ascending by operation. Failed, in-flight, and
/// unrecognized-status events are excluded and counted, as are events with
/// no operation name. An empty input yields an empty analysis, not an
/// error.
pub fn aggregate(events: &[ActivityEvent]) -> Analysis {
    let mut groups: BTreeMap<&str, GroupState<'_>> = BTreeMap::new();
    let mut dropped = DropCounts::default();

    for event in events {
        if event.operation_name.is_empty() {
            dropped.missing_operation += 1;
            continue;
        }
        if !event.status.is_succeeded() {
            dropped.not_succeeded += 1;
            continue;
        }

        groups
            .entry(event.operation_name.as_str())
            .and_modify(|group| group.fold(event))
            .or_insert_with(|| GroupState::open(event));
    }

    let aggregates = groups
        .into_iter()
        .map(|(operation, group)| group.finish(operation))
        .collect();

    Analysis { aggregates, dropped }
}

/// Derives the action set for a minimal role: every distinct observed
/// operation, minus any matching a denylist prefix.
///
/// The denylist exists so the generated role can never re-grant or modify
/// role assignments itself; the default covers the authorization-management
/// namespace. The result is always a subset of the operations present in
/// `aggregates`.
pub fn derive_minimal_actions(
    aggregates: &[OperationAggregate],
    denylist_prefixes: &[String],
) -> BTreeSet<String> {
    aggregates
        .iter()
        .map(|aggregate| aggregate.operation.as_str())
        .filter(|operation| {
            !denylist_prefixes
                .iter()
                .any(|prefix| operation.starts_with(prefix.as_str()))
        })
        .map(str::to_string)
        .collect()
}

struct GroupState<'a> {
    count: u64,
    first_event: &'a ActivityEvent,
    first_seen: DateTime<Utc>,
    last_seen: DateTime<Utc>,
}

impl<'a> GroupState<'a> {
    fn open(event: &'a ActivityEvent) -> Self {
        Self {
            count: 1,
            first_event: event,
            first_seen: event.timestamp,
            last_seen: event.timestamp,
        }
    }

    fn fold(&mut self, event: &ActivityEvent) {
        self.count += 1;
        self.first_seen = self.first_seen.min(event.timestamp);
        self.last_seen = self.last_seen.max(event.timestamp);
    }

    fn finish(self, operation: &str) -> OperationAggregate {
        // Provider and type come from the first contributing event only;
        // later events with a different resource id do not override it.
        let parsed = self
            .first_event
            .resource_id
            .as_deref()
            .and_then(resource::parse_resource_id);
        let (resource_provider, resource_type) = match parsed {
            Some(parsed) => (parsed.provider, parsed.resource_type),
            None => (UNKNOWN.to_string(), UNKNOWN.to_string()),
        };

        OperationAggregate {
            operation: operation.to_string(),
            count: self.count,
            resource_provider,
            resource_type,
            first_seen: self.first_seen,
            last_seen: self.last_seen,
        }
    }
}
