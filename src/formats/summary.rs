//! Human-readable analysis summary.

use std::fmt::Write;

use crate::core::aggregate::Analysis;
use crate::core::traits::ActivityQuery;

/// Renders the fixed-layout text summary for a run.
///
/// Deterministic for a given analysis and query: the ranking orders by
/// count descending with ascending operation name as the tie-break.
pub fn render_summary(analysis: &Analysis, query: &ActivityQuery, top: usize) -> String {
    let mut out = String::new();
    let providers = analysis.providers();
    let resource_types = analysis.resource_types();

    let _ = writeln!(out, "Activity analysis");
    let _ = writeln!(out, "=================");
    let _ = writeln!(
        out,
        "Period:    {} .. {}",
        query.start.to_rfc3339(),
        query.end.to_rfc3339()
    );
    let _ = writeln!(out, "Principal: {}", query.caller);
    let _ = writeln!(out, "Unique operations: {}", analysis.aggregates.len());
    let _ = writeln!(out, "Resource providers: {}", providers.len());
    let _ = writeln!(out, "Resource types: {}", resource_types.len());
    let _ = writeln!(
        out,
        "Dropped events: {} not succeeded, {} missing operation name",
        analysis.dropped.not_succeeded, analysis.dropped.missing_operation
    );
    let _ = writeln!(out);

    let _ = writeln!(out, "Top operations by call count");
    let _ = writeln!(out, "----------------------------");
    for aggregate in ranked(analysis).into_iter().take(top) {
        let _ = writeln!(out, "{:>6}  {}", aggregate.1, aggregate.0);
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "Resource providers touched");
    let _ = writeln!(out, "--------------------------");
    for provider in providers {
        let _ = writeln!(out, "  {provider}");
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "Recommendation");
    let _ = writeln!(out, "--------------");
    let _ = writeln!(
        out,
        "The generated role grants only the operations observed in this window."
    );
    let _ = writeln!(
        out,
        "An empty or sparse capture means the window missed activity, not that"
    );
    let _ = writeln!(
        out,
        "fewer permissions are needed. Re-run the reference deployment and"
    );
    let _ = writeln!(out, "validate the role in a non-production subscription first.");

    out
}

fn ranked(analysis: &Analysis) -> Vec<(&str, u64)> {
    let mut rows: Vec<(&str, u64)> = analysis
        .aggregates
        .iter()
        .map(|aggregate| (aggregate.operation.as_str(), aggregate.count))
        .collect();
    rows.sort_by(|left, right| right.1.cmp(&left.1).then(left.0.cmp(right.0)));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::aggregate::aggregate;
    use crate::core::event::{ActivityEvent, EventStatus};
    use chrono::{TimeZone, Utc};

    fn capture_query() -> ActivityQuery {
        ActivityQuery {
            caller: "deploy-sp@example.com".to_string(),
            start: Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2026, 3, 14, 11, 0, 0).unwrap(),
        }
    }

    fn event(operation: &str, minute: u32) -> ActivityEvent {
        ActivityEvent {
            operation_name: operation.to_string(),
            status: EventStatus::Succeeded,
            timestamp: Utc.with_ymd_and_hms(2026, 3, 14, 10, minute, 0).unwrap(),
            resource_id: None,
            resource_group: None,
            caller: "deploy-sp@example.com".to_string(),
        }
    }

    #[test]
    fn summary_reports_counts_and_principal() {
        let analysis = aggregate(&[
            event("Microsoft.Web/sites/write", 0),
            event("Microsoft.Web/sites/write", 1),
            event("Microsoft.Storage/storageAccounts/write", 2),
        ]);
        let text = render_summary(&analysis, &capture_query(), 10);

        assert!(text.contains("Principal: deploy-sp@example.com"));
        assert!(text.contains("Unique operations: 2"));
        assert!(text.contains("     2  Microsoft.Web/sites/write"));
    }

    #[test]
    fn ranking_breaks_count_ties_by_name() {
        let analysis = aggregate(&[
            event("Microsoft.Web/sites/write", 0),
            event("Microsoft.Storage/storageAccounts/write", 1),
        ]);
        let rows = ranked(&analysis);
        assert_eq!(rows[0].0, "Microsoft.Storage/storageAccounts/write");
        assert_eq!(rows[1].0, "Microsoft.Web/sites/write");
    }

    #[test]
    fn rendering_is_deterministic() {
        let analysis = aggregate(&[
            event("Microsoft.Web/sites/write", 0),
            event("Microsoft.Web/sites/read", 1),
        ]);
        let query = capture_query();
        assert_eq!(
            render_summary(&analysis, &query, 5),
            render_summary(&analysis, &query, 5)
        );
    }
}
