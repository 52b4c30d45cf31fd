//! CSV rendering for the grouped analysis.
//!
//! One header row, one row per aggregate, RFC-4180 quoting so the file
//! opens cleanly in spreadsheet tools.

use crate::core::aggregate::OperationAggregate;

const HEADER: &str = "Operation,Count,Resource Provider,Resource Type,First Seen,Last Seen";

/// Renders the aggregate set as CSV text.
pub fn render_csv(aggregates: &[OperationAggregate]) -> String {
    let mut out = String::with_capacity(64 * (aggregates.len() + 1));
    out.push_str(HEADER);
    out.push('\n');
    for aggregate in aggregates {
        let row = [
            escape_field(&aggregate.operation),
            aggregate.count.to_string(),
            escape_field(&aggregate.resource_provider),
            escape_field(&aggregate.resource_type),
            aggregate.first_seen.to_rfc3339(),
            aggregate.last_seen.to_rfc3339(),
        ];
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

/// Parses rendered CSV back into `(operation, count)` pairs.
///
/// Only the two leading fields are recovered; this exists to verify that
/// a rendered file survives a round trip through a standard CSV reader.
pub fn parse_rows(csv: &str) -> Vec<(String, u64)> {
    csv.lines()
        .skip(1)
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let fields = split_record(line);
            let operation = fields.first()?.clone();
            let count = fields.get(1)?.parse().ok()?;
            Some((operation, count))
        })
        .collect()
}

fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn split_record(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '"' if quoted => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    current.push('"');
                } else {
                    quoted = false;
                }
            }
            '"' => quoted = true,
            ',' if !quoted => {
                fields.push(std::mem::take(&mut current));
            }
            _ => current.push(ch),
        }
    }
    fields.push(current);
    fields
}
