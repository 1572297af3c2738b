// --- File: crates/calboard_calendly/src/export.rs ---
//! CSV rendering of aggregate results.
//!
//! The column contract is fixed: every timestamp in the configured local
//! time zone as `YYYY-MM-DD HH:MM`, status capitalized, failed sources as a
//! row carrying the reason in the event-name column and `N/A` placeholders
//! elsewhere.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::models::AggregateEntry;

pub const CSV_HEADER: &str = "Professional,Event Name,Created At,Start Time,End Time,Status";

const PLACEHOLDER: &str = "N/A";

/// Renders the aggregate as a CSV document, header included. `Failed`
/// entries are kept in sequence as explicit placeholder rows.
pub fn render_csv(entries: &[AggregateEntry], time_zone: Tz) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');

    for entry in entries {
        let row = match entry {
            AggregateEntry::Event(event) => [
                event
                    .professional_name
                    .clone()
                    .unwrap_or_else(|| event.display_name().to_string()),
                event.name.clone().unwrap_or_else(|| "No Name".to_string()),
                format_local(event.created_at, time_zone),
                format_local(event.start_time, time_zone),
                format_local(event.end_time, time_zone),
                capitalize(&event.status),
            ],
            AggregateEntry::Failed {
                professional_name,
                reason,
            } => [
                professional_name.clone(),
                reason.clone(),
                PLACEHOLDER.to_string(),
                PLACEHOLDER.to_string(),
                PLACEHOLDER.to_string(),
                PLACEHOLDER.to_string(),
            ],
        };

        let line: Vec<String> = row.iter().map(|field| csv_field(field)).collect();
        out.push_str(&line.join(","));
        out.push('\n');
    }

    out
}

/// Fixed-zone `YYYY-MM-DD HH:MM` rendering of a timestamp.
pub(crate) fn format_local(instant: DateTime<Utc>, time_zone: Tz) -> String {
    instant
        .with_timezone(&time_zone)
        .format("%Y-%m-%d %H:%M")
        .to_string()
}

/// First letter uppercased, rest untouched ("active" -> "Active").
pub(crate) fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// RFC 4180 quoting: fields containing comma, quote or newline get wrapped
/// in double quotes with embedded quotes doubled.
pub(crate) fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
