//! Human-readable summary renderer for reconciled calendars.

use crate::diff::model::{DiffStatus, DiffSummary, ReconciledEvent};
use crate::model::TimeField;

/// Render a Markdown/text review summary of a reconciliation.
///
/// Informational only; the structured events remain the source of truth.
pub fn render_human_summary(events: &[ReconciledEvent]) -> String {
    let mut out = String::new();
    let summary = DiffSummary::from_events(events);

    out.push_str("## Calendar Diff\n\n");
    out.push_str("| Status | Count |\n|---|---|\n");
    for status in DiffStatus::ALL {
        out.push_str(&format!("| {} | {} |\n", status, summary.count(status)));
    }
    out.push_str(&format!("| **total** | {} |\n\n", summary.total));

    if summary.is_clean() {
        out.push_str("_No changes detected._\n");
        return out;
    }

    for status in [
        DiffStatus::New,
        DiffStatus::Deleted,
        DiffStatus::Modified,
        DiffStatus::Shifted,
    ] {
        let section: Vec<&ReconciledEvent> =
            events.iter().filter(|e| e.diff_status == status).collect();
        if section.is_empty() {
            continue;
        }
        out.push_str(&format!("### {} ({})\n\n", heading(status), section.len()));
        for event in section {
            out.push_str(&format!("- {}\n", describe(event)));
        }
        out.push('\n');
    }

    out
}

fn heading(status: DiffStatus) -> &'static str {
    match status {
        DiffStatus::New => "New",
        DiffStatus::Deleted => "Deleted",
        DiffStatus::Modified => "Modified",
        DiffStatus::Unchanged => "Unchanged",
        DiffStatus::Shifted => "Shifted",
    }
}

fn describe(event: &ReconciledEvent) -> String {
    let record = &event.record;
    let id = record
        .diff_id
        .as_deref()
        .or(record.normalized_unique_id())
        .unwrap_or("(no id)");
    let mut line = format!(
        "`{}` start {} end {}",
        id,
        cell(record.start_time.as_ref()),
        cell(record.end_time.as_ref())
    );

    if !event.changed_fields.is_empty() {
        let fields: Vec<&str> = event.changed_fields.iter().map(|f| f.as_str()).collect();
        line.push_str(&format!(" [{}]", fields.join(", ")));
    }
    if let Some(original) = &event.original_start_time {
        line.push_str(&format!(" (was {})", original.to_cell()));
    }
    line
}

fn cell(value: Option<&TimeField>) -> String {
    value.map(TimeField::to_cell).unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::model::ChangedField;
    use crate::model::EventRecord;
    use std::collections::BTreeSet;

    #[test]
    fn test_clean_summary_short_circuits() {
        let events = vec![ReconciledEvent::new(
            EventRecord::default().with_diff_id("e1"),
            DiffStatus::Unchanged,
        )];
        let text = render_human_summary(&events);
        assert!(text.contains("| unchanged | 1 |"));
        assert!(text.contains("_No changes detected._"));
        assert!(!text.contains("### "));
    }

    #[test]
    fn test_shifted_line_names_fields_and_original_start() {
        let mut shifted = ReconciledEvent::compared(
            EventRecord::default().with_diff_id("e2").with_times(500, 600),
            BTreeSet::from([ChangedField::Dates]),
        );
        shifted.diff_status = DiffStatus::Shifted;
        shifted.original_start_time = Some(TimeField::Instant(100));

        let text = render_human_summary(&[shifted]);
        assert!(text.contains("### Shifted (1)"));
        assert!(text.contains("`e2` start 500 end 600 [dates] (was 100)"));
    }

    #[test]
    fn test_deleted_without_ids_or_dates() {
        let events = vec![ReconciledEvent::new(EventRecord::default(), DiffStatus::Deleted)];
        let text = render_human_summary(&events);
        assert!(text.contains("`(no id)` start - end -"));
    }
}
