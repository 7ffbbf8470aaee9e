use crate::model::{ActivityEvent, ActivityKind, DateRange, StateFilter};
use crate::normalize::{is_merged, str_at};
use crate::util::parse_timestamp;
use chrono::FixedOffset;
use serde_json::Value;

/// Concatenates the streams in the order given and sorts the result newest
/// first by ordering timestamp. The sort is stable, so equal timestamps keep
/// concatenation order. Merged-PR events without a merge timestamp are dropped.
pub fn merge(streams: Vec<Vec<ActivityEvent>>) -> Vec<ActivityEvent> {
    let mut timeline: Vec<ActivityEvent> = streams
        .into_iter()
        .flatten()
        .filter(|ev| ev.kind != ActivityKind::PRMerged || ev.merged_at.is_some())
        .collect();
    timeline.sort_by(|a, b| b.ordering_timestamp().cmp(&a.ordering_timestamp()));
    timeline
}

/// `created_at`, else the commit author date. Export windows commits on when
/// they were written, whereas the timeline orders them by when they landed.
fn record_date_raw(record: &Value) -> Option<&str> {
    str_at(record, &["created_at"])
        .or_else(|| str_at(record, &["commit", "author", "date"]))
        .or_else(|| str_at(record, &["commit", "committer", "date"]))
}

/// Tagged records are recognised by `type`; raw dumps by a `pull_request`
/// key or a pull request html url.
fn is_pull_request_record(record: &Value) -> bool {
    if let Some(kind) = str_at(record, &["type"]).and_then(|t| t.parse::<ActivityKind>().ok()) {
        return kind.is_pull_request();
    }
    record.get("pull_request").is_some()
        || str_at(record, &["html_url"]).is_some_and(|url| url.contains("/pull/"))
}

/// Restricts raw records to the window. Records without a parseable creation
/// date are dropped.
pub fn window_records(records: Vec<Value>, range: &DateRange, offset: &FixedOffset) -> Vec<Value> {
    records
        .into_iter()
        .filter(|record| {
            record_date_raw(record)
                .and_then(parse_timestamp)
                .is_some_and(|created| range.contains(&created, offset))
        })
        .collect()
}

/// With [`StateFilter::Merged`], keeps pull requests carrying a merge
/// timestamp and drops every other record. Other filters keep everything.
pub fn filter_state(records: Vec<Value>, state: StateFilter) -> Vec<Value> {
    if state != StateFilter::Merged {
        return records;
    }
    records
        .into_iter()
        .filter(|record| is_pull_request_record(record) && is_merged(record))
        .collect()
}
