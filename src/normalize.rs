use crate::model::{ActivityEvent, ActivityKind, IssueState, RepositoryRef};
use crate::util::{first_line, parse_timestamp, repository_from_url, short_hash};
use chrono::{DateTime, Utc};
use serde_json::Value;

/// Attaches the stream label as the `type` property of a raw record.
pub fn tag(kind: ActivityKind, mut item: Value) -> Value {
    if let Value::Object(map) = &mut item {
        map.insert("type".to_string(), Value::String(kind.as_str().to_string()));
    }
    item
}

pub(crate) fn str_at<'a>(item: &'a Value, path: &[&str]) -> Option<&'a str> {
    path.iter()
        .try_fold(item, |node, key| node.get(key))
        .and_then(Value::as_str)
}

/// Merge timestamp from a pull listing (`merged_at`) or a search hit
/// (`pull_request.merged_at`).
pub fn merged_at_raw(item: &Value) -> Option<&str> {
    str_at(item, &["merged_at"]).or_else(|| str_at(item, &["pull_request", "merged_at"]))
}

pub fn is_merged(item: &Value) -> bool {
    merged_at_raw(item).is_some()
}

/// `created_at`, or a commit's committer date, then its author date.
pub fn created_at_raw(item: &Value) -> Option<&str> {
    str_at(item, &["created_at"])
        .or_else(|| str_at(item, &["commit", "committer", "date"]))
        .or_else(|| str_at(item, &["commit", "author", "date"]))
}

/// Present-but-unparseable is `Err`, absent is `Ok(None)`.
fn optional_timestamp(raw: Option<&str>) -> Result<Option<DateTime<Utc>>, ()> {
    match raw {
        None => Ok(None),
        Some(s) => parse_timestamp(s).map(Some).ok_or(()),
    }
}

fn repository_of(item: &Value) -> RepositoryRef {
    ["html_url", "repository_url", "url"]
        .into_iter()
        .filter_map(|key| str_at(item, &[key]))
        .find_map(repository_from_url)
        .or_else(|| {
            let full_name = str_at(item, &["repository", "full_name"])?;
            let (owner, name) = full_name.split_once('/')?;
            Some(RepositoryRef {
                owner: owner.to_string(),
                name: name.to_string(),
            })
        })
        .unwrap_or_default()
}

/// Builds an [`ActivityEvent`] from one raw item of stream `kind`.
///
/// Returns `None` when the item has no parseable ordering timestamp; such
/// items are dropped rather than defaulted.
pub fn normalize(kind: ActivityKind, item: &Value) -> Option<ActivityEvent> {
    let created_at = match created_at_raw(item).and_then(parse_timestamp) {
        Some(ts) => ts,
        None => {
            tracing::debug!(%kind, "dropping item without a parseable created_at");
            return None;
        }
    };
    let merged_at = match optional_timestamp(merged_at_raw(item)) {
        Ok(ts) => ts,
        Err(()) => {
            tracing::debug!(%kind, "dropping item with an unparseable merged_at");
            return None;
        }
    };
    let assigned_at = optional_timestamp(str_at(item, &["assigned_at"])).ok()?;

    let (identifier, title) = match kind {
        ActivityKind::CommitCreated => (
            short_hash(str_at(item, &["sha"]).unwrap_or_default()),
            first_line(str_at(item, &["commit", "message"]).unwrap_or_default()).to_string(),
        ),
        _ => (
            item.get("number")
                .and_then(Value::as_u64)
                .map(|n| n.to_string())
                .unwrap_or_default(),
            str_at(item, &["title"]).unwrap_or_default().to_string(),
        ),
    };

    Some(ActivityEvent {
        kind,
        identifier,
        title,
        repository: repository_of(item),
        url: str_at(item, &["html_url"]).map(str::to_string),
        api_url: str_at(item, &["url"]).map(str::to_string),
        events_url: str_at(item, &["events_url"]).map(str::to_string),
        node_id: str_at(item, &["node_id"]).map(str::to_string),
        created_at,
        merged_at,
        assigned_at,
        linked_pull_requests: Vec::new(),
        state: match kind {
            ActivityKind::CommitCreated => None,
            _ => str_at(item, &["state"]).and_then(IssueState::parse),
        },
    })
}

/// Normalizes a whole stream, keeping upstream order.
pub fn normalize_stream(kind: ActivityKind, items: &[Value]) -> Vec<ActivityEvent> {
    let events: Vec<ActivityEvent> = items.iter().filter_map(|item| normalize(kind, item)).collect();
    let dropped = items.len() - events.len();
    if dropped > 0 {
        tracing::warn!(%kind, dropped, "dropped malformed upstream items");
    }
    events
}
