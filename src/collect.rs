use crate::error::{GhReportError, Result};
use crate::fetch::Fetcher;
use crate::model::{ActivityKind, DateRange, Scope, StreamFailure};
use crate::normalize::tag;
use serde_json::Value;

/// Raw items of every requested stream, in request order, plus the streams
/// that failed and contributed nothing.
#[derive(Debug, Default)]
pub struct StreamBatch {
    pub streams: Vec<(ActivityKind, Vec<Value>)>,
    pub failures: Vec<StreamFailure>,
}

impl StreamBatch {
    pub fn items(&self, kind: ActivityKind) -> &[Value] {
        self.streams
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, items)| items.as_slice())
            .unwrap_or(&[])
    }

    /// Every item, tagged with its stream label, in stream order.
    pub fn into_records(self) -> Vec<Value> {
        self.streams
            .into_iter()
            .flat_map(|(kind, items)| items.into_iter().map(move |item| tag(kind, item)))
            .collect()
    }

    pub fn total(&self) -> usize {
        self.streams.iter().map(|(_, items)| items.len()).sum()
    }
}

pub fn validate_scope(scope: &Scope) -> Result<()> {
    match scope {
        Scope::User { username, .. } if username.trim().is_empty() => {
            Err(GhReportError::Validation("username is required".into()))
        }
        Scope::Repository { owner, repo, .. } if owner.trim().is_empty() || repo.trim().is_empty() => {
            Err(GhReportError::Validation("repository must be given as owner/repo".into()))
        }
        _ => Ok(()),
    }
}

pub fn require_range(range: Option<&DateRange>) -> Result<DateRange> {
    range
        .copied()
        .ok_or_else(|| GhReportError::Validation("date range is required".into()))
}

/// Issues one query per requested stream.
///
/// A failing stream is logged and recorded in [`StreamBatch::failures`]; the
/// remaining streams are still fetched.
pub async fn collect_streams(
    fetcher: &dyn Fetcher,
    scope: &Scope,
    kinds: &[ActivityKind],
    range: &DateRange,
) -> Result<StreamBatch> {
    validate_scope(scope)?;

    let mut batch = StreamBatch::default();
    for &kind in ActivityKind::ALL.iter().filter(|k| kinds.contains(k)) {
        tracing::info!(%kind, scope = %scope.describe(), "fetching stream");
        match fetcher.fetch(kind, scope, range).await {
            Ok(items) => {
                tracing::debug!(%kind, count = items.len(), "stream fetched");
                batch.streams.push((kind, items));
            }
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => {
                tracing::warn!(%kind, error = %err, "stream failed, continuing without it");
                batch.failures.push(StreamFailure {
                    kind,
                    reason: err.to_string(),
                });
                batch.streams.push((kind, Vec::new()));
            }
        }
    }
    Ok(batch)
}
