//! EOD report synthesis: fetch every requested stream for one user, drop
//! commits already covered by a pull request, merge into one timeline and
//! render it through a [`ReportTemplate`].

pub mod exec;
pub mod group;
pub mod output;
pub mod render;

use crate::collect::{collect_streams, require_range, validate_scope};
use crate::dedup::{committed_by, drop_linked_commits, resolve_assignments};
use crate::error::Result;
use crate::fetch::Fetcher;
use crate::model::{ActivityEvent, ActivityKind, DateRange, GroupingMode, Scope, StreamFailure};
use crate::normalize::normalize_stream;
use crate::timeline::merge;
use chrono::{FixedOffset, Offset, Utc};

pub use render::ReportTemplate;

#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub username: String,
    pub organization: Option<String>,
    pub range: Option<DateRange>,
    pub kinds: Vec<ActivityKind>,
    pub grouping: GroupingMode,
    pub offset: FixedOffset,
    pub template: ReportTemplate,
    /// In-flight linked PR / event history lookups.
    pub concurrency: usize,
}

impl ReportConfig {
    pub fn new(username: impl Into<String>, range: Option<DateRange>) -> Self {
        Self {
            username: username.into(),
            organization: None,
            range,
            kinds: ActivityKind::ALL.to_vec(),
            grouping: GroupingMode::Ungrouped,
            offset: Utc.fix(),
            template: ReportTemplate::default(),
            concurrency: 1,
        }
    }

    pub fn scope(&self) -> Scope {
        Scope::User {
            username: self.username.clone(),
            organization: self.organization.clone(),
        }
    }
}

/// A merged timeline plus the streams that could not be fetched.
#[derive(Debug, Clone)]
pub struct ActivityTimeline {
    pub range: DateRange,
    pub events: Vec<ActivityEvent>,
    pub notices: Vec<StreamFailure>,
}

#[derive(Debug, Clone)]
pub struct SynthesizedReport {
    pub text: String,
    pub timeline: Vec<ActivityEvent>,
    pub notices: Vec<StreamFailure>,
}

impl SynthesizedReport {
    pub fn is_partial(&self) -> bool {
        !self.notices.is_empty()
    }
}

/// Fetches, deduplicates and merges the user's activity for `config.range`.
///
/// The username and range are validated before any request is made.
pub async fn build_timeline(fetcher: &dyn Fetcher, config: &ReportConfig) -> Result<ActivityTimeline> {
    let scope = config.scope();
    validate_scope(&scope)?;
    let range = require_range(config.range.as_ref())?;

    let batch = collect_streams(fetcher, &scope, &config.kinds, &range).await?;
    tracing::info!(items = batch.total(), failures = batch.failures.len(), "streams collected");

    let issues = normalize_stream(ActivityKind::IssueCreated, batch.items(ActivityKind::IssueCreated));
    let created = normalize_stream(ActivityKind::PRCreated, batch.items(ActivityKind::PRCreated));
    let merged = normalize_stream(ActivityKind::PRMerged, batch.items(ActivityKind::PRMerged));

    let assigned = normalize_stream(ActivityKind::IssueAssigned, batch.items(ActivityKind::IssueAssigned));
    let assigned = if assigned.is_empty() {
        assigned
    } else {
        resolve_assignments(fetcher, assigned, &config.username, config.concurrency).await
    };

    let commit_items = committed_by(batch.items(ActivityKind::CommitCreated), &config.username);
    let commits = normalize_stream(ActivityKind::CommitCreated, &commit_items);
    let commits = if commits.is_empty() {
        commits
    } else {
        let pull_requests: Vec<ActivityEvent> = created.iter().chain(merged.iter()).cloned().collect();
        drop_linked_commits(fetcher, commits, &pull_requests, config.concurrency).await
    };

    let events = merge(vec![issues, created, merged, assigned, commits]);
    tracing::info!(events = events.len(), "timeline merged");

    Ok(ActivityTimeline {
        range,
        events,
        notices: batch.failures,
    })
}

/// Renders an already built timeline with the config's template, kinds and grouping.
pub fn render_report(timeline: &[ActivityEvent], range: &DateRange, config: &ReportConfig) -> String {
    let today = render::render_today(timeline, &config.kinds, config.grouping, &config.offset);
    let tomorrow = render::render_tomorrow(timeline, &config.kinds);
    config.template.fill(
        &render::render_date(range),
        config.organization.as_deref().unwrap_or(""),
        &today,
        &tomorrow,
    )
}

pub async fn synthesize(fetcher: &dyn Fetcher, config: &ReportConfig) -> Result<SynthesizedReport> {
    let timeline = build_timeline(fetcher, config).await?;
    let text = render_report(&timeline.events, &timeline.range, config);
    Ok(SynthesizedReport {
        text,
        timeline: timeline.events,
        notices: timeline.notices,
    })
}
