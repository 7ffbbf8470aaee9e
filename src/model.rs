use crate::error::{GhReportError, Result};
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActivityKind {
    IssueCreated,
    #[serde(rename = "pr-created")]
    PRCreated,
    #[serde(rename = "pr-merged")]
    PRMerged,
    IssueAssigned,
    CommitCreated,
}

impl ActivityKind {
    /// Stream concatenation order used by the merger.
    pub const ALL: [ActivityKind; 5] = [
        ActivityKind::IssueCreated,
        ActivityKind::PRCreated,
        ActivityKind::PRMerged,
        ActivityKind::IssueAssigned,
        ActivityKind::CommitCreated,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::IssueCreated => "issue-created",
            ActivityKind::PRCreated => "pr-created",
            ActivityKind::PRMerged => "pr-merged",
            ActivityKind::IssueAssigned => "issue-assigned",
            ActivityKind::CommitCreated => "commit-created",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ActivityKind::IssueCreated => "Issue Created",
            ActivityKind::PRCreated => "Pull Request Created",
            ActivityKind::PRMerged => "Pull Request Merged",
            ActivityKind::IssueAssigned => "Issue Assigned",
            ActivityKind::CommitCreated => "Commit Created",
        }
    }

    pub fn is_pull_request(&self) -> bool {
        matches!(self, ActivityKind::PRCreated | ActivityKind::PRMerged)
    }

    pub fn is_issue(&self) -> bool {
        matches!(self, ActivityKind::IssueCreated | ActivityKind::IssueAssigned)
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ActivityKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = ActivityKind::ALL.iter().map(|k| k.as_str()).collect();
                format!("unknown activity kind '{s}' (expected one of: {})", known.join(", "))
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    Open,
    Closed,
}

impl IssueState {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "open" => Some(IssueState::Open),
            "closed" => Some(IssueState::Closed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RepositoryRef {
    pub owner: String,
    pub name: String,
}

impl RepositoryRef {
    pub fn full_name(&self) -> String {
        if self.owner.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", self.owner, self.name)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestRef {
    pub node_id: String,
    pub number: Option<u64>,
    pub url: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleEvent {
    pub event: String,
    pub assignee_login: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub kind: ActivityKind,
    pub identifier: String,
    pub title: String,
    pub repository: RepositoryRef,
    pub url: Option<String>,
    pub api_url: Option<String>,
    pub events_url: Option<String>,
    pub node_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub merged_at: Option<DateTime<Utc>>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub linked_pull_requests: Vec<PullRequestRef>,
    pub state: Option<IssueState>,
}

impl ActivityEvent {
    /// `merged_at`, then `assigned_at`, then `created_at`.
    pub fn ordering_timestamp(&self) -> DateTime<Utc> {
        self.merged_at.or(self.assigned_at).unwrap_or(self.created_at)
    }

    pub fn ordering_date(&self, offset: &FixedOffset) -> NaiveDate {
        self.ordering_timestamp().with_timezone(offset).date_naive()
    }

    /// An assigned issue with no linked pull request that is still open.
    pub fn is_unfinished(&self) -> bool {
        self.kind == ActivityKind::IssueAssigned
            && self.linked_pull_requests.is_empty()
            && self.state == Some(IssueState::Open)
    }
}

/// Inclusive calendar-day window `start..=end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(GhReportError::Validation(format!(
                "Invalid range: start ({start}) is after end ({end})"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn is_single_day(&self) -> bool {
        self.start == self.end
    }

    /// First instant of `start` in `offset`.
    pub fn start_instant(&self, offset: &FixedOffset) -> DateTime<Utc> {
        midnight(self.start, offset)
    }

    /// First instant after `end` in `offset`; the window is half-open at this bound.
    pub fn end_instant(&self, offset: &FixedOffset) -> DateTime<Utc> {
        midnight(self.end + Duration::days(1), offset)
    }

    pub fn contains(&self, timestamp: &DateTime<Utc>, offset: &FixedOffset) -> bool {
        *timestamp >= self.start_instant(offset) && *timestamp < self.end_instant(offset)
    }

    /// GitHub search qualifier value, inclusive on both ends.
    pub fn search_qualifier(&self) -> String {
        format!("{}..{}", self.start.format("%Y-%m-%d"), self.end.format("%Y-%m-%d"))
    }
}

fn midnight(date: NaiveDate, offset: &FixedOffset) -> DateTime<Utc> {
    let naive = date.and_hms_opt(0, 0, 0).unwrap_or_default();
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateFilter {
    #[default]
    All,
    Open,
    Closed,
    Merged,
}

impl StateFilter {
    /// Upstream state predicate; "merged" is only a post-filter.
    pub fn upstream(&self) -> &'static str {
        match self {
            StateFilter::All => "all",
            StateFilter::Open => "open",
            StateFilter::Closed | StateFilter::Merged => "closed",
        }
    }
}

impl FromStr for StateFilter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(StateFilter::All),
            "open" => Ok(StateFilter::Open),
            "closed" => Ok(StateFilter::Closed),
            "merged" => Ok(StateFilter::Merged),
            _ => Err(format!("unknown state '{s}' (expected all, open, closed or merged)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    User {
        username: String,
        organization: Option<String>,
    },
    Repository {
        owner: String,
        repo: String,
        state: StateFilter,
    },
}

impl Scope {
    pub fn describe(&self) -> String {
        match self {
            Scope::User { username, organization: Some(org) } => format!("{username} in {org}"),
            Scope::User { username, organization: None } => username.clone(),
            Scope::Repository { owner, repo, .. } => format!("{owner}/{repo}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupingMode {
    #[default]
    Ungrouped,
    ByDay,
    ByWeek,
}

impl GroupingMode {
    /// Week grouping wins when both are requested.
    pub fn from_flags(by_day: bool, by_week: bool) -> Self {
        if by_week {
            GroupingMode::ByWeek
        } else if by_day {
            GroupingMode::ByDay
        } else {
            GroupingMode::Ungrouped
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamFailure {
    pub kind: ActivityKind,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub scope: String,
    pub range: DateRange,
    pub events: Vec<ActivityEvent>,
    pub notices: Vec<StreamFailure>,
}
