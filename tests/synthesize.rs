use async_trait::async_trait;
use chrono::NaiveDate;
use ghreport::fetch::{Fetcher, LinkedRef};
use ghreport::model::{ActivityKind, DateRange, GroupingMode, LifecycleEvent, PullRequestRef, Scope};
use ghreport::util::parse_timestamp;
use ghreport::{synthesize, GhReportError, ReportConfig, Result};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

const API: &str = "https://api.github.com/repos/acme/widgets";
const WEB: &str = "https://github.com/acme/widgets";

/// In-memory upstream. Lookups without a registered answer fail.
#[derive(Default)]
struct StubFetcher {
    streams: HashMap<ActivityKind, Vec<Value>>,
    failing: Vec<ActivityKind>,
    linked: HashMap<String, Vec<PullRequestRef>>,
    histories: HashMap<String, Vec<LifecycleEvent>>,
    calls: AtomicUsize,
}

#[async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(&self, kind: ActivityKind, _scope: &Scope, _range: &DateRange) -> Result<Vec<Value>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(&kind) {
            return Err(GhReportError::Status {
                status: 503,
                url: format!("stub://{kind}"),
            });
        }
        Ok(self.streams.get(&kind).cloned().unwrap_or_default())
    }

    async fn fetch_linked_prs(&self, reference: &LinkedRef) -> Result<Vec<PullRequestRef>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.linked
            .get(reference.url())
            .cloned()
            .ok_or_else(|| GhReportError::Upstream(format!("no linked PRs for {}", reference.url())))
    }

    async fn fetch_event_history(&self, events_url: &str) -> Result<Vec<LifecycleEvent>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.histories
            .get(events_url)
            .cloned()
            .ok_or_else(|| GhReportError::Upstream(format!("no history for {events_url}")))
    }
}

fn pr_ref(node_id: &str) -> PullRequestRef {
    PullRequestRef {
        node_id: node_id.into(),
        number: None,
        url: None,
        state: None,
    }
}

fn assigned(login: &str, at: &str) -> LifecycleEvent {
    LifecycleEvent {
        event: "assigned".into(),
        assignee_login: Some(login.into()),
        created_at: parse_timestamp(at),
    }
}

fn issue(number: u64, title: &str, created: &str) -> Value {
    json!({
        "number": number,
        "title": title,
        "node_id": format!("I_{number}"),
        "state": "open",
        "html_url": format!("{WEB}/issues/{number}"),
        "url": format!("{API}/issues/{number}"),
        "events_url": format!("{API}/issues/{number}/events"),
        "created_at": created,
    })
}

fn commit(sha: &str, committer: &str, message: &str, date: &str) -> Value {
    json!({
        "sha": sha,
        "url": format!("{API}/commits/{sha}"),
        "html_url": format!("{WEB}/commit/{sha}"),
        "committer": {"login": committer},
        "commit": {"message": message, "committer": {"date": date}},
        "repository": {"full_name": "acme/widgets"},
    })
}

fn scenario() -> StubFetcher {
    let pull = json!({
        "number": 12,
        "title": "Add parser",
        "node_id": "PR_12",
        "state": "closed",
        "html_url": format!("{WEB}/pull/12"),
        "url": format!("{API}/issues/12"),
        "created_at": "2024-01-01T09:00:00Z",
        "pull_request": {"merged_at": "2024-01-05T15:00:00Z"},
    });

    let mut fetcher = StubFetcher::default();
    fetcher
        .streams
        .insert(ActivityKind::IssueCreated, vec![issue(7, "Crash on start", "2024-01-03T09:00:00Z")]);
    fetcher.streams.insert(ActivityKind::PRCreated, vec![pull.clone()]);
    fetcher.streams.insert(ActivityKind::PRMerged, vec![pull]);
    fetcher.streams.insert(
        ActivityKind::IssueAssigned,
        vec![
            issue(20, "Write docs", "2023-12-20T09:00:00Z"),
            issue(21, "Someone else's", "2023-12-20T09:00:00Z"),
            issue(22, "Already in review", "2023-12-20T09:00:00Z"),
        ],
    );
    fetcher.streams.insert(
        ActivityKind::CommitCreated,
        vec![
            commit("aaaaaaa1111", "octocat", "Parser core", "2024-01-02T10:00:00Z"),
            commit("bbbbbbb2222", "octocat", "Tidy docs\n\nlonger body", "2024-01-02T11:00:00Z"),
            commit("ccccccc3333", "web-flow", "Merge branch", "2024-01-02T12:00:00Z"),
        ],
    );

    fetcher
        .linked
        .insert(format!("{API}/commits/aaaaaaa1111"), vec![pr_ref("PR_12")]);
    fetcher.linked.insert(format!("{API}/issues/20"), Vec::new());
    fetcher.linked.insert(format!("{API}/issues/22"), vec![pr_ref("PR_30")]);

    fetcher.histories.insert(
        format!("{API}/issues/20/events"),
        vec![assigned("OctoCat", "2024-01-04T08:00:00Z")],
    );
    fetcher.histories.insert(
        format!("{API}/issues/21/events"),
        vec![assigned("someone", "2024-01-04T08:00:00Z")],
    );
    fetcher.histories.insert(
        format!("{API}/issues/22/events"),
        vec![assigned("octocat", "2024-01-04T07:00:00Z")],
    );
    fetcher
}

fn range() -> DateRange {
    DateRange::new(
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
    )
    .unwrap()
}

fn config() -> ReportConfig {
    let mut config = ReportConfig::new("octocat", Some(range()));
    config.organization = Some("acme".into());
    config
}

fn identifiers(report: &ghreport::SynthesizedReport) -> Vec<(ActivityKind, String)> {
    report
        .timeline
        .iter()
        .map(|ev| (ev.kind, ev.identifier.clone()))
        .collect()
}

#[tokio::test]
async fn renders_the_default_eod_report() {
    let report = synthesize(&scenario(), &config()).await.unwrap();

    let expected = "**EOD 01/01/2024 - 05/01/2024** @acme

**How did the day go?**
- Made PR [widgets#12](https://github.com/acme/widgets/pull/12): Add parser
- Merged PR [widgets#12](https://github.com/acme/widgets/pull/12): Add parser
- Created issue [widgets#7](https://github.com/acme/widgets/issues/7): Crash on start
- Committed [widgets#bbbbbbb](https://github.com/acme/widgets/commit/bbbbbbb2222): Tidy docs

**What's next?**
- Work on issue [widgets#20](https://github.com/acme/widgets/issues/20): Write docs";
    assert_eq!(report.text, expected);
    assert!(!report.is_partial());
}

#[tokio::test]
async fn timeline_is_deduplicated_and_sorted() {
    let report = synthesize(&scenario(), &config()).await.unwrap();

    assert_eq!(
        identifiers(&report),
        vec![
            (ActivityKind::PRCreated, "12".to_string()),
            (ActivityKind::PRMerged, "12".to_string()),
            (ActivityKind::IssueAssigned, "20".to_string()),
            (ActivityKind::IssueAssigned, "22".to_string()),
            (ActivityKind::IssueCreated, "7".to_string()),
            (ActivityKind::CommitCreated, "bbbbbbb".to_string()),
        ]
    );
    assert!(report
        .timeline
        .windows(2)
        .all(|w| w[0].ordering_timestamp() >= w[1].ordering_timestamp()));
    let assigned_20 = report.timeline.iter().find(|ev| ev.identifier == "20").unwrap();
    assert_eq!(assigned_20.assigned_at, parse_timestamp("2024-01-04T08:00:00Z"));
}

#[tokio::test]
async fn commits_only_dedup_against_fetched_pull_requests() {
    let mut config = config();
    config.kinds = vec![ActivityKind::CommitCreated];
    let report = synthesize(&scenario(), &config).await.unwrap();

    let ids: Vec<String> = report.timeline.iter().map(|ev| ev.identifier.clone()).collect();
    assert_eq!(ids, ["bbbbbbb", "aaaaaaa"]);
    assert!(report.text.contains("**What's next?**\n"));
    assert!(!report.text.contains("Work on issue"));
}

#[tokio::test]
async fn failed_stream_yields_partial_report() {
    let mut fetcher = scenario();
    fetcher.failing.push(ActivityKind::PRMerged);
    let report = synthesize(&fetcher, &config()).await.unwrap();

    assert!(report.is_partial());
    assert_eq!(report.notices.len(), 1);
    assert_eq!(report.notices[0].kind, ActivityKind::PRMerged);
    assert!(report.text.contains("- Made PR [widgets#12]"));
    assert!(!report.text.contains("- Merged PR"));
}

#[tokio::test]
async fn missing_username_fails_before_any_fetch() {
    let fetcher = scenario();
    let config = ReportConfig::new("  ", Some(range()));
    let err = synthesize(&fetcher, &config).await.unwrap_err();
    assert!(matches!(err, GhReportError::Validation(_)));
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_range_fails_before_any_fetch() {
    let fetcher = scenario();
    let config = ReportConfig::new("octocat", None);
    let err = synthesize(&fetcher, &config).await.unwrap_err();
    assert!(matches!(err, GhReportError::Validation(ref msg) if msg.contains("date range")));
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn grouped_by_day_uses_merge_and_commit_dates() {
    let mut config = config();
    config.grouping = GroupingMode::ByDay;
    let report = synthesize(&scenario(), &config).await.unwrap();

    let today = "
**02/01/2024**
- Committed [widgets#bbbbbbb](https://github.com/acme/widgets/commit/bbbbbbb2222): Tidy docs

**03/01/2024**
- Created issue [widgets#7](https://github.com/acme/widgets/issues/7): Crash on start

**05/01/2024**
- Made PR [widgets#12](https://github.com/acme/widgets/pull/12): Add parser
- Merged PR [widgets#12](https://github.com/acme/widgets/pull/12): Add parser";
    assert!(report.text.contains(&format!("**How did the day go?**\n{today}\n\n**What's next?**")));
}

#[tokio::test]
async fn concurrency_does_not_change_the_outcome() {
    let sequential = synthesize(&scenario(), &config()).await.unwrap();
    let mut config = config();
    config.concurrency = 4;
    let buffered = synthesize(&scenario(), &config).await.unwrap();

    assert_eq!(identifiers(&sequential), identifiers(&buffered));
    assert_eq!(sequential.text, buffered.text);
}

#[tokio::test]
async fn empty_upstream_renders_empty_sections() {
    let config = ReportConfig::new("octocat", Some(range()));
    let report = synthesize(&StubFetcher::default(), &config).await.unwrap();
    assert_eq!(
        report.text,
        "**EOD 01/01/2024 - 05/01/2024** @\n\n**How did the day go?**\n\n\n**What's next?**\n"
    );
    assert!(report.timeline.is_empty());
}
