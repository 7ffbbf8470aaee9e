use crate::model::{ActivityKind, DateRange, StateFilter};
use chrono::FixedOffset;

pub const PER_PAGE: &str = "100";

/// Search endpoint and `q` value for a user scoped stream.
pub fn user_search(
    kind: ActivityKind,
    username: &str,
    organization: Option<&str>,
    range: &DateRange,
) -> (&'static str, String) {
    let window = range.search_qualifier();
    let (endpoint, mut q) = match kind {
        ActivityKind::IssueCreated => ("search/issues", format!("author:{username} is:issue created:{window}")),
        ActivityKind::PRCreated => ("search/issues", format!("author:{username} is:pr created:{window}")),
        ActivityKind::PRMerged => (
            "search/issues",
            format!("author:{username} is:pr is:merged merged:{window}"),
        ),
        ActivityKind::IssueAssigned => (
            "search/issues",
            format!("assignee:{username} is:issue created:{window}"),
        ),
        ActivityKind::CommitCreated => (
            "search/commits",
            format!("author:{username} committer-date:{window}"),
        ),
    };
    if let Some(org) = organization.filter(|o| !o.is_empty()) {
        q.push_str(&format!(" org:{org}"));
    }
    (endpoint, q)
}

/// Path and query parameters for a repository scoped stream, or `None` when
/// the stream has no repository listing.
pub fn repository_listing(
    kind: ActivityKind,
    owner: &str,
    repo: &str,
    state: StateFilter,
    range: &DateRange,
    offset: &FixedOffset,
) -> Option<(String, Vec<(&'static str, String)>)> {
    let base = format!("repos/{owner}/{repo}");
    match kind {
        ActivityKind::PRCreated | ActivityKind::PRMerged => {
            let upstream = if kind == ActivityKind::PRMerged {
                StateFilter::Merged.upstream()
            } else {
                state.upstream()
            };
            Some((
                format!("{base}/pulls"),
                vec![("state", upstream.to_string()), ("per_page", PER_PAGE.to_string())],
            ))
        }
        ActivityKind::IssueCreated => Some((
            format!("{base}/issues"),
            vec![("state", state.upstream().to_string()), ("per_page", PER_PAGE.to_string())],
        )),
        ActivityKind::CommitCreated => Some((
            format!("{base}/commits"),
            vec![
                ("since", range.start_instant(offset).to_rfc3339()),
                ("until", range.end_instant(offset).to_rfc3339()),
                ("per_page", PER_PAGE.to_string()),
            ],
        )),
        ActivityKind::IssueAssigned => None,
    }
}
