use crate::fetch::{Fetcher, LinkedRef};
use crate::model::{ActivityEvent, LifecycleEvent};
use crate::normalize::str_at;
use futures::future;
use futures::stream::{self, StreamExt};
use serde_json::Value;
use std::collections::HashSet;

/// Commit search hits are matched on author; keep only those the user also committed.
pub fn committed_by(items: &[Value], username: &str) -> Vec<Value> {
    items
        .iter()
        .filter(|item| {
            str_at(item, &["committer", "login"]).is_some_and(|login| login.eq_ignore_ascii_case(username))
        })
        .cloned()
        .collect()
}

/// Drops every commit whose linked pull requests include one of `pull_requests`
/// (matched on node id). A commit whose lookup fails is kept.
///
/// Lookups run through an ordered buffer of `concurrency` in-flight requests;
/// `1` is strictly one commit at a time. Output order matches input order for
/// any limit.
pub async fn drop_linked_commits(
    fetcher: &dyn Fetcher,
    commits: Vec<ActivityEvent>,
    pull_requests: &[ActivityEvent],
    concurrency: usize,
) -> Vec<ActivityEvent> {
    let known: HashSet<&str> = pull_requests
        .iter()
        .filter_map(|pr| pr.node_id.as_deref())
        .collect();
    let known = &known;

    stream::iter(commits)
        .map(|commit| async move {
            let Some(url) = commit.api_url.clone() else {
                return Some(commit);
            };
            match fetcher.fetch_linked_prs(&LinkedRef::Commit(url)).await {
                Ok(linked) => {
                    let represented = linked.iter().any(|pr| known.contains(pr.node_id.as_str()));
                    if represented {
                        tracing::debug!(commit = %commit.identifier, "commit already represented by a pull request");
                        None
                    } else {
                        Some(commit)
                    }
                }
                Err(err) => {
                    tracing::warn!(commit = %commit.identifier, error = %err, "linked PR lookup failed, keeping commit");
                    Some(commit)
                }
            }
        })
        .buffered(concurrency.max(1))
        .filter_map(future::ready)
        .collect()
        .await
}

fn assignment_time(history: &[LifecycleEvent], username: &str) -> Option<chrono::DateTime<chrono::Utc>> {
    history
        .iter()
        .filter(|ev| ev.event == "assigned")
        .find(|ev| {
            ev.assignee_login
                .as_deref()
                .is_some_and(|login| login.eq_ignore_ascii_case(username))
        })
        .and_then(|ev| ev.created_at)
}

/// Resolves when each issue was assigned to `username` and which pull
/// requests are linked to it.
///
/// Issues with no matching `assigned` event in their history are dropped. A
/// failed history lookup counts as an empty history; a failed linked PR lookup
/// leaves the issue with no linked PRs.
pub async fn resolve_assignments(
    fetcher: &dyn Fetcher,
    issues: Vec<ActivityEvent>,
    username: &str,
    concurrency: usize,
) -> Vec<ActivityEvent> {
    stream::iter(issues)
        .map(|mut issue| async move {
            let history = match issue.events_url.as_deref() {
                Some(url) => fetcher.fetch_event_history(url).await.unwrap_or_else(|err| {
                    tracing::warn!(issue = %issue.identifier, error = %err, "event history lookup failed");
                    Vec::new()
                }),
                None => Vec::new(),
            };

            let Some(assigned_at) = assignment_time(&history, username) else {
                tracing::debug!(issue = %issue.identifier, "no assignment to user found, skipping");
                return None;
            };
            issue.assigned_at = Some(assigned_at);

            if let Some(url) = issue.api_url.clone() {
                issue.linked_pull_requests = fetcher
                    .fetch_linked_prs(&LinkedRef::Issue(url))
                    .await
                    .unwrap_or_else(|err| {
                        tracing::warn!(issue = %issue.identifier, error = %err, "linked PR lookup failed");
                        Vec::new()
                    });
            }
            Some(issue)
        })
        .buffered(concurrency.max(1))
        .filter_map(future::ready)
        .collect()
        .await
}
