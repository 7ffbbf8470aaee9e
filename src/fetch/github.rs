use super::{query, Fetcher, LinkedRef};
use crate::error::{GhReportError, Result};
use crate::model::{ActivityKind, DateRange, LifecycleEvent, PullRequestRef, Scope};
use crate::util::parse_timestamp;
use async_trait::async_trait;
use chrono::FixedOffset;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub struct GitHubFetcher {
    client: Client,
    api_url: String,
    timeout: Duration,
    offset: FixedOffset,
}

impl GitHubFetcher {
    pub fn new(token: Option<&str>, api_url: Option<&str>, timeout: Duration, offset: FixedOffset) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github.v3+json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("ghreport/", env!("CARGO_PKG_VERSION"))),
        );
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            let value = HeaderValue::from_str(&format!("token {}", token.trim()))
                .map_err(|_| GhReportError::Validation("GitHub token contains invalid characters".into()))?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            api_url: api_url.unwrap_or(DEFAULT_API_URL).trim_end_matches('/').to_string(),
            timeout,
            offset,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }

    /// One GET with a fixed deadline; an expired deadline is a failure, not a retry.
    async fn get_json(&self, url: &str, params: &[(&str, String)]) -> Result<Value> {
        tracing::debug!(url, ?params, "GET");
        let request = self.client.get(url).query(params).send();
        let response = tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| GhReportError::Timeout(self.timeout))??;

        let status = response.status();
        if !status.is_success() {
            return Err(GhReportError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = tokio::time::timeout(self.timeout, response.json::<Value>())
            .await
            .map_err(|_| GhReportError::Timeout(self.timeout))??;
        Ok(body)
    }

    async fn get_array(&self, url: &str, params: &[(&str, String)]) -> Result<Vec<Value>> {
        match self.get_json(url, params).await? {
            Value::Array(items) => Ok(items),
            other => Err(GhReportError::Upstream(format!(
                "expected a list from {url}, got {}",
                type_name(&other)
            ))),
        }
    }
}

#[async_trait]
impl Fetcher for GitHubFetcher {
    async fn fetch(&self, kind: ActivityKind, scope: &Scope, range: &DateRange) -> Result<Vec<Value>> {
        match scope {
            Scope::User { username, organization } => {
                let (endpoint, q) = query::user_search(kind, username, organization.as_deref(), range);
                let body = self
                    .get_json(
                        &self.endpoint(endpoint),
                        &[("q", q), ("per_page", query::PER_PAGE.to_string())],
                    )
                    .await?;
                match body.get("items") {
                    Some(Value::Array(items)) => Ok(items.clone()),
                    _ => Err(GhReportError::Upstream(format!("search response for {kind} has no items"))),
                }
            }
            Scope::Repository { owner, repo, state } => {
                let (path, params) = query::repository_listing(kind, owner, repo, *state, range, &self.offset)
                    .ok_or_else(|| {
                        GhReportError::Upstream(format!("{kind} is not available for a repository scope"))
                    })?;
                let items = self.get_array(&self.endpoint(&path), &params).await?;
                if kind.is_issue() {
                    // the issues listing also returns pull requests
                    Ok(items.into_iter().filter(|item| item.get("pull_request").is_none()).collect())
                } else {
                    Ok(items)
                }
            }
        }
    }

    async fn fetch_linked_prs(&self, reference: &LinkedRef) -> Result<Vec<PullRequestRef>> {
        match reference {
            LinkedRef::Commit(url) => {
                let items = self.get_array(&format!("{url}/pulls"), &[]).await?;
                Ok(items.iter().filter_map(pull_request_ref).collect())
            }
            LinkedRef::Issue(url) => {
                let items = self
                    .get_array(&format!("{url}/timeline"), &[("per_page", query::PER_PAGE.to_string())])
                    .await?;
                Ok(items.iter().filter_map(cross_referenced_pr).collect())
            }
        }
    }

    async fn fetch_event_history(&self, events_url: &str) -> Result<Vec<LifecycleEvent>> {
        let items = self
            .get_array(events_url, &[("per_page", query::PER_PAGE.to_string())])
            .await?;
        Ok(items.iter().filter_map(lifecycle_event).collect())
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

pub(crate) fn pull_request_ref(item: &Value) -> Option<PullRequestRef> {
    Some(PullRequestRef {
        node_id: item.get("node_id")?.as_str()?.to_string(),
        number: item.get("number").and_then(Value::as_u64),
        url: item.get("html_url").and_then(Value::as_str).map(str::to_string),
        state: item.get("state").and_then(Value::as_str).map(str::to_string),
    })
}

/// A `cross-referenced` timeline entry whose source is a pull request.
fn cross_referenced_pr(item: &Value) -> Option<PullRequestRef> {
    if item.get("event").and_then(Value::as_str) != Some("cross-referenced") {
        return None;
    }
    let source = item.get("source")?.get("issue")?;
    source.get("pull_request")?;
    pull_request_ref(source)
}

fn lifecycle_event(item: &Value) -> Option<LifecycleEvent> {
    Some(LifecycleEvent {
        event: item.get("event")?.as_str()?.to_string(),
        assignee_login: item
            .get("assignee")
            .and_then(|a| a.get("login"))
            .and_then(Value::as_str)
            .map(str::to_string),
        created_at: item
            .get("created_at")
            .and_then(Value::as_str)
            .and_then(parse_timestamp),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn timeline_keeps_only_cross_referenced_pull_requests() {
        let linked = json!({
            "event": "cross-referenced",
            "source": {"issue": {"node_id": "PR_9", "number": 9, "pull_request": {}}}
        });
        let issue_ref = json!({
            "event": "cross-referenced",
            "source": {"issue": {"node_id": "I_3", "number": 3}}
        });
        let labeled = json!({"event": "labeled"});

        assert_eq!(cross_referenced_pr(&linked).unwrap().node_id, "PR_9");
        assert!(cross_referenced_pr(&issue_ref).is_none());
        assert!(cross_referenced_pr(&labeled).is_none());
    }

    #[test]
    fn lifecycle_event_reads_assignee() {
        let ev = lifecycle_event(&json!({
            "event": "assigned",
            "assignee": {"login": "octocat"},
            "created_at": "2024-01-02T08:00:00Z"
        }))
        .unwrap();
        assert_eq!(ev.assignee_login.as_deref(), Some("octocat"));
        assert!(ev.created_at.is_some());
    }

    #[test]
    fn builds_without_token() {
        let fetcher = GitHubFetcher::new(None, Some("http://localhost:1/"), DEFAULT_TIMEOUT, FixedOffset::east_opt(0).unwrap())
            .unwrap();
        assert_eq!(fetcher.endpoint("/search/issues"), "http://localhost:1/search/issues");
    }
}
