//! Boundary to the upstream REST source.
//!
//! Everything the engine needs from GitHub goes through [`Fetcher`], so the
//! aggregation pipeline can run against [`GitHubFetcher`] or an in-memory
//! implementation in tests.

pub mod github;
pub mod query;

use crate::error::Result;
use crate::model::{ActivityKind, DateRange, LifecycleEvent, PullRequestRef, Scope};
use async_trait::async_trait;
use serde_json::Value;

pub use github::GitHubFetcher;

/// What a linked pull request lookup is keyed by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkedRef {
    /// API url of a commit (`/repos/o/r/commits/<sha>`).
    Commit(String),
    /// API url of an issue (`/repos/o/r/issues/<n>`).
    Issue(String),
}

impl LinkedRef {
    pub fn url(&self) -> &str {
        match self {
            LinkedRef::Commit(url) | LinkedRef::Issue(url) => url,
        }
    }
}

#[async_trait]
pub trait Fetcher: Send + Sync {
    /// First page of raw items for one stream.
    async fn fetch(&self, kind: ActivityKind, scope: &Scope, range: &DateRange) -> Result<Vec<Value>>;

    async fn fetch_linked_prs(&self, reference: &LinkedRef) -> Result<Vec<PullRequestRef>>;

    async fn fetch_event_history(&self, events_url: &str) -> Result<Vec<LifecycleEvent>>;
}
