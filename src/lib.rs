//! GitHub activity aggregation: per-user timelines, EOD report synthesis and
//! tabular repository export.

pub mod cli;
pub mod collect;
pub mod dedup;
pub mod error;
pub mod export;
pub mod fetch;
pub mod model;
pub mod normalize;
pub mod report;
pub mod timeline;
pub mod tui;
pub mod util;

pub use error::{GhReportError, Result};
pub use fetch::{Fetcher, GitHubFetcher, LinkedRef};
pub use report::{render_report, synthesize, ReportConfig, ReportTemplate, SynthesizedReport};
