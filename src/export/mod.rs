//! Tabular export: raw repository records projected onto a column
//! allow-list and encoded as CSV or JSON.

pub mod encode;
pub mod project;

pub use encode::{to_csv, to_json};
pub use project::{default_fields, to_flat_rows, validate_fields, ExportRow, ALLOWED_FIELDS};

use crate::cli::{CommonArgs, RangeArgs};
use crate::collect::{collect_streams, require_range};
use crate::error::GhReportError;
use crate::model::{ActivityKind, DateRange, Scope, StateFilter};
use crate::report::output::spinner;
use crate::timeline::{filter_state, window_records};
use crate::util::parse_repository_arg;
use anyhow::Context;
use clap::ValueEnum;
use console::style;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Streams fetched for a repository when none are selected.
pub const DEFAULT_KINDS: [ActivityKind; 3] = [
    ActivityKind::IssueCreated,
    ActivityKind::PRCreated,
    ActivityKind::CommitCreated,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    pub fn encode(&self, rows: &[ExportRow], fields: &[String]) -> crate::error::Result<String> {
        match self {
            ExportFormat::Csv => to_csv(rows, fields),
            ExportFormat::Json => to_json(rows),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub repo: Option<String>,
    pub input: Option<PathBuf>,
    pub kinds: Vec<ActivityKind>,
    pub state: StateFilter,
    pub range: RangeArgs,
    pub fields: Vec<String>,
    pub format: ExportFormat,
    pub output: Option<PathBuf>,
}

pub fn default_file_name(owner: &str, repo: &str, range: &DateRange, format: ExportFormat) -> String {
    format!(
        "{owner}-{repo}-activity-{}-to-{}.{}",
        range.start.format("%Y-%m-%d"),
        range.end.format("%Y-%m-%d"),
        format.extension()
    )
}

enum Destination {
    Stdout,
    File(PathBuf),
}

fn destination(output: Option<&Path>, fallback: Option<String>) -> Destination {
    match output {
        Some(path) if path == Path::new("-") => Destination::Stdout,
        Some(path) => Destination::File(path.to_path_buf()),
        None => fallback.map_or(Destination::Stdout, |name| Destination::File(PathBuf::from(name))),
    }
}

async fn fetch_repository_records(
    common: &CommonArgs,
    repository: &str,
    kinds: &[ActivityKind],
    state: StateFilter,
    range: &DateRange,
) -> anyhow::Result<Vec<Value>> {
    let (owner, repo) = parse_repository_arg(repository).ok_or_else(|| {
        GhReportError::Validation(format!("'{repository}' is not a repository (expected OWNER/REPO or a GitHub URL)"))
    })?;
    let scope = Scope::Repository { owner, repo, state };
    let offset = common.offset()?;
    let fetcher = common.fetcher()?;

    let pb = spinner(&format!("Fetching {}...", scope.describe()));
    let result = collect_streams(&fetcher, &scope, kinds, range).await;
    pb.finish_and_clear();
    let batch = result.context("Failed to fetch repository activity")?;

    crate::report::output::print_notices(&batch.failures);
    Ok(filter_state(window_records(batch.into_records(), range, &offset), state))
}

fn read_records(path: &Path) -> anyhow::Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read records from {}", path.display()))?;
    let value = serde_json::from_str(&text)
        .map_err(|e| GhReportError::ExportInput(format!("{} is not valid JSON: {e}", path.display())))?;
    Ok(value)
}

pub async fn exec(common: CommonArgs, request: ExportRequest) -> anyhow::Result<()> {
    let fields = if request.fields.is_empty() {
        default_fields()
    } else {
        request.fields.clone()
    };
    validate_fields(&fields)?;

    let offset = common.offset()?;
    let range = request.range.resolve(&offset)?;
    let kinds = if request.kinds.is_empty() {
        DEFAULT_KINDS.to_vec()
    } else {
        request.kinds.clone()
    };

    let (records, fallback_name) = match (&request.repo, &request.input) {
        (Some(repository), _) => {
            let range = require_range(range.as_ref())?;
            let records = fetch_repository_records(&common, repository, &kinds, request.state, &range).await?;
            let name = parse_repository_arg(repository)
                .map(|(owner, repo)| default_file_name(&owner, &repo, &range, request.format));
            (Value::Array(records), name)
        }
        (None, Some(path)) => {
            let records = read_records(path)?;
            let records = match records {
                Value::Array(items) => {
                    let items = match range {
                        Some(range) => window_records(items, &range, &offset),
                        None => items,
                    };
                    Value::Array(filter_state(items, request.state))
                }
                other => other,
            };
            (records, None)
        }
        (None, None) => {
            return Err(GhReportError::Validation("either --repo or --input is required".into()).into());
        }
    };

    let rows = to_flat_rows(&records, &fields)?;
    let content = request.format.encode(&rows, &fields)?;

    match destination(request.output.as_deref(), fallback_name) {
        Destination::Stdout => {
            if !content.is_empty() {
                println!("{content}");
            }
        }
        Destination::File(path) => {
            std::fs::write(&path, &content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "{} {} rows to {}",
                style("Exported").green().bold(),
                style(rows.len()).cyan(),
                path.display()
            );
        }
    }

    Ok(())
}
