use crate::export::ExportFormat;
use crate::fetch::github::{GitHubFetcher, DEFAULT_TIMEOUT};
use crate::model::{ActivityKind, DateRange, StateFilter};
use crate::util::{parse_day, parse_offset};
use anyhow::{Context, Result};
use chrono::{FixedOffset, Local, Offset, Utc};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "ghreport")]
#[command(about = "GitHub activity timeline, EOD report synthesis, and tabular export")]
#[command(version)]
pub struct Cli {
    #[clap(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone, Debug)]
pub struct CommonArgs {
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true, global = true, help = "GitHub API token")]
    pub token: Option<String>,

    #[arg(long, global = true, help = "Base URL of the GitHub REST API")]
    pub api_url: Option<String>,

    #[arg(long, global = true, allow_hyphen_values = true, help = "UTC offset for day boundaries, e.g. +05:30 (defaults to local)")]
    pub utc_offset: Option<String>,

    #[arg(long, global = true, value_parser = humantime::parse_duration, help = "Per-request deadline (e.g. 30s, 2m)")]
    pub timeout: Option<Duration>,

    #[arg(long, global = true, default_value_t = 1, help = "Concurrent linked PR and event history lookups")]
    pub concurrency: usize,

    #[arg(short, long, global = true, action = ArgAction::Count, help = "Increase log verbosity")]
    pub verbose: u8,
}

impl CommonArgs {
    pub fn offset(&self) -> Result<FixedOffset> {
        match self.utc_offset.as_deref() {
            Some(raw) => parse_offset(raw).context("Failed to parse --utc-offset"),
            None => Ok(Local::now().offset().fix()),
        }
    }

    pub fn fetcher(&self) -> Result<GitHubFetcher> {
        GitHubFetcher::new(
            self.token.as_deref(),
            self.api_url.as_deref(),
            self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            self.offset()?,
        )
        .context("Failed to build GitHub client")
    }
}

#[derive(Args, Clone, Debug)]
pub struct RangeArgs {
    #[arg(long, help = "First day (YYYY-MM-DD, RFC3339, today, 7d, 2 weeks ago)")]
    pub since: Option<String>,

    #[arg(long, help = "Last day, inclusive (defaults to today)")]
    pub until: Option<String>,
}

impl RangeArgs {
    /// `None` when no start was given; the engine reports that as a validation error.
    pub fn resolve(&self, offset: &FixedOffset) -> Result<Option<DateRange>> {
        let now = Utc::now();
        let Some(since) = self.since.as_deref() else {
            return Ok(None);
        };
        let start = parse_day(since, offset, now).context("Failed to parse --since")?;
        let end = match self.until.as_deref() {
            Some(until) => parse_day(until, offset, now).context("Failed to parse --until")?,
            None => now.with_timezone(offset).date_naive(),
        };
        Ok(Some(DateRange::new(start, end)?))
    }
}

#[derive(Args, Clone, Debug)]
pub struct UserArgs {
    #[arg(long, help = "GitHub username whose activity is collected")]
    pub user: Option<String>,

    #[arg(long, help = "Restrict to one organization")]
    pub org: Option<String>,

    #[clap(flatten)]
    pub range: RangeArgs,

    #[arg(long = "kind", help = "Activity kinds to include (repeatable; default all)")]
    pub kinds: Vec<ActivityKind>,
}

impl UserArgs {
    pub fn kinds(&self) -> Vec<ActivityKind> {
        if self.kinds.is_empty() {
            ActivityKind::ALL.to_vec()
        } else {
            self.kinds.clone()
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render an EOD status report
    Report {
        #[clap(flatten)]
        user: UserArgs,

        #[arg(long, help = "Group activities by day")]
        group_by_day: bool,

        #[arg(long, help = "Group activities by ISO week (wins over --group-by-day)")]
        group_by_week: bool,

        #[arg(long, help = "Template file with {{DATE}}, {{ORGANIZATION}}, {{TODAY_ACTIVITIES}}, {{TOMORROW_ACTIVITIES}}")]
        template: Option<PathBuf>,

        #[arg(long, help = "Copy the report to the clipboard")]
        copy: bool,

        #[arg(long, help = "Output as JSON")]
        json: bool,
    },
    /// List the merged activity timeline
    Timeline {
        #[clap(flatten)]
        user: UserArgs,

        #[arg(long, help = "Output as JSON")]
        json: bool,

        #[arg(long, help = "Output as NDJSON")]
        ndjson: bool,

        #[arg(long = "interactive", alias = "tui", alias = "ui", help = "Enable interactive terminal UI")]
        interactive: bool,
    },
    /// Export repository activity as CSV or JSON rows
    Export {
        #[arg(long, conflicts_with = "input", help = "Repository as OWNER/REPO or a GitHub URL")]
        repo: Option<String>,

        #[arg(long, help = "Read records from a JSON array file instead of GitHub")]
        input: Option<PathBuf>,

        #[arg(long = "kind", help = "Activity kinds to fetch (repeatable; default issues, PRs and commits)")]
        kinds: Vec<ActivityKind>,

        #[arg(long, default_value = "all", help = "all, open, closed or merged")]
        state: StateFilter,

        #[clap(flatten)]
        range: RangeArgs,

        #[arg(long = "field", help = "Columns to export, in order (repeatable; default all)")]
        fields: Vec<String>,

        #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,

        #[arg(long, help = "Output file, or - for stdout")]
        output: Option<PathBuf>,
    },
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Report { user, group_by_day, group_by_week, template, copy, json } => {
                crate::report::exec::report(self.common, user, group_by_day, group_by_week, template, copy, json).await
            }
            Commands::Timeline { user, json, ndjson, interactive } => {
                if interactive {
                    crate::tui::exec(self.common, user).await
                } else {
                    crate::report::exec::timeline(self.common, user, json, ndjson).await
                }
            }
            Commands::Export { repo, input, kinds, state, range, fields, format, output } => {
                let request = crate::export::ExportRequest {
                    repo,
                    input,
                    kinds,
                    state,
                    range,
                    fields,
                    format,
                    output,
                };
                crate::export::exec(self.common, request).await
            }
        }
    }
}
