use crate::model::{ActivityEvent, ActivityKind, DateRange, StreamFailure, TimelineOutput, SCHEMA_VERSION};
use crate::util::format_day;
use anyhow::Result;
use chrono::{FixedOffset, Utc};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

#[derive(Debug, Serialize)]
pub struct ReportOutput<'a> {
    pub version: u32,
    pub generated_at: chrono::DateTime<Utc>,
    pub scope: String,
    pub range: DateRange,
    pub report: &'a str,
    pub events: &'a [ActivityEvent],
    pub notices: &'a [StreamFailure],
}

pub fn output_report_json(
    scope: String,
    range: DateRange,
    text: &str,
    events: &[ActivityEvent],
    notices: &[StreamFailure],
) -> Result<()> {
    let output = ReportOutput {
        version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        scope,
        range,
        report: text,
        events,
        notices,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

pub fn output_timeline_json(
    scope: String,
    range: DateRange,
    events: Vec<ActivityEvent>,
    notices: Vec<StreamFailure>,
) -> Result<()> {
    let output = TimelineOutput {
        version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        scope,
        range,
        events,
        notices,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

pub fn output_ndjson(events: &[ActivityEvent]) -> Result<()> {
    for ev in events {
        println!("{}", serde_json::to_string(ev)?);
    }
    Ok(())
}

fn kind_marker(kind: ActivityKind) -> console::StyledObject<&'static str> {
    match kind {
        ActivityKind::IssueCreated => style("ISSUE ").yellow(),
        ActivityKind::PRCreated => style("PR    ").cyan(),
        ActivityKind::PRMerged => style("MERGED").green(),
        ActivityKind::IssueAssigned => style("ASSIGN").magenta(),
        ActivityKind::CommitCreated => style("COMMIT").blue(),
    }
}

pub fn output_table(events: &[ActivityEvent], offset: &FixedOffset) -> Result<()> {
    if events.is_empty() {
        println!("No activity in range");
        return Ok(());
    }

    println!(
        "{:<6} {:<10} {:<30} {}",
        style("Kind").bold(),
        style("Date").bold(),
        style("Reference").bold(),
        style("Title").bold()
    );
    println!("{}", "─".repeat(98));
    for ev in events {
        println!(
            "{} {:<10} {:<30} {}",
            kind_marker(ev.kind),
            format_day(ev.ordering_date(offset)),
            format!("{}#{}", ev.repository.name, ev.identifier),
            ev.title
        );
    }
    println!("\n{} events", style(events.len()).cyan());
    Ok(())
}

/// Partial-result notice on stderr, one line per failed stream.
pub fn print_notices(notices: &[StreamFailure]) {
    if notices.is_empty() {
        return;
    }
    eprintln!(
        "{} {} stream(s) could not be fetched; the result is partial",
        style("warning:").yellow().bold(),
        notices.len()
    );
    for notice in notices {
        eprintln!("  {}: {}", style(notice.kind.label()).dim(), notice.reason);
    }
}
