use super::output::{output_ndjson, output_report_json, output_table, output_timeline_json, print_notices, spinner};
use super::{build_timeline, synthesize, ReportConfig, ReportTemplate};
use crate::cli::{CommonArgs, UserArgs};
use crate::model::GroupingMode;
use crate::util::copy_to_clipboard;
use anyhow::Context;
use console::style;
use std::path::PathBuf;

pub(crate) fn config_from_args(common: &CommonArgs, user: &UserArgs) -> anyhow::Result<ReportConfig> {
    let offset = common.offset()?;
    let range = user.range.resolve(&offset)?;
    let mut config = ReportConfig::new(user.user.clone().unwrap_or_default(), range);
    config.organization = user.org.clone();
    config.kinds = user.kinds();
    config.offset = offset;
    config.concurrency = common.concurrency.max(1);
    Ok(config)
}

pub async fn report(
    common: CommonArgs,
    user: UserArgs,
    group_by_day: bool,
    group_by_week: bool,
    template: Option<PathBuf>,
    copy: bool,
    json: bool,
) -> anyhow::Result<()> {
    let mut config = config_from_args(&common, &user)?;
    config.grouping = GroupingMode::from_flags(group_by_day, group_by_week);
    if let Some(path) = template {
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read template {}", path.display()))?;
        config.template = ReportTemplate::new(text);
    }

    let fetcher = common.fetcher()?;
    let pb = spinner("Fetching activity...");
    let result = synthesize(&fetcher, &config).await;
    pb.finish_and_clear();
    let report = result.context("Failed to synthesize report")?;

    print_notices(&report.notices);

    if json {
        let range = config.range.context("date range is required")?;
        output_report_json(config.scope().describe(), range, &report.text, &report.timeline, &report.notices)?;
    } else {
        println!("{}", report.text);
    }

    if copy {
        match copy_to_clipboard(&report.text) {
            Ok(()) => eprintln!("{}", style("Report copied to clipboard").green()),
            Err(err) => eprintln!("{} {err}", style("Clipboard error:").red()),
        }
    }

    Ok(())
}

pub async fn timeline(common: CommonArgs, user: UserArgs, json: bool, ndjson: bool) -> anyhow::Result<()> {
    let config = config_from_args(&common, &user)?;
    let fetcher = common.fetcher()?;

    let pb = spinner("Fetching activity...");
    let result = build_timeline(&fetcher, &config).await;
    pb.finish_and_clear();
    let timeline = result.context("Failed to build timeline")?;

    print_notices(&timeline.notices);

    if json {
        output_timeline_json(config.scope().describe(), timeline.range, timeline.events, timeline.notices)?;
    } else if ndjson {
        output_ndjson(&timeline.events)?;
    } else {
        output_table(&timeline.events, &config.offset)?;
    }

    Ok(())
}
