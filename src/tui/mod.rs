pub mod input;
pub mod layout;
pub mod run;
pub mod state;
pub mod views;

pub use input::*;
pub use layout::*;
pub use run::{run, TimelineView};
pub use state::*;
pub use views::*;

use crate::cli::{CommonArgs, UserArgs};
use crate::report::output::{print_notices, spinner};
use crate::report::exec::config_from_args;
use crate::report::{build_timeline, render::render_date, render_report};
use anyhow::Context;

/// Fetches the timeline, then hands the terminal to the interactive list.
pub async fn exec(common: CommonArgs, user: UserArgs) -> anyhow::Result<()> {
    let config = config_from_args(&common, &user)?;
    let fetcher = common.fetcher()?;
    let pb = spinner("Fetching activity...");
    let result = build_timeline(&fetcher, &config).await;
    pb.finish_and_clear();
    let timeline = result.context("Failed to build timeline")?;
    print_notices(&timeline.notices);

    let report = render_report(&timeline.events, &timeline.range, &config);
    run(TimelineView {
        scope: config.scope().describe(),
        range_label: render_date(&timeline.range),
        events: timeline.events,
        report,
        offset: config.offset,
    })
    .context("Interactive timeline failed")
}
