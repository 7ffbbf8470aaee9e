use super::group::{group, Bucket};
use crate::model::{ActivityEvent, ActivityKind, DateRange, GroupingMode};
use crate::util::format_day;
use chrono::FixedOffset;

pub const EOD_TEMPLATE: &str = "**EOD {{DATE}}** @{{ORGANIZATION}}

**How did the day go?**
{{TODAY_ACTIVITIES}}

**What's next?**
{{TOMORROW_ACTIVITIES}}";

pub const DATE_TOKEN: &str = "{{DATE}}";
pub const ORGANIZATION_TOKEN: &str = "{{ORGANIZATION}}";
pub const TODAY_TOKEN: &str = "{{TODAY_ACTIVITIES}}";
pub const TOMORROW_TOKEN: &str = "{{TOMORROW_ACTIVITIES}}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportTemplate(String);

impl ReportTemplate {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Replaces the first occurrence of each placeholder in the template.
    /// Tokens that are missing from the template are ignored, extra
    /// occurrences stay literal and substituted values are never rescanned.
    pub fn fill(&self, date: &str, organization: &str, today: &str, tomorrow: &str) -> String {
        let template = self.0.as_str();
        let mut slots: Vec<(usize, &str, &str)> = [
            (DATE_TOKEN, date),
            (ORGANIZATION_TOKEN, organization),
            (TODAY_TOKEN, today),
            (TOMORROW_TOKEN, tomorrow),
        ]
        .into_iter()
        .filter_map(|(token, value)| template.find(token).map(|at| (at, token, value)))
        .collect();
        slots.sort_by_key(|(at, _, _)| *at);

        let mut out = String::with_capacity(template.len() + today.len() + tomorrow.len());
        let mut cursor = 0;
        for (at, token, value) in slots {
            if at < cursor {
                continue;
            }
            out.push_str(&template[cursor..at]);
            out.push_str(value);
            cursor = at + token.len();
        }
        out.push_str(&template[cursor..]);
        out
    }
}

impl Default for ReportTemplate {
    fn default() -> Self {
        Self::new(EOD_TEMPLATE)
    }
}

fn reference(ev: &ActivityEvent) -> String {
    let label = format!("{}#{}", ev.repository.name, ev.identifier);
    match &ev.url {
        Some(url) => format!("[{label}]({url})"),
        None => label,
    }
}

/// Bullet line for the "today" section.
pub fn bullet(ev: &ActivityEvent) -> String {
    let verb = match ev.kind {
        ActivityKind::PRCreated => "Made PR",
        ActivityKind::PRMerged => "Merged PR",
        ActivityKind::IssueCreated => "Created issue",
        ActivityKind::CommitCreated => "Committed",
        ActivityKind::IssueAssigned => "Assigned issue",
    };
    format!("- {verb} {}: {}", reference(ev), ev.title)
}

/// Bullet line for the "what's next" section.
pub fn next_bullet(ev: &ActivityEvent) -> String {
    format!("- Work on issue {}: {}", reference(ev), ev.title)
}

fn is_today_kind(kind: ActivityKind) -> bool {
    !matches!(kind, ActivityKind::IssueAssigned)
}

pub fn render_date(range: &DateRange) -> String {
    if range.is_single_day() {
        format_day(range.start)
    } else {
        format!("{} - {}", format_day(range.start), format_day(range.end))
    }
}

fn render_buckets(buckets: &[Bucket]) -> String {
    let sections: Vec<String> = buckets
        .iter()
        .map(|bucket| {
            let lines: Vec<String> = bucket.events.iter().map(bullet).collect();
            format!("{}\n{}", bucket.key.heading(), lines.join("\n"))
        })
        .collect();
    if sections.is_empty() {
        String::new()
    } else {
        format!("\n{}", sections.join("\n\n"))
    }
}

/// Text for the "how did the day go" section.
pub fn render_today(
    timeline: &[ActivityEvent],
    kinds: &[ActivityKind],
    mode: GroupingMode,
    offset: &FixedOffset,
) -> String {
    let included: Vec<ActivityEvent> = timeline
        .iter()
        .filter(|ev| is_today_kind(ev.kind) && kinds.contains(&ev.kind))
        .cloned()
        .collect();

    match mode {
        GroupingMode::Ungrouped => included.iter().map(bullet).collect::<Vec<_>>().join("\n"),
        GroupingMode::ByDay | GroupingMode::ByWeek => render_buckets(&group(&included, mode, offset)),
    }
}

/// Text for the "what's next" section: unfinished assigned issues only.
pub fn render_tomorrow(timeline: &[ActivityEvent], kinds: &[ActivityKind]) -> String {
    if !kinds.contains(&ActivityKind::IssueAssigned) {
        return String::new();
    }
    timeline
        .iter()
        .filter(|ev| ev.is_unfinished())
        .map(next_bullet)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{IssueState, PullRequestRef, RepositoryRef};
    use crate::util::parse_timestamp;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn event(kind: ActivityKind, id: &str, created: &str) -> ActivityEvent {
        ActivityEvent {
            kind,
            identifier: id.into(),
            title: format!("title {id}"),
            repository: RepositoryRef {
                owner: "acme".into(),
                name: "widgets".into(),
            },
            url: Some(format!("https://github.com/acme/widgets/{id}")),
            api_url: None,
            events_url: None,
            node_id: None,
            created_at: parse_timestamp(created).unwrap(),
            merged_at: None,
            assigned_at: None,
            linked_pull_requests: Vec::new(),
            state: None,
        }
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn bullets_are_kind_specific() {
        let mut commit = event(ActivityKind::CommitCreated, "abc1234", "2024-01-01T00:00:00Z");
        commit.url = None;
        assert_eq!(bullet(&commit), "- Committed widgets#abc1234: title abc1234");
        assert_eq!(
            bullet(&event(ActivityKind::PRCreated, "3", "2024-01-01T00:00:00Z")),
            "- Made PR [widgets#3](https://github.com/acme/widgets/3): title 3"
        );
        assert_eq!(
            bullet(&event(ActivityKind::PRMerged, "3", "2024-01-01T00:00:00Z")),
            "- Merged PR [widgets#3](https://github.com/acme/widgets/3): title 3"
        );
        assert_eq!(
            bullet(&event(ActivityKind::IssueCreated, "4", "2024-01-01T00:00:00Z")),
            "- Created issue [widgets#4](https://github.com/acme/widgets/4): title 4"
        );
    }

    #[test]
    fn template_fills_each_token_once() {
        let template = ReportTemplate::new("{{DATE}} {{DATE}} {{UNKNOWN}} {{ORGANIZATION}}");
        assert_eq!(template.fill("d", "o", "t", "n"), "d {{DATE}} {{UNKNOWN}} o");
    }

    #[test]
    fn tokens_inside_values_stay_literal() {
        let text = ReportTemplate::default().fill(
            "d",
            "{{DATE}}",
            "- Made PR x#1: Document {{TOMORROW_ACTIVITIES}} token",
            "- Work on issue y#2: z",
        );
        assert_eq!(
            text,
            "**EOD d** @{{DATE}}

**How did the day go?**
- Made PR x#1: Document {{TOMORROW_ACTIVITIES}} token

**What's next?**
- Work on issue y#2: z"
        );
    }

    #[test]
    fn date_collapses_for_single_day() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(render_date(&DateRange::new(d, d).unwrap()), "05/01/2024");
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(render_date(&DateRange::new(start, d).unwrap()), "01/01/2024 - 05/01/2024");
    }

    #[test]
    fn ungrouped_follows_timeline_order_and_kind_selection() {
        let timeline = vec![
            event(ActivityKind::PRCreated, "2", "2024-01-02T00:00:00Z"),
            event(ActivityKind::IssueCreated, "1", "2024-01-01T00:00:00Z"),
        ];
        let all = render_today(&timeline, &ActivityKind::ALL, GroupingMode::Ungrouped, &utc());
        assert_eq!(
            all,
            "- Made PR [widgets#2](https://github.com/acme/widgets/2): title 2\n\
             - Created issue [widgets#1](https://github.com/acme/widgets/1): title 1"
        );
        let prs_only = render_today(&timeline, &[ActivityKind::PRCreated], GroupingMode::Ungrouped, &utc());
        assert_eq!(prs_only.lines().count(), 1);
    }

    #[test]
    fn grouped_by_day_has_headings_in_ascending_order() {
        let timeline = vec![
            event(ActivityKind::PRCreated, "2", "2024-01-02T00:00:00Z"),
            event(ActivityKind::IssueCreated, "1", "2024-01-01T00:00:00Z"),
        ];
        let text = render_today(&timeline, &ActivityKind::ALL, GroupingMode::ByDay, &utc());
        assert_eq!(
            text,
            "\n**01/01/2024**\n- Created issue [widgets#1](https://github.com/acme/widgets/1): title 1\n\n\
             **02/01/2024**\n- Made PR [widgets#2](https://github.com/acme/widgets/2): title 2"
        );
    }

    #[test]
    fn empty_sections_render_empty() {
        assert_eq!(render_today(&[], &ActivityKind::ALL, GroupingMode::ByWeek, &utc()), "");
        assert_eq!(render_tomorrow(&[], &ActivityKind::ALL), "");
    }

    #[test]
    fn tomorrow_lists_only_unfinished_assignments() {
        let mut open = event(ActivityKind::IssueAssigned, "5", "2024-01-01T00:00:00Z");
        open.state = Some(IssueState::Open);
        let mut linked = open.clone();
        linked.identifier = "6".into();
        linked.linked_pull_requests.push(PullRequestRef {
            node_id: "PR_1".into(),
            number: Some(9),
            url: None,
            state: None,
        });
        let mut closed = open.clone();
        closed.identifier = "7".into();
        closed.state = Some(IssueState::Closed);

        let timeline = vec![open, linked, closed];
        assert_eq!(
            render_tomorrow(&timeline, &ActivityKind::ALL),
            "- Work on issue [widgets#5](https://github.com/acme/widgets/5): title 5"
        );
        assert_eq!(render_tomorrow(&timeline, &[ActivityKind::PRCreated]), "");
    }
}
