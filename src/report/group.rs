use crate::model::{ActivityEvent, GroupingMode};
use crate::util::{format_day, week_bounds};
use chrono::{FixedOffset, NaiveDate};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BucketKey {
    Day(NaiveDate),
    /// Monday of the ISO week.
    Week(NaiveDate),
}

impl BucketKey {
    pub fn heading(&self) -> String {
        match self {
            BucketKey::Day(day) => format!("**{}**", format_day(*day)),
            BucketKey::Week(monday) => {
                let (start, end) = week_bounds(*monday);
                format!("**Week of {} - {}**", format_day(start), format_day(end))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    pub key: BucketKey,
    pub events: Vec<ActivityEvent>,
}

/// Buckets a timeline by the calendar day or ISO week of each event's
/// ordering timestamp in `offset`.
///
/// Buckets come out in ascending date order and are never empty. Inside a
/// bucket events keep their timeline order. [`GroupingMode::Ungrouped`]
/// yields no buckets.
pub fn group(timeline: &[ActivityEvent], mode: GroupingMode, offset: &FixedOffset) -> Vec<Bucket> {
    let key_of = |ev: &ActivityEvent| {
        let day = ev.ordering_date(offset);
        match mode {
            GroupingMode::ByDay => Some(BucketKey::Day(day)),
            GroupingMode::ByWeek => Some(BucketKey::Week(week_bounds(day).0)),
            GroupingMode::Ungrouped => None,
        }
    };

    let mut buckets: BTreeMap<BucketKey, Vec<ActivityEvent>> = BTreeMap::new();
    for ev in timeline {
        if let Some(key) = key_of(ev) {
            buckets.entry(key).or_default().push(ev.clone());
        }
    }

    buckets
        .into_iter()
        .map(|(key, events)| Bucket { key, events })
        .collect()
}

pub fn flatten(buckets: &[Bucket]) -> Vec<ActivityEvent> {
    buckets.iter().flat_map(|b| b.events.iter().cloned()).collect()
}
