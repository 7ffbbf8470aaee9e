use crate::error::{GhReportError, Result};
use crate::model::RepositoryRef;
use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, Utc};

/// ISO week (Monday start) containing `date`, as `(monday, sunday)`.
pub fn week_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let monday = date - Duration::days(date.weekday().num_days_from_monday() as i64);
    (monday, monday + Duration::days(6))
}

pub fn format_day(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

pub fn parse_timestamp(input: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(input)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parses `+05:30`, `-0800` or `Z` into a fixed UTC offset.
pub fn parse_offset(input: &str) -> Result<FixedOffset> {
    let trimmed = input.trim();
    let normalized = if trimmed.is_ascii() && trimmed.len() == 5 && !trimmed.contains(':') {
        format!("{}:{}", &trimmed[..3], &trimmed[3..])
    } else {
        trimmed.to_string()
    };
    DateTime::parse_from_rfc3339(&format!("2000-01-01T00:00:00{normalized}"))
        .map(|dt| *dt.offset())
        .map_err(|_| GhReportError::InvalidDate(format!("Invalid UTC offset '{input}'")))
}

/// Resolves a user supplied date to a calendar day in `offset`.
///
/// Accepts `YYYY-MM-DD`, RFC3339, `today`, `yesterday`, humantime durations
/// such as `7d`, and `N days ago` / `N weeks ago` / `N months ago`.
pub fn parse_day(input: &str, offset: &FixedOffset, now: DateTime<Utc>) -> Result<NaiveDate> {
    let input = input.trim();
    let today = now.with_timezone(offset).date_naive();

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(date);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(offset).date_naive());
    }

    match input.to_lowercase().as_str() {
        "today" => return Ok(today),
        "yesterday" => return days_before(today, Some(1), input),
        _ => {}
    }

    if let Some(days) = parse_natural_days(input) {
        return days_before(today, days, input);
    }

    if let Ok(duration) = humantime::parse_duration(input) {
        let days = i64::try_from(duration.as_secs() / 86_400).ok();
        return days_before(today, days, input);
    }

    Err(GhReportError::InvalidDate(format!(
        "'{input}' is not a date (YYYY-MM-DD, RFC3339, today, 7d, 2 weeks ago)"
    )))
}

/// `today` minus `days`; `None` or an out-of-range result is an error.
fn days_before(today: NaiveDate, days: Option<i64>, input: &str) -> Result<NaiveDate> {
    days.and_then(Duration::try_days)
        .and_then(|delta| today.checked_sub_signed(delta))
        .ok_or_else(|| GhReportError::InvalidDate(format!("'{input}' is out of range")))
}

/// `Some(None)` when the phrase matched but the day count overflows.
fn parse_natural_days(input: &str) -> Option<Option<i64>> {
    let input = input.trim().to_lowercase();
    let units = [(" days ago", 1), (" weeks ago", 7), (" months ago", 30)];
    for (suffix, factor) in units {
        if let Some(n) = input.strip_suffix(suffix) {
            if let Ok(n) = n.trim().parse::<i64>() {
                return Some(n.checked_mul(factor));
            }
        }
    }
    None
}

/// Owner and repository name from an html (`github.com/o/r/...`) or API
/// (`/repos/o/r/...`) URL.
pub fn repository_from_url(url: &str) -> Option<RepositoryRef> {
    let parts: Vec<&str> = url.split('/').filter(|p| !p.is_empty()).collect();
    let anchor = parts
        .iter()
        .position(|p| *p == "repos")
        .or_else(|| parts.iter().position(|p| p.ends_with("github.com")))?;
    let owner = parts.get(anchor + 1)?;
    let name = parts.get(anchor + 2)?;
    Some(RepositoryRef {
        owner: owner.to_string(),
        name: name.to_string(),
    })
}

/// Parses `owner/repo`, `https://github.com/owner/repo(.git)` and similar.
pub fn parse_repository_arg(input: &str) -> Option<(String, String)> {
    let input = input.trim().trim_end_matches('/');
    if let Some(repo) = repository_from_url(input) {
        return Some((repo.owner, repo.name.trim_end_matches(".git").to_string()));
    }
    let mut parts = input.split('/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(owner), Some(repo), None) if !owner.is_empty() && !repo.is_empty() => {
            Some((owner.to_string(), repo.trim_end_matches(".git").to_string()))
        }
        _ => None,
    }
}

pub fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or("")
}

pub fn short_hash(sha: &str) -> String {
    sha.chars().take(7).collect()
}

pub fn copy_to_clipboard(text: &str) -> std::result::Result<(), arboard::Error> {
    let mut clipboard = arboard::Clipboard::new()?;
    clipboard.set_text(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn week_bounds_start_on_monday() {
        // 2024-01-03 is a Wednesday
        assert_eq!(week_bounds(day(2024, 1, 3)), (day(2024, 1, 1), day(2024, 1, 7)));
        assert_eq!(week_bounds(day(2024, 1, 7)), (day(2024, 1, 1), day(2024, 1, 7)));
    }

    #[test]
    fn parses_offsets() {
        assert_eq!(parse_offset("+05:30").unwrap().local_minus_utc(), 19_800);
        assert_eq!(parse_offset("-0800").unwrap().local_minus_utc(), -28_800);
        assert_eq!(parse_offset("Z").unwrap().local_minus_utc(), 0);
        assert!(parse_offset("noon").is_err());
    }

    #[test]
    fn parses_relative_days() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let now = parse_timestamp("2024-03-10T12:00:00Z").unwrap();
        assert_eq!(parse_day("2024-01-02", &utc, now).unwrap(), day(2024, 1, 2));
        assert_eq!(parse_day("today", &utc, now).unwrap(), day(2024, 3, 10));
        assert_eq!(parse_day("7d", &utc, now).unwrap(), day(2024, 3, 3));
        assert_eq!(parse_day("2 weeks ago", &utc, now).unwrap(), day(2024, 2, 25));
        assert!(parse_day("someday", &utc, now).is_err());
    }

    #[test]
    fn out_of_range_input_is_an_error() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let now = parse_timestamp("2024-03-10T12:00:00Z").unwrap();
        for input in ["99999999999 days ago", "9223372036854775807 weeks ago", "1000000000y"] {
            assert!(
                matches!(parse_day(input, &utc, now), Err(GhReportError::InvalidDate(_))),
                "{input}"
            );
        }
        assert!(matches!(parse_offset("ab€"), Err(GhReportError::InvalidDate(_))));
    }

    #[test]
    fn repository_from_html_and_api_urls() {
        let html = repository_from_url("https://github.com/rust-lang/cargo/pull/12").unwrap();
        assert_eq!(html.full_name(), "rust-lang/cargo");
        let api = repository_from_url("https://api.github.com/repos/rust-lang/rust/issues/1").unwrap();
        assert_eq!(api.full_name(), "rust-lang/rust");
        assert!(repository_from_url("https://example.com/").is_none());
    }

    #[test]
    fn repository_args() {
        assert_eq!(
            parse_repository_arg("https://github.com/rust-lang/cargo.git"),
            Some(("rust-lang".into(), "cargo".into()))
        );
        assert_eq!(parse_repository_arg("rust-lang/cargo"), Some(("rust-lang".into(), "cargo".into())));
        assert_eq!(parse_repository_arg("cargo"), None);
    }
}
