// Parsing and display of match times typed by pilots in their own timezone.

use super::LeagueError;
use chrono::{DateTime, LocalResult, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Formats accepted after the input is upper-cased and whitespace-collapsed.
const FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %I:%M %p",
    "%Y-%m-%d %I:%M%p",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%Y %I:%M%p",
];

/// Resolve a timezone name, falling back to UTC for anything unknown.
pub fn resolve_timezone(name: Option<&str>) -> Tz {
    name.and_then(|n| n.parse::<Tz>().ok())
        .unwrap_or(chrono_tz::UTC)
}

pub fn valid_timezone(name: &str) -> bool {
    name.trim().parse::<Tz>().is_ok()
}

/// Parse a time the way a pilot would type it, in their timezone.
pub fn parse_match_time(
    input: &str,
    timezone: Option<&str>,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, LeagueError> {
    let normalized = input
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase();

    if normalized == "NOW" {
        return Ok(now);
    }

    let naive = FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&normalized, fmt).ok())
        .ok_or_else(|| {
            LeagueError::InvalidTime(format!(
                "Could not understand `{}`. Try `2024-05-01 20:00` or `5/1/2024 8:00 PM`.",
                input.trim()
            ))
        })?;

    let tz = resolve_timezone(timezone);
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
        LocalResult::None => Err(LeagueError::InvalidTime(format!(
            "`{}` does not exist in {} (daylight saving change).",
            input.trim(),
            tz.name()
        ))),
    }
}

/// Render a match time in the viewer's timezone.
pub fn format_match_time(time: DateTime<Utc>, timezone: Option<&str>) -> String {
    let tz = resolve_timezone(timezone);
    time.with_timezone(&tz)
        .format("%a %b %-d, %Y %-I:%M %p %Z")
        .to_string()
}
