// src/datetime.rs

//! Best-effort parsers for the date formats the sources actually emit.
//!
//! Every parser returns `Option` so a malformed value drops the record
//! instead of aborting the batch. All wall-clock strings are interpreted
//! in the machine's local timezone, matching how the sources publish them.

use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone};

/// English month names, full form, January first.
const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// English weekday names used only to validate the verbose format.
const WEEKDAYS: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

/// Convert epoch milliseconds into a local instant.
pub fn from_epoch_millis(millis: i64) -> Option<DateTime<Local>> {
    Local.timestamp_millis_opt(millis).single()
}

/// Parse a string of epoch milliseconds into a local instant.
///
/// Rejects anything that is not a plain integer.
pub fn parse_epoch_millis(value: &str) -> Option<DateTime<Local>> {
    let millis: i64 = value.trim().parse().ok()?;
    from_epoch_millis(millis)
}

/// Parse `D.M.YYYY[ H[:MM]]` (day-first, period-separated, 24h time).
///
/// A missing time component defaults to midnight.
pub fn parse_dotted(value: &str) -> Option<DateTime<Local>> {
    let re = regex::Regex::new(r"^(\d{1,2})\.(\d{1,2})\.(\d{4})(?:\s+(\d{1,2})(?::(\d{2}))?)?$")
        .ok()?;
    let caps = re.captures(value.trim())?;

    let day: u32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let year: i32 = caps[3].parse().ok()?;
    let hour: u32 = caps.get(4).map_or(Some(0), |m| m.as_str().parse().ok())?;
    let minute: u32 = caps.get(5).map_or(Some(0), |m| m.as_str().parse().ok())?;

    local_datetime(year, month, day, hour, minute)
}

/// Parse `<Weekday> D. <Month> YYYY H:MM - H:MM` into a (start, end) pair.
///
/// The cross-day variant repeats the full weekday/date block before the
/// second time. Weekday and month tokens must resolve against the English
/// name tables.
pub fn parse_verbose_range(value: &str) -> Option<(DateTime<Local>, DateTime<Local>)> {
    let re = regex::Regex::new(
        r"(?x)
        ^([A-Za-z]+)\s+(\d{1,2})\.\s+([A-Za-z]+)\s+(\d{4})\s+(\d{1,2}):(\d{2})
        \s*-\s*
        (?:([A-Za-z]+)\s+(\d{1,2})\.\s+([A-Za-z]+)\s+(\d{4})\s+)?
        (\d{1,2}):(\d{2})$",
    )
    .ok()?;
    let caps = re.captures(value.trim())?;

    weekday_index(&caps[1])?;
    let start_day: u32 = caps[2].parse().ok()?;
    let start_month = month_index(&caps[3])?;
    let start_year: i32 = caps[4].parse().ok()?;
    let start_hour: u32 = caps[5].parse().ok()?;
    let start_minute: u32 = caps[6].parse().ok()?;

    let end_hour: u32 = caps[11].parse().ok()?;
    let end_minute: u32 = caps[12].parse().ok()?;

    let start = local_datetime(start_year, start_month, start_day, start_hour, start_minute)?;

    let end = match caps.get(7) {
        Some(weekday) => {
            weekday_index(weekday.as_str())?;
            let end_day: u32 = caps[8].parse().ok()?;
            let end_month = month_index(&caps[9])?;
            let end_year: i32 = caps[10].parse().ok()?;
            local_datetime(end_year, end_month, end_day, end_hour, end_minute)?
        }
        None => local_datetime(start_year, start_month, start_day, end_hour, end_minute)?,
    };

    Some((start, end))
}

/// Parse `<Mon>. D, YYYY, H[:MM] (a.m.|p.m.|noon|midnight)` into a start
/// instant.
pub fn parse_abbrev_start(value: &str) -> Option<DateTime<Local>> {
    let re = regex::Regex::new(r"^([A-Za-z]+)\.?\s+(\d{1,2}),\s*(\d{4}),\s*(.+)$").ok()?;
    let caps = re.captures(value.trim())?;

    let month = month_index(&caps[1])?;
    let day: u32 = caps[2].parse().ok()?;
    let year: i32 = caps[3].parse().ok()?;
    let (hour, minute) = parse_twelve_hour(&caps[4])?;

    local_datetime(year, month, day, hour, minute)
}

/// Parse an `H:MM:SS` duration string.
pub fn parse_duration_hms(value: &str) -> Option<Duration> {
    let re = regex::Regex::new(r"^(\d{1,3}):(\d{2}):(\d{2})$").ok()?;
    let caps = re.captures(value.trim())?;

    let hours: i64 = caps[1].parse().ok()?;
    let minutes: i64 = caps[2].parse().ok()?;
    let seconds: i64 = caps[3].parse().ok()?;
    if minutes >= 60 || seconds >= 60 {
        return None;
    }

    Some(Duration::hours(hours) + Duration::minutes(minutes) + Duration::seconds(seconds))
}

/// Fallback duration when a source omits one.
pub fn default_duration() -> Duration {
    Duration::hours(2)
}

/// Parse an ISO-8601 wall time (`YYYY-MM-DDTHH:MM[:SS]`), also accepting a
/// space separator and a bare date (midnight).
pub fn parse_iso(value: &str) -> Option<DateTime<Local>> {
    let value = value.trim();

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(value, format) {
            return Local.from_local_datetime(&naive).earliest();
        }
    }

    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()?;
    Local.from_local_datetime(&date.and_hms_opt(0, 0, 0)?).earliest()
}

/// Resolve a 12-hour time token: `6 p.m.`, `10:30 a.m.`, `noon`, `midnight`.
fn parse_twelve_hour(value: &str) -> Option<(u32, u32)> {
    let value = value.trim().to_lowercase();

    match value.as_str() {
        "noon" => return Some((12, 0)),
        "midnight" => return Some((0, 0)),
        _ => {}
    }

    let re = regex::Regex::new(r"^(\d{1,2})(?::(\d{2}))?\s*(a\.m\.|p\.m\.|am|pm)$").ok()?;
    let caps = re.captures(&value)?;

    let hour: u32 = caps[1].parse().ok()?;
    let minute: u32 = caps.get(2).map_or(Some(0), |m| m.as_str().parse().ok())?;
    if hour == 0 || hour > 12 || minute >= 60 {
        return None;
    }

    let meridiem = &caps[3];
    let hour = match (hour, meridiem.starts_with('p')) {
        (12, false) => 0,
        (12, true) => 12,
        (h, false) => h,
        (h, true) => h + 12,
    };

    Some((hour, minute))
}

/// Build a local instant from calendar components.
fn local_datetime(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Option<DateTime<Local>> {
    let naive = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, 0)?;
    // `earliest` keeps records that fall into a DST-repeated hour.
    Local.from_local_datetime(&naive).earliest()
}

fn month_index(name: &str) -> Option<u32> {
    let lower = name.to_lowercase();
    // Full names first, then unambiguous prefixes (Dec., Sept., ...).
    MONTHS
        .iter()
        .position(|m| *m == lower || (lower.len() >= 3 && m.starts_with(&lower)))
        .map(|i| i as u32 + 1)
}

fn weekday_index(name: &str) -> Option<u32> {
    let lower = name.to_lowercase();
    WEEKDAYS.iter().position(|d| *d == lower).map(|i| i as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_epoch_millis_round_trip() {
        let instant = Local.with_ymd_and_hms(2025, 12, 2, 16, 0, 0).unwrap();
        let millis = instant.timestamp_millis().to_string();
        assert_eq!(parse_epoch_millis(&millis), Some(instant));
    }

    #[test]
    fn test_epoch_millis_rejects_non_integer() {
        assert_eq!(parse_epoch_millis("soon"), None);
        assert_eq!(parse_epoch_millis("17.5e3"), None);
        assert_eq!(parse_epoch_millis(""), None);
    }

    #[test]
    fn test_dotted_with_time() {
        let expected = Local.with_ymd_and_hms(2025, 12, 2, 16, 0, 0).unwrap();
        assert_eq!(parse_dotted("2.12.2025 16:00"), Some(expected));
    }

    #[test]
    fn test_dotted_without_time_is_midnight() {
        let parsed = parse_dotted("2.12.2025").unwrap();
        assert_eq!(parsed.hour(), 0);
        assert_eq!(parsed.minute(), 0);
    }

    #[test]
    fn test_dotted_hour_only() {
        let expected = Local.with_ymd_and_hms(2025, 12, 2, 9, 0, 0).unwrap();
        assert_eq!(parse_dotted("2.12.2025 9"), Some(expected));
    }

    #[test]
    fn test_dotted_rejects_garbage() {
        assert_eq!(parse_dotted("12/02/2025"), None);
        assert_eq!(parse_dotted("2.13.2025"), None);
        assert_eq!(parse_dotted("yesterday"), None);
    }

    #[test]
    fn test_verbose_single_day() {
        let (start, end) = parse_verbose_range("Tuesday 2. December 2025 18:00 - 20:00").unwrap();
        assert_eq!(start, Local.with_ymd_and_hms(2025, 12, 2, 18, 0, 0).unwrap());
        assert_eq!(end, Local.with_ymd_and_hms(2025, 12, 2, 20, 0, 0).unwrap());
    }

    #[test]
    fn test_verbose_cross_day() {
        let (start, end) = parse_verbose_range(
            "Friday 5. December 2025 22:00 - Saturday 6. December 2025 02:00",
        )
        .unwrap();
        assert_eq!(start, Local.with_ymd_and_hms(2025, 12, 5, 22, 0, 0).unwrap());
        assert_eq!(end, Local.with_ymd_and_hms(2025, 12, 6, 2, 0, 0).unwrap());
    }

    #[test]
    fn test_verbose_rejects_unknown_tokens() {
        assert_eq!(parse_verbose_range("Blursday 2. December 2025 18:00 - 20:00"), None);
        assert_eq!(parse_verbose_range("Tuesday 2. Smarch 2025 18:00 - 20:00"), None);
        assert_eq!(parse_verbose_range("2. December 2025 18:00"), None);
    }

    #[test]
    fn test_abbrev_evening() {
        let parsed = parse_abbrev_start("Dec. 3, 2025, 6 p.m.").unwrap();
        assert_eq!(parsed, Local.with_ymd_and_hms(2025, 12, 3, 18, 0, 0).unwrap());
    }

    #[test]
    fn test_abbrev_with_minutes() {
        let parsed = parse_abbrev_start("Sept. 14, 2025, 10:30 a.m.").unwrap();
        assert_eq!(parsed, Local.with_ymd_and_hms(2025, 9, 14, 10, 30, 0).unwrap());
    }

    #[test]
    fn test_abbrev_noon_and_midnight() {
        let noon = parse_abbrev_start("Jan. 5, 2026, noon").unwrap();
        assert_eq!((noon.hour(), noon.minute()), (12, 0));

        let midnight = parse_abbrev_start("Jan. 5, 2026, midnight").unwrap();
        assert_eq!((midnight.hour(), midnight.minute()), (0, 0));
    }

    #[test]
    fn test_abbrev_twelve_oclock() {
        let noon = parse_abbrev_start("Feb. 1, 2026, 12 p.m.").unwrap();
        assert_eq!(noon.hour(), 12);

        let midnight = parse_abbrev_start("Feb. 1, 2026, 12 a.m.").unwrap();
        assert_eq!(midnight.hour(), 0);
    }

    #[test]
    fn test_abbrev_rejects_garbage() {
        assert_eq!(parse_abbrev_start("3 Dec 2025 18:00"), None);
        assert_eq!(parse_abbrev_start("Dec. 3, 2025, 25 p.m."), None);
        assert_eq!(parse_abbrev_start("Dec. 3, 2025"), None);
    }

    #[test]
    fn test_duration_hms() {
        assert_eq!(parse_duration_hms("2:30:00"), Some(Duration::minutes(150)));
        assert_eq!(parse_duration_hms("0:45:00"), Some(Duration::minutes(45)));
        assert_eq!(parse_duration_hms("1:99:00"), None);
        assert_eq!(parse_duration_hms("ninety minutes"), None);
    }

    #[test]
    fn test_iso_variants() {
        let expected = Local.with_ymd_and_hms(2025, 12, 2, 16, 0, 0).unwrap();
        assert_eq!(parse_iso("2025-12-02T16:00:00"), Some(expected));
        assert_eq!(parse_iso("2025-12-02T16:00"), Some(expected));
        assert_eq!(parse_iso("2025-12-02 16:00:00"), Some(expected));

        let midnight = parse_iso("2025-12-02").unwrap();
        assert_eq!((midnight.hour(), midnight.minute()), (0, 0));

        assert_eq!(parse_iso("02.12.2025"), None);
    }
}
