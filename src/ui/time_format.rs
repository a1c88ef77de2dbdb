use chrono::{DateTime, Datelike, NaiveDateTime, TimeZone, Utc};
use chrono_humanize::HumanTime;

/// Parses the server's timestamp strings: RFC 3339, a naive
/// `YYYY-MM-DD HH:MM:SS` (taken as UTC) or epoch milliseconds.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    raw.parse::<i64>()
        .ok()
        .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
}

/// "3 hours ago" style label. Unparseable input is shown as-is.
pub fn format_relative(raw: &str, now: DateTime<Utc>) -> String {
    match parse_timestamp(raw) {
        Some(dt) => HumanTime::from(dt.signed_duration_since(now)).to_string(),
        None => raw.to_string(),
    }
}

/// Format a date for the thread header (e.g., "June 16th, 2025")
pub fn format_date_delimiter(raw: &str) -> String {
    let Some(dt) = parse_timestamp(raw) else {
        return raw.to_string();
    };
    let day = dt.day();
    let suffix = match day {
        1 | 21 | 31 => "st",
        2 | 22 => "nd",
        3 | 23 => "rd",
        _ => "th",
    };
    format!("{} {}{}, {}", dt.format("%B"), day, suffix, dt.year())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(raw: &str) -> DateTime<Utc> {
        parse_timestamp(raw).unwrap()
    }

    #[test]
    fn parses_known_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        assert_eq!(at("2024-03-01T12:30:00Z"), expected);
        assert_eq!(at("2024-03-01T14:30:00+02:00"), expected);
        assert_eq!(at("2024-03-01 12:30:00"), expected);
        assert_eq!(at("1709296200000"), expected);
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn relative_labels() {
        let now = at("2024-03-01T12:00:00Z");
        assert_eq!(format_relative("2024-03-01T09:00:00Z", now), "3 hours ago");
        assert_eq!(format_relative("2024-02-29T12:00:00Z", now), "a day ago");
        assert_eq!(format_relative("not a date", now), "not a date");
    }

    #[test]
    fn header_dates() {
        assert_eq!(format_date_delimiter("2025-06-16T08:30:00Z"), "June 16th, 2025");
        assert_eq!(format_date_delimiter("2025-05-22T08:30:00Z"), "May 22nd, 2025");
        assert_eq!(format_date_delimiter("?"), "?");
    }
}
