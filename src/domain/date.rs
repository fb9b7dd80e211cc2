use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;

static RFC3339_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^([0-9]{4})-([0-9]{2})-([0-9]{2})",
        r"T([0-9]{2}):([0-9]{2}):([0-9]{2})",
        r"(Z|[+-]?[0-9]{2}:[0-9]{2})$",
    ))
    .expect("valid RFC 3339 pattern")
});

/// Checks that `s` has the shape `YYYY-MM-DDTHH:MM:SS(Z|+HH:MM)`.
pub fn is_rfc3339_date(s: &str) -> bool {
    RFC3339_RE.is_match(s)
}

/// Best-effort timestamp parsing used for ordering posts.
///
/// Accepts RFC 3339, RFC 2822, naive date-times and plain dates.
/// Values without an offset are read as UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_is_rfc3339_date() {
        assert!(is_rfc3339_date("2025-10-10T10:00:00Z"));
        assert!(!is_rfc3339_date("2025-10-10T10:00:00+0100"));
        assert!(is_rfc3339_date("2025-10-10T10:00:00+01:00"));
        assert!(!is_rfc3339_date("2025-10-10 10:00:00+01:00"));
        assert!(!is_rfc3339_date("25-10-10T10:00:00+01:00"));
        assert!(!is_rfc3339_date("20251010T100000Z"));
    }

    #[test]
    fn test_parse_rfc3339_with_offset() {
        let dt = parse_timestamp("2024-01-01T12:00:00+02:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_rfc2822() {
        let dt = parse_timestamp("Mon, 01 Jan 2024 00:00:00 GMT").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_naive_forms_as_utc() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 5, 8, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2024-03-05T08:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-05 08:30:00"), Some(expected));
        assert_eq!(
            parse_timestamp("2024-03-05"),
            Some(Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_rejects_non_dates() {
        assert_eq!(parse_timestamp("hello-world"), None);
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("2024-13-45"), None);
    }
}
