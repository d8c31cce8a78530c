//! Timestamp parsing and formatting helpers for BlueBox.
//!
//! Provides consistent date/time handling for the command line and for
//! naming run artifacts.

use chrono::{DateTime, Local, Utc};

/// Render an elapsed run time for the completion log line.
///
/// Sub-second runs read as milliseconds, runs up to two minutes as decimal
/// seconds (`73.4s`), anything longer as minutes and seconds (`3m 42s`).
pub fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 1.0 {
        format!("{:.0}ms", secs * 1000.0)
    } else if secs < 120.0 {
        format!("{secs:.1}s")
    } else {
        let whole = d.as_secs();
        format!("{}m {}s", whole / 60, whole % 60)
    }
}

/// Timestamp component of the output directory and archive names, derived
/// from the moment the run started. Local time, `YYYYMMDD_HHMMSS`.
pub fn run_stamp(started: &DateTime<Utc>) -> String {
    let local: DateTime<Local> = started.with_timezone(&Local);
    local.format("%Y%m%d_%H%M%S").to_string()
}

/// Parse a `--start-time`/`--end-time` value into a UTC instant.
///
/// Accepted forms:
/// - RFC 3339 (`2026-01-01T00:00:00Z`, offset forms included)
/// - `YYYY-MM-DD HH:MM:SS` and `YYYY-MM-DD HH:MM`
/// - `YYYY-MM-DD` (local midnight)
///
/// RFC 3339 input carries its own offset; the other forms are read as local
/// wall-clock time.
pub fn parse_datetime_input(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }

    const LOCAL_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];
    for fmt in LOCAL_FORMATS {
        if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(input, fmt) {
            return local_naive_to_utc(naive);
        }
    }

    // A bare date means local midnight.
    let date = chrono::NaiveDate::parse_from_str(input, "%Y-%m-%d").ok()?;
    local_naive_to_utc(date.and_hms_opt(0, 0, 0)?)
}

/// Resolve a naive local wall-clock time to UTC. Ambiguous times take the
/// earlier mapping; times inside a DST gap come back as `None`.
fn local_naive_to_utc(naive: chrono::NaiveDateTime) -> Option<DateTime<Utc>> {
    use chrono::TimeZone;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_bands() {
        assert_eq!(format_duration(std::time::Duration::from_millis(412)), "412ms");
        assert_eq!(
            format_duration(std::time::Duration::from_millis(73_400)),
            "73.4s"
        );
        assert_eq!(format_duration(std::time::Duration::from_secs(185)), "3m 5s");
    }

    #[test]
    fn test_parse_rfc3339_offset_converts_to_utc() {
        let parsed = parse_datetime_input("2026-03-05T10:30:00+02:00").unwrap();
        assert_eq!(
            parsed,
            DateTime::parse_from_rfc3339("2026-03-05T08:30:00Z").unwrap()
        );
    }

    #[test]
    fn test_local_forms_agree_on_midnight() {
        let bare = parse_datetime_input("2026-07-20");
        let explicit = parse_datetime_input("2026-07-20 00:00");
        assert!(bare.is_some());
        assert_eq!(bare, explicit);
    }

    #[test]
    fn test_seconds_are_optional() {
        let with = parse_datetime_input("2026-07-20 14:05:00");
        let without = parse_datetime_input("2026-07-20 14:05");
        assert!(with.is_some());
        assert_eq!(with, without);
    }

    #[test]
    fn test_blank_input_is_none() {
        assert!(parse_datetime_input("").is_none());
        assert!(parse_datetime_input("  ").is_none());
    }

    #[test]
    fn test_run_stamp_shape() {
        let ts = DateTime::parse_from_rfc3339("2026-02-03T04:05:06Z")
            .unwrap()
            .with_timezone(&Utc);
        let stamp = run_stamp(&ts);
        assert_eq!(stamp.len(), 15);
        assert_eq!(stamp.as_bytes()[8], b'_');
        assert!(stamp.chars().filter(|c| *c != '_').all(|c| c.is_ascii_digit()));
    }
}
