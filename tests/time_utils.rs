//! Integration tests for the time helpers behind the window flags and the
//! run-completion log line.

use bluebox::util::time::{format_duration, parse_datetime_input, run_stamp};
use chrono::{DateTime, TimeZone, Utc};

#[test]
fn duration_under_a_second_reads_as_millis() {
    let s = format_duration(std::time::Duration::from_millis(350));
    assert_eq!(s, "350ms");
}

#[test]
fn duration_in_typical_run_range_reads_as_seconds() {
    let s = format_duration(std::time::Duration::from_secs(90));
    assert_eq!(s, "90.0s");
}

#[test]
fn duration_beyond_two_minutes_reads_as_minutes_and_seconds() {
    let s = format_duration(std::time::Duration::from_secs(222));
    assert_eq!(s, "3m 42s");
}

#[test]
fn run_stamp_is_compact_and_sortable() {
    let ts = Utc.with_ymd_and_hms(2026, 6, 15, 14, 30, 0).unwrap();
    let stamp = run_stamp(&ts);
    assert_eq!(stamp.len(), 15, "YYYYMMDD_HHMMSS is 15 chars: {stamp}");
    assert_eq!(&stamp[8..9], "_", "Date and time separated by underscore");
    assert!(
        stamp.chars().all(|c| c.is_ascii_digit() || c == '_'),
        "Only digits and underscore: {stamp}"
    );
}

#[test]
fn run_stamp_orders_with_time() {
    let earlier = Utc.with_ymd_and_hms(2026, 6, 15, 14, 30, 0).unwrap();
    let later = Utc.with_ymd_and_hms(2026, 6, 15, 15, 45, 9).unwrap();
    assert!(
        run_stamp(&earlier) < run_stamp(&later),
        "Stamps must sort chronologically within a day"
    );
}

#[test]
fn window_flags_accept_all_documented_forms() {
    // Every form the --start-time/--end-time help text lists must parse.
    for input in [
        "2026-08-01 00:00:00",
        "2026-08-01 00:00",
        "2026-08-01",
        "2026-08-01T00:00:00Z",
    ] {
        assert!(parse_datetime_input(input).is_some(), "rejected: {input}");
    }
}

#[test]
fn window_bounds_order_survives_parsing() {
    let start = parse_datetime_input("2026-08-01 00:00").unwrap();
    let end = parse_datetime_input("2026-08-21 23:59").unwrap();
    assert!(start < end);
}

#[test]
fn rfc3339_offset_input_keeps_the_instant() {
    let parsed = parse_datetime_input("2026-08-21T09:15:00+02:00");
    let expected: DateTime<Utc> = Utc.with_ymd_and_hms(2026, 8, 21, 7, 15, 0).unwrap();
    assert_eq!(parsed, Some(expected));
}

#[test]
fn unusable_window_values_are_rejected() {
    for input in ["", "   ", "yesterday", "2026-13-40", "08/21/2026"] {
        assert!(parse_datetime_input(input).is_none(), "accepted: {input}");
    }
}

#[test]
fn surrounding_whitespace_is_ignored() {
    let padded = parse_datetime_input(" 2026-08-01 00:00 ");
    assert!(padded.is_some());
    assert_eq!(padded, parse_datetime_input("2026-08-01 00:00"));
}
