//! Tests for sluice-timefmt layouts

use chrono::{FixedOffset, TimeZone, Timelike};
use sluice_timefmt::{parse_token, render_token, Error, Layout};

#[test]
fn test_round_trip_millis_layout() {
    let format = "YYYY-MM-dd HH:mm:ssSSS";
    for literal in [
        "2008-10-25 14:56:59.123",
        "2008-10-25 14:56:59.999",
        "2024-01-01 00:00:00.000",
    ] {
        let t = parse_token(literal, format).unwrap();
        assert_eq!(render_token(&t, format).unwrap(), literal);
    }
}

#[test]
fn test_round_trip_truncates_to_layout_precision() {
    let t = FixedOffset::east_opt(0)
        .unwrap()
        .with_ymd_and_hms(2020, 5, 6, 7, 8, 9)
        .unwrap()
        .with_nanosecond(987_654_321)
        .unwrap();

    let literal = render_token(&t, "YYYY-MM-dd HH:mm:ssSS").unwrap();
    assert_eq!(literal, "2020-05-06 07:08:09.98");

    let back = parse_token(&literal, "YYYY-MM-dd HH:mm:ssSS").unwrap();
    assert_eq!(back.nanosecond(), 980_000_000);
    assert_eq!(render_token(&back, "YYYY-MM-dd HH:mm:ssSS").unwrap(), literal);
}

#[test]
fn test_two_digit_year_and_month_names() {
    let t = parse_token("25 Oct 08", "dd MMM YY").unwrap();
    assert_eq!(render_token(&t, "YYYY-MM-dd").unwrap(), "2008-10-25");
    assert_eq!(render_token(&t, "d MMMM YYYY").unwrap(), "25 October 2008");
}

#[test]
fn test_twelve_hour_clock() {
    let t = parse_token("2021-03-04 09:15:00 PM", "YYYY-MM-dd hh:mm:ss a").unwrap();
    assert_eq!(t.hour(), 21);
    assert_eq!(render_token(&t, "h:mm a").unwrap(), "9:15 PM");
}

#[test]
fn test_offsets_survive_round_trip() {
    let format = "YYYY-MM-dd'T'HH:mm:ssXXX";
    let t = parse_token("2021-03-04T09:15:00-05:30", format).unwrap();
    assert_eq!(t.offset().local_minus_utc(), -(5 * 3600 + 30 * 60));
    assert_eq!(render_token(&t, format).unwrap(), "2021-03-04T09:15:00-05:30");
    assert_eq!(render_token(&t, "XX").unwrap(), "-0530");
}

#[test]
fn test_literal_percent_is_not_a_directive() {
    let t = parse_token("2021%03%04", "YYYY%MM%dd").unwrap();
    assert_eq!(render_token(&t, "YYYY%MM%dd").unwrap(), "2021%03%04");
}

#[test]
fn test_compiled_layout_is_reusable() {
    let layout = Layout::compile("YYYYMMdd").unwrap();
    let a = layout.parse("20200101").unwrap();
    let b = layout.parse("20200102").unwrap();
    assert!(b > a);
    assert_eq!(layout.render(&b), "20200102");
    assert_eq!(layout.source(), "YYYYMMdd");
}

#[test]
fn test_errors_name_the_format() {
    let err = parse_token("x", "YYY").unwrap_err();
    assert!(matches!(err, Error::InvalidFormat { .. }));
    assert!(err.to_string().contains("YYY"));

    let err = parse_token("2020-13-01", "YYYY-MM-dd").unwrap_err();
    assert!(matches!(err, Error::Parse { .. }));
    assert!(err.to_string().contains("2020-13-01"));
}
