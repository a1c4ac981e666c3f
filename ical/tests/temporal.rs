// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Integration tests for date and date-time values

use std::cmp::Ordering;

use jiff::civil::{Weekday, date};
use jiff::tz::{self, TimeZone};
use recur_ical::{Error, Granularity, TemporalField, TemporalUnit, TemporalValue};

#[test]
fn test_parse_prefers_date() {
    let value = TemporalValue::parse("20190822", &TimeZone::UTC).unwrap();
    assert_eq!(value, TemporalValue::Date(date(2019, 8, 22)));
    assert_eq!(value.granularity(), Granularity::Date);
}

#[test]
fn test_parse_zone_designators() {
    let assumed = TimeZone::fixed(tz::offset(-5));

    let floating = TemporalValue::parse("19970105T083000", &assumed).unwrap();
    assert_eq!(floating.offset(), Some(tz::offset(-5)));

    let utc = TemporalValue::parse("19970105T133000Z", &assumed).unwrap();
    assert_eq!(utc.offset(), Some(tz::Offset::UTC));
    assert_eq!(floating.compare(&utc).unwrap(), Ordering::Equal);

    let offset = TemporalValue::parse("19970105T083000-0500", &TimeZone::UTC).unwrap();
    assert_eq!(offset, floating);
}

#[test]
fn test_malformed_reports_text() {
    let err = TemporalValue::parse("2019-08-22", &TimeZone::UTC).unwrap_err();
    assert!(matches!(err, Error::MalformedTemporal { ref text, .. } if text == "2019-08-22"));
    assert!(err.to_string().starts_with("malformed date or date-time '2019-08-22'"));
}

#[test]
fn test_granularity_mismatch() {
    let day = TemporalValue::parse("20190822", &TimeZone::UTC).unwrap();
    let instant = TemporalValue::parse("20190822T000000Z", &TimeZone::UTC).unwrap();

    let err = day.compare(&instant).unwrap_err();
    assert_eq!(
        err.to_string(),
        "cannot combine a date-time value with a date value"
    );
    assert!(day.partial_cmp(&instant).is_none());
}

#[test]
fn test_month_end_arithmetic() {
    let value = TemporalValue::Date(date(2019, 1, 31));
    let next = value.add(TemporalUnit::Months, 1).unwrap();
    assert_eq!(next, TemporalValue::Date(date(2019, 2, 28)));

    let err = value.with_field(TemporalField::Month, 2).unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidDateAdjustment {
            field: TemporalField::Month,
            value: 2
        }
    ));
    assert_eq!(err.to_string(), "cannot set month to 2");
}

#[test]
fn test_week_numbering() {
    let value = TemporalValue::Date(date(2019, 3, 23));
    assert_eq!(value.weekday(), Weekday::Saturday);
    assert_eq!(value.week_of_year(Weekday::Monday), 12);
    assert_eq!(value.week_of_year(Weekday::Sunday), 12);
    assert_eq!(value.weeks_in_year(Weekday::Monday), 52);
}
