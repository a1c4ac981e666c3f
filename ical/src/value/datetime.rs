// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Date and date-time values as defined in RFC 5545 Section 3.3.4 and 3.3.5.

use std::cmp::Ordering;
use std::fmt::{self, Display};

use chumsky::Parser;
use chumsky::extra::ParserExtra;
use chumsky::label::LabelError;
use chumsky::prelude::*;
use jiff::civil::{Date, Time, Weekday};
use jiff::tz::{Offset, TimeZone};
use jiff::{Span, Zoned};

use crate::error::Error;
use crate::value::miscellaneous::{
    ValueExpected, i8_0_1, i8_0_2, i8_0_3, i8_0_5, i8_0_9, i8_1_2, i8_1_9, i16_0_9, parse_complete,
};

/// Whether a temporal value is date-only or carries a time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Granularity {
    /// Day granularity
    Date,
    /// Second granularity, with a time zone
    DateTime,
}

/// Calendar and clock units used for arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "kebab-case")]
#[expect(missing_docs)]
pub enum TemporalUnit {
    Years,
    Months,
    Weeks,
    Days,
    Hours,
    Minutes,
    Seconds,
}

impl TemporalUnit {
    /// Whether the unit measures time of day rather than calendar days.
    #[must_use]
    pub const fn is_time(self) -> bool {
        matches!(self, Self::Hours | Self::Minutes | Self::Seconds)
    }

    fn span(self, amount: i64) -> Result<Span, Error> {
        let span = Span::new();
        match self {
            Self::Years => span.try_years(amount),
            Self::Months => span.try_months(amount),
            Self::Weeks => span.try_weeks(amount),
            Self::Days => span.try_days(amount),
            Self::Hours => span.try_hours(amount),
            Self::Minutes => span.try_minutes(amount),
            Self::Seconds => span.try_seconds(amount),
        }
        .map_err(Error::OutOfRange)
    }
}

/// Fields that can be read from or substituted into a temporal value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "kebab-case")]
#[expect(missing_docs)]
pub enum TemporalField {
    Year,
    Month,
    DayOfMonth,
    DayOfYear,
    Hour,
    Minute,
    Second,
}

impl TemporalField {
    /// Whether the field is part of the time of day.
    #[must_use]
    pub const fn is_time(self) -> bool {
        matches!(self, Self::Hour | Self::Minute | Self::Second)
    }
}

/// A calendar date, or a date-time fixed to a time zone.
///
/// Values of different granularity are never ordered against each other:
/// [`TemporalValue::compare`] fails with [`Error::GranularityMismatch`],
/// `partial_cmp` yields `None` and `==` yields `false`.
#[derive(Debug, Clone)]
pub enum TemporalValue {
    /// A date without time of day
    Date(Date),
    /// A date-time in a specific time zone
    DateTime(Zoned),
}

impl TemporalValue {
    /// Parse a DATE (`YYYYMMDD`) or DATE-TIME (`YYYYMMDDTHHMMSS`) value.
    ///
    /// A DATE-TIME without zone designator is read in `assumed_zone`. A
    /// trailing `Z` means UTC and a trailing `+HHMM[SS]` / `-HHMM[SS]` a
    /// fixed offset, both overriding `assumed_zone`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedTemporal`] if the text matches neither
    /// format or names a date that does not exist.
    pub fn parse(text: &str, assumed_zone: &TimeZone) -> Result<Self, Error> {
        let (date, time) = parse_complete(value_temporal::<'_, _, extra::Err<_>>(), text)
            .map_err(|reason| Error::MalformedTemporal {
                text: text.to_owned(),
                reason,
            })?;

        let Some((time, zone)) = time else {
            return Ok(Self::Date(date));
        };

        let tz = match zone {
            Zone::Floating => assumed_zone.clone(),
            Zone::Utc => TimeZone::UTC,
            Zone::Fixed(seconds) => {
                TimeZone::fixed(Offset::from_seconds(seconds).map_err(Error::OutOfRange)?)
            }
        };
        date.to_datetime(time)
            .to_zoned(tz)
            .map(Self::DateTime)
            .map_err(Error::OutOfRange)
    }

    /// The granularity of this value.
    #[must_use]
    pub const fn granularity(&self) -> Granularity {
        match self {
            Self::Date(_) => Granularity::Date,
            Self::DateTime(_) => Granularity::DateTime,
        }
    }

    /// The calendar date, in the value's own time zone.
    #[must_use]
    pub fn date(&self) -> Date {
        match self {
            Self::Date(date) => *date,
            Self::DateTime(zoned) => zoned.date(),
        }
    }

    /// The time of day, if any.
    #[must_use]
    pub fn time(&self) -> Option<Time> {
        match self {
            Self::Date(_) => None,
            Self::DateTime(zoned) => Some(zoned.time()),
        }
    }

    /// The time zone, if any.
    #[must_use]
    pub fn time_zone(&self) -> Option<&TimeZone> {
        match self {
            Self::Date(_) => None,
            Self::DateTime(zoned) => Some(zoned.time_zone()),
        }
    }

    /// Offset from UTC at this instant, if any.
    #[must_use]
    pub fn offset(&self) -> Option<Offset> {
        match self {
            Self::Date(_) => None,
            Self::DateTime(zoned) => Some(zoned.offset()),
        }
    }

    /// Calendar year.
    #[must_use]
    pub fn year(&self) -> i16 {
        self.date().year()
    }

    /// Month of the year, 1-12.
    #[must_use]
    pub fn month(&self) -> i8 {
        self.date().month()
    }

    /// Day of the month, 1-31.
    #[must_use]
    pub fn day(&self) -> i8 {
        self.date().day()
    }

    /// Day of the year, 1-366.
    #[must_use]
    pub fn day_of_year(&self) -> i16 {
        self.date().day_of_year()
    }

    /// Number of days in the value's month.
    #[must_use]
    pub fn days_in_month(&self) -> i8 {
        self.date().days_in_month()
    }

    /// Number of days in the value's year.
    #[must_use]
    pub fn days_in_year(&self) -> i16 {
        self.date().days_in_year()
    }

    /// Day of the week.
    #[must_use]
    pub fn weekday(&self) -> Weekday {
        self.date().weekday()
    }

    /// Hour of the day, `None` for a date.
    #[must_use]
    pub fn hour(&self) -> Option<i8> {
        self.time().map(|t| t.hour())
    }

    /// Minute of the hour, `None` for a date.
    #[must_use]
    pub fn minute(&self) -> Option<i8> {
        self.time().map(|t| t.minute())
    }

    /// Second of the minute, `None` for a date.
    #[must_use]
    pub fn second(&self) -> Option<i8> {
        self.time().map(|t| t.second())
    }

    /// Read a single field. Time fields of a date are `None`.
    #[must_use]
    pub fn get(&self, field: TemporalField) -> Option<i32> {
        match field {
            TemporalField::Year => Some(self.year().into()),
            TemporalField::Month => Some(self.month().into()),
            TemporalField::DayOfMonth => Some(self.day().into()),
            TemporalField::DayOfYear => Some(self.day_of_year().into()),
            TemporalField::Hour => self.hour().map(Into::into),
            TemporalField::Minute => self.minute().map(Into::into),
            TemporalField::Second => self.second().map(Into::into),
        }
    }

    /// Week of the year for weeks beginning on `week_start`.
    ///
    /// Week 1 is the first week with at least four days in the year. Days
    /// before it belong to week 0.
    #[must_use]
    pub fn week_of_year(&self, week_start: Weekday) -> i8 {
        week_of_year(self.date(), week_start)
    }

    /// Number of weeks, 52 or 53, in the value's year for weeks beginning on
    /// `week_start`.
    #[must_use]
    pub fn weeks_in_year(&self, week_start: Weekday) -> i8 {
        weeks_in_year(self.date(), week_start)
    }

    /// Add `amount` of `unit`.
    ///
    /// Year and month arithmetic clamps the day to the end of the target
    /// month. On a date-time, calendar units apply to civil time and clock
    /// units to absolute time.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GranularityMismatch`] when adding clock units to a
    /// date, and [`Error::OutOfRange`] when the result leaves the supported
    /// range.
    pub fn add(&self, unit: TemporalUnit, amount: i64) -> Result<Self, Error> {
        let span = unit.span(amount)?;
        match self {
            Self::Date(_) if unit.is_time() => Err(Error::GranularityMismatch {
                expected: Granularity::DateTime,
                found: Granularity::Date,
            }),
            Self::Date(date) => date
                .checked_add(span)
                .map(Self::Date)
                .map_err(Error::OutOfRange),
            Self::DateTime(zoned) => zoned
                .checked_add(span)
                .map(Self::DateTime)
                .map_err(Error::OutOfRange),
        }
    }

    /// Substitute a single field.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDateAdjustment`] when the result would not
    /// exist (the value is never clamped or wrapped), or when a time field
    /// is set on a date.
    pub fn with_field(&self, field: TemporalField, value: i32) -> Result<Self, Error> {
        let invalid = || Error::InvalidDateAdjustment { field, value };

        if field.is_time() {
            let (Self::DateTime(zoned), Ok(v)) = (self, i8::try_from(value)) else {
                return Err(invalid());
            };
            let t = zoned.time();
            let (hour, minute, second) = match field {
                TemporalField::Hour => (v, t.minute(), t.second()),
                TemporalField::Minute => (t.hour(), v, t.second()),
                _ => (t.hour(), t.minute(), v),
            };
            let time = Time::new(hour, minute, second, 0).map_err(|_| invalid())?;
            return zoned
                .date()
                .to_datetime(time)
                .to_zoned(zoned.time_zone().clone())
                .map(Self::DateTime)
                .map_err(Error::OutOfRange);
        }

        let date = self.date();
        let adjusted = match field {
            TemporalField::Year => i16::try_from(value)
                .ok()
                .and_then(|y| Date::new(y, date.month(), date.day()).ok()),
            TemporalField::Month => i8::try_from(value)
                .ok()
                .and_then(|m| Date::new(date.year(), m, date.day()).ok()),
            TemporalField::DayOfMonth => i8::try_from(value)
                .ok()
                .and_then(|d| Date::new(date.year(), date.month(), d).ok()),
            _ => i16::try_from(value)
                .ok()
                .filter(|d| (1..=date.days_in_year()).contains(d))
                .and_then(|d| date.with().day_of_year(d).build().ok()),
        };
        self.with_date(adjusted.ok_or_else(invalid)?)
    }

    /// Replace the calendar date, keeping time of day and time zone.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if the date-time cannot be placed in its
    /// time zone.
    pub fn with_date(&self, date: Date) -> Result<Self, Error> {
        match self {
            Self::Date(_) => Ok(Self::Date(date)),
            Self::DateTime(zoned) => date
                .to_datetime(zoned.time())
                .to_zoned(zoned.time_zone().clone())
                .map(Self::DateTime)
                .map_err(Error::OutOfRange),
        }
    }

    /// Order two values of the same granularity.
    ///
    /// Dates compare by calendar order, date-times by instant.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GranularityMismatch`] if the granularities differ.
    pub fn compare(&self, other: &Self) -> Result<Ordering, Error> {
        match (self, other) {
            (Self::Date(a), Self::Date(b)) => Ok(a.cmp(b)),
            (Self::DateTime(a), Self::DateTime(b)) => Ok(a.timestamp().cmp(&b.timestamp())),
            _ => Err(Error::GranularityMismatch {
                expected: self.granularity(),
                found: other.granularity(),
            }),
        }
    }
}

impl PartialEq for TemporalValue {
    fn eq(&self, other: &Self) -> bool {
        matches!(self.compare(other), Ok(Ordering::Equal))
    }
}

impl PartialOrd for TemporalValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(other).ok()
    }
}

impl Display for TemporalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(date) => date.fmt(f),
            Self::DateTime(zoned) => zoned.fmt(f),
        }
    }
}

impl From<Date> for TemporalValue {
    fn from(date: Date) -> Self {
        Self::Date(date)
    }
}

impl From<Zoned> for TemporalValue {
    fn from(zoned: Zoned) -> Self {
        Self::DateTime(zoned)
    }
}

/// Number of days from `week_start` forward to `day`, 0-6.
fn days_since_week_start(day: Weekday, week_start: Weekday) -> i8 {
    (day.to_monday_zero_offset() - week_start.to_monday_zero_offset()).rem_euclid(7)
}

/// Day of the year on which week 1 begins; zero or negative when it begins
/// in the previous year.
fn first_week_start(date: Date, week_start: Weekday) -> i16 {
    let offset = i16::from(days_since_week_start(
        date.first_of_year().weekday(),
        week_start,
    ));
    if offset <= 3 { 1 - offset } else { 8 - offset }
}

#[expect(clippy::cast_possible_truncation)]
fn week_of_year(date: Date, week_start: Weekday) -> i8 {
    let since_first = date.day_of_year() - first_week_start(date, week_start);
    // at most 54
    (since_first.div_euclid(7) + 1) as i8
}

#[expect(clippy::cast_possible_truncation)]
fn weeks_in_year(date: Date, week_start: Weekday) -> i8 {
    let days = date.days_in_year() - first_week_start(date, week_start) + 1;
    let weeks = days / 7 + i16::from(days % 7 >= 4);
    weeks as i8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Zone {
    Floating,
    Utc,
    Fixed(i32),
}

/// ```txt
/// enddate     = date / date-time
/// date-time   = date "T" time
/// ```
fn value_temporal<'src, I, E>() -> impl Parser<'src, I, (Date, Option<(Time, Zone)>), E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, ValueExpected>,
{
    let zone = choice((
        just('Z').to(Zone::Utc),
        value_utc_offset().map(Zone::Fixed),
    ))
    .or_not()
    .map(|zone| zone.unwrap_or(Zone::Floating));

    value_date().then(
        just('T')
            .ignore_then(value_time())
            .then(zone)
            .or_not(),
    )
}

/// Format Definition:  This value type is defined by the following notation:
///
/// ```txt
/// date               = date-value
///
/// date-value         = date-fullyear date-month date-mday
/// date-fullyear      = 4DIGIT
/// date-month         = 2DIGIT        ;01-12
/// date-mday          = 2DIGIT        ;01-28, 01-29, 01-30, 01-31
///                                    ;based on month/year
/// ```
fn value_date<'src, I, E>() -> impl Parser<'src, I, Date, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, ValueExpected>,
{
    let year = i16_0_9()
        .then(i16_0_9())
        .then(i16_0_9())
        .then(i16_0_9())
        .map(|(((a, b), c), d)| 1000 * a + 100 * b + 10 * c + d);

    let month = choice((
        just('0').ignore_then(i8_1_9()),
        just('1').ignore_then(i8_0_2()).map(|b| 10 + b),
    ));

    let day = choice((
        just('0').ignore_then(i8_1_9()),
        i8_1_2().then(i8_0_9()).map(|(a, b)| 10 * a + b),
        just('3').ignore_then(i8_0_1()).map(|b| 30 + b),
    ));

    year.then(month)
        .then(day)
        .try_map(|((year, month), day), span| {
            Date::new(year, month, day)
                .map_err(|_| E::Error::expected_found([ValueExpected::Date], None, span))
        })
}

/// Format Definition:  This value type is defined by the following notation:
///
/// ```txt
/// time         = time-hour time-minute time-second
///
/// time-hour    = 2DIGIT        ;00-23
/// time-minute  = 2DIGIT        ;00-59
/// time-second  = 2DIGIT        ;00-60
/// ```
///
/// Leap second 60 is contracted to 59.
fn value_time<'src, I, E>() -> impl Parser<'src, I, Time, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, ValueExpected>,
{
    time_hour()
        .then(time_minute())
        .then(time_second())
        .try_map(|((hour, minute), second), span| {
            Time::new(hour, minute, second.min(59), 0)
                .map_err(|_| E::Error::expected_found([ValueExpected::Time], None, span))
        })
}

/// Offset from UTC in seconds.
///
/// ```txt
/// time-numzone = ("+" / "-") time-hour time-minute [time-second]
/// ```
fn value_utc_offset<'src, I, E>() -> impl Parser<'src, I, i32, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, ValueExpected>,
{
    select! { c @ ('+' | '-') => c }
        .then(time_hour())
        .then(time_minute())
        .then(time_second().or_not())
        .try_map(|(((sign, hour), minute), second), span| {
            let seconds = i32::from(hour) * 3600
                + i32::from(minute) * 60
                + i32::from(second.unwrap_or(0).min(59));
            match (sign, seconds) {
                ('-', 0) => Err(E::Error::expected_found(
                    [ValueExpected::UtcOffset],
                    None,
                    span,
                )),
                ('-', s) => Ok(-s),
                (_, s) => Ok(s),
            }
        })
}

fn time_hour<'src, I, E>() -> impl Parser<'src, I, i8, E> + Copy
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    choice((
        i8_0_1().then(i8_0_9()).map(|(a, b)| 10 * a + b),
        just('2').ignore_then(i8_0_3()).map(|b| 20 + b),
    ))
}

fn time_minute<'src, I, E>() -> impl Parser<'src, I, i8, E> + Copy
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    i8_0_5().then(i8_0_9()).map(|(a, b)| 10 * a + b)
}

fn time_second<'src, I, E>() -> impl Parser<'src, I, i8, E> + Copy
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    choice((
        i8_0_5().then(i8_0_9()).map(|(a, b)| 10 * a + b),
        just('6').ignore_then(just('0').to(60)), // leap second
    ))
}
