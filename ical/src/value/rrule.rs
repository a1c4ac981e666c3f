// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Recurrence rule value as defined in RFC 5545 Section 3.3.10.

use std::fmt::{self, Display};
use std::str::FromStr;

use chumsky::extra;
use jiff::tz::TimeZone;

use crate::error::{InvalidRule, RuleViolation};
use crate::keyword::{
    KW_RRULE_BYDAY, KW_RRULE_BYHOUR, KW_RRULE_BYMINUTE, KW_RRULE_BYMONTH, KW_RRULE_BYMONTHDAY,
    KW_RRULE_BYSECOND, KW_RRULE_BYSETPOS, KW_RRULE_BYWEEKNO, KW_RRULE_BYYEARDAY, KW_RRULE_COUNT,
    KW_RRULE_FREQ, KW_RRULE_INTERVAL, KW_RRULE_UNTIL, KW_RRULE_WKST,
};
use crate::value::datetime::{TemporalUnit, TemporalValue};
use crate::value::miscellaneous::parse_complete;
use crate::value::numeric::{value_integer, value_unsigned, values_integer};

/// A validated recurrence rule.
///
/// Constructed only through [`RecurrenceRule::parse`] or
/// [`RecurrenceRule::parse_in`]; every instance satisfies the RFC 5545
/// constraints on rule part combinations.
#[derive(Debug, Clone)]
pub struct RecurrenceRule {
    freq: RecurrenceFrequency,
    until: Option<TemporalValue>,
    count: Option<u32>,
    interval: u32,
    by_second: Vec<u8>,
    by_minute: Vec<u8>,
    by_hour: Vec<u8>,
    by_day: Vec<WeekDayNum>,
    by_month_day: Vec<i8>,
    by_year_day: Vec<i16>,
    by_week_no: Vec<i8>,
    by_month: Vec<u8>,
    by_set_pos: Vec<i16>,
    wkst: WeekDay,
}

impl RecurrenceRule {
    /// Parse the value of an RRULE content line.
    ///
    /// A floating UNTIL date-time is read in the system time zone.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidRule`] naming the first offending rule part.
    pub fn parse(text: &str) -> Result<Self, InvalidRule> {
        Self::parse_in(text, &TimeZone::system())
    }

    /// Parse the value of an RRULE content line, reading a floating UNTIL
    /// date-time in `zone`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidRule`] naming the first offending rule part.
    pub fn parse_in(text: &str, zone: &TimeZone) -> Result<Self, InvalidRule> {
        let mut raw_parts: Vec<(&str, &str)> = Vec::new();
        if !text.is_empty() {
            for segment in text.split(';') {
                let Some((key, value)) = segment.split_once('=').filter(|(_, v)| !v.contains('='))
                else {
                    return Err(InvalidRule::new(segment, "", RuleViolation::MissingEquals));
                };
                if raw_parts.iter().any(|(k, _)| *k == key) {
                    return Err(InvalidRule::new(key, value, RuleViolation::DuplicateKey));
                }
                raw_parts.push((key, value));
            }
        }

        let mut builder = Builder::default();
        for (key, value) in raw_parts {
            builder
                .apply(key, value, zone)
                .map_err(|reason| InvalidRule::new(key, value, reason))?;
        }
        builder.build()
    }

    /// How often the rule repeats.
    #[must_use]
    pub const fn freq(&self) -> RecurrenceFrequency {
        self.freq
    }

    /// Inclusive upper bound of the recurrence.
    #[must_use]
    pub const fn until(&self) -> Option<&TemporalValue> {
        self.until.as_ref()
    }

    /// Maximum number of occurrences.
    #[must_use]
    pub const fn count(&self) -> Option<u32> {
        self.count
    }

    /// Number of `freq` units between base iterations, 1 by default.
    #[must_use]
    pub const fn interval(&self) -> u32 {
        self.interval
    }

    /// Seconds, 0-60.
    #[must_use]
    pub fn by_second(&self) -> &[u8] {
        &self.by_second
    }

    /// Minutes, 0-59.
    #[must_use]
    pub fn by_minute(&self) -> &[u8] {
        &self.by_minute
    }

    /// Hours, 0-23.
    #[must_use]
    pub fn by_hour(&self) -> &[u8] {
        &self.by_hour
    }

    /// Weekdays with their optional ordinal.
    #[must_use]
    pub fn by_day(&self) -> &[WeekDayNum] {
        &self.by_day
    }

    /// Days of the month, ±1-31, negative counting from the end.
    #[must_use]
    pub fn by_month_day(&self) -> &[i8] {
        &self.by_month_day
    }

    /// Days of the year, ±1-366, negative counting from the end.
    #[must_use]
    pub fn by_year_day(&self) -> &[i16] {
        &self.by_year_day
    }

    /// Week numbers, ±1-53, negative counting from the end.
    #[must_use]
    pub fn by_week_no(&self) -> &[i8] {
        &self.by_week_no
    }

    /// Months, 1-12.
    #[must_use]
    pub fn by_month(&self) -> &[u8] {
        &self.by_month
    }

    /// Positions within an iteration's set, ±1-366.
    #[must_use]
    pub fn by_set_pos(&self) -> &[i16] {
        &self.by_set_pos
    }

    /// First day of the week, Monday by default.
    #[must_use]
    pub const fn week_start(&self) -> WeekDay {
        self.wkst
    }
}

impl FromStr for RecurrenceRule {
    type Err = InvalidRule;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Recurrence frequency
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::EnumString,
    strum::Display,
    strum::IntoStaticStr,
)]
#[strum(serialize_all = "UPPERCASE")]
#[expect(missing_docs)]
pub enum RecurrenceFrequency {
    Secondly,
    Minutely,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl RecurrenceFrequency {
    /// The unit a base iteration advances by.
    #[must_use]
    pub const fn unit(self) -> TemporalUnit {
        match self {
            Self::Secondly => TemporalUnit::Seconds,
            Self::Minutely => TemporalUnit::Minutes,
            Self::Hourly => TemporalUnit::Hours,
            Self::Daily => TemporalUnit::Days,
            Self::Weekly => TemporalUnit::Weeks,
            Self::Monthly => TemporalUnit::Months,
            Self::Yearly => TemporalUnit::Years,
        }
    }
}

/// Day of the week
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::EnumString,
    strum::Display,
    strum::IntoStaticStr,
)]
#[expect(missing_docs)]
pub enum WeekDay {
    #[strum(serialize = "SU")]
    Sunday,
    #[strum(serialize = "MO")]
    Monday,
    #[strum(serialize = "TU")]
    Tuesday,
    #[strum(serialize = "WE")]
    Wednesday,
    #[strum(serialize = "TH")]
    Thursday,
    #[strum(serialize = "FR")]
    Friday,
    #[strum(serialize = "SA")]
    Saturday,
}

impl From<WeekDay> for jiff::civil::Weekday {
    fn from(day: WeekDay) -> Self {
        match day {
            WeekDay::Sunday => Self::Sunday,
            WeekDay::Monday => Self::Monday,
            WeekDay::Tuesday => Self::Tuesday,
            WeekDay::Wednesday => Self::Wednesday,
            WeekDay::Thursday => Self::Thursday,
            WeekDay::Friday => Self::Friday,
            WeekDay::Saturday => Self::Saturday,
        }
    }
}

impl From<jiff::civil::Weekday> for WeekDay {
    fn from(day: jiff::civil::Weekday) -> Self {
        use jiff::civil::Weekday;
        match day {
            Weekday::Sunday => Self::Sunday,
            Weekday::Monday => Self::Monday,
            Weekday::Tuesday => Self::Tuesday,
            Weekday::Wednesday => Self::Wednesday,
            Weekday::Thursday => Self::Thursday,
            Weekday::Friday => Self::Friday,
            Weekday::Saturday => Self::Saturday,
        }
    }
}

/// Day of week with optional occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeekDayNum {
    /// Day of the week
    pub day: WeekDay,
    /// N-th occurrence within the month or year, negative counting from the
    /// end; 0 for every occurrence
    pub occurrence: i8,
}

impl Display for WeekDayNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.occurrence {
            0 => write!(f, "{}", self.day),
            n => write!(f, "{n}{}", self.day),
        }
    }
}

#[derive(Debug, Default)]
struct Builder {
    freq: Option<RecurrenceFrequency>,
    until: Option<TemporalValue>,
    count: Option<u32>,
    interval: Option<u32>,
    by_second: Vec<u8>,
    by_minute: Vec<u8>,
    by_hour: Vec<u8>,
    by_day: Vec<WeekDayNum>,
    by_month_day: Vec<i8>,
    by_year_day: Vec<i16>,
    by_week_no: Vec<i8>,
    by_month: Vec<u8>,
    by_set_pos: Vec<i16>,
    wkst: Option<WeekDay>,
}

impl Builder {
    /// ```txt
    /// recur-rule-part = ( "FREQ" "=" freq )
    ///                 / ( "UNTIL" "=" enddate )
    ///                 / ( "COUNT" "=" 1*DIGIT )
    ///                 / ( "INTERVAL" "=" 1*DIGIT )
    ///                 / ( "BYSECOND" "=" byseclist )
    ///                 / ( "BYMINUTE" "=" byminlist )
    ///                 / ( "BYHOUR" "=" byhrlist )
    ///                 / ( "BYDAY" "=" bywdaylist )
    ///                 / ( "BYMONTHDAY" "=" bymodaylist )
    ///                 / ( "BYYEARDAY" "=" byyrdaylist )
    ///                 / ( "BYWEEKNO" "=" bywknolist )
    ///                 / ( "BYMONTH" "=" bymolist )
    ///                 / ( "BYSETPOS" "=" bysplist )
    ///                 / ( "WKST" "=" weekday )
    /// ```
    fn apply(&mut self, key: &str, value: &str, zone: &TimeZone) -> Result<(), RuleViolation> {
        match key {
            KW_RRULE_FREQ => {
                let freq = value
                    .parse()
                    .map_err(|_| RuleViolation::UnknownFrequency)?;
                self.freq = Some(freq);
            }
            KW_RRULE_UNTIL => {
                let until = TemporalValue::parse(value, zone)
                    .map_err(|e| RuleViolation::MalformedUntil(e.to_string()))?;
                self.until = Some(until);
            }
            KW_RRULE_COUNT => self.count = Some(positive(value)?),
            KW_RRULE_INTERVAL => self.interval = Some(positive(value)?),
            KW_RRULE_BYSECOND => self.by_second = int_list(value, Range::unsigned(0, 60))?,
            KW_RRULE_BYMINUTE => self.by_minute = int_list(value, Range::unsigned(0, 59))?,
            KW_RRULE_BYHOUR => self.by_hour = int_list(value, Range::unsigned(0, 23))?,
            KW_RRULE_BYDAY => {
                self.by_day = value.split(',').map(weekdaynum).collect::<Result<_, _>>()?;
            }
            KW_RRULE_BYMONTHDAY => self.by_month_day = int_list(value, Range::signed(1, 31))?,
            KW_RRULE_BYYEARDAY => self.by_year_day = int_list(value, Range::signed(1, 366))?,
            KW_RRULE_BYWEEKNO => self.by_week_no = int_list(value, Range::signed(1, 53))?,
            KW_RRULE_BYMONTH => self.by_month = int_list(value, Range::unsigned(1, 12))?,
            KW_RRULE_BYSETPOS => self.by_set_pos = int_list(value, Range::signed(1, 366))?,
            KW_RRULE_WKST => self.wkst = Some(weekday(value)?),
            _ => return Err(RuleViolation::UnknownKey),
        }
        Ok(())
    }

    fn build(self) -> Result<RecurrenceRule, InvalidRule> {
        let Some(freq) = self.freq else {
            return Err(InvalidRule::new(
                KW_RRULE_FREQ,
                "",
                RuleViolation::MissingFrequency,
            ));
        };

        if let (Some(count), Some(_)) = (self.count, &self.until) {
            return Err(InvalidRule::new(
                KW_RRULE_COUNT,
                &count.to_string(),
                RuleViolation::CountWithUntil,
            ));
        }

        if !self.by_week_no.is_empty() && freq != RecurrenceFrequency::Yearly {
            return Err(InvalidRule::new(
                KW_RRULE_BYWEEKNO,
                &join(&self.by_week_no),
                RuleViolation::WeekNoRequiresYearly,
            ));
        }

        if !self.by_year_day.is_empty()
            && matches!(
                freq,
                RecurrenceFrequency::Daily
                    | RecurrenceFrequency::Weekly
                    | RecurrenceFrequency::Monthly
            )
        {
            return Err(InvalidRule::new(
                KW_RRULE_BYYEARDAY,
                &join(&self.by_year_day),
                RuleViolation::YearDayWithFrequency(freq),
            ));
        }

        if !self.by_month_day.is_empty() && freq == RecurrenceFrequency::Weekly {
            return Err(InvalidRule::new(
                KW_RRULE_BYMONTHDAY,
                &join(&self.by_month_day),
                RuleViolation::MonthDayWithWeekly,
            ));
        }

        Ok(RecurrenceRule {
            freq,
            until: self.until,
            count: self.count,
            interval: self.interval.unwrap_or(1),
            by_second: self.by_second,
            by_minute: self.by_minute,
            by_hour: self.by_hour,
            by_day: self.by_day,
            by_month_day: self.by_month_day,
            by_year_day: self.by_year_day,
            by_week_no: self.by_week_no,
            by_month: self.by_month,
            by_set_pos: self.by_set_pos,
            wkst: self.wkst.unwrap_or(WeekDay::Monday),
        })
    }
}

/// Permitted values of an integer list; for signed lists only the magnitude
/// is checked.
#[derive(Debug, Clone, Copy)]
struct Range {
    min: i32,
    max: i32,
    signed: bool,
}

impl Range {
    const fn unsigned(min: i32, max: i32) -> Self {
        Self {
            min,
            max,
            signed: false,
        }
    }

    const fn signed(min: i32, max: i32) -> Self {
        Self {
            min,
            max,
            signed: true,
        }
    }

    fn check(self, value: i32) -> Result<i32, RuleViolation> {
        let magnitude = if self.signed {
            value.checked_abs()
        } else {
            Some(value)
        };
        match magnitude {
            Some(m) if (self.min..=self.max).contains(&m) => Ok(value),
            _ => Err(RuleViolation::OutOfRange {
                min: self.min,
                max: self.max,
                found: value,
            }),
        }
    }
}

fn int_list<T: TryFrom<i32>>(value: &str, range: Range) -> Result<Vec<T>, RuleViolation> {
    parse_complete(values_integer::<'_, _, extra::Err<_>>(), value)
        .map_err(RuleViolation::Malformed)?
        .into_iter()
        .map(|v| {
            let v = range.check(v)?;
            T::try_from(v).map_err(|_| RuleViolation::OutOfRange {
                min: range.min,
                max: range.max,
                found: v,
            })
        })
        .collect()
}

fn positive(value: &str) -> Result<u32, RuleViolation> {
    match parse_complete(value_unsigned::<'_, _, extra::Err<_>>(), value) {
        Ok(0) => Err(RuleViolation::NotPositive),
        Ok(n) => Ok(n),
        Err(reason) => Err(RuleViolation::Malformed(reason)),
    }
}

/// ```txt
/// weekday     = "SU" / "MO" / "TU" / "WE" / "TH" / "FR" / "SA"
/// ```
fn weekday(value: &str) -> Result<WeekDay, RuleViolation> {
    value.parse().map_err(|_| RuleViolation::UnknownWeekday)
}

/// ```txt
/// weekdaynum  = [[plus / minus] ordwk] weekday
/// ordwk       = 1*2DIGIT       ;1 to 53
/// ```
fn weekdaynum(token: &str) -> Result<WeekDayNum, RuleViolation> {
    let Some(split) = token
        .len()
        .checked_sub(2)
        .filter(|&i| token.is_char_boundary(i))
    else {
        return Err(RuleViolation::UnknownWeekday);
    };
    let (ordinal, day) = token.split_at(split);
    let day = weekday(day)?;

    let occurrence = match ordinal {
        "" => 0,
        ordinal => {
            let n = parse_complete(value_integer::<'_, _, extra::Err<_>>(), ordinal)
                .map_err(RuleViolation::Malformed)?;
            let n = Range::signed(0, 53).check(n)?;
            i8::try_from(n).map_err(|_| RuleViolation::OutOfRange {
                min: 0,
                max: 53,
                found: n,
            })?
        }
    };
    Ok(WeekDayNum { day, occurrence })
}

fn join<T: ToString>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
