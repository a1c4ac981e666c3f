// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Expand and limit stages of a single base iteration.

use jiff::civil::{Date, Weekday};
use recur_ical::{
    Error, Granularity, RecurrenceFrequency, RecurrenceRule, TemporalField, TemporalUnit,
    TemporalValue, WeekDayNum,
};

/// The BY* rule part a stage operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ByPart {
    Month,
    WeekNo,
    YearDay,
    MonthDay,
    Weekday(Scope),
    Hour,
    Minute,
    Second,
}

/// Period in which a weekday ordinal is counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Scope {
    Week,
    Month,
    Year,
    /// Ordinals are ignored
    Any,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Stage {
    /// Replace each candidate by one value per list entry
    Expand(ByPart),
    /// Drop candidates that match no list entry
    Limit(ByPart),
}

impl Stage {
    const fn part(self) -> ByPart {
        match self {
            Self::Expand(part) | Self::Limit(part) => part,
        }
    }

    /// Whether the stage computes the day of month afresh rather than
    /// keeping the candidate's.
    pub(crate) const fn derives_day(self) -> bool {
        matches!(
            self,
            Self::Expand(
                ByPart::Month
                    | ByPart::WeekNo
                    | ByPart::YearDay
                    | ByPart::MonthDay
                    | ByPart::Weekday(_)
            )
        )
    }
}

/// Build the stage pipeline for `rule`, leaving out stages whose rule part is
/// absent. Time-of-day stages are left out for a date anchor.
pub(crate) fn pipeline(rule: &RecurrenceRule, granularity: Granularity) -> Vec<Stage> {
    use ByPart::{Hour, Minute, Month, MonthDay, Second, WeekNo, Weekday, YearDay};
    use Stage::{Expand, Limit};

    let limit_weekday = Limit(Weekday(Scope::Any));
    let stages = match rule.freq() {
        RecurrenceFrequency::Yearly => {
            let weekday = if !rule.by_month_day().is_empty() || !rule.by_year_day().is_empty() {
                match rule.by_month().is_empty() {
                    true => Limit(Weekday(Scope::Year)),
                    false => Limit(Weekday(Scope::Month)),
                }
            } else if !rule.by_week_no().is_empty() {
                Expand(Weekday(Scope::Week))
            } else if !rule.by_month().is_empty() {
                Expand(Weekday(Scope::Month))
            } else {
                Expand(Weekday(Scope::Year))
            };
            vec![
                Expand(Month),
                Expand(WeekNo),
                Expand(YearDay),
                Expand(MonthDay),
                weekday,
                Expand(Hour),
                Expand(Minute),
                Expand(Second),
            ]
        }
        RecurrenceFrequency::Monthly => {
            let weekday = match rule.by_month_day().is_empty() {
                true => Expand(Weekday(Scope::Month)),
                false => Limit(Weekday(Scope::Month)),
            };
            vec![
                Limit(Month),
                Expand(MonthDay),
                weekday,
                Expand(Hour),
                Expand(Minute),
                Expand(Second),
            ]
        }
        RecurrenceFrequency::Weekly => vec![
            Limit(Month),
            Expand(Weekday(Scope::Week)),
            Expand(Hour),
            Expand(Minute),
            Expand(Second),
        ],
        RecurrenceFrequency::Daily => vec![
            Limit(Month),
            Limit(MonthDay),
            limit_weekday,
            Expand(Hour),
            Expand(Minute),
            Expand(Second),
        ],
        RecurrenceFrequency::Hourly => vec![
            Limit(Month),
            Limit(YearDay),
            Limit(MonthDay),
            limit_weekday,
            Limit(Hour),
            Expand(Minute),
            Expand(Second),
        ],
        RecurrenceFrequency::Minutely => vec![
            Limit(Month),
            Limit(YearDay),
            Limit(MonthDay),
            limit_weekday,
            Limit(Hour),
            Limit(Minute),
            Expand(Second),
        ],
        RecurrenceFrequency::Secondly => vec![
            Limit(Month),
            Limit(YearDay),
            Limit(MonthDay),
            limit_weekday,
            Limit(Hour),
            Limit(Minute),
            Limit(Second),
        ],
    };

    stages
        .into_iter()
        .filter(|stage| match stage.part() {
            Month => !rule.by_month().is_empty(),
            WeekNo => !rule.by_week_no().is_empty(),
            YearDay => !rule.by_year_day().is_empty(),
            MonthDay => !rule.by_month_day().is_empty(),
            Weekday(_) => !rule.by_day().is_empty(),
            Hour => granularity == Granularity::DateTime && !rule.by_hour().is_empty(),
            Minute => granularity == Granularity::DateTime && !rule.by_minute().is_empty(),
            Second => granularity == Granularity::DateTime && !rule.by_second().is_empty(),
        })
        .collect()
}

/// Inputs shared by every stage of one expansion.
#[derive(Debug)]
pub(crate) struct Context<'a> {
    pub rule: &'a RecurrenceRule,
    pub week_start: Weekday,
    /// Day of month of the anchor, used when expanding by month
    pub anchor_day: i8,
    /// Whether a stage after the month expansion derives the day of month
    pub clamp_month_day: bool,
}

impl Stage {
    /// Apply the stage to every candidate.
    pub(crate) fn apply(
        self,
        candidates: Vec<TemporalValue>,
        ctx: &Context<'_>,
    ) -> Result<Vec<TemporalValue>, Error> {
        match self {
            Self::Expand(part) => expand(part, &candidates, ctx),
            Self::Limit(part) => Ok(candidates
                .into_iter()
                .filter(|c| matches(part, c, ctx))
                .collect()),
        }
    }
}

fn expand(
    part: ByPart,
    candidates: &[TemporalValue],
    ctx: &Context<'_>,
) -> Result<Vec<TemporalValue>, Error> {
    let rule = ctx.rule;
    let mut expanded = Vec::new();
    match part {
        ByPart::Month => {
            for &month in rule.by_month() {
                for c in candidates {
                    push(&mut expanded, with_month(c, month, ctx))?;
                }
            }
        }
        ByPart::WeekNo => {
            for &week in rule.by_week_no() {
                for c in candidates {
                    let weeks = i64::from(c.weeks_in_year(ctx.week_start));
                    let week = resolve(week.into(), weeks);
                    if (1..=weeks).contains(&week) {
                        let current = i64::from(c.week_of_year(ctx.week_start));
                        expanded.push(c.add(TemporalUnit::Days, (week - current) * 7)?);
                    }
                }
            }
        }
        ByPart::YearDay => {
            for &day in rule.by_year_day() {
                for c in candidates {
                    let day = resolve(day.into(), c.days_in_year().into());
                    push(&mut expanded, with_field(c, TemporalField::DayOfYear, day))?;
                }
            }
        }
        ByPart::MonthDay => {
            for &day in rule.by_month_day() {
                for c in candidates {
                    let day = resolve(day.into(), c.days_in_month().into());
                    push(&mut expanded, with_field(c, TemporalField::DayOfMonth, day))?;
                }
            }
        }
        ByPart::Weekday(scope) => {
            for &wdn in rule.by_day() {
                for c in candidates {
                    for date in weekday_dates(c.date(), wdn, scope, ctx.week_start)? {
                        expanded.push(c.with_date(date)?);
                    }
                }
            }
        }
        ByPart::Hour => expand_time(&mut expanded, candidates, TemporalField::Hour, rule.by_hour())?,
        ByPart::Minute => {
            expand_time(&mut expanded, candidates, TemporalField::Minute, rule.by_minute())?;
        }
        ByPart::Second => {
            expand_time(&mut expanded, candidates, TemporalField::Second, rule.by_second())?;
        }
    }
    Ok(expanded)
}

fn expand_time(
    expanded: &mut Vec<TemporalValue>,
    candidates: &[TemporalValue],
    field: TemporalField,
    values: &[u8],
) -> Result<(), Error> {
    for &value in values {
        for c in candidates {
            // a leap second is contracted to 59
            let value = if field == TemporalField::Second {
                value.min(59)
            } else {
                value
            };
            push(expanded, with_field(c, field, value.into()))?;
        }
    }
    Ok(())
}

fn matches(part: ByPart, c: &TemporalValue, ctx: &Context<'_>) -> bool {
    let rule = ctx.rule;
    match part {
        ByPart::Month => rule.by_month().contains(&c.month().unsigned_abs()),
        ByPart::YearDay => {
            let days = c.days_in_year().into();
            let day = i64::from(c.day_of_year());
            rule.by_year_day()
                .iter()
                .any(|&n| resolve(n.into(), days) == day)
        }
        ByPart::MonthDay => {
            let days = c.days_in_month().into();
            let day = i64::from(c.day());
            rule.by_month_day()
                .iter()
                .any(|&n| resolve(n.into(), days) == day)
        }
        ByPart::Weekday(scope) => rule
            .by_day()
            .iter()
            .any(|&wdn| matches_weekday(c.date(), wdn, scope)),
        ByPart::WeekNo => {
            let weeks = i64::from(c.weeks_in_year(ctx.week_start));
            let week = i64::from(c.week_of_year(ctx.week_start));
            rule.by_week_no()
                .iter()
                .any(|&n| resolve(n.into(), weeks) == week)
        }
        ByPart::Hour => matches_time(c.hour(), rule.by_hour()),
        ByPart::Minute => matches_time(c.minute(), rule.by_minute()),
        ByPart::Second => matches_time(c.second(), rule.by_second()),
    }
}

fn matches_time(value: Option<i8>, list: &[u8]) -> bool {
    value.is_some_and(|v| list.iter().any(|&x| i16::from(x.min(59)) == i16::from(v)))
}

fn matches_weekday(date: Date, wdn: WeekDayNum, scope: Scope) -> bool {
    if Weekday::from(wdn.day) != date.weekday() {
        return false;
    }

    let (position, len) = match scope {
        Scope::Month => (i64::from(date.day()), i64::from(date.days_in_month())),
        Scope::Year => (i64::from(date.day_of_year()), i64::from(date.days_in_year())),
        Scope::Week | Scope::Any => return true,
    };
    match wdn.occurrence {
        0 => true,
        n if n > 0 => (position - 1) / 7 + 1 == i64::from(n),
        n => (len - position) / 7 + 1 == -i64::from(n),
    }
}

/// Dates in the period of `date` selected by `wdn`.
fn weekday_dates(
    date: Date,
    wdn: WeekDayNum,
    scope: Scope,
    week_start: Weekday,
) -> Result<Vec<Date>, Error> {
    let day = Weekday::from(wdn.day);
    let (first, len) = match scope {
        Scope::Week => {
            let target = date
                .checked_sub(span_days(days_since(date.weekday(), week_start)))
                .and_then(|start| start.checked_add(span_days(days_since(day, week_start))))
                .map_err(Error::OutOfRange)?;
            return Ok(vec![target]);
        }
        Scope::Month => (date.first_of_month(), i64::from(date.days_in_month())),
        Scope::Year | Scope::Any => (date.first_of_year(), i64::from(date.days_in_year())),
    };

    // offsets from `first` of every matching weekday in the period
    let offset = i64::from(days_since(day, first.weekday()));
    let count = (len - 1 - offset) / 7 + 1;
    let selected: Vec<i64> = match wdn.occurrence {
        0 => (0..count).collect(),
        n => {
            let nth = resolve(n.into(), count);
            if (1..=count).contains(&nth) {
                vec![nth - 1]
            } else {
                Vec::new()
            }
        }
    };

    selected
        .into_iter()
        .map(|k| first.checked_add(span_days(offset + 7 * k)))
        .collect::<Result<_, _>>()
        .map_err(Error::OutOfRange)
}

fn with_month(c: &TemporalValue, month: u8, ctx: &Context<'_>) -> Result<TemporalValue, Error> {
    let value = i32::from(month);
    let invalid = || Error::InvalidDateAdjustment {
        field: TemporalField::Month,
        value,
    };
    let month = i8::try_from(month).map_err(|_| invalid())?;
    let date = match Date::new(c.year(), month, ctx.anchor_day) {
        Ok(date) => date,
        Err(_) if ctx.clamp_month_day => Date::new(c.year(), month, 1)
            .map_err(|_| invalid())?
            .last_of_month(),
        Err(_) => return Err(invalid()),
    };
    c.with_date(date)
}

fn with_field(c: &TemporalValue, field: TemporalField, value: i64) -> Result<TemporalValue, Error> {
    // out-of-range values are rejected by the substitution itself
    c.with_field(field, i32::try_from(value).unwrap_or(i32::MAX))
}

/// Keep a substituted candidate, dropping it when the substitution names a
/// date or time that does not exist.
fn push(
    expanded: &mut Vec<TemporalValue>,
    result: Result<TemporalValue, Error>,
) -> Result<(), Error> {
    match result {
        Ok(value) => expanded.push(value),
        Err(Error::InvalidDateAdjustment { field, value }) => {
            tracing::trace!(%field, value, "dropping non-existent candidate");
        }
        Err(err) => return Err(err),
    }
    Ok(())
}

/// Resolve a 1-based index where negative values count back from `len`.
fn resolve(n: i64, len: i64) -> i64 {
    if n < 0 { len + 1 + n } else { n }
}

fn days_since(day: Weekday, start: Weekday) -> i8 {
    (day.to_monday_zero_offset() - start.to_monday_zero_offset()).rem_euclid(7)
}

fn span_days(days: impl Into<i64>) -> jiff::Span {
    jiff::Span::new().days(days)
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;
    use jiff::tz::TimeZone;
    use recur_ical::WeekDay;

    use super::*;

    fn rule(src: &str) -> RecurrenceRule {
        RecurrenceRule::parse_in(src, &TimeZone::UTC).unwrap()
    }

    fn wdn(day: WeekDay, occurrence: i8) -> WeekDayNum {
        WeekDayNum { day, occurrence }
    }

    #[test]
    fn builds_pipelines() {
        use ByPart::{Hour, Minute, Month, MonthDay, WeekNo, Weekday, YearDay};
        use Stage::{Expand, Limit};

        #[rustfmt::skip]
        let cases = [
            ("FREQ=YEARLY;BYMONTH=1;BYDAY=SU;BYHOUR=8,9;BYMINUTE=30",
                vec![Expand(Month), Expand(Weekday(Scope::Month)), Expand(Hour), Expand(Minute)]),
            ("FREQ=YEARLY;BYWEEKNO=20;BYDAY=MO",
                vec![Expand(WeekNo), Expand(Weekday(Scope::Week))]),
            ("FREQ=YEARLY;BYYEARDAY=100;BYMONTHDAY=5;BYDAY=SA",
                vec![Expand(YearDay), Expand(MonthDay), Limit(Weekday(Scope::Year))]),
            ("FREQ=YEARLY;BYMONTH=11;BYMONTHDAY=2;BYDAY=TU",
                vec![Expand(Month), Expand(MonthDay), Limit(Weekday(Scope::Month))]),
            ("FREQ=YEARLY;BYDAY=20MO",
                vec![Expand(Weekday(Scope::Year))]),
            ("FREQ=MONTHLY;BYDAY=FR;BYMONTHDAY=13",
                vec![Expand(MonthDay), Limit(Weekday(Scope::Month))]),
            ("FREQ=MONTHLY;BYMONTH=1;BYDAY=-1SU",
                vec![Limit(Month), Expand(Weekday(Scope::Month))]),
            ("FREQ=WEEKLY;BYDAY=TU,TH",
                vec![Expand(Weekday(Scope::Week))]),
            ("FREQ=DAILY;BYMONTH=1;BYDAY=MO;BYHOUR=9",
                vec![Limit(Month), Limit(Weekday(Scope::Any)), Expand(Hour)]),
            ("FREQ=HOURLY;BYYEARDAY=1;BYHOUR=9;BYMINUTE=0",
                vec![Limit(YearDay), Limit(Hour), Expand(Minute)]),
            ("FREQ=MINUTELY;BYHOUR=9;BYMINUTE=0",
                vec![Limit(Hour), Limit(Minute)]),
            ("FREQ=SECONDLY;BYSECOND=0",
                vec![Limit(ByPart::Second)]),
            ("FREQ=DAILY", vec![]),
        ];
        for (src, expected) in cases {
            assert_eq!(pipeline(&rule(src), Granularity::DateTime), expected, "Failed for {src}");
        }
    }

    #[test]
    fn drops_time_stages_for_dates() {
        let stages = pipeline(&rule("FREQ=DAILY;BYDAY=MO;BYHOUR=9"), Granularity::Date);
        assert_eq!(stages, [Stage::Limit(ByPart::Weekday(Scope::Any))]);
    }

    #[test]
    fn selects_weekdays_in_month() {
        let sep = date(2019, 9, 15);
        #[rustfmt::skip]
        let cases = [
            (wdn(WeekDay::Monday, 0),  vec![date(2019, 9, 2), date(2019, 9, 9), date(2019, 9, 16), date(2019, 9, 23), date(2019, 9, 30)]),
            (wdn(WeekDay::Monday, 1),  vec![date(2019, 9, 2)]),
            (wdn(WeekDay::Monday, -1), vec![date(2019, 9, 30)]),
            (wdn(WeekDay::Monday, 5),  vec![date(2019, 9, 30)]),
            (wdn(WeekDay::Monday, 6),  vec![]),
            (wdn(WeekDay::Sunday, 1),  vec![date(2019, 9, 1)]),
            (wdn(WeekDay::Sunday, -5), vec![date(2019, 9, 1)]),
        ];
        for (wdn, expected) in cases {
            let dates = weekday_dates(sep, wdn, Scope::Month, Weekday::Monday).unwrap();
            assert_eq!(dates, expected, "Failed for {wdn}");
        }
    }

    #[test]
    fn selects_weekdays_in_year() {
        let dates = weekday_dates(date(2019, 6, 1), wdn(WeekDay::Monday, 20), Scope::Year, Weekday::Monday);
        assert_eq!(dates.unwrap(), [date(2019, 5, 20)]);

        let dates = weekday_dates(date(2019, 6, 1), wdn(WeekDay::Sunday, -1), Scope::Year, Weekday::Monday);
        assert_eq!(dates.unwrap(), [date(2019, 12, 29)]);

        let dates = weekday_dates(date(2019, 6, 1), wdn(WeekDay::Tuesday, 0), Scope::Year, Weekday::Monday);
        assert_eq!(dates.unwrap().len(), 53);
    }

    #[test]
    fn selects_weekday_in_week() {
        // 2019-04-13 is a Saturday
        let saturday = date(2019, 4, 13);
        let dates = weekday_dates(saturday, wdn(WeekDay::Sunday, 0), Scope::Week, Weekday::Sunday);
        assert_eq!(dates.unwrap(), [date(2019, 4, 7)]);

        let dates = weekday_dates(saturday, wdn(WeekDay::Sunday, 2), Scope::Week, Weekday::Monday);
        assert_eq!(dates.unwrap(), [date(2019, 4, 14)]);
    }

    #[test]
    fn matches_weekday_ordinals() {
        let last_friday = date(2019, 8, 30);
        assert!(matches_weekday(last_friday, wdn(WeekDay::Friday, -1), Scope::Month));
        assert!(matches_weekday(last_friday, wdn(WeekDay::Friday, 5), Scope::Month));
        assert!(!matches_weekday(last_friday, wdn(WeekDay::Friday, 1), Scope::Month));
        assert!(matches_weekday(last_friday, wdn(WeekDay::Friday, 1), Scope::Any));
        assert!(matches_weekday(last_friday, wdn(WeekDay::Friday, 35), Scope::Year));
        assert!(!matches_weekday(last_friday, wdn(WeekDay::Thursday, 0), Scope::Month));
    }

    #[test]
    fn resolves_negative_indices() {
        assert_eq!(resolve(1, 31), 1);
        assert_eq!(resolve(-1, 31), 31);
        assert_eq!(resolve(-31, 30), 0);
        assert_eq!(resolve(-366, 366), 1);
    }

    #[test]
    fn expands_month_days_from_the_end() {
        let rule = rule("FREQ=MONTHLY;BYMONTHDAY=-1,-30,31");
        let ctx = Context {
            rule: &rule,
            week_start: Weekday::Monday,
            anchor_day: 1,
            clamp_month_day: false,
        };
        let feb = vec![TemporalValue::Date(date(2024, 2, 10))];
        let expanded = Stage::Expand(ByPart::MonthDay).apply(feb, &ctx).unwrap();
        assert_eq!(expanded, [TemporalValue::Date(date(2024, 2, 29))]);
    }

    #[test]
    fn expands_month_keeping_anchor_day() {
        let rule = rule("FREQ=YEARLY;BYMONTH=2,3");
        let source = vec![TemporalValue::Date(date(2023, 1, 31))];
        let mut ctx = Context {
            rule: &rule,
            week_start: Weekday::Monday,
            anchor_day: 31,
            clamp_month_day: false,
        };

        let dropped = Stage::Expand(ByPart::Month).apply(source.clone(), &ctx).unwrap();
        assert_eq!(dropped, [TemporalValue::Date(date(2023, 3, 31))]);

        ctx.clamp_month_day = true;
        let clamped = Stage::Expand(ByPart::Month).apply(source, &ctx).unwrap();
        assert_eq!(
            clamped,
            [
                TemporalValue::Date(date(2023, 2, 28)),
                TemporalValue::Date(date(2023, 3, 31))
            ]
        );
    }

    #[test]
    fn limits_by_year_day_from_the_end() {
        let rule = rule("FREQ=HOURLY;BYYEARDAY=-1");
        let ctx = Context {
            rule: &rule,
            week_start: Weekday::Monday,
            anchor_day: 1,
            clamp_month_day: false,
        };
        let candidates = vec![
            TemporalValue::parse("20231231T100000Z", &TimeZone::UTC).unwrap(),
            TemporalValue::parse("20241230T100000Z", &TimeZone::UTC).unwrap(),
        ];
        let kept = Stage::Limit(ByPart::YearDay).apply(candidates, &ctx).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept.first().map(TemporalValue::date), Some(date(2023, 12, 31)));
    }
}
