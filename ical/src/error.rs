// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for temporal values and recurrence rules.

use crate::value::{Granularity, RecurrenceFrequency, TemporalField};

/// Errors raised by temporal values.
#[non_exhaustive]
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// The text matches neither the DATE nor the DATE-TIME format.
    #[error("malformed date or date-time '{text}': {reason}")]
    MalformedTemporal {
        /// The offending text
        text: String,
        /// What the parser expected
        reason: String,
    },

    /// Two values of different granularity were compared or combined.
    #[error("cannot combine a {found} value with a {expected} value")]
    GranularityMismatch {
        /// Granularity required by the operation
        expected: Granularity,
        /// Granularity actually supplied
        found: Granularity,
    },

    /// A field substitution would produce a non-existent calendar date or time.
    #[error("cannot set {field} to {value}")]
    InvalidDateAdjustment {
        /// The substituted field
        field: TemporalField,
        /// The requested value
        value: i32,
    },

    /// Arithmetic left the supported calendar range.
    #[error("date arithmetic out of range: {0}")]
    OutOfRange(jiff::Error),
}

/// A recurrence rule that could not be constructed.
///
/// Carries the rule part that caused the failure. For violations that are
/// not tied to a single part, such as a missing FREQ, `value` is empty.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid recurrence rule part '{key}={value}': {reason}")]
pub struct InvalidRule {
    /// Key of the offending rule part
    pub key: String,
    /// Raw value of the offending rule part
    pub value: String,
    /// Why the rule was rejected
    pub reason: RuleViolation,
}

impl InvalidRule {
    pub(crate) fn new(key: &str, value: &str, reason: RuleViolation) -> Self {
        Self {
            key: key.to_owned(),
            value: value.to_owned(),
            reason,
        }
    }
}

/// The individual reasons a recurrence rule is rejected.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleViolation {
    /// A rule part is not of the form `KEY=VALUE`.
    #[error("expected KEY=VALUE")]
    MissingEquals,

    /// The key is not a recurrence rule part.
    #[error("unknown rule part")]
    UnknownKey,

    /// The key appears more than once.
    #[error("rule part occurs more than once")]
    DuplicateKey,

    /// The FREQ rule part is absent.
    #[error("FREQ is required")]
    MissingFrequency,

    /// FREQ names no known frequency.
    #[error("unknown frequency")]
    UnknownFrequency,

    /// A weekday code is not one of SU, MO, TU, WE, TH, FR, SA.
    #[error("unknown weekday")]
    UnknownWeekday,

    /// The value is not a well-formed integer list.
    #[error("malformed value: {0}")]
    Malformed(String),

    /// A numeric value lies outside its permitted range.
    #[error("{found} is out of range {min}..={max}")]
    OutOfRange {
        /// Smallest permitted magnitude
        min: i32,
        /// Largest permitted magnitude
        max: i32,
        /// The value found
        found: i32,
    },

    /// COUNT or INTERVAL is zero.
    #[error("must be greater than 0")]
    NotPositive,

    /// UNTIL is neither a DATE nor a DATE-TIME.
    #[error("malformed UNTIL: {0}")]
    MalformedUntil(String),

    /// COUNT and UNTIL were both given.
    #[error("COUNT and UNTIL are mutually exclusive")]
    CountWithUntil,

    /// BYWEEKNO was given with a frequency other than YEARLY.
    #[error("BYWEEKNO requires FREQ=YEARLY")]
    WeekNoRequiresYearly,

    /// BYYEARDAY was given with a DAILY, WEEKLY or MONTHLY frequency.
    #[error("BYYEARDAY cannot be used with FREQ={0}")]
    YearDayWithFrequency(RecurrenceFrequency),

    /// BYMONTHDAY was given with a WEEKLY frequency.
    #[error("BYMONTHDAY cannot be used with FREQ=WEEKLY")]
    MonthDayWithWeekly,
}
