// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Value types of recurrence rules.
//!
//! This module handles the parsing and validation of the DATE, DATE-TIME and
//! RECUR value types as defined in RFC 5545 Section 3.3.

mod datetime;
mod miscellaneous;
mod numeric;
mod rrule;

pub use datetime::{Granularity, TemporalField, TemporalUnit, TemporalValue};
pub use rrule::{RecurrenceFrequency, RecurrenceRule, WeekDay, WeekDayNum};
