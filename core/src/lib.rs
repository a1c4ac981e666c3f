// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Expand iCalendar recurrence rules into the ordered set of their
//! occurrences.

#![warn(
    trivial_casts,
    trivial_numeric_casts,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications,
    clippy::dbg_macro,
    clippy::indexing_slicing,
    clippy::pedantic
)]

mod error;
mod generator;
mod options;

pub use crate::error::GenerateError;
pub use crate::generator::{OccurrenceSet, RecurrenceGenerator, default_horizon};
pub use crate::options::ExpansionOptions;
