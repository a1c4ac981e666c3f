// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

mod occurrence;
mod stage;

use jiff::civil::{Date, Weekday};
use jiff::{Span, Zoned};
use recur_ical::{RecurrenceFrequency, RecurrenceRule, TemporalValue};

pub use crate::generator::occurrence::OccurrenceSet;
use crate::generator::stage::{ByPart, Context, Stage, pipeline};
use crate::{ExpansionOptions, GenerateError};

/// Expands a recurrence rule from an anchor into its occurrences.
///
/// The anchor is the first occurrence, whether or not it satisfies the
/// rule's BY* parts.
#[derive(Debug, Clone, Copy)]
pub struct RecurrenceGenerator<'a> {
    rule: &'a RecurrenceRule,
    anchor: &'a TemporalValue,
    options: ExpansionOptions,
}

#[derive(Debug, Clone, Copy)]
enum StopReason {
    Horizon,
    Until,
    Count,
}

impl<'a> RecurrenceGenerator<'a> {
    /// Create a generator for `rule` starting at `anchor`.
    #[must_use]
    pub fn new(rule: &'a RecurrenceRule, anchor: &'a TemporalValue) -> Self {
        Self {
            rule,
            anchor,
            options: ExpansionOptions::default(),
        }
    }

    /// Replace the expansion options.
    #[must_use]
    pub const fn with_options(mut self, options: ExpansionOptions) -> Self {
        self.options = options;
        self
    }

    /// Compute the occurrences of the rule.
    ///
    /// Base iterations stop once the iterated date reaches `horizon`, once an
    /// occurrence passes UNTIL, or once COUNT occurrences are collected. The
    /// result is then cut to COUNT members or to those not after UNTIL.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::Temporal`] if UNTIL and the anchor differ in
    /// granularity, if the frequency cannot step the anchor (e.g. HOURLY on
    /// a date), or if arithmetic leaves the supported range. Returns
    /// [`GenerateError::IterationLimit`] when
    /// [`ExpansionOptions::max_iterations`] is exceeded.
    #[tracing::instrument(skip(self), fields(freq = %self.rule.freq(), anchor = %self.anchor))]
    pub fn calculate(&self, horizon: Date) -> Result<OccurrenceSet, GenerateError> {
        let rule = self.rule;
        let anchor = self.anchor;
        if let Some(until) = rule.until() {
            anchor.compare(until)?;
        }

        let stages = pipeline(rule, anchor.granularity());
        let ctx = Context {
            rule,
            week_start: Weekday::from(rule.week_start()),
            anchor_day: anchor.day(),
            clamp_month_day: stages
                .iter()
                .any(|&s| s.derives_day() && s != Stage::Expand(ByPart::Month)),
        };
        // only month and year steps clamp the day of month
        let skip_clamped = matches!(
            rule.freq(),
            RecurrenceFrequency::Monthly | RecurrenceFrequency::Yearly
        ) && !stages.iter().any(|s| s.derives_day());

        let mut occurrences = OccurrenceSet::new();
        occurrences.insert(anchor.clone())?;

        let mut iterations = 0;
        let reason = loop {
            if let Some(limit) = self.options.max_iterations.filter(|&l| iterations >= l) {
                return Err(GenerateError::IterationLimit { limit });
            }

            // the k-th source is always anchor + k * interval
            let source = match iterations {
                0 => anchor.clone(),
                k => {
                    let k = i64::try_from(k).unwrap_or(i64::MAX);
                    let amount = i64::from(rule.interval()).saturating_mul(k);
                    anchor.add(rule.freq().unit(), amount)?
                }
            };
            iterations += 1;

            if iterations > 1 && skip_clamped && source.day() != anchor.day() {
                tracing::trace!(%source, "skipping iteration with clamped day of month");
            } else {
                for candidate in expand_iteration(&stages, &ctx, source.clone())? {
                    if candidate > *anchor {
                        occurrences.insert(candidate)?;
                    }
                }
            }

            if source.date() >= horizon {
                break StopReason::Horizon;
            }
            if rule
                .until()
                .is_some_and(|until| occurrences.last().is_some_and(|last| last > until))
            {
                break StopReason::Until;
            }
            if rule
                .count()
                .is_some_and(|count| occurrences.len() >= count_limit(count))
            {
                break StopReason::Count;
            }
        };

        if let Some(count) = rule.count() {
            occurrences.truncate(count_limit(count));
        } else if let Some(until) = rule.until() {
            occurrences.retain_until(until);
        }

        tracing::debug!(
            iterations,
            occurrences = occurrences.len(),
            ?reason,
            "expanded recurrence rule"
        );
        Ok(occurrences)
    }
}

/// Run the pipeline on one base iteration and apply BYSETPOS.
fn expand_iteration(
    stages: &[Stage],
    ctx: &Context<'_>,
    source: TemporalValue,
) -> Result<OccurrenceSet, recur_ical::Error> {
    let mut candidates = vec![source];
    for stage in stages {
        candidates = stage.apply(candidates, ctx)?;
    }

    let mut set = OccurrenceSet::new();
    for candidate in candidates {
        set.insert(candidate)?;
    }
    if !ctx.rule.by_set_pos().is_empty() {
        set.retain_positions(ctx.rule.by_set_pos());
    }
    Ok(set)
}

fn count_limit(count: u32) -> usize {
    usize::try_from(count).unwrap_or(usize::MAX)
}

/// One year and one day after today, in the system time zone.
///
/// A pragmatic horizon for rules without COUNT or UNTIL.
#[must_use]
pub fn default_horizon() -> Date {
    Zoned::now()
        .date()
        .saturating_add(Span::new().years(1).days(1))
}
