// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::cmp::Ordering;
use std::ops::Deref;

use recur_ical::{Error, TemporalValue};

/// Sorted, duplicate-free occurrences of a recurrence rule.
///
/// All members share one granularity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OccurrenceSet {
    values: Vec<TemporalValue>,
}

impl OccurrenceSet {
    pub(crate) const fn new() -> Self {
        Self { values: Vec::new() }
    }

    /// Insert `value` at its sorted position. Returns `false` if an equal
    /// value is already present.
    pub(crate) fn insert(&mut self, value: TemporalValue) -> Result<bool, Error> {
        if let Some(first) = self.values.first() {
            first.compare(&value)?;
        }

        let position = self
            .values
            .binary_search_by(|probe| probe.partial_cmp(&value).unwrap_or(Ordering::Equal));
        match position {
            Ok(_) => Ok(false),
            Err(index) => {
                self.values.insert(index, value);
                Ok(true)
            }
        }
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.values.truncate(len);
    }

    /// Drop every member later than `bound`.
    pub(crate) fn retain_until(&mut self, bound: &TemporalValue) {
        self.values.retain(|v| v <= bound);
    }

    /// Keep the members at the given 1-based positions; negative positions
    /// count from the end.
    pub(crate) fn retain_positions(&mut self, positions: &[i16]) {
        let len = self.values.len();
        let selected: Vec<usize> = positions
            .iter()
            .filter_map(|&p| {
                let offset = usize::from(p.unsigned_abs());
                if p > 0 {
                    Some(offset - 1)
                } else {
                    len.checked_sub(offset)
                }
            })
            .collect();

        let mut index = 0;
        self.values.retain(|_| {
            let keep = selected.contains(&index);
            index += 1;
            keep
        });
    }

    /// Number of occurrences.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the set holds no occurrence.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The earliest occurrence.
    #[must_use]
    pub fn first(&self) -> Option<&TemporalValue> {
        self.values.first()
    }

    /// The latest occurrence.
    #[must_use]
    pub fn last(&self) -> Option<&TemporalValue> {
        self.values.last()
    }

    /// Iterate in chronological order.
    pub fn iter(&self) -> std::slice::Iter<'_, TemporalValue> {
        self.values.iter()
    }

    /// Consume the set, returning the occurrences in chronological order.
    #[must_use]
    pub fn into_vec(self) -> Vec<TemporalValue> {
        self.values
    }
}

impl Deref for OccurrenceSet {
    type Target = [TemporalValue];

    fn deref(&self) -> &Self::Target {
        &self.values
    }
}

impl IntoIterator for OccurrenceSet {
    type Item = TemporalValue;
    type IntoIter = std::vec::IntoIter<TemporalValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl<'a> IntoIterator for &'a OccurrenceSet {
    type Item = &'a TemporalValue;
    type IntoIter = std::slice::Iter<'a, TemporalValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;
    use jiff::tz::TimeZone;

    use super::*;

    fn day(d: i8) -> TemporalValue {
        TemporalValue::Date(date(2024, 1, d))
    }

    fn set_of(days: &[i8]) -> OccurrenceSet {
        let mut set = OccurrenceSet::new();
        for &d in days {
            set.insert(day(d)).unwrap();
        }
        set
    }

    #[test]
    fn keeps_sorted_and_unique() {
        let mut set = set_of(&[5, 1, 3]);
        assert!(!set.insert(day(3)).unwrap());
        assert!(set.insert(day(2)).unwrap());
        assert_eq!(set.into_vec(), [day(1), day(2), day(3), day(5)]);
    }

    #[test]
    fn rejects_mixed_granularity() {
        let mut set = set_of(&[1]);
        let instant = TemporalValue::parse("20240101T000000Z", &TimeZone::UTC).unwrap();
        assert!(matches!(
            set.insert(instant),
            Err(Error::GranularityMismatch { .. })
        ));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn selects_positions() {
        #[rustfmt::skip]
        let cases: [(&[i16], &[i8]); 5] = [
            (&[1],          &[1]),
            (&[-1],         &[5]),
            (&[1, -1],      &[1, 5]),
            (&[2, -2, 2],   &[2, 4]),
            (&[6, -6],      &[]),
        ];
        for (positions, expected) in cases {
            let mut set = set_of(&[1, 2, 3, 4, 5]);
            set.retain_positions(positions);
            let expected: Vec<_> = expected.iter().map(|&d| day(d)).collect();
            assert_eq!(set.into_vec(), expected, "Failed for {positions:?}");
        }
    }

    #[test]
    fn truncates_by_count_and_until() {
        let mut set = set_of(&[1, 2, 3, 4]);
        set.truncate(3);
        assert_eq!(set.last(), Some(&day(3)));

        set.retain_until(&day(2));
        assert_eq!(set.len(), 2);
        assert_eq!(set.first(), Some(&day(1)));
        assert_eq!(set.iter().count(), 2);
        assert!(!set.is_empty());
    }
}
