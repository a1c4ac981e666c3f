// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

/// Errors raised while expanding a recurrence rule.
#[non_exhaustive]
#[derive(Debug, Clone, thiserror::Error)]
pub enum GenerateError {
    /// A temporal operation failed, most often because the anchor, the UNTIL
    /// value or a generated candidate disagree in granularity.
    #[error(transparent)]
    Temporal(#[from] recur_ical::Error),

    /// The rule needed more base iterations than permitted.
    #[error("recurrence expansion exceeded {limit} iterations")]
    IterationLimit {
        /// The configured maximum
        limit: usize,
    },
}
