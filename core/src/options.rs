// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

/// Options that bound a recurrence expansion.
///
/// Can be embedded in a host application's configuration file:
///
/// ```toml
/// max_iterations = 10000
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ExpansionOptions {
    /// Maximum number of base-frequency iterations. `None` leaves the
    /// expansion bounded only by the horizon, COUNT and UNTIL.
    pub max_iterations: Option<usize>,
}

impl ExpansionOptions {
    /// Set the maximum number of base-frequency iterations.
    #[must_use]
    pub const fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }
}
