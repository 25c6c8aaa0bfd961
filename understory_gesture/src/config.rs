// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Engine configuration.

/// Dead zone, in coordinate units, a displacement must leave before a direction resolves.
pub const DEFAULT_DEADZONE: f64 = 5.0;

/// Maximum time between two releases, in milliseconds, for a double tap or click.
pub const DOUBLE_TAP_WINDOW_MS: f64 = 350.0;

/// When movement gestures are reported to listeners.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum DispatchPolicy {
    /// Report a movement once, when its direction resolves (or when a pinch begins).
    #[default]
    OnResolve,
    /// Also report every later tick and the release, with `end_of_movement` set.
    Continuous,
}

/// Tunables for a [`GestureEngine`](crate::GestureEngine).
///
/// ```
/// use understory_gesture::{DispatchPolicy, EngineConfig};
///
/// let config = EngineConfig::default()
///     .with_deadzone(8.0)
///     .with_dispatch(DispatchPolicy::Continuous)
///     .with_seed(7);
/// assert_eq!(config.deadzone, 8.0);
/// assert_eq!(config.double_tap_window_ms, 350.0);
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EngineConfig {
    /// See [`DEFAULT_DEADZONE`].
    pub deadzone: f64,
    /// See [`DOUBLE_TAP_WINDOW_MS`].
    pub double_tap_window_ms: f64,
    /// Movement reporting policy.
    pub dispatch: DispatchPolicy,
    /// Seed for group id generation; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            deadzone: DEFAULT_DEADZONE,
            double_tap_window_ms: DOUBLE_TAP_WINDOW_MS,
            dispatch: DispatchPolicy::OnResolve,
            seed: None,
        }
    }
}

impl EngineConfig {
    /// Set the direction dead zone.
    #[must_use]
    pub fn with_deadzone(mut self, deadzone: f64) -> Self {
        self.deadzone = deadzone;
        self
    }

    /// Set the double tap/click window.
    #[must_use]
    pub fn with_double_tap_window_ms(mut self, window: f64) -> Self {
        self.double_tap_window_ms = window;
        self
    }

    /// Set the movement reporting policy.
    #[must_use]
    pub fn with_dispatch(mut self, dispatch: DispatchPolicy) -> Self {
        self.dispatch = dispatch;
        self
    }

    /// Seed group id generation for reproducible ids.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
