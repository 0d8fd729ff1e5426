// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// Default translation deceleration: 10 inches/s² at 96 units per inch,
/// expressed per millisecond squared.
pub const DEFAULT_TRANSLATION_DECELERATION: f64 = 10.0 * 96.0 / (1000.0 * 1000.0);

/// Default angular deceleration: two turns per second squared, in radians
/// per millisecond squared.
pub const DEFAULT_ROTATION_DECELERATION: f64 = 4.0 * core::f64::consts::PI / (1000.0 * 1000.0);

/// Default expansion deceleration: 0.1 inch/s² at 96 units per inch.
pub const DEFAULT_EXPANSION_DECELERATION: f64 = 0.1 * 96.0 / (1000.0 * 1000.0);

/// Timing and physics settings shared by every manipulation in a
/// [`Manipulations`](crate::Manipulations) context.
#[derive(Clone, Debug, PartialEq)]
pub struct ManipulationConfig {
    /// Quiescence window in milliseconds (default: 50).
    ///
    /// A device whose manipulators have not updated for longer than this
    /// stops asking for frames until some manipulator updates again.
    pub stale_timeout: u64,
    /// Window of recent frames velocities are sampled over, in milliseconds
    /// (default: 100).
    pub velocity_window: u64,
    /// Upper bound on retained velocity samples (default: 16).
    pub max_velocity_samples: usize,
    /// Deceleration used when a translation behavior sets no terminal condition.
    pub translation_deceleration: f64,
    /// Deceleration used when a rotation behavior sets no terminal condition.
    pub rotation_deceleration: f64,
    /// Deceleration used when an expansion behavior sets no terminal condition.
    pub expansion_deceleration: f64,
}

impl Default for ManipulationConfig {
    fn default() -> Self {
        Self {
            stale_timeout: 50,
            velocity_window: 100,
            max_velocity_samples: 16,
            translation_deceleration: DEFAULT_TRANSLATION_DECELERATION,
            rotation_deceleration: DEFAULT_ROTATION_DECELERATION,
            expansion_deceleration: DEFAULT_EXPANSION_DECELERATION,
        }
    }
}
