// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Transform and velocity values reported by a manipulation.

use kurbo::{Affine, Point, Vec2};

use crate::mode::ManipulationModes;

/// A similarity transform expressed as manipulation components.
///
/// The transform rotates by `rotation` and scales by `scale` about `origin`,
/// then translates by `translation`:
///
/// `p ↦ origin + scale · R(rotation) · (p − origin) + translation`
///
/// `expansion` is the change of the mean contact radius that produced
/// `scale`; it is informational and does not enter [`to_affine`](Self::to_affine).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ManipulationDelta {
    /// Translation in container units.
    pub translation: Vec2,
    /// Rotation in radians, counter-clockwise in a y-up space.
    pub rotation: f64,
    /// Uniform scale factor.
    pub scale: f64,
    /// Change of the mean contact radius.
    pub expansion: f64,
    /// Anchor of rotation and scale.
    pub origin: Point,
}

impl ManipulationDelta {
    /// Identity anchored at the container origin.
    pub const IDENTITY: Self = Self::identity_at(Point::ZERO);

    /// Identity anchored at `origin`.
    #[must_use]
    pub const fn identity_at(origin: Point) -> Self {
        Self {
            translation: Vec2::ZERO,
            rotation: 0.0,
            scale: 1.0,
            expansion: 0.0,
            origin,
        }
    }

    /// Returns `true` if applying this delta would move nothing.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.translation == Vec2::ZERO
            && self.rotation == 0.0
            && self.scale == 1.0
            && self.expansion == 0.0
    }

    /// The transform as an affine map over container space.
    #[must_use]
    pub fn to_affine(&self) -> Affine {
        let o = self.origin.to_vec2();
        Affine::translate(o + self.translation)
            * Affine::rotate(self.rotation)
            * Affine::scale(self.scale)
            * Affine::translate(-o)
    }

    /// Drops every component `modes` does not allow.
    #[must_use]
    pub fn masked(mut self, modes: ManipulationModes) -> Self {
        if !modes.contains(ManipulationModes::TRANSLATE_X) {
            self.translation.x = 0.0;
        }
        if !modes.contains(ManipulationModes::TRANSLATE_Y) {
            self.translation.y = 0.0;
        }
        if !modes.contains(ManipulationModes::ROTATE) {
            self.rotation = 0.0;
        }
        if !modes.contains(ManipulationModes::SCALE) {
            self.scale = 1.0;
            self.expansion = 0.0;
        }
        self
    }

    /// The same transform expressed about `origin`.
    ///
    /// Only `translation` changes; rotation and scale do not depend on the
    /// anchor.
    #[must_use]
    pub fn reanchored(&self, origin: Point) -> Self {
        if self.rotation == 0.0 && self.scale == 1.0 {
            return Self { origin, ..*self };
        }
        Self {
            translation: (self.to_affine() * origin) - origin,
            origin,
            ..*self
        }
    }

    /// Composes `next` after `self`, keeping `self.origin` as the anchor.
    ///
    /// Rotation and expansion are summed, so totals may exceed a full turn.
    #[must_use]
    pub fn then(&self, next: &Self) -> Self {
        let composed = next.to_affine() * self.to_affine();
        Self {
            translation: (composed * self.origin) - self.origin,
            rotation: self.rotation + next.rotation,
            scale: self.scale * next.scale,
            expansion: self.expansion + next.expansion,
            origin: self.origin,
        }
    }
}

impl Default for ManipulationDelta {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Velocities sampled from the most recent frames.
///
/// Units are per millisecond: container units for `linear` and `expansion`,
/// radians for `angular`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ManipulationVelocities {
    /// Linear velocity.
    pub linear: Vec2,
    /// Angular velocity.
    pub angular: f64,
    /// Expansion velocity.
    pub expansion: f64,
}

impl ManipulationVelocities {
    /// All velocities zero.
    pub const ZERO: Self = Self {
        linear: Vec2::ZERO,
        angular: 0.0,
        expansion: 0.0,
    };

    /// Drops every component `modes` does not allow.
    #[must_use]
    pub fn masked(mut self, modes: ManipulationModes) -> Self {
        if !modes.contains(ManipulationModes::TRANSLATE_X) {
            self.linear.x = 0.0;
        }
        if !modes.contains(ManipulationModes::TRANSLATE_Y) {
            self.linear.y = 0.0;
        }
        if !modes.contains(ManipulationModes::ROTATE) {
            self.angular = 0.0;
        }
        if !modes.contains(ManipulationModes::SCALE) {
            self.expansion = 0.0;
        }
        self
    }
}
