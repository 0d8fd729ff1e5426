// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Affine, Point};

use crate::error::ManipulationError;

/// Fixed point that single-contact input rotates around.
///
/// With a pivot, one manipulator both drags and swings the content: the
/// change of the contact's angle around `center` becomes rotation. When the
/// contact is closer to the center than `radius`, the rotation is damped in
/// proportion to the distance, which keeps a contact near the center from
/// spinning the content wildly. A radius of zero disables damping.
///
/// The pivot travels with the content as deltas are applied.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ManipulationPivot {
    center: Point,
    radius: f64,
}

impl ManipulationPivot {
    /// Creates a pivot, rejecting a non-finite center or a negative or
    /// non-finite radius.
    pub fn new(center: Point, radius: f64) -> Result<Self, ManipulationError> {
        if !center.is_finite() {
            return Err(ManipulationError::InvalidArgument("pivot center must be finite"));
        }
        if !radius.is_finite() || radius < 0.0 {
            return Err(ManipulationError::InvalidArgument(
                "pivot radius must be finite and non-negative",
            ));
        }
        Ok(Self { center, radius })
    }

    /// Center in container space.
    #[must_use]
    pub fn center(&self) -> Point {
        self.center
    }

    /// Damping radius.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Rotation weight for a contact `distance` away from the center.
    pub(crate) fn damping(&self, distance: f64) -> f64 {
        if self.radius > 0.0 && distance < self.radius {
            distance / self.radius
        } else {
            1.0
        }
    }

    /// The pivot after the content moved by `transform`.
    pub(crate) fn transformed(self, transform: Affine) -> Self {
        Self {
            center: transform * self.center,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Vec2;

    #[test]
    fn validation() {
        assert!(ManipulationPivot::new(Point::new(1.0, 2.0), 0.0).is_ok());
        assert!(ManipulationPivot::new(Point::new(f64::NAN, 2.0), 1.0).is_err());
        assert!(ManipulationPivot::new(Point::ZERO, -1.0).is_err());
        assert!(ManipulationPivot::new(Point::ZERO, f64::INFINITY).is_err());
    }

    #[test]
    fn damping_inside_radius() {
        let pivot = ManipulationPivot::new(Point::ZERO, 20.0).unwrap();
        assert_eq!(pivot.damping(5.0), 0.25);
        assert_eq!(pivot.damping(20.0), 1.0);
        assert_eq!(pivot.damping(100.0), 1.0);

        let undamped = ManipulationPivot::new(Point::ZERO, 0.0).unwrap();
        assert_eq!(undamped.damping(0.5), 1.0);
    }

    #[test]
    fn follows_content() {
        let pivot = ManipulationPivot::new(Point::new(1.0, 1.0), 4.0).unwrap();
        let moved = pivot.transformed(Affine::translate(Vec2::new(2.0, -1.0)));
        assert_eq!(moved.center(), Point::new(3.0, 0.0));
        assert_eq!(moved.radius(), 4.0);
    }
}
