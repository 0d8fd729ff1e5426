// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Constant-deceleration inertia integrator.
//!
//! Every axis moves with its initial speed and slows down at a fixed rate
//! until it stops. A distance target is turned into the deceleration that
//! stops the motion exactly there: `a = v0² / (2d)`.
//!
//! The integrator is stateless with respect to frame timing: each
//! [`advance`](InertiaIntegrator::advance) evaluates the closed-form motion at
//! the given timestamp, so skipped or irregular frames never accumulate error.

use core::fmt;

use kurbo::{Affine, Point, Vec2};

/// Speed (units or radians per millisecond) below which an axis is at rest.
pub const REST_VELOCITY: f64 = 1e-4;

/// Smallest scale factor expansion inertia may shrink to.
pub const MIN_SCALE: f64 = 1e-3;

/// How a resolved inertia axis stops.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Stop {
    /// Decelerate at this positive rate.
    Deceleration(f64),
    /// Stop after this distance.
    ///
    /// For translation this is a magnitude along the velocity direction. For
    /// rotation and expansion it is signed and must agree with the velocity.
    Distance(f64),
}

/// Resolved translation parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TranslationInertia {
    /// Initial velocity in units per millisecond.
    pub initial_velocity: Vec2,
    /// Stopping condition.
    pub stop: Stop,
}

/// Resolved parameters for a scalar axis (rotation or expansion).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisInertia {
    /// Initial velocity in units (or radians) per millisecond.
    pub initial_velocity: f64,
    /// Stopping condition.
    pub stop: Stop,
}

/// Everything an integrator needs to start.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InertiaParameters {
    /// Point rotation and expansion are anchored to when inertia starts.
    pub origin: Point,
    /// Timestamp (milliseconds) inertia starts at.
    pub start_time: u64,
    /// Translation axis, if it participates.
    pub translation: Option<TranslationInertia>,
    /// Rotation axis, if it participates.
    pub rotation: Option<AxisInertia>,
    /// Expansion axis, if it participates.
    pub expansion: Option<AxisInertia>,
    /// Radius expansion is measured against.
    pub initial_radius: f64,
}

impl InertiaParameters {
    /// Creates parameters with no participating axis.
    #[must_use]
    pub fn new(origin: Point, start_time: u64) -> Self {
        Self {
            origin,
            start_time,
            translation: None,
            rotation: None,
            expansion: None,
            initial_radius: 1.0,
        }
    }

    /// Returns `true` when no axis participates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.translation.is_none() && self.rotation.is_none() && self.expansion.is_none()
    }
}

/// Cumulative inertial motion since inertia started.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InertiaStep {
    /// Anchor point of rotation and scale, before translation.
    pub origin: Point,
    /// Total translation.
    pub translation: Vec2,
    /// Total rotation in radians.
    pub rotation: f64,
    /// Total change of radius.
    pub expansion: f64,
    /// Scale factor implied by the expansion.
    pub scale: f64,
    /// Current linear velocity.
    pub linear_velocity: Vec2,
    /// Current angular velocity.
    pub angular_velocity: f64,
    /// Current expansion velocity.
    pub expansion_velocity: f64,
    /// Whether every axis has come to rest.
    pub complete: bool,
}

impl InertiaStep {
    /// Maps content positions at inertia start to their current positions.
    #[must_use]
    pub fn to_affine(&self) -> Affine {
        let o = self.origin.to_vec2();
        Affine::translate(o + self.translation)
            * Affine::rotate(self.rotation)
            * Affine::scale(self.scale)
            * Affine::translate(-o)
    }
}

/// A physics service that advances inertial motion.
///
/// Hosts may supply their own integrator; [`InertiaProcessor`] is the
/// constant-deceleration default.
pub trait InertiaIntegrator: fmt::Debug {
    /// Evaluates the motion at `now` (milliseconds).
    fn advance(&mut self, now: u64) -> InertiaStep;

    /// Whether the motion has decayed to rest.
    fn is_complete(&self) -> bool;
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Motion {
    speed: f64,
    deceleration: f64,
    duration: f64,
}

impl Motion {
    const REST: Self = Self {
        speed: 0.0,
        deceleration: 0.0,
        duration: 0.0,
    };

    fn new(speed: f64, stop: Stop) -> Self {
        if speed.is_nan() || speed < REST_VELOCITY {
            return Self::REST;
        }
        let deceleration = match stop {
            Stop::Deceleration(d) => d,
            Stop::Distance(d) if d > 0.0 => speed * speed / (2.0 * d),
            Stop::Distance(_) => return Self::REST,
        };
        if deceleration <= 0.0 || !deceleration.is_finite() {
            return Self::REST;
        }
        Self {
            speed,
            deceleration,
            duration: speed / deceleration,
        }
    }

    /// Signed scalar motion; distance targets against the velocity stay at rest.
    fn signed(velocity: f64, stop: Stop) -> (f64, Self) {
        let sign = if velocity < 0.0 { -1.0 } else { 1.0 };
        let stop = match stop {
            Stop::Distance(d) if d * sign <= 0.0 => return (sign, Self::REST),
            Stop::Distance(d) => Stop::Distance(d.abs()),
            decel => decel,
        };
        (sign, Self::new(velocity.abs(), stop))
    }

    fn distance_at(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, self.duration);
        self.speed * t - 0.5 * self.deceleration * t * t
    }

    fn speed_at(&self, t: f64) -> f64 {
        if t >= self.duration {
            0.0
        } else {
            self.speed - self.deceleration * t.max(0.0)
        }
    }
}

/// Constant-deceleration [`InertiaIntegrator`].
#[derive(Clone, Debug, PartialEq)]
pub struct InertiaProcessor {
    origin: Point,
    start_time: u64,
    initial_radius: f64,
    direction: Vec2,
    translation: Motion,
    rotation_sign: f64,
    rotation: Motion,
    expansion_sign: f64,
    expansion: Motion,
    complete: bool,
}

impl InertiaProcessor {
    /// Creates a processor from resolved parameters.
    #[must_use]
    pub fn new(params: &InertiaParameters) -> Self {
        let (direction, translation) = match params.translation {
            Some(t) => {
                let speed = t.initial_velocity.hypot();
                if speed >= REST_VELOCITY {
                    (t.initial_velocity / speed, Motion::new(speed, t.stop))
                } else {
                    (Vec2::ZERO, Motion::REST)
                }
            }
            None => (Vec2::ZERO, Motion::REST),
        };
        let (rotation_sign, rotation) = params
            .rotation
            .map_or((1.0, Motion::REST), |r| Motion::signed(r.initial_velocity, r.stop));
        let (expansion_sign, expansion) = params
            .expansion
            .map_or((1.0, Motion::REST), |e| Motion::signed(e.initial_velocity, e.stop));
        let initial_radius = if params.initial_radius > 0.0 && params.initial_radius.is_finite() {
            params.initial_radius
        } else {
            1.0
        };

        let processor = Self {
            origin: params.origin,
            start_time: params.start_time,
            initial_radius,
            direction,
            translation,
            rotation_sign,
            rotation,
            expansion_sign,
            expansion,
            complete: false,
        };
        #[cfg(feature = "tracing")]
        tracing::debug!(duration_ms = processor.duration(), "inertia processor created");
        processor
    }

    /// Time in milliseconds until every axis rests.
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.translation
            .duration
            .max(self.rotation.duration)
            .max(self.expansion.duration)
    }

    /// Evaluates the motion `elapsed` milliseconds after inertia started.
    #[must_use]
    pub fn step_at(&self, elapsed: f64) -> InertiaStep {
        let expansion = self.expansion_sign * self.expansion.distance_at(elapsed);
        InertiaStep {
            origin: self.origin,
            translation: self.direction * self.translation.distance_at(elapsed),
            rotation: self.rotation_sign * self.rotation.distance_at(elapsed),
            expansion,
            scale: ((self.initial_radius + expansion) / self.initial_radius).max(MIN_SCALE),
            linear_velocity: self.direction * self.translation.speed_at(elapsed),
            angular_velocity: self.rotation_sign * self.rotation.speed_at(elapsed),
            expansion_velocity: self.expansion_sign * self.expansion.speed_at(elapsed),
            complete: elapsed >= self.duration(),
        }
    }
}

impl InertiaIntegrator for InertiaProcessor {
    fn advance(&mut self, now: u64) -> InertiaStep {
        let elapsed = now.saturating_sub(self.start_time) as f64;
        let step = self.step_at(elapsed);
        if step.complete && !self.complete {
            #[cfg(feature = "tracing")]
            tracing::debug!(elapsed_ms = elapsed, "inertia came to rest");
            self.complete = true;
        }
        step
    }

    fn is_complete(&self) -> bool {
        self.complete
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn empty_parameters_complete_immediately() {
        let params = InertiaParameters::new(Point::ZERO, 100);
        assert!(params.is_empty());
        let mut p = InertiaProcessor::new(&params);
        let step = p.advance(100);
        assert!(step.complete);
        assert!(p.is_complete());
        assert_eq!(step.translation, Vec2::ZERO);
        assert_eq!(step.scale, 1.0);
    }

    #[test]
    fn translation_decelerates_to_rest() {
        let mut params = InertiaParameters::new(Point::ZERO, 0);
        params.translation = Some(TranslationInertia {
            initial_velocity: Vec2::new(2.0, 0.0),
            stop: Stop::Deceleration(0.01),
        });
        let mut p = InertiaProcessor::new(&params);
        assert!(approx(p.duration(), 200.0));

        let mid = p.advance(100);
        assert!(!mid.complete);
        // 2 * 100 - 0.5 * 0.01 * 100^2
        assert!(approx(mid.translation.x, 150.0));
        assert!(approx(mid.linear_velocity.x, 1.0));

        let end = p.advance(500);
        assert!(end.complete);
        assert!(approx(end.translation.x, 200.0));
        assert_eq!(end.linear_velocity, Vec2::ZERO);
    }

    #[test]
    fn displacement_target_is_reached_exactly() {
        let mut params = InertiaParameters::new(Point::ZERO, 10);
        params.translation = Some(TranslationInertia {
            initial_velocity: Vec2::new(0.0, -3.0),
            stop: Stop::Distance(90.0),
        });
        let mut p = InertiaProcessor::new(&params);
        let end = p.advance(10_000);
        assert!(end.complete);
        assert!(approx(end.translation.y, -90.0));
        assert!(approx(end.translation.x, 0.0));
    }

    #[test]
    fn rotation_target_against_velocity_does_not_move() {
        let mut params = InertiaParameters::new(Point::ZERO, 0);
        params.rotation = Some(AxisInertia {
            initial_velocity: 0.01,
            stop: Stop::Distance(-1.0),
        });
        let mut p = InertiaProcessor::new(&params);
        let step = p.advance(50);
        assert!(step.complete);
        assert_eq!(step.rotation, 0.0);
    }

    #[test]
    fn expansion_scales_against_initial_radius() {
        let mut params = InertiaParameters::new(Point::new(5.0, 5.0), 0);
        params.initial_radius = 10.0;
        params.expansion = Some(AxisInertia {
            initial_velocity: 1.0,
            stop: Stop::Distance(10.0),
        });
        let mut p = InertiaProcessor::new(&params);
        let end = p.advance(1_000);
        assert!(approx(end.expansion, 10.0));
        assert!(approx(end.scale, 2.0));
        // The origin stays fixed under pure expansion.
        let moved = end.to_affine() * Point::new(5.0, 5.0);
        assert!(approx(moved.x, 5.0) && approx(moved.y, 5.0));
    }

    #[test]
    fn slow_axes_are_at_rest() {
        let mut params = InertiaParameters::new(Point::ZERO, 0);
        params.translation = Some(TranslationInertia {
            initial_velocity: Vec2::new(REST_VELOCITY / 2.0, 0.0),
            stop: Stop::Deceleration(1.0),
        });
        let p = InertiaProcessor::new(&params);
        assert_eq!(p.duration(), 0.0);
    }

    #[test]
    fn advancing_before_start_time_is_clamped() {
        let mut params = InertiaParameters::new(Point::ZERO, 1_000);
        params.rotation = Some(AxisInertia {
            initial_velocity: 0.001,
            stop: Stop::Deceleration(0.00001),
        });
        let mut p = InertiaProcessor::new(&params);
        let step = p.advance(500);
        assert_eq!(step.rotation, 0.0);
        assert!(!step.complete);
    }
}
