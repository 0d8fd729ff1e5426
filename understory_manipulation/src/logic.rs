// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The numeric core of a manipulation.
//!
//! [`ManipulationLogic`] turns successive sets of contact positions into
//! per-frame deltas, a running cumulative transform and sampled velocities.
//! After contact ends it drives an [`InertiaIntegrator`] and reports the
//! integrator's motion through the same frame shape.
//!
//! Only manipulators present in both the previous and the current frame
//! contribute to a delta, so contacts can come and go mid-gesture without the
//! content jumping.
//!
//! ## Example
//!
//! ```
//! use kurbo::Point;
//! use understory_manipulation::{ManipulationConfig, ManipulationLogic};
//!
//! let mut logic = ManipulationLogic::new(&ManipulationConfig::default());
//! logic.seed(&[(1_u32, Point::new(0.0, 0.0)), (2, Point::new(10.0, 0.0))], 0);
//!
//! // Both contacts move apart symmetrically.
//! let frame = logic.process(&[(1, Point::new(-5.0, 0.0)), (2, Point::new(15.0, 0.0))], 16);
//! assert!((frame.delta.scale - 2.0).abs() < 1e-9);
//! assert!(frame.delta.translation.hypot() < 1e-9);
//! assert!(frame.delta.rotation.abs() < 1e-9);
//! ```

use alloc::boxed::Box;
use core::fmt;

use kurbo::{Affine, Point, Vec2};
use smallvec::SmallVec;
use understory_inertia::{InertiaIntegrator, InertiaStep};

use crate::config::ManipulationConfig;
use crate::delta::{ManipulationDelta, ManipulationVelocities};
use crate::mode::ManipulationModes;
use crate::pivot::ManipulationPivot;

/// Lengths below this carry no usable direction.
const DEGENERATE: f64 = 1e-9;

/// Output of one processed frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ManipulationFrame {
    /// Current manipulation origin: the contact centroid, or the moving
    /// inertia anchor.
    pub origin: Point,
    /// Change since the previous frame, already masked by the modes.
    pub delta: ManipulationDelta,
    /// Composition of every delta since the gesture began.
    pub cumulative: ManipulationDelta,
    /// Velocities at this frame.
    pub velocities: ManipulationVelocities,
    /// Whether the frame was produced by the inertia integrator.
    pub is_inertial: bool,
    /// Whether inertia has come to rest with this frame.
    pub inertia_complete: bool,
}

#[derive(Clone, Copy, Debug)]
struct Sample {
    time: u64,
    elapsed: u64,
    translation: Vec2,
    rotation: f64,
    expansion: f64,
}

/// Inertial motion already reported.
#[derive(Clone, Copy, Debug)]
struct Progress {
    translation: Vec2,
    rotation: f64,
    scale: f64,
    expansion: f64,
}

impl Progress {
    const START: Self = Self {
        translation: Vec2::ZERO,
        rotation: 0.0,
        scale: 1.0,
        expansion: 0.0,
    };
}

impl From<&InertiaStep> for Progress {
    fn from(step: &InertiaStep) -> Self {
        Self {
            translation: step.translation,
            rotation: step.rotation,
            scale: step.scale,
            expansion: step.expansion,
        }
    }
}

#[derive(Debug)]
struct Inertia {
    integrator: Box<dyn InertiaIntegrator>,
    anchor: Point,
    reported: Progress,
    velocities: ManipulationVelocities,
    complete: bool,
}

/// Computes manipulation transforms from contact positions.
///
/// `P` identifies a manipulator. Positions are expected in container space.
pub struct ManipulationLogic<P> {
    modes: ManipulationModes,
    pivot: Option<ManipulationPivot>,
    single_manipulator_enabled: bool,
    positions: SmallVec<[(P, Point); 4]>,
    origin: Point,
    cumulative: ManipulationDelta,
    radius: f64,
    samples: SmallVec<[Sample; 16]>,
    last_time: Option<u64>,
    velocity_window: u64,
    max_samples: usize,
    feedback: Vec2,
    inertia: Option<Inertia>,
}

impl<P: fmt::Debug> fmt::Debug for ManipulationLogic<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManipulationLogic")
            .field("modes", &self.modes)
            .field("pivot", &self.pivot)
            .field("single_manipulator_enabled", &self.single_manipulator_enabled)
            .field("positions", &self.positions)
            .field("origin", &self.origin)
            .field("cumulative", &self.cumulative)
            .field("samples", &self.samples.len())
            .field("feedback", &self.feedback)
            .field("inertia", &self.inertia)
            .finish_non_exhaustive()
    }
}

impl<P: Copy + PartialEq> ManipulationLogic<P> {
    /// Creates an idle engine.
    #[must_use]
    pub fn new(config: &ManipulationConfig) -> Self {
        Self {
            modes: ManipulationModes::ALL,
            pivot: None,
            single_manipulator_enabled: true,
            positions: SmallVec::new(),
            origin: Point::ZERO,
            cumulative: ManipulationDelta::IDENTITY,
            radius: 0.0,
            samples: SmallVec::new(),
            last_time: None,
            velocity_window: config.velocity_window,
            max_samples: config.max_velocity_samples.max(1),
            feedback: Vec2::ZERO,
            inertia: None,
        }
    }

    /// Components reported deltas may contain.
    #[must_use]
    pub fn modes(&self) -> ManipulationModes {
        self.modes
    }

    /// Sets the components reported deltas may contain.
    pub fn set_modes(&mut self, modes: ManipulationModes) {
        self.modes = modes;
    }

    /// Current pivot, moved along with the content.
    #[must_use]
    pub fn pivot(&self) -> Option<ManipulationPivot> {
        self.pivot
    }

    /// Sets or clears the pivot.
    ///
    /// Before any motion has been reported, the cumulative transform is
    /// re-anchored at the new pivot center.
    pub fn set_pivot(&mut self, pivot: Option<ManipulationPivot>) {
        self.pivot = pivot;
        if self.cumulative.is_identity() {
            self.cumulative = ManipulationDelta::identity_at(self.anchor_origin());
        }
    }

    /// Whether a single contact produces deltas.
    #[must_use]
    pub fn single_manipulator_enabled(&self) -> bool {
        self.single_manipulator_enabled
    }

    /// Enables or disables single-contact manipulation.
    pub fn set_single_manipulator_enabled(&mut self, enabled: bool) {
        self.single_manipulator_enabled = enabled;
    }

    /// Starts a gesture at the given positions.
    ///
    /// The pivot center, or the centroid without a pivot, becomes the origin
    /// of the cumulative transform; history and inertia are discarded.
    pub fn seed(&mut self, positions: &[(P, Point)], now: u64) {
        self.reseed(positions);
        self.origin = centroid(self.positions.iter().map(|&(_, p)| p)).unwrap_or(Point::ZERO);
        self.cumulative = ManipulationDelta::identity_at(self.anchor_origin());
        self.samples.clear();
        self.last_time = Some(now);
        self.inertia = None;
    }

    /// Replaces the baseline positions without reporting any motion.
    ///
    /// Used when the coordinate space itself is swapped, for example when a
    /// new container is chosen.
    pub fn reseed(&mut self, positions: &[(P, Point)]) {
        self.positions = positions
            .iter()
            .map(|&(id, p)| (id, p + self.feedback))
            .collect();
        if let Some(radius) = mean_radius(&self.positions) {
            self.radius = radius;
        }
    }

    /// Starts tracking `id` from `position` without touching the baseline of
    /// the other manipulators.
    pub fn add_manipulator(&mut self, id: P, position: Point) {
        if !self.positions.iter().any(|&(other, _)| other == id) {
            self.positions.push((id, position + self.feedback));
        }
    }

    /// Forgets the last position of `id`.
    ///
    /// A manipulator that is later attached again then starts from a fresh
    /// baseline instead of jumping from where it left.
    pub fn remove_manipulator(&mut self, id: P) {
        self.positions.retain(|(other, _)| *other != id);
    }

    /// Current manipulation origin.
    #[must_use]
    pub fn origin(&self) -> Point {
        self.origin
    }

    /// Composition of every delta reported so far.
    #[must_use]
    pub fn cumulative(&self) -> ManipulationDelta {
        self.cumulative
    }

    /// Mean distance of the contacts from their centroid, as last seen with
    /// two or more contacts.
    #[must_use]
    pub fn mean_radius(&self) -> f64 {
        self.radius
    }

    /// Velocities over the sampling window, or the integrator's during inertia.
    #[must_use]
    pub fn velocities(&self) -> ManipulationVelocities {
        if let Some(inertia) = &self.inertia {
            return inertia.velocities;
        }
        let elapsed: u64 = self.samples.iter().map(|s| s.elapsed).sum();
        if elapsed == 0 {
            return ManipulationVelocities::ZERO;
        }
        let dt = elapsed as f64;
        let mut v = ManipulationVelocities::ZERO;
        for s in &self.samples {
            v.linear += s.translation;
            v.angular += s.rotation;
            v.expansion += s.expansion;
        }
        ManipulationVelocities {
            linear: v.linear / dt,
            angular: v.angular / dt,
            expansion: v.expansion / dt,
        }
    }

    /// Adds unused movement the host compensates for by shifting the container.
    pub fn add_boundary_feedback(&mut self, unused: Vec2) {
        self.feedback += unused;
    }

    /// Drops any boundary feedback compensation.
    pub fn clear_boundary_feedback(&mut self) {
        self.feedback = Vec2::ZERO;
    }

    /// The function applied to raw positions before they enter the engine.
    #[must_use]
    pub fn boundary_compensation(&self) -> Affine {
        Affine::translate(self.feedback)
    }

    /// Computes the frame for the given raw positions.
    pub fn process(&mut self, positions: &[(P, Point)], now: u64) -> ManipulationFrame {
        let current: SmallVec<[(P, Point); 4]> = positions
            .iter()
            .map(|&(id, p)| (id, p + self.feedback))
            .collect();
        let mut delta = self.raw_delta(&current);
        if let Some(anchor) = self.pinned_anchor() {
            delta = delta.reanchored(anchor);
        }
        let delta = delta.masked(self.modes);
        self.apply(delta, now);

        if let Some(c) = centroid(current.iter().map(|&(_, p)| p)) {
            self.origin = c;
        }
        if let Some(radius) = mean_radius(&current) {
            self.radius = radius;
        }
        self.positions = current;

        ManipulationFrame {
            origin: self.origin,
            delta,
            cumulative: self.cumulative,
            velocities: self.velocities(),
            is_inertial: false,
            inertia_complete: false,
        }
    }

    /// Hands the gesture over to an integrator.
    ///
    /// Contact positions and boundary feedback are dropped; inertia is anchored
    /// at the current origin, or at the pinned content point when translation
    /// is masked.
    pub fn begin_inertia(&mut self, integrator: Box<dyn InertiaIntegrator>) {
        self.positions.clear();
        self.feedback = Vec2::ZERO;
        self.inertia = Some(Inertia {
            integrator,
            anchor: self.pinned_anchor().unwrap_or(self.origin),
            reported: Progress::START,
            velocities: self.velocities(),
            complete: false,
        });
    }

    /// Whether an integrator is driving the gesture.
    #[must_use]
    pub fn is_inertia_active(&self) -> bool {
        self.inertia.is_some()
    }

    /// Advances inertia to `now`; `None` when inertia is not active.
    pub fn step_inertia(&mut self, now: u64) -> Option<ManipulationFrame> {
        let inertia = self.inertia.as_mut()?;
        let step = inertia.integrator.advance(now);
        let last = inertia.reported;
        let delta = ManipulationDelta {
            translation: step.translation - last.translation,
            rotation: step.rotation - last.rotation,
            scale: if last.scale > 0.0 {
                step.scale / last.scale
            } else {
                1.0
            },
            expansion: step.expansion - last.expansion,
            origin: inertia.anchor,
        }
        .masked(self.modes);

        inertia.reported = Progress::from(&step);
        inertia.anchor += delta.translation;
        inertia.complete = step.complete;
        inertia.velocities = ManipulationVelocities {
            linear: step.linear_velocity,
            angular: step.angular_velocity,
            expansion: step.expansion_velocity,
        }
        .masked(self.modes);
        let velocities = inertia.velocities;
        self.origin = inertia.anchor;
        self.cumulative = self.cumulative.then(&delta);
        if let Some(pivot) = self.pivot {
            self.pivot = Some(pivot.transformed(delta.to_affine()));
        }

        Some(ManipulationFrame {
            origin: self.origin,
            delta,
            cumulative: self.cumulative,
            velocities,
            is_inertial: true,
            inertia_complete: step.complete,
        })
    }

    /// Origin a fresh cumulative transform is anchored at.
    fn anchor_origin(&self) -> Point {
        self.pivot.map_or(self.origin, |pivot| pivot.center())
    }

    /// Content point rotation and scale must keep fixed while a translation
    /// axis is masked.
    ///
    /// That is the pivot, or else wherever the cumulative origin has been
    /// carried to. Anchoring there keeps the masked axes of the cumulative
    /// translation unchanged.
    fn pinned_anchor(&self) -> Option<Point> {
        if self.modes.contains(ManipulationModes::TRANSLATE) {
            return None;
        }
        Some(match self.pivot {
            Some(pivot) => pivot.center(),
            None => self.cumulative.origin + self.cumulative.translation,
        })
    }

    fn apply(&mut self, delta: ManipulationDelta, now: u64) {
        self.cumulative = self.cumulative.then(&delta);
        if let Some(pivot) = self.pivot {
            self.pivot = Some(pivot.transformed(delta.to_affine()));
        }

        let elapsed = self.last_time.map_or(0, |t| now.saturating_sub(t));
        self.last_time = Some(now);
        if self.samples.len() >= self.max_samples {
            self.samples.remove(0);
        }
        self.samples.push(Sample {
            time: now,
            elapsed,
            translation: delta.translation,
            rotation: delta.rotation,
            expansion: delta.expansion,
        });
        let horizon = now.saturating_sub(self.velocity_window);
        self.samples.retain(|s| s.time >= horizon);
    }

    fn raw_delta(&self, current: &[(P, Point)]) -> ManipulationDelta {
        let pairs: SmallVec<[(Point, Point); 4]> = self
            .positions
            .iter()
            .filter_map(|&(id, prev)| {
                current
                    .iter()
                    .find(|&&(other, _)| other == id)
                    .map(|&(_, cur)| (prev, cur))
            })
            .collect();

        match pairs.as_slice() {
            [] => ManipulationDelta::identity_at(self.origin),
            [(prev, _)] if !self.single_manipulator_enabled => {
                ManipulationDelta::identity_at(*prev)
            }
            [(prev, cur)] => self.single_delta(*prev, *cur),
            _ => multi_delta(&pairs),
        }
    }

    /// One contact drags the content; with a pivot it also swings it around
    /// the pivot center, and the translation is whatever the swing leaves.
    fn single_delta(&self, prev: Point, cur: Point) -> ManipulationDelta {
        let Some(pivot) = self.pivot else {
            return ManipulationDelta {
                translation: cur - prev,
                ..ManipulationDelta::identity_at(prev)
            };
        };
        let center = pivot.center();
        let from = prev - center;
        let to = cur - center;
        let distance = from.hypot();
        let mut delta = ManipulationDelta::identity_at(center);
        if distance > DEGENERATE && to.hypot() > DEGENERATE {
            delta.rotation = angle_between(from, to) * pivot.damping(distance);
        }
        delta.translation = cur - delta.to_affine() * prev;
        delta
    }
}

/// Similarity fit between two sets of corresponding points.
fn multi_delta(pairs: &[(Point, Point)]) -> ManipulationDelta {
    let (Some(c0), Some(c1)) = (
        centroid(pairs.iter().map(|&(p, _)| p)),
        centroid(pairs.iter().map(|&(_, q)| q)),
    ) else {
        return ManipulationDelta::IDENTITY;
    };

    let mut cross = 0.0;
    let mut dot = 0.0;
    let mut r0 = 0.0;
    let mut r1 = 0.0;
    for &(p, q) in pairs {
        let a = p - c0;
        let b = q - c1;
        cross += a.cross(b);
        dot += a.dot(b);
        r0 += a.hypot();
        r1 += b.hypot();
    }
    let n = pairs.len() as f64;
    r0 /= n;
    r1 /= n;

    let (scale, expansion) = if r0 > DEGENERATE && r1 > DEGENERATE {
        (r1 / r0, r1 - r0)
    } else {
        (1.0, 0.0)
    };
    ManipulationDelta {
        translation: c1 - c0,
        rotation: Vec2::new(dot, cross).atan2(),
        scale,
        expansion,
        origin: c0,
    }
}

/// Signed angle from `a` to `b`, in `(-π, π]`.
fn angle_between(a: Vec2, b: Vec2) -> f64 {
    Vec2::new(a.dot(b), a.cross(b)).atan2()
}

fn centroid(points: impl Iterator<Item = Point>) -> Option<Point> {
    let mut sum = Vec2::ZERO;
    let mut count = 0_usize;
    for p in points {
        sum += p.to_vec2();
        count += 1;
    }
    (count > 0).then(|| (sum / count as f64).to_point())
}

fn mean_radius<P>(positions: &[(P, Point)]) -> Option<f64> {
    if positions.len() < 2 {
        return None;
    }
    let c = centroid(positions.iter().map(|&(_, p)| p))?;
    let total: f64 = positions.iter().map(|&(_, p)| (p - c).hypot()).sum();
    Some(total / positions.len() as f64)
}
