// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property tests for the manipulation engine.
//!
//! 1. Components excluded by the modes never appear in a reported delta, nor
//!    in the cumulative transform, with or without a pivot.
//! 2. The cumulative transform equals the composition of every delta.

use core::f64::consts::TAU;

use kurbo::{Affine, Point, Vec2};
use proptest::prelude::*;
use understory_manipulation::{
    ManipulationConfig, ManipulationDelta, ManipulationLogic, ManipulationModes, ManipulationPivot,
};

/// One frame of a rigid contact arrangement: center, orientation and radius.
#[derive(Clone, Copy, Debug)]
struct Pose {
    center: Point,
    angle: f64,
    radius: f64,
}

fn pose_strategy() -> impl Strategy<Value = Pose> {
    (-200.0f64..200.0, -200.0f64..200.0, -3.0f64..3.0, 10.0f64..60.0).prop_map(
        |(x, y, angle, radius)| Pose {
            center: Point::new(x, y),
            angle,
            radius,
        },
    )
}

/// `n` contacts evenly spread on a circle.
fn contacts(pose: Pose, n: u32) -> Vec<(u32, Point)> {
    (0..n)
        .map(|i| {
            let a = pose.angle + TAU * f64::from(i) / f64::from(n);
            let offset = Vec2::new(a.cos(), a.sin()) * pose.radius;
            (i, pose.center + offset)
        })
        .collect()
}

fn pivot_strategy() -> impl Strategy<Value = ManipulationPivot> {
    (-200.0f64..200.0, -200.0f64..200.0, 0.0f64..50.0).prop_map(|(x, y, radius)| {
        ManipulationPivot::new(Point::new(x, y), radius).unwrap()
    })
}

/// Allowed rounding error for a value produced by `transform`.
fn tolerance(transform: &ManipulationDelta) -> f64 {
    let magnitude = transform
        .to_affine()
        .as_coeffs()
        .iter()
        .fold(1.0_f64, |m, c| m.max(c.abs()));
    1e-9 * magnitude * 1000.0
}

fn assert_masked_translation_untouched(modes: ManipulationModes, cumulative: &ManipulationDelta) {
    let tol = tolerance(cumulative);
    if !modes.contains(ManipulationModes::TRANSLATE_X) {
        assert!(cumulative.translation.x.abs() <= tol, "{cumulative:?}");
    }
    if !modes.contains(ManipulationModes::TRANSLATE_Y) {
        assert!(cumulative.translation.y.abs() <= tol, "{cumulative:?}");
    }
}

fn assert_affine_close(a: Affine, b: Affine) {
    // Tolerance grows with the magnitude of the coefficients.
    let magnitude = a
        .as_coeffs()
        .iter()
        .chain(b.as_coeffs().iter())
        .fold(1.0_f64, |m, c| m.max(c.abs()));
    for p in [Point::ZERO, Point::new(100.0, -50.0), Point::new(-30.0, 80.0)] {
        let (pa, pb) = (a * p, b * p);
        assert!(
            (pa - pb).hypot() <= 1e-9 * magnitude * 500.0,
            "{pa:?} != {pb:?}"
        );
    }
}

proptest! {
    #[test]
    fn excluded_components_stay_identity(
        bits in 0u8..16,
        n in 1u32..4,
        poses in prop::collection::vec(pose_strategy(), 2..10),
    ) {
        let modes = ManipulationModes::try_from_bits(bits).unwrap();
        let mut logic = ManipulationLogic::new(&ManipulationConfig::default());
        logic.set_modes(modes);
        logic.seed(&contacts(poses[0], n), 0);

        for (t, pose) in poses.iter().enumerate().skip(1) {
            let frame = logic.process(&contacts(*pose, n), 16 * t as u64);
            let d = frame.delta;
            if !modes.contains(ManipulationModes::TRANSLATE_X) {
                prop_assert_eq!(d.translation.x, 0.0);
            }
            if !modes.contains(ManipulationModes::TRANSLATE_Y) {
                prop_assert_eq!(d.translation.y, 0.0);
            }
            if !modes.contains(ManipulationModes::ROTATE) {
                prop_assert_eq!(d.rotation, 0.0);
                prop_assert_eq!(frame.cumulative.rotation, 0.0);
                prop_assert_eq!(frame.velocities.angular, 0.0);
            }
            if !modes.contains(ManipulationModes::SCALE) {
                prop_assert_eq!(d.scale, 1.0);
                prop_assert_eq!(d.expansion, 0.0);
                prop_assert_eq!(frame.cumulative.scale, 1.0);
            }
            if modes.is_empty() {
                prop_assert!(d.is_identity());
            }
            assert_masked_translation_untouched(modes, &frame.cumulative);
        }
    }

    #[test]
    fn pivot_respects_masked_translation(
        bits in 0u8..16,
        n in 1u32..4,
        pivot in pivot_strategy(),
        poses in prop::collection::vec(pose_strategy(), 2..10),
    ) {
        let modes = ManipulationModes::try_from_bits(bits).unwrap();
        let mut logic = ManipulationLogic::new(&ManipulationConfig::default());
        logic.set_modes(modes);
        logic.set_pivot(Some(pivot));
        logic.seed(&contacts(poses[0], n), 0);

        let mut composed = Affine::IDENTITY;
        for (t, pose) in poses.iter().enumerate().skip(1) {
            let frame = logic.process(&contacts(*pose, n), 16 * t as u64);
            composed = frame.delta.to_affine() * composed;
            assert_affine_close(frame.cumulative.to_affine(), composed);
            assert_masked_translation_untouched(modes, &frame.cumulative);

            // The pivot rides on the content, so it only moves along free axes.
            let center = logic.pivot().unwrap().center();
            let tol = tolerance(&frame.cumulative);
            if !modes.contains(ManipulationModes::TRANSLATE_X) {
                prop_assert!((center.x - pivot.center().x).abs() <= tol);
            }
            if !modes.contains(ManipulationModes::TRANSLATE_Y) {
                prop_assert!((center.y - pivot.center().y).abs() <= tol);
            }
        }
    }

    #[test]
    fn cumulative_is_composition_of_deltas(
        bits in 0u8..16,
        n in 1u32..4,
        poses in prop::collection::vec(pose_strategy(), 2..10),
    ) {
        let modes = ManipulationModes::try_from_bits(bits).unwrap();
        let mut logic = ManipulationLogic::new(&ManipulationConfig::default());
        logic.set_modes(modes);
        logic.seed(&contacts(poses[0], n), 0);

        let mut composed = Affine::IDENTITY;
        for (t, pose) in poses.iter().enumerate().skip(1) {
            let frame = logic.process(&contacts(*pose, n), 16 * t as u64);
            composed = frame.delta.to_affine() * composed;
            assert_affine_close(frame.cumulative.to_affine(), composed);
        }
    }

    #[test]
    fn unconstrained_contacts_track_the_pose(
        n in 2u32..4,
        poses in prop::collection::vec(pose_strategy(), 2..6),
    ) {
        let mut logic = ManipulationLogic::new(&ManipulationConfig::default());
        logic.seed(&contacts(poses[0], n), 0);
        for (t, pose) in poses.iter().enumerate().skip(1) {
            let frame = logic.process(&contacts(*pose, n), 16 * t as u64);
            // Every contact lands where the cumulative transform maps its start.
            let start = contacts(poses[0], n);
            let now = contacts(*pose, n);
            for ((_, from), (_, to)) in start.iter().zip(&now) {
                let mapped = frame.cumulative.to_affine() * *from;
                prop_assert!((mapped - *to).hypot() < 1e-6 * (1.0 + to.to_vec2().hypot()));
            }
        }
    }
}
