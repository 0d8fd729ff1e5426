// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_inertia --heading-base-level=0

//! Understory Inertia: decelerating motion after a touch manipulation ends.
//!
//! When the last contact of a manipulation lifts, content can keep moving
//! with the velocity it had and slow down until it rests. This crate provides
//! the two halves of that:
//!
//! - [`behavior`]: per-axis configuration objects
//!   ([`InertiaTranslationBehavior`], [`InertiaRotationBehavior`],
//!   [`InertiaExpansionBehavior`]) seeded from measured velocities. Each one
//!   stops either at a deceleration rate or at a target distance, never both.
//! - [`processor`]: the [`InertiaIntegrator`] trait and
//!   [`InertiaProcessor`], a closed-form constant-deceleration integrator.
//!
//! Units follow the input they are derived from: distances in the container's
//! units, angles in radians, time in milliseconds.
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::{Point, Vec2};
//! use understory_inertia::{
//!     InertiaIntegrator, InertiaParameters, InertiaProcessor, InertiaTranslationBehavior,
//! };
//!
//! // Contact lifted while moving right at 2 units/ms.
//! let mut translation = InertiaTranslationBehavior::from_measured(Vec2::new(2.0, 0.0));
//! translation.set_desired_displacement(300.0).unwrap();
//!
//! let mut params = InertiaParameters::new(Point::ZERO, 1_000);
//! params.translation = translation.resolve(0.001);
//!
//! let mut inertia = InertiaProcessor::new(&params);
//! let step = inertia.advance(1_016);
//! assert!(step.translation.x > 0.0);
//!
//! // Long after the motion has decayed, the target is reached exactly.
//! let end = inertia.advance(60_000);
//! assert!(end.complete);
//! assert!((end.translation.x - 300.0).abs() < 1e-9);
//! ```
//!
//! ## Features
//!
//! - `std` (default) / `libm`: select Kurbo's float backend.
//! - `tracing`: log integrator lifecycle events.
//!
//! This crate is `no_std`.

#![no_std]

extern crate alloc;

pub mod behavior;
mod error;
pub mod processor;

pub use behavior::{
    InertiaExpansionBehavior, InertiaRotationBehavior, InertiaTranslationBehavior, Terminal,
};
pub use error::InertiaError;
pub use processor::{
    AxisInertia, InertiaIntegrator, InertiaParameters, InertiaProcessor, InertiaStep, MIN_SCALE,
    REST_VELOCITY, Stop, TranslationInertia,
};
