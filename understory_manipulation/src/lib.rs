// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_manipulation --heading-base-level=0

//! Understory Manipulation: multi-touch translate, rotate and scale gestures.
//!
//! One or more contacts on an element are aggregated into a single
//! continuous similarity transform. The gesture is reported to the host as a
//! fixed sequence of messages, and once the last contact lifts it may keep
//! moving under decelerating inertia.
//!
//! - [`logic`]: [`ManipulationLogic`], the numeric core. Usable on its own if
//!   you only need deltas from contact positions.
//! - [`events`]: the lifecycle messages and the commands handlers answer with.
//! - [`host`]: [`ManipulationHandler`] and [`ManipulationHost`], the seam to
//!   the element tree, the contact sources and application handlers.
//! - [`device`]: the per-element state machine.
//! - [`Manipulations`]: the registry of live gestures and its entry points.
//!
//! Inertia behaviors and the integrator live in [`understory_inertia`].
//!
//! ## Coordinates and time
//!
//! Contact positions come from the host in root coordinates and are mapped
//! into the gesture's container with [`ManipulationHost::root_to_container`].
//! Angles are radians. Timestamps are `u64` milliseconds supplied by the
//! host; velocities are per millisecond.
//!
//! ## Driving a manipulation
//!
//! ```rust
//! use hashbrown::HashMap;
//! use kurbo::{Point, Vec2};
//! use understory_manipulation::{
//!     DeltaResponse, ManipulationDeltaEvent, ManipulationHandler, ManipulationHost,
//!     ManipulationModes, ManipulationStarting, ManipulationCommand, Manipulations,
//! };
//!
//! #[derive(Default)]
//! struct Canvas {
//!     contacts: HashMap<u32, Point>,
//!     offset: Vec2,
//! }
//!
//! impl ManipulationHandler<u64> for Canvas {
//!     fn manipulation_starting(
//!         &mut self,
//!         _element: u64,
//!         event: &mut ManipulationStarting<u64>,
//!     ) -> ManipulationCommand {
//!         event.mode = ManipulationModes::TRANSLATE;
//!         ManipulationCommand::Continue
//!     }
//!
//!     fn manipulation_delta(&mut self, _element: u64, event: &ManipulationDeltaEvent) -> DeltaResponse {
//!         self.offset += event.delta.translation;
//!         DeltaResponse::CONTINUE
//!     }
//! }
//!
//! impl ManipulationHost<u64, u32> for Canvas {
//!     fn is_manipulation_enabled(&self, _element: u64) -> bool {
//!         true
//!     }
//!
//!     fn manipulator_position(&self, contact: u32) -> Option<Point> {
//!         self.contacts.get(&contact).copied()
//!     }
//! }
//!
//! let mut canvas = Canvas::default();
//! let mut manipulations: Manipulations<u64, u32> = Manipulations::new();
//!
//! canvas.contacts.insert(7, Point::new(0.0, 0.0));
//! manipulations.add_manipulator(&mut canvas, 1, 7, 0).unwrap();
//!
//! canvas.contacts.insert(7, Point::new(10.0, 5.0));
//! manipulations.manipulator_updated(16);
//! manipulations.on_frame(&mut canvas, 16);
//! assert_eq!(canvas.offset, Vec2::new(10.0, 5.0));
//!
//! manipulations.remove_manipulator(&mut canvas, 1, 7, 20);
//! assert!(!manipulations.is_manipulation_active(1));
//! assert!(!manipulations.wants_frames());
//! ```
//!
//! ## Features
//!
//! - `std` (default) / `libm`: select Kurbo's float backend.
//! - `tracing`: log device lifecycle transitions.
//!
//! This crate is `no_std`.

#![no_std]

extern crate alloc;

mod config;
mod context;
mod delta;
pub mod device;
mod error;
pub mod events;
pub mod host;
pub mod logic;
mod mode;
mod pivot;

pub use config::{
    DEFAULT_EXPANSION_DECELERATION, DEFAULT_ROTATION_DECELERATION,
    DEFAULT_TRANSLATION_DECELERATION, ManipulationConfig,
};
pub use context::Manipulations;
pub use delta::{ManipulationDelta, ManipulationVelocities};
pub use device::{DevicePhase, FrameState, ManipulationDevice};
pub use error::ManipulationError;
pub use events::{
    DeltaResponse, FeedbackHandling, InertiaParameter, ManipulationBoundaryFeedback,
    ManipulationCommand, ManipulationCompleted, ManipulationDeltaEvent,
    ManipulationInertiaStarting, ManipulationParameter, ManipulationStarted,
    ManipulationStarting,
};
pub use host::{ManipulationHandler, ManipulationHost};
pub use logic::{ManipulationFrame, ManipulationLogic};
pub use mode::ManipulationModes;
pub use pivot::ManipulationPivot;
