// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The seam between the manipulation engine and the host toolkit.
//!
//! The host owns the element tree, the contact sources and the application
//! handlers. [`Manipulations`](crate::Manipulations) borrows it for the
//! duration of each call instead of holding on to any of it.

use alloc::boxed::Box;

use kurbo::{Affine, Point};
use understory_inertia::{InertiaIntegrator, InertiaParameters, InertiaProcessor};

use crate::events::{
    DeltaResponse, FeedbackHandling, ManipulationBoundaryFeedback, ManipulationCommand,
    ManipulationCompleted, ManipulationDeltaEvent, ManipulationInertiaStarting,
    ManipulationStarted, ManipulationStarting,
};

/// Receives the lifecycle messages for manipulated elements.
///
/// Every method defaults to letting the gesture continue unchanged.
pub trait ManipulationHandler<K> {
    /// The first manipulator attached to `element`; configure the gesture or
    /// cancel it.
    fn manipulation_starting(
        &mut self,
        element: K,
        event: &mut ManipulationStarting<K>,
    ) -> ManipulationCommand {
        let _ = (element, event);
        ManipulationCommand::Continue
    }

    /// The gesture is live.
    fn manipulation_started(
        &mut self,
        element: K,
        event: &ManipulationStarted,
    ) -> ManipulationCommand {
        let _ = (element, event);
        ManipulationCommand::Continue
    }

    /// A frame of movement.
    fn manipulation_delta(&mut self, element: K, event: &ManipulationDeltaEvent) -> DeltaResponse {
        let _ = (element, event);
        DeltaResponse::CONTINUE
    }

    /// Contact ended with inertia requested; configure the behaviors.
    fn manipulation_inertia_starting(
        &mut self,
        element: K,
        event: &mut ManipulationInertiaStarting,
    ) -> ManipulationCommand {
        let _ = (element, event);
        ManipulationCommand::Continue
    }

    /// A delta handler reported unused movement.
    fn manipulation_boundary_feedback(
        &mut self,
        element: K,
        event: &ManipulationBoundaryFeedback,
    ) -> FeedbackHandling {
        let _ = (element, event);
        FeedbackHandling::Ignored
    }

    /// The gesture is over.
    ///
    /// Returning [`ManipulationCommand::Cancel`] outside of inertia notifies
    /// the remaining manipulators with `cancel = true`.
    fn manipulation_completed(
        &mut self,
        element: K,
        event: &ManipulationCompleted,
    ) -> ManipulationCommand {
        let _ = (element, event);
        ManipulationCommand::Continue
    }
}

/// The environment a manipulation runs in.
///
/// `K` identifies elements, `P` identifies manipulators (contacts).
pub trait ManipulationHost<K, P>: ManipulationHandler<K> {
    /// Whether `element` has opted in to manipulation.
    fn is_manipulation_enabled(&self, element: K) -> bool;

    /// Maps root coordinates into `container`'s space.
    fn root_to_container(&self, container: K) -> Affine {
        let _ = container;
        Affine::IDENTITY
    }

    /// Current position of `manipulator` in root coordinates.
    ///
    /// `None` leaves the manipulator out of the current frame.
    fn manipulator_position(&self, manipulator: P) -> Option<Point>;

    /// `manipulator` is no longer part of a manipulation.
    ///
    /// With `cancel`, the contact should fall back to ordinary input.
    fn manipulation_ended(&mut self, manipulator: P, cancel: bool) {
        let _ = (manipulator, cancel);
    }

    /// Creates the integrator that drives inertia.
    fn create_integrator(&mut self, params: &InertiaParameters) -> Box<dyn InertiaIntegrator> {
        Box::new(InertiaProcessor::new(params))
    }
}
