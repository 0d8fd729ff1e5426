// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-element manipulation state machine.
//!
//! A [`ManipulationDevice`] exists while an element is being manipulated. It
//! owns the attached manipulators and the [`ManipulationLogic`], and turns
//! engine output into the messages of [`events`](crate::events).
//!
//! ```text
//! Accumulating ──Started──▶ Active ──complete──▶ Inertia ──rest──▶ Ended
//!       │                     │          (no inertia) │              ▲
//!       └───── cancel ────────┴──────────────────────┴──complete────┘
//! ```
//!
//! Devices are driven by [`Manipulations`](crate::Manipulations); this type
//! only exposes read access to their state.

use core::fmt;

use kurbo::Point;
use smallvec::SmallVec;

use crate::config::ManipulationConfig;
use crate::error::ManipulationError;
use crate::events::{
    FeedbackHandling, ManipulationBoundaryFeedback, ManipulationCommand, ManipulationCompleted,
    ManipulationDeltaEvent, ManipulationInertiaStarting, ManipulationParameter,
    ManipulationStarted, ManipulationStarting,
};
use crate::host::ManipulationHost;
use crate::logic::{ManipulationFrame, ManipulationLogic};
use crate::mode::ManipulationModes;
use crate::pivot::ManipulationPivot;

/// Where a device is in the gesture lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DevicePhase {
    /// Manipulators are attached but `Started` has not been raised yet.
    Accumulating,
    /// Contact input is producing deltas.
    Active,
    /// Contacts are gone; an integrator produces deltas.
    Inertia,
    /// Terminal; the device is about to be dropped.
    Ended,
}

/// Whether a device wants per-frame callbacks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameState {
    /// Wants a callback every frame.
    Ticking,
    /// No manipulator has updated within the quiescence window before the
    /// gesture started; resumes on the next update.
    Suspended,
    /// Has no frame work at all.
    Idle,
}

/// State of one manipulated element.
pub struct ManipulationDevice<K, P> {
    element: K,
    container: K,
    serial: u64,
    manipulators: SmallVec<[P; 4]>,
    logic: ManipulationLogic<P>,
    phase: DevicePhase,
    frames: FrameState,
    last_updated: u64,
    config: ManipulationConfig,
}

impl<K: fmt::Debug, P: fmt::Debug> fmt::Debug for ManipulationDevice<K, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManipulationDevice")
            .field("element", &self.element)
            .field("container", &self.container)
            .field("manipulators", &self.manipulators)
            .field("phase", &self.phase)
            .field("frames", &self.frames)
            .field("last_updated", &self.last_updated)
            .field("logic", &self.logic)
            .finish_non_exhaustive()
    }
}

impl<K, P> ManipulationDevice<K, P>
where
    K: Copy + PartialEq + fmt::Debug,
    P: Copy + PartialEq + fmt::Debug,
{
    pub(crate) fn new(element: K, config: &ManipulationConfig, serial: u64, now: u64) -> Self {
        #[cfg(feature = "tracing")]
        tracing::debug!(?element, serial, "manipulation device created");
        Self {
            element,
            container: element,
            serial,
            manipulators: SmallVec::new(),
            logic: ManipulationLogic::new(config),
            phase: DevicePhase::Accumulating,
            frames: FrameState::Idle,
            last_updated: now,
            config: config.clone(),
        }
    }

    /// The manipulated element.
    #[must_use]
    pub fn element(&self) -> K {
        self.element
    }

    /// Element whose coordinate space deltas are expressed in.
    #[must_use]
    pub fn container(&self) -> K {
        self.container
    }

    /// Creation order among devices of the same context.
    #[must_use]
    pub fn serial(&self) -> u64 {
        self.serial
    }

    /// Attached manipulators, in attachment order.
    #[must_use]
    pub fn manipulators(&self) -> &[P] {
        &self.manipulators
    }

    /// Lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> DevicePhase {
        self.phase
    }

    /// Frame scheduling state.
    #[must_use]
    pub fn frame_state(&self) -> FrameState {
        self.frames
    }

    /// The numeric engine.
    #[must_use]
    pub fn logic(&self) -> &ManipulationLogic<P> {
        &self.logic
    }

    /// Components deltas may contain.
    #[must_use]
    pub fn mode(&self) -> ManipulationModes {
        self.logic.modes()
    }

    /// Current pivot.
    #[must_use]
    pub fn pivot(&self) -> Option<ManipulationPivot> {
        self.logic.pivot()
    }

    pub(crate) fn is_ended(&self) -> bool {
        self.phase == DevicePhase::Ended
    }

    pub(crate) fn set_mode(&mut self, mode: ManipulationModes) {
        self.logic.set_modes(mode);
    }

    pub(crate) fn set_pivot(&mut self, pivot: Option<ManipulationPivot>) {
        self.logic.set_pivot(pivot);
    }

    pub(crate) fn set_parameter(&mut self, parameter: ManipulationParameter) {
        match parameter {
            ManipulationParameter::Pivot(pivot) => self.logic.set_pivot(pivot),
            ManipulationParameter::SingleManipulatorEnabled(enabled) => {
                self.logic.set_single_manipulator_enabled(enabled);
            }
            ManipulationParameter::Modes(modes) => self.logic.set_modes(modes),
        }
    }

    pub(crate) fn clear_boundary_feedback(&mut self) {
        self.logic.clear_boundary_feedback();
    }

    /// Switches the coordinate space without reporting movement.
    pub(crate) fn set_container<H>(&mut self, host: &H, container: K)
    where
        H: ManipulationHost<K, P> + ?Sized,
    {
        self.container = container;
        self.logic.clear_boundary_feedback();
        let positions = self.positions(host);
        self.logic.reseed(&positions);
    }

    /// Some manipulator updated; frames are wanted again.
    pub(crate) fn resume(&mut self, now: u64) {
        self.last_updated = now;
        if self.frames == FrameState::Suspended {
            #[cfg(feature = "tracing")]
            tracing::trace!(element = ?self.element, "frames resumed");
            self.frames = FrameState::Ticking;
        }
    }

    pub(crate) fn add_manipulator<H>(
        &mut self,
        host: &mut H,
        id: P,
        now: u64,
    ) -> Result<(), ManipulationError>
    where
        H: ManipulationHost<K, P> + ?Sized,
    {
        if self.manipulators.contains(&id) {
            return Err(ManipulationError::DuplicateManipulator);
        }
        match self.phase {
            DevicePhase::Inertia | DevicePhase::Ended => return Err(ManipulationError::NotActive),
            DevicePhase::Accumulating | DevicePhase::Active => {}
        }
        let first = self.manipulators.is_empty() && self.phase == DevicePhase::Accumulating;
        self.manipulators.push(id);
        self.last_updated = now;
        self.frames = FrameState::Ticking;

        if first {
            let mut starting = ManipulationStarting::new(self.container, self.logic.modes());
            if host.manipulation_starting(self.element, &mut starting) == ManipulationCommand::Cancel
            {
                self.cancel(host);
                return Ok(());
            }
            self.container = starting.container;
            self.logic.set_modes(starting.mode);
            self.logic.set_pivot(starting.pivot);
            self.logic
                .set_single_manipulator_enabled(starting.single_manipulator_enabled);
        }
        if self.phase == DevicePhase::Accumulating {
            // Nothing reported yet: the gesture starts from all contacts.
            let positions = self.positions(host);
            self.logic.seed(&positions, now);
        } else if let Some(position) = host.manipulator_position(id) {
            let position = host.root_to_container(self.container) * position;
            self.logic.add_manipulator(id, position);
        }
        Ok(())
    }

    pub(crate) fn remove_manipulator<H>(&mut self, host: &mut H, id: P, now: u64)
    where
        H: ManipulationHost<K, P> + ?Sized,
    {
        let Some(index) = self.manipulators.iter().position(|&m| m == id) else {
            return;
        };
        let live = matches!(self.phase, DevicePhase::Accumulating | DevicePhase::Active);
        if self.manipulators.len() > 1 || !live {
            self.manipulators.remove(index);
            self.logic.remove_manipulator(id);
            return;
        }

        // Last contact lifting: report where it ended before letting go. The
        // host is removing it, so it is never handed back through
        // `manipulation_ended`.
        let positions = self.positions(host);
        self.manipulators.remove(index);
        if self.phase == DevicePhase::Accumulating && !self.start(host, now) {
            return;
        }
        let frame = self.logic.process(&positions, now);
        self.logic.remove_manipulator(id);
        self.report(host, frame, true, now);
        if self.phase == DevicePhase::Active {
            self.complete(host, true, now);
        }
    }

    /// Per-frame callback.
    pub(crate) fn frame<H>(&mut self, host: &mut H, now: u64)
    where
        H: ManipulationHost<K, P> + ?Sized,
    {
        match self.phase {
            DevicePhase::Ended => {}
            DevicePhase::Inertia => self.inertia_frame(host, now),
            DevicePhase::Accumulating | DevicePhase::Active => {
                if self.frames != FrameState::Ticking {
                    return;
                }
                // A live gesture keeps polling its contacts.
                if self.phase == DevicePhase::Accumulating
                    && now.saturating_sub(self.last_updated) > self.config.stale_timeout
                {
                    #[cfg(feature = "tracing")]
                    tracing::trace!(element = ?self.element, "frames suspended");
                    self.frames = FrameState::Suspended;
                    return;
                }
                self.contact_frame(host, now);
            }
        }
    }

    /// The container moved or resized.
    pub(crate) fn layout_changed<H>(&mut self, host: &mut H, now: u64)
    where
        H: ManipulationHost<K, P> + ?Sized,
    {
        if matches!(self.phase, DevicePhase::Accumulating | DevicePhase::Active) {
            self.contact_frame(host, now);
        }
    }

    /// Completes the gesture, handing over to inertia if asked and configured.
    pub(crate) fn complete<H>(&mut self, host: &mut H, with_inertia: bool, now: u64)
    where
        H: ManipulationHost<K, P> + ?Sized,
    {
        match self.phase {
            DevicePhase::Ended => return,
            DevicePhase::Inertia => {}
            DevicePhase::Accumulating | DevicePhase::Active => {
                if with_inertia && self.begin_inertia(host, now) {
                    return;
                }
            }
        }
        self.finish(host);
    }

    /// Cancels the gesture; refused during inertia.
    pub(crate) fn cancel<H>(&mut self, host: &mut H) -> bool
    where
        H: ManipulationHost<K, P> + ?Sized,
    {
        if matches!(self.phase, DevicePhase::Inertia | DevicePhase::Ended) {
            return false;
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(element = ?self.element, "manipulation cancelled");
        self.phase = DevicePhase::Ended;
        self.frames = FrameState::Idle;
        for id in self.manipulators.drain(..) {
            host.manipulation_ended(id, true);
        }
        true
    }

    fn positions<H>(&self, host: &H) -> SmallVec<[(P, Point); 4]>
    where
        H: ManipulationHost<K, P> + ?Sized,
    {
        let to_container = host.root_to_container(self.container);
        self.manipulators
            .iter()
            .filter_map(|&id| {
                host.manipulator_position(id)
                    .map(|p| (id, to_container * p))
            })
            .collect()
    }

    /// Raises `Started`; returns `false` if the handler ended the gesture.
    fn start<H>(&mut self, host: &mut H, now: u64) -> bool
    where
        H: ManipulationHost<K, P> + ?Sized,
    {
        self.phase = DevicePhase::Active;
        #[cfg(feature = "tracing")]
        tracing::debug!(element = ?self.element, "manipulation started");
        let event = ManipulationStarted {
            origin: self.logic.origin(),
            manipulator_count: self.manipulators.len(),
        };
        let command = host.manipulation_started(self.element, &event);
        self.dispatch(host, command, false, now);
        self.phase == DevicePhase::Active
    }

    fn contact_frame<H>(&mut self, host: &mut H, now: u64)
    where
        H: ManipulationHost<K, P> + ?Sized,
    {
        if self.phase == DevicePhase::Accumulating && !self.start(host, now) {
            return;
        }
        let positions = self.positions(host);
        let frame = self.logic.process(&positions, now);
        self.report(host, frame, false, now);
    }

    fn inertia_frame<H>(&mut self, host: &mut H, now: u64)
    where
        H: ManipulationHost<K, P> + ?Sized,
    {
        let Some(frame) = self.logic.step_inertia(now) else {
            self.finish(host);
            return;
        };
        self.report(host, frame, false, now);
        if self.phase == DevicePhase::Inertia && frame.inertia_complete {
            self.finish(host);
        }
    }

    /// Raises `Delta` for a frame and acts on the response.
    fn report<H>(&mut self, host: &mut H, frame: ManipulationFrame, always: bool, now: u64)
    where
        H: ManipulationHost<K, P> + ?Sized,
    {
        if frame.delta.is_identity() && !always {
            return;
        }
        let event = ManipulationDeltaEvent {
            origin: frame.origin,
            delta: frame.delta,
            cumulative: frame.cumulative,
            velocities: frame.velocities,
            is_inertial: frame.is_inertial,
            manipulator_count: self.manipulators.len(),
        };
        let response = host.manipulation_delta(self.element, &event);

        match response.unused {
            Some(unused) if !unused.is_identity() => {
                let feedback = ManipulationBoundaryFeedback {
                    feedback: unused,
                    is_inertial: frame.is_inertial,
                };
                let handling = host.manipulation_boundary_feedback(self.element, &feedback);
                if handling == FeedbackHandling::Applied && !frame.is_inertial {
                    self.logic.add_boundary_feedback(unused.translation);
                }
            }
            _ => self.logic.clear_boundary_feedback(),
        }
        self.dispatch(host, response.command, frame.is_inertial, now);
    }

    fn dispatch<H>(&mut self, host: &mut H, command: ManipulationCommand, inertial: bool, now: u64)
    where
        H: ManipulationHost<K, P> + ?Sized,
    {
        match command {
            ManipulationCommand::Continue => {}
            ManipulationCommand::Cancel => {
                if !inertial {
                    self.cancel(host);
                }
            }
            ManipulationCommand::Complete => self.complete(host, false, now),
            ManipulationCommand::StartInertia => {
                if !inertial {
                    self.complete(host, true, now);
                }
            }
        }
    }

    /// Raises `InertiaStarting`; returns `true` if the gesture is now inertial
    /// or was cancelled.
    fn begin_inertia<H>(&mut self, host: &mut H, now: u64) -> bool
    where
        H: ManipulationHost<K, P> + ?Sized,
    {
        let mut starting = ManipulationInertiaStarting::new(
            self.logic.origin(),
            self.logic.velocities(),
            self.logic.mean_radius(),
        );
        if host.manipulation_inertia_starting(self.element, &mut starting)
            == ManipulationCommand::Cancel
        {
            self.cancel(host);
            return true;
        }
        let params = starting.resolve(now, self.logic.modes(), &self.config);
        if params.is_empty() {
            return false;
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(element = ?self.element, "manipulation inertia started");
        let integrator = host.create_integrator(&params);
        for id in self.manipulators.drain(..) {
            host.manipulation_ended(id, false);
        }
        self.logic.begin_inertia(integrator);
        self.phase = DevicePhase::Inertia;
        self.frames = FrameState::Ticking;
        true
    }

    /// Raises `Completed` and ends the device.
    fn finish<H>(&mut self, host: &mut H)
    where
        H: ManipulationHost<K, P> + ?Sized,
    {
        let inertial = self.phase == DevicePhase::Inertia;
        let event = ManipulationCompleted {
            origin: self.logic.origin(),
            total: self.logic.cumulative(),
            final_velocities: self.logic.velocities(),
            is_inertial: inertial,
        };
        self.phase = DevicePhase::Ended;
        self.frames = FrameState::Idle;
        #[cfg(feature = "tracing")]
        tracing::debug!(element = ?self.element, inertial, "manipulation completed");

        let cancel = host.manipulation_completed(self.element, &event) == ManipulationCommand::Cancel
            && !inertial;
        for id in self.manipulators.drain(..) {
            host.manipulation_ended(id, cancel);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use hashbrown::HashMap;

    use crate::events::DeltaResponse;
    use crate::host::ManipulationHandler;

    #[derive(Default)]
    struct Host {
        positions: HashMap<u8, Point>,
        ended: Vec<(u8, bool)>,
        deltas: usize,
        on_started: ManipulationCommand,
        on_delta: ManipulationCommand,
    }

    impl ManipulationHandler<u32> for Host {
        fn manipulation_started(&mut self, _: u32, _: &ManipulationStarted) -> ManipulationCommand {
            self.on_started
        }

        fn manipulation_delta(&mut self, _: u32, _: &ManipulationDeltaEvent) -> DeltaResponse {
            self.deltas += 1;
            self.on_delta.into()
        }
    }

    impl ManipulationHost<u32, u8> for Host {
        fn is_manipulation_enabled(&self, _: u32) -> bool {
            true
        }

        fn manipulator_position(&self, manipulator: u8) -> Option<Point> {
            self.positions.get(&manipulator).copied()
        }

        fn manipulation_ended(&mut self, manipulator: u8, cancel: bool) {
            self.ended.push((manipulator, cancel));
        }
    }

    fn device() -> ManipulationDevice<u32, u8> {
        ManipulationDevice::new(1, &ManipulationConfig::default(), 0, 0)
    }

    #[test]
    fn first_frame_starts_the_gesture() {
        let mut host = Host::default();
        host.positions.insert(1, Point::ZERO);
        let mut d = device();
        d.add_manipulator(&mut host, 1, 0).unwrap();
        assert_eq!(d.phase(), DevicePhase::Accumulating);
        assert_eq!(d.frame_state(), FrameState::Ticking);

        host.positions.insert(1, Point::new(3.0, 0.0));
        d.frame(&mut host, 16);
        assert_eq!(d.phase(), DevicePhase::Active);
        assert_eq!(host.deltas, 1);
    }

    #[test]
    fn duplicate_manipulator_is_rejected() {
        let mut host = Host::default();
        let mut d = device();
        d.add_manipulator(&mut host, 1, 0).unwrap();
        assert_eq!(
            d.add_manipulator(&mut host, 1, 0),
            Err(ManipulationError::DuplicateManipulator)
        );
    }

    #[test]
    fn stale_device_suspends_and_resumes() {
        let mut host = Host::default();
        host.positions.insert(1, Point::ZERO);
        let mut d = device();
        d.add_manipulator(&mut host, 1, 0).unwrap();
        d.frame(&mut host, 51);
        assert_eq!(d.frame_state(), FrameState::Suspended);
        // Still accumulating: nothing was processed.
        assert_eq!(d.phase(), DevicePhase::Accumulating);

        d.resume(60);
        assert_eq!(d.frame_state(), FrameState::Ticking);
        d.frame(&mut host, 70);
        assert_eq!(d.phase(), DevicePhase::Active);
    }

    #[test]
    fn active_device_keeps_ticking_while_still() {
        let mut host = Host::default();
        host.positions.insert(1, Point::ZERO);
        let mut d = device();
        d.add_manipulator(&mut host, 1, 0).unwrap();
        host.positions.insert(1, Point::new(3.0, 0.0));
        d.frame(&mut host, 16);
        assert_eq!(d.phase(), DevicePhase::Active);

        // The contact rests well past the quiescence window.
        d.frame(&mut host, 200);
        assert_eq!(d.frame_state(), FrameState::Ticking);
        host.positions.insert(1, Point::new(8.0, 0.0));
        d.frame(&mut host, 216);
        assert_eq!(host.deltas, 2);
    }

    #[test]
    fn lifting_before_started_complete_skips_removed_contact() {
        let mut host = Host {
            on_started: ManipulationCommand::Complete,
            ..Host::default()
        };
        host.positions.insert(1, Point::ZERO);
        let mut d = device();
        d.add_manipulator(&mut host, 1, 0).unwrap();
        d.remove_manipulator(&mut host, 1, 10);
        assert!(d.is_ended());
        assert!(d.manipulators().is_empty());
        assert_eq!(host.deltas, 0);
        assert!(host.ended.is_empty());
    }

    #[test]
    fn complete_from_started() {
        let mut host = Host {
            on_started: ManipulationCommand::Complete,
            ..Host::default()
        };
        host.positions.insert(1, Point::ZERO);
        let mut d = device();
        d.add_manipulator(&mut host, 1, 0).unwrap();
        d.frame(&mut host, 16);
        assert!(d.is_ended());
        assert_eq!(host.deltas, 0);
        assert_eq!(host.ended, [(1, false)]);
    }

    #[test]
    fn cancel_from_delta_notifies_every_manipulator() {
        let mut host = Host {
            on_delta: ManipulationCommand::Cancel,
            ..Host::default()
        };
        host.positions.insert(1, Point::ZERO);
        host.positions.insert(2, Point::new(10.0, 0.0));
        let mut d = device();
        d.add_manipulator(&mut host, 1, 0).unwrap();
        d.add_manipulator(&mut host, 2, 0).unwrap();
        host.positions.insert(1, Point::new(5.0, 0.0));
        d.frame(&mut host, 16);
        assert_eq!(host.deltas, 1);
        assert!(d.is_ended());
        assert_eq!(host.ended, [(1, true), (2, true)]);
        assert!(!d.cancel(&mut host));
    }

    #[test]
    fn removing_one_of_two_keeps_going() {
        let mut host = Host::default();
        host.positions.insert(1, Point::ZERO);
        host.positions.insert(2, Point::new(10.0, 0.0));
        let mut d = device();
        d.add_manipulator(&mut host, 1, 0).unwrap();
        d.add_manipulator(&mut host, 2, 0).unwrap();
        d.frame(&mut host, 16);
        d.remove_manipulator(&mut host, 2, 20);
        assert_eq!(d.manipulators(), &[1]);
        assert_eq!(d.phase(), DevicePhase::Active);
        assert!(host.ended.is_empty());
    }
}
