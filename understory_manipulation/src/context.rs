// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The manipulation registry and its entry points.

use core::fmt;
use core::hash::Hash;

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::config::ManipulationConfig;
use crate::device::{DevicePhase, FrameState, ManipulationDevice};
use crate::error::ManipulationError;
use crate::events::ManipulationParameter;
use crate::host::ManipulationHost;
use crate::mode::ManipulationModes;
use crate::pivot::ManipulationPivot;

/// Every live manipulation of one UI thread.
///
/// Owns one [`ManipulationDevice`] per manipulated element, keyed by `K`.
/// The host passes itself into every call that may raise messages; the
/// registry holds no reference to it between calls.
///
/// Two clocks drive progress: [`on_frame`](Self::on_frame) from the render
/// loop and [`on_layout_changed`](Self::on_layout_changed) when a container
/// moves. Hosts should request frames only while
/// [`wants_frames`](Self::wants_frames) is `true`, and report every contact
/// movement through [`manipulator_updated`](Self::manipulator_updated).
pub struct Manipulations<K, P> {
    config: ManipulationConfig,
    devices: HashMap<K, ManipulationDevice<K, P>>,
    next_serial: u64,
}

impl<K: fmt::Debug, P: fmt::Debug> fmt::Debug for Manipulations<K, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Manipulations")
            .field("config", &self.config)
            .field("devices", &self.devices)
            .finish_non_exhaustive()
    }
}

impl<K, P> Default for Manipulations<K, P> {
    fn default() -> Self {
        Self::with_config(ManipulationConfig::default())
    }
}

impl<K, P> Manipulations<K, P> {
    /// Creates an empty registry with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry.
    #[must_use]
    pub fn with_config(config: ManipulationConfig) -> Self {
        Self {
            config,
            devices: HashMap::new(),
            next_serial: 0,
        }
    }

    /// The configuration shared by all devices.
    #[must_use]
    pub fn config(&self) -> &ManipulationConfig {
        &self.config
    }
}

impl<K, P> Manipulations<K, P>
where
    K: Copy + Eq + Hash + fmt::Debug,
    P: Copy + PartialEq + fmt::Debug,
{
    /// Whether `element` is being manipulated.
    #[must_use]
    pub fn is_manipulation_active(&self, element: K) -> bool {
        self.devices.get(&element).is_some_and(|d| !d.is_ended())
    }

    /// The live device for `element`.
    #[must_use]
    pub fn device(&self, element: K) -> Option<&ManipulationDevice<K, P>> {
        self.devices.get(&element)
    }

    /// Whether any device wants a frame callback.
    #[must_use]
    pub fn wants_frames(&self) -> bool {
        self.devices
            .values()
            .any(|d| d.frame_state() == FrameState::Ticking)
    }

    /// Attaches `manipulator` to `element`, starting a manipulation if none
    /// is live.
    ///
    /// A new contact on an element in inertia completes the inertial gesture
    /// and starts a fresh one.
    pub fn add_manipulator<H>(
        &mut self,
        host: &mut H,
        element: K,
        manipulator: P,
        now: u64,
    ) -> Result<(), ManipulationError>
    where
        H: ManipulationHost<K, P> + ?Sized,
    {
        if !host.is_manipulation_enabled(element) {
            return Err(ManipulationError::NotEnabled);
        }
        if let Some(device) = self.devices.get_mut(&element) {
            if device.phase() == DevicePhase::Inertia {
                device.complete(host, false, now);
            }
        }
        self.prune();

        let serial = self.next_serial;
        let device = self.devices.entry(element).or_insert_with(|| {
            ManipulationDevice::new(element, &self.config, serial, now)
        });
        let result = device.add_manipulator(host, manipulator, now);
        if device.serial() == serial {
            self.next_serial += 1;
        }
        self.prune();
        result
    }

    /// Detaches `manipulator` from `element`.
    ///
    /// Removing the last contact of a live gesture reports a closing delta
    /// and completes the gesture, with inertia if the handlers configure it.
    pub fn remove_manipulator<H>(&mut self, host: &mut H, element: K, manipulator: P, now: u64)
    where
        H: ManipulationHost<K, P> + ?Sized,
    {
        if let Some(device) = self.devices.get_mut(&element) {
            device.remove_manipulator(host, manipulator, now);
        }
        self.prune();
    }

    /// Completes the manipulation of `element` and hands over to inertia if
    /// the handlers configure it.
    pub fn start_inertia<H>(
        &mut self,
        host: &mut H,
        element: K,
        now: u64,
    ) -> Result<(), ManipulationError>
    where
        H: ManipulationHost<K, P> + ?Sized,
    {
        self.active_mut(element)?.complete(host, true, now);
        self.prune();
        Ok(())
    }

    /// Completes the manipulation of `element`, ending inertia if running.
    pub fn complete_manipulation<H>(
        &mut self,
        host: &mut H,
        element: K,
        now: u64,
    ) -> Result<(), ManipulationError>
    where
        H: ManipulationHost<K, P> + ?Sized,
    {
        self.active_mut(element)?.complete(host, false, now);
        self.prune();
        Ok(())
    }

    /// Cancels the manipulation of `element`.
    ///
    /// Returns `Ok(false)` when the gesture is inertial, which cannot be
    /// cancelled.
    pub fn cancel_manipulation<H>(
        &mut self,
        host: &mut H,
        element: K,
    ) -> Result<bool, ManipulationError>
    where
        H: ManipulationHost<K, P> + ?Sized,
    {
        let cancelled = self.active_mut(element)?.cancel(host);
        self.prune();
        Ok(cancelled)
    }

    /// Components deltas of `element` may contain.
    pub fn mode(&self, element: K) -> Result<ManipulationModes, ManipulationError> {
        self.active(element).map(ManipulationDevice::mode)
    }

    /// Sets the components deltas of `element` may contain.
    pub fn set_mode(&mut self, element: K, mode: ManipulationModes) -> Result<(), ManipulationError> {
        self.active_mut(element)?.set_mode(mode);
        Ok(())
    }

    /// Element whose coordinate space deltas of `element` are expressed in.
    pub fn container(&self, element: K) -> Result<K, ManipulationError> {
        self.active(element).map(ManipulationDevice::container)
    }

    /// Measures the manipulation of `element` in `container`'s space from now
    /// on.
    pub fn set_container<H>(
        &mut self,
        host: &H,
        element: K,
        container: K,
    ) -> Result<(), ManipulationError>
    where
        H: ManipulationHost<K, P> + ?Sized,
    {
        self.active_mut(element)?.set_container(host, container);
        Ok(())
    }

    /// Pivot of the manipulation of `element`.
    pub fn pivot(&self, element: K) -> Result<Option<ManipulationPivot>, ManipulationError> {
        self.active(element).map(ManipulationDevice::pivot)
    }

    /// Sets or clears the pivot of the manipulation of `element`.
    pub fn set_pivot(
        &mut self,
        element: K,
        pivot: Option<ManipulationPivot>,
    ) -> Result<(), ManipulationError> {
        self.active_mut(element)?.set_pivot(pivot);
        Ok(())
    }

    /// Applies a raw engine setting to the manipulation of `element`.
    pub fn set_manipulation_parameter(
        &mut self,
        element: K,
        parameter: ManipulationParameter,
    ) -> Result<(), ManipulationError> {
        self.active_mut(element)?.set_parameter(parameter);
        Ok(())
    }

    /// Drops boundary feedback compensation for `element`.
    pub fn clear_boundary_feedback(&mut self, element: K) -> Result<(), ManipulationError> {
        self.active_mut(element)?.clear_boundary_feedback();
        Ok(())
    }

    /// A manipulator moved somewhere on this thread.
    ///
    /// Resumes every suspended device so concurrent gestures stay on the same
    /// frame cadence.
    pub fn manipulator_updated(&mut self, now: u64) {
        for device in self.devices.values_mut() {
            device.resume(now);
        }
    }

    /// Render-loop callback.
    pub fn on_frame<H>(&mut self, host: &mut H, now: u64)
    where
        H: ManipulationHost<K, P> + ?Sized,
    {
        for element in self.ordered() {
            if let Some(device) = self.devices.get_mut(&element) {
                device.frame(host, now);
            }
        }
        self.prune();
    }

    /// `container` moved or resized; every gesture measured in it is updated
    /// immediately.
    pub fn on_layout_changed<H>(&mut self, host: &mut H, container: K, now: u64)
    where
        H: ManipulationHost<K, P> + ?Sized,
    {
        for element in self.ordered() {
            if let Some(device) = self.devices.get_mut(&element) {
                if device.container() == container {
                    device.layout_changed(host, now);
                }
            }
        }
        self.prune();
    }

    fn active(&self, element: K) -> Result<&ManipulationDevice<K, P>, ManipulationError> {
        self.devices
            .get(&element)
            .filter(|d| !d.is_ended())
            .ok_or(ManipulationError::NotActive)
    }

    fn active_mut(
        &mut self,
        element: K,
    ) -> Result<&mut ManipulationDevice<K, P>, ManipulationError> {
        self.devices
            .get_mut(&element)
            .filter(|d| !d.is_ended())
            .ok_or(ManipulationError::NotActive)
    }

    /// Elements in device creation order.
    fn ordered(&self) -> SmallVec<[K; 4]> {
        let mut order: SmallVec<[(u64, K); 4]> = self
            .devices
            .iter()
            .map(|(&element, d)| (d.serial(), element))
            .collect();
        order.sort_unstable_by_key(|&(serial, _)| serial);
        order.into_iter().map(|(_, element)| element).collect()
    }

    fn prune(&mut self) {
        self.devices.retain(|_, d| {
            if d.is_ended() {
                #[cfg(feature = "tracing")]
                tracing::trace!(element = ?d.element(), "manipulation device dropped");
                false
            } else {
                true
            }
        });
    }
}
