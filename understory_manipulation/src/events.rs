// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Messages describing the lifecycle of a manipulation.
//!
//! A gesture is reported to the host in a fixed order:
//!
//! 1. [`ManipulationStarting`]: configure mode, container, pivot and
//!    single-contact handling, or cancel.
//! 2. [`ManipulationStarted`]: the gesture is live.
//! 3. [`ManipulationDeltaEvent`], repeated, answered with a [`DeltaResponse`].
//!    Unused movement in a response is forwarded as
//!    [`ManipulationBoundaryFeedback`].
//! 4. [`ManipulationInertiaStarting`], once, when the gesture completes with
//!    inertia: configure the per-axis behaviors.
//! 5. [`ManipulationDeltaEvent`] frames flagged `is_inertial`.
//! 6. [`ManipulationCompleted`]: always the last message.
//!
//! Handlers steer the gesture by returning a [`ManipulationCommand`] rather
//! than by mutating the message.

use kurbo::Point;
use understory_inertia::{
    AxisInertia, InertiaExpansionBehavior, InertiaParameters, InertiaRotationBehavior,
    InertiaTranslationBehavior, TranslationInertia,
};

use crate::config::ManipulationConfig;
use crate::delta::{ManipulationDelta, ManipulationVelocities};
use crate::mode::ManipulationModes;
use crate::pivot::ManipulationPivot;

/// What a handler wants to happen next.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ManipulationCommand {
    /// Keep going.
    #[default]
    Continue,
    /// Complete the gesture without inertia.
    Complete,
    /// Complete the gesture, handing over to inertia when configured.
    StartInertia,
    /// Abort the gesture and notify the manipulators with `cancel = true`.
    ///
    /// Ignored once the gesture is inertial.
    Cancel,
}

/// A raw engine setting.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ManipulationParameter {
    /// Sets or clears the pivot.
    Pivot(Option<ManipulationPivot>),
    /// Whether a single contact produces deltas.
    SingleManipulatorEnabled(bool),
    /// Components deltas may contain.
    Modes(ManipulationModes),
}

/// First message of a gesture, raised when the first manipulator attaches.
#[derive(Clone, Debug, PartialEq)]
pub struct ManipulationStarting<K> {
    /// Components deltas may contain.
    pub mode: ManipulationModes,
    /// Element whose coordinate space the gesture is measured in.
    pub container: K,
    /// Optional single-contact pivot, in container space.
    pub pivot: Option<ManipulationPivot>,
    /// Whether a single contact produces deltas (default: `true`).
    pub single_manipulator_enabled: bool,
}

impl<K> ManipulationStarting<K> {
    pub(crate) fn new(container: K, mode: ManipulationModes) -> Self {
        Self {
            mode,
            container,
            pivot: None,
            single_manipulator_enabled: true,
        }
    }

    /// Applies a raw engine setting.
    pub fn set_manipulation_parameter(&mut self, parameter: ManipulationParameter) {
        match parameter {
            ManipulationParameter::Pivot(pivot) => self.pivot = pivot,
            ManipulationParameter::SingleManipulatorEnabled(enabled) => {
                self.single_manipulator_enabled = enabled;
            }
            ManipulationParameter::Modes(mode) => self.mode = mode,
        }
    }
}

/// The gesture is live.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ManipulationStarted {
    /// Centroid of the contacts, in container space.
    pub origin: Point,
    /// Attached manipulators.
    pub manipulator_count: usize,
}

/// One frame of movement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ManipulationDeltaEvent {
    /// Current manipulation origin, in container space.
    pub origin: Point,
    /// Change since the previous delta.
    pub delta: ManipulationDelta,
    /// Total since the gesture began.
    pub cumulative: ManipulationDelta,
    /// Current velocities.
    pub velocities: ManipulationVelocities,
    /// Whether the frame comes from inertia rather than contact.
    pub is_inertial: bool,
    /// Attached manipulators; zero on the closing frame of contact input.
    pub manipulator_count: usize,
}

/// Answer to a [`ManipulationDeltaEvent`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DeltaResponse {
    /// What should happen next.
    pub command: ManipulationCommand,
    /// Portion of the delta the handler could not apply, for example because
    /// a scroll boundary was hit.
    ///
    /// Reporting `None` clears any boundary compensation in effect.
    pub unused: Option<ManipulationDelta>,
}

impl DeltaResponse {
    /// Continue without unused movement.
    pub const CONTINUE: Self = Self {
        command: ManipulationCommand::Continue,
        unused: None,
    };

    /// Continue, reporting movement the handler could not apply.
    #[must_use]
    pub fn unused(unused: ManipulationDelta) -> Self {
        Self {
            command: ManipulationCommand::Continue,
            unused: Some(unused),
        }
    }

    /// Replaces the command.
    #[must_use]
    pub fn with_command(mut self, command: ManipulationCommand) -> Self {
        self.command = command;
        self
    }
}

impl From<ManipulationCommand> for DeltaResponse {
    fn from(command: ManipulationCommand) -> Self {
        Self {
            command,
            unused: None,
        }
    }
}

/// Raw integrator parameters that bypass the behaviors.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InertiaParameter {
    /// Translation axis.
    Translation(TranslationInertia),
    /// Rotation axis.
    Rotation(AxisInertia),
    /// Expansion axis, measured against `initial_radius`.
    Expansion {
        /// Axis parameters.
        inertia: AxisInertia,
        /// Radius the expansion is relative to.
        initial_radius: f64,
    },
}

/// Raised once when a gesture completes with inertia.
///
/// Behaviors are created on first access from the measured velocities. Only
/// behaviors that were configured take part; if none does and no raw
/// parameter was set, the gesture completes without inertia.
#[derive(Clone, Debug, PartialEq)]
pub struct ManipulationInertiaStarting {
    origin: Point,
    velocities: ManipulationVelocities,
    radius: f64,
    translation: Option<InertiaTranslationBehavior>,
    rotation: Option<InertiaRotationBehavior>,
    expansion: Option<InertiaExpansionBehavior>,
    raw_translation: Option<TranslationInertia>,
    raw_rotation: Option<AxisInertia>,
    raw_expansion: Option<(AxisInertia, f64)>,
}

impl ManipulationInertiaStarting {
    pub(crate) fn new(origin: Point, velocities: ManipulationVelocities, radius: f64) -> Self {
        Self {
            origin,
            velocities,
            radius,
            translation: None,
            rotation: None,
            expansion: None,
            raw_translation: None,
            raw_rotation: None,
            raw_expansion: None,
        }
    }

    /// Point inertia is anchored to, in container space.
    #[must_use]
    pub fn origin(&self) -> Point {
        self.origin
    }

    /// Velocities measured when contact ended.
    #[must_use]
    pub fn initial_velocities(&self) -> ManipulationVelocities {
        self.velocities
    }

    /// Translation behavior, seeded from the measured linear velocity.
    pub fn translation_behavior(&mut self) -> &mut InertiaTranslationBehavior {
        self.translation
            .get_or_insert_with(|| InertiaTranslationBehavior::from_measured(self.velocities.linear))
    }

    /// Rotation behavior, seeded from the measured angular velocity.
    pub fn rotation_behavior(&mut self) -> &mut InertiaRotationBehavior {
        self.rotation
            .get_or_insert_with(|| InertiaRotationBehavior::from_measured(self.velocities.angular))
    }

    /// Expansion behavior, seeded from the measured expansion velocity and
    /// mean contact radius.
    pub fn expansion_behavior(&mut self) -> &mut InertiaExpansionBehavior {
        self.expansion.get_or_insert_with(|| {
            InertiaExpansionBehavior::from_measured(self.velocities.expansion, self.radius)
        })
    }

    /// Sets raw integrator parameters for one axis, taking precedence over
    /// that axis's behavior.
    pub fn set_inertia_parameter(&mut self, parameter: InertiaParameter) {
        match parameter {
            InertiaParameter::Translation(t) => self.raw_translation = Some(t),
            InertiaParameter::Rotation(r) => self.raw_rotation = Some(r),
            InertiaParameter::Expansion {
                inertia,
                initial_radius,
            } => self.raw_expansion = Some((inertia, initial_radius)),
        }
    }

    /// Builds integrator parameters for the axes `modes` allows.
    pub(crate) fn resolve(
        &self,
        start_time: u64,
        modes: ManipulationModes,
        config: &ManipulationConfig,
    ) -> InertiaParameters {
        let mut params = InertiaParameters::new(self.origin, start_time);

        if modes.intersects(ManipulationModes::TRANSLATE) {
            params.translation = self
                .raw_translation
                .or_else(|| {
                    self.translation
                        .as_ref()
                        .and_then(|b| b.resolve(config.translation_deceleration))
                })
                .map(|mut t| {
                    if !modes.contains(ManipulationModes::TRANSLATE_X) {
                        t.initial_velocity.x = 0.0;
                    }
                    if !modes.contains(ManipulationModes::TRANSLATE_Y) {
                        t.initial_velocity.y = 0.0;
                    }
                    t
                });
        }
        if modes.contains(ManipulationModes::ROTATE) {
            params.rotation = self.raw_rotation.or_else(|| {
                self.rotation
                    .as_ref()
                    .and_then(|b| b.resolve(config.rotation_deceleration))
            });
        }
        if modes.contains(ManipulationModes::SCALE) {
            if let Some((inertia, radius)) = self.raw_expansion {
                params.expansion = Some(inertia);
                params.initial_radius = radius;
            } else if let Some(b) = &self.expansion {
                params.expansion = b.resolve(config.expansion_deceleration);
                params.initial_radius = b.initial_radius();
            }
        }
        params
    }
}

/// Movement a delta handler could not apply.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ManipulationBoundaryFeedback {
    /// The unused portion of the last delta.
    pub feedback: ManipulationDelta,
    /// Whether the delta was inertial.
    pub is_inertial: bool,
}

/// Answer to [`ManipulationBoundaryFeedback`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FeedbackHandling {
    /// Nothing was done; contact tracking is unchanged.
    #[default]
    Ignored,
    /// The host shifted the container by the unused translation, so raw
    /// contact positions must be compensated by the same amount.
    Applied,
}

/// Last message of a gesture.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ManipulationCompleted {
    /// Final manipulation origin, in container space.
    pub origin: Point,
    /// Composition of every delta reported.
    pub total: ManipulationDelta,
    /// Velocities at completion.
    pub final_velocities: ManipulationVelocities,
    /// Whether the gesture completed during inertia.
    pub is_inertial: bool,
}
