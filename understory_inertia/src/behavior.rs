// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-axis inertia configuration.
//!
//! Each behavior holds an optional initial velocity override and a
//! [`Terminal`] condition: either a deceleration rate or a target the motion
//! should come to rest at, never both. Behaviors are usually created from the
//! velocity measured when contact ends, so reading [`initial_velocity`] on an
//! untouched behavior yields that measurement.
//!
//! A behavior only takes part in inertia once one of its setters has been
//! called; see [`InertiaTranslationBehavior::can_participate`].
//!
//! [`initial_velocity`]: InertiaTranslationBehavior::initial_velocity

use kurbo::Vec2;

use crate::error::{InertiaError, finite, non_negative, positive};
use crate::processor::{AxisInertia, Stop, TranslationInertia};

/// How an inertia axis comes to rest.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum Terminal {
    /// Nothing was requested; a default deceleration applies.
    #[default]
    Unset,
    /// Decelerate at this rate (units per millisecond squared).
    Deceleration(f64),
    /// Come to rest after travelling this far from the inertia origin.
    Target(f64),
}

impl Terminal {
    fn deceleration(self) -> Option<f64> {
        match self {
            Self::Deceleration(d) => Some(d),
            _ => None,
        }
    }

    fn target(self) -> Option<f64> {
        match self {
            Self::Target(t) => Some(t),
            _ => None,
        }
    }

    fn resolve(self, default_deceleration: f64) -> Stop {
        match self {
            Self::Unset => Stop::Deceleration(default_deceleration),
            Self::Deceleration(d) => Stop::Deceleration(d),
            Self::Target(t) => Stop::Distance(t),
        }
    }
}

/// Inertia configuration for translation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InertiaTranslationBehavior {
    measured_velocity: Vec2,
    initial_velocity: Option<Vec2>,
    terminal: Terminal,
}

impl InertiaTranslationBehavior {
    /// Creates a behavior whose default initial velocity is `measured`.
    #[must_use]
    pub fn from_measured(measured: Vec2) -> Self {
        Self {
            measured_velocity: measured,
            ..Self::default()
        }
    }

    /// Initial linear velocity, in units per millisecond.
    ///
    /// Falls back to the measured velocity when no override was set.
    #[must_use]
    pub fn initial_velocity(&self) -> Vec2 {
        self.initial_velocity.unwrap_or(self.measured_velocity)
    }

    /// Overrides the initial linear velocity.
    pub fn set_initial_velocity(&mut self, velocity: Vec2) -> Result<(), InertiaError> {
        finite("initial velocity", velocity.x)?;
        finite("initial velocity", velocity.y)?;
        self.initial_velocity = Some(velocity);
        Ok(())
    }

    /// Requested deceleration, if one was set.
    #[must_use]
    pub fn desired_deceleration(&self) -> Option<f64> {
        self.terminal.deceleration()
    }

    /// Sets the deceleration and clears any desired displacement.
    ///
    /// The rate must be positive.
    pub fn set_desired_deceleration(&mut self, deceleration: f64) -> Result<(), InertiaError> {
        let deceleration = positive("desired deceleration", deceleration)?;
        self.terminal = Terminal::Deceleration(deceleration);
        Ok(())
    }

    /// Requested travel distance, if one was set.
    #[must_use]
    pub fn desired_displacement(&self) -> Option<f64> {
        self.terminal.target()
    }

    /// Sets the distance to travel before resting and clears any deceleration.
    pub fn set_desired_displacement(&mut self, displacement: f64) -> Result<(), InertiaError> {
        let displacement = non_negative("desired displacement", displacement)?;
        self.terminal = Terminal::Target(displacement);
        Ok(())
    }

    /// Current terminal condition.
    #[must_use]
    pub fn terminal(&self) -> Terminal {
        self.terminal
    }

    /// Whether any field was explicitly set.
    #[must_use]
    pub fn can_participate(&self) -> bool {
        self.initial_velocity.is_some() || self.terminal != Terminal::Unset
    }

    /// Resolves into integrator parameters, or `None` if not participating.
    #[must_use]
    pub fn resolve(&self, default_deceleration: f64) -> Option<TranslationInertia> {
        self.can_participate().then(|| TranslationInertia {
            initial_velocity: self.initial_velocity(),
            stop: self.terminal.resolve(default_deceleration),
        })
    }
}

/// Inertia configuration for rotation. Angles are in radians.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InertiaRotationBehavior {
    measured_velocity: f64,
    initial_velocity: Option<f64>,
    terminal: Terminal,
}

impl InertiaRotationBehavior {
    /// Creates a behavior whose default initial velocity is `measured`.
    #[must_use]
    pub fn from_measured(measured: f64) -> Self {
        Self {
            measured_velocity: measured,
            ..Self::default()
        }
    }

    /// Initial angular velocity, in radians per millisecond.
    #[must_use]
    pub fn initial_velocity(&self) -> f64 {
        self.initial_velocity.unwrap_or(self.measured_velocity)
    }

    /// Overrides the initial angular velocity.
    pub fn set_initial_velocity(&mut self, velocity: f64) -> Result<(), InertiaError> {
        self.initial_velocity = Some(finite("initial velocity", velocity)?);
        Ok(())
    }

    /// Requested angular deceleration, if one was set.
    #[must_use]
    pub fn desired_deceleration(&self) -> Option<f64> {
        self.terminal.deceleration()
    }

    /// Sets the angular deceleration and clears any desired rotation.
    pub fn set_desired_deceleration(&mut self, deceleration: f64) -> Result<(), InertiaError> {
        let deceleration = positive("desired deceleration", deceleration)?;
        self.terminal = Terminal::Deceleration(deceleration);
        Ok(())
    }

    /// Requested total rotation, if one was set.
    #[must_use]
    pub fn desired_rotation(&self) -> Option<f64> {
        self.terminal.target()
    }

    /// Sets the rotation to complete before resting and clears any deceleration.
    ///
    /// The sign must agree with the initial velocity for any motion to occur.
    pub fn set_desired_rotation(&mut self, rotation: f64) -> Result<(), InertiaError> {
        self.terminal = Terminal::Target(finite("desired rotation", rotation)?);
        Ok(())
    }

    /// Current terminal condition.
    #[must_use]
    pub fn terminal(&self) -> Terminal {
        self.terminal
    }

    /// Whether any field was explicitly set.
    #[must_use]
    pub fn can_participate(&self) -> bool {
        self.initial_velocity.is_some() || self.terminal != Terminal::Unset
    }

    /// Resolves into integrator parameters, or `None` if not participating.
    #[must_use]
    pub fn resolve(&self, default_deceleration: f64) -> Option<AxisInertia> {
        self.can_participate().then(|| AxisInertia {
            initial_velocity: self.initial_velocity(),
            stop: self.terminal.resolve(default_deceleration),
        })
    }
}

/// Inertia configuration for expansion (uniform growth of the contact radius).
#[derive(Clone, Debug, PartialEq)]
pub struct InertiaExpansionBehavior {
    measured_velocity: f64,
    measured_radius: f64,
    initial_velocity: Option<f64>,
    initial_radius: Option<f64>,
    terminal: Terminal,
}

impl Default for InertiaExpansionBehavior {
    fn default() -> Self {
        Self {
            measured_velocity: 0.0,
            measured_radius: 1.0,
            initial_velocity: None,
            initial_radius: None,
            terminal: Terminal::Unset,
        }
    }
}

impl InertiaExpansionBehavior {
    /// Creates a behavior seeded with a measured expansion velocity and radius.
    ///
    /// A non-positive or non-finite `radius` is replaced by `1.0`.
    #[must_use]
    pub fn from_measured(velocity: f64, radius: f64) -> Self {
        Self {
            measured_velocity: velocity,
            measured_radius: if radius.is_finite() && radius > 0.0 {
                radius
            } else {
                1.0
            },
            ..Self::default()
        }
    }

    /// Initial expansion velocity, in units per millisecond.
    #[must_use]
    pub fn initial_velocity(&self) -> f64 {
        self.initial_velocity.unwrap_or(self.measured_velocity)
    }

    /// Overrides the initial expansion velocity.
    pub fn set_initial_velocity(&mut self, velocity: f64) -> Result<(), InertiaError> {
        self.initial_velocity = Some(finite("initial velocity", velocity)?);
        Ok(())
    }

    /// Radius the expansion is measured against.
    #[must_use]
    pub fn initial_radius(&self) -> f64 {
        self.initial_radius.unwrap_or(self.measured_radius)
    }

    /// Overrides the radius the expansion is measured against.
    pub fn set_initial_radius(&mut self, radius: f64) -> Result<(), InertiaError> {
        self.initial_radius = Some(positive("initial radius", radius)?);
        Ok(())
    }

    /// Requested expansion deceleration, if one was set.
    #[must_use]
    pub fn desired_deceleration(&self) -> Option<f64> {
        self.terminal.deceleration()
    }

    /// Sets the deceleration and clears any desired expansion.
    pub fn set_desired_deceleration(&mut self, deceleration: f64) -> Result<(), InertiaError> {
        let deceleration = positive("desired deceleration", deceleration)?;
        self.terminal = Terminal::Deceleration(deceleration);
        Ok(())
    }

    /// Requested total expansion, if one was set.
    #[must_use]
    pub fn desired_expansion(&self) -> Option<f64> {
        self.terminal.target()
    }

    /// Sets the expansion to reach before resting and clears any deceleration.
    pub fn set_desired_expansion(&mut self, expansion: f64) -> Result<(), InertiaError> {
        self.terminal = Terminal::Target(finite("desired expansion", expansion)?);
        Ok(())
    }

    /// Current terminal condition.
    #[must_use]
    pub fn terminal(&self) -> Terminal {
        self.terminal
    }

    /// Whether any field was explicitly set, the initial radius included.
    #[must_use]
    pub fn can_participate(&self) -> bool {
        self.initial_velocity.is_some()
            || self.initial_radius.is_some()
            || self.terminal != Terminal::Unset
    }

    /// Resolves into integrator parameters, or `None` if not participating.
    #[must_use]
    pub fn resolve(&self, default_deceleration: f64) -> Option<AxisInertia> {
        self.can_participate().then(|| AxisInertia {
            initial_velocity: self.initial_velocity(),
            stop: self.terminal.resolve(default_deceleration),
        })
    }
}
