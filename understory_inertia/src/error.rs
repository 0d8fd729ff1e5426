// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;

/// Error returned when an inertia behavior rejects a value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InertiaError {
    /// The value was NaN or infinite.
    NonFinite {
        /// Name of the rejected field.
        field: &'static str,
    },
    /// The value was finite but outside the range the field accepts.
    OutOfRange {
        /// Name of the rejected field.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },
}

impl fmt::Display for InertiaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonFinite { field } => write!(f, "{field} must be finite"),
            Self::OutOfRange { field, value } => {
                write!(f, "{field} is out of range: {value}")
            }
        }
    }
}

impl core::error::Error for InertiaError {}

pub(crate) fn finite(field: &'static str, value: f64) -> Result<f64, InertiaError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(InertiaError::NonFinite { field })
    }
}

pub(crate) fn positive(field: &'static str, value: f64) -> Result<f64, InertiaError> {
    let value = finite(field, value)?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(InertiaError::OutOfRange { field, value })
    }
}

pub(crate) fn non_negative(field: &'static str, value: f64) -> Result<f64, InertiaError> {
    let value = finite(field, value)?;
    if value >= 0.0 {
        Ok(value)
    } else {
        Err(InertiaError::OutOfRange { field, value })
    }
}
