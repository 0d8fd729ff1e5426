// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;

/// Error returned by [`Manipulations`](crate::Manipulations) entry points.
///
/// These signal misuse of the API; nothing here is transient.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ManipulationError {
    /// No manipulation is active on the element.
    NotActive,
    /// The element has not opted in to manipulation.
    NotEnabled,
    /// The manipulator is already attached to a manipulation.
    DuplicateManipulator,
    /// An argument was rejected.
    InvalidArgument(&'static str),
}

impl fmt::Display for ManipulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotActive => f.write_str("manipulation not active"),
            Self::NotEnabled => f.write_str("manipulation not enabled on element"),
            Self::DuplicateManipulator => f.write_str("manipulator already attached"),
            Self::InvalidArgument(what) => write!(f, "invalid argument: {what}"),
        }
    }
}

impl core::error::Error for ManipulationError {}
