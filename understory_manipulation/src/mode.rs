// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::error::ManipulationError;

bitflags::bitflags! {
    /// Transform components a manipulation is allowed to report.
    ///
    /// Components outside the set are reported as identity: zero translation
    /// on a masked axis, zero rotation, unit scale and zero expansion.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ManipulationModes: u8 {
        /// Horizontal translation.
        const TRANSLATE_X = 0b0000_0001;
        /// Vertical translation.
        const TRANSLATE_Y = 0b0000_0010;
        /// Translation on both axes.
        const TRANSLATE = Self::TRANSLATE_X.bits() | Self::TRANSLATE_Y.bits();
        /// Rotation.
        const ROTATE = 0b0000_0100;
        /// Uniform scale and expansion.
        const SCALE = 0b0000_1000;
        /// Every component.
        const ALL = Self::TRANSLATE.bits() | Self::ROTATE.bits() | Self::SCALE.bits();
    }
}

impl ManipulationModes {
    /// No component; every reported delta is identity.
    pub const NONE: Self = Self::empty();

    /// Converts raw bits, rejecting bits outside [`ManipulationModes::ALL`].
    pub fn try_from_bits(bits: u8) -> Result<Self, ManipulationError> {
        Self::from_bits(bits).ok_or(ManipulationError::InvalidArgument(
            "manipulation modes contain unknown bits",
        ))
    }
}

impl Default for ManipulationModes {
    fn default() -> Self {
        Self::ALL
    }
}
