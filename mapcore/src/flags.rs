// Copyright 2025 the mapcore Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Line flags (spec §3: `Flags`), stored as a packed bitset.

use bitflags::bitflags;

bitflags! {
    /// The seven boolean flags a [`crate::line::Line`] carries.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Flags: u8 {
        /// Blocks player/monster movement through the line.
        const IMPASSABLE     = 1 << 0;
        /// The line has both a front and a back side.
        const TWO_SIDED      = 1 << 1;
        /// Upper texture is pegged to the lower edge rather than the upper.
        const UPPER_UNPEGGED = 1 << 2;
        /// Lower texture is pegged to the upper edge rather than the lower.
        const LOWER_UNPEGGED = 1 << 3;
        /// Hidden from the automap unless walked through.
        const SECRET         = 1 << 4;
        /// Blocks sound propagation across the line.
        const BLOCK_SOUND    = 1 << 5;
        /// Never rendered on the automap.
        const DONT_DRAW      = 1 << 6;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_has_no_flags_set() {
        assert_eq!(Flags::default(), Flags::empty());
    }

    #[test]
    fn flags_compose_independently() {
        let f = Flags::IMPASSABLE | Flags::TWO_SIDED;
        assert!(f.contains(Flags::IMPASSABLE));
        assert!(f.contains(Flags::TWO_SIDED));
        assert!(!f.contains(Flags::SECRET));
    }
}
