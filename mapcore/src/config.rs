// Copyright 2025 the mapcore Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Runtime configuration for constants the spec calls out as magic numbers
//! (spec §9, Open Questions): spatial grid cell size and the face-recovery
//! loop-trace guard limit.

/// Tunable constants for a [`crate::map::Map`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MapConfig {
    /// Cell size of the uniform spatial grid, in map units.
    pub grid_cell_size: i64,
    /// Maximum number of half-edge steps a single loop trace may take during
    /// face recovery before that loop (only that loop) is abandoned.
    pub rebuild_step_limit: usize,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            grid_cell_size: 128,
            rebuild_step_limit: 100_000,
        }
    }
}
