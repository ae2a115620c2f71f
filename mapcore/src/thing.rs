// Copyright 2025 the mapcore Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Thing: a point entity independent of the line/sector graph (spec §3).

/// A point entity — player start, monster, pickup, decoration.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Thing {
    /// X coordinate, in map units.
    pub x: i64,
    /// Y coordinate, in map units.
    pub y: i64,
    /// Vertical (height) coordinate, in map units.
    pub z: i64,
    /// Entity type identifier, meaningful only to the consuming engine.
    pub type_id: i32,
    /// Facing angle, in degrees.
    pub angle: i32,
}

impl Thing {
    /// Construct a thing at the given position and type, facing angle 0.
    pub const fn new(x: i64, y: i64, z: i64, type_id: i32) -> Self {
        Self {
            x,
            y,
            z,
            type_id,
            angle: 0,
        }
    }
}
