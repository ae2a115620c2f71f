// Copyright 2025 the mapcore Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sector: a closed CCW face with properties and containment-tree
//! membership (spec §3, §4.6).

use alloc::string::String;
use alloc::vec::Vec;

use crate::ids::{LineId, SectorId};

/// Floor/ceiling heights, textures, light level, and the two scripting
/// hooks (tag, special) a sector carries.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SectorProperties {
    /// Floor height, in map units.
    pub floor_height: i64,
    /// Ceiling height, in map units.
    pub ceiling_height: i64,
    /// Floor texture (flat) name.
    pub floor_texture: String,
    /// Ceiling texture (flat) name.
    pub ceiling_texture: String,
    /// Light level, 0-255.
    pub light_level: i32,
    /// Linedef/sector tag used to associate triggers.
    pub tag: i32,
    /// Special effect identifier (damage floor, door, etc.).
    pub special: i32,
}

/// A closed face of the planar subdivision.
///
/// Identity is object identity: sectors are recreated wholesale on every
/// rebuild (spec §3), never mutated into a different boundary. `boundary`
/// lists the lines of the CCW loop in traversal order, each tagged with
/// whether this sector sits on that line's front (`true`) or back
/// (`false`) side; `flat_xy` is the same loop flattened to `[x0, y0, x1,
/// y1, ...]` coordinates.
#[derive(Clone, Debug, Default)]
pub struct Sector {
    /// Boundary lines in CCW traversal order, tagged front/back.
    pub boundary: Vec<(LineId, bool)>,
    /// Flattened CCW polygon matching `boundary`.
    pub flat_xy: Vec<i64>,
    /// Floor/ceiling/light/tag/special properties.
    pub properties: SectorProperties,
    /// The smallest sector strictly containing this one, if any.
    pub parent: Option<SectorId>,
    /// Direct children: sectors whose immediate enclosing face is this one.
    pub children: Vec<SectorId>,
}

impl Sector {
    /// Construct a sector from its boundary and flattened polygon, with
    /// default properties and no parent/children yet.
    pub fn new(boundary: Vec<(LineId, bool)>, flat_xy: Vec<i64>) -> Self {
        Self {
            boundary,
            flat_xy,
            properties: SectorProperties::default(),
            parent: None,
            children: Vec::new(),
        }
    }
}
