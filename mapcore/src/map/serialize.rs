// Copyright 2025 the mapcore Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Neutral, round-trippable serialization records (spec §4.7, §8 invariant
//! 4). Deserializing clears the map and rebuilds vertex → line → sector →
//! thing in order, then runs a full rebuild to re-establish transient
//! sector state.

use alloc::string::String;
use alloc::vec::Vec;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::flags::Flags;
use crate::line::Line;
use crate::sector::{Sector, SectorProperties};
use crate::side::Side;
use crate::thing::Thing;
use crate::value::PropertyValue;

use super::Map;

/// One texture/offset-bearing face of a serialized line.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SideRecord {
    /// Upper texture name.
    pub texture_upper: String,
    /// Middle texture name.
    pub texture_middle: String,
    /// Lower texture name.
    pub texture_lower: String,
    /// Horizontal texture offset.
    pub offset_x: i64,
    /// Vertical texture offset.
    pub offset_y: i64,
}

impl From<&Side> for SideRecord {
    fn from(side: &Side) -> Self {
        Self {
            texture_upper: side.texture_upper.clone(),
            texture_middle: side.texture_middle.clone(),
            texture_lower: side.texture_lower.clone(),
            offset_x: side.offset_x,
            offset_y: side.offset_y,
        }
    }
}

/// A serialized vertex.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VertexRecord {
    /// X coordinate.
    pub x: i64,
    /// Y coordinate.
    pub y: i64,
}

/// A serialized line: endpoint coordinates, both sides, flags.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineRecord {
    /// First endpoint.
    pub v0: (i64, i64),
    /// Second endpoint.
    pub v1: (i64, i64),
    /// Side left of `v0 -> v1`.
    pub front: SideRecord,
    /// Side right of `v0 -> v1`.
    pub back: SideRecord,
    /// Packed line flag bits.
    pub flags: u8,
}

/// A serialized sector: properties plus its boundary as `(v0, v1, front)`
/// line descriptors, resolved against the recipient's line index on load.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SectorRecord {
    /// Floor/ceiling/light/tag/special properties.
    pub properties: SectorProperties,
    /// Boundary in CCW traversal order: endpoint pair plus which side of
    /// that line (by endpoint order as stored here) this sector occupies.
    pub boundary: Vec<((i64, i64), (i64, i64), bool)>,
}

/// A serialized thing.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThingRecord {
    /// X coordinate.
    pub x: i64,
    /// Y coordinate.
    pub y: i64,
    /// Height coordinate.
    pub z: i64,
    /// Entity type identifier.
    pub type_id: i32,
    /// Facing angle, in degrees.
    pub angle: i32,
}

/// A whole map, serialized as plain data (spec §4.7).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapRecord {
    /// Every vertex (redundant with line endpoints, but kept so isolated
    /// vertices with no incident line still round-trip).
    pub vertices: Vec<VertexRecord>,
    /// Every line.
    pub lines: Vec<LineRecord>,
    /// Every sector.
    pub sectors: Vec<SectorRecord>,
    /// Every thing.
    pub things: Vec<ThingRecord>,
    /// Map-level metadata.
    pub metadata: HashMap<String, PropertyValue>,
}

impl Serialize for SectorProperties {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct as _;
        let mut s = serializer.serialize_struct("SectorProperties", 7)?;
        s.serialize_field("floor_height", &self.floor_height)?;
        s.serialize_field("ceiling_height", &self.ceiling_height)?;
        s.serialize_field("floor_texture", &self.floor_texture)?;
        s.serialize_field("ceiling_texture", &self.ceiling_texture)?;
        s.serialize_field("light_level", &self.light_level)?;
        s.serialize_field("tag", &self.tag)?;
        s.serialize_field("special", &self.special)?;
        s.end()
    }
}

impl<'de> Deserialize<'de> for SectorProperties {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> core::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            floor_height: i64,
            ceiling_height: i64,
            floor_texture: String,
            ceiling_texture: String,
            light_level: i32,
            tag: i32,
            special: i32,
        }
        let raw = Raw::deserialize(deserializer)?;
        Ok(Self {
            floor_height: raw.floor_height,
            ceiling_height: raw.ceiling_height,
            floor_texture: raw.floor_texture,
            ceiling_texture: raw.ceiling_texture,
            light_level: raw.light_level,
            tag: raw.tag,
            special: raw.special,
        })
    }
}

fn apply_side_record(side: &mut Side, record: &SideRecord) {
    side.texture_upper = record.texture_upper.clone();
    side.texture_middle = record.texture_middle.clone();
    side.texture_lower = record.texture_lower.clone();
    side.offset_x = record.offset_x;
    side.offset_y = record.offset_y;
}

impl Map {
    /// Snapshot this map as a [`MapRecord`] (spec §4.7 `serialize`).
    pub fn serialize(&self) -> MapRecord {
        let vertices = self.vertices.iter().map(|(_, v)| VertexRecord { x: v.x, y: v.y }).collect();

        let lines = self
            .lines
            .iter()
            .map(|(_, line)| LineRecord {
                v0: self.vertex_key_of(line.v0),
                v1: self.vertex_key_of(line.v1),
                front: SideRecord::from(&line.front),
                back: SideRecord::from(&line.back),
                flags: line.flags.bits(),
            })
            .collect();

        let sectors = self
            .sectors
            .iter()
            .map(|(_, sector)| SectorRecord {
                properties: sector.properties.clone(),
                boundary: sector
                    .boundary
                    .iter()
                    .filter_map(|&(line_id, is_front)| {
                        self.lines.get(line_id).map(|line| {
                            (self.vertex_key_of(line.v0), self.vertex_key_of(line.v1), is_front)
                        })
                    })
                    .collect(),
            })
            .collect();

        let things = self
            .things
            .iter()
            .map(|(_, thing)| ThingRecord {
                x: thing.x,
                y: thing.y,
                z: thing.z,
                type_id: thing.type_id,
                angle: thing.angle,
            })
            .collect();

        MapRecord {
            vertices,
            lines,
            sectors,
            things,
            metadata: self.metadata.clone(),
        }
    }

    /// Replace this map's contents with `record` (spec §4.7 `deserialize`):
    /// clears the map, rebuilds vertex → line → sector → thing in order,
    /// then runs a full rebuild to re-derive parent/child and open-side
    /// linking.
    pub fn deserialize(&mut self, record: &MapRecord) -> Result<()> {
        *self = Self::with_config(self.config);

        for v in &record.vertices {
            self.raw_insert_vertex(v.x, v.y);
        }

        for l in &record.lines {
            self.raw_insert_vertex_if_absent(l.v0);
            self.raw_insert_vertex_if_absent(l.v1);
            let Some(&v0) = self.vertex_map.get(&l.v0) else {
                continue;
            };
            let Some(&v1) = self.vertex_map.get(&l.v1) else {
                continue;
            };
            let mut line = Line::new(v0, v1);
            apply_side_record(&mut line.front, &l.front);
            apply_side_record(&mut line.back, &l.back);
            line.flags = Flags::from_bits_truncate(l.flags);
            self.raw_insert_line(line);
        }

        for s in &record.sectors {
            let mut boundary = Vec::with_capacity(s.boundary.len());
            for &(a, b, is_front) in &s.boundary {
                if let Some(&line_id) = self.line_map.get(&crate::keys::line_key(a, b)) {
                    boundary.push((line_id, is_front));
                }
            }
            if boundary.len() != s.boundary.len() {
                continue;
            }
            let flat_xy = s
                .boundary
                .iter()
                .flat_map(|&(a, b, is_front)| if is_front { [a.0, a.1] } else { [b.0, b.1] })
                .collect();
            let mut sector = Sector::new(boundary.clone(), flat_xy);
            sector.properties = s.properties.clone();
            let sector_id = self.sectors.insert(sector);
            for &(line_id, is_front) in &boundary {
                if let Some(line) = self.lines.get_mut(line_id) {
                    line.side_mut(is_front).sector = Some(sector_id);
                }
            }
            self.modified_lines.extend(boundary.iter().map(|&(id, _)| id));
        }

        for t in &record.things {
            self.raw_insert_thing(Thing {
                x: t.x,
                y: t.y,
                z: t.z,
                type_id: t.type_id,
                angle: t.angle,
            });
        }

        self.metadata = record.metadata.clone();
        self.rebuild_sectors()
    }

    fn raw_insert_vertex_if_absent(&mut self, key: (i64, i64)) {
        if !self.vertex_map.contains_key(&key) {
            self.raw_insert_vertex(key.0, key.1);
        }
    }
}
