// Copyright 2025 the mapcore Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Copy the current selection into a standalone map, and paste a map back
//! in under an affine transform (spec §4.7).

use alloc::vec::Vec;
use hashbrown::{HashMap, HashSet};
use kurbo::{Affine, Point as KPoint, Vec2};
use mapcore_grid::Aabb;

use crate::error::Result;
use crate::ids::{LineId, SectorId, ThingId, VertexId};
use crate::keys::{self, VertexKey};
use crate::line::Line;
use crate::notify::SelectionEntry;
use crate::sector::Sector;

use super::Map;

/// The rigid/scale transform applied to a pasted submap's vertices: scale
/// and rotate about `pivot`, then translate (spec §4.7 `paste_map`).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PasteTransform {
    /// Translation applied last, in map units.
    pub translate: (f64, f64),
    /// Non-uniform scale factors applied about `pivot`.
    pub scale: (f64, f64),
    /// The point scale and rotation are applied about.
    pub pivot: (f64, f64),
    /// Rotation in radians, applied about `pivot` after scaling.
    pub rotation: f64,
}

impl Default for PasteTransform {
    fn default() -> Self {
        Self {
            translate: (0.0, 0.0),
            scale: (1.0, 1.0),
            pivot: (0.0, 0.0),
            rotation: 0.0,
        }
    }
}

impl PasteTransform {
    fn affine(&self) -> Affine {
        Affine::translate(Vec2::new(self.translate.0, self.translate.1))
            * Affine::translate(Vec2::new(self.pivot.0, self.pivot.1))
            * Affine::rotate(self.rotation)
            * Affine::scale_non_uniform(self.scale.0, self.scale.1)
            * Affine::translate(Vec2::new(-self.pivot.0, -self.pivot.1))
    }
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "pasted positions stay within realistic map-unit range after rounding"
)]
fn round_point(p: KPoint) -> (i64, i64) {
    (p.x.round() as i64, p.y.round() as i64)
}

fn bounds_of_flat(flat: &[i64]) -> Aabb {
    let mut min_x = i64::MAX;
    let mut min_y = i64::MAX;
    let mut max_x = i64::MIN;
    let mut max_y = i64::MIN;
    for pair in flat.chunks_exact(2) {
        min_x = min_x.min(pair[0]);
        max_x = max_x.max(pair[0]);
        min_y = min_y.min(pair[1]);
        max_y = max_y.max(pair[1]);
    }
    Aabb::new(min_x, min_y, max_x, max_y)
}

impl Map {
    /// Build a standalone map containing just the current selection
    /// (spec §4.7 `copy_selection`). Lines pull in their endpoints and
    /// sectors pull in their boundary lines even when those weren't
    /// separately selected, so the result is self-contained.
    pub fn copy_selection(&self) -> Self {
        let mut want_vertices: HashSet<VertexId> = HashSet::new();
        let mut want_lines: HashSet<LineId> = HashSet::new();
        let mut want_sectors: HashSet<SectorId> = HashSet::new();
        let mut want_things: HashSet<ThingId> = HashSet::new();
        for entry in &self.selection {
            match *entry {
                SelectionEntry::Vertex(id) => {
                    want_vertices.insert(id);
                }
                SelectionEntry::Line(id) => {
                    want_lines.insert(id);
                }
                SelectionEntry::Sector(id) => {
                    want_sectors.insert(id);
                }
                SelectionEntry::Thing(id) => {
                    want_things.insert(id);
                }
            }
        }

        for &sector_id in &want_sectors {
            if let Some(sector) = self.sectors.get(sector_id) {
                for &(line_id, _) in &sector.boundary {
                    want_lines.insert(line_id);
                }
            }
        }
        for &line_id in &want_lines {
            if let Some(line) = self.lines.get(line_id) {
                want_vertices.insert(line.v0);
                want_vertices.insert(line.v1);
            }
        }

        let mut new_map = Self::with_config(self.config);
        for &vertex_id in &want_vertices {
            if let Some(v) = self.vertices.get(vertex_id) {
                new_map.raw_insert_vertex(v.x, v.y);
            }
        }

        let mut line_id_map: HashMap<LineId, LineId> = HashMap::new();
        for &line_id in &want_lines {
            let Some(line) = self.lines.get(line_id) else {
                continue;
            };
            let a = self.vertex_key_of(line.v0);
            let b = self.vertex_key_of(line.v1);
            let (Some(&v0), Some(&v1)) = (new_map.vertex_map.get(&a), new_map.vertex_map.get(&b)) else {
                continue;
            };
            let mut cloned = Line::new(v0, v1);
            cloned.front = line.front.clone();
            cloned.front.sector = None;
            cloned.back = line.back.clone();
            cloned.back.sector = None;
            cloned.flags = line.flags;
            let new_id = new_map.raw_insert_line(cloned);
            line_id_map.insert(line_id, new_id);
        }

        for &sector_id in &want_sectors {
            let Some(sector) = self.sectors.get(sector_id) else {
                continue;
            };
            let mut boundary = Vec::with_capacity(sector.boundary.len());
            let mut complete = true;
            for &(line_id, is_front) in &sector.boundary {
                match line_id_map.get(&line_id) {
                    Some(&new_line_id) => boundary.push((new_line_id, is_front)),
                    None => {
                        complete = false;
                        break;
                    }
                }
            }
            if !complete {
                continue;
            }
            let mut new_sector = Sector::new(boundary.clone(), sector.flat_xy.clone());
            new_sector.properties = sector.properties.clone();
            let new_sector_id = new_map.sectors.insert(new_sector);
            new_map.spatial.insert_sector(new_sector_id, bounds_of_flat(&sector.flat_xy));
            for &(new_line_id, is_front) in &boundary {
                if let Some(l) = new_map.lines.get_mut(new_line_id) {
                    l.side_mut(is_front).sector = Some(new_sector_id);
                }
            }
        }

        for &thing_id in &want_things {
            if let Some(&thing) = self.things.get(thing_id) {
                new_map.raw_insert_thing(thing);
            }
        }

        new_map.modified_lines.clear();
        new_map
    }

    /// Merge `submap`'s geometry into `self` under `transform`, forwarding
    /// submap sectors' properties as templates so the post-paste rebuild
    /// reconstructs semantically equivalent sectors (spec §4.7 `paste_map`).
    pub fn paste_map(&mut self, submap: &Self, transform: &PasteTransform) -> Result<()> {
        self.guard_reentrancy()?;
        let affine = transform.affine();

        let mut vertex_targets: HashMap<VertexKey, VertexKey> = HashMap::new();
        for (_, v) in submap.vertices.iter() {
            let (nx, ny) = round_point(affine * KPoint::new(v.x as f64, v.y as f64));
            self.add_vertex(nx, ny, true)?;
            vertex_targets.insert(v.key(), (nx, ny));
        }

        let mut line_directions: HashMap<LineId, (VertexKey, VertexKey)> = HashMap::new();
        for (line_id, line) in submap.lines.iter() {
            let a0 = submap.vertex_key_of(line.v0);
            let b0 = submap.vertex_key_of(line.v1);
            let (Some(&a), Some(&b)) = (vertex_targets.get(&a0), vertex_targets.get(&b0)) else {
                continue;
            };
            if a == b {
                continue;
            }
            let target_key = keys::line_key(a, b);
            if !self.line_map.contains_key(&target_key) {
                let mut front = line.front.clone();
                front.sector = None;
                front.sector_old = None;
                front.sector_override = None;
                let mut back = line.back.clone();
                back.sector = None;
                back.sector_old = None;
                back.sector_override = None;
                self.insert_line_through_history(a, b, front, back, line.flags);
            }
            line_directions.insert(line_id, (a, b));
        }

        for (_, sector) in submap.sectors.iter() {
            for &(line_id, is_front) in &sector.boundary {
                let Some(&(a, b)) = line_directions.get(&line_id) else {
                    continue;
                };
                let Some(&new_line_id) = self.line_map.get(&keys::line_key(a, b)) else {
                    continue;
                };
                let Some(new_line) = self.lines.get(new_line_id) else {
                    continue;
                };
                let recipient_front = self.vertex_key_of(new_line.v0) == a;
                let effective_front = if recipient_front { is_front } else { !is_front };
                if let Some(new_line_mut) = self.lines.get_mut(new_line_id) {
                    new_line_mut.side_mut(effective_front).sector_override = Some(sector.properties.clone());
                }
                self.modified_lines.insert(new_line_id);
            }
        }

        self.rebuild_sectors()?;
        Ok(())
    }
}
