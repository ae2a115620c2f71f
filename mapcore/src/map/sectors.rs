// Copyright 2025 the mapcore Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sector parent/child maintenance (spec §4.6).
//!
//! Sectors are never recorded in history (spec §4.3): they're derived state,
//! recreated wholesale by [`super::rebuild`] from the current edge graph.
//! This module only maintains the containment forest and open-side linking
//! as sectors are added to / removed from the map by the rebuild pass.

use alloc::vec::Vec;
use mapcore_grid::Aabb;

use crate::geom::polygon_contains_all_vertices;
use crate::ids::SectorId;
use crate::notify::ChangeEvent;
use crate::sector::Sector;

use super::Map;

impl Map {
    /// Bounding box of a sector's flattened polygon.
    fn sector_bounds(sector: &Sector) -> Aabb {
        let mut min_x = i64::MAX;
        let mut min_y = i64::MAX;
        let mut max_x = i64::MIN;
        let mut max_y = i64::MIN;
        for pair in sector.flat_xy.chunks_exact(2) {
            min_x = min_x.min(pair[0]);
            max_x = max_x.max(pair[0]);
            min_y = min_y.min(pair[1]);
            max_y = max_y.max(pair[1]);
        }
        Aabb::new(min_x, min_y, max_x, max_y)
    }

    fn fully_contains(&self, outer: SectorId, inner: SectorId) -> bool {
        let (Some(outer_s), Some(inner_s)) = (self.sectors.get(outer), self.sectors.get(inner)) else {
            return false;
        };
        let outer_bounds = Self::sector_bounds(outer_s);
        let inner_bounds = Self::sector_bounds(inner_s);
        inner_bounds.is_subset_of(&outer_bounds)
            && polygon_contains_all_vertices(&inner_s.flat_xy, &outer_s.flat_xy)
    }

    /// Whether `ancestor` is a strict ancestor of `sector` in the
    /// containment forest.
    pub fn child_of(&self, sector: SectorId, ancestor: SectorId) -> bool {
        let mut cur = self.sectors.get(sector).and_then(|s| s.parent);
        while let Some(p) = cur {
            if p == ancestor {
                return true;
            }
            cur = self.sectors.get(p).and_then(|s| s.parent);
        }
        false
    }

    /// Register `sector` into the containment forest: find its parent,
    /// adopt any sibling it fully contains, and patch open sides (spec
    /// §4.6).
    pub(crate) fn sectors_add_to_map(&mut self, sector: SectorId) {
        let mut candidates: Vec<SectorId> = self
            .sectors
            .iter()
            .map(|(id, _)| id)
            .filter(|&id| id != sector)
            .collect();

        let mut best: Option<SectorId> = None;
        for &candidate in &candidates {
            if !self.fully_contains(candidate, sector) {
                continue;
            }
            best = Some(match best {
                None => candidate,
                Some(current_best) => {
                    if self.child_of(candidate, current_best) {
                        candidate
                    } else {
                        current_best
                    }
                }
            });
        }
        let parent = best;

        if let Some(p) = parent {
            if let Some(parent_sector) = self.sectors.get_mut(p) {
                parent_sector.children.push(sector);
            }
        }
        if let Some(s) = self.sectors.get_mut(sector) {
            s.parent = parent;
        }

        // Adopt siblings (same parent as `sector`) that `sector` fully
        // contains.
        candidates.retain(|&c| self.sectors.get(c).is_some_and(|s| s.parent == parent));
        for &sibling in &candidates {
            if sibling == sector || !self.fully_contains(sector, sibling) {
                continue;
            }
            if let Some(p) = parent {
                if let Some(parent_sector) = self.sectors.get_mut(p) {
                    parent_sector.children.retain(|&c| c != sibling);
                }
            }
            if let Some(sector_mut) = self.sectors.get_mut(sector) {
                sector_mut.children.push(sibling);
            }
            if let Some(sibling_mut) = self.sectors.get_mut(sibling) {
                sibling_mut.parent = Some(sector);
            }
        }

        // Patch open sides: a boundary line with a null far side gets the
        // parent as its "outside".
        let boundary = self.sectors.get(sector).map(|s| s.boundary.clone()).unwrap_or_default();
        for (line_id, is_front) in boundary {
            if let Some(line) = self.lines.get_mut(line_id) {
                let far = line.side_mut(!is_front);
                if far.sector.is_none() {
                    far.sector = parent;
                }
            }
        }

        self.emit(&ChangeEvent::SectorAdded(sector));
    }

    /// Remove `sector` from the containment forest and from the map:
    /// boundary sides pointing at it fall back to its parent, its children
    /// are reparented to its parent, and it is dropped from its parent's
    /// child list.
    pub(crate) fn sectors_remove_from_map(&mut self, sector: SectorId) {
        let Some(removed) = self.sectors.get(sector).cloned() else {
            return;
        };

        for &(line_id, _) in &removed.boundary {
            if let Some(line) = self.lines.get_mut(line_id) {
                for side_is_front in [true, false] {
                    let side = line.side_mut(side_is_front);
                    if side.sector == Some(sector) {
                        side.sector = removed.parent;
                    }
                }
            }
        }

        for &child in &removed.children {
            if let Some(child_sector) = self.sectors.get_mut(child) {
                child_sector.parent = removed.parent;
            }
        }
        if let Some(parent_id) = removed.parent {
            if let Some(parent_sector) = self.sectors.get_mut(parent_id) {
                parent_sector.children.retain(|&c| c != sector);
                parent_sector.children.extend(removed.children.iter().copied());
            }
        }

        self.sectors.remove(sector);
        self.spatial.remove_sector(sector);
        self.emit(&ChangeEvent::SectorRemoved(sector));
    }

    /// Trace continuous boundary loops between this sector and each direct
    /// child — the lines whose one side is `sector` and other side is a
    /// child — yielding one CCW flat polygon per connected boundary
    /// component (spec §4.6, for external renderers).
    pub fn merge_child_vectors(&self, sector: SectorId) -> Vec<Vec<i64>> {
        let Some(s) = self.sectors.get(sector) else {
            return Vec::new();
        };
        let children: hashbrown::HashSet<SectorId> = s.children.iter().copied().collect();

        let mut boundary_lines: Vec<(crate::ids::LineId, bool)> = Vec::new();
        for &(line_id, is_front) in &s.boundary {
            let Some(line) = self.lines.get(line_id) else {
                continue;
            };
            let far = line.side(!is_front).sector;
            if far.is_some_and(|f| children.contains(&f)) {
                boundary_lines.push((line_id, is_front));
            }
        }

        let mut visited = hashbrown::HashSet::new();
        let mut loops = Vec::new();
        for &(start_line, start_front) in &boundary_lines {
            if visited.contains(&start_line) {
                continue;
            }
            let mut flat = Vec::new();
            let mut cur = Some((start_line, start_front));
            let mut guard = 0usize;
            while let Some((line_id, is_front)) = cur {
                if visited.contains(&line_id) || guard > boundary_lines.len() + 1 {
                    break;
                }
                visited.insert(line_id);
                guard += 1;
                let Some(line) = self.lines.get(line_id) else {
                    break;
                };
                let (from, to) = if is_front { (line.v0, line.v1) } else { (line.v1, line.v0) };
                if let Some(v) = self.vertices.get(from) {
                    flat.push(v.x);
                    flat.push(v.y);
                }
                let to_key = self.vertex_key_of(to);
                cur = boundary_lines.iter().copied().find(|&(l, f)| {
                    if visited.contains(&l) {
                        return false;
                    }
                    self.lines.get(l).is_some_and(|ln| {
                        let from2 = if f { ln.v0 } else { ln.v1 };
                        self.vertex_key_of(from2) == to_key
                    })
                });
            }
            if flat.len() >= 6 {
                loops.push(flat);
            }
        }
        loops
    }
}
