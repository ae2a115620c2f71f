// Copyright 2025 the mapcore Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The public planar-subdivision edit API (spec §4.4): `add_vertex`,
//! `remove_vertex`, `move_vertex`, `add_line`, `remove_line`, and
//! `would_segment_cross_any`.

use alloc::vec::Vec;
use hashbrown::HashSet;
use mapcore_grid::Aabb;

use crate::error::{EditOutcome, Result};
use crate::flags::Flags;
use crate::geom::{self, Orientation, Point};
use crate::ids::{LineId, VertexId};
use crate::keys;
use crate::side::Side;

use super::Map;

/// The offending line [`Map::would_segment_cross_any`] found, and how it
/// conflicts with the candidate segment.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WouldCross {
    /// Properly intersects the candidate at an interior point.
    Proper(LineId),
    /// Collinear with the candidate and overlaps it beyond a shared
    /// endpoint.
    CollinearOverlap(LineId),
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "endpoints are re-derived from integer inputs via bounded arithmetic; a level map never approaches i64 overflow"
)]
fn round_point(x: f64, y: f64) -> (i64, i64) {
    (x.round() as i64, y.round() as i64)
}

impl Map {
    /// Collect every line whose bound overlaps `query`, deduplicated.
    fn overlapping_lines(&self, query: Aabb) -> Vec<LineId> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        self.spatial.query_lines_overlapping(query, |id| {
            if seen.insert(id) {
                out.push(id);
            }
            true
        });
        out
    }

    /// Ensure a vertex exists at `(x, y)`, splitting any line it lies
    /// collinearly within (spec §4.4 `add_vertex`).
    pub fn add_vertex(&mut self, x: i64, y: i64, skip_rebuild: bool) -> Result<VertexId> {
        self.guard_reentrancy()?;
        if let Some(id) = self.find_vertex(x, y) {
            if !skip_rebuild {
                self.rebuild_sectors()?;
            }
            return Ok(id);
        }

        let id = self.insert_vertex_through_history(x, y);
        let p = Point::new(x, y);
        for line_id in self.overlapping_lines(Aabb::point(x, y)) {
            let Some(line) = self.lines.get(line_id) else {
                continue;
            };
            if line.v0 == id || line.v1 == id {
                continue;
            }
            let (a, b) = (self.vertex_point(line.v0), self.vertex_point(line.v1));
            if geom::orientation(a, b, p) == Orientation::Collinear && geom::on_segment(a, p, b) {
                log::trace!("add_vertex({x}, {y}): splitting line {line_id:?} at the new vertex");
                self.split_line_at_vertex(line_id, id);
            }
        }

        if !skip_rebuild {
            self.rebuild_sectors()?;
        }
        Ok(id)
    }

    /// Split `line_id` at `vertex` (already confirmed collinear and
    /// contained), preserving both sides' attributes on the two halves.
    fn split_line_at_vertex(&mut self, line_id: LineId, vertex: VertexId) {
        let Some(line) = self.lines.get(line_id) else {
            return;
        };
        if line.v0 == vertex || line.v1 == vertex {
            return;
        }
        let a = self.vertex_key_of(line.v0);
        let mid = self.vertex_key_of(vertex);
        let b = self.vertex_key_of(line.v1);
        let (front, back, flags) = (line.front.clone(), line.back.clone(), line.flags);

        self.remove_line_through_history(line_id);
        self.insert_line_through_history(a, mid, front.clone(), back.clone(), flags);
        self.insert_line_through_history(mid, b, front, back, flags);
    }

    /// Remove a vertex and every line incident to it (spec §4.4
    /// `remove_vertex`); each line removal and the vertex removal are
    /// separate history steps.
    pub fn remove_vertex(&mut self, x: i64, y: i64, skip_rebuild: bool) -> Result<EditOutcome<()>> {
        self.guard_reentrancy()?;
        let Some(id) = self.find_vertex(x, y) else {
            return Ok(EditOutcome::NoEffect);
        };
        let incident: Vec<LineId> = self.vertices.get(id).map(|v| v.incident.clone()).unwrap_or_default();
        for line_id in incident {
            self.remove_line_through_history(line_id);
        }
        self.remove_vertex_through_history(id);

        if !skip_rebuild {
            self.rebuild_sectors()?;
        }
        Ok(EditOutcome::Applied(()))
    }

    /// Move a vertex, merging into an existing vertex at `to` if one is
    /// already there (spec §4.4 `move_vertex`). Every incident line is
    /// reinserted against the moved endpoint rather than mutated in place,
    /// so the change composes with history.
    pub fn move_vertex(&mut self, from: (i64, i64), to: (i64, i64), skip_rebuild: bool) -> Result<EditOutcome<()>> {
        self.guard_reentrancy()?;
        let Some(old_id) = self.find_vertex(from.0, from.1) else {
            return Ok(EditOutcome::NoEffect);
        };
        if from == to {
            return Ok(EditOutcome::NoEffect);
        }

        let new_id = match self.find_vertex(to.0, to.1) {
            Some(existing) => existing,
            None => self.insert_vertex_through_history(to.0, to.1),
        };

        let incident: Vec<LineId> = self.vertices.get(old_id).map(|v| v.incident.clone()).unwrap_or_default();
        for line_id in incident {
            let Some(line) = self.lines.get(line_id) else {
                continue;
            };
            let Some(other) = line.other_endpoint(old_id) else {
                continue;
            };
            if other == new_id {
                self.remove_line_through_history(line_id);
                continue;
            }
            let other_key = self.vertex_key_of(other);
            let candidate_key = keys::line_key(to, other_key);
            if self.line_map.contains_key(&candidate_key) {
                self.remove_line_through_history(line_id);
                continue;
            }
            let (v0_is_old, front, back, flags) = (line.v0 == old_id, line.front.clone(), line.back.clone(), line.flags);
            let (a, b) = if v0_is_old { (to, other_key) } else { (other_key, to) };
            self.insert_line_through_history(a, b, front, back, flags);
            self.remove_line_through_history(line_id);
        }
        self.remove_vertex_through_history(old_id);

        if !skip_rebuild {
            self.rebuild_sectors()?;
        }
        Ok(EditOutcome::Applied(()))
    }

    /// Add a line between `from` and `to`, splitting/merging with existing
    /// geometry as needed (spec §4.4 `add_line`, the densest operation in
    /// the core). Returns every line newly created.
    pub fn add_line(&mut self, from: (i64, i64), to: (i64, i64), skip_rebuild: bool) -> Result<EditOutcome<Vec<LineId>>> {
        self.guard_reentrancy()?;
        if from == to {
            return Ok(EditOutcome::NoEffect);
        }

        // 2. Ensure both endpoints exist (splits collinear lines at them).
        self.add_vertex(from.0, from.1, true)?;
        self.add_vertex(to.0, to.1, true)?;

        // 3. Exact line already present: no-op.
        if self.find_line(from, to).is_some() {
            if !skip_rebuild {
                self.rebuild_sectors()?;
            }
            return Ok(EditOutcome::NoEffect);
        }

        let a = Point::new(from.0, from.1);
        let b = Point::new(to.0, to.1);
        let bounds = self.line_bounds_of_points(a, b);

        // 4. Proper intersections become vertices, splitting both lines.
        // Each split changes the graph, so re-scan after every resolved
        // intersection rather than working off one stale candidate list.
        loop {
            let mut hit = None;
            for line_id in self.overlapping_lines(bounds) {
                let Some(line) = self.lines.get(line_id) else {
                    continue;
                };
                let (pa, pb) = (self.vertex_point(line.v0), self.vertex_point(line.v1));
                if geom::segments_properly_intersect(a, b, pa, pb) {
                    if let Some(point) = geom::intersection_point(a, b, pa, pb) {
                        hit = Some(round_point(point.0, point.1));
                        break;
                    }
                }
            }
            match hit {
                Some((x, y)) => {
                    log::trace!("add_line({from:?}, {to:?}): proper intersection at ({x}, {y})");
                    self.add_vertex(x, y, true)?;
                }
                None => break,
            }
        }

        // 5. Parameterize collinear overlaps along the new segment and
        // find the gaps between them.
        let (ax, ay) = a.to_f64();
        let (bx, by) = b.to_f64();
        let dx = bx - ax;
        let dy = by - ay;
        let len2 = dx * dx + dy * dy;
        let t_of = |p: Point| -> f64 {
            let (px, py) = p.to_f64();
            ((px - ax) * dx + (py - ay) * dy) / len2
        };

        let mut intervals: Vec<(f64, f64)> = Vec::new();
        for line_id in self.overlapping_lines(bounds) {
            let Some(line) = self.lines.get(line_id) else {
                continue;
            };
            let (pa, pb) = (self.vertex_point(line.v0), self.vertex_point(line.v1));
            if geom::orientation(a, b, pa) != Orientation::Collinear || geom::orientation(a, b, pb) != Orientation::Collinear {
                continue;
            }
            let (s, e) = {
                let (s0, s1) = (t_of(pa), t_of(pb));
                (s0.min(s1).max(0.0), s0.max(s1).min(1.0))
            };
            if e > s {
                intervals.push((s, e));
            }
        }
        intervals.sort_by(|x, y| x.0.partial_cmp(&y.0).unwrap_or(core::cmp::Ordering::Equal));
        let mut merged: Vec<(f64, f64)> = Vec::new();
        for (s, e) in intervals {
            if let Some(last) = merged.last_mut() {
                if s <= last.1 + geom::EPSILON {
                    last.1 = last.1.max(e);
                    continue;
                }
            }
            merged.push((s, e));
        }

        let mut gaps: Vec<(f64, f64)> = Vec::new();
        let mut cursor = 0.0_f64;
        for &(s, e) in &merged {
            if s - cursor > geom::EPSILON {
                gaps.push((cursor, s));
            }
            cursor = cursor.max(e);
        }
        if 1.0 - cursor > geom::EPSILON {
            gaps.push((cursor, 1.0));
        }

        // 6. Create a line for each gap.
        let mut created = Vec::new();
        for (s, e) in gaps {
            if e - s <= geom::EPSILON {
                continue;
            }
            let (sx, sy) = round_point(ax + s * dx, ay + s * dy);
            let (ex, ey) = round_point(ax + e * dx, ay + e * dy);
            if (sx, sy) == (ex, ey) {
                continue;
            }
            self.add_vertex(sx, sy, true)?;
            self.add_vertex(ex, ey, true)?;
            if self.find_line((sx, sy), (ex, ey)).is_some() {
                continue;
            }
            let id = self.insert_line_through_history((sx, sy), (ex, ey), Side::default(), Side::default(), Flags::empty());
            created.push(id);
        }

        // 7. Outward collinear merge at each new line's endpoints.
        let mut final_ids = Vec::with_capacity(created.len());
        for id in created {
            final_ids.push(self.merge_collinear_at_both_ends(id)?);
        }

        if !skip_rebuild {
            self.rebuild_sectors()?;
        }
        Ok(EditOutcome::Applied(final_ids))
    }

    fn line_bounds_of_points(&self, a: Point, b: Point) -> Aabb {
        Aabb::new(a.x.min(b.x), a.y.min(b.y), a.x.max(b.x), a.y.max(b.y))
    }

    /// Repeatedly merge `line_id` with a collinear neighbor at either
    /// endpoint until no merge applies, returning the final surviving id.
    fn merge_collinear_at_both_ends(&mut self, mut line_id: LineId) -> Result<LineId> {
        loop {
            let Some(line) = self.lines.get(line_id) else {
                return Ok(line_id);
            };
            let (v0, v1) = (line.v0, line.v1);
            let mut merged = false;
            for end in [v0, v1] {
                if let Some(new_id) = self.try_merge_at(line_id, end)? {
                    line_id = new_id;
                    merged = true;
                    break;
                }
            }
            if !merged {
                return Ok(line_id);
            }
        }
    }

    /// Attempt one collinear merge of `line_id` with a neighbor sharing
    /// `vertex`, per spec §4.4 step 7's three conditions.
    fn try_merge_at(&mut self, line_id: LineId, vertex: VertexId) -> Result<Option<LineId>> {
        let Some(line) = self.lines.get(line_id) else {
            return Ok(None);
        };
        let Some(other_end) = line.other_endpoint(vertex) else {
            return Ok(None);
        };
        let (pa, pb) = (self.vertex_point(other_end), self.vertex_point(vertex));

        let incident: Vec<LineId> = self.vertices.get(vertex).map(|v| v.incident.clone()).unwrap_or_default();
        for neighbor_id in incident {
            if neighbor_id == line_id {
                continue;
            }
            let Some(neighbor) = self.lines.get(neighbor_id) else {
                continue;
            };
            let Some(far) = neighbor.other_endpoint(vertex) else {
                continue;
            };
            if far == other_end {
                continue;
            }
            let pc = self.vertex_point(far);
            if geom::orientation(pa, pb, pc) != Orientation::Collinear {
                continue;
            }

            let ignore = [line_id, neighbor_id];
            if self.would_segment_cross_any(other_end, far, &ignore)?.is_some() {
                continue;
            }

            let neighbor_v0_is_vertex = neighbor.v0 == vertex;
            let (new_v0, new_v1, front, back, flags) = if neighbor_v0_is_vertex {
                (other_end, far, neighbor.front.clone(), neighbor.back.clone(), neighbor.flags)
            } else {
                (far, other_end, neighbor.front.clone(), neighbor.back.clone(), neighbor.flags)
            };
            let merged_key = keys::line_key(self.vertex_key_of(new_v0), self.vertex_key_of(new_v1));

            if let Some(&existing) = self.line_map.get(&merged_key) {
                log::trace!("merging collinear lines {line_id:?} and {neighbor_id:?} into existing line {existing:?}");
                self.remove_line_through_history(line_id);
                self.remove_line_through_history(neighbor_id);
                return Ok(Some(existing));
            }

            let new_id = self.insert_line_through_history(
                self.vertex_key_of(new_v0),
                self.vertex_key_of(new_v1),
                front,
                back,
                flags,
            );
            log::trace!("merging collinear lines {line_id:?} and {neighbor_id:?} into new line {new_id:?}");
            self.remove_line_through_history(line_id);
            self.remove_line_through_history(neighbor_id);
            return Ok(Some(new_id));
        }
        Ok(None)
    }

    /// Remove the line between `from` and `to`, if present (spec §4.4
    /// `remove_line`).
    pub fn remove_line(&mut self, from: (i64, i64), to: (i64, i64), skip_rebuild: bool) -> Result<EditOutcome<()>> {
        self.guard_reentrancy()?;
        let Some(id) = self.find_line(from, to) else {
            return Ok(EditOutcome::NoEffect);
        };
        self.remove_line_through_history(id);
        if !skip_rebuild {
            self.rebuild_sectors()?;
        }
        Ok(EditOutcome::Applied(()))
    }

    /// The first existing line (other than `ignore`) that either properly
    /// intersects segment `(a, c)` or overlaps it collinearly beyond a
    /// shared endpoint (spec §4.4).
    pub fn would_segment_cross_any(&self, a: VertexId, c: VertexId, ignore: &[LineId]) -> Result<Option<WouldCross>> {
        let (pa, pc) = (self.vertex_point(a), self.vertex_point(c));
        let bounds = self.line_bounds_of_points(pa, pc);
        let mut hit = None;
        self.spatial.query_lines_overlapping(bounds, |id| {
            if ignore.contains(&id) {
                return true;
            }
            let Some(line) = self.lines.get(id) else {
                return true;
            };
            let (pb, pd) = (self.vertex_point(line.v0), self.vertex_point(line.v1));
            if geom::segments_properly_intersect(pa, pc, pb, pd) {
                hit = Some(WouldCross::Proper(id));
                return false;
            }
            if geom::collinear_overlap_more_than_endpoint(pa, pc, pb, pd) {
                hit = Some(WouldCross::CollinearOverlap(id));
                return false;
            }
            true
        });
        Ok(hit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corners(map: &Map) -> Vec<(i64, i64)> {
        let mut out: Vec<(i64, i64)> = map.vertices.iter().map(|(_, v)| (v.x, v.y)).collect();
        out.sort_unstable();
        out
    }

    #[test]
    fn box_of_four_lines_recovers_one_sector() {
        let mut map = Map::new();
        map.add_line((0, 0), (100, 0), true).unwrap();
        map.add_line((100, 0), (100, 100), true).unwrap();
        map.add_line((100, 100), (0, 100), true).unwrap();
        map.add_line((0, 100), (0, 0), false).unwrap();

        assert_eq!(map.vertex_count(), 4);
        assert_eq!(map.line_count(), 4);
        assert_eq!(map.sector_count(), 1);
        let (_, sector) = map.sectors.iter().next().unwrap();
        assert!(geom::is_ccw(&sector.flat_xy));
        assert_eq!(sector.parent, None);
    }

    #[test]
    fn add_vertex_splits_collinear_line_and_preserves_sides() {
        let mut map = Map::new();
        map.add_line((0, 0), (100, 0), true).unwrap();
        let line_id = map.find_line((0, 0), (100, 0)).unwrap();
        map.set_side_property(line_id, true, "texture_middle", crate::value::PropertyValue::Str(alloc::string::String::from("BRICK"))).unwrap();

        map.add_vertex(50, 0, true).unwrap();

        assert!(map.find_line((0, 0), (100, 0)).is_none());
        let left = map.find_line((0, 0), (50, 0)).unwrap();
        let right = map.find_line((50, 0), (100, 0)).unwrap();
        assert_eq!(map.line(left).unwrap().front.texture_middle, "BRICK");
        assert_eq!(map.line(right).unwrap().front.texture_middle, "BRICK");
        assert_eq!(corners(&map), alloc::vec![(0, 0), (50, 0), (100, 0)]);
    }

    #[test]
    fn crossing_segments_split_at_intersection() {
        let mut map = Map::new();
        map.add_line((0, 0), (100, 100), true).unwrap();
        map.add_line((0, 100), (100, 0), true).unwrap();

        assert!(map.find_vertex(50, 50).is_some());
        assert_eq!(map.line_count(), 4);
    }

    #[test]
    fn collinear_segments_merge_on_add() {
        let mut map = Map::new();
        map.add_line((0, 0), (50, 0), true).unwrap();
        map.add_line((50, 0), (100, 0), true).unwrap();
        map.add_line((0, 0), (100, 0), true).unwrap();

        assert_eq!(map.line_count(), 1);
        assert!(map.find_line((0, 0), (100, 0)).is_some());
    }

    #[test]
    fn add_line_twice_is_idempotent() {
        let mut map = Map::new();
        let first = map.add_line((0, 0), (10, 0), true).unwrap();
        let second = map.add_line((0, 0), (10, 0), true).unwrap();
        assert!(first.applied());
        assert!(!second.applied());
        assert_eq!(map.line_count(), 1);
    }

    #[test]
    fn remove_vertex_drops_incident_lines() {
        let mut map = Map::new();
        map.add_line((0, 0), (50, 0), true).unwrap();
        map.add_line((50, 0), (100, 0), true).unwrap();

        map.remove_vertex(50, 0, true).unwrap();

        assert_eq!(map.line_count(), 0);
        assert_eq!(map.vertex_count(), 2);
    }

    #[test]
    fn move_vertex_merges_into_existing_target() {
        let mut map = Map::new();
        map.add_line((0, 0), (10, 0), true).unwrap();
        map.add_line((20, 0), (20, 10), true).unwrap();

        map.move_vertex((10, 0), (20, 0), true).unwrap();

        assert!(map.find_line((0, 0), (20, 0)).is_some());
        assert!(map.find_vertex(10, 0).is_none());
    }

    #[test]
    fn degenerate_zero_length_add_line_is_no_effect() {
        let mut map = Map::new();
        let outcome = map.add_line((5, 5), (5, 5), true).unwrap();
        assert!(!outcome.applied());
    }
}
