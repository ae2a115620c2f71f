// Copyright 2025 the mapcore Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Face recovery: rebuild sectors from the current edge graph (spec §4.5).
//!
//! Works on a local working set — the modified lines plus every line
//! sharing a vertex with one of them — rather than the whole graph, so
//! interactive edits stay close to `O(changed edges · local degree)`.

use alloc::vec::Vec;
use hashbrown::{HashMap, HashSet};
use mapcore_grid::Aabb;

use crate::error::{Error, Result};
use crate::geom;
use crate::ids::{LineId, SectorId, VertexId};
use crate::notify::ChangeEvent;
use crate::sector::{Sector, SectorProperties};

use super::Map;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
struct DirectedEdge {
    line: LineId,
    forward: bool,
}

impl DirectedEdge {
    fn endpoints(self, map: &Map) -> Option<(VertexId, VertexId)> {
        let line = map.lines.get(self.line)?;
        Some(if self.forward { (line.v0, line.v1) } else { (line.v1, line.v0) })
    }
}

impl Map {
    /// Recompute every sector touched by `modified_lines`. A no-op if
    /// nothing was modified.
    pub fn rebuild_sectors(&mut self) -> Result<()> {
        if self.modified_lines.is_empty() {
            return Ok(());
        }

        // 1. Working set: modified lines, their endpoints, and every other
        // line incident to those endpoints.
        let mut l_set: HashSet<LineId> = self.modified_lines.iter().copied().collect();
        let mut v_set: HashSet<VertexId> = HashSet::new();
        for &line_id in &l_set {
            if let Some(line) = self.lines.get(line_id) {
                v_set.insert(line.v0);
                v_set.insert(line.v1);
            }
        }
        let mut extra = Vec::new();
        for &v in &v_set {
            if let Some(vertex) = self.vertices.get(v) {
                for &l in &vertex.incident {
                    if l_set.insert(l) {
                        extra.push(l);
                    }
                }
            }
        }
        for &line_id in &extra {
            if let Some(line) = self.lines.get(line_id) {
                v_set.insert(line.v0);
                v_set.insert(line.v1);
            }
        }
        log::debug!("rebuild working set: {} lines, {} vertices", l_set.len(), v_set.len());

        // 2. Invalidate touching sectors: snapshot each side's current
        // sector's properties into `sector_old`, then drop those sectors
        // from the map entirely.
        let mut front_back: Vec<(LineId, Option<SectorId>, Option<SectorId>)> = Vec::new();
        for &line_id in &l_set {
            if let Some(line) = self.lines.get(line_id) {
                front_back.push((line_id, line.front.sector, line.back.sector));
            }
        }
        let mut invalidated: HashSet<SectorId> = HashSet::new();
        for &(_, f, b) in &front_back {
            invalidated.extend(f);
            invalidated.extend(b);
        }
        let templates: HashMap<SectorId, SectorProperties> = invalidated
            .iter()
            .filter_map(|&s| self.sectors.get(s).map(|sec| (s, sec.properties.clone())))
            .collect();
        for (line_id, f, b) in front_back {
            if let Some(line) = self.lines.get_mut(line_id) {
                line.front.sector_old = f.and_then(|s| templates.get(&s).cloned());
                line.back.sector_old = b.and_then(|s| templates.get(&s).cloned());
            }
        }
        for sector_id in invalidated {
            self.sectors_remove_from_map(sector_id);
        }

        // 3. Build directed edges, bucket by origin, sort each bucket by
        // absolute polar angle.
        let mut edges_by_vertex: HashMap<VertexId, Vec<DirectedEdge>> = HashMap::new();
        for &line_id in &l_set {
            if let Some(line) = self.lines.get(line_id) {
                edges_by_vertex.entry(line.v0).or_default().push(DirectedEdge { line: line_id, forward: true });
                edges_by_vertex.entry(line.v1).or_default().push(DirectedEdge { line: line_id, forward: false });
            }
        }
        for (&origin, bucket) in &mut edges_by_vertex {
            let origin_pt = self.vertex_point(origin);
            bucket.sort_by(|a, b| {
                let pa = self.vertex_point(a.endpoints(self).map_or(origin, |(_, d)| d));
                let pb = self.vertex_point(b.endpoints(self).map_or(origin, |(_, d)| d));
                geom::angle_to(origin_pt, pa)
                    .partial_cmp(&geom::angle_to(origin_pt, pb))
                    .unwrap_or(core::cmp::Ordering::Equal)
            });
        }

        // 4. Trace CCW loops.
        let mut visited: HashSet<DirectedEdge> = HashSet::new();
        let mut starts: Vec<DirectedEdge> = edges_by_vertex.values().flatten().copied().collect();
        starts.sort_by_key(|e| (e.line.raw_parts(), u8::from(!e.forward)));

        let mut kept: Vec<(Vec<(LineId, bool)>, Vec<i64>)> = Vec::new();
        for start in starts {
            if visited.contains(&start) {
                continue;
            }
            match self.trace_loop(&edges_by_vertex, start, self.config().rebuild_step_limit)? {
                Some(loop_edges) => {
                    let flat = self.flatten_loop(&loop_edges);
                    if geom::is_ccw(&flat) {
                        for &e in &loop_edges {
                            visited.insert(e);
                        }
                        let boundary = loop_edges.iter().map(|e| (e.line, e.forward)).collect();
                        kept.push((boundary, flat));
                    }
                }
                None => continue,
            }
        }

        // 5. Assign sectors.
        let mut created = Vec::new();
        for (boundary, flat) in kept {
            let template = boundary.iter().find_map(|&(line_id, forward)| {
                self.lines.get(line_id).and_then(|line| {
                    let side = line.side(forward);
                    side.sector_override.clone().or_else(|| side.sector_old.clone())
                })
            });
            let mut sector = Sector::new(boundary.clone(), flat.clone());
            if let Some(props) = template {
                sector.properties = props;
            }
            let sector_id = self.sectors.insert(sector);
            self.spatial.insert_sector(sector_id, Self::bounds_of_flat(&flat));
            for &(line_id, forward) in &boundary {
                if let Some(line) = self.lines.get_mut(line_id) {
                    line.side_mut(forward).sector = Some(sector_id);
                }
            }
            self.sectors_add_to_map(sector_id);
            created.push(sector_id);
        }

        // 6. Clear transients on every line in the map (not just L — a
        // pasted submap may have set `sector_override` on lines outside
        // this rebuild's own working set), then clear `modified_lines`.
        let all_lines: Vec<LineId> = self.lines.iter().map(|(id, _)| id).collect();
        for line_id in all_lines {
            if let Some(line) = self.lines.get_mut(line_id) {
                line.front.sector_old = None;
                line.front.sector_override = None;
                line.back.sector_old = None;
                line.back.sector_override = None;
            }
        }
        self.modified_lines.clear();

        self.emit(&ChangeEvent::SectorsRebuilt(created));
        Ok(())
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

    fn flatten_loop(&self, loop_edges: &[DirectedEdge]) -> Vec<i64> {
        let mut flat = Vec::with_capacity(loop_edges.len() * 2);
        for &edge in loop_edges {
            if let Some((from, _)) = edge.endpoints(self) {
                let p = self.vertex_point(from);
                flat.push(p.x);
                flat.push(p.y);
            }
        }
        flat
    }

    /// Trace a closed CCW loop starting at `start`. Returns `Ok(None)` if
    /// the trace dead-ends or exceeds `step_limit` (spec §4.5 step 4: abort
    /// that loop only) and `Ok(Some(edges))` on a closed loop regardless of
    /// winding — the caller filters by signed area.
    fn trace_loop(
        &self,
        edges_by_vertex: &HashMap<VertexId, Vec<DirectedEdge>>,
        start: DirectedEdge,
        step_limit: usize,
    ) -> Result<Option<Vec<DirectedEdge>>> {
        let mut edges = alloc::vec![start];
        let mut current = start;
        let mut steps = 0usize;
        loop {
            let Some((_, arrival)) = current.endpoints(self) else {
                return Ok(None);
            };
            let Some(bucket) = edges_by_vertex.get(&arrival) else {
                return Ok(None);
            };
            let Some(next) = self.next_left(bucket, current, arrival)? else {
                return Ok(None);
            };
            if next == start {
                return Ok(Some(edges));
            }
            edges.push(next);
            current = next;
            steps += 1;
            if steps > step_limit {
                log::warn!("rebuild loop trace exceeded step limit ({step_limit}), discarding loop");
                return Ok(None);
            }
        }
    }

    /// Pick the outgoing edge at `arrival` whose CCW turn from the reverse
    /// of `incoming` is the smallest strictly positive delta (spec §4.5
    /// step 4). `Ok(None)` if `arrival` has no other outgoing edge (a
    /// dead-end stub — a legitimate, if unremarkable, trace failure).
    /// `Err` only if multiple outgoing edges exist yet none has a strictly
    /// positive delta, which can only happen with duplicate-direction
    /// overlapping lines at the same vertex (spec §9 Open Questions).
    fn next_left(
        &self,
        bucket: &[DirectedEdge],
        incoming: DirectedEdge,
        arrival: VertexId,
    ) -> Result<Option<DirectedEdge>> {
        if bucket.len() <= 1 {
            return Ok(bucket.first().copied());
        }
        let arrival_pt = self.vertex_point(arrival);
        let Some((origin, _)) = incoming.endpoints(self) else {
            return Ok(None);
        };
        let reverse_angle = geom::angle_to(arrival_pt, self.vertex_point(origin));

        let mut best: Option<(f64, DirectedEdge)> = None;
        for &candidate in bucket {
            let Some((_, dest)) = candidate.endpoints(self) else {
                continue;
            };
            let delta = geom::angle_ccw_delta(reverse_angle, geom::angle_to(arrival_pt, self.vertex_point(dest)));
            if delta <= geom::EPSILON {
                continue;
            }
            if best.is_none_or(|(best_delta, _)| delta < best_delta) {
                best = Some((delta, candidate));
            }
        }

        match best {
            Some((_, edge)) => Ok(Some(edge)),
            None => {
                debug_assert!(
                    false,
                    "next_left found no strictly positive CCW delta among multiple outgoing edges"
                );
                Err(Error::Invariant(
                    "next_left: duplicate-direction edges at a vertex, no strictly positive CCW delta",
                ))
            }
        }
    }
}
