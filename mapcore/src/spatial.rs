// Copyright 2025 the mapcore Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Uniform spatial index over every registered entity's bounds (spec §4.2).
//!
//! One [`mapcore_grid::Grid`] per entity kind, each keyed by the entity's
//! own [`Id`](crate::ids::Id) so a query yields the handle directly rather
//! than an opaque grid key. `Map` keeps the `mapcore_grid::Key` each entity
//! was registered under so it can be removed in O(1) without a grid-wide
//! scan.

use hashbrown::HashMap;
use mapcore_grid::{Aabb, Grid, Key};

use crate::ids::{LineId, SectorId, ThingId, VertexId};

/// Four independent uniform grids, one per entity kind, sharing a cell
/// size (spec invariant 9: every cell overlapping an entity's bounds
/// contains it, and no other cell does).
pub struct SpatialIndex {
    vertices: Grid<VertexId>,
    lines: Grid<LineId>,
    sectors: Grid<SectorId>,
    things: Grid<ThingId>,
    vertex_keys: HashMap<VertexId, Key>,
    line_keys: HashMap<LineId, Key>,
    sector_keys: HashMap<SectorId, Key>,
    thing_keys: HashMap<ThingId, Key>,
}

impl SpatialIndex {
    /// Create an index with the given uniform cell size.
    pub fn new(cell_size: i64) -> Self {
        Self {
            vertices: Grid::new(cell_size),
            lines: Grid::new(cell_size),
            sectors: Grid::new(cell_size),
            things: Grid::new(cell_size),
            vertex_keys: HashMap::new(),
            line_keys: HashMap::new(),
            sector_keys: HashMap::new(),
            thing_keys: HashMap::new(),
        }
    }

    /// Register a vertex at a point bound.
    pub fn insert_vertex(&mut self, id: VertexId, x: i64, y: i64) {
        let key = self.vertices.insert(Aabb::point(x, y), id);
        self.vertex_keys.insert(id, key);
    }

    /// Deregister a vertex.
    pub fn remove_vertex(&mut self, id: VertexId) {
        if let Some(key) = self.vertex_keys.remove(&id) {
            self.vertices.remove(key);
        }
    }

    /// Register a line at its endpoint-spanning bound.
    pub fn insert_line(&mut self, id: LineId, bounds: Aabb) {
        let key = self.lines.insert(bounds, id);
        self.line_keys.insert(id, key);
    }

    /// Deregister a line.
    pub fn remove_line(&mut self, id: LineId) {
        if let Some(key) = self.line_keys.remove(&id) {
            self.lines.remove(key);
        }
    }

    /// Register a sector at its polygon's bound.
    pub fn insert_sector(&mut self, id: SectorId, bounds: Aabb) {
        let key = self.sectors.insert(bounds, id);
        self.sector_keys.insert(id, key);
    }

    /// Deregister a sector.
    pub fn remove_sector(&mut self, id: SectorId) {
        if let Some(key) = self.sector_keys.remove(&id) {
            self.sectors.remove(key);
        }
    }

    /// Register a thing at a point bound.
    pub fn insert_thing(&mut self, id: ThingId, x: i64, y: i64) {
        let key = self.things.insert(Aabb::point(x, y), id);
        self.thing_keys.insert(id, key);
    }

    /// Deregister a thing.
    pub fn remove_thing(&mut self, id: ThingId) {
        if let Some(key) = self.thing_keys.remove(&id) {
            self.things.remove(key);
        }
    }

    /// Visit every vertex whose bound is fully inside `query`.
    pub fn query_vertices(&self, query: Aabb, f: impl FnMut(VertexId) -> bool) {
        Self::drive(&self.vertices, query, f);
    }

    /// Visit every line whose bound is fully inside `query`.
    pub fn query_lines(&self, query: Aabb, f: impl FnMut(LineId) -> bool) {
        Self::drive(&self.lines, query, f);
    }

    /// Visit every sector whose bound is fully inside `query`.
    pub fn query_sectors(&self, query: Aabb, f: impl FnMut(SectorId) -> bool) {
        Self::drive(&self.sectors, query, f);
    }

    /// Visit every thing whose bound is fully inside `query`.
    pub fn query_things(&self, query: Aabb, f: impl FnMut(ThingId) -> bool) {
        Self::drive(&self.things, query, f);
    }

    /// Visit every line whose bound merely overlaps `query` (used by face
    /// recovery's incidence-closure expansion, which wants overlap
    /// candidates to refine further, not strict containment).
    pub fn query_lines_overlapping(&self, query: Aabb, mut f: impl FnMut(LineId) -> bool) {
        self.lines.query_rect_overlapping(query, |_k, id| f(id));
    }

    fn drive<P: Copy>(grid: &Grid<P>, query: Aabb, mut f: impl FnMut(P) -> bool) {
        grid.query_rect(query, |_k, p| f(p));
    }
}
