// Copyright 2025 the mapcore Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Spatial iteration API (spec §6): `iterate_vertices/lines/sectors/things`.
//! With bounds, driven by the spatial grid; without, by the master arena.
//! Callbacks return `false` to stop early.

use mapcore_grid::Aabb;

use crate::ids::{LineId, SectorId, ThingId, VertexId};
use crate::notify::SelectionEntry;

use super::Map;

macro_rules! iterate_method {
    ($name:ident, $id:ty, $entry:ident, $arena:ident, $query:ident) => {
        #[doc = concat!(
            "Visit every ",
            stringify!($arena),
            " in `min..=max` (or the whole arena if unbounded), optionally",
            " restricted to the current selection. Stops as soon as",
            " `callback` returns `false`."
        )]
        pub fn $name(
            &self,
            min: Option<(i64, i64)>,
            max: Option<(i64, i64)>,
            selection_only: bool,
            mut callback: impl FnMut($id) -> bool,
        ) {
            let keep = |id: $id| !selection_only || self.selection.contains(&SelectionEntry::$entry(id));
            match (min, max) {
                (Some(min), Some(max)) => {
                    let bounds = Aabb::new(min.0, min.1, max.0, max.1);
                    let mut stopped = false;
                    self.spatial.$query(bounds, |id| {
                        if stopped {
                            return false;
                        }
                        if keep(id) && !callback(id) {
                            stopped = true;
                            return false;
                        }
                        true
                    });
                }
                _ => {
                    for (id, _) in self.$arena.iter() {
                        if keep(id) && !callback(id) {
                            break;
                        }
                    }
                }
            }
        }
    };
}

impl Map {
    iterate_method!(iterate_vertices, VertexId, Vertex, vertices, query_vertices);
    iterate_method!(iterate_lines, LineId, Line, lines, query_lines);
    iterate_method!(iterate_sectors, SectorId, Sector, sectors, query_sectors);
    iterate_method!(iterate_things, ThingId, Thing, things, query_things);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbounded_iteration_visits_every_vertex() {
        let mut map = Map::new();
        map.add_vertex(0, 0, true).unwrap();
        map.add_vertex(10, 10, true).unwrap();
        let mut seen = 0;
        map.iterate_vertices(None, None, false, |_| {
            seen += 1;
            true
        });
        assert_eq!(seen, 2);
    }

    #[test]
    fn early_stop_halts_iteration() {
        let mut map = Map::new();
        map.add_vertex(0, 0, true).unwrap();
        map.add_vertex(10, 10, true).unwrap();
        map.add_vertex(20, 20, true).unwrap();
        let mut seen = 0;
        map.iterate_vertices(None, None, false, |_| {
            seen += 1;
            false
        });
        assert_eq!(seen, 1);
    }

    #[test]
    fn bounded_iteration_uses_spatial_grid() {
        let mut map = Map::new();
        map.add_vertex(0, 0, true).unwrap();
        map.add_vertex(500, 500, true).unwrap();
        let mut seen = 0;
        map.iterate_vertices(Some((-10, -10)), Some((10, 10)), false, |_| {
            seen += 1;
            true
        });
        assert_eq!(seen, 1);
    }

    #[test]
    fn selection_only_filters_by_current_selection() {
        let mut map = Map::new();
        let a = map.add_vertex(0, 0, true).unwrap();
        map.add_vertex(10, 10, true).unwrap();
        map.select([SelectionEntry::Vertex(a)]).unwrap();
        let mut seen = alloc::vec::Vec::new();
        map.iterate_vertices(None, None, true, |id| {
            seen.push(id);
            true
        });
        assert_eq!(seen, alloc::vec![a]);
    }
}
