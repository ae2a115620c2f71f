// Copyright 2025 the mapcore Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Structural invariants that must hold after any sequence of edits.

use hashbrown::HashSet;
use mapcore::geom;
use mapcore::value::PropertyValue;
use mapcore::Map;

fn all_vertices(map: &Map) -> Vec<mapcore::VertexId> {
    let mut ids = Vec::new();
    map.iterate_vertices(None, None, false, |id| {
        ids.push(id);
        true
    });
    ids
}

fn all_lines(map: &Map) -> Vec<mapcore::LineId> {
    let mut ids = Vec::new();
    map.iterate_lines(None, None, false, |id| {
        ids.push(id);
        true
    });
    ids
}

fn all_sectors(map: &Map) -> Vec<mapcore::SectorId> {
    let mut ids = Vec::new();
    map.iterate_sectors(None, None, false, |id| {
        ids.push(id);
        true
    });
    ids
}

fn build_fixture() -> Map {
    let mut map = Map::new();
    map.add_line((0, 0), (1000, 1000), false).unwrap();
    map.add_line((0, 1000), (1000, 0), false).unwrap();
    map.add_line((0, 0), (0, 1000), false).unwrap();
    map.add_line((0, 1000), (1000, 1000), false).unwrap();
    map.add_line((1000, 1000), (1000, 0), false).unwrap();
    map.add_line((1000, 0), (0, 0), false).unwrap();
    map.add_vertex(500, 0, false).unwrap();
    map
}

#[test]
fn invariant_1_vertex_map_round_trips_every_vertex() {
    let map = build_fixture();
    for id in all_vertices(&map) {
        let v = map.vertex(id).unwrap();
        assert_eq!(map.find_vertex(v.x, v.y), Some(id));
    }
}

#[test]
fn invariant_2_line_endpoints_are_mutually_incident() {
    let map = build_fixture();
    for id in all_lines(&map) {
        let line = map.line(id).unwrap();
        let v0 = map.vertex(line.v0).unwrap();
        let v1 = map.vertex(line.v1).unwrap();
        assert_eq!(v0.incident.iter().filter(|&&l| l == id).count(), 1);
        assert_eq!(v1.incident.iter().filter(|&&l| l == id).count(), 1);
    }
}

#[test]
fn invariant_3_no_duplicate_or_degenerate_lines_after_rebuild() {
    let map = build_fixture();
    let mut seen: HashSet<((i64, i64), (i64, i64))> = HashSet::new();
    for id in all_lines(&map) {
        let line = map.line(id).unwrap();
        assert_ne!(line.v0, line.v1);
        let a = map.vertex(line.v0).unwrap().key();
        let b = map.vertex(line.v1).unwrap().key();
        let key = if a <= b { (a, b) } else { (b, a) };
        assert!(seen.insert(key), "duplicate unordered endpoint pair {key:?}");
    }
}

#[test]
fn invariant_4_serialize_deserialize_round_trips_the_whole_map() {
    let map = build_fixture();
    let record = map.serialize();
    let mut restored = Map::new();
    restored.deserialize(&record).unwrap();

    assert_eq!(restored.vertex_count(), map.vertex_count());
    assert_eq!(restored.line_count(), map.line_count());
    assert_eq!(restored.sector_count(), map.sector_count());

    let mut original_keys: Vec<_> = all_vertices(&map).into_iter().map(|id| map.vertex(id).unwrap().key()).collect();
    let mut restored_keys: Vec<_> =
        all_vertices(&restored).into_iter().map(|id| restored.vertex(id).unwrap().key()).collect();
    original_keys.sort_unstable();
    restored_keys.sort_unstable();
    assert_eq!(original_keys, restored_keys);
}

#[test]
fn invariant_5_repeated_add_line_is_idempotent() {
    let mut map = Map::new();
    let first = map.add_line((0, 0), (100, 0), false).unwrap().into_applied().unwrap();
    let before = map.line_count();
    let second = map.add_line((0, 0), (100, 0), false).unwrap();
    assert!(!second.applied());
    assert_eq!(map.line_count(), before);
    assert_eq!(first.len(), 1);
}

#[test]
fn invariant_6_undo_n_times_restores_the_exact_pre_sequence_state() {
    let mut map = Map::new();
    let before = map.serialize();

    map.add_line((0, 0), (100, 0), false).unwrap();
    map.add_line((100, 0), (100, 100), false).unwrap();
    map.add_line((100, 100), (0, 100), false).unwrap();
    map.add_line((0, 100), (0, 0), false).unwrap();

    for _ in 0..4 {
        map.undo();
    }

    let after = map.serialize();
    assert_eq!(after.vertices.len(), before.vertices.len());
    assert_eq!(after.lines.len(), before.lines.len());
    assert_eq!(after.sectors.len(), before.sectors.len());
}

#[test]
fn invariant_7_every_sector_has_positive_area_and_matching_boundary() {
    let map = build_fixture();
    for id in all_sectors(&map) {
        let sector = map.sector(id).unwrap();
        assert!(geom::is_ccw(&sector.flat_xy));
        for &(line_id, is_front) in &sector.boundary {
            let line = map.line(line_id).unwrap();
            let side = if is_front { &line.front } else { &line.back };
            assert_eq!(side.sector, Some(id));
        }
    }
}

#[test]
fn invariant_8_bounded_query_matches_brute_force_filter() {
    let map = build_fixture();
    let min = (-10, -10);
    let max = (510, 510);

    let mut bounded = Vec::new();
    map.iterate_vertices(Some(min), Some(max), false, |id| {
        bounded.push(id);
        true
    });

    let mut brute_force: Vec<_> = all_vertices(&map)
        .into_iter()
        .filter(|&id| {
            let v = map.vertex(id).unwrap();
            v.x >= min.0 && v.x <= max.0 && v.y >= min.1 && v.y <= max.1
        })
        .collect();

    bounded.sort_unstable();
    brute_force.sort_unstable();
    assert_eq!(bounded, brute_force);
}

#[test]
fn sector_property_validation_rejects_unknown_and_mismatched_types() {
    let mut map = build_fixture();
    let sector_id = all_sectors(&map)[0];
    assert!(map.set_sector_property(sector_id, "not_a_real_property", PropertyValue::Int(1)).is_err());
    assert!(map.set_sector_property(sector_id, "light_level", PropertyValue::Str("nope".into())).is_err());
}
