// Copyright 2025 the mapcore Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end scenarios over a handful of common edit sequences.

use mapcore::notify::SelectionEntry;
use mapcore::value::PropertyValue;
use mapcore::Map;

fn add_box(map: &mut Map, x0: i64, y0: i64, x1: i64, y1: i64) {
    map.add_line((x0, y0), (x1, y0), false).unwrap();
    map.add_line((x1, y0), (x1, y1), false).unwrap();
    map.add_line((x1, y1), (x0, y1), false).unwrap();
    map.add_line((x0, y1), (x0, y0), false).unwrap();
}

#[test]
fn s1_box_recovers_one_ccw_sector() {
    let mut map = Map::new();
    add_box(&mut map, 0, 0, 100, 100);

    assert_eq!(map.vertex_count(), 4);
    assert_eq!(map.line_count(), 4);
    assert_eq!(map.sector_count(), 1);

    let mut sector_id = None;
    map.iterate_sectors(None, None, false, |id| {
        sector_id = Some(id);
        true
    });
    let sector = map.sector(sector_id.unwrap()).unwrap();
    assert_eq!(sector.flat_xy.len(), 8);
    assert!(mapcore::geom::is_ccw(&sector.flat_xy));
    assert!(sector.parent.is_none());
}

#[test]
fn s2_splitting_a_box_edge_preserves_sector_and_side_data() {
    let mut map = Map::new();
    add_box(&mut map, 0, 0, 100, 100);

    let bottom = map.find_line((0, 0), (100, 0)).unwrap();
    map.set_side_property(bottom, true, "texture_middle", PropertyValue::Str("BRICK".into())).unwrap();

    map.add_vertex(50, 0, false).unwrap();

    assert!(map.find_line((0, 0), (100, 0)).is_none());
    let left_half = map.find_line((0, 0), (50, 0)).unwrap();
    let right_half = map.find_line((50, 0), (100, 0)).unwrap();
    assert_eq!(map.line(left_half).unwrap().front.texture_middle, "BRICK");
    assert_eq!(map.line(right_half).unwrap().front.texture_middle, "BRICK");

    assert_eq!(map.sector_count(), 1);
    let mut sector_id = None;
    map.iterate_sectors(None, None, false, |id| {
        sector_id = Some(id);
        true
    });
    assert_eq!(map.sector(sector_id.unwrap()).unwrap().flat_xy.len(), 10);
}

#[test]
fn s3_proper_intersection_splits_both_segments() {
    let mut map = Map::new();
    map.add_line((0, 0), (100, 100), false).unwrap();
    map.add_line((0, 100), (100, 0), false).unwrap();

    assert!(map.find_vertex(50, 50).is_some());
    assert_eq!(map.line_count(), 4);
    assert_eq!(map.sector_count(), 0);
}

#[test]
fn s3_proper_intersection_inside_a_surrounding_box_splits_it_into_two_sectors() {
    let mut map = Map::new();
    add_box(&mut map, 0, 0, 100, 100);
    map.add_line((0, 0), (100, 100), false).unwrap();
    map.add_line((0, 100), (100, 0), false).unwrap();

    assert!(map.find_vertex(50, 50).is_some());
    assert_eq!(map.sector_count(), 4);
}

#[test]
fn s4_collinear_merge_after_delete_round_trips_through_add_line() {
    let mut map = Map::new();
    map.add_line((0, 0), (50, 0), false).unwrap();
    map.add_line((50, 0), (100, 0), false).unwrap();
    assert_eq!(map.line_count(), 2);

    map.remove_vertex(50, 0, false).unwrap();
    assert_eq!(map.line_count(), 0);

    map.add_line((0, 0), (100, 0), false).unwrap();
    assert_eq!(map.line_count(), 1);
    assert!(map.find_line((0, 0), (100, 0)).is_some());
}

#[test]
fn s5_nested_boxes_establish_and_then_clear_parent_child() {
    let mut map = Map::new();
    add_box(&mut map, 0, 0, 1000, 1000);
    add_box(&mut map, 100, 100, 200, 200);
    assert_eq!(map.sector_count(), 2);

    let (mut outer, mut inner) = (None, None);
    map.iterate_sectors(None, None, false, |id| {
        let area = map.sector(id).unwrap().flat_xy.len();
        if area > 0 {
            if outer.is_none() || map.sector(outer.unwrap()).unwrap().flat_xy.len() < area {
                inner = outer;
                outer = Some(id);
            } else {
                inner = Some(id);
            }
        }
        true
    });
    let (outer, inner) = (outer.unwrap(), inner.unwrap());
    assert_eq!(map.sector(inner).unwrap().parent, Some(outer));
    assert!(map.sector(outer).unwrap().children.contains(&inner));

    // Walk the inner box far outside the outer one.
    map.move_vertex((100, 100), (2000, 2000), true).unwrap();
    map.move_vertex((200, 100), (2100, 2000), true).unwrap();
    map.move_vertex((200, 200), (2100, 2100), true).unwrap();
    map.move_vertex((100, 200), (2000, 2100), false).unwrap();

    let relocated = map.find_line((2000, 2000), (2100, 2000)).unwrap();
    let line = map.line(relocated).unwrap();
    let new_sector = line.front.sector.or(line.back.sector).unwrap();
    assert!(map.sector(new_sector).unwrap().parent.is_none());
}

#[test]
fn s6_consecutive_property_sets_coalesce_into_one_undo_step() {
    let mut map = Map::new();
    add_box(&mut map, 0, 0, 100, 100);
    let mut sector_id = None;
    map.iterate_sectors(None, None, false, |id| {
        sector_id = Some(id);
        true
    });
    let sector_id = sector_id.unwrap();

    map.set_sector_property(sector_id, "light_level", PropertyValue::Int(160)).unwrap();
    map.set_sector_property(sector_id, "light_level", PropertyValue::Int(164)).unwrap();
    map.set_sector_property(sector_id, "light_level", PropertyValue::Int(168)).unwrap();

    assert_eq!(map.sector(sector_id).unwrap().properties.light_level, 168);
    map.undo();
    assert_eq!(map.sector(sector_id).unwrap().properties.light_level, 0);
}

#[test]
fn copy_paste_round_trips_a_selected_box() {
    let mut map = Map::new();
    add_box(&mut map, 0, 0, 100, 100);
    let mut sector_id = None;
    map.iterate_sectors(None, None, false, |id| {
        sector_id = Some(id);
        true
    });
    map.select([SelectionEntry::Sector(sector_id.unwrap())]).unwrap();

    let submap = map.copy_selection();
    assert_eq!(submap.line_count(), 4);

    let transform = mapcore::map::PasteTransform {
        translate: (500.0, 500.0),
        ..Default::default()
    };
    map.paste_map(&submap, &transform).unwrap();

    assert_eq!(map.sector_count(), 2);
    assert!(map.find_line((500, 500), (600, 500)).is_some());
}

#[test]
fn serialize_deserialize_round_trips_geometry_and_properties() {
    let mut map = Map::new();
    add_box(&mut map, 0, 0, 100, 100);
    let mut sector_id = None;
    map.iterate_sectors(None, None, false, |id| {
        sector_id = Some(id);
        true
    });
    map.set_sector_property(sector_id.unwrap(), "light_level", PropertyValue::Int(200)).unwrap();

    let record = map.serialize();
    let json = serde_json::to_string(&record).unwrap();
    let decoded: mapcore::map::MapRecord = serde_json::from_str(&json).unwrap();

    let mut restored = Map::new();
    restored.deserialize(&decoded).unwrap();

    assert_eq!(restored.vertex_count(), map.vertex_count());
    assert_eq!(restored.line_count(), map.line_count());
    assert_eq!(restored.sector_count(), map.sector_count());

    let mut restored_sector = None;
    restored.iterate_sectors(None, None, false, |id| {
        restored_sector = Some(id);
        true
    });
    assert_eq!(restored.sector(restored_sector.unwrap()).unwrap().properties.light_level, 200);
}
