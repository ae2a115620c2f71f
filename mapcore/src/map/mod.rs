// Copyright 2025 the mapcore Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The planar subdivision registry and its public edit API (spec §3, §4.4).
//!
//! `Map` owns every vertex, line, sector, and thing; cross-references
//! between them are [`crate::ids::Id`] handles resolved back through the
//! arenas here, never owning pointers (spec §3, "Ownership"). This module
//! holds the struct and the low-level registry primitives (`raw_*`) that
//! both the public edit API ([`edit`]) and history's do/undo thunks build
//! on; the heavier algorithms live in sibling modules.

mod copy_paste;
mod edit;
mod iterate;
mod rebuild;
mod sectors;
mod serialize;

pub use copy_paste::PasteTransform;
pub use edit::WouldCross;
pub use serialize::{LineRecord, MapRecord, SectorRecord, ThingRecord, VertexRecord};

use alloc::rc::Rc;
use alloc::string::String;
use core::cell::Cell;
use hashbrown::{HashMap, HashSet};
use mapcore_grid::Aabb;

use crate::config::MapConfig;
use crate::error::{EditOutcome, Error, Result};
use crate::flags::Flags;
use crate::history::History;
use crate::ids::{Arena, LineId, SectorId, ThingId, VertexId};
use crate::keys::{self, LineKey, VertexKey};
use crate::line::Line;
use crate::notify::{ChangeEvent, Notifier, Observer, SelectionEntry};
use crate::sector::Sector;
use crate::side::Side;
use crate::spatial::SpatialIndex;
use crate::thing::Thing;
use crate::value::PropertyValue;
use crate::vertex::Vertex;

/// The planar subdivision: vertices, lines, sectors, things, and the
/// indices and logs that make edits to them efficient and reversible.
pub struct Map {
    pub(crate) vertices: Arena<Vertex, crate::ids::VertexKind>,
    pub(crate) lines: Arena<Line, crate::ids::LineKind>,
    pub(crate) sectors: Arena<Sector, crate::ids::SectorKind>,
    pub(crate) things: Arena<Thing, crate::ids::ThingKind>,
    pub(crate) vertex_map: HashMap<VertexKey, VertexId>,
    pub(crate) line_map: HashMap<LineKey, LineId>,
    pub(crate) modified_lines: HashSet<LineId>,
    pub(crate) selection: HashSet<SelectionEntry>,
    pub(crate) spatial: SpatialIndex,
    pub(crate) metadata: HashMap<String, PropertyValue>,
    history: History,
    notifier: Notifier,
    config: MapConfig,
    notifying: bool,
}

impl Default for Map {
    fn default() -> Self {
        Self::new()
    }
}

impl Map {
    /// Create an empty map with default configuration.
    pub fn new() -> Self {
        Self::with_config(MapConfig::default())
    }

    /// Create an empty map with the given configuration.
    pub fn with_config(config: MapConfig) -> Self {
        Self {
            vertices: Arena::new(),
            lines: Arena::new(),
            sectors: Arena::new(),
            things: Arena::new(),
            vertex_map: HashMap::new(),
            line_map: HashMap::new(),
            modified_lines: HashSet::new(),
            selection: HashSet::new(),
            spatial: SpatialIndex::new(config.grid_cell_size),
            metadata: HashMap::new(),
            history: History::new(),
            notifier: Notifier::default(),
            config,
            notifying: false,
        }
    }

    /// This map's configuration.
    pub const fn config(&self) -> &MapConfig {
        &self.config
    }

    /// Install or replace the change-notification observer.
    pub fn set_observer(&mut self, observer: Option<Observer>) {
        self.notifier.set_observer(observer);
    }

    /// Number of live vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of live lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Number of live sectors.
    pub fn sector_count(&self) -> usize {
        self.sectors.len()
    }

    /// Number of live things.
    pub fn thing_count(&self) -> usize {
        self.things.len()
    }

    /// Borrow a vertex by handle.
    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(id)
    }

    /// Borrow a line by handle.
    pub fn line(&self, id: LineId) -> Option<&Line> {
        self.lines.get(id)
    }

    /// Mutably borrow a line by handle.
    pub fn line_mut(&mut self, id: LineId) -> Option<&mut Line> {
        self.lines.get_mut(id)
    }

    /// Borrow a sector by handle.
    pub fn sector(&self, id: SectorId) -> Option<&Sector> {
        self.sectors.get(id)
    }

    /// Mutably borrow a sector by handle.
    pub fn sector_mut(&mut self, id: SectorId) -> Option<&mut Sector> {
        self.sectors.get_mut(id)
    }

    /// Borrow a thing by handle.
    pub fn thing(&self, id: ThingId) -> Option<&Thing> {
        self.things.get(id)
    }

    /// Look up a vertex by its coordinate key.
    pub fn find_vertex(&self, x: i64, y: i64) -> Option<VertexId> {
        self.vertex_map.get(&(x, y)).copied()
    }

    /// Look up a line by its canonicalized endpoint key.
    pub fn find_line(&self, a: (i64, i64), b: (i64, i64)) -> Option<LineId> {
        self.line_map.get(&keys::line_key(a, b)).copied()
    }

    /// Replace the current selection and notify observers.
    pub fn select(&mut self, entries: impl IntoIterator<Item = SelectionEntry>) -> Result<()> {
        self.guard_reentrancy()?;
        self.selection = entries.into_iter().collect();
        let mut members: alloc::vec::Vec<SelectionEntry> = self.selection.iter().copied().collect();
        members.sort_by_key(Self::selection_sort_key);
        self.emit(&ChangeEvent::Select(members));
        Ok(())
    }

    /// Clear the selection and notify observers.
    pub fn deselect(&mut self) -> Result<()> {
        self.guard_reentrancy()?;
        self.selection.clear();
        self.emit(&ChangeEvent::Deselect);
        Ok(())
    }

    fn selection_sort_key(entry: &SelectionEntry) -> (u8, u32, u32) {
        match *entry {
            SelectionEntry::Vertex(id) => (0, id.raw_parts().0, id.raw_parts().1),
            SelectionEntry::Line(id) => (1, id.raw_parts().0, id.raw_parts().1),
            SelectionEntry::Sector(id) => (2, id.raw_parts().0, id.raw_parts().1),
            SelectionEntry::Thing(id) => (3, id.raw_parts().0, id.raw_parts().1),
        }
    }

    pub(crate) fn history_mut(&mut self) -> &mut History {
        &mut self.history
    }

    /// Undo the most recent action.
    pub fn undo(&mut self) {
        crate::history::with_history(self, History::undo);
    }

    /// Redo the most recently undone action.
    pub fn redo(&mut self) {
        crate::history::with_history(self, History::redo);
    }

    /// Discard the undo/redo log without affecting current state.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub(crate) fn guard_reentrancy(&self) -> Result<()> {
        if self.notifying {
            Err(Error::ReentrantMutation)
        } else {
            Ok(())
        }
    }

    pub(crate) fn emit(&mut self, event: &ChangeEvent) {
        if !self.notifier.has_observer() {
            return;
        }
        self.notifying = true;
        self.notifier.emit(event);
        self.notifying = false;
    }

    pub(crate) fn vertex_key_of(&self, id: VertexId) -> VertexKey {
        self.vertices.get(id).map_or((0, 0), Vertex::key)
    }

    /// A vertex's position as a [`crate::geom::Point`], or the origin if
    /// `id` no longer resolves (defensive default; callers that need to
    /// distinguish a dangling handle should check `self.vertex(id)` first).
    pub(crate) fn vertex_point(&self, id: VertexId) -> crate::geom::Point {
        self.vertices.get(id).map_or(crate::geom::Point::new(0, 0), |v| crate::geom::Point::new(v.x, v.y))
    }

    pub(crate) fn line_bounds(&self, v0: VertexId, v1: VertexId) -> Aabb {
        let (a, b) = (self.vertex_key_of(v0), self.vertex_key_of(v1));
        Aabb::new(a.0.min(b.0), a.1.min(b.1), a.0.max(b.0), a.1.max(b.1))
    }

    /// Insert a freshly constructed line (endpoints, sides, flags already
    /// set) into every registry: arena, incidence lists, `line_map`, the
    /// spatial index, `modified_lines`. Does not go through history — used
    /// both by the public edit API's do-thunks and internally by splits and
    /// merges that are themselves wrapped in a single history action.
    pub(crate) fn raw_insert_line(&mut self, line: Line) -> LineId {
        let (v0, v1) = (line.v0, line.v1);
        let id = self.lines.insert(line);
        if let Some(vertex) = self.vertices.get_mut(v0) {
            vertex.incident.push(id);
        }
        if let Some(vertex) = self.vertices.get_mut(v1) {
            vertex.incident.push(id);
        }
        let key = keys::line_key(self.vertex_key_of(v0), self.vertex_key_of(v1));
        self.line_map.insert(key, id);
        let bounds = self.line_bounds(v0, v1);
        self.spatial.insert_line(id, bounds);
        self.modified_lines.insert(id);
        self.emit(&ChangeEvent::LineAdded(id));
        id
    }

    /// Remove a line from every registry. Sectors it bordered are
    /// immediately dropped from the map (their boundary just changed
    /// structurally); the line's surviving neighbors at both endpoints are
    /// marked modified so the next rebuild retraces the gap.
    pub(crate) fn raw_remove_line(&mut self, id: LineId) {
        let Some(line) = self.lines.get(id) else {
            return;
        };
        let (v0, v1) = (line.v0, line.v1);
        let bordered: [Option<SectorId>; 2] = [line.front.sector, line.back.sector];

        self.lines.remove(id);
        if let Some(vertex) = self.vertices.get_mut(v0) {
            vertex.incident.retain(|&l| l != id);
        }
        if let Some(vertex) = self.vertices.get_mut(v1) {
            vertex.incident.retain(|&l| l != id);
        }
        let key = keys::line_key(self.vertex_key_of(v0), self.vertex_key_of(v1));
        self.line_map.remove(&key);
        self.spatial.remove_line(id);
        self.modified_lines.remove(&id);

        for sector_id in bordered.into_iter().flatten() {
            self.sectors_remove_from_map(sector_id);
        }
        if let Some(vertex) = self.vertices.get(v0) {
            self.modified_lines.extend(vertex.incident.iter().copied());
        }
        if let Some(vertex) = self.vertices.get(v1) {
            self.modified_lines.extend(vertex.incident.iter().copied());
        }
        self.emit(&ChangeEvent::LineRemoved(id));
    }

    pub(crate) fn raw_insert_vertex(&mut self, x: i64, y: i64) -> VertexId {
        let id = self.vertices.insert(Vertex::new(x, y));
        self.vertex_map.insert((x, y), id);
        self.spatial.insert_vertex(id, x, y);
        self.emit(&ChangeEvent::VertexAdded(id));
        id
    }

    pub(crate) fn raw_remove_vertex(&mut self, id: VertexId) {
        let Some(vertex) = self.vertices.remove(id) else {
            return;
        };
        self.vertex_map.remove(&vertex.key());
        self.spatial.remove_vertex(id);
        self.emit(&ChangeEvent::VertexRemoved(id));
    }

    /// Insert a vertex through history. Building block for composite edit
    /// operations (`add_vertex`'s collinear split, `add_line`) that need a
    /// single reversible structural step without hand-writing the
    /// id-tracking closure pattern each time.
    pub(crate) fn insert_vertex_through_history(&mut self, x: i64, y: i64) -> VertexId {
        let slot: Rc<Cell<Option<VertexId>>> = Rc::new(Cell::new(None));
        let do_slot = Rc::clone(&slot);
        let undo_slot = Rc::clone(&slot);
        crate::history::with_history(self, move |history, map| {
            history.do_action(
                map,
                crate::history::Action::structural(
                    crate::history::ActionTarget::None,
                    move |map: &mut Map| do_slot.set(Some(map.raw_insert_vertex(x, y))),
                    move |map: &mut Map| {
                        if let Some(id) = undo_slot.take() {
                            map.raw_remove_vertex(id);
                        }
                    },
                ),
            );
        });
        slot.get().expect("do_fn runs synchronously inside do_action")
    }

    /// Remove a vertex through history. No-op if already absent.
    pub(crate) fn remove_vertex_through_history(&mut self, id: VertexId) {
        let Some(vertex) = self.vertices.get(id) else {
            return;
        };
        let (x, y) = (vertex.x, vertex.y);
        let slot: Rc<Cell<Option<VertexId>>> = Rc::new(Cell::new(Some(id)));
        let do_slot = Rc::clone(&slot);
        let undo_slot = Rc::clone(&slot);
        crate::history::with_history(self, move |history, map| {
            history.do_action(
                map,
                crate::history::Action::structural(
                    crate::history::ActionTarget::None,
                    move |map: &mut Map| {
                        if let Some(id) = do_slot.take() {
                            map.raw_remove_vertex(id);
                        }
                    },
                    move |map: &mut Map| undo_slot.set(Some(map.raw_insert_vertex(x, y))),
                ),
            );
        });
    }

    /// Insert a line through history, resolving `a`/`b` to endpoint ids by
    /// coordinate at do/undo time rather than capturing fixed
    /// [`VertexId`]s: an undo sequence may reinsert this line's endpoint
    /// vertex into a *new* arena slot before replaying this step, so a
    /// captured id could already be stale by the time this closure runs.
    pub(crate) fn insert_line_through_history(
        &mut self,
        a: VertexKey,
        b: VertexKey,
        front: Side,
        back: Side,
        flags: Flags,
    ) -> LineId {
        let slot: Rc<Cell<Option<LineId>>> = Rc::new(Cell::new(None));
        let do_slot = Rc::clone(&slot);
        let undo_slot = Rc::clone(&slot);
        crate::history::with_history(self, move |history, map| {
            history.do_action(
                map,
                crate::history::Action::structural(
                    crate::history::ActionTarget::None,
                    move |map: &mut Map| {
                        let v0 = map.vertex_map.get(&a).copied().expect("endpoint vertex must exist before its line is (re)inserted");
                        let v1 = map.vertex_map.get(&b).copied().expect("endpoint vertex must exist before its line is (re)inserted");
                        let mut line = Line::new(v0, v1);
                        line.front = front.clone();
                        line.back = back.clone();
                        line.flags = flags;
                        do_slot.set(Some(map.raw_insert_line(line)));
                    },
                    move |map: &mut Map| {
                        if let Some(id) = undo_slot.take() {
                            map.raw_remove_line(id);
                        }
                    },
                ),
            );
        });
        slot.get().expect("do_fn runs synchronously inside do_action")
    }

    /// Remove a line through history. No-op if already absent.
    pub(crate) fn remove_line_through_history(&mut self, id: LineId) {
        let Some(line) = self.lines.get(id) else {
            return;
        };
        let a = self.vertex_key_of(line.v0);
        let b = self.vertex_key_of(line.v1);
        let (front, back, flags) = (line.front.clone(), line.back.clone(), line.flags);
        let slot: Rc<Cell<Option<LineId>>> = Rc::new(Cell::new(Some(id)));
        let do_slot = Rc::clone(&slot);
        let undo_slot = Rc::clone(&slot);
        crate::history::with_history(self, move |history, map| {
            history.do_action(
                map,
                crate::history::Action::structural(
                    crate::history::ActionTarget::None,
                    move |map: &mut Map| {
                        if let Some(id) = do_slot.take() {
                            map.raw_remove_line(id);
                        }
                    },
                    move |map: &mut Map| {
                        let v0 = map.vertex_map.get(&a).copied().expect("endpoint vertex must exist before its line is (re)inserted");
                        let v1 = map.vertex_map.get(&b).copied().expect("endpoint vertex must exist before its line is (re)inserted");
                        let mut line = Line::new(v0, v1);
                        line.front = front.clone();
                        line.back = back.clone();
                        line.flags = flags;
                        undo_slot.set(Some(map.raw_insert_line(line)));
                    },
                ),
            );
        });
    }

    pub(crate) fn raw_insert_thing(&mut self, thing: Thing) -> ThingId {
        let (x, y) = (thing.x, thing.y);
        let id = self.things.insert(thing);
        self.spatial.insert_thing(id, x, y);
        self.emit(&ChangeEvent::ThingAdded(id));
        id
    }

    pub(crate) fn raw_remove_thing(&mut self, id: ThingId) {
        if self.things.remove(id).is_some() {
            self.spatial.remove_thing(id);
            self.emit(&ChangeEvent::ThingRemoved(id));
        }
    }

    /// Add a thing (not reversible through the coalescing log per spec
    /// §4.3's scope, which only lists vertex/line/thing/attribute edits as
    /// funneled through history — things are included explicitly here).
    ///
    /// `do_fn` performs the actual insert rather than replaying a captured
    /// id: a redo after an undo inserts into a fresh arena slot (the old
    /// slot's generation was bumped on removal), so the live id is tracked
    /// through a shared cell instead of being fixed at construction time.
    pub fn add_thing(&mut self, thing: Thing) -> Result<ThingId> {
        self.guard_reentrancy()?;
        let slot: Rc<Cell<Option<ThingId>>> = Rc::new(Cell::new(None));
        let do_slot = Rc::clone(&slot);
        let undo_slot = Rc::clone(&slot);
        crate::history::with_history(self, move |history, map| {
            history.do_action(
                map,
                crate::history::Action::structural(
                    crate::history::ActionTarget::None,
                    move |map: &mut Map| do_slot.set(Some(map.raw_insert_thing(thing))),
                    move |map: &mut Map| {
                        if let Some(id) = undo_slot.take() {
                            map.raw_remove_thing(id);
                        }
                    },
                ),
            );
        });
        Ok(slot.get().expect("do_fn runs synchronously inside do_action"))
    }

    /// Remove a thing.
    pub fn remove_thing(&mut self, id: ThingId) -> Result<EditOutcome<()>> {
        self.guard_reentrancy()?;
        let Some(&thing) = self.things.get(id) else {
            return Ok(EditOutcome::NoEffect);
        };
        let slot: Rc<Cell<Option<ThingId>>> = Rc::new(Cell::new(Some(id)));
        let do_slot = Rc::clone(&slot);
        let undo_slot = Rc::clone(&slot);
        crate::history::with_history(self, move |history, map| {
            history.do_action(
                map,
                crate::history::Action::structural(
                    crate::history::ActionTarget::None,
                    move |map: &mut Map| {
                        if let Some(id) = do_slot.take() {
                            map.raw_remove_thing(id);
                        }
                    },
                    move |map: &mut Map| undo_slot.set(Some(map.raw_insert_thing(thing))),
                ),
            );
        });
        Ok(EditOutcome::Applied(()))
    }

    /// Set a scalar property on a line side, validating name/type/scalar-ness.
    pub fn set_side_property(
        &mut self,
        line: LineId,
        is_front: bool,
        property: &str,
        value: PropertyValue,
    ) -> Result<EditOutcome<()>> {
        self.guard_reentrancy()?;
        let old = self.side_property(line, is_front, property)?;
        if old == value {
            return Ok(EditOutcome::NoEffect);
        }
        self.set_side_property_raw(line, is_front, property, value.clone())?;
        let (prop, old_clone, new_clone) = (String::from(property), old, value.clone());
        let parameter = alloc::format!("{}:{prop}", if is_front { "front" } else { "back" });
        let target = crate::history::ActionTarget::Line(line);
        crate::history::with_history(self, move |history, map| {
            history.do_action(
                map,
                crate::history::Action::property(
                    target,
                    parameter,
                    move |map: &mut Map| {
                        let _ = map.set_side_property_raw(line, is_front, &prop, new_clone.clone());
                    },
                    move |map: &mut Map| {
                        let _ = map.set_side_property_raw(line, is_front, &prop, old_clone.clone());
                    },
                ),
            );
        });
        Ok(EditOutcome::Applied(()))
    }

    fn side_property(&self, line: LineId, is_front: bool, property: &str) -> Result<PropertyValue> {
        let line = self
            .lines
            .get(line)
            .ok_or(Error::Invariant("side property read on unknown line"))?;
        let side = line.side(is_front);
        Ok(match property {
            "texture_upper" => PropertyValue::Str(side.texture_upper.clone()),
            "texture_middle" => PropertyValue::Str(side.texture_middle.clone()),
            "texture_lower" => PropertyValue::Str(side.texture_lower.clone()),
            "offset_x" => PropertyValue::Int(side.offset_x),
            "offset_y" => PropertyValue::Int(side.offset_y),
            other => {
                return Err(Error::Validation(crate::error::ValidationError::UnknownProperty(
                    String::from(other),
                )))
            }
        })
    }

    fn set_side_property_raw(
        &mut self,
        line_id: LineId,
        is_front: bool,
        property: &str,
        value: PropertyValue,
    ) -> Result<()> {
        let old = self.side_property(line_id, is_front, property)?;
        if !old.same_kind(&value) {
            return Err(Error::Validation(crate::error::ValidationError::TypeMismatch {
                property: String::from(property),
                expected: old.kind_name(),
                actual: value.kind_name(),
            }));
        }
        let line = self
            .lines
            .get_mut(line_id)
            .ok_or(Error::Invariant("side property write on unknown line"))?;
        let side = line.side_mut(is_front);
        match (property, value.clone()) {
            ("texture_upper", PropertyValue::Str(s)) => side.texture_upper = s,
            ("texture_middle", PropertyValue::Str(s)) => side.texture_middle = s,
            ("texture_lower", PropertyValue::Str(s)) => side.texture_lower = s,
            ("offset_x", PropertyValue::Int(v)) => side.offset_x = v,
            ("offset_y", PropertyValue::Int(v)) => side.offset_y = v,
            _ => {
                return Err(Error::Validation(crate::error::ValidationError::NotScalar(
                    String::from(property),
                )))
            }
        }
        self.emit(&ChangeEvent::SideChanged {
            line: line_id,
            property: String::from(property),
            is_front,
            value,
        });
        Ok(())
    }

    /// Set a single line flag.
    pub fn set_line_flag(&mut self, line_id: LineId, flag: Flags, value: bool) -> Result<EditOutcome<()>> {
        self.guard_reentrancy()?;
        let Some(line) = self.lines.get(line_id) else {
            return Err(Error::Invariant("flag set on unknown line"));
        };
        if line.flags.contains(flag) == value {
            return Ok(EditOutcome::NoEffect);
        }
        self.set_line_flag_raw(line_id, flag, value);
        let parameter = alloc::format!("flag:{flag:?}");
        let target = crate::history::ActionTarget::Line(line_id);
        crate::history::with_history(self, move |history, map| {
            history.do_action(
                map,
                crate::history::Action::property(
                    target,
                    parameter,
                    move |map: &mut Map| map.set_line_flag_raw(line_id, flag, value),
                    move |map: &mut Map| map.set_line_flag_raw(line_id, flag, !value),
                ),
            );
        });
        Ok(EditOutcome::Applied(()))
    }

    fn set_line_flag_raw(&mut self, line_id: LineId, flag: Flags, value: bool) {
        if let Some(line) = self.lines.get_mut(line_id) {
            line.flags.set(flag, value);
            self.emit(&ChangeEvent::FlagsChanged {
                line: line_id,
                property: alloc::format!("{flag:?}"),
                value,
            });
        }
    }

    /// Set a scalar sector property (only the numeric/string fields of
    /// [`crate::sector::SectorProperties`] are addressable; `parent` and
    /// `children` are derived, not settable).
    pub fn set_sector_property(
        &mut self,
        sector_id: SectorId,
        property: &str,
        value: PropertyValue,
    ) -> Result<EditOutcome<()>> {
        self.guard_reentrancy()?;
        let old = self.read_sector_property(sector_id, property)?;
        if old == value {
            return Ok(EditOutcome::NoEffect);
        }
        self.write_sector_property(sector_id, property, value.clone())?;
        let (prop, old_clone, new_clone) = (String::from(property), old, value);
        let target = crate::history::ActionTarget::Sector(sector_id);
        crate::history::with_history(self, move |history, map| {
            history.do_action(
                map,
                crate::history::Action::property(
                    target,
                    prop.clone(),
                    move |map: &mut Map| {
                        let _ = map.write_sector_property(sector_id, &prop, new_clone.clone());
                    },
                    {
                        let prop = prop.clone();
                        move |map: &mut Map| {
                            let _ = map.write_sector_property(sector_id, &prop, old_clone.clone());
                        }
                    },
                ),
            );
        });
        Ok(EditOutcome::Applied(()))
    }

    fn read_sector_property(&self, id: SectorId, property: &str) -> Result<PropertyValue> {
        let sector = self.sectors.get(id).ok_or(Error::Invariant("property read on unknown sector"))?;
        let p = &sector.properties;
        Ok(match property {
            "floor_height" => PropertyValue::Int(p.floor_height),
            "ceiling_height" => PropertyValue::Int(p.ceiling_height),
            "floor_texture" => PropertyValue::Str(p.floor_texture.clone()),
            "ceiling_texture" => PropertyValue::Str(p.ceiling_texture.clone()),
            "light_level" => PropertyValue::Int(i64::from(p.light_level)),
            "tag" => PropertyValue::Int(i64::from(p.tag)),
            "special" => PropertyValue::Int(i64::from(p.special)),
            other => {
                return Err(Error::Validation(crate::error::ValidationError::UnknownProperty(
                    String::from(other),
                )))
            }
        })
    }

    fn write_sector_property(&mut self, id: SectorId, property: &str, value: PropertyValue) -> Result<()> {
        let old = self.read_sector_property(id, property)?;
        if !old.same_kind(&value) {
            return Err(Error::Validation(crate::error::ValidationError::TypeMismatch {
                property: String::from(property),
                expected: old.kind_name(),
                actual: value.kind_name(),
            }));
        }
        let sector = self
            .sectors
            .get_mut(id)
            .ok_or(Error::Invariant("property write on unknown sector"))?;
        let p = &mut sector.properties;
        #[allow(clippy::cast_possible_truncation, reason = "range-checked by property setter contract")]
        match (property, value.clone()) {
            ("floor_height", PropertyValue::Int(v)) => p.floor_height = v,
            ("ceiling_height", PropertyValue::Int(v)) => p.ceiling_height = v,
            ("floor_texture", PropertyValue::Str(s)) => p.floor_texture = s,
            ("ceiling_texture", PropertyValue::Str(s)) => p.ceiling_texture = s,
            ("light_level", PropertyValue::Int(v)) => p.light_level = v as i32,
            ("tag", PropertyValue::Int(v)) => p.tag = v as i32,
            ("special", PropertyValue::Int(v)) => p.special = v as i32,
            _ => {
                return Err(Error::Validation(crate::error::ValidationError::NotScalar(
                    String::from(property),
                )))
            }
        }
        self.emit(&ChangeEvent::SectorChanged {
            sector: id,
            property: String::from(property),
            value,
        });
        Ok(())
    }

    /// Set a scalar map-level metadata property, arbitrary-keyed.
    pub fn set_map_property(&mut self, property: &str, value: PropertyValue) -> Result<EditOutcome<()>> {
        self.guard_reentrancy()?;
        if self.metadata.get(property) == Some(&value) {
            return Ok(EditOutcome::NoEffect);
        }
        let old = self.metadata.get(property).cloned();
        self.metadata.insert(String::from(property), value.clone());
        self.emit(&ChangeEvent::MetadataChanged {
            property: String::from(property),
            value: value.clone(),
        });
        let prop = String::from(property);
        let target = crate::history::ActionTarget::None;
        crate::history::with_history(self, move |history, map| {
            history.do_action(
                map,
                crate::history::Action::property(
                    target,
                    prop.clone(),
                    {
                        let prop = prop.clone();
                        let value = value.clone();
                        move |map: &mut Map| {
                            map.metadata.insert(prop.clone(), value.clone());
                            map.emit(&ChangeEvent::MetadataChanged {
                                property: prop.clone(),
                                value: value.clone(),
                            });
                        }
                    },
                    {
                        let prop = prop.clone();
                        move |map: &mut Map| match old.clone() {
                            Some(v) => {
                                map.metadata.insert(prop.clone(), v.clone());
                                map.emit(&ChangeEvent::MetadataChanged {
                                    property: prop.clone(),
                                    value: v,
                                });
                            }
                            None => {
                                map.metadata.remove(&prop);
                            }
                        }
                    },
                ),
            );
        });
        Ok(EditOutcome::Applied(()))
    }
}
