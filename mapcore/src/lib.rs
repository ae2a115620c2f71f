// Copyright 2025 the mapcore Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=mapcore --heading-base-level=0

//! mapcore: the in-memory geometric core of a Doom-style 2D level map editor.
//!
//! mapcore owns the planar subdivision a level editor presents to the
//! user — vertices, lines, sectors, and things — and keeps it consistent
//! as the user edits it interactively.
//!
//! - Maintains a planar subdivision under incremental edits: adding or
//!   removing vertices, lines, and things automatically splits crossing
//!   segments, merges collinear runs, and re-derives sectors from the
//!   resulting line arrangement.
//! - Recovers sectors (closed faces) from the line arrangement by tracing
//!   directed-edge loops, the same half-edge face-recovery approach a
//!   planar subdivision needs regardless of source format.
//! - Indexes vertices, lines, sectors, and things in a uniform spatial grid
//!   for viewport queries and hit testing.
//! - Tracks a coalescing undo/redo history over structural edits and
//!   property changes.
//! - Serializes to and from a neutral, round-trippable record format, and
//!   supports copy/paste of a selection under an affine transform.
//!
//! It aims for a stable, minimal API and leaves import/export of any
//! specific level file format to callers.
//!
//! ## Where this fits
//!
//! mapcore is the model layer beneath a level editor's UI. It has no
//! notion of rendering, input devices, or file formats — those are left
//! to callers, who are expected to drive edits through [`map::Map`]'s
//! methods and feed a [`notify::ChangeEvent`] observer into their own
//! viewport/undo UI.
//!
//! ## API overview
//!
//! - [`map::Map`]: the subdivision itself, and the surface for every edit,
//!   query, and history operation.
//! - [`ids::Id`]/[`ids::Arena`]: generational handles and the arenas that
//!   back vertices, lines, sectors, and things.
//! - [`geom`]: segment/polygon predicates the subdivision and face
//!   recovery are built from (orientation, intersection, winding).
//! - [`notify::ChangeEvent`]/[`notify::Observer`]: what changed, delivered
//!   synchronously after each mutation.
//! - [`error::Error`]/[`error::EditOutcome`]: the failure and
//!   degenerate-input taxonomy every fallible operation returns.
//! - [`config::MapConfig`]: spatial grid cell size and the face-recovery
//!   loop-trace guard, the constants a host may want to tune.
//!
//! Key operations:
//! - [`map::Map::add_vertex`]/[`map::Map::remove_vertex`]/[`map::Map::move_vertex`]
//! - [`map::Map::add_line`]/[`map::Map::remove_line`]
//! - [`map::Map::add_thing`]/[`map::Map::remove_thing`]
//! - [`map::Map::rebuild_sectors`] rebuilds affected sectors after any
//!   line-topology change.
//! - [`map::Map::iterate_vertices`]/[`map::Map::iterate_lines`]/
//!   [`map::Map::iterate_sectors`]/[`map::Map::iterate_things`] for
//!   bounded or whole-map spatial queries.
//! - [`map::Map::copy_selection`] and [`map::Map::paste_map`] move
//!   geometry between maps.
//! - [`map::Map::serialize`] and [`map::Map::deserialize`] round-trip a
//!   whole map through [`map::MapRecord`].
//! - [`map::Map::undo`] and [`map::Map::redo`] walk the coalescing edit
//!   history.
//!
//! ## Concurrency and observer notes
//!
//! `Map` is not thread-safe; callers needing cross-thread access are
//! expected to wrap it in their own synchronization. Observers installed
//! via [`map::Map::set_observer`] must not mutate the originating map —
//! doing so returns [`error::Error::ReentrantMutation`] rather than
//! corrupting state.
//!
//! This crate is `no_std` and uses `alloc`. The `std` feature (default)
//! enables `std`-backed floating point and error-trait impls in
//! dependencies; disabling it and enabling `libm` instead routes float
//! math through `libm` for bare-metal targets.

#![no_std]

extern crate alloc;

pub mod config;
pub mod error;
pub mod flags;
pub mod geom;
pub mod history;
pub mod ids;
pub mod keys;
pub mod line;
pub mod map;
pub mod notify;
pub mod sector;
pub mod side;
pub mod spatial;
pub mod thing;
pub mod value;
pub mod vertex;

pub use config::MapConfig;
pub use error::{EditOutcome, Error, Result, ValidationError};
pub use flags::Flags;
pub use ids::{Arena, Id, LineId, SectorId, ThingId, VertexId};
pub use map::{Map, PasteTransform, WouldCross};
pub use notify::{ChangeEvent, Observer, SelectionEntry};
pub use value::PropertyValue;
