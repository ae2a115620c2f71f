// Copyright 2025 the mapcore Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! mapcore Grid: a uniform grid spatial index over `i64` AABBs.
//!
//! This is a reusable building block for the planar-subdivision editor core
//! in `mapcore`: every vertex, line, sector, and thing is registered here
//! under its axis-aligned bounds so that "what's near this edit" queries stay
//! close to constant time regardless of total map size.
//!
//! - Insert, update, and remove AABBs with a user payload, addressed by a
//!   stable, generational [`Key`].
//! - Query a rectangle and get every entry whose bounds are fully contained
//!   within it (`query_rect`), or every entry whose bounds merely overlap it
//!   (`query_rect_overlapping`, used by callers that want to refine
//!   candidates further themselves).
//! - Column/cell containers are dropped once empty, so memory tracks live
//!   geometry rather than the map's all-time high-water mark.
//!
//! Cell size is caller-configurable and correctness never depends on its
//! value, only performance — pick it close to the typical size of edited
//! geometry.
//!
//! # Example
//!
//! ```rust
//! use mapcore_grid::{Aabb, Grid};
//!
//! let mut grid: Grid<u32> = Grid::new(128);
//! let k = grid.insert(Aabb::new(0, 0, 64, 64), 1);
//! let mut hits = Vec::new();
//! grid.query_rect(Aabb::new(-10, -10, 200, 200), |_key, payload| {
//!     hits.push(payload);
//!     true
//! });
//! assert_eq!(hits, vec![1]);
//!
//! grid.update(k, Aabb::new(500, 500, 600, 600));
//! hits.clear();
//! grid.query_rect(Aabb::new(-10, -10, 200, 200), |_key, payload| {
//!     hits.push(payload);
//!     true
//! });
//! assert!(hits.is_empty());
//! ```

#![no_std]

extern crate alloc;

mod aabb;
mod grid;
mod key;

pub use aabb::Aabb;
pub use grid::Grid;
pub use key::Key;
