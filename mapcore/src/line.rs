// Copyright 2025 the mapcore Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Line: an undirected segment between two vertices, with two sides and a
//! flags record (spec §3).

use crate::flags::Flags;
use crate::ids::VertexId;
use crate::side::Side;

/// An undirected segment referencing two distinct vertices.
///
/// Front is the side to the left of `v0 -> v1`; back is to the right.
/// Identity is the unordered endpoint pair (see [`crate::keys::line_key`]);
/// a line registers itself into both endpoints' incidence lists on
/// construction and deregisters on removal (done by the owning `Map`, not
/// by this type).
#[derive(Clone, Debug)]
pub struct Line {
    /// First endpoint.
    pub v0: VertexId,
    /// Second endpoint.
    pub v1: VertexId,
    /// Side left of `v0 -> v1`.
    pub front: Side,
    /// Side right of `v0 -> v1`.
    pub back: Side,
    /// The seven boolean line flags.
    pub flags: Flags,
}

impl Line {
    /// Construct a line between two distinct vertices with default sides
    /// and flags.
    pub fn new(v0: VertexId, v1: VertexId) -> Self {
        Self {
            v0,
            v1,
            front: Side::default(),
            back: Side::default(),
            flags: Flags::empty(),
        }
    }

    /// The endpoint of this line other than `v`, if `v` is in fact one of
    /// its endpoints.
    pub fn other_endpoint(&self, v: VertexId) -> Option<VertexId> {
        if v == self.v0 {
            Some(self.v1)
        } else if v == self.v1 {
            Some(self.v0)
        } else {
            None
        }
    }

    /// Borrow the front (`is_front == true`) or back side.
    pub const fn side(&self, is_front: bool) -> &Side {
        if is_front {
            &self.front
        } else {
            &self.back
        }
    }

    /// Mutably borrow the front (`is_front == true`) or back side.
    pub fn side_mut(&mut self, is_front: bool) -> &mut Side {
        if is_front {
            &mut self.front
        } else {
            &mut self.back
        }
    }

    /// Whether both sides have clear rebuild scratch fields (invariant 6).
    pub const fn transients_clear(&self) -> bool {
        self.front.transients_clear() && self.back.transients_clear()
    }
}
