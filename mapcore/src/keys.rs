// Copyright 2025 the mapcore Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stable key forms (spec §6): `vertex_map`/`line_map` use the cheap tuple
//! forms internally; the string forms are exposed for anything that wants a
//! stable, human-readable, persistence-safe identifier.

use alloc::format;
use alloc::string::String;

/// Lookup key for `Map::vertex_map`: the coordinate pair itself.
pub type VertexKey = (i64, i64);

/// Lookup key for `Map::line_map`: the unordered endpoint pair,
/// canonicalized by lexicographic order (smaller x first, ties by smaller
/// y) so `(a, b)` and `(b, a)` always produce the same key.
pub type LineKey = (VertexKey, VertexKey);

/// Canonicalize an endpoint pair into a [`LineKey`].
pub fn line_key(a: VertexKey, b: VertexKey) -> LineKey {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// The stable string form `"x,y"` for a vertex key.
pub fn vertex_key_string(v: VertexKey) -> String {
    format!("{},{}", v.0, v.1)
}

/// The stable string form `"x0,y0:x1,y1"` for a canonicalized line key.
pub fn line_key_string(l: LineKey) -> String {
    format!("{},{}:{},{}", (l.0).0, (l.0).1, (l.1).0, (l.1).1)
}

/// The internal directed half-edge key `"ax,ay:bx,by"` (not canonicalized —
/// direction matters).
pub fn half_edge_key_string(a: VertexKey, b: VertexKey) -> String {
    format!("{},{}:{},{}", a.0, a.1, b.0, b.1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_key_is_order_independent() {
        let a = (0, 0);
        let b = (10, 0);
        assert_eq!(line_key(a, b), line_key(b, a));
    }

    #[test]
    fn string_forms_match_spec_format() {
        assert_eq!(vertex_key_string((3, 4)), "3,4");
        assert_eq!(line_key_string(line_key((10, 0), (0, 0))), "0,0:10,0");
    }
}
