// Copyright 2025 the mapcore Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error taxonomy (see spec §7): invariant violations, validation failures,
//! and the distinguished "no effect" outcome for degenerate input.

use alloc::string::String;
use thiserror::Error;

/// Errors raised by `mapcore` public operations.
#[derive(Debug, Error)]
pub enum Error {
    /// An internal invariant was violated — the core is corrupt and the
    /// caller should undo or reload rather than continue editing.
    #[error("invariant violation: {0}")]
    Invariant(&'static str),

    /// A property setter was called with an unknown name, a type that
    /// doesn't match the existing value, or a non-scalar value. No state was
    /// changed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Reentrant mutation attempted from inside a change-notification
    /// callback.
    #[error("map mutated during observer notification")]
    ReentrantMutation,
}

/// Validation failures for property setters (`set_side_property`,
/// `set_line_flag`, `set_sector_property`, `set_map_property`).
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The named property does not exist on the target.
    #[error("unknown property {0:?}")]
    UnknownProperty(String),
    /// The new value's type does not match the existing value's type.
    #[error("type mismatch setting {property:?}: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Name of the property being set.
        property: String,
        /// Name of the expected scalar kind.
        expected: &'static str,
        /// Name of the scalar kind actually supplied.
        actual: &'static str,
    },
    /// The supplied value was not a scalar (number, bool, or string).
    #[error("value for {0:?} is not a scalar")]
    NotScalar(String),
}

/// Result alias for fallible `mapcore` operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Outcome of an edit operation that may be a silent no-op for degenerate
/// input (spec §7: "Degenerate input ... ignored silently with explicit
/// return indicating no effect").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome<T> {
    /// The edit was applied; carries whatever the operation normally
    /// returns (e.g. newly created lines).
    Applied(T),
    /// The input was degenerate (zero-length segment, identical-position
    /// move, removing an already-absent entity) and nothing changed.
    NoEffect,
}

impl<T> EditOutcome<T> {
    /// True if the edit actually changed the map.
    pub const fn applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    /// The applied value, if any.
    pub fn into_applied(self) -> Option<T> {
        match self {
            Self::Applied(v) => Some(v),
            Self::NoEffect => None,
        }
    }
}
