// Copyright 2025 the mapcore Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scalar property values, for the generic setters in spec §6
//! (`set_side_property`, `set_line_flag`, `set_sector_property`,
//! `set_map_property`).

use alloc::string::String;
use serde::{Deserialize, Serialize};

/// A scalar value accepted by a property setter: number, bool, or string.
/// Validation rejects anything else (spec §6: "new value is a scalar").
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    /// An integer-valued property (heights, offsets, tag, special, light
    /// level).
    Int(i64),
    /// A floating-point property (angle-like quantities).
    Float(f64),
    /// A boolean property (individual line flags).
    Bool(bool),
    /// A string property (texture names).
    Str(String),
}

impl PropertyValue {
    /// A short name for this value's kind, used in validation error
    /// messages.
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Bool(_) => "bool",
            Self::Str(_) => "string",
        }
    }

    /// Whether `self` and `other` are the same scalar kind.
    pub const fn same_kind(&self, other: &Self) -> bool {
        matches!(
            (self, other),
            (Self::Int(_), Self::Int(_))
                | (Self::Float(_), Self::Float(_))
                | (Self::Bool(_), Self::Bool(_))
                | (Self::Str(_), Self::Str(_))
        )
    }
}
