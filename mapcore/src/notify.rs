// Copyright 2025 the mapcore Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Change notifications (spec §6) and the observer sink that receives them.
//!
//! Observers are a single boxed closure rather than a trait hierarchy or a
//! dynamic listener list — the same minimal-dispatch choice the corpus
//! makes for its own event plumbing (e.g.
//! [`understory_responder::dispatcher::run`]'s closure-based handler).
//! Anything richer (multiple listeners, filtering) is a concern for the
//! caller to layer on top of the single sink.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use crate::ids::{LineId, SectorId, ThingId, VertexId};
use crate::value::PropertyValue;

/// A change to the map, delivered synchronously after the corresponding
/// mutation is fully applied.
#[derive(Clone, Debug, PartialEq)]
pub enum ChangeEvent {
    /// A vertex was created.
    VertexAdded(VertexId),
    /// A vertex was removed.
    VertexRemoved(VertexId),
    /// A line was created.
    LineAdded(LineId),
    /// A line was removed.
    LineRemoved(LineId),
    /// A sector was created (outside of a rebuild batch; see
    /// [`Self::SectorsRebuilt`] for the common case).
    SectorAdded(SectorId),
    /// A sector was removed.
    SectorRemoved(SectorId),
    /// A thing was created.
    ThingAdded(ThingId),
    /// A thing was removed.
    ThingRemoved(ThingId),
    /// A side property (texture name/offset) changed.
    SideChanged {
        /// The owning line.
        line: LineId,
        /// Property name.
        property: String,
        /// Whether the changed side is the front.
        is_front: bool,
        /// The new value.
        value: PropertyValue,
    },
    /// A line flag changed.
    FlagsChanged {
        /// The owning line.
        line: LineId,
        /// Flag name.
        property: String,
        /// The new value.
        value: bool,
    },
    /// A sector property changed.
    SectorChanged {
        /// The owning sector.
        sector: SectorId,
        /// Property name.
        property: String,
        /// The new value.
        value: PropertyValue,
    },
    /// A map-level metadata property changed.
    MetadataChanged {
        /// Property name.
        property: String,
        /// The new value.
        value: PropertyValue,
    },
    /// A rebuild completed; carries every sector created by it.
    SectorsRebuilt(Vec<SectorId>),
    /// The selection set changed to the given members.
    Select(Vec<SelectionEntry>),
    /// The selection was cleared.
    Deselect,
}

/// One entry of a heterogeneous selection set.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SelectionEntry {
    /// A selected vertex.
    Vertex(VertexId),
    /// A selected line.
    Line(LineId),
    /// A selected sector.
    Sector(SectorId),
    /// A selected thing.
    Thing(ThingId),
}

/// Sink that receives [`ChangeEvent`]s. Observers **must not** mutate the
/// originating map from inside the callback (spec §5); `Map` detects this
/// defensively and returns [`crate::error::Error::ReentrantMutation`]
/// rather than corrupting state.
pub type Observer = Box<dyn FnMut(&ChangeEvent)>;

/// Holds at most one observer and dispatches events to it.
#[derive(Default)]
pub struct Notifier {
    observer: Option<Observer>,
}

impl Notifier {
    /// Install or replace the observer. Passing `None` removes it.
    pub fn set_observer(&mut self, observer: Option<Observer>) {
        self.observer = observer;
    }

    /// Whether an observer is currently installed.
    pub const fn has_observer(&self) -> bool {
        self.observer.is_some()
    }

    /// Dispatch `event` to the installed observer, if any.
    pub fn emit(&mut self, event: &ChangeEvent) {
        if let Some(observer) = self.observer.as_mut() {
            observer(event);
        }
    }
}

impl core::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Notifier")
            .field("has_observer", &self.has_observer())
            .finish()
    }
}
