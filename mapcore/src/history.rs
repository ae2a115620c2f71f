// Copyright 2025 the mapcore Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Coalescing undo/redo log (spec §4.3).
//!
//! Every primitive mutation the map core performs is staged as an
//! [`Action`] and funneled through [`History::do_action`]. `Action` holds
//! its `do`/`undo` thunks as boxed closures over `&mut Map`; because
//! `History` is itself a field of `Map`, driving an action requires
//! temporarily moving the `History` out of its owner (`mem::take`,
//! `History` is `Default`) so the closure's `&mut Map` borrow doesn't
//! overlap the field borrow, then moving it back once the thunk returns.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::mem;

use crate::ids::{LineId, SectorId, ThingId, VertexId};
use crate::map::Map;

/// The entity (if any) an [`Action`] is scoped to, used as half of the
/// coalescing key.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ActionTarget {
    /// Not scoped to a single entity (e.g. a structural add/remove).
    None,
    /// Scoped to a vertex.
    Vertex(VertexId),
    /// Scoped to a line.
    Line(LineId),
    /// Scoped to a sector.
    Sector(SectorId),
    /// Scoped to a thing.
    Thing(ThingId),
}

/// A reversible mutation: a `do` thunk, its `undo` thunk, and the metadata
/// used to decide whether the next action coalesces with this one.
pub struct Action {
    do_fn: Box<dyn FnMut(&mut Map)>,
    undo_fn: Box<dyn FnMut(&mut Map)>,
    target: ActionTarget,
    parameter: Option<String>,
    coalescing: bool,
}

impl Action {
    /// Build an action. `coalescing` defaults to `true` in the common
    /// constructors below; use this directly for one-off structural edits
    /// that must never coalesce with a neighbor.
    pub fn new(
        target: ActionTarget,
        parameter: Option<String>,
        coalescing: bool,
        do_fn: impl FnMut(&mut Map) + 'static,
        undo_fn: impl FnMut(&mut Map) + 'static,
    ) -> Self {
        Self {
            do_fn: Box::new(do_fn),
            undo_fn: Box::new(undo_fn),
            target,
            parameter,
            coalescing,
        }
    }

    /// A structural action (vertex/line/thing add or remove): scoped to the
    /// entity it creates or destroys, never coalescing.
    pub fn structural(
        target: ActionTarget,
        do_fn: impl FnMut(&mut Map) + 'static,
        undo_fn: impl FnMut(&mut Map) + 'static,
    ) -> Self {
        Self::new(target, None, false, do_fn, undo_fn)
    }

    /// A property-set action: scoped to `(target, parameter)`, coalescing
    /// with an immediately preceding action on the same target/parameter
    /// (e.g. repeated vertex drags, repeated `light_level` sets).
    pub fn property(
        target: ActionTarget,
        parameter: impl Into<String>,
        do_fn: impl FnMut(&mut Map) + 'static,
        undo_fn: impl FnMut(&mut Map) + 'static,
    ) -> Self {
        Self::new(target, Some(parameter.into()), true, do_fn, undo_fn)
    }

    fn key(&self) -> (ActionTarget, Option<&str>) {
        (self.target, self.parameter.as_deref())
    }
}

/// Coalescing undo/redo stack.
#[derive(Default)]
pub struct History {
    undo_stack: Vec<Action>,
    redo_stack: Vec<Action>,
}

impl History {
    /// Create an empty history.
    pub const fn new() -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        }
    }

    /// Number of entries on the undo stack.
    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    /// Number of entries on the redo stack.
    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Stage and execute `action` against `map`.
    ///
    /// If the top of the undo stack is coalescing and shares `action`'s
    /// `(target, parameter)` key, only its `do` thunk is replaced in place —
    /// its original `undo` thunk is kept, so one `undo` still reverts all the
    /// way past every coalesced step to the state before the first of them
    /// (the redo stack is left untouched). Otherwise `action` is pushed and
    /// the redo stack is cleared. Either way, `action`'s `do` thunk runs
    /// against `map` first.
    pub fn do_action(&mut self, map: &mut Map, mut action: Action) {
        (action.do_fn)(map);

        let coalesces = self
            .undo_stack
            .last()
            .is_some_and(|top| top.coalescing && top.key() == action.key());

        if coalesces {
            self.undo_stack.last_mut().expect("checked above").do_fn = action.do_fn;
        } else {
            self.undo_stack.push(action);
            self.redo_stack.clear();
        }
    }

    /// Pop the most recent undo entry, run its `undo` thunk against `map`,
    /// and push it onto the redo stack. No-op if the undo stack is empty.
    pub fn undo(&mut self, map: &mut Map) {
        if let Some(mut action) = self.undo_stack.pop() {
            (action.undo_fn)(map);
            self.redo_stack.push(action);
        }
    }

    /// Pop the most recent redo entry, run its `do` thunk against `map`, and
    /// push it back onto the undo stack. No-op if the redo stack is empty.
    pub fn redo(&mut self, map: &mut Map) {
        if let Some(mut action) = self.redo_stack.pop() {
            (action.do_fn)(map);
            self.undo_stack.push(action);
        }
    }

    /// Empty both stacks.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

/// Move `map.history` out, run `f` with it and `map`, then move it back.
/// See the module doc for why this indirection is needed.
pub fn with_history<R>(map: &mut Map, f: impl FnOnce(&mut History, &mut Map) -> R) -> R {
    let mut history = mem::take(map.history_mut());
    let result = f(&mut history, map);
    *map.history_mut() = history;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use alloc::vec;
    use core::cell::RefCell;

    #[test]
    fn coalescing_replaces_top_entry_without_touching_redo() {
        let mut history = History::new();
        let mut map = crate::map::Map::new();
        let log = Rc::new(RefCell::new(Vec::<i32>::new()));

        let mk = |v: i32| {
            let do_log = log.clone();
            let undo_log = log.clone();
            Action::property(
                ActionTarget::None,
                "light_level",
                move |_: &mut Map| do_log.borrow_mut().push(v),
                move |_: &mut Map| undo_log.borrow_mut().push(-v),
            )
        };

        history.do_action(&mut map, mk(160));
        history.do_action(&mut map, mk(164));
        history.do_action(&mut map, mk(168));

        assert_eq!(history.undo_len(), 1);
        assert_eq!(*log.borrow(), vec![160, 164, 168]);

        history.undo(&mut map);
        assert_eq!(history.undo_len(), 0);
        assert_eq!(history.redo_len(), 1);
        assert_eq!(*log.borrow(), vec![160, 164, 168, -160]);
    }

    #[test]
    fn non_coalescing_actions_push_distinct_entries() {
        let mut history = History::new();
        let mut map = crate::map::Map::new();

        history.do_action(&mut map, Action::structural(ActionTarget::None, |_| {}, |_| {}));
        history.do_action(&mut map, Action::structural(ActionTarget::None, |_| {}, |_| {}));

        assert_eq!(history.undo_len(), 2);
    }
}
