//! Per-element load state, kept beside the document instead of on it.

use rustc_hash::FxHashMap;

use crate::document::ElementId;

/// Progress of one element. Elements without an entry are untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementState {
    /// A load was dispatched and has not settled yet.
    Handled,
    Loaded,
    Failed,
}

impl ElementState {
    pub fn is_settled(self) -> bool {
        !matches!(self, ElementState::Handled)
    }
}

/// Side table of [`ElementState`]s. Transitions only move forward:
/// untouched, handled, then loaded or failed.
#[derive(Debug, Default)]
pub struct ElementStates {
    states: FxHashMap<ElementId, ElementState>,
}

impl ElementStates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, element: ElementId) -> Option<ElementState> {
        self.states.get(&element).copied()
    }

    /// Whether a load was ever dispatched for the element.
    pub fn is_touched(&self, element: ElementId) -> bool {
        self.states.contains_key(&element)
    }

    pub fn is_pending(&self, element: ElementId) -> bool {
        self.get(element) == Some(ElementState::Handled)
    }

    pub fn is_loaded(&self, element: ElementId) -> bool {
        self.get(element) == Some(ElementState::Loaded)
    }

    /// Marks an untouched element as handled. Returns `false` if it already
    /// had a state.
    pub fn mark_handled(&mut self, element: ElementId) -> bool {
        if self.states.contains_key(&element) {
            return false;
        }
        self.states.insert(element, ElementState::Handled);
        true
    }

    /// Settles a handled element. Returns `false` for any other state, which
    /// makes repeated settlements no-ops.
    pub fn settle(&mut self, element: ElementId, ok: bool) -> bool {
        match self.states.get_mut(&element) {
            Some(state @ ElementState::Handled) => {
                *state = if ok {
                    ElementState::Loaded
                } else {
                    ElementState::Failed
                };
                true
            }
            _ => false,
        }
    }

    pub fn pending_count(&self) -> usize {
        self.states
            .values()
            .filter(|state| !state.is_settled())
            .count()
    }
}
