use std::cell::RefCell;
use std::rc::Rc;

use lazyview_core::{ElementId, Hooks};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HookEvent {
    BeforeLoad(ElementId),
    AfterLoad(ElementId),
    Error(ElementId),
    FinishedAll,
}

/// Records every hook a loader fires, in order. Clones share the log.
#[derive(Clone, Debug, Default)]
pub struct HookLog {
    events: Rc<RefCell<Vec<HookEvent>>>,
}

impl HookLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hooks that append to this log.
    pub fn hooks(&self) -> Hooks {
        let before = self.clone();
        let after = self.clone();
        let error = self.clone();
        let finished = self.clone();
        Hooks::new()
            .before_load(move |_, element| before.push(HookEvent::BeforeLoad(element)))
            .after_load(move |_, element| after.push(HookEvent::AfterLoad(element)))
            .on_error(move |_, element| error.push(HookEvent::Error(element)))
            .on_finished_all(move |_| finished.push(HookEvent::FinishedAll))
    }

    pub fn push(&self, event: HookEvent) {
        self.events.borrow_mut().push(event);
    }

    pub fn events(&self) -> Vec<HookEvent> {
        self.events.borrow().clone()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }

    pub fn count(&self, event: HookEvent) -> usize {
        self.events.borrow().iter().filter(|e| **e == event).count()
    }

    pub fn finished_count(&self) -> usize {
        self.count(HookEvent::FinishedAll)
    }

    pub fn loaded(&self) -> Vec<ElementId> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                HookEvent::AfterLoad(element) => Some(*element),
                _ => None,
            })
            .collect()
    }

    pub fn failed(&self) -> Vec<ElementId> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                HookEvent::Error(element) => Some(*element),
                _ => None,
            })
            .collect()
    }

    pub fn dispatched(&self) -> Vec<ElementId> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                HookEvent::BeforeLoad(element) => Some(*element),
                _ => None,
            })
            .collect()
    }
}
