//! Custom loader strategies and the completion channel back into the engine.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::config::LazyConfig;
use crate::document::{Document, ElementEvent, ElementId};
use crate::error::LoadError;

/// Loads one element marked with a loader attribute.
///
/// `load` starts the work and reports the outcome through the
/// [`Completion`], now or later. Returning `Err` fails the element right away.
/// Native events of the element and of every element registered with
/// [`LoadContext::watch`] are delivered to `on_element_event`.
pub trait LoadStrategy {
    fn load(
        &self,
        ctx: &mut LoadContext<'_>,
        element: ElementId,
        completion: Completion,
    ) -> Result<(), LoadError>;

    /// Settles on `load` and `error`, ignores everything else.
    fn on_element_event(
        &self,
        _ctx: &mut LoadContext<'_>,
        _target: ElementId,
        event: ElementEvent,
        completion: &Completion,
    ) {
        match event {
            ElementEvent::Load => completion.succeed(),
            ElementEvent::Error => completion.fail(),
            ElementEvent::LoadedMetadata => {}
        }
    }
}

/// Wraps a closure as a [`LoadStrategy`] using the default event routing.
pub fn from_fn<F>(f: F) -> FnStrategy<F>
where
    F: Fn(&mut LoadContext<'_>, ElementId, Completion) -> Result<(), LoadError>,
{
    FnStrategy(f)
}

/// See [`from_fn`].
pub struct FnStrategy<F>(F);

impl<F> LoadStrategy for FnStrategy<F>
where
    F: Fn(&mut LoadContext<'_>, ElementId, Completion) -> Result<(), LoadError>,
{
    fn load(
        &self,
        ctx: &mut LoadContext<'_>,
        element: ElementId,
        completion: Completion,
    ) -> Result<(), LoadError> {
        (self.0)(ctx, element, completion)
    }
}

/// What a strategy gets to work with while it runs.
pub struct LoadContext<'a> {
    document: &'a mut dyn Document,
    config: &'a LazyConfig,
    watched: &'a mut FxHashMap<ElementId, ElementId>,
    owner: ElementId,
}

impl<'a> LoadContext<'a> {
    pub(crate) fn new(
        document: &'a mut dyn Document,
        config: &'a LazyConfig,
        watched: &'a mut FxHashMap<ElementId, ElementId>,
        owner: ElementId,
    ) -> Self {
        Self {
            document,
            config,
            watched,
            owner,
        }
    }

    pub fn document(&mut self) -> &mut dyn Document {
        &mut *self.document
    }

    pub fn config(&self) -> &LazyConfig {
        self.config
    }

    /// The element being loaded.
    pub fn owner(&self) -> ElementId {
        self.owner
    }

    /// Routes native events of `target` to this strategy on behalf of the
    /// element being loaded.
    pub fn watch(&mut self, target: ElementId) {
        if self.watched.insert(target, self.owner).is_none() {
            self.document.observe(target);
        }
    }
}

/// A deferred document change carried by a [`Settlement`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DomPatch {
    SetInnerHtml(String),
    SetAttribute { name: String, value: String },
    RemoveAttribute(String),
}

impl DomPatch {
    pub fn set_attribute(name: impl Into<String>, value: impl Into<String>) -> Self {
        DomPatch::SetAttribute {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn remove_attribute(name: impl Into<String>) -> Self {
        DomPatch::RemoveAttribute(name.into())
    }

    pub(crate) fn apply(self, document: &mut dyn Document, element: ElementId) {
        match self {
            DomPatch::SetInnerHtml(html) => document.set_inner_html(element, &html),
            DomPatch::SetAttribute { name, value } => {
                document.set_attribute(element, &name, &value)
            }
            DomPatch::RemoveAttribute(name) => document.remove_attribute(element, &name),
        }
    }
}

/// A queued report from a strategy.
#[derive(Debug)]
pub struct Settlement {
    pub element: ElementId,
    /// `None` only applies the patches.
    pub outcome: Option<bool>,
    pub patches: SmallVec<[DomPatch; 2]>,
}

#[derive(Default)]
struct OutboxInner {
    queue: RefCell<VecDeque<Settlement>>,
    waker: RefCell<Option<Rc<dyn Fn()>>>,
}

/// Settlements waiting for the engine to drain them.
#[derive(Clone, Default)]
pub(crate) struct Outbox {
    inner: Rc<OutboxInner>,
}

impl Outbox {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&self, settlement: Settlement) {
        self.inner.queue.borrow_mut().push_back(settlement);
        let waker = self.inner.waker.borrow().clone();
        if let Some(waker) = waker {
            waker();
        }
    }

    pub(crate) fn pop(&self) -> Option<Settlement> {
        self.inner.queue.borrow_mut().pop_front()
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.queue.borrow().len()
    }

    pub(crate) fn set_waker(&self, waker: Option<Rc<dyn Fn()>>) {
        *self.inner.waker.borrow_mut() = waker;
    }
}

/// Identifies one dispatched load, unique across every loader in the
/// process. Strategies key per-load state by it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LoadId(u64);

impl LoadId {
    fn next() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        LoadId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Handle a strategy uses to report how loading went.
///
/// Cloning is cheap. Only the first outcome reported for an element counts.
#[derive(Clone)]
pub struct Completion {
    element: ElementId,
    load: LoadId,
    outbox: Outbox,
}

impl Completion {
    pub(crate) fn new(element: ElementId, outbox: Outbox) -> Self {
        Self {
            element,
            load: LoadId::next(),
            outbox,
        }
    }

    pub fn element(&self) -> ElementId {
        self.element
    }

    /// The load this handle reports for. Clones share it.
    pub fn load_id(&self) -> LoadId {
        self.load
    }

    pub fn succeed(&self) {
        self.settle(true);
    }

    pub fn fail(&self) {
        self.settle(false);
    }

    pub fn settle(&self, ok: bool) {
        self.push(Some(ok), SmallVec::new());
    }

    /// Applies `patches` to the element, then succeeds.
    pub fn succeed_with(&self, patches: impl IntoIterator<Item = DomPatch>) {
        self.push(Some(true), patches.into_iter().collect());
    }

    /// Applies `patches` to the element without settling it.
    pub fn apply(&self, patches: impl IntoIterator<Item = DomPatch>) {
        self.push(None, patches.into_iter().collect());
    }

    fn push(&self, outcome: Option<bool>, patches: SmallVec<[DomPatch; 2]>) {
        self.outbox.push(Settlement {
            element: self.element,
            outcome,
            patches,
        });
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("element", &self.element)
            .field("load", &self.load)
            .finish()
    }
}
