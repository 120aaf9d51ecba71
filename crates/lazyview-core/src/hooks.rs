use std::fmt;

use crate::config::{ConfigValue, LazyConfig};
use crate::document::{Document, ElementId};
use crate::error::ConfigError;

pub type ElementHook = Box<dyn FnMut(&mut HookContext<'_>, ElementId)>;
pub type FinishedHook = Box<dyn FnMut(&mut HookContext<'_>)>;

/// The loader a hook runs for.
///
/// Elements passed to [`HookContext::add_items`] join the working set once
/// the hook returns.
pub struct HookContext<'a> {
    document: &'a mut dyn Document,
    config: &'a mut LazyConfig,
    added: Vec<ElementId>,
}

impl<'a> HookContext<'a> {
    pub(crate) fn new(document: &'a mut dyn Document, config: &'a mut LazyConfig) -> Self {
        Self {
            document,
            config,
            added: Vec::new(),
        }
    }

    pub fn document(&mut self) -> &mut dyn Document {
        &mut *self.document
    }

    pub fn config(&self) -> &LazyConfig {
        &*self.config
    }

    pub fn config_entry(&self, name: &str) -> Option<ConfigValue> {
        self.config.get(name)
    }

    pub fn set_config_entry(&mut self, name: &str, value: ConfigValue) -> Result<(), ConfigError> {
        self.config.set(name, value)
    }

    pub fn add_items(&mut self, elements: impl IntoIterator<Item = ElementId>) {
        self.added.extend(elements);
    }

    pub(crate) fn into_added(self) -> Vec<ElementId> {
        self.added
    }
}

/// Optional lifecycle callbacks of a [`crate::LazyLoader`].
#[derive(Default)]
pub struct Hooks {
    before_load: Option<ElementHook>,
    after_load: Option<ElementHook>,
    on_error: Option<ElementHook>,
    on_finished_all: Option<FinishedHook>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs when a load is dispatched, before any loading work.
    pub fn before_load(
        mut self,
        hook: impl FnMut(&mut HookContext<'_>, ElementId) + 'static,
    ) -> Self {
        self.before_load = Some(Box::new(hook));
        self
    }

    pub fn after_load(
        mut self,
        hook: impl FnMut(&mut HookContext<'_>, ElementId) + 'static,
    ) -> Self {
        self.after_load = Some(Box::new(hook));
        self
    }

    pub fn on_error(
        mut self,
        hook: impl FnMut(&mut HookContext<'_>, ElementId) + 'static,
    ) -> Self {
        self.on_error = Some(Box::new(hook));
        self
    }

    /// Runs when the working set is empty and no load is in flight.
    pub fn on_finished_all(mut self, hook: impl FnMut(&mut HookContext<'_>) + 'static) -> Self {
        self.on_finished_all = Some(Box::new(hook));
        self
    }

    pub(crate) fn fire_before_load(&mut self, ctx: &mut HookContext<'_>, element: ElementId) {
        if let Some(hook) = self.before_load.as_mut() {
            hook(ctx, element);
        }
    }

    pub(crate) fn fire_after_load(&mut self, ctx: &mut HookContext<'_>, element: ElementId) {
        if let Some(hook) = self.after_load.as_mut() {
            hook(ctx, element);
        }
    }

    pub(crate) fn fire_on_error(&mut self, ctx: &mut HookContext<'_>, element: ElementId) {
        if let Some(hook) = self.on_error.as_mut() {
            hook(ctx, element);
        }
    }

    pub(crate) fn fire_finished_all(&mut self, ctx: &mut HookContext<'_>) {
        if let Some(hook) = self.on_finished_all.as_mut() {
            hook(ctx);
        }
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("before_load", &self.before_load.is_some())
            .field("after_load", &self.after_load.is_some())
            .field("on_error", &self.on_error.is_some())
            .field("on_finished_all", &self.on_finished_all.is_some())
            .finish()
    }
}
