//! The lazy loading instance: working set, scan pass and host entry points.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::config::{BindMode, ConfigValue, LazyConfig};
use crate::document::{Document, DocumentExt, ElementId, ImageTicket};
use crate::error::ConfigError;
use crate::hooks::Hooks;
use crate::loader::{ActiveLoad, Dispatch, PendingImage};
use crate::platform::{Clock, SystemClock};
use crate::prepare::prepare_items;
use crate::registry::LoaderRegistry;
use crate::state::{ElementState, ElementStates};
use crate::strategy::Outbox;
use crate::throttle::Throttle;
use crate::timer::TimerQueue;
use crate::viewport::ViewportEvaluator;

/// Whether the page already finished loading when the engine is created.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Readiness {
    #[default]
    Ready,
    /// The host calls [`LazyLoader::on_window_load`] once the page loaded.
    AwaitWindowLoad,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    /// Created with `bind = load` before the page finished loading.
    AwaitingWindowLoad,
    /// Reacting to scroll, resize and the instance API.
    Listening,
    /// Only the `delay` timer is armed, events are not bound.
    DelayOnly,
    Destroyed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ScanScope {
    /// Elements inside the loadable area.
    Viewport,
    /// Every element regardless of position.
    All,
    /// One element regardless of position.
    Forced(ElementId),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum EngineTask {
    LoadAll,
}

/// Builds a [`LazyLoader`].
pub struct LazyLoaderBuilder {
    config: LazyConfig,
    registry: Option<LoaderRegistry>,
    hooks: Hooks,
    clock: Option<Box<dyn Clock>>,
    readiness: Readiness,
}

impl LazyLoaderBuilder {
    /// Loader strategies, the built-in set without fetcher by default.
    pub fn registry(mut self, registry: LoaderRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }

    pub fn readiness(mut self, readiness: Readiness) -> Self {
        self.readiness = readiness;
        self
    }

    /// Creates the loader over `candidates`.
    ///
    /// The loader initializes right away unless it is bound to the page
    /// load and the page is not ready yet.
    pub fn build<D: Document>(
        self,
        document: D,
        candidates: impl IntoIterator<Item = ElementId>,
    ) -> LazyLoader<D> {
        let wait =
            self.config.bind == BindMode::Load && self.readiness == Readiness::AwaitWindowLoad;
        let mut loader = LazyLoader {
            document,
            config: self.config,
            registry: self
                .registry
                .unwrap_or_else(|| LoaderRegistry::with_builtin(None)),
            hooks: self.hooks,
            clock: self.clock.unwrap_or_else(|| Box::new(SystemClock::new())),
            lifecycle: Lifecycle::AwaitingWindowLoad,
            candidates: candidates.into_iter().collect(),
            items: Vec::new(),
            states: ElementStates::new(),
            pending: 0,
            finished_armed: true,
            retina: false,
            viewport: ViewportEvaluator::new(),
            throttle: Throttle::new(),
            timers: TimerQueue::new(),
            outbox: Outbox::new(),
            watched: FxHashMap::default(),
            active: FxHashMap::default(),
            images: FxHashMap::default(),
        };

        if wait {
            log::debug!("{}: waiting for window load", loader.config.name);
        } else {
            loader.initialize();
        }
        loader
    }
}

/// One lazy loading instance over a [`Document`].
///
/// The loader is single threaded and passive: the host forwards scroll,
/// resize and load events, reports image proxy outcomes and element events,
/// calls [`LazyLoader::advance`] when [`LazyLoader::next_deadline`] passes
/// and [`LazyLoader::flush`] when the settle waker fires.
pub struct LazyLoader<D> {
    pub(crate) document: D,
    pub(crate) config: LazyConfig,
    pub(crate) registry: LoaderRegistry,
    pub(crate) hooks: Hooks,
    pub(crate) clock: Box<dyn Clock>,
    pub(crate) lifecycle: Lifecycle,
    /// Elements handed in before initialization.
    pub(crate) candidates: Vec<ElementId>,
    /// The working set, in collection order.
    pub(crate) items: Vec<ElementId>,
    pub(crate) states: ElementStates,
    /// Loads dispatched but not settled.
    pub(crate) pending: usize,
    pub(crate) finished_armed: bool,
    pub(crate) retina: bool,
    pub(crate) viewport: ViewportEvaluator,
    pub(crate) throttle: Throttle<ScanScope>,
    pub(crate) timers: TimerQueue<EngineTask>,
    pub(crate) outbox: Outbox,
    /// Observed element to the element whose load it belongs to.
    pub(crate) watched: FxHashMap<ElementId, ElementId>,
    pub(crate) active: FxHashMap<ElementId, ActiveLoad>,
    pub(crate) images: FxHashMap<ImageTicket, PendingImage>,
}

impl LazyLoader<()> {
    pub fn builder(config: LazyConfig) -> LazyLoaderBuilder {
        LazyLoaderBuilder {
            config,
            registry: None,
            hooks: Hooks::default(),
            clock: None,
            readiness: Readiness::default(),
        }
    }
}

impl<D: Document> LazyLoader<D> {
    /// A loader with default strategies, no hooks and the system clock.
    pub fn new(
        document: D,
        candidates: impl IntoIterator<Item = ElementId>,
        config: LazyConfig,
    ) -> Self {
        LazyLoader::builder(config).build(document, candidates)
    }

    fn initialize(&mut self) {
        self.retina = self.document.device_pixel_ratio() > 1.0;
        let candidates = std::mem::take(&mut self.candidates);
        self.items = prepare_items(
            &mut self.document,
            candidates,
            &self.config,
            &self.registry,
            &self.states,
        );
        log::debug!(
            "{}: initialized with {} elements",
            self.config.name,
            self.items.len()
        );

        if let Some(delay) = self.config.delay_millis() {
            let due = self.clock.now_millis() + delay;
            self.timers.schedule(due, EngineTask::LoadAll);
        }

        if self.config.delay < 0 || self.config.combined {
            self.lifecycle = Lifecycle::Listening;
            self.scan(ScanScope::Viewport);
        } else {
            self.lifecycle = Lifecycle::DelayOnly;
        }
        self.flush();
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_listening(&self) -> bool {
        self.lifecycle == Lifecycle::Listening
    }

    pub fn is_destroyed(&self) -> bool {
        self.lifecycle == Lifecycle::Destroyed
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut D {
        &mut self.document
    }

    pub fn config(&self) -> &LazyConfig {
        &self.config
    }

    pub fn registry(&self) -> &LoaderRegistry {
        &self.registry
    }

    /// Reads a configuration option by name.
    pub fn config_entry(&self, name: &str) -> Option<ConfigValue> {
        self.config.get(name)
    }

    /// Writes a configuration option by name. Takes effect on the next scan.
    pub fn set_config_entry(
        &mut self,
        name: &str,
        value: ConfigValue,
    ) -> Result<(), ConfigError> {
        self.config.set(name, value)
    }

    /// Loads dispatched but not settled yet.
    pub fn pending_loads(&self) -> usize {
        self.pending
    }

    /// Where `element` is in its load, `None` when it was never dispatched.
    pub fn element_state(&self, element: ElementId) -> Option<ElementState> {
        self.states.get(element)
    }

    /// Called whenever a strategy reports a result, so the host can
    /// schedule a [`LazyLoader::flush`].
    pub fn set_settle_waker(&mut self, waker: impl Fn() + 'static) {
        self.outbox.set_waker(Some(Rc::new(waker)));
    }

    /// The page finished loading.
    pub fn on_window_load(&mut self) {
        if self.lifecycle == Lifecycle::AwaitingWindowLoad {
            self.initialize();
        }
    }

    pub fn on_scroll(&mut self) {
        if self.is_listening() {
            self.request_scan(ScanScope::Viewport, false);
        }
    }

    pub fn on_resize(&mut self) {
        if self.is_listening() {
            self.viewport.invalidate();
            self.request_scan(ScanScope::Viewport, false);
        }
    }

    /// Re-checks the working set against the viewport, bypassing the
    /// throttle unless `use_throttle` is set.
    pub fn update(&mut self, use_throttle: bool) {
        if self.is_listening() {
            self.request_scan(ScanScope::Viewport, !use_throttle);
        }
    }

    /// Loads every element of the working set now.
    pub fn load_all(&mut self) {
        if self.is_listening() {
            self.request_scan(ScanScope::All, true);
        }
    }

    /// Loads the given elements now, ignoring the viewport. Elements that
    /// are not in the working set are skipped.
    pub fn force(&mut self, elements: &[ElementId]) {
        if !self.is_listening() {
            return;
        }
        for &element in elements {
            if self.items.contains(&element) {
                self.scan(ScanScope::Forced(element));
            }
        }
        self.flush();
    }

    /// Prepares `elements` and appends the kept ones to the working set.
    /// Adding at least one element re-arms the finished hook.
    pub fn add_items(&mut self, elements: impl IntoIterator<Item = ElementId>) {
        if !self.is_listening() {
            return;
        }
        let added = prepare_items(
            &mut self.document,
            elements,
            &self.config,
            &self.registry,
            &self.states,
        );
        if added.is_empty() {
            return;
        }
        log::debug!("{}: added {} elements", self.config.name, added.len());
        self.finished_armed = true;
        self.items.extend(added);
    }

    /// Elements of the working set that did not load yet.
    pub fn items(&mut self) -> &[ElementId] {
        if !self.is_listening() {
            return &[];
        }
        let states = &self.states;
        self.items.retain(|element| !states.is_loaded(*element));
        &self.items
    }

    /// Detaches from all events and timers. Loads already in flight still
    /// settle and fire their hooks.
    pub fn destroy(&mut self) {
        if self.lifecycle == Lifecycle::Destroyed {
            return;
        }
        self.lifecycle = Lifecycle::Destroyed;
        self.throttle.cancel();
        self.timers.clear();
        log::debug!("{}: destroyed", self.config.name);
    }

    /// Runs throttled scans and timers that are due.
    pub fn advance(&mut self) {
        let now = self.clock.now_millis();
        if let Some(scope) = self.throttle.poll(now) {
            self.scan(scope);
        }
        while let Some(task) = self.timers.pop_due(now) {
            match task {
                EngineTask::LoadAll => self.scan(ScanScope::All),
            }
        }
        self.flush();
    }

    /// Next time [`LazyLoader::advance`] has work to do.
    pub fn next_deadline(&self) -> Option<u64> {
        match (self.throttle.next_deadline(), self.timers.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn request_scan(&mut self, scope: ScanScope, ignore_throttle: bool) {
        let now = self.clock.now_millis();
        let run = self.throttle.request(
            now,
            self.config.throttle,
            scope,
            self.config.enable_throttle,
            ignore_throttle,
        );
        if let Some(scope) = run {
            self.scan(scope);
        }
        self.flush();
    }

    pub(crate) fn scan(&mut self, scope: ScanScope) {
        if self.lifecycle == Lifecycle::Destroyed {
            return;
        }
        if self.items.is_empty() {
            if self.config.auto_destroy {
                self.destroy();
            }
            return;
        }

        let candidates = match scope {
            ScanScope::Forced(element) => vec![element],
            ScanScope::Viewport | ScanScope::All => self.items.clone(),
        };

        let mut triggered = 0usize;
        for element in candidates {
            let in_area = match scope {
                ScanScope::Viewport => self.viewport.is_loadable(
                    &self.document,
                    element,
                    self.config.threshold,
                    self.config.scroll_direction,
                ),
                ScanScope::All | ScanScope::Forced(_) => true,
            };
            if !in_area {
                continue;
            }
            let Some(dispatch) = self.qualify(element) else {
                continue;
            };
            log::trace!("{}: dispatching {element:?}", self.config.name);
            self.states.mark_handled(element);
            triggered += 1;
            self.handle_item(element, dispatch);
        }

        if triggered > 0 {
            let states = &self.states;
            self.items.retain(|element| !states.is_touched(*element));
            log::debug!(
                "{}: dispatched {triggered}, {} left",
                self.config.name,
                self.items.len()
            );
        }
    }

    /// Decides whether an element in range should load, and how.
    fn qualify(&self, element: ElementId) -> Option<Dispatch> {
        if self.states.is_touched(element) {
            return None;
        }
        let document = &self.document;
        let config = &self.config;
        if config.visible_only && !document.is_visible(element) {
            return None;
        }

        let tag = document.tag_name(element);
        let source = document.non_empty_attribute(element, &config.attribute);
        let srcset = document.attribute(element, &config.srcset_attribute);
        let loader = document.non_empty_attribute(element, &config.loader_attribute);
        let image_base = document
            .non_empty_attribute(element, &config.image_base_attribute)
            .or_else(|| config.image_base.clone())
            .unwrap_or_default();

        let has_source = source.is_some() || srcset.as_deref().is_some_and(|s| !s.is_empty());
        let source_changed = has_source && {
            let resolved = source.as_ref().map(|src| format!("{image_base}{src}"));
            if tag == "img" {
                resolved.is_none()
                    || resolved != document.attribute(element, "src")
                    || srcset != document.attribute(element, "srcset")
            } else {
                resolved.is_none() || resolved != document.style(element, "background-image")
            }
        };

        if !source_changed && loader.is_none() {
            return None;
        }
        Some(Dispatch {
            tag,
            image_base,
            loader,
        })
    }
}
