//! Browser event loop glue.
//!
//! Browser callbacks only push into an [`EventQueue`]. A pump scheduled with
//! `setTimeout` drains the queue into the driven engine, runs due timers and
//! re-arms itself for the next deadline.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use lazyview_core::{Clock, Driven, LazyConfig, Readiness};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Event, EventTarget, Window};

use crate::events::{EventQueue, HostEvent};

/// Where scroll events are taken from.
#[derive(Clone, Debug, Default)]
pub struct RuntimeOptions {
    /// Selector of a scrolling container. The window when unset or when
    /// nothing matches.
    pub scroll_target: Option<String>,
}

impl RuntimeOptions {
    /// Listens where the loader's `append_scroll` option points.
    pub fn for_config(config: &LazyConfig) -> Self {
        Self {
            scroll_target: config.append_scroll.clone(),
        }
    }
}

/// How a loader created now should start, from `document.readyState`.
pub fn readiness(window: &Window) -> Readiness {
    let complete = window
        .document()
        .is_some_and(|doc| doc.ready_state() == "complete");
    if complete {
        Readiness::Ready
    } else {
        Readiness::AwaitWindowLoad
    }
}

fn dispatch<T: Driven>(target: &mut T, event: HostEvent) {
    match event {
        HostEvent::Scroll => target.on_scroll(),
        HostEvent::Resize => target.on_resize(),
        HostEvent::WindowLoad => target.on_window_load(),
        HostEvent::ImageSettled { ticket, ok } => target.on_image_settled(ticket, ok),
        HostEvent::Element { target: element, event } => target.on_element_event(element, event),
        HostEvent::Settled => target.flush(),
    }
}

struct Binding {
    target: EventTarget,
    name: &'static str,
    listener: Closure<dyn FnMut(Event)>,
}

struct State<T> {
    window: Window,
    target: Rc<RefCell<T>>,
    queue: EventQueue,
    clock: Rc<dyn Clock>,
    pump: RefCell<Option<Closure<dyn FnMut()>>>,
    timer: Cell<Option<i32>>,
    /// Whether the armed timer fires immediately.
    immediate: Cell<bool>,
    bindings: RefCell<Vec<Binding>>,
}

impl<T: Driven + 'static> State<T> {
    fn arm(&self, delay: u64) {
        if self.immediate.get() {
            return;
        }
        if let Some(handle) = self.timer.take() {
            self.window.clear_timeout_with_handle(handle);
        }
        let pump = self.pump.borrow();
        let Some(pump) = pump.as_ref() else {
            return;
        };
        let delay = i32::try_from(delay).unwrap_or(i32::MAX);
        let callback = pump.as_ref().unchecked_ref();
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback, delay)
        {
            Ok(handle) => {
                self.timer.set(Some(handle));
                self.immediate.set(delay == 0);
            }
            Err(err) => log::error!("could not schedule the pump: {err:?}"),
        }
    }

    fn run(&self) {
        self.timer.set(None);
        self.immediate.set(false);

        let Ok(mut target) = self.target.try_borrow_mut() else {
            log::trace!("engine busy, retrying");
            self.arm(0);
            return;
        };
        for event in self.queue.drain() {
            dispatch(&mut *target, event);
        }
        target.advance();
        let deadline = target.next_deadline();
        let finished = target.is_finished();
        drop(target);

        if finished && !self.bindings.borrow().is_empty() {
            log::debug!("engine finished, page listeners removed");
            self.unbind();
        }

        if !self.queue.is_empty() {
            self.arm(0);
        } else if let Some(deadline) = deadline {
            self.arm(deadline.saturating_sub(self.clock.now_millis()));
        }
    }

    fn unbind(&self) {
        let bindings = std::mem::take(&mut *self.bindings.borrow_mut());
        for binding in bindings {
            let callback = binding.listener.as_ref().unchecked_ref();
            let _ = binding
                .target
                .remove_event_listener_with_callback(binding.name, callback);
        }
    }

    fn bind(&self, target: &EventTarget, name: &'static str, event: HostEvent) {
        let queue = self.queue.clone();
        let listener = Closure::wrap(Box::new(move |_event: Event| {
            queue.push(event);
        }) as Box<dyn FnMut(_)>);
        let callback = listener.as_ref().unchecked_ref();
        if let Err(err) = target.add_event_listener_with_callback(name, callback) {
            log::warn!("could not listen for {name}: {err:?}");
            return;
        }
        self.bindings.borrow_mut().push(Binding {
            target: target.clone(),
            name,
            listener,
        });
    }
}

/// Keeps a [`Driven`] engine fed with browser events.
///
/// Dropping the runtime removes its listeners and cancels the pump; call
/// [`Runtime::keep_alive`] to run for the lifetime of the page.
pub struct Runtime<T: Driven + 'static> {
    state: Rc<State<T>>,
}

impl<T: Driven + 'static> Runtime<T> {
    /// Binds scroll, resize and window load and starts pumping `queue` into
    /// `target`. The queue must be the one the engine's document reports to.
    pub fn start(
        window: Window,
        target: Rc<RefCell<T>>,
        queue: EventQueue,
        clock: impl Clock + 'static,
        options: RuntimeOptions,
    ) -> Self {
        let state = Rc::new(State {
            window: window.clone(),
            target,
            queue: queue.clone(),
            clock: Rc::new(clock),
            pump: RefCell::new(None),
            timer: Cell::new(None),
            immediate: Cell::new(false),
            bindings: RefCell::new(Vec::new()),
        });

        let weak: Weak<State<T>> = Rc::downgrade(&state);
        *state.pump.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            if let Some(state) = weak.upgrade() {
                state.run();
            }
        }) as Box<dyn FnMut()>));

        let weak = Rc::downgrade(&state);
        queue.set_waker(move || {
            if let Some(state) = weak.upgrade() {
                state.arm(0);
            }
        });

        let scroll_target: EventTarget = options
            .scroll_target
            .as_deref()
            .and_then(|selector| window.document()?.query_selector(selector).ok().flatten())
            .map(Into::into)
            .unwrap_or_else(|| window.clone().into());
        state.bind(&scroll_target, "scroll", HostEvent::Scroll);
        state.bind(window.as_ref(), "resize", HostEvent::Resize);

        if readiness(&window) == Readiness::Ready {
            queue.push(HostEvent::WindowLoad);
        } else {
            state.bind(window.as_ref(), "load", HostEvent::WindowLoad);
        }

        state.arm(0);
        log::debug!("lazy loading runtime started");
        Self { state }
    }

    /// Schedules a pass even when no event arrived.
    pub fn wake(&self) {
        self.state.arm(0);
    }

    pub fn target(&self) -> &Rc<RefCell<T>> {
        &self.state.target
    }

    /// Leaks the runtime so it keeps pumping after the caller returns.
    pub fn keep_alive(self) {
        std::mem::forget(self);
    }
}

impl<T: Driven + 'static> Drop for Runtime<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.state.timer.take() {
            self.state.window.clear_timeout_with_handle(handle);
        }
        self.state.unbind();
        self.state.queue.set_waker(|| {});
    }
}
