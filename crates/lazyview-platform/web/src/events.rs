use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use lazyview_core::{ElementEvent, ElementId, ImageTicket};

/// Something the browser reported that the engine has to hear about.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostEvent {
    Scroll,
    Resize,
    WindowLoad,
    ImageSettled { ticket: ImageTicket, ok: bool },
    Element { target: ElementId, event: ElementEvent },
    /// A strategy queued a result and the engine should flush.
    Settled,
}

#[derive(Default)]
struct QueueInner {
    events: RefCell<VecDeque<HostEvent>>,
    waker: RefCell<Option<Rc<dyn Fn()>>>,
}

/// Events collected by browser callbacks until the runtime pumps them.
///
/// Callbacks never touch the engine directly: they run while the engine may
/// be borrowed, so they only queue and wake the pump.
#[derive(Clone, Default)]
pub struct EventQueue {
    inner: Rc<QueueInner>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: HostEvent) {
        self.inner.events.borrow_mut().push_back(event);
        let waker = self.inner.waker.borrow().clone();
        if let Some(waker) = waker {
            waker();
        }
    }

    pub fn drain(&self) -> Vec<HostEvent> {
        self.inner.events.borrow_mut().drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.events.borrow().is_empty()
    }

    pub fn set_waker(&self, waker: impl Fn() + 'static) {
        *self.inner.waker.borrow_mut() = Some(Rc::new(waker));
    }

    /// A callback that queues `event`, for hand-off to the engine's settle
    /// waker.
    pub fn notifier(&self, event: HostEvent) -> impl Fn() + 'static {
        let queue = self.clone();
        move || queue.push(event)
    }
}
