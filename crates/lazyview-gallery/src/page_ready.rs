//! Body fade-in after the page has been parsed.

use lazyview_core::timer::TimerQueue;
use lazyview_core::{Document, DocumentExt};

const LOADED_AFTER: u64 = 300;
const FADE_AFTER: u64 = 450;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step {
    Loaded,
    FadeOut,
}

impl Step {
    fn class(self) -> &'static str {
        match self {
            Step::Loaded => "loaded",
            Step::FadeOut => "fadout",
        }
    }
}

/// Adds `loaded` and then `fadout` to the body, once per page.
#[derive(Debug, Default)]
pub struct PageReady {
    started: bool,
    timers: TimerQueue<Step>,
}

impl PageReady {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules the classes unless this already ran or the body is marked
    /// loaded.
    pub fn start<D: Document + ?Sized>(&mut self, doc: &D, now: u64) {
        if self.started {
            return;
        }
        self.started = true;
        let already_loaded = body(doc).is_some_and(|body| doc.has_class(body, "loaded"));
        if already_loaded {
            return;
        }
        self.timers.schedule(now + LOADED_AFTER, Step::Loaded);
        self.timers.schedule(now + FADE_AFTER, Step::FadeOut);
    }

    pub fn advance<D: Document + ?Sized>(&mut self, doc: &mut D, now: u64) {
        while let Some(step) = self.timers.pop_due(now) {
            if let Some(body) = body(doc) {
                doc.add_class(body, step.class());
            }
        }
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.next_deadline()
    }
}

fn body<D: Document + ?Sized>(doc: &D) -> Option<lazyview_core::ElementId> {
    doc.query_all("body").into_iter().next()
}
