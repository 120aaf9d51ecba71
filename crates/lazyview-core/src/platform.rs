//! Time source abstraction.
//!
//! The engine asks a [`Clock`] for the current time instead of reading it
//! directly, so throttling and delays can be driven by a manual clock in
//! tests and by `web-time` on the web.

use std::rc::Rc;

use web_time::Instant;

/// Provides monotonic time in milliseconds.
pub trait Clock {
    fn now_millis(&self) -> u64;
}

/// Wall clock backed by [`web_time::Instant`], which maps to
/// `performance.now()` on wasm and to `std::time::Instant` natively.
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

impl<C: Clock + ?Sized> Clock for Rc<C> {
    fn now_millis(&self) -> u64 {
        (**self).now_millis()
    }
}
