//! Testing utilities for lazyview: an in-memory [`FakeDocument`], a
//! [`ManualClock`], a scriptable [`FakeFetcher`] and a [`HookLog`] that
//! records lifecycle hooks.

mod clock;
mod document;
mod fetch;
mod hooks;

pub use clock::ManualClock;
pub use document::{ElementBuilder, FakeDocument, ImageLoad};
pub use fetch::FakeFetcher;
pub use hooks::{HookEvent, HookLog};

pub mod prelude {
    pub use crate::{FakeDocument, FakeFetcher, HookEvent, HookLog, ManualClock};
}
