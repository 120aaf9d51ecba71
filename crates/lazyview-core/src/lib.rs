//! Viewport-driven lazy loading.
//!
//! A [`LazyLoader`] tracks a working set of elements that carry deferred
//! sources (`data-src`, `data-srcset`, `data-loader`, ...) and loads each one
//! once it enters the loadable area: the viewport grown by a threshold. The
//! host environment is abstracted behind [`Document`], so the same engine
//! drives a browser page through `lazyview-platform-web` and an in-memory
//! document in tests.
//!
//! Loading either goes through an off-DOM image proxy provided by the host or
//! through a named [`LoadStrategy`] taken from a [`LoaderRegistry`].

mod config;
mod document;
mod driver;
mod engine;
mod error;
mod fetch;
mod hooks;
mod loader;
pub mod loaders;
mod platform;
mod prepare;
mod registry;
mod srcset;
mod state;
mod strategy;
pub mod throttle;
pub mod timer;
pub mod viewport;

pub use config::*;
pub use document::*;
pub use driver::Driven;
pub use engine::*;
pub use error::*;
pub use fetch::*;
pub use hooks::*;
pub use platform::*;
pub use prepare::prepare_items;
pub use registry::*;
pub use srcset::corrected_srcset;
pub use state::*;
pub use strategy::*;

pub use lazyview_geometry::{Point, Rect, Size};

pub mod prelude {
    pub use crate::config::{BindMode, ConfigValue, Effect, LazyConfig, ScrollDirection};
    pub use crate::document::{Document, DocumentExt, ElementEvent, ElementId};
    pub use crate::driver::Driven;
    pub use crate::engine::{LazyLoader, Readiness};
    pub use crate::hooks::Hooks;
    pub use crate::registry::LoaderRegistry;
    pub use crate::strategy::{Completion, LoadContext, LoadStrategy};
}
