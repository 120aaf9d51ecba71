//! Album page demo.
//!
//! With the `web` feature on wasm32 the crate exports a start function that
//! wires the gallery into the host page. Natively it offers a headless run
//! over an in-memory page.

#[cfg(not(target_arch = "wasm32"))]
pub mod headless;

#[cfg(all(feature = "web", target_arch = "wasm32"))]
mod web;
