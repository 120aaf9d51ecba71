//! The surface a host event loop drives.

use crate::document::{Document, ElementEvent, ElementId, ImageTicket};
use crate::engine::LazyLoader;

/// Entry points a host calls from its event loop.
///
/// Implemented by [`LazyLoader`] and by anything that wraps one, so a single
/// host runtime can pump either.
pub trait Driven {
    fn on_scroll(&mut self);

    fn on_resize(&mut self);

    fn on_window_load(&mut self);

    fn on_image_settled(&mut self, ticket: ImageTicket, ok: bool);

    fn on_element_event(&mut self, target: ElementId, event: ElementEvent);

    /// Applies queued strategy results.
    fn flush(&mut self);

    /// Runs whatever is due at the current time.
    fn advance(&mut self);

    /// Clock time of the next call to [`Driven::advance`] with work to do.
    fn next_deadline(&self) -> Option<u64>;

    /// Whether scroll, resize and window load no longer matter, so the host
    /// may stop listening for them. Image and element events still do.
    fn is_finished(&self) -> bool {
        false
    }
}

impl<D: Document> Driven for LazyLoader<D> {
    fn on_scroll(&mut self) {
        LazyLoader::on_scroll(self);
    }

    fn on_resize(&mut self) {
        LazyLoader::on_resize(self);
    }

    fn on_window_load(&mut self) {
        LazyLoader::on_window_load(self);
    }

    fn on_image_settled(&mut self, ticket: ImageTicket, ok: bool) {
        LazyLoader::on_image_settled(self, ticket, ok);
    }

    fn on_element_event(&mut self, target: ElementId, event: ElementEvent) {
        LazyLoader::on_element_event(self, target, event);
    }

    fn flush(&mut self) {
        LazyLoader::flush(self);
    }

    fn advance(&mut self) {
        LazyLoader::advance(self);
    }

    fn next_deadline(&self) -> Option<u64> {
        LazyLoader::next_deadline(self)
    }

    fn is_finished(&self) -> bool {
        self.is_destroyed()
    }
}
