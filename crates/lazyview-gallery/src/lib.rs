//! Album page behaviours on top of `lazyview-core`.
//!
//! [`Gallery`] owns the page's [`LazyLoader`] and the small behaviours that
//! react to the same events: the photo overlay, the header shrink, the
//! reading progress bar and the body fade-in. It implements [`Driven`], so a
//! host pumps it exactly like a bare loader.

mod album;
mod force_view;
mod header;
mod page_position;
mod page_ready;

use std::rc::Rc;

use lazyview_core::{
    Clock, Document, Driven, ElementEvent, ElementId, ImageTicket, LazyLoader, LoaderRegistry,
    Readiness, SystemClock,
};

pub use album::{album_config, album_hooks, prepare_album, ALBUM_ITEMS};
pub use force_view::{ForceView, Step};
pub use header::{update_header, INITIAL_THRESHOLD, SCROLL_THRESHOLD};
pub use page_position::{scroll_progress, update_bar};
pub use page_ready::PageReady;

pub struct GalleryBuilder {
    registry: LoaderRegistry,
    clock: Rc<dyn Clock>,
    readiness: Readiness,
}

impl GalleryBuilder {
    pub fn registry(mut self, registry: LoaderRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Rc::new(clock);
        self
    }

    pub fn readiness(mut self, readiness: Readiness) -> Self {
        self.readiness = readiness;
        self
    }

    /// Sets the page up and starts lazy loading the album photos.
    pub fn build<D: Document>(self, mut doc: D) -> Gallery<D> {
        let now = self.clock.now_millis();
        let mut page_ready = PageReady::new();
        page_ready.start(&doc, now);
        update_header(&mut doc, INITIAL_THRESHOLD);
        update_bar(&mut doc);

        let force_view = ForceView::bind(&doc);
        let items = prepare_album(&mut doc);
        let lazy = LazyLoader::builder(album_config())
            .registry(self.registry)
            .hooks(album_hooks())
            .clock(Rc::clone(&self.clock))
            .readiness(self.readiness)
            .build(doc, items);

        Gallery {
            lazy,
            force_view,
            page_ready,
            clock: self.clock,
        }
    }
}

/// An album page.
pub struct Gallery<D> {
    lazy: LazyLoader<D>,
    force_view: ForceView,
    page_ready: PageReady,
    clock: Rc<dyn Clock>,
}

impl Gallery<()> {
    pub fn builder() -> GalleryBuilder {
        GalleryBuilder {
            registry: LoaderRegistry::with_builtin(None),
            clock: Rc::new(SystemClock::new()),
            readiness: Readiness::Ready,
        }
    }
}

impl<D: Document> Gallery<D> {
    pub fn loader(&self) -> &LazyLoader<D> {
        &self.lazy
    }

    pub fn loader_mut(&mut self) -> &mut LazyLoader<D> {
        &mut self.lazy
    }

    pub fn document(&self) -> &D {
        self.lazy.document()
    }

    pub fn document_mut(&mut self) -> &mut D {
        self.lazy.document_mut()
    }

    pub fn force_view(&self) -> &ForceView {
        &self.force_view
    }

    /// Routes a click to the photo overlay. Returns whether it was handled.
    pub fn on_click(&mut self, target: ElementId) -> bool {
        self.force_view.on_click(self.lazy.document_mut(), target)
    }

    /// Arrow keys page through the album.
    pub fn on_key(&mut self, code: u32) -> bool {
        self.force_view.on_key(self.lazy.document_mut(), code)
    }
}

impl<D: Document> Driven for Gallery<D> {
    fn on_scroll(&mut self) {
        self.lazy.on_scroll();
        let doc = self.lazy.document_mut();
        update_header(doc, SCROLL_THRESHOLD);
        update_bar(doc);
    }

    fn on_resize(&mut self) {
        self.lazy.on_resize();
        update_bar(self.lazy.document_mut());
    }

    fn on_window_load(&mut self) {
        self.lazy.on_window_load();
        let doc = self.lazy.document_mut();
        update_header(doc, INITIAL_THRESHOLD);
        update_bar(doc);
    }

    fn on_image_settled(&mut self, ticket: ImageTicket, ok: bool) {
        self.lazy.on_image_settled(ticket, ok);
    }

    fn on_element_event(&mut self, target: ElementId, event: ElementEvent) {
        self.lazy.on_element_event(target, event);
    }

    fn flush(&mut self) {
        self.lazy.flush();
    }

    fn advance(&mut self) {
        self.lazy.advance();
        let now = self.clock.now_millis();
        self.page_ready.advance(self.lazy.document_mut(), now);
    }

    fn next_deadline(&self) -> Option<u64> {
        match (self.lazy.next_deadline(), self.page_ready.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}
