//! Lazy loading setup for album pages.

use lazyview_core::{
    BindMode, Document, DocumentExt, ElementId, Hooks, LazyConfig, ScrollDirection,
};

/// Selector of the album photos.
pub const ALBUM_ITEMS: &str = ".lazy";

/// Loader options used on album pages.
pub fn album_config() -> LazyConfig {
    LazyConfig::default()
        .with_bind(BindMode::Event)
        .with_scroll_direction(ScrollDirection::Vertical)
        .with_effect("fadeIn", 0)
        .with_visible_only(true)
}

/// Marks the photo's container as loaded.
pub fn album_hooks() -> Hooks {
    Hooks::new().after_load(|ctx, element| {
        let doc = ctx.document();
        if let Some(parent) = doc.parent(element) {
            doc.add_class(parent, "loaded");
        }
    })
}

/// Collects the album photos and drops the aspect-ratio padding from their
/// containers.
pub fn prepare_album<D: Document + ?Sized>(doc: &mut D) -> Vec<ElementId> {
    let items = doc.query_all(ALBUM_ITEMS);
    for &item in &items {
        if let Some(parent) = doc.parent(item) {
            doc.set_style(parent, "padding-top", "0");
        }
    }
    log::debug!("album has {} photos", items.len());
    items
}
