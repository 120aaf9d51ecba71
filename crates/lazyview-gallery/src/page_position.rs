//! Reading progress bar.

use lazyview_core::Document;

const BAR: &str = "#pageposition";

/// Scrolled share of the page in percent of the viewport width.
///
/// Zero when the content is not taller than the viewport.
pub fn scroll_progress<D: Document + ?Sized>(doc: &D) -> f32 {
    let scroll = doc.scroll_offset().y;
    let viewport = doc.viewport_size().height;
    let content = doc.content_size().height;
    let span = viewport - content;
    if span >= 0.0 {
        return 0.0;
    }
    -100.0 * (scroll / span)
}

/// Sizes `#pageposition` to the current progress.
pub fn update_bar<D: Document + ?Sized>(doc: &mut D) {
    let Some(bar) = doc.query_all(BAR).into_iter().next() else {
        return;
    };
    let width = format!("{}vw", scroll_progress(doc));
    doc.set_style(bar, "width", &width);
}
