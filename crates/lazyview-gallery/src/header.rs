//! Shrinks the page header once the page scrolls.

use lazyview_core::{Document, DocumentExt, ElementId};

const HEADER: &str = ".header";
const SHRINK: &str = "shrink";

/// Offset needed on the first check after load.
pub const INITIAL_THRESHOLD: f32 = 2.0;
/// Offset needed on scroll.
pub const SCROLL_THRESHOLD: f32 = 1.0;

/// Applies the header state for the current scroll offset.
///
/// Past `threshold` the first unshrunk header gains `shrink`; otherwise the
/// first header is reset to the bare `header` class.
pub fn update_header<D: Document + ?Sized>(doc: &mut D, threshold: f32) {
    let offset = doc.scroll_offset().y;
    let headers = doc.query_all(HEADER);
    if offset >= threshold {
        let unshrunk = headers
            .into_iter()
            .find(|&header| !doc.has_class(header, SHRINK));
        if let Some(header) = unshrunk {
            doc.add_class(header, SHRINK);
        }
    } else if let Some(&header) = headers.first() {
        reset(doc, header);
    }
}

fn reset<D: Document + ?Sized>(doc: &mut D, header: ElementId) {
    doc.set_attribute(header, "class", "header");
}
