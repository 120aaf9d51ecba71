//! Full-size photo overlay with previous/next navigation.
//!
//! The overlay is `#viewforce` holding an `img.viewforceimage`. Each album
//! photo sits in an `.albumItem` whose `data-prev` and `data-next` name the
//! neighbouring photo sources.

use std::time::Duration;

use lazyview_core::{Document, DocumentExt, ElementId, Point};

const OVERLAY: &str = "#viewforce";
const OVERLAY_IMAGE: &str = "#viewforce img.viewforceimage";
const ALBUM_PHOTOS: &str = "img.lazy";
const NEXT_BUTTON: &str = "#next";
const PREV_BUTTON: &str = "#prev";
const SCROLL_DURATION: Duration = Duration::from_millis(100);

const KEY_LEFT: u32 = 37;
const KEY_RIGHT: u32 = 39;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Prev,
    Next,
}

impl Step {
    fn attribute(self) -> &'static str {
        match self {
            Step::Prev => "data-prev",
            Step::Next => "data-next",
        }
    }

    /// The step bound to a keyboard key code.
    pub fn from_key_code(code: u32) -> Option<Self> {
        match code {
            KEY_LEFT => Some(Step::Prev),
            KEY_RIGHT => Some(Step::Next),
            _ => None,
        }
    }
}

/// The overlay's elements, looked up once per page.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ForceView {
    overlay: Option<ElementId>,
    image: Option<ElementId>,
    next: Option<ElementId>,
    prev: Option<ElementId>,
}

fn first<D: Document + ?Sized>(doc: &D, selector: &str) -> Option<ElementId> {
    doc.query_all(selector).into_iter().next()
}

impl ForceView {
    pub fn bind<D: Document + ?Sized>(doc: &D) -> Self {
        let view = Self {
            overlay: first(doc, OVERLAY),
            image: first(doc, OVERLAY_IMAGE),
            next: first(doc, NEXT_BUTTON),
            prev: first(doc, PREV_BUTTON),
        };
        if view.overlay.is_none() {
            log::debug!("page has no photo overlay");
        }
        view
    }

    pub fn is_open<D: Document + ?Sized>(&self, doc: &D) -> bool {
        self.overlay
            .is_some_and(|overlay| doc.style(overlay, "display").as_deref() == Some("block"))
    }

    /// Source currently shown in the overlay.
    pub fn current<D: Document + ?Sized>(&self, doc: &D) -> Option<String> {
        doc.attribute(self.image?, "src")
    }

    /// Shows `src` in the overlay and scrolls the page to the album photo
    /// with that source.
    pub fn open<D: Document + ?Sized>(&self, doc: &mut D, src: &str) {
        let (Some(overlay), Some(image)) = (self.overlay, self.image) else {
            return;
        };
        doc.set_style(overlay, "display", "block");
        doc.set_attribute(image, "src", src);

        if let Some(photo) = photo_with_source(doc, src) {
            let top = doc.bounding_rect(photo).y + doc.scroll_offset().y;
            let x = doc.scroll_offset().x;
            doc.scroll_to(Point::new(x, top), SCROLL_DURATION);
        }
    }

    pub fn close<D: Document + ?Sized>(&self, doc: &mut D) {
        if let Some(overlay) = self.overlay {
            doc.set_style(overlay, "display", "none");
        }
    }

    /// Moves to the neighbouring photo. Returns whether anything changed.
    pub fn step<D: Document + ?Sized>(&self, doc: &mut D, step: Step) -> bool {
        let Some(current) = self.current(doc) else {
            return false;
        };
        let target = photo_with_source(doc, &current)
            .and_then(|photo| doc.parent(photo))
            .filter(|item| doc.has_class(*item, "albumItem"))
            .and_then(|item| doc.non_empty_attribute(item, step.attribute()));
        match target {
            Some(src) => {
                self.open(doc, &src);
                true
            }
            None => false,
        }
    }

    /// Routes a click on `target`. Returns whether the click was handled.
    pub fn on_click<D: Document + ?Sized>(&self, doc: &mut D, target: ElementId) -> bool {
        if Some(target) == self.overlay {
            self.close(doc);
            return true;
        }
        if Some(target) == self.next {
            return self.step(doc, Step::Next);
        }
        if Some(target) == self.prev {
            return self.step(doc, Step::Prev);
        }
        if is_album_photo(doc, target) {
            let src = doc.attribute(target, "src").unwrap_or_default();
            self.open(doc, &src);
            return true;
        }
        false
    }

    pub fn on_key<D: Document + ?Sized>(&self, doc: &mut D, code: u32) -> bool {
        match Step::from_key_code(code) {
            Some(step) => self.step(doc, step),
            None => false,
        }
    }
}

fn is_album_photo<D: Document + ?Sized>(doc: &D, element: ElementId) -> bool {
    doc.tag_name(element) == "img" && doc.has_class(element, "lazy")
}

/// First album photo whose `src` contains `src`.
fn photo_with_source<D: Document + ?Sized>(doc: &D, src: &str) -> Option<ElementId> {
    doc.query_all(ALBUM_PHOTOS).into_iter().find(|&photo| {
        doc.attribute(photo, "src")
            .is_some_and(|value| value.contains(src))
    })
}
