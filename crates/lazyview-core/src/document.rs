//! Host document abstraction.
//!
//! The engine never touches a real DOM. Everything it reads or writes goes
//! through [`Document`], which a host implements over its element tree: the
//! browser adapter wraps `web-sys`, tests use an in-memory tree.

use std::time::Duration;

use lazyview_geometry::{Point, Rect, Size};

use crate::config::Effect;

/// Stable handle of one element inside a [`Document`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u64);

/// Handle of an off-DOM image proxy created by [`Document::load_image`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ImageTicket(pub u64);

/// Sources handed to an off-DOM image proxy.
///
/// `sizes` and `srcset` are assigned before `src` so the browser picks the
/// right candidate before it starts fetching.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImageRequest {
    pub sizes: Option<String>,
    pub srcset: Option<String>,
    pub src: Option<String>,
}

/// Native element events the engine routes to loader strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementEvent {
    Load,
    Error,
    LoadedMetadata,
}

impl ElementEvent {
    pub fn name(self) -> &'static str {
        match self {
            ElementEvent::Load => "load",
            ElementEvent::Error => "error",
            ElementEvent::LoadedMetadata => "loadedmetadata",
        }
    }
}

/// The element tree and window a [`crate::LazyLoader`] works on.
pub trait Document {
    /// Lowercase tag name.
    fn tag_name(&self, element: ElementId) -> String;

    fn attribute(&self, element: ElementId, name: &str) -> Option<String>;

    fn set_attribute(&mut self, element: ElementId, name: &str, value: &str);

    fn remove_attribute(&mut self, element: ElementId, name: &str);

    /// Attribute names in document order.
    fn attribute_names(&self, element: ElementId) -> Vec<String>;

    /// Current value of a CSS property, `None` when unset. Hosts with a
    /// cascade report the computed value.
    fn style(&self, element: ElementId, property: &str) -> Option<String>;

    fn set_style(&mut self, element: ElementId, property: &str, value: &str);

    /// Bounds relative to the viewport origin.
    fn bounding_rect(&self, element: ElementId) -> Rect;

    /// Whether the element takes up space in the layout.
    fn is_visible(&self, element: ElementId) -> bool;

    /// Inner size of the window.
    fn viewport_size(&self) -> Size;

    fn device_pixel_ratio(&self) -> f32;

    /// Current page scroll offset.
    fn scroll_offset(&self) -> Point;

    /// Full scrollable size of the page.
    fn content_size(&self) -> Size;

    /// Scrolls the page, animated over `duration`.
    fn scroll_to(&mut self, position: Point, duration: Duration);

    /// All elements matching a simple selector, in document order.
    fn query_all(&self, selector: &str) -> Vec<ElementId>;

    fn parent(&self, element: ElementId) -> Option<ElementId>;

    /// Child elements in document order.
    fn children(&self, element: ElementId) -> Vec<ElementId>;

    /// Creates a detached element.
    fn create_element(&mut self, tag: &str) -> ElementId;

    fn append_child(&mut self, parent: ElementId, child: ElementId);

    /// Puts `replacement` where `element` was and detaches `element`.
    fn replace_element(&mut self, element: ElementId, replacement: ElementId);

    fn set_inner_html(&mut self, element: ElementId, html: &str);

    fn hide(&mut self, element: ElementId);

    /// Shows a hidden element again with the named transition.
    fn apply_effect(&mut self, element: ElementId, effect: &Effect, duration: Duration);

    /// Starts loading an off-DOM image proxy.
    ///
    /// The host reports the outcome later through
    /// [`crate::LazyLoader::on_image_settled`] with the returned ticket.
    fn load_image(&mut self, request: ImageRequest) -> ImageTicket;

    /// Starts forwarding `load`, `error` and `loadedmetadata` events of the
    /// element to [`crate::LazyLoader::on_element_event`].
    fn observe(&mut self, element: ElementId);

    /// Stops forwarding events of the element.
    fn unobserve(&mut self, _element: ElementId) {}
}

/// Helpers shared by every [`Document`].
pub trait DocumentExt: Document {
    /// The attribute value, treating an empty value like a missing one.
    fn non_empty_attribute(&self, element: ElementId, name: &str) -> Option<String> {
        self.attribute(element, name).filter(|value| !value.is_empty())
    }

    fn has_class(&self, element: ElementId, class: &str) -> bool {
        self.attribute(element, "class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    fn add_class(&mut self, element: ElementId, class: &str) {
        if self.has_class(element, class) {
            return;
        }
        let classes = match self.attribute(element, "class") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {class}", existing.trim()),
            _ => class.to_string(),
        };
        self.set_attribute(element, "class", &classes);
    }

    fn remove_class(&mut self, element: ElementId, class: &str) {
        let Some(existing) = self.attribute(element, "class") else {
            return;
        };
        let remaining: Vec<&str> = existing
            .split_whitespace()
            .filter(|c| *c != class)
            .collect();
        self.set_attribute(element, "class", &remaining.join(" "));
    }

    /// Descendants with the given tag, depth first in document order.
    fn descendants_by_tag(&self, element: ElementId, tag: &str) -> Vec<ElementId> {
        let mut found = Vec::new();
        let mut stack: Vec<ElementId> = self.children(element).into_iter().rev().collect();
        while let Some(next) = stack.pop() {
            if self.tag_name(next) == tag {
                found.push(next);
            }
            stack.extend(self.children(next).into_iter().rev());
        }
        found
    }
}

impl<D: Document + ?Sized> DocumentExt for D {}
