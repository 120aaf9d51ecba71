//! In-memory [`Document`] used by tests, benches and the headless demo.

use std::collections::BTreeMap;
use std::time::Duration;

use lazyview_core::{
    Document, DocumentExt, Effect, ElementId, ImageRequest, ImageTicket, Point, Rect, Size,
};
use rustc_hash::FxHashSet;

#[derive(Clone, Debug)]
struct Node {
    tag: String,
    attributes: Vec<(String, String)>,
    style: BTreeMap<String, String>,
    /// Bounds in page coordinates.
    layout: Rect,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    inner_html: Option<String>,
    effects: Vec<(Effect, Duration)>,
}

impl Node {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
            style: BTreeMap::new(),
            layout: Rect::default(),
            parent: None,
            children: Vec::new(),
            inner_html: None,
            effects: Vec::new(),
        }
    }
}

/// One image proxy started through [`Document::load_image`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageLoad {
    pub ticket: ImageTicket,
    pub request: ImageRequest,
}

/// A small element tree with a window.
///
/// Element bounds are kept in page coordinates; [`Document::bounding_rect`]
/// subtracts the scroll offset like a browser does. Selectors support tag,
/// `.class` and `#id` compounds joined by descendant combinators, plus
/// comma separated lists.
#[derive(Clone, Debug)]
pub struct FakeDocument {
    nodes: Vec<Node>,
    body: ElementId,
    viewport: Size,
    content: Option<Size>,
    pixel_ratio: f32,
    scroll: Point,
    scroll_requests: Vec<(Point, Duration)>,
    images: Vec<ImageLoad>,
    observed: FxHashSet<ElementId>,
}

impl FakeDocument {
    pub fn new(viewport: Size) -> Self {
        let mut body = Node::new("body");
        body.layout = Rect::from_size(viewport);
        Self {
            nodes: vec![body],
            body: ElementId(0),
            viewport,
            content: None,
            pixel_ratio: 1.0,
            scroll: Point::ZERO,
            scroll_requests: Vec::new(),
            images: Vec::new(),
            observed: FxHashSet::default(),
        }
    }

    pub fn body(&self) -> ElementId {
        self.body
    }

    /// Starts building an element that is appended to the body.
    pub fn add(&mut self, tag: &str) -> ElementBuilder<'_> {
        let id = self.push_node(Node::new(tag));
        ElementBuilder {
            document: self,
            id,
            parent: None,
        }
    }

    fn push_node(&mut self, node: Node) -> ElementId {
        self.nodes.push(node);
        ElementId(self.nodes.len() as u64 - 1)
    }

    fn node(&self, element: ElementId) -> Option<&Node> {
        self.nodes.get(element.0 as usize)
    }

    fn node_mut(&mut self, element: ElementId) -> Option<&mut Node> {
        self.nodes.get_mut(element.0 as usize)
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    pub fn set_pixel_ratio(&mut self, ratio: f32) {
        self.pixel_ratio = ratio;
    }

    pub fn set_scroll(&mut self, offset: Point) {
        self.scroll = offset;
    }

    pub fn set_content_size(&mut self, size: Size) {
        self.content = Some(size);
    }

    pub fn set_layout(&mut self, element: ElementId, layout: Rect) {
        if let Some(node) = self.node_mut(element) {
            node.layout = layout;
        }
    }

    /// Borrowed attribute value.
    pub fn attr(&self, element: ElementId, name: &str) -> Option<&str> {
        self.node(element)?
            .attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn style_of(&self, element: ElementId, property: &str) -> Option<&str> {
        self.node(element)?.style.get(property).map(String::as_str)
    }

    pub fn inner_html(&self, element: ElementId) -> Option<&str> {
        self.node(element)?.inner_html.as_deref()
    }

    pub fn effects(&self, element: ElementId) -> Vec<(Effect, Duration)> {
        self.node(element)
            .map(|node| node.effects.clone())
            .unwrap_or_default()
    }

    pub fn image_loads(&self) -> &[ImageLoad] {
        &self.images
    }

    pub fn last_image_load(&self) -> Option<&ImageLoad> {
        self.images.last()
    }

    pub fn scroll_requests(&self) -> &[(Point, Duration)] {
        &self.scroll_requests
    }

    pub fn is_observed(&self, element: ElementId) -> bool {
        self.observed.contains(&element)
    }

    pub fn is_attached(&self, element: ElementId) -> bool {
        let mut current = Some(element);
        while let Some(id) = current {
            if id == self.body {
                return true;
            }
            current = self.node(id).and_then(|node| node.parent);
        }
        false
    }

    fn detach(&mut self, element: ElementId) {
        let Some(parent) = self.node(element).and_then(|node| node.parent) else {
            return;
        };
        if let Some(parent) = self.node_mut(parent) {
            parent.children.retain(|child| *child != element);
        }
        if let Some(node) = self.node_mut(element) {
            node.parent = None;
        }
    }

    /// Attached elements in document order.
    fn walk(&self) -> Vec<ElementId> {
        let mut order = Vec::new();
        let mut stack = vec![self.body];
        while let Some(next) = stack.pop() {
            order.push(next);
            if let Some(node) = self.node(next) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        order
    }

    fn matches_compound(&self, element: ElementId, compound: &str) -> bool {
        let Some(node) = self.node(element) else {
            return false;
        };
        let mut rest = compound;
        let tag_end = rest.find(['.', '#']).unwrap_or(rest.len());
        let tag = &rest[..tag_end];
        if !tag.is_empty() && tag != "*" && !tag.eq_ignore_ascii_case(&node.tag) {
            return false;
        }
        rest = &rest[tag_end..];

        while !rest.is_empty() {
            let marker = &rest[..1];
            let body = &rest[1..];
            let end = body.find(['.', '#']).unwrap_or(body.len());
            let name = &body[..end];
            let matched = match marker {
                "." => self.has_class(element, name),
                "#" => self.attr(element, "id") == Some(name),
                _ => false,
            };
            if !matched {
                return false;
            }
            rest = &body[end..];
        }
        true
    }

    fn matches_selector(&self, element: ElementId, selector: &str) -> bool {
        let mut parts: Vec<&str> = selector.split_whitespace().collect();
        let Some(last) = parts.pop() else {
            return false;
        };
        if !self.matches_compound(element, last) {
            return false;
        }
        let mut ancestor = self.node(element).and_then(|node| node.parent);
        while let Some(part) = parts.last() {
            let Some(current) = ancestor else {
                return false;
            };
            if self.matches_compound(current, part) {
                parts.pop();
            }
            ancestor = self.node(current).and_then(|node| node.parent);
        }
        true
    }
}

impl Document for FakeDocument {
    fn tag_name(&self, element: ElementId) -> String {
        self.node(element)
            .map(|node| node.tag.clone())
            .unwrap_or_default()
    }

    fn attribute(&self, element: ElementId, name: &str) -> Option<String> {
        self.attr(element, name).map(str::to_string)
    }

    fn set_attribute(&mut self, element: ElementId, name: &str, value: &str) {
        let Some(node) = self.node_mut(element) else {
            return;
        };
        match node.attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => node
                .attributes
                .push((name.to_string(), value.to_string())),
        }
    }

    fn remove_attribute(&mut self, element: ElementId, name: &str) {
        if let Some(node) = self.node_mut(element) {
            node.attributes.retain(|(key, _)| key != name);
        }
    }

    fn attribute_names(&self, element: ElementId) -> Vec<String> {
        self.node(element)
            .map(|node| node.attributes.iter().map(|(key, _)| key.clone()).collect())
            .unwrap_or_default()
    }

    fn style(&self, element: ElementId, property: &str) -> Option<String> {
        self.style_of(element, property).map(str::to_string)
    }

    fn set_style(&mut self, element: ElementId, property: &str, value: &str) {
        if let Some(node) = self.node_mut(element) {
            node.style.insert(property.to_string(), value.to_string());
        }
    }

    fn bounding_rect(&self, element: ElementId) -> Rect {
        self.node(element)
            .map(|node| node.layout.translate(-self.scroll.x, -self.scroll.y))
            .unwrap_or_default()
    }

    fn is_visible(&self, element: ElementId) -> bool {
        let mut current = Some(element);
        while let Some(id) = current {
            let Some(node) = self.node(id) else {
                return false;
            };
            if node.style.get("display").map(String::as_str) == Some("none") {
                return false;
            }
            current = node.parent;
        }
        self.is_attached(element)
    }

    fn viewport_size(&self) -> Size {
        self.viewport
    }

    fn device_pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    fn scroll_offset(&self) -> Point {
        self.scroll
    }

    fn content_size(&self) -> Size {
        if let Some(size) = self.content {
            return size;
        }
        let bottom = self
            .walk()
            .into_iter()
            .filter_map(|id| self.node(id).map(|node| node.layout.bottom()))
            .fold(self.viewport.height, f32::max);
        Size::new(self.viewport.width, bottom)
    }

    fn scroll_to(&mut self, position: Point, duration: Duration) {
        self.scroll_requests.push((position, duration));
        self.scroll = position;
    }

    fn query_all(&self, selector: &str) -> Vec<ElementId> {
        let selectors: Vec<&str> = selector
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        self.walk()
            .into_iter()
            .filter(|id| selectors.iter().any(|s| self.matches_selector(*id, s)))
            .collect()
    }

    fn parent(&self, element: ElementId) -> Option<ElementId> {
        self.node(element)?.parent
    }

    fn children(&self, element: ElementId) -> Vec<ElementId> {
        self.node(element)
            .map(|node| node.children.clone())
            .unwrap_or_default()
    }

    fn create_element(&mut self, tag: &str) -> ElementId {
        self.push_node(Node::new(tag))
    }

    fn append_child(&mut self, parent: ElementId, child: ElementId) {
        self.detach(child);
        if let Some(node) = self.node_mut(parent) {
            node.children.push(child);
        }
        if let Some(node) = self.node_mut(child) {
            node.parent = Some(parent);
        }
    }

    fn replace_element(&mut self, element: ElementId, replacement: ElementId) {
        let Some(parent) = self.node(element).and_then(|node| node.parent) else {
            return;
        };
        self.detach(replacement);
        if let Some(node) = self.node_mut(parent) {
            if let Some(slot) = node.children.iter_mut().find(|child| **child == element) {
                *slot = replacement;
            }
        }
        let layout = self.node(element).map(|node| node.layout);
        if let Some(node) = self.node_mut(replacement) {
            node.parent = Some(parent);
            node.layout = layout.unwrap_or_default();
        }
        if let Some(node) = self.node_mut(element) {
            node.parent = None;
        }
    }

    fn set_inner_html(&mut self, element: ElementId, html: &str) {
        if let Some(node) = self.node_mut(element) {
            node.inner_html = Some(html.to_string());
        }
    }

    fn hide(&mut self, element: ElementId) {
        self.set_style(element, "display", "none");
    }

    fn apply_effect(&mut self, element: ElementId, effect: &Effect, duration: Duration) {
        if let Some(node) = self.node_mut(element) {
            node.style.remove("display");
            node.effects.push((effect.clone(), duration));
        }
    }

    fn load_image(&mut self, request: ImageRequest) -> ImageTicket {
        let ticket = ImageTicket(self.images.len() as u64);
        log::trace!("fake image load {ticket:?}: {request:?}");
        self.images.push(ImageLoad { ticket, request });
        ticket
    }

    fn observe(&mut self, element: ElementId) {
        self.observed.insert(element);
    }

    fn unobserve(&mut self, element: ElementId) {
        self.observed.remove(&element);
    }
}

/// Configures an element created by [`FakeDocument::add`].
pub struct ElementBuilder<'a> {
    document: &'a mut FakeDocument,
    id: ElementId,
    parent: Option<ElementId>,
}

impl ElementBuilder<'_> {
    pub fn attr(self, name: &str, value: &str) -> Self {
        self.document.set_attribute(self.id, name, value);
        self
    }

    pub fn class(self, class: &str) -> Self {
        self.document.add_class(self.id, class);
        self
    }

    pub fn id_attr(self, id: &str) -> Self {
        self.attr("id", id)
    }

    pub fn style(self, property: &str, value: &str) -> Self {
        self.document.set_style(self.id, property, value);
        self
    }

    /// Page coordinates of the element.
    pub fn layout(self, layout: Rect) -> Self {
        self.document.set_layout(self.id, layout);
        self
    }

    /// A 100 by 100 box at the given page offset.
    pub fn at(self, x: f32, y: f32) -> Self {
        self.layout(Rect::new(x, y, 100.0, 100.0))
    }

    pub fn child_of(mut self, parent: ElementId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Attaches the element and returns its id.
    pub fn build(self) -> ElementId {
        let parent = self.parent.unwrap_or(self.document.body);
        self.document.append_child(parent, self.id);
        self.id
    }

    /// Returns the id without attaching the element.
    pub fn detached(self) -> ElementId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selectors_match_compounds_and_descendants() {
        let mut doc = FakeDocument::new(Size::new(800.0, 600.0));
        let overlay = doc.add("div").id_attr("viewforce").build();
        let image = doc
            .add("img")
            .class("viewforceimage")
            .child_of(overlay)
            .build();
        let lazy = doc.add("img").class("lazy").class("wide").build();

        assert_eq!(doc.query_all("#viewforce img.viewforceimage"), vec![image]);
        assert_eq!(doc.query_all("img.lazy"), vec![lazy]);
        assert_eq!(doc.query_all(".wide.lazy"), vec![lazy]);
        assert_eq!(doc.query_all("img"), vec![image, lazy]);
        assert_eq!(doc.query_all("#viewforce, .lazy"), vec![overlay, lazy]);
        assert!(doc.query_all("section img").is_empty());
    }

    #[test]
    fn bounding_rect_follows_scroll() {
        let mut doc = FakeDocument::new(Size::new(800.0, 600.0));
        let el = doc.add("div").at(0.0, 900.0).build();
        doc.set_scroll(Point::new(0.0, 400.0));
        assert_eq!(doc.bounding_rect(el).top(), 500.0);
    }

    #[test]
    fn replace_keeps_position() {
        let mut doc = FakeDocument::new(Size::new(800.0, 600.0));
        let parent = doc.add("video").build();
        let first = doc.add("data-src").child_of(parent).build();
        let second = doc.add("data-track").child_of(parent).build();
        let source = doc.create_element("source");
        doc.replace_element(first, source);
        assert_eq!(doc.children(parent), vec![source, second]);
        assert!(!doc.is_attached(first));
    }

    #[test]
    fn hidden_ancestors_hide_children() {
        let mut doc = FakeDocument::new(Size::new(800.0, 600.0));
        let parent = doc.add("div").style("display", "none").build();
        let child = doc.add("img").child_of(parent).build();
        assert!(!doc.is_visible(child));
        let detached = doc.add("img").detached();
        assert!(!doc.is_visible(detached));
    }
}
