//! [`Document`] over the browser DOM.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use js_sys::Reflect;
use lazyview_core::{Document, Effect, ElementEvent, ElementId, ImageRequest, ImageTicket};
use lazyview_geometry::{Point, Rect, Size};
use rustc_hash::FxHashMap;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    CssStyleDeclaration, Element, Event, HtmlElement, HtmlImageElement, ScrollBehavior,
    ScrollToOptions, Window,
};

use crate::events::{EventQueue, HostEvent};

/// Expando property carrying the element id on the DOM node.
const ID_PROPERTY: &str = "__lazyviewId";
/// Id handed out when the browser refuses to create an element. Every
/// operation on it is a no-op.
const DETACHED: ElementId = ElementId(u64::MAX);

type Listener = Closure<dyn FnMut(Event)>;

struct ImageProxy {
    _image: HtmlImageElement,
    _onload: Listener,
    _onerror: Listener,
    done: Rc<Cell<bool>>,
}

/// The browser page a loader works on.
///
/// Elements get a numeric id the first time the engine sees them; the id is
/// stored on the node itself so it survives repeated queries.
pub struct WebDocument {
    window: Window,
    document: web_sys::Document,
    elements: RefCell<Vec<Element>>,
    queue: EventQueue,
    next_ticket: u64,
    proxies: FxHashMap<ImageTicket, ImageProxy>,
    observers: FxHashMap<ElementId, Vec<(&'static str, Listener)>>,
}

impl WebDocument {
    pub fn new(window: Window, queue: EventQueue) -> Result<Self, JsValue> {
        let document = window.document().ok_or("window has no document")?;
        Ok(Self {
            window,
            document,
            elements: RefCell::new(Vec::new()),
            queue,
            next_ticket: 0,
            proxies: FxHashMap::default(),
            observers: FxHashMap::default(),
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn queue(&self) -> &EventQueue {
        &self.queue
    }

    /// Id of a DOM element, registering it on first sight.
    pub fn element_id(&self, element: &Element) -> ElementId {
        let key = JsValue::from_str(ID_PROPERTY);
        if let Some(id) = Reflect::get(element, &key).ok().and_then(|v| v.as_f64()) {
            return ElementId(id as u64);
        }
        let mut elements = self.elements.borrow_mut();
        let id = elements.len() as u64;
        if let Err(err) = Reflect::set(element, &key, &JsValue::from_f64(id as f64)) {
            log::warn!("could not tag element: {err:?}");
        }
        elements.push(element.clone());
        ElementId(id)
    }

    /// Id of an event target, if it is an element.
    pub fn target_id(&self, event: &Event) -> Option<ElementId> {
        let element = event.target()?.dyn_into::<Element>().ok()?;
        Some(self.element_id(&element))
    }

    pub fn element(&self, id: ElementId) -> Option<Element> {
        if id == DETACHED {
            return None;
        }
        self.elements.borrow().get(id.0 as usize).cloned()
    }

    pub fn first(&self, selector: &str) -> Option<Element> {
        self.document.query_selector(selector).ok().flatten()
    }

    fn html(&self, id: ElementId) -> Option<HtmlElement> {
        self.element(id)?.dyn_into::<HtmlElement>().ok()
    }

    fn style_of(&self, id: ElementId) -> Option<CssStyleDeclaration> {
        self.html(id).map(|element| element.style())
    }

    fn listener(&self, build: impl Fn() -> HostEvent + 'static) -> Listener {
        let queue = self.queue.clone();
        Closure::wrap(Box::new(move |_event: Event| {
            queue.push(build());
        }) as Box<dyn FnMut(_)>)
    }
}

fn set_css(style: &CssStyleDeclaration, property: &str, value: &str) {
    if let Err(err) = style.set_property(property, value) {
        log::warn!("could not set `{property}: {value}`: {err:?}");
    }
}

fn remove_css(style: &CssStyleDeclaration, property: &str) {
    let _ = style.remove_property(property);
}

fn js_number(value: Result<JsValue, JsValue>) -> f32 {
    value.ok().and_then(|v| v.as_f64()).unwrap_or_default() as f32
}

impl Document for WebDocument {
    fn tag_name(&self, element: ElementId) -> String {
        self.element(element)
            .map(|e| e.tag_name().to_ascii_lowercase())
            .unwrap_or_default()
    }

    fn attribute(&self, element: ElementId, name: &str) -> Option<String> {
        self.element(element)?.get_attribute(name)
    }

    fn set_attribute(&mut self, element: ElementId, name: &str, value: &str) {
        let Some(node) = self.element(element) else {
            return;
        };
        if let Err(err) = node.set_attribute(name, value) {
            log::warn!("could not set attribute `{name}`: {err:?}");
        }
    }

    fn remove_attribute(&mut self, element: ElementId, name: &str) {
        if let Some(node) = self.element(element) {
            let _ = node.remove_attribute(name);
        }
    }

    fn attribute_names(&self, element: ElementId) -> Vec<String> {
        self.element(element)
            .map(|node| {
                node.get_attribute_names()
                    .iter()
                    .filter_map(|name| name.as_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Reads the computed value, so stylesheet rules count as well as
    /// inline styles. Falls back to the inline value when the element has
    /// no computed style.
    fn style(&self, element: ElementId, property: &str) -> Option<String> {
        let node = self.element(element)?;
        let declaration = match self.window.get_computed_style(&node) {
            Ok(Some(computed)) => computed,
            _ => self.style_of(element)?,
        };
        let value = declaration.get_property_value(property).ok()?;
        (!value.is_empty()).then_some(value)
    }

    fn set_style(&mut self, element: ElementId, property: &str, value: &str) {
        if let Some(style) = self.style_of(element) {
            set_css(&style, property, value);
        }
    }

    fn bounding_rect(&self, element: ElementId) -> Rect {
        let Some(node) = self.element(element) else {
            return Rect::default();
        };
        let rect = node.get_bounding_client_rect();
        Rect::new(
            rect.x() as f32,
            rect.y() as f32,
            rect.width() as f32,
            rect.height() as f32,
        )
    }

    fn is_visible(&self, element: ElementId) -> bool {
        let Some(html) = self.html(element) else {
            return false;
        };
        html.offset_width() > 0 || html.offset_height() > 0 || html.get_client_rects().length() > 0
    }

    fn viewport_size(&self) -> Size {
        Size::new(
            js_number(self.window.inner_width()),
            js_number(self.window.inner_height()),
        )
    }

    fn device_pixel_ratio(&self) -> f32 {
        self.window.device_pixel_ratio() as f32
    }

    fn scroll_offset(&self) -> Point {
        Point::new(
            self.window.scroll_x().unwrap_or_default() as f32,
            self.window.scroll_y().unwrap_or_default() as f32,
        )
    }

    fn content_size(&self) -> Size {
        let mut width = 0;
        let mut height = 0;
        if let Some(body) = self.document.body() {
            height = height.max(body.scroll_height()).max(body.offset_height());
            width = width.max(body.scroll_width());
        }
        if let Some(root) = self.document.document_element() {
            height = height.max(root.client_height()).max(root.scroll_height());
            width = width.max(root.scroll_width());
            if let Some(root) = root.dyn_ref::<HtmlElement>() {
                height = height.max(root.offset_height());
            }
        }
        Size::new(width as f32, height as f32)
    }

    fn scroll_to(&mut self, position: Point, duration: Duration) {
        let options = ScrollToOptions::new();
        options.set_left(f64::from(position.x));
        options.set_top(f64::from(position.y));
        options.set_behavior(if duration.is_zero() {
            ScrollBehavior::Instant
        } else {
            ScrollBehavior::Smooth
        });
        self.window.scroll_to_with_scroll_to_options(&options);
    }

    fn query_all(&self, selector: &str) -> Vec<ElementId> {
        let list = match self.document.query_selector_all(selector) {
            Ok(list) => list,
            Err(err) => {
                log::warn!("invalid selector `{selector}`: {err:?}");
                return Vec::new();
            }
        };
        (0..list.length())
            .filter_map(|index| list.get(index))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .map(|element| self.element_id(&element))
            .collect()
    }

    fn parent(&self, element: ElementId) -> Option<ElementId> {
        let parent = self.element(element)?.parent_element()?;
        Some(self.element_id(&parent))
    }

    fn children(&self, element: ElementId) -> Vec<ElementId> {
        let Some(node) = self.element(element) else {
            return Vec::new();
        };
        let children = node.children();
        (0..children.length())
            .filter_map(|index| children.item(index))
            .map(|child| self.element_id(&child))
            .collect()
    }

    fn create_element(&mut self, tag: &str) -> ElementId {
        match self.document.create_element(tag) {
            Ok(element) => self.element_id(&element),
            Err(err) => {
                log::error!("could not create <{tag}>: {err:?}");
                DETACHED
            }
        }
    }

    fn append_child(&mut self, parent: ElementId, child: ElementId) {
        let (Some(parent), Some(child)) = (self.element(parent), self.element(child)) else {
            return;
        };
        if let Err(err) = parent.append_child(&child) {
            log::warn!("could not append child: {err:?}");
        }
    }

    fn replace_element(&mut self, element: ElementId, replacement: ElementId) {
        let (Some(old), Some(new)) = (self.element(element), self.element(replacement)) else {
            return;
        };
        if let Err(err) = old.replace_with_with_node_1(&new) {
            log::warn!("could not replace element: {err:?}");
        }
    }

    fn set_inner_html(&mut self, element: ElementId, html: &str) {
        if let Some(node) = self.element(element) {
            node.set_inner_html(html);
        }
    }

    fn hide(&mut self, element: ElementId) {
        self.set_style(element, "display", "none");
    }

    fn apply_effect(&mut self, element: ElementId, effect: &Effect, duration: Duration) {
        let Some(html) = self.html(element) else {
            return;
        };
        let style = html.style();
        let millis = duration.as_millis();
        match effect {
            Effect::Show => remove_css(&style, "display"),
            Effect::FadeIn => {
                set_css(&style, "opacity", "0");
                remove_css(&style, "display");
                // Reading the layout commits the start value of the transition.
                let _ = html.offset_height();
                set_css(&style, "transition", &format!("opacity {millis}ms"));
                set_css(&style, "opacity", "1");
            }
            Effect::SlideDown => {
                set_css(&style, "overflow", "hidden");
                set_css(&style, "max-height", "0");
                remove_css(&style, "display");
                let target = html.scroll_height();
                set_css(&style, "transition", &format!("max-height {millis}ms"));
                set_css(&style, "max-height", &format!("{target}px"));
            }
            Effect::Named(name) => {
                log::debug!("effect `{name}` is not built in, showing instead");
                remove_css(&style, "display");
            }
        }
    }

    fn load_image(&mut self, request: ImageRequest) -> ImageTicket {
        self.proxies.retain(|_, proxy| !proxy.done.get());

        let ticket = ImageTicket(self.next_ticket);
        self.next_ticket += 1;

        let image = match HtmlImageElement::new() {
            Ok(image) => image,
            Err(err) => {
                log::error!("could not create image proxy: {err:?}");
                self.queue.push(HostEvent::ImageSettled { ticket, ok: false });
                return ticket;
            }
        };

        let done = Rc::new(Cell::new(false));
        let settle = |ok: bool| {
            let done = Rc::clone(&done);
            self.listener(move || {
                done.set(true);
                HostEvent::ImageSettled { ticket, ok }
            })
        };
        let onload = settle(true);
        let onerror = settle(false);
        image.set_onload(Some(onload.as_ref().unchecked_ref()));
        image.set_onerror(Some(onerror.as_ref().unchecked_ref()));

        if let Some(sizes) = request.sizes.as_deref() {
            image.set_sizes(sizes);
        }
        if let Some(srcset) = request.srcset.as_deref() {
            image.set_srcset(srcset);
        }
        if let Some(src) = request.src.as_deref() {
            image.set_src(src);
        }

        self.proxies.insert(
            ticket,
            ImageProxy {
                _image: image,
                _onload: onload,
                _onerror: onerror,
                done,
            },
        );
        ticket
    }

    fn observe(&mut self, element: ElementId) {
        let Some(node) = self.element(element) else {
            return;
        };
        if self.observers.contains_key(&element) {
            return;
        }
        let mut listeners = Vec::new();
        for event in [
            ElementEvent::Load,
            ElementEvent::Error,
            ElementEvent::LoadedMetadata,
        ] {
            let listener = self.listener(move || HostEvent::Element {
                target: element,
                event,
            });
            let callback = listener.as_ref().unchecked_ref();
            if let Err(err) = node.add_event_listener_with_callback(event.name(), callback) {
                log::warn!("could not observe {}: {err:?}", event.name());
                continue;
            }
            listeners.push((event.name(), listener));
        }
        self.observers.insert(element, listeners);
    }

    fn unobserve(&mut self, element: ElementId) {
        let Some(listeners) = self.observers.remove(&element) else {
            return;
        };
        let Some(node) = self.element(element) else {
            return;
        };
        for (name, listener) in listeners {
            let callback = listener.as_ref().unchecked_ref();
            let _ = node.remove_event_listener_with_callback(name, callback);
        }
    }
}
