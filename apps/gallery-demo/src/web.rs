//! Browser entry point for album pages.

use std::cell::RefCell;
use std::rc::Rc;

use lazyview_core::{LoaderRegistry, SystemClock};
use lazyview_gallery::Gallery;
use lazyview_platform_web::{
    readiness, EventQueue, HostEvent, Runtime, RuntimeOptions, WebDocument, WebFetcher,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Event, KeyboardEvent};

type SharedGallery = Rc<RefCell<Gallery<WebDocument>>>;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::new(log::Level::Info));

    let window = web_sys::window().ok_or("no global window exists")?;
    let queue = EventQueue::new();
    let doc = WebDocument::new(window.clone(), queue.clone())?;
    let clock = SystemClock::new();

    let mut gallery = Gallery::builder()
        .registry(LoaderRegistry::with_builtin(Some(Rc::new(WebFetcher::new()))))
        .clock(clock)
        .readiness(readiness(&window))
        .build(doc);
    gallery
        .loader_mut()
        .set_settle_waker(queue.notifier(HostEvent::Settled));

    let options = RuntimeOptions::for_config(gallery.loader().config());
    let gallery = Rc::new(RefCell::new(gallery));
    let runtime = Runtime::start(window.clone(), Rc::clone(&gallery), queue, clock, options);
    bind_input(&window, &gallery)?;
    runtime.keep_alive();
    Ok(())
}

/// Clicks anywhere and arrow keys on the body feed the photo overlay.
fn bind_input(window: &web_sys::Window, gallery: &SharedGallery) -> Result<(), JsValue> {
    let document = window.document().ok_or("should have a document on window")?;

    let target = Rc::clone(gallery);
    let on_click = Closure::wrap(Box::new(move |event: Event| {
        let Ok(mut gallery) = target.try_borrow_mut() else {
            log::warn!("click dropped, gallery busy");
            return;
        };
        if let Some(element) = gallery.document().target_id(&event) {
            gallery.on_click(element);
        }
    }) as Box<dyn FnMut(_)>);
    document.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
    on_click.forget();

    let target = Rc::clone(gallery);
    let on_key = Closure::wrap(Box::new(move |event: KeyboardEvent| {
        let Ok(mut gallery) = target.try_borrow_mut() else {
            return;
        };
        gallery.on_key(event.key_code());
    }) as Box<dyn FnMut(_)>);
    let body = document.body().ok_or("document has no body")?;
    body.add_event_listener_with_callback("keydown", on_key.as_ref().unchecked_ref())?;
    on_key.forget();

    Ok(())
}
