use std::time::Duration;

use lazyview_core::{Document, Driven, Effect, ElementId, Point, Readiness, Size};
use lazyview_gallery::{
    scroll_progress, update_bar, update_header, ForceView, Gallery, Step, INITIAL_THRESHOLD,
    SCROLL_THRESHOLD,
};
use lazyview_testing::{FakeDocument, ManualClock};

struct Album {
    doc: FakeDocument,
    items: Vec<ElementId>,
    photos: Vec<ElementId>,
}

/// Three photos in `.albumItem` containers linked through data-prev and
/// data-next, with the overlay markup at the end of the body.
fn album(sources: &[&str]) -> Album {
    let mut doc = FakeDocument::new(Size::new(800.0, 600.0));
    let mut items = Vec::new();
    let mut photos = Vec::new();
    for (index, src) in sources.iter().enumerate() {
        let prev = index.checked_sub(1).map(|i| sources[i]).unwrap_or("");
        let next = sources.get(index + 1).copied().unwrap_or("");
        let y = index as f32 * 1200.0;
        let item = doc
            .add("div")
            .class("albumItem")
            .attr("data-prev", prev)
            .attr("data-next", next)
            .style("padding-top", "66%")
            .at(0.0, y)
            .build();
        let photo = doc
            .add("img")
            .class("lazy")
            .attr("data-src", src)
            .at(0.0, y)
            .child_of(item)
            .build();
        items.push(item);
        photos.push(photo);
    }
    let overlay = doc
        .add("div")
        .id_attr("viewforce")
        .style("display", "none")
        .build();
    doc.add("img")
        .class("viewforceimage")
        .child_of(overlay)
        .build();
    doc.add("span").id_attr("next").child_of(overlay).build();
    doc.add("span").id_attr("prev").child_of(overlay).build();
    Album { doc, items, photos }
}

fn settle_all(gallery: &mut Gallery<FakeDocument>) {
    let tickets: Vec<_> = gallery
        .document()
        .image_loads()
        .iter()
        .map(|load| load.ticket)
        .collect();
    for ticket in tickets {
        gallery.on_image_settled(ticket, true);
    }
}

fn overlay(doc: &FakeDocument) -> ElementId {
    doc.query_all("#viewforce")[0]
}

fn overlay_image(doc: &FakeDocument) -> ElementId {
    doc.query_all("img.viewforceimage")[0]
}

#[test]
fn album_photos_fade_in_and_mark_their_container() {
    let Album { doc, items, photos } = album(&["/a.jpg", "/b.jpg", "/c.jpg"]);
    let mut gallery = Gallery::builder()
        .clock(ManualClock::new())
        .readiness(Readiness::AwaitWindowLoad)
        .build(doc);

    assert!(gallery.loader().is_listening());
    for item in &items {
        assert_eq!(gallery.document().style_of(*item, "padding-top"), Some("0"));
    }
    assert_eq!(gallery.loader().pending_loads(), 1);

    settle_all(&mut gallery);
    let doc = gallery.document();
    assert_eq!(doc.attr(photos[0], "src"), Some("/a.jpg"));
    assert_eq!(doc.attr(items[0], "class"), Some("albumItem loaded"));
    assert_eq!(doc.attr(items[1], "class"), Some("albumItem"));
    assert_eq!(doc.effects(photos[0]), vec![(Effect::FadeIn, Duration::ZERO)]);
}

#[test]
fn hidden_album_photos_wait() {
    let Album { mut doc, items, photos } = album(&["/a.jpg"]);
    doc.set_style(items[0], "display", "none");
    let gallery = Gallery::builder().clock(ManualClock::new()).build(doc);

    assert_eq!(gallery.loader().pending_loads(), 0);
    assert!(gallery.document().image_loads().is_empty());
    assert_ne!(gallery.document().attr(photos[0], "src"), Some("/a.jpg"));
}

#[test]
fn clicking_a_photo_opens_the_overlay_and_scrolls_to_it() {
    let Album { mut doc, photos, .. } = album(&["/a.jpg", "/b.jpg"]);
    doc.set_attribute(photos[1], "src", "/b.jpg");
    doc.set_scroll(Point::new(0.0, 300.0));
    let view = ForceView::bind(&doc);

    assert!(view.on_click(&mut doc, photos[1]));
    assert!(view.is_open(&doc));
    assert_eq!(doc.attr(overlay_image(&doc), "src"), Some("/b.jpg"));
    assert_eq!(
        doc.scroll_requests().last(),
        Some(&(Point::new(0.0, 1200.0), Duration::from_millis(100)))
    );
}

#[test]
fn arrow_keys_follow_the_album_links() {
    let Album { mut doc, photos, .. } = album(&["/a.jpg", "/b.jpg", "/c.jpg"]);
    for (photo, src) in photos.iter().zip(["/a.jpg", "/b.jpg", "/c.jpg"]) {
        doc.set_attribute(*photo, "src", src);
    }
    let view = ForceView::bind(&doc);
    view.open(&mut doc, "/a.jpg");

    assert!(view.on_key(&mut doc, 39));
    assert_eq!(view.current(&doc).as_deref(), Some("/b.jpg"));
    assert!(view.on_key(&mut doc, 39));
    assert_eq!(view.current(&doc).as_deref(), Some("/c.jpg"));

    assert!(!view.on_key(&mut doc, 39));
    assert_eq!(view.current(&doc).as_deref(), Some("/c.jpg"));

    assert!(view.on_key(&mut doc, 37));
    assert_eq!(view.current(&doc).as_deref(), Some("/b.jpg"));
    assert!(!view.on_key(&mut doc, 13));
}

#[test]
fn buttons_step_and_the_background_closes() {
    let Album { mut doc, photos, .. } = album(&["/a.jpg", "/b.jpg"]);
    doc.set_attribute(photos[0], "src", "/a.jpg");
    doc.set_attribute(photos[1], "src", "/b.jpg");
    let view = ForceView::bind(&doc);
    view.open(&mut doc, "/a.jpg");

    let next = doc.query_all("#next")[0];
    let prev = doc.query_all("#prev")[0];
    assert!(view.on_click(&mut doc, next));
    assert_eq!(view.current(&doc).as_deref(), Some("/b.jpg"));
    assert!(view.on_click(&mut doc, prev));
    assert_eq!(view.current(&doc).as_deref(), Some("/a.jpg"));

    let image = overlay_image(&doc);
    assert!(!view.on_click(&mut doc, image));
    assert!(view.is_open(&doc));

    let background = overlay(&doc);
    assert!(view.on_click(&mut doc, background));
    assert!(!view.is_open(&doc));
    assert_eq!(doc.style_of(background, "display"), Some("none"));
}

#[test]
fn step_needs_an_album_item_parent() {
    let mut doc = FakeDocument::new(Size::new(800.0, 600.0));
    let loose = doc
        .add("img")
        .class("lazy")
        .attr("src", "/loose.jpg")
        .attr("data-next", "/other.jpg")
        .build();
    let overlay = doc.add("div").id_attr("viewforce").build();
    doc.add("img").class("viewforceimage").child_of(overlay).build();
    let view = ForceView::bind(&doc);

    assert!(view.on_click(&mut doc, loose));
    assert!(!view.step(&mut doc, Step::Next));
    assert_eq!(view.current(&doc).as_deref(), Some("/loose.jpg"));
}

#[test]
fn pages_without_an_overlay_ignore_clicks() {
    let mut doc = FakeDocument::new(Size::new(800.0, 600.0));
    let photo = doc.add("img").class("lazy").attr("src", "/a.jpg").build();
    let body = doc.body();
    let view = ForceView::bind(&doc);

    view.on_click(&mut doc, photo);
    assert!(doc.scroll_requests().is_empty());
    assert_eq!(view.current(&doc), None);
    assert!(!view.is_open(&doc));
    assert!(!view.on_click(&mut doc, body));
}

#[test]
fn header_shrinks_past_the_threshold_and_resets_at_the_top() {
    let mut doc = FakeDocument::new(Size::new(800.0, 600.0));
    let header = doc.add("header").class("header").class("dark").build();

    doc.set_scroll(Point::new(0.0, 1.0));
    update_header(&mut doc, INITIAL_THRESHOLD);
    assert_eq!(doc.attr(header, "class"), Some("header"));

    update_header(&mut doc, SCROLL_THRESHOLD);
    assert_eq!(doc.attr(header, "class"), Some("header shrink"));
    update_header(&mut doc, SCROLL_THRESHOLD);
    assert_eq!(doc.attr(header, "class"), Some("header shrink"));

    doc.set_scroll(Point::ZERO);
    update_header(&mut doc, SCROLL_THRESHOLD);
    assert_eq!(doc.attr(header, "class"), Some("header"));
}

#[test]
fn progress_bar_tracks_the_scrolled_share() {
    let mut doc = FakeDocument::new(Size::new(800.0, 600.0));
    let bar = doc.add("div").id_attr("pageposition").build();
    doc.set_content_size(Size::new(800.0, 2600.0));

    doc.set_scroll(Point::new(0.0, 1000.0));
    assert_eq!(scroll_progress(&doc), 50.0);
    update_bar(&mut doc);
    assert_eq!(doc.style_of(bar, "width"), Some("50vw"));

    doc.set_content_size(Size::new(800.0, 600.0));
    update_bar(&mut doc);
    assert_eq!(doc.style_of(bar, "width"), Some("0vw"));
}

#[test]
fn body_fades_in_once() {
    let Album { doc, .. } = album(&["/a.jpg"]);
    let clock = ManualClock::new();
    let mut gallery = Gallery::builder().clock(clock.clone()).build(doc);
    let body = gallery.document().body();

    assert_eq!(gallery.next_deadline(), Some(300));
    clock.set(300);
    gallery.advance();
    assert_eq!(gallery.document().attr(body, "class"), Some("loaded"));
    assert_eq!(gallery.next_deadline(), Some(450));

    clock.set(450);
    gallery.advance();
    assert_eq!(gallery.document().attr(body, "class"), Some("loaded fadout"));
    assert_eq!(gallery.next_deadline(), None);
}

#[test]
fn body_already_loaded_skips_the_fade() {
    let Album { mut doc, .. } = album(&["/a.jpg"]);
    let body = doc.body();
    doc.set_attribute(body, "class", "loaded");
    let gallery = Gallery::builder().clock(ManualClock::new()).build(doc);
    assert_eq!(gallery.next_deadline(), None);
}

#[test]
fn scrolling_drives_every_behaviour() {
    let Album { mut doc, photos, .. } = album(&["/a.jpg", "/b.jpg", "/c.jpg"]);
    let header = doc.add("header").class("header").build();
    let bar = doc.add("div").id_attr("pageposition").build();
    let clock = ManualClock::new();
    let mut gallery = Gallery::builder().clock(clock.clone()).build(doc);
    settle_all(&mut gallery);

    gallery.document_mut().set_scroll(Point::new(0.0, 1100.0));
    gallery.on_scroll();

    let doc = gallery.document();
    assert_eq!(doc.attr(header, "class"), Some("header shrink"));
    assert!(doc.style_of(bar, "width").is_some_and(|w| w.ends_with("vw")));
    assert_eq!(doc.image_loads().len(), 2);

    let ticket = doc.image_loads()[1].ticket;
    gallery.on_image_settled(ticket, true);
    assert!(gallery.on_click(photos[1]));
    assert_eq!(
        gallery.force_view().current(gallery.document()).as_deref(),
        Some("/b.jpg")
    );
}

#[test]
fn gallery_keeps_listening_after_every_photo_loaded() {
    let Album { doc, .. } = album(&["/a.jpg"]);
    let mut gallery = Gallery::builder().clock(ManualClock::new()).build(doc);
    settle_all(&mut gallery);

    gallery.on_scroll();
    assert!(gallery.loader().is_destroyed());
    assert!(!gallery.is_finished());
}
