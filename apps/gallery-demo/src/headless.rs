//! Scrolls an in-memory album page from top to bottom.

use anyhow::{bail, Result};
use lazyview_core::{Driven, ElementId, ElementState, Point, Size};
use lazyview_gallery::Gallery;
use lazyview_testing::{FakeDocument, ManualClock};

const VIEWPORT: Size = Size::new(1280.0, 720.0);
const ROW_HEIGHT: f32 = 860.0;
/// Time between two simulated scroll events, longer than the scan throttle.
const STEP_MS: u64 = 300;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Report {
    pub photos: usize,
    pub loaded: usize,
    pub scroll_events: usize,
    pub elapsed_ms: u64,
}

/// An album with `photos` entries linked through data-prev / data-next.
pub fn album_page(photos: usize) -> (FakeDocument, Vec<ElementId>) {
    let mut doc = FakeDocument::new(VIEWPORT);
    doc.add("header").class("header").build();
    doc.add("div").id_attr("pageposition").build();

    let source = |index: usize| format!("/albums/demo/{index:03}.jpg");
    let mut images = Vec::with_capacity(photos);
    for index in 0..photos {
        let y = 120.0 + index as f32 * ROW_HEIGHT;
        let prev = index.checked_sub(1).map(source).unwrap_or_default();
        let next = if index + 1 < photos {
            source(index + 1)
        } else {
            String::new()
        };
        let item = doc
            .add("div")
            .class("albumItem")
            .attr("data-prev", &prev)
            .attr("data-next", &next)
            .style("padding-top", "66%")
            .at(0.0, y)
            .build();
        images.push(
            doc.add("img")
                .class("lazy")
                .attr("data-src", &source(index))
                .at(0.0, y)
                .child_of(item)
                .build(),
        );
    }

    let overlay = doc.add("div").id_attr("viewforce").style("display", "none").build();
    doc.add("img").class("viewforceimage").child_of(overlay).build();
    (doc, images)
}

fn settle_requested(gallery: &mut Gallery<FakeDocument>, settled: &mut usize) {
    let tickets: Vec<_> = gallery.document().image_loads()[*settled..]
        .iter()
        .map(|load| load.ticket)
        .collect();
    *settled += tickets.len();
    for ticket in tickets {
        gallery.on_image_settled(ticket, true);
    }
}

/// Scrolls half a viewport per event until the end of the page, answering
/// every image request right away.
pub fn run(photos: usize) -> Result<Report> {
    let (doc, images) = album_page(photos);
    let clock = ManualClock::new();
    let mut gallery = Gallery::builder().clock(clock.clone()).build(doc);

    let mut settled = 0;
    let mut scroll_events = 0;
    settle_requested(&mut gallery, &mut settled);

    let page_end = lazyview_core::Document::content_size(gallery.document()).height;
    let mut offset = 0.0;
    while offset + VIEWPORT.height < page_end {
        offset += VIEWPORT.height / 2.0;
        clock.advance(STEP_MS);
        gallery.document_mut().set_scroll(Point::new(0.0, offset));
        gallery.on_scroll();
        scroll_events += 1;
        gallery.advance();
        settle_requested(&mut gallery, &mut settled);
    }

    while let Some(deadline) = gallery.next_deadline() {
        clock.set(deadline);
        gallery.advance();
        settle_requested(&mut gallery, &mut settled);
    }

    let loaded = images
        .iter()
        .filter(|&&image| gallery.loader().element_state(image) == Some(ElementState::Loaded))
        .count();
    log::info!("{loaded} of {photos} photos loaded after {scroll_events} scroll events");
    if loaded != photos {
        bail!("only {loaded} of {photos} photos loaded");
    }

    Ok(Report {
        photos,
        loaded,
        scroll_events,
        elapsed_ms: clock.now(),
    })
}
