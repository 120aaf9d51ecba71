//! Custom loader strategies, built-in and registered.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use lazyview_core::loaders::AjaxLoader;
use lazyview_core::{
    from_fn, Completion, Document, DomPatch, ElementEvent, ElementId, ElementState, FetchMethod,
    Fetcher, LazyConfig, LazyLoader, LoadError, LoaderRegistry, Size,
};
use lazyview_testing::{FakeDocument, FakeFetcher, HookLog, ManualClock};

fn page() -> FakeDocument {
    FakeDocument::new(Size::new(800.0, 600.0))
}

fn start(
    doc: FakeDocument,
    candidates: Vec<ElementId>,
    registry: LoaderRegistry,
) -> (LazyLoader<FakeDocument>, HookLog) {
    let log = HookLog::new();
    let lazy = LazyLoader::builder(LazyConfig::default())
        .registry(registry)
        .hooks(log.hooks())
        .clock(ManualClock::new())
        .build(doc, candidates);
    (lazy, log)
}

fn with_fetcher(fetcher: &Rc<FakeFetcher>) -> LoaderRegistry {
    LoaderRegistry::with_builtin(Some(Rc::clone(fetcher) as Rc<dyn Fetcher>))
}

#[test]
fn noop_success_settles_right_after_the_scan() {
    let mut doc = page();
    let element = doc.add("div").attr("data-loader", "noop-success").build();
    let (lazy, log) = start(doc, vec![element], LoaderRegistry::with_builtin(None));

    assert_eq!(log.loaded(), vec![element]);
    assert_eq!(log.finished_count(), 1);
    assert_eq!(lazy.pending_loads(), 0);
    assert_eq!(lazy.document().attr(element, "data-loader"), None);
    assert!(!lazy.document().is_observed(element));
}

#[test]
fn noop_error_reports_an_error() {
    let mut doc = page();
    let element = doc.add("div").attr("data-loader", "noop-error").build();
    let (lazy, log) = start(doc, vec![element], LoaderRegistry::with_builtin(None));

    assert_eq!(log.failed(), vec![element]);
    assert_eq!(lazy.element_state(element), Some(ElementState::Failed));
    assert_eq!(lazy.document().attr(element, "data-loader"), Some("noop-error"));
}

#[test]
fn noop_waits_for_a_native_event() {
    let mut doc = page();
    let element = doc.add("div").attr("data-loader", "noop").build();
    let (mut lazy, log) = start(doc, vec![element], LoaderRegistry::with_builtin(None));

    assert_eq!(lazy.pending_loads(), 1);
    assert!(lazy.document().is_observed(element));

    lazy.on_element_event(element, ElementEvent::LoadedMetadata);
    assert_eq!(lazy.pending_loads(), 1);

    lazy.on_element_event(element, ElementEvent::Load);
    assert_eq!(log.loaded(), vec![element]);
    assert!(!lazy.document().is_observed(element));

    lazy.on_element_event(element, ElementEvent::Error);
    assert!(log.failed().is_empty());
}

#[test]
fn unknown_strategy_fails_the_element() {
    let mut doc = page();
    let element = doc.add("div").attr("data-loader", "teleport").build();
    let (lazy, log) = start(doc, vec![element], LoaderRegistry::with_builtin(None));

    assert_eq!(log.failed(), vec![element]);
    assert_eq!(log.finished_count(), 1);
    assert_eq!(lazy.pending_loads(), 0);
}

#[test]
fn strategy_on_the_wrong_tag_fails() {
    let mut doc = page();
    let element = doc
        .add("div")
        .attr("data-loader", "script")
        .attr("data-src", "app.js")
        .build();
    let (lazy, log) = start(doc, vec![element], LoaderRegistry::with_builtin(None));

    assert_eq!(log.failed(), vec![element]);
    assert_eq!(lazy.document().attr(element, "src"), None);
}

#[test]
fn script_tags_are_forced_through_the_script_loader() {
    let mut doc = page();
    let script = doc.add("script").attr("data-src", "app.js").build();
    let (mut lazy, log) = start(doc, vec![script], LoaderRegistry::with_builtin(None));

    assert_eq!(lazy.document().attr(script, "data-loader"), Some("js"));
    assert_eq!(lazy.document().attr(script, "src"), Some("app.js"));
    assert_eq!(lazy.document().attr(script, "data-src"), None);
    assert_eq!(lazy.pending_loads(), 1);

    lazy.on_element_event(script, ElementEvent::Load);
    assert_eq!(log.loaded(), vec![script]);
}

#[test]
fn youtube_embeds_with_optional_no_cookie_host() {
    let mut doc = page();
    let plain = doc
        .add("iframe")
        .attr("data-loader", "yt")
        .attr("data-src", "abc")
        .build();
    let private = doc
        .add("iframe")
        .attr("data-loader", "youtube")
        .attr("data-src", "xyz")
        .attr("data-nocookie", "1")
        .build();
    let (lazy, _) = start(doc, vec![plain, private], LoaderRegistry::with_builtin(None));

    assert_eq!(
        lazy.document().attr(plain, "src"),
        Some("https://www.youtube.com/embed/abc?rel=0&showinfo=0")
    );
    assert_eq!(
        lazy.document().attr(private, "src"),
        Some("https://www.youtube-nocookie.com/embed/xyz?rel=0&showinfo=0")
    );
}

#[test]
fn vimeo_embeds_by_id() {
    let mut doc = page();
    let frame = doc
        .add("iframe")
        .attr("data-loader", "vimeo")
        .attr("data-src", "176894130")
        .build();
    let (mut lazy, log) = start(doc, vec![frame], LoaderRegistry::with_builtin(None));

    assert_eq!(
        lazy.document().attr(frame, "src"),
        Some("https://player.vimeo.com/video/176894130")
    );
    lazy.on_element_event(frame, ElementEvent::Load);
    assert_eq!(log.loaded(), vec![frame]);
}

#[test]
fn iframe_without_error_detection_loads_directly() {
    let fetcher = Rc::new(FakeFetcher::new());
    let mut doc = page();
    let frame = doc.add("iframe").attr("data-src", "/embed.html").build();
    let (mut lazy, log) = start(doc, vec![frame], with_fetcher(&fetcher));

    assert_eq!(lazy.document().attr(frame, "data-loader"), Some("frame"));
    assert_eq!(lazy.document().attr(frame, "src"), Some("/embed.html"));
    assert!(fetcher.requests().is_empty());

    lazy.on_element_event(frame, ElementEvent::Error);
    assert_eq!(log.failed(), vec![frame]);
}

#[test]
fn iframe_error_detection_checks_the_address_first() {
    let fetcher = Rc::new(FakeFetcher::new());
    fetcher.respond("/embed.html", "<p>embed</p>");
    let mut doc = page();
    let frame = doc
        .add("iframe")
        .attr("data-src", "/embed.html")
        .attr("data-error-detect", "true")
        .build();
    let (mut lazy, log) = start(doc, vec![frame], with_fetcher(&fetcher));

    let requests = fetcher.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].with_credentials);
    assert_eq!(requests[0].method, FetchMethod::Get);

    let doc = lazy.document();
    assert_eq!(doc.inner_html(frame), Some("<p>embed</p>"));
    assert_eq!(doc.attr(frame, "src"), Some("/embed.html"));
    assert_eq!(doc.attr(frame, "data-error-detect"), None);
    assert_eq!(lazy.pending_loads(), 1);

    lazy.on_element_event(frame, ElementEvent::Load);
    assert_eq!(log.loaded(), vec![frame]);
}

#[test]
fn iframe_error_detection_fails_on_bad_status() {
    let fetcher = Rc::new(FakeFetcher::new());
    fetcher.fail("/missing.html", 500);
    let mut doc = page();
    let frame = doc
        .add("iframe")
        .attr("data-src", "/missing.html")
        .attr("data-error-detect", "1")
        .build();
    let (lazy, log) = start(doc, vec![frame], with_fetcher(&fetcher));

    assert_eq!(log.failed(), vec![frame]);
    assert_eq!(lazy.document().attr(frame, "src"), None);
}

#[test]
fn ajax_replaces_content_with_the_response() {
    let fetcher = Rc::new(FakeFetcher::new());
    fetcher.respond("/fragment.html", "<b>loaded</b>");
    let mut doc = page();
    let element = doc
        .add("div")
        .attr("data-loader", "ajax")
        .attr("data-src", "/fragment.html")
        .attr("data-method", "post")
        .build();
    let (lazy, log) = start(doc, vec![element], with_fetcher(&fetcher));

    assert_eq!(fetcher.requests()[0].method, FetchMethod::Post);
    assert_eq!(fetcher.requests()[0].data_type, "html");
    assert_eq!(lazy.document().inner_html(element), Some("<b>loaded</b>"));
    assert_eq!(lazy.document().attr(element, "data-src"), None);
    assert_eq!(lazy.document().attr(element, "data-method"), None);
    assert_eq!(log.loaded(), vec![element]);
}

#[test]
fn ajax_settles_when_a_deferred_response_arrives() {
    let fetcher = Rc::new(FakeFetcher::deferred());
    fetcher.respond("/late.html", "late");
    let mut doc = page();
    let element = doc
        .add("div")
        .attr("data-loader", "get")
        .attr("data-src", "/late.html")
        .build();
    let (mut lazy, log) = start(doc, vec![element], with_fetcher(&fetcher));

    let woken = Rc::new(Cell::new(0));
    let counter = Rc::clone(&woken);
    lazy.set_settle_waker(move || counter.set(counter.get() + 1));

    assert_eq!(fetcher.queued(), 1);
    assert!(log.loaded().is_empty());

    fetcher.complete_all();
    assert_eq!(woken.get(), 1);
    assert_eq!(lazy.queued_settlements(), 1);
    assert!(log.loaded().is_empty());

    lazy.flush();
    assert_eq!(lazy.document().inner_html(element), Some("late"));
    assert_eq!(log.loaded(), vec![element]);
}

#[test]
fn ajax_fails_on_unknown_addresses() {
    let fetcher = Rc::new(FakeFetcher::new());
    let mut doc = page();
    let element = doc
        .add("div")
        .attr("data-loader", "ajax")
        .attr("data-src", "/nowhere")
        .build();
    let (lazy, log) = start(doc, vec![element], with_fetcher(&fetcher));

    assert_eq!(log.failed(), vec![element]);
    assert_eq!(lazy.document().inner_html(element), None);
}

#[test]
fn ajax_needs_a_fetcher() {
    let mut doc = page();
    let element = doc
        .add("div")
        .attr("data-loader", "ajax")
        .attr("data-src", "/fragment.html")
        .build();
    let (_, log) = start(doc, vec![element], LoaderRegistry::with_builtin(None));
    assert_eq!(log.failed(), vec![element]);
}

#[test]
fn ajax_body_builder_is_used_for_post() {
    let fetcher = Rc::new(FakeFetcher::new());
    fetcher.respond("/search", "results");
    let mut registry = LoaderRegistry::with_builtin(None);
    let loader = AjaxLoader::new(Some(FetchMethod::Post), Rc::clone(&fetcher) as Rc<dyn Fetcher>)
        .with_body(|doc, element| doc.attribute(element, "data-query"));
    registry.register(&["search"], &[], loader);

    let mut doc = page();
    let element = doc
        .add("div")
        .attr("data-loader", "search")
        .attr("data-src", "/search")
        .attr("data-query", "q=lazy")
        .build();
    let (_, log) = start(doc, vec![element], registry);

    assert_eq!(fetcher.requests()[0].body.as_deref(), Some("q=lazy"));
    assert_eq!(log.loaded(), vec![element]);
}

#[test]
fn video_sources_are_built_from_the_source_list() {
    let mut doc = page();
    let video = doc
        .add("video")
        .attr("data-src", "clip.mp4|video/mp4, clip.webm|video/webm")
        .attr("data-poster", "poster.jpg")
        .build();
    let (mut lazy, log) = start(doc, vec![video], LoaderRegistry::with_builtin(None));

    let sources = lazy.document().children(video);
    assert_eq!(sources.len(), 2);
    let doc = lazy.document();
    assert_eq!(doc.attr(video, "poster"), Some("poster.jpg"));
    assert_eq!(doc.attr(sources[0], "src"), Some("clip.mp4"));
    assert_eq!(doc.attr(sources[0], "type"), Some("video/mp4"));
    assert_eq!(doc.attr(sources[1], "src"), Some("clip.webm"));
    assert!(doc.is_observed(sources[0]));

    lazy.on_element_event(video, ElementEvent::LoadedMetadata);
    assert_eq!(log.loaded(), vec![video]);
    assert!(!lazy.document().is_observed(sources[0]));
}

#[test]
fn video_fails_once_every_source_failed() {
    let mut doc = page();
    let video = doc.add("video").build();
    let first = doc
        .add("data-src")
        .attr("src", "a.mp4")
        .attr("type", "video/mp4")
        .child_of(video)
        .build();
    doc.add("data-src").attr("src", "a.webm").child_of(video).build();
    doc.add("data-track")
        .attr("src", "subs.vtt")
        .attr("kind", "subtitles")
        .child_of(video)
        .build();
    let (mut lazy, log) = start(doc, vec![video], LoaderRegistry::with_builtin(None));

    let children = lazy.document().children(video);
    let tags: Vec<String> = children
        .iter()
        .map(|child| lazy.document().tag_name(*child))
        .collect();
    assert_eq!(tags, ["source", "source", "track"]);
    assert_eq!(lazy.document().attr(children[0], "type"), Some("video/mp4"));
    assert!(!lazy.document().is_attached(first));

    lazy.on_element_event(children[0], ElementEvent::Error);
    assert!(log.failed().is_empty());
    lazy.on_element_event(children[1], ElementEvent::Error);
    assert_eq!(log.failed(), vec![video]);
}

#[test]
fn shared_registry_counts_source_errors_per_loader() {
    let registry = LoaderRegistry::with_builtin(None);
    let video_page = || {
        let mut doc = page();
        let video = doc
            .add("video")
            .attr("data-src", "clip.mp4|video/mp4, clip.webm|video/webm")
            .build();
        (doc, video)
    };
    let (doc, first) = video_page();
    let (mut left, left_log) = start(doc, vec![first], registry.clone());
    let (doc, second) = video_page();
    let (mut right, right_log) = start(doc, vec![second], registry);
    assert_eq!(first, second);

    let left_sources = left.document().children(first);
    let right_sources = right.document().children(second);
    left.on_element_event(left_sources[0], ElementEvent::Error);
    right.on_element_event(right_sources[0], ElementEvent::Error);
    assert!(left_log.failed().is_empty());
    assert!(right_log.failed().is_empty());

    left.on_element_event(left_sources[1], ElementEvent::Error);
    assert_eq!(left_log.failed(), vec![first]);
    assert!(right_log.failed().is_empty());
}

#[test]
fn audio_without_sources_fails() {
    let mut doc = page();
    let audio = doc.add("audio").build();
    let (_, log) = start(doc, vec![audio], LoaderRegistry::with_builtin(None));
    assert_eq!(log.failed(), vec![audio]);
}

#[test]
fn picture_builds_source_and_image_from_attributes() {
    let mut doc = page();
    let picture = doc
        .add("picture")
        .attr("data-srcset", "wide.jpg 1x, wide@2x.jpg 2x")
        .attr("data-media", "(min-width: 600px)")
        .attr("data-src", "small.jpg")
        .build();
    let (mut lazy, log) = start(doc, vec![picture], LoaderRegistry::with_builtin(None));

    let children = lazy.document().children(picture);
    assert_eq!(children.len(), 2);
    let doc = lazy.document();
    assert_eq!(doc.tag_name(children[0]), "source");
    assert_eq!(doc.attr(children[0], "srcset"), Some("wide.jpg 1x, wide@2x.jpg 2x"));
    assert_eq!(doc.attr(children[0], "media"), Some("(min-width: 600px)"));
    assert_eq!(doc.tag_name(children[1]), "img");
    assert_eq!(doc.attr(children[1], "src"), Some("small.jpg"));
    assert_eq!(doc.attr(picture, "data-srcset"), None);

    lazy.on_element_event(children[1], ElementEvent::Load);
    assert_eq!(log.loaded(), vec![picture]);
}

#[test]
fn picture_renames_placeholder_children() {
    let mut doc = page();
    let picture = doc.add("picture").build();
    doc.add("data-src")
        .attr("srcset", "big.jpg")
        .attr("media", "(min-width: 900px)")
        .child_of(picture)
        .build();
    doc.add("data-img").attr("data-src", "fallback.jpg").child_of(picture).build();
    let config = LazyConfig::default().with_image_base("/img/");
    let log = HookLog::new();
    let mut lazy = LazyLoader::builder(config)
        .hooks(log.hooks())
        .clock(ManualClock::new())
        .build(doc, [picture]);

    let children = lazy.document().children(picture);
    let doc = lazy.document();
    assert_eq!(doc.tag_name(children[0]), "source");
    assert_eq!(doc.attr(children[0], "srcset"), Some("/img/big.jpg"));
    assert_eq!(doc.tag_name(children[1]), "img");
    assert_eq!(doc.attr(children[1], "src"), Some("/img/fallback.jpg"));
    assert_eq!(doc.attr(children[1], "data-src"), None);

    lazy.on_element_event(children[1], ElementEvent::Error);
    assert_eq!(log.failed(), vec![picture]);
}

#[test]
fn registered_closure_strategy_completes_later() {
    let parked: Rc<RefCell<Vec<Completion>>> = Rc::default();
    let slot = Rc::clone(&parked);
    let mut registry = LoaderRegistry::with_builtin(None);
    assert!(registry.register(
        &["later"],
        &["widget"],
        from_fn(move |ctx, element, completion| {
            ctx.document().set_attribute(element, "data-state", "loading");
            slot.borrow_mut().push(completion);
            Ok(())
        }),
    ));

    let mut doc = page();
    let widget = doc.add("widget").build();
    let (mut lazy, log) = start(doc, vec![widget], registry);
    assert_eq!(lazy.document().attr(widget, "data-state"), Some("loading"));
    assert_eq!(lazy.document().attr(widget, "data-loader"), Some("later"));

    let completion = parked.borrow_mut().pop().expect("load started");
    completion.succeed_with([DomPatch::set_attribute("data-state", "ready")]);
    completion.fail();
    lazy.flush();

    assert_eq!(lazy.document().attr(widget, "data-state"), Some("ready"));
    assert_eq!(log.loaded(), vec![widget]);
    assert!(log.failed().is_empty());
}

#[test]
fn late_results_leave_a_failed_element_alone() {
    let parked: Rc<RefCell<Vec<Completion>>> = Rc::default();
    let slot = Rc::clone(&parked);
    let mut registry = LoaderRegistry::with_builtin(None);
    registry.register(
        &["slow"],
        &[],
        from_fn(move |_, _, completion| {
            slot.borrow_mut().push(completion);
            Ok(())
        }),
    );

    let mut doc = page();
    let element = doc.add("div").attr("data-loader", "slow").build();
    let (mut lazy, log) = start(doc, vec![element], registry);
    let completion = parked.borrow_mut().pop().expect("load started");

    completion.fail();
    lazy.flush();
    completion.succeed_with([
        DomPatch::SetInnerHtml("late".into()),
        DomPatch::set_attribute("data-x", "late"),
    ]);
    completion.apply([DomPatch::set_attribute("data-y", "late")]);
    lazy.flush();

    assert_eq!(lazy.element_state(element), Some(ElementState::Failed));
    assert_eq!(lazy.document().inner_html(element), None);
    assert_eq!(lazy.document().attr(element, "data-x"), None);
    assert_eq!(lazy.document().attr(element, "data-y"), None);
    assert_eq!(log.failed(), vec![element]);
    assert!(log.loaded().is_empty());
}

#[test]
fn strategy_errors_fail_the_element() {
    let mut registry = LoaderRegistry::new();
    registry.register(
        &["broken"],
        &[],
        from_fn(|_, _, _| Err(LoadError::Rejected)),
    );
    let mut doc = page();
    let element = doc.add("div").attr("data-loader", "broken").build();
    let (_, log) = start(doc, vec![element], registry);
    assert_eq!(log.failed(), vec![element]);
}

#[test]
fn reserved_names_cannot_be_registered() {
    let mut registry = LoaderRegistry::new();
    assert!(!registry.register(&["threshold", "afterLoad"], &[], from_fn(|_, _, _| Ok(()))));
    assert!(!registry.contains("threshold"));
}
