use super::*;

use crate::loaders::noop::{Noop, NoopSuccess};

#[test]
fn names_share_one_strategy_and_first_name_is_forced() {
    let mut registry = LoaderRegistry::new();
    assert!(registry.register(&["yt", "youtube"], &["IFRAME"], Noop));

    let yt = registry.get("yt").expect("yt registered");
    let youtube = registry.get("youtube").expect("youtube registered");
    assert!(Rc::ptr_eq(&yt, &youtube));
    assert_eq!(registry.forced_loader("iframe"), Some("yt"));
}

#[test]
fn option_names_are_never_replaced() {
    let mut registry = LoaderRegistry::new();
    assert!(!registry.register(&["threshold", "afterLoad"], &["div"], Noop));
    assert!(!registry.contains("threshold"));
    assert_eq!(registry.forced_loader("div"), None);

    assert!(registry.register(&["delay", "late"], &["div"], Noop));
    assert!(!registry.contains("delay"));
    assert_eq!(registry.forced_loader("div"), Some("late"));
}

#[test]
fn empty_name_list_is_a_no_op() {
    let mut registry = LoaderRegistry::new();
    assert!(!registry.register(&[], &["video"], Noop));
    assert_eq!(registry.forced_loader("video"), None);
}

#[test]
fn later_registration_replaces_strategy() {
    let mut registry = LoaderRegistry::new();
    registry.register(&["custom"], &[], Noop);
    let first = registry.get("custom").expect("registered");
    registry.register(&["custom"], &[], NoopSuccess);
    let second = registry.get("custom").expect("registered");
    assert!(!Rc::ptr_eq(&first, &second));
}

#[test]
fn builtin_without_fetcher_skips_ajax() {
    let registry = LoaderRegistry::with_builtin(None);
    for name in ["av", "video", "frame", "noop", "noop-error", "pic", "js", "vimeo", "yt"] {
        assert!(registry.contains(name), "{name} should be built in");
    }
    assert!(!registry.contains("ajax"));
    assert!(!registry.contains("post"));
    assert_eq!(registry.forced_loader("audio"), Some("av"));
    assert_eq!(registry.forced_loader("iframe"), Some("frame"));
    assert_eq!(registry.forced_loader("picture"), Some("pic"));
    assert_eq!(registry.forced_loader("script"), Some("js"));
}
