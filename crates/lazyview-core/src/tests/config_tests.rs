use super::*;

#[test]
fn defaults_match_markup_contract() {
    let config = LazyConfig::default();
    assert_eq!(config.name, "lazy");
    assert_eq!(config.threshold, 500.0);
    assert_eq!(config.scroll_direction, ScrollDirection::Both);
    assert_eq!(config.bind, BindMode::Load);
    assert_eq!(config.delay, -1);
    assert_eq!(config.delay_millis(), None);
    assert!(!config.combined);
    assert!(!config.visible_only);
    assert_eq!(config.effect, Effect::Show);
    assert_eq!(config.effect_time, 0);
    assert!(config.enable_throttle);
    assert_eq!(config.throttle, 250);
    assert!(config.remove_attribute);
    assert!(config.auto_destroy);
    assert_eq!(config.default_image.as_deref(), Some(TRANSPARENT_GIF));
    assert_eq!(config.attribute, "data-src");
    assert_eq!(config.image_base_attribute, "data-imagebase");
}

#[test]
fn json_overrides_only_given_options() {
    let config = LazyConfig::from_json(
        r#"{ "threshold": 0, "scrollDirection": "vertical", "effect": "fadeIn", "delay": 2000, "custom": true }"#,
    )
    .expect("valid json");

    assert_eq!(config.threshold, 0.0);
    assert_eq!(config.scroll_direction, ScrollDirection::Vertical);
    assert_eq!(config.effect, Effect::FadeIn);
    assert_eq!(config.delay_millis(), Some(2000));
    assert_eq!(config.throttle, 250);
    assert_eq!(config.extra.get("custom"), Some(&ConfigValue::Bool(true)));
}

#[test]
fn invalid_json_is_reported() {
    let err = LazyConfig::from_json("{ threshold: }").unwrap_err();
    assert!(matches!(err, ConfigError::Json(_)));
}

#[test]
fn unknown_effect_names_are_kept() {
    let config = LazyConfig::from_json(r#"{ "effect": "pulse" }"#).expect("valid json");
    assert_eq!(config.effect, Effect::Named("pulse".into()));
    assert_eq!(config.effect.name(), "pulse");
}

#[test]
fn get_and_set_by_option_name() {
    let mut config = LazyConfig::default();
    config.set("threshold", 100.0.into()).expect("number accepted");
    config.set("visibleOnly", true.into()).expect("bool accepted");
    config
        .set("scrollDirection", "horizontal".into())
        .expect("variant accepted");
    config.set("placeholder", "ph.png".into()).expect("text accepted");

    assert_eq!(config.get("threshold"), Some(ConfigValue::Number(100.0)));
    assert_eq!(config.get("visibleOnly"), Some(ConfigValue::Bool(true)));
    assert_eq!(
        config.get("scrollDirection"),
        Some(ConfigValue::Text("horizontal".into()))
    );
    assert_eq!(config.placeholder.as_deref(), Some("ph.png"));

    config.set("placeholder", ConfigValue::Null).expect("null accepted");
    assert_eq!(config.get("placeholder"), Some(ConfigValue::Null));
}

#[test]
fn wrong_kind_leaves_value_untouched() {
    let mut config = LazyConfig::default();
    let err = config.set("threshold", "far".into()).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::TypeMismatch {
            expected: "a finite number",
            ..
        }
    ));
    assert_eq!(config.threshold, 500.0);

    let err = config.set("bind", "later".into()).unwrap_err();
    assert!(matches!(err, ConfigError::UnknownVariant { .. }));
    assert_eq!(config.bind, BindMode::Load);
}

#[test]
fn unknown_names_land_in_extra() {
    let mut config = LazyConfig::default();
    assert_eq!(config.get("ajaxCreateData"), None);
    config
        .set("ajaxCreateData", "payload".into())
        .expect("extra accepted");
    assert_eq!(
        config.get("ajaxCreateData"),
        Some(ConfigValue::Text("payload".into()))
    );
}

#[test]
fn every_option_name_is_readable() {
    let config = LazyConfig::default();
    for name in OPTION_NAMES {
        assert!(config.get(name).is_some(), "{name} should be readable");
    }
}

#[test]
fn direction_includes_axes() {
    use lazyview_geometry::Axis;
    assert!(ScrollDirection::Both.includes(Axis::Horizontal));
    assert!(ScrollDirection::Vertical.includes(Axis::Vertical));
    assert!(!ScrollDirection::Vertical.includes(Axis::Horizontal));
    assert!(!ScrollDirection::Horizontal.includes(Axis::Vertical));
}
