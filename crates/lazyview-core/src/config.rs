//! Instance configuration.
//!
//! [`LazyConfig`] is the typed form. The option-name API (`get` / `set`)
//! works on the camelCase names used in markup and JSON, so a page can keep
//! passing `{ "threshold": 0, "scrollDirection": "vertical" }` style options.

use std::collections::BTreeMap;
use std::time::Duration;

use lazyview_geometry::Axis;
use serde::Deserialize;

use crate::error::ConfigError;

/// 1x1 transparent GIF used as the default `src` of pending images.
pub const TRANSPARENT_GIF: &str =
    "data:image/gif;base64,R0lGODlhAQABAIAAAP///wAAACH5BAEAAAAALAAAAAABAAEAAAICRAEAOw==";

/// Every option name understood by [`LazyConfig::get`] and [`LazyConfig::set`].
///
/// Loader strategies can not be registered under any of these names.
pub const OPTION_NAMES: &[&str] = &[
    "name",
    "autoDestroy",
    "bind",
    "threshold",
    "visibleOnly",
    "appendScroll",
    "scrollDirection",
    "imageBase",
    "defaultImage",
    "placeholder",
    "delay",
    "combined",
    "attribute",
    "srcsetAttribute",
    "sizesAttribute",
    "retinaAttribute",
    "loaderAttribute",
    "imageBaseAttribute",
    "removeAttribute",
    "effect",
    "effectTime",
    "enableThrottle",
    "throttle",
];

/// Axes on which an element has to be inside the loadable area.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollDirection {
    #[default]
    Both,
    Vertical,
    Horizontal,
}

impl ScrollDirection {
    pub fn includes(self, axis: Axis) -> bool {
        match self {
            ScrollDirection::Both => true,
            ScrollDirection::Vertical => axis.is_vertical(),
            ScrollDirection::Horizontal => axis.is_horizontal(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ScrollDirection::Both => "both",
            ScrollDirection::Vertical => "vertical",
            ScrollDirection::Horizontal => "horizontal",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "both" => Some(ScrollDirection::Both),
            "vertical" => Some(ScrollDirection::Vertical),
            "horizontal" => Some(ScrollDirection::Horizontal),
            _ => None,
        }
    }
}

/// When the engine starts scanning.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindMode {
    /// Wait for the page's window load signal.
    #[default]
    Load,
    /// Start right away.
    Event,
}

impl BindMode {
    pub fn name(self) -> &'static str {
        match self {
            BindMode::Load => "load",
            BindMode::Event => "event",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "load" => Some(BindMode::Load),
            "event" => Some(BindMode::Event),
            _ => None,
        }
    }
}

/// Visual transition applied when a native image finished loading.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum Effect {
    #[default]
    Show,
    FadeIn,
    SlideDown,
    /// Any other effect the host knows by name.
    Named(String),
}

impl Effect {
    pub fn name(&self) -> &str {
        match self {
            Effect::Show => "show",
            Effect::FadeIn => "fadeIn",
            Effect::SlideDown => "slideDown",
            Effect::Named(name) => name,
        }
    }
}

impl From<String> for Effect {
    fn from(value: String) -> Self {
        match value.as_str() {
            "show" => Effect::Show,
            "fadeIn" => Effect::FadeIn,
            "slideDown" => Effect::SlideDown,
            _ => Effect::Named(value),
        }
    }
}

impl From<&str> for Effect {
    fn from(value: &str) -> Self {
        Effect::from(value.to_string())
    }
}

/// A loosely typed option value, as found in markup or JSON.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl ConfigValue {
    fn kind(&self) -> &'static str {
        match self {
            ConfigValue::Null => "null",
            ConfigValue::Bool(_) => "a boolean",
            ConfigValue::Number(_) => "a number",
            ConfigValue::Text(_) => "a string",
        }
    }

    fn optional_text(value: &Option<String>) -> Self {
        match value {
            Some(text) => ConfigValue::Text(text.clone()),
            None => ConfigValue::Null,
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        ConfigValue::Bool(value)
    }
}

impl From<f64> for ConfigValue {
    fn from(value: f64) -> Self {
        ConfigValue::Number(value)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        ConfigValue::Number(value as f64)
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::Text(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        ConfigValue::Text(value)
    }
}

/// Configuration of one [`crate::LazyLoader`] instance.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LazyConfig {
    /// Instance name, used as the log prefix.
    pub name: String,
    /// Destroy the instance once a scan finds nothing left to load.
    pub auto_destroy: bool,
    pub bind: BindMode,
    /// Distance in pixels around the viewport that still counts as visible.
    pub threshold: f32,
    /// Skip elements the host reports as hidden.
    pub visible_only: bool,
    /// Selector of the scroll container, `None` for the window.
    pub append_scroll: Option<String>,
    pub scroll_direction: ScrollDirection,
    pub image_base: Option<String>,
    pub default_image: Option<String>,
    pub placeholder: Option<String>,
    /// Milliseconds until every element is loaded regardless of position,
    /// negative to disable.
    pub delay: i64,
    /// Keep listening for scroll events even when `delay` is set.
    pub combined: bool,

    pub attribute: String,
    pub srcset_attribute: String,
    pub sizes_attribute: String,
    pub retina_attribute: String,
    pub loader_attribute: String,
    pub image_base_attribute: String,
    /// Strip the deferred-source attributes after loading.
    pub remove_attribute: bool,

    pub effect: Effect,
    /// Effect duration in milliseconds.
    pub effect_time: u64,

    pub enable_throttle: bool,
    /// Minimum milliseconds between two scans.
    pub throttle: u64,

    /// Options without a typed field.
    #[serde(flatten)]
    pub extra: BTreeMap<String, ConfigValue>,
}

impl Default for LazyConfig {
    fn default() -> Self {
        Self {
            name: "lazy".to_string(),
            auto_destroy: true,
            bind: BindMode::Load,
            threshold: 500.0,
            visible_only: false,
            append_scroll: None,
            scroll_direction: ScrollDirection::Both,
            image_base: None,
            default_image: Some(TRANSPARENT_GIF.to_string()),
            placeholder: None,
            delay: -1,
            combined: false,
            attribute: "data-src".to_string(),
            srcset_attribute: "data-srcset".to_string(),
            sizes_attribute: "data-sizes".to_string(),
            retina_attribute: "data-retina".to_string(),
            loader_attribute: "data-loader".to_string(),
            image_base_attribute: "data-imagebase".to_string(),
            remove_attribute: true,
            effect: Effect::Show,
            effect_time: 0,
            enable_throttle: true,
            throttle: 250,
            extra: BTreeMap::new(),
        }
    }
}

impl LazyConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON object of options on top of the defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_scroll_direction(mut self, direction: ScrollDirection) -> Self {
        self.scroll_direction = direction;
        self
    }

    pub fn with_bind(mut self, bind: BindMode) -> Self {
        self.bind = bind;
        self
    }

    pub fn with_delay(mut self, delay: i64) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_combined(mut self, combined: bool) -> Self {
        self.combined = combined;
        self
    }

    pub fn with_visible_only(mut self, visible_only: bool) -> Self {
        self.visible_only = visible_only;
        self
    }

    pub fn with_effect(mut self, effect: impl Into<Effect>, effect_time: u64) -> Self {
        self.effect = effect.into();
        self.effect_time = effect_time;
        self
    }

    pub fn with_throttle(mut self, enabled: bool, interval: u64) -> Self {
        self.enable_throttle = enabled;
        self.throttle = interval;
        self
    }

    pub fn with_image_base(mut self, image_base: impl Into<String>) -> Self {
        self.image_base = Some(image_base.into());
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn with_remove_attribute(mut self, remove: bool) -> Self {
        self.remove_attribute = remove;
        self
    }

    pub fn with_auto_destroy(mut self, auto_destroy: bool) -> Self {
        self.auto_destroy = auto_destroy;
        self
    }

    /// The `delay` option as a duration, `None` when disabled.
    pub fn delay_millis(&self) -> Option<u64> {
        u64::try_from(self.delay).ok()
    }

    pub fn effect_duration(&self) -> Duration {
        Duration::from_millis(self.effect_time)
    }

    /// Reads an option by name.
    pub fn get(&self, name: &str) -> Option<ConfigValue> {
        let value = match name {
            "name" => ConfigValue::Text(self.name.clone()),
            "autoDestroy" => ConfigValue::Bool(self.auto_destroy),
            "bind" => ConfigValue::Text(self.bind.name().to_string()),
            "threshold" => ConfigValue::Number(f64::from(self.threshold)),
            "visibleOnly" => ConfigValue::Bool(self.visible_only),
            "appendScroll" => ConfigValue::optional_text(&self.append_scroll),
            "scrollDirection" => ConfigValue::Text(self.scroll_direction.name().to_string()),
            "imageBase" => ConfigValue::optional_text(&self.image_base),
            "defaultImage" => ConfigValue::optional_text(&self.default_image),
            "placeholder" => ConfigValue::optional_text(&self.placeholder),
            "delay" => ConfigValue::Number(self.delay as f64),
            "combined" => ConfigValue::Bool(self.combined),
            "attribute" => ConfigValue::Text(self.attribute.clone()),
            "srcsetAttribute" => ConfigValue::Text(self.srcset_attribute.clone()),
            "sizesAttribute" => ConfigValue::Text(self.sizes_attribute.clone()),
            "retinaAttribute" => ConfigValue::Text(self.retina_attribute.clone()),
            "loaderAttribute" => ConfigValue::Text(self.loader_attribute.clone()),
            "imageBaseAttribute" => ConfigValue::Text(self.image_base_attribute.clone()),
            "removeAttribute" => ConfigValue::Bool(self.remove_attribute),
            "effect" => ConfigValue::Text(self.effect.name().to_string()),
            "effectTime" => ConfigValue::Number(self.effect_time as f64),
            "enableThrottle" => ConfigValue::Bool(self.enable_throttle),
            "throttle" => ConfigValue::Number(self.throttle as f64),
            other => return self.extra.get(other).cloned(),
        };
        Some(value)
    }

    /// Writes an option by name.
    ///
    /// Unknown names are stored as extra options. A known name with a value
    /// of the wrong kind leaves the configuration untouched.
    pub fn set(&mut self, name: &str, value: ConfigValue) -> Result<(), ConfigError> {
        match name {
            "name" => self.name = text(name, value)?,
            "autoDestroy" => self.auto_destroy = boolean(name, value)?,
            "bind" => {
                let raw = text(name, value)?;
                self.bind = BindMode::parse(&raw).ok_or_else(|| unknown_variant(name, raw))?;
            }
            "threshold" => self.threshold = number(name, value)? as f32,
            "visibleOnly" => self.visible_only = boolean(name, value)?,
            "appendScroll" => self.append_scroll = optional_text(name, value)?,
            "scrollDirection" => {
                let raw = text(name, value)?;
                self.scroll_direction =
                    ScrollDirection::parse(&raw).ok_or_else(|| unknown_variant(name, raw))?;
            }
            "imageBase" => self.image_base = optional_text(name, value)?,
            "defaultImage" => self.default_image = optional_text(name, value)?,
            "placeholder" => self.placeholder = optional_text(name, value)?,
            "delay" => self.delay = number(name, value)? as i64,
            "combined" => self.combined = boolean(name, value)?,
            "attribute" => self.attribute = text(name, value)?,
            "srcsetAttribute" => self.srcset_attribute = text(name, value)?,
            "sizesAttribute" => self.sizes_attribute = text(name, value)?,
            "retinaAttribute" => self.retina_attribute = text(name, value)?,
            "loaderAttribute" => self.loader_attribute = text(name, value)?,
            "imageBaseAttribute" => self.image_base_attribute = text(name, value)?,
            "removeAttribute" => self.remove_attribute = boolean(name, value)?,
            "effect" => self.effect = Effect::from(text(name, value)?),
            "effectTime" => self.effect_time = non_negative(name, value)?,
            "enableThrottle" => self.enable_throttle = boolean(name, value)?,
            "throttle" => self.throttle = non_negative(name, value)?,
            other => {
                self.extra.insert(other.to_string(), value);
            }
        }
        Ok(())
    }
}

fn mismatch(name: &str, expected: &'static str, found: &ConfigValue) -> ConfigError {
    ConfigError::TypeMismatch {
        name: name.to_string(),
        expected,
        found: found.kind(),
    }
}

fn unknown_variant(name: &str, value: String) -> ConfigError {
    ConfigError::UnknownVariant {
        name: name.to_string(),
        value,
    }
}

fn text(name: &str, value: ConfigValue) -> Result<String, ConfigError> {
    match value {
        ConfigValue::Text(text) => Ok(text),
        other => Err(mismatch(name, "a string", &other)),
    }
}

fn optional_text(name: &str, value: ConfigValue) -> Result<Option<String>, ConfigError> {
    match value {
        ConfigValue::Null => Ok(None),
        ConfigValue::Text(text) if text.is_empty() => Ok(None),
        ConfigValue::Text(text) => Ok(Some(text)),
        other => Err(mismatch(name, "a string or null", &other)),
    }
}

fn boolean(name: &str, value: ConfigValue) -> Result<bool, ConfigError> {
    match value {
        ConfigValue::Bool(flag) => Ok(flag),
        other => Err(mismatch(name, "a boolean", &other)),
    }
}

fn number(name: &str, value: ConfigValue) -> Result<f64, ConfigError> {
    match value {
        ConfigValue::Number(number) if number.is_finite() => Ok(number),
        other => Err(mismatch(name, "a finite number", &other)),
    }
}

fn non_negative(name: &str, value: ConfigValue) -> Result<u64, ConfigError> {
    match value {
        ConfigValue::Number(number) if number.is_finite() && number >= 0.0 => Ok(number as u64),
        other => Err(mismatch(name, "a non-negative number", &other)),
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
