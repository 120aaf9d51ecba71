//! Built-in loader strategies.
//!
//! | Names | Forced on |
//! |---|---|
//! | `ajax`, `get`, `post`, `put` | |
//! | `av`, `audio`, `video` | `<audio>`, `<video>` |
//! | `frame`, `iframe` | `<iframe>` |
//! | `noop`, `noop-success`, `noop-error` | |
//! | `pic`, `picture` | `<picture>` |
//! | `js`, `javascript`, `script` | `<script>` |
//! | `vimeo` | |
//! | `yt`, `youtube` | |

use std::rc::Rc;

use crate::document::{Document, ElementId};
use crate::error::LoadError;
use crate::fetch::{FetchMethod, Fetcher};
use crate::registry::LoaderRegistry;
use crate::srcset::corrected_srcset;
use crate::strategy::LoadContext;

pub mod ajax;
pub mod av;
pub mod iframe;
pub mod noop;
pub mod picture;
pub mod script;
pub mod video_embed;

pub use ajax::AjaxLoader;
pub use av::AvLoader;
pub use iframe::IframeLoader;
pub use noop::{Noop, NoopError, NoopSuccess};
pub use picture::PictureLoader;
pub use script::ScriptLoader;
pub use video_embed::{VimeoLoader, YoutubeLoader};

/// Registers every built-in strategy. The `ajax` family needs `fetcher`.
pub fn register_builtin(registry: &mut LoaderRegistry, fetcher: Option<Rc<dyn Fetcher>>) {
    if let Some(fetcher) = &fetcher {
        registry.register(&["ajax"], &[], AjaxLoader::new(None, Rc::clone(fetcher)));
        registry.register(
            &["get"],
            &[],
            AjaxLoader::new(Some(FetchMethod::Get), Rc::clone(fetcher)),
        );
        registry.register(
            &["post"],
            &[],
            AjaxLoader::new(Some(FetchMethod::Post), Rc::clone(fetcher)),
        );
        registry.register(
            &["put"],
            &[],
            AjaxLoader::new(Some(FetchMethod::Put), Rc::clone(fetcher)),
        );
    }

    registry.register(&["av", "audio", "video"], &["audio", "video"], AvLoader::new());
    registry.register(&["frame", "iframe"], &["iframe"], IframeLoader::new(fetcher));
    registry.register(&["noop"], &[], Noop);
    registry.register(&["noop-success"], &[], NoopSuccess);
    registry.register(&["noop-error"], &[], NoopError);
    registry.register(&["pic", "picture"], &["picture"], PictureLoader);
    registry.register(&["js", "javascript", "script"], &["script"], ScriptLoader);
    registry.register(&["vimeo"], &[], VimeoLoader);
    registry.register(&["yt", "youtube"], &[], YoutubeLoader);
}

pub(crate) fn require_tag(
    document: &dyn Document,
    element: ElementId,
    strategy: &'static str,
    accepted: &[&str],
) -> Result<String, LoadError> {
    let tag = document.tag_name(element);
    if accepted.contains(&tag.as_str()) {
        Ok(tag)
    } else {
        Err(LoadError::WrongTag { strategy, tag })
    }
}

/// Replaces `element` with a new `tag` element carrying the same
/// attributes. `srcset` and `data-src` values get the image base.
pub(crate) fn rename_element(
    document: &mut dyn Document,
    element: ElementId,
    tag: &str,
    image_base: &str,
) -> ElementId {
    let replacement = document.create_element(tag);
    for name in document.attribute_names(element) {
        let Some(value) = document.attribute(element, &name) else {
            continue;
        };
        let value = if name == "srcset" || name == "data-src" {
            corrected_srcset(&value, image_base)
        } else {
            value
        };
        document.set_attribute(replacement, &name, &value);
    }
    document.replace_element(element, replacement);
    replacement
}

/// Appends a watched `<img>` to `parent`. `src` is set last so the
/// load can not start before the element is observed.
pub(crate) fn append_image(ctx: &mut LoadContext<'_>, parent: ElementId, src: &str) -> ElementId {
    let image = ctx.document().create_element("img");
    ctx.watch(image);
    let document = ctx.document();
    document.append_child(parent, image);
    document.set_attribute(image, "src", src);
    image
}
