//! Hosted video players embedded through an `<iframe>`.

use crate::document::{Document, DocumentExt, ElementId};
use crate::error::LoadError;
use crate::loaders::require_tag;
use crate::strategy::{Completion, LoadContext, LoadStrategy};

/// `<iframe data-loader="vimeo" data-src="176894130">`
#[derive(Clone, Copy, Debug, Default)]
pub struct VimeoLoader;

/// `<iframe data-loader="yt" data-src="1AYGnw6MwFM" data-nocookie="1">`
#[derive(Clone, Copy, Debug, Default)]
pub struct YoutubeLoader;

pub fn vimeo_url(video_id: &str) -> String {
    format!("https://player.vimeo.com/video/{video_id}")
}

pub fn youtube_url(video_id: &str, no_cookie: bool) -> String {
    let host = if no_cookie {
        "www.youtube-nocookie.com"
    } else {
        "www.youtube.com"
    };
    format!("https://{host}/embed/{video_id}?rel=0&showinfo=0")
}

fn embed(
    ctx: &mut LoadContext<'_>,
    element: ElementId,
    strategy: &'static str,
    url: impl FnOnce(&str, &dyn Document) -> String,
) -> Result<(), LoadError> {
    let remove = ctx.config().remove_attribute;
    let document = ctx.document();
    require_tag(document, element, strategy, &["iframe"])?;
    let video_id = document
        .non_empty_attribute(element, "data-src")
        .ok_or(LoadError::MissingAttribute("data-src"))?;

    let src = url(&video_id, document);
    document.set_attribute(element, "src", &src);
    if remove {
        document.remove_attribute(element, "data-src");
    }
    Ok(())
}

impl LoadStrategy for VimeoLoader {
    fn load(
        &self,
        ctx: &mut LoadContext<'_>,
        element: ElementId,
        _completion: Completion,
    ) -> Result<(), LoadError> {
        embed(ctx, element, "vimeo", |id, _| vimeo_url(id))
    }
}

impl LoadStrategy for YoutubeLoader {
    fn load(
        &self,
        ctx: &mut LoadContext<'_>,
        element: ElementId,
        _completion: Completion,
    ) -> Result<(), LoadError> {
        embed(ctx, element, "youtube", |id, document| {
            let no_cookie = document
                .attribute(element, "data-nocookie")
                .is_some_and(|flag| flag.contains('1') || flag.contains("true"));
            youtube_url(id, no_cookie)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn youtube_switches_host_for_no_cookie() {
        assert_eq!(
            youtube_url("abc", false),
            "https://www.youtube.com/embed/abc?rel=0&showinfo=0"
        );
        assert_eq!(
            youtube_url("abc", true),
            "https://www.youtube-nocookie.com/embed/abc?rel=0&showinfo=0"
        );
    }

    #[test]
    fn vimeo_embeds_by_id() {
        assert_eq!(vimeo_url("176894130"), "https://player.vimeo.com/video/176894130");
    }
}
