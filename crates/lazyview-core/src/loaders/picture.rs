use crate::document::{DocumentExt, ElementId};
use crate::error::LoadError;
use crate::loaders::{append_image, rename_element, require_tag};
use crate::srcset::corrected_srcset;
use crate::strategy::{Completion, LoadContext, LoadStrategy};

/// Loads `<picture>` elements, in one of three shapes:
///
/// ```html
/// <picture>
///   <data-src srcset="1x.jpg 1x, 2x.jpg 2x" media="(min-width: 600px)"></data-src>
///   <data-img src="default.jpg"></data-img>
/// </picture>
///
/// <picture data-src="default.jpg">
///   <data-src srcset="1x.jpg 1x, 2x.jpg 2x" media="(min-width: 600px)"></data-src>
/// </picture>
///
/// <picture data-src="default.jpg" data-srcset="1x.jpg 1x, 2x.jpg 2x"
///          data-media="(min-width: 600px)" data-sizes="" data-type="image/jpeg"></picture>
/// ```
///
/// The resulting `<img>` settles the element through its own events.
#[derive(Clone, Copy, Debug, Default)]
pub struct PictureLoader;

const ATTRIBUTE_SHAPE: [&str; 5] = [
    "data-src",
    "data-srcset",
    "data-media",
    "data-sizes",
    "data-type",
];

impl LoadStrategy for PictureLoader {
    fn load(
        &self,
        ctx: &mut LoadContext<'_>,
        element: ElementId,
        _completion: Completion,
    ) -> Result<(), LoadError> {
        let remove = ctx.config().remove_attribute;
        let image_base = ctx.config().image_base.clone().unwrap_or_default();
        let document = ctx.document();
        require_tag(document, element, "picture", &["picture"])?;

        let sources = document.descendants_by_tag(element, "data-src");
        if !sources.is_empty() {
            let images = document.descendants_by_tag(element, "data-img");
            for source in sources {
                rename_element(document, source, "source", &image_base);
            }

            if let [data_img] = images.as_slice() {
                let image = rename_element(document, *data_img, "img", &image_base);
                ctx.watch(image);
                let document = ctx.document();
                if let Some(src) = document.attribute(image, "data-src") {
                    document.set_attribute(image, "src", &src);
                }
                if remove {
                    document.remove_attribute(image, "data-src");
                }
                return Ok(());
            }

            let src = document
                .non_empty_attribute(element, "data-src")
                .ok_or(LoadError::MissingAttribute("data-src"))?;
            if remove {
                document.remove_attribute(element, "data-src");
            }
            append_image(ctx, element, &format!("{image_base}{src}"));
            return Ok(());
        }

        let srcset = document
            .non_empty_attribute(element, "data-srcset")
            .ok_or(LoadError::MissingAttribute("data-srcset"))?;
        let source = document.create_element("source");
        for (attribute, name) in [
            ("data-media", "media"),
            ("data-sizes", "sizes"),
            ("data-type", "type"),
        ] {
            if let Some(value) = document.attribute(element, attribute) {
                document.set_attribute(source, name, &value);
            }
        }
        document.set_attribute(source, "srcset", &corrected_srcset(&srcset, &image_base));
        document.append_child(element, source);

        let src = document.attribute(element, "data-src").unwrap_or_default();
        if remove {
            for name in ATTRIBUTE_SHAPE {
                document.remove_attribute(element, name);
            }
        }
        append_image(ctx, element, &format!("{image_base}{src}"));
        Ok(())
    }
}
