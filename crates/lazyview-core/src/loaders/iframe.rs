use std::rc::Rc;

use crate::document::{Document, DocumentExt, ElementId};
use crate::error::LoadError;
use crate::fetch::{FetchMethod, FetchRequest, Fetcher};
use crate::loaders::require_tag;
use crate::strategy::{Completion, DomPatch, LoadContext, LoadStrategy};

const ERROR_DETECT: &str = "data-error-detect";

/// Loads `<iframe data-src="page.html">`.
///
/// With `data-error-detect="true"` the document is fetched first, so a
/// failing address fails the element instead of showing an error page.
/// The frame's native `load` event settles success in both cases.
#[derive(Clone, Default)]
pub struct IframeLoader {
    fetcher: Option<Rc<dyn Fetcher>>,
}

impl IframeLoader {
    pub fn new(fetcher: Option<Rc<dyn Fetcher>>) -> Self {
        Self { fetcher }
    }
}

impl LoadStrategy for IframeLoader {
    fn load(
        &self,
        ctx: &mut LoadContext<'_>,
        element: ElementId,
        completion: Completion,
    ) -> Result<(), LoadError> {
        let remove = ctx.config().remove_attribute;
        let document = ctx.document();
        require_tag(document, element, "iframe", &["iframe"])?;
        let src = document
            .non_empty_attribute(element, "data-src")
            .ok_or(LoadError::MissingAttribute("data-src"))?;
        let error_detect = matches!(
            document.attribute(element, ERROR_DETECT).as_deref(),
            Some("true" | "1")
        );

        let fetcher = match (&self.fetcher, error_detect) {
            (Some(fetcher), true) => Rc::clone(fetcher),
            (None, true) => {
                log::warn!("no fetcher available, loading {element:?} without error detection");
                return load_directly(document, element, &src, remove);
            }
            (_, false) => return load_directly(document, element, &src, remove),
        };

        let request = FetchRequest {
            method: FetchMethod::Get,
            with_credentials: true,
            ..FetchRequest::get(src.clone())
        };
        fetcher.fetch(
            request,
            Box::new(move |result| match result {
                Ok(content) => {
                    let mut patches = vec![
                        DomPatch::SetInnerHtml(content),
                        DomPatch::set_attribute("src", src),
                    ];
                    if remove {
                        patches.push(DomPatch::remove_attribute("data-src"));
                        patches.push(DomPatch::remove_attribute(ERROR_DETECT));
                    }
                    completion.apply(patches);
                }
                Err(err) => {
                    log::warn!("iframe check of {:?} failed: {err}", completion.element());
                    completion.fail();
                }
            }),
        );
        Ok(())
    }
}

fn load_directly(
    document: &mut dyn Document,
    element: ElementId,
    src: &str,
    remove: bool,
) -> Result<(), LoadError> {
    document.set_attribute(element, "src", src);
    if remove {
        document.remove_attribute(element, "data-src");
        document.remove_attribute(element, ERROR_DETECT);
    }
    Ok(())
}
