use std::rc::Rc;

use smallvec::SmallVec;

use crate::document::{Document, DocumentExt, ElementId};
use crate::error::LoadError;
use crate::fetch::{FetchMethod, FetchRequest, Fetcher};
use crate::strategy::{Completion, DomPatch, LoadContext, LoadStrategy};

/// Builds the request body of POST and PUT requests for an element.
pub type BodyBuilder = Rc<dyn Fn(&dyn Document, ElementId) -> Option<String>>;

/// Fetches `data-src` and puts the response into the element:
///
/// ```html
/// <div data-loader="ajax" data-src="part.html" data-method="post" data-type="html"></div>
/// ```
///
/// Registered as `ajax` (method from `data-method`) and as `get`, `post`
/// and `put` with a fixed method.
#[derive(Clone)]
pub struct AjaxLoader {
    method: Option<FetchMethod>,
    fetcher: Rc<dyn Fetcher>,
    body: Option<BodyBuilder>,
}

impl AjaxLoader {
    /// `method` of `None` reads the method from `data-method`.
    pub fn new(method: Option<FetchMethod>, fetcher: Rc<dyn Fetcher>) -> Self {
        Self {
            method,
            fetcher,
            body: None,
        }
    }

    pub fn with_body(
        mut self,
        body: impl Fn(&dyn Document, ElementId) -> Option<String> + 'static,
    ) -> Self {
        self.body = Some(Rc::new(body));
        self
    }
}

impl LoadStrategy for AjaxLoader {
    fn load(
        &self,
        ctx: &mut LoadContext<'_>,
        element: ElementId,
        completion: Completion,
    ) -> Result<(), LoadError> {
        let remove = ctx.config().remove_attribute;
        let document = ctx.document();

        let method = self.method.unwrap_or_else(|| {
            document
                .attribute(element, "data-method")
                .map(|name| FetchMethod::parse(&name))
                .unwrap_or_default()
        });
        let url = document
            .non_empty_attribute(element, "data-src")
            .ok_or(LoadError::MissingAttribute("data-src"))?;
        let body = match (&self.body, method.has_body()) {
            (Some(build), true) => build(document, element),
            _ => None,
        };
        let data_type = document
            .non_empty_attribute(element, "data-type")
            .unwrap_or_else(|| "html".to_string());

        log::trace!("{} {url} for {element:?}", method.as_str());
        let request = FetchRequest {
            url,
            method,
            body,
            data_type,
            with_credentials: false,
        };
        self.fetcher.fetch(
            request,
            Box::new(move |result| match result {
                Ok(content) => {
                    let mut patches: SmallVec<[DomPatch; 4]> = SmallVec::new();
                    patches.push(DomPatch::SetInnerHtml(content));
                    if remove {
                        for name in ["data-src", "data-method", "data-type"] {
                            patches.push(DomPatch::remove_attribute(name));
                        }
                    }
                    completion.succeed_with(patches);
                }
                Err(err) => {
                    log::warn!("ajax load of {:?} failed: {err}", completion.element());
                    completion.fail();
                }
            }),
        );
        Ok(())
    }
}
