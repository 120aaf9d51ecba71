use crate::document::{DocumentExt, ElementId};
use crate::error::LoadError;
use crate::loaders::require_tag;
use crate::strategy::{Completion, LoadContext, LoadStrategy};

/// Loads `<script data-src="file.js">` by moving `data-src` to `src`.
/// The script's own `load` / `error` event settles it.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScriptLoader;

impl LoadStrategy for ScriptLoader {
    fn load(
        &self,
        ctx: &mut LoadContext<'_>,
        element: ElementId,
        _completion: Completion,
    ) -> Result<(), LoadError> {
        let remove = ctx.config().remove_attribute;
        let document = ctx.document();
        require_tag(document, element, "script", &["script"])?;
        let src = document
            .non_empty_attribute(element, "data-src")
            .ok_or(LoadError::MissingAttribute("data-src"))?;

        document.set_attribute(element, "src", &src);
        if remove {
            document.remove_attribute(element, "data-src");
        }
        Ok(())
    }
}
