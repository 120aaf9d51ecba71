//! Candidate filtering and pre-load defaults.

use crate::config::LazyConfig;
use crate::document::{Document, DocumentExt, ElementId};
use crate::registry::LoaderRegistry;
use crate::srcset::corrected_srcset;
use crate::state::ElementStates;

/// Filters `candidates` down to elements the engine can load and applies
/// the pre-load defaults to them.
///
/// An element is kept when it was never handled and carries a source,
/// source set or loader attribute, or its tag has a forced loader. Kept
/// elements get an image-base corrected source set, the forced loader name,
/// the default image or the placeholder background.
pub fn prepare_items(
    document: &mut dyn Document,
    candidates: impl IntoIterator<Item = ElementId>,
    config: &LazyConfig,
    registry: &LoaderRegistry,
    states: &ElementStates,
) -> Vec<ElementId> {
    let kept: Vec<ElementId> = candidates
        .into_iter()
        .filter(|element| {
            if states.is_touched(*element) {
                return false;
            }
            let tag = document.tag_name(*element);
            document.non_empty_attribute(*element, &config.attribute).is_some()
                || document
                    .non_empty_attribute(*element, &config.srcset_attribute)
                    .is_some()
                || document
                    .non_empty_attribute(*element, &config.loader_attribute)
                    .is_some()
                || registry.forced_loader(&tag).is_some()
        })
        .collect();

    for &element in &kept {
        let tag = document.tag_name(element);
        let is_img = tag == "img";
        let image_base = document
            .non_empty_attribute(element, &config.image_base_attribute)
            .or_else(|| config.image_base.clone().filter(|base| !base.is_empty()));

        if is_img {
            if let (Some(base), Some(srcset)) = (
                image_base.as_deref(),
                document.non_empty_attribute(element, &config.srcset_attribute),
            ) {
                let corrected = corrected_srcset(&srcset, base);
                document.set_attribute(element, &config.srcset_attribute, &corrected);
            }
        }

        if let Some(forced) = registry.forced_loader(&tag) {
            if document
                .non_empty_attribute(element, &config.loader_attribute)
                .is_none()
            {
                document.set_attribute(element, &config.loader_attribute, forced);
            }
        }

        if is_img {
            if let Some(default_image) = config.default_image.as_deref() {
                if document.non_empty_attribute(element, "src").is_none() {
                    document.set_attribute(element, "src", default_image);
                }
            }
        } else if let Some(placeholder) = config.placeholder.as_deref() {
            let has_background = document
                .style(element, "background-image")
                .is_some_and(|value| !value.is_empty() && value != "none");
            if !has_background {
                document.set_style(
                    element,
                    "background-image",
                    &format!("url('{placeholder}')"),
                );
            }
        }
    }

    log::trace!("prepared {} elements", kept.len());
    kept
}
