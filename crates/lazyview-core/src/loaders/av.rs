use std::cell::RefCell;

use rustc_hash::FxHashMap;

use crate::document::{DocumentExt, ElementEvent, ElementId};
use crate::error::LoadError;
use crate::loaders::{rename_element, require_tag};
use crate::strategy::{Completion, LoadContext, LoadId, LoadStrategy};

/// Loads `<audio>` and `<video>` sources.
///
/// Sources come either from `<data-src>` children, which become
/// `<source>` elements with the same attributes, or from a
/// `data-src="file|type,file|type"` attribute. `<data-track>` children
/// become `<track>` elements and `data-poster` becomes `poster`.
///
/// The element succeeds on `loadedmetadata` and fails once every source
/// reported an error. Its own `load` and `error` events are ignored since
/// they belong to the poster image. Error counts are kept per load, so one
/// instance can serve several loaders.
#[derive(Debug, Default)]
pub struct AvLoader {
    sources: RefCell<FxHashMap<LoadId, SourceErrors>>,
}

#[derive(Clone, Copy, Debug)]
struct SourceErrors {
    total: usize,
    failed: usize,
}

impl AvLoader {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LoadStrategy for AvLoader {
    fn load(
        &self,
        ctx: &mut LoadContext<'_>,
        element: ElementId,
        completion: Completion,
    ) -> Result<(), LoadError> {
        let remove = ctx.config().remove_attribute;
        let document = ctx.document();
        require_tag(document, element, "av", &["audio", "video"])?;

        let children = document.descendants_by_tag(element, "data-src");
        let tracks = document.descendants_by_tag(element, "data-track");
        if let Some(poster) = document.attribute(element, "data-poster") {
            document.set_attribute(element, "poster", &poster);
        }

        let mut sources = Vec::new();
        let result = if !children.is_empty() {
            for child in children {
                sources.push(rename_element(document, child, "source", ""));
            }
            Ok(())
        } else if let Some(list) = document.non_empty_attribute(element, "data-src") {
            for entry in list.split(',') {
                let mut parts = entry.split('|');
                let source = document.create_element("source");
                if let Some(file) = parts.next() {
                    document.set_attribute(source, "src", file.trim());
                }
                if let Some(kind) = parts.next() {
                    document.set_attribute(source, "type", kind.trim());
                }
                document.append_child(element, source);
                sources.push(source);
            }
            if remove {
                document.remove_attribute(element, "data-src");
            }
            Ok(())
        } else {
            Err(LoadError::MissingAttribute("data-src"))
        };

        for track in tracks {
            rename_element(document, track, "track", "");
        }

        for &source in &sources {
            ctx.watch(source);
        }
        if !sources.is_empty() {
            self.sources.borrow_mut().insert(
                completion.load_id(),
                SourceErrors {
                    total: sources.len(),
                    failed: 0,
                },
            );
        }
        result
    }

    fn on_element_event(
        &self,
        ctx: &mut LoadContext<'_>,
        target: ElementId,
        event: ElementEvent,
        completion: &Completion,
    ) {
        let owner = ctx.owner();
        let load = completion.load_id();
        match event {
            ElementEvent::LoadedMetadata if target == owner => {
                self.sources.borrow_mut().remove(&load);
                completion.succeed();
            }
            ElementEvent::Error if target != owner => {
                let exhausted = {
                    let mut sources = self.sources.borrow_mut();
                    match sources.get_mut(&load) {
                        Some(errors) => {
                            errors.failed += 1;
                            errors.failed >= errors.total
                        }
                        None => false,
                    }
                };
                if exhausted {
                    self.sources.borrow_mut().remove(&load);
                    completion.fail();
                }
            }
            _ => {}
        }
    }
}
