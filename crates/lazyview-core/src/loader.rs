//! Element loading: the native image branch, the custom strategy branch and
//! the settlement bookkeeping shared by both.

use std::rc::Rc;

use crate::document::{Document, DocumentExt, ElementEvent, ElementId, ImageRequest, ImageTicket};
use crate::error::LoadError;
use crate::engine::LazyLoader;
use crate::hooks::{HookContext, Hooks};
use crate::strategy::{Completion, LoadContext, LoadStrategy, Settlement};

/// How a qualifying element is loaded.
#[derive(Debug)]
pub(crate) struct Dispatch {
    pub(crate) tag: String,
    pub(crate) image_base: String,
    pub(crate) loader: Option<String>,
}

/// A custom strategy load waiting for its outcome.
pub(crate) struct ActiveLoad {
    strategy: Rc<dyn LoadStrategy>,
    completion: Completion,
}

/// A native load waiting for its image proxy.
#[derive(Debug)]
pub(crate) struct PendingImage {
    element: ElementId,
    is_img: bool,
    request: ImageRequest,
}

impl<D: Document> LazyLoader<D> {
    pub(crate) fn handle_item(&mut self, element: ElementId, dispatch: Dispatch) {
        self.pending += 1;
        self.run_hook(|hooks, ctx| hooks.fire_before_load(ctx, element));

        match dispatch.loader {
            Some(name) => self.load_custom(element, &name),
            None => self.load_native(element, &dispatch.tag, &dispatch.image_base),
        }
    }

    fn load_custom(&mut self, element: ElementId, name: &str) {
        let completion = Completion::new(element, self.outbox.clone());
        let Some(strategy) = self.registry.get(name) else {
            log::warn!(
                "{}: {} for {element:?}",
                self.config.name,
                LoadError::UnknownStrategy(name.to_string())
            );
            completion.fail();
            return;
        };

        self.watched.insert(element, element);
        self.document.observe(element);
        self.active.insert(
            element,
            ActiveLoad {
                strategy: Rc::clone(&strategy),
                completion: completion.clone(),
            },
        );

        let mut ctx = LoadContext::new(
            &mut self.document,
            &self.config,
            &mut self.watched,
            element,
        );
        if let Err(err) = strategy.load(&mut ctx, element, completion.clone()) {
            log::warn!("{}: loader `{name}` failed for {element:?}: {err}", self.config.name);
            completion.fail();
        }
    }

    fn load_native(&mut self, element: ElementId, tag: &str, image_base: &str) {
        let config = &self.config;
        let document = &self.document;

        let retina = if self.retina {
            document.non_empty_attribute(element, &config.retina_attribute)
        } else {
            None
        };
        let src = retina
            .or_else(|| document.non_empty_attribute(element, &config.attribute))
            .map(|src| format!("{image_base}{src}"));
        let request = ImageRequest {
            sizes: document.attribute(element, &config.sizes_attribute),
            srcset: document.attribute(element, &config.srcset_attribute),
            src,
        };

        let ticket = self.document.load_image(request.clone());
        log::trace!("{}: image proxy {ticket:?} for {element:?}", self.config.name);
        self.images.insert(
            ticket,
            PendingImage {
                element,
                is_img: tag == "img",
                request,
            },
        );
    }

    /// The host finished loading an image proxy.
    pub fn on_image_settled(&mut self, ticket: ImageTicket, ok: bool) {
        let Some(image) = self.images.remove(&ticket) else {
            log::trace!("{}: unknown image proxy {ticket:?}", self.config.name);
            return;
        };
        if !self.states.is_pending(image.element) {
            return;
        }
        if ok {
            self.finish_native(image);
        } else {
            self.fail_element(image.element);
        }
    }

    fn finish_native(&mut self, image: PendingImage) {
        let PendingImage {
            element,
            is_img,
            request,
        } = image;
        let config = &self.config;
        let document = &mut self.document;

        document.hide(element);
        if is_img {
            if let Some(sizes) = request.sizes.as_deref() {
                document.set_attribute(element, "sizes", sizes);
            }
            if let Some(srcset) = request.srcset.as_deref() {
                document.set_attribute(element, "srcset", srcset);
            }
            match request.src.as_deref() {
                Some(src) => document.set_attribute(element, "src", src),
                None => document.remove_attribute(element, "src"),
            }
        } else {
            let src = request.src.as_deref().unwrap_or_default();
            document.set_style(element, "background-image", &format!("url('{src}')"));
        }
        document.apply_effect(element, &config.effect, config.effect_duration());

        if config.remove_attribute {
            for name in [
                &config.attribute,
                &config.srcset_attribute,
                &config.retina_attribute,
                &config.image_base_attribute,
            ] {
                document.remove_attribute(element, name);
            }
            if config.sizes_attribute != "sizes" {
                document.remove_attribute(element, &config.sizes_attribute);
            }
        }

        self.states.settle(element, true);
        self.run_hook(|hooks, ctx| hooks.fire_after_load(ctx, element));
        self.reduce_pending();
    }

    /// Routes a native event of an observed element to the strategy that
    /// watches it.
    pub fn on_element_event(&mut self, target: ElementId, event: ElementEvent) {
        let Some(&owner) = self.watched.get(&target) else {
            return;
        };
        if !self.states.is_pending(owner) {
            return;
        }
        let Some(active) = self.active.get(&owner) else {
            return;
        };
        let strategy = Rc::clone(&active.strategy);
        let completion = active.completion.clone();
        log::trace!(
            "{}: {} on {target:?} for {owner:?}",
            self.config.name,
            event.name()
        );

        let mut ctx = LoadContext::new(&mut self.document, &self.config, &mut self.watched, owner);
        strategy.on_element_event(&mut ctx, target, event, &completion);
        self.flush();
    }

    /// Applies every queued settlement.
    ///
    /// Strategies that finish while a scan is running queue their result,
    /// so the working set is always compacted before a success counts down
    /// the pending loads.
    pub fn flush(&mut self) {
        while let Some(settlement) = self.outbox.pop() {
            self.apply_settlement(settlement);
        }
    }

    /// Settlements queued and not yet flushed.
    pub fn queued_settlements(&self) -> usize {
        self.outbox.len()
    }

    fn apply_settlement(&mut self, settlement: Settlement) {
        let Settlement {
            element,
            outcome,
            patches,
        } = settlement;
        if !self.states.is_pending(element) {
            log::trace!("{}: {element:?} already settled", self.config.name);
            return;
        }
        for patch in patches {
            patch.apply(&mut self.document, element);
        }

        match outcome {
            Some(true) => {
                self.states.settle(element, true);
                self.release(element);
                if self.config.remove_attribute {
                    self.document
                        .remove_attribute(element, &self.config.loader_attribute);
                }
                self.run_hook(|hooks, ctx| hooks.fire_after_load(ctx, element));
                self.reduce_pending();
            }
            Some(false) => self.fail_element(element),
            None => {}
        }
    }

    fn fail_element(&mut self, element: ElementId) {
        if !self.states.settle(element, false) {
            return;
        }
        log::debug!("{}: {element:?} failed to load", self.config.name);
        self.release(element);
        self.run_hook(|hooks, ctx| hooks.fire_on_error(ctx, element));
        self.reduce_pending();
    }

    /// Forgets the strategy and observed elements of a settled load.
    fn release(&mut self, owner: ElementId) {
        self.active.remove(&owner);
        let document = &mut self.document;
        self.watched.retain(|target, watcher| {
            if *watcher == owner {
                document.unobserve(*target);
                false
            } else {
                true
            }
        });
    }

    /// Runs a hook against this loader, then adopts the elements it added.
    fn run_hook(&mut self, fire: impl FnOnce(&mut Hooks, &mut HookContext<'_>)) {
        let mut ctx = HookContext::new(&mut self.document, &mut self.config);
        fire(&mut self.hooks, &mut ctx);
        let added = ctx.into_added();
        if !added.is_empty() {
            self.add_items(added);
        }
    }

    fn reduce_pending(&mut self) {
        self.pending = self.pending.saturating_sub(1);
        if self.pending == 0 && self.items.is_empty() && self.finished_armed {
            self.finished_armed = false;
            log::debug!("{}: all elements finished", self.config.name);
            self.run_hook(|hooks, ctx| hooks.fire_finished_all(ctx));
        }
    }
}
