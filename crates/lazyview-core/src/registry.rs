use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::config::OPTION_NAMES;
use crate::fetch::Fetcher;
use crate::loaders;
use crate::strategy::LoadStrategy;

const HOOK_NAMES: &[&str] = &["beforeLoad", "afterLoad", "onError", "onFinishedAll"];

/// Named loader strategies plus the tags that use one without markup.
#[derive(Clone, Default)]
pub struct LoaderRegistry {
    strategies: FxHashMap<String, Rc<dyn LoadStrategy>>,
    forced: FxHashMap<String, String>,
}

impl LoaderRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every built-in strategy. The fetch based `ajax`
    /// family is only available when a fetcher is given.
    pub fn with_builtin(fetcher: Option<Rc<dyn Fetcher>>) -> Self {
        let mut registry = Self::new();
        loaders::register_builtin(&mut registry, fetcher);
        registry
    }

    /// Registers `strategy` under every name in `names` and makes it the
    /// forced loader for every tag in `tags`.
    ///
    /// Names that clash with a configuration option or hook are skipped.
    /// Forced tags point at the first accepted name. Returns `false` when no
    /// name was accepted, in which case nothing changes.
    pub fn register(
        &mut self,
        names: &[&str],
        tags: &[&str],
        strategy: impl LoadStrategy + 'static,
    ) -> bool {
        self.register_shared(names, tags, Rc::new(strategy))
    }

    pub fn register_shared(
        &mut self,
        names: &[&str],
        tags: &[&str],
        strategy: Rc<dyn LoadStrategy>,
    ) -> bool {
        let accepted: Vec<&str> = names
            .iter()
            .copied()
            .filter(|name| {
                let reserved = is_reserved(name);
                if reserved {
                    log::warn!("loader name `{name}` clashes with an option and is ignored");
                }
                !name.is_empty() && !reserved
            })
            .collect();

        let Some(primary) = accepted.first() else {
            return false;
        };

        for name in &accepted {
            self.strategies.insert(name.to_string(), Rc::clone(&strategy));
        }
        for tag in tags {
            self.forced
                .insert(tag.to_ascii_lowercase(), primary.to_string());
        }
        log::debug!("registered loader {accepted:?} forced on {tags:?}");
        true
    }

    pub fn get(&self, name: &str) -> Option<Rc<dyn LoadStrategy>> {
        self.strategies.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.strategies.contains_key(name)
    }

    /// Strategy name forced on every element with this tag.
    pub fn forced_loader(&self, tag: &str) -> Option<&str> {
        self.forced.get(tag).map(String::as_str)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.strategies.keys().map(String::as_str)
    }
}

fn is_reserved(name: &str) -> bool {
    OPTION_NAMES.contains(&name) || HOOK_NAMES.contains(&name)
}

impl fmt::Debug for LoaderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.names().collect();
        names.sort_unstable();
        f.debug_struct("LoaderRegistry")
            .field("strategies", &names)
            .field("forced", &self.forced)
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/registry_tests.rs"]
mod tests;
