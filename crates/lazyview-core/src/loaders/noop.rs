//! Placeholder strategies, handy to disable elements or during development.

use crate::document::ElementId;
use crate::error::LoadError;
use crate::strategy::{Completion, LoadContext, LoadStrategy};

/// Does nothing. The element stays pending until a native event settles it.
#[derive(Clone, Copy, Debug, Default)]
pub struct Noop;

impl LoadStrategy for Noop {
    fn load(&self, _: &mut LoadContext<'_>, _: ElementId, _: Completion) -> Result<(), LoadError> {
        Ok(())
    }
}

/// Succeeds right away.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSuccess;

impl LoadStrategy for NoopSuccess {
    fn load(
        &self,
        _: &mut LoadContext<'_>,
        _: ElementId,
        completion: Completion,
    ) -> Result<(), LoadError> {
        completion.succeed();
        Ok(())
    }
}

/// Fails right away.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopError;

impl LoadStrategy for NoopError {
    fn load(
        &self,
        _: &mut LoadContext<'_>,
        _: ElementId,
        completion: Completion,
    ) -> Result<(), LoadError> {
        completion.fail();
        Ok(())
    }
}
