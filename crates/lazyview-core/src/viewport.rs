//! Loadable area checks.
//!
//! The loadable area is the viewport grown by the threshold on every edge.
//! An element is loadable on an axis when its bounds strictly overlap the
//! area on that axis.

use lazyview_geometry::{Axis, EdgeInsets, Rect, Size};

use crate::config::ScrollDirection;
use crate::document::{Document, ElementId};

/// Whether `bounds` lies in the loadable area of a viewport of `viewport`
/// size for the given scroll direction.
pub fn in_loadable_area(
    bounds: Rect,
    viewport: Size,
    threshold: f32,
    direction: ScrollDirection,
) -> bool {
    let area = Rect::from_size(viewport).outset(EdgeInsets::uniform(threshold));
    let on_axis = |axis: Axis| match axis {
        Axis::Vertical => area.overlaps_vertically(&bounds),
        Axis::Horizontal => area.overlaps_horizontally(&bounds),
    };

    [Axis::Vertical, Axis::Horizontal]
        .into_iter()
        .filter(|axis| direction.includes(*axis))
        .all(on_axis)
}

/// Evaluates elements against the viewport, caching the viewport size
/// until [`ViewportEvaluator::invalidate`] is called.
#[derive(Debug, Default)]
pub struct ViewportEvaluator {
    cached: Option<Size>,
}

impl ViewportEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops the cached size, typically on resize.
    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    pub fn viewport_size(&mut self, document: &dyn Document) -> Size {
        *self.cached.get_or_insert_with(|| document.viewport_size())
    }

    pub fn is_loadable(
        &mut self,
        document: &dyn Document,
        element: ElementId,
        threshold: f32,
        direction: ScrollDirection,
    ) -> bool {
        let viewport = self.viewport_size(document);
        in_loadable_area(document.bounding_rect(element), viewport, threshold, direction)
    }
}
