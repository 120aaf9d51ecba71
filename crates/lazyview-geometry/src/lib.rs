//! Pure math for lazyview
//!
//! Geometry primitives shared by the viewport evaluator, the host adapters
//! and the gallery behaviours.

mod axis;
mod geometry;

pub use axis::*;
pub use geometry::*;

pub mod prelude {
    pub use crate::axis::Axis;
    pub use crate::geometry::{EdgeInsets, Point, Rect, Size};
}
