//! Geometric primitives: Point, Size, Rect, EdgeInsets

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };
}

/// Axis-aligned rectangle in CSS pixels, relative to the viewport origin.
///
/// Element bounds reported by a host follow `getBoundingClientRect`
/// semantics, so `y` is negative for elements scrolled above the viewport.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_size(size: Size) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: size.width,
            height: size.height,
        }
    }

    /// Builds a rectangle from its four edges.
    pub fn from_edges(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            x: left,
            y: top,
            width: right - left,
            height: bottom - top,
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn translate(&self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            width: self.width,
            height: self.height,
        }
    }

    /// Grows the rectangle outwards by `insets` on every edge.
    pub fn outset(&self, insets: EdgeInsets) -> Self {
        Self::from_edges(
            self.left() - insets.left,
            self.top() - insets.top,
            self.right() + insets.right,
            self.bottom() + insets.bottom,
        )
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && y >= self.y && x <= self.x + self.width && y <= self.y + self.height
    }

    /// Strict overlap on the horizontal axis. Touching edges do not overlap.
    pub fn overlaps_horizontally(&self, other: &Rect) -> bool {
        self.right() > other.left() && other.right() > self.left()
    }

    /// Strict overlap on the vertical axis. Touching edges do not overlap.
    pub fn overlaps_vertically(&self, other: &Rect) -> bool {
        self.bottom() > other.top() && other.bottom() > self.top()
    }
}

/// Padding values for each edge of a rectangle.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EdgeInsets {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl EdgeInsets {
    pub fn uniform(all: f32) -> Self {
        Self {
            left: all,
            top: all,
            right: all,
            bottom: all,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_round_trip_through_from_edges() {
        let rect = Rect::from_edges(10.0, 600.0, 110.0, 700.0);
        assert_eq!(rect.left(), 10.0);
        assert_eq!(rect.top(), 600.0);
        assert_eq!(rect.right(), 110.0);
        assert_eq!(rect.bottom(), 700.0);
        assert_eq!(rect.size(), Size::new(100.0, 100.0));
    }

    #[test]
    fn outset_grows_every_edge() {
        let viewport = Rect::from_size(Size::new(1024.0, 800.0));
        let area = viewport.outset(EdgeInsets::uniform(500.0));
        assert_eq!(area.top(), -500.0);
        assert_eq!(area.bottom(), 1300.0);
        assert_eq!(area.left(), -500.0);
        assert_eq!(area.right(), 1524.0);
    }

    #[test]
    fn touching_edges_do_not_overlap() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        let below = Rect::new(0.0, 100.0, 100.0, 50.0);
        assert!(!a.overlaps_vertically(&below));
        assert!(a.overlaps_vertically(&below.translate(0.0, -1.0)));
    }
}
