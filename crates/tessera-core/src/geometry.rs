#![forbid(unsafe_code)]

//! Geometric primitives.

use std::fmt;

/// An integer pixel coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    /// The origin.
    pub const ZERO: Point = Point::new(0, 0);

    /// Create a point.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Offset both axes by the leading edges of `sides`.
    #[inline]
    #[must_use]
    pub const fn offset_by(self, sides: Sides) -> Self {
        Self::new(
            self.x.saturating_add(sides.left),
            self.y.saturating_add(sides.top),
        )
    }

    /// Component-wise difference `self - origin`.
    #[inline]
    #[must_use]
    pub const fn delta_from(self, origin: Point) -> Self {
        Self::new(
            self.x.saturating_sub(origin.x),
            self.y.saturating_sub(origin.y),
        )
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A rectangle describing the space a box occupies in its container.
///
/// Uses pixel coordinates relative to the container's content box
/// (origin at top-left, padding excluded).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    /// Left edge (inclusive).
    pub x: i32,
    /// Top edge (inclusive).
    pub y: i32,
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from origin with given size.
    #[inline]
    pub const fn from_size(width: i32, height: i32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Right edge (exclusive).
    #[inline]
    pub const fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub const fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    /// Move the rectangle so its top-left corner sits at `(x, y)`.
    #[inline]
    pub fn set_origin(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
    }

    /// Check whether `other` lies entirely within this rectangle.
    #[inline]
    pub const fn contains(&self, other: &Rect) -> bool {
        self.x <= other.x
            && self.y <= other.y
            && self.right() >= other.right()
            && self.bottom() >= other.bottom()
    }

    /// Check whether the two rectangles share any area.
    ///
    /// Touching edges do not count as overlap.
    #[inline]
    pub const fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Whether a box of `other`'s size would fit inside this rectangle.
    #[inline]
    pub const fn can_fit(&self, other: &Rect) -> bool {
        self.width >= other.width && self.height >= other.height
    }
}

/// Sides for padding/margin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "options-config",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct Sides {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

impl Sides {
    /// Create new sides with equal values.
    pub const fn all(val: i32) -> Self {
        Self {
            top: val,
            right: val,
            bottom: val,
            left: val,
        }
    }

    /// Create new sides with specific values.
    pub const fn new(top: i32, right: i32, bottom: i32, left: i32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }
}

impl From<i32> for Sides {
    fn from(val: i32) -> Self {
        Self::all(val)
    }
}

impl From<(i32, i32)> for Sides {
    fn from((vertical, horizontal): (i32, i32)) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }
}
