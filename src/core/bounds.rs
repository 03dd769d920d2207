use crate::core::geo::{Point, Size};
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in surface-local coordinates.
///
/// `min` is the top-left corner and `max` the bottom-right one; edges at `max`
/// are exclusive for tiling purposes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    /// Creates new bounds from two points
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// Creates bounds from individual coordinates
    pub fn from_coords(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self::new(Point::new(min_x, min_y), Point::new(max_x, max_y))
    }

    /// Creates bounds from an origin and a size (`CGRect`-style)
    pub fn from_origin_size(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::from_coords(x, y, x + width, y + height)
    }

    /// Bounds anchored at the origin
    pub fn from_size(size: Size) -> Self {
        Self::from_origin_size(0.0, 0.0, size.width, size.height)
    }

    pub fn min_x(&self) -> f64 {
        self.min.x
    }

    pub fn min_y(&self) -> f64 {
        self.min.y
    }

    pub fn max_x(&self) -> f64 {
        self.max.x
    }

    pub fn max_y(&self) -> f64 {
        self.max.y
    }

    /// Gets the width of the bounds
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Gets the height of the bounds
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    /// Gets the center point of the bounds
    pub fn center(&self) -> Point {
        Point::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }

    /// True for zero-area, inverted or NaN bounds
    pub fn is_empty(&self) -> bool {
        !(self.width() > 0.0 && self.height() > 0.0)
    }

    /// Checks if the bounds contain a point (max edges exclusive)
    pub fn contains(&self, point: &Point) -> bool {
        point.x >= self.min.x
            && point.x < self.max.x
            && point.y >= self.min.y
            && point.y < self.max.y
    }

    /// Checks if `other` lies entirely inside these bounds
    pub fn contains_bounds(&self, other: &Bounds) -> bool {
        other.min.x >= self.min.x
            && other.min.y >= self.min.y
            && other.max.x <= self.max.x
            && other.max.y <= self.max.y
    }

    /// Checks if the bounds share a region of positive area
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.intersection(other).is_some()
    }

    /// Gets the intersection of two bounds; `None` when it has no area.
    ///
    /// Rectangles that only touch along an edge do not intersect.
    pub fn intersection(&self, other: &Bounds) -> Option<Bounds> {
        let clipped = Bounds::new(
            Point::new(self.min.x.max(other.min.x), self.min.y.max(other.min.y)),
            Point::new(self.max.x.min(other.max.x), self.max.y.min(other.max.y)),
        );

        if clipped.is_empty() {
            None
        } else {
            Some(clipped)
        }
    }

    /// Smallest bounds enclosing both
    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds::new(
            Point::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            Point::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        )
    }

    /// Gets the area of the bounds
    pub fn area(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.width() * self.height()
        }
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new(Point::new(0.0, 0.0), Point::new(0.0, 0.0))
    }
}
