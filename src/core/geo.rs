use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents a point in surface-local coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Width and height in surface-local units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Square size, the common case for tiles
    pub fn square(side: f64) -> Self {
        Self::new(side, side)
    }

    /// Divides both dimensions by `factor`
    pub fn scaled_down(&self, factor: f64) -> Size {
        Size::new(self.width / factor, self.height / factor)
    }

    /// True when either dimension is zero, negative or NaN
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    pub fn area(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.width * self.height
        }
    }
}

impl Default for Size {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Identifies one tile: a cell of the tile grid belonging to a single level of detail.
///
/// Grids at different LODs are independent, so `(row, col)` at LOD 1 and the same
/// `(row, col)` at LOD 2 are unrelated tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileKey {
    pub row: i64,
    pub col: i64,
    pub lod: i32,
}

impl TileKey {
    pub fn new(row: i64, col: i64, lod: i32) -> Self {
        Self { row, col, lod }
    }
}

impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(X:{}, Y:{}, LOD:{})", self.col, self.row, self.lod)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fxhash::FxHashSet;

    #[test]
    fn test_tile_key_lod_distinguishes_tiles() {
        let a = TileKey::new(2, 3, 1);
        let b = TileKey::new(2, 3, 2);
        assert_ne!(a, b);

        let mut set = FxHashSet::default();
        set.insert(a);
        set.insert(b);
        set.insert(TileKey::new(2, 3, 1));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_tile_key_display() {
        let key = TileKey::new(2, 3, 1);
        assert_eq!(key.to_string(), "(X:3, Y:2, LOD:1)");
    }

    #[test]
    fn test_size_scaling() {
        let size = Size::square(400.0).scaled_down(4.0);
        assert_eq!(size, Size::new(100.0, 100.0));
        assert!(!size.is_empty());
        assert!(Size::new(0.0, 10.0).is_empty());
        assert!(Size::new(f64::NAN, 10.0).is_empty());
    }
}
