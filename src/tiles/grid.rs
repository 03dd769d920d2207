//! Tile grid geometry
//!
//! Pure conversions between surface rectangles, zoom scales and tile keys.
//! Every LOD has its own grid: at LOD `n` a tile spans `base / 2^n` surface
//! units, so the tile size in device pixels stays constant while zooming.

use crate::core::bounds::Bounds;
use crate::core::geo::{Size, TileKey};

/// Level of detail for a zoom scale: `floor(log2(scale))`.
///
/// `scale` must be positive and finite.
pub fn lod_for_scale(scale: f64) -> i32 {
    debug_assert!(
        scale.is_finite() && scale > 0.0,
        "zoom scale must be positive, got {scale}"
    );
    scale.log2().floor() as i32
}

/// Zoom scale at which `lod` is rendered at its native resolution: `2^lod`.
pub fn lod_scale(lod: i32) -> f64 {
    2_f64.powi(lod)
}

/// Tile size in surface-local units at `scale`.
///
/// Tiles shrink in local units as the zoom grows; doubling the scale halves the size.
pub fn tile_size_at_lod(base: Size, scale: f64) -> Size {
    debug_assert!(scale > 0.0, "zoom scale must be positive, got {scale}");
    base.scaled_down(scale)
}

/// Inclusive range of tile rows and columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRange {
    pub first_row: i64,
    pub last_row: i64,
    pub first_col: i64,
    pub last_col: i64,
}

impl TileRange {
    pub fn empty() -> Self {
        Self {
            first_row: 0,
            last_row: -1,
            first_col: 0,
            last_col: -1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.last_row < self.first_row || self.last_col < self.first_col
    }

    pub fn rows(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            (self.last_row - self.first_row) as u64 + 1
        }
    }

    pub fn cols(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            (self.last_col - self.first_col) as u64 + 1
        }
    }

    /// Number of tiles in the range
    pub fn len(&self) -> u64 {
        self.rows() * self.cols()
    }

    pub fn contains(&self, row: i64, col: i64) -> bool {
        (self.first_row..=self.last_row).contains(&row)
            && (self.first_col..=self.last_col).contains(&col)
    }

    /// `(row, col)` pairs, row ascending then column ascending
    pub fn iter(&self) -> impl Iterator<Item = (i64, i64)> {
        let range = if self.is_empty() { TileRange::empty() } else { *self };
        (range.first_row..=range.last_row)
            .flat_map(move |row| (range.first_col..=range.last_col).map(move |col| (row, col)))
    }

    /// Row-major keys at `lod`
    pub fn keys(&self, lod: i32) -> impl Iterator<Item = TileKey> {
        self.iter().map(move |(row, col)| TileKey::new(row, col, lod))
    }
}

/// Tiles of size `tile_size` that intersect `rect`.
///
/// The first index is `floor(min / size)`. The last one uses the one-unit edge
/// rule `floor((max - 1) / size)` so a tile only touched at the exact right or
/// bottom edge is excluded. It is evaluated as `ceil(max / size) - 1`, which gives
/// the same result for integral coordinates and keeps fractional edges covered.
pub fn enclosing_tile_range(rect: &Bounds, tile_size: Size) -> TileRange {
    if rect.is_empty() || tile_size.is_empty() {
        return TileRange::empty();
    }

    let first_col = (rect.min_x() / tile_size.width).floor() as i64;
    let last_col = (rect.max_x() / tile_size.width).ceil() as i64 - 1;
    let first_row = (rect.min_y() / tile_size.height).floor() as i64;
    let last_row = (rect.max_y() / tile_size.height).ceil() as i64 - 1;

    TileRange {
        first_row,
        last_row,
        first_col,
        last_col,
    }
}

/// Rectangle covered by `key` in surface-local units, at the key's own LOD.
pub fn tile_rect(key: TileKey, base: Size) -> Bounds {
    let size = tile_size_at_lod(base, lod_scale(key.lod));
    Bounds::from_origin_size(
        size.width * key.col as f64,
        size.height * key.row as f64,
        size.width,
        size.height,
    )
}
