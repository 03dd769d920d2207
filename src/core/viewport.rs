use crate::core::bounds::Bounds;
use crate::core::constants::MAX_ZOOM_SCALE;
use crate::core::geo::{Size, TileKey};
use crate::tiles::grid::{self, TileRange};
use serde::{Deserialize, Serialize};

/// The part of the surface currently on screen, as reported by the scroll/zoom host.
///
/// `rect` is in surface-local coordinates and `scale` is the zoom factor from
/// surface-local units to device pixels. Values are transient: the host hands a
/// fresh region to every redraw request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisibleRegion {
    pub rect: Bounds,
    pub scale: f64,
}

impl VisibleRegion {
    /// Creates a new visible region. `scale` must be positive and finite.
    pub fn new(rect: Bounds, scale: f64) -> Self {
        debug_assert!(
            scale.is_finite() && scale > 0.0,
            "visible region scale must be positive, got {scale}"
        );
        Self { rect, scale }
    }

    /// Region for a device-pixel window of `window` size scrolled to `offset`
    /// (surface-local) at `scale`.
    pub fn for_window(offset_x: f64, offset_y: f64, window: Size, scale: f64) -> Self {
        let local = window.scaled_down(scale);
        Self::new(
            Bounds::from_origin_size(offset_x, offset_y, local.width, local.height),
            scale,
        )
    }

    /// Level of detail implied by the zoom scale
    pub fn lod(&self) -> i32 {
        grid::lod_for_scale(self.scale)
    }

    /// Tile size in surface-local units at this region's LOD
    pub fn tile_size(&self, base: Size) -> Size {
        grid::tile_size_at_lod(base, grid::lod_scale(self.lod()))
    }

    /// Tile range covering the visible rectangle
    pub fn tile_range(&self, base: Size) -> TileRange {
        grid::enclosing_tile_range(&self.rect, self.tile_size(base))
    }

    /// Keys of every tile intersecting the visible rectangle, row-major
    pub fn visible_keys(&self, base: Size) -> Vec<TileKey> {
        self.tile_range(base).keys(self.lod()).collect()
    }

    /// Same region zoomed to `scale` (at most [`MAX_ZOOM_SCALE`]), keeping its top-left corner
    pub fn with_scale(&self, scale: f64) -> Self {
        let scale = scale.min(MAX_ZOOM_SCALE);
        let factor = self.scale / scale;
        let size = Size::new(self.rect.width() * factor, self.rect.height() * factor);
        Self::new(
            Bounds::from_origin_size(self.rect.min_x(), self.rect.min_y(), size.width, size.height),
            scale,
        )
    }
}
