//! Tiled, level-of-detail aware drawing surface
//!
//! The surface is redrawn region by region. Each redraw pulls whatever tiles
//! are ready from the producer and stops at the first one that is not. When a
//! tile later becomes ready, only that tile's rectangle is invalidated, so the
//! host comes back for exactly the part that changed.

use crate::core::bounds::Bounds;
use crate::core::config::TilingConfig;
use crate::core::geo::{Size, TileKey};
use crate::core::viewport::VisibleRegion;
use crate::tiles::grid::{self, TileRange};
use crate::tiles::producer::TileProducer;
use crate::traits::{Invalidator, TileRasterizer};
use fxhash::FxHashSet;

/// What a single [`TiledSurface::redraw`] call did
#[derive(Debug, Clone, PartialEq)]
pub struct RedrawOutcome {
    pub lod: i32,
    /// Tiles enclosing the redrawn rectangle
    pub range: TileRange,
    /// Tiles drawn, in drawing order
    pub drawn: Vec<TileKey>,
    /// First tile that was not ready; the pass stopped there
    pub stalled_at: Option<TileKey>,
}

impl RedrawOutcome {
    fn nothing(lod: i32) -> Self {
        Self {
            lod,
            range: TileRange::empty(),
            drawn: Vec::new(),
            stalled_at: None,
        }
    }

    /// Every tile of the range was drawn
    pub fn is_complete(&self) -> bool {
        self.stalled_at.is_none()
    }
}

/// A large virtual canvas drawn as a grid of tiles.
pub struct TiledSurface {
    producer: TileProducer,
    /// Tile size at LOD 0, in surface-local units
    tile_size: Size,
    bounds: Bounds,
    /// Keys requested by redraws that are still waiting for content
    awaiting: FxHashSet<TileKey>,
}

impl TiledSurface {
    /// Surface with empty bounds; call [`set_bounds`](Self::set_bounds) once laid out.
    pub fn new(producer: TileProducer, tile_size: Size) -> Self {
        debug_assert!(!tile_size.is_empty(), "tile size must be positive");
        Self {
            producer,
            tile_size,
            bounds: Bounds::default(),
            awaiting: FxHashSet::default(),
        }
    }

    /// Surface laid out at the configured size, producing on the default scheduler
    pub fn from_config(config: &TilingConfig) -> Self {
        let mut surface = Self::new(
            TileProducer::with_config(config.production.clone()),
            config.tile_size,
        );
        surface.set_bounds(Bounds::from_size(config.surface_size));
        surface
    }

    /// Record the laid-out bounds of the surface
    pub fn set_bounds(&mut self, bounds: Bounds) {
        log::debug!(
            "surface bounds set to {}x{} at ({}, {})",
            bounds.width(),
            bounds.height(),
            bounds.min_x(),
            bounds.min_y()
        );
        self.bounds = bounds;
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn tile_size(&self) -> Size {
        self.tile_size
    }

    pub fn producer(&self) -> &TileProducer {
        &self.producer
    }

    /// Split `dirty` along the tile grid at the LOD of `scale`.
    ///
    /// Returns one piece per tile cell the rectangle touches, row-major, each
    /// clipped to `dirty`. Redrawing the pieces separately keeps a missing tile
    /// from holding back the cells after it.
    pub fn split_dirty(&self, dirty: &Bounds, scale: f64) -> Vec<Bounds> {
        let lod = grid::lod_for_scale(scale);
        let cell = grid::tile_size_at_lod(self.tile_size, grid::lod_scale(lod));

        grid::enclosing_tile_range(dirty, cell)
            .keys(lod)
            .filter_map(|key| grid::tile_rect(key, self.tile_size).intersection(dirty))
            .collect()
    }

    /// Redraw the part of the surface inside `dirty` at zoom `scale`.
    ///
    /// Tiles are visited row by row. Ready tiles are drawn clipped to the
    /// surface bounds; the first tile that is not ready gets production
    /// scheduled and ends the pass. Its ready invalidation brings the host back
    /// for the rest.
    pub fn redraw(
        &mut self,
        dirty: &Bounds,
        scale: f64,
        target: &mut dyn TileRasterizer,
    ) -> RedrawOutcome {
        debug_assert!(
            scale.is_finite() && scale > 0.0,
            "redraw scale must be positive, got {scale}"
        );

        let lod = grid::lod_for_scale(scale);
        if self.bounds.is_empty() {
            log::trace!("redraw skipped, surface has no bounds yet");
            return RedrawOutcome::nothing(lod);
        }

        let tile_size = grid::tile_size_at_lod(self.tile_size, grid::lod_scale(lod));
        let range = grid::enclosing_tile_range(dirty, tile_size);
        if range.is_empty() {
            return RedrawOutcome::nothing(lod);
        }

        let mut outcome = RedrawOutcome {
            lod,
            range,
            drawn: Vec::new(),
            stalled_at: None,
        };

        for key in range.keys(lod) {
            let Some(image) = self.producer.request_tile(key) else {
                self.awaiting.insert(key);
                outcome.stalled_at = Some(key);
                break;
            };

            let nominal = grid::tile_rect(key, self.tile_size);
            if let Some(dest) = nominal.intersection(&self.bounds) {
                log::trace!("drawing tile {}", key);
                target.draw_tile(key, &image, &dest);
                outcome.drawn.push(key);
            }
        }

        outcome
    }

    /// React to `key` becoming ready: invalidate the tile's rectangle clipped
    /// to the surface bounds. Returns the invalidated rectangle, or `None` when
    /// the tile lies outside the bounds.
    pub fn on_tile_ready(
        &mut self,
        key: TileKey,
        invalidator: &mut dyn Invalidator,
    ) -> Option<Bounds> {
        let was_awaited = self.awaiting.remove(&key);
        debug_assert!(
            was_awaited,
            "ready notification for {key}, which this surface never requested"
        );
        debug_assert!(
            self.producer.is_ready(&key),
            "ready notification for {key}, which is not ready"
        );

        let rect = grid::tile_rect(key, self.tile_size).intersection(&self.bounds);
        match rect {
            Some(rect) => {
                log::debug!(
                    "tile {} ready, invalidating ({}, {}, {}, {})",
                    key,
                    rect.min_x(),
                    rect.min_y(),
                    rect.width(),
                    rect.height()
                );
                invalidator.invalidate(rect);
            }
            None => log::debug!(
                "tile {} ready outside surface bounds, nothing to invalidate",
                key
            ),
        }
        rect
    }

    /// Handle every completion queued by the producer; returns how many
    pub fn process_ready_tiles(&mut self, invalidator: &mut dyn Invalidator) -> usize {
        let ready = self.producer.drain_ready();
        for &key in &ready {
            self.on_tile_ready(key, invalidator);
        }
        ready.len()
    }

    /// Keys a full redraw of `region` would request, row-major
    pub fn visible_keys(&self, region: &VisibleRegion) -> Vec<TileKey> {
        region.visible_keys(self.tile_size)
    }

    /// Tiles requested by redraws and still in production
    pub fn awaiting_count(&self) -> usize {
        self.awaiting.len()
    }
}

impl std::fmt::Debug for TiledSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TiledSurface")
            .field("tile_size", &self.tile_size)
            .field("bounds", &self.bounds)
            .field("awaiting", &self.awaiting.len())
            .field("producer", &self.producer)
            .finish()
    }
}
