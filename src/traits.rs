//! Seams between the tiling core and its host environment
//!
//! The core never talks to a windowing system directly. Hosts hand it these
//! capabilities instead, and tests hand it recording doubles.

use crate::core::{bounds::Bounds, geo::TileKey};
use crate::tiles::source::TileImage;
use std::time::Duration;

/// Draws tile pixels into the host's pixel buffer
pub trait TileRasterizer {
    /// Rasterize `image` stretched over `dest` (surface-local coordinates)
    fn draw_tile(&mut self, key: TileKey, image: &TileImage, dest: &Bounds);
}

/// Region-scoped invalidation, the `setNeedsDisplay(rect)` of the host.
///
/// Honouring `invalidate(rect)` must eventually lead to a redraw covering
/// `rect`, without forcing a redraw of the whole surface.
pub trait Invalidator {
    fn invalidate(&mut self, rect: Bounds);
}

/// A host that both rasterizes and collects invalidations, driven by
/// [`crate::rendering::display_pass`].
pub trait SurfaceHost: TileRasterizer + Invalidator {
    /// Take every pending invalidated rectangle
    fn take_dirty(&mut self) -> Vec<Bounds>;

    /// Called before the surface redraws `rect`; drawing is clipped to it
    fn begin_redraw(&mut self, _rect: &Bounds) {}
}

/// Receives tile readiness notifications on the drawing context
pub trait TileReadyListener {
    fn on_tile_ready(&mut self, key: TileKey);
}

/// One deferred unit of tile production
pub type ProductionJob = Box<dyn FnOnce() + Send + 'static>;

/// Runs production jobs after a delay on some worker context
pub trait ProductionScheduler: Send + Sync {
    /// Run `job` once, no earlier than `delay` from now. Implementations may
    /// run it before returning.
    fn schedule(&self, delay: Duration, job: ProductionJob);
}

impl<F> TileReadyListener for F
where
    F: FnMut(TileKey),
{
    fn on_tile_ready(&mut self, key: TileKey) {
        self(key)
    }
}
