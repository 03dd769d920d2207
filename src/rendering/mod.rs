pub mod canvas;
pub mod context;
pub mod dirty;

// Re-export main types
pub use canvas::PixelCanvas;
pub use context::{DrawCommand, RenderContext};
pub use dirty::DirtyRegion;

use crate::core::bounds::Bounds;
use crate::surface::TiledSurface;
use crate::traits::SurfaceHost;

/// Statistics of one [`display_pass`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayPass {
    /// Rectangles redrawn, in order
    pub redrawn: Vec<Bounds>,
    pub tiles_drawn: usize,
    /// Redraws that stopped at a tile still in production
    pub stalled: usize,
}

impl DisplayPass {
    pub fn is_idle(&self) -> bool {
        self.redrawn.is_empty()
    }
}

/// Redraw everything the host has invalidated since the previous pass.
///
/// Each pending rectangle is split along the tile grid at the LOD of `scale`
/// and every piece gets its own `redraw` call with drawing clipped to it. A
/// narrow invalidation leads to an equally narrow redraw, and one missing tile
/// does not keep the rest of a wide invalidation from being requested.
pub fn display_pass<H: SurfaceHost>(
    host: &mut H,
    surface: &mut TiledSurface,
    scale: f64,
) -> DisplayPass {
    let mut pass = DisplayPass::default();

    for dirty in host.take_dirty() {
        for rect in surface.split_dirty(&dirty, scale) {
            host.begin_redraw(&rect);
            let outcome = surface.redraw(&rect, scale, host);
            pass.tiles_drawn += outcome.drawn.len();
            if !outcome.is_complete() {
                pass.stalled += 1;
            }
            pass.redrawn.push(rect);
        }
    }

    if !pass.is_idle() {
        log::debug!(
            "display pass redrew {} rect(s), {} tile(s), {} stalled",
            pass.redrawn.len(),
            pass.tiles_drawn,
            pass.stalled
        );
    }
    pass
}
