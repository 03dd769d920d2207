use crate::core::bounds::Bounds;
use crate::core::geo::{Size, TileKey};
use crate::rendering::dirty::DirtyRegion;
use crate::tiles::source::TileImage;
use crate::traits::{Invalidator, SurfaceHost, TileRasterizer};
use crate::Result;
use image::Rgba;

/// Recording render context.
///
/// Queues draw commands instead of rasterizing them and keeps a log of every
/// invalidation and redraw it saw. Used as a host in tests and for debugging
/// what a surface asked for.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub size: Size,
    /// Drawing primitives queue, in submission order
    pub drawing_queue: Vec<DrawCommand>,
    /// Clipping rectangle of the current redraw, surface-local
    pub clip_bounds: Option<Bounds>,
    /// Whether clipping is enabled
    pub clipping_enabled: bool,
    dirty: DirtyRegion,
    invalidations: Vec<Bounds>,
    redraws: Vec<Bounds>,
}

/// Commands that can be issued to the render context
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Tile {
        key: TileKey,
        /// Colour of the tile image's first pixel
        color: Rgba<u8>,
        bounds: Bounds,
    },
}

impl DrawCommand {
    pub fn bounds(&self) -> &Bounds {
        match self {
            DrawCommand::Tile { bounds, .. } => bounds,
        }
    }
}

impl RenderContext {
    /// Create a new render context
    pub fn new(size: Size) -> Self {
        Self {
            size,
            drawing_queue: Vec::new(),
            clip_bounds: None,
            clipping_enabled: false,
            dirty: DirtyRegion::new(),
            invalidations: Vec::new(),
            redraws: Vec::new(),
        }
    }

    /// Begin a frame
    pub fn begin_frame(&mut self) {
        self.drawing_queue.clear();
        self.redraws.clear();
    }

    /// Queue a tile draw, clipped to the current redraw rectangle
    pub fn render_tile(&mut self, key: TileKey, image: &TileImage, bounds: Bounds) -> Result<()> {
        // Validate bounds
        if bounds.is_empty() {
            return Err(format!("Invalid bounds for tile {key}").into());
        }

        let final_bounds = if self.clipping_enabled {
            self.clip_to_redraw(&bounds)
        } else {
            Some(bounds)
        };

        // A tile completely outside the clip is not drawn
        if let Some(clipped) = final_bounds {
            let color = image.pixels().next().copied().unwrap_or(Rgba([0, 0, 0, 0]));
            self.drawing_queue.push(DrawCommand::Tile {
                key,
                color,
                bounds: clipped,
            });
        }
        Ok(())
    }

    /// Set the clipping rectangle
    pub fn set_clip_bounds(&mut self, clip: Bounds) {
        self.clip_bounds = Some(clip);
        self.clipping_enabled = true;
    }

    /// Clear clipping bounds
    pub fn clear_clip_bounds(&mut self) {
        self.clip_bounds = None;
        self.clipping_enabled = false;
    }

    fn clip_to_redraw(&self, bounds: &Bounds) -> Option<Bounds> {
        match self.clip_bounds {
            Some(clip) => bounds.intersection(&clip),
            None => Some(*bounds),
        }
    }

    /// Get the current drawing queue
    pub fn drawing_queue(&self) -> &[DrawCommand] {
        &self.drawing_queue
    }

    /// Keys of the queued tile draws, in order
    pub fn drawn_keys(&self) -> Vec<TileKey> {
        self.drawing_queue
            .iter()
            .map(|command| match command {
                DrawCommand::Tile { key, .. } => *key,
            })
            .collect()
    }

    /// Every rectangle ever invalidated on this context
    pub fn invalidations(&self) -> &[Bounds] {
        &self.invalidations
    }

    /// Rectangles redrawn since the frame began
    pub fn redraws(&self) -> &[Bounds] {
        &self.redraws
    }

    /// Invalidations not yet taken by a display pass
    pub fn pending_dirty(&self) -> &DirtyRegion {
        &self.dirty
    }
}

impl TileRasterizer for RenderContext {
    fn draw_tile(&mut self, key: TileKey, image: &TileImage, dest: &Bounds) {
        if let Err(e) = self.render_tile(key, image, *dest) {
            log::warn!("dropping tile draw: {}", e);
        }
    }
}

impl Invalidator for RenderContext {
    fn invalidate(&mut self, rect: Bounds) {
        self.invalidations.push(rect);
        self.dirty.add(rect);
    }
}

impl SurfaceHost for RenderContext {
    fn take_dirty(&mut self) -> Vec<Bounds> {
        self.dirty.take()
    }

    fn begin_redraw(&mut self, rect: &Bounds) {
        self.redraws.push(*rect);
        self.set_clip_bounds(*rect);
    }
}
