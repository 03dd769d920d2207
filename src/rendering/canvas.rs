use crate::core::bounds::Bounds;
use crate::core::geo::TileKey;
use crate::rendering::dirty::DirtyRegion;
use crate::tiles::source::TileImage;
use crate::traits::{Invalidator, SurfaceHost, TileRasterizer};
use crate::{Result, TileError};
use image::{ImageFormat, Rgba, RgbaImage};
use std::path::Path;

/// Software raster host: one canvas pixel per surface-local unit.
///
/// A pixel belongs to a rectangle when its centre lies inside it, so adjacent
/// tiles never write the same pixel and nothing outside the current redraw
/// rectangle is touched.
#[derive(Debug, Clone)]
pub struct PixelCanvas {
    image: RgbaImage,
    clip: Option<Bounds>,
    dirty: DirtyRegion,
    pixels_written: u64,
    tiles_drawn: u64,
}

impl PixelCanvas {
    pub const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, Self::BACKGROUND),
            clip: None,
            dirty: DirtyRegion::new(),
            pixels_written: 0,
            tiles_drawn: 0,
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba<u8>> {
        if x < self.image.width() && y < self.image.height() {
            Some(*self.image.get_pixel(x, y))
        } else {
            None
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Pixels written since the last [`reset_stats`](Self::reset_stats)
    pub fn pixels_written(&self) -> u64 {
        self.pixels_written
    }

    pub fn tiles_drawn(&self) -> u64 {
        self.tiles_drawn
    }

    pub fn reset_stats(&mut self) {
        self.pixels_written = 0;
        self.tiles_drawn = 0;
    }

    /// Number of pixels currently holding `color`
    pub fn count_pixels(&self, color: Rgba<u8>) -> usize {
        self.image.pixels().filter(|pixel| **pixel == color).count()
    }

    /// Invalidations not yet taken by a display pass
    pub fn pending_dirty(&self) -> &DirtyRegion {
        &self.dirty
    }

    /// Write the canvas as a PNG file
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.image
            .save_with_format(path, ImageFormat::Png)
            .map_err(TileError::from)?;
        log::info!("canvas written to {}", path.display());
        Ok(())
    }

    /// Pixel span `[start, end)` whose centres fall in `[min, max)`
    fn pixel_span(min: f64, max: f64, limit: u32) -> (u32, u32) {
        let start = (min - 0.5).ceil().clamp(0.0, limit as f64) as u32;
        let end = (max - 0.5).ceil().clamp(0.0, limit as f64) as u32;
        (start, end.max(start))
    }
}

impl TileRasterizer for PixelCanvas {
    fn draw_tile(&mut self, key: TileKey, image: &TileImage, dest: &Bounds) {
        let target = match self.clip {
            Some(clip) => dest.intersection(&clip),
            None => Some(*dest),
        };
        let Some(target) = target else {
            return;
        };
        let (src_w, src_h) = image.dimensions();
        if src_w == 0 || src_h == 0 {
            log::warn!("tile {} has an empty image", key);
            return;
        }

        let (x0, x1) = Self::pixel_span(target.min_x(), target.max_x(), self.image.width());
        let (y0, y1) = Self::pixel_span(target.min_y(), target.max_y(), self.image.height());

        for y in y0..y1 {
            let v = ((y as f64 + 0.5 - dest.min_y()) / dest.height() * src_h as f64) as u32;
            for x in x0..x1 {
                let u = ((x as f64 + 0.5 - dest.min_x()) / dest.width() * src_w as f64) as u32;
                let color = *image.get_pixel(u.min(src_w - 1), v.min(src_h - 1));
                self.image.put_pixel(x, y, color);
            }
        }

        self.pixels_written += u64::from(x1 - x0) * u64::from(y1 - y0);
        self.tiles_drawn += 1;
    }
}

impl Invalidator for PixelCanvas {
    fn invalidate(&mut self, rect: Bounds) {
        self.dirty.add(rect);
    }
}

impl SurfaceHost for PixelCanvas {
    fn take_dirty(&mut self) -> Vec<Bounds> {
        self.dirty.take()
    }

    fn begin_redraw(&mut self, rect: &Bounds) {
        self.clip = Some(*rect);
    }
}
