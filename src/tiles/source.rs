use crate::core::constants::TILE_IMAGE_SIDE;
use crate::core::geo::TileKey;
use image::{Rgba, RgbaImage};

/// Pixel payload of a tile
pub type TileImage = RgbaImage;

/// Trait representing anything that can render the pixels of a ready tile.
///
/// Rendering is synchronous and must be deterministic for a given key: the
/// producer calls it every time a ready tile is requested instead of keeping
/// images around.
pub trait TileSource: Send + Sync {
    fn render(&self, key: TileKey) -> TileImage;
}

/// Solid colour per level of detail, one pixel per tile.
#[derive(Debug, Clone)]
pub struct SolidColorSource {
    palette: Vec<Rgba<u8>>,
    fallback: Rgba<u8>,
}

impl SolidColorSource {
    pub fn new() -> Self {
        Self {
            palette: vec![
                Rgba([0, 0, 255, 255]),     // blue
                Rgba([153, 102, 51, 255]),  // brown
                Rgba([128, 128, 128, 255]), // gray
                Rgba([0, 255, 0, 255]),     // green
                Rgba([255, 255, 0, 255]),   // yellow
            ],
            fallback: Rgba([255, 0, 255, 255]), // magenta
        }
    }

    /// Custom palette indexed by LOD; LODs outside it use `fallback`
    pub fn with_palette(palette: Vec<Rgba<u8>>, fallback: Rgba<u8>) -> Self {
        Self { palette, fallback }
    }

    pub fn color_for_lod(&self, lod: i32) -> Rgba<u8> {
        usize::try_from(lod)
            .ok()
            .and_then(|index| self.palette.get(index))
            .copied()
            .unwrap_or(self.fallback)
    }
}

impl Default for SolidColorSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TileSource for SolidColorSource {
    fn render(&self, key: TileKey) -> TileImage {
        RgbaImage::from_pixel(TILE_IMAGE_SIDE, TILE_IMAGE_SIDE, self.color_for_lod(key.lod))
    }
}
