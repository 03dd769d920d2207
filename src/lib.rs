//! # Tilelet
//!
//! An on-demand, level-of-detail tiled rendering core.
//!
//! A [`TiledSurface`] covers a large virtual canvas with a grid of tiles whose
//! size depends on the zoom scale. Tiles are produced asynchronously by a
//! [`TileProducer`]; redraws draw whatever is ready and, once a missing tile
//! arrives, only that tile's rectangle is invalidated.

pub mod core;
pub mod prelude;
pub mod rendering;
pub mod runtime;
pub mod surface;
pub mod tiles;
pub mod traits;
pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    bounds::Bounds,
    config::{ProductionConfig, TilingConfig, TilingProfile},
    geo::{Point, Size, TileKey},
    viewport::VisibleRegion,
};

pub use tiles::{
    grid::{enclosing_tile_range, lod_for_scale, tile_rect, tile_size_at_lod, TileRange},
    producer::{TileProducer, TileState},
    source::{SolidColorSource, TileImage, TileSource},
    store::TileStore,
};

pub use surface::{RedrawOutcome, TiledSurface};

pub use rendering::{
    display_pass, DirtyRegion, DisplayPass, DrawCommand, PixelCanvas, RenderContext,
};

pub use traits::{Invalidator, ProductionScheduler, SurfaceHost, TileRasterizer, TileReadyListener};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum TileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Error type alias for convenience
pub type Error = TileError;

/// Install `env_logger` as the log backend, honouring `RUST_LOG`.
///
/// Returns `false` when a logger was already installed.
#[cfg(feature = "debug")]
pub fn init_logging() -> bool {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init()
        .is_ok()
}
