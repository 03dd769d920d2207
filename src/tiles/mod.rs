pub mod grid;
pub mod producer;
pub mod scheduler;
pub mod source;
pub mod store;

// Re-exports for convenience
pub use grid::{
    enclosing_tile_range, lod_for_scale, lod_scale, tile_rect, tile_size_at_lod, TileRange,
};
pub use producer::{TileProducer, TileState};
pub use scheduler::{default_scheduler, ManualScheduler, ThreadScheduler};
#[cfg(feature = "tokio-runtime")]
pub use scheduler::RuntimeScheduler;
pub use source::{SolidColorSource, TileImage, TileSource};
pub use store::TileStore;
