//! Prelude module for common tilelet types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use tilelet::prelude::*;`

pub use crate::core::{
    bounds::Bounds,
    config::{ProductionConfig, TilingConfig, TilingProfile},
    geo::{Point, Size, TileKey},
    viewport::VisibleRegion,
};

pub use crate::tiles::{
    grid::{enclosing_tile_range, lod_for_scale, lod_scale, tile_rect, tile_size_at_lod, TileRange},
    producer::{TileProducer, TileState},
    scheduler::{default_scheduler, ManualScheduler, ThreadScheduler},
    source::{SolidColorSource, TileImage, TileSource},
    store::TileStore,
};

#[cfg(feature = "tokio-runtime")]
pub use crate::tiles::scheduler::RuntimeScheduler;

pub use crate::surface::{RedrawOutcome, TiledSurface};

pub use crate::rendering::{
    display_pass, DirtyRegion, DisplayPass, DrawCommand, PixelCanvas, RenderContext,
};

pub use crate::traits::{
    Invalidator, ProductionJob, ProductionScheduler, SurfaceHost, TileRasterizer, TileReadyListener,
};

pub use crate::{Result, TileError};

// Re-export common external types
pub use std::sync::Arc;
pub use std::time::{Duration, Instant};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};

// Async support
pub use futures::Future;
pub use std::pin::Pin;
