//! Core constants for the reference tiling setup.
//! Keeping them in a single place makes it easier to tweak engine-wide magic numbers.

/// Base square tile size in device pixels (tile side at scale 1.0).
pub const BASE_TILE_SIZE: f64 = 400.0;

/// Side of the laid-out reference surface in surface-local units.
pub const DEFAULT_SURFACE_SIZE: f64 = 2000.0;

/// Lower bound of the randomized production delay, in milliseconds.
pub const MIN_PRODUCTION_DELAY_MS: u64 = 200;

/// Upper bound (inclusive) of the randomized production delay, in milliseconds.
pub const MAX_PRODUCTION_DELAY_MS: u64 = 1000;

/// Largest zoom scale the reference scroll surface allows.
pub const MAX_ZOOM_SCALE: f64 = 500.0;

/// Side of the pixel buffer produced for a reference tile.
pub const TILE_IMAGE_SIDE: u32 = 1;
