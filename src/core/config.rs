//! Configuration for tiling geometry and tile production
//!
//! Settings come either from a preset profile or from a JSON document. Every
//! field has a default, so a config file only needs the values it overrides.

use crate::core::constants::{
    BASE_TILE_SIZE, DEFAULT_SURFACE_SIZE, MAX_PRODUCTION_DELAY_MS, MIN_PRODUCTION_DELAY_MS,
};
use crate::core::geo::Size;
use crate::{Result, TileError};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum TilingProfile {
    /// Reference behaviour: 400x400 tiles, 200..=1000 ms production latency
    Reference,
    /// Same geometry, production completes as soon as the scheduler runs it
    Instant,
    Custom(TilingConfig),
}

impl TilingProfile {
    pub fn resolve(&self) -> TilingConfig {
        match self {
            Self::Reference => TilingConfig::default(),
            Self::Instant => TilingConfig {
                production: ProductionConfig::immediate(),
                ..TilingConfig::default()
            },
            Self::Custom(config) => config.clone(),
        }
    }
}

impl Default for TilingProfile {
    fn default() -> Self {
        Self::Reference
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TilingConfig {
    /// Tile size in device pixels; the tile side at scale 1.0
    pub tile_size: Size,
    /// Laid-out surface size in surface-local units
    pub surface_size: Size,
    pub production: ProductionConfig,
}

impl TilingConfig {
    /// Instant production, handy for tests driven by a manual scheduler
    pub fn for_testing() -> Self {
        TilingProfile::Instant.resolve()
    }

    pub fn validate(&self) -> Result<()> {
        if self.tile_size.is_empty()
            || !self.tile_size.width.is_finite()
            || !self.tile_size.height.is_finite()
        {
            return Err(TileError::InvalidConfig(format!(
                "tile size must be positive and finite, got {}x{}",
                self.tile_size.width, self.tile_size.height
            ))
            .into());
        }

        // NaN fails every comparison, so finiteness is checked explicitly
        if !(self.surface_size.width.is_finite() && self.surface_size.height.is_finite())
            || self.surface_size.width < 0.0
            || self.surface_size.height < 0.0
        {
            return Err(TileError::InvalidConfig(format!(
                "surface size must be finite and not negative, got {}x{}",
                self.surface_size.width, self.surface_size.height
            ))
            .into());
        }

        self.production.validate()
    }

    /// Parses and validates a JSON config document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: TilingConfig = serde_json::from_str(json).map_err(TileError::from)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(TileError::from)?;
        Self::from_json_str(&contents)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self).map_err(TileError::from)?)
    }
}

impl Default for TilingConfig {
    fn default() -> Self {
        Self {
            tile_size: Size::square(BASE_TILE_SIZE),
            surface_size: Size::square(DEFAULT_SURFACE_SIZE),
            production: ProductionConfig::default(),
        }
    }
}

/// Latency model for tile production
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductionConfig {
    pub min_delay_ms: u64,
    /// Inclusive upper bound
    pub max_delay_ms: u64,
}

impl ProductionConfig {
    pub fn immediate() -> Self {
        Self {
            min_delay_ms: 0,
            max_delay_ms: 0,
        }
    }

    pub fn fixed(delay_ms: u64) -> Self {
        Self {
            min_delay_ms: delay_ms,
            max_delay_ms: delay_ms,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_delay_ms > self.max_delay_ms {
            return Err(TileError::InvalidConfig(format!(
                "production delay range is inverted: {}..={} ms",
                self.min_delay_ms, self.max_delay_ms
            ))
            .into());
        }
        Ok(())
    }

    /// Draws a delay uniformly from the configured range
    pub fn sample_delay(&self) -> Duration {
        let ms = if self.min_delay_ms >= self.max_delay_ms {
            self.min_delay_ms
        } else {
            rand::thread_rng().gen_range(self.min_delay_ms..=self.max_delay_ms)
        };
        Duration::from_millis(ms)
    }
}

impl Default for ProductionConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: MIN_PRODUCTION_DELAY_MS,
            max_delay_ms: MAX_PRODUCTION_DELAY_MS,
        }
    }
}
