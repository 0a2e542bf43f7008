//! Run configuration: horizon, speed, zone buffer and category multipliers
//!
//! Every field has a default so a config file only needs the values it
//! changes.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::{
    VehicleCategory, DEFAULT_BUFFER_RADIUS, DEFAULT_HORIZON_TICKS, DEFAULT_QUAD_SEGS,
    DEFAULT_SPEED_KM_PER_TICK,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("speed must be positive, got {0} km per tick")]
    InvalidSpeed(f64),

    #[error("buffer radius must be positive, got {0}")]
    InvalidBufferRadius(f64),

    #[error("quad_segs must be at least 1")]
    InvalidQuadSegs,

    #[error("multiplier for {category} must be non-negative, got {value}")]
    InvalidMultiplier {
        category: VehicleCategory,
        value: f64,
    },
}

/// Toll multiplier applied per vehicle category
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryMultipliers {
    pub truck: f64,
    pub motorcycle: f64,
    pub car: f64,
    pub other: f64,
}

impl Default for CategoryMultipliers {
    fn default() -> Self {
        Self {
            truck: 50.0,
            motorcycle: 80.0,
            car: 60.0,
            other: 1.0,
        }
    }
}

impl CategoryMultipliers {
    pub fn for_category(&self, category: VehicleCategory) -> f64 {
        match category {
            VehicleCategory::Truck => self.truck,
            VehicleCategory::Motorcycle => self.motorcycle,
            VehicleCategory::Car => self.car,
            VehicleCategory::Other => self.other,
        }
    }
}

/// Settings for one simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Maximum number of ticks to run
    pub horizon_ticks: u32,
    /// Distance a vehicle covers each tick
    pub speed_km_per_tick: f64,
    /// Radius every zone center is buffered by
    pub buffer_radius: f64,
    /// Segments per quarter circle of a buffered zone
    pub quad_segs: u32,
    pub multipliers: CategoryMultipliers,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            horizon_ticks: DEFAULT_HORIZON_TICKS,
            speed_km_per_tick: DEFAULT_SPEED_KM_PER_TICK,
            buffer_radius: DEFAULT_BUFFER_RADIUS,
            quad_segs: DEFAULT_QUAD_SEGS,
            multipliers: CategoryMultipliers::default(),
        }
    }
}

impl SimConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.speed_km_per_tick.is_finite() || self.speed_km_per_tick <= 0.0 {
            return Err(ConfigError::InvalidSpeed(self.speed_km_per_tick));
        }
        if !self.buffer_radius.is_finite() || self.buffer_radius <= 0.0 {
            return Err(ConfigError::InvalidBufferRadius(self.buffer_radius));
        }
        if self.quad_segs == 0 {
            return Err(ConfigError::InvalidQuadSegs);
        }
        for category in VehicleCategory::ALL {
            let value = self.multipliers.for_category(category);
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidMultiplier { category, value });
            }
        }
        Ok(())
    }
}
