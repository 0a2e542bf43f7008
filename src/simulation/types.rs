//! Core types for the toll simulation
//!
//! Identifiers, the 2D position type and the closed set of vehicle categories.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A wrapper type for toll zone IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ZoneId(pub u32);

/// A wrapper type for user IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub u32);

/// A wrapper type for vehicle IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VehicleId(pub u32);

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A 2D position in the simulation (longitude, latitude)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn lerp(&self, other: &Position, t: f64) -> Position {
        Position {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }
}

/// Category of the vehicle a user drives
///
/// Unrecognised category names deserialize to `Other` so a scenario with an
/// unexpected label still runs at the base rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleCategory {
    Truck,
    Motorcycle,
    Car,
    #[serde(other)]
    Other,
}

impl VehicleCategory {
    pub const ALL: [VehicleCategory; 4] = [
        VehicleCategory::Truck,
        VehicleCategory::Motorcycle,
        VehicleCategory::Car,
        VehicleCategory::Other,
    ];

    /// Parse a category label, falling back to `Other` for anything unknown
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "truck" => VehicleCategory::Truck,
            "motorcycle" => VehicleCategory::Motorcycle,
            "car" => VehicleCategory::Car,
            _ => VehicleCategory::Other,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            VehicleCategory::Truck => "truck",
            VehicleCategory::Motorcycle => "motorcycle",
            VehicleCategory::Car => "car",
            VehicleCategory::Other => "other",
        }
    }
}

impl fmt::Display for VehicleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// Default distance covered per tick: 60 km/h over one-minute ticks
pub const DEFAULT_SPEED_KM_PER_TICK: f64 = 60.0 / 60.0;

/// Default number of ticks in a run
pub const DEFAULT_HORIZON_TICKS: u32 = 100;

/// Default radius used to buffer every zone center
pub const DEFAULT_BUFFER_RADIUS: f64 = 0.01;

/// Segments per quarter circle when approximating a buffered zone
pub const DEFAULT_QUAD_SEGS: u32 = 16;

/// Tolerance below which a length is treated as zero
pub const GEOMETRY_EPSILON: f64 = 1e-12;

/// Relative tolerance for a vehicle reaching its target distance
pub const DISTANCE_EPSILON: f64 = 1e-9;
