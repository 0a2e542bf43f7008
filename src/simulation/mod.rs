//! Toll simulation core
//!
//! Vehicles drive straight routes through buffered toll zones. Every tick each
//! moving vehicle advances, is charged for the zones its route crosses, and the
//! charge is debited from its user's prepaid balance and logged as an alert.

mod alerts;
mod config;
mod geometry;
mod report;
mod toll_zone;
mod types;
mod user;
mod vehicle;
mod world;

pub use alerts::{AlertLog, AlertRecord};
pub use config::{CategoryMultipliers, ConfigError, SimConfig};
pub use geometry::{GeometryError, LineSegment, Polygon, Route};
pub use report::{ReportTotals, SimulationReport, SummaryRecord};
pub use toll_zone::{TollRegistry, TollZone, ZoneError};
pub use types::{
    Position, UserId, VehicleCategory, VehicleId, ZoneId, DEFAULT_BUFFER_RADIUS,
    DEFAULT_HORIZON_TICKS, DEFAULT_QUAD_SEGS, DEFAULT_SPEED_KM_PER_TICK,
};
pub use user::{LedgerError, User};
pub use vehicle::{SimVehicle, VehicleError, VehicleState, VehicleUpdateResult};
pub use world::{
    default_zone_centers, RunOutcome, SimWorld, StopReason, VehicleMarker, ZoneMarker,
};
