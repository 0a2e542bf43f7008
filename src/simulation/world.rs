//! Main simulation world that ties everything together
//!
//! `SimWorld` owns the zone registry, the user ledger, the vehicles and the
//! alert log, and drives every vehicle forward one tick at a time.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use super::alerts::AlertLog;
use super::config::SimConfig;
use super::geometry::Route;
use super::report::SimulationReport;
use super::toll_zone::TollRegistry;
use super::types::{Position, UserId, VehicleCategory, VehicleId, ZoneId};
use super::user::{LedgerError, User};
use super::vehicle::{SimVehicle, VehicleUpdateResult};

/// Why a run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StopReason {
    /// Every vehicle finished its trip
    AllCompleted,
    /// The configured number of ticks ran out
    HorizonReached,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunOutcome {
    pub reason: StopReason,
    pub ticks_run: u32,
}

/// Zone location for map markers
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ZoneMarker {
    pub id: ZoneId,
    pub position: Position,
    pub rate_per_km: f64,
}

/// Vehicle route endpoints for map markers
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VehicleMarker {
    pub id: VehicleId,
    pub start: Position,
    pub end: Position,
    pub category: VehicleCategory,
}

/// The main simulation world
pub struct SimWorld {
    pub config: SimConfig,

    /// Toll zones, fixed for the whole run
    registry: TollRegistry,

    /// User accounts by id
    users: BTreeMap<UserId, User>,

    /// Vehicles by id; iteration order is the tick order
    vehicles: BTreeMap<VehicleId, SimVehicle>,

    /// Every charge made so far
    alerts: AlertLog,

    /// Ticks executed so far
    tick: u32,
}

impl SimWorld {
    pub fn new(config: SimConfig, registry: TollRegistry) -> Result<Self> {
        config.validate().context("Invalid simulation config")?;
        Ok(Self {
            config,
            registry,
            users: BTreeMap::new(),
            vehicles: BTreeMap::new(),
            alerts: AlertLog::new(),
            tick: 0,
        })
    }

    /// Build a world whose zones are the given centers buffered by the configured radius
    pub fn with_zone_centers(config: SimConfig, centers: &[(ZoneId, Position, f64)]) -> Result<Self> {
        let registry = TollRegistry::buffered(centers, config.buffer_radius, config.quad_segs)
            .context("Invalid toll zone")?;
        Self::new(config, registry)
    }

    pub fn add_user(&mut self, user: User) -> Result<UserId, LedgerError> {
        let id = user.id;
        if self.users.contains_key(&id) {
            return Err(LedgerError::DuplicateUser(id));
        }
        self.users.insert(id, user);
        Ok(id)
    }

    /// Add a vehicle driving from `start` to `end` for `user_id`
    pub fn add_vehicle(
        &mut self,
        id: VehicleId,
        start: Position,
        end: Position,
        user_id: UserId,
    ) -> Result<VehicleId> {
        if !self.users.contains_key(&user_id) {
            return Err(LedgerError::UnknownUser(user_id).into());
        }
        if self.vehicles.contains_key(&id) {
            anyhow::bail!("Vehicle {} already exists", id);
        }
        if let Some(other) = self.vehicles.values().find(|v| v.user_id == user_id) {
            anyhow::bail!("User {} is already bound to vehicle {}", user_id, other.id);
        }

        let route = Route::new(start, end).context("Invalid vehicle route")?;
        if route.is_degenerate() {
            warn!("Vehicle {} has a zero-length route", id);
        }

        let vehicle = SimVehicle::new(id, user_id, route, self.config.speed_km_per_tick)?;
        self.vehicles.insert(id, vehicle);
        Ok(id)
    }

    pub fn registry(&self) -> &TollRegistry {
        &self.registry
    }

    pub fn alerts(&self) -> &AlertLog {
        &self.alerts
    }

    pub fn user(&self, id: UserId) -> Option<&User> {
        self.users.get(&id)
    }

    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    pub fn vehicle(&self, id: VehicleId) -> Option<&SimVehicle> {
        self.vehicles.get(&id)
    }

    /// Vehicles in ascending id order
    pub fn vehicles(&self) -> impl Iterator<Item = &SimVehicle> {
        self.vehicles.values()
    }

    pub fn current_tick(&self) -> u32 {
        self.tick
    }

    pub fn all_completed(&self) -> bool {
        self.vehicles.values().all(|v| v.is_completed())
    }

    pub fn zone_markers(&self) -> Vec<ZoneMarker> {
        self.registry
            .iter()
            .map(|zone| ZoneMarker {
                id: zone.id,
                position: zone.area().centroid(),
                rate_per_km: zone.rate_per_km,
            })
            .collect()
    }

    pub fn vehicle_markers(&self) -> Vec<VehicleMarker> {
        self.vehicles
            .values()
            .map(|vehicle| VehicleMarker {
                id: vehicle.id,
                start: vehicle.route.start,
                end: vehicle.route.end,
                category: self
                    .users
                    .get(&vehicle.user_id)
                    .map(|user| user.category)
                    .unwrap_or(VehicleCategory::Other),
            })
            .collect()
    }

    /// Put every pending vehicle on the road
    pub fn start(&mut self) {
        for vehicle in self.vehicles.values_mut() {
            match self.users.get(&vehicle.user_id) {
                Some(user) => vehicle.start(user),
                None => warn!("Vehicle {} has no user, leaving it parked", vehicle.id),
            }
        }
    }

    /// Run one tick for every moving vehicle in id order
    ///
    /// Returns the number of vehicles that moved.
    pub fn tick(&mut self) -> usize {
        self.tick += 1;
        let tick = self.tick;
        let mut moved = 0;

        for vehicle in self.vehicles.values_mut() {
            if !vehicle.is_moving() {
                continue;
            }
            let Some(user) = self.users.get_mut(&vehicle.user_id) else {
                warn!("Vehicle {} lost its user {}", vehicle.id, vehicle.user_id);
                continue;
            };

            let result = vehicle.update(
                tick,
                &self.registry,
                user,
                &self.config.multipliers,
                &mut self.alerts,
            );
            match result {
                VehicleUpdateResult::Idle => {}
                VehicleUpdateResult::Continue { .. } => moved += 1,
                VehicleUpdateResult::Completed { toll } => {
                    moved += 1;
                    debug!(
                        "Vehicle {} completed its trip on tick {} (last toll {:.2})",
                        vehicle.id, tick, toll
                    );
                }
            }
        }

        moved
    }

    /// Start every vehicle and tick until all finish or the horizon is reached
    pub fn run(&mut self) -> RunOutcome {
        info!(
            "Starting toll simulation: {} zones, {} users, {} vehicles, horizon {} ticks",
            self.registry.len(),
            self.users.len(),
            self.vehicles.len(),
            self.config.horizon_ticks
        );

        self.start();
        let first_tick = self.tick;

        while self.tick - first_tick < self.config.horizon_ticks && !self.all_completed() {
            self.tick();
        }

        let reason = if self.all_completed() {
            StopReason::AllCompleted
        } else {
            StopReason::HorizonReached
        };
        let outcome = RunOutcome {
            reason,
            ticks_run: self.tick - first_tick,
        };

        info!("=== SIMULATION COMPLETE ===");
        info!("Ticks run: {}", outcome.ticks_run);
        info!("Stop reason: {:?}", outcome.reason);
        info!("Alerts issued: {}", self.alerts.len());
        info!(
            "Total toll collected: {:.2}",
            self.vehicles.values().map(|v| v.toll_incurred).sum::<f64>()
        );

        outcome
    }

    /// Final per-vehicle records
    pub fn report(&self) -> SimulationReport {
        SimulationReport::from_world(self)
    }

    /// Create the default world with the default config
    pub fn create_default_world() -> Result<Self> {
        Self::create_default_world_with_config(SimConfig::default())
    }

    /// Four zones around central Bengaluru with three users and their vehicles
    pub fn create_default_world_with_config(config: SimConfig) -> Result<Self> {
        let mut world = Self::with_zone_centers(config, &default_zone_centers())?;

        let users = [
            (1, 5000.0, VehicleCategory::Truck, 5.0),
            (2, 6000.0, VehicleCategory::Motorcycle, 8.5),
            (3, 7000.0, VehicleCategory::Car, 6.2),
        ];
        for (id, balance, category, distance) in users {
            let user = User::new(UserId(id), balance, category, distance)?;
            world.add_user(user)?;
        }

        let vehicles = [
            (1, (77.5806, 12.9721), (77.5946, 12.9781), 1),
            (2, (77.5900, 12.9723), (77.5899, 12.9716), 2),
            (3, (77.5950, 12.9700), (77.5920, 12.9740), 3),
        ];
        for (id, (sx, sy), (ex, ey), user) in vehicles {
            world.add_vehicle(
                VehicleId(id),
                Position::new(sx, sy),
                Position::new(ex, ey),
                UserId(user),
            )?;
        }

        Ok(world)
    }

    /// Default zones plus `vehicle_count` randomly placed users and vehicles
    ///
    /// The same seed always produces the same world.
    pub fn create_random_world(config: SimConfig, seed: u64, vehicle_count: u32) -> Result<Self> {
        let mut world = Self::with_zone_centers(config, &default_zone_centers())?;
        let mut rng = StdRng::seed_from_u64(seed);

        let (min, max) = zone_bounds(&world.registry, world.config.buffer_radius * 2.0);

        for i in 1..=vehicle_count {
            let category = *VehicleCategory::ALL
                .choose(&mut rng)
                .context("No vehicle categories")?;
            let balance = rng.random_range(1000.0..10000.0_f64).round();
            let distance = (rng.random_range(1.0..10.0_f64) * 10.0).round() / 10.0;
            let user = User::new(UserId(i), balance, category, distance)?;
            world.add_user(user)?;

            let start = Position::new(rng.random_range(min.x..max.x), rng.random_range(min.y..max.y));
            let end = Position::new(rng.random_range(min.x..max.x), rng.random_range(min.y..max.y));
            world.add_vehicle(VehicleId(i), start, end, UserId(i))?;
        }

        debug!("Generated {} random vehicles from seed {}", vehicle_count, seed);
        Ok(world)
    }

    /// Print a summary of the world state
    pub fn print_summary(&self) {
        println!("=== Toll Simulation Summary ===");
        println!("Tick: {}", self.tick);
        println!(
            "Zones: {}, Users: {}, Vehicles: {}",
            self.registry.len(),
            self.users.len(),
            self.vehicles.len()
        );
        println!();

        println!("--- Toll Zones ---");
        for marker in self.zone_markers() {
            println!(
                "  Zone {}: center=({:.4}, {:.4}), rate={:.2}/km",
                marker.id, marker.position.x, marker.position.y, marker.rate_per_km
            );
        }

        println!("--- Vehicles ---");
        for vehicle in self.vehicles.values() {
            let balance = self
                .users
                .get(&vehicle.user_id)
                .map(|user| user.balance())
                .unwrap_or_default();
            println!(
                "  Vehicle {}: state={:?}, distance={:.2} km, toll={:.2}, balance={:.2}, position=({:.4}, {:.4})",
                vehicle.id,
                vehicle.state,
                vehicle.distance_traveled.into_inner(),
                vehicle.toll_incurred,
                balance,
                vehicle.position.x,
                vehicle.position.y
            );
        }
    }
}

/// The four zones of the default world: (id, center, rate per km)
pub fn default_zone_centers() -> Vec<(ZoneId, Position, f64)> {
    vec![
        (ZoneId(1), Position::new(77.5899, 12.9716), 5.0),
        (ZoneId(2), Position::new(77.5946, 12.9781), 7.0),
        (ZoneId(3), Position::new(77.5800, 12.9750), 6.0),
        (ZoneId(4), Position::new(77.5850, 12.9680), 8.0),
    ]
}

/// Bounding box of all zone centers grown by `padding`
fn zone_bounds(registry: &TollRegistry, padding: f64) -> (Position, Position) {
    let mut min = Position::new(f64::INFINITY, f64::INFINITY);
    let mut max = Position::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
    for zone in registry.iter() {
        min.x = min.x.min(zone.center.x);
        min.y = min.y.min(zone.center.y);
        max.x = max.x.max(zone.center.x);
        max.y = max.y.max(zone.center.y);
    }
    if registry.is_empty() {
        return (Position::new(-padding, -padding), Position::new(padding, padding));
    }
    (
        Position::new(min.x - padding, min.y - padding),
        Position::new(max.x + padding, max.y + padding),
    )
}
