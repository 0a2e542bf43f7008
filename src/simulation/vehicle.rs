//! Vehicle movement and toll accrual
//!
//! Each vehicle is a small state machine advanced once per tick by the world.

use log::debug;
use ordered_float::OrderedFloat;
use serde::Serialize;
use thiserror::Error;

use super::alerts::{AlertLog, AlertRecord};
use super::config::CategoryMultipliers;
use super::geometry::Route;
use super::toll_zone::TollRegistry;
use super::types::{Position, UserId, VehicleId, DISTANCE_EPSILON};
use super::user::User;

/// Vehicle rejected at construction
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VehicleError {
    #[error("vehicle {vehicle} has an invalid speed {speed} per tick")]
    InvalidSpeed { vehicle: VehicleId, speed: f64 },
}

/// Lifecycle of a vehicle's trip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VehicleState {
    /// Constructed, not yet started
    Pending,
    /// Advancing every tick
    Moving,
    /// Reached the user's target distance
    Completed,
}

/// Result of a vehicle update
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VehicleUpdateResult {
    /// Vehicle was not moving; nothing happened
    Idle,
    /// Vehicle moved and will keep moving
    Continue { toll: f64 },
    /// Vehicle moved and finished its trip on this tick
    Completed { toll: f64 },
}

/// A vehicle driving a straight route on behalf of one user
#[derive(Debug, Clone)]
pub struct SimVehicle {
    pub id: VehicleId,
    pub user_id: UserId,
    pub route: Route,
    /// Distance covered each tick
    pub speed: f64,
    pub distance_traveled: OrderedFloat<f64>,
    pub toll_incurred: f64,
    pub position: Position,
    pub state: VehicleState,
    pub ticks_applied: u32,
}

impl SimVehicle {
    /// Speed must be finite and positive
    pub fn new(
        id: VehicleId,
        user_id: UserId,
        route: Route,
        speed: f64,
    ) -> Result<Self, VehicleError> {
        if !speed.is_finite() || speed <= 0.0 {
            return Err(VehicleError::InvalidSpeed { vehicle: id, speed });
        }
        Ok(Self {
            id,
            user_id,
            route,
            speed,
            distance_traveled: OrderedFloat(0.0),
            toll_incurred: 0.0,
            position: route.start,
            state: VehicleState::Pending,
            ticks_applied: 0,
        })
    }

    /// Put a pending vehicle on the road
    ///
    /// A user with no distance to drive completes immediately without being charged.
    pub fn start(&mut self, user: &User) {
        if self.state != VehicleState::Pending {
            return;
        }
        self.state = if user.target_distance > 0.0 {
            VehicleState::Moving
        } else {
            VehicleState::Completed
        };
    }

    pub fn is_moving(&self) -> bool {
        self.state == VehicleState::Moving
    }

    pub fn is_completed(&self) -> bool {
        self.state == VehicleState::Completed
    }

    /// Toll for one tick: the whole route's in-zone charge scaled by the user's category
    pub fn calculate_toll(
        &self,
        registry: &TollRegistry,
        user: &User,
        multipliers: &CategoryMultipliers,
    ) -> f64 {
        if self.route.is_degenerate() {
            return 0.0;
        }
        registry.raw_toll(&self.route) * multipliers.for_category(user.category)
    }

    /// Advance one tick, charge the user and log the alert
    pub fn update(
        &mut self,
        tick: u32,
        registry: &TollRegistry,
        user: &mut User,
        multipliers: &CategoryMultipliers,
        alerts: &mut AlertLog,
    ) -> VehicleUpdateResult {
        if self.state != VehicleState::Moving {
            return VehicleUpdateResult::Idle;
        }

        let target = OrderedFloat(user.target_distance);

        if self.route.is_degenerate() {
            // Nowhere to go: stay at the start and finish on this tick
            self.position = self.route.start;
        } else {
            // Multiply rather than accumulate so decimal speeds land on the target
            let mut next = OrderedFloat(f64::from(self.ticks_applied + 1) * self.speed);
            let tolerance = DISTANCE_EPSILON * target.into_inner().max(1.0);
            if next.into_inner() >= target.into_inner() - tolerance {
                next = target;
            }
            self.distance_traveled = next;
            self.position = self
                .route
                .interpolate(next.into_inner() / self.route.length());
        }

        let toll = self.calculate_toll(registry, user, multipliers);
        let balance = user.debit(toll);
        self.toll_incurred += toll;
        self.ticks_applied += 1;

        alerts.push(AlertRecord {
            tick,
            vehicle_id: self.id,
            toll,
            balance,
        });

        debug!(
            "Vehicle {}: Distance Traveled = {:.2} km, Toll = {:.2}, User Balance = {:.2}",
            self.id,
            self.distance_traveled.into_inner(),
            toll,
            balance
        );

        if self.route.is_degenerate() || self.distance_traveled >= target {
            self.state = VehicleState::Completed;
            VehicleUpdateResult::Completed { toll }
        } else {
            VehicleUpdateResult::Continue { toll }
        }
    }
}
