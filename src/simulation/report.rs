//! Final per-vehicle results of a run

use ordered_float::OrderedFloat;
use serde::Serialize;

use super::types::{UserId, VehicleCategory, VehicleId};
use super::world::SimWorld;

/// Outcome of one vehicle's trip
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SummaryRecord {
    pub vehicle_id: VehicleId,
    pub user_id: UserId,
    pub category: VehicleCategory,
    pub distance_traveled: f64,
    pub toll_incurred: f64,
    pub final_balance: f64,
}

/// Aggregate figures across all vehicles
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ReportTotals {
    pub vehicles: usize,
    pub distance_traveled: f64,
    pub toll_incurred: f64,
}

/// One summary per vehicle, in vehicle id order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SimulationReport {
    records: Vec<SummaryRecord>,
}

impl SimulationReport {
    pub fn from_world(world: &SimWorld) -> Self {
        let records = world
            .vehicles()
            .map(|vehicle| {
                let user = world.user(vehicle.user_id);
                SummaryRecord {
                    vehicle_id: vehicle.id,
                    user_id: vehicle.user_id,
                    category: user.map(|u| u.category).unwrap_or(VehicleCategory::Other),
                    distance_traveled: vehicle.distance_traveled.into_inner(),
                    toll_incurred: vehicle.toll_incurred,
                    final_balance: user.map(|u| u.balance()).unwrap_or_default(),
                }
            })
            .collect();
        Self { records }
    }

    pub fn records(&self) -> &[SummaryRecord] {
        &self.records
    }

    pub fn get(&self, vehicle_id: VehicleId) -> Option<&SummaryRecord> {
        self.records.iter().find(|r| r.vehicle_id == vehicle_id)
    }

    pub fn totals(&self) -> ReportTotals {
        self.records
            .iter()
            .fold(ReportTotals::default(), |mut totals, record| {
                totals.vehicles += 1;
                totals.distance_traveled += record.distance_traveled;
                totals.toll_incurred += record.toll_incurred;
                totals
            })
    }

    /// The vehicle charged the most; ties go to the lowest id
    pub fn highest_toll(&self) -> Option<&SummaryRecord> {
        self.records
            .iter()
            .rev()
            .max_by_key(|record| OrderedFloat(record.toll_incurred))
    }

    /// Fixed-width table of every record
    pub fn render_table(&self) -> String {
        let mut out = format!(
            "{:>10}  {:>10}  {:>18}  {:>14}  {:>17}\n",
            "Vehicle ID", "Category", "Distance Traveled", "Toll Incurred", "Remaining Balance"
        );
        for record in &self.records {
            out.push_str(&format!(
                "{:>10}  {:>10}  {:>18.2}  {:>14.2}  {:>17.2}\n",
                record.vehicle_id.0,
                record.category.label(),
                record.distance_traveled,
                record.toll_incurred,
                record.final_balance
            ));
        }
        out
    }
}
