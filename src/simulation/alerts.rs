//! Per-tick payment alerts

use std::fmt;

use serde::Serialize;

use super::types::VehicleId;

/// Snapshot of one toll charge, never mutated after it is logged
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AlertRecord {
    pub tick: u32,
    pub vehicle_id: VehicleId,
    pub toll: f64,
    pub balance: f64,
}

impl fmt::Display for AlertRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Vehicle {}: Toll = {:.2}, Remaining Balance = {:.2}",
            self.vehicle_id, self.toll, self.balance
        )
    }
}

/// Append-only log of alerts in the order they were charged
#[derive(Debug, Clone, Default, Serialize)]
pub struct AlertLog {
    records: Vec<AlertRecord>,
}

impl AlertLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: AlertRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[AlertRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn for_vehicle(&self, vehicle_id: VehicleId) -> impl Iterator<Item = &AlertRecord> {
        self.records
            .iter()
            .filter(move |record| record.vehicle_id == vehicle_id)
    }

    /// All alerts joined one per line
    pub fn render(&self) -> String {
        self.records
            .iter()
            .map(|record| record.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
