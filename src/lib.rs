//! GPS Toll Simulation Library
//!
//! A discrete-tick simulation of vehicles accruing distance-based tolls in
//! geofenced zones, debited from prepaid user balances.

pub mod simulation;
