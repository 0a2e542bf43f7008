//! Prepaid user accounts
//!
//! A user's balance is only ever debited by the vehicle bound to that user.
//! Balances may go negative; there is no floor.

use serde::Serialize;
use thiserror::Error;

use super::types::{UserId, VehicleCategory};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    #[error("user {user} has an invalid balance {balance}")]
    InvalidBalance { user: UserId, balance: f64 },

    #[error("user {user} has an invalid target distance {distance} km")]
    InvalidTargetDistance { user: UserId, distance: f64 },

    #[error("user {0} is defined more than once")]
    DuplicateUser(UserId),

    #[error("user {0} does not exist")]
    UnknownUser(UserId),
}

/// A prepaid account and the trip its vehicle should drive
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: UserId,
    pub category: VehicleCategory,
    /// Trip length in kilometers
    pub target_distance: f64,
    balance: f64,
    initial_balance: f64,
}

impl User {
    pub fn new(
        id: UserId,
        balance: f64,
        category: VehicleCategory,
        target_distance: f64,
    ) -> Result<Self, LedgerError> {
        if !balance.is_finite() {
            return Err(LedgerError::InvalidBalance { user: id, balance });
        }
        if !target_distance.is_finite() || target_distance < 0.0 {
            return Err(LedgerError::InvalidTargetDistance {
                user: id,
                distance: target_distance,
            });
        }
        Ok(Self {
            id,
            category,
            target_distance,
            balance,
            initial_balance: balance,
        })
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn initial_balance(&self) -> f64 {
        self.initial_balance
    }

    /// Total debited since the account was created
    pub fn total_debited(&self) -> f64 {
        self.initial_balance - self.balance
    }

    /// Remove `amount` from the balance and return the new balance
    pub fn debit(&mut self, amount: f64) -> f64 {
        self.balance -= amount;
        self.balance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debit_can_go_negative() {
        let mut user = User::new(UserId(1), 100.0, VehicleCategory::Car, 5.0).unwrap();
        assert_eq!(user.debit(60.0), 40.0);
        assert_eq!(user.debit(60.0), -20.0);
        assert_eq!(user.total_debited(), 120.0);
        assert_eq!(user.initial_balance(), 100.0);
    }

    #[test]
    fn test_invalid_target_distance() {
        assert_eq!(
            User::new(UserId(2), 10.0, VehicleCategory::Truck, -1.0),
            Err(LedgerError::InvalidTargetDistance {
                user: UserId(2),
                distance: -1.0
            })
        );
        assert!(User::new(UserId(2), 10.0, VehicleCategory::Truck, f64::NAN).is_err());
        assert!(User::new(UserId(2), f64::INFINITY, VehicleCategory::Truck, 1.0).is_err());
    }
}
