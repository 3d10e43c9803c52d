//! Loyalty
//!
//! Stamp-card loyalty: one stamp per qualifying visit, and a completed cycle
//! redeems a fixed reward voucher.

use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::vouchers::Voucher;

/// Reward granted for a completed cycle, in minor units (RM20.00).
pub const CYCLE_REWARD_MINOR: i64 = 2000;

/// Stamps needed to complete a cycle.
pub const DEFAULT_CYCLE_LENGTH: u32 = 10;

/// Errors from stamp-card operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoyaltyError {
    /// The cycle is not complete yet (stamps collected, stamps needed).
    #[error("cycle incomplete: {0} of {1} stamps collected")]
    CycleIncomplete(u32, u32),
}

/// A customer's stamp card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StampCard {
    stamps: u32,
    cycle_length: u32,
}

impl Default for StampCard {
    fn default() -> Self {
        Self::new(DEFAULT_CYCLE_LENGTH)
    }
}

impl StampCard {
    /// Create an empty card with the given cycle length. A length of 0 is
    /// treated as 1.
    pub fn new(cycle_length: u32) -> Self {
        Self {
            stamps: 0,
            cycle_length: cycle_length.max(1),
        }
    }

    /// Stamps collected so far in the current cycle.
    pub fn stamps(&self) -> u32 {
        self.stamps
    }

    /// Stamps needed to complete a cycle.
    pub fn cycle_length(&self) -> u32 {
        self.cycle_length
    }

    /// Record a qualifying visit. Stamps cap at the cycle length until the
    /// reward is redeemed.
    pub fn record_visit(&mut self) {
        self.stamps = self.stamps.saturating_add(1).min(self.cycle_length);
    }

    /// Whether the cycle is complete and a reward can be redeemed.
    pub fn reward_ready(&self) -> bool {
        self.stamps >= self.cycle_length
    }

    /// Redeem the completed cycle for a reward voucher, resetting the card.
    ///
    /// # Errors
    ///
    /// Returns [`LoyaltyError::CycleIncomplete`] if the cycle is not complete.
    pub fn redeem(&mut self, currency: &'static Currency) -> Result<Voucher<'static>, LoyaltyError> {
        if !self.reward_ready() {
            return Err(LoyaltyError::CycleIncomplete(self.stamps, self.cycle_length));
        }

        self.stamps = 0;

        Ok(Voucher::FixedOff {
            amount: Money::from_minor(CYCLE_REWARD_MINOR, currency),
            min_order: None,
        })
    }
}
