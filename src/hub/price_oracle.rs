//! Price oracle interface and a fixed-price reference oracle
//!
//! The hub only needs the price of one collateral unit quoted in loan
//! token units, scaled by 1e36. An oracle must revert instead of answering
//! with a zero or stale price.

use odra::prelude::*;
use odra::casper_types::U256;
use super::errors::OracleError;
use super::events::PriceUpdated;

/// Interface id an oracle acknowledges in `supports_interface`
pub const ORACLE_INTERFACE_ID: u32 = 0x6f72_6163;

/// Price source consumed by the hub
#[odra::external_contract]
pub trait PriceOracle {
    /// True for [`ORACLE_INTERFACE_ID`]
    fn supports_interface(&self, interface_id: u32) -> bool;

    /// Collateral price in loan token, scaled by 1e36
    fn price(&self) -> U256;
}

/// Oracle whose price is pushed by an admin
#[odra::module]
pub struct FixedPriceOracle {
    /// Current price (1e36 scale)
    price: Var<U256>,
    /// Block time of the last update (ms)
    last_update: Var<u64>,
    /// Maximum price age in seconds, 0 disables the check
    max_staleness: Var<u64>,
    /// Admin address
    admin: Var<Address>,
}

#[odra::module]
impl FixedPriceOracle {
    /// Initialize the oracle with the caller as admin
    pub fn init(&mut self, max_staleness: u64) {
        let caller = self.env().caller();
        self.admin.set(caller);
        self.max_staleness.set(max_staleness);
    }

    /// Answers the hub's capability probe
    pub fn supports_interface(&self, interface_id: u32) -> bool {
        interface_id == ORACLE_INTERFACE_ID
    }

    /// Set the price (admin only)
    pub fn set_price(&mut self, price: U256) {
        self.only_admin();

        if price.is_zero() {
            self.env().revert(OracleError::InvalidPrice);
        }

        let timestamp = self.env().get_block_time();
        self.price.set(price);
        self.last_update.set(timestamp);

        self.env().emit_event(PriceUpdated { price, timestamp });
    }

    /// Current price, reverting if it was never set or has gone stale
    pub fn price(&self) -> U256 {
        let price = self.price.get_or_default();
        if price.is_zero() {
            self.env().revert(OracleError::PriceNotSet);
        }

        let max_staleness = self.max_staleness.get_or_default();
        if max_staleness > 0 {
            let age = self.env().get_block_time().saturating_sub(self.last_update.get_or_default()) / 1000;
            if age > max_staleness {
                self.env().revert(OracleError::StalePrice);
            }
        }

        price
    }

    /// Update max staleness period in seconds (admin only)
    pub fn set_max_staleness(&mut self, seconds: u64) {
        self.only_admin();
        self.max_staleness.set(seconds);
    }

    /// Get admin address
    pub fn get_admin(&self) -> Address {
        self.admin.get_or_revert_with(OracleError::NotAdmin)
    }

    fn only_admin(&self) {
        let caller = self.env().caller();
        let admin = self.admin.get_or_revert_with(OracleError::NotAdmin);
        if caller != admin {
            self.env().revert(OracleError::NotAdmin);
        }
    }
}
