//! Interest rate model interface and reference models
//!
//! A model turns the current state of a market into a per-second borrow
//! rate (WAD). The hub calls it once per accrual.
//!
//! [`LinearRateModel`] is a two-slope utilization curve:
//! - Below optimal utilization: `base + utilization / optimal * slope1`
//! - Above optimal utilization: `base + slope1 + excess / (1 - optimal) * slope2`
//!
//! Curve parameters are annual rates; the result is divided by the number
//! of seconds in a year.

use odra::prelude::*;
use odra::casper_types::U256;
use super::errors::{HubError, RateModelError};
use super::events::RateUpdated;
use super::market::{Market, MarketParams};
use crate::math::{SafeMath, WadMath, SECONDS_PER_YEAR, WAD};

/// Interface id a rate model acknowledges in `supports_interface`
pub const IRM_INTERFACE_ID: u32 = 0x6972_6d31;

/// Highest annual borrow rate a model returns (1000%)
pub const MAX_ANNUAL_RATE: U256 = U256([10_000_000_000_000_000_000, 0, 0, 0]);

/// Rate model consumed by the hub
#[odra::external_contract]
pub trait InterestRateModel {
    /// True for [`IRM_INTERFACE_ID`]
    fn supports_interface(&self, interface_id: u32) -> bool;

    /// Per-second borrow rate (WAD) for `market`
    fn borrow_rate(&self, params: MarketParams, market: Market) -> U256;
}

/// Two-slope curve parameters (annual, WAD)
#[odra::odra_type]
pub struct RateCurve {
    /// Rate at zero utilization
    /// Example: 2% = 20000000000000000
    pub base_rate: U256,
    /// Target utilization, strictly between 0 and 1
    /// Example: 80% = 800000000000000000
    pub optimal_utilization: U256,
    /// Rate added between zero and optimal utilization
    pub slope1: U256,
    /// Rate added between optimal and full utilization
    pub slope2: U256,
}

impl RateCurve {
    /// Rejects curves whose optimal point is 0 or 100%
    pub fn validate(&self) -> Result<(), RateModelError> {
        if self.optimal_utilization.is_zero() || self.optimal_utilization >= WAD {
            return Err(RateModelError::InvalidParams);
        }
        Ok(())
    }

    /// Annual borrow rate at `utilization` (WAD), capped at [`MAX_ANNUAL_RATE`]
    pub fn annual_rate(&self, utilization: U256) -> Result<U256, HubError> {
        let utilization = SafeMath::min(utilization, WAD);
        let rate = if utilization <= self.optimal_utilization {
            let increase = WadMath::mul_div_down(utilization, self.slope1, self.optimal_utilization)?;
            SafeMath::add(self.base_rate, increase)?
        } else {
            let excess = utilization - self.optimal_utilization;
            let excess_rate = WadMath::mul_div_down(excess, self.slope2, WAD - self.optimal_utilization)?;
            SafeMath::add(SafeMath::add(self.base_rate, self.slope1)?, excess_rate)?
        };
        Ok(SafeMath::min(rate, MAX_ANNUAL_RATE))
    }

    /// Per-second borrow rate at `utilization`
    pub fn per_second_rate(&self, utilization: U256) -> Result<U256, HubError> {
        Ok(self.annual_rate(utilization)? / U256::from(SECONDS_PER_YEAR))
    }
}

/// Utilization-driven rate model
#[odra::module]
pub struct LinearRateModel {
    /// Curve parameters
    curve: Var<RateCurve>,
    /// Admin address
    admin: Var<Address>,
}

#[odra::module]
impl LinearRateModel {
    /// Initialize the model with the caller as admin
    pub fn init(&mut self, base_rate: U256, optimal_utilization: U256, slope1: U256, slope2: U256) {
        let caller = self.env().caller();
        self.admin.set(caller);
        self.store_curve(RateCurve {
            base_rate,
            optimal_utilization,
            slope1,
            slope2,
        });
    }

    /// Answers the hub's capability probe
    pub fn supports_interface(&self, interface_id: u32) -> bool {
        interface_id == IRM_INTERFACE_ID
    }

    /// Per-second borrow rate at the market's utilization
    // `params` names the runtime argument the hub sends
    #[allow(unused_variables)]
    pub fn borrow_rate(&self, params: MarketParams, market: Market) -> U256 {
        self.get_curve()
            .per_second_rate(market.utilization())
            .unwrap_or_revert(&self.env())
    }

    /// Get current curve parameters
    pub fn get_curve(&self) -> RateCurve {
        self.curve.get_or_revert_with(RateModelError::InvalidParams)
    }

    /// Replace the curve (admin only)
    pub fn update_curve(&mut self, base_rate: U256, optimal_utilization: U256, slope1: U256, slope2: U256) {
        self.only_admin();
        self.store_curve(RateCurve {
            base_rate,
            optimal_utilization,
            slope1,
            slope2,
        });
    }

    fn store_curve(&mut self, curve: RateCurve) {
        if let Err(error) = curve.validate() {
            self.env().revert(error);
        }
        let rate = curve.base_rate;
        self.curve.set(curve);
        self.env().emit_event(RateUpdated {
            rate,
            timestamp: self.env().get_block_time(),
        });
    }

    fn only_admin(&self) {
        let admin = self.admin.get_or_revert_with(RateModelError::NotAdmin);
        if self.env().caller() != admin {
            self.env().revert(RateModelError::NotAdmin);
        }
    }
}

/// Model returning a constant per-second rate
#[odra::module]
pub struct FixedRateModel {
    /// Per-second rate (WAD)
    rate: Var<U256>,
    /// Admin address
    admin: Var<Address>,
}

#[odra::module]
impl FixedRateModel {
    /// Initialize the model with the caller as admin
    pub fn init(&mut self, rate: U256) {
        let caller = self.env().caller();
        self.admin.set(caller);
        self.rate.set(rate);
    }

    /// Answers the hub's capability probe
    pub fn supports_interface(&self, interface_id: u32) -> bool {
        interface_id == IRM_INTERFACE_ID
    }

    /// The configured rate, whatever the market state
    #[allow(unused_variables)]
    pub fn borrow_rate(&self, params: MarketParams, market: Market) -> U256 {
        self.rate.get_or_default()
    }

    /// Change the rate (admin only)
    pub fn set_rate(&mut self, rate: U256) {
        let admin = self.admin.get_or_revert_with(RateModelError::NotAdmin);
        if self.env().caller() != admin {
            self.env().revert(RateModelError::NotAdmin);
        }
        self.rate.set(rate);
        self.env().emit_event(RateUpdated {
            rate,
            timestamp: self.env().get_block_time(),
        });
    }
}
