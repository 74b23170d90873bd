//! Market registry types
//!
//! A market is identified by the hash of its immutable parameters. Only the
//! counters in [`Market`] and the [`Position`] records change afterwards.

use odra::prelude::*;
use odra::casper_types::U256;
use crate::math::WAD;

/// Hash of a market's [`MarketParams`]
pub type MarketId = [u8; 32];

/// Highest accepted liquidation threshold (100%)
pub const MAX_LLTV: U256 = WAD;

/// Highest protocol fee: 25% of accrued interest
pub const MAX_FEE: U256 = U256([250_000_000_000_000_000, 0, 0, 0]);

/// Highest flash loan fee: 1% of the borrowed amount
pub const MAX_FLASH_LOAN_FEE: U256 = U256([10_000_000_000_000_000, 0, 0, 0]);

/// Immutable configuration of a market
#[odra::odra_type]
pub struct MarketParams {
    /// Token lent and borrowed
    pub loan_token: Address,
    /// Token posted as collateral
    pub collateral_token: Address,
    /// Price oracle for collateral quoted in loan token (1e36 scale)
    pub oracle: Address,
    /// Interest rate model
    pub irm: Address,
    /// Liquidation loan-to-value threshold (WAD)
    pub lltv: U256,
}

/// Operational counters of a market
#[odra::odra_type]
#[derive(Default)]
pub struct Market {
    /// Loan assets owed to suppliers, interest included
    pub total_supply_assets: U256,
    /// Supply shares outstanding
    pub total_supply_shares: U256,
    /// Loan assets owed by borrowers, interest included
    pub total_borrow_assets: U256,
    /// Borrow shares outstanding
    pub total_borrow_shares: U256,
    /// Collateral held for all positions
    pub total_collateral: U256,
    /// Timestamp (seconds) of the last accrual
    pub last_update: u64,
    /// Share of interest taken as protocol fee (WAD)
    pub fee: U256,
    /// Supply shares minted to the fee recipient so far
    pub fee_shares: U256,
    /// Frozen markets take no new supply, collateral or borrows
    pub frozen: bool,
}

impl Market {
    /// Empty market whose interest clock starts at `now`
    pub fn new(now: u64) -> Self {
        Self {
            last_update: now,
            ..Default::default()
        }
    }

    /// Loan assets not lent out
    pub fn available_liquidity(&self) -> U256 {
        if self.total_supply_assets > self.total_borrow_assets {
            self.total_supply_assets - self.total_borrow_assets
        } else {
            U256::zero()
        }
    }

    /// Borrowed share of supplied assets (WAD)
    pub fn utilization(&self) -> U256 {
        if self.total_supply_assets.is_zero() {
            return U256::zero();
        }
        self.total_borrow_assets.saturating_mul(WAD) / self.total_supply_assets
    }
}

/// An account's stake in one market
#[odra::odra_type]
#[derive(Default)]
pub struct Position {
    /// Supply shares held
    pub supply_shares: U256,
    /// Borrow shares owed
    pub borrow_shares: U256,
    /// Collateral deposited
    pub collateral: U256,
}

impl Position {
    /// True when no supply, debt or collateral is left
    pub fn is_empty(&self) -> bool {
        self.supply_shares.is_zero() && self.borrow_shares.is_zero() && self.collateral.is_zero()
    }
}
