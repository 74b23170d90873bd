//! Liquidation of unhealthy positions
//!
//! A liquidator repays part of the debt and receives collateral worth the
//! repaid amount times the liquidation incentive factor. When a liquidation
//! leaves a borrower with debt but no collateral, the rest of the debt is
//! written off against suppliers.

use odra::casper_types::U256;
use super::errors::HubError;
use super::ledger::{exactly_one_zero, is_healthy};
use super::market::{Market, Position};
use super::shares::{to_assets_down, to_assets_up, to_shares_up};
use crate::math::{SafeMath, WadMath, ORACLE_PRICE_SCALE, WAD};

/// Highest liquidation incentive factor (1.15)
pub const MAX_LIQUIDATION_INCENTIVE_FACTOR: U256 = U256([1_150_000_000_000_000_000, 0, 0, 0]);

/// Liquidation cursor (0.3)
pub const LIQUIDATION_CURSOR: U256 = U256([300_000_000_000_000_000, 0, 0, 0]);

/// Outcome of one liquidation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Liquidation {
    /// Collateral moved to the liquidator
    pub seized_assets: U256,
    /// Loan assets the liquidator pays
    pub repaid_assets: U256,
    /// Borrow shares burned by the repayment
    pub repaid_shares: U256,
    /// Debt written off against suppliers
    pub bad_debt_assets: U256,
    /// Borrow shares cleared with the bad debt
    pub bad_debt_shares: U256,
}

/// `min(1.15, 1 / (1 - 0.3 * (1 - lltv)))`
pub fn liquidation_incentive_factor(lltv: U256) -> Result<U256, HubError> {
    let discount = WadMath::mul_wad_down(LIQUIDATION_CURSOR, SafeMath::sub(WAD, lltv)?)?;
    let factor = WadMath::div_wad_down(WAD, SafeMath::sub(WAD, discount)?)?;
    Ok(SafeMath::min(MAX_LIQUIDATION_INCENTIVE_FACTOR, factor))
}

/// Liquidates `position` at `price`, given either the collateral to seize
/// or the borrow shares to repay.
pub fn liquidate(
    market: &mut Market,
    position: &mut Position,
    lltv: U256,
    price: U256,
    seized_assets: U256,
    repaid_shares: U256,
) -> Result<Liquidation, HubError> {
    exactly_one_zero(seized_assets, repaid_shares)?;
    if is_healthy(market, position, lltv, price)? {
        return Err(HubError::PositionHealthy);
    }
    let lif = liquidation_incentive_factor(lltv)?;

    let (seized_assets, repaid_shares) = if !seized_assets.is_zero() {
        let seized = SafeMath::min(seized_assets, position.collateral);
        let shares = shares_for_seizure(market, seized, price, lif)?;
        if shares > position.borrow_shares {
            // The whole debt buys less than requested; seize only its worth
            let shares = position.borrow_shares;
            let seized = SafeMath::min(seizure_for_shares(market, shares, price, lif)?, position.collateral);
            (seized, shares)
        } else {
            (seized, shares)
        }
    } else {
        let repaid_shares = SafeMath::min(repaid_shares, position.borrow_shares);
        let seized = seizure_for_shares(market, repaid_shares, price, lif)?;
        if seized > position.collateral {
            let seized = position.collateral;
            (seized, shares_for_seizure(market, seized, price, lif)?)
        } else {
            (seized, repaid_shares)
        }
    };
    let repaid_shares = SafeMath::min(repaid_shares, position.borrow_shares);
    let repaid_assets = to_assets_up(repaid_shares, market.total_borrow_assets, market.total_borrow_shares)?;

    position.borrow_shares = SafeMath::sub(position.borrow_shares, repaid_shares)?;
    market.total_borrow_shares = SafeMath::sub(market.total_borrow_shares, repaid_shares)?;
    market.total_borrow_assets = SafeMath::zero_floor_sub(market.total_borrow_assets, repaid_assets);

    position.collateral = SafeMath::sub(position.collateral, seized_assets)?;
    market.total_collateral = SafeMath::sub(market.total_collateral, seized_assets)?;

    let mut outcome = Liquidation {
        seized_assets,
        repaid_assets,
        repaid_shares,
        ..Default::default()
    };

    if position.collateral.is_zero() && !position.borrow_shares.is_zero() {
        let bad_debt_shares = position.borrow_shares;
        let bad_debt_assets = SafeMath::min(
            market.total_borrow_assets,
            to_assets_up(bad_debt_shares, market.total_borrow_assets, market.total_borrow_shares)?,
        );
        market.total_borrow_assets = SafeMath::sub(market.total_borrow_assets, bad_debt_assets)?;
        market.total_supply_assets = SafeMath::zero_floor_sub(market.total_supply_assets, bad_debt_assets);
        market.total_borrow_shares = SafeMath::sub(market.total_borrow_shares, bad_debt_shares)?;
        position.borrow_shares = U256::zero();

        outcome.bad_debt_assets = bad_debt_assets;
        outcome.bad_debt_shares = bad_debt_shares;
    }

    Ok(outcome)
}

/// Borrow shares a liquidator repays to receive `seized` collateral
fn shares_for_seizure(market: &Market, seized: U256, price: U256, lif: U256) -> Result<U256, HubError> {
    let seized_value = WadMath::mul_div_up(seized, price, ORACLE_PRICE_SCALE)?;
    let repaid_assets = WadMath::div_wad_up(seized_value, lif)?;
    to_shares_up(repaid_assets, market.total_borrow_assets, market.total_borrow_shares)
}

/// Collateral worth `shares` of debt plus the incentive, rounded down.
fn seizure_for_shares(market: &Market, shares: U256, price: U256, lif: U256) -> Result<U256, HubError> {
    let repaid_value = to_assets_down(shares, market.total_borrow_assets, market.total_borrow_shares)?;
    WadMath::mul_div_down(WadMath::mul_wad_down(repaid_value, lif)?, ORACLE_PRICE_SCALE, price)
}
