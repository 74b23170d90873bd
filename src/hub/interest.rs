//! Interest accrual for a single market
//!
//! Interest compounds with a Taylor approximation of `e^(rate * elapsed)`.
//! The protocol fee is paid in newly minted supply shares, so it dilutes
//! suppliers instead of moving assets.

use odra::casper_types::U256;
use super::errors::HubError;
use super::market::Market;
use super::shares::to_shares_down;
use crate::math::{SafeMath, WadMath};

/// What one accrual added to a market
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Accrual {
    /// Interest added to both borrow and supply totals
    pub interest: U256,
    /// Supply shares minted for the fee recipient
    pub fee_shares: U256,
}

/// Advances `market` to `now` at the per-second `borrow_rate`.
///
/// The caller credits `fee_shares` to the fee recipient's position.
pub fn accrue(market: &mut Market, borrow_rate: U256, now: u64) -> Result<Accrual, HubError> {
    if now <= market.last_update {
        return Ok(Accrual::default());
    }
    let elapsed = now - market.last_update;
    market.last_update = now;

    let growth = WadMath::taylor_compounded(borrow_rate, elapsed)?;
    let interest = WadMath::mul_wad_down(market.total_borrow_assets, growth)?;
    if interest.is_zero() {
        return Ok(Accrual::default());
    }

    market.total_borrow_assets = SafeMath::add(market.total_borrow_assets, interest)?;
    market.total_supply_assets = SafeMath::add(market.total_supply_assets, interest)?;

    let mut fee_shares = U256::zero();
    if !market.fee.is_zero() {
        let fee_amount = WadMath::mul_wad_down(interest, market.fee)?;
        // priced against the supply before the fee is added
        fee_shares = to_shares_down(
            fee_amount,
            SafeMath::sub(market.total_supply_assets, fee_amount)?,
            market.total_supply_shares,
        )?;
        market.total_supply_shares = SafeMath::add(market.total_supply_shares, fee_shares)?;
        market.fee_shares = SafeMath::add(market.fee_shares, fee_shares)?;
    }

    Ok(Accrual { interest, fee_shares })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{SECONDS_PER_YEAR, WAD};

    fn market() -> Market {
        Market {
            total_supply_assets: U256::from(1_000_000_000_000u128),
            total_supply_shares: U256::from(1_000_000_000_000_000_000u128),
            total_borrow_assets: U256::from(500_000_000_000u128),
            total_borrow_shares: U256::from(500_000_000_000_000_000u128),
            ..Market::new(0)
        }
    }

    fn five_percent_per_year() -> U256 {
        WAD / 20 / U256::from(SECONDS_PER_YEAR)
    }

    #[test]
    fn test_same_timestamp_is_noop() {
        let mut m = market();
        m.last_update = 100;
        let before = m.clone();
        let accrual = accrue(&mut m, five_percent_per_year(), 100).unwrap();
        assert_eq!(accrual, Accrual::default());
        assert_eq!(m, before);
    }

    #[test]
    fn test_zero_rate_leaves_totals_unchanged() {
        let mut m = Market {
            total_supply_assets: U256::from(1_000),
            total_borrow_assets: U256::from(500),
            ..Market::new(0)
        };
        let accrual = accrue(&mut m, U256::zero(), SECONDS_PER_YEAR).unwrap();
        assert_eq!(accrual.interest, U256::zero());
        assert_eq!(m.total_supply_assets, U256::from(1_000));
        assert_eq!(m.total_borrow_assets, U256::from(500));
        assert_eq!(m.last_update, SECONDS_PER_YEAR);
    }

    #[test]
    fn test_interest_goes_to_both_sides() {
        let mut m = market();
        let before = m.clone();
        let accrual = accrue(&mut m, five_percent_per_year(), SECONDS_PER_YEAR).unwrap();

        assert!(accrual.interest > U256::zero());
        assert_eq!(m.total_borrow_assets, before.total_borrow_assets + accrual.interest);
        assert_eq!(m.total_supply_assets, before.total_supply_assets + accrual.interest);
        assert_eq!(m.total_supply_shares, before.total_supply_shares);
        assert!(m.total_borrow_assets <= m.total_supply_assets);
        // ~5.127% of 500e9
        assert!(accrual.interest > U256::from(25_600_000_000u128));
        assert!(accrual.interest < U256::from(25_700_000_000u128));
    }

    #[test]
    fn test_fee_mints_supply_shares() {
        let mut m = market();
        m.fee = WAD / 10;
        let before = m.clone();
        let accrual = accrue(&mut m, five_percent_per_year(), SECONDS_PER_YEAR).unwrap();

        assert!(accrual.fee_shares > U256::zero());
        assert_eq!(m.total_supply_shares, before.total_supply_shares + accrual.fee_shares);
        assert_eq!(m.fee_shares, accrual.fee_shares);

        // fee shares are worth about 10% of the interest
        let fee_value = super::super::shares::to_assets_down(
            accrual.fee_shares,
            m.total_supply_assets,
            m.total_supply_shares,
        )
        .unwrap();
        let expected = accrual.interest / 10;
        assert!(fee_value <= expected);
        assert!(expected - fee_value <= U256::from(2));
    }

    #[test]
    fn test_no_borrows_only_moves_clock() {
        let mut m = market();
        m.total_borrow_assets = U256::zero();
        let accrual = accrue(&mut m, five_percent_per_year(), 1_000).unwrap();
        assert_eq!(accrual, Accrual::default());
        assert_eq!(m.last_update, 1_000);
    }
}
