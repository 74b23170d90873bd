//! Position ledger
//!
//! Pure bookkeeping for supply, withdraw, borrow, repay and collateral moves.
//! The hub contract accrues interest, loads the records, calls into here and
//! stores the result, so every function either fully applies or returns an
//! error and leaves the caller to revert.

use odra::casper_types::U256;
use super::errors::HubError;
use super::market::{Market, Position};
use super::shares::{to_assets_down, to_assets_up, to_shares_down, to_shares_up};
use crate::math::{SafeMath, WadMath, ORACLE_PRICE_SCALE};

/// Checks that exactly one of `assets` and `shares` is nonzero.
pub fn exactly_one_zero(assets: U256, shares: U256) -> Result<(), HubError> {
    if assets.is_zero() == shares.is_zero() {
        return Err(HubError::InconsistentInput);
    }
    Ok(())
}

/// Credits supply to `position`. Returns `(assets, shares)`.
pub fn supply(
    market: &mut Market,
    position: &mut Position,
    assets: U256,
    shares: U256,
) -> Result<(U256, U256), HubError> {
    exactly_one_zero(assets, shares)?;
    let (assets, shares) = if !assets.is_zero() {
        (assets, to_shares_down(assets, market.total_supply_assets, market.total_supply_shares)?)
    } else {
        (to_assets_up(shares, market.total_supply_assets, market.total_supply_shares)?, shares)
    };

    position.supply_shares = SafeMath::add(position.supply_shares, shares)?;
    market.total_supply_shares = SafeMath::add(market.total_supply_shares, shares)?;
    market.total_supply_assets = SafeMath::add(market.total_supply_assets, assets)?;
    Ok((assets, shares))
}

/// Debits supply from `position`. Returns `(assets, shares)`.
pub fn withdraw(
    market: &mut Market,
    position: &mut Position,
    assets: U256,
    shares: U256,
) -> Result<(U256, U256), HubError> {
    exactly_one_zero(assets, shares)?;
    let (assets, shares) = if !assets.is_zero() {
        (assets, to_shares_up(assets, market.total_supply_assets, market.total_supply_shares)?)
    } else {
        (to_assets_down(shares, market.total_supply_assets, market.total_supply_shares)?, shares)
    };

    if assets > market.available_liquidity() {
        return Err(HubError::InsufficientLiquidity);
    }
    position.supply_shares = position
        .supply_shares
        .checked_sub(shares)
        .ok_or(HubError::InsufficientBalance)?;
    market.total_supply_shares = SafeMath::sub(market.total_supply_shares, shares)?;
    market.total_supply_assets = SafeMath::sub(market.total_supply_assets, assets)?;
    Ok((assets, shares))
}

/// Adds debt to `position`. Returns `(assets, shares)`.
///
/// Only the liquidity side is checked here; the hub checks health
/// afterwards with a fresh oracle price.
pub fn borrow(
    market: &mut Market,
    position: &mut Position,
    assets: U256,
    shares: U256,
) -> Result<(U256, U256), HubError> {
    exactly_one_zero(assets, shares)?;
    let (assets, shares) = if !assets.is_zero() {
        (assets, to_shares_up(assets, market.total_borrow_assets, market.total_borrow_shares)?)
    } else {
        (to_assets_down(shares, market.total_borrow_assets, market.total_borrow_shares)?, shares)
    };

    let total_borrow_assets = SafeMath::add(market.total_borrow_assets, assets)?;
    if total_borrow_assets > market.total_supply_assets {
        return Err(HubError::InsufficientLiquidity);
    }
    position.borrow_shares = SafeMath::add(position.borrow_shares, shares)?;
    market.total_borrow_shares = SafeMath::add(market.total_borrow_shares, shares)?;
    market.total_borrow_assets = total_borrow_assets;
    Ok((assets, shares))
}

/// Removes debt from `position`. Returns `(assets, shares)`.
pub fn repay(
    market: &mut Market,
    position: &mut Position,
    assets: U256,
    shares: U256,
) -> Result<(U256, U256), HubError> {
    exactly_one_zero(assets, shares)?;
    let (assets, shares) = if !assets.is_zero() {
        (assets, to_shares_down(assets, market.total_borrow_assets, market.total_borrow_shares)?)
    } else {
        (to_assets_up(shares, market.total_borrow_assets, market.total_borrow_shares)?, shares)
    };

    position.borrow_shares = position
        .borrow_shares
        .checked_sub(shares)
        .ok_or(HubError::RepayExceedsDebt)?;
    market.total_borrow_shares = SafeMath::sub(market.total_borrow_shares, shares)?;
    // rounding can leave the last repayer owing a few units more than the total
    market.total_borrow_assets = SafeMath::zero_floor_sub(market.total_borrow_assets, assets);
    Ok((assets, shares))
}

/// Adds collateral to `position`.
pub fn supply_collateral(market: &mut Market, position: &mut Position, assets: U256) -> Result<(), HubError> {
    if assets.is_zero() {
        return Err(HubError::ZeroAmount);
    }
    position.collateral = SafeMath::add(position.collateral, assets)?;
    market.total_collateral = SafeMath::add(market.total_collateral, assets)?;
    Ok(())
}

/// Removes collateral from `position`; the hub checks health afterwards.
pub fn withdraw_collateral(market: &mut Market, position: &mut Position, assets: U256) -> Result<(), HubError> {
    if assets.is_zero() {
        return Err(HubError::ZeroAmount);
    }
    position.collateral = position
        .collateral
        .checked_sub(assets)
        .ok_or(HubError::InsufficientBalance)?;
    market.total_collateral = SafeMath::sub(market.total_collateral, assets)?;
    Ok(())
}

/// Debt of `position` in loan assets, rounded up.
pub fn borrowed_assets(market: &Market, position: &Position) -> Result<U256, HubError> {
    to_assets_up(position.borrow_shares, market.total_borrow_assets, market.total_borrow_shares)
}

/// Largest debt the position's collateral supports at `price` (rounded down).
pub fn max_borrow(position: &Position, lltv: U256, price: U256) -> Result<U256, HubError> {
    let collateral_value = WadMath::mul_div_down(position.collateral, price, ORACLE_PRICE_SCALE)?;
    WadMath::mul_wad_down(collateral_value, lltv)
}

/// `collateral * price * lltv >= debt`; debt-free positions are always healthy.
pub fn is_healthy(market: &Market, position: &Position, lltv: U256, price: U256) -> Result<bool, HubError> {
    if position.borrow_shares.is_zero() {
        return Ok(true);
    }
    Ok(max_borrow(position, lltv, price)? >= borrowed_assets(market, position)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::WAD;

    fn u(n: u128) -> U256 {
        U256::from(n)
    }

    /// 1 collateral unit is worth 1 loan unit
    fn unit_price() -> U256 {
        ORACLE_PRICE_SCALE
    }

    fn lltv_80() -> U256 {
        WAD / 10 * 8
    }

    #[test]
    fn test_inconsistent_inputs() {
        let mut m = Market::new(0);
        let mut p = Position::default();
        assert!(matches!(supply(&mut m, &mut p, u(0), u(0)), Err(HubError::InconsistentInput)));
        assert!(matches!(supply(&mut m, &mut p, u(1), u(1)), Err(HubError::InconsistentInput)));
        assert!(matches!(supply_collateral(&mut m, &mut p, u(0)), Err(HubError::ZeroAmount)));
    }

    #[test]
    fn test_supply_then_withdraw_all_shares() {
        let mut m = Market::new(0);
        let mut p = Position::default();
        assert_eq!(supply(&mut m, &mut p, u(1_000), u(0)).ok(), Some((u(1_000), u(1_000_000_000))));
        assert_eq!(p.supply_shares, u(1_000_000_000));

        let (assets, shares) = withdraw(&mut m, &mut p, u(0), p.supply_shares).unwrap();
        assert_eq!(assets, u(1_000));
        assert_eq!(shares, u(1_000_000_000));
        assert!(p.is_empty());
        assert_eq!(m.total_supply_assets, u(0));
        assert_eq!(m.total_supply_shares, u(0));
    }

    #[test]
    fn test_supply_by_shares_rounds_assets_up() {
        let mut m = Market {
            total_supply_assets: u(1_000),
            total_supply_shares: u(999_000_000),
            ..Market::new(0)
        };
        let mut p = Position::default();
        let (assets, _) = supply(&mut m, &mut p, u(0), u(1)).unwrap();
        assert_eq!(assets, u(1));
    }

    #[test]
    fn test_withdraw_limited_by_liquidity() {
        let mut m = Market::new(0);
        let mut supplier = Position::default();
        let mut borrower = Position::default();
        supply(&mut m, &mut supplier, u(1_000), u(0)).unwrap();
        borrow(&mut m, &mut borrower, u(600), u(0)).unwrap();

        let before = (m.clone(), supplier.clone());
        assert!(matches!(
            withdraw(&mut m, &mut supplier, u(401), u(0)),
            Err(HubError::InsufficientLiquidity)
        ));
        assert_eq!((m.clone(), supplier.clone()), before);
        assert!(withdraw(&mut m, &mut supplier, u(400), u(0)).is_ok());
        assert_eq!(m.available_liquidity(), u(0));
    }

    #[test]
    fn test_withdraw_more_than_owned() {
        let mut m = Market::new(0);
        let mut alice = Position::default();
        let mut bob = Position::default();
        supply(&mut m, &mut alice, u(1_000), u(0)).unwrap();
        supply(&mut m, &mut bob, u(1_000), u(0)).unwrap();
        assert!(matches!(
            withdraw(&mut m, &mut alice, u(1_001), u(0)),
            Err(HubError::InsufficientBalance)
        ));
    }

    #[test]
    fn test_borrow_cannot_exceed_supply() {
        let mut m = Market::new(0);
        let mut supplier = Position::default();
        let mut borrower = Position::default();
        supply(&mut m, &mut supplier, u(1_000), u(0)).unwrap();
        assert!(matches!(
            borrow(&mut m, &mut borrower, u(1_001), u(0)),
            Err(HubError::InsufficientLiquidity)
        ));
    }

    #[test]
    fn test_borrow_and_repay_round_trip() {
        let mut m = Market::new(0);
        let mut supplier = Position::default();
        let mut borrower = Position::default();
        supply(&mut m, &mut supplier, u(1_000), u(0)).unwrap();

        let (_, shares) = borrow(&mut m, &mut borrower, u(400), u(0)).unwrap();
        assert_eq!(shares, u(400_000_000));
        assert_eq!(borrowed_assets(&m, &borrower).ok(), Some(u(400)));

        let (assets, repaid) = repay(&mut m, &mut borrower, u(400), u(0)).unwrap();
        assert_eq!(assets, u(400));
        assert_eq!(repaid, u(400_000_000));
        assert_eq!(borrower.borrow_shares, u(0));
        assert_eq!(m.total_borrow_assets, u(0));
        assert_eq!(m.total_borrow_shares, u(0));
    }

    #[test]
    fn test_repay_more_than_owed_is_rejected() {
        let mut m = Market::new(0);
        let mut supplier = Position::default();
        let mut borrower = Position::default();
        supply(&mut m, &mut supplier, u(1_000), u(0)).unwrap();
        borrow(&mut m, &mut borrower, u(100), u(0)).unwrap();
        assert!(matches!(
            repay(&mut m, &mut borrower, u(0), borrower.borrow_shares + U256::one()),
            Err(HubError::RepayExceedsDebt)
        ));
        assert!(matches!(
            repay(&mut m, &mut borrower, u(200), u(0)),
            Err(HubError::RepayExceedsDebt)
        ));
    }

    #[test]
    fn test_collateral_moves() {
        let mut m = Market::new(0);
        let mut p = Position::default();
        supply_collateral(&mut m, &mut p, u(500)).unwrap();
        assert_eq!(m.total_collateral, u(500));
        assert!(matches!(
            withdraw_collateral(&mut m, &mut p, u(501)),
            Err(HubError::InsufficientBalance)
        ));
        withdraw_collateral(&mut m, &mut p, u(500)).unwrap();
        assert_eq!(p.collateral, u(0));
        assert_eq!(m.total_collateral, u(0));
    }

    #[test]
    fn test_health_boundary() {
        let mut m = Market::new(0);
        let mut supplier = Position::default();
        let mut borrower = Position::default();
        supply(&mut m, &mut supplier, u(10_000), u(0)).unwrap();
        supply_collateral(&mut m, &mut borrower, u(1_000)).unwrap();
        assert_eq!(is_healthy(&m, &borrower, lltv_80(), unit_price()).ok(), Some(true));

        borrow(&mut m, &mut borrower, u(800), u(0)).unwrap();
        assert_eq!(max_borrow(&borrower, lltv_80(), unit_price()).ok(), Some(u(800)));
        assert_eq!(is_healthy(&m, &borrower, lltv_80(), unit_price()).ok(), Some(true));

        borrow(&mut m, &mut borrower, u(1), u(0)).unwrap();
        assert_eq!(is_healthy(&m, &borrower, lltv_80(), unit_price()).ok(), Some(false));

        // price halves: 1_000 collateral now supports 400
        assert_eq!(is_healthy(&m, &borrower, lltv_80(), unit_price() / 2).ok(), Some(false));
    }

    #[test]
    fn test_borrow_never_exceeds_supply_after_sequence() {
        let mut m = Market::new(0);
        let mut a = Position::default();
        let mut b = Position::default();
        supply(&mut m, &mut a, u(5_000), u(0)).unwrap();

        let (market_before, borrower_before) = (m.clone(), b.clone());
        assert!(matches!(
            borrow(&mut m, &mut b, u(6_000), u(0)),
            Err(HubError::InsufficientLiquidity)
        ));
        assert_eq!(m, market_before);
        assert_eq!(b, borrower_before);

        borrow(&mut m, &mut b, u(3_000), u(0)).unwrap();

        // only 2_000 is idle
        let (market_before, supplier_before) = (m.clone(), a.clone());
        assert!(matches!(
            withdraw(&mut m, &mut a, u(2_500), u(0)),
            Err(HubError::InsufficientLiquidity)
        ));
        assert_eq!(m, market_before);
        assert_eq!(a, supplier_before);

        withdraw(&mut m, &mut a, u(1_000), u(0)).unwrap();
        repay(&mut m, &mut b, u(1_500), u(0)).unwrap();
        withdraw(&mut m, &mut a, u(2_000), u(0)).unwrap();
        assert!(m.total_borrow_assets <= m.total_supply_assets);
        assert_eq!(m.total_supply_assets, u(2_000));
        assert_eq!(m.total_borrow_assets, u(1_500));
    }
}
