//! Share accounting with a virtual offset
//!
//! Every conversion adds [`VIRTUAL_SHARES`] and [`VIRTUAL_ASSETS`] to the pool
//! totals, so an empty pool never divides by zero and the first depositor
//! cannot inflate the share price cheaply.
//!
//! | Operation | Given  | Computes | Rounding |
//! |-----------|--------|----------|----------|
//! | supply    | assets | shares   | down     |
//! | supply    | shares | assets   | up       |
//! | withdraw  | assets | shares   | up       |
//! | withdraw  | shares | assets   | down     |
//! | borrow    | assets | shares   | up       |
//! | borrow    | shares | assets   | down     |
//! | repay     | assets | shares   | down     |
//! | repay     | shares | assets   | up       |

use odra::casper_types::U256;
use super::errors::HubError;
use crate::math::{SafeMath, WadMath};

/// Virtual shares added to the share total of every pool
pub const VIRTUAL_SHARES: U256 = U256([1_000_000, 0, 0, 0]);

/// Virtual assets added to the asset total of every pool
pub const VIRTUAL_ASSETS: U256 = U256([1, 0, 0, 0]);

/// `floor(assets * (total_shares + 1e6) / (total_assets + 1))`
pub fn to_shares_down(assets: U256, total_assets: U256, total_shares: U256) -> Result<U256, HubError> {
    WadMath::mul_div_down(
        assets,
        SafeMath::add(total_shares, VIRTUAL_SHARES)?,
        SafeMath::add(total_assets, VIRTUAL_ASSETS)?,
    )
}

/// `ceil(assets * (total_shares + 1e6) / (total_assets + 1))`
pub fn to_shares_up(assets: U256, total_assets: U256, total_shares: U256) -> Result<U256, HubError> {
    WadMath::mul_div_up(
        assets,
        SafeMath::add(total_shares, VIRTUAL_SHARES)?,
        SafeMath::add(total_assets, VIRTUAL_ASSETS)?,
    )
}

/// `floor(shares * (total_assets + 1) / (total_shares + 1e6))`
pub fn to_assets_down(shares: U256, total_assets: U256, total_shares: U256) -> Result<U256, HubError> {
    WadMath::mul_div_down(
        shares,
        SafeMath::add(total_assets, VIRTUAL_ASSETS)?,
        SafeMath::add(total_shares, VIRTUAL_SHARES)?,
    )
}

/// `ceil(shares * (total_assets + 1) / (total_shares + 1e6))`
pub fn to_assets_up(shares: U256, total_assets: U256, total_shares: U256) -> Result<U256, HubError> {
    WadMath::mul_div_up(
        shares,
        SafeMath::add(total_assets, VIRTUAL_ASSETS)?,
        SafeMath::add(total_shares, VIRTUAL_SHARES)?,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u(n: u128) -> U256 {
        U256::from(n)
    }

    #[test]
    fn test_empty_pool_uses_virtual_offset() {
        assert_eq!(to_shares_down(u(100), U256::zero(), U256::zero()).ok(), Some(u(100_000_000)));
        assert_eq!(to_assets_down(u(100_000_000), u(100), u(100_000_000)).ok(), Some(u(100)));
        assert_eq!(to_assets_down(u(5), U256::zero(), U256::zero()).ok(), Some(U256::zero()));
    }

    #[test]
    fn test_round_trip_never_creates_value() {
        let pools = [
            (u(0), u(0)),
            (u(1), u(999)),
            (u(1_000), u(999_999_999)),
            (u(10_000_000), u(10_000_000_000_000)),
            (u(123_456_789), u(987_654_321_000)),
            (u(1_000_000_000_000_000_000), u(1)),
        ];
        let amounts = [u(1), u(7), u(1_000), u(333_333), u(10_000_000_000)];
        for (total_assets, total_shares) in pools {
            for assets in amounts {
                let shares = to_shares_down(assets, total_assets, total_shares).unwrap();
                let back = to_assets_down(shares, total_assets, total_shares).unwrap();
                assert!(back <= assets);
            }
        }
    }

    #[test]
    fn test_rounding_direction() {
        let total_assets = u(1_000);
        let total_shares = u(999);
        let down = to_shares_down(u(100), total_assets, total_shares).unwrap();
        let up = to_shares_up(u(100), total_assets, total_shares).unwrap();
        assert!(up >= down);
        assert!(up - down <= U256::one());

        let down = to_assets_down(u(12_345), total_assets, total_shares).unwrap();
        let up = to_assets_up(u(12_345), total_assets, total_shares).unwrap();
        assert_eq!(up, down + U256::one());
    }

    #[test]
    fn test_donation_does_not_zero_out_next_depositor() {
        let attacker_shares = to_shares_down(u(1), U256::zero(), U256::zero()).unwrap();
        let inflated_assets = u(1) + u(1_000_000);
        let victim_shares = to_shares_down(u(1_000_000), inflated_assets, attacker_shares)
            .unwrap();
        assert!(victim_shares > u(1_000));
    }

    #[test]
    fn test_overflow_is_an_error() {
        assert!(matches!(
            to_shares_down(U256::MAX, U256::zero(), U256::zero()),
            Err(HubError::MathOverflow)
        ));
        assert!(matches!(
            to_assets_up(U256::one(), U256::MAX, U256::zero()),
            Err(HubError::MathOverflow)
        ));
    }
}
