//! Fixed-point math for the lending hub
//! Every ratio, rate and price is a WAD (1e18) fixed-point number and every
//! division names its rounding direction.
use odra::casper_types::U256;
use crate::hub::errors::HubError;

/// 1e18, the fixed-point unit
pub const WAD: U256 = U256([1_000_000_000_000_000_000, 0, 0, 0]);

/// 1e36, the scale of oracle prices
pub const ORACLE_PRICE_SCALE: U256 = U256([12_919_594_847_110_692_864, 54_210_108_624_275_221, 0, 0]);

/// Seconds in a (365 day) year
pub const SECONDS_PER_YEAR: u64 = 31_536_000;

/// Checked arithmetic on U256
pub struct SafeMath;

impl SafeMath {
    /// Addition with overflow check
    pub fn add(a: U256, b: U256) -> Result<U256, HubError> {
        a.checked_add(b).ok_or(HubError::MathOverflow)
    }

    /// Subtraction with underflow check
    pub fn sub(a: U256, b: U256) -> Result<U256, HubError> {
        a.checked_sub(b).ok_or(HubError::MathUnderflow)
    }

    /// Multiplication with overflow check
    pub fn mul(a: U256, b: U256) -> Result<U256, HubError> {
        a.checked_mul(b).ok_or(HubError::MathOverflow)
    }

    /// `a - b`, or zero when `b > a`
    pub fn zero_floor_sub(a: U256, b: U256) -> U256 {
        if a > b { a - b } else { U256::zero() }
    }

    /// Returns the minimum of two U256 values
    pub fn min(a: U256, b: U256) -> U256 {
        if a < b { a } else { b }
    }
}

/// Scaled multiply/divide with explicit rounding
pub struct WadMath;

impl WadMath {
    /// `floor(x * y / d)`
    pub fn mul_div_down(x: U256, y: U256, d: U256) -> Result<U256, HubError> {
        if d.is_zero() {
            return Err(HubError::DivisionByZero);
        }
        Ok(SafeMath::mul(x, y)? / d)
    }

    /// `ceil(x * y / d)`
    pub fn mul_div_up(x: U256, y: U256, d: U256) -> Result<U256, HubError> {
        if d.is_zero() {
            return Err(HubError::DivisionByZero);
        }
        let product = SafeMath::mul(x, y)?;
        let quotient = product / d;
        if (product % d).is_zero() {
            Ok(quotient)
        } else {
            SafeMath::add(quotient, U256::one())
        }
    }

    /// `floor(x * y / WAD)`
    pub fn mul_wad_down(x: U256, y: U256) -> Result<U256, HubError> {
        Self::mul_div_down(x, y, WAD)
    }

    /// `ceil(x * y / WAD)`
    pub fn mul_wad_up(x: U256, y: U256) -> Result<U256, HubError> {
        Self::mul_div_up(x, y, WAD)
    }

    /// `floor(x * WAD / y)`
    pub fn div_wad_down(x: U256, y: U256) -> Result<U256, HubError> {
        Self::mul_div_down(x, WAD, y)
    }

    /// `ceil(x * WAD / y)`
    pub fn div_wad_up(x: U256, y: U256) -> Result<U256, HubError> {
        Self::mul_div_up(x, WAD, y)
    }

    /// Approximates `e^(rate * elapsed) - 1` with the first three terms of
    /// its Taylor series. Overestimates slightly for large `rate * elapsed`.
    pub fn taylor_compounded(rate: U256, elapsed: u64) -> Result<U256, HubError> {
        let first_term = SafeMath::mul(rate, U256::from(elapsed))?;
        let second_term = Self::mul_div_down(first_term, first_term, SafeMath::mul(U256::from(2), WAD)?)?;
        let third_term = Self::mul_div_down(second_term, first_term, SafeMath::mul(U256::from(3), WAD)?)?;
        SafeMath::add(SafeMath::add(first_term, second_term)?, third_term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wad(n: u64) -> U256 {
        WAD * U256::from(n)
    }

    #[test]
    fn test_constants() {
        assert_eq!(WAD, U256::from(1_000_000_000_000_000_000u128));
        assert_eq!(ORACLE_PRICE_SCALE, WAD * WAD);
    }

    #[test]
    fn test_mul_div_rounding() {
        let x = U256::from(10);
        let y = U256::from(10);
        let d = U256::from(3);
        assert_eq!(WadMath::mul_div_down(x, y, d).ok(), Some(U256::from(33)));
        assert_eq!(WadMath::mul_div_up(x, y, d).ok(), Some(U256::from(34)));

        // exact division rounds the same both ways
        let d = U256::from(4);
        assert_eq!(WadMath::mul_div_down(x, y, d).ok(), Some(U256::from(25)));
        assert_eq!(WadMath::mul_div_up(x, y, d).ok(), Some(U256::from(25)));
    }

    #[test]
    fn test_mul_div_faults() {
        assert!(matches!(
            WadMath::mul_div_down(U256::one(), U256::one(), U256::zero()),
            Err(HubError::DivisionByZero)
        ));
        assert!(matches!(
            WadMath::mul_div_up(U256::one(), U256::one(), U256::zero()),
            Err(HubError::DivisionByZero)
        ));
        assert!(matches!(
            WadMath::mul_div_up(U256::MAX, U256::from(2), U256::one()),
            Err(HubError::MathOverflow)
        ));
        assert!(matches!(
            WadMath::mul_div_down(U256::MAX, U256::from(2), U256::one()),
            Err(HubError::MathOverflow)
        ));
    }

    #[test]
    fn test_wad_helpers() {
        let half = WAD / 2;
        assert_eq!(WadMath::mul_wad_down(wad(3), half).ok(), Some(WAD + half));
        assert_eq!(WadMath::div_wad_down(wad(3), wad(2)).ok(), Some(WAD + half));
        // 1 / 3
        assert_eq!(
            WadMath::div_wad_down(WAD, wad(3)).ok(),
            Some(U256::from(333_333_333_333_333_333u128))
        );
        assert_eq!(
            WadMath::div_wad_up(WAD, wad(3)).ok(),
            Some(U256::from(333_333_333_333_333_334u128))
        );
        assert_eq!(WadMath::mul_wad_up(U256::one(), U256::one()).ok(), Some(U256::one()));
        assert_eq!(WadMath::mul_wad_down(U256::one(), U256::one()).ok(), Some(U256::zero()));
    }

    #[test]
    fn test_taylor_compounded() {
        assert_eq!(WadMath::taylor_compounded(U256::zero(), 1_000).ok(), Some(U256::zero()));
        assert_eq!(WadMath::taylor_compounded(WAD, 0).ok(), Some(U256::zero()));

        // x = 1: 1 + 1/2 + 1/6
        assert_eq!(
            WadMath::taylor_compounded(WAD, 1).ok(),
            Some(U256::from(1_666_666_666_666_666_666u128))
        );

        // 10% yearly for a year sits just under e^0.1 - 1 = 0.10517...
        let rate = WAD / 10 / U256::from(SECONDS_PER_YEAR);
        let growth = WadMath::taylor_compounded(rate, SECONDS_PER_YEAR).unwrap();
        assert!(growth > U256::from(105_000_000_000_000_000u128));
        assert!(growth < U256::from(105_200_000_000_000_000u128));
    }

    #[test]
    fn test_zero_floor_sub() {
        assert_eq!(SafeMath::zero_floor_sub(U256::from(5), U256::from(7)), U256::zero());
        assert_eq!(SafeMath::zero_floor_sub(U256::from(7), U256::from(5)), U256::from(2));
        assert!(matches!(
            SafeMath::sub(U256::from(5), U256::from(7)),
            Err(HubError::MathUnderflow)
        ));
    }
}
