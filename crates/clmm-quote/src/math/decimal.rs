//! Decimal
//!
//! Unsigned fixed-point number with 12 decimal places. Prices, sqrt prices,
//! liquidity, fee rates and slippage tolerances all share this scale, so a
//! raw value of `DENOMINATOR` is 1.0 for every one of them.

use crate::constants::{DECIMAL_SCALE, DENOMINATOR};
use crate::errors::ClmmError;
use crate::math::full_math::{div_round_up, u256_to_u128, u256_to_u64, U256};
use anchor_lang::prelude::*;
use std::fmt;

/// Fixed-point value scaled by 10^12
#[derive(
    AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub struct Decimal {
    /// Raw scaled value
    pub v: u128,
}

impl Decimal {
    /// Wrap a raw scaled value
    pub const fn new(v: u128) -> Self {
        Self { v }
    }

    pub const fn zero() -> Self {
        Self { v: 0 }
    }

    pub const fn one() -> Self {
        Self { v: DENOMINATOR }
    }

    /// Scale an integer up to a Decimal (5 -> 5.0)
    pub fn from_integer(integer: u128) -> Result<Self> {
        integer
            .checked_mul(DENOMINATOR)
            .map(Self::new)
            .ok_or_else(|| ClmmError::MathOverflow.into())
    }

    /// Rescale a value carrying `scale` decimal places (value 15, scale 1 -> 1.5)
    ///
    /// Extra precision beyond 12 places is truncated.
    pub fn from_scale(value: u128, scale: u8) -> Result<Self> {
        if scale <= DECIMAL_SCALE {
            let factor = 10u128.pow(u32::from(DECIMAL_SCALE - scale));
            value
                .checked_mul(factor)
                .map(Self::new)
                .ok_or_else(|| ClmmError::MathOverflow.into())
        } else {
            let factor = 10u128
                .checked_pow(u32::from(scale - DECIMAL_SCALE))
                .ok_or(ClmmError::ValueOutOfRange)?;
            Ok(Self::new(value / factor))
        }
    }

    pub fn is_zero(&self) -> bool {
        self.v == 0
    }

    pub fn checked_add(self, other: Self) -> Result<Self> {
        self.v
            .checked_add(other.v)
            .map(Self::new)
            .ok_or_else(|| ClmmError::MathOverflow.into())
    }

    pub fn checked_sub(self, other: Self) -> Result<Self> {
        self.v
            .checked_sub(other.v)
            .map(Self::new)
            .ok_or_else(|| ClmmError::MathOverflow.into())
    }

    /// self * other, rounded down
    pub fn checked_mul(self, other: Self) -> Result<Self> {
        let product = self.big_mul_to_value(other);
        Ok(Self::new(u256_to_u128(product / U256::from(DENOMINATOR))?))
    }

    /// self * other, rounded up
    pub fn checked_mul_up(self, other: Self) -> Result<Self> {
        let product = self.big_mul_to_value(other);
        Ok(Self::new(u256_to_u128(div_round_up(
            product,
            U256::from(DENOMINATOR),
        )?)?))
    }

    /// self / other, rounded down
    pub fn checked_div(self, other: Self) -> Result<Self> {
        if other.is_zero() {
            return Err(ClmmError::InvalidDivisor.into());
        }
        let numerator = U256::from(self.v) * U256::from(DENOMINATOR);
        Ok(Self::new(u256_to_u128(numerator / U256::from(other.v))?))
    }

    /// self / other, rounded up
    pub fn checked_div_up(self, other: Self) -> Result<Self> {
        if other.is_zero() {
            return Err(ClmmError::InvalidDivisor.into());
        }
        let numerator = U256::from(self.v) * U256::from(DENOMINATOR);
        Ok(Self::new(u256_to_u128(div_round_up(
            numerator,
            U256::from(other.v),
        )?)?))
    }

    /// Unscaled product of the raw values (scale 10^24)
    pub fn big_mul_to_value(self, other: Self) -> U256 {
        U256::from(self.v) * U256::from(other.v)
    }

    /// Apply this rate to a token amount, rounding down
    pub fn mul_amount(self, amount: u64) -> Result<u64> {
        let product = U256::from(amount) * U256::from(self.v);
        u256_to_u64(product / U256::from(DENOMINATOR))
    }

    /// Apply this rate to a token amount, rounding up
    pub fn mul_amount_up(self, amount: u64) -> Result<u64> {
        let product = U256::from(amount) * U256::from(self.v);
        u256_to_u64(div_round_up(product, U256::from(DENOMINATOR))?)
    }
}

impl From<u128> for Decimal {
    fn from(v: u128) -> Self {
        Self::new(v)
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:012}",
            self.v / DENOMINATOR,
            self.v % DENOMINATOR
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        assert_eq!(Decimal::one().v, DENOMINATOR);
        assert_eq!(Decimal::from_integer(5).unwrap().v, 5 * DENOMINATOR);
        assert_eq!(Decimal::from_scale(15, 1).unwrap().v, 1_500_000_000_000);
        assert_eq!(Decimal::from_scale(1, 14).unwrap().v, 0);
        assert_eq!(Decimal::from_scale(123, 14).unwrap().v, 1);
        assert!(Decimal::from_integer(u128::MAX).is_err());
    }

    #[test]
    fn test_add_sub() {
        let a = Decimal::from_integer(3).unwrap();
        let b = Decimal::from_integer(2).unwrap();
        assert_eq!(a.checked_add(b).unwrap(), Decimal::from_integer(5).unwrap());
        assert_eq!(a.checked_sub(b).unwrap(), Decimal::one());
        assert_eq!(
            b.checked_sub(a).unwrap_err(),
            ClmmError::MathOverflow.into()
        );
    }

    #[test]
    fn test_mul_rounding() {
        // 0.000000000001 * 0.5 = 0.0000000000005
        let tiny = Decimal::new(1);
        let half = Decimal::new(DENOMINATOR / 2);
        assert_eq!(tiny.checked_mul(half).unwrap().v, 0);
        assert_eq!(tiny.checked_mul_up(half).unwrap().v, 1);

        let two = Decimal::from_integer(2).unwrap();
        let three = Decimal::from_integer(3).unwrap();
        assert_eq!(two.checked_mul(three).unwrap(), Decimal::from_integer(6).unwrap());
    }

    #[test]
    fn test_div_rounding() {
        let one = Decimal::one();
        let three = Decimal::from_integer(3).unwrap();
        assert_eq!(one.checked_div(three).unwrap().v, 333_333_333_333);
        assert_eq!(one.checked_div_up(three).unwrap().v, 333_333_333_334);
    }

    #[test]
    fn test_div_by_zero() {
        assert_eq!(
            Decimal::one().checked_div(Decimal::zero()).unwrap_err(),
            ClmmError::InvalidDivisor.into()
        );
        assert_eq!(
            Decimal::one().checked_div_up(Decimal::zero()).unwrap_err(),
            ClmmError::InvalidDivisor.into()
        );
    }

    #[test]
    fn test_amounts() {
        // 0.06% of 1000 tokens
        let fee = Decimal::new(600_000_000);
        assert_eq!(fee.mul_amount(1000).unwrap(), 0);
        assert_eq!(fee.mul_amount_up(1000).unwrap(), 1);
        assert_eq!(Decimal::one().mul_amount(u64::MAX).unwrap(), u64::MAX);
        assert!(Decimal::from_integer(2).unwrap().mul_amount(u64::MAX).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Decimal::new(1_500_000_000_000).to_string(), "1.500000000000");
        assert_eq!(Decimal::new(42).to_string(), "0.000000000042");
    }
}
