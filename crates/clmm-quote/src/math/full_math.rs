//! Full precision math operations
//!
//! 256-bit intermediates for the fixed-point products used by the
//! tick, liquidity and swap math. Every value stored outside this module
//! is a u128 (or u64 token amount), so each narrowing is checked here.

use crate::errors::ClmmError;
use anchor_lang::prelude::*;

#[allow(clippy::manual_div_ceil, clippy::assign_op_pattern)]
mod uint_impl {
    use uint::construct_uint;
    construct_uint! {
        /// 256-bit unsigned integer.
        pub struct U256(4);
    }
}

pub use uint_impl::U256;

/// Multiply two u128 numbers and divide by a third, rounding down
///
/// # Formula
/// result = floor(a * b / denominator)
pub fn mul_div(a: u128, b: u128, denominator: u128) -> Result<u128> {
    if denominator == 0 {
        return Err(ClmmError::InvalidDivisor.into());
    }

    // a * b < 2^256, the product itself can never overflow
    let product = U256::from(a) * U256::from(b);
    u256_to_u128(product / U256::from(denominator))
}

/// Multiply two u128 numbers and divide by a third, rounding up
pub fn mul_div_round_up(a: u128, b: u128, denominator: u128) -> Result<u128> {
    if denominator == 0 {
        return Err(ClmmError::InvalidDivisor.into());
    }

    let product = U256::from(a) * U256::from(b);
    u256_to_u128(div_round_up(product, U256::from(denominator))?)
}

/// Divide two 256-bit values, rounding down
pub fn div_floor(numerator: U256, denominator: U256) -> Result<U256> {
    if denominator.is_zero() {
        return Err(ClmmError::InvalidDivisor.into());
    }
    Ok(numerator / denominator)
}

/// Divide two 256-bit values, rounding up
pub fn div_round_up(numerator: U256, denominator: U256) -> Result<U256> {
    if denominator.is_zero() {
        return Err(ClmmError::InvalidDivisor.into());
    }

    let quotient = numerator / denominator;
    if (numerator % denominator).is_zero() {
        Ok(quotient)
    } else {
        Ok(quotient + U256::one())
    }
}

/// Narrow a 256-bit value to u128
pub fn u256_to_u128(value: U256) -> Result<u128> {
    if value > U256::from(u128::MAX) {
        return Err(ClmmError::MathOverflow.into());
    }
    Ok(value.low_u128())
}

/// Narrow a 256-bit value to a u64 token amount
pub fn u256_to_u64(value: U256) -> Result<u64> {
    if value > U256::from(u64::MAX) {
        return Err(ClmmError::MathOverflow.into());
    }
    Ok(value.low_u64())
}

/// Integer square root (floor) using Newton's method
///
/// Starts from 2^ceil(bits/2), which is never below the root, so the
/// sequence decreases monotonically until it settles on floor(sqrt(value)).
pub fn sqrt(value: U256) -> U256 {
    if value.is_zero() {
        return U256::zero();
    }

    let mut x = U256::one() << ((value.bits() + 1) / 2);
    loop {
        let y = (x + value / x) >> 1;
        if y >= x {
            return x;
        }
        x = y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mul_div_simple() {
        // 10 * 20 / 5 = 40
        assert_eq!(mul_div(10, 20, 5).unwrap(), 40);
    }

    #[test]
    fn test_mul_div_large() {
        // Product overflows u128 but the quotient fits
        let a = u128::MAX / 3;
        let b = 6u128;
        assert_eq!(mul_div(a, b, 3).unwrap(), a * 2);
    }

    #[test]
    fn test_mul_div_zero_denominator() {
        assert_eq!(
            mul_div(10, 20, 0).unwrap_err(),
            ClmmError::InvalidDivisor.into()
        );
        assert!(mul_div_round_up(10, 20, 0).is_err());
        assert!(div_round_up(U256::from(1), U256::zero()).is_err());
    }

    #[test]
    fn test_mul_div_overflow() {
        assert_eq!(
            mul_div(u128::MAX, u128::MAX, 1).unwrap_err(),
            ClmmError::MathOverflow.into()
        );
    }

    #[test]
    fn test_mul_div_round_up() {
        assert_eq!(mul_div_round_up(10, 10, 3).unwrap(), 34);
        assert_eq!(mul_div(10, 10, 3).unwrap(), 33);
        // Exact division is not bumped
        assert_eq!(mul_div_round_up(10, 9, 3).unwrap(), 30);
    }

    #[test]
    fn test_narrowing() {
        assert_eq!(u256_to_u64(U256::from(u64::MAX)).unwrap(), u64::MAX);
        assert!(u256_to_u64(U256::from(u64::MAX) + U256::one()).is_err());
        assert_eq!(u256_to_u128(U256::from(u128::MAX)).unwrap(), u128::MAX);
        assert!(u256_to_u128(U256::from(u128::MAX) + U256::one()).is_err());
    }

    #[test]
    fn test_sqrt() {
        assert_eq!(sqrt(U256::zero()), U256::zero());
        assert_eq!(sqrt(U256::one()), U256::one());
        assert_eq!(sqrt(U256::from(15)), U256::from(3));
        assert_eq!(sqrt(U256::from(16)), U256::from(4));
        // 1.01 at scale 10^24
        assert_eq!(
            sqrt(U256::from(1_010_000_000_000_000_000_000_000u128)),
            U256::from(1_004_987_562_112u128)
        );
        let big = U256::from(u128::MAX) * U256::from(u128::MAX);
        assert_eq!(sqrt(big), U256::from(u128::MAX));
    }
}
