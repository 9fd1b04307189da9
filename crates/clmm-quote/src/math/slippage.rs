//! Slippage
//!
//! Turns a price and a tolerance into the sqrt price limit handed to a swap.

use crate::constants::DENOMINATOR;
use crate::errors::ClmmError;
use crate::math::decimal::Decimal;
use crate::math::full_math::{sqrt, u256_to_u128, U256};
use anchor_lang::prelude::*;

/// Sqrt price limit after applying a slippage tolerance to a price
///
/// # Arguments
/// * `price` - Price (not sqrt) the tolerance is applied to
/// * `slippage` - Tolerance as a fraction of 1.0
/// * `up` - Widen upward (price rising swaps) or downward
///
/// # Formula
/// sqrt(price * (1 ± slippage)), floored at scale 10^12
pub fn price_after_slippage(price: Decimal, slippage: Decimal, up: bool) -> Result<Decimal> {
    let multiplier = if up {
        DENOMINATOR.checked_add(slippage.v)
    } else {
        DENOMINATOR.checked_sub(slippage.v)
    }
    .ok_or(ClmmError::ValueOutOfRange)?;

    let price_with_slippage = U256::from(price.v) * U256::from(multiplier) / U256::from(DENOMINATOR);
    let sqrt_price = sqrt(price_with_slippage * U256::from(DENOMINATOR));

    Ok(Decimal::new(u256_to_u128(sqrt_price)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Square the limit back into price space
    fn squared(sqrt_price: Decimal) -> u128 {
        sqrt_price.checked_mul(sqrt_price).unwrap().v
    }

    #[test]
    fn test_no_slippage() {
        let price = Decimal::one();
        let zero = Decimal::zero();
        assert_eq!(squared(price_after_slippage(price, zero, true).unwrap()), DENOMINATOR);
        assert_eq!(squared(price_after_slippage(price, zero, false).unwrap()), DENOMINATOR);
    }

    #[test]
    fn test_slippage_fixtures() {
        let price = Decimal::one();
        let cases = [
            (10_000_000_000u128, 1_009_999_999_999u128, 989_999_999_998u128), // 1%
            (5_000_000_000, 1_004_999_999_999, 994_999_999_999),             // 0.5%
            (300_000, 1_000_000_299_998, 999_999_699_998),                   // 0.00003%
            (DENOMINATOR, 1_999_999_999_999, 0),                             // 100%
        ];

        for (slippage, expected_up, expected_down) in cases {
            let slippage = Decimal::new(slippage);
            assert_eq!(squared(price_after_slippage(price, slippage, true).unwrap()), expected_up);
            assert_eq!(
                squared(price_after_slippage(price, slippage, false).unwrap()),
                expected_down
            );
        }
    }

    #[test]
    fn test_full_slippage_down_is_zero() {
        let result = price_after_slippage(Decimal::from_integer(7).unwrap(), Decimal::one(), false);
        assert_eq!(result.unwrap(), Decimal::zero());
    }

    #[test]
    fn test_slippage_over_full_range() {
        let over = Decimal::new(DENOMINATOR + 1);
        assert_eq!(
            price_after_slippage(Decimal::one(), over, false).unwrap_err(),
            ClmmError::ValueOutOfRange.into()
        );
        assert!(price_after_slippage(Decimal::one(), over, true).is_ok());
    }

    proptest! {
        #[test]
        fn zero_tolerance_is_floor_sqrt(price in 1u128..10_000_000_000_000_000) {
            let root = price_after_slippage(Decimal::new(price), Decimal::zero(), true)
                .unwrap()
                .v;
            let scaled = price * DENOMINATOR;
            prop_assert!(root * root <= scaled);
            prop_assert!((root + 1) * (root + 1) > scaled);
        }

        #[test]
        fn monotonic_in_tolerance(
            price in 1u128..10_000_000_000_000_000,
            a in 0u128..=DENOMINATOR,
            b in 0u128..=DENOMINATOR,
        ) {
            let (low, high) = (a.min(b), a.max(b));
            let price = Decimal::new(price);

            let up_low = price_after_slippage(price, Decimal::new(low), true).unwrap();
            let up_high = price_after_slippage(price, Decimal::new(high), true).unwrap();
            prop_assert!(up_low <= up_high);

            let down_low = price_after_slippage(price, Decimal::new(low), false).unwrap();
            let down_high = price_after_slippage(price, Decimal::new(high), false).unwrap();
            prop_assert!(down_low >= down_high);
        }
    }
}
