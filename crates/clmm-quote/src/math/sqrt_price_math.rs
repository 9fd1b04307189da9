//! Sqrt Price Math
//!
//! Token deltas between two sqrt prices and the sqrt price reached after
//! adding or removing a token amount at constant liquidity.
//!
//! delta_x = L * |sqrt_a - sqrt_b| / (sqrt_a * sqrt_b)
//! delta_y = L * |sqrt_a - sqrt_b|

use crate::constants::DENOMINATOR;
use crate::errors::ClmmError;
use crate::math::decimal::Decimal;
use crate::math::full_math::{div_floor, div_round_up, u256_to_u128, u256_to_u64, U256};
use anchor_lang::prelude::*;

/// Amount of token X between two sqrt prices
///
/// Result is in raw token units. The rounding direction is chosen by the
/// caller: up for amounts paid into the pool, down for amounts paid out.
pub fn get_delta_x(
    sqrt_price_a: Decimal,
    sqrt_price_b: Decimal,
    liquidity: Decimal,
    round_up: bool,
) -> Result<u64> {
    require!(
        !sqrt_price_a.is_zero() && !sqrt_price_b.is_zero(),
        ClmmError::InvalidPrice
    );

    let delta_price = sqrt_price_a.v.abs_diff(sqrt_price_b.v);
    let nominator = U256::from(delta_price) * U256::from(liquidity.v);
    let denominator = sqrt_price_a.big_mul_to_value(sqrt_price_b);

    let amount = if round_up {
        div_round_up(nominator, denominator)?
    } else {
        div_floor(nominator, denominator)?
    };
    u256_to_u64(amount)
}

/// Amount of token Y between two sqrt prices
pub fn get_delta_y(
    sqrt_price_a: Decimal,
    sqrt_price_b: Decimal,
    liquidity: Decimal,
    round_up: bool,
) -> Result<u64> {
    let delta_price = sqrt_price_a.v.abs_diff(sqrt_price_b.v);
    let nominator = U256::from(delta_price) * U256::from(liquidity.v);
    let denominator = U256::from(DENOMINATOR) * U256::from(DENOMINATOR);

    let amount = if round_up {
        div_round_up(nominator, denominator)?
    } else {
        div_floor(nominator, denominator)?
    };
    u256_to_u64(amount)
}

/// Next sqrt price after swapping in `amount`
pub fn get_next_sqrt_price_from_input(
    sqrt_price: Decimal,
    liquidity: Decimal,
    amount: u64,
    x_to_y: bool,
) -> Result<Decimal> {
    require!(!sqrt_price.is_zero(), ClmmError::InvalidPrice);
    require!(!liquidity.is_zero(), ClmmError::InvalidDivisor);

    if x_to_y {
        get_next_sqrt_price_x_up(sqrt_price, liquidity, amount, true)
    } else {
        get_next_sqrt_price_y_down(sqrt_price, liquidity, amount, true)
    }
}

/// Next sqrt price after swapping out `amount`
pub fn get_next_sqrt_price_from_output(
    sqrt_price: Decimal,
    liquidity: Decimal,
    amount: u64,
    x_to_y: bool,
) -> Result<Decimal> {
    require!(!sqrt_price.is_zero(), ClmmError::InvalidPrice);
    require!(!liquidity.is_zero(), ClmmError::InvalidDivisor);

    if x_to_y {
        get_next_sqrt_price_y_down(sqrt_price, liquidity, amount, false)
    } else {
        get_next_sqrt_price_x_up(sqrt_price, liquidity, amount, false)
    }
}

/// Sqrt price after adding (or removing) X, rounded up
///
/// # Formula
/// next = L * P / (L ± amount * P)
pub fn get_next_sqrt_price_x_up(
    sqrt_price: Decimal,
    liquidity: Decimal,
    amount: u64,
    add: bool,
) -> Result<Decimal> {
    if amount == 0 {
        return Ok(sqrt_price);
    }

    let product = U256::from(amount) * U256::from(sqrt_price.v);
    let liquidity_big = U256::from(liquidity.v);
    let denominator = if add {
        liquidity_big + product
    } else {
        // Removing X beyond the reserve
        match liquidity_big.checked_sub(product) {
            Some(denominator) if !denominator.is_zero() => denominator,
            _ => return Err(ClmmError::InsufficientLiquidity.into()),
        }
    };

    let nominator = liquidity.big_mul_to_value(sqrt_price);
    Ok(Decimal::new(u256_to_u128(div_round_up(nominator, denominator)?)?))
}

/// Sqrt price after adding (or removing) Y, rounded down
///
/// # Formula
/// next = P ± amount / L
pub fn get_next_sqrt_price_y_down(
    sqrt_price: Decimal,
    liquidity: Decimal,
    amount: u64,
    add: bool,
) -> Result<Decimal> {
    require!(!liquidity.is_zero(), ClmmError::InvalidDivisor);

    let nominator = U256::from(amount) * U256::from(DENOMINATOR) * U256::from(DENOMINATOR);
    let liquidity_big = U256::from(liquidity.v);

    if add {
        let quotient = u256_to_u128(nominator / liquidity_big)?;
        sqrt_price.checked_add(Decimal::new(quotient))
    } else {
        let quotient = div_round_up(nominator, liquidity_big)?;
        if quotient >= U256::from(sqrt_price.v) {
            return Err(ClmmError::InsufficientLiquidity.into());
        }
        Ok(Decimal::new(sqrt_price.v - quotient.low_u128()))
    }
}
