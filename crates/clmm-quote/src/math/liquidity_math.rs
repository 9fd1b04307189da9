//! Liquidity Math
//!
//! Conversions between a position's liquidity and its token amounts over a
//! tick range, at a given current sqrt price.
//!
//! Below the range a position holds only X, above it only Y, inside it both.

use crate::constants::DENOMINATOR;
use crate::errors::ClmmError;
use crate::math::decimal::Decimal;
use crate::math::full_math::{div_floor, div_round_up, u256_to_u128, u256_to_u64, U256};
use crate::math::sqrt_price_math::{get_delta_x, get_delta_y};
use crate::math::tick_math::sqrt_price_at_tick;
use crate::state::Tick;
use anchor_lang::prelude::*;

/// Add a signed liquidity delta to existing liquidity
pub fn add_liquidity_delta(liquidity: Decimal, delta: i128) -> Result<Decimal> {
    let updated = if delta < 0 {
        liquidity.v.checked_sub(delta.unsigned_abs())
    } else {
        liquidity.v.checked_add(delta.unsigned_abs())
    };
    updated
        .map(Decimal::new)
        .ok_or_else(|| ClmmError::LiquidityOverflow.into())
}

fn d_squared() -> U256 {
    U256::from(DENOMINATOR) * U256::from(DENOMINATOR)
}

fn divide(nominator: U256, denominator: U256, round_up: bool) -> Result<U256> {
    if round_up {
        div_round_up(nominator, denominator)
    } else {
        div_floor(nominator, denominator)
    }
}

/// Liquidity provided by `x` tokens of X over [lower_tick, upper_tick]
///
/// # Returns
/// (liquidity, amount of Y that must accompany it)
///
/// Fails with `InvalidTickRange` when the range is empty or inverted, or
/// sits entirely below the current price, where a position holds no X.
pub fn liquidity_by_x(
    x: u64,
    lower_tick: i32,
    upper_tick: i32,
    current_sqrt_price: Decimal,
    round_up: bool,
) -> Result<(Decimal, u64)> {
    require!(!current_sqrt_price.is_zero(), ClmmError::InvalidPrice);
    require!(lower_tick < upper_tick, ClmmError::InvalidTickRange);
    let lower_sqrt_price = sqrt_price_at_tick(lower_tick)?;
    let upper_sqrt_price = sqrt_price_at_tick(upper_tick)?;

    if upper_sqrt_price < current_sqrt_price {
        return Err(ClmmError::InvalidTickRange.into());
    }

    if current_sqrt_price < lower_sqrt_price {
        // Whole range above the price: X only
        let nominator = lower_sqrt_price.big_mul_to_value(upper_sqrt_price) / U256::from(DENOMINATOR);
        let denominator = U256::from(upper_sqrt_price.v - lower_sqrt_price.v);
        let liquidity = div_floor(
            U256::from(x) * nominator * U256::from(DENOMINATOR),
            denominator,
        )?;
        return Ok((Decimal::new(u256_to_u128(liquidity)?), 0));
    }

    let nominator = current_sqrt_price.big_mul_to_value(upper_sqrt_price) / U256::from(DENOMINATOR);
    let denominator = U256::from(upper_sqrt_price.v - current_sqrt_price.v);
    let liquidity = div_floor(U256::from(x) * nominator, denominator)? * U256::from(DENOMINATOR);
    let liquidity = u256_to_u128(liquidity)?;

    let price_diff = current_sqrt_price.v - lower_sqrt_price.v;
    let y = divide(
        U256::from(price_diff) * U256::from(liquidity),
        d_squared(),
        round_up,
    )?;

    Ok((Decimal::new(liquidity), u256_to_u64(y)?))
}

/// Liquidity provided by `y` tokens of Y over [lower_tick, upper_tick]
///
/// # Returns
/// (liquidity, amount of X that must accompany it)
///
/// Fails with `InvalidTickRange` when the range is empty or inverted, or
/// sits entirely above the current price, where a position holds no Y.
pub fn liquidity_by_y(
    y: u64,
    lower_tick: i32,
    upper_tick: i32,
    current_sqrt_price: Decimal,
    round_up: bool,
) -> Result<(Decimal, u64)> {
    require!(!current_sqrt_price.is_zero(), ClmmError::InvalidPrice);
    require!(lower_tick < upper_tick, ClmmError::InvalidTickRange);
    let lower_sqrt_price = sqrt_price_at_tick(lower_tick)?;
    let upper_sqrt_price = sqrt_price_at_tick(upper_tick)?;

    if current_sqrt_price < lower_sqrt_price {
        return Err(ClmmError::InvalidTickRange.into());
    }

    if upper_sqrt_price <= current_sqrt_price {
        // Whole range below the price: Y only
        let denominator = U256::from(upper_sqrt_price.v - lower_sqrt_price.v);
        let liquidity = div_floor(U256::from(y) * d_squared(), denominator)?;
        return Ok((Decimal::new(u256_to_u128(liquidity)?), 0));
    }

    let denominator = U256::from(current_sqrt_price.v - lower_sqrt_price.v);
    let liquidity = u256_to_u128(div_floor(U256::from(y) * d_squared(), denominator)?)?;

    let nominator = U256::from(upper_sqrt_price.v - current_sqrt_price.v) * U256::from(liquidity);
    let price_product = current_sqrt_price.big_mul_to_value(upper_sqrt_price) / U256::from(DENOMINATOR);
    let x = divide(nominator, price_product * U256::from(DENOMINATOR), round_up)?;

    Ok((Decimal::new(liquidity), u256_to_u64(x)?))
}

/// X reserve of `liquidity` over [lower, upper] at `current`, as a Decimal
pub fn get_x(
    liquidity: Decimal,
    upper_sqrt_price: Decimal,
    current_sqrt_price: Decimal,
    lower_sqrt_price: Decimal,
) -> Result<Decimal> {
    require!(
        !upper_sqrt_price.is_zero() && !current_sqrt_price.is_zero() && !lower_sqrt_price.is_zero(),
        ClmmError::InvalidPrice
    );
    require!(lower_sqrt_price < upper_sqrt_price, ClmmError::InvalidTickRange);

    if current_sqrt_price >= upper_sqrt_price {
        return Ok(Decimal::zero());
    }

    let (nominator, denominator) = if current_sqrt_price < lower_sqrt_price {
        (
            upper_sqrt_price.v - lower_sqrt_price.v,
            lower_sqrt_price.checked_mul(upper_sqrt_price)?,
        )
    } else {
        (
            upper_sqrt_price.v - current_sqrt_price.v,
            upper_sqrt_price.checked_mul(current_sqrt_price)?,
        )
    };

    let amount = div_floor(
        U256::from(liquidity.v) * U256::from(nominator),
        U256::from(denominator.v),
    )?;
    Ok(Decimal::new(u256_to_u128(amount)?))
}

/// Y reserve of `liquidity` over [lower, upper] at `current`, as a Decimal
pub fn get_y(
    liquidity: Decimal,
    upper_sqrt_price: Decimal,
    current_sqrt_price: Decimal,
    lower_sqrt_price: Decimal,
) -> Result<Decimal> {
    require!(
        !upper_sqrt_price.is_zero() && !current_sqrt_price.is_zero() && !lower_sqrt_price.is_zero(),
        ClmmError::InvalidPrice
    );
    require!(lower_sqrt_price < upper_sqrt_price, ClmmError::InvalidTickRange);

    if current_sqrt_price <= lower_sqrt_price {
        return Ok(Decimal::zero());
    }

    let nominator = if current_sqrt_price > upper_sqrt_price {
        upper_sqrt_price.v - lower_sqrt_price.v
    } else {
        current_sqrt_price.v - lower_sqrt_price.v
    };

    liquidity.checked_mul(Decimal::new(nominator))
}

/// Token amounts for a liquidity change over [lower_tick, upper_tick]
///
/// Round up when computing what a depositor owes, down for what a
/// withdrawal releases.
///
/// # Returns
/// (amount_x, amount_y)
pub fn calculate_amount_delta(
    current_tick: i32,
    current_sqrt_price: Decimal,
    liquidity_delta: Decimal,
    round_up: bool,
    lower_tick: i32,
    upper_tick: i32,
) -> Result<(u64, u64)> {
    require!(lower_tick < upper_tick, ClmmError::InvalidTickRange);

    let lower_sqrt_price = sqrt_price_at_tick(lower_tick)?;
    let upper_sqrt_price = sqrt_price_at_tick(upper_tick)?;

    if current_tick < lower_tick {
        let x = get_delta_x(lower_sqrt_price, upper_sqrt_price, liquidity_delta, round_up)?;
        Ok((x, 0))
    } else if current_tick < upper_tick {
        let x = get_delta_x(current_sqrt_price, upper_sqrt_price, liquidity_delta, round_up)?;
        let y = get_delta_y(lower_sqrt_price, current_sqrt_price, liquidity_delta, round_up)?;
        Ok((x, y))
    } else {
        let y = get_delta_y(lower_sqrt_price, upper_sqrt_price, liquidity_delta, round_up)?;
        Ok((0, y))
    }
}

/// Fee growth per unit of liquidity accrued inside [lower, upper]
///
/// Fee growth counters are free-running and wrap, so every difference is
/// taken modulo 2^128. Only differences between two readings are meaningful.
///
/// # Returns
/// (fee_growth_inside_x, fee_growth_inside_y)
pub fn calculate_fee_growth_inside(
    lower: &Tick,
    upper: &Tick,
    current_tick: i32,
    fee_growth_global_x: u128,
    fee_growth_global_y: u128,
) -> (u128, u128) {
    let current_above_lower = current_tick >= lower.index;
    let current_below_upper = current_tick < upper.index;

    let outside = |global: u128, tick_outside: u128, on_this_side: bool| {
        if on_this_side {
            tick_outside
        } else {
            global.wrapping_sub(tick_outside)
        }
    };

    let below_x = outside(fee_growth_global_x, lower.fee_growth_outside_x, current_above_lower);
    let below_y = outside(fee_growth_global_y, lower.fee_growth_outside_y, current_above_lower);
    let above_x = outside(fee_growth_global_x, upper.fee_growth_outside_x, current_below_upper);
    let above_y = outside(fee_growth_global_y, upper.fee_growth_outside_y, current_below_upper);

    (
        fee_growth_global_x.wrapping_sub(below_x).wrapping_sub(above_x),
        fee_growth_global_y.wrapping_sub(below_y).wrapping_sub(above_y),
    )
}
