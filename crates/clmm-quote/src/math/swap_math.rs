//! Swap Math
//!
//! Core swap step computation, identical to the on-chain program's step so
//! quotes match settlement to the unit.

use crate::constants::DENOMINATOR;
use crate::errors::ClmmError;
use crate::math::decimal::Decimal;
use crate::math::sqrt_price_math::{
    get_delta_x, get_delta_y, get_next_sqrt_price_from_input, get_next_sqrt_price_from_output,
};
use anchor_lang::prelude::*;

/// Result of a single swap step computation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapStepResult {
    /// The new sqrt price after the swap step
    pub next_sqrt_price: Decimal,
    /// Amount of input token consumed (fee excluded)
    pub amount_in: u64,
    /// Amount of output token produced
    pub amount_out: u64,
    /// Fee charged on the input token
    pub fee_amount: u64,
}

/// A delta too large for u64 can never be reached by a u64 amount
fn saturating(amount: Result<u64>) -> Result<u64> {
    match amount {
        Err(error) if error == ClmmError::MathOverflow.into() => Ok(u64::MAX),
        other => other,
    }
}

/// Compute the result of a single swap step
///
/// # Arguments
/// * `current_sqrt_price` - Current sqrt price
/// * `target_sqrt_price` - Target sqrt price (next tick or price limit)
/// * `liquidity` - Active liquidity
/// * `amount` - Amount still to be swapped
/// * `by_amount_in` - true if `amount` is the exact input, false for exact output
/// * `fee` - Fee rate as a fraction of 1.0
///
/// The direction follows from the prices: a target at or below the current
/// price swaps X for Y.
pub fn compute_swap_step(
    current_sqrt_price: Decimal,
    target_sqrt_price: Decimal,
    liquidity: Decimal,
    amount: u64,
    by_amount_in: bool,
    fee: Decimal,
) -> Result<SwapStepResult> {
    require!(fee.v < DENOMINATOR, ClmmError::InvalidFee);

    if liquidity.is_zero() {
        // Empty range: jump straight to the target
        return Ok(SwapStepResult {
            next_sqrt_price: target_sqrt_price,
            amount_in: 0,
            amount_out: 0,
            fee_amount: 0,
        });
    }

    let x_to_y = current_sqrt_price >= target_sqrt_price;

    let mut amount_in = 0;
    let mut amount_out = 0;

    let next_sqrt_price = if by_amount_in {
        let amount_after_fee = Decimal::new(DENOMINATOR - fee.v).mul_amount(amount)?;

        amount_in = saturating(if x_to_y {
            get_delta_x(target_sqrt_price, current_sqrt_price, liquidity, true)
        } else {
            get_delta_y(current_sqrt_price, target_sqrt_price, liquidity, true)
        })?;

        if amount_after_fee >= amount_in {
            target_sqrt_price
        } else {
            get_next_sqrt_price_from_input(current_sqrt_price, liquidity, amount_after_fee, x_to_y)?
        }
    } else {
        amount_out = saturating(if x_to_y {
            get_delta_y(target_sqrt_price, current_sqrt_price, liquidity, false)
        } else {
            get_delta_x(current_sqrt_price, target_sqrt_price, liquidity, false)
        })?;

        if amount >= amount_out {
            target_sqrt_price
        } else {
            get_next_sqrt_price_from_output(current_sqrt_price, liquidity, amount, x_to_y)?
        }
    };

    let not_max = target_sqrt_price != next_sqrt_price;

    // Recompute whichever side was not pinned by reaching the target
    if x_to_y {
        if not_max || !by_amount_in {
            amount_in = get_delta_x(next_sqrt_price, current_sqrt_price, liquidity, true)?;
        }
        if not_max || by_amount_in {
            amount_out = get_delta_y(next_sqrt_price, current_sqrt_price, liquidity, false)?;
        }
    } else {
        if not_max || !by_amount_in {
            amount_in = get_delta_y(current_sqrt_price, next_sqrt_price, liquidity, true)?;
        }
        if not_max || by_amount_in {
            amount_out = get_delta_x(current_sqrt_price, next_sqrt_price, liquidity, false)?;
        }
    }

    if !by_amount_in && amount_out > amount {
        amount_out = amount;
    }

    let fee_amount = if by_amount_in && not_max {
        // Everything not swapped is kept as fee
        amount.saturating_sub(amount_in)
    } else {
        fee.mul_amount_up(amount_in)?
    };

    Ok(SwapStepResult {
        next_sqrt_price,
        amount_in,
        amount_out,
        fee_amount,
    })
}

/// Calculate the protocol's share of a fee
pub fn calculate_protocol_fee(fee_amount: u64, protocol_fee: Decimal) -> Result<u64> {
    if protocol_fee.is_zero() || fee_amount == 0 {
        return Ok(0);
    }
    require!(protocol_fee.v <= DENOMINATOR, ClmmError::InvalidFee);
    protocol_fee.mul_amount(fee_amount)
}

/// Whether `amount` moves the price at all
///
/// Amounts so small that the fee swallows them, or that round to a zero
/// price change, leave the pool untouched.
pub fn is_enough_amount_to_push_price(
    amount: u64,
    current_sqrt_price: Decimal,
    liquidity: Decimal,
    fee: Decimal,
    by_amount_in: bool,
    x_to_y: bool,
) -> Result<bool> {
    if liquidity.is_zero() || amount == 0 {
        return Ok(true);
    }
    require!(fee.v < DENOMINATOR, ClmmError::InvalidFee);

    let next_sqrt_price = if by_amount_in {
        let amount_after_fee = Decimal::new(DENOMINATOR - fee.v).mul_amount(amount)?;
        get_next_sqrt_price_from_input(current_sqrt_price, liquidity, amount_after_fee, x_to_y)?
    } else {
        get_next_sqrt_price_from_output(current_sqrt_price, liquidity, amount, x_to_y)?
    };

    Ok(current_sqrt_price != next_sqrt_price)
}
