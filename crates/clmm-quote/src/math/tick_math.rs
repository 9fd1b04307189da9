//! Tick Math
//!
//! Converts between tick indices and sqrt prices.
//!
//! price(tick) = 1.0001^tick
//! sqrt_price(tick) = 1.0001^(tick/2), scaled by 10^12

use crate::constants::{DENOMINATOR, MAX_TICK, MIN_SQRT_PRICE, MIN_TICK};
use crate::errors::ClmmError;
use crate::math::decimal::Decimal;
use crate::math::full_math::mul_div;
use anchor_lang::prelude::*;

/// sqrt(1.0001)^(2^i) at scale 10^12, one entry per bit of |tick|
const SQRT_POWERS: [u128; 18] = [
    1_000_049_998_750,   // 2^0
    1_000_100_000_000,   // 2^1
    1_000_200_010_000,   // 2^2
    1_000_400_060_004,   // 2^3
    1_000_800_280_056,   // 2^4
    1_001_601_200_560,   // 2^5
    1_003_204_964_963,   // 2^6
    1_006_420_201_726,   // 2^7
    1_012_881_622_442,   // 2^8
    1_025_929_181_080,   // 2^9
    1_052_530_684_591,   // 2^10
    1_107_820_842_005,   // 2^11
    1_227_267_017_980,   // 2^12
    1_506_184_333_421,   // 2^13
    2_268_591_246_242,   // 2^14
    5_146_506_242_525,   // 2^15
    26_486_526_504_348,  // 2^16
    701_536_086_265_529, // 2^17
];

/// Get the sqrt price at a given tick
///
/// # Arguments
/// * `tick` - Tick index in [MIN_TICK, MAX_TICK]
///
/// # Returns
/// sqrt(1.0001^tick) as a Decimal. Each multiply is floored back to scale,
/// negative ticks take the floored reciprocal.
pub fn sqrt_price_at_tick(tick: i32) -> Result<Decimal> {
    require!(
        (MIN_TICK..=MAX_TICK).contains(&tick),
        ClmmError::TickOutOfRange
    );

    let abs_tick = tick.unsigned_abs();
    let mut sqrt_price = DENOMINATOR;
    for (bit, factor) in SQRT_POWERS.iter().enumerate() {
        if abs_tick & (1u32 << bit) != 0 {
            sqrt_price = mul_div(sqrt_price, *factor, DENOMINATOR)?;
        }
    }

    if tick < 0 {
        sqrt_price = mul_div(DENOMINATOR, DENOMINATOR, sqrt_price)?;
    }

    Ok(Decimal::new(sqrt_price))
}

/// Get the tick whose range contains a sqrt price, aligned to the spacing
///
/// Returns the largest tick `t` with `sqrt_price_at_tick(t) <= sqrt_price`,
/// rounded down to a multiple of `tick_spacing`.
pub fn tick_at_sqrt_price(sqrt_price: Decimal, tick_spacing: u16) -> Result<i32> {
    require!(!sqrt_price.is_zero(), ClmmError::InvalidPrice);
    require!(tick_spacing > 0, ClmmError::InvalidTickSpacing);
    require!(sqrt_price.v >= MIN_SQRT_PRICE, ClmmError::TickOutOfRange);

    // Invariant: sqrt_price_at_tick(low) <= sqrt_price
    let mut low = MIN_TICK;
    let mut high = MAX_TICK;
    while low < high {
        let mid = low + (high - low + 1) / 2;
        if sqrt_price_at_tick(mid)? <= sqrt_price {
            low = mid;
        } else {
            high = mid - 1;
        }
    }

    let aligned = align_tick_down(low, tick_spacing);
    require!(aligned >= MIN_TICK, ClmmError::TickOutOfRange);
    Ok(aligned)
}

/// Check if tick is valid for given tick spacing
pub fn is_valid_tick(tick: i32, tick_spacing: u16) -> bool {
    tick_spacing > 0
        && (MIN_TICK..=MAX_TICK).contains(&tick)
        && tick % tick_spacing as i32 == 0
}

/// Round a tick down to the nearest multiple of the spacing
pub fn align_tick_down(tick: i32, tick_spacing: u16) -> i32 {
    let spacing = tick_spacing.max(1) as i32;
    tick.div_euclid(spacing) * spacing
}
