use crate::constants::{DENOMINATOR, MAX_TICK, MIN_TICK};
use crate::errors::ClmmError;
use crate::math::decimal::Decimal;
use crate::math::tick_math::{align_tick_down, sqrt_price_at_tick};
use anchor_lang::prelude::*;

/// Pool state snapshot - the part of a pool a swap quote depends on
/// Read from the chain by the caller; never written back
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolSnapshot {
    /// Current sqrt price
    pub sqrt_price: Decimal,

    /// Total liquidity currently in range
    pub liquidity: Decimal,

    /// Swap fee as a fraction of the input
    pub fee: Decimal,

    /// Protocol share of the swap fee
    pub protocol_fee: Decimal,

    /// Current tick index
    pub current_tick_index: i32,

    /// Tick spacing for this pool
    pub tick_spacing: u16,
}

impl PoolSnapshot {
    /// Check the snapshot can be swapped against
    pub fn validate(&self) -> Result<()> {
        require!(!self.sqrt_price.is_zero(), ClmmError::InvalidPrice);
        require!(self.tick_spacing > 0, ClmmError::InvalidTickSpacing);
        require!(
            (MIN_TICK..=MAX_TICK).contains(&self.current_tick_index),
            ClmmError::TickOutOfRange
        );
        require!(self.fee.v < DENOMINATOR, ClmmError::InvalidFee);
        require!(self.protocol_fee.v <= DENOMINATOR, ClmmError::InvalidFee);

        // The price must lie in the spacing-aligned range of the current tick.
        // Upper bound is inclusive: crossing down leaves the price on it.
        let base = align_tick_down(self.current_tick_index, self.tick_spacing);
        let lower = sqrt_price_at_tick(base.max(MIN_TICK))?;
        let upper = sqrt_price_at_tick((base + self.tick_spacing as i32).min(MAX_TICK))?;
        require!(
            lower <= self.sqrt_price && self.sqrt_price <= upper,
            ClmmError::InvalidPrice
        );
        Ok(())
    }
}
