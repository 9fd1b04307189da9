use crate::errors::ClmmError;
use crate::math::decimal::Decimal;
use crate::math::liquidity_math::add_liquidity_delta;
use anchor_lang::prelude::*;
use bytemuck::{Pod, Zeroable};
use std::collections::HashMap;

/// Tick data as read from the on-chain program
/// Each initialized tick is a price point where active liquidity changes
/// Zero-copy compatible layout, so raw account bytes can be cast directly
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Default, Debug, Copy, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct Tick {
    /// Net liquidity change when crossing this tick (scale 10^12)
    /// When price moves up through tick: add liquidity_net
    /// When price moves down through tick: subtract liquidity_net
    pub liquidity_net: i128,         // 16 bytes, offset 0

    /// Total liquidity referencing this tick
    pub liquidity_gross: u128,       // 16 bytes, offset 16

    /// Fee growth on the other side of this tick (token X)
    pub fee_growth_outside_x: u128,  // 16 bytes, offset 32

    /// Fee growth on the other side of this tick (token Y)
    pub fee_growth_outside_y: u128,  // 16 bytes, offset 48

    /// Seconds per liquidity on the other side of this tick
    pub seconds_per_liquidity_outside: u128,  // 16 bytes, offset 64

    /// Tick index
    pub index: i32,                  // 4 bytes, offset 80

    /// Padding for 16-byte alignment
    pub _padding: [u8; 12],          // 12 bytes, offset 84
}
// Total: 96 bytes

const _: () = assert!(std::mem::size_of::<Tick>() == 96);

/// Ticks of one pool keyed by index
pub type TickMap = HashMap<i32, Tick>;

impl Tick {
    /// Size in bytes
    pub const LEN: usize = 96;

    pub fn new(index: i32, liquidity_net: i128) -> Self {
        Self {
            index,
            liquidity_net,
            liquidity_gross: liquidity_net.unsigned_abs(),
            ..Self::default()
        }
    }

    /// Read a tick from raw account bytes
    pub fn load(data: &[u8]) -> Result<Self> {
        bytemuck::try_pod_read_unaligned::<Tick>(data)
            .map_err(|_| ClmmError::InvalidTickData.into())
    }

    /// Active liquidity after the price crosses this tick
    pub fn cross(&self, liquidity: Decimal, x_to_y: bool) -> Result<Decimal> {
        let delta = if x_to_y {
            self.liquidity_net
                .checked_neg()
                .ok_or(ClmmError::LiquidityOverflow)?
        } else {
            self.liquidity_net
        };
        add_liquidity_delta(liquidity, delta)
    }
}

/// Index a list of ticks by their tick index
pub fn index_ticks<I: IntoIterator<Item = Tick>>(ticks: I) -> TickMap {
    ticks.into_iter().map(|tick| (tick.index, tick)).collect()
}
