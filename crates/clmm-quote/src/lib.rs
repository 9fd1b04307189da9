//! clmm-quote - Concentrated Liquidity Math Engine and Swap Quoter
//!
//! Client-side companion of a concentrated liquidity AMM program: the same
//! fixed-point math the program settles with, plus a swap simulator that
//! replays the on-chain swap loop against a pool snapshot to produce quotes.
//!
//! ## Architecture
//!
//! - **Math**: 10^12 fixed-point `Decimal`, tick/sqrt price conversion,
//!   liquidity/amount conversion, slippage limits, swap steps
//! - **State**: read-only snapshots of pools, ticks and tick bitmaps
//! - **Simulation**: step-by-step swap replay with tick crossing
//! - **Utils**: little-endian codec for the program's wide integer fields
//!
//! Every function is pure and synchronous; nothing here talks to the chain.

pub mod constants;
pub mod errors;
pub mod math;
pub mod simulation;
pub mod state;
pub mod utils;

pub use errors::ClmmError;
pub use math::decimal::Decimal;
pub use simulation::{simulate_swap, SimulationResult, SwapPhase, SwapRequest, SwapSimulator};
pub use state::{find_closest_ticks, PoolSnapshot, SearchDirection, Tick, TickMap, Tickmap};
