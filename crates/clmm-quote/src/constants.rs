// clmm-quote protocol constants
// Mirrors the parameters of the on-chain program the quotes are computed for

/// Scale of every `Decimal` value (10^12 = 1.0)
pub const DENOMINATOR: u128 = 1_000_000_000_000;

/// Number of decimal places carried by `Decimal`
pub const DECIMAL_SCALE: u8 = 12;

/// Largest absolute tick index (p(i) = 1.0001^i).
/// The sqrt price of this tick is the largest one that fits the fixed-point domain.
pub const TICK_LIMIT: i32 = 221_818;

/// Minimum tick index
pub const MIN_TICK: i32 = -TICK_LIMIT;

/// Maximum tick index
pub const MAX_TICK: i32 = TICK_LIMIT;

/// Sqrt price at `MIN_TICK` (scale 10^12)
pub const MIN_SQRT_PRICE: u128 = 15_258_932;

/// Sqrt price at `MAX_TICK` (scale 10^12)
pub const MAX_SQRT_PRICE: u128 = 65_535_383_934_512_647;

/// Number of bits in a tickmap (one per tick in [MIN_TICK, MAX_TICK])
pub const TICKMAP_SIZE: usize = (2 * TICK_LIMIT + 1) as usize;

/// Default distance, in ticks, covered by a closest-tick search
pub const DEFAULT_SEARCH_RANGE: i32 = TICK_LIMIT;
