//! Swap Simulation
//!
//! Replays the on-chain swap loop against a pool snapshot to quote a swap
//! before sending it. Each step moves the price to the next initialized tick
//! (or the price limit), crossing ticks and updating active liquidity on the
//! way, exactly as settlement will.

use crate::constants::{MAX_SQRT_PRICE, MAX_TICK, MIN_TICK};
use crate::errors::ClmmError;
use crate::math::decimal::Decimal;
use crate::math::slippage::price_after_slippage;
use crate::math::swap_math::{calculate_protocol_fee, compute_swap_step};
use crate::math::tick_math::{align_tick_down, sqrt_price_at_tick, tick_at_sqrt_price};
use crate::state::{PoolSnapshot, TickMap, Tickmap};
use crate::utils::sqrt_price_to_price;
use anchor_lang::prelude::*;

/// Parameters of a swap to quote
#[derive(Clone, Copy, Debug)]
pub struct SwapRequest<'a> {
    /// true: X in, Y out (price decreasing)
    pub x_to_y: bool,
    /// true: `amount` is the exact input, false: the exact output
    pub by_amount_in: bool,
    /// Amount in raw token units
    pub amount: u64,
    /// Sqrt price the swap may not cross
    pub price_limit: Decimal,
    /// Tolerance applied on top of the price limit
    pub slippage: Decimal,
    /// Initialized ticks keyed by index
    pub ticks: &'a TickMap,
    /// Initialization bitmap of the pool
    pub tickmap: &'a Tickmap,
    /// Pool state the swap starts from
    pub pool: &'a PoolSnapshot,
}

/// Where the swap loop stands
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwapPhase {
    /// More steps are needed
    Stepping,
    /// The price reached the (slippage adjusted) limit
    PriceLimitReached,
    /// The whole amount was swapped
    AmountExhausted,
    /// No initialized tick remains in the swap direction
    NoLiquidity,
}

impl SwapPhase {
    pub fn is_terminal(&self) -> bool {
        *self != SwapPhase::Stepping
    }
}

/// Quote produced by a simulation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimulationResult {
    /// Input consumed, fees excluded
    pub amount_in: u64,
    pub amount_out: u64,
    pub fee_amount: u64,
    /// Protocol's share of `fee_amount`
    pub protocol_fee: u64,
    /// Part of the requested amount left unswapped
    pub remaining_amount: u64,
    pub final_sqrt_price: Decimal,
    pub final_tick: i32,
    pub final_liquidity: Decimal,
    /// Ticks crossed, in crossing order
    pub crossed_ticks: Vec<i32>,
    pub steps: u32,
    /// Whether the requested amount was swapped in full
    pub fully_filled: bool,
    pub phase: SwapPhase,
}

/// Step-by-step swap replay
///
/// `step` advances one tick range at a time; `run` drives it to a terminal
/// phase.
#[derive(Debug)]
pub struct SwapSimulator<'a> {
    x_to_y: bool,
    by_amount_in: bool,
    ticks: &'a TickMap,
    tickmap: &'a Tickmap,
    fee: Decimal,
    protocol_fee_rate: Decimal,
    tick_spacing: u16,
    sqrt_price_limit: Decimal,

    amount_remaining: u64,
    sqrt_price: Decimal,
    tick: i32,
    liquidity: Decimal,

    amount_in: u64,
    amount_out: u64,
    fee_amount: u64,
    protocol_fee: u64,
    crossed_ticks: Vec<i32>,
    steps: u32,
    phase: SwapPhase,
}

impl<'a> SwapSimulator<'a> {
    /// Validate a request and set up the swap state
    pub fn new(request: &SwapRequest<'a>) -> Result<Self> {
        require!(request.amount > 0, ClmmError::ZeroAmount);
        let pool = request.pool;
        pool.validate()?;

        // Limit is given as a sqrt price, slippage applies to the price itself
        let capped_limit = Decimal::new(request.price_limit.v.min(MAX_SQRT_PRICE));
        let sqrt_price_limit = if request.slippage.is_zero() {
            capped_limit
        } else {
            let limit_price = capped_limit.checked_mul(capped_limit)?;
            price_after_slippage(limit_price, request.slippage, !request.x_to_y)?
        };

        if request.x_to_y {
            require!(
                sqrt_price_limit < pool.sqrt_price,
                ClmmError::InvalidPriceLimit
            );
        } else {
            require!(
                sqrt_price_limit > pool.sqrt_price,
                ClmmError::InvalidPriceLimit
            );
        }

        Ok(Self {
            x_to_y: request.x_to_y,
            by_amount_in: request.by_amount_in,
            ticks: request.ticks,
            tickmap: request.tickmap,
            fee: pool.fee,
            protocol_fee_rate: pool.protocol_fee,
            tick_spacing: pool.tick_spacing,
            sqrt_price_limit,
            amount_remaining: request.amount,
            sqrt_price: pool.sqrt_price,
            tick: pool.current_tick_index,
            liquidity: pool.liquidity,
            amount_in: 0,
            amount_out: 0,
            fee_amount: 0,
            protocol_fee: 0,
            crossed_ticks: Vec::new(),
            steps: 0,
            phase: SwapPhase::Stepping,
        })
    }

    pub fn phase(&self) -> SwapPhase {
        self.phase
    }

    /// Effective sqrt price limit after slippage
    pub fn sqrt_price_limit(&self) -> Decimal {
        self.sqrt_price_limit
    }

    /// Nearest initialized tick in the swap direction
    ///
    /// Going down, the tick the price sits in counts; going up, it does not.
    fn next_tick(&self) -> Option<i32> {
        let base = align_tick_down(self.tick, self.tick_spacing);
        if self.x_to_y {
            self.tickmap
                .next_initialized(base, self.tick_spacing, false, MIN_TICK)
        } else {
            self.tickmap.next_initialized(
                base + self.tick_spacing as i32,
                self.tick_spacing,
                true,
                MAX_TICK,
            )
        }
    }

    /// Advance the swap by one step
    pub fn step(&mut self) -> Result<SwapPhase> {
        if self.phase.is_terminal() {
            return Ok(self.phase);
        }

        let Some(next_tick) = self.next_tick() else {
            self.phase = SwapPhase::NoLiquidity;
            return Ok(self.phase);
        };

        let next_tick_sqrt_price = sqrt_price_at_tick(next_tick)?;
        let target_sqrt_price = if self.x_to_y {
            next_tick_sqrt_price.max(self.sqrt_price_limit)
        } else {
            next_tick_sqrt_price.min(self.sqrt_price_limit)
        };

        let step = compute_swap_step(
            self.sqrt_price,
            target_sqrt_price,
            self.liquidity,
            self.amount_remaining,
            self.by_amount_in,
            self.fee,
        )?;

        self.amount_in = self
            .amount_in
            .checked_add(step.amount_in)
            .ok_or(ClmmError::MathOverflow)?;
        self.amount_out = self
            .amount_out
            .checked_add(step.amount_out)
            .ok_or(ClmmError::MathOverflow)?;
        self.fee_amount = self
            .fee_amount
            .checked_add(step.fee_amount)
            .ok_or(ClmmError::MathOverflow)?;
        self.protocol_fee = self
            .protocol_fee
            .checked_add(calculate_protocol_fee(step.fee_amount, self.protocol_fee_rate)?)
            .ok_or(ClmmError::MathOverflow)?;

        let consumed = if self.by_amount_in {
            step.amount_in
                .checked_add(step.fee_amount)
                .ok_or(ClmmError::MathOverflow)?
        } else {
            step.amount_out
        };
        self.amount_remaining = self
            .amount_remaining
            .checked_sub(consumed)
            .ok_or(ClmmError::MathOverflow)?;

        self.sqrt_price = step.next_sqrt_price;
        self.steps += 1;

        if self.sqrt_price == next_tick_sqrt_price {
            let tick = self
                .ticks
                .get(&next_tick)
                .ok_or(ClmmError::TickNotFound)?;
            self.liquidity = tick.cross(self.liquidity, self.x_to_y)?;
            self.crossed_ticks.push(next_tick);

            // Price now sits on the boundary, the active range is the one entered
            self.tick = if self.x_to_y {
                next_tick - self.tick_spacing as i32
            } else {
                next_tick
            };
        } else {
            self.tick = tick_at_sqrt_price(self.sqrt_price, self.tick_spacing)?;
        }

        self.phase = if self.amount_remaining == 0 {
            SwapPhase::AmountExhausted
        } else if self.sqrt_price == self.sqrt_price_limit {
            SwapPhase::PriceLimitReached
        } else {
            SwapPhase::Stepping
        };

        Ok(self.phase)
    }

    /// Step until a terminal phase and produce the quote
    pub fn run(mut self) -> Result<SimulationResult> {
        while !self.step()?.is_terminal() {}
        self.finish()
    }

    fn finish(self) -> Result<SimulationResult> {
        if self.phase == SwapPhase::NoLiquidity
            && self.amount_in == 0
            && self.amount_out == 0
            && self.crossed_ticks.is_empty()
        {
            return Err(ClmmError::InsufficientLiquidity.into());
        }

        msg!(
            "Simulated swap ({}): in {}, out {}, fee {}",
            if self.x_to_y { "x -> y" } else { "y -> x" },
            self.amount_in,
            self.amount_out,
            self.fee_amount
        );
        msg!(
            "Final price: {:.12}, tick: {}, ticks crossed: {}, phase: {:?}",
            sqrt_price_to_price(self.sqrt_price),
            self.tick,
            self.crossed_ticks.len(),
            self.phase
        );

        Ok(SimulationResult {
            amount_in: self.amount_in,
            amount_out: self.amount_out,
            fee_amount: self.fee_amount,
            protocol_fee: self.protocol_fee,
            remaining_amount: self.amount_remaining,
            final_sqrt_price: self.sqrt_price,
            final_tick: self.tick,
            final_liquidity: self.liquidity,
            crossed_ticks: self.crossed_ticks,
            steps: self.steps,
            fully_filled: self.amount_remaining == 0,
            phase: self.phase,
        })
    }
}

/// Quote a swap against a pool snapshot
pub fn simulate_swap(request: &SwapRequest) -> Result<SimulationResult> {
    SwapSimulator::new(request)?.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DENOMINATOR;
    use crate::state::{index_ticks, Tick};

    const LIQUIDITY: i128 = 1_000_000 * DENOMINATOR as i128;

    /// Two positions: [-20, 20] with L and [-60, 60] with L/2
    fn fixture() -> (PoolSnapshot, TickMap, Tickmap) {
        let ticks = index_ticks(vec![
            Tick::new(-60, LIQUIDITY / 2),
            Tick::new(-20, LIQUIDITY),
            Tick::new(20, -LIQUIDITY),
            Tick::new(60, -LIQUIDITY / 2),
        ]);
        let tickmap = Tickmap::from_initialized(ticks.keys().copied()).unwrap();
        let pool = PoolSnapshot {
            sqrt_price: Decimal::one(),
            liquidity: Decimal::new((LIQUIDITY + LIQUIDITY / 2) as u128),
            fee: Decimal::new(600_000_000),
            protocol_fee: Decimal::zero(),
            current_tick_index: 0,
            tick_spacing: 10,
        };
        (pool, ticks, tickmap)
    }

    fn request<'a>(
        pool: &'a PoolSnapshot,
        ticks: &'a TickMap,
        tickmap: &'a Tickmap,
        x_to_y: bool,
        by_amount_in: bool,
        amount: u64,
    ) -> SwapRequest<'a> {
        SwapRequest {
            x_to_y,
            by_amount_in,
            amount,
            price_limit: if x_to_y {
                Decimal::zero()
            } else {
                Decimal::new(MAX_SQRT_PRICE)
            },
            slippage: Decimal::zero(),
            ticks,
            tickmap,
            pool,
        }
    }

    #[test]
    fn test_swap_within_one_range() {
        let (pool, ticks, tickmap) = fixture();
        let result = simulate_swap(&request(&pool, &ticks, &tickmap, true, true, 1000)).unwrap();

        assert_eq!(result.amount_in, 999);
        assert_eq!(result.amount_out, 998);
        assert_eq!(result.fee_amount, 1);
        assert_eq!(result.final_sqrt_price.v, 999_334_443_261);
        assert_eq!(result.final_tick, -20);
        assert_eq!(result.final_liquidity, pool.liquidity);
        assert!(result.crossed_ticks.is_empty());
        assert_eq!(result.steps, 1);
        assert!(result.fully_filled);
        assert_eq!(result.phase, SwapPhase::AmountExhausted);
    }

    #[test]
    fn test_swap_crossing_down() {
        let (pool, ticks, tickmap) = fixture();
        let result = simulate_swap(&request(&pool, &ticks, &tickmap, true, true, 2000)).unwrap();

        assert_eq!(result.amount_in, 1998);
        assert_eq!(result.amount_out, 1994);
        assert_eq!(result.fee_amount, 2);
        assert_eq!(result.final_sqrt_price.v, 998_009_519_794);
        assert_eq!(result.final_tick, -40);
        assert_eq!(result.final_liquidity.v, (LIQUIDITY / 2) as u128);
        assert_eq!(result.crossed_ticks, vec![-20]);
        assert_eq!(result.steps, 2);
        assert_eq!(result.phase, SwapPhase::AmountExhausted);
    }

    #[test]
    fn test_swap_crossing_up() {
        let (pool, ticks, tickmap) = fixture();
        let result = simulate_swap(&request(&pool, &ticks, &tickmap, false, true, 2000)).unwrap();

        assert_eq!(result.amount_in, 1998);
        assert_eq!(result.amount_out, 1994);
        assert_eq!(result.fee_amount, 2);
        assert_eq!(result.final_sqrt_price.v, 1_001_994_450_120);
        assert_eq!(result.final_tick, 30);
        assert_eq!(result.final_liquidity.v, (LIQUIDITY / 2) as u128);
        assert_eq!(result.crossed_ticks, vec![20]);
        assert_eq!(result.phase, SwapPhase::AmountExhausted);
    }

    #[test]
    fn test_swap_runs_out_of_liquidity() {
        let (pool, ticks, tickmap) = fixture();
        let result =
            simulate_swap(&request(&pool, &ticks, &tickmap, true, true, 1_000_000_000)).unwrap();

        assert_eq!(result.amount_in, 2503);
        assert_eq!(result.amount_out, 2496);
        assert_eq!(result.fee_amount, 2);
        assert_eq!(result.remaining_amount, 999_997_495);
        assert_eq!(result.final_sqrt_price.v, 997_004_645_044);
        assert_eq!(result.final_tick, -70);
        assert_eq!(result.final_liquidity, Decimal::zero());
        assert_eq!(result.crossed_ticks, vec![-20, -60]);
        assert!(!result.fully_filled);
        assert_eq!(result.phase, SwapPhase::NoLiquidity);
    }

    #[test]
    fn test_swap_by_amount_out() {
        let (pool, ticks, tickmap) = fixture();
        let result = simulate_swap(&request(&pool, &ticks, &tickmap, false, false, 2500)).unwrap();

        assert_eq!(result.amount_in, 2503);
        assert_eq!(result.amount_out, 2496);
        assert_eq!(result.fee_amount, 2);
        assert_eq!(result.remaining_amount, 4);
        assert_eq!(result.final_sqrt_price.v, 1_003_004_354_062);
        assert_eq!(result.final_tick, 60);
        assert_eq!(result.crossed_ticks, vec![20, 60]);
        assert!(!result.fully_filled);
        assert_eq!(result.phase, SwapPhase::NoLiquidity);
    }

    #[test]
    fn test_swap_stops_at_price_limit() {
        let (pool, ticks, tickmap) = fixture();
        let mut swap = request(&pool, &ticks, &tickmap, true, true, 1_000_000_000);
        swap.price_limit = sqrt_price_at_tick(-30).unwrap();

        let result = simulate_swap(&swap).unwrap();
        assert_eq!(result.amount_in, 1752);
        assert_eq!(result.amount_out, 1748);
        assert_eq!(result.fee_amount, 2);
        // Without slippage the limit is honoured exactly
        assert_eq!(result.final_sqrt_price, swap.price_limit);
        assert_eq!(result.final_sqrt_price.v, 998_501_199_320);
        assert_eq!(result.final_tick, -30);
        assert_eq!(result.remaining_amount, 999_998_246);
        assert_eq!(result.crossed_ticks, vec![-20]);
        assert_eq!(result.phase, SwapPhase::PriceLimitReached);
    }

    #[test]
    fn test_tick_index_must_match_price() {
        let (pool, ticks, tickmap) = fixture();
        let stale = PoolSnapshot {
            current_tick_index: 40,
            ..pool
        };
        let swap = request(&stale, &ticks, &tickmap, true, true, 1000);
        assert_eq!(simulate_swap(&swap).unwrap_err(), ClmmError::InvalidPrice.into());
    }

    #[test]
    fn test_slippage_widens_limit() {
        let (pool, ticks, tickmap) = fixture();
        let mut swap = request(&pool, &ticks, &tickmap, true, true, 1_000_000_000);
        swap.price_limit = sqrt_price_at_tick(-30).unwrap();
        swap.slippage = Decimal::new(DENOMINATOR / 100);

        let simulator = SwapSimulator::new(&swap).unwrap();
        assert_eq!(simulator.sqrt_price_limit().v, 993_496_149_258);

        let result = simulator.run().unwrap();
        assert_eq!(result.crossed_ticks, vec![-20, -60]);
        assert_eq!(result.phase, SwapPhase::NoLiquidity);
    }

    #[test]
    fn test_protocol_fee_accumulates_per_step() {
        let (mut pool, ticks, tickmap) = fixture();
        pool.protocol_fee = Decimal::one();
        let result = simulate_swap(&request(&pool, &ticks, &tickmap, true, true, 2000)).unwrap();
        assert_eq!(result.protocol_fee, 2);

        pool.protocol_fee = Decimal::new(DENOMINATOR / 2);
        let result = simulate_swap(&request(&pool, &ticks, &tickmap, true, true, 2000)).unwrap();
        // Each step's half of 1 is floored away
        assert_eq!(result.protocol_fee, 0);
    }

    #[test]
    fn test_step_by_step() {
        let (pool, ticks, tickmap) = fixture();
        let swap = request(&pool, &ticks, &tickmap, true, true, 2000);
        let mut simulator = SwapSimulator::new(&swap).unwrap();

        assert_eq!(simulator.phase(), SwapPhase::Stepping);
        assert_eq!(simulator.step().unwrap(), SwapPhase::Stepping);
        assert_eq!(simulator.step().unwrap(), SwapPhase::AmountExhausted);
        // Terminal phases are sticky
        assert_eq!(simulator.step().unwrap(), SwapPhase::AmountExhausted);
    }

    #[test]
    fn test_invalid_requests() {
        let (pool, ticks, tickmap) = fixture();

        let zero = request(&pool, &ticks, &tickmap, true, true, 0);
        assert_eq!(simulate_swap(&zero).unwrap_err(), ClmmError::ZeroAmount.into());

        let mut wrong_side = request(&pool, &ticks, &tickmap, true, true, 100);
        wrong_side.price_limit = Decimal::from_integer(2).unwrap();
        assert_eq!(
            simulate_swap(&wrong_side).unwrap_err(),
            ClmmError::InvalidPriceLimit.into()
        );

        let mut at_price = request(&pool, &ticks, &tickmap, false, true, 100);
        at_price.price_limit = pool.sqrt_price;
        assert_eq!(
            simulate_swap(&at_price).unwrap_err(),
            ClmmError::InvalidPriceLimit.into()
        );

        let broken_pool = PoolSnapshot {
            sqrt_price: Decimal::zero(),
            ..pool
        };
        let swap = request(&broken_pool, &ticks, &tickmap, true, true, 100);
        assert_eq!(simulate_swap(&swap).unwrap_err(), ClmmError::InvalidPrice.into());
    }

    #[test]
    fn test_missing_tick_data() {
        let (pool, _, tickmap) = fixture();
        let ticks = TickMap::new();
        let swap = request(&pool, &ticks, &tickmap, true, true, 2000);
        assert_eq!(simulate_swap(&swap).unwrap_err(), ClmmError::TickNotFound.into());
    }

    #[test]
    fn test_empty_pool() {
        let (pool, ticks, _) = fixture();
        let tickmap = Tickmap::new();
        let swap = request(&pool, &ticks, &tickmap, true, true, 2000);
        assert_eq!(
            simulate_swap(&swap).unwrap_err(),
            ClmmError::InsufficientLiquidity.into()
        );
    }
}
