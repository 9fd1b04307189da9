use crate::constants::{MAX_TICK, MIN_TICK, TICKMAP_SIZE, TICK_LIMIT};
use crate::errors::ClmmError;
use crate::math::bit_math::{
    clear_bit, is_bit_set, least_significant_bit, most_significant_bit, next_bit_position,
    prev_bit_position, set_bit, WORD_BITS,
};
use crate::math::tick_math::align_tick_down;
use anchor_lang::prelude::*;

/// Number of words backing a tickmap
const WORD_COUNT: usize = TICKMAP_SIZE.div_ceil(WORD_BITS);

/// Packed size of a tickmap as stored by the on-chain program
pub const TICKMAP_BYTES: usize = TICKMAP_SIZE.div_ceil(8);

/// Which side of the reference tick a search covers
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SearchDirection {
    #[default]
    Both,
    Up,
    Down,
}

impl SearchDirection {
    fn includes_up(self) -> bool {
        self != SearchDirection::Down
    }

    fn includes_down(self) -> bool {
        self != SearchDirection::Up
    }
}

/// Initialization bitmap of a pool
///
/// One bit per tick in [MIN_TICK, MAX_TICK], stored at position
/// `tick + TICK_LIMIT` and packed into u128 words.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tickmap {
    words: Vec<u128>,
}

impl Default for Tickmap {
    fn default() -> Self {
        Self::new()
    }
}

impl Tickmap {
    /// Empty tickmap
    pub fn new() -> Self {
        Self {
            words: vec![0; WORD_COUNT],
        }
    }

    /// Build from the list of initialized ticks
    pub fn from_initialized<I: IntoIterator<Item = i32>>(ticks: I) -> Result<Self> {
        let mut tickmap = Self::new();
        for tick in ticks {
            tickmap.set(tick, true)?;
        }
        Ok(tickmap)
    }

    /// Build from a dense bit-per-tick slice
    ///
    /// Accepts the full `2 * TICK_LIMIT + 1` layout, or the `2 * TICK_LIMIT`
    /// layout that leaves out the topmost tick.
    pub fn from_dense(bits: &[bool]) -> Result<Self> {
        require!(
            bits.len() == TICKMAP_SIZE || bits.len() == TICKMAP_SIZE - 1,
            ClmmError::InvalidTickmap
        );

        let mut tickmap = Self::new();
        for (position, _) in bits.iter().enumerate().filter(|(_, set)| **set) {
            tickmap.set_position(position, true);
        }
        Ok(tickmap)
    }

    /// Build from the packed on-chain layout (bit `i % 8` of byte `i / 8`)
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        require!(bytes.len() == TICKMAP_BYTES, ClmmError::InvalidTickmap);

        let mut tickmap = Self::new();
        for (index, byte) in bytes.iter().enumerate().filter(|(_, byte)| **byte != 0) {
            for bit in 0..8 {
                let position = index * 8 + bit;
                if byte & (1u8 << bit) != 0 && position < TICKMAP_SIZE {
                    tickmap.set_position(position, true);
                }
            }
        }
        Ok(tickmap)
    }

    fn position(tick: i32) -> Result<usize> {
        require!(
            (MIN_TICK..=MAX_TICK).contains(&tick),
            ClmmError::TickOutOfRange
        );
        Ok((tick + TICK_LIMIT) as usize)
    }

    fn set_position(&mut self, position: usize, initialized: bool) {
        let word = &mut self.words[position / WORD_BITS];
        let bit = (position % WORD_BITS) as u8;
        *word = if initialized {
            set_bit(*word, bit)
        } else {
            clear_bit(*word, bit)
        };
    }

    /// Mark a tick as initialized or not
    pub fn set(&mut self, tick: i32, initialized: bool) -> Result<()> {
        let position = Self::position(tick)?;
        self.set_position(position, initialized);
        Ok(())
    }

    /// Check whether a tick is initialized
    pub fn get(&self, tick: i32) -> Result<bool> {
        let position = Self::position(tick)?;
        Ok(is_bit_set(
            self.words[position / WORD_BITS],
            (position % WORD_BITS) as u8,
        ))
    }

    /// First set position at or after `position`
    fn next_set_position(&self, position: usize) -> Option<usize> {
        let mut index = position / WORD_BITS;
        if let Some(bit) = next_bit_position(*self.words.get(index)?, (position % WORD_BITS) as u8) {
            return Some(index * WORD_BITS + bit as usize);
        }

        index += 1;
        while index < self.words.len() {
            if let Some(bit) = least_significant_bit(self.words[index]) {
                return Some(index * WORD_BITS + bit as usize);
            }
            index += 1;
        }
        None
    }

    /// Last set position at or before `position`
    fn prev_set_position(&self, position: usize) -> Option<usize> {
        let mut index = position / WORD_BITS;
        if let Some(bit) = prev_bit_position(*self.words.get(index)?, (position % WORD_BITS) as u8) {
            return Some(index * WORD_BITS + bit as usize);
        }

        while index > 0 {
            index -= 1;
            if let Some(bit) = most_significant_bit(self.words[index]) {
                return Some(index * WORD_BITS + bit as usize);
            }
        }
        None
    }

    /// Nearest initialized tick that is a multiple of `tick_spacing`
    ///
    /// Looks at [tick, bound] when `up`, otherwise [bound, tick]; both ends
    /// inclusive. Out-of-range parts of the interval are skipped.
    pub fn next_initialized(&self, tick: i32, tick_spacing: u16, up: bool, bound: i32) -> Option<i32> {
        let spacing = tick_spacing.max(1) as i32;

        if up {
            let bound = bound.min(MAX_TICK);
            let mut position = Self::position(tick.max(MIN_TICK)).ok()?;
            loop {
                let found = self.next_set_position(position)?;
                let candidate = found as i32 - TICK_LIMIT;
                if candidate > bound {
                    return None;
                }
                if candidate % spacing == 0 {
                    return Some(candidate);
                }
                position = found + 1;
            }
        } else {
            let bound = bound.max(MIN_TICK);
            let mut position = Self::position(tick.min(MAX_TICK)).ok()?;
            loop {
                let found = self.prev_set_position(position)?;
                let candidate = found as i32 - TICK_LIMIT;
                if candidate < bound {
                    return None;
                }
                if candidate % spacing == 0 {
                    return Some(candidate);
                }
                position = found.checked_sub(1)?;
            }
        }
    }
}

/// Find the initialized ticks closest to a reference tick
///
/// Candidates are visited in rings around `base = floor(reference / spacing) * spacing`:
/// for i in 0..range/spacing the down candidate `base - i*spacing` comes before
/// the up candidate `base + (i+1)*spacing`. Matches are collected in that order
/// until `limit` are found, and returned sorted ascending.
pub fn find_closest_ticks(
    tickmap: &Tickmap,
    reference_tick: i32,
    tick_spacing: u16,
    limit: usize,
    range: i32,
    direction: SearchDirection,
) -> Result<Vec<i32>> {
    require!(tick_spacing > 0, ClmmError::InvalidTickSpacing);
    require!(
        (MIN_TICK..=MAX_TICK).contains(&reference_tick),
        ClmmError::TickOutOfRange
    );

    let spacing = tick_spacing as i32;
    let base = align_tick_down(reference_tick, tick_spacing);
    let steps = i64::from(range.max(0) / spacing);
    if steps == 0 || limit == 0 {
        return Ok(Vec::new());
    }

    // Last candidates visited on each side, clamped to the tickmap
    let down_bound = (i64::from(base) - (steps - 1) * i64::from(spacing)).max(i64::from(MIN_TICK)) as i32;
    let up_bound = (i64::from(base) + steps * i64::from(spacing)).min(i64::from(MAX_TICK)) as i32;

    let next_below = |from: i32| tickmap.next_initialized(from, tick_spacing, false, down_bound);
    let next_above = |from: i32| tickmap.next_initialized(from, tick_spacing, true, up_bound);

    let mut below = if direction.includes_down() { next_below(base) } else { None };
    let mut above = if direction.includes_up() { next_above(base + spacing) } else { None };

    let mut lower = Vec::new();
    let mut upper = Vec::new();
    while lower.len() + upper.len() < limit {
        match (below, above) {
            // Ring of the up candidate is strictly closer
            (Some(down), Some(up)) if (base - down) / spacing >= (up - base) / spacing => {
                upper.push(up);
                above = next_above(up + spacing);
            }
            (Some(down), _) => {
                lower.push(down);
                below = next_below(down - spacing);
            }
            (None, Some(up)) => {
                upper.push(up);
                above = next_above(up + spacing);
            }
            (None, None) => break,
        }
    }

    lower.reverse();
    lower.extend(upper);
    Ok(lower)
}
