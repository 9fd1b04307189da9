//! Bit Math
//!
//! Word-level bit scans used by the tickmap search.

/// Number of bits in a bitmap word
pub const WORD_BITS: usize = 128;

/// Find the most significant bit (position of highest set bit)
/// Returns None for input 0
#[inline]
pub fn most_significant_bit(x: u128) -> Option<u8> {
    if x == 0 {
        None
    } else {
        Some(127 - x.leading_zeros() as u8)
    }
}

/// Find the least significant bit (position of lowest set bit)
/// Returns None for input 0
#[inline]
pub fn least_significant_bit(x: u128) -> Option<u8> {
    if x == 0 {
        None
    } else {
        Some(x.trailing_zeros() as u8)
    }
}

/// Find position of next set bit at or after position
pub fn next_bit_position(word: u128, position: u8) -> Option<u8> {
    if position as usize >= WORD_BITS {
        return None;
    }
    least_significant_bit(word & (u128::MAX << position))
}

/// Find position of previous set bit at or before position
pub fn prev_bit_position(word: u128, position: u8) -> Option<u8> {
    let position = position.min(127);
    // bits [0, position]
    let mask = u128::MAX >> (127 - position);
    most_significant_bit(word & mask)
}

#[inline]
pub fn is_bit_set(word: u128, position: u8) -> bool {
    (position as usize) < WORD_BITS && (word >> position) & 1 == 1
}

#[inline]
pub fn set_bit(word: u128, position: u8) -> u128 {
    if position as usize >= WORD_BITS {
        return word;
    }
    word | (1u128 << position)
}

#[inline]
pub fn clear_bit(word: u128, position: u8) -> u128 {
    if position as usize >= WORD_BITS {
        return word;
    }
    word & !(1u128 << position)
}
