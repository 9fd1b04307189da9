//! Utility functions for clmm-quote

use crate::constants::DENOMINATOR;
use crate::errors::ClmmError;
use crate::math::decimal::Decimal;
use crate::math::full_math::U256;
use anchor_lang::prelude::*;

/// Calculate the price from sqrt price
/// price = sqrt_price^2
pub fn sqrt_price_to_price(sqrt_price: Decimal) -> f64 {
    let sqrt_price = sqrt_price.v as f64 / DENOMINATOR as f64;
    sqrt_price * sqrt_price
}

/// Calculate sqrt price from price
/// sqrt_price = sqrt(price) * 10^12
pub fn price_to_sqrt_price(price: f64) -> Decimal {
    let sqrt_price = price.sqrt();
    Decimal::new((sqrt_price * DENOMINATOR as f64) as u128)
}

/// Byte length of a field `bit_width` bits wide
fn byte_width(bit_width: usize) -> Result<usize> {
    require!(
        bit_width > 0 && bit_width % 8 == 0 && bit_width <= 256,
        ClmmError::ValueOutOfRange
    );
    Ok(bit_width / 8)
}

/// Encode an unsigned integer as a little-endian field of `bit_width` bits
pub fn big_number_to_buffer(value: U256, bit_width: usize) -> Result<Vec<u8>> {
    let len = byte_width(bit_width)?;
    require!(value.bits() <= bit_width, ClmmError::ValueOutOfRange);

    let mut bytes = [0u8; 32];
    for (chunk, limb) in bytes.chunks_exact_mut(8).zip(value.0.iter()) {
        chunk.copy_from_slice(&limb.to_le_bytes());
    }
    Ok(bytes[..len].to_vec())
}

/// Encode a signed integer as a two's complement little-endian field
pub fn signed_number_to_buffer(value: i128, bit_width: usize) -> Result<Vec<u8>> {
    let len = byte_width(bit_width)?;
    if bit_width < 128 {
        let max = (1i128 << (bit_width - 1)) - 1;
        let min = -(1i128 << (bit_width - 1));
        require!(
            (min..=max).contains(&value),
            ClmmError::ValueOutOfRange
        );
    }

    let fill = if value < 0 { 0xff } else { 0x00 };
    let mut bytes = vec![fill; len];
    let raw = value.to_le_bytes();
    let copied = len.min(raw.len());
    bytes[..copied].copy_from_slice(&raw[..copied]);
    Ok(bytes)
}

/// Decode an unsigned little-endian field
pub fn buffer_to_big_number(bytes: &[u8]) -> Result<U256> {
    require!(bytes.len() <= 32, ClmmError::ValueOutOfRange);
    Ok(U256::from_little_endian(bytes))
}

/// Decode a two's complement little-endian field
pub fn buffer_to_signed_number(bytes: &[u8]) -> Result<i128> {
    require!(
        !bytes.is_empty() && bytes.len() <= 16,
        ClmmError::ValueOutOfRange
    );

    let negative = bytes[bytes.len() - 1] & 0x80 != 0;
    let mut raw = if negative { [0xff; 16] } else { [0x00; 16] };
    raw[..bytes.len()].copy_from_slice(bytes);
    Ok(i128::from_le_bytes(raw))
}
