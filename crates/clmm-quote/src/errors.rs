use anchor_lang::prelude::*;

/// clmm-quote Error Codes
/// One variant per failure mode of the math engine and the swap simulator
#[error_code]
pub enum ClmmError {
    // ═══════════════════════════════════════════════════════════════════════
    // MATH ERRORS
    // ═══════════════════════════════════════════════════════════════════════

    /// Sqrt price is zero or outside the supported domain
    #[msg("Invalid price")]
    InvalidPrice, // 6000

    /// Division by zero attempted
    #[msg("Invalid divisor")]
    InvalidDivisor, // 6001

    /// Result doesn't fit in the expected type
    #[msg("Math overflow")]
    MathOverflow, // 6002

    /// Value doesn't fit in the requested field width
    #[msg("Value out of range")]
    ValueOutOfRange, // 6003

    // ═══════════════════════════════════════════════════════════════════════
    // TICK ERRORS
    // ═══════════════════════════════════════════════════════════════════════

    /// Tick index outside [-TICK_LIMIT, TICK_LIMIT]
    #[msg("Tick out of range")]
    TickOutOfRange, // 6004

    /// Requested token is not used by a position over this range
    #[msg("Token not required for this position")]
    InvalidTickRange, // 6005

    /// Tick spacing must be positive
    #[msg("Invalid tick spacing")]
    InvalidTickSpacing, // 6006

    /// Tickmap has the wrong size
    #[msg("Invalid tickmap")]
    InvalidTickmap, // 6007

    /// Initialized tick missing from the supplied tick map
    #[msg("Tick not found")]
    TickNotFound, // 6008

    // ═══════════════════════════════════════════════════════════════════════
    // SWAP ERRORS
    // ═══════════════════════════════════════════════════════════════════════

    /// Swap cannot make any progress
    #[msg("Insufficient liquidity")]
    InsufficientLiquidity, // 6009

    /// Active liquidity would under/overflow when crossing a tick
    #[msg("Liquidity overflow")]
    LiquidityOverflow, // 6010

    /// Swap amount is zero
    #[msg("Amount is zero")]
    ZeroAmount, // 6011

    /// Price limit is on the wrong side of the current price
    #[msg("Invalid price limit")]
    InvalidPriceLimit, // 6012

    /// Fee rate must be below 100%
    #[msg("Invalid fee")]
    InvalidFee, // 6013

    // ═══════════════════════════════════════════════════════════════════════
    // ACCOUNT DATA ERRORS
    // ═══════════════════════════════════════════════════════════════════════

    /// Raw tick account bytes have the wrong length
    #[msg("Malformed tick account data")]
    InvalidTickData, // 6014
}
