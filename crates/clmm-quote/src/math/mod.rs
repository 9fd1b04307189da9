pub mod full_math;
pub mod decimal;
pub mod tick_math;
pub mod liquidity_math;
pub mod sqrt_price_math;
pub mod swap_math;
pub mod slippage;
pub mod bit_math;

pub use full_math::*;
pub use decimal::*;
pub use tick_math::*;
pub use liquidity_math::*;
pub use sqrt_price_math::*;
pub use swap_math::*;
pub use slippage::*;
pub use bit_math::*;
