pub mod pool;
pub mod tick;
pub mod tickmap;

pub use pool::*;
pub use tick::*;
pub use tickmap::*;
