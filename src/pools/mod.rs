//! Pool orchestration: the state machine tying pricing, liquidity
//! accounting, fee distribution and guards together.

mod pool;
#[cfg(test)]
mod properties;

pub use pool::{DepositResult, Pool, SwapDirection, SwapResult, WithdrawResult};
