//! Convenience re-exports for typical usage.
//!
//! ```
//! use tidepool_amm::prelude::*;
//! ```

pub use crate::config::{CurveKind, PoolConfig};
pub use crate::domain::{
    Amount, BasisPoints, FeeTier, Liquidity, PoolId, Position, Rounding, TokenAddress, TokenPair,
};
pub use crate::error::{AmmError, Result};
pub use crate::fees::{FeeAccumulator, FeeBreakdown};
pub use crate::guard::SwapGuard;
pub use crate::pools::{DepositResult, Pool, SwapDirection, SwapResult, WithdrawResult};
