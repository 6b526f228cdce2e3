//! Pool configuration.

mod pool_config;

pub use pool_config::{CurveKind, PoolConfig};
