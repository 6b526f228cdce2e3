//! Core value objects shared by every pool kind.
//!
//! Everything here is a small, copyable newtype with checked arithmetic.
//! Raw integers never cross module boundaries: amounts, shares, fees and
//! identities each get their own type so the compiler catches unit mixups.

mod amount;
mod basis_points;
mod fee_tier;
mod liquidity;
mod pool_id;
mod position;
mod rounding;
mod token_address;
mod token_pair;

pub use amount::Amount;
pub use basis_points::BasisPoints;
pub use fee_tier::FeeTier;
pub use liquidity::Liquidity;
pub use pool_id::PoolId;
pub use position::Position;
pub use rounding::Rounding;
pub use token_address::TokenAddress;
pub use token_pair::TokenPair;
