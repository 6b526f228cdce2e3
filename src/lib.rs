//! # Tidepool AMM
//!
//! Automated market maker engine for two-token pools: pricing curves,
//! liquidity-share accounting, O(1) fee distribution, and slippage guard
//! rails, all in checked integer arithmetic.
//!
//! Two pool kinds share one state machine:
//!
//! - **Constant Product** (x·y = k) — uncorrelated pairs
//! - **Stable** (amplified invariant, Curve style) — tightly correlated
//!   pairs, with linear amplification ramping
//!
//! # Quick Start
//!
//! ```rust
//! use tidepool_amm::prelude::*;
//!
//! let pair = TokenPair::new(
//!     TokenAddress::from_bytes([1u8; 32]),
//!     TokenAddress::from_bytes([2u8; 32]),
//! )
//! .expect("distinct tokens");
//!
//! let config = PoolConfig {
//!     pool_id: PoolId::new(1),
//!     pair,
//!     curve: CurveKind::ConstantProduct,
//!     fee_tier: FeeTier::TIER_0_30_PERCENT,
//!     protocol_fee_share: BasisPoints::new(2_000),
//!     creator_fee_share: BasisPoints::new(250),
//!     max_price_impact_bps: BasisPoints::new(1_000),
//!     default_max_slippage_bps: BasisPoints::new(50),
//! };
//! let mut pool = Pool::from_config(config).expect("valid config");
//!
//! // Seed the pool; 1_000 shares are permanently locked.
//! let (mut position, _) = pool
//!     .add_liquidity(
//!         Amount::new(1_000_000),
//!         Amount::new(1_000_000),
//!         Liquidity::ZERO,
//!         0,
//!         u64::MAX,
//!     )
//!     .expect("seeded");
//!
//! // Swap 10_000 of token A for token B under a guard.
//! let guard = SwapGuard::with_deadline(100).min_out(Amount::new(9_800));
//! let result = pool.swap_a_to_b(Amount::new(10_000), &guard, 50).expect("swap");
//! assert!(result.amount_out.get() >= 9_800);
//!
//! // The provider's share of the fee is claimable at any time.
//! let (fee_a, _) = pool.claim_fees(&mut position, 50, 100).expect("claim");
//! assert!(fee_a.get() > 0);
//! ```
//!
//! # Module Guide
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`domain`] | Newtype value types: [`Amount`](domain::Amount), [`Liquidity`](domain::Liquidity), [`Position`](domain::Position), etc. |
//! | [`config`] | [`PoolConfig`](config::PoolConfig) creation parameters and validation |
//! | [`pools`]  | [`Pool`](pools::Pool), the per-pair state machine |
//! | [`math`]   | Constant-product and stable-invariant solvers, widened integer helpers |
//! | [`fees`]   | Fee splitting and the per-share accumulator |
//! | [`guard`]  | [`SwapGuard`](guard::SwapGuard) trader-side execution constraints |
//! | [`constants`] | Numeric constants fixed by the engine's contract |
//! | [`error`]  | [`AmmError`](error::AmmError) unified error enum |
//! | [`prelude`] | Convenience re-exports |

pub mod config;
pub mod constants;
pub mod domain;
pub mod error;
pub mod fees;
pub mod guard;
pub mod math;
pub mod pools;
pub mod prelude;
