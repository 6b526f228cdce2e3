//! Pool creation parameters.

use crate::constants::MAX_CREATOR_FEE_BPS;
use crate::domain::{BasisPoints, FeeTier, PoolId, TokenPair};
use crate::error::{AmmError, Result};
use crate::math::stable::Amplification;

/// Which pricing curve the pool runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveKind {
    /// Constant-product (x·y = k), for uncorrelated pairs.
    ConstantProduct,
    /// Amplified stable invariant, for tightly correlated pairs.
    Stable {
        /// Initial amplification coefficient, `1..=1_000`.
        amp: u64,
    },
}

/// Immutable parameters fixed at pool creation.
///
/// `validate()` is the single gate: the factory refuses to instantiate a
/// pool from a config that fails it, so pool code can assume every field
/// is in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    /// Identity assigned by the factory.
    pub pool_id: PoolId,
    /// The token pair, canonically ordered.
    pub pair: TokenPair,
    /// Pricing curve.
    pub curve: CurveKind,
    /// Swap fee tier. Must be on the allow-list.
    pub fee_tier: FeeTier,
    /// Share of each fee routed to the protocol, in basis points of the fee.
    pub protocol_fee_share: BasisPoints,
    /// Share of each fee routed to the pool creator, in basis points of the
    /// fee. Capped at [`MAX_CREATOR_FEE_BPS`].
    pub creator_fee_share: BasisPoints,
    /// Pool-level ceiling on per-swap price impact. Swaps that would move
    /// the price more than this are rejected outright.
    pub max_price_impact_bps: BasisPoints,
    /// Slippage tolerance used when building a default guard for callers
    /// that do not supply their own minimum output.
    pub default_max_slippage_bps: BasisPoints,
}

impl PoolConfig {
    /// Checks every field against its allowed range.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InvalidFeeTier`] for a tier off the allow-list.
    /// - [`AmmError::CreatorFeeTooHigh`] for a creator share above the cap.
    /// - [`AmmError::AmpOutOfRange`] for a stable curve with amplification
    ///   outside `1..=1_000`.
    /// - [`AmmError::InvalidQuantity`] for shares or ceilings above 100%.
    pub fn validate(&self) -> Result<()> {
        if !self.fee_tier.is_allowed() {
            return Err(AmmError::InvalidFeeTier);
        }
        if u64::from(self.creator_fee_share.get()) > MAX_CREATOR_FEE_BPS {
            return Err(AmmError::CreatorFeeTooHigh);
        }
        if !self.protocol_fee_share.is_valid_percent() {
            return Err(AmmError::InvalidQuantity("protocol fee share above 100%"));
        }
        let combined = self.protocol_fee_share.get() + self.creator_fee_share.get();
        if !BasisPoints::new(combined).is_valid_percent() {
            return Err(AmmError::InvalidQuantity(
                "combined fee shares above 100%",
            ));
        }
        if !self.max_price_impact_bps.is_valid_percent() {
            return Err(AmmError::InvalidQuantity("price impact ceiling above 100%"));
        }
        if !self.default_max_slippage_bps.is_valid_percent() {
            return Err(AmmError::InvalidQuantity(
                "default slippage tolerance above 100%",
            ));
        }
        if let CurveKind::Stable { amp } = self.curve {
            // Shares the range check with the ramping machinery.
            Amplification::constant(amp)?;
        }
        Ok(())
    }
}
