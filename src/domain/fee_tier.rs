//! Swap fee tiers built on [`BasisPoints`].

use core::fmt;

use super::{Amount, BasisPoints, Rounding};

/// A pool's swap fee tier wrapping [`BasisPoints`].
///
/// Pool creation only accepts tiers on the allow-list — the four
/// well-known presets used across major AMM protocols. Use
/// [`is_allowed`](Self::is_allowed) to check.
///
/// # Examples
///
/// ```
/// use tidepool_amm::domain::FeeTier;
///
/// let tier = FeeTier::TIER_0_30_PERCENT;
/// assert_eq!(tier.basis_points().get(), 30);
/// assert!(tier.is_allowed());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FeeTier(BasisPoints);

impl FeeTier {
    /// 0.01% fee — ultra-tight pairs (1 bp).
    pub const TIER_0_01_PERCENT: Self = Self(BasisPoints::new(1));

    /// 0.05% fee — stablecoin pairs (5 bp).
    pub const TIER_0_05_PERCENT: Self = Self(BasisPoints::new(5));

    /// 0.30% fee — standard volatile pairs (30 bp).
    pub const TIER_0_30_PERCENT: Self = Self(BasisPoints::new(30));

    /// 1.00% fee — exotic pairs (100 bp).
    pub const TIER_1_00_PERCENT: Self = Self(BasisPoints::new(100));

    /// Creates a new `FeeTier` from arbitrary [`BasisPoints`].
    ///
    /// Construction never fails; [`is_allowed`](Self::is_allowed) is
    /// enforced at pool-creation time by config validation.
    pub const fn new(basis_points: BasisPoints) -> Self {
        Self(basis_points)
    }

    /// Returns the underlying [`BasisPoints`].
    #[must_use]
    pub const fn basis_points(&self) -> BasisPoints {
        self.0
    }

    /// Computes the fee for a given `amount` using this tier's basis points.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`](crate::error::AmmError::Overflow) if
    /// the result does not fit in `u64`.
    pub const fn apply_to_amount(
        &self,
        amount: Amount,
        rounding: Rounding,
    ) -> crate::error::Result<Amount> {
        self.0.apply(amount, rounding)
    }

    /// Returns `true` if this tier is on the pool-creation allow-list.
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self.0.get(), 1 | 5 | 30 | 100)
    }
}

impl fmt::Display for FeeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FeeTier({})", self.0)
    }
}
