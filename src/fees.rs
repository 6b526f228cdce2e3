//! Fee splitting and accumulator-based distribution.
//!
//! Every swap fee is split three ways: a protocol cut and a creator cut are
//! carved out into withdrawable balances, and the remainder (the LP fee)
//! stays in the reserves where it compounds for providers. Distribution to
//! individual providers is O(1) per swap: the pool bumps a global
//! per-share accumulator and each position settles lazily against its own
//! checkpoint.

use crate::constants::ACC_PRECISION;
use crate::domain::{Amount, BasisPoints, FeeTier, Liquidity, Rounding};
use crate::error::{AmmError, Result};
use crate::math::integer::mul_div_u128;

/// The three-way split of a single swap's fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeBreakdown {
    /// Total fee taken from the input amount.
    pub total: Amount,
    /// Portion routed to the protocol's withdrawable balance.
    pub protocol: Amount,
    /// Portion routed to the pool creator's withdrawable balance.
    pub creator: Amount,
    /// Portion left in the reserves for liquidity providers.
    pub lp: Amount,
}

impl FeeBreakdown {
    /// Splits the fee on `amount_in`.
    ///
    /// The total fee rounds up so the net input equals
    /// `amount_in * (10_000 - fee_bps) / 10_000` floored. Both carve-outs
    /// round down, so rounding residue always lands in the LP share.
    /// `protocol + creator + lp == total` by construction.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] if a product exceeds `u64` range,
    /// which cannot happen for valid-percent inputs.
    pub fn split(
        amount_in: Amount,
        tier: FeeTier,
        protocol_share: BasisPoints,
        creator_share: BasisPoints,
    ) -> Result<Self> {
        let total = tier.apply_to_amount(amount_in, Rounding::Up)?;
        let protocol = protocol_share.apply(total, Rounding::Down)?;
        let creator = creator_share.apply(total, Rounding::Down)?;
        let lp = total
            .checked_sub(&protocol)
            .and_then(|rest| rest.checked_sub(&creator))
            .ok_or(AmmError::Overflow("fee split exceeds total"))?;
        Ok(Self {
            total,
            protocol,
            creator,
            lp,
        })
    }
}

/// Global per-share fee accumulators for one pool, one per token side.
///
/// Values are scaled by [`ACC_PRECISION`] so sub-unit fees per share still
/// register. Accumulators only ever grow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeeAccumulator {
    acc_a: u128,
    acc_b: u128,
}

impl FeeAccumulator {
    /// A fresh accumulator at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self { acc_a: 0, acc_b: 0 }
    }

    /// Current token-A accumulator value.
    #[must_use]
    pub const fn acc_a(&self) -> u128 {
        self.acc_a
    }

    /// Current token-B accumulator value.
    #[must_use]
    pub const fn acc_b(&self) -> u128 {
        self.acc_b
    }

    /// Credits an LP fee in token A across `total_shares`.
    ///
    /// No-op when the pool has no shares; the caller keeps such fees in the
    /// reserves instead.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] if the scaled fee exceeds `u128`.
    pub fn accrue_a(&mut self, lp_fee: Amount, total_shares: Liquidity) -> Result<()> {
        if total_shares.is_zero() || lp_fee.is_zero() {
            return Ok(());
        }
        let delta = mul_div_u128(
            lp_fee.widened(),
            ACC_PRECISION,
            total_shares.widened(),
            Rounding::Down,
        )
        .ok_or(AmmError::Overflow("fee accumulator delta"))?;
        self.acc_a = self
            .acc_a
            .checked_add(delta)
            .ok_or(AmmError::Overflow("fee accumulator"))?;
        Ok(())
    }

    /// Credits an LP fee in token B across `total_shares`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] if the scaled fee exceeds `u128`.
    pub fn accrue_b(&mut self, lp_fee: Amount, total_shares: Liquidity) -> Result<()> {
        if total_shares.is_zero() || lp_fee.is_zero() {
            return Ok(());
        }
        let delta = mul_div_u128(
            lp_fee.widened(),
            ACC_PRECISION,
            total_shares.widened(),
            Rounding::Down,
        )
        .ok_or(AmmError::Overflow("fee accumulator delta"))?;
        self.acc_b = self
            .acc_b
            .checked_add(delta)
            .ok_or(AmmError::Overflow("fee accumulator"))?;
        Ok(())
    }

    /// The accumulator checkpoint a position of `liquidity` shares should
    /// carry right now, as `(debt_a, debt_b)`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] if the product exceeds `u128`.
    pub fn checkpoint(&self, liquidity: Liquidity) -> Result<(u128, u128)> {
        let debt_a = mul_div_u128(liquidity.widened(), self.acc_a, ACC_PRECISION, Rounding::Down)
            .ok_or(AmmError::Overflow("fee checkpoint"))?;
        let debt_b = mul_div_u128(liquidity.widened(), self.acc_b, ACC_PRECISION, Rounding::Down)
            .ok_or(AmmError::Overflow("fee checkpoint"))?;
        Ok((debt_a, debt_b))
    }

    /// Fees owed to a position since its last checkpoint, as
    /// `(owed_a, owed_b)`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] if a product exceeds range. The debts
    /// never exceed the current entitlement for a correctly checkpointed
    /// position, so the subtraction cannot underflow; a stale debt larger
    /// than the entitlement clamps to zero.
    pub fn owed(
        &self,
        liquidity: Liquidity,
        fee_debt_a: u128,
        fee_debt_b: u128,
    ) -> Result<(Amount, Amount)> {
        let (entitled_a, entitled_b) = self.checkpoint(liquidity)?;
        let owed_a = entitled_a.saturating_sub(fee_debt_a);
        let owed_b = entitled_b.saturating_sub(fee_debt_b);
        if owed_a > u128::from(u64::MAX) || owed_b > u128::from(u64::MAX) {
            return Err(AmmError::Overflow("owed fees exceed amount range"));
        }
        Ok((Amount::new(owed_a as u64), Amount::new(owed_b as u64)))
    }
}
