//! Liquidity provider position.

use core::fmt;

use super::{Amount, Liquidity, PoolId};

/// A single provider's stake in one pool.
///
/// A position tracks the provider's share balance plus the bookkeeping the
/// pool needs to settle fees and measure impermanent loss:
///
/// - `fee_debt_a` / `fee_debt_b` are accumulator checkpoints. At any moment
///   the provider's claimable fees are
///   `liquidity * acc_fee_per_share / ACC_PRECISION - fee_debt`, so the
///   debts must be re-snapshotted every time `liquidity` changes.
/// - `min_a` / `min_b` are redemption watermarks: the token amounts the
///   position is still entitled to, seeded from deposits and scaled down
///   proportionally on partial withdrawals (never floored to zero while
///   any liquidity remains). They double as the hold-value baseline for
///   impermanent-loss reporting.
/// - `cached_value_a` / `cached_value_b` are the last redeemable-value
///   snapshot taken during a settlement. Advisory only; views never rely
///   on them being fresh.
///
/// All mutators are crate-internal: only the owning pool may move a
/// position through its lifecycle. External code reads via the accessors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pool_id: PoolId,
    liquidity: Liquidity,
    fee_debt_a: u128,
    fee_debt_b: u128,
    min_a: Amount,
    min_b: Amount,
    cached_value_a: Amount,
    cached_value_b: Amount,
}

impl Position {
    /// Creates a fresh position. Fee debts start at the current accumulator
    /// snapshot supplied by the pool.
    #[must_use]
    pub(crate) const fn new(
        pool_id: PoolId,
        liquidity: Liquidity,
        fee_debt_a: u128,
        fee_debt_b: u128,
        min_a: Amount,
        min_b: Amount,
    ) -> Self {
        Self {
            pool_id,
            liquidity,
            fee_debt_a,
            fee_debt_b,
            min_a,
            min_b,
            cached_value_a: min_a,
            cached_value_b: min_b,
        }
    }

    /// The pool this position belongs to.
    #[must_use]
    pub const fn pool_id(&self) -> PoolId {
        self.pool_id
    }

    /// The position's share balance.
    #[must_use]
    pub const fn liquidity(&self) -> Liquidity {
        self.liquidity
    }

    /// Returns `true` once the position holds no shares.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.liquidity.is_zero()
    }

    /// Token-A fee accumulator checkpoint.
    #[must_use]
    pub const fn fee_debt_a(&self) -> u128 {
        self.fee_debt_a
    }

    /// Token-B fee accumulator checkpoint.
    #[must_use]
    pub const fn fee_debt_b(&self) -> u128 {
        self.fee_debt_b
    }

    /// Token-A redemption watermark.
    #[must_use]
    pub const fn min_a(&self) -> Amount {
        self.min_a
    }

    /// Token-B redemption watermark.
    #[must_use]
    pub const fn min_b(&self) -> Amount {
        self.min_b
    }

    /// Last token-A redeemable-value snapshot. Advisory.
    #[must_use]
    pub const fn cached_value_a(&self) -> Amount {
        self.cached_value_a
    }

    /// Last token-B redeemable-value snapshot. Advisory.
    #[must_use]
    pub const fn cached_value_b(&self) -> Amount {
        self.cached_value_b
    }

    /// Replaces the share balance. The caller must settle outstanding fees
    /// at the old balance first and re-checkpoint in the same operation.
    pub(crate) fn set_liquidity(&mut self, liquidity: Liquidity) {
        self.liquidity = liquidity;
    }

    /// Re-snapshots both fee debts to the given accumulator values.
    pub(crate) fn checkpoint(&mut self, fee_debt_a: u128, fee_debt_b: u128) {
        self.fee_debt_a = fee_debt_a;
        self.fee_debt_b = fee_debt_b;
    }

    /// Raises the watermarks after an additional deposit.
    pub(crate) fn raise_watermarks(&mut self, added_a: Amount, added_b: Amount) {
        self.min_a = Amount::new(self.min_a.get().saturating_add(added_a.get()));
        self.min_b = Amount::new(self.min_b.get().saturating_add(added_b.get()));
    }

    /// Replaces the watermarks after a partial withdrawal rescales them to
    /// the remaining share of the position.
    pub(crate) fn set_watermarks(&mut self, min_a: Amount, min_b: Amount) {
        self.min_a = min_a;
        self.min_b = min_b;
    }

    /// Refreshes the advisory value snapshot.
    pub(crate) fn set_cached_value(&mut self, value_a: Amount, value_b: Amount) {
        self.cached_value_a = value_a;
        self.cached_value_b = value_b;
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Position {{ {}, liquidity: {} }}",
            self.pool_id, self.liquidity
        )
    }
}
