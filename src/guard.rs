//! Trader-side slippage protection.
//!
//! A [`SwapGuard`] travels with each swap request and is checked after the
//! output is computed but before any state is committed. Guards are pure
//! checks; the pool's own price-impact ceiling is enforced separately.

use crate::constants::{BPS_DENOMINATOR, PRICE_PRECISION};
use crate::domain::Amount;
use crate::error::{AmmError, Result};

/// Per-swap execution constraints supplied by the trader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapGuard {
    /// Last timestamp (inclusive) at which the swap may execute.
    pub deadline: u64,
    /// Minimum acceptable output amount.
    pub min_out: Amount,
    /// Optional ceiling on the execution price, expressed as input units
    /// per output unit scaled by [`PRICE_PRECISION`].
    pub max_price: Option<u64>,
}

impl SwapGuard {
    /// A guard with only a deadline, accepting any price.
    #[must_use]
    pub const fn with_deadline(deadline: u64) -> Self {
        Self {
            deadline,
            min_out: Amount::ZERO,
            max_price: None,
        }
    }

    /// Sets the minimum output.
    #[must_use]
    pub const fn min_out(mut self, min_out: Amount) -> Self {
        self.min_out = min_out;
        self
    }

    /// Sets the execution price ceiling.
    #[must_use]
    pub const fn max_price(mut self, max_price: u64) -> Self {
        self.max_price = Some(max_price);
        self
    }

    /// Rejects swaps arriving after the deadline. The deadline itself is
    /// still valid.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::DeadlinePassed`] if `now > deadline`.
    pub const fn check_deadline(&self, now: u64) -> Result<()> {
        if now > self.deadline {
            return Err(AmmError::DeadlinePassed);
        }
        Ok(())
    }

    /// Rejects outputs below the trader's floor. A zero output always
    /// fails, even with `min_out` of zero: paying something for nothing is
    /// never acceptable.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InsufficientOutput`] on failure.
    pub const fn check_output(&self, amount_out: Amount) -> Result<()> {
        if amount_out.is_zero() || amount_out.get() < self.min_out.get() {
            return Err(AmmError::InsufficientOutput);
        }
        Ok(())
    }

    /// Rejects executions above the trader's price ceiling.
    ///
    /// # Errors
    ///
    /// - [`AmmError::ExcessiveSlippage`] if the realised price exceeds the
    ///   ceiling.
    /// - [`AmmError::DivisionByZero`] if `amount_out` is zero; callers run
    ///   [`check_output`](Self::check_output) first.
    pub fn check_price(&self, amount_in: Amount, amount_out: Amount) -> Result<()> {
        let Some(ceiling) = self.max_price else {
            return Ok(());
        };
        let price = execution_price(amount_in, amount_out)?;
        if price > u128::from(ceiling) {
            return Err(AmmError::ExcessiveSlippage);
        }
        Ok(())
    }
}

/// Realised execution price: input units per output unit, scaled by
/// [`PRICE_PRECISION`], rounded up so a ceiling check never passes on
/// truncated dust.
///
/// # Errors
///
/// Returns [`AmmError::DivisionByZero`] if `amount_out` is zero.
pub fn execution_price(amount_in: Amount, amount_out: Amount) -> Result<u128> {
    if amount_out.is_zero() {
        return Err(AmmError::DivisionByZero);
    }
    let scaled = amount_in.widened() * PRICE_PRECISION;
    Ok(scaled.div_ceil(amount_out.widened()))
}

/// Shortfall of `actual` against `expected` in basis points, rounded up.
/// Zero when `actual >= expected` or `expected` is zero.
#[must_use]
pub fn slippage_bps(expected: Amount, actual: Amount) -> u32 {
    if expected.is_zero() || actual.get() >= expected.get() {
        return 0;
    }
    let shortfall = expected.widened() - actual.widened();
    let bps = (shortfall * u128::from(BPS_DENOMINATOR)).div_ceil(expected.widened());
    bps as u32
}
