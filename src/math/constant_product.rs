//! Constant-product (x·y = k) pricing.
//!
//! Pure functions over raw reserves. Fees are taken before the curve, so
//! callers pass the post-fee input amount and the invariant grows by the
//! LP fee that stays in the pool.

use crate::constants::BPS_DENOMINATOR;
use crate::error::{AmmError, Result};

/// Quotes the output for swapping `amount_in` (already net of fees) against
/// reserves `(reserve_in, reserve_out)`.
///
/// `out = reserve_out * amount_in / (reserve_in + amount_in)`, rounded down
/// so the pool keeps every fractional unit and `k` never decreases.
///
/// # Errors
///
/// - [`AmmError::ZeroReserve`] if either reserve is zero.
/// - [`AmmError::Overflow`] if `reserve_in + amount_in` exceeds `u64`.
pub fn quote_output(reserve_in: u64, reserve_out: u64, amount_in: u64) -> Result<u64> {
    if reserve_in == 0 || reserve_out == 0 {
        return Err(AmmError::ZeroReserve);
    }
    let new_reserve_in = reserve_in
        .checked_add(amount_in)
        .ok_or(AmmError::Overflow("swap input exceeds reserve capacity"))?;
    let product = u128::from(reserve_out) * u128::from(amount_in);
    // Truncation favours the pool.
    let out = product / u128::from(new_reserve_in);
    Ok(out as u64)
}

/// Computes the price impact of a swap in basis points.
///
/// The ideal output is what the pre-swap spot price would pay
/// (`amount_in * reserve_out / reserve_in`); impact is the shortfall of the
/// actual output against it, as a fraction of the ideal:
/// `(ideal - actual) * 10_000 / ideal`, rounded down.
///
/// Returns zero when the ideal output rounds to zero, since there is no
/// meaningful baseline to compare against.
///
/// # Errors
///
/// Returns [`AmmError::ZeroReserve`] if `reserve_in` is zero.
pub fn price_impact_bps(
    reserve_in: u64,
    reserve_out: u64,
    amount_in: u64,
    amount_out: u64,
) -> Result<u32> {
    if reserve_in == 0 {
        return Err(AmmError::ZeroReserve);
    }
    let ideal = u128::from(amount_in) * u128::from(reserve_out) / u128::from(reserve_in);
    if ideal == 0 {
        return Ok(0);
    }
    let actual = u128::from(amount_out);
    let shortfall = ideal.saturating_sub(actual);
    let bps = shortfall * u128::from(BPS_DENOMINATOR) / ideal;
    // shortfall <= ideal, so bps <= 10_000.
    Ok(bps as u32)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn quote_balanced_pool() {
        // 1_000 into 1_000_000/1_000_000: 1_000_000 * 1_000 / 1_001_000 = 999.
        let Ok(out) = quote_output(1_000_000, 1_000_000, 1_000) else {
            panic!("expected Ok");
        };
        assert_eq!(out, 999);
    }

    #[test]
    fn quote_preserves_k() {
        let (r_in, r_out, a_in) = (123_456u64, 789_012u64, 5_000u64);
        let Ok(out) = quote_output(r_in, r_out, a_in) else {
            panic!("expected Ok");
        };
        let k_before = u128::from(r_in) * u128::from(r_out);
        let k_after = u128::from(r_in + a_in) * u128::from(r_out - out);
        assert!(k_after >= k_before);
    }

    #[test]
    fn quote_zero_reserve_rejected() {
        assert!(quote_output(0, 1_000, 10).is_err());
        assert!(quote_output(1_000, 0, 10).is_err());
    }

    #[test]
    fn quote_overflowing_input_rejected() {
        assert!(quote_output(u64::MAX, 1_000, 1).is_err());
    }

    #[test]
    fn quote_tiny_input_rounds_to_zero() {
        let Ok(out) = quote_output(1_000_000, 1, 1) else {
            panic!("expected Ok");
        };
        assert_eq!(out, 0);
    }

    // -- price impact -------------------------------------------------------------

    #[test]
    fn impact_of_small_swap_is_small() {
        // ideal = 1_000, actual = 999 → 10 bps.
        let Ok(bps) = price_impact_bps(1_000_000, 1_000_000, 1_000, 999) else {
            panic!("expected Ok");
        };
        assert_eq!(bps, 10);
    }

    #[test]
    fn impact_of_half_pool_swap() {
        // Swap 500_000 into 1M/1M: out = 1_000_000 * 500_000 / 1_500_000 = 333_333.
        let Ok(out) = quote_output(1_000_000, 1_000_000, 500_000) else {
            panic!("expected Ok");
        };
        assert_eq!(out, 333_333);
        // ideal = 500_000 → shortfall 166_667 → 3_333 bps.
        let Ok(bps) = price_impact_bps(1_000_000, 1_000_000, 500_000, out) else {
            panic!("expected Ok");
        };
        assert_eq!(bps, 3_333);
    }

    #[test]
    fn impact_zero_ideal_is_zero() {
        let Ok(bps) = price_impact_bps(1_000_000, 1, 1, 0) else {
            panic!("expected Ok");
        };
        assert_eq!(bps, 0);
    }

    #[test]
    fn impact_zero_reserve_rejected() {
        assert!(price_impact_bps(0, 1_000, 10, 5).is_err());
    }

    #[test]
    fn impact_never_exceeds_ten_thousand() {
        let Ok(bps) = price_impact_bps(1_000, 1_000, 1_000, 0) else {
            panic!("expected Ok");
        };
        assert_eq!(bps, 10_000);
    }
}
