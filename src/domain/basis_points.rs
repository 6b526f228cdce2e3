//! Basis-point representation for percentages.

use core::fmt;

use super::{Amount, Rounding};
use crate::constants::BPS_DENOMINATOR;
use crate::error::AmmError;

/// A percentage expressed in basis points (1 bp = 0.01%, 10 000 bp = 100%).
///
/// All `u32` values are technically valid, but values above 10 000 are
/// nonsensical as percentages. Use [`is_valid_percent`](Self::is_valid_percent)
/// to check.
///
/// # Examples
///
/// ```
/// use tidepool_amm::domain::BasisPoints;
///
/// let bp = BasisPoints::new(30);
/// assert_eq!(bp.get(), 30);
/// assert!(bp.is_valid_percent());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct BasisPoints(u32);

impl BasisPoints {
    /// Zero basis points (0%).
    pub const ZERO: Self = Self(0);

    /// 100% expressed in basis points.
    pub const MAX_PERCENT: Self = Self(BPS_DENOMINATOR as u32);

    /// Creates a new `BasisPoints` from a raw `u32` value.
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the underlying `u32` value.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Returns `true` if the value is in the valid percentage range
    /// (`0..=10_000`).
    #[must_use]
    pub const fn is_valid_percent(&self) -> bool {
        self.0 as u64 <= BPS_DENOMINATOR
    }

    /// Computes `amount * (self / 10_000)` with explicit rounding.
    ///
    /// The intermediate product is computed in `u128` so it cannot
    /// overflow for any `u64` amount.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] if the result does not fit in `u64`
    /// (only possible for bps above 10 000).
    pub const fn apply(&self, amount: Amount, rounding: Rounding) -> crate::error::Result<Amount> {
        let product = amount.widened() * self.0 as u128;
        let divisor = BPS_DENOMINATOR as u128;
        let out = match rounding {
            Rounding::Down => product / divisor,
            Rounding::Up => {
                let q = product / divisor;
                let r = product % divisor;
                if r != 0 {
                    q + 1
                } else {
                    q
                }
            }
        };
        if out > u64::MAX as u128 {
            return Err(AmmError::Overflow("basis points apply overflow"));
        }
        Ok(Amount::new(out as u64))
    }

    /// Returns the complement `10_000 - self`, saturating at zero.
    #[must_use]
    pub const fn complement(&self) -> Self {
        let bps = self.0 as u64;
        if bps >= BPS_DENOMINATOR {
            Self(0)
        } else {
            Self((BPS_DENOMINATOR - bps) as u32)
        }
    }
}

impl fmt::Display for BasisPoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}bp", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn new_and_get() {
        assert_eq!(BasisPoints::new(30).get(), 30);
    }

    #[test]
    fn constants() {
        assert_eq!(BasisPoints::ZERO.get(), 0);
        assert_eq!(BasisPoints::MAX_PERCENT.get(), 10_000);
    }

    #[test]
    fn is_valid_percent_in_range() {
        assert!(BasisPoints::ZERO.is_valid_percent());
        assert!(BasisPoints::new(5_000).is_valid_percent());
        assert!(BasisPoints::MAX_PERCENT.is_valid_percent());
    }

    #[test]
    fn is_valid_percent_out_of_range() {
        assert!(!BasisPoints::new(10_001).is_valid_percent());
        assert!(!BasisPoints::new(u32::MAX).is_valid_percent());
    }

    // -- apply ------------------------------------------------------------------

    #[test]
    fn apply_round_down() {
        // 30bp of 1_000_000 = 3_000
        let Ok(result) = BasisPoints::new(30).apply(Amount::new(1_000_000), Rounding::Down) else {
            panic!("expected Ok");
        };
        assert_eq!(result, Amount::new(3_000));
    }

    #[test]
    fn apply_round_up_remainder() {
        // 30bp of 1 = 0.003 → ceil = 1
        let Ok(result) = BasisPoints::new(30).apply(Amount::new(1), Rounding::Up) else {
            panic!("expected Ok");
        };
        assert_eq!(result, Amount::new(1));
    }

    #[test]
    fn apply_round_down_remainder() {
        // 30bp of 1 = 0.003 → floor = 0
        let Ok(result) = BasisPoints::new(30).apply(Amount::new(1), Rounding::Down) else {
            panic!("expected Ok");
        };
        assert_eq!(result, Amount::ZERO);
    }

    #[test]
    fn apply_100_percent_is_identity() {
        let Ok(result) = BasisPoints::MAX_PERCENT.apply(Amount::new(777), Rounding::Down) else {
            panic!("expected Ok");
        };
        assert_eq!(result, Amount::new(777));
    }

    #[test]
    fn apply_above_100_percent_overflows_at_max() {
        let result = BasisPoints::new(u32::MAX).apply(Amount::MAX, Rounding::Down);
        assert!(result.is_err());
    }

    // -- complement ---------------------------------------------------------------

    #[test]
    fn complement_of_30() {
        assert_eq!(BasisPoints::new(30).complement(), BasisPoints::new(9_970));
    }

    #[test]
    fn complement_saturates() {
        assert_eq!(BasisPoints::new(20_000).complement(), BasisPoints::ZERO);
    }

    #[test]
    fn display() {
        assert_eq!(format!("{}", BasisPoints::new(30)), "30bp");
    }
}
