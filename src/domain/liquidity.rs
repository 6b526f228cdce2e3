//! Liquidity share units.

use core::fmt;

/// A quantity of liquidity shares.
///
/// Shares are an internal unit of pool ownership: `sqrt(a × b)` at genesis,
/// proportional thereafter. Distinct from [`Amount`](super::Amount) so that
/// token units and share units cannot be mixed up at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[must_use]
pub struct Liquidity(u64);

impl Liquidity {
    /// Zero liquidity.
    pub const ZERO: Self = Self(0);

    /// Creates a new `Liquidity` from a raw `u64` value.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the underlying `u64` value.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }

    /// Returns the value widened to `u128` for intermediate products.
    #[must_use]
    pub const fn widened(&self) -> u128 {
        self.0 as u128
    }

    /// Returns `true` if the share count is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checked addition. Returns `None` on overflow.
    #[must_use]
    pub const fn checked_add(&self, other: &Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Checked subtraction. Returns `None` on underflow.
    #[must_use]
    pub const fn checked_sub(&self, other: &Self) -> Option<Self> {
        match self.0.checked_sub(other.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }
}

impl fmt::Display for Liquidity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
