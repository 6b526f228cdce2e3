//! Pool identity.

use core::fmt;

/// Opaque identifier of a pool instance.
///
/// Positions carry a `PoolId` back-reference instead of a live pointer to
/// the pool; every position-taking operation validates the id against the
/// pool it is called on and fails with
/// [`AmmError::WrongPool`](crate::error::AmmError::WrongPool) on mismatch.
/// The factory/registry assigns ids and guarantees uniqueness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PoolId(u64);

impl PoolId {
    /// Creates a `PoolId` from a raw value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pool#{}", self.0)
    }
}
