//! Canonically ordered pair of distinct tokens.

use core::fmt;

use super::TokenAddress;
use crate::error::AmmError;

/// An ordered pair of distinct token addresses.
///
/// The pair is canonicalised on construction: `first() < second()` by
/// address ordering, regardless of argument order. Pool "token A" is
/// always `first()` and "token B" is always `second()`, so two callers
/// constructing the same pair in opposite orders agree on direction.
///
/// # Examples
///
/// ```
/// use tidepool_amm::domain::{TokenAddress, TokenPair};
///
/// let x = TokenAddress::from_bytes([1u8; 32]);
/// let y = TokenAddress::from_bytes([2u8; 32]);
/// let pair = TokenPair::new(y, x).expect("distinct tokens");
/// assert_eq!(pair.first(), x);
/// assert_eq!(pair.second(), y);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenPair {
    first: TokenAddress,
    second: TokenAddress,
}

impl TokenPair {
    /// Creates a canonically ordered pair.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidQuantity`] if both addresses are equal.
    pub fn new(a: TokenAddress, b: TokenAddress) -> crate::error::Result<Self> {
        if a == b {
            return Err(AmmError::InvalidQuantity("pair tokens must be distinct"));
        }
        let (first, second) = if a < b { (a, b) } else { (b, a) };
        Ok(Self { first, second })
    }

    /// Returns the lower-ordered token (pool token A).
    #[must_use]
    pub const fn first(&self) -> TokenAddress {
        self.first
    }

    /// Returns the higher-ordered token (pool token B).
    #[must_use]
    pub const fn second(&self) -> TokenAddress {
        self.second
    }

    /// Returns `true` if the given token is one of the pair.
    #[must_use]
    pub fn contains(&self, token: &TokenAddress) -> bool {
        *token == self.first || *token == self.second
    }
}

impl fmt::Display for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.first, self.second)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn addr(b: u8) -> TokenAddress {
        TokenAddress::from_bytes([b; 32])
    }

    #[test]
    fn canonical_order() {
        let Ok(p1) = TokenPair::new(addr(1), addr(2)) else {
            panic!("expected Ok");
        };
        let Ok(p2) = TokenPair::new(addr(2), addr(1)) else {
            panic!("expected Ok");
        };
        assert_eq!(p1, p2);
        assert_eq!(p1.first(), addr(1));
        assert_eq!(p1.second(), addr(2));
    }

    #[test]
    fn identical_tokens_rejected() {
        assert!(TokenPair::new(addr(5), addr(5)).is_err());
    }

    #[test]
    fn contains() {
        let Ok(pair) = TokenPair::new(addr(1), addr(2)) else {
            panic!("expected Ok");
        };
        assert!(pair.contains(&addr(1)));
        assert!(pair.contains(&addr(2)));
        assert!(!pair.contains(&addr(3)));
    }
}
