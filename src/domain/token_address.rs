//! Opaque token identity.

use core::fmt;

/// A 32-byte token identifier.
///
/// The engine treats token identity as opaque: addresses are compared for
/// equality and ordering only, never interpreted. The host platform defines
/// what the bytes mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenAddress([u8; 32]);

impl TokenAddress {
    /// Creates a `TokenAddress` from raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the raw bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for TokenAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // First four bytes are enough to tell addresses apart in logs.
        write!(
            f,
            "{:02x}{:02x}{:02x}{:02x}…",
            self.0[0], self.0[1], self.0[2], self.0[3]
        )
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn from_bytes_round_trip() {
        let addr = TokenAddress::from_bytes([7u8; 32]);
        assert_eq!(addr.as_bytes(), &[7u8; 32]);
    }

    #[test]
    fn ordering_is_lexicographic() {
        let lo = TokenAddress::from_bytes([1u8; 32]);
        let hi = TokenAddress::from_bytes([2u8; 32]);
        assert!(lo < hi);
    }

    #[test]
    fn display_prefix() {
        let addr = TokenAddress::from_bytes([0xab; 32]);
        assert_eq!(format!("{addr}"), "abababab…");
    }
}
