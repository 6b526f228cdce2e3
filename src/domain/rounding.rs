//! Explicit rounding direction for integer division.

use core::fmt;

/// Rounding direction applied to a division.
///
/// Every division in the engine names its direction explicitly. The rule
/// of thumb throughout the crate: round **down** whatever leaves the pool
/// (outputs, withdrawals, minted shares) and round **up** whatever the
/// pool collects (paired deposit amounts), so rounding never leaks value
/// to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Rounding {
    /// Floor division (round towards zero).
    #[default]
    Down = 0,
    /// Ceiling division.
    Up = 1,
}

impl fmt::Display for Rounding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Down => write!(f, "Down"),
            Self::Up => write!(f, "Up"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn default_is_down() {
        assert_eq!(Rounding::default(), Rounding::Down);
    }

    #[test]
    fn display() {
        assert_eq!(format!("{}", Rounding::Down), "Down");
        assert_eq!(format!("{}", Rounding::Up), "Up");
    }
}
