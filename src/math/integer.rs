//! Widened integer helpers.
//!
//! Every multiply-then-divide in the engine goes through these functions so
//! the intermediate product is computed in `u128` and rounding is always an
//! explicit choice at the call site.

use crate::domain::Rounding;

/// Integer square root by Babylonian iteration, rounded down.
///
/// `isqrt(0) == 0`, `isqrt(3) == 1`, `isqrt(100) == 10`.
#[must_use]
pub const fn isqrt(value: u128) -> u128 {
    if value < 2 {
        return value;
    }
    let mut x = value;
    let mut y = x.div_ceil(2);
    while y < x {
        x = y;
        y = (x + value / x) / 2;
    }
    x
}

/// Computes `a * b / denominator` with a `u128` intermediate.
///
/// Returns `None` if `denominator` is zero or the result does not fit in
/// `u64`.
#[must_use]
pub const fn mul_div(a: u64, b: u64, denominator: u64, rounding: Rounding) -> Option<u64> {
    if denominator == 0 {
        return None;
    }
    let product = a as u128 * b as u128;
    let denom = denominator as u128;
    let out = match rounding {
        Rounding::Down => product / denom,
        Rounding::Up => {
            let q = product / denom;
            if product % denom != 0 {
                q + 1
            } else {
                q
            }
        }
    };
    if out > u64::MAX as u128 {
        return None;
    }
    Some(out as u64)
}

/// Computes `a * b / denominator` entirely in `u128`.
///
/// Returns `None` if `denominator` is zero or the product overflows `u128`.
/// Used by the fee accumulator, whose per-share values exceed `u64`.
#[must_use]
pub const fn mul_div_u128(a: u128, b: u128, denominator: u128, rounding: Rounding) -> Option<u128> {
    if denominator == 0 {
        return None;
    }
    let Some(product) = a.checked_mul(b) else {
        return None;
    };
    let out = match rounding {
        Rounding::Down => product / denominator,
        Rounding::Up => {
            let q = product / denominator;
            if product % denominator != 0 {
                q + 1
            } else {
                q
            }
        }
    };
    Some(out)
}
