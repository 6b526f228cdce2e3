//! Amplified stable-swap invariant for two-token pools.
//!
//! The invariant `D` interpolates between constant-sum (high amplification,
//! flat price near balance) and constant-product (amplification of 1, or a
//! badly imbalanced pool). Both solvers are Newton's method over `u128`
//! with a fixed iteration cap; a solver that fails to converge aborts the
//! whole operation rather than settling on a stale value.

use crate::constants::{CONVERGENCE_THRESHOLD, MAX_AMP, MAX_ITERATIONS, MIN_AMP};
use crate::error::{AmmError, Result};

/// Number of tokens in the pool. The solvers are specialised to two.
const N_COINS: u128 = 2;

/// Solves for the invariant `D` given balances `x`, `y` and amplification.
///
/// Degenerate balances short-circuit: an empty pool has `D = 0`, and a
/// one-sided pool falls back to the constant-sum value `x + y` because the
/// Newton iteration is undefined with a zero balance.
///
/// # Errors
///
/// - [`AmmError::ConvergenceFailed`] if the iteration does not settle
///   within the cap.
/// - [`AmmError::Overflow`] if an intermediate product exceeds `u128`.
pub fn get_d(x: u64, y: u64, amp: u64) -> Result<u128> {
    let x = u128::from(x);
    let y = u128::from(y);
    let sum = x + y;
    if sum == 0 {
        return Ok(0);
    }
    if x == 0 || y == 0 {
        return Ok(sum);
    }

    // Leverage ann = amp * n. amp = 1 approximates constant product.
    let ann = u128::from(amp) * N_COINS;
    let mut d = sum;
    for _ in 0..MAX_ITERATIONS {
        // d_p = D^(n+1) / (n^n * x * y), built stepwise to stay in range.
        let mut d_p = d;
        d_p = mul_div_checked(d_p, d, x * N_COINS)?;
        d_p = mul_div_checked(d_p, d, y * N_COINS)?;

        let d_prev = d;
        // d = (ann*sum + n*d_p) * d / ((ann - 1)*d + (n + 1)*d_p)
        let numerator = mul_div_checked(
            ann.checked_mul(sum)
                .and_then(|v| v.checked_add(d_p * N_COINS))
                .ok_or(AmmError::Overflow("invariant numerator"))?,
            d,
            (ann - 1)
                .checked_mul(d)
                .and_then(|v| v.checked_add((N_COINS + 1) * d_p))
                .ok_or(AmmError::Overflow("invariant denominator"))?,
        )?;
        d = numerator;
        if d.abs_diff(d_prev) <= CONVERGENCE_THRESHOLD {
            return Ok(d);
        }
    }
    Err(AmmError::ConvergenceFailed("invariant solver"))
}

/// Solves for the post-swap balance of the output token, given the new
/// input-side balance `x`, the invariant `d` and the amplification.
///
/// `D = 0` means an empty pool and yields zero. A zero input balance with a
/// nonzero invariant has no solution and fails fast.
///
/// # Errors
///
/// - [`AmmError::ConvergenceFailed`] if there is no solution or the
///   iteration does not settle within the cap.
/// - [`AmmError::Overflow`] if an intermediate product exceeds `u128`.
pub fn get_y(x: u64, d: u128, amp: u64) -> Result<u128> {
    if d == 0 {
        return Ok(0);
    }
    let x = u128::from(x);
    if x == 0 {
        return Err(AmmError::ConvergenceFailed("output balance solver"));
    }

    let ann = u128::from(amp) * N_COINS;
    // c = D^(n+1) / (n^n * x * ann) built stepwise.
    let mut c = mul_div_checked(d, d, x * N_COINS)?;
    c = mul_div_checked(c, d, ann * N_COINS)?;
    let b = x + d / ann;

    // y^2 + (b - D)y = c, solved by Newton: y <- (y^2 + c) / (2y + b - D).
    let mut y = d;
    for _ in 0..MAX_ITERATIONS {
        let y_prev = y;
        let numerator = y
            .checked_mul(y)
            .and_then(|v| v.checked_add(c))
            .ok_or(AmmError::Overflow("output balance numerator"))?;
        let denominator = (2 * y + b)
            .checked_sub(d)
            .ok_or(AmmError::ConvergenceFailed("output balance solver"))?;
        if denominator == 0 {
            return Err(AmmError::ConvergenceFailed("output balance solver"));
        }
        y = numerator / denominator;
        if y.abs_diff(y_prev) <= CONVERGENCE_THRESHOLD {
            return Ok(y);
        }
    }
    Err(AmmError::ConvergenceFailed("output balance solver"))
}

/// Values `amount_in` at the curve's marginal price: the output a
/// zero-slippage trade of that size would pay at the current reserves.
///
/// The price is the invariant's gradient at `(x, y)`:
/// `|dy/dx| = (ann*x + d_p) * y / ((ann*y + d_p) * x)` with
/// `d_p = D^3 / (4xy)`. High amplification pushes it toward parity, an
/// amplification of 1 toward the reserve ratio `y / x`.
///
/// # Errors
///
/// - [`AmmError::ZeroReserve`] if either reserve is zero.
/// - [`AmmError::ConvergenceFailed`] or [`AmmError::Overflow`] from the
///   invariant solver.
pub fn ideal_output(reserve_in: u64, reserve_out: u64, amount_in: u64, amp: u64) -> Result<u128> {
    if reserve_in == 0 || reserve_out == 0 {
        return Err(AmmError::ZeroReserve);
    }
    let d = get_d(reserve_in, reserve_out, amp)?;
    let x = u128::from(reserve_in);
    let y = u128::from(reserve_out);

    let ann = u128::from(amp) * N_COINS;
    let mut d_p = mul_div_checked(d, d, x * N_COINS)?;
    d_p = mul_div_checked(d_p, d, y * N_COINS)?;
    let weight_in = ann
        .checked_mul(x)
        .and_then(|v| v.checked_add(d_p))
        .ok_or(AmmError::Overflow("marginal price weight"))?;
    let weight_out = ann
        .checked_mul(y)
        .and_then(|v| v.checked_add(d_p))
        .ok_or(AmmError::Overflow("marginal price weight"))?;

    let at_ratio = mul_div_checked(u128::from(amount_in), y, x)?;
    mul_div_checked(at_ratio, weight_in, weight_out)
}

fn mul_div_checked(a: u128, b: u128, denominator: u128) -> Result<u128> {
    if denominator == 0 {
        return Err(AmmError::DivisionByZero);
    }
    a.checked_mul(b)
        .map(|product| product / denominator)
        .ok_or(AmmError::Overflow("stable solver product"))
}

/// Amplification coefficient with linear ramping.
///
/// Governance moves the coefficient gradually: `current(now)` interpolates
/// between the initial and target values over the ramp window so the pool
/// price never jumps. Outside a ramp both endpoints are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Amplification {
    initial_amp: u64,
    target_amp: u64,
    ramp_start: u64,
    ramp_end: u64,
}

impl Amplification {
    /// A fixed coefficient with no ramp in progress.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::AmpOutOfRange`] if `amp` is outside `1..=1_000`.
    pub const fn constant(amp: u64) -> Result<Self> {
        if amp < MIN_AMP || amp > MAX_AMP {
            return Err(AmmError::AmpOutOfRange);
        }
        Ok(Self {
            initial_amp: amp,
            target_amp: amp,
            ramp_start: 0,
            ramp_end: 0,
        })
    }

    /// The coefficient in effect at time `now`.
    #[must_use]
    pub const fn current(&self, now: u64) -> u64 {
        if now >= self.ramp_end {
            return self.target_amp;
        }
        if now <= self.ramp_start {
            return self.initial_amp;
        }
        let elapsed = (now - self.ramp_start) as u128;
        let window = (self.ramp_end - self.ramp_start) as u128;
        if self.target_amp >= self.initial_amp {
            let delta = (self.target_amp - self.initial_amp) as u128;
            self.initial_amp + (delta * elapsed / window) as u64
        } else {
            let delta = (self.initial_amp - self.target_amp) as u128;
            self.initial_amp - (delta * elapsed / window) as u64
        }
    }

    /// The ramp's target coefficient.
    #[must_use]
    pub const fn target(&self) -> u64 {
        self.target_amp
    }

    /// Begins a linear ramp from the coefficient in effect at `now` toward
    /// `target_amp`, finishing at `ramp_end`.
    ///
    /// # Errors
    ///
    /// - [`AmmError::AmpOutOfRange`] if `target_amp` is outside `1..=1_000`.
    /// - [`AmmError::InvalidQuantity`] if the window is empty
    ///   (`ramp_end <= now`).
    pub fn start_ramp(&mut self, target_amp: u64, now: u64, ramp_end: u64) -> Result<()> {
        if !(MIN_AMP..=MAX_AMP).contains(&target_amp) {
            return Err(AmmError::AmpOutOfRange);
        }
        if ramp_end <= now {
            return Err(AmmError::InvalidQuantity("ramp must end in the future"));
        }
        self.initial_amp = self.current(now);
        self.target_amp = target_amp;
        self.ramp_start = now;
        self.ramp_end = ramp_end;
        Ok(())
    }

    /// Freezes the coefficient at its value at time `now`, cancelling any
    /// ramp in progress.
    pub fn stop_ramp(&mut self, now: u64) {
        let amp = self.current(now);
        self.initial_amp = amp;
        self.target_amp = amp;
        self.ramp_start = now;
        self.ramp_end = now;
    }
}
