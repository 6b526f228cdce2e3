//! Numeric constants fixed by the engine's contract.
//!
//! These values are part of the public interface: callers, auditors, and
//! host integrations rely on them being exactly these numbers.

/// Basis-point denominator (10 000 = 100%).
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Fixed-point scale for the per-share fee accumulators.
///
/// Large enough that small per-swap fees still register a nonzero
/// increment against large share totals.
pub const ACC_PRECISION: u128 = 1_000_000_000_000;

/// Fixed-point scale for prices (units of input per unit of output).
pub const PRICE_PRECISION: u128 = 1_000_000_000;

/// Shares permanently locked on the first deposit into an empty pool.
///
/// Never assigned to any position and never redeemable; guarantees a
/// non-zero minimum share price so the first depositor cannot inflate
/// the share price against later entrants.
pub const MINIMUM_LIQUIDITY: u64 = 1_000;

/// Minimum `sqrt(amount_a * amount_b)` for the first deposit.
///
/// Keeps the fixed [`MINIMUM_LIQUIDITY`] lock from consuming a large
/// fraction of a tiny genesis deposit.
pub const MIN_INITIAL_LIQUIDITY: u64 = 10_000;

/// Lowest permitted amplification coefficient for a stable pool.
pub const MIN_AMP: u64 = 1;

/// Highest permitted amplification coefficient for a stable pool.
pub const MAX_AMP: u64 = 1_000;

/// Maximum creator fee share, in basis points of the total swap fee.
pub const MAX_CREATOR_FEE_BPS: u64 = 500;

/// Iteration cap for the Newton's-method invariant solvers.
pub const MAX_ITERATIONS: u32 = 64;

/// Convergence threshold for the invariant solvers (absolute difference
/// between consecutive iterates, in raw token units).
pub const CONVERGENCE_THRESHOLD: u128 = 1;
