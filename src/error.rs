//! Unified error types for the Tidepool AMM engine.
//!
//! All fallible operations across the crate return [`AmmError`] as their
//! error type, ensuring a consistent error handling experience for
//! consumers.
//!
//! # Taxonomy
//!
//! | Family | Variants | Recovery |
//! |--------|----------|----------|
//! | Input validation | [`ZeroAmount`](AmmError::ZeroAmount), [`InvalidFeeTier`](AmmError::InvalidFeeTier), [`AmpOutOfRange`](AmmError::AmpOutOfRange), [`CreatorFeeTooHigh`](AmmError::CreatorFeeTooHigh) | retry with corrected input |
//! | Guard violations | [`InsufficientOutput`](AmmError::InsufficientOutput), [`ExcessiveSlippage`](AmmError::ExcessiveSlippage), [`ExcessivePriceImpact`](AmmError::ExcessivePriceImpact), [`DeadlinePassed`](AmmError::DeadlinePassed) | retry with adjusted bounds or a fresh quote |
//! | Numerical | [`ConvergenceFailed`](AmmError::ConvergenceFailed) | fatal for the call; pathological input |
//! | Identity | [`WrongPool`](AmmError::WrongPool) | integration error, use the correct pool |
//! | Authorization | [`Paused`](AmmError::Paused), [`Unauthorized`](AmmError::Unauthorized) | surfaced to the administrative layer |
//!
//! Every failure is all-or-nothing: an operation that returns an error has
//! not modified reserves, accumulators, or any position.

use thiserror::Error;

/// Unified error enum for every fallible operation in the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AmmError {
    /// A money amount that must be positive was zero.
    #[error("amount must be non-zero")]
    ZeroAmount,

    /// The requested fee tier is not on the allow-list.
    #[error("fee tier is not on the allow-list")]
    InvalidFeeTier,

    /// Amplification coefficient outside `[MIN_AMP, MAX_AMP]`.
    #[error("amplification coefficient out of range")]
    AmpOutOfRange,

    /// Creator fee share above `MAX_CREATOR_FEE_BPS`.
    #[error("creator fee exceeds the maximum share")]
    CreatorFeeTooHigh,

    /// Reserves or shares are too small to satisfy the operation, or an
    /// initial deposit falls below `MIN_INITIAL_LIQUIDITY`.
    #[error("insufficient liquidity")]
    InsufficientLiquidity,

    /// The computed output is zero or below the caller's minimum.
    #[error("output below the caller's minimum")]
    InsufficientOutput,

    /// The execution price exceeds the caller's price bound.
    #[error("execution price above the caller's bound")]
    ExcessiveSlippage,

    /// Price impact exceeds the pool's risk cap.
    #[error("price impact above the pool's risk cap")]
    ExcessivePriceImpact,

    /// The instruction's deadline is in the past.
    #[error("deadline passed")]
    DeadlinePassed,

    /// A Newton's-method solver did not converge within its iteration cap.
    #[error("solver failed to converge: {0}")]
    ConvergenceFailed(&'static str),

    /// The position references a different pool.
    #[error("position does not belong to this pool")]
    WrongPool,

    /// The pool is paused; mutating operations are rejected.
    #[error("pool is paused")]
    Paused,

    /// The caller lacks the required administrative capability. Raised by
    /// the host's administrative layer, never by ordinary pool operations.
    #[error("caller lacks the required capability")]
    Unauthorized,

    /// Checked arithmetic overflowed. The payload names the computation.
    #[error("arithmetic overflow: {0}")]
    Overflow(&'static str),

    /// Division by zero.
    #[error("division by zero")]
    DivisionByZero,

    /// A reserve that must be positive was zero.
    #[error("reserve is zero")]
    ZeroReserve,

    /// A quantity failed a structural validation rule.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(&'static str),
}

/// Crate-wide result alias.
pub type Result<T> = core::result::Result<T, AmmError>;
