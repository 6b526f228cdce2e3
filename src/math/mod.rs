//! Pricing math.
//!
//! Pure integer functions, no pool state. [`constant_product`] prices the
//! x·y = k curve, [`stable`] the amplified invariant, and [`integer`] holds
//! the widened helpers both build on.

pub mod constant_product;
pub mod integer;
pub mod stable;
