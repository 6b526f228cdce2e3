//! The pool state machine.
//!
//! A [`Pool`] owns reserves, share totals, fee balances and accumulators
//! for one token pair, and orchestrates the pricing engines, liquidity
//! accounting and guards for every operation. Operations are atomic: all
//! fallible arithmetic runs on local copies first and state is only
//! written once nothing can fail, so an error never leaves the pool
//! partially updated.

use crate::config::{CurveKind, PoolConfig};
use crate::constants::{BPS_DENOMINATOR, MINIMUM_LIQUIDITY, MIN_INITIAL_LIQUIDITY, PRICE_PRECISION};
use crate::domain::{Amount, Liquidity, Position, Rounding};
use crate::error::{AmmError, Result};
use crate::fees::{FeeAccumulator, FeeBreakdown};
use crate::guard::SwapGuard;
use crate::math::constant_product;
use crate::math::integer::{isqrt, mul_div, mul_div_u128};
use crate::math::stable::{self, Amplification};

/// Which way a swap moves through the pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapDirection {
    /// Token A in, token B out.
    AToB,
    /// Token B in, token A out.
    BToA,
}

/// Outcome of a committed swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapResult {
    /// Gross input, fee included.
    pub amount_in: Amount,
    /// Output paid to the trader.
    pub amount_out: Amount,
    /// How the fee was split.
    pub fees: FeeBreakdown,
    /// Realised price impact in basis points.
    pub price_impact_bps: u32,
}

/// Outcome of a deposit-shaped operation (add, increase, compound).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepositResult {
    /// Shares credited to the position.
    pub minted: Liquidity,
    /// Supplied token A that was not needed at the current ratio.
    pub refund_a: Amount,
    /// Supplied token B that was not needed at the current ratio.
    pub refund_b: Amount,
    /// Token-A fees settled and paid out as part of the operation.
    pub settled_fee_a: Amount,
    /// Token-B fees settled and paid out as part of the operation.
    pub settled_fee_b: Amount,
}

/// Outcome of a withdrawal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WithdrawResult {
    /// Token A returned for the burned shares.
    pub amount_a: Amount,
    /// Token B returned for the burned shares.
    pub amount_b: Amount,
    /// Token-A fees settled and paid out as part of the operation.
    pub settled_fee_a: Amount,
    /// Token-B fees settled and paid out as part of the operation.
    pub settled_fee_b: Amount,
}

/// One position's fee settlement computed against current state. Nothing
/// is committed until the surrounding operation has passed every check.
struct Settlement {
    owed_a: Amount,
    owed_b: Amount,
    reserve_a: Amount,
    reserve_b: Amount,
    unclaimed_a: Amount,
    unclaimed_b: Amount,
}

/// One pool instance: a pair of reserves, its share ledger and fee state.
#[derive(Debug, Clone)]
pub struct Pool {
    config: PoolConfig,
    reserve_a: Amount,
    reserve_b: Amount,
    total_shares: Liquidity,
    locked_shares: Liquidity,
    accumulator: FeeAccumulator,
    unclaimed_lp_a: Amount,
    unclaimed_lp_b: Amount,
    protocol_fees_a: Amount,
    protocol_fees_b: Amount,
    creator_fees_a: Amount,
    creator_fees_b: Amount,
    amp: Option<Amplification>,
    paused: bool,
}

impl Pool {
    /// Instantiates an empty pool from validated creation parameters.
    ///
    /// # Errors
    ///
    /// Propagates any [`PoolConfig::validate`] failure.
    pub fn from_config(config: PoolConfig) -> Result<Self> {
        config.validate()?;
        let amp = match config.curve {
            CurveKind::ConstantProduct => None,
            CurveKind::Stable { amp } => Some(Amplification::constant(amp)?),
        };
        Ok(Self {
            config,
            reserve_a: Amount::ZERO,
            reserve_b: Amount::ZERO,
            total_shares: Liquidity::ZERO,
            locked_shares: Liquidity::ZERO,
            accumulator: FeeAccumulator::new(),
            unclaimed_lp_a: Amount::ZERO,
            unclaimed_lp_b: Amount::ZERO,
            protocol_fees_a: Amount::ZERO,
            protocol_fees_b: Amount::ZERO,
            creator_fees_a: Amount::ZERO,
            creator_fees_b: Amount::ZERO,
            amp,
            paused: false,
        })
    }

    // -- swaps --------------------------------------------------------------------

    /// Swaps token A for token B.
    ///
    /// # Errors
    ///
    /// See [`swap`](Self::swap).
    pub fn swap_a_to_b(
        &mut self,
        amount_in: Amount,
        guard: &SwapGuard,
        now: u64,
    ) -> Result<SwapResult> {
        self.swap(SwapDirection::AToB, amount_in, guard, now)
    }

    /// Swaps token B for token A.
    ///
    /// # Errors
    ///
    /// See [`swap`](Self::swap).
    pub fn swap_b_to_a(
        &mut self,
        amount_in: Amount,
        guard: &SwapGuard,
        now: u64,
    ) -> Result<SwapResult> {
        self.swap(SwapDirection::BToA, amount_in, guard, now)
    }

    /// Executes a swap in the given direction.
    ///
    /// The fee is carved off the input before pricing. The protocol and
    /// creator cuts move to their withdrawable balances; the LP cut stays
    /// in the input reserve and is simultaneously credited to the
    /// per-share accumulator, so the invariant grows by exactly the LP fee
    /// on every swap. The same amount is added to the pool's unclaimed
    /// balance, which keeps promised fees out of the share base until
    /// providers collect them.
    ///
    /// # Errors
    ///
    /// - [`AmmError::Paused`] while the pool is paused.
    /// - [`AmmError::ZeroAmount`] for a zero input.
    /// - [`AmmError::ZeroReserve`] before the pool is seeded.
    /// - [`AmmError::DeadlinePassed`], [`AmmError::InsufficientOutput`],
    ///   [`AmmError::ExcessiveSlippage`] from the guard.
    /// - [`AmmError::ExcessivePriceImpact`] above the pool's risk cap.
    /// - [`AmmError::ConvergenceFailed`] from the stable solver.
    pub fn swap(
        &mut self,
        direction: SwapDirection,
        amount_in: Amount,
        guard: &SwapGuard,
        now: u64,
    ) -> Result<SwapResult> {
        self.ensure_active()?;
        guard.check_deadline(now)?;

        let (fees, amount_out, impact) = self.preview(direction, amount_in, now)?;
        guard.check_output(amount_out)?;
        guard.check_price(amount_in, amount_out)?;

        let (reserve_in, reserve_out) = self.oriented_reserves(direction);

        // Everything the pool retains on the input side: net input plus
        // the LP fee.
        let retained = amount_in
            .checked_sub(&fees.protocol)
            .and_then(|v| v.checked_sub(&fees.creator))
            .ok_or(AmmError::Overflow("fee split exceeds input"))?;
        let new_reserve_in = reserve_in
            .checked_add(&retained)
            .ok_or(AmmError::Overflow("input reserve"))?;
        let new_reserve_out = reserve_out
            .checked_sub(&amount_out)
            .ok_or(AmmError::InsufficientLiquidity)?;

        let mut accumulator = self.accumulator;
        let (new_protocol, new_creator, new_unclaimed) = match direction {
            SwapDirection::AToB => {
                accumulator.accrue_a(fees.lp, self.total_shares)?;
                (
                    self.protocol_fees_a
                        .checked_add(&fees.protocol)
                        .ok_or(AmmError::Overflow("protocol fee balance"))?,
                    self.creator_fees_a
                        .checked_add(&fees.creator)
                        .ok_or(AmmError::Overflow("creator fee balance"))?,
                    self.unclaimed_lp_a
                        .checked_add(&fees.lp)
                        .ok_or(AmmError::Overflow("unclaimed fee balance"))?,
                )
            }
            SwapDirection::BToA => {
                accumulator.accrue_b(fees.lp, self.total_shares)?;
                (
                    self.protocol_fees_b
                        .checked_add(&fees.protocol)
                        .ok_or(AmmError::Overflow("protocol fee balance"))?,
                    self.creator_fees_b
                        .checked_add(&fees.creator)
                        .ok_or(AmmError::Overflow("creator fee balance"))?,
                    self.unclaimed_lp_b
                        .checked_add(&fees.lp)
                        .ok_or(AmmError::Overflow("unclaimed fee balance"))?,
                )
            }
        };

        // Commit.
        self.accumulator = accumulator;
        match direction {
            SwapDirection::AToB => {
                self.reserve_a = new_reserve_in;
                self.reserve_b = new_reserve_out;
                self.protocol_fees_a = new_protocol;
                self.creator_fees_a = new_creator;
                self.unclaimed_lp_a = new_unclaimed;
            }
            SwapDirection::BToA => {
                self.reserve_b = new_reserve_in;
                self.reserve_a = new_reserve_out;
                self.protocol_fees_b = new_protocol;
                self.creator_fees_b = new_creator;
                self.unclaimed_lp_b = new_unclaimed;
            }
        }

        Ok(SwapResult {
            amount_in,
            amount_out,
            fees,
            price_impact_bps: impact,
        })
    }

    /// Quotes a swap without touching state: `(amount_out, impact_bps)`.
    ///
    /// The quote applies the same fee split, curve and price-impact cap a
    /// real swap would, but no trader-side guard.
    ///
    /// # Errors
    ///
    /// Same pricing errors as [`swap`](Self::swap), minus the guard and
    /// pause checks.
    pub fn quote_swap(
        &self,
        direction: SwapDirection,
        amount_in: Amount,
        now: u64,
    ) -> Result<(Amount, u32)> {
        let (_, amount_out, impact) = self.preview(direction, amount_in, now)?;
        Ok((amount_out, impact))
    }

    /// Builds a guard for a swap using the pool's default slippage
    /// tolerance: `min_out` is the current quote reduced by
    /// `default_max_slippage_bps`.
    ///
    /// # Errors
    ///
    /// Propagates quoting errors.
    pub fn default_guard(
        &self,
        direction: SwapDirection,
        amount_in: Amount,
        now: u64,
        deadline: u64,
    ) -> Result<SwapGuard> {
        let (quoted, _) = self.quote_swap(direction, amount_in, now)?;
        let tolerance = self.config.default_max_slippage_bps.apply(quoted, Rounding::Up)?;
        let min_out = quoted
            .checked_sub(&tolerance)
            .ok_or(AmmError::Overflow("slippage tolerance exceeds quote"))?;
        Ok(SwapGuard::with_deadline(deadline).min_out(min_out))
    }

    fn preview(
        &self,
        direction: SwapDirection,
        amount_in: Amount,
        now: u64,
    ) -> Result<(FeeBreakdown, Amount, u32)> {
        if amount_in.is_zero() {
            return Err(AmmError::ZeroAmount);
        }
        let (reserve_in, reserve_out) = self.oriented_reserves(direction);
        if reserve_in.is_zero() || reserve_out.is_zero() {
            return Err(AmmError::ZeroReserve);
        }

        let fees = FeeBreakdown::split(
            amount_in,
            self.config.fee_tier,
            self.config.protocol_fee_share,
            self.config.creator_fee_share,
        )?;
        let net_in = amount_in
            .checked_sub(&fees.total)
            .ok_or(AmmError::Overflow("fee exceeds input"))?;

        let out_raw = self.curve_output(reserve_in.get(), reserve_out.get(), net_in.get(), now)?;
        let amount_out = Amount::new(out_raw);

        // Impact is measured against the curve's own zero-slippage price.
        // For a stable pool that is the marginal price at the current
        // reserves, not the reserve ratio: an imbalanced stable pool still
        // trades near parity, and a rebalancing trade must not be charged
        // for the imbalance it is removing.
        let impact = match self.config.curve {
            CurveKind::ConstantProduct => constant_product::price_impact_bps(
                reserve_in.get(),
                reserve_out.get(),
                net_in.get(),
                out_raw,
            )?,
            CurveKind::Stable { .. } => {
                let amp = self.current_amp(now)?;
                let ideal =
                    stable::ideal_output(reserve_in.get(), reserve_out.get(), net_in.get(), amp)?;
                if ideal == 0 {
                    0
                } else {
                    let shortfall = ideal.saturating_sub(u128::from(out_raw));
                    let bps = mul_div_u128(
                        shortfall,
                        u128::from(BPS_DENOMINATOR),
                        ideal,
                        Rounding::Down,
                    )
                    .ok_or(AmmError::Overflow("price impact"))?;
                    bps as u32
                }
            }
        };
        if impact > self.config.max_price_impact_bps.get() {
            return Err(AmmError::ExcessivePriceImpact);
        }
        Ok((fees, amount_out, impact))
    }

    fn curve_output(
        &self,
        reserve_in: u64,
        reserve_out: u64,
        net_in: u64,
        now: u64,
    ) -> Result<u64> {
        match self.config.curve {
            CurveKind::ConstantProduct => {
                constant_product::quote_output(reserve_in, reserve_out, net_in)
            }
            CurveKind::Stable { .. } => {
                let amp = self.current_amp(now)?;
                let d = stable::get_d(reserve_in, reserve_out, amp)?;
                let new_in = reserve_in
                    .checked_add(net_in)
                    .ok_or(AmmError::Overflow("swap input exceeds reserve capacity"))?;
                let new_out = stable::get_y(new_in, d, amp)?;
                let gross = u128::from(reserve_out).saturating_sub(new_out);
                // One unit of margin absorbs solver truncation so the
                // invariant cannot dip below its pre-swap value.
                Ok(gross.saturating_sub(1) as u64)
            }
        }
    }

    // -- liquidity ----------------------------------------------------------------

    /// Deposits into the pool and opens a new position.
    ///
    /// The first deposit seeds the reserves at the caller's ratio, mints
    /// `sqrt(amount_a * amount_b)` shares, and permanently locks
    /// [`MINIMUM_LIQUIDITY`] of them. Later deposits mint against the
    /// share base — the reserves net of LP fees already promised to
    /// existing positions — so a new depositor never underwrites fees
    /// accrued before it arrived. Whatever the caller supplied beyond the
    /// exact pair is returned in the refund fields.
    ///
    /// # Errors
    ///
    /// - [`AmmError::Paused`], [`AmmError::DeadlinePassed`],
    ///   [`AmmError::ZeroAmount`].
    /// - [`AmmError::InsufficientLiquidity`] if a first deposit mints
    ///   fewer than [`MIN_INITIAL_LIQUIDITY`] shares, or a later deposit
    ///   rounds to zero shares.
    /// - [`AmmError::ExcessiveSlippage`] if the shares credited fall
    ///   below `min_shares`.
    pub fn add_liquidity(
        &mut self,
        amount_a: Amount,
        amount_b: Amount,
        min_shares: Liquidity,
        now: u64,
        deadline: u64,
    ) -> Result<(Position, DepositResult)> {
        self.ensure_active()?;
        ensure_deadline(now, deadline)?;
        if amount_a.is_zero() || amount_b.is_zero() {
            return Err(AmmError::ZeroAmount);
        }

        if self.total_shares.is_zero() {
            return self.add_initial_liquidity(amount_a, amount_b, min_shares);
        }

        let base_a = Self::share_base(self.reserve_a, self.unclaimed_lp_a)?;
        let base_b = Self::share_base(self.reserve_b, self.unclaimed_lp_b)?;
        let (minted, used_a, used_b) =
            Self::proportional_mint(base_a, base_b, self.total_shares, amount_a, amount_b)?;
        if minted.is_zero() {
            return Err(AmmError::InsufficientLiquidity);
        }
        if minted.get() < min_shares.get() {
            return Err(AmmError::ExcessiveSlippage);
        }

        let new_reserve_a = self
            .reserve_a
            .checked_add(&used_a)
            .ok_or(AmmError::Overflow("reserve a"))?;
        let new_reserve_b = self
            .reserve_b
            .checked_add(&used_b)
            .ok_or(AmmError::Overflow("reserve b"))?;
        let new_total = self
            .total_shares
            .checked_add(&minted)
            .ok_or(AmmError::Overflow("total shares"))?;
        let (debt_a, debt_b) = self.accumulator.checkpoint(minted)?;

        // Commit.
        self.reserve_a = new_reserve_a;
        self.reserve_b = new_reserve_b;
        self.total_shares = new_total;

        let mut position = Position::new(
            self.config.pool_id,
            minted,
            debt_a,
            debt_b,
            used_a,
            used_b,
        );
        self.refresh_cached_value(&mut position);

        let refund_a = sub_or_zero(amount_a, used_a);
        let refund_b = sub_or_zero(amount_b, used_b);
        Ok((
            position,
            DepositResult {
                minted,
                refund_a,
                refund_b,
                settled_fee_a: Amount::ZERO,
                settled_fee_b: Amount::ZERO,
            },
        ))
    }

    fn add_initial_liquidity(
        &mut self,
        amount_a: Amount,
        amount_b: Amount,
        min_shares: Liquidity,
    ) -> Result<(Position, DepositResult)> {
        // sqrt of a u64*u64 product always fits in u64.
        let minted_total = isqrt(amount_a.widened() * amount_b.widened()) as u64;
        if minted_total < MIN_INITIAL_LIQUIDITY {
            return Err(AmmError::InsufficientLiquidity);
        }
        let credited = minted_total - MINIMUM_LIQUIDITY;
        if credited < min_shares.get() {
            return Err(AmmError::ExcessiveSlippage);
        }

        let credited = Liquidity::new(credited);
        let (debt_a, debt_b) = self.accumulator.checkpoint(credited)?;

        // Commit.
        self.reserve_a = amount_a;
        self.reserve_b = amount_b;
        self.total_shares = Liquidity::new(minted_total);
        self.locked_shares = Liquidity::new(MINIMUM_LIQUIDITY);

        let mut position = Position::new(
            self.config.pool_id,
            credited,
            debt_a,
            debt_b,
            amount_a,
            amount_b,
        );
        self.refresh_cached_value(&mut position);

        Ok((
            position,
            DepositResult {
                minted: credited,
                refund_a: Amount::ZERO,
                refund_b: Amount::ZERO,
                settled_fee_a: Amount::ZERO,
                settled_fee_b: Amount::ZERO,
            },
        ))
    }

    /// Adds to an existing position, settling its outstanding fees first.
    ///
    /// Settled fees are paid out to the owner as part of the result, not
    /// re-deposited; use [`compound_fees`](Self::compound_fees) for that.
    ///
    /// # Errors
    ///
    /// Same as [`add_liquidity`](Self::add_liquidity), plus
    /// [`AmmError::WrongPool`] for a position from another pool.
    pub fn increase_liquidity(
        &mut self,
        position: &mut Position,
        amount_a: Amount,
        amount_b: Amount,
        min_shares: Liquidity,
        now: u64,
        deadline: u64,
    ) -> Result<DepositResult> {
        self.ensure_active()?;
        ensure_deadline(now, deadline)?;
        self.ensure_same_pool(position)?;
        if amount_a.is_zero() || amount_b.is_zero() {
            return Err(AmmError::ZeroAmount);
        }

        // Settle at the old share balance before it changes, otherwise
        // the new shares would retroactively claim past accrual.
        let settled = self.settle(position)?;
        let base_a = Self::share_base(settled.reserve_a, settled.unclaimed_a)?;
        let base_b = Self::share_base(settled.reserve_b, settled.unclaimed_b)?;

        let (minted, used_a, used_b) =
            Self::proportional_mint(base_a, base_b, self.total_shares, amount_a, amount_b)?;
        if minted.is_zero() {
            return Err(AmmError::InsufficientLiquidity);
        }
        if minted.get() < min_shares.get() {
            return Err(AmmError::ExcessiveSlippage);
        }

        let new_reserve_a = settled
            .reserve_a
            .checked_add(&used_a)
            .ok_or(AmmError::Overflow("reserve a"))?;
        let new_reserve_b = settled
            .reserve_b
            .checked_add(&used_b)
            .ok_or(AmmError::Overflow("reserve b"))?;
        let new_total = self
            .total_shares
            .checked_add(&minted)
            .ok_or(AmmError::Overflow("total shares"))?;
        let new_liquidity = position
            .liquidity()
            .checked_add(&minted)
            .ok_or(AmmError::Overflow("position shares"))?;
        let (debt_a, debt_b) = self.accumulator.checkpoint(new_liquidity)?;

        // Commit.
        self.reserve_a = new_reserve_a;
        self.reserve_b = new_reserve_b;
        self.total_shares = new_total;
        self.unclaimed_lp_a = settled.unclaimed_a;
        self.unclaimed_lp_b = settled.unclaimed_b;
        position.set_liquidity(new_liquidity);
        position.checkpoint(debt_a, debt_b);
        position.raise_watermarks(used_a, used_b);
        self.refresh_cached_value(position);

        Ok(DepositResult {
            minted,
            refund_a: sub_or_zero(amount_a, used_a),
            refund_b: sub_or_zero(amount_b, used_b),
            settled_fee_a: settled.owed_a,
            settled_fee_b: settled.owed_b,
        })
    }

    /// Burns the position's entire share balance.
    ///
    /// # Errors
    ///
    /// See [`remove_liquidity_partial`](Self::remove_liquidity_partial).
    pub fn remove_liquidity(
        &mut self,
        position: &mut Position,
        now: u64,
        deadline: u64,
    ) -> Result<WithdrawResult> {
        self.remove_liquidity_partial(
            position,
            position.liquidity(),
            Amount::ZERO,
            Amount::ZERO,
            now,
            deadline,
        )
    }

    /// Burns `shares` of the position, settling outstanding fees first.
    ///
    /// Each token pays out `base * shares / total_shares`, floored, where
    /// the base is the reserves net of LP fees the accumulator has
    /// promised to other positions; an early exit cannot walk away with a
    /// slice of fees someone else will still claim.
    /// The position's redemption watermarks are rescaled by the remaining
    /// proportion, rounding up so they never hit zero while any liquidity
    /// remains.
    ///
    /// # Errors
    ///
    /// - [`AmmError::Paused`], [`AmmError::DeadlinePassed`],
    ///   [`AmmError::WrongPool`], [`AmmError::ZeroAmount`].
    /// - [`AmmError::InsufficientLiquidity`] if `shares` exceeds the
    ///   position's balance.
    /// - [`AmmError::ExcessiveSlippage`] if either payout falls below the
    ///   caller's floor.
    pub fn remove_liquidity_partial(
        &mut self,
        position: &mut Position,
        shares: Liquidity,
        min_a_out: Amount,
        min_b_out: Amount,
        now: u64,
        deadline: u64,
    ) -> Result<WithdrawResult> {
        self.ensure_active()?;
        ensure_deadline(now, deadline)?;
        self.ensure_same_pool(position)?;
        if shares.is_zero() {
            return Err(AmmError::ZeroAmount);
        }
        let old_liquidity = position.liquidity();
        if shares.get() > old_liquidity.get() {
            return Err(AmmError::InsufficientLiquidity);
        }

        let settled = self.settle(position)?;
        let base_a = Self::share_base(settled.reserve_a, settled.unclaimed_a)?;
        let base_b = Self::share_base(settled.reserve_b, settled.unclaimed_b)?;

        let amount_a = Amount::new(
            mul_div(base_a.get(), shares.get(), self.total_shares.get(), Rounding::Down)
                .ok_or(AmmError::Overflow("withdrawal amount"))?,
        );
        let amount_b = Amount::new(
            mul_div(base_b.get(), shares.get(), self.total_shares.get(), Rounding::Down)
                .ok_or(AmmError::Overflow("withdrawal amount"))?,
        );
        if amount_a.get() < min_a_out.get() || amount_b.get() < min_b_out.get() {
            return Err(AmmError::ExcessiveSlippage);
        }

        let new_reserve_a = settled
            .reserve_a
            .checked_sub(&amount_a)
            .ok_or(AmmError::InsufficientLiquidity)?;
        let new_reserve_b = settled
            .reserve_b
            .checked_sub(&amount_b)
            .ok_or(AmmError::InsufficientLiquidity)?;
        let new_total = self
            .total_shares
            .checked_sub(&shares)
            .ok_or(AmmError::InsufficientLiquidity)?;
        let remaining = old_liquidity
            .checked_sub(&shares)
            .ok_or(AmmError::InsufficientLiquidity)?;
        let (debt_a, debt_b) = self.accumulator.checkpoint(remaining)?;

        let (min_a, min_b) = if remaining.is_zero() {
            (Amount::ZERO, Amount::ZERO)
        } else {
            // Proportional rescale, rounded up: small removals must not
            // floor the watermark to zero.
            let min_a = mul_div(
                position.min_a().get(),
                remaining.get(),
                old_liquidity.get(),
                Rounding::Up,
            )
            .ok_or(AmmError::Overflow("watermark rescale"))?;
            let min_b = mul_div(
                position.min_b().get(),
                remaining.get(),
                old_liquidity.get(),
                Rounding::Up,
            )
            .ok_or(AmmError::Overflow("watermark rescale"))?;
            (Amount::new(min_a), Amount::new(min_b))
        };

        // Commit.
        self.reserve_a = new_reserve_a;
        self.reserve_b = new_reserve_b;
        self.total_shares = new_total;
        self.unclaimed_lp_a = settled.unclaimed_a;
        self.unclaimed_lp_b = settled.unclaimed_b;
        position.set_liquidity(remaining);
        position.checkpoint(debt_a, debt_b);
        position.set_watermarks(min_a, min_b);
        self.refresh_cached_value(position);

        Ok(WithdrawResult {
            amount_a,
            amount_b,
            settled_fee_a: settled.owed_a,
            settled_fee_b: settled.owed_b,
        })
    }

    // -- fees ---------------------------------------------------------------------

    /// Pays out the position's accrued fees and re-checkpoints it.
    ///
    /// An immediate second claim with no intervening swap returns exactly
    /// `(0, 0)`.
    ///
    /// # Errors
    ///
    /// [`AmmError::Paused`], [`AmmError::DeadlinePassed`],
    /// [`AmmError::WrongPool`].
    pub fn claim_fees(
        &mut self,
        position: &mut Position,
        now: u64,
        deadline: u64,
    ) -> Result<(Amount, Amount)> {
        self.ensure_active()?;
        ensure_deadline(now, deadline)?;
        self.ensure_same_pool(position)?;

        let settled = self.settle(position)?;
        let (debt_a, debt_b) = self.accumulator.checkpoint(position.liquidity())?;

        // Commit.
        self.reserve_a = settled.reserve_a;
        self.reserve_b = settled.reserve_b;
        self.unclaimed_lp_a = settled.unclaimed_a;
        self.unclaimed_lp_b = settled.unclaimed_b;
        position.checkpoint(debt_a, debt_b);
        self.refresh_cached_value(position);

        Ok((settled.owed_a, settled.owed_b))
    }

    /// Claims the position's fees and re-deposits as much of them as
    /// forms a balanced pair at the current ratio; the remainder comes
    /// back as a refund. Never swaps internally to balance the pair.
    ///
    /// # Errors
    ///
    /// Same as [`claim_fees`](Self::claim_fees).
    pub fn compound_fees(
        &mut self,
        position: &mut Position,
        now: u64,
        deadline: u64,
    ) -> Result<DepositResult> {
        self.ensure_active()?;
        ensure_deadline(now, deadline)?;
        self.ensure_same_pool(position)?;

        let settled = self.settle(position)?;
        let (owed_a, owed_b) = (settled.owed_a, settled.owed_b);

        // A one-sided claim cannot form a pair; pay everything out.
        let (minted, used_a, used_b) = if owed_a.is_zero() || owed_b.is_zero() {
            (Liquidity::ZERO, Amount::ZERO, Amount::ZERO)
        } else {
            let base_a = Self::share_base(settled.reserve_a, settled.unclaimed_a)?;
            let base_b = Self::share_base(settled.reserve_b, settled.unclaimed_b)?;
            Self::proportional_mint(base_a, base_b, self.total_shares, owed_a, owed_b)?
        };

        let new_reserve_a = settled
            .reserve_a
            .checked_add(&used_a)
            .ok_or(AmmError::Overflow("reserve a"))?;
        let new_reserve_b = settled
            .reserve_b
            .checked_add(&used_b)
            .ok_or(AmmError::Overflow("reserve b"))?;
        let new_total = self
            .total_shares
            .checked_add(&minted)
            .ok_or(AmmError::Overflow("total shares"))?;
        let new_liquidity = position
            .liquidity()
            .checked_add(&minted)
            .ok_or(AmmError::Overflow("position shares"))?;
        let (debt_a, debt_b) = self.accumulator.checkpoint(new_liquidity)?;

        // Commit.
        self.reserve_a = new_reserve_a;
        self.reserve_b = new_reserve_b;
        self.total_shares = new_total;
        self.unclaimed_lp_a = settled.unclaimed_a;
        self.unclaimed_lp_b = settled.unclaimed_b;
        position.set_liquidity(new_liquidity);
        position.checkpoint(debt_a, debt_b);
        position.raise_watermarks(used_a, used_b);
        self.refresh_cached_value(position);

        Ok(DepositResult {
            minted,
            refund_a: sub_or_zero(owed_a, used_a),
            refund_b: sub_or_zero(owed_b, used_b),
            settled_fee_a: owed_a,
            settled_fee_b: owed_b,
        })
    }

    /// Drains the protocol's withdrawable fee balances.
    ///
    /// Authorization is the host's responsibility; this only moves the
    /// bookkeeping.
    ///
    /// # Errors
    ///
    /// [`AmmError::DeadlinePassed`] for stale instructions.
    pub fn withdraw_protocol_fees(&mut self, now: u64, deadline: u64) -> Result<(Amount, Amount)> {
        ensure_deadline(now, deadline)?;
        let out = (self.protocol_fees_a, self.protocol_fees_b);
        self.protocol_fees_a = Amount::ZERO;
        self.protocol_fees_b = Amount::ZERO;
        Ok(out)
    }

    /// Drains the creator's withdrawable fee balances.
    ///
    /// # Errors
    ///
    /// [`AmmError::DeadlinePassed`] for stale instructions.
    pub fn withdraw_creator_fees(&mut self, now: u64, deadline: u64) -> Result<(Amount, Amount)> {
        ensure_deadline(now, deadline)?;
        let out = (self.creator_fees_a, self.creator_fees_b);
        self.creator_fees_a = Amount::ZERO;
        self.creator_fees_b = Amount::ZERO;
        Ok(out)
    }

    // -- administration -------------------------------------------------------------

    /// Pauses or resumes the pool. While paused every mutating operation
    /// fails with [`AmmError::Paused`]; views keep working.
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Whether the pool is paused.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Begins an amplification ramp. Stable pools only.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InvalidQuantity`] on a constant-product pool or an
    ///   empty ramp window.
    /// - [`AmmError::AmpOutOfRange`] for a target outside `1..=1_000`.
    pub fn start_amp_ramp(&mut self, target_amp: u64, now: u64, ramp_end: u64) -> Result<()> {
        let amp = self
            .amp
            .as_mut()
            .ok_or(AmmError::InvalidQuantity("not a stable pool"))?;
        amp.start_ramp(target_amp, now, ramp_end)
    }

    /// Freezes the amplification at its current value. Stable pools only.
    ///
    /// # Errors
    ///
    /// [`AmmError::InvalidQuantity`] on a constant-product pool.
    pub fn stop_amp_ramp(&mut self, now: u64) -> Result<()> {
        let amp = self
            .amp
            .as_mut()
            .ok_or(AmmError::InvalidQuantity("not a stable pool"))?;
        amp.stop_ramp(now);
        Ok(())
    }

    // -- views --------------------------------------------------------------------

    /// The creation parameters.
    #[must_use]
    pub const fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Current reserves as `(reserve_a, reserve_b)`.
    #[must_use]
    pub const fn reserves(&self) -> (Amount, Amount) {
        (self.reserve_a, self.reserve_b)
    }

    /// Total outstanding shares, locked shares included.
    #[must_use]
    pub const fn total_shares(&self) -> Liquidity {
        self.total_shares
    }

    /// Shares permanently locked at genesis.
    #[must_use]
    pub const fn locked_shares(&self) -> Liquidity {
        self.locked_shares
    }

    /// Withdrawable protocol fee balances as `(token_a, token_b)`.
    #[must_use]
    pub const fn protocol_fee_balances(&self) -> (Amount, Amount) {
        (self.protocol_fees_a, self.protocol_fees_b)
    }

    /// Withdrawable creator fee balances as `(token_a, token_b)`.
    #[must_use]
    pub const fn creator_fee_balances(&self) -> (Amount, Amount) {
        (self.creator_fees_a, self.creator_fees_b)
    }

    /// Raw per-share fee accumulators as `(acc_a, acc_b)`, fixed-point at
    /// [`ACC_PRECISION`](crate::constants::ACC_PRECISION).
    #[must_use]
    pub const fn fee_accumulators(&self) -> (u128, u128) {
        (self.accumulator.acc_a(), self.accumulator.acc_b())
    }

    /// LP fees accrued but not yet collected, as `(token_a, token_b)`.
    ///
    /// These amounts sit inside the reserves and are excluded from the
    /// pro-rata share base until positions settle them.
    #[must_use]
    pub const fn unclaimed_lp_fees(&self) -> (Amount, Amount) {
        (self.unclaimed_lp_a, self.unclaimed_lp_b)
    }

    /// Price impact a hypothetical swap would realise, in basis points.
    ///
    /// # Errors
    ///
    /// Same pricing errors as [`quote_swap`](Self::quote_swap).
    pub fn price_impact(
        &self,
        direction: SwapDirection,
        amount_in: Amount,
        now: u64,
    ) -> Result<u32> {
        let (_, _, impact) = self.preview(direction, amount_in, now)?;
        Ok(impact)
    }

    /// Spot price of token A in token B units, scaled by
    /// [`PRICE_PRECISION`]: `reserve_b * PRICE_PRECISION / reserve_a`.
    ///
    /// # Errors
    ///
    /// [`AmmError::ZeroReserve`] before the pool is seeded.
    pub fn exchange_rate(&self) -> Result<u128> {
        if self.reserve_a.is_zero() || self.reserve_b.is_zero() {
            return Err(AmmError::ZeroReserve);
        }
        Ok(self.reserve_b.widened() * PRICE_PRECISION / self.reserve_a.widened())
    }

    /// The amplification coefficient in effect at `now`. Stable pools
    /// only.
    ///
    /// # Errors
    ///
    /// [`AmmError::InvalidQuantity`] on a constant-product pool.
    pub fn current_amp(&self, now: u64) -> Result<u64> {
        self.amp
            .as_ref()
            .map(|amp| amp.current(now))
            .ok_or(AmmError::InvalidQuantity("not a stable pool"))
    }

    /// Fees accrued to the position since its last settlement, as
    /// `(fee_a, fee_b)`.
    ///
    /// # Errors
    ///
    /// [`AmmError::WrongPool`], or overflow on pathological accumulators.
    pub fn pending_fees(&self, position: &Position) -> Result<(Amount, Amount)> {
        self.ensure_same_pool(position)?;
        self.accumulator.owed(
            position.liquidity(),
            position.fee_debt_a(),
            position.fee_debt_b(),
        )
    }

    /// What the position would receive if fully redeemed right now:
    /// pro-rata reserves plus unclaimed fees, per token.
    ///
    /// # Errors
    ///
    /// [`AmmError::WrongPool`], or overflow on pathological state.
    pub fn position_value(&self, position: &Position) -> Result<(Amount, Amount)> {
        self.ensure_same_pool(position)?;
        let (owed_a, owed_b) = self.accumulator.owed(
            position.liquidity(),
            position.fee_debt_a(),
            position.fee_debt_b(),
        )?;
        // Promised fees sit inside the reserves; the share slice is taken
        // from the base without them, and the position's own owed fees go
        // back on top.
        let base_a = Self::share_base(self.reserve_a, self.unclaimed_lp_a)?;
        let base_b = Self::share_base(self.reserve_b, self.unclaimed_lp_b)?;
        let (slice_a, slice_b) =
            Self::proportional_slice(base_a, base_b, self.total_shares, position.liquidity())?;
        Ok((
            slice_a
                .checked_add(&owed_a)
                .ok_or(AmmError::Overflow("position value"))?,
            slice_b
                .checked_add(&owed_b)
                .ok_or(AmmError::Overflow("position value"))?,
        ))
    }

    /// Impermanent loss of the position in basis points.
    ///
    /// Values the originally deposited amounts at the current spot price
    /// (the hold value) and compares against the position's current
    /// redeemable value including unclaimed fees. Clamped at zero: a
    /// position that outperformed holding reports no loss.
    ///
    /// # Errors
    ///
    /// [`AmmError::WrongPool`], [`AmmError::ZeroReserve`] on an unseeded
    /// pool.
    pub fn impermanent_loss_bps(&self, position: &Position) -> Result<u32> {
        self.ensure_same_pool(position)?;
        if position.is_empty() {
            return Ok(0);
        }
        if self.reserve_a.is_zero() || self.reserve_b.is_zero() {
            return Err(AmmError::ZeroReserve);
        }

        let hold = self.value_in_b(position.min_a(), position.min_b())?;
        if hold == 0 {
            return Ok(0);
        }
        let (value_a, value_b) = self.position_value(position)?;
        let current = self.value_in_b(value_a, value_b)?;

        let loss = hold.saturating_sub(current);
        let bps = loss * u128::from(BPS_DENOMINATOR) / hold;
        Ok(bps as u32)
    }

    /// Values `(amount_a, amount_b)` in token B units at the current spot
    /// price.
    fn value_in_b(&self, amount_a: Amount, amount_b: Amount) -> Result<u128> {
        // Both factors are widened u64s, so the product always fits in
        // u128 and the sum stays below u128::MAX; the only reachable
        // failure is a zero reserve_a.
        let a_in_b = mul_div_u128(
            amount_a.widened(),
            self.reserve_b.widened(),
            self.reserve_a.widened(),
            Rounding::Down,
        )
        .ok_or(AmmError::DivisionByZero)?;
        Ok(a_in_b + amount_b.widened())
    }

    // -- internals ----------------------------------------------------------------

    const fn ensure_active(&self) -> Result<()> {
        if self.paused {
            return Err(AmmError::Paused);
        }
        Ok(())
    }

    fn ensure_same_pool(&self, position: &Position) -> Result<()> {
        if position.pool_id() != self.config.pool_id {
            return Err(AmmError::WrongPool);
        }
        Ok(())
    }

    const fn oriented_reserves(&self, direction: SwapDirection) -> (Amount, Amount) {
        match direction {
            SwapDirection::AToB => (self.reserve_a, self.reserve_b),
            SwapDirection::BToA => (self.reserve_b, self.reserve_a),
        }
    }

    /// Computes the position's owed fees, plus the reserves and unclaimed
    /// balances left after paying them.
    fn settle(&self, position: &Position) -> Result<Settlement> {
        let (owed_a, owed_b) = self.accumulator.owed(
            position.liquidity(),
            position.fee_debt_a(),
            position.fee_debt_b(),
        )?;
        let reserve_a = self
            .reserve_a
            .checked_sub(&owed_a)
            .ok_or(AmmError::InsufficientLiquidity)?;
        let reserve_b = self
            .reserve_b
            .checked_sub(&owed_b)
            .ok_or(AmmError::InsufficientLiquidity)?;
        // Accrual adds the full LP fee to the unclaimed balance and every
        // position's owed amount floors against the accumulator, so a
        // settlement can never exceed what is outstanding.
        let unclaimed_a = self
            .unclaimed_lp_a
            .checked_sub(&owed_a)
            .ok_or(AmmError::Overflow("unclaimed fee balance"))?;
        let unclaimed_b = self
            .unclaimed_lp_b
            .checked_sub(&owed_b)
            .ok_or(AmmError::Overflow("unclaimed fee balance"))?;
        Ok(Settlement {
            owed_a,
            owed_b,
            reserve_a,
            reserve_b,
            unclaimed_a,
            unclaimed_b,
        })
    }

    /// The reserves backing the share supply: total reserves minus LP fees
    /// the accumulator has promised but positions have not yet collected.
    /// All pro-rata share accounting prices against this base.
    fn share_base(reserve: Amount, unclaimed: Amount) -> Result<Amount> {
        reserve
            .checked_sub(&unclaimed)
            .ok_or(AmmError::Overflow("unclaimed fees exceed reserves"))
    }

    /// Shares minted for a deposit against the current ratio, plus the
    /// exact amounts consumed: `(minted, used_a, used_b)`.
    ///
    /// Mints `min(amount_a * total / reserve_a, amount_b * total /
    /// reserve_b)` floored, then back-computes the paired amounts rounding
    /// up. The used amounts never exceed what was supplied, so the deposit
    /// cannot shift the reserve ratio.
    fn proportional_mint(
        reserve_a: Amount,
        reserve_b: Amount,
        total: Liquidity,
        amount_a: Amount,
        amount_b: Amount,
    ) -> Result<(Liquidity, Amount, Amount)> {
        let from_a = mul_div(amount_a.get(), total.get(), reserve_a.get(), Rounding::Down)
            .ok_or(AmmError::Overflow("share mint"))?;
        let from_b = mul_div(amount_b.get(), total.get(), reserve_b.get(), Rounding::Down)
            .ok_or(AmmError::Overflow("share mint"))?;
        let minted = from_a.min(from_b);
        if minted == 0 {
            return Ok((Liquidity::ZERO, Amount::ZERO, Amount::ZERO));
        }
        let used_a = mul_div(minted, reserve_a.get(), total.get(), Rounding::Up)
            .ok_or(AmmError::Overflow("paired amount"))?;
        let used_b = mul_div(minted, reserve_b.get(), total.get(), Rounding::Up)
            .ok_or(AmmError::Overflow("paired amount"))?;
        Ok((
            Liquidity::new(minted),
            Amount::new(used_a),
            Amount::new(used_b),
        ))
    }

    /// Floored pro-rata slice of the reserves for `liquidity` shares.
    fn proportional_slice(
        reserve_a: Amount,
        reserve_b: Amount,
        total: Liquidity,
        liquidity: Liquidity,
    ) -> Result<(Amount, Amount)> {
        if total.is_zero() {
            return Ok((Amount::ZERO, Amount::ZERO));
        }
        let slice_a = mul_div(reserve_a.get(), liquidity.get(), total.get(), Rounding::Down)
            .ok_or(AmmError::Overflow("pro-rata slice"))?;
        let slice_b = mul_div(reserve_b.get(), liquidity.get(), total.get(), Rounding::Down)
            .ok_or(AmmError::Overflow("pro-rata slice"))?;
        Ok((Amount::new(slice_a), Amount::new(slice_b)))
    }

    /// Best-effort refresh of the position's advisory value snapshot.
    /// Never fails the surrounding operation.
    fn refresh_cached_value(&self, position: &mut Position) {
        if let Ok((value_a, value_b)) = self.position_value(position) {
            position.set_cached_value(value_a, value_b);
        }
    }
}

const fn ensure_deadline(now: u64, deadline: u64) -> Result<()> {
    if now > deadline {
        return Err(AmmError::DeadlinePassed);
    }
    Ok(())
}

fn sub_or_zero(total: Amount, used: Amount) -> Amount {
    total.checked_sub(&used).unwrap_or(Amount::ZERO)
}
