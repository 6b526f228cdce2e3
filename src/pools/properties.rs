//! Property-based checks over the pricing math and the pool lifecycle.

#![allow(clippy::panic)]

use proptest::prelude::*;
use proptest::test_runner::TestCaseError;

use crate::config::{CurveKind, PoolConfig};
use crate::domain::{
    Amount, BasisPoints, FeeTier, Liquidity, PoolId, Position, TokenAddress, TokenPair,
};
use crate::guard::SwapGuard;
use crate::math::constant_product::{price_impact_bps, quote_output};
use crate::math::integer::isqrt;
use crate::math::stable::{get_d, get_y};
use crate::pools::Pool;

const FOREVER: u64 = u64::MAX;

fn pair() -> TokenPair {
    let Ok(pair) = TokenPair::new(
        TokenAddress::from_bytes([1u8; 32]),
        TokenAddress::from_bytes([2u8; 32]),
    ) else {
        panic!("expected Ok");
    };
    pair
}

fn cp_config() -> PoolConfig {
    PoolConfig {
        pool_id: PoolId::new(1),
        pair: pair(),
        curve: CurveKind::ConstantProduct,
        fee_tier: FeeTier::TIER_0_30_PERCENT,
        protocol_fee_share: BasisPoints::new(2_000),
        creator_fee_share: BasisPoints::new(250),
        max_price_impact_bps: BasisPoints::new(10_000),
        default_max_slippage_bps: BasisPoints::new(50),
    }
}

fn seeded(reserve_a: u64, reserve_b: u64) -> (Pool, Position) {
    let Ok(mut pool) = Pool::from_config(cp_config()) else {
        panic!("expected Ok");
    };
    let Ok((position, _)) = pool.add_liquidity(
        Amount::new(reserve_a),
        Amount::new(reserve_b),
        Liquidity::ZERO,
        0,
        FOREVER,
    ) else {
        panic!("expected Ok");
    };
    (pool, position)
}

fn k(pool: &Pool) -> u128 {
    let (a, b) = pool.reserves();
    a.widened() * b.widened()
}

proptest! {
    // -- integer helpers ------------------------------------------------------------

    #[test]
    fn isqrt_bounds_hold(value in any::<u128>()) {
        let root = isqrt(value);
        // root <= 2^64 - 1, so the square never overflows u128.
        prop_assert!(root * root <= value);
        if let Some(next_sq) = (root + 1).checked_mul(root + 1) {
            prop_assert!(next_sq > value);
        }
    }

    // -- constant product -------------------------------------------------------------

    #[test]
    fn quote_output_below_reserve(
        reserve_in in 1u64..=u64::MAX / 2,
        reserve_out in 1u64..=u64::MAX,
        amount_in in 0u64..=u64::MAX / 2,
    ) {
        let Ok(out) = quote_output(reserve_in, reserve_out, amount_in) else {
            return Err(TestCaseError::reject("reserve capacity"));
        };
        prop_assert!(out < reserve_out);
    }

    #[test]
    fn quote_output_preserves_k(
        reserve_in in 1_000u64..=1_000_000_000_000,
        reserve_out in 1_000u64..=1_000_000_000_000,
        amount_in in 1u64..=1_000_000_000,
    ) {
        let Ok(out) = quote_output(reserve_in, reserve_out, amount_in) else {
            return Err(TestCaseError::reject("reserve capacity"));
        };
        let before = u128::from(reserve_in) * u128::from(reserve_out);
        let after = (u128::from(reserve_in) + u128::from(amount_in))
            * (u128::from(reserve_out) - u128::from(out));
        prop_assert!(after >= before);
    }

    #[test]
    fn price_impact_stays_in_range(
        reserve_in in 1_000u64..=1_000_000_000_000,
        reserve_out in 1_000u64..=1_000_000_000_000,
        amount_in in 1u64..=1_000_000_000,
    ) {
        let Ok(out) = quote_output(reserve_in, reserve_out, amount_in) else {
            return Err(TestCaseError::reject("reserve capacity"));
        };
        let Ok(bps) = price_impact_bps(reserve_in, reserve_out, amount_in, out) else {
            return Err(TestCaseError::reject("zero reserve"));
        };
        prop_assert!(bps <= 10_000);
    }

    // -- stable invariant ---------------------------------------------------------

    #[test]
    fn get_d_is_symmetric(
        x in 1_000u64..=1_000_000_000,
        y in 1_000u64..=1_000_000_000,
        amp in 1u64..=1_000,
    ) {
        let Ok(d_xy) = get_d(x, y, amp) else {
            return Err(TestCaseError::reject("non-convergent input"));
        };
        let Ok(d_yx) = get_d(y, x, amp) else {
            return Err(TestCaseError::reject("non-convergent input"));
        };
        prop_assert_eq!(d_xy, d_yx);
    }

    #[test]
    fn get_d_scales_linearly(
        x in 1_000u64..=1_000_000_000,
        y in 1_000u64..=1_000_000_000,
        amp in 1u64..=1_000,
    ) {
        let Ok(d) = get_d(x, y, amp) else {
            return Err(TestCaseError::reject("non-convergent input"));
        };
        let Ok(d_doubled) = get_d(x * 2, y * 2, amp) else {
            return Err(TestCaseError::reject("non-convergent input"));
        };
        // Doubling reserves doubles D, up to convergence slack.
        prop_assert!(d_doubled.abs_diff(d * 2) <= 8);
    }

    #[test]
    fn get_d_get_y_round_trip(
        x in 10_000u64..=1_000_000_000,
        y in 10_000u64..=1_000_000_000,
        amp in 1u64..=1_000,
    ) {
        let Ok(d) = get_d(x, y, amp) else {
            return Err(TestCaseError::reject("non-convergent input"));
        };
        let Ok(solved) = get_y(x, d, amp) else {
            return Err(TestCaseError::reject("non-convergent input"));
        };
        // Absolute slack for the convergence threshold plus a sliver of
        // relative slack for heavily imbalanced reserves.
        prop_assert!(solved.abs_diff(u128::from(y)) <= 3 + u128::from(y) / 100_000);
    }

    // -- pool lifecycle -------------------------------------------------------------

    #[test]
    fn swaps_never_decrease_k(
        reserve_a in 100_000u64..=1_000_000_000,
        reserve_b in 100_000u64..=1_000_000_000,
        amounts in prop::collection::vec(1u64..=1_000_000, 1..8),
        direction_bits in any::<u8>(),
    ) {
        let (mut pool, _) = seeded(reserve_a, reserve_b);
        for (i, amount) in amounts.iter().enumerate() {
            let before = k(&pool);
            let guard = SwapGuard::with_deadline(FOREVER);
            let result = if direction_bits >> (i % 8) & 1 == 0 {
                pool.swap_a_to_b(Amount::new(*amount), &guard, 0)
            } else {
                pool.swap_b_to_a(Amount::new(*amount), &guard, 0)
            };
            // A rejected swap (dust output) must not have touched state.
            if result.is_err() {
                prop_assert_eq!(k(&pool), before);
                continue;
            }
            prop_assert!(k(&pool) >= before);
        }
    }

    #[test]
    fn claims_never_exceed_accrued_fees(
        reserve in 100_000u64..=1_000_000_000,
        amounts in prop::collection::vec(1_000u64..=1_000_000, 1..6),
    ) {
        let (mut pool, mut position) = seeded(reserve, reserve);
        let mut accrued_a: u64 = 0;
        for amount in &amounts {
            let guard = SwapGuard::with_deadline(FOREVER);
            if let Ok(result) = pool.swap_a_to_b(Amount::new(*amount), &guard, 0) {
                accrued_a += result.fees.lp.get();
            }
        }
        let Ok((claimed_a, claimed_b)) = pool.claim_fees(&mut position, 0, FOREVER) else {
            return Err(TestCaseError::fail("claim failed"));
        };
        prop_assert!(claimed_a.get() <= accrued_a);
        prop_assert_eq!(claimed_b, Amount::ZERO);

        // Immediate repeat claim pays exactly nothing.
        let Ok(repeat) = pool.claim_fees(&mut position, 0, FOREVER) else {
            return Err(TestCaseError::fail("claim failed"));
        };
        prop_assert_eq!(repeat, (Amount::ZERO, Amount::ZERO));
    }

    #[test]
    fn removal_never_pays_more_than_pro_rata(
        reserve_a in 100_000u64..=1_000_000_000,
        reserve_b in 100_000u64..=1_000_000_000,
        deposit_a in 10_000u64..=1_000_000,
        deposit_b in 10_000u64..=1_000_000,
    ) {
        let (mut pool, _) = seeded(reserve_a, reserve_b);
        let Ok((mut position, result)) = pool.add_liquidity(
            Amount::new(deposit_a),
            Amount::new(deposit_b),
            Liquidity::ZERO,
            0,
            FOREVER,
        ) else {
            return Err(TestCaseError::reject("deposit rounds to zero shares"));
        };
        let used_a = deposit_a - result.refund_a.get();
        let used_b = deposit_b - result.refund_b.get();
        let Ok(withdrawal) = pool.remove_liquidity(&mut position, 0, FOREVER) else {
            return Err(TestCaseError::fail("removal failed"));
        };
        // With no intervening swaps, rounding always favours the pool.
        prop_assert!(withdrawal.amount_a.get() <= used_a);
        prop_assert!(withdrawal.amount_b.get() <= used_b);
        prop_assert!(position.is_empty());
    }
}
