//! Integer money arithmetic
//!
//! All money values are i64 (cents); all percentages are i64 basis points
//! (1 bp = 0.01%). Every conversion here is exact integer arithmetic with
//! half-up rounding, so two runs over the same inputs always produce the
//! same cents.
//!
//! # Rounding Conventions
//!
//! - Percentage-to-dollar conversion rounds half-up to the cent.
//! - Even distribution over N slots rounds the per-slot value half-up and
//!   assigns the remainder to the last slot, so the slot sum equals the
//!   total exactly.
//! - Weighted allocation uses largest-remainder apportionment, so the
//!   allocated cents sum exactly to the rounded pool share.

/// 100% expressed in basis points.
pub use crate::models::deal::FULL_PERCENT_BPS;

/// Divide with half-up rounding (halves round away from zero).
///
/// # Example
/// ```
/// use commission_engine_core_rs::calc::round_half_up;
///
/// assert_eq!(round_half_up(5, 2), 3); // 2.5 -> 3
/// assert_eq!(round_half_up(-5, 2), -3); // -2.5 -> -3
/// assert_eq!(round_half_up(4, 3), 1); // 1.33 -> 1
/// ```
pub fn round_half_up(numerator: i64, denominator: i64) -> i64 {
    debug_assert!(denominator > 0, "denominator must be positive");
    if numerator >= 0 {
        (numerator + denominator / 2) / denominator
    } else {
        -((-numerator + denominator / 2) / denominator)
    }
}

/// Apply a basis-point percentage to an amount, rounding half-up to the cent.
///
/// # Example
/// ```
/// use commission_engine_core_rs::calc::apply_bps;
///
/// // 5% of $10,000.00
/// assert_eq!(apply_bps(1_000_000, 500), 50_000);
/// // 50% of $105.0050... -> half cents round up
/// assert_eq!(apply_bps(10_501, 5_000), 5_251);
/// ```
pub fn apply_bps(amount: i64, bps: i64) -> i64 {
    round_half_up(amount * bps, FULL_PERCENT_BPS)
}

/// Split a total evenly over `slots`, remainder to the last slot.
///
/// The per-slot amount is the half-up rounded quotient; the last slot
/// absorbs whatever keeps the sum exactly equal to `total`.
///
/// # Panics
/// Panics if `slots` is zero.
///
/// # Example
/// ```
/// use commission_engine_core_rs::calc::distribute_evenly;
///
/// assert_eq!(distribute_evenly(3_000_000, 3), vec![1_000_000; 3]);
/// assert_eq!(distribute_evenly(100, 3), vec![33, 33, 34]);
/// ```
pub fn distribute_evenly(total: i64, slots: u32) -> Vec<i64> {
    assert!(slots > 0, "slots must be positive");
    let n = slots as i64;
    let per_slot = round_half_up(total, n);
    let mut amounts = vec![per_slot; slots as usize];
    amounts[slots as usize - 1] = total - per_slot * (n - 1);
    amounts
}

/// Allocate a pool over basis-point weights with largest-remainder rounding.
///
/// The allocated total is `apply_bps(pool, sum_of_weights)`; individual
/// shares start at their floored exact value and leftover cents go to the
/// largest fractional remainders, ties broken by input order. The result
/// therefore sums exactly to the rounded share of the pool that the weights
/// claim, with no drift from per-share rounding.
///
/// # Example
/// ```
/// use commission_engine_core_rs::calc::allocate_by_weights;
///
/// // $1.00 over three equal third-shares: no cent lost
/// let shares = allocate_by_weights(100, &[3_333, 3_333, 3_334]);
/// assert_eq!(shares.iter().sum::<i64>(), 100);
/// ```
pub fn allocate_by_weights(pool: i64, weights_bps: &[i64]) -> Vec<i64> {
    if weights_bps.is_empty() {
        return Vec::new();
    }
    if pool < 0 {
        return allocate_by_weights(-pool, weights_bps)
            .into_iter()
            .map(|cents| -cents)
            .collect();
    }

    let total_weight: i64 = weights_bps.iter().sum();
    let target = apply_bps(pool, total_weight);

    let mut shares: Vec<i64> = weights_bps
        .iter()
        .map(|w| (pool * w) / FULL_PERCENT_BPS)
        .collect();

    let mut leftover = target - shares.iter().sum::<i64>();
    debug_assert!(leftover >= 0, "floored shares cannot exceed the target");

    // Hand leftover cents to the largest fractional remainders
    let mut order: Vec<usize> = (0..weights_bps.len()).collect();
    order.sort_by_key(|&i| std::cmp::Reverse((pool * weights_bps[i]) % FULL_PERCENT_BPS));
    let mut cursor = 0;
    while leftover > 0 {
        shares[order[cursor % order.len()]] += 1;
        leftover -= 1;
        cursor += 1;
    }

    shares
}
