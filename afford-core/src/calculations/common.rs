//! Decimal helpers shared by the tax engine, mortgage math and the solver.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a money amount to cents, halves away from zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use afford_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(1516.9576)), dec!(1516.96));
/// assert_eq!(round_half_up(dec!(0.005)), dec!(0.01));
/// assert_eq!(round_half_up(dec!(-0.005)), dec!(-0.01));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Raises `base` to a non-negative integer power by repeated multiplication.
///
/// Mortgage exponents are at most a few hundred periods, so the loop stays
/// cheap and avoids the float-backed `powd`.
pub fn decimal_powi(
    base: Decimal,
    n: u32,
) -> Decimal {
    let mut result = Decimal::ONE;
    for _ in 0..n {
        result *= base;
    }
    result
}

/// `part / whole * 100`, or zero when `whole` is not positive.
pub fn percent_of(
    part: Decimal,
    whole: Decimal,
) -> Decimal {
    if whole <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    part / whole * Decimal::ONE_HUNDRED
}
