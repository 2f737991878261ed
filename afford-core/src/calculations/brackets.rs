//! Progressive tax schedule evaluation.
//!
//! Two evaluation styles are supported because the published schedules come
//! in two shapes:
//!
//! - [`progressive_tax`] taxes each bracket's slice of income at that
//!   bracket's rate and sums the slices. It only needs the bracket bounds and
//!   rates (federal schedule).
//! - [`progressive_tax_with_base`] finds the single bracket containing the
//!   income and adds its marginal tax to the bracket's published cumulative
//!   base (New York schedule).
//!
//! Both return zero for non-positive income and never fail: an income that
//! falls outside every bracket of a malformed schedule is taxed at zero.
//! Schedule shape is checked once when tables are loaded.

use rust_decimal::Decimal;

use crate::TaxBracket;

/// Sums `slice * rate` across every bracket.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use afford_core::TaxBracket;
/// use afford_core::calculations::brackets::progressive_tax;
///
/// let brackets = vec![
///     TaxBracket {
///         min_income: dec!(0),
///         max_income: Some(dec!(11600)),
///         tax_rate: dec!(0.10),
///         base_tax: dec!(0),
///     },
///     TaxBracket {
///         min_income: dec!(11600),
///         max_income: None,
///         tax_rate: dec!(0.12),
///         base_tax: dec!(0),
///     },
/// ];
///
/// // 11600 * 10% + 8400 * 12%
/// assert_eq!(progressive_tax(dec!(20000), &brackets), dec!(2168));
/// ```
pub fn progressive_tax(
    income: Decimal,
    brackets: &[TaxBracket],
) -> Decimal {
    if income <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    brackets
        .iter()
        .map(|b| b.taxable_slice(income) * b.tax_rate)
        .sum()
}

/// `base_tax + (income - min_income) * rate` of the bracket holding `income`.
pub fn progressive_tax_with_base(
    income: Decimal,
    brackets: &[TaxBracket],
) -> Decimal {
    if income <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    brackets
        .iter()
        .find(|b| b.contains(income))
        .map(|b| b.base_tax + (income - b.min_income) * b.tax_rate)
        .unwrap_or(Decimal::ZERO)
}
