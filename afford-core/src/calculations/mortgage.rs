//! Fixed-rate mortgage math.
//!
//! Rates are annual percentages (6.5 = 6.5%) compounded monthly; terms are in
//! years. Every function is total: degenerate inputs (zero principal, zero
//! periods, zero rate) produce a defined value instead of an error.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::calculations::common::{decimal_powi, round_half_up};

/// Monthly rates at or below this are treated as interest-free.
const NEAR_ZERO_MONTHLY_RATE: Decimal = dec!(0.000000000001);

fn monthly_rate(annual_rate_percent: Decimal) -> Decimal {
    annual_rate_percent / Decimal::ONE_HUNDRED / Decimal::from(12)
}

fn periods(term_years: u32) -> u32 {
    term_years.saturating_mul(12)
}

/// Amortized monthly principal and interest, rounded to cents.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use afford_core::calculations::mortgage::monthly_payment;
///
/// assert_eq!(monthly_payment(dec!(240000), dec!(6.5), 30), dec!(1516.96));
/// assert_eq!(monthly_payment(dec!(120000), dec!(0), 10), dec!(1000));
/// ```
pub fn monthly_payment(
    principal: Decimal,
    annual_rate_percent: Decimal,
    term_years: u32,
) -> Decimal {
    let n = periods(term_years);
    if principal <= Decimal::ZERO || n == 0 {
        return Decimal::ZERO;
    }

    let r = monthly_rate(annual_rate_percent);
    if r <= NEAR_ZERO_MONTHLY_RATE {
        return round_half_up(principal / Decimal::from(n));
    }

    let growth = decimal_powi(Decimal::ONE + r, n);
    round_half_up(principal * r * growth / (growth - Decimal::ONE))
}

/// Largest principal whose monthly payment is `payment` (annuity present
/// value), rounded to cents.
pub fn max_loan_for_payment(
    payment: Decimal,
    annual_rate_percent: Decimal,
    term_years: u32,
) -> Decimal {
    let n = periods(term_years);
    if payment <= Decimal::ZERO || n == 0 {
        return Decimal::ZERO;
    }

    let r = monthly_rate(annual_rate_percent);
    if r <= NEAR_ZERO_MONTHLY_RATE {
        return round_half_up(payment * Decimal::from(n));
    }

    let growth = decimal_powi(Decimal::ONE + r, n);
    round_half_up(payment * (growth - Decimal::ONE) / (r * growth))
}

/// Interest paid over the life of the loan.
pub fn total_interest(
    principal: Decimal,
    annual_rate_percent: Decimal,
    term_years: u32,
) -> Decimal {
    let payment = monthly_payment(principal, annual_rate_percent, term_years);
    let paid = payment * Decimal::from(periods(term_years));
    (paid - principal).max(Decimal::ZERO)
}

/// Down payment amount for a percent of `home_price`.
pub fn percent_to_amount(
    home_price: Decimal,
    percent: Decimal,
) -> Decimal {
    home_price * percent / Decimal::ONE_HUNDRED
}

/// Down payment percent for an amount; `None` when the price is not positive.
pub fn amount_to_percent(
    home_price: Decimal,
    amount: Decimal,
) -> Option<Decimal> {
    if home_price <= Decimal::ZERO {
        return None;
    }
    Some(amount / home_price * Decimal::ONE_HUNDRED)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    // =========================================================================
    // monthly_payment tests
    // =========================================================================

    #[test]
    fn monthly_payment_thirty_year() {
        assert_eq!(monthly_payment(dec!(240000), dec!(6.5), 30), dec!(1516.96));
    }

    #[test]
    fn monthly_payment_fifteen_year() {
        // 200000 at 6% over 15 years
        assert_eq!(monthly_payment(dec!(200000), dec!(6), 15), dec!(1687.71));
    }

    #[test]
    fn monthly_payment_zero_rate_is_straight_line() {
        assert_eq!(monthly_payment(dec!(360000), dec!(0), 30), dec!(1000));
    }

    #[test]
    fn monthly_payment_degenerate_inputs_are_zero() {
        assert_eq!(monthly_payment(dec!(0), dec!(6.5), 30), dec!(0));
        assert_eq!(monthly_payment(dec!(-1000), dec!(6.5), 30), dec!(0));
        assert_eq!(monthly_payment(dec!(240000), dec!(6.5), 0), dec!(0));
    }

    // =========================================================================
    // max_loan_for_payment tests
    // =========================================================================

    #[test]
    fn max_loan_inverts_monthly_payment() {
        let loan = max_loan_for_payment(dec!(1516.96), dec!(6.5), 30);

        assert!((loan - dec!(240000)).abs() < dec!(1), "got {loan}");
    }

    #[test]
    fn max_loan_zero_rate_is_payment_times_periods() {
        assert_eq!(max_loan_for_payment(dec!(1000), dec!(0), 30), dec!(360000));
    }

    #[test]
    fn max_loan_non_positive_payment_is_zero() {
        assert_eq!(max_loan_for_payment(dec!(0), dec!(6.5), 30), dec!(0));
        assert_eq!(max_loan_for_payment(dec!(-50), dec!(6.5), 30), dec!(0));
    }

    // =========================================================================
    // total_interest tests
    // =========================================================================

    #[test]
    fn total_interest_thirty_year() {
        // 1516.96 * 360 - 240000
        assert_eq!(total_interest(dec!(240000), dec!(6.5), 30), dec!(306105.60));
    }

    #[test]
    fn total_interest_zero_rate_is_zero() {
        assert_eq!(total_interest(dec!(120000), dec!(0), 10), dec!(0));
    }

    // =========================================================================
    // down payment conversion tests
    // =========================================================================

    #[test]
    fn percent_amount_percent_reproduces_percent() {
        let price = dec!(437500);
        for percent in [dec!(0), dec!(3.5), dec!(12.5), dec!(20), dec!(100)] {
            let amount = percent_to_amount(price, percent);

            assert_eq!(amount_to_percent(price, amount), Some(percent));
        }
    }

    #[test]
    fn amount_to_percent_requires_positive_price() {
        assert_eq!(amount_to_percent(dec!(0), dec!(10000)), None);
    }
}
