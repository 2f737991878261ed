//! Income normalization.

use rust_decimal::Decimal;

use crate::calculations::TaxEngine;
use crate::calculations::common::round_half_up;
use crate::models::{IncomeInput, IncomeSummary, PayFrequency, TaxBurden};

/// Annual gross income for an amount paid at `frequency`.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use afford_core::PayFrequency;
/// use afford_core::calculations::income::annualize;
///
/// assert_eq!(annualize(dec!(25), PayFrequency::Hourly), dec!(52000));
/// assert_eq!(annualize(dec!(2000), PayFrequency::Biweekly), dec!(52000));
/// ```
pub fn annualize(
    amount: Decimal,
    frequency: PayFrequency,
) -> Decimal {
    amount * frequency.periods_per_year()
}

/// Annual gross estimated from monthly take-home pay.
///
/// `gross_up` is the share of gross assumed to reach the paycheck; a
/// non-positive factor yields zero.
pub fn gross_from_take_home(
    monthly_take_home: Decimal,
    gross_up: Decimal,
) -> Decimal {
    if gross_up <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    monthly_take_home / gross_up * Decimal::from(12)
}

/// Resolves income into annual and monthly figures plus the tax burden.
///
/// Entered gross pay is taxed through `engine`. A take-home override skips
/// the tax engine and reports a zero burden.
pub fn summarize(
    income: &IncomeInput,
    gross_up: Decimal,
    engine: &TaxEngine<'_>,
    state: &str,
    locality: Option<&str>,
) -> (IncomeSummary, TaxBurden) {
    let twelve = Decimal::from(12);

    match *income {
        IncomeInput::Gross { amount, frequency } => {
            let annual_gross = annualize(amount, frequency);
            let taxes = engine.compute_tax_burden(annual_gross, state, locality);
            let summary = IncomeSummary {
                annual_gross: round_half_up(annual_gross),
                monthly_gross: round_half_up(annual_gross / twelve),
                monthly_take_home: round_half_up((annual_gross - taxes.total) / twelve),
                take_home_override: false,
            };
            (summary, taxes)
        }
        IncomeInput::TakeHome { monthly } => {
            let annual_gross = gross_from_take_home(monthly, gross_up);
            let summary = IncomeSummary {
                annual_gross: round_half_up(annual_gross),
                monthly_gross: round_half_up(annual_gross / twelve),
                monthly_take_home: monthly,
                take_home_override: true,
            };
            (summary, TaxBurden::zero())
        }
    }
}
