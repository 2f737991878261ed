use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::mortgage::{amount_to_percent, percent_to_amount};

/// Down payment in whichever representation the user entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum DownPayment {
    /// Percent of the home price (20 = 20%).
    Percent(Decimal),
    /// Dollar amount.
    Amount(Decimal),
}

impl DownPayment {
    /// Resolves both representations against a home price, returning
    /// `(amount, percent)`.
    ///
    /// A fixed amount against a non-positive price has no meaningful percent
    /// and resolves to zero percent.
    pub fn resolve(
        &self,
        home_price: Decimal,
    ) -> (Decimal, Decimal) {
        match *self {
            Self::Percent(percent) => (percent_to_amount(home_price, percent), percent),
            Self::Amount(amount) => (
                amount,
                amount_to_percent(home_price, amount).unwrap_or(Decimal::ZERO),
            ),
        }
    }
}

/// Loan and ownership parameters for one calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HousingScenario {
    /// Price to analyze; `None` when solving for the maximum price.
    pub home_price: Option<Decimal>,
    pub down_payment: DownPayment,
    pub loan_term_years: u32,
    /// Annual interest rate in percent (6.5 = 6.5%).
    pub interest_rate: Decimal,
    pub include_insurance: bool,
    pub annual_insurance: Decimal,
    pub is_fha: bool,
}

impl HousingScenario {
    /// Applies the FHA down payment rule: FHA loans always use the given
    /// minimum percent regardless of what was entered.
    pub fn with_fha_rule(
        mut self,
        fha_down_payment_percent: Decimal,
    ) -> Self {
        if self.is_fha {
            self.down_payment = DownPayment::Percent(fha_down_payment_percent);
        }
        self
    }

    /// Monthly insurance premium, zero when insurance is excluded.
    pub fn monthly_insurance(&self) -> Decimal {
        if self.include_insurance {
            self.annual_insurance / Decimal::from(12)
        } else {
            Decimal::ZERO
        }
    }
}
