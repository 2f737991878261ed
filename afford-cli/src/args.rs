//! Command-line scenario flags and their conversion into raw calculation
//! input.
//!
//! Numbers stay strings here so that the core validator reports bad values
//! with the same messages as any other caller.

use afford_core::{AffordabilityConfig, RawCalculationInput};
use clap::Args;

/// Who is buying and where.
#[derive(Debug, Clone, Default, Args)]
pub struct IncomeArgs {
    /// Gross income per pay period (see --pay-frequency).
    #[arg(long, allow_hyphen_values = true)]
    pub income: Option<String>,

    /// hourly, weekly, biweekly, monthly or annual.
    #[arg(long, default_value = "annual")]
    pub pay_frequency: String,

    /// Monthly take-home pay; replaces --income and skips the tax estimate.
    #[arg(long, conflicts_with = "income", allow_hyphen_values = true)]
    pub take_home: Option<String>,

    /// State name, e.g. "Ohio".
    #[arg(long)]
    pub state: String,

    /// City or county, depending on the state.
    #[arg(long)]
    pub locality: Option<String>,
}

/// Loan and ownership parameters.
#[derive(Debug, Clone, Default, Args)]
pub struct ScenarioArgs {
    #[command(flatten)]
    pub income: IncomeArgs,

    /// Monthly debt payments (car, student loans, cards).
    #[arg(long, allow_hyphen_values = true)]
    pub monthly_debts: Option<String>,

    /// Down payment as a percent of the price [default: 20].
    #[arg(long, conflicts_with = "down_payment_amount")]
    pub down_payment_percent: Option<String>,

    /// Down payment as a dollar amount.
    #[arg(long)]
    pub down_payment_amount: Option<String>,

    /// Annual interest rate in percent [default: the configured rate for the term].
    #[arg(long)]
    pub interest_rate: Option<String>,

    /// Loan term in years.
    #[arg(long, default_value = "30")]
    pub loan_term: String,

    /// Leave homeowner's insurance out of the monthly payment.
    #[arg(long)]
    pub no_insurance: bool,

    /// Annual homeowner's insurance [default: from config].
    #[arg(long)]
    pub annual_insurance: Option<String>,

    /// FHA loan: minimum down payment plus mortgage insurance premiums.
    #[arg(long)]
    pub fha: bool,
}

impl IncomeArgs {
    /// Fills the income and location fields of `raw`.
    pub fn apply(
        &self,
        raw: &mut RawCalculationInput,
    ) {
        match &self.take_home {
            Some(take_home) => {
                raw.use_take_home = true;
                raw.monthly_take_home = take_home.clone();
            }
            None => {
                raw.income = self.income.clone().unwrap_or_default();
            }
        }
        raw.pay_frequency = self.pay_frequency.clone();
        raw.state = self.state.clone();
        raw.locality = self.locality.clone().unwrap_or_default();
    }

    pub fn to_raw(&self) -> RawCalculationInput {
        let mut raw = RawCalculationInput::default();
        self.apply(&mut raw);
        raw
    }
}

impl ScenarioArgs {
    /// Builds raw input for one calculation.
    ///
    /// `home_price` switches to analyze mode. A missing interest rate falls
    /// back to the configured rate for the chosen term, when there is one.
    pub fn to_raw(
        &self,
        home_price: Option<&str>,
        config: &AffordabilityConfig,
    ) -> RawCalculationInput {
        let mut raw = RawCalculationInput::default();
        self.income.apply(&mut raw);

        raw.analyze_home = home_price.is_some();
        raw.home_price = home_price.unwrap_or_default().to_string();
        raw.monthly_debts = self.monthly_debts.clone().unwrap_or_default();

        match &self.down_payment_amount {
            Some(amount) => {
                raw.down_payment_type = "amount".to_string();
                raw.down_payment_amount = amount.clone();
            }
            None => {
                raw.down_payment_type = "percent".to_string();
                raw.down_payment_percent = self
                    .down_payment_percent
                    .clone()
                    .unwrap_or_else(|| "20".to_string());
            }
        }

        raw.loan_term_years = self.loan_term.clone();
        raw.interest_rate = match &self.interest_rate {
            Some(rate) => rate.clone(),
            None => default_rate(&self.loan_term, config).unwrap_or_default(),
        };

        raw.include_insurance = !self.no_insurance;
        raw.annual_insurance = self.annual_insurance.clone().unwrap_or_default();
        raw.is_fha = self.fha;
        raw
    }
}

fn default_rate(
    term: &str,
    config: &AffordabilityConfig,
) -> Option<String> {
    let term_years: u32 = term.trim().parse().ok()?;
    config
        .term_rates
        .iter()
        .find(|t| t.term_years == term_years)
        .map(|t| t.rate.to_string())
}
