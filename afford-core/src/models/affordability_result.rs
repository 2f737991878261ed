use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::PropertyTaxLookup;

/// Which question a calculation answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationMode {
    /// Solve for the highest price the household can carry.
    MaxAffordable,
    /// Evaluate a specific home price.
    AnalyzeHome,
}

impl CalculationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MaxAffordable => "max_affordable",
            Self::AnalyzeHome => "analyze_home",
        }
    }
}

/// Qualitative band for a housing cost as a share of gross income.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AffordabilityTier {
    Affordable,
    Stretched,
    Unaffordable,
}

impl AffordabilityTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Affordable => "affordable",
            Self::Stretched => "stretched",
            Self::Unaffordable => "unaffordable",
        }
    }
}

/// Social Security and Medicare withholding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FicaBreakdown {
    pub social_security: Decimal,
    /// Base Medicare plus the additional Medicare surtax.
    pub medicare: Decimal,
    pub total: Decimal,
}

/// Annual tax owed at every layer, rounded to cents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBurden {
    pub federal: Decimal,
    pub fica: FicaBreakdown,
    pub state: Decimal,
    pub local: Decimal,
    pub total: Decimal,
    /// `total / income`; `None` when income is not positive.
    pub effective_rate: Option<Decimal>,
}

impl TaxBurden {
    /// Burden reported when gross income was estimated from take-home pay.
    pub fn zero() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeSummary {
    pub annual_gross: Decimal,
    pub monthly_gross: Decimal,
    pub monthly_take_home: Decimal,
    /// Gross was estimated from a take-home figure rather than entered.
    pub take_home_override: bool,
}

/// Monthly cost of the same loan at one term length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermPayment {
    pub term_years: u32,
    pub interest_rate: Decimal,
    pub monthly_principal_interest: Decimal,
    pub total_monthly_payment: Decimal,
    /// Interest paid over the life of the loan.
    pub total_interest: Decimal,
    pub percent_of_gross: Decimal,
    pub percent_of_take_home: Decimal,
    pub tier: AffordabilityTier,
}

/// How the fixed-point search for the maximum price ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverDiagnostics {
    /// Refinement rounds run after the seed estimate.
    pub rounds: u32,
    pub converged: bool,
    pub diverged: bool,
    /// Change in the estimate during the last round.
    pub last_step: Decimal,
}

impl SolverDiagnostics {
    /// Whether the search ended on a price it can stand behind: converged
    /// and not cut short by divergence.
    pub fn settled(&self) -> bool {
        self.converged && !self.diverged
    }
}

/// Snapshot of one affordability calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffordabilityResult {
    pub mode: CalculationMode,
    pub income: IncomeSummary,
    pub monthly_debts: Decimal,

    pub home_price: Decimal,
    pub loan_amount: Decimal,
    pub down_payment_amount: Decimal,
    pub down_payment_percent: Decimal,
    pub interest_rate: Decimal,
    pub loan_term_years: u32,
    pub is_fha: bool,

    pub monthly_principal_interest: Decimal,
    pub monthly_property_tax: Decimal,
    pub monthly_insurance: Decimal,
    pub monthly_mip: Decimal,
    pub total_monthly_payment: Decimal,

    pub percent_of_gross: Decimal,
    pub percent_of_take_home: Decimal,
    pub tier: AffordabilityTier,
    /// In analyze mode, whether the price fits the ratio limits. For a solved
    /// maximum, whether the search settled on its answer.
    pub is_affordable: bool,

    pub closing_costs: Decimal,
    pub upfront_mip: Decimal,
    pub total_closing_costs: Decimal,
    pub total_cash_required: Decimal,

    pub taxes: TaxBurden,
    pub property_tax: PropertyTaxLookup,
    pub term_comparison: Vec<TermPayment>,
    pub solver: Option<SolverDiagnostics>,
}
