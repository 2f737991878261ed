use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::TaxBracket;
use crate::calculations::brackets::progressive_tax_with_base;

/// How a state or locality levies its income tax.
///
/// Every jurisdiction maps to exactly one variant; the variant alone decides
/// which formula applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JurisdictionTaxRule {
    /// Percentage of income.
    FlatPercentage { rate: Decimal },

    /// Fixed fee charged every pay period, independent of income.
    FlatAmountPerPeriod {
        amount: Decimal,
        periods_per_year: u32,
    },

    /// Published as a range; the midpoint is used as the rate.
    BoundedRange { min: Decimal, max: Decimal },

    /// Progressive schedule whose brackets carry a cumulative base amount.
    ProgressiveWithBase { brackets: Vec<TaxBracket> },
}

impl JurisdictionTaxRule {
    /// Annual tax owed under this rule.
    ///
    /// Income-proportional variants return zero for non-positive income.
    pub fn annual_tax(
        &self,
        income: Decimal,
    ) -> Decimal {
        match self {
            Self::FlatAmountPerPeriod {
                amount,
                periods_per_year,
            } => *amount * Decimal::from(*periods_per_year),
            _ if income <= Decimal::ZERO => Decimal::ZERO,
            Self::FlatPercentage { rate } => income * *rate,
            Self::BoundedRange { .. } => income * self.nominal_rate().unwrap_or(Decimal::ZERO),
            Self::ProgressiveWithBase { brackets } => progressive_tax_with_base(income, brackets),
        }
    }

    /// Single rate this rule stands for, when it has one.
    pub fn nominal_rate(&self) -> Option<Decimal> {
        match self {
            Self::FlatPercentage { rate } => Some(*rate),
            Self::BoundedRange { min, max } => Some((*min + *max) / Decimal::TWO),
            Self::FlatAmountPerPeriod { .. } | Self::ProgressiveWithBase { .. } => None,
        }
    }
}

/// Whether a local table entry is a city or a county.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JurisdictionKind {
    City,
    County,
}

impl JurisdictionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::City => "city",
            Self::County => "county",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "city" => Some(Self::City),
            "county" => Some(Self::County),
            _ => None,
        }
    }
}

/// A city or county with its own income tax rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalJurisdiction {
    pub state: String,
    pub name: String,
    pub kind: JurisdictionKind,
    pub rule: JurisdictionTaxRule,
}
