use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How often the entered income amount is paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayFrequency {
    Hourly,
    Weekly,
    Biweekly,
    Monthly,
    Annual,
}

impl PayFrequency {
    pub const ALL: [PayFrequency; 5] = [
        Self::Hourly,
        Self::Weekly,
        Self::Biweekly,
        Self::Monthly,
        Self::Annual,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hourly => "hourly",
            Self::Weekly => "weekly",
            Self::Biweekly => "biweekly",
            Self::Monthly => "monthly",
            Self::Annual => "annual",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hourly" => Some(Self::Hourly),
            "weekly" => Some(Self::Weekly),
            "biweekly" => Some(Self::Biweekly),
            "monthly" => Some(Self::Monthly),
            "annual" => Some(Self::Annual),
            _ => None,
        }
    }

    /// Number of pay units in a year (40 hours x 52 weeks for hourly pay).
    pub fn periods_per_year(&self) -> Decimal {
        match self {
            Self::Hourly => Decimal::from(2080),
            Self::Weekly => Decimal::from(52),
            Self::Biweekly => Decimal::from(26),
            Self::Monthly => Decimal::from(12),
            Self::Annual => Decimal::ONE,
        }
    }
}

/// Income as entered by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncomeInput {
    /// Gross pay at the given frequency.
    Gross {
        amount: Decimal,
        frequency: PayFrequency,
    },
    /// Known monthly take-home pay; gross income is estimated from it.
    TakeHome { monthly: Decimal },
}
