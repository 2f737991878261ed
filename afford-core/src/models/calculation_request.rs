use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{CalculationMode, HousingScenario, IncomeInput};

/// Validated, typed input for one affordability calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationRequest {
    pub mode: CalculationMode,
    pub income: IncomeInput,
    pub state: String,
    /// City or county, depending on the state's local tax scheme. Also used
    /// as the county for the property tax lookup.
    pub locality: Option<String>,
    pub monthly_debts: Decimal,
    pub housing: HousingScenario,
}

impl CalculationRequest {
    pub fn has_debts(&self) -> bool {
        self.monthly_debts > Decimal::ZERO
    }
}

/// Income and location only; enough to compute a tax burden.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRequest {
    pub income: IncomeInput,
    pub state: String,
    pub locality: Option<String>,
}
