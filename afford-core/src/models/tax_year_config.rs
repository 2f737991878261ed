use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Payroll tax constants for a single tax year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxYearConfig {
    pub tax_year: i32,
    pub ss_wage_max: Decimal,
    pub ss_tax_rate: Decimal,
    pub medicare_tax_rate: Decimal,
    pub additional_medicare_rate: Decimal,
    pub additional_medicare_threshold: Decimal,
}
