use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One slice of a progressive tax schedule.
///
/// Brackets are half-open: a bracket covers `[min_income, max_income)`, and
/// the last bracket of a schedule has `max_income` set to `None`.
/// `base_tax` is the cumulative tax owed at `min_income`; schedules that are
/// evaluated slice by slice (the federal one) may leave it at zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub min_income: Decimal,
    pub max_income: Option<Decimal>,
    pub tax_rate: Decimal,
    pub base_tax: Decimal,
}

impl TaxBracket {
    /// Returns `true` when `income` falls inside `[min_income, max_income)`.
    pub fn contains(
        &self,
        income: Decimal,
    ) -> bool {
        income >= self.min_income && self.max_income.is_none_or(|max| income < max)
    }

    /// Portion of `income` that falls inside this bracket.
    pub fn taxable_slice(
        &self,
        income: Decimal,
    ) -> Decimal {
        if income <= self.min_income {
            return Decimal::ZERO;
        }
        let top = match self.max_income {
            Some(max) => income.min(max),
            None => income,
        };
        top - self.min_income
    }
}
