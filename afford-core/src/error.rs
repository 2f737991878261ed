use rust_decimal::Decimal;
use thiserror::Error;

use crate::config::ConfigError;
use crate::validation::ValidationErrors;

/// Advisory shown when housing costs leave nothing for principal and interest.
pub const NOT_AFFORDABLE_MESSAGE: &str =
    "Your expenses and debts are too high relative to your income for a mortgage";

/// Errors returned by the affordability calculator.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AffordabilityError {
    /// One or more input fields are invalid; calculation did not run.
    #[error("invalid input: {0}")]
    Validation(ValidationErrors),

    /// Non-mortgage housing costs meet or exceed the housing limit.
    #[error("{NOT_AFFORDABLE_MESSAGE}")]
    NotAffordable { max_pi_payment: Decimal },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<ValidationErrors> for AffordabilityError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}
