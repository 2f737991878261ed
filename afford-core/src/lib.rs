pub mod calculations;
pub mod config;
pub mod error;
pub mod models;
pub mod utils;
pub mod validation;

pub use config::{AffordabilityConfig, ConfigError, TermRate};
pub use error::{AffordabilityError, NOT_AFFORDABLE_MESSAGE};
pub use models::*;
pub use validation::{Field, MAX_AMOUNT, RawCalculationInput, ValidationErrors, Validator};
