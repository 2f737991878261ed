mod affordability_result;
mod calculation_request;
mod housing;
mod jurisdiction;
mod pay_frequency;
mod property_tax;
mod state_tax_profile;
mod tax_bracket;
mod tax_tables;
mod tax_year_config;

pub use affordability_result::{
    AffordabilityResult, AffordabilityTier, CalculationMode, FicaBreakdown, IncomeSummary,
    SolverDiagnostics, TaxBurden, TermPayment,
};
pub use calculation_request::{CalculationRequest, TaxRequest};
pub use housing::{DownPayment, HousingScenario};
pub use jurisdiction::{JurisdictionKind, JurisdictionTaxRule, LocalJurisdiction};
pub use pay_frequency::{IncomeInput, PayFrequency};
pub use property_tax::{PropertyTaxEntry, PropertyTaxLookup, PropertyTaxSource};
pub use state_tax_profile::{LocalTaxScheme, StateTaxProfile};
pub use tax_bracket::TaxBracket;
pub use tax_tables::TaxTables;
pub use tax_year_config::TaxYearConfig;
