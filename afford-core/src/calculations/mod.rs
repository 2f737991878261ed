//! Affordability calculations.
//!
//! Leaf modules hold pure functions (bracket evaluation, mortgage math,
//! income normalization). The struct calculators on top of them borrow the
//! shared tables and configuration:
//!
//! - [`TaxEngine`] computes the layered tax burden
//! - [`AffordabilitySolver`] searches for the maximum home price
//! - [`AffordabilityCalculator`] runs a full request end to end

pub mod affordability;
pub mod analysis;
pub mod brackets;
pub mod common;
pub mod income;
pub mod mortgage;
pub mod tax_engine;

pub use affordability::{AffordabilitySolver, SolverInput, SolverOutcome};
pub use analysis::AffordabilityCalculator;
pub use tax_engine::TaxEngine;
