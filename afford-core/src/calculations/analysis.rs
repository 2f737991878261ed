//! End-to-end affordability calculation.
//!
//! [`AffordabilityCalculator`] ties the pipeline together: income
//! normalization and taxes, property tax lookup, then either the maximum price
//! search or analysis of a given price, and finally the full monthly payment
//! breakdown with a comparison across loan terms.

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::AffordabilityConfig;
use crate::calculations::affordability::{AffordabilitySolver, SolverInput};
use crate::calculations::common::{percent_of, round_half_up};
use crate::calculations::income::summarize;
use crate::calculations::mortgage::{monthly_payment, total_interest};
use crate::calculations::TaxEngine;
use crate::error::AffordabilityError;
use crate::models::{
    AffordabilityResult, CalculationMode, CalculationRequest, HousingScenario, IncomeSummary,
    PropertyTaxLookup, SolverDiagnostics, TaxBurden, TaxTables, TermPayment,
};
use crate::validation::{Field, ValidationErrors};

/// Monthly housing costs at a fixed price.
#[derive(Debug, Clone, PartialEq, Eq)]
struct MonthlyCosts {
    principal_interest: Decimal,
    property_tax: Decimal,
    insurance: Decimal,
    mip: Decimal,
}

impl MonthlyCosts {
    fn ownership(&self) -> Decimal {
        self.property_tax + self.insurance + self.mip
    }

    fn total(&self) -> Decimal {
        self.principal_interest + self.ownership()
    }
}

/// Runs affordability calculations against shared tables and configuration.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use afford_core::calculations::AffordabilityCalculator;
/// use afford_core::{
///     AffordabilityConfig, CalculationMode, CalculationRequest, DownPayment, HousingScenario,
///     IncomeInput, PayFrequency, TaxTables, TaxYearConfig,
/// };
///
/// let tables = TaxTables::new(
///     TaxYearConfig {
///         tax_year: 2024,
///         ss_wage_max: dec!(168600),
///         ss_tax_rate: dec!(0.062),
///         medicare_tax_rate: dec!(0.0145),
///         additional_medicare_rate: dec!(0.009),
///         additional_medicare_threshold: dec!(200000),
///     },
///     Vec::new(),
/// );
/// let config = AffordabilityConfig::default();
///
/// let request = CalculationRequest {
///     mode: CalculationMode::AnalyzeHome,
///     income: IncomeInput::Gross {
///         amount: dec!(120000),
///         frequency: PayFrequency::Annual,
///     },
///     state: "Texas".to_string(),
///     locality: None,
///     monthly_debts: dec!(0),
///     housing: HousingScenario {
///         home_price: Some(dec!(300000)),
///         down_payment: DownPayment::Percent(dec!(20)),
///         loan_term_years: 30,
///         interest_rate: dec!(6.5),
///         include_insurance: true,
///         annual_insurance: dec!(1200),
///         is_fha: false,
///     },
/// };
///
/// let result = AffordabilityCalculator::new(&tables, &config)
///     .calculate(&request)
///     .unwrap();
///
/// assert_eq!(result.loan_amount, dec!(240000));
/// assert_eq!(result.monthly_principal_interest, dec!(1516.96));
/// assert!(result.is_affordable);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AffordabilityCalculator<'a> {
    tables: &'a TaxTables,
    config: &'a AffordabilityConfig,
}

impl<'a> AffordabilityCalculator<'a> {
    pub fn new(
        tables: &'a TaxTables,
        config: &'a AffordabilityConfig,
    ) -> Self {
        Self { tables, config }
    }

    /// Runs the calculation selected by `request.mode`.
    ///
    /// # Errors
    ///
    /// - [`AffordabilityError::Config`] if the configuration is out of range
    /// - [`AffordabilityError::Validation`] if analyze mode has no positive price
    /// - [`AffordabilityError::NotAffordable`] if the maximum price search
    ///   finds no room for a mortgage payment
    pub fn calculate(
        &self,
        request: &CalculationRequest,
    ) -> Result<AffordabilityResult, AffordabilityError> {
        self.config.validate()?;

        let housing = request
            .housing
            .clone()
            .with_fha_rule(self.config.fha_down_payment_percent);
        let locality = request.locality.as_deref();

        let engine = TaxEngine::new(self.tables);
        let (income, taxes) = summarize(
            &request.income,
            self.config.take_home_gross_up,
            &engine,
            &request.state,
            locality,
        );
        let property_tax = self.property_tax(&request.state, locality);

        let (home_price, solver) = match request.mode {
            CalculationMode::MaxAffordable => {
                let outcome = AffordabilitySolver::new(self.config).solve_max_home_price(
                    &SolverInput {
                        monthly_gross: income.monthly_gross,
                        monthly_debts: request.monthly_debts,
                        interest_rate: housing.interest_rate,
                        term_years: housing.loan_term_years,
                        down_payment: housing.down_payment,
                        property_tax_rate: property_tax.rate,
                        annual_insurance: Self::annual_insurance(&housing),
                        is_fha: housing.is_fha,
                    },
                )?;
                (round_half_up(outcome.home_price), Some(outcome.diagnostics))
            }
            CalculationMode::AnalyzeHome => match housing.home_price {
                Some(price) if price > Decimal::ZERO => (price, None),
                _ => {
                    let mut errors = ValidationErrors::default();
                    errors.insert(Field::HomePrice, "Please enter a valid home price");
                    return Err(errors.into());
                }
            },
        };

        Ok(self.build_result(
            request,
            &housing,
            income,
            taxes,
            property_tax,
            home_price,
            solver,
        ))
    }

    /// Property tax rate for the locality, falling back to the configured
    /// default for states missing from the tables.
    pub fn property_tax(
        &self,
        state: &str,
        county: Option<&str>,
    ) -> PropertyTaxLookup {
        self.tables
            .property_tax_rate(state, county)
            .unwrap_or_else(|| {
                warn!(
                    state,
                    default_rate = %self.config.default_property_tax_rate,
                    "no property tax data for state; using default rate"
                );
                PropertyTaxLookup::default_rate(self.config.default_property_tax_rate)
            })
    }

    fn annual_insurance(housing: &HousingScenario) -> Decimal {
        if housing.include_insurance {
            housing.annual_insurance
        } else {
            Decimal::ZERO
        }
    }

    fn monthly_costs(
        &self,
        home_price: Decimal,
        loan_amount: Decimal,
        interest_rate: Decimal,
        term_years: u32,
        housing: &HousingScenario,
        property_tax_rate: Decimal,
    ) -> MonthlyCosts {
        let twelve = Decimal::from(12);
        let mip = if housing.is_fha {
            round_half_up(home_price * self.config.annual_mip_rate / twelve)
        } else {
            Decimal::ZERO
        };

        MonthlyCosts {
            principal_interest: monthly_payment(loan_amount, interest_rate, term_years),
            property_tax: round_half_up(home_price * property_tax_rate / twelve),
            insurance: round_half_up(housing.monthly_insurance()),
            mip,
        }
    }

    /// Analyze-mode verdict: housing plus debts within the back-end ratio when
    /// there are debts, housing alone within the front-end ratio otherwise.
    fn is_affordable(
        &self,
        total_monthly_payment: Decimal,
        monthly_debts: Decimal,
        monthly_gross: Decimal,
    ) -> bool {
        if monthly_gross <= Decimal::ZERO {
            return false;
        }
        if monthly_debts > Decimal::ZERO {
            (total_monthly_payment + monthly_debts) / monthly_gross <= self.config.back_end_ratio
        } else {
            total_monthly_payment / monthly_gross <= self.config.front_end_ratio
        }
    }

    fn term_comparison(
        &self,
        home_price: Decimal,
        loan_amount: Decimal,
        housing: &HousingScenario,
        property_tax_rate: Decimal,
        income: &IncomeSummary,
        has_debts: bool,
    ) -> Vec<TermPayment> {
        self.config
            .term_rates
            .iter()
            .map(|term| {
                let costs = self.monthly_costs(
                    home_price,
                    loan_amount,
                    term.rate,
                    term.term_years,
                    housing,
                    property_tax_rate,
                );
                let total = costs.total();
                let percent_of_gross = percent_of(total, income.monthly_gross);

                TermPayment {
                    term_years: term.term_years,
                    interest_rate: term.rate,
                    monthly_principal_interest: costs.principal_interest,
                    total_monthly_payment: total,
                    total_interest: total_interest(loan_amount, term.rate, term.term_years),
                    percent_of_gross: round_half_up(percent_of_gross),
                    percent_of_take_home: round_half_up(percent_of(total, income.monthly_take_home)),
                    tier: self.config.tier_for(percent_of_gross, has_debts),
                }
            })
            .collect()
    }

    #[allow(clippy::too_many_arguments)]
    fn build_result(
        &self,
        request: &CalculationRequest,
        housing: &HousingScenario,
        income: IncomeSummary,
        taxes: TaxBurden,
        property_tax: PropertyTaxLookup,
        home_price: Decimal,
        solver: Option<SolverDiagnostics>,
    ) -> AffordabilityResult {
        let has_debts = request.has_debts();

        let (down_amount, down_percent) = housing.down_payment.resolve(home_price);
        let down_amount = round_half_up(down_amount);
        let loan_amount = (home_price - down_amount).max(Decimal::ZERO);

        let costs = self.monthly_costs(
            home_price,
            loan_amount,
            housing.interest_rate,
            housing.loan_term_years,
            housing,
            property_tax.rate,
        );
        let total_monthly_payment = costs.total();
        let percent_of_gross = percent_of(total_monthly_payment, income.monthly_gross);

        let (closing_costs, upfront_mip) = AffordabilitySolver::new(self.config).closing_costs(
            home_price,
            loan_amount,
            housing.is_fha,
        );
        let total_closing_costs = closing_costs + upfront_mip;

        let is_affordable = match request.mode {
            CalculationMode::MaxAffordable => solver.as_ref().is_some_and(|s| s.settled()),
            CalculationMode::AnalyzeHome => self.is_affordable(
                total_monthly_payment,
                request.monthly_debts,
                income.monthly_gross,
            ),
        };

        let term_comparison = self.term_comparison(
            home_price,
            loan_amount,
            housing,
            property_tax.rate,
            &income,
            has_debts,
        );

        debug!(
            mode = request.mode.as_str(),
            home_price = %home_price,
            total_monthly_payment = %total_monthly_payment,
            is_affordable,
            "affordability calculated"
        );

        AffordabilityResult {
            mode: request.mode,
            monthly_debts: request.monthly_debts,
            home_price,
            loan_amount,
            down_payment_amount: down_amount,
            down_payment_percent: down_percent.round_dp(2),
            interest_rate: housing.interest_rate,
            loan_term_years: housing.loan_term_years,
            is_fha: housing.is_fha,
            monthly_principal_interest: costs.principal_interest,
            monthly_property_tax: costs.property_tax,
            monthly_insurance: costs.insurance,
            monthly_mip: costs.mip,
            total_monthly_payment,
            percent_of_gross: round_half_up(percent_of_gross),
            percent_of_take_home: round_half_up(percent_of(
                total_monthly_payment,
                income.monthly_take_home,
            )),
            tier: self.config.tier_for(percent_of_gross, has_debts),
            is_affordable,
            closing_costs,
            upfront_mip,
            total_closing_costs,
            total_cash_required: down_amount + total_closing_costs,
            taxes,
            property_tax,
            term_comparison,
            solver,
            income,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{
        AffordabilityTier, DownPayment, IncomeInput, PayFrequency, PropertyTaxEntry,
        PropertyTaxSource, TaxYearConfig,
    };

    fn tables() -> TaxTables {
        let mut tables = TaxTables::new(
            TaxYearConfig {
                tax_year: 2024,
                ss_wage_max: dec!(168600),
                ss_tax_rate: dec!(0.062),
                medicare_tax_rate: dec!(0.0145),
                additional_medicare_rate: dec!(0.009),
                additional_medicare_threshold: dec!(200000),
            },
            Vec::new(),
        );
        tables.insert_property_tax(PropertyTaxEntry {
            state: "Texas".to_string(),
            county: "Travis".to_string(),
            rate: dec!(0.018),
        });
        tables
    }

    fn request(mode: CalculationMode) -> CalculationRequest {
        CalculationRequest {
            mode,
            income: IncomeInput::Gross {
                amount: dec!(120000),
                frequency: PayFrequency::Annual,
            },
            state: "Colorado".to_string(),
            locality: None,
            monthly_debts: dec!(0),
            housing: HousingScenario {
                home_price: Some(dec!(300000)),
                down_payment: DownPayment::Percent(dec!(20)),
                loan_term_years: 30,
                interest_rate: dec!(6.5),
                include_insurance: true,
                annual_insurance: dec!(1200),
                is_fha: false,
            },
        }
    }

    // =========================================================================
    // analyze mode tests
    // =========================================================================

    #[test]
    fn analyze_builds_payment_breakdown() {
        let tables = tables();
        let config = AffordabilityConfig::default();

        let result = AffordabilityCalculator::new(&tables, &config)
            .calculate(&request(CalculationMode::AnalyzeHome))
            .unwrap();

        // Default property tax: 300000 * 1.1% / 12 = 275
        assert_eq!(result.property_tax.source, PropertyTaxSource::Default);
        assert_eq!(result.down_payment_amount, dec!(60000));
        assert_eq!(result.loan_amount, dec!(240000));
        assert_eq!(result.monthly_principal_interest, dec!(1516.96));
        assert_eq!(result.monthly_property_tax, dec!(275));
        assert_eq!(result.monthly_insurance, dec!(100));
        assert_eq!(result.monthly_mip, dec!(0));
        assert_eq!(result.total_monthly_payment, dec!(1891.96));
        assert_eq!(result.percent_of_gross, dec!(18.92));
        assert_eq!(result.tier, AffordabilityTier::Affordable);
        assert!(result.is_affordable);
        assert_eq!(result.solver, None);
    }

    #[test]
    fn analyze_reports_closing_costs_and_cash() {
        let tables = tables();
        let config = AffordabilityConfig::default();

        let result = AffordabilityCalculator::new(&tables, &config)
            .calculate(&request(CalculationMode::AnalyzeHome))
            .unwrap();

        assert_eq!(result.closing_costs, dec!(15000));
        assert_eq!(result.upfront_mip, dec!(0));
        assert_eq!(result.total_closing_costs, dec!(15000));
        assert_eq!(result.total_cash_required, dec!(75000));
    }

    #[test]
    fn analyze_fha_forces_minimum_down_payment_and_adds_mip() {
        let tables = tables();
        let config = AffordabilityConfig::default();
        let mut request = request(CalculationMode::AnalyzeHome);
        request.housing.is_fha = true;

        let result = AffordabilityCalculator::new(&tables, &config)
            .calculate(&request)
            .unwrap();

        // 3.5% of 300000; MIP 300000 * 0.55% / 12; upfront 289500 * 1.75%
        assert_eq!(result.down_payment_percent, dec!(3.5));
        assert_eq!(result.down_payment_amount, dec!(10500));
        assert_eq!(result.loan_amount, dec!(289500));
        assert_eq!(result.monthly_mip, dec!(137.50));
        assert_eq!(result.upfront_mip, dec!(5066.25));
    }

    #[test]
    fn analyze_with_debts_uses_back_end_verdict() {
        let tables = tables();
        let config = AffordabilityConfig::default();
        let mut request = request(CalculationMode::AnalyzeHome);
        request.monthly_debts = dec!(2000);

        let result = AffordabilityCalculator::new(&tables, &config)
            .calculate(&request)
            .unwrap();

        // (1891.96 + 2000) / 10000 = 38.9% > 36%
        assert!(!result.is_affordable);
        // Housing alone is 18.92%, inside the back-end band
        assert_eq!(result.tier, AffordabilityTier::Affordable);
    }

    #[test]
    fn analyze_without_price_is_validation_error() {
        let tables = tables();
        let config = AffordabilityConfig::default();
        let mut request = request(CalculationMode::AnalyzeHome);
        request.housing.home_price = None;

        let result = AffordabilityCalculator::new(&tables, &config).calculate(&request);

        let Err(AffordabilityError::Validation(errors)) = result else {
            panic!("expected validation error, got {result:?}");
        };
        assert_eq!(errors.get(Field::HomePrice), Some("Please enter a valid home price"));
    }

    #[test]
    fn analyze_uses_county_property_tax() {
        let tables = tables();
        let config = AffordabilityConfig::default();
        let mut request = request(CalculationMode::AnalyzeHome);
        request.state = "Texas".to_string();
        request.locality = Some("Travis".to_string());

        let result = AffordabilityCalculator::new(&tables, &config)
            .calculate(&request)
            .unwrap();

        // 300000 * 1.8% / 12
        assert_eq!(result.property_tax.label, "Travis, Texas");
        assert_eq!(result.monthly_property_tax, dec!(450));
    }

    #[test]
    fn term_comparison_covers_configured_terms() {
        let tables = tables();
        let config = AffordabilityConfig::default();

        let result = AffordabilityCalculator::new(&tables, &config)
            .calculate(&request(CalculationMode::AnalyzeHome))
            .unwrap();

        let terms: Vec<u32> = result.term_comparison.iter().map(|t| t.term_years).collect();
        assert_eq!(terms, vec![10, 15, 30]);

        let thirty = &result.term_comparison[2];
        assert_eq!(thirty.interest_rate, dec!(6.5));
        assert_eq!(thirty.monthly_principal_interest, dec!(1516.96));
        assert_eq!(thirty.total_interest, dec!(306105.60));

        // Shorter terms cost more per month but less interest overall
        let ten = &result.term_comparison[0];
        assert!(ten.monthly_principal_interest > thirty.monthly_principal_interest);
        assert!(ten.total_interest < thirty.total_interest);
    }

    // =========================================================================
    // max affordable mode tests
    // =========================================================================

    #[test]
    fn max_affordable_solves_price_and_reports_diagnostics() {
        let tables = tables();
        let config = AffordabilityConfig::default();

        let result = AffordabilityCalculator::new(&tables, &config)
            .calculate(&request(CalculationMode::MaxAffordable))
            .unwrap();

        let solver = result.solver.as_ref().unwrap();
        assert!(solver.converged);
        assert!(result.home_price > dec!(400000));
        assert!(result.is_affordable);
        assert_eq!(result.down_payment_percent, dec!(20));
    }

    #[test]
    fn max_affordable_take_home_override() {
        let tables = tables();
        let config = AffordabilityConfig::default();
        let mut request = request(CalculationMode::MaxAffordable);
        request.income = IncomeInput::TakeHome { monthly: dec!(7000) };

        let result = AffordabilityCalculator::new(&tables, &config)
            .calculate(&request)
            .unwrap();

        assert_eq!(result.income.monthly_gross, dec!(10000));
        assert_eq!(result.taxes, TaxBurden::zero());
    }

    #[test]
    fn max_affordable_unaffordable_debts() {
        let tables = tables();
        let config = AffordabilityConfig::default();
        let mut request = request(CalculationMode::MaxAffordable);
        request.monthly_debts = dec!(5000);

        let result = AffordabilityCalculator::new(&tables, &config).calculate(&request);

        assert!(matches!(result, Err(AffordabilityError::NotAffordable { .. })));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let tables = tables();
        let config = AffordabilityConfig {
            front_end_ratio: dec!(2),
            ..AffordabilityConfig::default()
        };

        let result = AffordabilityCalculator::new(&tables, &config)
            .calculate(&request(CalculationMode::MaxAffordable));

        assert!(matches!(result, Err(AffordabilityError::Config(_))));
    }
}
