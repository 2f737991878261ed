//! Layered income tax burden: federal, FICA, state and local.
//!
//! # Layers
//!
//! | Layer    | Rule |
//! |----------|------|
//! | Federal  | Progressive schedule, each bracket taxing its own slice |
//! | FICA     | Social Security up to the wage base, Medicare on everything, additional Medicare above the threshold |
//! | State    | The state profile's rule (flat, or progressive with base amounts) |
//! | Local    | Dispatched on the state's [`LocalTaxScheme`] |
//!
//! Unknown states and localities contribute zero. Every component is rounded
//! to cents before it is summed.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use afford_core::calculations::TaxEngine;
//! use afford_core::{TaxBracket, TaxTables, TaxYearConfig};
//!
//! let tables = TaxTables::new(
//!     TaxYearConfig {
//!         tax_year: 2024,
//!         ss_wage_max: dec!(168600),
//!         ss_tax_rate: dec!(0.062),
//!         medicare_tax_rate: dec!(0.0145),
//!         additional_medicare_rate: dec!(0.009),
//!         additional_medicare_threshold: dec!(200000),
//!     },
//!     vec![TaxBracket {
//!         min_income: dec!(0),
//!         max_income: None,
//!         tax_rate: dec!(0.10),
//!         base_tax: dec!(0),
//!     }],
//! );
//!
//! let burden = TaxEngine::new(&tables).compute_tax_burden(dec!(50000), "Nowhere", None);
//!
//! assert_eq!(burden.federal, dec!(5000));
//! assert_eq!(burden.fica.total, dec!(3825));
//! assert_eq!(burden.state, dec!(0));
//! assert_eq!(burden.total, dec!(8825));
//! ```

use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::brackets::progressive_tax;
use crate::calculations::common::round_half_up;
use crate::models::{
    FicaBreakdown, JurisdictionKind, JurisdictionTaxRule, LocalTaxScheme, StateTaxProfile,
    TaxBurden, TaxTables,
};

/// Computes tax burdens against a fixed set of tables.
#[derive(Debug, Clone, Copy)]
pub struct TaxEngine<'a> {
    tables: &'a TaxTables,
}

impl<'a> TaxEngine<'a> {
    pub fn new(tables: &'a TaxTables) -> Self {
        Self { tables }
    }

    /// Total annual tax for a single filer living in `state` and `locality`.
    ///
    /// Non-positive income yields an all-zero burden with no effective rate.
    pub fn compute_tax_burden(
        &self,
        annual_income: Decimal,
        state: &str,
        locality: Option<&str>,
    ) -> TaxBurden {
        if annual_income <= Decimal::ZERO {
            return TaxBurden::zero();
        }

        let federal = self.federal_tax(annual_income);
        let fica = self.fica(annual_income);
        let state_tax = self.state_tax(annual_income, state);
        let local = self.local_tax(annual_income, state, locality);
        let total = federal + fica.total + state_tax + local;

        TaxBurden {
            federal,
            fica,
            state: state_tax,
            local,
            total,
            effective_rate: Some(total / annual_income),
        }
    }

    /// Federal income tax from the progressive schedule.
    pub fn federal_tax(
        &self,
        annual_income: Decimal,
    ) -> Decimal {
        round_half_up(progressive_tax(
            annual_income,
            &self.tables.federal_brackets,
        ))
    }

    /// Employee share of Social Security and Medicare.
    pub fn fica(
        &self,
        annual_income: Decimal,
    ) -> FicaBreakdown {
        if annual_income <= Decimal::ZERO {
            return FicaBreakdown::default();
        }

        let config = &self.tables.tax_year_config;
        let social_security =
            round_half_up(annual_income.min(config.ss_wage_max) * config.ss_tax_rate);

        let above_threshold =
            (annual_income - config.additional_medicare_threshold).max(Decimal::ZERO);
        let medicare = round_half_up(
            annual_income * config.medicare_tax_rate
                + above_threshold * config.additional_medicare_rate,
        );

        FicaBreakdown {
            social_security,
            medicare,
            total: social_security + medicare,
        }
    }

    /// State income tax; zero for states missing from the tables.
    pub fn state_tax(
        &self,
        annual_income: Decimal,
        state: &str,
    ) -> Decimal {
        match self.tables.state(state) {
            Some(profile) => round_half_up(profile.income_tax.annual_tax(annual_income)),
            None => {
                debug!(state, "no state tax profile; state tax is zero");
                Decimal::ZERO
            }
        }
    }

    /// Local income tax, dispatched on the state's local scheme.
    pub fn local_tax(
        &self,
        annual_income: Decimal,
        state: &str,
        locality: Option<&str>,
    ) -> Decimal {
        let Some(profile) = self.tables.state(state) else {
            return Decimal::ZERO;
        };

        let scheme = profile.effective_local_scheme();
        let tax = match (scheme, locality) {
            (LocalTaxScheme::None, _) => Decimal::ZERO,
            (LocalTaxScheme::TableBased, _) => {
                Self::apply(profile.default_local_rule.as_ref(), annual_income)
            }
            (LocalTaxScheme::SchoolDistrict, _) => {
                debug!(state, "school district income tax is not modeled");
                Decimal::ZERO
            }
            (_, None) => {
                debug!(state, scheme = scheme.as_str(), "no locality given; local tax is zero");
                Decimal::ZERO
            }
            (LocalTaxScheme::City, Some(city)) => self.city_tax(profile, city, annual_income),
            (LocalTaxScheme::County, Some(county)) => {
                let rule = self.tables.local_rule(state, JurisdictionKind::County, county);
                Self::apply(rule, annual_income)
            }
            (LocalTaxScheme::Both, Some(name)) => {
                let city = self.tables.local_rule(state, JurisdictionKind::City, name);
                let county = self.tables.local_rule(state, JurisdictionKind::County, name);
                Self::apply(city, annual_income) + Self::apply(county, annual_income)
            }
        };

        round_half_up(tax)
    }

    /// City table entry, falling back to the state's default city rule.
    fn city_tax(
        &self,
        profile: &StateTaxProfile,
        city: &str,
        annual_income: Decimal,
    ) -> Decimal {
        let rule = self
            .tables
            .local_rule(&profile.state, JurisdictionKind::City, city)
            .or_else(|| {
                debug!(
                    state = %profile.state,
                    city,
                    has_default = profile.default_local_rule.is_some(),
                    "city not in local table"
                );
                profile.default_local_rule.as_ref()
            });
        Self::apply(rule, annual_income)
    }

    fn apply(
        rule: Option<&JurisdictionTaxRule>,
        annual_income: Decimal,
    ) -> Decimal {
        rule.map_or(Decimal::ZERO, |r| r.annual_tax(annual_income))
    }
}
