//! Underwriting and cost assumptions.
//!
//! Every field has a default matching common U.S. lending practice, so an
//! empty TOML table deserializes into a usable configuration.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::AffordabilityTier;

/// Errors produced by [`AffordabilityConfig::validate`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("front-end ratio must be in (0, 1], got {0}")]
    InvalidFrontEndRatio(Decimal),

    #[error("back-end ratio must be in (0, 1], got {0}")]
    InvalidBackEndRatio(Decimal),

    #[error("{name} must not be negative, got {value}")]
    NegativeRate { name: &'static str, value: Decimal },

    #[error("FHA down payment percent must be in [0, 100], got {0}")]
    InvalidFhaDownPayment(Decimal),

    #[error("take-home gross-up factor must be in (0, 1], got {0}")]
    InvalidTakeHomeFactor(Decimal),

    #[error("term rate for {term_years}-year loans is invalid: {rate}")]
    InvalidTermRate { term_years: u32, rate: Decimal },
}

/// Interest rate assumed for one loan term in the term comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermRate {
    pub term_years: u32,
    /// Annual percent.
    pub rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffordabilityConfig {
    /// Housing cost share of gross income when there are no other debts.
    #[serde(default = "default_front_end_ratio")]
    pub front_end_ratio: Decimal,

    /// Housing plus debt share of gross income.
    #[serde(default = "default_back_end_ratio")]
    pub back_end_ratio: Decimal,

    #[serde(default = "default_closing_cost_rate")]
    pub closing_cost_rate: Decimal,

    /// FHA upfront premium as a fraction of the loan.
    #[serde(default = "default_upfront_mip_rate")]
    pub upfront_mip_rate: Decimal,

    /// FHA annual premium as a fraction of the home price.
    #[serde(default = "default_annual_mip_rate")]
    pub annual_mip_rate: Decimal,

    /// Percent, not fraction (3.5 = 3.5%).
    #[serde(default = "default_fha_down_payment_percent")]
    pub fha_down_payment_percent: Decimal,

    #[serde(default = "default_property_tax_rate")]
    pub default_property_tax_rate: Decimal,

    #[serde(default = "default_annual_insurance")]
    pub default_annual_insurance: Decimal,

    /// Take-home pay divided by this factor estimates gross pay.
    #[serde(default = "default_take_home_gross_up")]
    pub take_home_gross_up: Decimal,

    /// Percentage points above the front-end ratio still considered a stretch.
    #[serde(default = "default_stretch_margin_front_end")]
    pub stretch_margin_front_end: Decimal,

    /// Percentage points above the back-end ratio still considered a stretch.
    #[serde(default = "default_stretch_margin_back_end")]
    pub stretch_margin_back_end: Decimal,

    #[serde(default = "default_term_rates")]
    pub term_rates: Vec<TermRate>,
}

fn default_front_end_ratio() -> Decimal {
    dec!(0.28)
}

fn default_back_end_ratio() -> Decimal {
    dec!(0.36)
}

fn default_closing_cost_rate() -> Decimal {
    dec!(0.05)
}

fn default_upfront_mip_rate() -> Decimal {
    dec!(0.0175)
}

fn default_annual_mip_rate() -> Decimal {
    dec!(0.0055)
}

fn default_fha_down_payment_percent() -> Decimal {
    dec!(3.5)
}

fn default_property_tax_rate() -> Decimal {
    dec!(0.011)
}

fn default_annual_insurance() -> Decimal {
    dec!(1200)
}

fn default_take_home_gross_up() -> Decimal {
    dec!(0.70)
}

fn default_stretch_margin_front_end() -> Decimal {
    dec!(4)
}

fn default_stretch_margin_back_end() -> Decimal {
    dec!(6)
}

fn default_term_rates() -> Vec<TermRate> {
    vec![
        TermRate {
            term_years: 10,
            rate: dec!(5.84),
        },
        TermRate {
            term_years: 15,
            rate: dec!(5.96),
        },
        TermRate {
            term_years: 30,
            rate: dec!(6.5),
        },
    ]
}

impl Default for AffordabilityConfig {
    fn default() -> Self {
        Self {
            front_end_ratio: default_front_end_ratio(),
            back_end_ratio: default_back_end_ratio(),
            closing_cost_rate: default_closing_cost_rate(),
            upfront_mip_rate: default_upfront_mip_rate(),
            annual_mip_rate: default_annual_mip_rate(),
            fha_down_payment_percent: default_fha_down_payment_percent(),
            default_property_tax_rate: default_property_tax_rate(),
            default_annual_insurance: default_annual_insurance(),
            take_home_gross_up: default_take_home_gross_up(),
            stretch_margin_front_end: default_stretch_margin_front_end(),
            stretch_margin_back_end: default_stretch_margin_back_end(),
            term_rates: default_term_rates(),
        }
    }
}

impl AffordabilityConfig {
    /// Checks every field against its valid range.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.front_end_ratio <= Decimal::ZERO || self.front_end_ratio > Decimal::ONE {
            return Err(ConfigError::InvalidFrontEndRatio(self.front_end_ratio));
        }
        if self.back_end_ratio <= Decimal::ZERO || self.back_end_ratio > Decimal::ONE {
            return Err(ConfigError::InvalidBackEndRatio(self.back_end_ratio));
        }

        let rates = [
            ("closing cost rate", self.closing_cost_rate),
            ("upfront MIP rate", self.upfront_mip_rate),
            ("annual MIP rate", self.annual_mip_rate),
            ("default property tax rate", self.default_property_tax_rate),
            ("default annual insurance", self.default_annual_insurance),
            ("front-end stretch margin", self.stretch_margin_front_end),
            ("back-end stretch margin", self.stretch_margin_back_end),
        ];
        if let Some((name, value)) = rates.into_iter().find(|(_, v)| *v < Decimal::ZERO) {
            return Err(ConfigError::NegativeRate { name, value });
        }

        if self.fha_down_payment_percent < Decimal::ZERO
            || self.fha_down_payment_percent > Decimal::ONE_HUNDRED
        {
            return Err(ConfigError::InvalidFhaDownPayment(
                self.fha_down_payment_percent,
            ));
        }
        if self.take_home_gross_up <= Decimal::ZERO || self.take_home_gross_up > Decimal::ONE {
            return Err(ConfigError::InvalidTakeHomeFactor(self.take_home_gross_up));
        }
        if let Some(bad) = self
            .term_rates
            .iter()
            .find(|t| t.term_years == 0 || t.rate < Decimal::ZERO || t.rate > dec!(30))
        {
            return Err(ConfigError::InvalidTermRate {
                term_years: bad.term_years,
                rate: bad.rate,
            });
        }
        Ok(())
    }

    /// Ratio that caps housing cost: back-end when there are debts.
    pub fn applicable_ratio(
        &self,
        has_debts: bool,
    ) -> Decimal {
        if has_debts {
            self.back_end_ratio
        } else {
            self.front_end_ratio
        }
    }

    /// Bands a housing cost share of gross income (in percent).
    pub fn tier_for(
        &self,
        percent_of_gross: Decimal,
        has_debts: bool,
    ) -> AffordabilityTier {
        let (limit, margin) = if has_debts {
            (self.back_end_ratio, self.stretch_margin_back_end)
        } else {
            (self.front_end_ratio, self.stretch_margin_front_end)
        };
        let limit = limit * Decimal::ONE_HUNDRED;

        if percent_of_gross <= limit {
            AffordabilityTier::Affordable
        } else if percent_of_gross <= limit + margin {
            AffordabilityTier::Stretched
        } else {
            AffordabilityTier::Unaffordable
        }
    }
}
