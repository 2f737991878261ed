use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Effective annual property tax rate for one county.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyTaxEntry {
    pub state: String,
    pub county: String,
    /// Fraction of assessed value per year (0.011 = 1.1%).
    pub rate: Decimal,
}

/// Where a property tax rate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyTaxSource {
    County,
    StateAverage,
    Default,
}

/// Rate resolved for a (state, county) pair, tagged with its provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyTaxLookup {
    pub rate: Decimal,
    pub source: PropertyTaxSource,
    pub label: String,
}

impl PropertyTaxLookup {
    pub fn county(
        state: &str,
        county: &str,
        rate: Decimal,
    ) -> Self {
        Self {
            rate,
            source: PropertyTaxSource::County,
            label: format!("{county}, {state}"),
        }
    }

    pub fn state_average(
        state: &str,
        rate: Decimal,
    ) -> Self {
        Self {
            rate,
            source: PropertyTaxSource::StateAverage,
            label: format!("{state} average (county not found)"),
        }
    }

    /// Fallback used when the state itself is missing from the tables.
    pub fn default_rate(rate: Decimal) -> Self {
        Self {
            rate,
            source: PropertyTaxSource::Default,
            label: "national default".to_string(),
        }
    }
}
