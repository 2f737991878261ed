use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::JurisdictionTaxRule;

/// The way a state's localities levy income tax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocalTaxScheme {
    City,
    County,
    SchoolDistrict,
    Both,
    TableBased,
    None,
}

impl LocalTaxScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::City => "city",
            Self::County => "county",
            Self::SchoolDistrict => "school_district",
            Self::Both => "both",
            Self::TableBased => "table_based",
            Self::None => "none",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "city" => Some(Self::City),
            "county" => Some(Self::County),
            "school_district" => Some(Self::SchoolDistrict),
            "both" => Some(Self::Both),
            "table_based" => Some(Self::TableBased),
            "none" | "" => Some(Self::None),
            _ => None,
        }
    }

    /// Word used when asking the user to pick a locality.
    pub fn locality_label(&self) -> &'static str {
        match self {
            Self::City => "city",
            Self::County => "county",
            Self::SchoolDistrict => "school district",
            Self::Both => "city/county",
            Self::TableBased | Self::None => "location",
        }
    }
}

/// Everything the tax engine needs to know about one state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTaxProfile {
    pub state: String,

    /// Headline flat rate as published for the state.
    ///
    /// For states taxed through a progressive schedule this is informational;
    /// `income_tax` is what the engine applies.
    pub flat_rate: Decimal,

    /// Rule the engine applies to compute state income tax.
    pub income_tax: JurisdictionTaxRule,

    pub has_local_tax: bool,
    pub local_scheme: LocalTaxScheme,

    /// Statewide local rule: a fallback for cities missing from the local
    /// table, or the only rule for table-based states.
    pub default_local_rule: Option<JurisdictionTaxRule>,
}

impl StateTaxProfile {
    /// Scheme the engine dispatches on; `None` when the state has no local tax.
    pub fn effective_local_scheme(&self) -> LocalTaxScheme {
        if self.has_local_tax {
            self.local_scheme
        } else {
            LocalTaxScheme::None
        }
    }
}
