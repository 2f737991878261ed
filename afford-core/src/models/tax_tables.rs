use std::collections::{BTreeMap, BTreeSet, HashMap};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{
    JurisdictionKind, JurisdictionTaxRule, LocalJurisdiction, LocalTaxScheme, PropertyTaxEntry,
    PropertyTaxLookup, StateTaxProfile, TaxBracket, TaxYearConfig,
};

/// Read-only reference data for one tax year.
///
/// Built once at startup (see the `afford-data` crate) and shared by
/// reference with every calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxTables {
    pub tax_year_config: TaxYearConfig,
    pub federal_brackets: Vec<TaxBracket>,
    states: BTreeMap<String, StateTaxProfile>,
    local: HashMap<JurisdictionKey, JurisdictionTaxRule>,
    property_tax: BTreeMap<String, BTreeMap<String, Decimal>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
struct JurisdictionKey {
    state: String,
    kind: JurisdictionKind,
    name: String,
}

impl TaxTables {
    pub fn new(
        tax_year_config: TaxYearConfig,
        federal_brackets: Vec<TaxBracket>,
    ) -> Self {
        Self {
            tax_year_config,
            federal_brackets,
            states: BTreeMap::new(),
            local: HashMap::new(),
            property_tax: BTreeMap::new(),
        }
    }

    pub fn tax_year(&self) -> i32 {
        self.tax_year_config.tax_year
    }

    /// Adds or replaces a state profile.
    pub fn insert_state(
        &mut self,
        profile: StateTaxProfile,
    ) {
        self.states.insert(profile.state.clone(), profile);
    }

    /// Adds or replaces a local jurisdiction rule.
    pub fn insert_local(
        &mut self,
        jurisdiction: LocalJurisdiction,
    ) {
        let key = JurisdictionKey {
            state: jurisdiction.state,
            kind: jurisdiction.kind,
            name: jurisdiction.name,
        };
        self.local.insert(key, jurisdiction.rule);
    }

    /// Adds or replaces a county property tax rate.
    pub fn insert_property_tax(
        &mut self,
        entry: PropertyTaxEntry,
    ) {
        self.property_tax
            .entry(entry.state)
            .or_default()
            .insert(entry.county, entry.rate);
    }

    pub fn state(
        &self,
        state: &str,
    ) -> Option<&StateTaxProfile> {
        self.states.get(state)
    }

    /// State names in alphabetical order.
    pub fn state_names(&self) -> impl Iterator<Item = &str> {
        self.states.keys().map(String::as_str)
    }

    pub fn local_rule(
        &self,
        state: &str,
        kind: JurisdictionKind,
        name: &str,
    ) -> Option<&JurisdictionTaxRule> {
        let key = JurisdictionKey {
            state: state.to_string(),
            kind,
            name: name.to_string(),
        };
        self.local.get(&key)
    }

    /// Looks up the property tax rate for a county.
    ///
    /// Falls back to the unweighted mean of the state's county rates when the
    /// county is absent or unknown. Returns `None` for an unknown state; the
    /// caller is expected to substitute its own default.
    pub fn property_tax_rate(
        &self,
        state: &str,
        county: Option<&str>,
    ) -> Option<PropertyTaxLookup> {
        let counties = self.property_tax.get(state)?;

        if let Some(rate) = county.and_then(|c| counties.get(c)) {
            return county.map(|c| PropertyTaxLookup::county(state, c, *rate));
        }

        if counties.is_empty() {
            return None;
        }
        let total: Decimal = counties.values().copied().sum();
        let average = total / Decimal::from(counties.len());
        Some(PropertyTaxLookup::state_average(state, average))
    }

    /// Every locality a user may pick for `state`: property tax counties plus
    /// local income tax jurisdictions, sorted and de-duplicated.
    pub fn localities(
        &self,
        state: &str,
    ) -> Vec<String> {
        let mut names: BTreeSet<&str> = BTreeSet::new();

        if let Some(counties) = self.property_tax.get(state) {
            names.extend(counties.keys().map(String::as_str));
        }
        names.extend(
            self.local
                .keys()
                .filter(|k| k.state == state)
                .map(|k| k.name.as_str()),
        );

        names.into_iter().map(str::to_string).collect()
    }

    /// Whether `locality` is acceptable for `state`.
    ///
    /// States with a default city rule accept any city, and states with no
    /// known localities accept anything.
    pub fn is_known_locality(
        &self,
        state: &str,
        locality: &str,
    ) -> bool {
        let accepts_any_city = self.state(state).is_some_and(|p| {
            p.local_scheme == LocalTaxScheme::City && p.default_local_rule.is_some()
        });
        if accepts_any_city {
            return true;
        }

        let known = self.localities(state);
        known.is_empty() || known.iter().any(|name| name == locality)
    }
}
