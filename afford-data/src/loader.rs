use std::collections::{BTreeMap, HashSet};
use std::io::Read;

use afford_core::{
    JurisdictionKind, JurisdictionTaxRule, LocalJurisdiction, LocalTaxScheme, PropertyTaxEntry,
    StateTaxProfile, TaxBracket, TaxTables, TaxYearConfig,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur when loading tax table data.
#[derive(Debug, Error)]
pub enum TaxTableLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("expected exactly one tax year row, found {0}")]
    TaxYearRowCount(usize),

    #[error("unknown local tax scheme '{scheme}' for {state}")]
    UnknownScheme { state: String, scheme: String },

    #[error("unknown jurisdiction kind '{kind}' for {name}, {state}")]
    UnknownKind {
        state: String,
        name: String,
        kind: String,
    },

    #[error("unknown rule type '{rule_type}' for {jurisdiction}")]
    UnknownRuleType {
        jurisdiction: String,
        rule_type: String,
    },

    #[error("{jurisdiction}: rule '{rule_type}' is missing '{field}'")]
    MissingRuleField {
        jurisdiction: String,
        rule_type: &'static str,
        field: &'static str,
    },

    #[error("{schedule} schedule is invalid: {reason}")]
    InvalidSchedule { schedule: String, reason: String },

    #[error("{0} is marked progressive but has no brackets")]
    MissingProgressiveSchedule(String),

    #[error("{0} appears in a table but has no state_tax row")]
    UnknownState(String),

    #[error("duplicate {table} entry: {key}")]
    Duplicate { table: &'static str, key: String },
}

/// Row of `tax_year.csv`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TaxYearRecord {
    pub tax_year: i32,
    pub ss_wage_max: Decimal,
    pub ss_tax_rate: Decimal,
    pub medicare_tax_rate: Decimal,
    pub additional_medicare_rate: Decimal,
    pub additional_medicare_threshold: Decimal,
}

/// Row of `federal_brackets.csv`.
///
/// `max_income` is empty for the unbounded top bracket.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct FederalBracketRecord {
    pub min_income: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub max_income: Option<Decimal>,
    pub base_tax: Decimal,
    pub rate: Decimal,
}

/// Row of `state_brackets.csv`: one bracket of a progressive state schedule.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct StateBracketRecord {
    pub state: String,
    pub min_income: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub max_income: Option<Decimal>,
    pub base_tax: Decimal,
    pub rate: Decimal,
}

/// Row of `state_tax.csv`.
///
/// - `flat_rate`: headline state rate
/// - `local_scheme`: `city`, `county`, `school_district`, `both`,
///   `table_based` or `none`
/// - `progressive`: when `true`, the state's rows in `state_brackets.csv`
///   replace the flat rate
/// - `default_local_type`/`default_local_rate`: optional statewide local rule
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct StateTaxRecord {
    pub state: String,
    pub flat_rate: Decimal,
    pub has_local_tax: bool,
    pub local_scheme: String,
    pub progressive: bool,
    #[serde(default)]
    pub default_local_type: String,
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    pub default_local_rate: Option<Decimal>,
}

/// Row of `local_tax.csv`. Which of the value columns are read depends on
/// `rule_type`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LocalTaxRecord {
    pub state: String,
    pub name: String,
    pub kind: String,
    pub rule_type: String,
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    pub rate: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    pub min: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    pub max: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub periods_per_year: Option<u32>,
}

/// Row of `property_tax.csv`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PropertyTaxRecord {
    pub state: String,
    pub county: String,
    pub rate: Decimal,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// The six CSV inputs that make up one set of tax tables.
pub struct TableSources<R: Read> {
    pub tax_year: R,
    pub federal_brackets: R,
    pub state_tax: R,
    pub state_brackets: R,
    pub local_tax: R,
    pub property_tax: R,
}

/// Builds [`TaxTables`] from CSV data.
///
/// Every file is parsed first, then cross-checked: bracket schedules must
/// partition `[0, ∞)`, each key may appear once per table, and every row
/// must belong to a state listed in `state_tax.csv`.
pub struct TaxTableLoader;

impl TaxTableLoader {
    /// Parse records of any table from a CSV reader.
    ///
    /// `file` only labels errors.
    pub fn parse<T, R>(
        file: &str,
        reader: R,
    ) -> Result<Vec<T>, TaxTableLoaderError>
    where
        T: DeserializeOwned,
        R: Read,
    {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: T =
                result.map_err(|e| TaxTableLoaderError::CsvParse(format!("{file}: {e}")))?;
            records.push(record);
        }

        debug!(file, rows = records.len(), "parsed tax table");
        Ok(records)
    }

    /// Parse and validate all six sources.
    pub fn load<R: Read>(sources: TableSources<R>) -> Result<TaxTables, TaxTableLoaderError> {
        let years: Vec<TaxYearRecord> = Self::parse("tax_year.csv", sources.tax_year)?;
        let federal: Vec<FederalBracketRecord> =
            Self::parse("federal_brackets.csv", sources.federal_brackets)?;
        let states: Vec<StateTaxRecord> = Self::parse("state_tax.csv", sources.state_tax)?;
        let state_brackets: Vec<StateBracketRecord> =
            Self::parse("state_brackets.csv", sources.state_brackets)?;
        let local: Vec<LocalTaxRecord> = Self::parse("local_tax.csv", sources.local_tax)?;
        let property: Vec<PropertyTaxRecord> =
            Self::parse("property_tax.csv", sources.property_tax)?;

        Self::build(years, federal, states, state_brackets, local, property)
    }

    /// Assemble already-parsed records into tables.
    pub fn build(
        years: Vec<TaxYearRecord>,
        federal: Vec<FederalBracketRecord>,
        states: Vec<StateTaxRecord>,
        state_brackets: Vec<StateBracketRecord>,
        local: Vec<LocalTaxRecord>,
        property: Vec<PropertyTaxRecord>,
    ) -> Result<TaxTables, TaxTableLoaderError> {
        let [year] = <[TaxYearRecord; 1]>::try_from(years)
            .map_err(|rows| TaxTableLoaderError::TaxYearRowCount(rows.len()))?;

        let federal_brackets: Vec<TaxBracket> = federal
            .into_iter()
            .map(|r| bracket(r.min_income, r.max_income, r.rate, r.base_tax))
            .collect();
        check_partition("federal", &federal_brackets)?;

        let mut tables = TaxTables::new(
            TaxYearConfig {
                tax_year: year.tax_year,
                ss_wage_max: year.ss_wage_max,
                ss_tax_rate: year.ss_tax_rate,
                medicare_tax_rate: year.medicare_tax_rate,
                additional_medicare_rate: year.additional_medicare_rate,
                additional_medicare_threshold: year.additional_medicare_threshold,
            },
            federal_brackets,
        );

        let mut schedules: BTreeMap<String, Vec<TaxBracket>> = BTreeMap::new();
        for r in state_brackets {
            schedules
                .entry(r.state)
                .or_default()
                .push(bracket(r.min_income, r.max_income, r.rate, r.base_tax));
        }

        let mut seen_states = HashSet::new();
        for record in states {
            if !seen_states.insert(record.state.clone()) {
                return Err(TaxTableLoaderError::Duplicate {
                    table: "state_tax",
                    key: record.state,
                });
            }
            let profile = state_profile(record, &mut schedules)?;
            tables.insert_state(profile);
        }
        if let Some(state) = schedules.into_keys().next() {
            return Err(TaxTableLoaderError::UnknownState(state));
        }

        let mut seen_local = HashSet::new();
        for record in local {
            require_state(&seen_states, &record.state)?;
            let jurisdiction = local_jurisdiction(record)?;
            let key = format!(
                "{}, {} ({})",
                jurisdiction.name,
                jurisdiction.state,
                jurisdiction.kind.as_str()
            );
            if !seen_local.insert(key.clone()) {
                return Err(TaxTableLoaderError::Duplicate {
                    table: "local_tax",
                    key,
                });
            }
            tables.insert_local(jurisdiction);
        }

        let mut seen_counties = HashSet::new();
        for record in property {
            require_state(&seen_states, &record.state)?;
            let key = format!("{}, {}", record.county, record.state);
            if !seen_counties.insert(key.clone()) {
                return Err(TaxTableLoaderError::Duplicate {
                    table: "property_tax",
                    key,
                });
            }
            tables.insert_property_tax(PropertyTaxEntry {
                state: record.state,
                county: record.county,
                rate: record.rate,
            });
        }

        debug!(
            tax_year = tables.tax_year(),
            states = seen_states.len(),
            localities = seen_local.len(),
            counties = seen_counties.len(),
            "tax tables loaded"
        );
        Ok(tables)
    }
}

fn bracket(
    min_income: Decimal,
    max_income: Option<Decimal>,
    tax_rate: Decimal,
    base_tax: Decimal,
) -> TaxBracket {
    TaxBracket {
        min_income,
        max_income,
        tax_rate,
        base_tax,
    }
}

fn require_state(
    known: &HashSet<String>,
    state: &str,
) -> Result<(), TaxTableLoaderError> {
    if known.contains(state) {
        Ok(())
    } else {
        Err(TaxTableLoaderError::UnknownState(state.to_string()))
    }
}

/// Brackets must start at zero, abut each other with no gap or overlap, and
/// end with exactly one unbounded bracket.
fn check_partition(
    schedule: &str,
    brackets: &[TaxBracket],
) -> Result<(), TaxTableLoaderError> {
    let invalid = |reason: String| TaxTableLoaderError::InvalidSchedule {
        schedule: schedule.to_string(),
        reason,
    };

    let Some(first) = brackets.first() else {
        return Err(invalid("no brackets".to_string()));
    };
    if first.min_income != Decimal::ZERO {
        return Err(invalid(format!(
            "first bracket starts at {}",
            first.min_income
        )));
    }

    for (i, b) in brackets.iter().enumerate() {
        if b.tax_rate < Decimal::ZERO {
            return Err(invalid(format!("negative rate {}", b.tax_rate)));
        }
        let is_last = i + 1 == brackets.len();
        match (b.max_income, brackets.get(i + 1)) {
            (Some(max), _) if max <= b.min_income => {
                return Err(invalid(format!("empty bracket at {}", b.min_income)));
            }
            (Some(max), Some(next)) if next.min_income != max => {
                return Err(invalid(format!(
                    "bracket ending at {max} is followed by one starting at {}",
                    next.min_income
                )));
            }
            (Some(_), None) => {
                return Err(invalid("top bracket is bounded".to_string()));
            }
            (None, _) if !is_last => {
                return Err(invalid(format!(
                    "unbounded bracket at {} is not last",
                    b.min_income
                )));
            }
            _ => {}
        }
    }

    Ok(())
}

fn state_profile(
    record: StateTaxRecord,
    schedules: &mut BTreeMap<String, Vec<TaxBracket>>,
) -> Result<StateTaxProfile, TaxTableLoaderError> {
    let local_scheme = LocalTaxScheme::parse(&record.local_scheme).ok_or_else(|| {
        TaxTableLoaderError::UnknownScheme {
            state: record.state.clone(),
            scheme: record.local_scheme.clone(),
        }
    })?;

    let income_tax = if record.progressive {
        let brackets = schedules
            .remove(&record.state)
            .ok_or_else(|| TaxTableLoaderError::MissingProgressiveSchedule(record.state.clone()))?;
        check_partition(&record.state, &brackets)?;
        JurisdictionTaxRule::ProgressiveWithBase { brackets }
    } else {
        JurisdictionTaxRule::FlatPercentage {
            rate: record.flat_rate,
        }
    };

    let default_local_rule = match record.default_local_type.trim() {
        "" => None,
        rule_type => Some(rule(
            &record.state,
            rule_type,
            RuleValues {
                rate: record.default_local_rate,
                ..RuleValues::default()
            },
        )?),
    };

    Ok(StateTaxProfile {
        state: record.state,
        flat_rate: record.flat_rate,
        income_tax,
        has_local_tax: record.has_local_tax,
        local_scheme,
        default_local_rule,
    })
}

fn local_jurisdiction(record: LocalTaxRecord) -> Result<LocalJurisdiction, TaxTableLoaderError> {
    let kind =
        JurisdictionKind::parse(&record.kind).ok_or_else(|| TaxTableLoaderError::UnknownKind {
            state: record.state.clone(),
            name: record.name.clone(),
            kind: record.kind.clone(),
        })?;

    let label = format!("{}, {}", record.name, record.state);
    let rule = rule(
        &label,
        record.rule_type.trim(),
        RuleValues {
            rate: record.rate,
            min: record.min,
            max: record.max,
            amount: record.amount,
            periods_per_year: record.periods_per_year,
        },
    )?;

    Ok(LocalJurisdiction {
        state: record.state,
        name: record.name,
        kind,
        rule,
    })
}

#[derive(Debug, Default)]
struct RuleValues {
    rate: Option<Decimal>,
    min: Option<Decimal>,
    max: Option<Decimal>,
    amount: Option<Decimal>,
    periods_per_year: Option<u32>,
}

fn rule(
    jurisdiction: &str,
    rule_type: &str,
    values: RuleValues,
) -> Result<JurisdictionTaxRule, TaxTableLoaderError> {
    fn required<T>(
        value: Option<T>,
        jurisdiction: &str,
        rule_type: &'static str,
        field: &'static str,
    ) -> Result<T, TaxTableLoaderError> {
        value.ok_or_else(|| TaxTableLoaderError::MissingRuleField {
            jurisdiction: jurisdiction.to_string(),
            rule_type,
            field,
        })
    }

    match rule_type {
        "flat_percentage" => Ok(JurisdictionTaxRule::FlatPercentage {
            rate: required(values.rate, jurisdiction, "flat_percentage", "rate")?,
        }),
        "bounded_range" => Ok(JurisdictionTaxRule::BoundedRange {
            min: required(values.min, jurisdiction, "bounded_range", "min")?,
            max: required(values.max, jurisdiction, "bounded_range", "max")?,
        }),
        "flat_amount_per_period" => Ok(JurisdictionTaxRule::FlatAmountPerPeriod {
            amount: required(values.amount, jurisdiction, "flat_amount_per_period", "amount")?,
            periods_per_year: required(
                values.periods_per_year,
                jurisdiction,
                "flat_amount_per_period",
                "periods_per_year",
            )?,
        }),
        other => Err(TaxTableLoaderError::UnknownRuleType {
            jurisdiction: jurisdiction.to_string(),
            rule_type: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    const YEAR_CSV: &str = "tax_year,ss_wage_max,ss_tax_rate,medicare_tax_rate,additional_medicare_rate,additional_medicare_threshold
2024,168600,0.062,0.0145,0.009,200000
";

    const FEDERAL_CSV: &str = "min_income,max_income,base_tax,rate
0,11600,0,0.10
11600,,1160,0.12
";

    const STATE_CSV: &str = "state,flat_rate,has_local_tax,local_scheme,progressive,default_local_type,default_local_rate
Ohio,0.035,true,city,false,,
Michigan,0.042,true,city,false,flat_percentage,0.01
Texas,0.00,false,none,false,,
";

    const LOCAL_CSV: &str = "state,name,kind,rule_type,rate,min,max,amount,periods_per_year
Ohio,Columbus,city,flat_percentage,0.025,,,,
";

    const PROPERTY_CSV: &str = "state,county,rate
Texas,Travis,0.018
";

    const EMPTY_BRACKETS: &str = "state,min_income,max_income,base_tax,rate\n";
    const EMPTY_LOCAL: &str = "state,name,kind,rule_type,rate,min,max,amount,periods_per_year\n";
    const EMPTY_PROPERTY: &str = "state,county,rate\n";

    fn sources<'a>(
        state: &'a str,
        state_brackets: &'a str,
        local: &'a str,
        property: &'a str,
    ) -> TableSources<&'a [u8]> {
        TableSources {
            tax_year: YEAR_CSV.as_bytes(),
            federal_brackets: FEDERAL_CSV.as_bytes(),
            state_tax: state.as_bytes(),
            state_brackets: state_brackets.as_bytes(),
            local_tax: local.as_bytes(),
            property_tax: property.as_bytes(),
        }
    }

    fn schedule(bounds: &[(i64, Option<i64>)]) -> Vec<TaxBracket> {
        bounds
            .iter()
            .map(|(min, max)| {
                bracket(
                    Decimal::from(*min),
                    max.map(Decimal::from),
                    dec!(0.05),
                    dec!(0),
                )
            })
            .collect()
    }

    // =========================================================================
    // parse
    // =========================================================================

    #[test]
    fn test_parse_federal_unlimited_max_income() {
        let records: Vec<FederalBracketRecord> =
            TaxTableLoader::parse("federal_brackets.csv", FEDERAL_CSV.as_bytes())
                .expect("Failed to parse CSV");

        assert_eq!(records.len(), 2);
        assert_eq!(
            records[1],
            FederalBracketRecord {
                min_income: dec!(11600),
                max_income: None,
                base_tax: dec!(1160),
                rate: dec!(0.12),
            }
        );
    }

    #[test]
    fn test_parse_state_record_optional_default_rule() {
        let records: Vec<StateTaxRecord> =
            TaxTableLoader::parse("state_tax.csv", STATE_CSV.as_bytes())
                .expect("Failed to parse CSV");

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].default_local_type, "");
        assert_eq!(records[0].default_local_rate, None);
        assert_eq!(records[1].default_local_type, "flat_percentage");
        assert_eq!(records[1].default_local_rate, Some(dec!(0.01)));
        assert!(!records[2].has_local_tax);
    }

    #[test]
    fn test_parse_local_flat_amount_record() {
        let csv = "state,name,kind,rule_type,rate,min,max,amount,periods_per_year
West Virginia,Charleston,city,flat_amount_per_period,,,,4,26";

        let records: Vec<LocalTaxRecord> =
            TaxTableLoader::parse("local_tax.csv", csv.as_bytes()).expect("Failed to parse CSV");

        assert_eq!(records[0].rate, None);
        assert_eq!(records[0].amount, Some(dec!(4)));
        assert_eq!(records[0].periods_per_year, Some(26));
    }

    #[test]
    fn test_parse_invalid_csv_missing_column() {
        let csv = "min_income,max_income\n0,11600";

        let result: Result<Vec<FederalBracketRecord>, _> =
            TaxTableLoader::parse("federal_brackets.csv", csv.as_bytes());

        let err = result.expect_err("Should fail for missing column");
        let TaxTableLoaderError::CsvParse(msg) = err else {
            panic!("Expected CsvParse error, got: {:?}", err);
        };
        assert!(
            msg.contains("missing field") && msg.starts_with("federal_brackets.csv"),
            "Expected file name and 'missing field' in error, got: {}",
            msg
        );
    }

    #[test]
    fn test_parse_invalid_csv_bad_decimal() {
        let csv = "state,county,rate\nOhio,Franklin,abc";

        let result: Result<Vec<PropertyTaxRecord>, _> =
            TaxTableLoader::parse("property_tax.csv", csv.as_bytes());

        assert!(matches!(result, Err(TaxTableLoaderError::CsvParse(_))));
    }

    // =========================================================================
    // load
    // =========================================================================

    #[test]
    fn test_load_builds_tables() {
        let tables = TaxTableLoader::load(sources(
            STATE_CSV,
            EMPTY_BRACKETS,
            LOCAL_CSV,
            PROPERTY_CSV,
        ))
        .expect("Failed to load");

        assert_eq!(tables.tax_year(), 2024);
        assert_eq!(tables.federal_brackets.len(), 2);
        assert_eq!(tables.state_names().count(), 3);
        assert_eq!(
            tables.local_rule("Ohio", JurisdictionKind::City, "Columbus"),
            Some(&JurisdictionTaxRule::FlatPercentage { rate: dec!(0.025) })
        );
        assert_eq!(
            tables.state("Michigan").and_then(|p| p.default_local_rule.clone()),
            Some(JurisdictionTaxRule::FlatPercentage { rate: dec!(0.01) })
        );
        assert_eq!(
            tables.property_tax_rate("Texas", Some("Travis")).map(|l| l.rate),
            Some(dec!(0.018))
        );
    }

    #[test]
    fn test_load_progressive_state_uses_brackets() {
        let state = "state,flat_rate,has_local_tax,local_scheme,progressive,default_local_type,default_local_rate
New York,0.065,true,city,true,,
";
        let brackets = "state,min_income,max_income,base_tax,rate
New York,0,8500,0,0.04
New York,8500,,340,0.045
";

        let tables = TaxTableLoader::load(sources(state, brackets, EMPTY_LOCAL, EMPTY_PROPERTY))
            .expect("Failed to load");

        let profile = tables.state("New York").expect("New York loaded");
        assert_eq!(profile.flat_rate, dec!(0.065));
        let JurisdictionTaxRule::ProgressiveWithBase { brackets } = &profile.income_tax else {
            panic!("expected progressive rule, got {:?}", profile.income_tax);
        };
        assert_eq!(brackets.len(), 2);
    }

    #[test]
    fn test_load_progressive_state_without_brackets_fails() {
        let state = "state,flat_rate,has_local_tax,local_scheme,progressive,default_local_type,default_local_rate
New York,0.065,true,city,true,,
";

        let err = TaxTableLoader::load(sources(state, EMPTY_BRACKETS, EMPTY_LOCAL, EMPTY_PROPERTY))
            .expect_err("Should fail without a schedule");

        assert!(matches!(
            err,
            TaxTableLoaderError::MissingProgressiveSchedule(ref s) if s == "New York"
        ));
    }

    #[test]
    fn test_load_rejects_duplicate_state() {
        let state = "state,flat_rate,has_local_tax,local_scheme,progressive,default_local_type,default_local_rate
Texas,0.00,false,none,false,,
Texas,0.00,false,none,false,,
";

        let err = TaxTableLoader::load(sources(state, EMPTY_BRACKETS, EMPTY_LOCAL, EMPTY_PROPERTY))
            .expect_err("Should reject duplicates");

        assert!(matches!(
            err,
            TaxTableLoaderError::Duplicate { table: "state_tax", .. }
        ));
    }

    #[test]
    fn test_load_rejects_duplicate_county() {
        let property = "state,county,rate\nTexas,Travis,0.018\nTexas,Travis,0.019\n";

        let err = TaxTableLoader::load(sources(STATE_CSV, EMPTY_BRACKETS, LOCAL_CSV, property))
            .expect_err("Should reject duplicates");

        match err {
            TaxTableLoaderError::Duplicate { table, key } => {
                assert_eq!(table, "property_tax");
                assert_eq!(key, "Travis, Texas");
            }
            other => panic!("expected Duplicate, got {other:?}"),
        }
    }

    #[test]
    fn test_load_rejects_local_row_for_unknown_state() {
        let local = "state,name,kind,rule_type,rate,min,max,amount,periods_per_year
Atlantis,Poseidonia,city,flat_percentage,0.01,,,,
";

        let err = TaxTableLoader::load(sources(STATE_CSV, EMPTY_BRACKETS, local, PROPERTY_CSV))
            .expect_err("Should reject unknown state");

        assert!(matches!(err, TaxTableLoaderError::UnknownState(ref s) if s == "Atlantis"));
    }

    #[test]
    fn test_load_rejects_unknown_scheme() {
        let state = "state,flat_rate,has_local_tax,local_scheme,progressive,default_local_type,default_local_rate
Texas,0.00,true,borough,false,,
";

        let err = TaxTableLoader::load(sources(state, EMPTY_BRACKETS, EMPTY_LOCAL, EMPTY_PROPERTY))
            .expect_err("Should reject scheme");

        assert!(matches!(err, TaxTableLoaderError::UnknownScheme { .. }));
    }

    #[test]
    fn test_load_requires_single_tax_year_row() {
        let mut s = sources(STATE_CSV, EMPTY_BRACKETS, LOCAL_CSV, PROPERTY_CSV);
        let two_years = format!("{YEAR_CSV}2025,176100,0.062,0.0145,0.009,200000\n");
        s.tax_year = two_years.as_bytes();

        let err = TaxTableLoader::load(s).expect_err("Should reject two rows");

        assert!(matches!(err, TaxTableLoaderError::TaxYearRowCount(2)));
    }

    // =========================================================================
    // rules
    // =========================================================================

    #[test]
    fn test_rule_bounded_range() {
        let values = RuleValues {
            min: Some(dec!(0.01)),
            max: Some(dec!(0.03)),
            ..RuleValues::default()
        };

        let rule = rule("Allegheny, Pennsylvania", "bounded_range", values).expect("valid rule");

        assert_eq!(
            rule,
            JurisdictionTaxRule::BoundedRange {
                min: dec!(0.01),
                max: dec!(0.03),
            }
        );
    }

    #[test]
    fn test_rule_missing_field() {
        let values = RuleValues {
            amount: Some(dec!(4)),
            ..RuleValues::default()
        };

        let err = rule("Charleston, West Virginia", "flat_amount_per_period", values)
            .expect_err("periods are required");

        assert_eq!(
            err.to_string(),
            "Charleston, West Virginia: rule 'flat_amount_per_period' is missing 'periods_per_year'"
        );
    }

    #[test]
    fn test_rule_unknown_type() {
        let err = rule("Somewhere", "sliding_scale", RuleValues::default())
            .expect_err("unknown type");

        assert!(matches!(err, TaxTableLoaderError::UnknownRuleType { .. }));
    }

    // =========================================================================
    // check_partition
    // =========================================================================

    #[test]
    fn test_partition_accepts_contiguous_schedule() {
        let brackets = schedule(&[(0, Some(100)), (100, Some(200)), (200, None)]);

        assert!(check_partition("test", &brackets).is_ok());
    }

    #[test]
    fn test_partition_rejects_gap() {
        let brackets = schedule(&[(0, Some(100)), (150, None)]);

        let err = check_partition("test", &brackets).expect_err("gap");

        assert_eq!(
            err.to_string(),
            "test schedule is invalid: bracket ending at 100 is followed by one starting at 150"
        );
    }

    #[test]
    fn test_partition_rejects_overlap() {
        let brackets = schedule(&[(0, Some(100)), (90, None)]);

        assert!(check_partition("test", &brackets).is_err());
    }

    #[test]
    fn test_partition_rejects_nonzero_start() {
        let brackets = schedule(&[(10, None)]);

        assert!(check_partition("test", &brackets).is_err());
    }

    #[test]
    fn test_partition_rejects_bounded_top() {
        let brackets = schedule(&[(0, Some(100))]);

        let err = check_partition("test", &brackets).expect_err("bounded top");

        assert_eq!(err.to_string(), "test schedule is invalid: top bracket is bounded");
    }

    #[test]
    fn test_partition_rejects_early_unbounded_bracket() {
        let brackets = schedule(&[(0, None), (100, None)]);

        assert!(check_partition("test", &brackets).is_err());
    }

    #[test]
    fn test_partition_rejects_empty_schedule() {
        assert!(check_partition("test", &[]).is_err());
    }
}
