//! Field validation for raw, user-typed input.
//!
//! Each `validate_*` predicate inspects one field and returns the message to
//! show next to it, or `None` when the field is acceptable. [`Validator`]
//! runs every applicable predicate, collects all failures into a
//! [`ValidationErrors`] map and only builds a [`CalculationRequest`] when the
//! map is empty.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::AffordabilityConfig;
use crate::models::{
    CalculationMode, CalculationRequest, DownPayment, HousingScenario, IncomeInput, PayFrequency,
    TaxRequest, TaxTables,
};
use crate::utils::parse_optional_decimal;

/// Input field a validation message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Income,
    MonthlyTakeHome,
    PayFrequency,
    State,
    Locality,
    MonthlyDebts,
    HomePrice,
    DownPaymentType,
    DownPaymentPercent,
    DownPaymentAmount,
    InterestRate,
    LoanTerm,
    AnnualInsurance,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::MonthlyTakeHome => "monthly_take_home",
            Self::PayFrequency => "pay_frequency",
            Self::State => "state",
            Self::Locality => "locality",
            Self::MonthlyDebts => "monthly_debts",
            Self::HomePrice => "home_price",
            Self::DownPaymentType => "down_payment_type",
            Self::DownPaymentPercent => "down_payment_percent",
            Self::DownPaymentAmount => "down_payment_amount",
            Self::InterestRate => "interest_rate",
            Self::LoanTerm => "loan_term",
            Self::AnnualInsurance => "annual_insurance",
        }
    }
}

/// Field-to-message map, ordered by field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors(BTreeMap<Field, String>);

impl ValidationErrors {
    pub fn insert(
        &mut self,
        field: Field,
        message: impl Into<String>,
    ) {
        self.0.insert(field, message.into());
    }

    pub fn get(
        &self,
        field: Field,
    ) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(f, m)| (*f, m.as_str()))
    }

    fn check(
        &mut self,
        field: Field,
        message: Option<String>,
    ) {
        if let Some(message) = message {
            self.insert(field, message);
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", field.as_str(), message)?;
            first = false;
        }
        Ok(())
    }
}

/// Which representation the down payment was entered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownPaymentKind {
    Percent,
    Amount,
}

impl DownPaymentKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "percent" | "" => Some(Self::Percent),
            "amount" => Some(Self::Amount),
            _ => None,
        }
    }
}

/// Calculation input exactly as typed; every number is still text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawCalculationInput {
    pub analyze_home: bool,
    pub income: String,
    pub pay_frequency: String,
    pub use_take_home: bool,
    pub monthly_take_home: String,
    pub state: String,
    pub locality: String,
    pub monthly_debts: String,
    pub home_price: String,
    pub down_payment_type: String,
    pub down_payment_percent: String,
    pub down_payment_amount: String,
    pub interest_rate: String,
    pub loan_term_years: String,
    pub include_insurance: bool,
    pub annual_insurance: String,
    pub is_fha: bool,
}

/// Largest money amount any field accepts. Every product the engine forms
/// from amounts up to this stays inside `Decimal` range.
pub const MAX_AMOUNT: Decimal = dec!(1000000000000);

/// Message for an amount above [`MAX_AMOUNT`], `None` otherwise.
fn over_limit(
    value: Decimal,
    what: &str,
) -> Option<String> {
    (value > MAX_AMOUNT).then(|| format!("{what} cannot exceed $1,000,000,000,000"))
}

/// Parses `s` and checks it with `ok`, mapping blank, unparseable and
/// rejected input to the given messages.
fn check_number(
    s: &str,
    required: &str,
    invalid: &str,
    ok: impl Fn(Decimal) -> bool,
) -> Option<String> {
    match parse_optional_decimal(s) {
        Ok(None) => Some(required.to_string()),
        Ok(Some(value)) if ok(value) => None,
        _ => Some(invalid.to_string()),
    }
}

pub fn validate_income(income: &str) -> Option<String> {
    check_number(
        income,
        "Income is required",
        "Please enter a valid income amount",
        |v| v > Decimal::ZERO,
    )
    .or_else(|| over_limit(number(income), "Income"))
}

pub fn validate_monthly_take_home(take_home: &str) -> Option<String> {
    check_number(
        take_home,
        "Monthly take-home pay is required",
        "Please enter a valid monthly take-home amount",
        |v| v > Decimal::ZERO,
    )
    .or_else(|| over_limit(number(take_home), "Monthly take-home pay"))
}

pub fn validate_pay_frequency(frequency: &str) -> Option<String> {
    if frequency.trim().is_empty() {
        return Some("Pay type is required".to_string());
    }
    match PayFrequency::parse(frequency) {
        Some(_) => None,
        None => Some("Please select a valid pay type".to_string()),
    }
}

pub fn validate_state(
    tables: &TaxTables,
    state: &str,
) -> Option<String> {
    if state.trim().is_empty() {
        return Some("State selection is required".to_string());
    }
    match tables.state(state.trim()) {
        Some(_) => None,
        None => Some("Please select a valid state".to_string()),
    }
}

/// Locality is only checked for states that levy local tax.
pub fn validate_locality(
    tables: &TaxTables,
    state: &str,
    locality: &str,
) -> Option<String> {
    let state = state.trim();
    let profile = tables.state(state).filter(|p| p.has_local_tax)?;
    let label = profile.local_scheme.locality_label();

    let locality = locality.trim();
    if locality.is_empty() {
        return Some(format!("Please select a {label}"));
    }
    if !tables.is_known_locality(state, locality) {
        return Some(format!("Please select a valid {label}"));
    }
    None
}

pub fn validate_monthly_debts(debts: &str) -> Option<String> {
    match parse_optional_decimal(debts) {
        Ok(None) => None,
        Ok(Some(value)) if value >= Decimal::ZERO => over_limit(value, "Monthly debts"),
        _ => Some("Monthly debts must be a positive number or zero".to_string()),
    }
}

pub fn validate_home_price(price: &str) -> Option<String> {
    check_number(
        price,
        "Home price is required",
        "Please enter a valid home price",
        |v| v > Decimal::ZERO,
    )
    .or_else(|| over_limit(number(price), "Home price"))
}

pub fn validate_down_payment_percent(percent: &str) -> Option<String> {
    check_number(
        percent,
        "Down payment percentage is required",
        "Down payment must be between 0% and 100%",
        |v| v >= Decimal::ZERO && v <= Decimal::ONE_HUNDRED,
    )
}

pub fn validate_down_payment_amount(amount: &str) -> Option<String> {
    let message = "Please enter a valid down payment amount";
    check_number(amount, message, message, |v| v >= Decimal::ZERO)
        .or_else(|| over_limit(number(amount), "Down payment"))
}

pub fn validate_interest_rate(rate: &str) -> Option<String> {
    check_number(
        rate,
        "Interest rate is required",
        "Interest rate must be between 0% and 30%",
        |v| v >= Decimal::ZERO && v <= Decimal::from(30),
    )
}

pub fn validate_loan_term(term: &str) -> Option<String> {
    let term = term.trim();
    if term.is_empty() {
        return Some("Loan term is required".to_string());
    }
    match term.parse::<u32>() {
        Ok(years) if (1..=50).contains(&years) => None,
        _ => Some("Loan term must be between 1 and 50 years".to_string()),
    }
}

/// Blank insurance falls back to the configured default, so only a present
/// value is checked.
pub fn validate_annual_insurance(insurance: &str) -> Option<String> {
    match parse_optional_decimal(insurance) {
        Ok(None) => None,
        Ok(Some(value)) if value >= Decimal::ZERO => over_limit(value, "Annual insurance"),
        _ => Some("Please enter a valid insurance amount".to_string()),
    }
}

/// Parses a field that already passed its check; blank is zero.
fn number(s: &str) -> Decimal {
    parse_optional_decimal(s)
        .ok()
        .flatten()
        .unwrap_or(Decimal::ZERO)
}

/// Turns raw input into a [`CalculationRequest`], or every reason it cannot.
#[derive(Debug, Clone, Copy)]
pub struct Validator<'a> {
    tables: &'a TaxTables,
    config: &'a AffordabilityConfig,
}

impl<'a> Validator<'a> {
    pub fn new(
        tables: &'a TaxTables,
        config: &'a AffordabilityConfig,
    ) -> Self {
        Self { tables, config }
    }

    /// Checks the income and location fields only.
    pub fn tax_errors(
        &self,
        raw: &RawCalculationInput,
    ) -> ValidationErrors {
        let mut errors = ValidationErrors::default();

        if raw.use_take_home {
            errors.check(
                Field::MonthlyTakeHome,
                validate_monthly_take_home(&raw.monthly_take_home),
            );
        } else {
            errors.check(Field::Income, validate_income(&raw.income));
            errors.check(Field::PayFrequency, validate_pay_frequency(&raw.pay_frequency));
        }

        errors.check(Field::State, validate_state(self.tables, &raw.state));
        errors.check(
            Field::Locality,
            validate_locality(self.tables, &raw.state, &raw.locality),
        );

        errors
    }

    /// Runs every applicable field check.
    pub fn errors(
        &self,
        raw: &RawCalculationInput,
    ) -> ValidationErrors {
        let mut errors = self.tax_errors(raw);

        errors.check(Field::MonthlyDebts, validate_monthly_debts(&raw.monthly_debts));

        if raw.analyze_home {
            errors.check(Field::HomePrice, validate_home_price(&raw.home_price));
        }

        if !raw.is_fha {
            match DownPaymentKind::parse(&raw.down_payment_type) {
                Some(DownPaymentKind::Percent) => errors.check(
                    Field::DownPaymentPercent,
                    validate_down_payment_percent(&raw.down_payment_percent),
                ),
                Some(DownPaymentKind::Amount) => errors.check(
                    Field::DownPaymentAmount,
                    validate_down_payment_amount(&raw.down_payment_amount),
                ),
                None => errors.insert(
                    Field::DownPaymentType,
                    "Please select a valid down payment type",
                ),
            }
        }

        errors.check(Field::InterestRate, validate_interest_rate(&raw.interest_rate));
        errors.check(Field::LoanTerm, validate_loan_term(&raw.loan_term_years));
        if raw.include_insurance {
            errors.check(
                Field::AnnualInsurance,
                validate_annual_insurance(&raw.annual_insurance),
            );
        }

        errors
    }

    /// Validates the income and location fields and converts them into a
    /// [`TaxRequest`]. Housing fields are ignored.
    pub fn validate_tax_request(
        &self,
        raw: &RawCalculationInput,
    ) -> Result<TaxRequest, ValidationErrors> {
        let errors = self.tax_errors(raw);
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(Self::tax_request(raw))
    }

    /// Builds the income and location part of a request from fields that
    /// already passed [`Validator::tax_errors`].
    fn tax_request(raw: &RawCalculationInput) -> TaxRequest {
        let income = if raw.use_take_home {
            IncomeInput::TakeHome {
                monthly: number(&raw.monthly_take_home),
            }
        } else {
            IncomeInput::Gross {
                amount: number(&raw.income),
                frequency: PayFrequency::parse(&raw.pay_frequency).unwrap_or(PayFrequency::Annual),
            }
        };

        TaxRequest {
            income,
            state: raw.state.trim().to_string(),
            locality: Some(raw.locality.trim())
                .filter(|l| !l.is_empty())
                .map(str::to_string),
        }
    }

    /// Validates `raw` and converts it into a typed request.
    ///
    /// # Errors
    ///
    /// Returns every failing field at once.
    pub fn validate(
        &self,
        raw: &RawCalculationInput,
    ) -> Result<CalculationRequest, ValidationErrors> {
        let errors = self.errors(raw);
        if !errors.is_empty() {
            return Err(errors);
        }

        let tax = Self::tax_request(raw);
        let down_payment = match DownPaymentKind::parse(&raw.down_payment_type) {
            Some(DownPaymentKind::Amount) => DownPayment::Amount(number(&raw.down_payment_amount)),
            _ => DownPayment::Percent(number(&raw.down_payment_percent)),
        };

        let annual_insurance = parse_optional_decimal(&raw.annual_insurance)
            .ok()
            .flatten()
            .unwrap_or(self.config.default_annual_insurance);

        Ok(CalculationRequest {
            mode: if raw.analyze_home {
                CalculationMode::AnalyzeHome
            } else {
                CalculationMode::MaxAffordable
            },
            income: tax.income,
            state: tax.state,
            locality: tax.locality,
            monthly_debts: number(&raw.monthly_debts),
            housing: HousingScenario {
                home_price: raw.analyze_home.then(|| number(&raw.home_price)),
                down_payment,
                loan_term_years: raw.loan_term_years.trim().parse().unwrap_or(30),
                interest_rate: number(&raw.interest_rate),
                include_insurance: raw.include_insurance,
                annual_insurance,
                is_fha: raw.is_fha,
            },
        })
    }
}
