//! CSV loader for batch affordability scenarios.
//!
//! ## CSV Format
//!
//! Headers are matched by name, so column order does not matter. Cells are
//! kept as text and checked later by the core validator, which reports bad
//! values per field instead of failing the whole file.
//!
//! | Column                 | Required | Notes                                        |
//! |------------------------|----------|----------------------------------------------|
//! | `label`                | no       | Echoed in the output                         |
//! | `mode`                 | no       | `max` (default) or `analyze`                 |
//! | `income`               | no*      | Gross income per pay period                  |
//! | `pay_frequency`        | no       | Defaults to `annual`                         |
//! | `monthly_take_home`    | no*      | Replaces `income` when present               |
//! | `state`                | yes      | Full state name                              |
//! | `locality`             | no       | City or county                               |
//! | `monthly_debts`        | no       |                                              |
//! | `home_price`           | no       | Required by the validator in `analyze` mode  |
//! | `down_payment_percent` | no       | Defaults to 20 when no amount is given       |
//! | `down_payment_amount`  | no       | Takes precedence over the percent            |
//! | `interest_rate`        | no       | Annual percent                               |
//! | `loan_term_years`      | no       | Defaults to 30                               |
//! | `include_insurance`    | no       | `true`/`false`, defaults to `true`           |
//! | `annual_insurance`     | no       | Defaults to the configured amount            |
//! | `is_fha`               | no       | `true`/`false`, defaults to `false`          |
//!
//! \* One of `income` or `monthly_take_home` must be filled in.
//!
//! ### Minimal example
//!
//! ```csv
//! state,income,interest_rate
//! Texas,120000,6.5
//! ```
use std::path::Path;

use afford_core::RawCalculationInput;
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Serde-compatible row that mirrors the CSV layout
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CsvRow {
    label: Option<String>,
    mode: Option<String>,
    income: Option<String>,
    pay_frequency: Option<String>,
    monthly_take_home: Option<String>,
    state: String,
    locality: Option<String>,
    monthly_debts: Option<String>,
    home_price: Option<String>,
    down_payment_percent: Option<String>,
    down_payment_amount: Option<String>,
    interest_rate: Option<String>,
    loan_term_years: Option<String>,
    include_insurance: Option<bool>,
    annual_insurance: Option<String>,
    is_fha: Option<bool>,
}

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// One row of a batch file, ready for validation.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchScenario {
    /// 1-based data row number (header = row 0).
    pub row: usize,
    pub label: Option<String>,
    pub input: RawCalculationInput,
}

/// Errors that can occur while loading a batch file.
#[derive(Debug, thiserror::Error)]
pub enum CsvLoadError {
    /// The file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The underlying CSV deserialisation failed (bad structure, a
    /// non-boolean flag, etc.).
    #[error("CSV parse error: {0}")]
    Parse(#[from] csv::Error),

    /// A `mode` cell was neither `max` nor `analyze`.
    #[error("unrecognised mode '{mode}' on row {row}")]
    InvalidMode { mode: String, row: usize },
}

// ---------------------------------------------------------------------------
// Core loader
// ---------------------------------------------------------------------------

fn filled(cell: Option<String>) -> String {
    cell.map(|s| s.trim().to_string()).unwrap_or_default()
}

/// Convert a single CSV row into a batch scenario.
fn convert_row(
    row: CsvRow,
    row_number: usize,
) -> Result<BatchScenario, CsvLoadError> {
    let mode = filled(row.mode);
    let analyze_home = match mode.to_ascii_lowercase().as_str() {
        "" | "max" => false,
        "analyze" => true,
        _ => {
            return Err(CsvLoadError::InvalidMode {
                mode,
                row: row_number,
            });
        }
    };

    let monthly_take_home = filled(row.monthly_take_home);
    let down_payment_amount = filled(row.down_payment_amount);
    let down_payment_type = if down_payment_amount.is_empty() {
        "percent"
    } else {
        "amount"
    };
    let down_payment_percent = match filled(row.down_payment_percent) {
        p if p.is_empty() => "20".to_string(),
        p => p,
    };
    let pay_frequency = match filled(row.pay_frequency) {
        f if f.is_empty() => "annual".to_string(),
        f => f,
    };
    let loan_term_years = match filled(row.loan_term_years) {
        t if t.is_empty() => "30".to_string(),
        t => t,
    };

    Ok(BatchScenario {
        row: row_number,
        label: row.label.filter(|l| !l.trim().is_empty()),
        input: RawCalculationInput {
            analyze_home,
            income: filled(row.income),
            pay_frequency,
            use_take_home: !monthly_take_home.is_empty(),
            monthly_take_home,
            state: row.state.trim().to_string(),
            locality: filled(row.locality),
            monthly_debts: filled(row.monthly_debts),
            home_price: filled(row.home_price),
            down_payment_type: down_payment_type.to_string(),
            down_payment_percent,
            down_payment_amount,
            interest_rate: filled(row.interest_rate),
            loan_term_years,
            include_insurance: row.include_insurance.unwrap_or(true),
            annual_insurance: filled(row.annual_insurance),
            is_fha: row.is_fha.unwrap_or(false),
        },
    })
}

/// Parse CSV text and return scenarios in file order.
///
/// # Errors
///
/// * [CsvLoadError::Parse] - if the CSV is structurally invalid.
/// * [CsvLoadError::InvalidMode] - if any row has an unknown mode.
pub fn load_from_str(input: &str) -> Result<Vec<BatchScenario>, CsvLoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(false)
        .from_reader(input.as_bytes());

    reader
        .deserialize::<CsvRow>()
        .enumerate()
        .map(|(idx, result)| {
            let row = result?;
            convert_row(row, idx + 1)
        })
        .collect()
}

/// Read a file from disk and delegate to [load_from_str].
pub fn load_from_file(path: &Path) -> Result<Vec<BatchScenario>, CsvLoadError> {
    let contents = std::fs::read_to_string(path).map_err(|source| CsvLoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let scenarios = load_from_str(&contents)?;
    tracing::debug!(path = %path.display(), rows = scenarios.len(), "loaded batch file");
    Ok(scenarios)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
