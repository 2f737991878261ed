//! Built-in reference tables for the affordability engine.
//!
//! The tables live in six CSV files under `data/`:
//!
//! | File | Contents |
//! |------|----------|
//! | `tax_year.csv` | Payroll tax constants (one row) |
//! | `federal_brackets.csv` | Federal schedule for a single filer |
//! | `state_tax.csv` | One row per state: rate, local scheme, default local rule |
//! | `state_brackets.csv` | Progressive state schedules |
//! | `local_tax.csv` | City and county income tax rules |
//! | `property_tax.csv` | Effective property tax rate per county |
//!
//! [`load_embedded`] uses the copies compiled into the binary;
//! [`load_from_dir`] reads the same file names from disk.

mod loader;

use std::fs::File;
use std::path::{Path, PathBuf};

use afford_core::TaxTables;

pub use loader::{
    FederalBracketRecord, LocalTaxRecord, PropertyTaxRecord, StateBracketRecord, StateTaxRecord,
    TableSources, TaxTableLoader, TaxTableLoaderError, TaxYearRecord,
};

/// File names every data directory must contain.
pub const DATA_FILES: [&str; 6] = [
    "tax_year.csv",
    "federal_brackets.csv",
    "state_tax.csv",
    "state_brackets.csv",
    "local_tax.csv",
    "property_tax.csv",
];

const TAX_YEAR_CSV: &str = include_str!("../data/tax_year.csv");
const FEDERAL_BRACKETS_CSV: &str = include_str!("../data/federal_brackets.csv");
const STATE_TAX_CSV: &str = include_str!("../data/state_tax.csv");
const STATE_BRACKETS_CSV: &str = include_str!("../data/state_brackets.csv");
const LOCAL_TAX_CSV: &str = include_str!("../data/local_tax.csv");
const PROPERTY_TAX_CSV: &str = include_str!("../data/property_tax.csv");

/// Errors from [`load_from_dir`].
#[derive(Debug, thiserror::Error)]
pub enum DataDirError {
    #[error("failed to open {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Load(#[from] TaxTableLoaderError),
}

/// Tables compiled into the crate (tax year 2024).
///
/// # Example
///
/// ```
/// let tables = afford_data::load_embedded().expect("built-in tables are valid");
///
/// assert_eq!(tables.tax_year(), 2024);
/// assert!(tables.state("Ohio").is_some());
/// ```
pub fn load_embedded() -> Result<TaxTables, TaxTableLoaderError> {
    TaxTableLoader::load(TableSources {
        tax_year: TAX_YEAR_CSV.as_bytes(),
        federal_brackets: FEDERAL_BRACKETS_CSV.as_bytes(),
        state_tax: STATE_TAX_CSV.as_bytes(),
        state_brackets: STATE_BRACKETS_CSV.as_bytes(),
        local_tax: LOCAL_TAX_CSV.as_bytes(),
        property_tax: PROPERTY_TAX_CSV.as_bytes(),
    })
}

/// Reads the [`DATA_FILES`] from `dir`.
pub fn load_from_dir(dir: &Path) -> Result<TaxTables, DataDirError> {
    let open = |name: &str| {
        let path = dir.join(name);
        File::open(&path).map_err(|source| DataDirError::Io { path, source })
    };

    let tables = TaxTableLoader::load(TableSources {
        tax_year: open(DATA_FILES[0])?,
        federal_brackets: open(DATA_FILES[1])?,
        state_tax: open(DATA_FILES[2])?,
        state_brackets: open(DATA_FILES[3])?,
        local_tax: open(DATA_FILES[4])?,
        property_tax: open(DATA_FILES[5])?,
    })?;
    tracing::info!(dir = %dir.display(), tax_year = tables.tax_year(), "loaded tax tables from disk");
    Ok(tables)
}
