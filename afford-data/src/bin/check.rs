use std::path::PathBuf;

use afford_data::{DATA_FILES, load_embedded, load_from_dir};
use anyhow::{Context, Result};
use clap::Parser;

/// Validate a directory of tax table CSV files.
///
/// The directory must contain:
/// - tax_year.csv: payroll tax constants
/// - federal_brackets.csv: federal schedule
/// - state_tax.csv: one row per state
/// - state_brackets.csv: progressive state schedules
/// - local_tax.csv: city and county rules
/// - property_tax.csv: county property tax rates
///
/// Without `--dir` the built-in tables are checked.
#[derive(Parser, Debug)]
#[command(name = "afford-data-check")]
#[command(version, about, long_about = None)]
struct Args {
    /// Directory containing the CSV files
    #[arg(short, long)]
    dir: Option<PathBuf>,

    /// List every state with its locality count
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let tables = match &args.dir {
        Some(dir) => {
            println!("Checking {} files in: {}", DATA_FILES.len(), dir.display());
            load_from_dir(dir).with_context(|| format!("Invalid tax tables in: {}", dir.display()))?
        }
        None => {
            println!("Checking built-in tables");
            load_embedded().context("Built-in tax tables are invalid")?
        }
    };

    let states: Vec<&str> = tables.state_names().collect();
    println!(
        "Tax year {}: {} states, {} federal brackets.",
        tables.tax_year(),
        states.len(),
        tables.federal_brackets.len()
    );

    if args.verbose {
        for state in states {
            println!("  {state}: {} localities", tables.localities(state).len());
        }
    }

    Ok(())
}
