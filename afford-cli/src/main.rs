use std::path::{Path, PathBuf};
use std::process::ExitCode;

use afford_cli::args::{IncomeArgs, ScenarioArgs};
use afford_cli::batch::{has_failures, run_batch};
use afford_cli::config::Settings;
use afford_cli::report::{
    TaxReport, render_batch, render_json, render_localities, render_result, render_taxes,
    render_validation_errors,
};
use afford_cli::{csv_loader, logging};
use afford_core::calculations::{AffordabilityCalculator, TaxEngine, income};
use afford_core::{
    AffordabilityConfig, AffordabilityError, NOT_AFFORDABLE_MESSAGE, RawCalculationInput,
    TaxTables, Validator,
};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Home affordability estimator.
///
/// Works out the most expensive home a household can carry, or checks a
/// specific price, after income taxes.
#[derive(Debug, Parser)]
#[command(name = "afford", version)]
struct Cli {
    /// TOML settings file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory with tax table CSVs; the built-in tables are used otherwise.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Print JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    /// Log level or filter directive; overrides the settings file.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Also write log records to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Find the highest home price the household can afford.
    Max(ScenarioArgs),
    /// Check whether a specific home price fits the budget.
    Analyze {
        #[arg(long)]
        home_price: String,
        #[command(flatten)]
        scenario: ScenarioArgs,
    },
    /// Estimate income taxes and take-home pay.
    Taxes(IncomeArgs),
    /// Run every scenario in a CSV file.
    Batch {
        #[arg(long)]
        file: PathBuf,
    },
    /// List the cities and counties known for a state.
    Localities {
        #[arg(long)]
        state: String,
    },
}

// ─── setup ───────────────────────────────────────────────────────────────────

fn load_tables(data_dir: Option<&Path>) -> Result<TaxTables> {
    let tables = match data_dir {
        Some(dir) => afford_data::load_from_dir(dir)
            .with_context(|| format!("failed loading tax tables from {}", dir.display()))?,
        None => afford_data::load_embedded().context("built-in tax tables are invalid")?,
    };
    debug!(
        tax_year = tables.tax_year(),
        states = tables.state_names().count(),
        "tax tables ready"
    );
    Ok(tables)
}

fn emit(
    json: bool,
    text: impl FnOnce() -> String,
    value: &impl serde::Serialize,
) -> Result<()> {
    if json {
        println!("{}", render_json(value)?);
    } else {
        print!("{}", text());
    }
    Ok(())
}

// ─── commands ────────────────────────────────────────────────────────────────

fn calculate(
    tables: &TaxTables,
    config: &AffordabilityConfig,
    raw: &RawCalculationInput,
    json: bool,
) -> Result<ExitCode> {
    let request = match Validator::new(tables, config).validate(raw) {
        Ok(request) => request,
        Err(errors) => {
            if json {
                println!("{}", render_json(&errors)?);
            } else {
                eprint!("{}", render_validation_errors(&errors));
            }
            return Ok(ExitCode::from(2));
        }
    };

    match AffordabilityCalculator::new(tables, config).calculate(&request) {
        Ok(result) => {
            info!(
                mode = result.mode.as_str(),
                price = %result.home_price,
                payment = %result.total_monthly_payment,
                "calculation complete"
            );
            emit(json, || render_result(&result), &result)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(AffordabilityError::NotAffordable { max_pi_payment }) => {
            debug!(%max_pi_payment, "no room for a mortgage payment");
            eprintln!("{NOT_AFFORDABLE_MESSAGE}");
            Ok(ExitCode::from(3))
        }
        Err(e) => Err(e.into()),
    }
}

fn taxes(
    tables: &TaxTables,
    config: &AffordabilityConfig,
    args: &IncomeArgs,
    json: bool,
) -> Result<ExitCode> {
    let request = match Validator::new(tables, config).validate_tax_request(&args.to_raw()) {
        Ok(request) => request,
        Err(errors) => {
            eprint!("{}", render_validation_errors(&errors));
            return Ok(ExitCode::from(2));
        }
    };

    let (summary, burden) = income::summarize(
        &request.income,
        config.take_home_gross_up,
        &TaxEngine::new(tables),
        &request.state,
        request.locality.as_deref(),
    );
    let report = TaxReport {
        state: request.state,
        locality: request.locality,
        income: summary,
        taxes: burden,
    };
    emit(json, || render_taxes(&report), &report)?;
    Ok(ExitCode::SUCCESS)
}

fn batch(
    tables: &TaxTables,
    config: &AffordabilityConfig,
    file: &Path,
    json: bool,
) -> Result<ExitCode> {
    let scenarios = csv_loader::load_from_file(file)?;
    info!(rows = scenarios.len(), file = %file.display(), "running batch");

    let outcomes = run_batch(tables, config, &scenarios);
    emit(json, || render_batch(&outcomes), &outcomes)?;

    Ok(if has_failures(&outcomes) {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn localities(
    tables: &TaxTables,
    state: &str,
    json: bool,
) -> Result<ExitCode> {
    let Some(profile) = tables.state(state) else {
        eprintln!("Unknown state: {state}");
        return Ok(ExitCode::from(2));
    };
    let names = tables.localities(state);
    let label = profile.local_scheme.locality_label();
    emit(json, || render_localities(state, label, &names), &names)?;
    Ok(ExitCode::SUCCESS)
}

// ─── entry point ─────────────────────────────────────────────────────────────

fn run(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.log_level.as_deref().unwrap_or("warn"));

    let settings = Settings::load(cli.config.as_deref())?;
    if cli.log_level.is_none() && std::env::var_os("RUST_LOG").is_none() {
        logging::set_log_level(&settings.logging.level)?;
    }
    if let Some(file) = cli.log_file.as_deref().or(settings.logging.file.as_deref()) {
        logging::enable_file_logging(file)?;
    }

    let tables = load_tables(cli.data_dir.as_deref())?;
    let config = &settings.affordability;

    match &cli.command {
        Commands::Max(scenario) => calculate(
            &tables,
            config,
            &scenario.to_raw(None, config),
            cli.json,
        ),
        Commands::Analyze {
            home_price,
            scenario,
        } => calculate(
            &tables,
            config,
            &scenario.to_raw(Some(home_price.as_str()), config),
            cli.json,
        ),
        Commands::Taxes(args) => taxes(&tables, config, args, cli.json),
        Commands::Batch { file } => batch(&tables, config, file, cli.json),
        Commands::Localities { state } => localities(&tables, state, cli.json),
    }
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
