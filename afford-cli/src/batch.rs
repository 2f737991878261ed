//! Runs batch scenarios through the validator and calculator.

use afford_core::calculations::AffordabilityCalculator;
use afford_core::{AffordabilityConfig, AffordabilityError, TaxTables, Validator};
use tracing::{debug, warn};

use crate::csv_loader::BatchScenario;
use crate::report::BatchOutcome;

/// Evaluates every scenario independently. A failing row never stops the
/// rows after it.
pub fn run_batch(
    tables: &TaxTables,
    config: &AffordabilityConfig,
    scenarios: &[BatchScenario],
) -> Vec<BatchOutcome> {
    let validator = Validator::new(tables, config);
    let calculator = AffordabilityCalculator::new(tables, config);

    scenarios
        .iter()
        .map(|scenario| {
            let outcome = validator
                .validate(&scenario.input)
                .map_err(AffordabilityError::from)
                .and_then(|request| calculator.calculate(&request));

            match outcome {
                Ok(result) => {
                    debug!(row = scenario.row, price = %result.home_price, "batch row done");
                    BatchOutcome {
                        row: scenario.row,
                        label: scenario.label.clone(),
                        result: Some(result),
                        error: None,
                    }
                }
                Err(e) => {
                    warn!(row = scenario.row, "batch row failed: {e}");
                    BatchOutcome {
                        row: scenario.row,
                        label: scenario.label.clone(),
                        result: None,
                        error: Some(e.to_string()),
                    }
                }
            }
        })
        .collect()
}

/// Whether any row failed.
pub fn has_failures(outcomes: &[BatchOutcome]) -> bool {
    outcomes.iter().any(|o| o.error.is_some())
}
