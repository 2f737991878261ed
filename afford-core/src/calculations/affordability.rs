//! Maximum home price search.
//!
//! The highest affordable price depends on costs that themselves depend on
//! the price: property tax and FHA annual premium are charged on the price,
//! and the cash brought to closing (down payment, closing costs, FHA upfront
//! premium) grows with it. The solver therefore works by fixed-point
//! iteration:
//!
//! 1. Seed with the closed-form price for zero cash and zero ownership costs
//!    beyond insurance.
//! 2. For up to [`MAX_ROUNDS`] rounds, compute the cash required at the
//!    current estimate and re-solve the closed form with that cash and the
//!    current estimate's ownership costs.
//! 3. Stop once an estimate moves by less than [`CONVERGENCE_THRESHOLD`].
//!
//! The closed form for a given cash amount `C` and price estimate `E` is:
//!
//! ```text
//! max_pi = limit - (E * property_tax_rate + insurance + FHA ? E * annual_mip : 0) / 12
//! price  = present_value(max_pi) + C
//! ```
//!
//! A fixed-amount down payment runs the same loop with `C` held at the
//! amount; closing costs are reported by the caller but not fed back.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::AffordabilityConfig;
use crate::calculations::common::round_half_up;
use crate::calculations::mortgage::{max_loan_for_payment, percent_to_amount};
use crate::error::AffordabilityError;
use crate::models::{DownPayment, SolverDiagnostics};

/// Refinement rounds after the seed estimate.
pub const MAX_ROUNDS: u32 = 10;

/// Estimates closer than this are considered converged.
pub const CONVERGENCE_THRESHOLD: Decimal = dec!(100);

/// Consecutive growing steps that stop the loop as diverging.
const DIVERGENCE_STREAK: u32 = 2;

/// Inputs to the maximum price search. Money amounts are monthly unless
/// named otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverInput {
    pub monthly_gross: Decimal,
    pub monthly_debts: Decimal,
    /// Annual percent.
    pub interest_rate: Decimal,
    pub term_years: u32,
    pub down_payment: DownPayment,
    /// Annual fraction of the home price.
    pub property_tax_rate: Decimal,
    /// Zero when insurance is excluded.
    pub annual_insurance: Decimal,
    pub is_fha: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverOutcome {
    pub home_price: Decimal,
    /// Monthly housing budget the price was solved against.
    pub housing_limit: Decimal,
    pub diagnostics: SolverDiagnostics,
}

/// Solves for the maximum affordable home price.
#[derive(Debug, Clone, Copy)]
pub struct AffordabilitySolver<'a> {
    config: &'a AffordabilityConfig,
}

impl<'a> AffordabilitySolver<'a> {
    pub fn new(config: &'a AffordabilityConfig) -> Self {
        Self { config }
    }

    /// Monthly amount available for all housing costs.
    ///
    /// Any debt switches from the front-end ratio to the back-end ratio less
    /// the debts; the two are never blended.
    pub fn housing_limit(
        &self,
        monthly_gross: Decimal,
        monthly_debts: Decimal,
    ) -> Decimal {
        if monthly_debts > Decimal::ZERO {
            monthly_gross * self.config.back_end_ratio - monthly_debts
        } else {
            monthly_gross * self.config.front_end_ratio
        }
    }

    /// Finds the highest home price whose costs fit the housing limit.
    ///
    /// # Errors
    ///
    /// Returns [`AffordabilityError::NotAffordable`] when ownership costs
    /// leave no room for principal and interest, or when the search ends on a
    /// non-positive price.
    ///
    /// # Examples
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use afford_core::AffordabilityConfig;
    /// use afford_core::DownPayment;
    /// use afford_core::calculations::{AffordabilitySolver, SolverInput};
    ///
    /// let config = AffordabilityConfig::default();
    /// let outcome = AffordabilitySolver::new(&config)
    ///     .solve_max_home_price(&SolverInput {
    ///         monthly_gross: dec!(10000),
    ///         monthly_debts: dec!(0),
    ///         interest_rate: dec!(6.5),
    ///         term_years: 30,
    ///         down_payment: DownPayment::Percent(dec!(20)),
    ///         property_tax_rate: dec!(0.011),
    ///         annual_insurance: dec!(1200),
    ///         is_fha: false,
    ///     })
    ///     .unwrap();
    ///
    /// assert_eq!(outcome.housing_limit, dec!(2800));
    /// assert!(outcome.diagnostics.converged);
    /// ```
    pub fn solve_max_home_price(
        &self,
        input: &SolverInput,
    ) -> Result<SolverOutcome, AffordabilityError> {
        let housing_limit = self.housing_limit(input.monthly_gross, input.monthly_debts);

        let mut estimate = self.max_price(input, housing_limit, Decimal::ZERO, Decimal::ZERO)?;
        debug!(seed = %estimate, housing_limit = %housing_limit, "max price seed");

        let mut diagnostics = SolverDiagnostics {
            rounds: 0,
            converged: false,
            diverged: false,
            last_step: Decimal::ZERO,
        };
        let mut previous_step: Option<Decimal> = None;
        let mut growth_streak = 0;

        for round in 1..=MAX_ROUNDS {
            let cash = self.cash_required(input, estimate);
            let next = self.max_price(input, housing_limit, cash, estimate)?;
            let step = (next - estimate).abs();
            estimate = next;

            diagnostics.rounds = round;
            diagnostics.last_step = step;
            debug!(round, estimate = %estimate, cash = %cash, step = %step, "max price round");

            if step < CONVERGENCE_THRESHOLD {
                diagnostics.converged = true;
                break;
            }

            if previous_step.is_some_and(|prev| step > prev) {
                growth_streak += 1;
            } else {
                growth_streak = 0;
            }
            if growth_streak >= DIVERGENCE_STREAK {
                diagnostics.diverged = true;
                warn!(round, step = %step, estimate = %estimate, "max price search diverging; stopping early");
                break;
            }
            previous_step = Some(step);
        }

        if !diagnostics.converged && !diagnostics.diverged {
            warn!(
                rounds = MAX_ROUNDS,
                last_step = %diagnostics.last_step,
                estimate = %estimate,
                "max price search did not converge; using last estimate"
            );
        }

        if estimate <= Decimal::ZERO {
            return Err(AffordabilityError::NotAffordable {
                max_pi_payment: Decimal::ZERO,
            });
        }

        Ok(SolverOutcome {
            home_price: estimate,
            housing_limit: round_half_up(housing_limit),
            diagnostics,
        })
    }

    /// Monthly costs of owning at `home_price` other than principal and
    /// interest.
    pub fn monthly_ownership_costs(
        &self,
        home_price: Decimal,
        property_tax_rate: Decimal,
        annual_insurance: Decimal,
        is_fha: bool,
    ) -> Decimal {
        let twelve = Decimal::from(12);
        let mut costs = home_price * property_tax_rate / twelve + annual_insurance / twelve;
        if is_fha {
            costs += home_price * self.config.annual_mip_rate / twelve;
        }
        costs
    }

    /// Closing costs at `home_price`, plus the FHA upfront premium on the loan.
    pub fn closing_costs(
        &self,
        home_price: Decimal,
        loan_amount: Decimal,
        is_fha: bool,
    ) -> (Decimal, Decimal) {
        let closing = round_half_up(home_price * self.config.closing_cost_rate);
        let upfront_mip = if is_fha {
            round_half_up(loan_amount * self.config.upfront_mip_rate)
        } else {
            Decimal::ZERO
        };
        (closing, upfront_mip)
    }

    /// Cash fed back into the closed form at `home_price`.
    fn cash_required(
        &self,
        input: &SolverInput,
        home_price: Decimal,
    ) -> Decimal {
        match input.down_payment {
            DownPayment::Amount(amount) => amount,
            DownPayment::Percent(percent) => {
                let down = round_half_up(percent_to_amount(home_price, percent));
                let (closing, upfront_mip) =
                    self.closing_costs(home_price, home_price - down, input.is_fha);
                down + closing + upfront_mip
            }
        }
    }

    /// Closed-form price for a fixed cash amount and price estimate.
    fn max_price(
        &self,
        input: &SolverInput,
        housing_limit: Decimal,
        cash: Decimal,
        price_estimate: Decimal,
    ) -> Result<Decimal, AffordabilityError> {
        let ownership = self.monthly_ownership_costs(
            price_estimate,
            input.property_tax_rate,
            input.annual_insurance,
            input.is_fha,
        );
        let max_pi = housing_limit - ownership;
        if max_pi <= Decimal::ZERO {
            return Err(AffordabilityError::NotAffordable {
                max_pi_payment: round_half_up(max_pi),
            });
        }

        let loan = max_loan_for_payment(max_pi, input.interest_rate, input.term_years);
        Ok(loan + cash)
    }
}
