//! Text and JSON renderings of calculation results.

use std::fmt::Write;

use afford_core::{
    AffordabilityResult, CalculationMode, IncomeSummary, TaxBurden, ValidationErrors,
};
use anyhow::Result;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

pub fn render_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Result of one batch row. Exactly one of `result` and `error` is set.
#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
    pub row: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<AffordabilityResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Income figures plus the tax layers behind them, as printed by `taxes`.
#[derive(Debug, Clone, Serialize)]
pub struct TaxReport {
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locality: Option<String>,
    pub income: IncomeSummary,
    pub taxes: TaxBurden,
}

/// `$1,234.56`, with a leading minus for negatives.
pub fn money(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let text = format!("{:.2}", rounded.abs());
    let (whole, cents) = text.split_once('.').unwrap_or((&text, "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}${grouped}.{cents}")
}

/// Percent with one decimal place, e.g. `28.4%`. Input is already a percent.
pub fn percent(value: Decimal) -> String {
    format!(
        "{:.1}%",
        value.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
    )
}

/// Fraction as a percent with up to three decimals, e.g. `0.0185` -> `1.85%`.
fn rate(fraction: Decimal) -> String {
    format!("{}%", (fraction * Decimal::ONE_HUNDRED).round_dp(3).normalize())
}

fn line(
    out: &mut String,
    label: &str,
    value: impl AsRef<str>,
) {
    let _ = writeln!(out, "  {label:<28}{}", value.as_ref());
}

fn income_section(
    out: &mut String,
    income: &IncomeSummary,
) {
    let _ = writeln!(out, "Income");
    let gross_note = if income.take_home_override {
        " (estimated from take-home)"
    } else {
        ""
    };
    line(
        out,
        "Annual gross",
        format!("{}{gross_note}", money(income.annual_gross)),
    );
    line(out, "Monthly gross", money(income.monthly_gross));
    line(out, "Monthly take-home", money(income.monthly_take_home));
}

fn tax_section(
    out: &mut String,
    taxes: &TaxBurden,
) {
    let _ = writeln!(out, "Annual taxes");
    line(out, "Federal", money(taxes.federal));
    line(out, "Social Security", money(taxes.fica.social_security));
    line(out, "Medicare", money(taxes.fica.medicare));
    line(out, "State", money(taxes.state));
    line(out, "Local", money(taxes.local));
    line(out, "Total", money(taxes.total));
    if let Some(effective) = taxes.effective_rate {
        line(out, "Effective rate", rate(effective));
    }
}

/// Full text report for one calculation.
pub fn render_result(result: &AffordabilityResult) -> String {
    let mut out = String::new();

    let heading = match result.mode {
        CalculationMode::MaxAffordable => "Maximum affordable home",
        CalculationMode::AnalyzeHome => "Home analysis",
    };
    let _ = writeln!(out, "{heading}: {}", money(result.home_price));
    let _ = writeln!(out);

    income_section(&mut out, &result.income);
    if result.monthly_debts > Decimal::ZERO {
        line(&mut out, "Monthly debts", money(result.monthly_debts));
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "Loan");
    line(
        &mut out,
        "Down payment",
        format!(
            "{} ({})",
            money(result.down_payment_amount),
            percent(result.down_payment_percent)
        ),
    );
    line(&mut out, "Loan amount", money(result.loan_amount));
    line(
        &mut out,
        "Rate / term",
        format!(
            "{}% / {} years{}",
            result.interest_rate.normalize(),
            result.loan_term_years,
            if result.is_fha { " (FHA)" } else { "" }
        ),
    );
    let _ = writeln!(out);

    let _ = writeln!(out, "Monthly payment");
    line(
        &mut out,
        "Principal and interest",
        money(result.monthly_principal_interest),
    );
    line(
        &mut out,
        "Property tax",
        format!(
            "{} ({} of value, {})",
            money(result.monthly_property_tax),
            rate(result.property_tax.rate),
            result.property_tax.label
        ),
    );
    line(&mut out, "Insurance", money(result.monthly_insurance));
    if result.is_fha {
        line(&mut out, "Mortgage insurance", money(result.monthly_mip));
    }
    line(&mut out, "Total", money(result.total_monthly_payment));
    line(
        &mut out,
        "Share of gross / take-home",
        format!(
            "{} / {}",
            percent(result.percent_of_gross),
            percent(result.percent_of_take_home)
        ),
    );
    line(&mut out, "Assessment", result.tier.as_str());
    if result.mode == CalculationMode::AnalyzeHome {
        line(
            &mut out,
            "Within limits",
            if result.is_affordable { "yes" } else { "no" },
        );
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "Cash to close");
    line(&mut out, "Closing costs", money(result.closing_costs));
    if result.upfront_mip > Decimal::ZERO {
        line(&mut out, "Upfront MIP", money(result.upfront_mip));
    }
    line(&mut out, "Total cash required", money(result.total_cash_required));
    let _ = writeln!(out);

    if !result.income.take_home_override {
        tax_section(&mut out, &result.taxes);
        let _ = writeln!(out);
    }

    if !result.term_comparison.is_empty() {
        let _ = writeln!(out, "Term comparison");
        let _ = writeln!(
            out,
            "  {:<6}{:>8}{:>14}{:>14}{:>16}{:>9}  {}",
            "Term", "Rate", "P&I", "Total", "Interest", "Gross", "Tier"
        );
        for term in &result.term_comparison {
            let _ = writeln!(
                out,
                "  {:<6}{:>8}{:>14}{:>14}{:>16}{:>9}  {}",
                format!("{}y", term.term_years),
                format!("{}%", term.interest_rate.normalize()),
                money(term.monthly_principal_interest),
                money(term.total_monthly_payment),
                money(term.total_interest),
                percent(term.percent_of_gross),
                term.tier.as_str()
            );
        }
    }

    if let Some(solver) = &result.solver {
        let status = if solver.converged {
            "converged"
        } else if solver.diverged {
            "diverged"
        } else {
            "stopped at round limit"
        };
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Solver: {status} after {} rounds (last step {})",
            solver.rounds,
            money(solver.last_step)
        );
    }

    out
}

pub fn render_taxes(report: &TaxReport) -> String {
    let mut out = String::new();
    let place = match &report.locality {
        Some(locality) => format!("{locality}, {}", report.state),
        None => report.state.clone(),
    };
    let _ = writeln!(out, "Tax estimate for {place}");
    let _ = writeln!(out);
    income_section(&mut out, &report.income);
    if !report.income.take_home_override {
        let _ = writeln!(out);
        tax_section(&mut out, &report.taxes);
    }
    out
}

/// One line per failing field.
pub fn render_validation_errors(errors: &ValidationErrors) -> String {
    let mut out = String::from("Invalid input:\n");
    for (field, message) in errors.iter() {
        let _ = writeln!(out, "  {}: {message}", field.as_str());
    }
    out
}

pub fn render_localities(
    state: &str,
    label: &str,
    localities: &[String],
) -> String {
    let mut out = String::new();
    if localities.is_empty() {
        let _ = writeln!(out, "No localities listed for {state}");
        return out;
    }
    let _ = writeln!(out, "{} {label} options in {state}:", localities.len());
    for name in localities {
        let _ = writeln!(out, "  {name}");
    }
    out
}

/// One line per row: price and payment on success, the error otherwise.
pub fn render_batch(outcomes: &[BatchOutcome]) -> String {
    let mut out = String::new();
    for outcome in outcomes {
        let name = outcome
            .label
            .clone()
            .unwrap_or_else(|| format!("row {}", outcome.row));
        match (&outcome.result, &outcome.error) {
            (Some(result), _) => {
                let _ = writeln!(
                    out,
                    "{name}: home {} payment {}/mo ({} of gross, {})",
                    money(result.home_price),
                    money(result.total_monthly_payment),
                    percent(result.percent_of_gross),
                    result.tier.as_str()
                );
            }
            (None, Some(error)) => {
                let _ = writeln!(out, "{name}: error: {error}");
            }
            (None, None) => {
                let _ = writeln!(out, "{name}: no result");
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use afford_core::{Field, FicaBreakdown};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    // =========================================================================
    // number formatting
    // =========================================================================

    #[test]
    fn money_groups_thousands() {
        assert_eq!(money(dec!(0)), "$0.00");
        assert_eq!(money(dec!(999.5)), "$999.50");
        assert_eq!(money(dec!(1234.567)), "$1,234.57");
        assert_eq!(money(dec!(240000)), "$240,000.00");
        assert_eq!(money(dec!(1234567.891)), "$1,234,567.89");
    }

    #[test]
    fn money_keeps_sign() {
        assert_eq!(money(dec!(-1500)), "-$1,500.00");
        assert_eq!(money(dec!(-0.001)), "$0.00");
    }

    #[test]
    fn percent_and_rate() {
        assert_eq!(percent(dec!(28.44)), "28.4%");
        assert_eq!(percent(dec!(20)), "20.0%");
        assert_eq!(rate(dec!(0.0185)), "1.85%");
        assert_eq!(rate(dec!(0.01972)), "1.972%");
    }

    // =========================================================================
    // sections
    // =========================================================================

    fn tax_report(take_home_override: bool) -> TaxReport {
        TaxReport {
            state: "Ohio".to_string(),
            locality: Some("Columbus".to_string()),
            income: IncomeSummary {
                annual_gross: dec!(100000),
                monthly_gross: dec!(8333.33),
                monthly_take_home: dec!(5774.75),
                take_home_override,
            },
            taxes: TaxBurden {
                federal: dec!(17053),
                fica: FicaBreakdown {
                    social_security: dec!(6200),
                    medicare: dec!(1450),
                    total: dec!(7650),
                },
                state: dec!(3500),
                local: dec!(2500),
                total: dec!(30703),
                effective_rate: Some(dec!(0.30703)),
            },
        }
    }

    #[test]
    fn taxes_list_every_layer() {
        let text = render_taxes(&tax_report(false));

        assert!(text.starts_with("Tax estimate for Columbus, Ohio"), "{text}");
        assert!(text.contains("$17,053.00"), "{text}");
        assert!(text.contains("$2,500.00"), "{text}");
        assert!(text.contains("30.703%"), "{text}");
    }

    #[test]
    fn take_home_override_hides_tax_layers() {
        let text = render_taxes(&tax_report(true));

        assert!(text.contains("estimated from take-home"), "{text}");
        assert!(!text.contains("Federal"), "{text}");
    }

    #[test]
    fn validation_errors_name_each_field() {
        let mut errors = ValidationErrors::default();
        errors.insert(Field::Income, "Please enter a valid income");
        errors.insert(Field::State, "Please select a state");

        let text = render_validation_errors(&errors);

        assert_eq!(text.lines().count(), 3);
        assert!(text.contains("Please enter a valid income"), "{text}");
        assert!(text.contains("Please select a state"), "{text}");
    }

    #[test]
    fn localities_list_or_note_absence() {
        let names = vec!["Columbus".to_string(), "Franklin".to_string()];

        assert_eq!(
            render_localities("Ohio", "city", &names),
            "2 city options in Ohio:\n  Columbus\n  Franklin\n"
        );
        assert_eq!(
            render_localities("Texas", "county", &[]),
            "No localities listed for Texas\n"
        );
    }

    #[test]
    fn batch_errors_use_row_number_without_label() {
        let outcomes = vec![BatchOutcome {
            row: 3,
            label: None,
            result: None,
            error: Some("Please select a state".to_string()),
        }];

        assert_eq!(render_batch(&outcomes), "row 3: error: Please select a state\n");
    }

    #[test]
    fn json_skips_empty_batch_fields() {
        let outcome = BatchOutcome {
            row: 1,
            label: Some("starter".to_string()),
            result: None,
            error: Some("bad".to_string()),
        };

        let json = render_json(&outcome).unwrap();

        assert!(json.contains("\"label\": \"starter\""), "{json}");
        assert!(!json.contains("\"result\""), "{json}");
    }
}
