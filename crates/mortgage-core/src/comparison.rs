use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::MortgageError;
use crate::payment::monthly_payment;
use crate::time_value;
use crate::types::*;
use crate::MortgageResult;

/// Terms compared when the caller does not name any.
pub const DEFAULT_COMPARISON_TERMS: [u32; 2] = [15, 30];

fn default_terms() -> Vec<u32> {
    DEFAULT_COMPARISON_TERMS.to_vec()
}

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonInput {
    pub loan_amount: Money,
    /// Candidate annual rates in percent, evaluated in the order given.
    pub interest_rates: Vec<Percent>,
    /// Candidate terms in years, evaluated in the order given.
    #[serde(default = "default_terms")]
    pub loan_terms: Vec<u32>,
}

/// One (rate, term) scenario priced over its full term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub id: String,
    pub label: String,
    pub loan_amount: Money,
    pub applied_rate: Percent,
    pub applied_term_years: u32,
    pub monthly_payment: Money,
    pub total_interest: Money,
    pub total_payment: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonOutput {
    pub rows: Vec<ComparisonRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lowest_payment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lowest_total_interest: Option<String>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Price a single fixed-rate scenario with the given label.
pub fn price_scenario(
    label: String,
    loan_amount: Money,
    rate: Percent,
    term_years: u32,
) -> MortgageResult<ComparisonRow> {
    let payment = monthly_payment(loan_amount, rate, term_years)?;
    let nper = time_value::monthly_periods(term_years)?;
    let total_payment = time_value::lifetime_total(payment, nper)?;
    Ok(ComparisonRow {
        id: format!("{}-{term_years}", rate.normalize()),
        label,
        loan_amount,
        applied_rate: rate,
        applied_term_years: term_years,
        monthly_payment: payment,
        total_interest: total_payment - loan_amount,
        total_payment,
    })
}

/// Price one fixed-rate scenario, labelled `"{term} Year Fixed at {rate}%"`.
pub fn comparison_row(loan_amount: Money, rate: Percent, term_years: u32) -> MortgageResult<ComparisonRow> {
    let label = format!("{term_years} Year Fixed at {}%", rate.normalize());
    price_scenario(label, loan_amount, rate, term_years)
}

/// Evaluate every (rate, term) pair, rate-major then term-minor, preserving
/// the caller's ordering of both lists.
pub fn compare_loans(
    loan_amount: Money,
    interest_rates: &[Percent],
    loan_terms: &[u32],
) -> MortgageResult<Vec<ComparisonRow>> {
    let mut rows = Vec::with_capacity(interest_rates.len() * loan_terms.len());
    for &rate in interest_rates {
        for &term in loan_terms {
            rows.push(comparison_row(loan_amount, rate, term)?);
        }
    }
    Ok(rows)
}

/// Candidate rates `steps` increments either side of `base`, ascending,
/// with non-positive rates dropped.
pub fn rate_sweep(base: Percent, step: Percent, steps: u32) -> MortgageResult<Vec<Percent>> {
    if step <= Decimal::ZERO {
        return Err(MortgageError::non_positive("step"));
    }
    let steps = i64::from(steps);
    let mut rates = Vec::new();
    for i in -steps..=steps {
        let rate = step
            .checked_mul(Decimal::from(i))
            .and_then(|offset| base.checked_add(offset))
            .ok_or_else(|| MortgageError::out_of_range("step", "Swept rate overflows"))?;
        if rate > Decimal::ZERO {
            rates.push(rate);
        }
    }
    Ok(rates)
}

pub fn cheapest_by_payment(rows: &[ComparisonRow]) -> Option<&ComparisonRow> {
    rows.iter().min_by_key(|r| r.monthly_payment)
}

pub fn cheapest_by_interest(rows: &[ComparisonRow]) -> Option<&ComparisonRow> {
    rows.iter().min_by_key(|r| r.total_interest)
}

/// Enveloped rate/term comparison.
pub fn compute_comparison(
    input: &ComparisonInput,
) -> MortgageResult<ComputationOutput<ComparisonOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.interest_rates.iter().any(|r| r.is_zero()) {
        warnings.push("Candidate rate of 0% priced as an interest-free loan".into());
    }

    let rows = compare_loans(input.loan_amount, &input.interest_rates, &input.loan_terms)?;
    if rows.is_empty() {
        warnings.push("No rate/term combinations to compare".into());
    }

    let output = ComparisonOutput {
        lowest_payment: cheapest_by_payment(&rows).map(|r| r.id.clone()),
        lowest_total_interest: cheapest_by_interest(&rows).map(|r| r.id.clone()),
        rows,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Fixed-Rate Scenario Comparison (rate x term grid)",
        &serde_json::json!({
            "loan_amount": input.loan_amount.to_string(),
            "rates": input.interest_rates.len(),
            "terms": input.loan_terms,
        }),
        warnings,
        elapsed,
        output,
    ))
}
