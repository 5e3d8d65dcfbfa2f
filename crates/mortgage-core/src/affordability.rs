use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::MortgageError;
use crate::time_value;
use crate::types::*;
use crate::MortgageResult;

/// Housing costs may not exceed this share of gross monthly income.
pub const FRONT_END_RATIO: Rate = dec!(0.28);

/// Housing plus all other debt service may not exceed this share.
pub const BACK_END_RATIO: Rate = dec!(0.36);

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffordabilityInput {
    /// Gross monthly household income.
    pub monthly_income: Money,
    /// Existing monthly debt service (car, card, student loans).
    #[serde(default)]
    pub monthly_debts: Money,
    pub annual_rate_pct: Percent,
    pub term_years: u32,
    #[serde(default)]
    pub down_payment: Money,
    #[serde(default)]
    pub annual_property_tax: Money,
    #[serde(default)]
    pub annual_home_insurance: Money,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingConstraint {
    FrontEnd,
    BackEnd,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffordabilityOutput {
    /// All-in housing payment allowed by the tighter ratio.
    pub max_monthly_payment: Money,
    pub max_loan_amount: Money,
    pub max_home_price: Money,
    /// What is left for principal and interest after tax and insurance.
    pub max_principal_and_interest: Money,
    pub front_end_cap: Money,
    pub back_end_cap: Money,
    pub binding_constraint: BindingConstraint,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Largest principal whose level P&I payment does not exceed `payment`.
pub fn max_loan_for_payment(
    payment: Money,
    annual_rate_pct: Percent,
    term_years: u32,
) -> MortgageResult<Money> {
    if annual_rate_pct < Decimal::ZERO {
        return Err(MortgageError::negative_rate("annual_rate_pct"));
    }
    let nper = time_value::monthly_periods(term_years)?;
    time_value::pv(
        time_value::monthly_rate(annual_rate_pct),
        nper,
        payment.max(Decimal::ZERO),
    )
}

/// Estimate the largest mortgage and purchase price supportable under the
/// 28% front-end and 36% back-end debt-to-income guidelines.
pub fn estimate_affordability(
    input: &AffordabilityInput,
) -> MortgageResult<ComputationOutput<AffordabilityOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_input(input)?;

    let front_end_cap = input.monthly_income * FRONT_END_RATIO;
    let back_end_cap = input.monthly_income * BACK_END_RATIO - input.monthly_debts;

    let (binding_constraint, binding_cap) = if back_end_cap < front_end_cap {
        (BindingConstraint::BackEnd, back_end_cap)
    } else {
        (BindingConstraint::FrontEnd, front_end_cap)
    };
    let max_monthly_payment = binding_cap.max(Decimal::ZERO);

    let escrow = input.annual_property_tax / dec!(12) + input.annual_home_insurance / dec!(12);
    let max_principal_and_interest = (max_monthly_payment - escrow).max(Decimal::ZERO);

    if back_end_cap <= Decimal::ZERO {
        warnings.push(format!(
            "Existing debts of {} consume the entire 36% back-end allowance",
            input.monthly_debts
        ));
    } else if max_principal_and_interest.is_zero() {
        warnings.push("Property tax and insurance exceed the affordable housing payment".into());
    }

    let max_loan_amount =
        max_loan_for_payment(max_principal_and_interest, input.annual_rate_pct, input.term_years)?;
    let max_home_price = max_loan_amount
        .checked_add(input.down_payment)
        .ok_or_else(|| MortgageError::out_of_range("down_payment", "Home price overflows"))?;

    log::debug!(
        "affordability: income={} debts={} -> max payment {} ({:?}), loan {}",
        input.monthly_income,
        input.monthly_debts,
        max_monthly_payment,
        binding_constraint,
        max_loan_amount
    );

    let output = AffordabilityOutput {
        max_monthly_payment,
        max_loan_amount,
        max_home_price,
        max_principal_and_interest,
        front_end_cap,
        back_end_cap,
        binding_constraint,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Debt-to-Income Affordability (28/36 rule)",
        &serde_json::json!({
            "front_end_ratio": FRONT_END_RATIO.to_string(),
            "back_end_ratio": BACK_END_RATIO.to_string(),
            "annual_rate_pct": input.annual_rate_pct.to_string(),
            "term_years": input.term_years,
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn validate_input(input: &AffordabilityInput) -> MortgageResult<()> {
    for (field, value) in [
        ("monthly_income", input.monthly_income),
        ("monthly_debts", input.monthly_debts),
        ("down_payment", input.down_payment),
        ("annual_property_tax", input.annual_property_tax),
        ("annual_home_insurance", input.annual_home_insurance),
    ] {
        if value < Decimal::ZERO {
            return Err(MortgageError::negative_amount(field));
        }
    }
    if input.annual_rate_pct < Decimal::ZERO {
        return Err(MortgageError::negative_rate("annual_rate_pct"));
    }
    if input.term_years == 0 {
        return Err(MortgageError::non_positive("term_years"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
