use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::MortgageError;
use crate::loan::{self, CarryingCosts, LoanTerms};
use crate::time_value;
use crate::types::*;
use crate::MortgageResult;

/// LTV above which lenders ordinarily require private mortgage insurance.
const PMI_LTV_THRESHOLD: Rate = dec!(0.80);

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentInput {
    pub loan_amount: Money,
    /// Annual rate in percent (4.5 = 4.5%).
    pub annual_rate_pct: Percent,
    pub term_years: u32,
    #[serde(default)]
    pub carrying_costs: CarryingCosts,
    /// Only used to derive loan-to-value for the PMI check.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub down_payment: Option<Money>,
}

impl From<&LoanTerms> for PaymentInput {
    fn from(terms: &LoanTerms) -> Self {
        PaymentInput {
            loan_amount: terms.principal,
            annual_rate_pct: terms.annual_rate_pct,
            term_years: terms.term_years,
            carrying_costs: terms.carrying_costs(),
            down_payment: terms.down_payment,
        }
    }
}

/// Monthly components of the all-in housing payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentBreakdown {
    pub principal_and_interest: Money,
    pub property_tax: Money,
    pub home_insurance: Money,
    pub pmi: Money,
    pub hoa: Money,
}

impl PaymentBreakdown {
    pub fn total(&self) -> MortgageResult<Money> {
        [self.property_tax, self.home_insurance, self.pmi, self.hoa]
            .into_iter()
            .try_fold(self.principal_and_interest, |acc, x| acc.checked_add(x))
            .ok_or_else(|| {
                MortgageError::out_of_range("payment", "Result overflows decimal precision")
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentOutput {
    /// All-in monthly payment (P&I plus carrying costs).
    pub payment: Money,
    pub number_of_payments: u32,
    /// `payment` over the full term.
    pub total_paid: Money,
    /// P&I over the full term less the amount borrowed. Carrying costs are
    /// excluded; they are reported in `total_carrying_costs`.
    pub total_interest_paid: Money,
    pub total_carrying_costs: Money,
    pub breakdown: PaymentBreakdown,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loan_to_value: Option<Rate>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Fixed monthly principal-and-interest payment that amortises `principal`
/// over `term_years * 12` months at `annual_rate_pct`.
pub fn monthly_payment(
    principal: Money,
    annual_rate_pct: Percent,
    term_years: u32,
) -> MortgageResult<Money> {
    loan::validate_loan(principal, annual_rate_pct, term_years)?;
    let nper = time_value::monthly_periods(term_years)?;
    time_value::pmt(time_value::monthly_rate(annual_rate_pct), nper, principal)
}

/// Decompose the all-in monthly payment and project lifetime totals.
pub fn compute_payment(input: &PaymentInput) -> MortgageResult<ComputationOutput<PaymentOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    input.carrying_costs.validate()?;
    if let Some(dp) = input.down_payment {
        if dp < Decimal::ZERO {
            return Err(MortgageError::negative_amount("down_payment"));
        }
    }

    let principal_and_interest =
        monthly_payment(input.loan_amount, input.annual_rate_pct, input.term_years)?;
    let nper = time_value::monthly_periods(input.term_years)?;

    let costs = &input.carrying_costs;
    let breakdown = PaymentBreakdown {
        principal_and_interest,
        property_tax: costs.monthly_property_tax(),
        home_insurance: costs.monthly_home_insurance(),
        pmi: costs.monthly_pmi(),
        hoa: costs.monthly_hoa(),
    };
    let payment = breakdown.total()?;

    let ltv = input
        .down_payment
        .and_then(|dp| loan::loan_to_value(input.loan_amount, Some(dp)));
    if let Some(ratio) = ltv {
        if ratio > PMI_LTV_THRESHOLD && costs.annual_pmi.is_zero() {
            warnings.push(format!(
                "Loan-to-value of {}% exceeds 80% but no PMI was supplied",
                (ratio * dec!(100)).round_dp(2)
            ));
        }
    }
    if input.annual_rate_pct.is_zero() && !input.loan_amount.is_zero() {
        warnings.push("Zero interest rate: payment is principal divided evenly over the term".into());
    }

    let output = PaymentOutput {
        payment,
        number_of_payments: nper,
        total_paid: time_value::lifetime_total(payment, nper)?,
        total_interest_paid: time_value::lifetime_total(principal_and_interest, nper)?
            - input.loan_amount,
        total_carrying_costs: time_value::lifetime_total(costs.monthly_total(), nper)?,
        breakdown,
        loan_to_value: ltv,
    };

    log::debug!(
        "payment: amount={} rate={}% term={}y -> p&i={} all-in={}",
        input.loan_amount,
        input.annual_rate_pct,
        input.term_years,
        output.breakdown.principal_and_interest,
        output.payment
    );

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Fixed-Rate Annuity Payment",
        &serde_json::json!({
            "loan_amount": input.loan_amount.to_string(),
            "annual_rate_pct": input.annual_rate_pct.to_string(),
            "term_years": input.term_years,
            "compounding": "monthly",
        }),
        warnings,
        elapsed,
        output,
    ))
}
