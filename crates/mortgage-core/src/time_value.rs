use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::MortgageError;
use crate::types::{Money, Percent, Rate};
use crate::MortgageResult;

const MONTHS_PER_YEAR: u32 = 12;

/// Convert an annual percentage (4.5) into a monthly decimal rate (0.00375).
pub fn monthly_rate(annual_rate_pct: Percent) -> Rate {
    annual_rate_pct / dec!(100) / Decimal::from(MONTHS_PER_YEAR)
}

/// Number of monthly payments in a term of whole years.
pub fn monthly_periods(term_years: u32) -> MortgageResult<u32> {
    if term_years == 0 {
        return Err(MortgageError::non_positive("term_years"));
    }
    term_years
        .checked_mul(MONTHS_PER_YEAR)
        .ok_or_else(|| MortgageError::out_of_range("term_years", "Term is too long"))
}

/// Level payment per unit of principal: `r(1+r)^n / ((1+r)^n - 1)`.
///
/// At a zero rate the expression is 0/0, so the factor degenerates to `1/n`.
pub fn annuity_factor(rate: Rate, nper: u32) -> MortgageResult<Decimal> {
    if nper == 0 {
        return Err(MortgageError::non_positive("nper"));
    }
    if rate < Decimal::ZERO {
        return Err(MortgageError::negative_rate("rate"));
    }

    let n = Decimal::from(nper);
    if rate.is_zero() {
        return Ok(Decimal::ONE / n);
    }

    let growth = rate
        .checked_add(Decimal::ONE)
        .and_then(|base| base.checked_powi(i64::from(nper)))
        .ok_or_else(|| overflow("rate"))?;
    let denom = growth - Decimal::ONE;

    // Rates small enough to vanish at 28 digits behave as zero-rate loans
    if denom.is_zero() {
        return Ok(Decimal::ONE / n);
    }

    rate.checked_mul(growth)
        .and_then(|numer| numer.checked_div(denom))
        .ok_or_else(|| overflow("rate"))
}

/// Level payment (PMT) that fully amortises `principal` over `nper` periods.
pub fn pmt(rate: Rate, nper: u32, principal: Money) -> MortgageResult<Money> {
    if principal < Decimal::ZERO {
        return Err(MortgageError::negative_amount("principal"));
    }
    if principal.is_zero() {
        return Ok(Decimal::ZERO);
    }
    if rate.is_zero() && nper > 0 {
        return Ok(principal / Decimal::from(nper));
    }
    let factor = annuity_factor(rate, nper)?;
    principal
        .checked_mul(factor)
        .ok_or_else(|| overflow("principal"))
}

/// Principal that a level `payment` can amortise over `nper` periods (the
/// inverse of [`pmt`]).
pub fn pv(rate: Rate, nper: u32, payment: Money) -> MortgageResult<Money> {
    if payment < Decimal::ZERO {
        return Err(MortgageError::negative_amount("payment"));
    }
    if rate.is_zero() && nper > 0 {
        return lifetime_total(payment, nper);
    }
    let factor = annuity_factor(rate, nper)?;
    if factor.is_zero() {
        return Ok(Decimal::ZERO);
    }
    payment
        .checked_div(factor)
        .ok_or_else(|| overflow("payment"))
}

/// `payment` summed over `nper` periods.
pub fn lifetime_total(payment: Money, nper: u32) -> MortgageResult<Money> {
    payment
        .checked_mul(Decimal::from(nper))
        .ok_or_else(|| overflow("payment"))
}

fn overflow(field: &str) -> MortgageError {
    MortgageError::out_of_range(field, "Result overflows decimal precision")
}
