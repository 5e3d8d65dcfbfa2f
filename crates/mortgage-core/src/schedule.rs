use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::iter::FusedIterator;
use std::time::Instant;

use crate::calendar;
use crate::error::MortgageError;
use crate::loan::LoanTerms;
use crate::payment::monthly_payment;
use crate::time_value;
use crate::types::*;
use crate::MortgageResult;

/// Balances below this are treated as fully repaid.
pub const PAYOFF_EPSILON: Money = dec!(0.005);

// ---------------------------------------------------------------------------
// Extra payments
// ---------------------------------------------------------------------------

/// An ad-hoc principal prepayment made alongside the scheduled payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraPayment {
    /// 1-based payment number the prepayment accompanies.
    pub month: u32,
    pub amount: Money,
}

/// Extra payments keyed by month. Holds at most one amount per month;
/// inserting into an occupied month replaces the previous amount.
///
/// Serialises as a list of `{month, amount}` ordered by month. When
/// deserialising, a later entry for the same month replaces an earlier one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ExtraPayment>", into = "Vec<ExtraPayment>")]
pub struct ExtraPayments {
    by_month: BTreeMap<u32, Money>,
}

impl ExtraPayments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the extra payment for `month`, returning the amount it replaced.
    pub fn insert(&mut self, month: u32, amount: Money) -> MortgageResult<Option<Money>> {
        if month == 0 {
            return Err(MortgageError::non_positive("extra_payments.month"));
        }
        if amount < Decimal::ZERO {
            return Err(MortgageError::negative_amount("extra_payments.amount"));
        }
        Ok(self.by_month.insert(month, amount))
    }

    pub fn get(&self, month: u32) -> Option<Money> {
        self.by_month.get(&month).copied()
    }

    /// Amount due in `month`, zero when none was scheduled.
    pub fn amount_for(&self, month: u32) -> Money {
        self.get(month).unwrap_or(Decimal::ZERO)
    }

    pub fn remove(&mut self, month: u32) -> Option<Money> {
        self.by_month.remove(&month)
    }

    pub fn clear(&mut self) {
        self.by_month.clear();
    }

    pub fn len(&self) -> usize {
        self.by_month.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_month.is_empty()
    }

    /// Extra payments in ascending month order.
    pub fn iter(&self) -> impl Iterator<Item = ExtraPayment> + '_ {
        self.by_month
            .iter()
            .map(|(&month, &amount)| ExtraPayment { month, amount })
    }

    pub fn total(&self) -> Money {
        self.by_month
            .values()
            .fold(Decimal::ZERO, |acc, x| acc.saturating_add(*x))
    }
}

impl TryFrom<Vec<ExtraPayment>> for ExtraPayments {
    type Error = MortgageError;

    fn try_from(payments: Vec<ExtraPayment>) -> Result<Self, Self::Error> {
        let mut map = ExtraPayments::new();
        for p in payments {
            map.insert(p.month, p.amount)?;
        }
        Ok(map)
    }
}

impl From<ExtraPayments> for Vec<ExtraPayment> {
    fn from(payments: ExtraPayments) -> Self {
        payments.iter().collect()
    }
}

// ---------------------------------------------------------------------------
// Schedule entries
// ---------------------------------------------------------------------------

/// One month of the amortisation ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub month: u32,
    /// The level P&I payment for the loan.
    pub scheduled_payment: Money,
    pub principal: Money,
    pub interest: Money,
    /// Extra principal actually applied this month.
    pub extra_payment: Money,
    /// Balance after this month's payment.
    pub balance: Money,
    pub date: NaiveDate,
}

impl ScheduleEntry {
    /// Cash actually paid this month. Differs from `scheduled_payment` only
    /// in the payoff month or when an extra payment is applied.
    pub fn amount_paid(&self) -> Money {
        self.principal + self.interest + self.extra_payment
    }

    pub fn opening_balance(&self) -> Money {
        self.balance + self.principal + self.extra_payment
    }
}

/// Lazily generated amortisation ledger.
///
/// Each entry depends on the balance left by the previous one, so the
/// sequence can only be walked forward once; call [`build_schedule`] again to
/// start over.
#[derive(Debug, Clone)]
pub struct AmortizationSchedule<'a> {
    extra_payments: &'a ExtraPayments,
    payment: Money,
    rate: Rate,
    nper: u32,
    start_date: NaiveDate,
    balance: Money,
    month: u32,
}

impl AmortizationSchedule<'_> {
    /// Level P&I payment every entry is based on.
    pub fn payment(&self) -> Money {
        self.payment
    }

    /// Natural number of payments with no prepayment.
    pub fn term_months(&self) -> u32 {
        self.nper
    }
}

impl Iterator for AmortizationSchedule<'_> {
    type Item = ScheduleEntry;

    fn next(&mut self) -> Option<ScheduleEntry> {
        if self.balance <= Decimal::ZERO || self.month >= self.nper {
            return None;
        }

        let month = self.month + 1;
        let date = calendar::add_months(self.start_date, month - 1)?;
        let opening = self.balance;

        // opening <= principal and rate < annuity factor, so this stays
        // below the level payment
        let interest = opening * self.rate;
        let mut principal = (self.payment - interest).max(Decimal::ZERO);
        let mut extra = self.extra_payments.amount_for(month);

        // Never apply more principal than remains: scheduled principal is
        // satisfied first and the extra payment absorbs the shortfall.
        if extra > opening - principal {
            principal = principal.min(opening);
            extra = opening - principal;
        }

        let mut closing = (opening - principal - extra).max(Decimal::ZERO);
        if closing < PAYOFF_EPSILON {
            principal += closing;
            closing = Decimal::ZERO;
        }

        self.month = month;
        self.balance = closing;

        Some(ScheduleEntry {
            month,
            scheduled_payment: self.payment,
            principal,
            interest,
            extra_payment: extra,
            balance: closing,
            date,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.balance <= Decimal::ZERO {
            return (0, Some(0));
        }
        (0, Some((self.nper - self.month) as usize))
    }
}

impl FusedIterator for AmortizationSchedule<'_> {}

/// Start the month-by-month amortisation of `terms` with `extra_payments`.
///
/// Validates the loan, computes the level payment once, and checks that the
/// final natural payment date is representable, so iteration itself cannot
/// fail.
pub fn build_schedule<'a>(
    terms: &LoanTerms,
    extra_payments: &'a ExtraPayments,
) -> MortgageResult<AmortizationSchedule<'a>> {
    terms.validate()?;

    let payment = monthly_payment(terms.principal, terms.annual_rate_pct, terms.term_years)?;
    let nper = time_value::monthly_periods(terms.term_years)?;
    calendar::payment_date(terms.start_date, nper)?;
    // Bounds every running total the ledger can accumulate
    time_value::lifetime_total(payment, nper)?
        .checked_add(terms.principal)
        .ok_or_else(|| MortgageError::out_of_range("principal", "Lifetime payments overflow"))?;

    Ok(AmortizationSchedule {
        extra_payments,
        payment,
        rate: time_value::monthly_rate(terms.annual_rate_pct),
        nper,
        start_date: terms.start_date,
        balance: terms.principal,
        month: 0,
    })
}

// ---------------------------------------------------------------------------
// Enveloped computation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleInput {
    pub loan: LoanTerms,
    #[serde(default)]
    pub extra_payments: ExtraPayments,
}

/// Lifetime totals over a ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleTotals {
    pub number_of_payments: u32,
    pub total_principal: Money,
    pub total_extra: Money,
    pub total_interest: Money,
    /// Scheduled principal, extra principal and interest actually paid.
    pub total_paid: Money,
}

impl ScheduleTotals {
    pub fn from_entries(entries: &[ScheduleEntry]) -> Self {
        entries.iter().fold(ScheduleTotals::default(), |mut acc, e| {
            acc.number_of_payments += 1;
            acc.total_principal += e.principal;
            acc.total_extra += e.extra_payment;
            acc.total_interest += e.interest;
            acc.total_paid += e.amount_paid();
            acc
        })
    }
}

/// Effect of the extra payments against the same loan without them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepaymentSavings {
    pub baseline_payments: u32,
    pub baseline_interest: Money,
    pub months_saved: u32,
    pub interest_saved: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub monthly_payment: Money,
    #[serde(flatten)]
    pub totals: ScheduleTotals,
    pub payoff_month: Option<u32>,
    pub payoff_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub savings: Option<PrepaymentSavings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleOutput {
    pub entries: Vec<ScheduleEntry>,
    pub summary: ScheduleSummary,
}

/// Produce the full ledger with lifetime totals and, when extra payments are
/// present, the savings against the unaccelerated loan.
pub fn compute_schedule(
    input: &ScheduleInput,
) -> MortgageResult<ComputationOutput<ScheduleOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let schedule = build_schedule(&input.loan, &input.extra_payments)?;
    let monthly_payment = schedule.payment();
    let entries: Vec<ScheduleEntry> = schedule.collect();
    let totals = ScheduleTotals::from_entries(&entries);
    let last = entries.last();

    if entries.is_empty() {
        warnings.push("Loan principal is zero; schedule is empty".into());
    }

    let payoff_month = last.map(|e| e.month).unwrap_or(0);
    for extra in input.extra_payments.iter() {
        if extra.month > payoff_month {
            warnings.push(format!(
                "Extra payment of {} in month {} falls after payoff and has no effect",
                extra.amount, extra.month
            ));
        } else if let Some(entry) = entries.get((extra.month - 1) as usize) {
            if entry.extra_payment < extra.amount {
                warnings.push(format!(
                    "Extra payment in month {} reduced from {} to {} to avoid overpaying the balance",
                    extra.month,
                    extra.amount,
                    entry.extra_payment.round_dp(2)
                ));
            }
        }
    }

    let savings = if input.extra_payments.is_empty() {
        None
    } else {
        let none = ExtraPayments::new();
        let baseline: Vec<ScheduleEntry> = build_schedule(&input.loan, &none)?.collect();
        let baseline = ScheduleTotals::from_entries(&baseline);
        Some(PrepaymentSavings {
            months_saved: baseline
                .number_of_payments
                .saturating_sub(totals.number_of_payments),
            interest_saved: baseline.total_interest - totals.total_interest,
            baseline_payments: baseline.number_of_payments,
            baseline_interest: baseline.total_interest,
        })
    };

    log::debug!(
        "schedule: {} payments, payoff {:?}, interest {}",
        totals.number_of_payments,
        last.map(|e| e.date),
        totals.total_interest
    );

    let summary = ScheduleSummary {
        monthly_payment,
        payoff_month: last.map(|e| e.month),
        payoff_date: last.map(|e| e.date),
        totals,
        savings,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "principal": input.loan.principal.to_string(),
        "annual_rate_pct": input.loan.annual_rate_pct.to_string(),
        "term_years": input.loan.term_years,
        "start_date": input.loan.start_date.to_string(),
        "extra_payments": input.extra_payments.len(),
        "payoff_tolerance": PAYOFF_EPSILON.to_string(),
    });

    Ok(with_metadata(
        "Monthly Amortisation with Extra Principal Payments",
        &assumptions,
        warnings,
        elapsed,
        ScheduleOutput { entries, summary },
    ))
}
