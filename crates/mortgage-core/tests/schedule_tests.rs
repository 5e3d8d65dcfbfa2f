use chrono::NaiveDate;
use mortgage_core::payment::{self, PaymentInput};
use mortgage_core::schedule::{self, ExtraPayments, ScheduleInput, ScheduleTotals};
use mortgage_core::{CarryingCosts, LoanTerms, MortgageError};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
}

fn loan(principal: Decimal, rate: Decimal, term: u32) -> LoanTerms {
    LoanTerms::new(principal, rate, term, start())
}

fn extras(pairs: &[(u32, Decimal)]) -> ExtraPayments {
    let mut map = ExtraPayments::new();
    for &(month, amount) in pairs {
        map.insert(month, amount).unwrap();
    }
    map
}

// ===========================================================================
// Annuity identity
// ===========================================================================

#[test]
fn test_principal_fully_repaid_across_rates_and_terms() {
    let none = ExtraPayments::new();
    for (rate, term) in [
        (dec!(3.25), 15),
        (dec!(4.5), 30),
        (dec!(6.875), 30),
        (dec!(9.99), 10),
        (dec!(0.125), 20),
    ] {
        let terms = loan(dec!(425000), rate, term);
        let entries: Vec<_> = schedule::build_schedule(&terms, &none).unwrap().collect();
        assert_eq!(entries.len() as u32, term * 12, "rate {rate} term {term}");

        let repaid: Decimal = entries.iter().map(|e| e.principal + e.extra_payment).sum();
        assert!(
            (repaid - dec!(425000)).abs() <= dec!(0.01),
            "rate {rate} term {term}: repaid {repaid}"
        );
    }
}

#[test]
fn test_total_interest_equals_total_paid_less_principal() {
    let terms = loan(dec!(300000), dec!(4.5), 30);
    let map = extras(&[(12, dec!(5000)), (24, dec!(5000)), (60, dec!(20000))]);
    let out = schedule::compute_schedule(&ScheduleInput {
        loan: terms,
        extra_payments: map,
    })
    .unwrap()
    .result;

    let totals = &out.summary.totals;
    assert!((totals.total_paid - dec!(300000) - totals.total_interest).abs() < dec!(0.01));
    assert_eq!(totals.total_extra, dec!(30000));
}

#[test]
fn test_schedule_interest_matches_payment_totals_without_extras() {
    let terms = loan(dec!(300000), dec!(4.5), 30);
    let none = ExtraPayments::new();
    let entries: Vec<_> = schedule::build_schedule(&terms, &none).unwrap().collect();
    let totals = ScheduleTotals::from_entries(&entries);

    let quoted = payment::compute_payment(&PaymentInput::from(&terms))
        .unwrap()
        .result;
    assert!((totals.total_interest - quoted.total_interest_paid).abs() < dec!(0.01));
}

// ===========================================================================
// Balance non-negativity and termination
// ===========================================================================

#[test]
fn test_balances_non_negative_and_months_increasing() {
    let terms = loan(dec!(180000), dec!(7.25), 15);
    let map = extras(&[
        (1, dec!(2500)),
        (7, dec!(0)),
        (30, dec!(15000)),
        (31, dec!(15000)),
        (90, dec!(1000000)),
    ]);
    let entries: Vec<_> = schedule::build_schedule(&terms, &map).unwrap().collect();

    let mut prev_month = 0;
    let mut prev_balance = dec!(180000);
    for e in &entries {
        assert!(e.month > prev_month);
        assert!(e.balance >= Decimal::ZERO);
        assert!(e.balance <= prev_balance);
        assert!(e.principal + e.extra_payment <= prev_balance + dec!(0.0000001));
        prev_month = e.month;
        prev_balance = e.balance;
    }
    assert!(entries.last().unwrap().balance <= dec!(0.005));
    // The huge prepayment in month 90 ends the loan there
    assert_eq!(entries.last().unwrap().month, 90);
}

#[test]
fn test_no_trailing_zero_rows() {
    let terms = loan(dec!(50000), dec!(5), 30);
    let map = extras(&[(2, dec!(60000))]);
    let entries: Vec<_> = schedule::build_schedule(&terms, &map).unwrap().collect();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1].balance, Decimal::ZERO);
}

// ===========================================================================
// Payoff acceleration
// ===========================================================================

#[test]
fn test_extra_payments_never_lengthen_schedule() {
    let terms = loan(dec!(300000), dec!(4.5), 30);
    let none = ExtraPayments::new();
    let baseline = schedule::build_schedule(&terms, &none).unwrap().count();

    for month in [1u32, 59, 180, 300, 359, 360] {
        for amount in [dec!(0.01), dec!(100), dec!(25000)] {
            let map = extras(&[(month, amount)]);
            let len = schedule::build_schedule(&terms, &map).unwrap().count();
            assert!(len <= baseline, "month {month} amount {amount}: {len} > {baseline}");
        }
    }
}

#[test]
fn test_lump_sum_strictly_shortens_thirty_year() {
    let terms = loan(dec!(300000), dec!(4.5), 30);
    let map = extras(&[(1, dec!(10000))]);
    let out = schedule::compute_schedule(&ScheduleInput {
        loan: terms,
        extra_payments: map,
    })
    .unwrap()
    .result;

    assert!(out.entries.len() < 360);
    let savings = out.summary.savings.unwrap();
    assert_eq!(savings.baseline_payments, 360);
    assert_eq!(savings.months_saved, 360 - out.entries.len() as u32);
    assert!(savings.interest_saved > dec!(10000));
}

#[test]
fn test_payoff_date_tracks_last_entry() {
    let terms = loan(dec!(100000), dec!(6), 30);
    let map = extras(&[(12, dec!(90000))]);
    let out = schedule::compute_schedule(&ScheduleInput {
        loan: terms,
        extra_payments: map,
    })
    .unwrap()
    .result;
    let last = out.entries.last().unwrap();
    assert_eq!(out.summary.payoff_month, Some(last.month));
    assert_eq!(out.summary.payoff_date, Some(last.date));
}

// ===========================================================================
// Inputs
// ===========================================================================

#[test]
fn test_schedule_input_from_json() {
    let input: ScheduleInput = serde_json::from_str(
        r#"{
            "loan": {
                "principal": "240000",
                "annual_rate_pct": "6.5",
                "term_years": 30,
                "annual_property_tax": 3600,
                "start_date": "2025-07-01"
            },
            "extra_payments": [{"month": 6, "amount": 1000}, {"month": 6, "amount": 2000}]
        }"#,
    )
    .unwrap();
    assert_eq!(input.extra_payments.get(6), Some(dec!(2000)));
    assert_eq!(
        input.loan.carrying_costs(),
        CarryingCosts {
            annual_property_tax: dec!(3600),
            ..CarryingCosts::default()
        }
    );

    let out = schedule::compute_schedule(&input).unwrap().result;
    assert_eq!(out.entries[5].extra_payment, dec!(2000));
    assert_eq!(out.entries[0].date, NaiveDate::from_ymd_opt(2025, 7, 1).unwrap());
}

#[test]
fn test_invalid_loan_rejected() {
    let none = ExtraPayments::new();
    let err = schedule::build_schedule(&loan(dec!(-5), dec!(4), 30), &none).unwrap_err();
    assert!(matches!(err, MortgageError::InvalidInput { .. }));

    assert!(schedule::build_schedule(&loan(dec!(1000), dec!(-4), 30), &none).is_err());
    assert!(schedule::build_schedule(&loan(dec!(1000), dec!(4), 0), &none).is_err());
}

#[test]
fn test_start_date_near_calendar_limit_rejected() {
    let mut terms = loan(dec!(1000), dec!(4), 30);
    terms.start_date = NaiveDate::MAX;
    let none = ExtraPayments::new();
    assert!(matches!(
        schedule::build_schedule(&terms, &none),
        Err(MortgageError::DateError(_))
    ));
}
