use chrono::NaiveDate;
use mortgage_core::payment::{self, PaymentInput};
use mortgage_core::time_value;
use mortgage_core::{CarryingCosts, LoanTerms, MortgageError};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn plain(loan_amount: Decimal, rate: Decimal, term_years: u32) -> PaymentInput {
    PaymentInput {
        loan_amount,
        annual_rate_pct: rate,
        term_years,
        carrying_costs: CarryingCosts::default(),
        down_payment: None,
    }
}

// ===========================================================================
// Reference payments
// ===========================================================================

#[test]
fn test_reference_payments() {
    // Published amortisation table values, to the cent
    for (amount, rate, term, expected) in [
        (dec!(300000), dec!(4.5), 30, dec!(1520.06)),
        (dec!(200000), dec!(6), 30, dec!(1199.10)),
        (dec!(200000), dec!(6), 15, dec!(1687.71)),
        (dec!(100000), dec!(3), 10, dec!(965.61)),
    ] {
        let pi = payment::monthly_payment(amount, rate, term).unwrap();
        assert!(
            (pi - expected).abs() < dec!(0.01),
            "{amount} at {rate}% over {term}y: got {pi}, expected {expected}"
        );
    }
}

#[test]
fn test_higher_rate_means_higher_payment() {
    let low = payment::monthly_payment(dec!(250000), dec!(5), 30).unwrap();
    let high = payment::monthly_payment(dec!(250000), dec!(5.5), 30).unwrap();
    assert!(high > low);
}

#[test]
fn test_shorter_term_means_higher_payment_less_interest() {
    let thirty = payment::compute_payment(&plain(dec!(250000), dec!(5), 30))
        .unwrap()
        .result;
    let fifteen = payment::compute_payment(&plain(dec!(250000), dec!(5), 15))
        .unwrap()
        .result;
    assert!(fifteen.payment > thirty.payment);
    assert!(fifteen.total_interest_paid < thirty.total_interest_paid);
}

// ===========================================================================
// Zero-rate and zero-principal edges
// ===========================================================================

#[test]
fn test_zero_rate_divides_evenly() {
    let out = payment::compute_payment(&plain(dec!(360000), Decimal::ZERO, 30)).unwrap();
    assert_eq!(out.result.payment, dec!(1000));
    assert_eq!(out.result.total_interest_paid, Decimal::ZERO);
    assert!(out.warnings.iter().any(|w| w.contains("Zero interest")));
}

#[test]
fn test_zero_principal_is_free() {
    let out = payment::compute_payment(&plain(Decimal::ZERO, dec!(6), 30))
        .unwrap()
        .result;
    assert_eq!(out.payment, Decimal::ZERO);
    assert_eq!(out.total_paid, Decimal::ZERO);
    assert_eq!(out.total_interest_paid, Decimal::ZERO);
}

#[test]
fn test_pv_inverts_pmt() {
    let r = time_value::monthly_rate(dec!(5.25));
    let pi = time_value::pmt(r, 360, dec!(410000)).unwrap();
    let principal = time_value::pv(r, 360, pi).unwrap();
    assert!((principal - dec!(410000)).abs() < dec!(0.000001));
}

// ===========================================================================
// Carrying costs and loan-to-value
// ===========================================================================

#[test]
fn test_from_loan_terms_carries_costs() {
    let terms = LoanTerms::new(
        dec!(320000),
        dec!(6.5),
        30,
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
    )
    .with_carrying_costs(&CarryingCosts {
        annual_property_tax: dec!(4800),
        annual_home_insurance: dec!(1440),
        annual_pmi: Decimal::ZERO,
        annual_hoa: dec!(600),
    });

    let out = payment::compute_payment(&PaymentInput::from(&terms))
        .unwrap()
        .result;
    assert_eq!(out.breakdown.property_tax, dec!(400));
    assert_eq!(out.breakdown.home_insurance, dec!(120));
    assert_eq!(out.breakdown.hoa, dec!(50));
    assert_eq!(out.payment, out.breakdown.total().unwrap());
    assert_eq!(out.total_carrying_costs, dec!(570) * dec!(360));
    assert_eq!(out.loan_to_value, None);
}

#[test]
fn test_loan_to_value_reported_with_down_payment() {
    let mut input = plain(dec!(320000), dec!(6.5), 30);
    input.down_payment = Some(dec!(80000));
    let out = payment::compute_payment(&input).unwrap();
    assert_eq!(out.result.loan_to_value, Some(dec!(0.8)));
    // Exactly 80% does not require PMI
    assert!(out.warnings.iter().all(|w| !w.contains("PMI")));
}

#[test]
fn test_input_from_json() {
    let input: PaymentInput = serde_json::from_str(
        r#"{
            "loan_amount": "300000",
            "annual_rate_pct": "4.5",
            "term_years": 30,
            "carrying_costs": {"annual_property_tax": 3600}
        }"#,
    )
    .unwrap();
    assert_eq!(input.carrying_costs.annual_home_insurance, Decimal::ZERO);
    let out = payment::compute_payment(&input).unwrap();
    assert_eq!(out.result.breakdown.property_tax, dec!(300));
    assert_eq!(out.metadata.precision, "rust_decimal_128bit");
}

// ===========================================================================
// Validation
// ===========================================================================

#[test]
fn test_negative_down_payment_rejected() {
    let mut input = plain(dec!(300000), dec!(4.5), 30);
    input.down_payment = Some(dec!(-1));
    let err = payment::compute_payment(&input).unwrap_err();
    match err {
        MortgageError::InvalidInput { field, .. } => assert_eq!(field, "down_payment"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_error_message_names_field() {
    let err = payment::monthly_payment(dec!(300000), dec!(-3), 30).unwrap_err();
    assert!(err.to_string().contains("annual_rate_pct"));
}
