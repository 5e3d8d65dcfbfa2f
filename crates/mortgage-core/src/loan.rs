use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::MortgageError;
use crate::types::*;
use crate::MortgageResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Annual non-loan housing costs collected alongside the P&I payment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarryingCosts {
    #[serde(default)]
    pub annual_property_tax: Money,
    #[serde(default)]
    pub annual_home_insurance: Money,
    #[serde(default)]
    pub annual_pmi: Money,
    #[serde(default)]
    pub annual_hoa: Money,
}

impl CarryingCosts {
    pub fn validate(&self) -> MortgageResult<()> {
        for (field, value) in [
            ("annual_property_tax", self.annual_property_tax),
            ("annual_home_insurance", self.annual_home_insurance),
            ("annual_pmi", self.annual_pmi),
            ("annual_hoa", self.annual_hoa),
        ] {
            if value < Decimal::ZERO {
                return Err(MortgageError::negative_amount(field));
            }
        }
        Ok(())
    }

    pub fn monthly_property_tax(&self) -> Money {
        self.annual_property_tax / MONTHS_PER_YEAR
    }

    pub fn monthly_home_insurance(&self) -> Money {
        self.annual_home_insurance / MONTHS_PER_YEAR
    }

    pub fn monthly_pmi(&self) -> Money {
        self.annual_pmi / MONTHS_PER_YEAR
    }

    pub fn monthly_hoa(&self) -> Money {
        self.annual_hoa / MONTHS_PER_YEAR
    }

    pub fn monthly_total(&self) -> Money {
        self.monthly_property_tax()
            + self.monthly_home_insurance()
            + self.monthly_pmi()
            + self.monthly_hoa()
    }
}

/// Snapshot of a fixed-rate loan as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanTerms {
    /// Amount borrowed.
    pub principal: Money,
    /// Annual rate in percent (4.5 = 4.5%).
    pub annual_rate_pct: Percent,
    pub term_years: u32,
    #[serde(default)]
    pub annual_property_tax: Money,
    #[serde(default)]
    pub annual_home_insurance: Money,
    #[serde(default)]
    pub annual_pmi: Money,
    #[serde(default)]
    pub annual_hoa: Money,
    /// Date of the first payment.
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub down_payment: Option<Money>,
}

impl LoanTerms {
    pub fn new(
        principal: Money,
        annual_rate_pct: Percent,
        term_years: u32,
        start_date: NaiveDate,
    ) -> Self {
        LoanTerms {
            principal,
            annual_rate_pct,
            term_years,
            annual_property_tax: Decimal::ZERO,
            annual_home_insurance: Decimal::ZERO,
            annual_pmi: Decimal::ZERO,
            annual_hoa: Decimal::ZERO,
            start_date,
            down_payment: None,
        }
    }

    pub fn with_carrying_costs(mut self, costs: &CarryingCosts) -> Self {
        self.annual_property_tax = costs.annual_property_tax;
        self.annual_home_insurance = costs.annual_home_insurance;
        self.annual_pmi = costs.annual_pmi;
        self.annual_hoa = costs.annual_hoa;
        self
    }

    pub fn carrying_costs(&self) -> CarryingCosts {
        CarryingCosts {
            annual_property_tax: self.annual_property_tax,
            annual_home_insurance: self.annual_home_insurance,
            annual_pmi: self.annual_pmi,
            annual_hoa: self.annual_hoa,
        }
    }

    pub fn validate(&self) -> MortgageResult<()> {
        validate_loan(self.principal, self.annual_rate_pct, self.term_years)?;
        self.carrying_costs().validate()?;
        if let Some(dp) = self.down_payment {
            if dp < Decimal::ZERO {
                return Err(MortgageError::negative_amount("down_payment"));
            }
        }
        Ok(())
    }

    /// Purchase price implied by the loan plus any down payment.
    pub fn home_price(&self) -> Money {
        self.principal
            .saturating_add(self.down_payment.unwrap_or(Decimal::ZERO))
    }

    /// Loan-to-value ratio, or `None` when the home price is zero.
    pub fn loan_to_value(&self) -> Option<Rate> {
        loan_to_value(self.principal, self.down_payment)
    }
}

pub(crate) fn validate_loan(
    principal: Money,
    annual_rate_pct: Percent,
    term_years: u32,
) -> MortgageResult<()> {
    if principal < Decimal::ZERO {
        return Err(MortgageError::negative_amount("principal"));
    }
    if annual_rate_pct < Decimal::ZERO {
        return Err(MortgageError::negative_rate("annual_rate_pct"));
    }
    if term_years == 0 {
        return Err(MortgageError::non_positive("term_years"));
    }
    Ok(())
}

pub(crate) fn loan_to_value(principal: Money, down_payment: Option<Money>) -> Option<Rate> {
    let price = principal.checked_add(down_payment.unwrap_or(Decimal::ZERO))?;
    if price <= Decimal::ZERO {
        None
    } else {
        Some(principal / price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_terms() -> LoanTerms {
        LoanTerms::new(
            dec!(240000),
            dec!(6.5),
            30,
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        )
    }

    #[test]
    fn test_home_price_and_ltv() {
        let mut terms = sample_terms();
        terms.down_payment = Some(dec!(60000));
        assert_eq!(terms.home_price(), dec!(300000));
        assert_eq!(terms.loan_to_value(), Some(dec!(0.8)));
    }

    #[test]
    fn test_monthly_carrying_costs() {
        let costs = CarryingCosts {
            annual_property_tax: dec!(3000),
            annual_home_insurance: dec!(1200),
            annual_pmi: dec!(600),
            annual_hoa: dec!(2400),
        };
        assert_eq!(costs.monthly_property_tax(), dec!(250));
        assert_eq!(costs.monthly_home_insurance(), dec!(100));
        assert_eq!(costs.monthly_total(), dec!(600));
    }

    #[test]
    fn test_validate_rejects_negative_cost() {
        let mut terms = sample_terms();
        terms.annual_hoa = dec!(-1);
        let err = terms.validate().unwrap_err();
        match err {
            MortgageError::InvalidInput { field, .. } => assert_eq!(field, "annual_hoa"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_validate_rejects_zero_term() {
        let mut terms = sample_terms();
        terms.term_years = 0;
        assert!(terms.validate().is_err());
    }

    #[test]
    fn test_deserialize_defaults_costs() {
        let terms: LoanTerms = serde_json::from_str(
            r#"{"principal": 200000, "annual_rate_pct": 5, "term_years": 15, "start_date": "2025-03-01"}"#,
        )
        .unwrap();
        assert_eq!(terms.carrying_costs(), CarryingCosts::default());
        assert_eq!(terms.down_payment, None);
    }
}
