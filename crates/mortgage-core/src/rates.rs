use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Instant;

use crate::comparison::{self, ComparisonOutput, ComparisonRow};
use crate::error::MortgageError;
use crate::types::*;
use crate::MortgageResult;

/// Published mortgage products a rate quote may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateProduct {
    #[serde(alias = "thirty_year_fixed")]
    Fixed30,
    #[serde(alias = "fifteen_year_fixed")]
    Fixed15,
    #[serde(rename = "arm_5_1", alias = "five_one_arm")]
    Arm5_1,
    #[serde(rename = "arm_7_1", alias = "seven_one_arm")]
    Arm7_1,
}

impl RateProduct {
    pub const ALL: [RateProduct; 4] = [
        RateProduct::Fixed30,
        RateProduct::Fixed15,
        RateProduct::Arm5_1,
        RateProduct::Arm7_1,
    ];

    /// Amortisation term in years. ARMs amortise over 30 years.
    pub fn term_years(self) -> u32 {
        match self {
            RateProduct::Fixed15 => 15,
            RateProduct::Fixed30 | RateProduct::Arm5_1 | RateProduct::Arm7_1 => 30,
        }
    }

    pub fn is_adjustable(self) -> bool {
        matches!(self, RateProduct::Arm5_1 | RateProduct::Arm7_1)
    }
}

impl fmt::Display for RateProduct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RateProduct::Fixed30 => "30-Year Fixed",
            RateProduct::Fixed15 => "15-Year Fixed",
            RateProduct::Arm5_1 => "5/1 ARM",
            RateProduct::Arm7_1 => "7/1 ARM",
        };
        f.write_str(name)
    }
}

/// A snapshot of published reference rates, supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateQuote {
    /// Annual rates in percent, keyed by product.
    pub rates: BTreeMap<RateProduct, Percent>,
    pub last_updated: DateTime<Utc>,
}

impl RateQuote {
    pub fn rate(&self, product: RateProduct) -> Option<Percent> {
        self.rates.get(&product).copied()
    }

    pub fn validate(&self) -> MortgageResult<()> {
        for (product, rate) in &self.rates {
            if *rate < Decimal::ZERO {
                return Err(MortgageError::negative_rate(&format!("rates.{product}")));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateDirection {
    Up,
    Down,
    Unchanged,
}

/// Change in one product's rate between two quotes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateMovement {
    pub product: RateProduct,
    pub previous: Percent,
    pub current: Percent,
    /// Absolute size of the move in percentage points.
    pub change: Percent,
    pub direction: RateDirection,
}

/// Compare `product` across two quotes. `None` when either quote lacks it.
pub fn rate_movement(
    previous: &RateQuote,
    current: &RateQuote,
    product: RateProduct,
) -> Option<RateMovement> {
    let before = previous.rate(product)?;
    let now = current.rate(product)?;
    let delta = now - before;
    let direction = if delta > Decimal::ZERO {
        RateDirection::Up
    } else if delta < Decimal::ZERO {
        RateDirection::Down
    } else {
        RateDirection::Unchanged
    };
    Some(RateMovement {
        product,
        previous: before,
        current: now,
        change: delta.abs(),
        direction,
    })
}

/// Price `loan_amount` under every product in the quote at its own term, in
/// product order. ARM rows use the introductory rate for the whole term.
pub fn compare_quote(loan_amount: Money, quote: &RateQuote) -> MortgageResult<Vec<ComparisonRow>> {
    quote.validate()?;
    quote
        .rates
        .iter()
        .map(|(&product, &rate)| {
            let label = format!("{product} at {}%", rate.normalize());
            comparison::price_scenario(label, loan_amount, rate, product.term_years())
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteComparisonInput {
    pub loan_amount: Money,
    pub quote: RateQuote,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<RateQuote>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteComparisonOutput {
    #[serde(flatten)]
    pub comparison: ComparisonOutput,
    pub quoted_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub movements: Vec<RateMovement>,
}

/// Enveloped quote comparison, with rate movements when a previous quote is
/// supplied.
pub fn compute_quote_comparison(
    input: &QuoteComparisonInput,
) -> MortgageResult<ComputationOutput<QuoteComparisonOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let rows = compare_quote(input.loan_amount, &input.quote)?;
    if rows.is_empty() {
        warnings.push("Rate quote contains no products".into());
    }
    if input.quote.rates.keys().any(|p| p.is_adjustable()) {
        warnings.push(
            "ARM payments use the introductory rate for the full term; resets are not modelled"
                .into(),
        );
    }

    let movements = match &input.previous {
        Some(prev) => {
            prev.validate()?;
            RateProduct::ALL
                .iter()
                .filter_map(|&p| rate_movement(prev, &input.quote, p))
                .collect()
        }
        None => Vec::new(),
    };

    let output = QuoteComparisonOutput {
        comparison: ComparisonOutput {
            lowest_payment: comparison::cheapest_by_payment(&rows).map(|r| r.id.clone()),
            lowest_total_interest: comparison::cheapest_by_interest(&rows).map(|r| r.id.clone()),
            rows,
        },
        quoted_at: input.quote.last_updated,
        movements,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Published Rate Quote Comparison",
        &serde_json::json!({
            "loan_amount": input.loan_amount.to_string(),
            "quoted_at": input.quote.last_updated.to_rfc3339(),
            "products": input.quote.rates.len(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn quote(fixed30: Percent) -> RateQuote {
        let mut rates = BTreeMap::new();
        rates.insert(RateProduct::Fixed30, fixed30);
        rates.insert(RateProduct::Fixed15, dec!(5.75));
        rates.insert(RateProduct::Arm5_1, dec!(5.25));
        rates.insert(RateProduct::Arm7_1, dec!(5.5));
        RateQuote {
            rates,
            last_updated: Utc.with_ymd_and_hms(2025, 5, 1, 14, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_compare_quote_uses_product_terms() {
        let rows = compare_quote(dec!(300000), &quote(dec!(6.5))).unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].label, "30-Year Fixed at 6.5%");
        assert_eq!(rows[1].applied_term_years, 15);
        assert_eq!(rows[2].label, "5/1 ARM at 5.25%");
        assert_eq!(rows[2].applied_term_years, 30);
    }

    #[test]
    fn test_rate_movement() {
        let prev = quote(dec!(6.5));
        let now = quote(dec!(6.62));
        let m = rate_movement(&prev, &now, RateProduct::Fixed30).unwrap();
        assert_eq!(m.direction, RateDirection::Up);
        assert_eq!(m.change, dec!(0.12));

        let m = rate_movement(&now, &prev, RateProduct::Fixed30).unwrap();
        assert_eq!(m.direction, RateDirection::Down);

        let m = rate_movement(&prev, &prev, RateProduct::Fixed15).unwrap();
        assert_eq!(m.direction, RateDirection::Unchanged);
    }

    #[test]
    fn test_movement_missing_product() {
        let prev = quote(dec!(6.5));
        let mut now = quote(dec!(6.5));
        now.rates.remove(&RateProduct::Arm7_1);
        assert!(rate_movement(&prev, &now, RateProduct::Arm7_1).is_none());
    }

    #[test]
    fn test_negative_quote_rejected() {
        let mut q = quote(dec!(6.5));
        q.rates.insert(RateProduct::Fixed15, dec!(-1));
        assert!(compare_quote(dec!(300000), &q).is_err());
    }

    #[test]
    fn test_deserialize_legacy_names() {
        let q: RateQuote = serde_json::from_str(
            r#"{"rates": {"thirty_year_fixed": 6.5, "five_one_arm": 5.25},
                "last_updated": "2025-05-01T14:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(q.rate(RateProduct::Fixed30), Some(dec!(6.5)));
        assert_eq!(q.rate(RateProduct::Arm5_1), Some(dec!(5.25)));
    }

    #[test]
    fn test_compute_quote_comparison_with_previous() {
        let input = QuoteComparisonInput {
            loan_amount: dec!(300000),
            quote: quote(dec!(6.4)),
            previous: Some(quote(dec!(6.5))),
        };
        let out = compute_quote_comparison(&input).unwrap();
        assert_eq!(out.result.movements.len(), 4);
        assert_eq!(out.result.movements[0].direction, RateDirection::Down);
        assert!(out.warnings.iter().any(|w| w.contains("ARM")));
    }
}
