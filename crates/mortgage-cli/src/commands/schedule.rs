use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use mortgage_core::schedule::{self, ExtraPayments, ScheduleInput};
use mortgage_core::LoanTerms;

use super::payment::CarryingCostArgs;
use crate::input;

/// Arguments for the amortisation schedule
#[derive(Args)]
pub struct ScheduleArgs {
    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Amount borrowed
    #[arg(long)]
    pub loan_amount: Option<Decimal>,

    /// Annual interest rate in percent (e.g. 6.5)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Loan term in years
    #[arg(long)]
    pub term: Option<u32>,

    /// Date of the first payment, YYYY-MM-DD (defaults to today)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Extra principal payments as month:amount pairs, e.g. 12:5000,24:5000
    #[arg(long)]
    pub extra: Option<String>,

    /// Down payment
    #[arg(long)]
    pub down_payment: Option<Decimal>,

    #[command(flatten)]
    pub costs: CarryingCostArgs,
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let schedule_input: ScheduleInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        let start_date = args
            .start_date
            .unwrap_or_else(|| chrono::Local::now().date_naive());
        let mut loan = LoanTerms::new(
            args.loan_amount
                .ok_or("--loan-amount is required (or provide --input)")?,
            args.rate.ok_or("--rate is required (or provide --input)")?,
            args.term.ok_or("--term is required (or provide --input)")?,
            start_date,
        )
        .with_carrying_costs(&args.costs.to_costs());
        loan.down_payment = args.down_payment;

        let extra_payments = match args.extra {
            Some(ref raw) => parse_extra_payments(raw)?,
            None => ExtraPayments::new(),
        };
        ScheduleInput {
            loan,
            extra_payments,
        }
    };
    let result = schedule::compute_schedule(&schedule_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Parse `month:amount` pairs separated by commas. A repeated month keeps
/// the last amount.
fn parse_extra_payments(raw: &str) -> Result<ExtraPayments, Box<dyn std::error::Error>> {
    let mut extras = ExtraPayments::new();
    for pair in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (month, amount) = pair
            .split_once(':')
            .ok_or_else(|| format!("Invalid extra payment '{}': expected month:amount", pair))?;
        let month: u32 = month
            .trim()
            .parse()
            .map_err(|_| format!("Invalid month in '{}'", pair))?;
        let amount: Decimal = amount
            .trim()
            .parse()
            .map_err(|_| format!("Invalid amount in '{}'", pair))?;
        extras.insert(month, amount)?;
    }
    Ok(extras)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_extra_payments() {
        let extras = parse_extra_payments("12:5000, 24:2500.50").unwrap();
        assert_eq!(extras.len(), 2);
        assert_eq!(extras.get(12), Some(dec!(5000)));
        assert_eq!(extras.get(24), Some(dec!(2500.50)));
    }

    #[test]
    fn test_parse_extra_payments_last_wins() {
        let extras = parse_extra_payments("6:100,6:300").unwrap();
        assert_eq!(extras.get(6), Some(dec!(300)));
    }

    #[test]
    fn test_parse_extra_payments_rejects_garbage() {
        assert!(parse_extra_payments("12-5000").is_err());
        assert!(parse_extra_payments("x:5000").is_err());
        assert!(parse_extra_payments("12:lots").is_err());
        assert!(parse_extra_payments("0:100").is_err());
        assert!(parse_extra_payments("3:-100").is_err());
    }

    #[test]
    fn test_parse_empty_is_empty() {
        assert!(parse_extra_payments("").unwrap().is_empty());
    }
}
