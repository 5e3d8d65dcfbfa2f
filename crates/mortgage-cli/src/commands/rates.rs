use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use mortgage_core::rates::{self, QuoteComparisonInput, RateQuote};

use crate::input;

/// Arguments for pricing a published rate quote
#[derive(Args)]
pub struct RatesArgs {
    /// Path to a rate quote file, or a full comparison input when
    /// --loan-amount is omitted
    #[arg(long)]
    pub input: Option<String>,

    /// Amount borrowed
    #[arg(long)]
    pub loan_amount: Option<Decimal>,

    /// Earlier rate quote to report day-over-day movements against
    #[arg(long)]
    pub previous: Option<String>,
}

pub fn run_rates(args: RatesArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let quote_input: QuoteComparisonInput = match (&args.input, args.loan_amount) {
        (Some(path), Some(loan_amount)) => {
            let quote: RateQuote = input::file::read_input(path)?;
            let previous = match args.previous {
                Some(ref prev) => Some(input::file::read_input(prev)?),
                None => None,
            };
            QuoteComparisonInput {
                loan_amount,
                quote,
                previous,
            }
        }
        (Some(path), None) => input::file::read_input(path)?,
        (None, _) => match input::stdin::read_stdin()? {
            Some(data) => data,
            None => return Err("--input <quote.json> or stdin required for rate quotes".into()),
        },
    };
    let result = rates::compute_quote_comparison(&quote_input)?;
    Ok(serde_json::to_value(result)?)
}
