use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use mortgage_core::comparison::{self, ComparisonInput, DEFAULT_COMPARISON_TERMS};

use crate::input;

/// Increments either side of `--around`.
const SWEEP_STEPS: u32 = 2;

/// Arguments for the rate x term comparison
#[derive(Args)]
pub struct CompareArgs {
    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Amount borrowed
    #[arg(long)]
    pub loan_amount: Option<Decimal>,

    /// Candidate annual rates in percent, comma separated
    #[arg(long, value_delimiter = ',', conflicts_with = "around")]
    pub rates: Vec<Decimal>,

    /// Compare rates either side of this one
    #[arg(long)]
    pub around: Option<Decimal>,

    /// Spacing between swept rates, in percentage points
    #[arg(long, default_value = "0.5")]
    pub step: Decimal,

    /// Loan terms in years, comma separated
    #[arg(long, value_delimiter = ',')]
    pub terms: Vec<u32>,
}

pub fn run_compare(args: CompareArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let compare_input: ComparisonInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        let interest_rates = match args.around {
            Some(base) => comparison::rate_sweep(base, args.step, SWEEP_STEPS)?,
            None if !args.rates.is_empty() => args.rates,
            None => return Err("--rates or --around is required (or provide --input)".into()),
        };
        let loan_terms = if args.terms.is_empty() {
            DEFAULT_COMPARISON_TERMS.to_vec()
        } else {
            args.terms
        };
        ComparisonInput {
            loan_amount: args
                .loan_amount
                .ok_or("--loan-amount is required (or provide --input)")?,
            interest_rates,
            loan_terms,
        }
    };
    let result = comparison::compute_comparison(&compare_input)?;
    Ok(serde_json::to_value(result)?)
}
