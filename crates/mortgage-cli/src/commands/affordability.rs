use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use mortgage_core::affordability::{self, AffordabilityInput};

use crate::input;

/// Arguments for the 28/36 affordability estimate
#[derive(Args)]
pub struct AffordabilityArgs {
    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Gross monthly income
    #[arg(long)]
    pub income: Option<Decimal>,

    /// Existing monthly debt payments
    #[arg(long)]
    pub debts: Option<Decimal>,

    /// Annual interest rate in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Loan term in years
    #[arg(long)]
    pub term: Option<u32>,

    /// Cash available for the down payment
    #[arg(long)]
    pub down_payment: Option<Decimal>,

    /// Annual property tax
    #[arg(long)]
    pub property_tax: Option<Decimal>,

    /// Annual homeowners insurance
    #[arg(long)]
    pub insurance: Option<Decimal>,
}

pub fn run_affordability(args: AffordabilityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let afford_input: AffordabilityInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        AffordabilityInput {
            monthly_income: args.income.ok_or("--income is required (or provide --input)")?,
            monthly_debts: args.debts.unwrap_or(Decimal::ZERO),
            annual_rate_pct: args.rate.ok_or("--rate is required (or provide --input)")?,
            term_years: args.term.ok_or("--term is required (or provide --input)")?,
            down_payment: args.down_payment.unwrap_or(Decimal::ZERO),
            annual_property_tax: args.property_tax.unwrap_or(Decimal::ZERO),
            annual_home_insurance: args.insurance.unwrap_or(Decimal::ZERO),
        }
    };
    let result = affordability::estimate_affordability(&afford_input)?;
    Ok(serde_json::to_value(result)?)
}
