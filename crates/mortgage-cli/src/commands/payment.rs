use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use mortgage_core::payment::{self, PaymentInput};
use mortgage_core::CarryingCosts;

use crate::input;

/// Annual carrying-cost flags shared by `payment` and `schedule`.
#[derive(Args, Debug, Default)]
pub struct CarryingCostArgs {
    /// Annual property tax
    #[arg(long)]
    pub property_tax: Option<Decimal>,

    /// Annual homeowners insurance
    #[arg(long)]
    pub insurance: Option<Decimal>,

    /// Annual private mortgage insurance
    #[arg(long)]
    pub pmi: Option<Decimal>,

    /// Annual HOA dues
    #[arg(long)]
    pub hoa: Option<Decimal>,
}

impl CarryingCostArgs {
    pub fn to_costs(&self) -> CarryingCosts {
        CarryingCosts {
            annual_property_tax: self.property_tax.unwrap_or(Decimal::ZERO),
            annual_home_insurance: self.insurance.unwrap_or(Decimal::ZERO),
            annual_pmi: self.pmi.unwrap_or(Decimal::ZERO),
            annual_hoa: self.hoa.unwrap_or(Decimal::ZERO),
        }
    }
}

/// Arguments for the monthly payment calculation
#[derive(Args)]
pub struct PaymentArgs {
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

    /// Down payment, used for the loan-to-value check
    #[arg(long)]
    pub down_payment: Option<Decimal>,

    #[command(flatten)]
    pub costs: CarryingCostArgs,
}

pub fn run_payment(args: PaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let payment_input: PaymentInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        PaymentInput {
            loan_amount: args
                .loan_amount
                .ok_or("--loan-amount is required (or provide --input)")?,
            annual_rate_pct: args.rate.ok_or("--rate is required (or provide --input)")?,
            term_years: args.term.ok_or("--term is required (or provide --input)")?,
            carrying_costs: args.costs.to_costs(),
            down_payment: args.down_payment,
        }
    };
    let result = payment::compute_payment(&payment_input)?;
    Ok(serde_json::to_value(result)?)
}
