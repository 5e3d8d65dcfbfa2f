mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::affordability::AffordabilityArgs;
use commands::compare::CompareArgs;
use commands::payment::PaymentArgs;
use commands::rates::RatesArgs;
use commands::schedule::ScheduleArgs;

/// Mortgage payment, amortisation and affordability calculations
#[derive(Parser)]
#[command(
    name = "mtg",
    version,
    about = "Mortgage payment, amortisation and affordability calculations",
    long_about = "A CLI for fixed-rate mortgage economics with decimal precision. \
                  Computes monthly payments, amortisation schedules with extra \
                  principal payments, 28/36 affordability, rate/term comparisons \
                  and published rate quotes."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Monthly payment with tax, insurance, PMI and HOA breakdown
    Payment(PaymentArgs),
    /// Month-by-month amortisation schedule with optional extra payments
    Schedule(ScheduleArgs),
    /// Maximum loan and home price under the 28/36 rule
    Affordability(AffordabilityArgs),
    /// Compare payments and interest across rates and terms
    Compare(CompareArgs),
    /// Price a loan under a published rate quote
    Rates(RatesArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Payment(args) => commands::payment::run_payment(args),
        Commands::Schedule(args) => commands::schedule::run_schedule(args),
        Commands::Affordability(args) => commands::affordability::run_affordability(args),
        Commands::Compare(args) => commands::compare::run_compare(args),
        Commands::Rates(args) => commands::rates::run_rates(args),
        Commands::Version => {
            println!("mtg {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            log::debug!("command failed: {:?}", e);
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
