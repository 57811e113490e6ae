//! Savings calculator - how much to put aside from each pay to reach a goal.
//!
//! # Usage
//!
//! ```bash
//! # Save 1200 by April 10th, paid monthly from January 10th
//! savings-calculator --goal 1200 --pay-frequency monthly --next-pay 2024-01-10 --deadline 2024-04-10
//!
//! # See what 50 a week adds up to
//! savings-calculator --amount 50 --pay-frequency weekly --next-pay 2024-01-10 --deadline 2024-04-10 --json
//! ```

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clap::Parser;
use rust_decimal::Decimal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use finance_projections::{PayFrequency, SavingsCalculationRequest, SavingsCalculationResponse};

#[derive(Parser, Debug)]
#[command(name = "savings-calculator")]
#[command(version, about = "Work out how much to save from each pay before a deadline", long_about = None)]
struct Args {
    /// Savings goal
    #[arg(long, env = "SAVINGS_GOAL", default_value = "0")]
    goal: Decimal,

    /// Amount to save from each pay
    #[arg(long, env = "SAVINGS_AMOUNT", default_value = "0")]
    amount: Decimal,

    /// Frequency of pay: weekly, bi-weekly or monthly
    #[arg(long, env = "SAVINGS_PAY_FREQUENCY")]
    pay_frequency: PayFrequency,

    /// Next pay date in YYYY-MM-DD format
    #[arg(long, env = "SAVINGS_NEXT_PAY", value_parser = parse_date)]
    next_pay: DateTime<Utc>,

    /// Deadline for the goal in YYYY-MM-DD format
    #[arg(long, env = "SAVINGS_DEADLINE", value_parser = parse_date)]
    deadline: DateTime<Utc>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

fn parse_date(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")?;
    Ok(date.and_time(NaiveTime::MIN).and_utc())
}

fn print_report(response: &SavingsCalculationResponse) {
    println!("Deadline: {}", response.deadline.format("%Y-%m-%d"));
    println!("Number of pays before deadline: {}", response.num_pays);

    if response.goal > Decimal::ZERO {
        println!("Goal Details:");
        println!("  Goal: ${:.2}", response.goal);
        println!("  Save per pay: ${:.2}", response.per_pay);
    }

    if response.actual > Decimal::ZERO {
        println!("Savings Details:");
        println!("  Amount saving per pay: ${:.2}", response.man_per_pay);
        println!("  Amount saved by deadline: ${:.2}", response.actual);
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let request = SavingsCalculationRequest {
        goal: args.goal,
        amount: args.amount,
        deadline: Some(args.deadline),
        pay_frequency: Some(args.pay_frequency),
        next_pay: Some(args.next_pay),
    };

    let response = request
        .calculate(Utc::now())
        .context("savings calculation request is invalid")?;

    info!(
        num_pays = response.num_pays,
        frequency = %args.pay_frequency,
        "calculated savings plan"
    );

    if args.json {
        let json = serde_json::to_string_pretty(&response).context("failed to serialize result")?;
        println!("{json}");
    } else {
        print_report(&response);
    }

    Ok(())
}
