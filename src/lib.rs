//! `finance_projections` turns loan, income and savings parameters into periodic
//! financial series for a personal-finance tracker.
//!
//! It covers three core calculations:
//! - **Loan amortization**: derive a fixed monthly payment, build the month-by-month
//!   schedule to payoff, and compare two schedules of different lengths.
//! - **Income projection**: find the next pay date for weekly, bi-weekly or monthly
//!   pay, fill in hours, gross pay, taxes and net pay, and count pays in a month.
//! - **Savings planning**: count the pays left before a deadline and work out how
//!   much to save from each one.
//!
//! Alongside them sit a monthly budget roll-up ([`summary`]) and a daily
//! valuation of stock holdings ([`portfolio`]).
//!
//! Money is represented with `rust_decimal::Decimal`. Every calculation is a pure
//! function of its inputs; the current time is always passed in by the caller.
//!
//! ## Usage
//!
//! ```rust
//! use finance_projections::{Loan, SavingsCalculationRequest, PayFrequency};
//! use chrono::{TimeZone, Utc};
//! use rust_decimal_macros::dec;
//!
//! fn main() {
//!     let loan = Loan {
//!         name: "Car".to_string(),
//!         total: dec!(10000),
//!         interest_rate: dec!(4),
//!         loan_term: 60,
//!         ..Loan::default()
//!     };
//!
//!     match loan.calculate() {
//!         Ok(loan) => {
//!             println!("Monthly Payment: {:.2}", loan.monthly_payment);
//!             println!("Total Interest:  {:.2}", loan.interest);
//!             println!("Total Cost:      {:.2}", loan.total_cost);
//!         }
//!         Err(e) => eprintln!("Error calculating loan: {}", e),
//!     }
//!
//!     let request = SavingsCalculationRequest {
//!         goal: dec!(1200),
//!         deadline: Some(Utc.with_ymd_and_hms(2024, 4, 10, 0, 0, 0).unwrap()),
//!         pay_frequency: Some(PayFrequency::Monthly),
//!         next_pay: Some(Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap()),
//!         ..SavingsCalculationRequest::default()
//!     };
//!     let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
//!     let response = request.calculate(now).unwrap();
//!     assert_eq!(response.num_pays, 4);
//!     assert_eq!(response.per_pay, dec!(300));
//! }
//! ```

pub mod calendar;
pub mod error;
pub mod frequency;
pub mod income;
pub mod loan;
pub mod portfolio;
pub mod savings;
pub mod summary;

pub use error::{FinanceError, Result};
pub use frequency::{IncomeType, PayFrequency};
pub use income::{Income, project_next_pay_date};
pub use loan::{
    Amortization, Loan, LoansSummary, PaymentPlan, PaymentScheduleComparisonItem,
    PaymentScheduleItem, amortize, compare_schedules, compute_monthly_payment,
};
pub use portfolio::{PortfolioPosition, UserStock, UserStockPortfolioSummary};
pub use savings::{
    SavingsCalculationRequest, SavingsCalculationResponse, count_pays_before_deadline, round2,
};
pub use summary::{Bill, CreditCard, Summary};
