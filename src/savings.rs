//! Savings planning: how many pays remain before a deadline and what they add up to.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{FinanceError, Result};
use crate::frequency::PayFrequency;

/// A savings plan as submitted by the product. Missing dates or frequency deserialize to `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SavingsCalculationRequest {
    /// Amount to have saved by the deadline.
    pub goal: Decimal,
    /// Amount set aside from every pay.
    pub amount: Decimal,
    pub deadline: Option<DateTime<Utc>>,
    pub pay_frequency: Option<PayFrequency>,
    pub next_pay: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsCalculationResponse {
    pub goal: Decimal,
    /// Amount to save from each pay to reach the goal, rounded to cents.
    pub per_pay: Decimal,
    /// The requested per-pay amount, passed through.
    pub man_per_pay: Decimal,
    /// Amount saved by the deadline at `man_per_pay`.
    pub actual: Decimal,
    pub num_pays: u32,
    pub deadline: DateTime<Utc>,
}

/// Rounds a money amount to cents, halves away from zero.
pub fn round2(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Counts pays from `next_pay` through `deadline`, both inclusive.
///
/// Returns 0 when the deadline has already passed at `now` or the next pay falls after it.
pub fn count_pays_before_deadline(
    next_pay: DateTime<Utc>,
    deadline: DateTime<Utc>,
    frequency: PayFrequency,
    now: DateTime<Utc>,
) -> u32 {
    if deadline < now {
        debug!(%deadline, "deadline is in the past");
        return 0;
    }
    if next_pay > deadline {
        debug!(%next_pay, %deadline, "next pay is after deadline");
        return 0;
    }

    let mut pays = 0;
    while frequency.occurrence(next_pay, pays) <= deadline {
        pays += 1;
    }
    pays
}

impl SavingsCalculationRequest {
    /// Works out the per-pay amount needed for the goal and what the fixed amount adds up to.
    ///
    /// # Errors
    ///
    /// Returns [`FinanceError::InvalidInput`] when neither a goal nor an amount is
    /// set, either is negative, the deadline, pay frequency or next pay date is missing,
    /// or the amount saved by the deadline does not fit in a `Decimal`.
    pub fn calculate(&self, now: DateTime<Utc>) -> Result<SavingsCalculationResponse> {
        if self.goal < Decimal::ZERO || self.amount < Decimal::ZERO {
            return Err(FinanceError::invalid("goal and amount cannot be negative"));
        }
        if self.goal.is_zero() && self.amount.is_zero() {
            return Err(FinanceError::invalid("goal or amount is required"));
        }
        let deadline = self
            .deadline
            .ok_or_else(|| FinanceError::invalid("deadline is required"))?;
        let frequency = self
            .pay_frequency
            .ok_or_else(|| FinanceError::invalid("pay frequency is required"))?;
        let next_pay = self
            .next_pay
            .ok_or_else(|| FinanceError::invalid("next pay date is required"))?;

        let num_pays = count_pays_before_deadline(next_pay, deadline, frequency, now);
        let pays = Decimal::from(num_pays);

        // No pays left means nothing can be set aside, not an infinite amount.
        let per_pay = if self.goal.is_zero() || num_pays == 0 {
            Decimal::ZERO
        } else {
            round2(self.goal / pays)
        };

        let actual = if self.amount > Decimal::ZERO {
            pays
                .checked_mul(self.amount)
                .ok_or_else(|| FinanceError::overflow("amount saved by the deadline"))?
        } else {
            Decimal::ZERO
        };

        Ok(SavingsCalculationResponse {
            goal: self.goal,
            per_pay,
            man_per_pay: self.amount,
            actual,
            num_pays,
            deadline,
        })
    }
}
