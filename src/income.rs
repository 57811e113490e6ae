//! Pay-date projection and per-month earnings for recurring income.

use chrono::{DateTime, Datelike, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calendar;
use crate::error::{FinanceError, Result};
use crate::frequency::{IncomeType, PayFrequency};

/// Hours assumed for one week of work when an income does not specify hours.
pub const HOURS_PER_WEEK: u32 = 40;

/// Hours assumed for each weekday of a monthly pay period.
pub const HOURS_PER_WORKDAY: u32 = 8;

/// A recurring income source.
///
/// `hours`, `taxes` and the pay amounts may be left at zero and filled in by
/// [`Income::populate_derived`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Income {
    #[serde(default)]
    pub name: String,
    /// Hourly wage for [`IncomeType::Hourly`], amount per pay for [`IncomeType::Salary`].
    pub rate: Decimal,
    #[serde(default)]
    pub hours: Decimal,
    #[serde(rename = "type")]
    pub income_type: IncomeType,
    pub frequency: PayFrequency,
    /// Fraction of gross pay withheld, e.g. 0.25.
    #[serde(default)]
    pub tax_percentage: Decimal,
    /// The first pay date; later pay dates are projected from it.
    pub start_dt: DateTime<Utc>,
    #[serde(default)]
    pub next_dt: Option<DateTime<Utc>>,
    #[serde(default)]
    pub gross_pay: Decimal,
    #[serde(default)]
    pub taxes: Decimal,
    #[serde(default)]
    pub net_pay: Decimal,
}

/// First occurrence of `frequency` counted from `anchor` that is not before `target`.
pub(crate) fn first_occurrence_on_or_after(
    frequency: PayFrequency,
    anchor: DateTime<Utc>,
    target: DateTime<Utc>,
) -> DateTime<Utc> {
    let mut occurrence = 0;
    loop {
        let date = frequency.occurrence(anchor, occurrence);
        if date >= target {
            return date;
        }
        occurrence += 1;
    }
}

/// Projects the next pay date on or after `as_of`.
///
/// Weekly pay falls on the weekday of `start_dt`, searched from the start of
/// `as_of`'s day. Bi-weekly and monthly pay step from the start of `start_dt`'s day.
pub fn project_next_pay_date(
    frequency: PayFrequency,
    start_dt: DateTime<Utc>,
    as_of: DateTime<Utc>,
) -> DateTime<Utc> {
    match frequency {
        PayFrequency::Weekly => {
            calendar::next_weekday_on_or_after(calendar::start_of_day(as_of), start_dt.weekday())
        }
        PayFrequency::BiWeekly | PayFrequency::Monthly => {
            first_occurrence_on_or_after(frequency, calendar::start_of_day(start_dt), as_of)
        }
    }
}

impl Income {
    pub fn new(
        name: impl Into<String>,
        rate: Decimal,
        income_type: IncomeType,
        frequency: PayFrequency,
        start_dt: DateTime<Utc>,
    ) -> Self {
        Income {
            name: name.into(),
            rate,
            hours: Decimal::ZERO,
            income_type,
            frequency,
            tax_percentage: Decimal::ZERO,
            start_dt,
            next_dt: None,
            gross_pay: Decimal::ZERO,
            taxes: Decimal::ZERO,
            net_pay: Decimal::ZERO,
        }
    }

    fn default_hours(&self, next_dt: DateTime<Utc>) -> Decimal {
        let hours = match self.frequency {
            PayFrequency::Weekly => HOURS_PER_WEEK,
            PayFrequency::BiWeekly => HOURS_PER_WEEK * 2,
            PayFrequency::Monthly => calendar::weekdays_in_month(next_dt) * HOURS_PER_WORKDAY,
        };
        Decimal::from(hours)
    }

    /// Returns a copy with the next pay date, hours, gross pay, taxes and net pay filled in.
    ///
    /// Hours are only derived when zero. Taxes and net pay are only derived when
    /// taxes are zero, so running this twice leaves them as the first run set them.
    ///
    /// # Errors
    ///
    /// Returns [`FinanceError::InvalidInput`] if the rate is not positive, the tax
    /// percentage is negative, or gross pay or taxes overflow a `Decimal`.
    pub fn populate_derived(&self, as_of: DateTime<Utc>) -> Result<Income> {
        if self.rate <= Decimal::ZERO {
            return Err(FinanceError::invalid("rate is required"));
        }
        if self.tax_percentage < Decimal::ZERO {
            return Err(FinanceError::invalid("tax percentage cannot be negative"));
        }

        let next_dt = project_next_pay_date(self.frequency, self.start_dt, as_of);

        let hours = if self.hours.is_zero() {
            self.default_hours(next_dt)
        } else {
            self.hours
        };

        let gross_pay = match self.income_type {
            IncomeType::Hourly => self
                .rate
                .checked_mul(hours)
                .ok_or_else(|| FinanceError::overflow("gross pay"))?,
            IncomeType::Salary => self.rate,
        };

        let (taxes, net_pay) = if self.taxes.is_zero() {
            let taxes = gross_pay
                .checked_mul(self.tax_percentage)
                .ok_or_else(|| FinanceError::overflow("taxes"))?;
            (taxes, gross_pay - taxes)
        } else {
            (self.taxes, self.net_pay)
        };

        debug!(income = %self.name, %next_dt, %hours, %gross_pay, "populated income");

        Ok(Income {
            hours,
            next_dt: Some(next_dt),
            gross_pay,
            taxes,
            net_pay,
            ..self.clone()
        })
    }

    /// Counts pay events falling in the calendar month containing `month_containing`.
    pub fn count_pays_in_month(&self, month_containing: DateTime<Utc>) -> u32 {
        let month_begin = calendar::month_begin(month_containing);
        let month_end = calendar::month_end(month_containing);

        if self.start_dt > month_end {
            return 0;
        }

        let (mut date, step) = match self.frequency {
            PayFrequency::Monthly => return 1,
            PayFrequency::Weekly => {
                let window_start = month_begin.max(calendar::start_of_day(self.start_dt));
                let first = calendar::next_weekday_on_or_after(window_start, self.start_dt.weekday());
                (first, Duration::days(7))
            }
            PayFrequency::BiWeekly => {
                let first = first_occurrence_on_or_after(self.frequency, self.start_dt, month_begin);
                (first, Duration::days(14))
            }
        };

        let mut pays = 0;
        while date <= month_end {
            pays += 1;
            date += step;
        }
        pays
    }

    fn per_month(&self, amount: Decimal, what: &str, month_containing: DateTime<Utc>) -> Result<Decimal> {
        amount
            .checked_mul(Decimal::from(self.count_pays_in_month(month_containing)))
            .ok_or_else(|| FinanceError::overflow(what))
    }

    pub fn monthly_net_pay(&self, month_containing: DateTime<Utc>) -> Result<Decimal> {
        self.per_month(self.net_pay, "monthly net pay", month_containing)
    }

    pub fn monthly_gross_pay(&self, month_containing: DateTime<Utc>) -> Result<Decimal> {
        self.per_month(self.gross_pay, "monthly gross pay", month_containing)
    }

    pub fn monthly_taxes(&self, month_containing: DateTime<Utc>) -> Result<Decimal> {
        self.per_month(self.taxes, "monthly taxes", month_containing)
    }

    /// Checks that a populated income carries everything needed to be stored.
    pub fn validate_for_save(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(FinanceError::invalid("income name is required"));
        }
        if self.gross_pay <= Decimal::ZERO {
            return Err(FinanceError::invalid("gross pay is required"));
        }
        if self.hours <= Decimal::ZERO {
            return Err(FinanceError::invalid("hours are required"));
        }
        if self.rate <= Decimal::ZERO {
            return Err(FinanceError::invalid("pay rate is required"));
        }
        if self.tax_percentage < Decimal::ZERO {
            return Err(FinanceError::invalid("tax percentage cannot be negative"));
        }
        Ok(())
    }
}
