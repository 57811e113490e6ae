use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar;
use crate::error::FinanceError;

/// Cadence at which an income event recurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PayFrequency {
    #[serde(rename = "weekly")]
    Weekly,
    #[serde(rename = "bi-weekly")]
    BiWeekly,
    #[serde(rename = "monthly")]
    Monthly,
}

impl PayFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayFrequency::Weekly => "weekly",
            PayFrequency::BiWeekly => "bi-weekly",
            PayFrequency::Monthly => "monthly",
        }
    }

    /// Returns the `occurrence`-th pay date counting from `anchor` (occurrence 0 is the anchor).
    ///
    /// Monthly occurrences are computed from the anchor rather than chained, so a
    /// day clamped at a short month does not drift for the rest of the series.
    pub fn occurrence(&self, anchor: DateTime<Utc>, occurrence: u32) -> DateTime<Utc> {
        match self {
            PayFrequency::Weekly => anchor + Duration::days(7 * i64::from(occurrence)),
            PayFrequency::BiWeekly => anchor + Duration::days(14 * i64::from(occurrence)),
            PayFrequency::Monthly => calendar::add_months(anchor, occurrence),
        }
    }
}

impl fmt::Display for PayFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PayFrequency {
    type Err = FinanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weekly" => Ok(PayFrequency::Weekly),
            "bi-weekly" => Ok(PayFrequency::BiWeekly),
            "monthly" => Ok(PayFrequency::Monthly),
            other => Err(FinanceError::invalid(format!(
                "unsupported pay frequency '{other}', expected weekly, bi-weekly or monthly"
            ))),
        }
    }
}

/// How an income's rate is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncomeType {
    /// `rate` is paid per hour worked.
    Hourly,
    /// `rate` is the gross amount of each pay.
    Salary,
}

impl FromStr for IncomeType {
    type Err = FinanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hourly" => Ok(IncomeType::Hourly),
            "salary" => Ok(IncomeType::Salary),
            other => Err(FinanceError::invalid(format!(
                "unsupported income type '{other}', expected hourly or salary"
            ))),
        }
    }
}
