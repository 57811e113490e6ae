//! Daily valuation of a user's stock holdings.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{FinanceError, Result};
use crate::savings::round2;

/// A user's holding of one ticker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserStock {
    pub user_id: i64,
    pub ticker: String,
    /// Number of shares held. Fractional shares are allowed.
    pub quantity: Decimal,
    pub effective_dt: Option<DateTime<Utc>>,
    pub expiration_dt: Option<DateTime<Utc>>,
}

impl UserStock {
    /// Checks that a holding names its owner and ticker and holds a non-negative quantity.
    pub fn validate_for_save(&self) -> Result<()> {
        if self.user_id <= 0 {
            return Err(FinanceError::invalid("user id is required"));
        }
        if self.ticker.trim().is_empty() {
            return Err(FinanceError::invalid("ticker is required"));
        }
        if self.quantity < Decimal::ZERO {
            return Err(FinanceError::invalid("quantity must be at least 0"));
        }
        Ok(())
    }
}

/// One ticker's holding priced at its latest daily quote.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioPosition {
    pub ticker: String,
    pub quantity: Decimal,
    /// Market value of the whole holding.
    pub value: Decimal,
    /// Per-share prices for the day.
    pub open: Decimal,
    pub close: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    /// Date of the quote the prices come from.
    #[serde(rename = "asOf")]
    pub as_of_date: DateTime<Utc>,
}

/// Portfolio totals for the day, weighted by quantity and rounded to cents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStockPortfolioSummary {
    pub current_value: Decimal,
    pub current_high: Decimal,
    pub current_low: Decimal,
    pub current_open: Decimal,
    pub current_close: Decimal,
    /// Oldest quote date among the positions, so stale prices are visible.
    #[serde(rename = "asOf")]
    pub as_of_date: DateTime<Utc>,
    pub positions: Vec<PortfolioPosition>,
}

#[derive(Default)]
struct DailyTotals {
    value: Decimal,
    high: Decimal,
    low: Decimal,
    open: Decimal,
    close: Decimal,
}

fn weighted(total: Decimal, price: Decimal, quantity: Decimal) -> Option<Decimal> {
    price.checked_mul(quantity)?.checked_add(total)
}

impl DailyTotals {
    fn add(self, position: &PortfolioPosition) -> Option<Self> {
        Some(DailyTotals {
            value: self.value.checked_add(position.value)?,
            high: weighted(self.high, position.high, position.quantity)?,
            low: weighted(self.low, position.low, position.quantity)?,
            open: weighted(self.open, position.open, position.quantity)?,
            close: weighted(self.close, position.close, position.quantity)?,
        })
    }
}

impl UserStockPortfolioSummary {
    /// Replaces the positions and recomputes the daily totals from them.
    pub fn load_positions(&mut self, positions: Vec<PortfolioPosition>, now: DateTime<Utc>) -> Result<()> {
        self.positions = positions;
        self.calc_daily_totals(now)
    }

    /// Sums quantity-weighted prices and values across the loaded positions.
    ///
    /// The as-of date is the oldest quote date, or `now` when there are no positions.
    ///
    /// # Errors
    ///
    /// Returns [`FinanceError::InvalidInput`] if a total overflows a `Decimal`. The
    /// summary's totals are left unchanged in that case.
    pub fn calc_daily_totals(&mut self, now: DateTime<Utc>) -> Result<()> {
        let totals = self
            .positions
            .iter()
            .try_fold(DailyTotals::default(), DailyTotals::add)
            .ok_or_else(|| FinanceError::overflow("portfolio value"))?;

        let as_of_date = self
            .positions
            .iter()
            .map(|position| position.as_of_date)
            .fold(now, DateTime::min);

        self.current_value = round2(totals.value);
        self.current_high = round2(totals.high);
        self.current_low = round2(totals.low);
        self.current_open = round2(totals.open);
        self.current_close = round2(totals.close);
        self.as_of_date = as_of_date;

        debug!(
            positions = self.positions.len(),
            value = %self.current_value,
            as_of = %self.as_of_date,
            "calculated portfolio daily totals"
        );
        Ok(())
    }
}
