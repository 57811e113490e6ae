//! Monthly budget roll-up across incomes, loans, bills and credit cards.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{FinanceError, Result};
use crate::income::Income;
use crate::loan::Loan;

const INCOME_TAX_NAME: &str = "income tax";

/// A fixed monthly expense.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Bill {
    pub name: String,
    pub amount: Decimal,
}

impl Bill {
    pub fn validate_for_save(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(FinanceError::invalid("bill name is required"));
        }
        if self.amount < Decimal::ZERO {
            return Err(FinanceError::invalid("bill amount cannot be negative"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreditCard {
    pub name: String,
    pub balance: Decimal,
    pub limit: Decimal,
    pub apr: Decimal,
    pub min_payment: Decimal,
    /// Percentage of the balance due each month, e.g. 2 for 2%.
    pub min_payment_percentage: Decimal,
    /// Filled in by [`CreditCard::calculate_payment`].
    pub payment: Decimal,
}

impl CreditCard {
    /// The monthly payment due: the larger of the minimum payment and the percentage of the balance.
    pub fn calculate_payment(&self) -> Result<Decimal> {
        let percentage_due = self
            .balance
            .checked_mul(self.min_payment_percentage)
            .ok_or_else(|| FinanceError::overflow("credit card payment"))?
            / dec!(100);
        Ok(self.min_payment.max(percentage_due))
    }

    pub fn validate_for_save(&self) -> Result<()> {
        if self.name.trim().is_empty() || self.min_payment.is_zero() || self.min_payment_percentage.is_zero() {
            return Err(FinanceError::invalid(
                "credit card requires a name, a minimum payment and a minimum payment percentage",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryItemType {
    Expense,
    Income,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SummarySource {
    Loan,
    Income,
    Taxes,
    Bill,
    CreditCard,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryItem {
    #[serde(rename = "type")]
    pub item_type: SummaryItemType,
    pub source: SummarySource,
    pub name: String,
    pub amount: Decimal,
    pub balance: Decimal,
}

impl SummaryItem {
    fn expense(source: SummarySource, name: &str, amount: Decimal, balance: Decimal) -> Self {
        SummaryItem {
            item_type: SummaryItemType::Expense,
            source,
            name: name.to_string(),
            amount,
            balance,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseSummary {
    pub expenses: Vec<SummaryItem>,
    pub total_cost: Decimal,
    pub total_balance: Decimal,
    pub loan_cost: Decimal,
    pub loan_balance: Decimal,
    pub taxes: Decimal,
    #[serde(rename = "bills")]
    pub bill_cost: Decimal,
    #[serde(rename = "creditCards")]
    pub credit_card_cost: Decimal,
    pub credit_card_balance: Decimal,
}

impl ExpenseSummary {
    fn recalculate(&mut self) -> Result<()> {
        self.total_cost = [self.taxes, self.bill_cost, self.credit_card_cost]
            .into_iter()
            .try_fold(self.loan_cost, |sum, cost| add(sum, cost, "total monthly cost"))?;
        self.total_balance = add(self.loan_balance, self.credit_card_balance, "total balance")?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeSummary {
    pub incomes: Vec<SummaryItem>,
    pub total_income: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditSummary {
    pub total: Decimal,
    pub available: Decimal,
    /// Share of the total limit in use, as a whole percentage.
    pub utilization: Decimal,
}

/// A user's finances for one month.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub income_summary: IncomeSummary,
    pub expense_summary: ExpenseSummary,
    pub credit_summary: CreditSummary,
    pub net_funds: Decimal,
}

fn add(a: Decimal, b: Decimal, what: &str) -> Result<Decimal> {
    a.checked_add(b).ok_or_else(|| FinanceError::overflow(what))
}

impl Summary {
    /// Adds each loan's monthly payment as an expense, with the loan total as its balance.
    pub fn load_loans(&mut self, loans: &[Loan]) -> Result<()> {
        let mut expenses = self.expense_summary.clone();

        for loan in loans {
            expenses.expenses.push(SummaryItem::expense(
                SummarySource::Loan,
                &loan.name,
                loan.monthly_payment,
                loan.total,
            ));
            expenses.loan_balance = add(expenses.loan_balance, loan.total, "loan balance")?;
            expenses.loan_cost = add(expenses.loan_cost, loan.monthly_payment, "loan cost")?;
        }

        expenses.recalculate()?;
        self.expense_summary = expenses;
        Ok(())
    }

    /// Adds the gross pay each income earns in the month containing `as_of`,
    /// plus a single expense for the income tax withheld across all of them.
    pub fn load_incomes(&mut self, incomes: &[Income], as_of: DateTime<Utc>) -> Result<()> {
        let mut income_summary = self.income_summary.clone();
        let mut taxes = Decimal::ZERO;

        for income in incomes {
            let amount = income.monthly_gross_pay(as_of)?;
            income_summary.incomes.push(SummaryItem {
                item_type: SummaryItemType::Income,
                source: SummarySource::Income,
                name: income.name.clone(),
                amount,
                balance: Decimal::ZERO,
            });
            income_summary.total_income = add(income_summary.total_income, amount, "total income")?;
            taxes = add(taxes, income.monthly_taxes(as_of)?, "income tax")?;
        }

        let mut expenses = self.expense_summary.clone();
        if taxes > Decimal::ZERO {
            expenses.expenses.push(SummaryItem::expense(
                SummarySource::Taxes,
                INCOME_TAX_NAME,
                taxes,
                Decimal::ZERO,
            ));
        }
        expenses.taxes = add(expenses.taxes, taxes, "income tax")?;
        expenses.recalculate()?;

        self.income_summary = income_summary;
        self.expense_summary = expenses;
        Ok(())
    }

    pub fn load_bills(&mut self, bills: &[Bill]) -> Result<()> {
        let mut expenses = self.expense_summary.clone();

        for bill in bills {
            expenses.expenses.push(SummaryItem::expense(
                SummarySource::Bill,
                &bill.name,
                bill.amount,
                Decimal::ZERO,
            ));
            expenses.bill_cost = add(expenses.bill_cost, bill.amount, "bill cost")?;
        }

        expenses.recalculate()?;
        self.expense_summary = expenses;
        Ok(())
    }

    /// Adds each card's calculated payment as an expense and sums limits into the credit summary.
    pub fn load_credit_cards(&mut self, cards: &[CreditCard]) -> Result<()> {
        let mut expenses = self.expense_summary.clone();
        let mut limit = Decimal::ZERO;
        let mut balance = Decimal::ZERO;

        for card in cards {
            let payment = card.calculate_payment()?;
            expenses.expenses.push(SummaryItem::expense(
                SummarySource::CreditCard,
                &card.name,
                payment,
                card.balance,
            ));
            expenses.credit_card_cost = add(expenses.credit_card_cost, payment, "credit card cost")?;
            limit = add(limit, card.limit, "credit limit")?;
            balance = add(balance, card.balance, "credit card balance")?;
        }

        expenses.credit_card_balance = add(expenses.credit_card_balance, balance, "credit card balance")?;
        expenses.recalculate()?;

        let utilization = if limit > Decimal::ZERO {
            balance
                .checked_div(limit)
                .and_then(|share| share.checked_mul(dec!(100)))
                .ok_or_else(|| FinanceError::overflow("credit utilization"))?
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        } else {
            Decimal::ZERO
        };

        self.credit_summary = CreditSummary {
            total: limit,
            available: limit - balance,
            utilization,
        };
        self.expense_summary = expenses;
        Ok(())
    }

    /// Computes net funds and orders incomes and expenses from largest to smallest.
    pub fn finalize(&mut self) -> Result<()> {
        self.net_funds = self
            .income_summary
            .total_income
            .checked_sub(self.expense_summary.total_cost)
            .ok_or_else(|| FinanceError::overflow("net funds"))?;

        self.expense_summary
            .expenses
            .sort_by(|a, b| b.amount.cmp(&a.amount));
        self.income_summary
            .incomes
            .sort_by(|a, b| b.amount.cmp(&a.amount));
        Ok(())
    }
}
