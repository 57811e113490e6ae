//! Fixed-payment loan amortization and schedule comparison.
//!
//! Interest compounds monthly at `annual rate / 100 / 12`. A schedule runs until
//! the remaining balance falls inside [`PAYOFF_TOLERANCE`], then a rounding
//! residual is folded back so the reported total payment equals the principal.

use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{FinanceError, Result};

/// Remaining balance at or below which the next payment is treated as the last one.
pub const PAYOFF_TOLERANCE: Decimal = dec!(0.009);

/// A supplied monthly payment below this amount counts as "not supplied".
pub const MIN_SUPPLIED_PAYMENT: Decimal = dec!(1);

/// Longest schedule [`amortize`] will build, in months.
pub const MAX_SCHEDULE_MONTHS: u32 = 12_000;

/// Payment details for a single month of a schedule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentScheduleItem {
    /// 1-based month number.
    pub month: u32,
    /// The portion of this payment applied to principal.
    pub principal: Decimal,
    /// The portion of this payment that covers interest.
    pub interest: Decimal,
    /// Cumulative interest paid through this month.
    pub interest_to_date: Decimal,
    /// Cumulative principal paid through this month, as scheduled before the final-row adjustment.
    pub principal_to_date: Decimal,
    /// Balance left after this payment.
    pub remaining_balance: Decimal,
}

/// One month of two schedules side by side. Every `*_delta` is `new - original`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentScheduleComparisonItem {
    pub month: u32,
    pub principal: Decimal,
    pub principal_new: Decimal,
    pub principal_delta: Decimal,
    pub interest: Decimal,
    pub interest_new: Decimal,
    pub interest_delta: Decimal,
    pub interest_to_date: Decimal,
    pub interest_to_date_new: Decimal,
    pub interest_to_date_delta: Decimal,
    pub principal_to_date: Decimal,
    pub principal_to_date_new: Decimal,
    pub principal_to_date_delta: Decimal,
    pub remaining_balance: Decimal,
    pub remaining_balance_new: Decimal,
    pub remaining_balance_delta: Decimal,
}

/// A loan as exchanged with the product. Derived fields are zero until [`Loan::calculate`] runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Loan {
    pub name: String,
    /// The principal amount of the loan.
    pub total: Decimal,
    /// The annual interest rate as a percentage (e.g., 4 for 4%).
    pub interest_rate: Decimal,
    pub monthly_payment: Decimal,
    /// Total interest paid over the life of the loan.
    pub interest: Decimal,
    pub total_cost: Decimal,
    pub total_payment: Decimal,
    /// Term in months. Replaced by the schedule length once calculated.
    pub loan_term: u32,
    pub payment_schedule: Vec<PaymentScheduleItem>,
}

/// What drives an amortization: a term to derive the payment from, or a known payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentPlan {
    Term(u32),
    Payment(Decimal),
}

/// The outcome of amortizing a principal to payoff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Amortization {
    pub monthly_payment: Decimal,
    pub schedule: Vec<PaymentScheduleItem>,
    pub total_interest: Decimal,
    pub total_payment: Decimal,
    pub total_cost: Decimal,
}

impl Amortization {
    /// Number of monthly payments needed to retire the loan.
    pub fn loan_term(&self) -> u32 {
        u32::try_from(self.schedule.len()).unwrap_or(u32::MAX)
    }
}

/// Aggregate view over a set of loans.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoansSummary {
    pub count: usize,
    pub total_balance: Decimal,
    pub monthly_cost: Decimal,
}

impl LoansSummary {
    pub fn from_loans(loans: &[Loan]) -> Result<Self> {
        loans.iter().try_fold(Self::default(), |summary, loan| {
            Ok(Self {
                count: summary.count + 1,
                total_balance: summary
                    .total_balance
                    .checked_add(loan.total)
                    .ok_or_else(|| FinanceError::overflow("total loan balance"))?,
                monthly_cost: summary
                    .monthly_cost
                    .checked_add(loan.monthly_payment)
                    .ok_or_else(|| FinanceError::overflow("monthly loan cost"))?,
            })
        })
    }
}

fn monthly_rate(annual_rate_pct: Decimal) -> Decimal {
    annual_rate_pct / dec!(100) / dec!(12)
}

fn validate_principal_and_rate(total: Decimal, annual_rate_pct: Decimal) -> Result<()> {
    if total <= Decimal::ZERO {
        return Err(FinanceError::invalid("total loan amount must be greater than zero"));
    }
    if annual_rate_pct < Decimal::ZERO {
        return Err(FinanceError::invalid("interest rate cannot be negative"));
    }
    Ok(())
}

/// Calculates the fixed monthly payment that retires `total` over `term_months`.
///
/// The annuity formula is: PMT = P / [((1 + i)^n - 1) / (i(1 + i)^n)].
/// At a zero rate the formula degenerates, so the payment is simply `P / n`.
///
/// # Errors
///
/// Returns [`FinanceError::InvalidInput`] if `total` is not positive, the rate is
/// negative, `term_months` is zero, or `(1 + i)^n` does not fit in a `Decimal`.
pub fn compute_monthly_payment(
    total: Decimal,
    annual_rate_pct: Decimal,
    term_months: u32,
) -> Result<Decimal> {
    validate_principal_and_rate(total, annual_rate_pct)?;
    if term_months == 0 {
        return Err(FinanceError::invalid("loan term must be at least one month"));
    }

    let rate = monthly_rate(annual_rate_pct);
    if rate.is_zero() {
        return Ok(total / Decimal::from(term_months));
    }

    let overflow = || FinanceError::invalid("interest rate and term are too large to calculate");
    let growth = (Decimal::ONE + rate)
        .checked_powu(u64::from(term_months))
        .ok_or_else(overflow)?;
    let annuity_factor = rate
        .checked_mul(growth)
        .and_then(|denominator| (growth - Decimal::ONE).checked_div(denominator))
        .ok_or_else(overflow)?;

    total.checked_div(annuity_factor).ok_or_else(overflow)
}

/// Amortizes `total` month by month until the balance is retired.
///
/// When the plan is a [`PaymentPlan::Term`] the payment is derived first with
/// [`compute_monthly_payment`]; the resulting schedule length then matches the term.
///
/// # Errors
///
/// Returns [`FinanceError::InvalidInput`] for a non-positive principal or payment,
/// a negative rate, an invalid term, an amount that overflows a `Decimal` or a
/// schedule longer than [`MAX_SCHEDULE_MONTHS`], and [`FinanceError::NonConvergent`]
/// when the payment does not exceed the first month's interest.
pub fn amortize(total: Decimal, annual_rate_pct: Decimal, plan: PaymentPlan) -> Result<Amortization> {
    validate_principal_and_rate(total, annual_rate_pct)?;

    let monthly_payment = match plan {
        PaymentPlan::Term(term_months) => compute_monthly_payment(total, annual_rate_pct, term_months)?,
        PaymentPlan::Payment(payment) if payment > Decimal::ZERO => payment,
        PaymentPlan::Payment(_) => {
            return Err(FinanceError::invalid("monthly payment must be greater than zero"));
        }
    };

    let rate = monthly_rate(annual_rate_pct);
    let first_interest = total
        .checked_mul(rate)
        .ok_or_else(|| FinanceError::overflow("first month's interest"))?;
    if monthly_payment <= first_interest {
        return Err(FinanceError::NonConvergent {
            payment: monthly_payment,
            interest: first_interest,
        });
    }

    let mut remaining = total;
    let mut month = 0;
    let mut interest_to_date = Decimal::ZERO;
    let mut principal_to_date = Decimal::ZERO;
    let mut total_interest = Decimal::ZERO;
    let mut total_payment = Decimal::ZERO;
    let mut schedule = Vec::new();

    while !remaining.is_zero() {
        if month == MAX_SCHEDULE_MONTHS {
            return Err(FinanceError::invalid(format!(
                "monthly payment {monthly_payment} does not retire the loan within {MAX_SCHEDULE_MONTHS} months"
            )));
        }

        let interest = remaining
            .checked_mul(rate)
            .ok_or_else(|| FinanceError::overflow("monthly interest"))?;
        let mut principal = monthly_payment - interest;

        interest_to_date = interest_to_date
            .checked_add(interest)
            .ok_or_else(|| FinanceError::overflow("interest to date"))?;
        principal_to_date = principal_to_date
            .checked_add(principal)
            .ok_or_else(|| FinanceError::overflow("principal to date"))?;
        month += 1;

        if remaining - principal > PAYOFF_TOLERANCE {
            remaining -= principal;
        } else {
            // Final payment: the balance left is retired outright.
            principal = remaining - interest;
            remaining = Decimal::ZERO;
        }

        total_interest = total_interest
            .checked_add(interest)
            .ok_or_else(|| FinanceError::overflow("total interest"))?;
        total_payment = total_payment
            .checked_add(principal)
            .ok_or_else(|| FinanceError::overflow("total payment"))?;

        schedule.push(PaymentScheduleItem {
            month,
            principal,
            interest,
            interest_to_date,
            principal_to_date,
            remaining_balance: remaining,
        });
    }

    let residual = total - total_payment;
    debug!(
        %total, %total_payment, %total_interest, %residual, months = month,
        "amortized loan, folding residual into totals"
    );

    let total_payment = total_payment
        .checked_add(residual)
        .ok_or_else(|| FinanceError::overflow("total payment"))?;
    let total_interest = total_interest
        .checked_sub(residual)
        .ok_or_else(|| FinanceError::overflow("total interest"))?;
    let total_cost = total_payment
        .checked_add(total_interest)
        .ok_or_else(|| FinanceError::overflow("total cost"))?;

    Ok(Amortization {
        monthly_payment,
        schedule,
        total_interest,
        total_payment,
        total_cost,
    })
}

/// Totals a finished schedule keeps reporting once its payments have stopped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CarriedTotals {
    pub interest_to_date: Decimal,
    pub principal_to_date: Decimal,
}

impl CarriedTotals {
    fn after(schedule: &[PaymentScheduleItem]) -> Self {
        schedule
            .last()
            .map(|item| CarriedTotals {
                interest_to_date: item.interest_to_date,
                principal_to_date: item.principal_to_date,
            })
            .unwrap_or_default()
    }
}

/// One aligned month of two schedules.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScheduleAlignment<'a> {
    Both(&'a PaymentScheduleItem, &'a PaymentScheduleItem),
    /// The new schedule has been paid off.
    OnlyOriginal(&'a PaymentScheduleItem, CarriedTotals),
    /// The original schedule has been paid off.
    OnlyNew(CarriedTotals, &'a PaymentScheduleItem),
}

/// Pairs the months of two schedules, carrying the shorter one's final totals forward.
pub fn align_schedules<'a>(
    original: &'a [PaymentScheduleItem],
    new: &'a [PaymentScheduleItem],
) -> impl Iterator<Item = ScheduleAlignment<'a>> + 'a {
    let carried_original = CarriedTotals::after(original);
    let carried_new = CarriedTotals::after(new);

    (0..original.len().max(new.len())).filter_map(move |i| match (original.get(i), new.get(i)) {
        (Some(a), Some(b)) => Some(ScheduleAlignment::Both(a, b)),
        (Some(a), None) => Some(ScheduleAlignment::OnlyOriginal(a, carried_new)),
        (None, Some(b)) => Some(ScheduleAlignment::OnlyNew(carried_original, b)),
        (None, None) => None,
    })
}

/// Values of one side of a comparison row.
#[derive(Clone, Copy)]
struct Side {
    principal: Decimal,
    interest: Decimal,
    interest_to_date: Decimal,
    principal_to_date: Decimal,
    remaining_balance: Decimal,
}

impl Side {
    fn paying(item: &PaymentScheduleItem) -> Self {
        Side {
            principal: item.principal,
            interest: item.interest,
            interest_to_date: item.interest_to_date,
            principal_to_date: item.principal_to_date,
            remaining_balance: item.remaining_balance,
        }
    }

    fn finished(carried: CarriedTotals) -> Self {
        Side {
            principal: Decimal::ZERO,
            interest: Decimal::ZERO,
            interest_to_date: carried.interest_to_date,
            principal_to_date: carried.principal_to_date,
            remaining_balance: Decimal::ZERO,
        }
    }
}

impl From<ScheduleAlignment<'_>> for PaymentScheduleComparisonItem {
    fn from(alignment: ScheduleAlignment<'_>) -> Self {
        let (month, original, new) = match alignment {
            ScheduleAlignment::Both(a, b) => (a.month, Side::paying(a), Side::paying(b)),
            ScheduleAlignment::OnlyOriginal(a, carried) => (a.month, Side::paying(a), Side::finished(carried)),
            ScheduleAlignment::OnlyNew(carried, b) => (b.month, Side::finished(carried), Side::paying(b)),
        };

        PaymentScheduleComparisonItem {
            month,
            principal: original.principal,
            principal_new: new.principal,
            principal_delta: new.principal - original.principal,
            interest: original.interest,
            interest_new: new.interest,
            interest_delta: new.interest - original.interest,
            interest_to_date: original.interest_to_date,
            interest_to_date_new: new.interest_to_date,
            interest_to_date_delta: new.interest_to_date - original.interest_to_date,
            principal_to_date: original.principal_to_date,
            principal_to_date_new: new.principal_to_date,
            principal_to_date_delta: new.principal_to_date - original.principal_to_date,
            remaining_balance: original.remaining_balance,
            remaining_balance_new: new.remaining_balance,
            remaining_balance_delta: new.remaining_balance - original.remaining_balance,
        }
    }
}

/// Compares two schedules month by month. The result has one row per month of the longer schedule.
pub fn compare_schedules(
    original: &[PaymentScheduleItem],
    new: &[PaymentScheduleItem],
) -> Vec<PaymentScheduleComparisonItem> {
    align_schedules(original, new)
        .map(PaymentScheduleComparisonItem::from)
        .collect()
}

impl Loan {
    /// The plan this loan is amortized with: its own payment if one was supplied, else its term.
    pub fn payment_plan(&self) -> PaymentPlan {
        if self.monthly_payment < MIN_SUPPLIED_PAYMENT {
            PaymentPlan::Term(self.loan_term)
        } else {
            PaymentPlan::Payment(self.monthly_payment)
        }
    }

    /// Calculates the monthly payment from the loan's total, rate and term.
    pub fn calculate_payment(&self) -> Result<Decimal> {
        compute_monthly_payment(self.total, self.interest_rate, self.loan_term)
    }

    /// Returns a copy of this loan with its payment, totals and schedule filled in.
    pub fn calculate(&self) -> Result<Loan> {
        let amortization = amortize(self.total, self.interest_rate, self.payment_plan())?;

        Ok(Loan {
            monthly_payment: amortization.monthly_payment,
            interest: amortization.total_interest,
            total_cost: amortization.total_cost,
            total_payment: amortization.total_payment,
            loan_term: amortization.loan_term(),
            payment_schedule: amortization.schedule,
            ..self.clone()
        })
    }

    /// Compares this loan's schedule (original) with `other`'s (new).
    pub fn compare(&self, other: &Loan) -> Vec<PaymentScheduleComparisonItem> {
        compare_schedules(&self.payment_schedule, &other.payment_schedule)
    }

    /// Checks that a calculated loan carries everything needed to be stored.
    pub fn validate_for_save(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(FinanceError::invalid("loan name is required"));
        }
        validate_principal_and_rate(self.total, self.interest_rate)?;
        if self.loan_term == 0 {
            return Err(FinanceError::invalid("loan term is required"));
        }
        if self.total_cost <= Decimal::ZERO {
            return Err(FinanceError::invalid("total cost is required"));
        }
        if self.total_payment <= Decimal::ZERO {
            return Err(FinanceError::invalid("total payment is required"));
        }
        if self.interest < Decimal::ZERO {
            return Err(FinanceError::invalid("total interest cannot be negative"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use rust_decimal_macros::dec;

    fn assert_close(actual: Decimal, expected: Decimal) {
        assert!(
            (actual - expected).abs() < dec!(0.000001),
            "expected {expected}, got {actual}"
        );
    }

    #[fixture]
    fn car_loan() -> Loan {
        Loan {
            name: "Car".to_string(),
            total: dec!(10000),
            interest_rate: dec!(4),
            loan_term: 60,
            ..Loan::default()
        }
    }

    #[test]
    fn test_compute_monthly_payment() {
        let payment = compute_monthly_payment(dec!(10000), dec!(4), 60).unwrap();
        assert_eq!(payment.round_dp(2), dec!(184.17));
    }

    #[rstest]
    #[case(dec!(0), dec!(4), 60)]
    #[case(dec!(-1), dec!(4), 60)]
    #[case(dec!(10000), dec!(-1), 60)]
    #[case(dec!(10000), dec!(4), 0)]
    fn test_compute_monthly_payment_rejects_invalid_input(
        #[case] total: Decimal,
        #[case] rate: Decimal,
        #[case] term: u32,
    ) {
        let result = compute_monthly_payment(total, rate, term);
        assert!(matches!(result, Err(FinanceError::InvalidInput(_))));
    }

    #[test]
    fn test_compute_monthly_payment_zero_rate() {
        let payment = compute_monthly_payment(dec!(12000), dec!(0), 12).unwrap();
        assert_eq!(payment, dec!(1000));
    }

    #[test]
    fn test_compute_monthly_payment_overflow_is_an_error() {
        let result = compute_monthly_payment(dec!(10000), dec!(1000000), 1200);
        assert!(matches!(result, Err(FinanceError::InvalidInput(_))));
    }

    #[rstest]
    fn test_calculate_happy_path(car_loan: Loan) {
        let loan = car_loan.calculate().unwrap();

        assert_eq!(loan.monthly_payment.round_dp(2), dec!(184.17));
        assert_eq!(loan.interest.round_dp(2), dec!(1049.30));
        assert_eq!(loan.total_cost.round_dp(2), dec!(11049.30));
        assert_eq!(loan.total_payment.round_dp(2), dec!(10000.00));
        assert_eq!(loan.loan_term, 60);
        assert_eq!(loan.payment_schedule.len(), 60);
        assert_eq!(loan.total_payment + loan.interest, loan.total_cost);
        // Input fields survive the calculation.
        assert_eq!(loan.name, "Car");
        assert_eq!(loan.total, dec!(10000));
    }

    #[rstest]
    fn test_calculate_does_not_touch_receiver(car_loan: Loan) {
        let before = car_loan.clone();
        let _ = car_loan.calculate().unwrap();
        assert_eq!(car_loan, before);
    }

    #[rstest]
    fn test_calculate_invalid_total(mut car_loan: Loan) {
        car_loan.total = dec!(0);
        assert!(matches!(car_loan.calculate(), Err(FinanceError::InvalidInput(_))));
    }

    #[rstest]
    #[case(dec!(10000), dec!(4), 60)]
    #[case(dec!(250000), dec!(6.5), 360)]
    #[case(dec!(1200), dec!(12), 12)]
    #[case(dec!(5000), dec!(0), 7)]
    fn test_schedule_retires_principal(#[case] total: Decimal, #[case] rate: Decimal, #[case] term: u32) {
        let amortization = amortize(total, rate, PaymentPlan::Term(term)).unwrap();
        let schedule = &amortization.schedule;

        assert_eq!(amortization.loan_term(), term);
        assert_close(amortization.total_payment, total);
        assert_eq!(
            amortization.total_payment + amortization.total_interest,
            amortization.total_cost
        );
        // Scheduled principal retires the balance up to the payoff band.
        assert!((schedule[schedule.len() - 1].principal_to_date - total).abs() <= PAYOFF_TOLERANCE);

        for pair in schedule.windows(2) {
            assert!(pair[1].remaining_balance <= pair[0].remaining_balance);
            assert_eq!(pair[1].month, pair[0].month + 1);
        }
        assert_eq!(schedule[0].month, 1);
        assert_eq!(schedule[schedule.len() - 1].remaining_balance, Decimal::ZERO);
    }

    #[test]
    fn test_residual_is_the_final_interest() {
        let amortization = amortize(dec!(10000), dec!(4), PaymentPlan::Term(60)).unwrap();
        let last = amortization.schedule.last().unwrap();
        let recorded_principal: Decimal = amortization.schedule.iter().map(|item| item.principal).sum();
        let recorded_interest: Decimal = amortization.schedule.iter().map(|item| item.interest).sum();

        // The final row books `remaining - interest`, so recorded principal falls short of
        // the loan by that month's interest (about 0.61 here). That gap is expected: it is
        // what yields 1049.30 of interest, and the residual correction restores
        // `total_payment == total` on the totals, not on the rows.
        assert_close(dec!(10000) - recorded_principal, last.interest);
        assert_close(recorded_interest - last.interest, amortization.total_interest);
    }

    #[test]
    fn test_zero_rate_schedule_is_flat() {
        let amortization = amortize(dec!(12000), dec!(0), PaymentPlan::Term(12)).unwrap();

        assert_eq!(amortization.schedule.len(), 12);
        assert_eq!(amortization.total_interest, Decimal::ZERO);
        for item in &amortization.schedule {
            assert_eq!(item.interest, Decimal::ZERO);
            assert_eq!(item.principal, dec!(1000));
        }
    }

    #[test]
    fn test_supplied_payment_shortens_schedule() {
        let amortization = amortize(dec!(10000), dec!(4), PaymentPlan::Payment(dec!(500))).unwrap();

        assert_eq!(amortization.monthly_payment, dec!(500));
        assert_eq!(amortization.schedule.len(), 21);
        assert_close(amortization.total_payment, dec!(10000));
    }

    #[rstest]
    fn test_payment_plan_uses_supplied_payment(mut car_loan: Loan) {
        assert_eq!(car_loan.payment_plan(), PaymentPlan::Term(60));

        car_loan.monthly_payment = dec!(0.5);
        assert_eq!(car_loan.payment_plan(), PaymentPlan::Term(60));

        car_loan.monthly_payment = dec!(1000);
        assert_eq!(car_loan.payment_plan(), PaymentPlan::Payment(dec!(1000)));

        let loan = car_loan.calculate().unwrap();
        assert_eq!(loan.loan_term, 11);
        assert_eq!(loan.payment_schedule.len(), 11);
    }

    #[rstest]
    #[case(dec!(33.33))]
    #[case(dec!(10))]
    fn test_payment_not_covering_interest_fails_fast(#[case] payment: Decimal) {
        // 10000 at 4% accrues 33.33... in the first month.
        let result = amortize(dec!(10000), dec!(4), PaymentPlan::Payment(payment));
        assert!(matches!(result, Err(FinanceError::NonConvergent { .. })));
    }

    #[test]
    fn test_payment_just_above_interest_still_converges() {
        let amortization = amortize(dec!(10000), dec!(4), PaymentPlan::Payment(dec!(33.34))).unwrap();
        assert_eq!(amortization.schedule.len(), 2560);
    }

    #[rstest]
    #[case(dec!(79000000000000000000000000000), dec!(4), PaymentPlan::Term(60))]
    #[case(Decimal::MAX, dec!(12), PaymentPlan::Payment(Decimal::MAX))]
    fn test_amortize_overflow_is_an_error(#[case] total: Decimal, #[case] rate: Decimal, #[case] plan: PaymentPlan) {
        let result = amortize(total, rate, plan);
        assert!(matches!(result, Err(FinanceError::InvalidInput(_))));
    }

    #[rstest]
    #[case(dec!(1000000000), dec!(0), dec!(0.01))]
    #[case(dec!(10000), dec!(0), dec!(0.5))]
    fn test_schedule_longer_than_ceiling_is_rejected(
        #[case] total: Decimal,
        #[case] rate: Decimal,
        #[case] payment: Decimal,
    ) {
        let result = amortize(total, rate, PaymentPlan::Payment(payment));
        assert!(matches!(result, Err(FinanceError::InvalidInput(_))));
    }

    #[test]
    fn test_schedule_at_ceiling_is_built() {
        let amortization = amortize(dec!(12000), dec!(0), PaymentPlan::Payment(dec!(1))).unwrap();
        assert_eq!(amortization.loan_term(), MAX_SCHEDULE_MONTHS);
    }

    #[test]
    fn test_non_positive_payment_is_invalid() {
        let result = amortize(dec!(10000), dec!(4), PaymentPlan::Payment(dec!(0)));
        assert!(matches!(result, Err(FinanceError::InvalidInput(_))));
    }

    fn item(month: u32, interest_to_date: Decimal, principal_to_date: Decimal) -> PaymentScheduleItem {
        PaymentScheduleItem {
            month,
            principal: dec!(100),
            interest: dec!(10),
            interest_to_date,
            principal_to_date,
            remaining_balance: dec!(1000) - principal_to_date,
        }
    }

    fn schedule(months: u32) -> Vec<PaymentScheduleItem> {
        (1..=months)
            .map(|m| item(m, Decimal::from(m * 10), Decimal::from(m * 100)))
            .collect()
    }

    #[rstest]
    #[case(0, 0)]
    #[case(0, 3)]
    #[case(4, 0)]
    #[case(5, 8)]
    #[case(8, 5)]
    #[case(6, 6)]
    fn test_comparison_length(#[case] original: u32, #[case] new: u32) {
        let rows = compare_schedules(&schedule(original), &schedule(new));
        assert_eq!(rows.len(), original.max(new) as usize);
    }

    #[test]
    fn test_comparison_carries_original_totals_forward() {
        let original = schedule(5);
        let new = schedule(8);
        let rows = compare_schedules(&original, &new);

        for row in &rows[5..] {
            assert_eq!(row.interest_to_date, original[4].interest_to_date);
            assert_eq!(row.principal_to_date, original[4].principal_to_date);
            assert_eq!(row.principal, Decimal::ZERO);
            assert_eq!(row.remaining_balance, Decimal::ZERO);
        }
        assert_eq!(rows[7].month, 8);
        assert_eq!(rows[7].principal_to_date_delta, dec!(300));
        assert_eq!(rows[7].interest_to_date_delta, dec!(30));
        assert_eq!(rows[7].principal_delta, dec!(100));
    }

    #[test]
    fn test_comparison_carries_new_totals_forward() {
        let original = schedule(8);
        let new = schedule(5);
        let rows = compare_schedules(&original, &new);

        let last = &rows[6];
        assert_eq!(last.month, 7);
        assert_eq!(last.interest_to_date_new, new[4].interest_to_date);
        assert_eq!(last.principal_to_date_new, new[4].principal_to_date);
        assert_eq!(last.principal_new, Decimal::ZERO);
        assert_eq!(last.principal_delta, dec!(-100));
        assert_eq!(last.remaining_balance_delta, -original[6].remaining_balance);
    }

    #[test]
    fn test_comparison_against_empty_schedule_carries_zero() {
        let rows = compare_schedules(&[], &schedule(3));

        assert_eq!(rows[2].interest_to_date, Decimal::ZERO);
        assert_eq!(rows[2].interest_to_date_new, dec!(30));
        assert_eq!(rows[2].interest_to_date_delta, dec!(30));
    }

    #[test]
    fn test_alignment_tags_each_month() {
        let original = schedule(2);
        let new = schedule(3);
        let aligned: Vec<_> = align_schedules(&original, &new).collect();

        assert!(matches!(aligned[0], ScheduleAlignment::Both(_, _)));
        assert!(matches!(aligned[1], ScheduleAlignment::Both(_, _)));
        assert!(matches!(
            aligned[2],
            ScheduleAlignment::OnlyNew(CarriedTotals { interest_to_date, .. }, _) if interest_to_date == dec!(20)
        ));
    }

    #[rstest]
    fn test_compare_two_loans(car_loan: Loan) {
        let original = car_loan.calculate().unwrap();
        let refinanced = Loan {
            monthly_payment: dec!(500),
            ..car_loan
        }
        .calculate()
        .unwrap();

        let rows = original.compare(&refinanced);
        assert_eq!(rows.len(), 60);
        assert_eq!(rows[0].principal_delta, rows[0].principal_new - rows[0].principal);
        // Once the refinanced loan is retired its cumulative interest stays flat.
        assert_eq!(rows[59].interest_to_date_new, rows[21].interest_to_date_new);
        assert!(rows[59].interest_to_date_delta < Decimal::ZERO);
    }

    #[rstest]
    fn test_validate_for_save(car_loan: Loan) {
        let loan = car_loan.calculate().unwrap();
        assert!(loan.validate_for_save().is_ok());

        let cases: Vec<Box<dyn Fn(&mut Loan)>> = vec![
            Box::new(|l: &mut Loan| l.name.clear()),
            Box::new(|l: &mut Loan| l.total = dec!(0)),
            Box::new(|l: &mut Loan| l.interest_rate = dec!(-1)),
            Box::new(|l: &mut Loan| l.loan_term = 0),
            Box::new(|l: &mut Loan| l.total_cost = dec!(0)),
            Box::new(|l: &mut Loan| l.total_payment = dec!(0)),
            Box::new(|l: &mut Loan| l.interest = dec!(-1)),
        ];
        for break_field in cases {
            let mut broken = loan.clone();
            break_field(&mut broken);
            assert!(broken.validate_for_save().is_err());
        }
    }

    #[test]
    fn test_loans_summary() {
        let loans = vec![
            Loan { total: dec!(10000), monthly_payment: dec!(184.17), ..Loan::default() },
            Loan { total: dec!(2500), monthly_payment: dec!(75), ..Loan::default() },
        ];
        let summary = LoansSummary::from_loans(&loans).unwrap();

        assert_eq!(summary.count, 2);
        assert_eq!(summary.total_balance, dec!(12500));
        assert_eq!(summary.monthly_cost, dec!(259.17));
        assert_eq!(LoansSummary::from_loans(&[]).unwrap(), LoansSummary::default());
    }

    #[test]
    fn test_loans_summary_overflow_is_an_error() {
        let loans = vec![
            Loan { total: Decimal::MAX, ..Loan::default() },
            Loan { total: dec!(1), ..Loan::default() },
        ];
        assert!(matches!(LoansSummary::from_loans(&loans), Err(FinanceError::InvalidInput(_))));
    }

    #[test]
    fn test_loan_json_uses_product_field_names() {
        let loan: Loan = serde_json::from_str(
            r#"{"name":"Car","total":"10000","interestRate":"4","loanTerm":60}"#,
        )
        .unwrap();
        assert_eq!(loan.interest_rate, dec!(4));
        assert_eq!(loan.loan_term, 60);

        let json = serde_json::to_value(loan.calculate().unwrap()).unwrap();
        assert_eq!(json["paymentSchedule"].as_array().unwrap().len(), 60);
        assert!(json["paymentSchedule"][0].get("remainingBalance").is_some());
    }
}
