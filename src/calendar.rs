//! Date helpers used to normalize instants before counting pay periods.
//!
//! Every helper works in UTC and returns the normalized instant rather than
//! mutating its argument.

use chrono::{DateTime, Datelike, Duration, Months, NaiveTime, Utc, Weekday};

/// Truncates an instant to midnight of the same day.
pub fn start_of_day(date: DateTime<Utc>) -> DateTime<Utc> {
    date.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// Returns the first instant of the month containing `date`.
pub fn month_begin(date: DateTime<Utc>) -> DateTime<Utc> {
    let day = date.date_naive();
    let first = day - Duration::days(i64::from(day.day0()));

    first.and_time(NaiveTime::MIN).and_utc()
}

/// Returns the last instant (one nanosecond before the next month) of the month containing `date`.
pub fn month_end(date: DateTime<Utc>) -> DateTime<Utc> {
    add_months(month_begin(date), 1) - Duration::nanoseconds(1)
}

/// Adds calendar months, clamping the day to the length of the target month.
///
/// Saturates at the latest representable instant so counting loops always terminate.
pub fn add_months(date: DateTime<Utc>, months: u32) -> DateTime<Utc> {
    date.checked_add_months(Months::new(months))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Moves forward (zero or more days) to the first instant falling on `weekday`.
pub fn next_weekday_on_or_after(date: DateTime<Utc>, weekday: Weekday) -> DateTime<Utc> {
    let current = date.weekday().num_days_from_monday();
    let target = weekday.num_days_from_monday();
    let offset = (target + 7 - current) % 7;

    date + Duration::days(i64::from(offset))
}

/// Counts Monday-to-Friday days in the month containing `date`.
pub fn weekdays_in_month(date: DateTime<Utc>) -> u32 {
    let mut day = month_begin(date);
    let next_month = add_months(day, 1);
    let mut workdays = 0;

    while day < next_month {
        if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            workdays += 1;
        }
        day += Duration::days(1);
    }

    workdays
}
