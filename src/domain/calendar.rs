//! Month-end date arithmetic.

use chrono::{Datelike, NaiveDate};

/// Month-end-only series are published with a lag; before this day of the
/// month the previous month is treated as still incomplete.
pub const REPORTING_LAG_DAYS: u32 = 5;

/// Last calendar day of `month` in `year`, or `None` outside the supported
/// date range.
pub fn month_end(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year.checked_add(1)?, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

/// `(year, month)` shifted by `delta` months, rolling across year boundaries.
pub fn shift_months(year: i32, month: u32, delta: i32) -> Option<(i32, u32)> {
    let month_index = i32::try_from(month).ok()?.checked_sub(1)?;
    let index = year
        .checked_mul(12)?
        .checked_add(month_index)?
        .checked_add(delta)?;
    Some((index.div_euclid(12), index.rem_euclid(12) as u32 + 1))
}

/// Month end `delta` months from the month containing `date`.
pub fn month_end_offset(date: NaiveDate, delta: i32) -> Option<NaiveDate> {
    let (y, m) = shift_months(date.year(), date.month(), delta)?;
    month_end(y, m)
}

/// The most recent month end whose data can be considered complete.
///
/// After the 5th the previous month is complete; on or before it the data
/// still lags and the month before that is used.
pub fn latest_completed_month_end(today: NaiveDate) -> Option<NaiveDate> {
    if today.day() > REPORTING_LAG_DAYS {
        month_end_offset(today, -1)
    } else {
        month_end_offset(today, -2)
    }
}
