//! Proleptic Gregorian arithmetic over millisecond time values.
//!
//! Everything here is zone-free: a "time value" is milliseconds from
//! `1970-01-01T00:00:00` on whatever wall clock the caller chose. The
//! composition functions (`make_day`, `make_time`, `make_date`) accept
//! out-of-range components and roll them over, so month `12` is January of
//! the next year and day `0` is the last day of the previous month.

use crate::consts::{
    CENTURY_CYCLE, DAYS_IN_MONTH, FEBRUARY, FEBRUARY_DAYS_LEAP, GREGORIAN_CYCLE, LEAP_YEAR_CYCLE,
    MAX_TIME, MONTHS_PER_YEAR, MS_PER_DAY, MS_PER_HOUR, MS_PER_MINUTE, MS_PER_SECOND,
};

/// Years beyond this distance from 1970 can never survive `time_clip`, so
/// `make_day` stops there instead of risking overflow.
const YEAR_LIMIT: i64 = 1_000_000;

/// Days from 0000-03-01 to 1970-01-01
const EPOCH_SHIFT: i64 = 719_468;
/// Days in a 400-year Gregorian era
const DAYS_PER_ERA: i64 = 146_097;

pub const fn is_leap_year(year: i64) -> bool {
    (year % LEAP_YEAR_CYCLE == 0 && year % CENTURY_CYCLE != 0) || (year % GREGORIAN_CYCLE == 0)
}

pub const fn days_in_month(year: i64, month: u8) -> u8 {
    debug_assert!(month != 0 && month <= 12);

    if month == FEBRUARY && is_leap_year(year) {
        FEBRUARY_DAYS_LEAP
    } else {
        DAYS_IN_MONTH[month as usize]
    }
}

/// Day number (days since the epoch) of `year-month-day`, with `month` in `1..=12`.
const fn days_from_civil(year: i64, month: i64, day: i64) -> i64 {
    // shift the year so it starts in March and the leap day is last
    let y = if month <= 2 { year - 1 } else { year };
    let era = y.div_euclid(GREGORIAN_CYCLE);
    let year_of_era = y - era * GREGORIAN_CYCLE;
    let month_from_march = (month + 9) % MONTHS_PER_YEAR;
    let day_of_year = (153 * month_from_march + 2) / 5 + day - 1;
    let day_of_era = year_of_era * 365 + year_of_era / 4 - year_of_era / 100 + day_of_year;
    era * DAYS_PER_ERA + day_of_era - EPOCH_SHIFT
}

/// Inverse of [`days_from_civil`]: `(year, month, day)` for a day number.
const fn civil_from_days(days: i64) -> (i64, u8, u8) {
    let z = days + EPOCH_SHIFT;
    let era = z.div_euclid(DAYS_PER_ERA);
    let day_of_era = z - era * DAYS_PER_ERA;
    let year_of_era =
        (day_of_era - day_of_era / 1460 + day_of_era / 36_524 - day_of_era / 146_096) / 365;
    let day_of_year = day_of_era - (365 * year_of_era + year_of_era / 4 - year_of_era / 100);
    let month_from_march = (5 * day_of_year + 2) / 153;
    let day = day_of_year - (153 * month_from_march + 2) / 5 + 1;
    let month = if month_from_march < 10 {
        month_from_march + 3
    } else {
        month_from_march - 9
    };
    let year = year_of_era + era * GREGORIAN_CYCLE;
    let year = if month <= 2 { year + 1 } else { year };
    (year, month as u8, day as u8)
}

/// Day number for a year, zero-based month and day of month, rolling over
/// months outside `0..12` and days outside the month.
pub(crate) fn make_day(year: i64, month0: i64, day: i64) -> Option<i64> {
    let year = year.checked_add(month0.div_euclid(MONTHS_PER_YEAR))?;
    if year.unsigned_abs() > YEAR_LIMIT.unsigned_abs() {
        return None;
    }
    let month = month0.rem_euclid(MONTHS_PER_YEAR) + 1;
    days_from_civil(year, month, 1).checked_add(day.checked_sub(1)?)
}

/// Milliseconds into a day, without any range check on the components.
pub(crate) fn make_time(hour: i64, minute: i64, second: i64, millisecond: i64) -> Option<i64> {
    hour.checked_mul(MS_PER_HOUR)?
        .checked_add(minute.checked_mul(MS_PER_MINUTE)?)?
        .checked_add(second.checked_mul(MS_PER_SECOND)?)?
        .checked_add(millisecond)
}

pub(crate) fn make_date(day: i64, time: i64) -> Option<i64> {
    day.checked_mul(MS_PER_DAY)?.checked_add(time)
}

/// Rejects time values further than [`MAX_TIME`] from the epoch.
pub(crate) const fn time_clip(time: i64) -> Option<i64> {
    if time.unsigned_abs() > MAX_TIME.unsigned_abs() {
        None
    } else {
        Some(time)
    }
}

/// Like [`time_clip`], for a fractional time value; truncates toward zero.
pub(crate) fn time_clip_f64(time: f64) -> Option<i64> {
    if !time.is_finite() || time.abs() > MAX_TIME as f64 {
        return None;
    }
    Some(time.trunc() as i64)
}

/// Calendar fields of a time value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Fields {
    pub(crate) year: i64,
    /// 1-based
    pub(crate) month: u8,
    pub(crate) day: u8,
    pub(crate) hour: u8,
    pub(crate) minute: u8,
    pub(crate) second: u8,
    pub(crate) millisecond: u16,
    /// 0 is Sunday
    pub(crate) weekday: u8,
}

impl Fields {
    pub(crate) const fn from_time(time: i64) -> Self {
        let days = time.div_euclid(MS_PER_DAY);
        let within = time.rem_euclid(MS_PER_DAY);
        let (year, month, day) = civil_from_days(days);
        Self {
            year,
            month,
            day,
            hour: (within / MS_PER_HOUR) as u8,
            minute: (within % MS_PER_HOUR / MS_PER_MINUTE) as u8,
            second: (within % MS_PER_MINUTE / MS_PER_SECOND) as u8,
            millisecond: (within % MS_PER_SECOND) as u16,
            // 1970-01-01 was a Thursday
            weekday: (days + 4).rem_euclid(7) as u8,
        }
    }
}

/// Time value for broken-down components with a zero-based month.
pub(crate) fn compose(
    year: i64,
    month0: i64,
    day: i64,
    hour: i64,
    minute: i64,
    second: i64,
    millisecond: i64,
) -> Option<i64> {
    make_date(
        make_day(year, month0, day)?,
        make_time(hour, minute, second, millisecond)?,
    )
}
