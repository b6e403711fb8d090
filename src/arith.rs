//! Adding to dates and measuring between them.

use std::sync::Arc;

use crate::calendar::time_clip_f64;
use crate::consts::{MONTHS_PER_YEAR, MS_PER_APPROX_MONTH};
use crate::input::DateInput;
use crate::units::Unit;
use crate::DateValue;

/// An amount to add: a plain number, or text such as `"7d"`, `"-1m"` or
/// `"5.5h"`.
#[derive(Debug, Clone, PartialEq)]
pub enum Amount {
    Number(f64),
    Text(String),
}

impl Amount {
    fn into_text(self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(text) => text,
        }
    }
}

impl From<f64> for Amount {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for Amount {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<i32> for Amount {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<&str> for Amount {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for Amount {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// Splits `[+-]digits[.digits][unit]` (or `[+-].digits[unit]`) into the
/// number and its unit suffix. The suffix must be one of `ms y m d w h i s`.
fn parse_amount(text: &str) -> Option<(f64, Option<Unit>)> {
    let bytes = text.as_bytes();
    let mut pos = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));

    let int_digits = bytes[pos..].iter().take_while(|b| b.is_ascii_digit()).count();
    pos += int_digits;
    if bytes.get(pos) == Some(&b'.') {
        let frac_digits = bytes[pos + 1..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        if frac_digits == 0 {
            return None;
        }
        pos += 1 + frac_digits;
    } else if int_digits == 0 {
        return None;
    }

    let (number, suffix) = text.split_at(pos);
    let unit = match suffix {
        "" => None,
        "ms" | "y" | "m" | "d" | "w" | "h" | "i" | "s" => suffix.parse().ok(),
        _ => return None,
    };
    Some((number.parse().ok()?, unit))
}

impl DateValue {
    /// Moves the date by whole months through the month setter.
    fn shift_months(&self, months: i64) -> Self {
        match self.month() {
            Some(month) => self.set_unit(Unit::Month, &[month.saturating_add(months) as f64]),
            None => self.clone(),
        }
    }

    fn shift_ms(&self, delta: f64) -> Self {
        self.derive(
            self.value_of()
                .and_then(|time| time_clip_f64(time as f64 + delta)),
        )
    }

    /// Adds `amount` in `unit`, or in the unit suffix of a text amount.
    ///
    /// Without either the amount is milliseconds. Years are converted to a
    /// rounded number of months. Months move the calendar month and add any
    /// fractional remainder as 30-day months. Other units add their fixed
    /// length. Text that does not read as an amount leaves the date as is.
    ///
    /// ```
    /// use dateio::{date, Unit};
    ///
    /// let d = date([2019, 0, 31]);
    /// assert_eq!(d.add("1m", None).format("Y-M-D"), "2019-03-03");
    /// assert_eq!(d.add(2, Some(Unit::Day)).format("Y-M-D"), "2019-02-02");
    /// ```
    pub fn add(&self, amount: impl Into<Amount>, unit: Option<Unit>) -> Self {
        let text = amount.into().into_text();
        let Some((amount, suffix)) = parse_amount(&text) else {
            log::trace!("add ignored: {text:?} is not an amount");
            return self.clone();
        };

        match suffix.or(unit).unwrap_or(Unit::Millisecond) {
            Unit::Year => self.shift_months((amount * MONTHS_PER_YEAR as f64).round() as i64),
            Unit::Month => {
                let shifted = self.shift_months(amount.trunc() as i64);
                let remainder = amount.fract();
                if remainder == 0.0 {
                    shifted
                } else {
                    shifted.shift_ms(remainder * MS_PER_APPROX_MONTH as f64)
                }
            }
            unit => match unit.step_ms() {
                Some(step) => self.shift_ms(amount * step as f64),
                None => self.clone(),
            },
        }
    }

    /// Adds the negated amount. Negation is textual, so an amount that is
    /// already negative does not parse and leaves the date as is.
    pub fn subtract(&self, amount: impl Into<Amount>, unit: Option<Unit>) -> Self {
        let text = amount.into().into_text();
        self.add(format!("-{text}"), unit)
    }

    /// `self - other` in `unit` (milliseconds when `None`), truncated toward
    /// zero unless `as_float`.
    ///
    /// Months and years follow the calendar: the fraction of a month is
    /// measured against the length of the month it falls in.
    pub fn diff(&self, other: impl Into<DateInput>, unit: Option<Unit>, as_float: bool) -> f64 {
        let other = Self::with_locale(other, Arc::clone(self.locale()));
        let unit = unit.unwrap_or(Unit::Millisecond);

        let diff = match unit.months() {
            Some(months) => month_diff(self, &other) / months as f64,
            None => match (self.value_of(), other.value_of()) {
                (Some(a), Some(b)) => (a - b) as f64 / unit.step_ms().unwrap_or(1) as f64,
                _ => f64::NAN,
            },
        };
        if as_float { diff } else { diff.trunc() }
    }
}

/// Months from `b` to `a`, with the fraction taken relative to the month
/// following (or preceding) the whole-month anchor. Invalid dates give 0.
fn month_diff(a: &DateValue, b: &DateValue) -> f64 {
    let (Some(ay), Some(am), Some(by), Some(bm), Some(bt)) =
        (a.year(), a.month(), b.year(), b.month(), b.value_of())
    else {
        return 0.0;
    };
    let whole = (by - ay) * MONTHS_PER_YEAR + (bm - am);
    let Some(anchor) = a.shift_months(whole).value_of() else {
        return 0.0;
    };
    let toward = if bt > anchor { 1 } else { -1 };
    let Some(anchor2) = a.shift_months(whole + toward).value_of() else {
        return 0.0;
    };

    let span = (anchor2 - anchor).abs() as f64;
    let months = -(whole as f64 + (bt - anchor) as f64 / span);
    // collapses -0.0 as well as non-finite results
    if months.is_finite() && months != 0.0 {
        months
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date;

    fn ymd(d: &DateValue) -> String {
        d.format("Y-M-D H:I:S.MS")
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("7d"), Some((7.0, Some(Unit::Day))));
        assert_eq!(parse_amount("-1m"), Some((-1.0, Some(Unit::Month))));
        assert_eq!(parse_amount("+5.5h"), Some((5.5, Some(Unit::Hour))));
        assert_eq!(parse_amount(".5y"), Some((0.5, Some(Unit::Year))));
        assert_eq!(parse_amount("250ms"), Some((250.0, Some(Unit::Millisecond))));
        assert_eq!(parse_amount("3"), Some((3.0, None)));
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("-"), None);
        assert_eq!(parse_amount("5."), None);
        assert_eq!(parse_amount("5u"), None);
        assert_eq!(parse_amount("5 d"), None);
        assert_eq!(parse_amount("--1d"), None);
        assert_eq!(parse_amount("NaN"), None);
        assert_eq!(parse_amount("1e3"), None);
    }

    #[test]
    fn test_add_ms_round_trip() {
        let t = date(1_571_136_267_050_i64);
        for n in [0_i64, 1, -1, 999, 86_400_000, -31_536_000_000] {
            assert_eq!(t.add(n, None).diff(&t, None, false), n as f64);
            let added = t.add(n, Some(Unit::Millisecond));
            assert_eq!(added.diff(&t, Some(Unit::Millisecond), false), n as f64);
        }
    }

    #[test]
    fn test_add_fixed_units() {
        let d = date([2019, 9, 5, 6, 5, 4, 321]);
        assert_eq!(ymd(&d.add("1s", None)), "2019-10-05 06:05:05.321");
        assert_eq!(ymd(&d.add("2i", None)), "2019-10-05 06:07:04.321");
        assert_eq!(ymd(&d.add("-0.5h", None)), "2019-10-05 05:35:04.321");
        assert_eq!(ymd(&d.add(1.5, Some(Unit::Second))), "2019-10-05 06:05:05.821");
        assert_eq!(d.add("1w", None).diff(&d, Some(Unit::Day), false), 7.0);
        assert_eq!(d.add("3d", None).day(), Some(8));
        // the suffix wins over the unit argument
        assert_eq!(d.add("1d", Some(Unit::Year)).day(), Some(6));
    }

    #[test]
    fn test_add_months_and_years() {
        let d = date([2019, 0, 31]);
        assert_eq!(d.add("1m", None).format("Y-M-D"), "2019-03-03");
        assert_eq!(d.add("-2m", None).format("Y-M-D"), "2018-12-01");
        assert_eq!(d.add("13m", None).format("Y-M-D"), "2020-03-02");
        assert_eq!(d.add(1, Some(Unit::Year)).format("Y-M-D"), "2020-01-31");
        assert_eq!(d.add("0.5y", None).format("Y-M-D"), "2019-07-31");
        assert_eq!(date("2000-02-29").add("1y", None).format("Y-M-D"), "2001-03-01");
    }

    #[test]
    fn test_add_fractional_month_remainder() {
        let d = date([2019, 5, 1, 12]);
        let added = d.add("1.5m", None);
        assert_eq!(
            added.diff(d.add("1m", None), Some(Unit::Day), true),
            15.0
        );
    }

    #[test]
    fn test_add_ignores_non_amounts() {
        let d = date([2019, 9, 5]);
        assert_eq!(d.add("soon", None), d);
        assert_eq!(d.add("1x", None), d);
        assert_eq!(d.add(f64::NAN, None), d);
        assert_eq!(d.add("5", Some(Unit::Timestamp)), d);
    }

    #[test]
    fn test_subtract() {
        let d = date([2019, 9, 5, 6]);
        assert_eq!(d.subtract("1d", None).day(), Some(4));
        assert_eq!(d.subtract(2, Some(Unit::Hour)).hour(), Some(4));
        assert_eq!(d.subtract("1m", None).month(), Some(9));
        // textual negation of a negative amount does not parse
        assert_eq!(d.subtract("-1d", None), d);
        assert_eq!(d.subtract(-1, Some(Unit::Day)), d);
    }

    #[test]
    fn test_invalid_dates_stay_invalid() {
        let d = date("garbage");
        assert!(!d.add("1d", None).is_valid());
        assert!(!d.add("1m", None).is_valid());
        assert!(!d.add("1y", None).is_valid());
        assert!(d.diff(0, Some(Unit::Day), false).is_nan());
        assert_eq!(d.diff(0, Some(Unit::Month), false), 0.0);
        assert!(date(0).diff("garbage", None, false).is_nan());
    }

    #[test]
    fn test_diff_years() {
        let a = date("2020-01-01");
        let b = date("2021-01-01");
        assert_eq!(a.diff(&b, Some(Unit::Year), false), -1.0);
        assert_eq!(b.diff(&a, Some(Unit::Year), false), 1.0);
        assert_eq!(b.diff(&a, Some(Unit::Month), false), 12.0);
    }

    /// Milliseconds from `from` to `to`, both read as local time.
    fn span(from: &str, to: &str) -> f64 {
        (date(to).value_of().unwrap() - date(from).value_of().unwrap()) as f64
    }

    #[test]
    fn test_diff_fractional_months() {
        let a = date("2019-01-01");
        let b = date("2019-01-16 12:00");
        let ahead = span("2019-01-01", "2019-01-16 12:00") / span("2019-01-01", "2019-02-01");
        let behind =
            span("2019-01-01", "2019-01-16 12:00") / span("2018-12-16 12:00", "2019-01-16 12:00");
        assert_eq!(a.diff(&b, Some(Unit::Month), true), -ahead);
        assert_eq!(b.diff(&a, Some(Unit::Month), true), behind);
        assert_eq!(b.diff(&a, Some(Unit::Month), false), 0.0);
        // 15.5 of 31 days, give or take a DST hour
        assert!((ahead - 0.5).abs() < 0.01);

        let feb = date("2019-02-15");
        // measured against January, the month before the anchor
        assert_eq!(
            feb.diff(date("2019-02-01"), Some(Unit::Month), true),
            span("2019-02-01", "2019-02-15") / span("2019-01-15", "2019-02-15")
        );
        // measured against February itself
        let into_feb = span("2019-02-01", "2019-02-15") / span("2019-02-01", "2019-03-01");
        assert_eq!(
            date("2019-03-01").diff(&feb, Some(Unit::Month), true),
            1.0 - into_feb
        );
        assert!((into_feb - 0.5).abs() < 0.01);
    }

    #[test]
    fn test_diff_fractional_months_in_utc() {
        // UTC has no DST, so February is exactly 28 days
        let feb = date("2019-02-15T00:00:00Z");
        let mar = date("2019-03-01T00:00:00Z").value_of().unwrap();
        let feb_start = date("2019-02-01T00:00:00Z").value_of().unwrap();
        assert_eq!(mar - feb_start, 28 * 86_400_000);
        assert_eq!(feb.diff(mar, Some(Unit::Day), false), -14.0);
    }

    #[test]
    fn test_diff_fixed_units() {
        let a = date([2019, 9, 5, 12]);
        let b = date([2019, 9, 1, 0]);
        assert_eq!(a.diff(&b, Some(Unit::Day), false), 4.0);
        assert_eq!(a.diff(&b, Some(Unit::Day), true), 4.5);
        assert_eq!(b.diff(&a, Some(Unit::Day), false), -4.0);
        assert_eq!(a.diff(&b, Some(Unit::Hour), false), 108.0);
        assert_eq!(a.diff(&b, Some(Unit::Week), true), 4.5 / 7.0);
        assert_eq!(
            a.diff(&b, Some(Unit::Timestamp), false),
            a.diff(&b, None, false)
        );
    }
}
