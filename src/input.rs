//! Normalization of the different things a date can be built from.

use chrono::{DateTime, TimeZone, Utc};

use crate::DateValue;
use crate::calendar::{compose, days_in_month, time_clip, time_clip_f64};
use crate::consts::{DATE_SEPARATOR, SLASH_SEPARATOR, TIME_SEPARATOR};
use crate::zone;

/// Anything a [`DateValue`] can be constructed from.
#[derive(Debug, Clone)]
pub enum DateInput {
    /// The current system time
    Now,
    /// Milliseconds since the epoch; fractions are truncated
    Millis(f64),
    /// A date string, read as local time unless it ends in `Z`
    Text(String),
    /// `[year, month0, day, hour, minute, second, millisecond]` in local
    /// time, with a zero-based month; missing trailing fields default to
    /// the start of their range. Years `0..=99` mean `1900..=1999`.
    Parts(Vec<i64>),
    /// Another date's time value
    Date(DateValue),
}

/// Error type for strict date string parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Empty date string")]
    Empty,

    #[error("Invalid date format: {0}")]
    InvalidFormat(String),

    #[error("Invalid {field}: {value}")]
    InvalidField { field: &'static str, value: i64 },

    #[error("Date out of range: {0}")]
    OutOfRange(String),
}

/// Added to two-digit years in component lists
const TWO_DIGIT_YEAR_BASE: i64 = 1900;

pub(crate) fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Time value of local wall-clock components, zero-based month.
pub(crate) fn local_time_value(parts: [i64; 7]) -> Option<i64> {
    let [year, month0, day, hour, minute, second, millisecond] = parts;
    let wall = compose(year, month0, day, hour, minute, second, millisecond)?;
    time_clip(zone::to_utc(wall))
}

impl DateInput {
    /// Resolves to a time value, or `None` for an invalid date.
    ///
    /// Empty input (`Now`, `NaN`, an empty string, no parts) means now.
    pub(crate) fn resolve(self) -> Option<i64> {
        match self {
            Self::Now => Some(now_ms()),
            Self::Millis(ms) if ms.is_nan() => Some(now_ms()),
            Self::Millis(ms) => time_clip_f64(ms),
            Self::Text(text) if text.trim().is_empty() => Some(now_ms()),
            Self::Text(text) => parse_text_lenient(&text)
                .map_err(|err| log::debug!("unparseable date {text:?}: {err}"))
                .ok(),
            Self::Parts(parts) => match parts.as_slice() {
                [] => Some(now_ms()),
                [ms] => time_clip(*ms),
                [year, month0, rest @ ..] => {
                    let year = if (0..=99).contains(year) {
                        TWO_DIGIT_YEAR_BASE + year
                    } else {
                        *year
                    };
                    let mut fields = [year, *month0, 1, 0, 0, 0, 0];
                    for (field, value) in fields[2..].iter_mut().zip(rest) {
                        *field = *value;
                    }
                    local_time_value(fields)
                }
            },
            Self::Date(date) => date.value_of(),
        }
    }
}

impl From<()> for DateInput {
    fn from((): ()) -> Self {
        Self::Now
    }
}

impl<T: Into<Self>> From<Option<T>> for DateInput {
    fn from(input: Option<T>) -> Self {
        input.map_or(Self::Now, Into::into)
    }
}

impl From<i64> for DateInput {
    fn from(ms: i64) -> Self {
        Self::Millis(ms as f64)
    }
}

impl From<i32> for DateInput {
    fn from(ms: i32) -> Self {
        Self::Millis(f64::from(ms))
    }
}

impl From<u32> for DateInput {
    fn from(ms: u32) -> Self {
        Self::Millis(f64::from(ms))
    }
}

impl From<f64> for DateInput {
    fn from(ms: f64) -> Self {
        Self::Millis(ms)
    }
}

impl From<&str> for DateInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for DateInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&String> for DateInput {
    fn from(text: &String) -> Self {
        Self::Text(text.clone())
    }
}

impl From<Vec<i64>> for DateInput {
    fn from(parts: Vec<i64>) -> Self {
        Self::Parts(parts)
    }
}

impl From<&[i64]> for DateInput {
    fn from(parts: &[i64]) -> Self {
        Self::Parts(parts.to_vec())
    }
}

impl<const N: usize> From<[i64; N]> for DateInput {
    fn from(parts: [i64; N]) -> Self {
        Self::Parts(parts.to_vec())
    }
}

impl From<DateValue> for DateInput {
    fn from(date: DateValue) -> Self {
        Self::Date(date)
    }
}

impl From<&DateValue> for DateInput {
    fn from(date: &DateValue) -> Self {
        Self::Date(date.clone())
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for DateInput {
    fn from(date: DateTime<Tz>) -> Self {
        Self::Millis(date.timestamp_millis() as f64)
    }
}

struct Cursor<'s> {
    bytes: &'s [u8],
    pos: usize,
}

impl<'s> Cursor<'s> {
    const fn new(text: &'s str) -> Self {
        Self {
            bytes: text.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    const fn is_done(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    /// Reads between one and `max` ASCII digits; returns the value and the
    /// number of digits read.
    fn digits(&mut self, max: usize) -> Option<(i64, usize)> {
        let start = self.pos;
        let mut value: i64 = 0;
        while self.pos - start < max {
            match self.peek() {
                Some(b @ b'0'..=b'9') => {
                    value = value * 10 + i64::from(b - b'0');
                    self.pos += 1;
                }
                _ => break,
            }
        }
        let count = self.pos - start;
        (count > 0).then_some((value, count))
    }

    /// Skips any run of further digits, returning how many were skipped.
    fn skip_digits(&mut self) -> usize {
        let start = self.pos;
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
        self.pos - start
    }
}

fn check(field: &'static str, value: i64, min: i64, max: i64) -> Result<i64, ParseError> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(ParseError::InvalidField { field, value })
    }
}

/// How far past its month or day a string's fields may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Overflow {
    /// Every field must name a real calendar slot
    Reject,
    /// Day up to 31 and hour up to 24, rolling into the next month or day
    Roll,
}

/// Parses a date string into a time value, rejecting out-of-range fields.
///
/// Accepts `YEAR[-MONTH[-DAY]][ HH:MM[:SS[.fff]]]`, with `/` allowed in
/// place of `-` and `T` in place of the space. A trailing `Z` reads the
/// components as UTC; otherwise they are local time.
pub(crate) fn parse_text(text: &str) -> Result<i64, ParseError> {
    parse_with(text, Overflow::Reject)
}

/// Like [`parse_text`], but `2023-02-30` is March 2 and `24:00` is
/// midnight of the next day.
pub(crate) fn parse_text_lenient(text: &str) -> Result<i64, ParseError> {
    parse_with(text, Overflow::Roll)
}

fn parse_with(text: &str, overflow: Overflow) -> Result<i64, ParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }
    let invalid = || ParseError::InvalidFormat(trimmed.to_owned());

    let (body, is_utc) = match trimmed.strip_suffix(['Z', 'z']) {
        Some(body) => (body, true),
        None => (trimmed, false),
    };
    let mut cur = Cursor::new(body);

    let negative = if cur.eat(b'-') {
        true
    } else {
        cur.eat(b'+');
        false
    };
    let (year, _) = cur.digits(6).ok_or_else(invalid)?;
    let year = if negative { -year } else { year };

    let mut month = 1;
    let mut day = 1;
    let separator = [DATE_SEPARATOR, SLASH_SEPARATOR]
        .into_iter()
        .find(|sep| cur.peek() == Some(*sep as u8));
    if let Some(sep) = separator {
        cur.eat(sep as u8);
        month = check("month", cur.digits(2).ok_or_else(invalid)?.0, 1, 12)?;
        if cur.eat(sep as u8) {
            day = cur.digits(2).ok_or_else(invalid)?.0;
        }
        if matches!(cur.peek(), Some(b'-' | b'/')) {
            // a second, different separator
            return Err(invalid());
        }
    }
    let (max_day, max_hour) = match overflow {
        Overflow::Reject => (i64::from(days_in_month(year, month as u8)), 23),
        Overflow::Roll => (31, 24),
    };
    let day = check("day", day, 1, max_day)?;

    let (mut hour, mut minute, mut second, mut millisecond) = (0, 0, 0, 0);
    if !cur.is_done() {
        let had_space = {
            let start = cur.pos;
            while cur.eat(b' ') {}
            cur.pos > start
        };
        if !had_space && !cur.eat(b'T') && !cur.eat(b't') {
            return Err(invalid());
        }
        let colon = TIME_SEPARATOR as u8;
        hour = check("hour", cur.digits(2).ok_or_else(invalid)?.0, 0, max_hour)?;
        if !cur.eat(colon) {
            return Err(invalid());
        }
        minute = check("minute", cur.digits(2).ok_or_else(invalid)?.0, 0, 59)?;
        if cur.eat(colon) {
            second = check("second", cur.digits(2).ok_or_else(invalid)?.0, 0, 59)?;
            if cur.eat(b'.') {
                let (fraction, count) = cur.digits(3).ok_or_else(invalid)?;
                cur.skip_digits();
                millisecond = fraction * 10_i64.pow(3 - count as u32);
            } else if cur.eat(colon) {
                millisecond = cur.digits(3).ok_or_else(invalid)?.0;
            }
        }
    }
    if !cur.is_done() {
        return Err(invalid());
    }

    let time = if is_utc {
        compose(year, month - 1, day, hour, minute, second, millisecond).and_then(time_clip)
    } else {
        local_time_value([year, month - 1, day, hour, minute, second, millisecond])
    };
    time.ok_or_else(|| ParseError::OutOfRange(trimmed.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local(parts: [i64; 7]) -> i64 {
        local_time_value(parts).unwrap()
    }

    #[test]
    fn test_parse_local_dates() {
        let args = [
            ("2019-10-05", [2019, 9, 5, 0, 0, 0, 0]),
            ("2019/10/5", [2019, 9, 5, 0, 0, 0, 0]),
            ("2019-10", [2019, 9, 1, 0, 0, 0, 0]),
            ("2019", [2019, 0, 1, 0, 0, 0, 0]),
            ("2019-10-5 6:5", [2019, 9, 5, 6, 5, 0, 0]),
            ("2019-10-5 6:5:4", [2019, 9, 5, 6, 5, 4, 0]),
            ("2019-10-5 6:5:4:321", [2019, 9, 5, 6, 5, 4, 321]),
            ("2019-10-05T06:05:04.3", [2019, 9, 5, 6, 5, 4, 300]),
            ("2019-10-05T06:05:04.123456", [2019, 9, 5, 6, 5, 4, 123]),
            ("  2000-02-29  ", [2000, 1, 29, 0, 0, 0, 0]),
        ];
        for (text, parts) in args {
            assert_eq!(parse_text(text), Ok(local(parts)), "{text}");
        }
    }

    #[test]
    fn test_parse_utc_dates() {
        assert_eq!(parse_text("1970-01-01T00:00:00Z"), Ok(0));
        assert_eq!(parse_text("2000-01-01T00:00:00.000Z"), Ok(946_684_800_000));
        assert_eq!(parse_text("2000-01-01z"), Ok(946_684_800_000));
        assert_eq!(
            parse_text("2011-07-31T14:48:00.000Z"),
            Ok(compose(2011, 6, 31, 14, 48, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_text(""), Err(ParseError::Empty));
        assert_eq!(parse_text("   "), Err(ParseError::Empty));
        assert!(matches!(parse_text("abc"), Err(ParseError::InvalidFormat(_))));
        assert!(matches!(parse_text("2019-10/05"), Err(ParseError::InvalidFormat(_))));
        assert!(matches!(parse_text("2019-10-05 06"), Err(ParseError::InvalidFormat(_))));
        assert!(matches!(parse_text("2019-10-05x"), Err(ParseError::InvalidFormat(_))));
        assert!(matches!(parse_text("1546345000"), Err(ParseError::InvalidFormat(_))));
        assert_eq!(
            parse_text("2019-13-01"),
            Err(ParseError::InvalidField {
                field: "month",
                value: 13
            })
        );
        assert_eq!(
            parse_text("2023-02-29"),
            Err(ParseError::InvalidField {
                field: "day",
                value: 29
            })
        );
        assert_eq!(
            parse_text("2019-10-05 24:00"),
            Err(ParseError::InvalidField {
                field: "hour",
                value: 24
            })
        );
        assert_eq!(
            parse_text("2019-10-05 10:60").unwrap_err().to_string(),
            "Invalid minute: 60"
        );
    }

    #[test]
    fn test_resolve_now_like_inputs() {
        let before = now_ms();
        for input in [
            DateInput::Now,
            DateInput::Millis(f64::NAN),
            DateInput::Text(String::new()),
            DateInput::Parts(Vec::new()),
            DateInput::from(None::<i64>),
        ] {
            let resolved = input.resolve().unwrap();
            assert!(resolved >= before && resolved <= now_ms());
        }
    }

    #[test]
    fn test_resolve_millis() {
        assert_eq!(DateInput::from(0).resolve(), Some(0));
        assert_eq!(DateInput::from(1.9).resolve(), Some(1));
        assert_eq!(DateInput::from(-1.9).resolve(), Some(-1));
        assert_eq!(DateInput::from(f64::INFINITY).resolve(), None);
        assert_eq!(DateInput::from(8.64e15 + 1.0).resolve(), None);
    }

    #[test]
    fn test_resolve_parts() {
        assert_eq!(DateInput::from([1_546_345_000]).resolve(), Some(1_546_345_000));
        assert_eq!(
            DateInput::from([2020, 12]).resolve(),
            Some(local([2021, 0, 1, 0, 0, 0, 0]))
        );
        assert_eq!(
            DateInput::from(vec![2024, 2, 0, 23, 59, 59, 999, 42]).resolve(),
            Some(local([2024, 1, 29, 23, 59, 59, 999]))
        );
        assert_eq!(DateInput::from([i64::MAX, 0]).resolve(), None);
    }

    #[test]
    fn test_resolve_parts_two_digit_years() {
        assert_eq!(
            DateInput::from([5, 0, 1]).resolve(),
            Some(local([1905, 0, 1, 0, 0, 0, 0]))
        );
        assert_eq!(
            DateInput::from([99, 11, 31]).resolve(),
            Some(local([1999, 11, 31, 0, 0, 0, 0]))
        );
        assert_eq!(
            DateInput::from([100, 0, 1]).resolve(),
            Some(local([100, 0, 1, 0, 0, 0, 0]))
        );
        assert_eq!(
            DateInput::from([-1, 0, 1]).resolve(),
            Some(local([-1, 0, 1, 0, 0, 0, 0]))
        );
    }

    #[test]
    fn test_lenient_text_rolls_over() {
        assert_eq!(
            parse_text_lenient("2023-02-30"),
            Ok(local([2023, 2, 2, 0, 0, 0, 0]))
        );
        assert_eq!(
            parse_text_lenient("2019-10-05 24:00"),
            Ok(local([2019, 9, 6, 0, 0, 0, 0]))
        );
        assert_eq!(
            DateInput::from("2023/04/31 10:00").resolve(),
            Some(local([2023, 4, 1, 10, 0, 0, 0]))
        );
        // fields past what the calendar ever allows are still rejected
        assert!(parse_text_lenient("2023-02-32").is_err());
        assert!(parse_text_lenient("2023-13-01").is_err());
        assert!(parse_text_lenient("2019-10-05 25:00").is_err());
        assert!(parse_text_lenient("2019-10-05 10:60").is_err());
        // the strict path keeps rejecting the rolled-over forms
        assert!(parse_text("2023-02-30").is_err());
        assert!(parse_text("2019-10-05 24:00").is_err());
    }

    #[test]
    fn test_resolve_invalid_text() {
        assert_eq!(DateInput::from("not a date").resolve(), None);
    }

    #[test]
    fn test_resolve_chrono() {
        let dt = Utc.timestamp_millis_opt(1_571_136_267_050).unwrap();
        assert_eq!(DateInput::from(dt).resolve(), Some(1_571_136_267_050));
    }
}
