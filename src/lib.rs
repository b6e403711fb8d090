mod arith;
mod calendar;
mod consts;
mod format;
mod input;
mod locale;
mod prelude;
mod range;
mod units;
mod zone;

pub use arith::Amount;
pub use calendar::{days_in_month, is_leap_year};
pub use consts::*;
pub use format::{Format, Segment, Value};
pub use input::{DateInput, ParseError};
pub use locale::{
    Locale, LocaleError, LocalePatch, MONTH_COUNT, WEEKDAY_COUNT, current_locale, locale,
    reset_locale,
};
pub use units::{Token, Unit, UnknownToken};

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::Arc;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local};

use calendar::{Fields, time_clip_f64};
use input::local_time_value;

/// A point in time read on the host's local wall clock.
///
/// Holds epoch milliseconds, or nothing when built from input that is not a
/// date. Every operation takes `&self` and returns a new value; an invalid
/// date stays callable and reads as `None` / `NaN`.
#[derive(Debug, Clone)]
pub struct DateValue {
    value: Option<i64>,
    locale: Arc<Locale>,
}

/// Builds a [`DateValue`] from anything convertible to [`DateInput`].
///
/// ```
/// let d = dateio::date([2019, 9, 5, 6, 5, 4]);
/// assert_eq!(d.format("Y-M-D H:I:S"), "2019-10-05 06:05:04");
/// assert!(!dateio::date("not a date").is_valid());
/// ```
pub fn date(input: impl Into<DateInput>) -> DateValue {
    DateValue::new(input)
}

fn pad(number: i64, width: usize) -> String {
    format!("{number:0width$}")
}

impl DateValue {
    /// Builds a date using the process-wide locale.
    pub fn new(input: impl Into<DateInput>) -> Self {
        Self::with_locale(input, current_locale())
    }

    pub fn now() -> Self {
        Self::new(DateInput::Now)
    }

    /// Builds a date bound to `locale` instead of the process-wide table.
    pub fn with_locale(input: impl Into<DateInput>, locale: Arc<Locale>) -> Self {
        Self {
            value: input.into().resolve(),
            locale,
        }
    }

    /// Same locale, new time value.
    pub(crate) fn derive(&self, value: Option<i64>) -> Self {
        Self {
            value,
            locale: Arc::clone(&self.locale),
        }
    }

    pub(crate) fn local_fields(&self) -> Option<Fields> {
        self.value
            .map(|time| Fields::from_time(zone::to_local(time)))
    }

    pub fn locale(&self) -> &Arc<Locale> {
        &self.locale
    }

    pub const fn is_valid(&self) -> bool {
        self.value.is_some()
    }

    /// Epoch milliseconds, `None` when invalid.
    pub const fn value_of(&self) -> Option<i64> {
        self.value
    }

    pub fn to_date(&self) -> Option<DateTime<Local>> {
        self.value
            .and_then(DateTime::from_timestamp_millis)
            .map(|dt| dt.with_timezone(&Local))
    }

    /// `M/D/YYYY, h:mm:ss AM`, or `Invalid Date`.
    pub fn to_locale_string(&self) -> String {
        self.to_locale_string_with("%-m/%-d/%Y, %-I:%M:%S %p")
            .unwrap_or_else(|| INVALID_DATE.to_owned())
    }

    /// Formats with a strftime pattern. `None` for an invalid date or a
    /// malformed pattern.
    pub fn to_locale_string_with(&self, pattern: &str) -> Option<String> {
        let items = StrftimeItems::new(pattern).collect::<Vec<_>>();
        if items.iter().any(|item| matches!(item, Item::Error)) {
            return None;
        }
        self.to_date()
            .map(|dt| dt.format_with_items(items.iter()).to_string())
    }
}

// --- getters ---
impl DateValue {
    pub fn year(&self) -> Option<i64> {
        self.local_fields().map(|f| f.year)
    }

    /// Year zero-padded to 4 digits
    pub fn year_padded(&self) -> Option<String> {
        self.year().map(|year| pad(year, 4))
    }

    /// 1-based month
    pub fn month(&self) -> Option<i64> {
        self.local_fields().map(|f| i64::from(f.month))
    }

    pub fn month_padded(&self) -> Option<String> {
        self.month().map(|month| pad(month, 2))
    }

    pub fn day(&self) -> Option<i64> {
        self.local_fields().map(|f| i64::from(f.day))
    }

    pub fn day_padded(&self) -> Option<String> {
        self.day().map(|day| pad(day, 2))
    }

    /// 0 (Sunday) to 6 (Saturday)
    pub fn weekday(&self) -> Option<i64> {
        self.local_fields().map(|f| i64::from(f.weekday))
    }

    pub fn weekday_label(&self) -> Option<String> {
        let fields = self.local_fields()?;
        self.locale.weekday(fields.weekday).map(str::to_owned)
    }

    pub fn hour(&self) -> Option<i64> {
        self.local_fields().map(|f| i64::from(f.hour))
    }

    pub fn hour_padded(&self) -> Option<String> {
        self.hour().map(|hour| pad(hour, 2))
    }

    pub fn minute(&self) -> Option<i64> {
        self.local_fields().map(|f| i64::from(f.minute))
    }

    pub fn minute_padded(&self) -> Option<String> {
        self.minute().map(|minute| pad(minute, 2))
    }

    pub fn second(&self) -> Option<i64> {
        self.local_fields().map(|f| i64::from(f.second))
    }

    pub fn second_padded(&self) -> Option<String> {
        self.second().map(|second| pad(second, 2))
    }

    pub fn millisecond(&self) -> Option<i64> {
        self.local_fields().map(|f| i64::from(f.millisecond))
    }

    pub fn millisecond_padded(&self) -> Option<String> {
        self.millisecond().map(|ms| pad(ms, 3))
    }

    /// The locale's label for the part of the day this time falls in
    pub fn period(&self) -> Option<String> {
        let fields = self.local_fields()?;
        self.locale.period(fields.hour).map(str::to_owned)
    }

    pub fn period_upper(&self) -> Option<String> {
        self.period().map(|period| period.to_uppercase())
    }

    /// Epoch milliseconds
    pub const fn timestamp(&self) -> Option<i64> {
        self.value
    }

    /// Epoch seconds, rounded half up
    pub fn unix(&self) -> Option<i64> {
        self.value.map(|ms| (ms + 500).div_euclid(MS_PER_SECOND))
    }

    pub fn month_label(&self) -> Option<String> {
        let fields = self.local_fields()?;
        self.locale.month(fields.month).map(str::to_owned)
    }

    pub fn month_label_short(&self) -> Option<String> {
        let fields = self.local_fields()?;
        self.locale.month_short(fields.month).map(str::to_owned)
    }

    pub fn is_leap_year(&self) -> bool {
        self.year().is_some_and(is_leap_year)
    }

    pub fn days_in_month(&self) -> Option<u8> {
        let fields = self.local_fields()?;
        Some(days_in_month(fields.year, fields.month))
    }

    /// Reads one token.
    pub fn value(&self, token: Token) -> Value {
        match token {
            Token::Year => self.year().into(),
            Token::YearPadded => self.year_padded().into(),
            Token::Month => self.month().into(),
            Token::MonthPadded => self.month_padded().into(),
            Token::Day => self.day().into(),
            Token::DayPadded => self.day_padded().into(),
            Token::Weekday => self.weekday().into(),
            Token::WeekdayLabel => self.weekday_label().into(),
            Token::Hour => self.hour().into(),
            Token::HourPadded => self.hour_padded().into(),
            Token::Minute => self.minute().into(),
            Token::MinutePadded => self.minute_padded().into(),
            Token::Second => self.second().into(),
            Token::SecondPadded => self.second_padded().into(),
            Token::Millisecond => self.millisecond().into(),
            Token::MillisecondPadded => self.millisecond_padded().into(),
            Token::Period => self.period().into(),
            Token::PeriodUpper => self.period_upper().into(),
            Token::Timestamp => self.timestamp().into(),
            Token::UnixSeconds => self.unix().into(),
        }
    }

    /// Reads the token named by `token`; `None` if it names no token.
    pub fn get(&self, token: &str) -> Option<Value> {
        token.parse().ok().map(|token| self.value(token))
    }

    /// Renders `template`, or `Y-M-D H:I:S` when it is empty.
    pub fn format(&self, template: &str) -> String {
        self.format_with(&Format::parse(template))
    }

    pub fn format_with(&self, format: &Format<'_>) -> String {
        format.render(|token| self.value(token))
    }
}

// --- setters ---
impl DateValue {
    /// Sets `unit` from `values`, the way the native multi-field setters do.
    ///
    /// The first value sets `unit`; the rest set the next finer fields
    /// (`y` takes year, month, day; `h` takes hour, minute, second, ms).
    /// Months are 1-based. Fields roll over instead of clamping, so day 31
    /// of a 30-day month is the 1st of the next. Returns an unchanged copy
    /// for `w`, for no values, or if any value is not finite.
    pub fn set_unit(&self, unit: Unit, values: &[f64]) -> Self {
        if values.is_empty() || values.iter().any(|v| !v.is_finite()) {
            return self.clone();
        }
        let (first, max_args) = match unit {
            Unit::Timestamp => return self.derive(time_clip_f64(values[0])),
            Unit::UnixSeconds => {
                return self.derive(time_clip_f64(values[0] * MS_PER_SECOND as f64));
            }
            Unit::Week => return self.clone(),
            Unit::Year => (0, 3),
            Unit::Month => (1, 2),
            Unit::Day => (2, 1),
            Unit::Hour => (3, 4),
            Unit::Minute => (4, 3),
            Unit::Second => (5, 2),
            Unit::Millisecond => (6, 1),
        };

        let local = match (self.value, unit) {
            (Some(time), _) => zone::to_local(time),
            // an invalid date only accepts a new year, counted from local midnight
            (None, Unit::Year) => 0,
            (None, _) => return self.clone(),
        };
        let f = Fields::from_time(local);
        let mut parts = [
            f.year,
            i64::from(f.month) - 1,
            i64::from(f.day),
            i64::from(f.hour),
            i64::from(f.minute),
            i64::from(f.second),
            i64::from(f.millisecond),
        ];
        for (offset, value) in values.iter().take(max_args).enumerate() {
            let index = first + offset;
            let value = value.trunc() as i64;
            parts[index] = if index == 1 {
                value.saturating_sub(1)
            } else {
                value
            };
        }
        self.derive(local_time_value(parts))
    }

    /// Sets the unit named by `unit`; unknown tokens leave the date as is.
    pub fn set(&self, unit: &str, values: &[f64]) -> Self {
        match unit.parse::<Unit>() {
            Ok(unit) => self.set_unit(unit, values),
            Err(err) => {
                log::trace!("set ignored: {err}");
                self.clone()
            }
        }
    }

    pub fn with_year(&self, year: i64) -> Self {
        self.set_unit(Unit::Year, &[year as f64])
    }

    /// 1-based month
    pub fn with_month(&self, month: i64) -> Self {
        self.set_unit(Unit::Month, &[month as f64])
    }

    pub fn with_day(&self, day: i64) -> Self {
        self.set_unit(Unit::Day, &[day as f64])
    }

    pub fn with_hour(&self, hour: i64) -> Self {
        self.set_unit(Unit::Hour, &[hour as f64])
    }

    pub fn with_minute(&self, minute: i64) -> Self {
        self.set_unit(Unit::Minute, &[minute as f64])
    }

    pub fn with_second(&self, second: i64) -> Self {
        self.set_unit(Unit::Second, &[second as f64])
    }

    pub fn with_millisecond(&self, millisecond: i64) -> Self {
        self.set_unit(Unit::Millisecond, &[millisecond as f64])
    }

    /// Re-reads the date from epoch milliseconds.
    pub fn with_timestamp(&self, ms: i64) -> Self {
        self.set_unit(Unit::Timestamp, &[ms as f64])
    }

    /// Re-reads the date from epoch seconds.
    pub fn with_unix(&self, secs: i64) -> Self {
        self.set_unit(Unit::UnixSeconds, &[secs as f64])
    }
}

impl Default for DateValue {
    fn default() -> Self {
        Self::now()
    }
}

impl fmt::Display for DateValue {
    /// `Sat Oct 05 2019 06:05:04 GMT+0800`, or `Invalid Date`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_date() {
            Some(dt) => write!(f, "{}", dt.format("%a %b %d %Y %H:%M:%S GMT%z")),
            None => f.write_str(INVALID_DATE),
        }
    }
}

impl FromStr for DateValue {
    type Err = ParseError;

    /// Strict parsing: unlike [`DateValue::new`], a malformed string is an
    /// error rather than an invalid date.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let time = input::parse_text(s)?;
        Ok(Self {
            value: Some(time),
            locale: current_locale(),
        })
    }
}

impl PartialEq for DateValue {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for DateValue {}

impl PartialOrd for DateValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DateValue {
    /// Invalid dates sort first.
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

impl Hash for DateValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl serde::Serialize for DateValue {
    /// Epoch milliseconds, or `null` when invalid.
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self.value {
            Some(ms) => serializer.serialize_i64(ms),
            None => serializer.serialize_none(),
        }
    }
}

struct DateValueVisitor;

impl<'de> serde::de::Visitor<'de> for DateValueVisitor {
    type Value = DateValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("epoch milliseconds, a date string, or null")
    }

    fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<DateValue, E> {
        Ok(DateValue::new(v))
    }

    fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<DateValue, E> {
        Ok(DateValue::new(v as f64))
    }

    fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<DateValue, E> {
        if v.is_nan() {
            return Err(E::custom("NaN is not a time value"));
        }
        Ok(DateValue::new(v))
    }

    fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<DateValue, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_unit<E: serde::de::Error>(self) -> Result<DateValue, E> {
        Ok(DateValue {
            value: None,
            locale: current_locale(),
        })
    }

    fn visit_none<E: serde::de::Error>(self) -> Result<DateValue, E> {
        self.visit_unit()
    }

    fn visit_some<D>(self, deserializer: D) -> Result<DateValue, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_any(self)
    }
}

impl<'de> serde::Deserialize<'de> for DateValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_any(DateValueVisitor)
    }
}
