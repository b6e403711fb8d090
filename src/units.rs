use crate::consts::{
    MS_PER_APPROX_MONTH, MS_PER_APPROX_YEAR, MS_PER_DAY, MS_PER_HOUR, MS_PER_MINUTE,
    MS_PER_SECOND, MS_PER_WEEK,
};
use crate::prelude::*;
use std::str::FromStr;

/// A calendar unit, written as a short token: `y m d w h i s ms u U`.
///
/// Units select what `set`, `add`, `diff` and `start_of` act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Unit {
    #[display(fmt = "y")]
    Year,
    #[display(fmt = "m")]
    Month,
    #[display(fmt = "d")]
    Day,
    #[display(fmt = "w")]
    Week,
    #[display(fmt = "h")]
    Hour,
    #[display(fmt = "i")]
    Minute,
    #[display(fmt = "s")]
    Second,
    #[display(fmt = "ms")]
    Millisecond,
    /// Milliseconds since the epoch
    #[display(fmt = "u")]
    Timestamp,
    /// Seconds since the epoch
    #[display(fmt = "U")]
    UnixSeconds,
}

/// Error for a string that names no [`Unit`] or [`Token`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown unit token: {0:?}")]
pub struct UnknownToken(pub String);

impl Unit {
    pub const ALL: [Self; 10] = [
        Self::Year,
        Self::Month,
        Self::Day,
        Self::Week,
        Self::Hour,
        Self::Minute,
        Self::Second,
        Self::Millisecond,
        Self::Timestamp,
        Self::UnixSeconds,
    ];

    /// Length of one unit in milliseconds.
    ///
    /// Years and months are calendar-relative, so their steps (365 and 30
    /// days) are approximations; `u` and `U` have none.
    pub const fn step_ms(self) -> Option<i64> {
        match self {
            Self::Year => Some(MS_PER_APPROX_YEAR),
            Self::Month => Some(MS_PER_APPROX_MONTH),
            Self::Week => Some(MS_PER_WEEK),
            Self::Day => Some(MS_PER_DAY),
            Self::Hour => Some(MS_PER_HOUR),
            Self::Minute => Some(MS_PER_MINUTE),
            Self::Second => Some(MS_PER_SECOND),
            Self::Millisecond => Some(1),
            Self::Timestamp | Self::UnixSeconds => None,
        }
    }

    /// Number of months in one unit, for the calendar-relative units.
    pub const fn months(self) -> Option<i64> {
        match self {
            Self::Year => Some(12),
            Self::Month => Some(1),
            _ => None,
        }
    }
}

impl FromStr for Unit {
    type Err = UnknownToken;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "y" => Self::Year,
            "m" => Self::Month,
            "d" => Self::Day,
            "w" => Self::Week,
            "h" => Self::Hour,
            "i" => Self::Minute,
            "s" => Self::Second,
            "ms" => Self::Millisecond,
            "u" => Self::Timestamp,
            "U" => Self::UnixSeconds,
            _ => return Err(UnknownToken(s.to_owned())),
        })
    }
}

/// A readable field of a date, as used by `get` and in format templates.
///
/// Lowercase tokens read the raw number; uppercase tokens read the
/// zero-padded string or the locale label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Token {
    #[display(fmt = "y")]
    Year,
    #[display(fmt = "Y")]
    YearPadded,
    #[display(fmt = "m")]
    Month,
    #[display(fmt = "M")]
    MonthPadded,
    #[display(fmt = "d")]
    Day,
    #[display(fmt = "D")]
    DayPadded,
    #[display(fmt = "w")]
    Weekday,
    #[display(fmt = "W")]
    WeekdayLabel,
    #[display(fmt = "h")]
    Hour,
    #[display(fmt = "H")]
    HourPadded,
    #[display(fmt = "i")]
    Minute,
    #[display(fmt = "I")]
    MinutePadded,
    #[display(fmt = "s")]
    Second,
    #[display(fmt = "S")]
    SecondPadded,
    #[display(fmt = "ms")]
    Millisecond,
    #[display(fmt = "MS")]
    MillisecondPadded,
    #[display(fmt = "a")]
    Period,
    #[display(fmt = "A")]
    PeriodUpper,
    #[display(fmt = "u")]
    Timestamp,
    #[display(fmt = "U")]
    UnixSeconds,
}

impl Token {
    /// Reads the token at the start of `s`, preferring the two-letter
    /// millisecond tokens. Returns the token and its byte length.
    pub fn match_prefix(s: &str) -> Option<(Self, usize)> {
        if s.starts_with("MS") {
            return Some((Self::MillisecondPadded, 2));
        }
        if s.starts_with("ms") {
            return Some((Self::Millisecond, 2));
        }
        let token = match s.chars().next()? {
            'Y' => Self::YearPadded,
            'y' => Self::Year,
            'M' => Self::MonthPadded,
            'm' => Self::Month,
            'D' => Self::DayPadded,
            'd' => Self::Day,
            'W' => Self::WeekdayLabel,
            'w' => Self::Weekday,
            'H' => Self::HourPadded,
            'h' => Self::Hour,
            'I' => Self::MinutePadded,
            'i' => Self::Minute,
            'S' => Self::SecondPadded,
            's' => Self::Second,
            'A' => Self::PeriodUpper,
            'a' => Self::Period,
            'U' => Self::UnixSeconds,
            'u' => Self::Timestamp,
            _ => return None,
        };
        Some((token, 1))
    }
}

impl FromStr for Token {
    type Err = UnknownToken;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Self::match_prefix(s) {
            Some((token, len)) if len == s.len() => Ok(token),
            _ => Err(UnknownToken(s.to_owned())),
        }
    }
}
