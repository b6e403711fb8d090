use std::sync::{Arc, PoisonError, RwLock};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Number of weekday labels a locale must carry, Sunday first
pub const WEEKDAY_COUNT: usize = 7;
/// Number of labels in each month table
pub const MONTH_COUNT: usize = 12;
/// Hours in a day, partitioned by the interval labels
const HOURS_PER_DAY: usize = 24;

/// Human-readable labels used by the locale-derived tokens (`W`, `a`, `A`).
///
/// `interval` splits the day into equal periods: with four labels, hours
/// `0..6` get the first, `6..12` the second, and so on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "LocalePatch")]
pub struct Locale {
    weekdays: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    months: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    months_short: Option<Vec<String>>,
    interval: Vec<String>,
}

/// Error type for locale configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocaleError {
    #[error("Locale needs 7 weekday labels, found {0}")]
    WeekdayCount(usize),

    #[error("Locale table `{table}` needs 12 labels, found {found}")]
    MonthCount { table: &'static str, found: usize },

    #[error("Locale interval needs at least one label")]
    EmptyInterval,
}

fn labels<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    items.into_iter().map(Into::into).collect()
}

impl Locale {
    /// Creates a locale without month names.
    ///
    /// # Errors
    /// Returns `LocaleError` if there are not exactly 7 weekdays or no
    /// interval labels.
    pub fn new<W, I, S, T>(weekdays: W, interval: I) -> Result<Self, LocaleError>
    where
        W: IntoIterator<Item = S>,
        S: Into<String>,
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let locale = Self {
            weekdays: labels(weekdays),
            months: None,
            months_short: None,
            interval: labels(interval),
        };
        locale.validate()?;
        Ok(locale)
    }

    /// English labels with full and short month names and a two-period
    /// (`am`/`pm`) day.
    pub fn en() -> Self {
        Self {
            weekdays: labels([
                "Sunday",
                "Monday",
                "Tuesday",
                "Wednesday",
                "Thursday",
                "Friday",
                "Saturday",
            ]),
            months: Some(labels([
                "January",
                "February",
                "March",
                "April",
                "May",
                "June",
                "July",
                "August",
                "September",
                "October",
                "November",
                "December",
            ])),
            months_short: Some(labels([
                "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
            ])),
            interval: labels(["am", "pm"]),
        }
    }

    fn validate(&self) -> Result<(), LocaleError> {
        if self.weekdays.len() != WEEKDAY_COUNT {
            return Err(LocaleError::WeekdayCount(self.weekdays.len()));
        }
        for (table, names) in [("months", &self.months), ("monthsShort", &self.months_short)] {
            if let Some(names) = names {
                if names.len() != MONTH_COUNT {
                    return Err(LocaleError::MonthCount {
                        table,
                        found: names.len(),
                    });
                }
            }
        }
        if self.interval.is_empty() {
            return Err(LocaleError::EmptyInterval);
        }
        Ok(())
    }

    /// Returns a copy with every table present in `patch` replaced.
    ///
    /// # Errors
    /// Returns `LocaleError` if the merged tables are malformed.
    pub fn merge(&self, patch: &LocalePatch) -> Result<Self, LocaleError> {
        let merged = Self {
            weekdays: patch
                .weekdays
                .clone()
                .unwrap_or_else(|| self.weekdays.clone()),
            months: patch.months.clone().or_else(|| self.months.clone()),
            months_short: patch
                .months_short
                .clone()
                .or_else(|| self.months_short.clone()),
            interval: patch
                .interval
                .clone()
                .unwrap_or_else(|| self.interval.clone()),
        };
        merged.validate()?;
        Ok(merged)
    }

    pub fn weekdays(&self) -> &[String] {
        &self.weekdays
    }

    pub fn interval(&self) -> &[String] {
        &self.interval
    }

    /// Label for a weekday, 0 being Sunday
    pub fn weekday(&self, weekday: u8) -> Option<&str> {
        self.weekdays.get(usize::from(weekday)).map(String::as_str)
    }

    /// Full name for a 1-based month, if the locale has month names
    pub fn month(&self, month: u8) -> Option<&str> {
        Self::month_in(self.months.as_deref(), month)
    }

    /// Short name for a 1-based month, if the locale has short month names
    pub fn month_short(&self, month: u8) -> Option<&str> {
        Self::month_in(self.months_short.as_deref(), month)
    }

    fn month_in(names: Option<&[String]>, month: u8) -> Option<&str> {
        let index = usize::from(month).checked_sub(1)?;
        names?.get(index).map(String::as_str)
    }

    /// Label of the day period containing `hour` (`0..24`).
    pub fn period(&self, hour: u8) -> Option<&str> {
        let index = usize::from(hour) * self.interval.len() / HOURS_PER_DAY;
        self.interval.get(index).map(String::as_str)
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self {
            weekdays: labels(["日", "一", "二", "三", "四", "五", "六"]),
            months: None,
            months_short: None,
            interval: labels(["凌晨", "上午", "下午", "晚上"]),
        }
    }
}

/// A partial locale: tables left as `None` keep their current value on merge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocalePatch {
    pub weekdays: Option<Vec<String>>,
    pub months: Option<Vec<String>>,
    pub months_short: Option<Vec<String>>,
    pub interval: Option<Vec<String>>,
}

impl LocalePatch {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn weekdays<I, S>(mut self, weekdays: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.weekdays = Some(labels(weekdays));
        self
    }

    #[must_use]
    pub fn months<I, S>(mut self, months: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.months = Some(labels(months));
        self
    }

    #[must_use]
    pub fn months_short<I, S>(mut self, months: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.months_short = Some(labels(months));
        self
    }

    #[must_use]
    pub fn interval<I, S>(mut self, interval: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.interval = Some(labels(interval));
        self
    }
}

impl TryFrom<LocalePatch> for Locale {
    type Error = LocaleError;

    fn try_from(patch: LocalePatch) -> Result<Self, Self::Error> {
        Self::default().merge(&patch)
    }
}

static CURRENT: Lazy<RwLock<Arc<Locale>>> = Lazy::new(|| RwLock::new(Arc::new(Locale::default())));

/// The process-wide locale new dates snapshot at construction.
pub fn current_locale() -> Arc<Locale> {
    // the table is swapped whole, so a poisoned lock still holds a valid one
    Arc::clone(&CURRENT.read().unwrap_or_else(PoisonError::into_inner))
}

/// Merges `patch` into the process-wide locale and returns the result.
/// `None` leaves the table unchanged and returns it.
///
/// Dates constructed earlier keep the table they were created with.
///
/// # Errors
/// Returns `LocaleError` if the merged tables are malformed; the current
/// table is left in place.
pub fn locale(patch: Option<LocalePatch>) -> Result<Arc<Locale>, LocaleError> {
    let Some(patch) = patch else {
        return Ok(current_locale());
    };
    let mut current = CURRENT.write().unwrap_or_else(PoisonError::into_inner);
    let merged = Arc::new(current.merge(&patch)?);
    *current = Arc::clone(&merged);
    log::debug!("locale updated: {patch:?}");
    Ok(merged)
}

/// Restores the default process-wide locale and returns it.
pub fn reset_locale() -> Arc<Locale> {
    let fresh = Arc::new(Locale::default());
    *CURRENT.write().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&fresh);
    fresh
}
