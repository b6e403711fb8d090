/// Milliseconds in one second
pub const MS_PER_SECOND: i64 = 1_000;
/// Milliseconds in one minute
pub const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
/// Milliseconds in one hour
pub const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
/// Milliseconds in one day
pub const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;
/// Milliseconds in one week
pub const MS_PER_WEEK: i64 = 7 * MS_PER_DAY;

/// Approximate month length used only for fractional month remainders
pub const MS_PER_APPROX_MONTH: i64 = 30 * MS_PER_DAY;
/// Approximate year length used only as a fallback step
pub const MS_PER_APPROX_YEAR: i64 = 365 * MS_PER_DAY;

/// Largest representable distance from the epoch, in either direction (±100,000,000 days)
pub const MAX_TIME: i64 = 100_000_000 * MS_PER_DAY;

/// Months per year, also the month step of one year
pub const MONTHS_PER_YEAR: i64 = 12;

/// Month number for February
pub const FEBRUARY: u8 = 2;

/// Days in February for leap years
pub const FEBRUARY_DAYS_LEAP: u8 = 29;

/// Maximum days in each month (index 0 is unused, months are 1-indexed)
/// February shows 28 days (non-leap year default)
pub const DAYS_IN_MONTH: [u8; 13] = [
    0,  // index 0 unused (months are 1-indexed)
    31, // January
    28, // February (non-leap, adjusted by is_leap_year check)
    31, // March
    30, // April
    31, // May
    30, // June
    31, // July
    31, // August
    30, // September
    31, // October
    30, // November
    31, // December
];

/// Leap year occurs every 4 years
pub(crate) const LEAP_YEAR_CYCLE: i64 = 4;
/// Century years are not leap years unless...
pub(crate) const CENTURY_CYCLE: i64 = 100;
/// ...they are divisible by 400 (Gregorian calendar correction)
pub(crate) const GREGORIAN_CYCLE: i64 = 400;

/// Template used by `format` when none is supplied
pub const DEFAULT_FORMAT: &str = "Y-M-D H:I:S";

/// Rendered in place of a date when the time value is invalid
pub const INVALID_DATE: &str = "Invalid Date";

/// Date component separator (ISO 8601 format)
pub const DATE_SEPARATOR: char = '-';
/// Date component separator accepted as a local-time alternative to `-`
pub const SLASH_SEPARATOR: char = '/';
/// Time component separator
pub const TIME_SEPARATOR: char = ':';
