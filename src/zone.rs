//! Conversion between UTC time values and the host's local wall clock.

use chrono::{DateTime, Local, LocalResult, NaiveDateTime, TimeDelta, TimeZone};

use crate::consts::MS_PER_SECOND;

fn naive(time: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp_millis(time).map(|dt| dt.naive_utc())
}

/// Local offset, in milliseconds, in effect at the UTC instant `time`.
/// Instants outside chrono's range use offset zero.
pub(crate) fn offset_at(time: i64) -> i64 {
    naive(time).map_or(0, |utc| {
        i64::from(Local.offset_from_utc_datetime(&utc).local_minus_utc()) * MS_PER_SECOND
    })
}

/// Local wall-clock time value for a UTC time value.
pub(crate) fn to_local(time: i64) -> i64 {
    time + offset_at(time)
}

/// UTC time value for a local wall-clock time value.
///
/// A wall time repeated by a backward transition resolves to the earlier
/// instant. A wall time skipped by a forward transition is read with the
/// offset in effect before the transition, which moves it forward.
pub(crate) fn to_utc(local: i64) -> i64 {
    let Some(wall) = naive(local) else {
        return local;
    };
    let offset = match Local.offset_from_local_datetime(&wall) {
        LocalResult::Single(offset) | LocalResult::Ambiguous(offset, _) => offset,
        LocalResult::None => {
            let before = wall.checked_sub_signed(TimeDelta::days(1)).unwrap_or(wall);
            Local.offset_from_utc_datetime(&before)
        }
    };
    local - i64::from(offset.local_minus_utc()) * MS_PER_SECOND
}
