use std::sync::Arc;

use crate::input::{DateInput, local_time_value};
use crate::units::Unit;
use crate::DateValue;

/// Fields filled in by a start boundary, year to millisecond
const STARTS: [i64; 7] = [0, 1, 1, 0, 0, 0, 0];
/// Fields filled in by an end boundary; day 0 is the last day of the month before
const ENDS: [i64; 7] = [0, 12, 0, 23, 59, 59, 999];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    Start,
    End,
}

/// How many leading fields (`y m d h i s`) a boundary of `unit` keeps.
const fn kept_fields(unit: Unit) -> Option<usize> {
    match unit {
        Unit::Year => Some(1),
        Unit::Month => Some(2),
        Unit::Day | Unit::Week => Some(3),
        Unit::Hour => Some(4),
        Unit::Minute => Some(5),
        Unit::Second => Some(6),
        Unit::Millisecond | Unit::Timestamp | Unit::UnixSeconds => None,
    }
}

impl DateValue {
    fn boundary(&self, unit: Unit, edge: Edge) -> Self {
        let (Some(kept), Some(f)) = (kept_fields(unit), self.local_fields()) else {
            return self.clone();
        };
        let current = [
            f.year,
            i64::from(f.month),
            i64::from(f.day),
            i64::from(f.hour),
            i64::from(f.minute),
            i64::from(f.second),
        ];
        let mut parts = match edge {
            Edge::Start => STARTS,
            Edge::End => ENDS,
        };
        parts[..kept].copy_from_slice(&current[..kept]);

        // the end of a year or month stays one month ahead, on day 0
        if edge == Edge::Start || unit.months().is_none() {
            parts[1] -= 1;
        }
        if unit == Unit::Week {
            let weekday = i64::from(f.weekday);
            parts[2] -= match edge {
                Edge::Start => weekday,
                Edge::End => weekday - 6,
            };
        }
        self.derive(local_time_value(parts))
    }

    /// The first instant of the `unit` containing this date.
    ///
    /// Weeks start on Sunday. `ms`, `u` and `U` return the date unchanged.
    ///
    /// ```
    /// let d = dateio::date("2019-10-05 06:05:04");
    /// assert_eq!(d.start_of(dateio::Unit::Month).format(""), "2019-10-01 00:00:00");
    /// ```
    pub fn start_of(&self, unit: Unit) -> Self {
        self.boundary(unit, Edge::Start)
    }

    /// The last millisecond of the `unit` containing this date.
    pub fn end_of(&self, unit: Unit) -> Self {
        self.boundary(unit, Edge::End)
    }

    /// Whether both dates fall in the same `unit`, or are the same
    /// millisecond when `unit` is `None`. Invalid dates are never the same.
    pub fn is_same(&self, other: impl Into<DateInput>, unit: Option<Unit>) -> bool {
        let other = Self::with_locale(other, Arc::clone(self.locale()));
        let (a, b) = match unit {
            Some(unit) => (self.start_of(unit), other.start_of(unit)),
            None => (self.clone(), other),
        };
        a.is_valid() && a == b
    }
}
