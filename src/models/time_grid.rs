//! Weekly time grid.
//!
//! The planning horizon is a fixed week of 7 days, each with 22 working
//! hours. Hour index 0 is the first working hour of the day and 21 the last;
//! the short overnight break between days is not part of the grid.
//!
//! Days are numbered Sunday = 0 through Saturday = 6. Calendar dates are
//! mapped onto the grid by locating the Sunday that starts their week.

use jiff::civil::Date;
use jiff::ToSpan;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};
use crate::validation::{ValidationError, ValidationErrorKind};

/// Days in the planning week.
pub const DAYS_PER_WEEK: usize = 7;

/// Working hours per day.
pub const HOURS_PER_DAY: usize = 22;

/// Longest contiguous shift, and most hours worked in one day.
pub const MAX_SHIFT_HOURS: usize = 8;

/// Minimum rest between the end of one shift and the start of the next.
pub const REST_HOURS: usize = 8;

const EPOCH: Date = Date::constant(1970, 1, 1);

/// Day of the planning week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weekday {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Weekday {
    /// All days in grid order.
    pub const ALL: [Weekday; DAYS_PER_WEEK] = [
        Weekday::Sunday,
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
    ];

    /// Day for a grid index (0 = Sunday).
    pub fn from_index(day: usize) -> Option<Self> {
        Self::ALL.get(day).copied()
    }

    /// Grid index of this day.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// English day name.
    pub fn name(self) -> &'static str {
        match self {
            Weekday::Sunday => "Sunday",
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
        }
    }

    /// Grid day of a calendar date.
    pub fn of_date(date: Date) -> Self {
        let offset = date.weekday().to_sunday_zero_offset() as usize;
        Self::ALL[offset]
    }
}

impl std::fmt::Display for Weekday {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The day after `day`, wrapping Saturday to Sunday.
#[inline]
pub fn next_day(day: usize) -> usize {
    (day + 1) % DAYS_PER_WEEK
}

/// The day before `day`, wrapping Sunday to Saturday.
#[inline]
pub fn previous_day(day: usize) -> usize {
    (day + DAYS_PER_WEEK - 1) % DAYS_PER_WEEK
}

/// Whether `(day, hour)` is a cell of the grid.
#[inline]
pub fn is_valid_cell(day: usize, hour: usize) -> bool {
    day < DAYS_PER_WEEK && hour < HOURS_PER_DAY
}

/// Adds `hours` to `(day, hour)`, rolling over into following days.
///
/// Returns the resulting `(day, hour)` with the day taken modulo the week.
pub fn add_hours(day: usize, hour: usize, hours: usize) -> (usize, usize) {
    let total = hour + hours;
    let day = (day + total / HOURS_PER_DAY) % DAYS_PER_WEEK;
    (day, total % HOURS_PER_DAY)
}

/// The Sunday on or before `date`.
pub fn week_start(date: Date) -> Result<Date> {
    let offset = i64::from(date.weekday().to_sunday_zero_offset());
    date.checked_sub(offset.days())
        .map_err(|e| date_error(format!("no week start for {date}: {e}")))
}

/// The seven dates (Sunday..Saturday) of the week containing `date`.
pub fn days_in_week(date: Date) -> Result<Vec<Date>> {
    let start = week_start(date)?;
    (0..DAYS_PER_WEEK).map(|day| date_of(start, day)).collect()
}

/// Calendar date of grid `day` in the week beginning at `week_start`.
pub fn date_of(week_start: Date, day: usize) -> Result<Date> {
    week_start
        .checked_add((day as i64).days())
        .map_err(|e| date_error(format!("day {day} after {week_start} overflows: {e}")))
}

/// Days since 1970-01-01.
pub fn to_epoch_day(date: Date) -> i64 {
    i64::from((date - EPOCH).get_days())
}

/// Date from days since 1970-01-01.
pub fn from_epoch_day(epoch_day: i64) -> Result<Date> {
    EPOCH
        .checked_add(epoch_day.days())
        .map_err(|e| date_error(format!("epoch day {epoch_day} out of range: {e}")))
}

fn date_error(message: String) -> ScheduleError {
    ScheduleError::InvalidInput(vec![ValidationError::new(
        ValidationErrorKind::InvalidDate,
        message,
    )])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weekday_names() {
        assert_eq!(Weekday::from_index(0).unwrap().name(), "Sunday");
        assert_eq!(Weekday::from_index(6).unwrap().name(), "Saturday");
        assert!(Weekday::from_index(7).is_none());
        assert_eq!(Weekday::Wednesday.index(), 3);
        assert_eq!(Weekday::Friday.to_string(), "Friday");
    }

    #[test]
    fn test_add_hours_same_day() {
        assert_eq!(add_hours(2, 4, 8), (2, 12));
        assert_eq!(add_hours(2, 13, 8), (2, 21));
    }

    #[test]
    fn test_add_hours_rollover() {
        assert_eq!(add_hours(0, 20, 8), (1, 6));
        assert_eq!(add_hours(0, 14, 8), (1, 0));
        // Saturday rolls into Sunday
        assert_eq!(add_hours(6, 21, 3), (0, 2));
    }

    #[test]
    fn test_neighbour_days_wrap() {
        assert_eq!(next_day(6), 0);
        assert_eq!(next_day(3), 4);
        assert_eq!(previous_day(0), 6);
        assert_eq!(previous_day(4), 3);
    }

    #[test]
    fn test_valid_cell() {
        assert!(is_valid_cell(0, 0));
        assert!(is_valid_cell(6, 21));
        assert!(!is_valid_cell(7, 0));
        assert!(!is_valid_cell(0, 22));
    }

    #[test]
    fn test_week_start_is_sunday() {
        // 2024-05-15 is a Wednesday
        let wed = Date::constant(2024, 5, 15);
        assert_eq!(week_start(wed).unwrap(), Date::constant(2024, 5, 12));
        assert_eq!(Weekday::of_date(wed), Weekday::Wednesday);

        let sunday = Date::constant(2024, 5, 12);
        assert_eq!(week_start(sunday).unwrap(), sunday);
    }

    #[test]
    fn test_days_in_week() {
        let days = days_in_week(Date::constant(2024, 5, 18)).unwrap();
        assert_eq!(days.len(), 7);
        assert_eq!(days[0], Date::constant(2024, 5, 12));
        assert_eq!(days[6], Date::constant(2024, 5, 18));
        assert!(days
            .iter()
            .enumerate()
            .all(|(i, d)| Weekday::of_date(*d).index() == i));
    }

    #[test]
    fn test_epoch_day_conversion() {
        assert_eq!(to_epoch_day(EPOCH), 0);
        let date = Date::constant(2024, 5, 12);
        let epoch_day = to_epoch_day(date);
        assert_eq!(epoch_day, 19855);
        assert_eq!(from_epoch_day(epoch_day).unwrap(), date);
    }
}
