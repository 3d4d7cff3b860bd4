//! Time windows on the weekly grid.
//!
//! A [`TimeWindow`] is a half-open hour range `[start_hour, end_hour)` on
//! one day of the week. The same type models both blocked availability
//! windows ("constraints") and assigned work ("shifts").
//!
//! # Invariant
//! `day < 7` and `0 <= start_hour < end_hour <= 22`. Constructors reject
//! anything else.

use serde::{Deserialize, Serialize};

use super::time_grid::{DAYS_PER_WEEK, HOURS_PER_DAY};
use crate::error::{Result, ScheduleError};

/// An hour range `[start_hour, end_hour)` on one grid day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeWindow {
    /// Grid day (0 = Sunday).
    pub day: usize,
    /// First hour covered (inclusive).
    pub start_hour: usize,
    /// First hour not covered (exclusive).
    pub end_hour: usize,
    /// Calendar date this window belongs to, as days since 1970-01-01.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<i64>,
}

impl TimeWindow {
    /// Creates a window, validating it against the grid.
    pub fn new(day: usize, start_hour: usize, end_hour: usize) -> Result<Self> {
        if day >= DAYS_PER_WEEK || start_hour >= end_hour || end_hour > HOURS_PER_DAY {
            return Err(ScheduleError::InvalidWindow {
                day,
                start_hour,
                end_hour,
            });
        }
        Ok(Self {
            day,
            start_hour,
            end_hour,
            date: None,
        })
    }

    /// Creates a window covering a single hour.
    pub fn hour(day: usize, hour: usize) -> Result<Self> {
        Self::new(day, hour, hour + 1)
    }

    /// Attaches a calendar date (epoch day).
    pub fn with_date(mut self, epoch_day: i64) -> Self {
        self.date = Some(epoch_day);
        self
    }

    /// Number of hours covered.
    #[inline]
    pub fn hours(&self) -> usize {
        self.end_hour - self.start_hour
    }

    /// Whether this window covers `hour` on `day`.
    #[inline]
    pub fn covers(&self, day: usize, hour: usize) -> bool {
        self.day == day && hour >= self.start_hour && hour < self.end_hour
    }

    /// Whether two windows share at least one hour of the same day and date.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.same_day(other)
            && self.start_hour < other.end_hour
            && other.start_hour < self.end_hour
    }

    /// Whether `other` starts exactly where this window ends, on the same day.
    #[inline]
    pub fn is_consecutive(&self, other: &Self) -> bool {
        self.same_day(other) && self.end_hour == other.start_hour
    }

    /// Same grid day, and same calendar date when both carry one.
    fn same_day(&self, other: &Self) -> bool {
        self.day == other.day
            && match (self.date, other.date) {
                (Some(a), Some(b)) => a == b,
                _ => true,
            }
    }

    /// Whether the two windows touch in either order.
    pub fn is_adjacent(&self, other: &Self) -> bool {
        self.is_consecutive(other) || other.is_consecutive(self)
    }

    /// Smallest window covering both. Only meaningful for adjacent or
    /// overlapping windows on the same day.
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            day: self.day,
            start_hour: self.start_hour.min(other.start_hour),
            end_hour: self.end_hour.max(other.end_hour),
            date: self.date.or(other.date),
        }
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "day {} [{}, {})", self.day, self.start_hour, self.end_hour)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_window() {
        let w = TimeWindow::new(1, 4, 9).unwrap();
        assert_eq!(w.hours(), 5);
        assert!(w.covers(1, 4));
        assert!(w.covers(1, 8));
        assert!(!w.covers(1, 9)); // exclusive end
        assert!(!w.covers(2, 5)); // other day
    }

    #[test]
    fn test_time_window_rejects_bad_ranges() {
        assert!(TimeWindow::new(7, 0, 1).is_err());
        assert!(TimeWindow::new(0, 5, 5).is_err());
        assert!(TimeWindow::new(0, 6, 5).is_err());
        assert!(TimeWindow::new(0, 0, 23).is_err());
        assert!(TimeWindow::new(0, 0, 22).is_ok());
        assert!(TimeWindow::hour(0, 22).is_err());
    }

    #[test]
    fn test_time_window_overlap() {
        let a = TimeWindow::new(0, 0, 10).unwrap();
        let b = TimeWindow::new(0, 5, 15).unwrap();
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));

        let c = TimeWindow::new(0, 10, 20).unwrap(); // touching but not overlapping
        assert!(!a.overlaps(&c));

        let d = TimeWindow::new(1, 0, 10).unwrap();
        assert!(!a.overlaps(&d));
    }

    #[test]
    fn test_consecutive_and_merge() {
        let a = TimeWindow::new(3, 9, 11).unwrap();
        let b = TimeWindow::new(3, 11, 13).unwrap();
        assert!(a.is_consecutive(&b));
        assert!(!b.is_consecutive(&a));
        assert!(b.is_adjacent(&a));

        let merged = b.merge(&a);
        assert_eq!((merged.start_hour, merged.end_hour), (9, 13));

        let other_day = TimeWindow::new(4, 11, 13).unwrap();
        assert!(!a.is_consecutive(&other_day));
    }

    #[test]
    fn test_serde_field_names() {
        let w = TimeWindow::new(2, 3, 7).unwrap().with_date(19855);
        let json = serde_json::to_string(&w).unwrap();
        assert!(json.contains("\"startHour\":3"));
        assert!(json.contains("\"endHour\":7"));

        let back: TimeWindow = serde_json::from_str(&json).unwrap();
        assert_eq!(back, w);
    }

    #[test]
    fn test_different_dates_never_touch() {
        let this_week = TimeWindow::new(0, 8, 12).unwrap().with_date(19858);
        let last_week = TimeWindow::new(0, 12, 16).unwrap().with_date(19851);
        assert!(!this_week.is_adjacent(&last_week));
        assert!(!this_week.overlaps(&TimeWindow::new(0, 9, 10).unwrap().with_date(19851)));
        // Undated windows match any date
        assert!(this_week.is_consecutive(&TimeWindow::new(0, 12, 13).unwrap()));
    }
}
