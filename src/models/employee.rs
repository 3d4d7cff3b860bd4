//! Employee model.
//!
//! An employee carries two window lists: `availability` (blocked windows,
//! during which the employee cannot be scheduled) and `shifts` (assigned
//! work). Blocked windows are kept as entered; shifts are merged so that
//! adjacent hours on the same day always form a single window.
//!
//! The roster itself is loaded and persisted by an external store; this
//! type only holds the in-memory state a scheduling run reads and writes.

use serde::{Deserialize, Serialize};

use super::TimeWindow;
use crate::error::{Result, ScheduleError};

/// Most constraints an employee may enter personally.
///
/// Constraints injected by the scheduler itself are not counted against it.
pub const MAX_PERSONAL_CONSTRAINTS: usize = 2;

/// A schedulable employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    /// Unique identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Blocked windows.
    #[serde(default)]
    pub availability: Vec<TimeWindow>,
    /// Assigned shifts, kept sorted by (day, start) and merged.
    #[serde(default)]
    pub shifts: Vec<TimeWindow>,
    /// Externally supplied rank. Lower scores are scheduled first.
    #[serde(default)]
    pub priority_score: i32,
    /// Special qualifications (e.g. "keyholder", "first-aid").
    #[serde(default)]
    pub special_properties: Vec<String>,
}

impl Employee {
    /// Creates an employee with no constraints and no shifts.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            availability: Vec::new(),
            shifts: Vec::new(),
            priority_score: 0,
            special_properties: Vec::new(),
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the priority score.
    pub fn with_priority(mut self, priority_score: i32) -> Self {
        self.priority_score = priority_score;
        self
    }

    /// Adds a special property.
    pub fn with_special_property(mut self, property: impl Into<String>) -> Self {
        self.special_properties.push(property.into());
        self
    }

    /// Adds a blocked window.
    ///
    /// The window is not checked here; [`validate_input`](crate::validation::validate_input)
    /// reports windows outside the grid before a run starts. Use
    /// [`Employee::add_constraint`] for checked input.
    pub fn with_blocked(mut self, day: usize, start_hour: usize, end_hour: usize) -> Self {
        self.availability.push(TimeWindow {
            day,
            start_hour,
            end_hour,
            date: None,
        });
        self
    }

    /// Whether the employee has any special property.
    pub fn has_special_properties(&self) -> bool {
        !self.special_properties.is_empty()
    }

    /// Whether no blocked window covers `hour` on `day`.
    pub fn is_available(&self, day: usize, hour: usize) -> bool {
        !self.availability.iter().any(|w| w.covers(day, hour))
    }

    /// Appends a blocked window. Blocked windows are never merged.
    pub fn add_constraint(&mut self, day: usize, start_hour: usize, end_hour: usize) -> Result<()> {
        let window = TimeWindow::new(day, start_hour, end_hour)?;
        self.availability.push(window);
        Ok(())
    }

    /// Appends a blocked window entered by the employee, enforcing
    /// [`MAX_PERSONAL_CONSTRAINTS`].
    pub fn add_personal_constraint(
        &mut self,
        day: usize,
        start_hour: usize,
        end_hour: usize,
    ) -> Result<()> {
        if self.availability.len() >= MAX_PERSONAL_CONSTRAINTS {
            return Err(ScheduleError::TooManyConstraints {
                limit: MAX_PERSONAL_CONSTRAINTS,
            });
        }
        self.add_constraint(day, start_hour, end_hour)
    }

    /// Removes the blocked window at `index`.
    pub fn delete_constraint(&mut self, index: usize) -> Result<TimeWindow> {
        if index >= self.availability.len() {
            return Err(ScheduleError::IndexOutOfRange {
                index,
                len: self.availability.len(),
            });
        }
        Ok(self.availability.remove(index))
    }

    /// Number of blocked windows.
    pub fn number_of_constraints(&self) -> usize {
        self.availability.len()
    }

    /// Adds an assigned shift, merging it with any adjacent or overlapping
    /// shift on the same day.
    pub fn add_shift(&mut self, shift: TimeWindow) {
        let mut merged = shift;
        self.shifts.retain(|existing| {
            if existing.overlaps(&merged) || existing.is_adjacent(&merged) {
                merged = merged.merge(existing);
                false
            } else {
                true
            }
        });
        let pos = self
            .shifts
            .partition_point(|s| (s.day, s.start_hour) < (merged.day, merged.start_hour));
        self.shifts.insert(pos, merged);
    }

    /// Adds a single assigned hour, merging with adjacent shifts.
    pub fn add_shift_hour(&mut self, day: usize, hour: usize) -> Result<()> {
        self.add_shift(TimeWindow::hour(day, hour)?);
        Ok(())
    }

    /// Whether a shift covers `hour` on `day`.
    pub fn is_working(&self, day: usize, hour: usize) -> bool {
        self.shifts.iter().any(|s| s.covers(day, hour))
    }

    /// Whether any shift falls on the given calendar date (epoch day).
    pub fn has_shift_on(&self, epoch_day: i64) -> bool {
        self.shifts.iter().any(|s| s.date == Some(epoch_day))
    }

    /// Total assigned hours.
    pub fn assigned_hours(&self) -> usize {
        self.shifts.iter().map(TimeWindow::hours).sum()
    }

    /// Number of grid cells not covered by any blocked window.
    pub fn available_hours(&self) -> usize {
        use super::time_grid::{DAYS_PER_WEEK, HOURS_PER_DAY};
        (0..DAYS_PER_WEEK)
            .flat_map(|d| (0..HOURS_PER_DAY).map(move |h| (d, h)))
            .filter(|&(d, h)| self.is_available(d, h))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_employee_builder() {
        let e = Employee::new("e1")
            .with_name("Dana")
            .with_priority(3)
            .with_special_property("keyholder")
            .with_blocked(0, 0, 4);

        assert_eq!(e.id, "e1");
        assert_eq!(e.name, "Dana");
        assert_eq!(e.priority_score, 3);
        assert!(e.has_special_properties());
        assert_eq!(e.number_of_constraints(), 1);
    }

    #[test]
    fn test_is_available_half_open() {
        let e = Employee::new("e1").with_blocked(2, 5, 9);
        assert!(e.is_available(2, 4));
        assert!(!e.is_available(2, 5));
        assert!(!e.is_available(2, 8));
        assert!(e.is_available(2, 9));
        assert!(e.is_available(3, 6));
    }

    #[test]
    fn test_add_and_delete_constraint() {
        let mut e = Employee::new("e1");
        e.add_constraint(1, 0, 10).unwrap();
        e.add_constraint(1, 5, 12).unwrap(); // overlapping windows are not merged
        assert_eq!(e.number_of_constraints(), 2);

        let removed = e.delete_constraint(0).unwrap();
        assert_eq!((removed.start_hour, removed.end_hour), (0, 10));
        assert_eq!(e.number_of_constraints(), 1);

        let err = e.delete_constraint(5).unwrap_err();
        assert!(matches!(
            err,
            ScheduleError::IndexOutOfRange { index: 5, len: 1 }
        ));
    }

    #[test]
    fn test_add_constraint_rejects_invalid_window() {
        let mut e = Employee::new("e1");
        assert!(e.add_constraint(0, 10, 5).is_err());
        assert!(e.add_constraint(9, 0, 5).is_err());
        assert_eq!(e.number_of_constraints(), 0);
    }

    #[test]
    fn test_personal_constraint_limit() {
        let mut e = Employee::new("e1");
        e.add_personal_constraint(0, 0, 4).unwrap();
        e.add_personal_constraint(1, 0, 4).unwrap();
        let err = e.add_personal_constraint(2, 0, 4).unwrap_err();
        assert!(matches!(err, ScheduleError::TooManyConstraints { limit: 2 }));
        // Scheduler-side constraints are uncapped
        e.add_constraint(2, 0, 4).unwrap();
        assert_eq!(e.number_of_constraints(), 3);
    }

    #[test]
    fn test_adjacent_shifts_merge() {
        let mut e = Employee::new("e1");
        e.add_shift(TimeWindow::new(0, 9, 11).unwrap());
        e.add_shift(TimeWindow::new(0, 11, 13).unwrap());
        assert_eq!(e.shifts.len(), 1);
        assert_eq!((e.shifts[0].start_hour, e.shifts[0].end_hour), (9, 13));
    }

    #[test]
    fn test_hour_by_hour_merge_bridges_gap() {
        let mut e = Employee::new("e1");
        e.add_shift_hour(0, 9).unwrap();
        e.add_shift_hour(0, 11).unwrap();
        assert_eq!(e.shifts.len(), 2);
        e.add_shift_hour(0, 10).unwrap();
        assert_eq!(e.shifts.len(), 1);
        assert_eq!((e.shifts[0].start_hour, e.shifts[0].end_hour), (9, 12));
        assert_eq!(e.assigned_hours(), 3);
    }

    #[test]
    fn test_shifts_on_different_days_stay_separate_and_sorted() {
        let mut e = Employee::new("e1");
        e.add_shift(TimeWindow::new(2, 0, 4).unwrap());
        e.add_shift(TimeWindow::new(1, 18, 22).unwrap());
        assert_eq!(e.shifts.len(), 2);
        assert_eq!(e.shifts[0].day, 1);
        assert_eq!(e.shifts[1].day, 2);
        assert!(e.is_working(1, 21));
        assert!(!e.is_working(1, 17));
    }

    #[test]
    fn test_has_shift_on_date() {
        let mut e = Employee::new("e1");
        e.add_shift(TimeWindow::new(0, 8, 12).unwrap().with_date(19855));
        assert!(e.has_shift_on(19855));
        assert!(!e.has_shift_on(19856));
    }

    #[test]
    fn test_available_hours() {
        let e = Employee::new("e1").with_blocked(0, 0, 22).with_blocked(1, 0, 2);
        assert_eq!(e.available_hours(), 7 * 22 - 22 - 2);
    }
}
