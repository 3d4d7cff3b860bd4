//! Committing a schedule to the roster.
//!
//! Finalization walks every cell of a [`Schedule`], folds each assigned
//! hour into the employee's shift list (adjacent hours merge into one
//! shift), then hands the whole roster to an [`EmployeeStore`].
//!
//! The schedule is taken by value, so a schedule can be committed once.

use std::collections::HashMap;

use jiff::civil::Date;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::error::Result;
use crate::models::time_grid::{date_of, to_epoch_day};
use crate::models::{Employee, Schedule, TimeWindow};

/// Persistence for the roster.
pub trait EmployeeStore: Send + Sync {
    /// Saves every employee. Returns whether the save succeeded.
    fn save_all(&self, employees: &[Employee]) -> bool;
}

/// Store keeping the last saved roster in memory.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    saved: Mutex<Vec<Employee>>,
    saves: Mutex<usize>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Roster as of the last save.
    pub fn saved(&self) -> Vec<Employee> {
        self.saved.lock().clone()
    }

    /// Number of saves.
    pub fn save_count(&self) -> usize {
        *self.saves.lock()
    }
}

impl EmployeeStore for InMemoryStore {
    fn save_all(&self, employees: &[Employee]) -> bool {
        *self.saved.lock() = employees.to_vec();
        *self.saves.lock() += 1;
        true
    }
}

/// Folds every assignment of `schedule` into the employees' shifts.
///
/// With `week_start`, shifts carry the calendar date of their grid day.
/// Assignments of employees missing from `employees` are skipped.
///
/// Returns the number of hours folded.
pub fn apply_schedule(
    schedule: Schedule,
    employees: &mut [Employee],
    week_start: Option<Date>,
) -> Result<usize> {
    let index: HashMap<String, usize> = employees
        .iter()
        .enumerate()
        .map(|(i, e)| (e.id.clone(), i))
        .collect();

    let mut folded = 0;
    for (day, hour, id) in schedule.assignments() {
        let Some(&i) = index.get(id) else {
            warn!(employee = id, day, hour, "assignment for unknown employee skipped");
            continue;
        };
        let mut window = TimeWindow::hour(day, hour)?;
        if let Some(start) = week_start {
            window = window.with_date(to_epoch_day(date_of(start, day)?));
        }
        employees[i].add_shift(window);
        folded += 1;
    }
    debug!(folded, "schedule applied to roster");
    Ok(folded)
}

/// Applies `schedule` to `employees` and saves the roster through `store`.
///
/// Returns the store's success flag.
pub fn finalize(
    schedule: Schedule,
    employees: &mut [Employee],
    week_start: Option<Date>,
    store: &dyn EmployeeStore,
) -> Result<bool> {
    apply_schedule(schedule, employees, week_start)?;
    let saved = store.save_all(employees);
    if !saved {
        warn!(employees = employees.len(), "roster save failed");
    }
    Ok(saved)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingStore;

    impl EmployeeStore for FailingStore {
        fn save_all(&self, _employees: &[Employee]) -> bool {
            false
        }
    }

    #[test]
    fn test_hours_merge_into_one_shift() {
        let mut roster = vec![Employee::new("e1")];
        let mut schedule = Schedule::new();
        schedule.add_shift("e1", 0, 9, 13).unwrap();

        let folded = apply_schedule(schedule, &mut roster, None).unwrap();
        assert_eq!(folded, 4);
        assert_eq!(roster[0].shifts.len(), 1);
        assert_eq!(roster[0].shifts[0], TimeWindow::new(0, 9, 13).unwrap());
    }

    #[test]
    fn test_existing_adjacent_shift_is_extended() {
        let mut roster = vec![Employee::new("e1")];
        roster[0].add_shift(TimeWindow::new(2, 5, 8).unwrap());
        let mut schedule = Schedule::new();
        schedule.add_shift("e1", 2, 8, 10).unwrap();

        apply_schedule(schedule, &mut roster, None).unwrap();
        assert_eq!(roster[0].shifts, vec![TimeWindow::new(2, 5, 10).unwrap()]);
    }

    #[test]
    fn test_separate_runs_stay_separate() {
        let mut roster = vec![Employee::new("e1")];
        let mut schedule = Schedule::new();
        schedule.add_shift("e1", 1, 2, 4).unwrap();
        schedule.add_shift("e1", 1, 10, 12).unwrap();

        apply_schedule(schedule, &mut roster, None).unwrap();
        assert_eq!(roster[0].shifts.len(), 2);
        assert_eq!(roster[0].assigned_hours(), 4);
    }

    #[test]
    fn test_unknown_employee_skipped() {
        let mut roster = vec![Employee::new("e1")];
        let mut schedule = Schedule::new();
        schedule.add_hour("ghost", 0, 0).unwrap();
        schedule.add_hour("e1", 0, 1).unwrap();

        assert_eq!(apply_schedule(schedule, &mut roster, None).unwrap(), 1);
    }

    #[test]
    fn test_dated_shifts() {
        let mut roster = vec![Employee::new("e1")];
        let mut schedule = Schedule::new();
        schedule.add_shift("e1", 3, 0, 2).unwrap();

        let week = jiff::civil::date(2024, 5, 12);
        apply_schedule(schedule, &mut roster, Some(week)).unwrap();
        // Wednesday 2024-05-15
        assert_eq!(roster[0].shifts[0].date, Some(19858));
    }

    #[test]
    fn test_finalize_saves_roster() {
        let store = InMemoryStore::new();
        let mut roster = vec![Employee::new("e1")];
        let mut schedule = Schedule::new();
        schedule.add_hour("e1", 0, 0).unwrap();

        assert!(finalize(schedule, &mut roster, None, &store).unwrap());
        assert_eq!(store.save_count(), 1);
        assert_eq!(store.saved()[0].assigned_hours(), 1);
    }

    #[test]
    fn test_finalize_reports_failed_save() {
        let mut roster = vec![Employee::new("e1")];
        assert!(!finalize(Schedule::new(), &mut roster, None, &FailingStore).unwrap());
    }
}
