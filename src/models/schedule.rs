//! Schedule (solution) model.
//!
//! A schedule records, for every `(day, hour)` cell of the week, which
//! employees are on duty. It is created empty at the start of a run and is
//! the sole output of a scheduler. Whether it is valid is answered by
//! [`audit`](crate::rules::audit), never stored on the schedule.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::time_grid::{is_valid_cell, DAYS_PER_WEEK, HOURS_PER_DAY};
use super::TimeWindow;
use crate::error::{Result, ScheduleError};

/// Employees on duty per cell of the weekly grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// Row-major cells, `day * HOURS_PER_DAY + hour`.
    cells: Vec<BTreeSet<String>>,
}

/// A constraint violation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// Type of violation.
    pub violation_type: ViolationType,
    /// Employee involved, if any.
    pub employee_id: Option<String>,
    /// Grid day.
    pub day: usize,
    /// Grid hour.
    pub hour: usize,
    /// Human-readable description.
    pub message: String,
}

/// Classification of constraint violations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationType {
    /// Fewer employees on duty than demanded.
    Understaffed,
    /// More employees on duty than demanded (exact mode only).
    Overstaffed,
    /// Employee assigned during a blocked window.
    Unavailable,
    /// A contiguous shift longer than the maximum.
    ShiftTooLong,
    /// More hours in one day than the maximum.
    DailyHoursExceeded,
    /// A one-hour hole inside a shift.
    GapInShift,
    /// Not enough rest before a shift on the following day.
    RestViolation,
    /// Assignment references an employee missing from the roster.
    UnknownEmployee,
}

impl Violation {
    /// Creates a violation.
    pub fn new(
        violation_type: ViolationType,
        employee_id: Option<&str>,
        day: usize,
        hour: usize,
        message: impl Into<String>,
    ) -> Self {
        Self {
            violation_type,
            employee_id: employee_id.map(str::to_string),
            day,
            hour,
            message: message.into(),
        }
    }
}

impl Default for Schedule {
    fn default() -> Self {
        Self::new()
    }
}

impl Schedule {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self {
            cells: vec![BTreeSet::new(); DAYS_PER_WEEK * HOURS_PER_DAY],
        }
    }

    #[inline]
    fn index(day: usize, hour: usize) -> Result<usize> {
        if is_valid_cell(day, hour) {
            Ok(day * HOURS_PER_DAY + hour)
        } else {
            Err(ScheduleError::InvalidWindow {
                day,
                start_hour: hour,
                end_hour: hour + 1,
            })
        }
    }

    /// Puts `employee_id` on duty for every hour in `[start_hour, end_hour)`.
    pub fn add_shift(
        &mut self,
        employee_id: &str,
        day: usize,
        start_hour: usize,
        end_hour: usize,
    ) -> Result<()> {
        let window = TimeWindow::new(day, start_hour, end_hour)?;
        for hour in window.start_hour..window.end_hour {
            self.add_hour(employee_id, day, hour)?;
        }
        Ok(())
    }

    /// Puts `employee_id` on duty for a single hour.
    pub fn add_hour(&mut self, employee_id: &str, day: usize, hour: usize) -> Result<()> {
        let idx = Self::index(day, hour)?;
        self.cells[idx].insert(employee_id.to_string());
        Ok(())
    }

    /// Employees on duty at `(day, hour)`. Empty for out-of-grid cells.
    pub fn employees_at(&self, day: usize, hour: usize) -> impl Iterator<Item = &str> {
        Self::index(day, hour)
            .ok()
            .into_iter()
            .flat_map(move |idx| self.cells[idx].iter().map(String::as_str))
    }

    /// Number of employees on duty at `(day, hour)`.
    pub fn staffed(&self, day: usize, hour: usize) -> usize {
        Self::index(day, hour)
            .map(|idx| self.cells[idx].len())
            .unwrap_or(0)
    }

    /// Whether `employee_id` is on duty at `(day, hour)`.
    pub fn is_assigned(&self, employee_id: &str, day: usize, hour: usize) -> bool {
        Self::index(day, hour)
            .map(|idx| self.cells[idx].contains(employee_id))
            .unwrap_or(false)
    }

    /// Hours of `day` on which `employee_id` is on duty, ascending.
    pub fn hours_on(&self, employee_id: &str, day: usize) -> Vec<usize> {
        (0..HOURS_PER_DAY)
            .filter(|&h| self.is_assigned(employee_id, day, h))
            .collect()
    }

    /// Contiguous runs of duty for `employee_id`, as windows in grid order.
    pub fn shifts_for(&self, employee_id: &str) -> Vec<TimeWindow> {
        let mut shifts = Vec::new();
        for day in 0..DAYS_PER_WEEK {
            let mut start: Option<usize> = None;
            for hour in 0..=HOURS_PER_DAY {
                let on = hour < HOURS_PER_DAY && self.is_assigned(employee_id, day, hour);
                match (on, start) {
                    (true, None) => start = Some(hour),
                    (false, Some(s)) => {
                        shifts.push(TimeWindow {
                            day,
                            start_hour: s,
                            end_hour: hour,
                            date: None,
                        });
                        start = None;
                    }
                    _ => {}
                }
            }
        }
        shifts
    }

    /// Every employee appearing anywhere in the schedule.
    pub fn employee_ids(&self) -> BTreeSet<&str> {
        self.cells
            .iter()
            .flat_map(|c| c.iter().map(String::as_str))
            .collect()
    }

    /// Assigned hours per employee.
    pub fn hours_by_employee(&self) -> BTreeMap<&str, usize> {
        let mut hours: BTreeMap<&str, usize> = BTreeMap::new();
        for cell in &self.cells {
            for id in cell {
                *hours.entry(id.as_str()).or_insert(0) += 1;
            }
        }
        hours
    }

    /// Total employee-hours assigned.
    pub fn assignment_count(&self) -> usize {
        self.cells.iter().map(BTreeSet::len).sum()
    }

    /// Visits every `(day, hour, employee_id)` assignment in grid order.
    pub fn assignments(&self) -> impl Iterator<Item = (usize, usize, &str)> {
        self.cells.iter().enumerate().flat_map(|(idx, cell)| {
            let (day, hour) = (idx / HOURS_PER_DAY, idx % HOURS_PER_DAY);
            cell.iter().map(move |id| (day, hour, id.as_str()))
        })
    }
}
