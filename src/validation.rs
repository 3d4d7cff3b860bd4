//! Input validation for scheduling runs.
//!
//! Checks structural integrity of the roster before any
//! scheduling starts. Detects:
//! - Duplicate employee IDs
//! - Blocked windows or shifts outside the weekly grid
//! - Overlapping assigned shifts
//!
//! Demand larger than the roster is not an input error: it is reported by
//! the schedulers as infeasibility, like any other unmeetable demand.
//!
//! All issues are collected; a failed validation is reported as
//! [`ScheduleError::InvalidInput`](crate::error::ScheduleError::InvalidInput).

use std::collections::HashSet;

use crate::models::time_grid::{DAYS_PER_WEEK, HOURS_PER_DAY};
use crate::models::{Employee, TimeWindow};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two employees share the same ID.
    DuplicateId,
    /// A window lies outside the `7 x 22` grid or is empty.
    OutOfGrid,
    /// Two assigned shifts of one employee overlap.
    OverlappingShifts,
    /// A demand value is negative or outside the accepted range.
    DemandOutOfRange,
    /// Demand data does not have `7 x 22` cells.
    InvalidShape,
    /// A calendar date cannot be represented.
    InvalidDate,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates the roster for a scheduling run.
///
/// Demand needs no check here: [`DemandMatrix`](crate::models::DemandMatrix)
/// only holds non-negative cells of the grid, and loosely typed demand is
/// checked by [`DemandMatrix::from_rows`](crate::models::DemandMatrix::from_rows).
///
/// Checks:
/// 1. No duplicate employee IDs
/// 2. Every blocked window lies on the grid and is non-empty
/// 3. Every assigned shift lies on the grid and shifts do not overlap
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(employees: &[Employee]) -> ValidationResult {
    let mut errors = Vec::new();

    let mut ids = HashSet::new();
    for e in employees {
        if !ids.insert(e.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate employee ID: {}", e.id),
            ));
        }

        for w in &e.availability {
            if !is_on_grid(w) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::OutOfGrid,
                    format!("Employee '{}' has blocked window outside the grid: {w}", e.id),
                ));
            }
        }

        for (i, s) in e.shifts.iter().enumerate() {
            if !is_on_grid(s) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::OutOfGrid,
                    format!("Employee '{}' has shift outside the grid: {s}", e.id),
                ));
            }
            if e.shifts[i + 1..].iter().any(|other| other.overlaps(s)) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::OverlappingShifts,
                    format!("Employee '{}' has overlapping shifts at {s}", e.id),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_on_grid(w: &TimeWindow) -> bool {
    w.day < DAYS_PER_WEEK && w.start_hour < w.end_hour && w.end_hour <= HOURS_PER_DAY
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_roster() -> Vec<Employee> {
        vec![
            Employee::new("e1").with_name("Avi").with_blocked(0, 0, 6),
            Employee::new("e2").with_name("Noa"),
        ]
    }

    #[test]
    fn test_valid_input() {
        assert!(validate_input(&sample_roster()).is_ok());
        assert!(validate_input(&[]).is_ok());
    }

    #[test]
    fn test_duplicate_employee_id() {
        let roster = vec![Employee::new("e1"), Employee::new("e1")];
        let errors = validate_input(&roster).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateId));
    }

    #[test]
    fn test_blocked_window_out_of_grid() {
        let roster = vec![
            Employee::new("e1").with_blocked(7, 0, 4),
            Employee::new("e2").with_blocked(0, 10, 30),
            Employee::new("e3").with_blocked(0, 10, 10),
        ];
        let errors = validate_input(&roster).unwrap_err();
        assert_eq!(
            errors
                .iter()
                .filter(|e| e.kind == ValidationErrorKind::OutOfGrid)
                .count(),
            3
        );
    }

    #[test]
    fn test_overlapping_shifts() {
        let mut e = Employee::new("e1");
        e.shifts.push(TimeWindow::new(0, 8, 12).unwrap());
        e.shifts.push(TimeWindow::new(0, 10, 14).unwrap());
        let errors = validate_input(&[e]).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::OverlappingShifts));
    }

    #[test]
    fn test_multiple_errors() {
        let roster = vec![
            Employee::new("e1").with_blocked(9, 0, 1),
            Employee::new("e1"),
        ];
        let errors = validate_input(&roster).unwrap_err();
        assert_eq!(errors.len(), 2);
    }
}
