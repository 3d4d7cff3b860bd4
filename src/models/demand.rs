//! Staffing demand.
//!
//! `needed[day][hour]` is the exact number of employees that must be on
//! duty during that hour. The matrix is supplied fresh for each run and
//! never mutated by a scheduler.

use serde::{Deserialize, Serialize};

use super::time_grid::{DAYS_PER_WEEK, HOURS_PER_DAY};
use crate::error::{Result, ScheduleError};
use crate::validation::{ValidationError, ValidationErrorKind};

/// Largest per-hour need accepted from admin input.
pub const MAX_NEED_PER_HOUR: u32 = 12;

/// Required headcount for every cell of the weekly grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemandMatrix {
    needed: [[u32; HOURS_PER_DAY]; DAYS_PER_WEEK],
}

impl Default for DemandMatrix {
    fn default() -> Self {
        Self::new()
    }
}

impl DemandMatrix {
    /// A matrix with zero demand everywhere.
    pub fn new() -> Self {
        Self {
            needed: [[0; HOURS_PER_DAY]; DAYS_PER_WEEK],
        }
    }

    /// A matrix with the same demand in every cell.
    pub fn uniform(per_hour: u32) -> Self {
        Self {
            needed: [[per_hour; HOURS_PER_DAY]; DAYS_PER_WEEK],
        }
    }

    /// Builds a matrix from loosely typed rows (e.g. loaded from a store).
    ///
    /// Requires exactly 7 rows of 22 non-negative values. All problems are
    /// collected before failing.
    pub fn from_rows(rows: &[Vec<i64>]) -> Result<Self> {
        let mut errors = Vec::new();
        if rows.len() != DAYS_PER_WEEK {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidShape,
                format!("expected {DAYS_PER_WEEK} days of demand, got {}", rows.len()),
            ));
        }

        let mut matrix = Self::new();
        for (day, row) in rows.iter().enumerate().take(DAYS_PER_WEEK) {
            if row.len() != HOURS_PER_DAY {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidShape,
                    format!(
                        "day {day}: expected {HOURS_PER_DAY} hours of demand, got {}",
                        row.len()
                    ),
                ));
                continue;
            }
            for (hour, &value) in row.iter().enumerate() {
                match u32::try_from(value) {
                    Ok(v) => matrix.needed[day][hour] = v,
                    Err(_) => errors.push(ValidationError::new(
                        ValidationErrorKind::DemandOutOfRange,
                        format!("demand at ({day}, {hour}) out of range: {value}"),
                    )),
                }
            }
        }

        if errors.is_empty() {
            Ok(matrix)
        } else {
            Err(ScheduleError::InvalidInput(errors))
        }
    }

    /// Demand at `(day, hour)`. Out-of-grid cells have zero demand.
    #[inline]
    pub fn get(&self, day: usize, hour: usize) -> u32 {
        self.needed
            .get(day)
            .and_then(|row| row.get(hour))
            .copied()
            .unwrap_or(0)
    }

    /// Sets demand at `(day, hour)`.
    pub fn set(&mut self, day: usize, hour: usize, needed: u32) -> Result<()> {
        let cell = self
            .needed
            .get_mut(day)
            .and_then(|row| row.get_mut(hour))
            .ok_or_else(|| out_of_grid(day, hour))?;
        *cell = needed;
        Ok(())
    }

    /// Sets demand for every hour in `[start_hour, end_hour)` of `day`.
    pub fn set_range(
        &mut self,
        day: usize,
        start_hour: usize,
        end_hour: usize,
        needed: u32,
    ) -> Result<()> {
        for hour in start_hour..end_hour {
            self.set(day, hour, needed)?;
        }
        Ok(())
    }

    /// Sets all hours of `day` to `per_hour`, enforcing the admin input
    /// range `1..=MAX_NEED_PER_HOUR`.
    pub fn set_day_need(&mut self, day: usize, per_hour: u32) -> Result<()> {
        if !(1..=MAX_NEED_PER_HOUR).contains(&per_hour) {
            return Err(ScheduleError::InvalidInput(vec![ValidationError::new(
                ValidationErrorKind::DemandOutOfRange,
                format!("employees per hour must be between 1 and {MAX_NEED_PER_HOUR}, got {per_hour}"),
            )]));
        }
        self.set_range(day, 0, HOURS_PER_DAY, per_hour)
    }

    /// Demand rows, indexed `[day][hour]`.
    pub fn rows(&self) -> &[[u32; HOURS_PER_DAY]; DAYS_PER_WEEK] {
        &self.needed
    }

    /// Sum of demand over the week, in employee-hours.
    pub fn total_hours(&self) -> u64 {
        self.needed
            .iter()
            .flat_map(|row| row.iter())
            .map(|&v| u64::from(v))
            .sum()
    }

    /// Largest demand in any cell.
    pub fn peak(&self) -> u32 {
        self.needed
            .iter()
            .flat_map(|row| row.iter())
            .copied()
            .max()
            .unwrap_or(0)
    }
}

fn out_of_grid(day: usize, hour: usize) -> ScheduleError {
    ScheduleError::InvalidInput(vec![ValidationError::new(
        ValidationErrorKind::OutOfGrid,
        format!("cell ({day}, {hour}) is outside the {DAYS_PER_WEEK}x{HOURS_PER_DAY} grid"),
    )])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let mut d = DemandMatrix::new();
        d.set(0, 9, 2).unwrap();
        d.set_range(1, 4, 8, 1).unwrap();
        assert_eq!(d.get(0, 9), 2);
        assert_eq!(d.get(1, 4), 1);
        assert_eq!(d.get(1, 8), 0);
        assert_eq!(d.total_hours(), 6);
        assert_eq!(d.peak(), 2);
    }

    #[test]
    fn test_set_out_of_grid() {
        let mut d = DemandMatrix::new();
        assert!(d.set(7, 0, 1).is_err());
        assert!(d.set(0, 22, 1).is_err());
        assert_eq!(d.get(9, 9), 0);
    }

    #[test]
    fn test_from_rows_valid() {
        let mut rows = vec![vec![0i64; HOURS_PER_DAY]; DAYS_PER_WEEK];
        rows[3][10] = 4;
        let d = DemandMatrix::from_rows(&rows).unwrap();
        assert_eq!(d.get(3, 10), 4);
        assert_eq!(d.total_hours(), 4);
    }

    #[test]
    fn test_from_rows_collects_errors() {
        let mut rows = vec![vec![0i64; HOURS_PER_DAY]; DAYS_PER_WEEK];
        rows[0][0] = -1;
        rows[2] = vec![0; 5];
        let err = DemandMatrix::from_rows(&rows).unwrap_err();
        match err {
            ScheduleError::InvalidInput(errors) => {
                assert_eq!(errors.len(), 2);
                assert!(errors
                    .iter()
                    .any(|e| e.kind == ValidationErrorKind::DemandOutOfRange));
                assert!(errors
                    .iter()
                    .any(|e| e.kind == ValidationErrorKind::InvalidShape));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_from_rows_wrong_day_count() {
        let rows = vec![vec![0i64; HOURS_PER_DAY]; 3];
        assert!(DemandMatrix::from_rows(&rows).is_err());
    }

    #[test]
    fn test_set_day_need_range() {
        let mut d = DemandMatrix::new();
        d.set_day_need(2, 3).unwrap();
        assert!((0..HOURS_PER_DAY).all(|h| d.get(2, h) == 3));
        assert!(d.set_day_need(2, 0).is_err());
        assert!(d.set_day_need(2, 13).is_err());
    }
}
