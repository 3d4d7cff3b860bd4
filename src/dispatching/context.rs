//! Run state passed to dispatching rules.

use std::collections::HashMap;

/// Runtime scheduling state passed to dispatching rules.
///
/// Holds the grid position the scheduler has reached and the hours each
/// employee has been given so far in the current run.
#[derive(Debug, Clone, Default)]
pub struct SchedulingContext {
    /// Day being filled.
    pub day: usize,
    /// Hour being filled.
    pub hour: usize,
    /// Hours assigned in this run (employee_id → hours).
    pub assigned_hours: HashMap<String, usize>,
}

impl SchedulingContext {
    /// Creates a context at the start of the week.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets hours already assigned to an employee in this run.
    pub fn with_assigned_hours(mut self, employee_id: impl Into<String>, hours: usize) -> Self {
        self.assigned_hours.insert(employee_id.into(), hours);
        self
    }

    /// Records `hours` more for an employee.
    pub fn record_assignment(&mut self, employee_id: &str, hours: usize) {
        *self
            .assigned_hours
            .entry(employee_id.to_string())
            .or_insert(0) += hours;
    }

    /// Hours assigned to an employee in this run.
    pub fn assigned(&self, employee_id: &str) -> usize {
        self.assigned_hours.get(employee_id).copied().unwrap_or(0)
    }
}
