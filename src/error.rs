//! Error types for scheduling runs.
//!
//! Input problems are reported before any scheduling starts. Infeasibility
//! is fatal to a run and never retried: the same inputs produce the same
//! failure, so the caller adjusts demand or availability and re-invokes.

use thiserror::Error;

use crate::validation::ValidationError;

/// Errors raised by the scheduling core.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// Demand or roster failed validation.
    #[error("invalid input: {}", format_validation(.0))]
    InvalidInput(Vec<ValidationError>),

    /// A time window outside the weekly grid.
    #[error("invalid window: day {day}, hours [{start_hour}, {end_hour})")]
    InvalidWindow {
        day: usize,
        start_hour: usize,
        end_hour: usize,
    },

    /// The greedy queue ran dry before a cell reached its demand.
    #[error("no candidate available for day {day}, hour {hour}")]
    NoCandidateAvailable { day: usize, hour: usize },

    /// The exact solver proved that no assignment satisfies every constraint.
    #[error("demand is infeasible under the posted constraints")]
    InfeasibleDemand,

    /// Deleting an availability constraint that does not exist.
    #[error("constraint index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// The employee already holds the maximum number of personal constraints.
    #[error("too many personal constraints (limit {limit})")]
    TooManyConstraints { limit: usize },

    /// The run was cancelled through its cancellation token.
    #[error("scheduling run cancelled")]
    Cancelled,

    /// The exact solver exhausted its time or node budget.
    #[error("scheduling run timed out")]
    TimedOut,

    /// Another run currently holds the roster.
    #[error("roster is locked by another scheduling run")]
    RosterBusy,

    /// A configuration document could not be parsed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),

    /// The background worker running the schedule panicked or was aborted.
    #[error("background scheduling task failed: {0}")]
    Background(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ScheduleError>;

fn format_validation(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationErrorKind;

    #[test]
    fn test_invalid_input_message_joins_errors() {
        let err = ScheduleError::InvalidInput(vec![
            ValidationError::new(ValidationErrorKind::DemandOutOfRange, "negative demand at (0, 1)"),
            ValidationError::new(ValidationErrorKind::DuplicateId, "duplicate employee ID: e1"),
        ]);
        let msg = err.to_string();
        assert!(msg.contains("negative demand at (0, 1)"));
        assert!(msg.contains("; duplicate employee ID: e1"));
    }

    #[test]
    fn test_cell_errors_name_the_cell() {
        let err = ScheduleError::NoCandidateAvailable { day: 2, hour: 7 };
        assert_eq!(err.to_string(), "no candidate available for day 2, hour 7");
    }
}
