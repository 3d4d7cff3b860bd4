//! Built-in dispatching rules.
//!
//! # Categories
//!
//! - **Priority**: PRIORITY
//! - **Load**: LAH (least assigned hours)
//! - **Availability**: MAH (most available hours)
//!
//! # Score Convention
//! All rules return lower scores for employees offered shifts first.

use super::{DispatchingRule, RuleScore, SchedulingContext};
use crate::models::Employee;

/// Externally defined priority score.
///
/// Lower `priority_score` is scheduled first.
#[derive(Debug, Clone, Copy)]
pub struct PriorityScore;

impl DispatchingRule for PriorityScore {
    fn name(&self) -> &'static str {
        "PRIORITY"
    }

    fn evaluate(&self, employee: &Employee, _context: &SchedulingContext) -> RuleScore {
        employee.priority_score as f64
    }

    fn description(&self) -> &'static str {
        "Priority Score"
    }
}

/// Least Assigned Hours.
///
/// Spreads work by preferring employees who have been given the fewest
/// hours so far. Counts shifts the employee already holds plus hours
/// assigned in the current run.
#[derive(Debug, Clone, Copy)]
pub struct LeastAssignedHours;

impl DispatchingRule for LeastAssignedHours {
    fn name(&self) -> &'static str {
        "LAH"
    }

    fn evaluate(&self, employee: &Employee, context: &SchedulingContext) -> RuleScore {
        (employee.assigned_hours() + context.assigned(&employee.id)) as f64
    }

    fn description(&self) -> &'static str {
        "Least Assigned Hours"
    }
}

/// Most Available Hours.
///
/// Prefers employees with the most open cells in the week.
#[derive(Debug, Clone, Copy)]
pub struct MostAvailableHours;

impl DispatchingRule for MostAvailableHours {
    fn name(&self) -> &'static str {
        "MAH"
    }

    fn evaluate(&self, employee: &Employee, _context: &SchedulingContext) -> RuleScore {
        -(employee.available_hours() as f64)
    }

    fn description(&self) -> &'static str {
        "Most Available Hours"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TimeWindow;

    #[test]
    fn test_priority_score() {
        let ctx = SchedulingContext::new();
        let first = Employee::new("first").with_priority(-3);
        let last = Employee::new("last").with_priority(4);
        assert!(PriorityScore.evaluate(&first, &ctx) < PriorityScore.evaluate(&last, &ctx));
    }

    #[test]
    fn test_least_assigned_hours_counts_run_hours() {
        let ctx = SchedulingContext::new().with_assigned_hours("busy", 6);
        let busy = Employee::new("busy");
        let idle = Employee::new("idle");
        assert!(LeastAssignedHours.evaluate(&idle, &ctx) < LeastAssignedHours.evaluate(&busy, &ctx));
    }

    #[test]
    fn test_least_assigned_hours_counts_existing_shifts() {
        let ctx = SchedulingContext::new();
        let mut veteran = Employee::new("veteran");
        veteran.add_shift(TimeWindow::new(0, 8, 12).unwrap());
        assert!((LeastAssignedHours.evaluate(&veteran, &ctx) - 4.0).abs() < 1e-10);
    }

    #[test]
    fn test_most_available_hours() {
        let ctx = SchedulingContext::new();
        let open = Employee::new("open");
        let blocked = Employee::new("blocked").with_blocked(2, 0, 10);
        assert!(MostAvailableHours.evaluate(&open, &ctx) < MostAvailableHours.evaluate(&blocked, &ctx));
        assert!((MostAvailableHours.evaluate(&open, &ctx) + 154.0).abs() < 1e-10);
    }

    #[test]
    fn test_rule_names() {
        assert_eq!(PriorityScore.name(), "PRIORITY");
        assert_eq!(LeastAssignedHours.description(), "Least Assigned Hours");
        assert_eq!(MostAvailableHours.name(), "MAH");
    }
}
