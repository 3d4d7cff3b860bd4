//! Dispatching rules and rule engine for employee ordering.
//!
//! The greedy scheduler pops employees from a priority queue; the order of
//! that queue comes from a [`RuleEngine`]. Rules score employees, and the
//! engine combines the scores and breaks the remaining ties with a
//! deterministic [`TieBreaker`], so repeated runs over the same inputs
//! assign the same people.
//!
//! # Usage
//!
//! ```
//! use shift_schedule::dispatching::{RuleEngine, SchedulingContext, TieBreaker};
//! use shift_schedule::dispatching::rules;
//! use shift_schedule::models::Employee;
//!
//! let engine = RuleEngine::new()
//!     .with_rule(rules::PriorityScore)
//!     .with_tie_breaker(rules::LeastAssignedHours)
//!     .with_final_tie_breaker(TieBreaker::ById);
//!
//! let roster = vec![Employee::new("b"), Employee::new("a").with_priority(-1)];
//! let order = engine.sort_indices(&roster, &SchedulingContext::new());
//! assert_eq!(roster[order[0]].id, "a");
//! ```
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 4
//! - Haupt (1989), "A Survey of Priority Rule-Based Scheduling"

mod context;
mod engine;
pub mod rules;

pub use context::SchedulingContext;
pub use engine::{EvaluationMode, RuleEngine, TieBreaker};

use crate::models::Employee;
use std::fmt::Debug;

/// Score returned by a dispatching rule.
///
/// Lower scores = higher priority (popped first).
pub type RuleScore = f64;

/// A dispatching rule that evaluates employee priority.
///
/// # Score Convention
/// **Lower score = higher priority.** Rules should return smaller values
/// for employees that should be offered shifts first.
pub trait DispatchingRule: Send + Sync + Debug {
    /// Rule name (e.g., "PRIORITY").
    fn name(&self) -> &'static str;

    /// Evaluates the priority of an employee given the current run state.
    ///
    /// Returns a score where lower = higher priority.
    fn evaluate(&self, employee: &Employee, context: &SchedulingContext) -> RuleScore;

    /// Rule description.
    fn description(&self) -> &'static str {
        self.name()
    }
}
