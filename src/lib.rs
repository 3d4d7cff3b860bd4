//! Weekly shift scheduling.
//!
//! Assigns employees to the hours of a fixed week (7 days × 22 working
//! hours) so that every hour is staffed as demanded, while respecting each
//! employee's blocked windows, an 8-hour limit per shift and per day, no
//! one-hour gaps inside a shift, and 8 hours of rest across day boundaries.
//!
//! Two schedulers share one definition of those rules ([`rules`]):
//!
//! - [`scheduler::GreedyScheduler`]: priority-queue heuristic. Fast and
//!   deterministic; staffing is at least demand; may fail where a
//!   solution exists.
//! - [`cp::ExactScheduler`]: boolean constraint model solved by the
//!   Pumpkin CP solver. Staffing equals demand, or the demand is
//!   reported infeasible.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `TimeWindow`, `Employee`, `DemandMatrix`,
//!   `Schedule`, and the time grid
//! - **`rules`**: Hard-constraint predicates and schedule audit
//! - **`dispatching`**: Employee ordering rules and rule engine
//! - **`scheduler`**: Greedy scheduler and staffing KPIs
//! - **`cp`**: Constraint model, backend trait, and exact scheduler
//! - **`finalize`**: Folding a schedule into the roster and persisting it
//! - **`session`**: Locked runs over a shared roster, cancellation, background runs
//! - **`config`**: Scheduler settings
//! - **`validation`**: Input integrity checks (duplicate IDs, grid bounds, overlapping shifts)
//!
//! # Example
//!
//! ```
//! use shift_schedule::models::{DemandMatrix, Employee};
//! use shift_schedule::rules::{audit, DemandMode};
//! use shift_schedule::cp::ExactScheduler;
//!
//! let roster = vec![Employee::new("avi"), Employee::new("noa").with_blocked(0, 0, 12)];
//! let mut demand = DemandMatrix::new();
//! demand.set_range(0, 6, 10, 1).unwrap();
//!
//! let schedule = ExactScheduler::new().schedule(&roster, &demand).unwrap();
//! assert!(audit(&schedule, &roster, &demand, DemandMode::Exact).is_empty());
//! ```
//!
//! # References
//!
//! - Ernst et al. (2004), "Staff scheduling and rostering: A review of applications, methods and models"
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"

pub mod config;
pub mod cp;
pub mod dispatching;
pub mod error;
pub mod finalize;
pub mod models;
pub mod rules;
pub mod scheduler;
pub mod session;
pub mod validation;

pub use error::{Result, ScheduleError};
pub use session::{CancellationToken, SchedulingSession};
