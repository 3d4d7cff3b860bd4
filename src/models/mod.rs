//! Shift scheduling domain models.
//!
//! Provides the core data types for weekly shift scheduling: the fixed
//! time grid, time windows, employees with their availability, the
//! demand matrix, and the resulting schedule.
//!
//! # Domain Mappings
//!
//! | shift-schedule | Meaning |
//! |----------------|---------|
//! | TimeWindow | Blocked availability window, or an assigned shift |
//! | Employee | Schedulable person with availability and shifts |
//! | DemandMatrix | Required headcount per day and hour |
//! | Schedule | Employees on duty per day and hour |

mod calendar;
mod demand;
mod employee;
mod schedule;
pub mod time_grid;

pub use calendar::TimeWindow;
pub use demand::{DemandMatrix, MAX_NEED_PER_HOUR};
pub use employee::{Employee, MAX_PERSONAL_CONSTRAINTS};
pub use schedule::{Schedule, Violation, ViolationType};
pub use time_grid::Weekday;
