//! Greedy scheduler and KPI evaluation.
//!
//! Provides the priority-queue shift scheduler and staffing metrics.
//!
//! # Algorithm
//!
//! `GreedyScheduler` fills the week cell by cell, giving each popped
//! employee a legal shift starting at the current hour that runs until
//! the demand ahead is covered. It is
//! not complete, but runs in polynomial time and is the default path; the
//! exact alternative lives in [`crate::cp`].
//!
//! # KPI
//!
//! `ScheduleKpi` computes staffing metrics: coverage, under- and
//! overstaffed cells, and hours per employee.
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 4
//! - Ernst et al. (2004), "Staff scheduling and rostering: A review"

mod greedy;
mod kpi;

pub use greedy::{GreedyConfig, GreedyScheduler, ShiftExtent};
pub use kpi::ScheduleKpi;
