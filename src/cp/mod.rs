//! Exact shift scheduling as a boolean constraint model.
//!
//! One variable `x[e][d][h]` per employee, day and hour: true when the
//! employee works that hour. [`ShiftCpBuilder`] posts the hard rules of
//! [`crate::rules`] over those variables, hands the model to a
//! [`CpBackend`], and reads the satisfying assignment back into a
//! [`Schedule`]. Demand is met exactly: `sum_e x[e][d][h] == demand[d][h]`.
//!
//! # Posted Constraints
//!
//! | Family | Form |
//! |--------|------|
//! | Availability | `x[e][d][h] == 0` for blocked cells |
//! | Demand | `sum_e x[e][d][h] == demand[d][h]` |
//! | Daily hours | `sum_h x[e][d][h] <= 8` |
//! | Contiguous run | `x[e][d][h-8..h]` all worked `=> x[e][d][h] == 0` |
//! | No gaps | `x[e][d][h] && x[e][d][h+2] => x[e][d][h+1]` |
//! | Rest | `x[e][d][H] => x[e][d+1][l] == 0` for `l < H + 8 - 22` |
//!
//! Before posting, each cell and each day is checked against the hours
//! the roster can supply; shortfalls are reported as infeasible without a
//! search.
//!
//! The backend is a trait so the formulation can be solved by any
//! boolean CSP engine; [`PumpkinSolver`] is the bundled one.
//!
//! # Reference
//! - Rossi, van Beek & Walsh (2006), "Handbook of Constraint Programming"
//! - Ernst et al. (2004), "Staff scheduling and rostering: A review"

mod model;
mod pumpkin;

pub use model::{CpConstraint, CpModel, CpSolution, SolveStatus, VarId};
pub use pumpkin::PumpkinSolver;

use jiff::SignedDuration;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::error::{Result, ScheduleError};
use crate::models::time_grid::{next_day, DAYS_PER_WEEK, HOURS_PER_DAY, MAX_SHIFT_HOURS};
use crate::models::{DemandMatrix, Employee, Schedule};
use crate::rules;
use crate::session::CancellationToken;
use crate::validation::validate_input;

/// Wall-clock budget of a default [`SolverConfig`].
pub const DEFAULT_TIME_LIMIT: SignedDuration = SignedDuration::from_secs(10);

/// Search limits for the exact solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SolverConfig {
    /// Wall-clock budget. Unlimited when `None`.
    pub time_limit: Option<SignedDuration>,
    /// Search-step budget. Unlimited when `None`.
    pub max_nodes: Option<u64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_limit: Some(DEFAULT_TIME_LIMIT),
            max_nodes: None,
        }
    }
}

impl SolverConfig {
    /// Sets the wall-clock budget.
    pub fn with_time_limit(mut self, time_limit: SignedDuration) -> Self {
        self.time_limit = Some(time_limit);
        self
    }

    /// Removes the wall-clock budget.
    pub fn without_time_limit(mut self) -> Self {
        self.time_limit = None;
        self
    }

    /// Sets the search-step budget.
    pub fn with_max_nodes(mut self, max_nodes: u64) -> Self {
        self.max_nodes = Some(max_nodes);
        self
    }
}

/// A boolean constraint solver.
///
/// Build the model, post constraints, solve, extract: the builder does the
/// first two and the last, a backend does the solving.
pub trait CpBackend: Send + Sync {
    /// Backend name, for logs.
    fn name(&self) -> &'static str;

    /// Searches for an assignment satisfying every constraint of `model`.
    fn solve(&self, model: &CpModel, config: &SolverConfig, cancel: &CancellationToken)
        -> CpSolution;
}

/// Builds the shift model for a roster and a demand matrix.
///
/// # Example
/// ```
/// use shift_schedule::cp::{PumpkinSolver, ShiftCpBuilder, SolverConfig};
/// use shift_schedule::models::{DemandMatrix, Employee};
/// use shift_schedule::CancellationToken;
///
/// let roster = vec![Employee::new("e1")];
/// let mut demand = DemandMatrix::new();
/// demand.set_range(0, 9, 13, 1).unwrap();
///
/// let builder = ShiftCpBuilder::new(&roster, &demand);
/// let schedule = builder
///     .solve(&PumpkinSolver::new(), &SolverConfig::default(), &CancellationToken::new())
///     .unwrap();
/// assert_eq!(schedule.hours_on("e1", 0), vec![9, 10, 11, 12]);
/// ```
pub struct ShiftCpBuilder<'a> {
    employees: &'a [Employee],
    demand: &'a DemandMatrix,
}

impl<'a> ShiftCpBuilder<'a> {
    /// Creates a builder.
    pub fn new(employees: &'a [Employee], demand: &'a DemandMatrix) -> Self {
        Self { employees, demand }
    }

    /// Variable for employee `e` working `hour` on `day`.
    ///
    /// Variables are created employee-major, then day, then hour.
    pub fn var(&self, e: usize, day: usize, hour: usize) -> VarId {
        VarId((e * DAYS_PER_WEEK + day) * HOURS_PER_DAY + hour)
    }

    /// Creates every variable and posts every constraint family.
    pub fn build(&self) -> CpModel {
        let mut model = CpModel::new("shift-schedule");
        for employee in self.employees {
            for day in 0..DAYS_PER_WEEK {
                for hour in 0..HOURS_PER_DAY {
                    model.new_bool_var(format!("{}@{day}:{hour}", employee.id));
                }
            }
        }

        self.post_availability(&mut model);
        self.post_demand(&mut model);
        self.post_daily_hours(&mut model);
        self.post_contiguous_runs(&mut model);
        self.post_no_gaps(&mut model);
        self.post_rest(&mut model);
        model
    }

    fn post_availability(&self, model: &mut CpModel) {
        let before = model.constraint_count();
        for (e, employee) in self.employees.iter().enumerate() {
            for day in 0..DAYS_PER_WEEK {
                for hour in 0..HOURS_PER_DAY {
                    if !employee.is_available(day, hour) {
                        model.fix(self.var(e, day, hour), false);
                    }
                }
            }
        }
        debug!(count = model.constraint_count() - before, "posted availability");
    }

    fn post_demand(&self, model: &mut CpModel) {
        for day in 0..DAYS_PER_WEEK {
            for hour in 0..HOURS_PER_DAY {
                let vars = (0..self.employees.len())
                    .map(|e| self.var(e, day, hour))
                    .collect();
                model.sum_eq(vars, self.demand.get(day, hour) as usize);
            }
        }
        debug!(count = DAYS_PER_WEEK * HOURS_PER_DAY, "posted demand");
    }

    fn post_daily_hours(&self, model: &mut CpModel) {
        for e in 0..self.employees.len() {
            for day in 0..DAYS_PER_WEEK {
                let vars = (0..HOURS_PER_DAY).map(|h| self.var(e, day, h)).collect();
                model.sum_le(vars, MAX_SHIFT_HOURS);
            }
        }
        debug!(count = self.employees.len() * DAYS_PER_WEEK, "posted daily hours");
    }

    fn post_contiguous_runs(&self, model: &mut CpModel) {
        let before = model.constraint_count();
        for e in 0..self.employees.len() {
            for day in 0..DAYS_PER_WEEK {
                for hour in MAX_SHIFT_HOURS..HOURS_PER_DAY {
                    let run = (hour - MAX_SHIFT_HOURS..hour)
                        .map(|h| self.var(e, day, h))
                        .collect();
                    model.implies(run, self.var(e, day, hour), false);
                }
            }
        }
        debug!(count = model.constraint_count() - before, "posted contiguous runs");
    }

    fn post_no_gaps(&self, model: &mut CpModel) {
        let before = model.constraint_count();
        for e in 0..self.employees.len() {
            for day in 0..DAYS_PER_WEEK {
                for hour in 0..HOURS_PER_DAY - 2 {
                    model.implies(
                        vec![self.var(e, day, hour), self.var(e, day, hour + 2)],
                        self.var(e, day, hour + 1),
                        true,
                    );
                }
            }
        }
        debug!(count = model.constraint_count() - before, "posted no gaps");
    }

    fn post_rest(&self, model: &mut CpModel) {
        let before = model.constraint_count();
        for e in 0..self.employees.len() {
            for day in 0..DAYS_PER_WEEK {
                for last in 0..HOURS_PER_DAY {
                    for early in rules::rest_block_next_day(last) {
                        model.implies(
                            vec![self.var(e, day, last)],
                            self.var(e, next_day(day), early),
                            false,
                        );
                    }
                }
            }
        }
        debug!(count = model.constraint_count() - before, "posted rest");
    }

    /// Checks demand against the hours the roster can supply.
    ///
    /// A cell needs no more employees than are available in it, and a day
    /// needs no more hours than the sum over employees of
    /// `min(8, available hours that day)`.
    ///
    /// # Errors
    /// [`ScheduleError::InfeasibleDemand`] on the first shortfall.
    pub fn check_capacity(&self) -> Result<()> {
        for day in 0..DAYS_PER_WEEK {
            let mut day_demand = 0;
            for hour in 0..HOURS_PER_DAY {
                let needed = self.demand.get(day, hour) as usize;
                let available = self
                    .employees
                    .iter()
                    .filter(|e| e.is_available(day, hour))
                    .count();
                if needed > available {
                    warn!(day, hour, needed, available, "cell demand exceeds available employees");
                    return Err(ScheduleError::InfeasibleDemand);
                }
                day_demand += needed;
            }

            let day_capacity: usize = self
                .employees
                .iter()
                .map(|e| {
                    let open = (0..HOURS_PER_DAY).filter(|&h| e.is_available(day, h)).count();
                    open.min(MAX_SHIFT_HOURS)
                })
                .sum();
            if day_demand > day_capacity {
                warn!(day, day_demand, day_capacity, "day demand exceeds roster capacity");
                return Err(ScheduleError::InfeasibleDemand);
            }
        }
        Ok(())
    }

    /// Reads a satisfying assignment into a schedule.
    pub fn decode(&self, solution: &CpSolution) -> Result<Schedule> {
        let mut schedule = Schedule::new();
        for (e, employee) in self.employees.iter().enumerate() {
            for day in 0..DAYS_PER_WEEK {
                for hour in 0..HOURS_PER_DAY {
                    if solution.value(self.var(e, day, hour)) {
                        schedule.add_hour(&employee.id, day, hour)?;
                    }
                }
            }
        }
        Ok(schedule)
    }

    /// Checks capacity, builds, solves with `backend`, and decodes.
    ///
    /// # Errors
    /// - [`ScheduleError::InfeasibleDemand`] when capacity falls short or
    ///   the backend proves no assignment exists.
    /// - [`ScheduleError::TimedOut`] when a budget in `config` runs out.
    /// - [`ScheduleError::Cancelled`] when `cancel` fires.
    #[instrument(skip_all, fields(backend = backend.name(), employees = self.employees.len()))]
    pub fn solve<B: CpBackend + ?Sized>(
        &self,
        backend: &B,
        config: &SolverConfig,
        cancel: &CancellationToken,
    ) -> Result<Schedule> {
        self.check_capacity()?;
        let model = self.build();
        let solution = backend.solve(&model, config, cancel);

        match solution.status {
            SolveStatus::Satisfied => {
                let schedule = self.decode(&solution)?;
                info!(
                    nodes = solution.nodes,
                    assignments = schedule.assignment_count(),
                    "exact schedule found"
                );
                Ok(schedule)
            }
            SolveStatus::Infeasible => {
                warn!(nodes = solution.nodes, "demand is infeasible");
                Err(ScheduleError::InfeasibleDemand)
            }
            SolveStatus::TimedOut => {
                warn!(nodes = solution.nodes, "exact solve timed out");
                Err(ScheduleError::TimedOut)
            }
            SolveStatus::Cancelled => {
                warn!(nodes = solution.nodes, "exact solve cancelled");
                Err(ScheduleError::Cancelled)
            }
        }
    }
}

/// Exact scheduler: meets demand exactly or proves it cannot be met.
///
/// Worst-case exponential; set [`SolverConfig`] budgets for large rosters.
#[derive(Debug, Clone, Default)]
pub struct ExactScheduler<B = PumpkinSolver> {
    backend: B,
    config: SolverConfig,
}

impl ExactScheduler {
    /// Creates a scheduler using [`PumpkinSolver`].
    pub fn new() -> Self {
        Self::default()
    }
}

impl<B: CpBackend> ExactScheduler<B> {
    /// Creates a scheduler around `backend`.
    pub fn with_backend(backend: B) -> Self {
        Self {
            backend,
            config: SolverConfig::default(),
        }
    }

    /// Sets the search limits.
    pub fn with_config(mut self, config: SolverConfig) -> Self {
        self.config = config;
        self
    }

    /// Search limits in use.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Builds a schedule meeting `demand` exactly.
    pub fn schedule(&self, employees: &[Employee], demand: &DemandMatrix) -> Result<Schedule> {
        self.schedule_with_cancel(employees, demand, &CancellationToken::new())
    }

    /// Builds a schedule meeting `demand` exactly, stopping when `cancel` fires.
    pub fn schedule_with_cancel(
        &self,
        employees: &[Employee],
        demand: &DemandMatrix,
        cancel: &CancellationToken,
    ) -> Result<Schedule> {
        validate_input(employees).map_err(ScheduleError::InvalidInput)?;
        ShiftCpBuilder::new(employees, demand).solve(&self.backend, &self.config, cancel)
    }
}
