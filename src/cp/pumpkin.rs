//! [`CpBackend`] on the Pumpkin lazy-clause-generation solver.
//!
//! | Model constraint | Posted as |
//! |------------------|-----------|
//! | `Fix` | unit clause |
//! | `SumEq` | linear `equals` over 0/1 literals |
//! | `SumLe` | linear `less_than_or_equals` over 0/1 literals |
//! | `Implies` | clause `!p1 \/ .. \/ !pn \/ (var == value)` |
//!
//! # Reference
//! Feydy & Stuckey (2009), "Lazy Clause Generation Reengineered"

use jiff::{SignedDuration, Timestamp};
use pumpkin_core::constraints;
use pumpkin_core::results::{ProblemSolution, SatisfactionResult};
use pumpkin_core::termination::TerminationCondition;
use pumpkin_core::variables::Literal;
use pumpkin_core::Solver;
use tracing::{debug, instrument};

use super::model::{CpConstraint, CpModel, CpSolution, SolveStatus, VarId};
use super::{CpBackend, SolverConfig};
use crate::session::CancellationToken;

/// Clock reads are spaced out by this many search steps.
const TIME_CHECK_INTERVAL: u64 = 64;

/// Bundled exact backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct PumpkinSolver;

impl PumpkinSolver {
    /// Creates the backend.
    pub fn new() -> Self {
        Self
    }
}

impl CpBackend for PumpkinSolver {
    fn name(&self) -> &'static str {
        "pumpkin"
    }

    #[instrument(skip_all, fields(vars = model.var_count(), constraints = model.constraint_count()))]
    fn solve(
        &self,
        model: &CpModel,
        config: &SolverConfig,
        cancel: &CancellationToken,
    ) -> CpSolution {
        let mut solver = Solver::default();
        let literals: Vec<Literal> = (0..model.var_count()).map(|_| solver.new_literal()).collect();

        for constraint in model.constraints() {
            if !post(&mut solver, &literals, constraint) {
                debug!("infeasible at the root");
                return CpSolution::without_values(SolveStatus::Infeasible, 0);
            }
        }

        let mut budget = Budget::new(config, cancel);
        let mut brancher = solver.default_brancher();
        let solution = match solver.satisfy(&mut brancher, &mut budget) {
            SatisfactionResult::Satisfiable(satisfiable) => {
                let assignment = satisfiable.solution();
                CpSolution {
                    status: SolveStatus::Satisfied,
                    values: literals
                        .iter()
                        .map(|&literal| assignment.get_literal_value(literal))
                        .collect(),
                    nodes: budget.steps,
                }
            }
            SatisfactionResult::Unsatisfiable(..) => {
                CpSolution::without_values(SolveStatus::Infeasible, budget.steps)
            }
            SatisfactionResult::Unknown(..) => CpSolution::without_values(
                budget.stopped_by.unwrap_or(SolveStatus::TimedOut),
                budget.steps,
            ),
        };
        debug!(status = %solution.status, steps = solution.nodes, "search finished");
        solution
    }
}

/// Posts one model constraint. False when the solver is infeasible at the root.
fn post(solver: &mut Solver, literals: &[Literal], constraint: &CpConstraint) -> bool {
    let lit = |var: &VarId| literals[var.index()];
    let tag = solver.new_constraint_tag();

    match constraint {
        CpConstraint::Fix { var, value } => {
            let literal = if *value { lit(var) } else { !lit(var) };
            solver
                .add_constraint(constraints::clause(vec![literal], tag))
                .post()
                .is_ok()
        }
        CpConstraint::SumEq { vars, rhs } => {
            if vars.is_empty() {
                return *rhs == 0;
            }
            let terms: Vec<Literal> = vars.iter().map(lit).collect();
            solver
                .add_constraint(constraints::equals(terms, to_rhs(*rhs), tag))
                .post()
                .is_ok()
        }
        CpConstraint::SumLe { vars, rhs } => {
            if vars.len() <= *rhs {
                return true;
            }
            let terms: Vec<Literal> = vars.iter().map(lit).collect();
            solver
                .add_constraint(constraints::less_than_or_equals(terms, to_rhs(*rhs), tag))
                .post()
                .is_ok()
        }
        CpConstraint::Implies {
            premises,
            var,
            value,
        } => {
            let mut clause: Vec<Literal> = premises.iter().map(|p| !lit(p)).collect();
            clause.push(if *value { lit(var) } else { !lit(var) });
            solver
                .add_constraint(constraints::clause(clause, tag))
                .post()
                .is_ok()
        }
    }
}

fn to_rhs(rhs: usize) -> i32 {
    i32::try_from(rhs).unwrap_or(i32::MAX)
}

/// Stops the search on cancellation, on the step budget, or on the clock.
struct Budget<'a> {
    cancel: &'a CancellationToken,
    max_steps: Option<u64>,
    time_limit: Option<SignedDuration>,
    start: Timestamp,
    steps: u64,
    stopped_by: Option<SolveStatus>,
}

impl<'a> Budget<'a> {
    fn new(config: &SolverConfig, cancel: &'a CancellationToken) -> Self {
        Self {
            cancel,
            max_steps: config.max_nodes,
            time_limit: config.time_limit,
            start: Timestamp::now(),
            steps: 0,
            stopped_by: None,
        }
    }

    fn exhausted(&self) -> Option<SolveStatus> {
        if self.cancel.is_cancelled() {
            return Some(SolveStatus::Cancelled);
        }
        if self.max_steps.is_some_and(|max| self.steps >= max) {
            return Some(SolveStatus::TimedOut);
        }
        if let Some(limit) = self.time_limit {
            if self.steps % TIME_CHECK_INTERVAL == 0
                && Timestamp::now().duration_since(self.start) > limit
            {
                return Some(SolveStatus::TimedOut);
            }
        }
        None
    }
}

impl TerminationCondition for Budget<'_> {
    fn should_stop(&mut self) -> bool {
        self.stopped_by = self.exhausted();
        self.steps += 1;
        self.stopped_by.is_some()
    }
}
