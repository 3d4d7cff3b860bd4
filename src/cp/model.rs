//! Boolean constraint model.
//!
//! A [`CpModel`] is a set of named boolean variables plus the constraints
//! over them. It is backend-agnostic: any [`CpBackend`](super::CpBackend)
//! can solve it.

use std::fmt;

/// Handle to a boolean variable of a [`CpModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarId(pub(crate) usize);

impl VarId {
    /// Position of the variable in creation order.
    pub fn index(self) -> usize {
        self.0
    }
}

/// A constraint over boolean variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CpConstraint {
    /// `var == value`.
    Fix { var: VarId, value: bool },
    /// Exactly `rhs` of `vars` are true.
    SumEq { vars: Vec<VarId>, rhs: usize },
    /// At most `rhs` of `vars` are true.
    SumLe { vars: Vec<VarId>, rhs: usize },
    /// If every premise is true then `var == value`.
    Implies {
        premises: Vec<VarId>,
        var: VarId,
        value: bool,
    },
}

impl CpConstraint {
    /// Variables the constraint reads.
    pub fn vars(&self) -> Vec<VarId> {
        match self {
            Self::Fix { var, .. } => vec![*var],
            Self::SumEq { vars, .. } | Self::SumLe { vars, .. } => vars.clone(),
            Self::Implies { premises, var, .. } => {
                let mut all = premises.clone();
                all.push(*var);
                all
            }
        }
    }
}

/// A boolean satisfaction model.
#[derive(Debug, Clone, Default)]
pub struct CpModel {
    name: String,
    var_names: Vec<String>,
    constraints: Vec<CpConstraint>,
}

impl CpModel {
    /// Creates an empty model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Model name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds a boolean variable.
    pub fn new_bool_var(&mut self, name: impl Into<String>) -> VarId {
        self.var_names.push(name.into());
        VarId(self.var_names.len() - 1)
    }

    /// Posts a constraint.
    pub fn add(&mut self, constraint: CpConstraint) {
        self.constraints.push(constraint);
    }

    /// Posts `var == value`.
    pub fn fix(&mut self, var: VarId, value: bool) {
        self.add(CpConstraint::Fix { var, value });
    }

    /// Posts `sum(vars) == rhs`.
    pub fn sum_eq(&mut self, vars: Vec<VarId>, rhs: usize) {
        self.add(CpConstraint::SumEq { vars, rhs });
    }

    /// Posts `sum(vars) <= rhs`.
    pub fn sum_le(&mut self, vars: Vec<VarId>, rhs: usize) {
        self.add(CpConstraint::SumLe { vars, rhs });
    }

    /// Posts `all(premises) => var == value`.
    pub fn implies(&mut self, premises: Vec<VarId>, var: VarId, value: bool) {
        self.add(CpConstraint::Implies {
            premises,
            var,
            value,
        });
    }

    /// Number of variables.
    pub fn var_count(&self) -> usize {
        self.var_names.len()
    }

    /// Number of constraints.
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Name of a variable.
    pub fn var_name(&self, var: VarId) -> Option<&str> {
        self.var_names.get(var.0).map(String::as_str)
    }

    /// Posted constraints in posting order.
    pub fn constraints(&self) -> &[CpConstraint] {
        &self.constraints
    }
}

/// Outcome of a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// Every variable has a value satisfying every constraint.
    Satisfied,
    /// No assignment satisfies the constraints.
    Infeasible,
    /// The time or node budget ran out first.
    TimedOut,
    /// The cancellation token fired first.
    Cancelled,
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Satisfied => "satisfied",
            Self::Infeasible => "infeasible",
            Self::TimedOut => "timed out",
            Self::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// Result of solving a [`CpModel`].
#[derive(Debug, Clone)]
pub struct CpSolution {
    /// Solve outcome.
    pub status: SolveStatus,
    /// Variable values, indexed by [`VarId::index`]. Only meaningful when
    /// the status is [`SolveStatus::Satisfied`].
    pub values: Vec<bool>,
    /// Search steps taken.
    pub nodes: u64,
}

impl CpSolution {
    /// A solution with no values.
    pub fn without_values(status: SolveStatus, nodes: u64) -> Self {
        Self {
            status,
            values: Vec::new(),
            nodes,
        }
    }

    /// Value of `var`; false when absent.
    pub fn value(&self, var: VarId) -> bool {
        self.values.get(var.0).copied().unwrap_or(false)
    }
}
