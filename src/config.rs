//! Scheduler settings.
//!
//! Every field has a default, so a partial JSON document (or `{}`) is a
//! valid configuration.
//!
//! ```
//! use shift_schedule::config::{Algorithm, SchedulerConfig};
//!
//! let config = SchedulerConfig::from_json_str(
//!     r#"{ "algorithm": "exact", "solver": { "timeLimit": "PT30S" } }"#,
//! ).unwrap();
//! assert_eq!(config.algorithm, Algorithm::Exact);
//! assert_eq!(config.greedy.special_quota, 3);
//! ```

use serde::{Deserialize, Serialize};

use crate::cp::SolverConfig;
use crate::error::Result;
use crate::scheduler::GreedyConfig;

/// Which scheduler a run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Algorithm {
    /// Fast priority-queue heuristic; staffing is at least demand.
    #[default]
    Greedy,
    /// Complete search; staffing equals demand or the run fails.
    Exact,
}

/// Settings for both schedulers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SchedulerConfig {
    /// Scheduler used by [`SchedulingSession::run`](crate::session::SchedulingSession::run).
    pub algorithm: Algorithm,
    /// Greedy scheduler settings.
    pub greedy: GreedyConfig,
    /// Exact solver limits.
    pub solver: SolverConfig,
}

impl SchedulerConfig {
    /// Parses a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Sets the algorithm.
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Sets the greedy settings.
    pub fn with_greedy(mut self, greedy: GreedyConfig) -> Self {
        self.greedy = greedy;
        self
    }

    /// Sets the solver limits.
    pub fn with_solver(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }
}
