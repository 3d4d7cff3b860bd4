//! Rule engine for multi-criteria employee ordering.
//!
//! Composes multiple dispatching rules with configurable evaluation modes
//! and a deterministic final tie-breaker.
//!
//! # Reference
//! Haupt (1989), "A Survey of Priority Rule-Based Scheduling"

use std::cmp::Ordering;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::{rules, DispatchingRule, SchedulingContext};
use crate::models::Employee;

/// How multiple rules are combined.
#[derive(Debug, Clone, Default)]
pub enum EvaluationMode {
    /// Apply rules in sequence; use next rule only on ties.
    #[default]
    Sequential,
    /// Compute weighted sum of all rule scores.
    Weighted,
}

/// How ties are broken after all rules are exhausted.
///
/// Both strategies give a total order, so the same roster always comes
/// out in the same order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TieBreaker {
    /// By employee ID (lexicographic).
    #[default]
    ById,
    /// By a key drawn from a seeded generator, then by employee ID.
    ///
    /// Keys are drawn in roster order, so the result depends on the seed
    /// and on the order employees are supplied in.
    Seeded(u64),
}

#[derive(Clone)]
struct WeightedRule {
    rule: Arc<dyn DispatchingRule>,
    weight: f64,
}

/// A composable rule engine for employee prioritization.
///
/// Supports sequential multi-layer evaluation (primary rule → tie-breaker)
/// and weighted combination modes.
///
/// # Example
/// ```
/// use shift_schedule::dispatching::RuleEngine;
/// use shift_schedule::dispatching::rules;
///
/// let engine = RuleEngine::new()
///     .with_rule(rules::PriorityScore)
///     .with_tie_breaker(rules::MostAvailableHours);
/// ```
#[derive(Clone)]
pub struct RuleEngine {
    rules: Vec<WeightedRule>,
    mode: EvaluationMode,
    tie_breaker: TieBreaker,
    epsilon: f64,
}

impl RuleEngine {
    /// Creates an empty rule engine.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            mode: EvaluationMode::Sequential,
            tie_breaker: TieBreaker::ById,
            epsilon: 1e-9,
        }
    }

    /// Adds a primary rule (weight 1.0).
    pub fn with_rule<R: DispatchingRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(WeightedRule {
            rule: Arc::new(rule),
            weight: 1.0,
        });
        self
    }

    /// Adds a weighted rule.
    pub fn with_weighted_rule<R: DispatchingRule + 'static>(
        mut self,
        rule: R,
        weight: f64,
    ) -> Self {
        self.rules.push(WeightedRule {
            rule: Arc::new(rule),
            weight,
        });
        self
    }

    /// Adds a tie-breaking rule (weight 0.0, used only in Sequential mode).
    pub fn with_tie_breaker<R: DispatchingRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(WeightedRule {
            rule: Arc::new(rule),
            weight: 0.0,
        });
        self
    }

    /// Sets the evaluation mode.
    pub fn with_mode(mut self, mode: EvaluationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the final tie-breaking strategy.
    pub fn with_final_tie_breaker(mut self, tie_breaker: TieBreaker) -> Self {
        self.tie_breaker = tie_breaker;
        self
    }

    /// Sorts employees by priority (highest priority first).
    ///
    /// Returns indices into the original slice.
    pub fn sort_indices(&self, employees: &[Employee], context: &SchedulingContext) -> Vec<usize> {
        if employees.is_empty() {
            return Vec::new();
        }

        let mut indices: Vec<usize> = (0..employees.len()).collect();
        let keys = self.tie_keys(employees.len());

        match &self.mode {
            EvaluationMode::Sequential => {
                indices.sort_by(|&a, &b| {
                    self.compare_sequential(&employees[a], &employees[b], context)
                        .then_with(|| self.compare_final(employees, &keys, a, b))
                });
            }
            EvaluationMode::Weighted => {
                let scores: Vec<f64> = employees
                    .iter()
                    .map(|e| self.weighted_score(e, context))
                    .collect();
                indices.sort_by(|&a, &b| {
                    let by_score = if (scores[a] - scores[b]).abs() > self.epsilon {
                        scores[a].partial_cmp(&scores[b]).unwrap_or(Ordering::Equal)
                    } else {
                        Ordering::Equal
                    };
                    by_score.then_with(|| self.compare_final(employees, &keys, a, b))
                });
            }
        }

        indices
    }

    /// Rank of each employee: `ranks[i]` is the position of `employees[i]`
    /// in [`sort_indices`](Self::sort_indices) order.
    pub fn ranks(&self, employees: &[Employee], context: &SchedulingContext) -> Vec<usize> {
        let mut ranks = vec![0; employees.len()];
        for (position, idx) in self.sort_indices(employees, context).into_iter().enumerate() {
            ranks[idx] = position;
        }
        ranks
    }

    fn compare_sequential(&self, a: &Employee, b: &Employee, context: &SchedulingContext) -> Ordering {
        for wr in &self.rules {
            let score_a = wr.rule.evaluate(a, context);
            let score_b = wr.rule.evaluate(b, context);

            if (score_a - score_b).abs() > self.epsilon {
                return score_a.partial_cmp(&score_b).unwrap_or(Ordering::Equal);
            }
        }
        Ordering::Equal
    }

    fn compare_final(&self, employees: &[Employee], keys: &[u64], a: usize, b: usize) -> Ordering {
        let by_id = || employees[a].id.cmp(&employees[b].id);
        match self.tie_breaker {
            TieBreaker::ById => by_id(),
            TieBreaker::Seeded(_) => keys[a].cmp(&keys[b]).then_with(by_id),
        }
    }

    fn tie_keys(&self, len: usize) -> Vec<u64> {
        match self.tie_breaker {
            TieBreaker::ById => Vec::new(),
            TieBreaker::Seeded(seed) => {
                let mut rng = StdRng::seed_from_u64(seed);
                (0..len).map(|_| rng.random()).collect()
            }
        }
    }

    fn weighted_score(&self, employee: &Employee, context: &SchedulingContext) -> f64 {
        self.rules
            .iter()
            .map(|wr| wr.rule.evaluate(employee, context) * wr.weight)
            .sum()
    }
}

impl Default for RuleEngine {
    /// Lowest priority score first, ties by employee ID.
    fn default() -> Self {
        Self::new().with_rule(rules::PriorityScore)
    }
}

impl std::fmt::Debug for RuleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleEngine")
            .field(
                "rules",
                &self
                    .rules
                    .iter()
                    .map(|r| format!("{}(w={})", r.rule.name(), r.weight))
                    .collect::<Vec<_>>(),
            )
            .field("mode", &self.mode)
            .field("tie_breaker", &self.tie_breaker)
            .finish()
    }
}
