//! Priority-queue greedy shift scheduler.
//!
//! # Algorithm
//!
//! For each day `d` in `0..7`, for each hour `h` in `0..22`, while the cell
//! is below demand:
//!
//! 1. Pop the highest-priority employee from the queue.
//! 2. If they are blocked at `(d, h)`, set them aside until the cell is done.
//! 3. Otherwise assign a shift starting at `h` that runs until the demand
//!    ahead is met, or the longest legal one under [`ShiftExtent::Maximal`]
//!    ([`rules::shift_end`]), then block the rest of day `d` and the
//!    rest-period hours of the neighbouring days in the employee's
//!    effective availability.
//!
//! Employees given a shift return to the queue when the day ends. A cell
//! that cannot be filled fails the run with
//! [`ScheduleError::NoCandidateAvailable`]; nothing is backtracked.
//!
//! Availability changes made while scheduling apply to a per-run copy of
//! the roster. The caller's employees are never touched.
//!
//! # Complexity
//! O(D * H * n log n) where n = roster size.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::dispatching::{RuleEngine, SchedulingContext, TieBreaker};
use crate::error::{Result, ScheduleError};
use crate::models::time_grid::{next_day, previous_day, DAYS_PER_WEEK, HOURS_PER_DAY};
use crate::models::{DemandMatrix, Employee, Schedule};
use crate::rules;
use crate::session::CancellationToken;
use crate::validation::validate_input;

/// How far a new shift extends past the hour that triggered it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShiftExtent {
    /// Longest block the employee can legally work (up to 8 hours).
    ///
    /// Builds long shifts at the cost of staffing above demand.
    Maximal,
    /// Stop at the first later hour whose demand is already met.
    #[default]
    UntilDemandMet,
}

/// Greedy scheduler settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GreedyConfig {
    /// Seats per cell offered to employees with special properties before
    /// the general queue is used.
    pub special_quota: usize,
    /// How far new shifts extend.
    pub shift_extent: ShiftExtent,
    /// Final ordering among employees the rules rank equally.
    pub tie_breaker: TieBreaker,
}

impl Default for GreedyConfig {
    fn default() -> Self {
        Self {
            special_quota: 3,
            shift_extent: ShiftExtent::UntilDemandMet,
            tie_breaker: TieBreaker::ById,
        }
    }
}

impl GreedyConfig {
    /// Sets the special-employee quota.
    pub fn with_special_quota(mut self, special_quota: usize) -> Self {
        self.special_quota = special_quota;
        self
    }

    /// Sets the shift extent policy.
    pub fn with_shift_extent(mut self, shift_extent: ShiftExtent) -> Self {
        self.shift_extent = shift_extent;
        self
    }

    /// Sets the final tie-breaker.
    pub fn with_tie_breaker(mut self, tie_breaker: TieBreaker) -> Self {
        self.tie_breaker = tie_breaker;
        self
    }
}

/// Greedy, priority-driven shift scheduler.
///
/// Fast and deterministic, but incomplete: it never revisits an
/// assignment, so it can fail on demand the exact solver would satisfy.
/// Staffing is guaranteed to be at least demand, not equal to it.
///
/// # Example
///
/// ```
/// use shift_schedule::scheduler::GreedyScheduler;
/// use shift_schedule::models::{DemandMatrix, Employee};
///
/// let roster = vec![Employee::new("e1")];
/// let mut demand = DemandMatrix::new();
/// demand.set_range(0, 9, 13, 1).unwrap();
///
/// let schedule = GreedyScheduler::new().schedule(&roster, &demand).unwrap();
/// assert!(schedule.is_assigned("e1", 0, 9));
/// ```
#[derive(Debug, Clone)]
pub struct GreedyScheduler {
    engine: RuleEngine,
    config: GreedyConfig,
}

impl GreedyScheduler {
    /// Creates a scheduler with the default rule engine and settings.
    pub fn new() -> Self {
        Self::from_config(GreedyConfig::default())
    }

    /// Creates a scheduler ordering employees by priority score, with the
    /// configured tie-breaker.
    pub fn from_config(config: GreedyConfig) -> Self {
        Self {
            engine: RuleEngine::default().with_final_tie_breaker(config.tie_breaker),
            config,
        }
    }

    /// Replaces the rule engine used to order the queue.
    pub fn with_engine(mut self, engine: RuleEngine) -> Self {
        self.engine = engine;
        self
    }

    /// Replaces the settings.
    ///
    /// Keeps the current rule engine; use [`from_config`](Self::from_config)
    /// to derive the engine from the settings.
    pub fn with_config(mut self, config: GreedyConfig) -> Self {
        self.config = config;
        self
    }

    /// Settings in use.
    pub fn config(&self) -> &GreedyConfig {
        &self.config
    }

    /// Builds a schedule meeting `demand` from `employees`.
    pub fn schedule(&self, employees: &[Employee], demand: &DemandMatrix) -> Result<Schedule> {
        self.schedule_with_cancel(employees, demand, &CancellationToken::new())
    }

    /// Builds a schedule, checking `cancel` before each cell.
    ///
    /// # Errors
    /// - [`ScheduleError::InvalidInput`] if the roster fails validation.
    /// - [`ScheduleError::NoCandidateAvailable`] if a cell cannot reach demand.
    /// - [`ScheduleError::Cancelled`] if `cancel` fires during the run.
    #[instrument(skip_all, fields(employees = employees.len(), demand_hours = demand.total_hours()))]
    pub fn schedule_with_cancel(
        &self,
        employees: &[Employee],
        demand: &DemandMatrix,
        cancel: &CancellationToken,
    ) -> Result<Schedule> {
        validate_input(employees).map_err(ScheduleError::InvalidInput)?;

        let mut run = GreedyRun::new(employees, demand, &self.config);
        for day in 0..DAYS_PER_WEEK {
            run.start_day(day, &self.engine);
            for hour in 0..HOURS_PER_DAY {
                if cancel.is_cancelled() {
                    warn!(day, hour, "greedy run cancelled");
                    return Err(ScheduleError::Cancelled);
                }
                run.fill_cell(day, hour).inspect_err(|e| warn!(%e, "greedy run failed"))?;
            }
        }

        let schedule = run.schedule;
        info!(
            assignments = schedule.assignment_count(),
            employees = schedule.employee_ids().len(),
            "greedy schedule complete"
        );
        Ok(schedule)
    }
}

impl Default for GreedyScheduler {
    fn default() -> Self {
        Self::new()
    }
}

type QueueEntry = Reverse<(usize, usize)>;

/// State of one greedy run.
struct GreedyRun<'a> {
    /// Per-run copy of the roster; availability grows as shifts are assigned.
    effective: Vec<Employee>,
    demand: &'a DemandMatrix,
    config: &'a GreedyConfig,
    schedule: Schedule,
    context: SchedulingContext,
    /// `(rank, index)` of employees without special properties.
    regular: BinaryHeap<QueueEntry>,
    /// `(rank, index)` of employees with special properties.
    special: BinaryHeap<QueueEntry>,
}

impl<'a> GreedyRun<'a> {
    fn new(employees: &[Employee], demand: &'a DemandMatrix, config: &'a GreedyConfig) -> Self {
        Self {
            effective: employees.to_vec(),
            demand,
            config,
            schedule: Schedule::new(),
            context: SchedulingContext::new(),
            regular: BinaryHeap::new(),
            special: BinaryHeap::new(),
        }
    }

    /// Re-ranks the whole roster and refills both queues.
    fn start_day(&mut self, day: usize, engine: &RuleEngine) {
        self.context.day = day;
        self.context.hour = 0;
        let ranks = engine.ranks(&self.effective, &self.context);

        self.regular.clear();
        self.special.clear();
        for (idx, rank) in ranks.into_iter().enumerate() {
            let entry = Reverse((rank, idx));
            if self.effective[idx].has_special_properties() {
                self.special.push(entry);
            } else {
                self.regular.push(entry);
            }
        }
    }

    fn fill_cell(&mut self, day: usize, hour: usize) -> Result<()> {
        self.context.hour = hour;
        let needed = self.demand.get(day, hour) as usize;
        if self.schedule.staffed(day, hour) >= needed {
            return Ok(());
        }

        let mut set_aside: Vec<QueueEntry> = Vec::new();

        let special_seats = needed.min(self.config.special_quota);
        while self.special_staffed(day, hour) < special_seats
            && self.schedule.staffed(day, hour) < needed
        {
            let Some(entry) = self.special.pop() else {
                break;
            };
            self.offer(entry, day, hour, &mut set_aside)?;
        }

        let mut result = Ok(());
        while self.schedule.staffed(day, hour) < needed {
            let Some(entry) = self.regular.pop().or_else(|| self.special.pop()) else {
                result = Err(ScheduleError::NoCandidateAvailable { day, hour });
                break;
            };
            if let Err(e) = self.offer(entry, day, hour, &mut set_aside) {
                result = Err(e);
                break;
            }
        }

        for entry in set_aside {
            let Reverse((_, idx)) = entry;
            if self.effective[idx].has_special_properties() {
                self.special.push(entry);
            } else {
                self.regular.push(entry);
            }
        }
        result
    }

    /// Assigns a shift to the popped employee, or sets them aside if they
    /// cannot work `(day, hour)`.
    fn offer(
        &mut self,
        entry: QueueEntry,
        day: usize,
        hour: usize,
        set_aside: &mut Vec<QueueEntry>,
    ) -> Result<()> {
        let Reverse((_, idx)) = entry;
        if self.effective[idx].is_available(day, hour) {
            self.assign(idx, day, hour)
        } else {
            set_aside.push(entry);
            Ok(())
        }
    }

    fn assign(&mut self, idx: usize, day: usize, start: usize) -> Result<()> {
        let employee = &self.effective[idx];
        let until_demand_met = self.config.shift_extent == ShiftExtent::UntilDemandMet;
        let end = rules::shift_end(start, |hour| {
            employee.is_available(day, hour)
                && (hour == start
                    || !until_demand_met
                    || self.schedule.staffed(day, hour) < self.demand.get(day, hour) as usize)
        });

        let id = employee.id.clone();
        self.schedule.add_shift(&id, day, start, end)?;
        self.context.record_assignment(&id, end - start);
        debug!(employee = %id, day, start, end, "assigned shift");

        let employee = &mut self.effective[idx];
        // One shift per day
        employee.add_constraint(day, start, HOURS_PER_DAY)?;

        let next = rules::rest_block_next_day(end - 1);
        if !next.is_empty() {
            employee.add_constraint(next_day(day), next.start, next.end)?;
        }
        let previous = rules::rest_block_previous_day(start);
        if !previous.is_empty() {
            employee.add_constraint(previous_day(day), previous.start, previous.end)?;
        }
        Ok(())
    }

    fn special_staffed(&self, day: usize, hour: usize) -> usize {
        self.schedule
            .employees_at(day, hour)
            .filter(|id| {
                self.effective
                    .iter()
                    .any(|e| e.id == *id && e.has_special_properties())
            })
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatching::rules as dispatch_rules;
    use crate::rules::{audit, DemandMode};

    fn open_roster(n: usize) -> Vec<Employee> {
        (0..n).map(|i| Employee::new(format!("e{i}"))).collect()
    }

    fn maximal() -> GreedyScheduler {
        GreedyScheduler::from_config(GreedyConfig::default().with_shift_extent(ShiftExtent::Maximal))
    }

    #[test]
    fn test_single_cell_gets_maximal_shift() {
        let roster = open_roster(1);
        let mut demand = DemandMatrix::new();
        demand.set(0, 9, 1).unwrap();

        let schedule = maximal().schedule(&roster, &demand).unwrap();
        assert_eq!(schedule.hours_on("e0", 0), (9..17).collect::<Vec<_>>());
    }

    #[test]
    fn test_default_stops_when_demand_met() {
        let roster = open_roster(1);
        let mut demand = DemandMatrix::new();
        demand.set_range(0, 9, 13, 1).unwrap();

        assert_eq!(GreedyConfig::default().shift_extent, ShiftExtent::UntilDemandMet);
        let schedule = GreedyScheduler::new().schedule(&roster, &demand).unwrap();
        assert_eq!(schedule.hours_on("e0", 0), vec![9, 10, 11, 12]);
        assert!(audit(&schedule, &roster, &demand, DemandMode::Exact).is_empty());
    }

    #[test]
    fn test_shift_stops_at_blocked_hour() {
        let roster = vec![Employee::new("e0").with_blocked(0, 12, 14)];
        let mut demand = DemandMatrix::new();
        demand.set(0, 9, 1).unwrap();

        let schedule = maximal().schedule(&roster, &demand).unwrap();
        assert_eq!(schedule.hours_on("e0", 0), vec![9, 10, 11]);
    }

    #[test]
    fn test_priority_decides_who_works() {
        let roster = vec![
            Employee::new("a").with_priority(5),
            Employee::new("b").with_priority(1),
        ];
        let mut demand = DemandMatrix::new();
        demand.set(2, 0, 1).unwrap();

        let schedule = GreedyScheduler::new().schedule(&roster, &demand).unwrap();
        assert!(schedule.is_assigned("b", 2, 0));
        assert!(!schedule.is_assigned("a", 2, 0));
    }

    #[test]
    fn test_unavailable_employee_is_set_aside_for_the_cell_only() {
        let roster = vec![
            Employee::new("a").with_priority(0).with_blocked(0, 0, 3),
            Employee::new("b").with_priority(1),
        ];
        let mut demand = DemandMatrix::new();
        demand.set(0, 0, 1).unwrap();
        demand.set(0, 3, 1).unwrap();

        let schedule = GreedyScheduler::new().schedule(&roster, &demand).unwrap();
        assert!(schedule.is_assigned("b", 0, 0));
        assert!(schedule.is_assigned("a", 0, 3));
    }

    #[test]
    fn test_one_shift_per_day() {
        let roster = open_roster(1);
        let mut demand = DemandMatrix::new();
        demand.set(0, 0, 1).unwrap();
        demand.set(0, 12, 1).unwrap();

        let err = GreedyScheduler::new().schedule(&roster, &demand).unwrap_err();
        assert!(matches!(err, ScheduleError::NoCandidateAvailable { day: 0, hour: 12 }));
    }

    #[test]
    fn test_rest_blocks_next_morning() {
        let roster = open_roster(2);
        let mut demand = DemandMatrix::new();
        demand.set(0, 20, 1).unwrap();
        demand.set(1, 0, 1).unwrap();

        let schedule = maximal().schedule(&roster, &demand).unwrap();
        // e0 works until the last hour, so e1 covers the next morning
        assert!(schedule.is_assigned("e0", 0, 21));
        assert!(schedule.is_assigned("e1", 1, 0));
        assert!(!schedule.is_assigned("e0", 1, 0));
    }

    #[test]
    fn test_rest_wraps_to_saturday() {
        let roster = open_roster(1);
        let mut demand = DemandMatrix::new();
        demand.set(0, 0, 1).unwrap();
        demand.set(6, 21, 1).unwrap();

        let err = GreedyScheduler::new().schedule(&roster, &demand).unwrap_err();
        assert!(matches!(err, ScheduleError::NoCandidateAvailable { day: 6, hour: 21 }));
    }

    #[test]
    fn test_special_employees_take_quota_first() {
        let roster = vec![
            Employee::new("a"),
            Employee::new("b"),
            Employee::new("z").with_special_property("keyholder"),
        ];
        let mut demand = DemandMatrix::new();
        demand.set(3, 5, 1).unwrap();

        let schedule = GreedyScheduler::new().schedule(&roster, &demand).unwrap();
        assert!(schedule.is_assigned("z", 3, 5));
        assert_eq!(schedule.staffed(3, 5), 1);
    }

    #[test]
    fn test_zero_quota_uses_regular_queue() {
        let roster = vec![
            Employee::new("a"),
            Employee::new("z").with_special_property("keyholder"),
        ];
        let mut demand = DemandMatrix::new();
        demand.set(3, 5, 1).unwrap();

        let config = GreedyConfig::default().with_special_quota(0);
        let schedule = GreedyScheduler::from_config(config)
            .schedule(&roster, &demand)
            .unwrap();
        assert!(schedule.is_assigned("a", 3, 5));
    }

    #[test]
    fn test_general_pass_falls_back_to_specials() {
        let roster = vec![
            Employee::new("a"),
            Employee::new("y").with_special_property("first-aid"),
            Employee::new("z").with_special_property("keyholder"),
        ];
        let mut demand = DemandMatrix::new();
        demand.set(0, 0, 3).unwrap();

        let config = GreedyConfig::default().with_special_quota(1);
        let schedule = GreedyScheduler::from_config(config)
            .schedule(&roster, &demand)
            .unwrap();
        assert_eq!(schedule.staffed(0, 0), 3);
    }

    #[test]
    fn test_empty_roster_fails_on_first_demand() {
        let mut demand = DemandMatrix::new();
        demand.set(0, 0, 1).unwrap();
        let err = GreedyScheduler::new().schedule(&[], &demand).unwrap_err();
        assert!(matches!(err, ScheduleError::NoCandidateAvailable { day: 0, hour: 0 }));
    }

    #[test]
    fn test_roster_is_not_mutated() {
        let roster = open_roster(2);
        let demand = DemandMatrix::uniform(1);
        let before = roster.clone();
        let _ = GreedyScheduler::new().schedule(&roster, &demand);
        assert_eq!(roster, before);
    }

    #[test]
    fn test_invalid_roster_rejected() {
        let roster = vec![Employee::new("e0"), Employee::new("e0")];
        let err = GreedyScheduler::new()
            .schedule(&roster, &DemandMatrix::new())
            .unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidInput(_)));
    }

    #[test]
    fn test_cancelled_before_first_cell() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = GreedyScheduler::new()
            .schedule_with_cancel(&open_roster(1), &DemandMatrix::new(), &cancel)
            .unwrap_err();
        assert!(matches!(err, ScheduleError::Cancelled));
    }

    #[test]
    fn test_full_week_respects_every_rule() {
        let roster = open_roster(12);
        let demand = DemandMatrix::uniform(2);

        let schedule = GreedyScheduler::new().schedule(&roster, &demand).unwrap();
        assert!(audit(&schedule, &roster, &demand, DemandMode::AtLeast).is_empty());
    }

    #[test]
    fn test_least_assigned_hours_spreads_work() {
        let roster = open_roster(3);
        let mut demand = DemandMatrix::new();
        for day in 0..DAYS_PER_WEEK {
            demand.set(day, 9, 1).unwrap();
        }

        let engine = RuleEngine::new().with_rule(dispatch_rules::LeastAssignedHours);
        let schedule = maximal()
            .with_engine(engine)
            .schedule(&roster, &demand)
            .unwrap();
        let hours = schedule.hours_by_employee();
        assert_eq!(hours.len(), 3);
        assert!(hours.values().all(|&h| h >= 16));
    }
}
