//! Scheduling runs over a shared roster.
//!
//! A run reads and then rewrites the roster, so two runs, or a run and a
//! roster edit, must never interleave. [`SchedulingSession`] holds the
//! roster behind a mutex and every run takes it with `try_lock` for the
//! whole run and commit: a second caller gets
//! [`ScheduleError::RosterBusy`] instead of waiting.
//!
//! Runs are blocking and can be long (the exact solver is exponential in
//! the worst case). [`SchedulingSession::run_in_background`] moves a run
//! onto tokio's blocking pool; [`CancellationToken`] stops it early.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{info, instrument};

use crate::config::{Algorithm, SchedulerConfig};
use crate::cp::ExactScheduler;
use crate::error::{Result, ScheduleError};
use crate::finalize::{finalize, EmployeeStore};
use crate::models::{DemandMatrix, Employee};
use crate::scheduler::{GreedyScheduler, ScheduleKpi};

/// Cooperative cancellation flag shared between a caller and a run.
///
/// Clones share the flag. The greedy scheduler checks it before every
/// cell; the exact solver before every search node.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a token that has not fired.
    pub fn new() -> Self {
        Self::default()
    }

    /// Asks every run holding a clone of this token to stop.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Whether [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Summary of a committed run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Algorithm that produced the schedule.
    pub algorithm: Algorithm,
    /// Staffing metrics of the schedule.
    pub kpi: ScheduleKpi,
    /// Employee-hours folded into the roster.
    pub committed_hours: usize,
    /// Whether the store accepted the roster.
    pub saved: bool,
}

/// A roster plus the settings and store used to schedule it.
///
/// Cloning is cheap and clones share the roster and the store.
#[derive(Clone)]
pub struct SchedulingSession {
    roster: Arc<Mutex<Vec<Employee>>>,
    store: Arc<dyn EmployeeStore>,
    config: SchedulerConfig,
    week_start: Option<jiff::civil::Date>,
}

impl SchedulingSession {
    /// Creates a session over `roster`, persisting through `store`.
    pub fn new(roster: Vec<Employee>, store: Arc<dyn EmployeeStore>) -> Self {
        Self {
            roster: Arc::new(Mutex::new(roster)),
            store,
            config: SchedulerConfig::default(),
            week_start: None,
        }
    }

    /// Sets the scheduler settings.
    pub fn with_config(mut self, config: SchedulerConfig) -> Self {
        self.config = config;
        self
    }

    /// Dates committed shifts with the calendar week beginning at `week_start`.
    pub fn with_week_start(mut self, week_start: jiff::civil::Date) -> Self {
        self.week_start = Some(week_start);
        self
    }

    /// Settings in use.
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Shared handle to the roster.
    pub fn roster(&self) -> Arc<Mutex<Vec<Employee>>> {
        Arc::clone(&self.roster)
    }

    /// Copy of the roster.
    ///
    /// # Errors
    /// [`ScheduleError::RosterBusy`] while a run holds the roster.
    pub fn snapshot(&self) -> Result<Vec<Employee>> {
        self.edit_roster(|roster| roster.clone())
    }

    /// Applies `edit` to the roster, unless a run currently holds it.
    ///
    /// # Errors
    /// [`ScheduleError::RosterBusy`] while a run holds the roster.
    pub fn edit_roster<T>(&self, edit: impl FnOnce(&mut Vec<Employee>) -> T) -> Result<T> {
        let mut roster = self.roster.try_lock().ok_or(ScheduleError::RosterBusy)?;
        Ok(edit(&mut roster))
    }

    /// Schedules the roster with the configured algorithm and commits the
    /// result: shifts are folded into the roster and the roster is saved.
    ///
    /// The roster is locked for the whole run. On any error nothing is
    /// committed.
    #[instrument(skip_all, fields(algorithm = ?self.config.algorithm))]
    pub fn run(&self, demand: &DemandMatrix, cancel: &CancellationToken) -> Result<RunOutcome> {
        let mut roster = self.roster.try_lock().ok_or(ScheduleError::RosterBusy)?;

        let algorithm = self.config.algorithm;
        let schedule = match algorithm {
            Algorithm::Greedy => GreedyScheduler::from_config(self.config.greedy)
                .schedule_with_cancel(&roster, demand, cancel)?,
            Algorithm::Exact => ExactScheduler::new()
                .with_config(self.config.solver)
                .schedule_with_cancel(&roster, demand, cancel)?,
        };

        let kpi = ScheduleKpi::calculate(&schedule, demand);
        let committed_hours = schedule.assignment_count();
        let saved = finalize(schedule, &mut roster, self.week_start, self.store.as_ref())?;

        info!(committed_hours, saved, coverage = kpi.coverage_rate, "run committed");
        Ok(RunOutcome {
            algorithm,
            kpi,
            committed_hours,
            saved,
        })
    }

    /// Runs [`run`](Self::run) on tokio's blocking pool.
    ///
    /// # Errors
    /// As [`run`](Self::run), plus [`ScheduleError::Background`] if the
    /// blocking task panics or is aborted.
    pub async fn run_in_background(
        &self,
        demand: DemandMatrix,
        cancel: CancellationToken,
    ) -> Result<RunOutcome> {
        let session = self.clone();
        tokio::task::spawn_blocking(move || session.run(&demand, &cancel))
            .await
            .map_err(|e| ScheduleError::Background(e.to_string()))?
    }
}

impl std::fmt::Debug for SchedulingSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchedulingSession")
            .field("config", &self.config)
            .field("week_start", &self.week_start)
            .field("locked", &self.roster.is_locked())
            .finish()
    }
}
