//! Schedule quality metrics (KPIs).
//!
//! Computes staffing indicators from a completed schedule and the demand
//! it was built for.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Demand Hours | Sum of demand over all cells |
//! | Assigned Hours | Employee-hours in the schedule |
//! | Coverage Rate | Demand hours met / demand hours |
//! | Understaffed Cells | Cells with staffing below demand |
//! | Overstaffed Cells | Cells with staffing above demand |
//! | Excess Hours | Employee-hours above demand |

use std::collections::BTreeMap;

use crate::models::time_grid::{DAYS_PER_WEEK, HOURS_PER_DAY};
use crate::models::{DemandMatrix, Schedule};

/// Schedule performance indicators.
#[derive(Debug, Clone)]
pub struct ScheduleKpi {
    /// Sum of demand over all cells.
    pub demand_hours: u64,
    /// Employee-hours assigned.
    pub assigned_hours: u64,
    /// Demand hours met (staffing capped at demand per cell).
    pub covered_hours: u64,
    /// Fraction of demand met (0.0..1.0); 1.0 when there is no demand.
    pub coverage_rate: f64,
    /// Cells staffed below demand.
    pub understaffed_cells: usize,
    /// Cells staffed above demand.
    pub overstaffed_cells: usize,
    /// Employee-hours above demand.
    pub excess_hours: u64,
    /// Hours per employee.
    pub hours_by_employee: BTreeMap<String, usize>,
    /// Mean hours over employees appearing in the schedule.
    pub avg_hours_per_employee: f64,
}

impl ScheduleKpi {
    /// Computes KPIs from a schedule and its demand.
    pub fn calculate(schedule: &Schedule, demand: &DemandMatrix) -> Self {
        let mut covered_hours: u64 = 0;
        let mut excess_hours: u64 = 0;
        let mut understaffed_cells = 0;
        let mut overstaffed_cells = 0;

        for day in 0..DAYS_PER_WEEK {
            for hour in 0..HOURS_PER_DAY {
                let needed = u64::from(demand.get(day, hour));
                let staffed = schedule.staffed(day, hour) as u64;
                covered_hours += staffed.min(needed);
                if staffed < needed {
                    understaffed_cells += 1;
                } else if staffed > needed {
                    overstaffed_cells += 1;
                    excess_hours += staffed - needed;
                }
            }
        }

        let demand_hours = demand.total_hours();
        let coverage_rate = if demand_hours == 0 {
            1.0
        } else {
            covered_hours as f64 / demand_hours as f64
        };

        let hours_by_employee: BTreeMap<String, usize> = schedule
            .hours_by_employee()
            .into_iter()
            .map(|(id, hours)| (id.to_string(), hours))
            .collect();
        let avg_hours_per_employee = if hours_by_employee.is_empty() {
            0.0
        } else {
            hours_by_employee.values().sum::<usize>() as f64 / hours_by_employee.len() as f64
        };

        Self {
            demand_hours,
            assigned_hours: schedule.assignment_count() as u64,
            covered_hours,
            coverage_rate,
            understaffed_cells,
            overstaffed_cells,
            excess_hours,
            hours_by_employee,
            avg_hours_per_employee,
        }
    }

    /// Whether every cell is staffed exactly to demand.
    pub fn is_exact(&self) -> bool {
        self.understaffed_cells == 0 && self.overstaffed_cells == 0
    }

    /// Whether the schedule meets the given quality thresholds.
    pub fn meets_thresholds(&self, min_coverage: f64, max_excess_hours: u64) -> bool {
        self.coverage_rate >= min_coverage && self.excess_hours <= max_excess_hours
    }
}
