//! Hard constraints shared by both schedulers.
//!
//! The greedy scheduler and the exact solver are structurally different,
//! but they must agree on what a legal week of work looks like. The
//! predicates here are the single definition of those rules; both
//! algorithms and [`audit`] are built on them.
//!
//! # Rules
//!
//! | Rule | Definition |
//! |------|-----------|
//! | Availability | No hour covered by a blocked window |
//! | Shift length | Contiguous run `<= 8` hours, and `<= 8` hours per day |
//! | No gaps | Hours `h` and `h + 2` worked implies `h + 1` worked |
//! | Rest | Last hour `H` on day `d` forbids hours `h < H + 8 - 22` on day `d + 1` |
//!
//! The week is cyclic: Saturday's late hours restrict Sunday's early hours.

use std::collections::HashMap;
use std::ops::Range;

use crate::models::time_grid::{
    next_day, DAYS_PER_WEEK, HOURS_PER_DAY, MAX_SHIFT_HOURS, REST_HOURS,
};
use crate::models::{DemandMatrix, Employee, Schedule, Violation, ViolationType};

/// How demand is compared against staffing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DemandMode {
    /// Staffing must equal demand in every cell.
    #[default]
    Exact,
    /// Staffing must be at least demand in every cell.
    AtLeast,
}

/// Whether working `last_hour` on one day and `next_hour` on the following
/// day leaves less than [`REST_HOURS`] between them.
#[inline]
pub fn rest_conflicts(last_hour: usize, next_hour: usize) -> bool {
    next_hour + HOURS_PER_DAY < last_hour + REST_HOURS
}

/// Hours of the following day blocked by working `last_hour` today.
///
/// Empty unless `last_hour` falls in the final `REST_HOURS - 1` hours of the day.
pub fn rest_block_next_day(last_hour: usize) -> Range<usize> {
    0..(last_hour + REST_HOURS).saturating_sub(HOURS_PER_DAY)
}

/// Hours of the previous day blocked by working `first_hour` today.
pub fn rest_block_previous_day(first_hour: usize) -> Range<usize> {
    let from = first_hour + HOURS_PER_DAY + 1 - REST_HOURS;
    from.min(HOURS_PER_DAY)..HOURS_PER_DAY
}

/// End (exclusive) of the longest legal shift starting at `start_hour`.
///
/// Scans forward while `is_open(hour)` holds, stopping after
/// [`MAX_SHIFT_HOURS`] hours or at the end of the day. Returns
/// `start_hour` if the first hour is not open.
pub fn shift_end(start_hour: usize, mut is_open: impl FnMut(usize) -> bool) -> usize {
    let limit = (start_hour + MAX_SHIFT_HOURS).min(HOURS_PER_DAY);
    let mut end = start_hour;
    while end < limit && is_open(end) {
        end += 1;
    }
    end
}

/// Whether `hours` (ascending, one day) contains a one-hour hole.
///
/// Returns the first missing hour if so.
pub fn find_gap(hours: &[usize]) -> Option<usize> {
    hours
        .windows(2)
        .find(|pair| pair[1] == pair[0] + 2)
        .map(|pair| pair[0] + 1)
}

/// Longest contiguous run in `hours` (ascending, one day), with its start.
pub fn longest_run(hours: &[usize]) -> Option<(usize, usize)> {
    let mut best: Option<(usize, usize)> = None;
    let mut run_start = *hours.first()?;
    let mut run_len = 1;
    for pair in hours.windows(2) {
        if pair[1] == pair[0] + 1 {
            run_len += 1;
        } else {
            run_start = pair[1];
            run_len = 1;
        }
        if best.map_or(true, |(_, len)| run_len > len) {
            best = Some((run_start, run_len));
        }
    }
    best.or(Some((run_start, run_len)))
}

/// Checks a schedule against demand and every hard constraint.
///
/// Availability is checked against the employees as given, so pass the
/// roster as it was before the run.
pub fn audit(
    schedule: &Schedule,
    employees: &[Employee],
    demand: &DemandMatrix,
    mode: DemandMode,
) -> Vec<Violation> {
    let mut violations = Vec::new();

    for day in 0..DAYS_PER_WEEK {
        for hour in 0..HOURS_PER_DAY {
            let needed = demand.get(day, hour) as usize;
            let staffed = schedule.staffed(day, hour);
            if staffed < needed {
                violations.push(Violation::new(
                    ViolationType::Understaffed,
                    None,
                    day,
                    hour,
                    format!("needed {needed}, staffed {staffed}"),
                ));
            } else if staffed > needed && mode == DemandMode::Exact {
                violations.push(Violation::new(
                    ViolationType::Overstaffed,
                    None,
                    day,
                    hour,
                    format!("needed {needed}, staffed {staffed}"),
                ));
            }
        }
    }

    let by_id: HashMap<&str, &Employee> = employees.iter().map(|e| (e.id.as_str(), e)).collect();
    for id in schedule.employee_ids() {
        match by_id.get(id) {
            Some(employee) => audit_employee(schedule, employee, &mut violations),
            None => violations.push(Violation::new(
                ViolationType::UnknownEmployee,
                Some(id),
                0,
                0,
                format!("'{id}' is not on the roster"),
            )),
        }
    }

    violations
}

fn audit_employee(schedule: &Schedule, employee: &Employee, violations: &mut Vec<Violation>) {
    let id = employee.id.as_str();
    let week: Vec<Vec<usize>> = (0..DAYS_PER_WEEK)
        .map(|day| schedule.hours_on(id, day))
        .collect();

    for (day, hours) in week.iter().enumerate() {
        for &hour in hours {
            if !employee.is_available(day, hour) {
                violations.push(Violation::new(
                    ViolationType::Unavailable,
                    Some(id),
                    day,
                    hour,
                    format!("'{id}' is blocked at day {day}, hour {hour}"),
                ));
            }
        }

        if hours.len() > MAX_SHIFT_HOURS {
            violations.push(Violation::new(
                ViolationType::DailyHoursExceeded,
                Some(id),
                day,
                hours[0],
                format!("'{id}' works {} hours on day {day}", hours.len()),
            ));
        }

        if let Some((start, len)) = longest_run(hours) {
            if len > MAX_SHIFT_HOURS {
                violations.push(Violation::new(
                    ViolationType::ShiftTooLong,
                    Some(id),
                    day,
                    start,
                    format!("'{id}' works {len} consecutive hours from hour {start}"),
                ));
            }
        }

        if let Some(gap) = find_gap(hours) {
            violations.push(Violation::new(
                ViolationType::GapInShift,
                Some(id),
                day,
                gap,
                format!("'{id}' has a one-hour gap at day {day}, hour {gap}"),
            ));
        }

        let (Some(&last), Some(&first_next)) = (hours.last(), week[next_day(day)].first()) else {
            continue;
        };
        if rest_conflicts(last, first_next) {
            violations.push(Violation::new(
                ViolationType::RestViolation,
                Some(id),
                next_day(day),
                first_next,
                format!(
                    "'{id}' starts at hour {first_next} on day {} after working until hour {last}",
                    next_day(day)
                ),
            ));
        }
    }
}
