use chrono::NaiveDate;

use crate::error::PlanError;
use crate::models::DailyPlanEntry;

/// The task-level facts a plan is checked against.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanRange {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub target_time: i64,
}

/// Largest accepted `target_time`. Keeps every total exactly representable
/// as `f64` so sums compare without drift.
pub const MAX_TARGET_TIME: i64 = 1_000_000_000;

/// Slack for float noise when summing one-decimal values.
const EPSILON: f64 = 1e-6;

/// Gate a plan before it is persisted. Checks run in a fixed order and stop
/// at the first failure.
///
/// The last work value must be 100 and the time values must sum to
/// `target_time`, both up to float noise only.
pub fn validate(range: &PlanRange, items: &[DailyPlanEntry]) -> Result<(), PlanError> {
    check_range(range)?;

    let last = items
        .iter()
        .max_by_key(|e| e.target_date)
        .ok_or(PlanError::PlanNotGenerated)?;
    if !close(last.work_plan_value, 100.0) {
        return Err(PlanError::WorkSumMismatch(last.work_plan_value));
    }

    let time_sum: f64 = items.iter().map(|e| e.time_plan_value).sum();
    if !close(time_sum, range.target_time as f64) {
        return Err(PlanError::TimeSumMismatch {
            target: range.target_time,
            actual: time_sum,
        });
    }
    Ok(())
}

/// The task-level half of [`validate`]: dates present and ordered, target not
/// negative. Returns the dates so callers can go on to allocate.
pub fn check_range(range: &PlanRange) -> Result<(NaiveDate, NaiveDate), PlanError> {
    let (start, end) = match (range.start_date, range.end_date) {
        (Some(s), Some(e)) => (s, e),
        _ => return Err(PlanError::MissingDateRange),
    };
    if end < start {
        return Err(PlanError::InvertedDateRange {
            start: start.to_string(),
            end: end.to_string(),
        });
    }
    if range.target_time < 0 {
        return Err(PlanError::NegativeTarget(range.target_time));
    }
    if range.target_time > MAX_TARGET_TIME {
        return Err(PlanError::InvalidDistribution(format!(
            "target time must be at most {MAX_TARGET_TIME} (got {})",
            range.target_time
        )));
    }
    Ok((start, end))
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= EPSILON
}
