use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{DailyActualEntry, DailyPlanEntry, MergedDay};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LagReason {
    ProgressBehindPlan,
    WorkTimeBehindPlan,
}

impl LagReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProgressBehindPlan => "progress behind plan",
            Self::WorkTimeBehindPlan => "work time behind plan",
        }
    }
}

/// Decide whether a task is behind its plan as of `today`. Only entries on or
/// before `today` count. Progress is checked before time.
pub fn lag_reason(
    plan: &[DailyPlanEntry],
    actual: &[DailyActualEntry],
    today: NaiveDate,
) -> Option<LagReason> {
    let planned_work = plan
        .iter()
        .filter(|e| e.target_date <= today)
        .max_by_key(|e| e.target_date)
        .map_or(0.0, |e| e.work_plan_value);
    let actual_work = actual
        .iter()
        .filter(|e| e.target_date <= today)
        .max_by_key(|e| e.target_date)
        .map_or(0.0, |e| e.work_actual_value);
    if planned_work > actual_work {
        return Some(LagReason::ProgressBehindPlan);
    }

    let planned_time: f64 = plan
        .iter()
        .filter(|e| e.target_date <= today)
        .map(|e| e.time_plan_value)
        .sum();
    let actual_time: f64 = actual
        .iter()
        .filter(|e| e.target_date <= today)
        .map(|e| e.time_actual_value)
        .sum();
    if planned_time > actual_time {
        return Some(LagReason::WorkTimeBehindPlan);
    }
    None
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TimeTotals {
    pub planned: f64,
    pub actual: f64,
}

pub fn totals(rows: &[MergedDay]) -> TimeTotals {
    rows.iter().fold(TimeTotals::default(), |acc, r| TimeTotals {
        planned: acc.planned + r.time_plan_value,
        actual: acc.actual + r.time_actual_value,
    })
}
