use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One planned day. `work_plan_value` is cumulative, `time_plan_value` is
/// per day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPlanEntry {
    pub target_date: NaiveDate,
    pub work_plan_value: f64,
    pub time_plan_value: f64,
}

impl DailyPlanEntry {
    pub fn empty(target_date: NaiveDate) -> Self {
        Self {
            target_date,
            work_plan_value: 0.0,
            time_plan_value: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyActualEntry {
    pub target_date: NaiveDate,
    pub work_actual_value: f64,
    pub time_actual_value: f64,
}

/// Plan and actual values aligned on one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedDay {
    pub target_date: NaiveDate,
    pub work_plan_value: f64,
    pub time_plan_value: f64,
    pub work_actual_value: f64,
    pub time_actual_value: f64,
}
