use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::PlanError;
use crate::models::DailyPlanEntry;

/// How work and time are spread over the days of a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanPolicy {
    Equal,
    WeekdayWeekend {
        weekday_ratio: f64,
        weekend_ratio: f64,
    },
    /// Ratios indexed by day of week, Sunday first.
    PerWeekday { ratios: [f64; 7] },
}

impl Default for PlanPolicy {
    fn default() -> Self {
        Self::Equal
    }
}

impl PlanPolicy {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Equal => "equal",
            Self::WeekdayWeekend { .. } => "weekday_weekend",
            Self::PerWeekday { .. } => "per_weekday",
        }
    }

    fn check(&self) -> Result<(), PlanError> {
        match self {
            Self::Equal => Ok(()),
            Self::WeekdayWeekend {
                weekday_ratio,
                weekend_ratio,
            } => {
                check_ratios(&[*weekday_ratio, *weekend_ratio])?;
                if *weekday_ratio <= 0.0 && *weekend_ratio <= 0.0 {
                    return Err(PlanError::InvalidPolicyConfig(
                        "weekday and weekend ratios cannot both be zero".into(),
                    ));
                }
                Ok(())
            }
            Self::PerWeekday { ratios } => {
                check_ratios(ratios)?;
                if ratios.iter().all(|r| *r <= 0.0) {
                    return Err(PlanError::InvalidPolicyConfig(
                        "at least one weekday ratio must be positive".into(),
                    ));
                }
                Ok(())
            }
        }
    }

    fn weight_for(&self, date: NaiveDate) -> f64 {
        match self {
            Self::Equal => 1.0,
            Self::WeekdayWeekend {
                weekday_ratio,
                weekend_ratio,
            } => match weekday_index(date) {
                0 | 6 => *weekend_ratio,
                _ => *weekday_ratio,
            },
            Self::PerWeekday { ratios } => ratios[weekday_index(date)],
        }
    }
}

fn check_ratios(ratios: &[f64]) -> Result<(), PlanError> {
    match ratios.iter().find(|r| !r.is_finite() || **r < 0.0) {
        Some(bad) => Err(PlanError::InvalidPolicyConfig(format!(
            "ratios must be non-negative numbers (got {bad})"
        ))),
        None => Ok(()),
    }
}

/// Day of week of a calendar date, 0 = Sunday .. 6 = Saturday.
pub fn weekday_index(date: NaiveDate) -> usize {
    date.weekday().num_days_from_sunday() as usize
}

/// One weight per skeleton slot under `policy`.
pub fn weights(policy: &PlanPolicy, skeleton: &[DailyPlanEntry]) -> Result<Vec<f64>, PlanError> {
    policy.check()?;
    Ok(skeleton
        .iter()
        .map(|e| policy.weight_for(e.target_date))
        .collect())
}
