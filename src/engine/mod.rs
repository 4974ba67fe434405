//! Daily-plan allocation and reconciliation.
//!
//! Everything in here is a pure function over plain data: no I/O, no logging,
//! no shared state.

pub mod actual;
pub mod allocator;
pub mod cumulative;
pub mod edit;
pub mod lag;
pub mod merge;
pub mod policy;
pub mod skeleton;
pub mod validate;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PlanError;
use crate::models::DailyPlanEntry;

pub use edit::{apply_edit, apply_edits, ChartEdit, EditField, EditMode};
pub use policy::PlanPolicy;
pub use validate::{check_range, validate, PlanRange, MAX_TARGET_TIME};

/// Which series a generation run overwrites. The other keeps its seeded
/// values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationTarget {
    #[default]
    Both,
    WorkOnly,
    TimeOnly,
}

impl AllocationTarget {
    fn work(&self) -> bool {
        matches!(self, Self::Both | Self::WorkOnly)
    }

    fn time(&self) -> bool {
        matches!(self, Self::Both | Self::TimeOnly)
    }
}

#[derive(Debug, Clone)]
pub struct PlanRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub target_time: i64,
    pub policy: PlanPolicy,
    pub existing_items: Vec<DailyPlanEntry>,
    pub target: AllocationTarget,
}

/// Build a daily plan: skeleton, policy weights, then integer allocation of
/// 100% work (stored cumulatively) and of the time budget (stored per day).
pub fn generate_plan(req: &PlanRequest) -> Result<Vec<DailyPlanEntry>, PlanError> {
    let skeleton = skeleton::build(req.start_date, req.end_date, &req.existing_items)?;
    let weights = policy::weights(&req.policy, &skeleton)?;

    let mut entries = skeleton;
    if req.target.work() {
        let increments = allocator::allocate(&weights, 100)?;
        entries = cumulative::project_increments(&entries, &increments);
    }
    if req.target.time() {
        let time = allocator::allocate(&weights, req.target_time)?;
        for (entry, t) in entries.iter_mut().zip(time) {
            entry.time_plan_value = t as f64;
        }
    }
    Ok(entries)
}

/// Parse a calendar date. Accepts `YYYY-MM-DD` or an RFC 3339 timestamp,
/// which is reduced to its UTC date.
pub fn parse_date(s: &str) -> Result<NaiveDate, PlanError> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Ok(ts.with_timezone(&Utc).date_naive());
    }
    Err(PlanError::InvalidDateRange(format!("cannot parse date '{s}'")))
}

/// Parse a point in time. Accepts RFC 3339, or a naive
/// `YYYY-MM-DD[T ]HH:MM[:SS]` read as UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn request(start: &str, end: &str, target_time: i64, policy: PlanPolicy) -> PlanRequest {
        PlanRequest {
            start_date: d(start),
            end_date: d(end),
            target_time,
            policy,
            existing_items: Vec::new(),
            target: AllocationTarget::Both,
        }
    }

    fn range_of(req: &PlanRequest) -> PlanRange {
        PlanRange {
            start_date: Some(req.start_date),
            end_date: Some(req.end_date),
            target_time: req.target_time,
        }
    }

    #[test]
    fn test_three_day_equal_scenario() {
        let req = request("2024-01-01", "2024-01-03", 10, PlanPolicy::Equal);
        let plan = generate_plan(&req).unwrap();
        let work: Vec<f64> = plan.iter().map(|e| e.work_plan_value).collect();
        let time: Vec<f64> = plan.iter().map(|e| e.time_plan_value).collect();
        assert_eq!(work, vec![34.0, 67.0, 100.0]);
        assert_eq!(time, vec![4.0, 3.0, 3.0]);
        assert_eq!(cumulative::to_increments(&plan), vec![34.0, 33.0, 33.0]);
        assert_eq!(validate(&range_of(&req), &plan), Ok(()));
    }

    #[test]
    fn test_five_day_equal_time() {
        let req = request("2024-01-01", "2024-01-05", 17, PlanPolicy::Equal);
        let plan = generate_plan(&req).unwrap();
        let time: Vec<f64> = plan.iter().map(|e| e.time_plan_value).collect();
        assert_eq!(time, vec![4.0, 4.0, 3.0, 3.0, 3.0]);
    }

    #[test]
    fn test_weekday_weekend_zero_target() {
        // Fri, Sat, Sun, Mon, Tue: 3 weekdays, 2 weekend days
        let policy = PlanPolicy::WeekdayWeekend {
            weekday_ratio: 1.0,
            weekend_ratio: 2.0,
        };
        let req = request("2024-01-05", "2024-01-09", 0, policy);
        let plan = generate_plan(&req).unwrap();
        assert!(plan.iter().all(|e| e.time_plan_value == 0.0));
        let work: Vec<f64> = plan.iter().map(|e| e.work_plan_value).collect();
        assert_eq!(work, vec![15.0, 44.0, 72.0, 86.0, 100.0]);
        assert_eq!(validate(&range_of(&req), &plan), Ok(()));
    }

    #[test]
    fn test_time_only_keeps_edited_work() {
        let mut req = request("2024-01-01", "2024-01-03", 10, PlanPolicy::Equal);
        req.existing_items = vec![
            DailyPlanEntry { target_date: d("2024-01-01"), work_plan_value: 10.0, time_plan_value: 9.0 },
            DailyPlanEntry { target_date: d("2024-01-02"), work_plan_value: 50.0, time_plan_value: 0.0 },
            DailyPlanEntry { target_date: d("2024-01-03"), work_plan_value: 100.0, time_plan_value: 0.0 },
        ];
        req.target = AllocationTarget::TimeOnly;
        let plan = generate_plan(&req).unwrap();
        let work: Vec<f64> = plan.iter().map(|e| e.work_plan_value).collect();
        let time: Vec<f64> = plan.iter().map(|e| e.time_plan_value).collect();
        assert_eq!(work, vec![10.0, 50.0, 100.0]);
        assert_eq!(time, vec![4.0, 3.0, 3.0]);
    }

    #[test]
    fn test_work_only_keeps_time() {
        let mut req = request("2024-01-01", "2024-01-02", 5, PlanPolicy::Equal);
        req.existing_items = vec![DailyPlanEntry {
            target_date: d("2024-01-02"),
            work_plan_value: 0.0,
            time_plan_value: 5.0,
        }];
        req.target = AllocationTarget::WorkOnly;
        let plan = generate_plan(&req).unwrap();
        assert_eq!(plan[0].time_plan_value, 0.0);
        assert_eq!(plan[1].time_plan_value, 5.0);
        assert_eq!(plan[1].work_plan_value, 100.0);
    }

    #[test]
    fn test_negative_target_rejected() {
        let req = request("2024-01-01", "2024-01-02", -3, PlanPolicy::Equal);
        assert!(matches!(
            generate_plan(&req),
            Err(PlanError::InvalidDistribution(_))
        ));
    }

    #[test]
    fn test_parse_date_forms() {
        assert_eq!(parse_date("2024-03-09").unwrap(), d("2024-03-09"));
        assert_eq!(parse_date("2024-03-09T00:30:00+01:00").unwrap(), d("2024-03-08"));
        assert!(parse_date("03/09/2024").is_err());
    }

    #[test]
    fn test_parse_timestamp_forms() {
        let a = parse_timestamp("2024-03-09T10:00:00+09:00").unwrap();
        let b = parse_timestamp("2024-03-09 01:00").unwrap();
        assert_eq!(a, b);
        assert!(parse_timestamp("yesterday").is_none());
    }

    fn any_policy() -> impl Strategy<Value = PlanPolicy> {
        prop_oneof![
            Just(PlanPolicy::Equal),
            (0.1f64..5.0, 0.1f64..5.0).prop_map(|(a, b)| PlanPolicy::WeekdayWeekend {
                weekday_ratio: a,
                weekend_ratio: b,
            }),
            prop::array::uniform7(0.1f64..5.0).prop_map(|ratios| PlanPolicy::PerWeekday { ratios }),
        ]
    }

    proptest! {
        #[test]
        fn prop_round_trip_validates(
            offset in 0i64..3000,
            days in 0i64..400,
            target_time in 0i64..10_000,
            policy in any_policy(),
        ) {
            let start = d("2020-01-01") + chrono::Duration::days(offset);
            let req = PlanRequest {
                start_date: start,
                end_date: start + chrono::Duration::days(days),
                target_time,
                policy,
                existing_items: Vec::new(),
                target: AllocationTarget::Both,
            };
            let plan = generate_plan(&req).unwrap();
            prop_assert_eq!(plan.len() as i64, days + 1);
            prop_assert!(plan.windows(2).all(|w| w[0].work_plan_value <= w[1].work_plan_value));
            prop_assert_eq!(plan.last().unwrap().work_plan_value, 100.0);
            prop_assert_eq!(validate(&range_of(&req), &plan), Ok(()));
        }
    }
}
