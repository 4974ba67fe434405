use std::collections::HashMap;

use chrono::{Duration, NaiveDate};

use crate::engine::parse_date;
use crate::error::PlanError;
use crate::models::DailyPlanEntry;

/// Expand `start..=end` into one entry per calendar day.
///
/// Days that already have an entry in `existing` keep its values so a
/// policy can re-allocate one series without discarding the other.
pub fn build(
    start: NaiveDate,
    end: NaiveDate,
    existing: &[DailyPlanEntry],
) -> Result<Vec<DailyPlanEntry>, PlanError> {
    let days = (end - start).num_days() + 1;
    if days <= 0 {
        return Err(PlanError::InvalidDateRange(format!(
            "end date {end} is before start date {start}"
        )));
    }

    let seeds: HashMap<NaiveDate, &DailyPlanEntry> =
        existing.iter().map(|e| (e.target_date, e)).collect();

    let entries = (0..days)
        .map(|offset| {
            let date = start + Duration::days(offset);
            match seeds.get(&date) {
                Some(seed) => DailyPlanEntry {
                    target_date: date,
                    work_plan_value: seed.work_plan_value,
                    time_plan_value: seed.time_plan_value,
                },
                None => DailyPlanEntry::empty(date),
            }
        })
        .collect();
    Ok(entries)
}

/// Same as [`build`] for raw user input.
pub fn build_from_strings(
    start: &str,
    end: &str,
    existing: &[DailyPlanEntry],
) -> Result<Vec<DailyPlanEntry>, PlanError> {
    let start = parse_date(start)?;
    let end = parse_date(end)?;
    build(start, end, existing)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_one_slot_per_day_inclusive() {
        let out = build(d("2024-02-27"), d("2024-03-01"), &[]).unwrap();
        let dates: Vec<_> = out.iter().map(|e| e.target_date.to_string()).collect();
        assert_eq!(dates, vec!["2024-02-27", "2024-02-28", "2024-02-29", "2024-03-01"]);
        assert!(out.iter().all(|e| e.work_plan_value == 0.0 && e.time_plan_value == 0.0));
    }

    #[test]
    fn test_single_day() {
        let out = build(d("2024-01-01"), d("2024-01-01"), &[]).unwrap();
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_seeds_carried_over() {
        let existing = vec![
            DailyPlanEntry {
                target_date: d("2024-01-02"),
                work_plan_value: 40.0,
                time_plan_value: 2.5,
            },
            DailyPlanEntry {
                target_date: d("2023-12-31"),
                work_plan_value: 10.0,
                time_plan_value: 1.0,
            },
        ];
        let out = build(d("2024-01-01"), d("2024-01-03"), &existing).unwrap();
        assert_eq!(out.len(), 3);
        assert_eq!(out[0], DailyPlanEntry::empty(d("2024-01-01")));
        assert_eq!(out[1].work_plan_value, 40.0);
        assert_eq!(out[1].time_plan_value, 2.5);
        assert_eq!(out[2], DailyPlanEntry::empty(d("2024-01-03")));
    }

    #[test]
    fn test_inverted_range() {
        let err = build(d("2024-01-05"), d("2024-01-01"), &[]).unwrap_err();
        assert!(matches!(err, PlanError::InvalidDateRange(_)));
    }

    #[test]
    fn test_unparseable_input() {
        let err = build_from_strings("2024-13-01", "2024-12-31", &[]).unwrap_err();
        assert!(matches!(err, PlanError::InvalidDateRange(_)));
        let err = build_from_strings("", "2024-12-31", &[]).unwrap_err();
        assert!(matches!(err, PlanError::InvalidDateRange(_)));
    }

    #[test]
    fn test_timestamp_input_uses_utc_date() {
        let out = build_from_strings("2024-01-01T23:30:00-02:00", "2024-01-03", &[]).unwrap();
        assert_eq!(out[0].target_date, d("2024-01-02"));
        assert_eq!(out.len(), 2);
    }
}
