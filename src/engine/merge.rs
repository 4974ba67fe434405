use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::models::{DailyActualEntry, DailyPlanEntry, MergedDay};

/// Align a plan series and an actual series by date.
///
/// Every date that appears on either side yields one row, in ascending order.
/// The missing side reads as zero. Dates absent from both inputs are not
/// filled in.
pub fn merge(plan: &[DailyPlanEntry], actual: &[DailyActualEntry]) -> Vec<MergedDay> {
    let mut rows: BTreeMap<NaiveDate, MergedDay> = BTreeMap::new();

    for p in plan {
        let row = rows.entry(p.target_date).or_insert_with(|| blank(p.target_date));
        row.work_plan_value = p.work_plan_value;
        row.time_plan_value = p.time_plan_value;
    }
    for a in actual {
        let row = rows.entry(a.target_date).or_insert_with(|| blank(a.target_date));
        row.work_actual_value = a.work_actual_value;
        row.time_actual_value = a.time_actual_value;
    }

    rows.into_values().collect()
}

fn blank(target_date: NaiveDate) -> MergedDay {
    MergedDay {
        target_date,
        work_plan_value: 0.0,
        time_plan_value: 0.0,
        work_actual_value: 0.0,
        time_actual_value: 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn plan(date: &str, work: f64, time: f64) -> DailyPlanEntry {
        DailyPlanEntry {
            target_date: d(date),
            work_plan_value: work,
            time_plan_value: time,
        }
    }

    fn actual(date: &str, work: f64, time: f64) -> DailyActualEntry {
        DailyActualEntry {
            target_date: d(date),
            work_actual_value: work,
            time_actual_value: time,
        }
    }

    #[test]
    fn test_empty() {
        assert!(merge(&[], &[]).is_empty());
    }

    #[test]
    fn test_union_sorted_with_zero_defaults() {
        let p = vec![plan("2024-01-03", 100.0, 3.0), plan("2024-01-01", 34.0, 4.0)];
        let a = vec![actual("2024-01-02", 20.0, 60.0), actual("2024-01-01", 10.0, 30.0)];
        let rows = merge(&p, &a);
        let dates: Vec<_> = rows.iter().map(|r| r.target_date.to_string()).collect();
        assert_eq!(dates, vec!["2024-01-01", "2024-01-02", "2024-01-03"]);

        assert_eq!(rows[0].work_plan_value, 34.0);
        assert_eq!(rows[0].time_actual_value, 30.0);
        // actual only
        assert_eq!(rows[1].work_plan_value, 0.0);
        assert_eq!(rows[1].time_plan_value, 0.0);
        assert_eq!(rows[1].work_actual_value, 20.0);
        // plan only
        assert_eq!(rows[2].work_actual_value, 0.0);
        assert_eq!(rows[2].time_actual_value, 0.0);
    }

    #[test]
    fn test_no_gap_filling() {
        let p = vec![plan("2024-01-01", 50.0, 1.0), plan("2024-01-10", 100.0, 1.0)];
        assert_eq!(merge(&p, &[]).len(), 2);
    }

    #[test]
    fn test_swapping_sides_swaps_fields() {
        let p = vec![plan("2024-01-01", 34.0, 4.0), plan("2024-01-03", 100.0, 3.0)];
        let a = vec![actual("2024-01-02", 20.0, 60.0), actual("2024-01-01", 10.0, 30.0)];

        let swapped_plan: Vec<DailyPlanEntry> = a
            .iter()
            .map(|x| plan(&x.target_date.to_string(), x.work_actual_value, x.time_actual_value))
            .collect();
        let swapped_actual: Vec<DailyActualEntry> = p
            .iter()
            .map(|x| actual(&x.target_date.to_string(), x.work_plan_value, x.time_plan_value))
            .collect();

        let forward = merge(&p, &a);
        let backward = merge(&swapped_plan, &swapped_actual);
        assert_eq!(forward.len(), backward.len());
        for (f, b) in forward.iter().zip(&backward) {
            assert_eq!(f.target_date, b.target_date);
            assert_eq!(f.work_plan_value, b.work_actual_value);
            assert_eq!(f.time_plan_value, b.time_actual_value);
            assert_eq!(f.work_actual_value, b.work_plan_value);
            assert_eq!(f.time_actual_value, b.time_plan_value);
        }
    }
}
