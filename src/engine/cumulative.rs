use crate::models::DailyPlanEntry;

/// Replace each slot's work increment with the running total up to and
/// including that slot. Entries must already be in date order.
pub fn to_cumulative(entries: &[DailyPlanEntry]) -> Vec<DailyPlanEntry> {
    let mut running = 0.0;
    entries
        .iter()
        .map(|e| {
            running += e.work_plan_value;
            DailyPlanEntry {
                work_plan_value: running,
                ..e.clone()
            }
        })
        .collect()
}

/// Recover per-day work increments from a cumulative series by
/// differencing neighbours. The first increment is the first value.
pub fn to_increments(entries: &[DailyPlanEntry]) -> Vec<f64> {
    let mut prev = 0.0;
    entries
        .iter()
        .map(|e| {
            let inc = e.work_plan_value - prev;
            prev = e.work_plan_value;
            inc
        })
        .collect()
}

/// Write `increments` into the work field of `entries`, then accumulate.
pub fn project_increments(entries: &[DailyPlanEntry], increments: &[u64]) -> Vec<DailyPlanEntry> {
    let flat: Vec<DailyPlanEntry> = entries
        .iter()
        .zip(increments)
        .map(|(e, inc)| DailyPlanEntry {
            work_plan_value: *inc as f64,
            ..e.clone()
        })
        .collect();
    to_cumulative(&flat)
}

pub fn clamp_work(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    value.clamp(0.0, 100.0)
}

pub fn clamp_time(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    value.max(0.0)
}

pub fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn series(work: &[f64]) -> Vec<DailyPlanEntry> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        work.iter()
            .enumerate()
            .map(|(i, w)| DailyPlanEntry {
                target_date: start + chrono::Duration::days(i as i64),
                work_plan_value: *w,
                time_plan_value: 1.0,
            })
            .collect()
    }

    #[test]
    fn test_running_sum() {
        let out = to_cumulative(&series(&[34.0, 33.0, 33.0]));
        let work: Vec<f64> = out.iter().map(|e| e.work_plan_value).collect();
        assert_eq!(work, vec![34.0, 67.0, 100.0]);
        assert!(out.iter().all(|e| e.time_plan_value == 1.0));
    }

    #[test]
    fn test_increments_invert_cumulative() {
        let cum = to_cumulative(&series(&[10.0, 0.0, 45.0, 45.0]));
        assert_eq!(to_increments(&cum), vec![10.0, 0.0, 45.0, 45.0]);
    }

    #[test]
    fn test_increments_after_manual_edit() {
        let inc = to_increments(&series(&[20.0, 15.0, 100.0]));
        assert_eq!(inc, vec![20.0, -5.0, 85.0]);
    }

    #[test]
    fn test_project_increments() {
        let out = project_increments(&series(&[0.0, 0.0]), &[60, 40]);
        assert_eq!(out[0].work_plan_value, 60.0);
        assert_eq!(out[1].work_plan_value, 100.0);
    }

    #[test]
    fn test_clamps() {
        assert_eq!(clamp_work(120.0), 100.0);
        assert_eq!(clamp_work(-3.0), 0.0);
        assert_eq!(clamp_work(f64::NAN), 0.0);
        assert_eq!(clamp_time(1e9), 1e9);
        assert_eq!(clamp_time(-0.5), 0.0);
        assert_eq!(round_tenth(2.345), 2.3);
        assert_eq!(round_tenth(2.36), 2.4);
    }
}
