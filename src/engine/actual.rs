use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::models::{DailyActualEntry, RecordWork};

/// Roll work sessions up into one actual entry per day.
///
/// Sessions are bucketed by the UTC date they started on. Time is summed per
/// day; progress accumulates across days and stops at 100.
pub fn daily_actuals(records: &[RecordWork]) -> Vec<DailyActualEntry> {
    let mut days: BTreeMap<NaiveDate, (f64, f64)> = BTreeMap::new();
    for r in records {
        let day = days.entry(r.start_at.date_naive()).or_insert((0.0, 0.0));
        day.0 += r.progress_value.unwrap_or(0.0).max(0.0);
        day.1 += r.work_time.unwrap_or(0).max(0) as f64;
    }

    let mut cumulative = 0.0;
    days.into_iter()
        .map(|(target_date, (progress, time))| {
            cumulative = f64::min(cumulative + progress, 100.0);
            DailyActualEntry {
                target_date,
                work_actual_value: cumulative,
                time_actual_value: time,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn record(start: &str, progress: Option<f64>, minutes: Option<i64>) -> RecordWork {
        let start_at: DateTime<Utc> = DateTime::parse_from_rfc3339(start).unwrap().into();
        RecordWork {
            id: "r".into(),
            task_id: "t".into(),
            start_at,
            end_at: start_at,
            progress_value: progress,
            work_time: minutes,
            note: None,
            created_by: "me".into(),
            last_updated_user: None,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn test_groups_by_start_day() {
        let records = vec![
            record("2024-01-02T09:00:00Z", Some(10.0), Some(30)),
            record("2024-01-01T22:00:00Z", Some(5.0), Some(45)),
            record("2024-01-02T20:00:00Z", None, Some(15)),
        ];
        let out = daily_actuals(&records);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].target_date.to_string(), "2024-01-01");
        assert_eq!(out[0].work_actual_value, 5.0);
        assert_eq!(out[0].time_actual_value, 45.0);
        assert_eq!(out[1].work_actual_value, 15.0);
        assert_eq!(out[1].time_actual_value, 45.0);
    }

    #[test]
    fn test_local_offset_counts_in_utc() {
        let out = daily_actuals(&[record("2024-01-02T07:00:00+09:00", Some(1.0), None)]);
        assert_eq!(out[0].target_date.to_string(), "2024-01-01");
        assert_eq!(out[0].time_actual_value, 0.0);
    }

    #[test]
    fn test_progress_capped() {
        let out = daily_actuals(&[
            record("2024-01-01T10:00:00Z", Some(80.0), None),
            record("2024-01-02T10:00:00Z", Some(50.0), None),
        ]);
        assert_eq!(out[1].work_actual_value, 100.0);
    }
}
