use serde::{Deserialize, Serialize};

use crate::engine::cumulative::{clamp_time, clamp_work, round_tenth};
use crate::error::PlanError;
use crate::models::DailyPlanEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditField {
    Work,
    Time,
}

impl EditField {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "work" => Some(Self::Work),
            "time" => Some(Self::Time),
            _ => None,
        }
    }
}

/// Drag edits snap to whole numbers; typed values keep one decimal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditMode {
    Drag,
    Entry,
}

/// A point edit delivered by a chart: set `field` of slot `index` to `value`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartEdit {
    pub index: usize,
    pub field: EditField,
    pub value: f64,
    pub mode: EditMode,
}

/// Apply one edit and return the updated list. The input is left untouched,
/// and applying the same edit twice gives the same result as applying it once.
///
/// Work is a cumulative value and is stored as given (clamped to 0..=100);
/// time is a per-day value clamped at 0.
pub fn apply_edit(
    entries: &[DailyPlanEntry],
    edit: &ChartEdit,
) -> Result<Vec<DailyPlanEntry>, PlanError> {
    if edit.index >= entries.len() {
        return Err(PlanError::InvalidEdit(format!(
            "index {} is out of range for a plan of {} days",
            edit.index,
            entries.len()
        )));
    }

    let rounded = match edit.mode {
        EditMode::Drag => edit.value.round(),
        EditMode::Entry => round_tenth(edit.value),
    };

    let mut next = entries.to_vec();
    let slot = &mut next[edit.index];
    match edit.field {
        EditField::Work => slot.work_plan_value = clamp_work(rounded),
        EditField::Time => slot.time_plan_value = clamp_time(rounded),
    }
    Ok(next)
}

/// Fold a sequence of edits, stopping at the first invalid one.
pub fn apply_edits(
    entries: &[DailyPlanEntry],
    edits: &[ChartEdit],
) -> Result<Vec<DailyPlanEntry>, PlanError> {
    edits
        .iter()
        .try_fold(entries.to_vec(), |state, edit| apply_edit(&state, edit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn plan() -> Vec<DailyPlanEntry> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        [(34.0, 4.0), (67.0, 3.0), (100.0, 3.0)]
            .iter()
            .enumerate()
            .map(|(i, (w, t))| DailyPlanEntry {
                target_date: start + chrono::Duration::days(i as i64),
                work_plan_value: *w,
                time_plan_value: *t,
            })
            .collect()
    }

    fn edit(index: usize, field: EditField, value: f64, mode: EditMode) -> ChartEdit {
        ChartEdit {
            index,
            field,
            value,
            mode,
        }
    }

    #[test]
    fn test_drag_rounds_and_clamps() {
        let before = plan();
        let out = apply_edit(&before, &edit(1, EditField::Work, 72.6, EditMode::Drag)).unwrap();
        assert_eq!(out[1].work_plan_value, 73.0);
        assert_eq!(before[1].work_plan_value, 67.0);

        let out = apply_edit(&before, &edit(0, EditField::Work, 140.0, EditMode::Drag)).unwrap();
        assert_eq!(out[0].work_plan_value, 100.0);

        let out = apply_edit(&before, &edit(2, EditField::Time, -4.0, EditMode::Drag)).unwrap();
        assert_eq!(out[2].time_plan_value, 0.0);
    }

    #[test]
    fn test_entry_keeps_one_decimal() {
        let out = apply_edit(&plan(), &edit(0, EditField::Time, 2.54, EditMode::Entry)).unwrap();
        assert_eq!(out[0].time_plan_value, 2.5);
        assert_eq!(out[0].work_plan_value, 34.0);
    }

    #[test]
    fn test_idempotent() {
        let e = edit(1, EditField::Time, 5.0, EditMode::Drag);
        let once = apply_edit(&plan(), &e).unwrap();
        let twice = apply_edit(&once, &e).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_out_of_range() {
        let err = apply_edit(&plan(), &edit(3, EditField::Work, 1.0, EditMode::Drag)).unwrap_err();
        assert!(matches!(err, PlanError::InvalidEdit(_)));
    }

    #[test]
    fn test_sequence() {
        let edits = [
            edit(0, EditField::Time, 5.0, EditMode::Entry),
            edit(1, EditField::Time, 2.0, EditMode::Entry),
            edit(2, EditField::Time, 3.0, EditMode::Entry),
        ];
        let out = apply_edits(&plan(), &edits).unwrap();
        let times: Vec<f64> = out.iter().map(|e| e.time_plan_value).collect();
        assert_eq!(times, vec![5.0, 2.0, 3.0]);
    }
}
