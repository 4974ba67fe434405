use std::collections::HashSet;

use chrono::NaiveDate;
use rusqlite::{params, Connection};
use tracing::debug;

use crate::engine::{self, PlanRange};
use crate::error::ClimblyError;
use crate::models::{DailyPlanEntry, Task};

pub fn get_daily_plans(conn: &Connection, task_id: &str) -> Result<Vec<DailyPlanEntry>, ClimblyError> {
    let mut stmt = conn.prepare(
        "SELECT target_date, work_plan_value, time_plan_value
         FROM daily_plans WHERE task_id = ?1 ORDER BY target_date ASC",
    )?;
    let entries = stmt
        .query_map(params![task_id], |row| {
            Ok(DailyPlanEntry {
                target_date: row.get(0)?,
                work_plan_value: row.get(1)?,
                time_plan_value: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(entries)
}

#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct BulkResult {
    pub upserted: usize,
    pub pruned: usize,
}

/// Replace a task's plan with `items`: upsert by date, then drop dates the
/// new set no longer has. The plan is validated against the task first, so a
/// plan that breaks its invariants never reaches the table.
///
/// Callers are expected to wrap this in a transaction.
pub fn replace_daily_plans(
    conn: &Connection,
    task: &Task,
    items: &[DailyPlanEntry],
) -> Result<BulkResult, ClimblyError> {
    let range = PlanRange {
        start_date: Some(task.start_date),
        end_date: Some(task.end_date),
        target_time: task.target_time,
    };
    engine::validate(&range, items)?;

    let existing: HashSet<NaiveDate> = get_daily_plans(conn, &task.id)?
        .into_iter()
        .map(|e| e.target_date)
        .collect();
    let incoming: HashSet<NaiveDate> = items.iter().map(|e| e.target_date).collect();

    for item in items {
        conn.execute(
            "INSERT INTO daily_plans (task_id, target_date, work_plan_value, time_plan_value)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (task_id, target_date) DO UPDATE SET
                work_plan_value = excluded.work_plan_value,
                time_plan_value = excluded.time_plan_value,
                updated_at = datetime('now')",
            params![task.id, item.target_date, item.work_plan_value, item.time_plan_value],
        )?;
    }

    let mut pruned = 0;
    for date in existing.difference(&incoming) {
        pruned += conn.execute(
            "DELETE FROM daily_plans WHERE task_id = ?1 AND target_date = ?2",
            params![task.id, date],
        )?;
    }

    debug!(task_id = %task.id, upserted = items.len(), pruned, "replaced daily plan");
    Ok(BulkResult {
        upserted: items.len(),
        pruned,
    })
}

/// Planned time per date summed over several tasks, optionally bounded.
pub fn aggregate_time_plan(
    conn: &Connection,
    task_ids: &[String],
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<Vec<DailyPlanEntry>, ClimblyError> {
    let mut stmt = conn.prepare(
        "SELECT target_date, SUM(time_plan_value) FROM daily_plans
         WHERE task_id = ?1
           AND (?2 IS NULL OR target_date >= ?2)
           AND (?3 IS NULL OR target_date <= ?3)
         GROUP BY target_date",
    )?;
    let mut totals: std::collections::BTreeMap<NaiveDate, f64> = Default::default();
    for id in task_ids {
        let rows = stmt.query_map(params![id, from, to], |row| {
            Ok((row.get::<_, NaiveDate>(0)?, row.get::<_, f64>(1)?))
        })?;
        for row in rows {
            let (date, time) = row?;
            *totals.entry(date).or_insert(0.0) += time;
        }
    }
    Ok(totals
        .into_iter()
        .map(|(target_date, time)| DailyPlanEntry {
            target_date,
            work_plan_value: 0.0,
            time_plan_value: time,
        })
        .collect())
}
