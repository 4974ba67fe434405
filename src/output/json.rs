use serde_json::{json, Value};

use crate::db::daily_plan_repo::BulkResult;
use crate::db::task_repo::TaskCounts;
use crate::engine::lag::{LagReason, TimeTotals};
use crate::error::ClimblyError;
use crate::models::{DailyPlanEntry, MergedDay, RecordWork, Task, TaskAuth};

pub fn success(data: Value) -> Value {
    json!({
        "success": true,
        "data": data
    })
}

pub fn error(err: &ClimblyError) -> Value {
    json!({
        "success": false,
        "error": {
            "code": err.code.as_str(),
            "message": err.message
        }
    })
}

/// Print an envelope to stdout.
pub fn print(envelope: &Value) {
    let text = serde_json::to_string_pretty(envelope).unwrap_or_else(|_| envelope.to_string());
    println!("{text}");
}

pub fn task_summary(t: &Task) -> Value {
    json!({
        "id": t.id,
        "name": t.name,
        "category": t.category.as_str(),
        "status": t.status.as_str(),
        "start_date": t.start_date,
        "end_date": t.end_date,
        "target_time": t.target_time
    })
}

pub fn task_detail(t: &Task) -> Value {
    json!({
        "id": t.id,
        "name": t.name,
        "content": t.content,
        "category": t.category.as_str(),
        "status": t.status.as_str(),
        "start_date": t.start_date,
        "end_date": t.end_date,
        "target_time": t.target_time,
        "comment": t.comment,
        "created_by": t.created_by,
        "created_at": t.created_at,
        "updated_at": t.updated_at
    })
}

pub fn plan_items(items: &[DailyPlanEntry]) -> Value {
    json!(items
        .iter()
        .map(|e| json!({
            "target_date": e.target_date,
            "work_plan_value": e.work_plan_value,
            "time_plan_value": e.time_plan_value
        }))
        .collect::<Vec<_>>())
}

pub fn merged_rows(rows: &[MergedDay]) -> Value {
    json!(rows
        .iter()
        .map(|r| json!({
            "target_date": r.target_date,
            "work_plan_value": r.work_plan_value,
            "time_plan_value": r.time_plan_value,
            "work_actual_value": r.work_actual_value,
            "time_actual_value": r.time_actual_value
        }))
        .collect::<Vec<_>>())
}

pub fn record_json(r: &RecordWork) -> Value {
    json!({
        "id": r.id,
        "task_id": r.task_id,
        "start_at": r.start_at,
        "end_at": r.end_at,
        "progress_value": r.progress_value,
        "work_time": r.work_time,
        "note": r.note,
        "created_by": r.created_by,
        "last_updated_user": r.last_updated_user
    })
}

pub fn auth_json(a: &TaskAuth) -> Value {
    json!({
        "task_id": a.task_id,
        "user": a.user,
        "role": a.role.as_str()
    })
}

pub fn bulk_json(r: &BulkResult) -> Value {
    json!({
        "upserted": r.upserted,
        "pruned": r.pruned
    })
}

pub fn counts_json(c: &TaskCounts) -> Value {
    json!({
        "total": c.total,
        "active": c.active,
        "completed": c.completed,
        "paused": c.paused,
        "cancelled": c.cancelled
    })
}

pub fn totals_json(t: &TimeTotals) -> Value {
    json!({
        "planned": t.planned,
        "actual": t.actual
    })
}

pub fn lagging_json(t: &Task, reason: LagReason) -> Value {
    json!({
        "id": t.id,
        "name": t.name,
        "reason": reason.as_str()
    })
}
