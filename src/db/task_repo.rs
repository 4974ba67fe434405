use chrono::NaiveDate;
use rusqlite::{params, Connection};

use crate::error::{ClimblyError, PlanError};
use crate::models::{Task, TaskCategory, TaskFields, TaskStatus};

const TASK_COLUMNS: &str = "id, name, content, category, status, start_date, end_date,
                target_time, comment, created_by, created_at, updated_at";

fn date_range(fields: &TaskFields) -> Result<(NaiveDate, NaiveDate), ClimblyError> {
    match (fields.start_date, fields.end_date) {
        (Some(start), Some(end)) => Ok((start, end)),
        _ => Err(PlanError::MissingDateRange.into()),
    }
}

pub fn create_task(
    conn: &Connection,
    id: &str,
    fields: &TaskFields,
    created_by: &str,
) -> Result<Task, ClimblyError> {
    let (start, end) = date_range(fields)?;
    conn.execute(
        "INSERT INTO tasks (id, name, content, category, status, start_date, end_date,
                            target_time, comment, created_by)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            id,
            fields.name,
            fields.content,
            fields.category.as_str(),
            fields.status.as_str(),
            start,
            end,
            fields.target_time,
            fields.comment,
            created_by
        ],
    )?;
    get_task_by_id(conn, id)
}

pub fn get_task_by_id(conn: &Connection, id: &str) -> Result<Task, ClimblyError> {
    conn.query_row(
        &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
        params![id],
        row_to_task,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => ClimblyError::task_not_found(id),
        _ => ClimblyError::from(e),
    })
}

/// Resolve a task by exact ID, then by unique ID prefix.
pub fn resolve_task(conn: &Connection, reference: &str) -> Result<Task, ClimblyError> {
    if let Ok(task) = get_task_by_id(conn, reference) {
        return Ok(task);
    }

    let mut stmt = conn.prepare(&format!(
        "SELECT {TASK_COLUMNS} FROM tasks WHERE id LIKE ?1 ORDER BY id"
    ))?;
    let prefix = format!("{reference}%");
    let mut tasks: Vec<Task> = stmt
        .query_map(params![prefix], row_to_task)?
        .collect::<Result<Vec<_>, _>>()?;

    match tasks.len() {
        0 => Err(ClimblyError::task_not_found(reference)),
        1 => Ok(tasks.remove(0)),
        _ => {
            let candidates: Vec<String> = tasks.iter().map(|t| format!("{} ({})", t.name, t.id)).collect();
            Err(ClimblyError::ambiguous_ref(reference, &candidates))
        }
    }
}

/// Tasks the user created or has been granted access to.
pub fn list_visible_tasks(
    conn: &Connection,
    user: &str,
    status: Option<TaskStatus>,
) -> Result<Vec<Task>, ClimblyError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TASK_COLUMNS} FROM tasks
         WHERE (created_by = ?1
                OR id IN (SELECT task_id FROM task_auths WHERE user = ?1))
           AND (?2 IS NULL OR status = ?2)
         ORDER BY start_date ASC, created_at ASC"
    ))?;
    let tasks = stmt
        .query_map(params![user, status.map(|s| s.as_str())], row_to_task)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(tasks)
}

pub fn update_task(conn: &Connection, id: &str, fields: &TaskFields) -> Result<Task, ClimblyError> {
    let (start, end) = date_range(fields)?;
    let changed = conn.execute(
        "UPDATE tasks SET name = ?1, content = ?2, category = ?3, status = ?4,
                start_date = ?5, end_date = ?6, target_time = ?7, comment = ?8,
                updated_at = datetime('now')
         WHERE id = ?9",
        params![
            fields.name,
            fields.content,
            fields.category.as_str(),
            fields.status.as_str(),
            start,
            end,
            fields.target_time,
            fields.comment,
            id
        ],
    )?;
    if changed == 0 {
        return Err(ClimblyError::task_not_found(id));
    }
    get_task_by_id(conn, id)
}

pub fn delete_task(conn: &Connection, id: &str) -> Result<(), ClimblyError> {
    let changed = conn.execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
    if changed == 0 {
        return Err(ClimblyError::task_not_found(id));
    }
    Ok(())
}

#[derive(Debug, Default, Clone, serde::Serialize)]
pub struct TaskCounts {
    pub total: i64,
    pub active: i64,
    pub completed: i64,
    pub paused: i64,
    pub cancelled: i64,
}

/// Status counts over the tasks visible to a user.
pub fn task_counts(conn: &Connection, user: &str) -> Result<TaskCounts, ClimblyError> {
    let mut stmt = conn.prepare(
        "SELECT status, COUNT(*) FROM tasks
         WHERE created_by = ?1 OR id IN (SELECT task_id FROM task_auths WHERE user = ?1)
         GROUP BY status",
    )?;
    let mut counts = TaskCounts::default();
    let rows = stmt.query_map(params![user], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
    })?;
    for row in rows {
        let (status, count) = row?;
        match TaskStatus::from_str(&status) {
            Some(TaskStatus::Active) => counts.active = count,
            Some(TaskStatus::Completed) => counts.completed = count,
            Some(TaskStatus::Paused) => counts.paused = count,
            Some(TaskStatus::Cancelled) => counts.cancelled = count,
            None => {}
        }
    }
    counts.total = counts.active + counts.completed + counts.paused + counts.cancelled;
    Ok(counts)
}

fn row_to_task(row: &rusqlite::Row) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        name: row.get(1)?,
        content: row.get(2)?,
        category: TaskCategory::from_str(&row.get::<_, String>(3)?).unwrap_or(TaskCategory::Other),
        status: TaskStatus::from_str(&row.get::<_, String>(4)?).unwrap_or(TaskStatus::Active),
        start_date: row.get(5)?,
        end_date: row.get(6)?,
        target_time: row.get(7)?,
        comment: row.get(8)?,
        created_by: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}
