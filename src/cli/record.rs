use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde_json::json;
use tracing::info;

use crate::cli::commands::RecordCommands;
use crate::cli::{emit, finish, parse_opt_date, Ctx};
use crate::db::record_repo::{self, RecordInput};
use crate::db::{auth_repo, connection, task_repo};
use crate::engine;
use crate::error::ClimblyError;
use crate::models::{RecordWork, Role};
use crate::output;

pub fn run(cmd: RecordCommands, ctx: &Ctx) -> i32 {
    let result = match cmd {
        RecordCommands::Add {
            task,
            start,
            end,
            progress,
            work_time,
            note,
        } => run_add_args(&task, &start, &end, progress, work_time, note, ctx),
        RecordCommands::List { task, from, to } => {
            run_list(task.as_deref(), from.as_deref(), to.as_deref(), ctx)
        }
        RecordCommands::Update {
            id,
            start,
            end,
            progress,
            work_time,
            note,
        } => run_update_args(
            &id,
            start.as_deref(),
            end.as_deref(),
            progress,
            work_time,
            note,
            ctx,
        ),
        RecordCommands::Delete { id } => run_delete(&id, ctx),
    };
    finish(result, ctx.json)
}

fn parse_ts(s: &str) -> Result<DateTime<Utc>, ClimblyError> {
    engine::parse_timestamp(s).ok_or_else(|| {
        ClimblyError::validation(format!(
            "Invalid timestamp '{s}'. Use RFC 3339 or YYYY-MM-DD HH:MM (UTC)"
        ))
    })
}

/// Load a record and check the caller may change its task.
fn writable_record(conn: &Connection, reference: &str, user: &str) -> Result<RecordWork, ClimblyError> {
    let record = record_repo::resolve_record(conn, reference)?;
    let task = task_repo::get_task_by_id(conn, &record.task_id)?;
    auth_repo::require_role(conn, &task, user, Role::Write)?;
    Ok(record)
}

fn run_add_args(
    task: &str,
    start: &str,
    end: &str,
    progress: Option<f64>,
    work_time: Option<i64>,
    note: Option<String>,
    ctx: &Ctx,
) -> Result<i32, ClimblyError> {
    let input = RecordInput {
        start_at: Some(parse_ts(start)?),
        end_at: Some(parse_ts(end)?),
        progress_value: progress,
        work_time,
        note,
    };
    run_add(task, &input, ctx)
}

fn run_add(reference: &str, input: &RecordInput, ctx: &Ctx) -> Result<i32, ClimblyError> {
    let conn = connection::open_db()?;
    let task = task_repo::resolve_task(&conn, reference)?;
    auth_repo::require_role(&conn, &task, &ctx.user, Role::Write)?;

    let id = ulid::Ulid::new().to_string();
    let record = record_repo::create_record(&conn, &id, &task.id, input, &ctx.user)?;
    info!(record_id = %record.id, task_id = %task.id, "logged work");

    emit(
        ctx,
        json!({ "record": output::json::record_json(&record) }),
        || println!("Logged work on {}: {}", task.name, record.id),
    );
    Ok(0)
}

fn run_list(
    task: Option<&str>,
    from: Option<&str>,
    to: Option<&str>,
    ctx: &Ctx,
) -> Result<i32, ClimblyError> {
    let from = parse_opt_date(from)?;
    let to = parse_opt_date(to)?;
    let conn = connection::open_db()?;

    let tasks = match task {
        Some(reference) => {
            let task = task_repo::resolve_task(&conn, reference)?;
            auth_repo::require_role(&conn, &task, &ctx.user, Role::Read)?;
            vec![task]
        }
        None => task_repo::list_visible_tasks(&conn, &ctx.user, None)?,
    };
    let mut records = Vec::new();
    for t in &tasks {
        records.extend(record_repo::list_records_by_task(&conn, &t.id, from, to)?);
    }
    records.sort_by_key(|r| r.start_at);

    emit(
        ctx,
        json!({
            "records": records.iter().map(output::json::record_json).collect::<Vec<_>>()
        }),
        || output::text::print_record_list(&records),
    );
    Ok(0)
}

fn run_update_args(
    id: &str,
    start: Option<&str>,
    end: Option<&str>,
    progress: Option<f64>,
    work_time: Option<i64>,
    note: Option<String>,
    ctx: &Ctx,
) -> Result<i32, ClimblyError> {
    let input = RecordInput {
        start_at: start.map(parse_ts).transpose()?,
        end_at: end.map(parse_ts).transpose()?,
        progress_value: progress,
        work_time,
        note,
    };
    run_update(id, &input, ctx)
}

fn run_update(reference: &str, input: &RecordInput, ctx: &Ctx) -> Result<i32, ClimblyError> {
    let conn = connection::open_db()?;
    let record = writable_record(&conn, reference, &ctx.user)?;
    let updated = record_repo::update_record(&conn, &record.id, input, &ctx.user)?;
    info!(record_id = %updated.id, "updated record");

    emit(
        ctx,
        json!({ "record": output::json::record_json(&updated) }),
        || println!("Updated record: {}", updated.id),
    );
    Ok(0)
}

fn run_delete(reference: &str, ctx: &Ctx) -> Result<i32, ClimblyError> {
    let conn = connection::open_db()?;
    let record = writable_record(&conn, reference, &ctx.user)?;
    record_repo::delete_record(&conn, &record.id)?;
    info!(record_id = %record.id, "deleted record");

    emit(
        ctx,
        json!({ "deleted": { "id": record.id } }),
        || println!("Deleted record: {}", record.id),
    );
    Ok(0)
}
