use std::collections::HashSet;
use std::io::Read;

use serde_json::json;
use tracing::{debug, info};

use crate::cli::commands::{PlanCommands, PolicyArgs};
use crate::cli::task::PlanItems;
use crate::cli::{emit, finish, range_of, Ctx};
use crate::db::{auth_repo, connection, daily_plan_repo, task_repo};
use crate::engine::{self, AllocationTarget, ChartEdit, EditField, EditMode, PlanRange, PlanRequest};
use crate::error::{ClimblyError, PlanError};
use crate::models::{DailyPlanEntry, Role, Task};
use crate::output;

pub fn run(cmd: PlanCommands, ctx: &Ctx) -> i32 {
    let result = match cmd {
        PlanCommands::Show { task } => run_show(&task, ctx),
        PlanCommands::Generate {
            task,
            policy,
            only,
            dry_run,
        } => run_generate(&task, &policy, only.as_deref(), dry_run, ctx),
        PlanCommands::Edit {
            task,
            set,
            drag,
            dry_run,
        } => run_edit(&task, &set, drag, dry_run, ctx),
        PlanCommands::Put { task } => run_put(&task, ctx),
    };
    finish(result, ctx.json)
}

/// Per-item checks the validator does not cover: value bounds, at most one
/// decimal, one entry per date, and every date inside the task's range.
pub(crate) fn check_items(range: &PlanRange, items: &[DailyPlanEntry]) -> Result<(), ClimblyError> {
    let mut seen = HashSet::new();
    for item in items {
        if !seen.insert(item.target_date) {
            return Err(ClimblyError::validation(format!(
                "Duplicate plan entry for {}",
                item.target_date
            )));
        }
        let work = item.work_plan_value;
        if !work.is_finite() || !(0.0..=100.0).contains(&work) {
            return Err(ClimblyError::validation(format!(
                "Work value on {} must be between 0 and 100 (got {work})",
                item.target_date
            )));
        }
        let time = item.time_plan_value;
        if !time.is_finite() || time < 0.0 {
            return Err(ClimblyError::validation(format!(
                "Time value on {} must not be negative (got {time})",
                item.target_date
            )));
        }
        if !has_one_decimal_at_most(work) || !has_one_decimal_at_most(time) {
            return Err(ClimblyError::validation(format!(
                "Plan values on {} allow at most one decimal (got work {work}, time {time})",
                item.target_date
            )));
        }
        let before = range.start_date.is_some_and(|s| item.target_date < s);
        let after = range.end_date.is_some_and(|e| item.target_date > e);
        if before || after {
            return Err(ClimblyError::validation(format!(
                "Plan entry {} is outside the task period",
                item.target_date
            )));
        }
    }
    Ok(())
}

fn has_one_decimal_at_most(value: f64) -> bool {
    let scaled = value * 10.0;
    (scaled - scaled.round()).abs() < 1e-6
}

fn parse_only(only: Option<&str>) -> Result<AllocationTarget, ClimblyError> {
    match only {
        None => Ok(AllocationTarget::Both),
        Some("work") => Ok(AllocationTarget::WorkOnly),
        Some("time") => Ok(AllocationTarget::TimeOnly),
        Some(other) => Err(ClimblyError::validation(format!(
            "Invalid --only '{other}'. Expected work or time"
        ))),
    }
}

/// Parse `INDEX:FIELD=VALUE`.
fn parse_edit(raw: &str, mode: EditMode) -> Result<ChartEdit, PlanError> {
    let invalid = || PlanError::InvalidEdit(format!("expected INDEX:FIELD=VALUE, got '{raw}'"));
    let (index, rest) = raw.split_once(':').ok_or_else(invalid)?;
    let (field, value) = rest.split_once('=').ok_or_else(invalid)?;
    let index = index.trim().parse::<usize>().map_err(|_| invalid())?;
    let field = EditField::from_str(field.trim()).ok_or_else(|| {
        PlanError::InvalidEdit(format!("unknown field '{}', expected work or time", field.trim()))
    })?;
    let value = value.trim().parse::<f64>().map_err(|_| invalid())?;
    Ok(ChartEdit {
        index,
        field,
        value,
        mode,
    })
}

/// Resolve the task and check the caller holds `needed` on it.
fn load_task(conn: &rusqlite::Connection, reference: &str, user: &str, needed: Role) -> Result<Task, ClimblyError> {
    let task = task_repo::resolve_task(conn, reference)?;
    auth_repo::require_role(conn, &task, user, needed)?;
    Ok(task)
}

fn save_plan(
    conn: &rusqlite::Connection,
    task: &Task,
    plan: &[DailyPlanEntry],
    dry_run: bool,
    ctx: &Ctx,
) -> Result<i32, ClimblyError> {
    let bulk = if dry_run {
        None
    } else {
        Some(connection::with_transaction(conn, |conn| {
            daily_plan_repo::replace_daily_plans(conn, task, plan)
        })?)
    };
    if let Some(bulk) = &bulk {
        info!(task_id = %task.id, upserted = bulk.upserted, pruned = bulk.pruned, "saved plan");
    }

    let mut data = json!({
        "task_id": task.id,
        "dry_run": dry_run,
        "items": output::json::plan_items(plan)
    });
    if let Some(bulk) = &bulk {
        data["plan_write"] = output::json::bulk_json(bulk);
    }
    emit(ctx, data, || {
        output::text::print_plan(plan);
        match &bulk {
            Some(bulk) => println!("Saved plan: {} days, {} removed", bulk.upserted, bulk.pruned),
            None => println!("Dry run: plan not saved"),
        }
    });
    Ok(0)
}

fn run_show(reference: &str, ctx: &Ctx) -> Result<i32, ClimblyError> {
    let conn = connection::open_db()?;
    let task = load_task(&conn, reference, &ctx.user, Role::Read)?;
    let plan = daily_plan_repo::get_daily_plans(&conn, &task.id)?;

    emit(
        ctx,
        json!({ "task_id": task.id, "items": output::json::plan_items(&plan) }),
        || {
            println!("Plan for {} ({})", task.name, task.id);
            output::text::print_plan(&plan);
        },
    );
    Ok(0)
}

fn run_generate(
    reference: &str,
    policy: &PolicyArgs,
    only: Option<&str>,
    dry_run: bool,
    ctx: &Ctx,
) -> Result<i32, ClimblyError> {
    let target = parse_only(only)?;
    let conn = connection::open_db()?;
    let task = load_task(&conn, reference, &ctx.user, Role::Write)?;
    let policy = policy.to_policy()?;

    let stored = daily_plan_repo::get_daily_plans(&conn, &task.id)?;
    let plan = engine::generate_plan(&PlanRequest {
        start_date: task.start_date,
        end_date: task.end_date,
        target_time: task.target_time,
        policy: policy.clone(),
        existing_items: stored,
        target,
    })?;
    debug!(task_id = %task.id, policy = policy.name(), ?target, "generated plan");
    engine::validate(&range_of(&task), &plan)?;

    save_plan(&conn, &task, &plan, dry_run, ctx)
}

fn run_edit(
    reference: &str,
    sets: &[String],
    drag: bool,
    dry_run: bool,
    ctx: &Ctx,
) -> Result<i32, ClimblyError> {
    let mode = if drag { EditMode::Drag } else { EditMode::Entry };
    let edits = sets
        .iter()
        .map(|s| parse_edit(s, mode))
        .collect::<Result<Vec<_>, _>>()?;

    let conn = connection::open_db()?;
    let task = load_task(&conn, reference, &ctx.user, Role::Write)?;
    let current = daily_plan_repo::get_daily_plans(&conn, &task.id)?;
    if current.is_empty() {
        return Err(PlanError::PlanNotGenerated.into());
    }

    let edited = engine::apply_edits(&current, &edits)?;
    engine::validate(&range_of(&task), &edited)?;

    save_plan(&conn, &task, &edited, dry_run, ctx)
}

fn run_put(reference: &str, ctx: &Ctx) -> Result<i32, ClimblyError> {
    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .map_err(|e| ClimblyError::validation(format!("Failed to read stdin: {e}")))?;
    let PlanItems { items } = serde_json::from_str(&input)
        .map_err(|e| ClimblyError::validation(format!("Invalid plan JSON: {e}")))?;

    let conn = connection::open_db()?;
    let task = load_task(&conn, reference, &ctx.user, Role::Write)?;
    let range = range_of(&task);
    check_items(&range, &items)?;
    engine::validate(&range, &items)?;

    let mut plan = items;
    plan.sort_by_key(|e| e.target_date);
    save_plan(&conn, &task, &plan, false, ctx)
}
