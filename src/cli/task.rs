use std::io::Read;

use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::cli::commands::{PolicyArgs, TaskCommands};
use crate::cli::plan::check_items;
use crate::cli::{emit, finish, parse_opt_date, Ctx};
use crate::db::{auth_repo, connection, daily_plan_repo, task_repo};
use crate::engine::{self, AllocationTarget, PlanRange, PlanRequest};
use crate::error::ClimblyError;
use crate::models::{DailyPlanEntry, Role, TaskCategory, TaskFields, TaskStatus};
use crate::output;

const MAX_NAME_LEN: usize = 255;

pub fn run(cmd: TaskCommands, ctx: &Ctx) -> i32 {
    let result = match cmd {
        TaskCommands::Add {
            name,
            content,
            category,
            start,
            end,
            target_time,
            comment,
            policy,
        } => {
            let draft = TaskDraft {
                name,
                content,
                category,
                start,
                end,
                target_time,
                comment,
            };
            run_add_args(draft, &policy, ctx)
        }
        TaskCommands::Load => run_load(ctx),
        TaskCommands::List { status } => run_list(status.as_deref(), ctx),
        TaskCommands::Show { id } => run_show(&id, ctx),
        TaskCommands::Update {
            id,
            name,
            content,
            category,
            status,
            start,
            end,
            target_time,
            comment,
            replan,
            policy,
        } => {
            let patch = TaskPatch {
                name,
                content,
                category,
                status,
                start,
                end,
                target_time,
                comment,
            };
            run_update(&id, patch, replan, &policy, ctx)
        }
        TaskCommands::Delete { id } => run_delete(&id, ctx),
    };
    finish(result, ctx.json)
}

pub(crate) fn parse_category(s: &str) -> Result<TaskCategory, ClimblyError> {
    TaskCategory::from_str(s).ok_or_else(|| {
        ClimblyError::validation(format!(
            "Invalid category '{s}'. Expected one of: study, creation, other"
        ))
    })
}

fn parse_status(s: &str) -> Result<TaskStatus, ClimblyError> {
    TaskStatus::from_str(s).ok_or_else(|| {
        ClimblyError::validation(format!(
            "Invalid status '{s}'. Expected one of: active, completed, paused, cancelled"
        ))
    })
}

fn check_name(name: &str) -> Result<(), ClimblyError> {
    let len = name.trim().chars().count();
    if len == 0 {
        return Err(ClimblyError::validation("Task name must not be empty"));
    }
    if len > MAX_NAME_LEN {
        return Err(ClimblyError::validation(format!(
            "Task name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

fn range_of_fields(fields: &TaskFields) -> PlanRange {
    PlanRange {
        start_date: fields.start_date,
        end_date: fields.end_date,
        target_time: fields.target_time,
    }
}

/// Allocate a fresh plan for `fields` with `policy`, seeded from `existing`.
fn generate_for(
    fields: &TaskFields,
    policy: &PolicyArgs,
    existing: Vec<DailyPlanEntry>,
) -> Result<Vec<DailyPlanEntry>, ClimblyError> {
    let range = range_of_fields(fields);
    let (start_date, end_date) = engine::check_range(&range)?;
    let plan = engine::generate_plan(&PlanRequest {
        start_date,
        end_date,
        target_time: fields.target_time,
        policy: policy.to_policy()?,
        existing_items: existing,
        target: AllocationTarget::Both,
    })?;
    engine::validate(&range, &plan)?;
    Ok(plan)
}

/// `task add` flags before parsing.
struct TaskDraft {
    name: String,
    content: String,
    category: String,
    start: Option<String>,
    end: Option<String>,
    target_time: i64,
    comment: Option<String>,
}

fn run_add_args(draft: TaskDraft, policy: &PolicyArgs, ctx: &Ctx) -> Result<i32, ClimblyError> {
    let fields = TaskFields {
        category: parse_category(&draft.category)?,
        status: TaskStatus::Active,
        start_date: parse_opt_date(draft.start.as_deref())?,
        end_date: parse_opt_date(draft.end.as_deref())?,
        name: draft.name,
        content: draft.content,
        target_time: draft.target_time,
        comment: draft.comment,
    };
    run_add(&fields, policy, ctx)
}

fn run_add(fields: &TaskFields, policy: &PolicyArgs, ctx: &Ctx) -> Result<i32, ClimblyError> {
    check_name(&fields.name)?;
    let plan = generate_for(fields, policy, Vec::new())?;
    create_with_plan(fields, &plan, ctx)
}

/// Insert the task and its plan in one transaction.
fn create_with_plan(
    fields: &TaskFields,
    plan: &[DailyPlanEntry],
    ctx: &Ctx,
) -> Result<i32, ClimblyError> {
    let conn = connection::open_db()?;
    let task_id = ulid::Ulid::new().to_string();

    let task = connection::with_transaction(&conn, |conn| {
        let task = task_repo::create_task(conn, &task_id, fields, &ctx.user)?;
        daily_plan_repo::replace_daily_plans(conn, &task, plan)?;
        Ok(task)
    })?;
    info!(task_id = %task.id, days = plan.len(), "created task");

    emit(
        ctx,
        json!({
            "task": output::json::task_detail(&task),
            "daily_plans": output::json::plan_items(plan)
        }),
        || println!("Added task: {} ({}), {} day plan", task.name, task.id, plan.len()),
    );
    Ok(0)
}

#[derive(Debug, Deserialize)]
struct Submission {
    task: TaskFields,
    daily_plans: PlanItems,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PlanItems {
    pub items: Vec<DailyPlanEntry>,
}

fn run_load(ctx: &Ctx) -> Result<i32, ClimblyError> {
    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .map_err(|e| ClimblyError::validation(format!("Failed to read stdin: {e}")))?;
    let submission: Submission = serde_json::from_str(&input)
        .map_err(|e| ClimblyError::validation(format!("Invalid submission JSON: {e}")))?;

    check_name(&submission.task.name)?;
    let range = range_of_fields(&submission.task);
    engine::validate(&range, &submission.daily_plans.items)?;
    check_items(&range, &submission.daily_plans.items)?;

    let mut plan = submission.daily_plans.items;
    plan.sort_by_key(|e| e.target_date);
    create_with_plan(&submission.task, &plan, ctx)
}

fn run_list(status: Option<&str>, ctx: &Ctx) -> Result<i32, ClimblyError> {
    let status = status.map(parse_status).transpose()?;
    let conn = connection::open_db()?;
    let tasks = task_repo::list_visible_tasks(&conn, &ctx.user, status)?;

    emit(
        ctx,
        json!({
            "tasks": tasks.iter().map(output::json::task_summary).collect::<Vec<_>>()
        }),
        || output::text::print_task_list(&tasks),
    );
    Ok(0)
}

fn run_show(id: &str, ctx: &Ctx) -> Result<i32, ClimblyError> {
    let conn = connection::open_db()?;
    let task = task_repo::resolve_task(&conn, id)?;
    let role = auth_repo::require_role(&conn, &task, &ctx.user, Role::Read)?;
    let plan = daily_plan_repo::get_daily_plans(&conn, &task.id)?;

    emit(
        ctx,
        json!({
            "task": output::json::task_detail(&task),
            "role": role.as_str(),
            "daily_plans": output::json::plan_items(&plan)
        }),
        || {
            output::text::print_task(&task);
            println!();
            output::text::print_plan(&plan);
        },
    );
    Ok(0)
}

struct TaskPatch {
    name: Option<String>,
    content: Option<String>,
    category: Option<String>,
    status: Option<String>,
    start: Option<String>,
    end: Option<String>,
    target_time: Option<i64>,
    comment: Option<String>,
}

impl TaskPatch {
    fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.content.is_none()
            && self.category.is_none()
            && self.status.is_none()
            && self.start.is_none()
            && self.end.is_none()
            && self.target_time.is_none()
            && self.comment.is_none()
    }

    fn apply(self, fields: &mut TaskFields) -> Result<(), ClimblyError> {
        if let Some(name) = self.name {
            check_name(&name)?;
            fields.name = name;
        }
        if let Some(content) = self.content {
            fields.content = content;
        }
        if let Some(category) = self.category {
            fields.category = parse_category(&category)?;
        }
        if let Some(status) = self.status {
            fields.status = parse_status(&status)?;
        }
        if let Some(start) = parse_opt_date(self.start.as_deref())? {
            fields.start_date = Some(start);
        }
        if let Some(end) = parse_opt_date(self.end.as_deref())? {
            fields.end_date = Some(end);
        }
        if let Some(target_time) = self.target_time {
            fields.target_time = target_time;
        }
        if let Some(comment) = self.comment {
            fields.comment = Some(comment).filter(|c| !c.is_empty());
        }
        Ok(())
    }
}

fn run_update(
    id: &str,
    patch: TaskPatch,
    replan: bool,
    policy: &PolicyArgs,
    ctx: &Ctx,
) -> Result<i32, ClimblyError> {
    if patch.is_empty() && !replan {
        return Err(ClimblyError::validation("No fields to update"));
    }
    let conn = connection::open_db()?;
    let task = task_repo::resolve_task(&conn, id)?;
    auth_repo::require_role(&conn, &task, &ctx.user, Role::Write)?;

    let mut fields = TaskFields::from(&task);
    patch.apply(&mut fields)?;

    // A stored plan only fits the dates and target it was built for.
    let shape_changed = fields.start_date != Some(task.start_date)
        || fields.end_date != Some(task.end_date)
        || fields.target_time != task.target_time;
    let new_plan = if replan || shape_changed {
        let stored = daily_plan_repo::get_daily_plans(&conn, &task.id)?;
        Some(generate_for(&fields, policy, stored)?)
    } else {
        engine::check_range(&range_of_fields(&fields))?;
        None
    };

    let (updated, bulk) = connection::with_transaction(&conn, |conn| {
        let updated = task_repo::update_task(conn, &task.id, &fields)?;
        let bulk = match &new_plan {
            Some(plan) => Some(daily_plan_repo::replace_daily_plans(conn, &updated, plan)?),
            None => None,
        };
        Ok((updated, bulk))
    })?;
    info!(task_id = %updated.id, replanned = bulk.is_some(), "updated task");

    let mut data = json!({ "task": output::json::task_detail(&updated) });
    if let (Some(plan), Some(bulk)) = (&new_plan, &bulk) {
        data["daily_plans"] = output::json::plan_items(plan);
        data["plan_write"] = output::json::bulk_json(bulk);
    }
    emit(ctx, data, || {
        println!("Updated task: {} ({})", updated.name, updated.id);
        if let Some(bulk) = &bulk {
            println!("  Plan regenerated: {} days, {} removed", bulk.upserted, bulk.pruned);
        }
    });
    Ok(0)
}

fn run_delete(id: &str, ctx: &Ctx) -> Result<i32, ClimblyError> {
    let conn = connection::open_db()?;
    let task = task_repo::resolve_task(&conn, id)?;
    auth_repo::require_role(&conn, &task, &ctx.user, Role::Admin)?;
    task_repo::delete_task(&conn, &task.id)?;
    info!(task_id = %task.id, "deleted task");

    emit(
        ctx,
        json!({ "deleted": { "id": task.id, "name": task.name } }),
        || println!("Deleted task: {} ({})", task.name, task.id),
    );
    Ok(0)
}
