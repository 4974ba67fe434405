use serde_json::json;

use crate::cli::{emit, finish, today_or, Ctx};
use crate::db::{auth_repo, connection, daily_plan_repo, record_repo, task_repo};
use crate::engine::{actual, lag, merge};
use crate::error::ClimblyError;
use crate::models::Role;
use crate::output;

pub fn run(task: &str, today: Option<&str>, ctx: &Ctx) -> i32 {
    finish(run_inner(task, today, ctx), ctx.json)
}

fn run_inner(reference: &str, today: Option<&str>, ctx: &Ctx) -> Result<i32, ClimblyError> {
    let today = today_or(today)?;
    let conn = connection::open_db()?;
    let task = task_repo::resolve_task(&conn, reference)?;
    auth_repo::require_role(&conn, &task, &ctx.user, Role::Read)?;

    let plan = daily_plan_repo::get_daily_plans(&conn, &task.id)?;
    let records = record_repo::list_records_by_task(&conn, &task.id, None, None)?;
    let actuals = actual::daily_actuals(&records);
    let rows = merge::merge(&plan, &actuals);
    let totals = lag::totals(&rows);
    let reason = lag::lag_reason(&plan, &actuals, today);

    emit(
        ctx,
        json!({
            "task": output::json::task_summary(&task),
            "today": today,
            "rows": output::json::merged_rows(&rows),
            "totals": output::json::totals_json(&totals),
            "lagging": reason.is_some(),
            "lag_reason": reason.map(|r| r.as_str())
        }),
        || {
            println!("Progress for {} ({})", task.name, task.id);
            output::text::print_merged(&rows);
            output::text::print_totals(&totals);
            match reason {
                Some(r) => println!("Behind as of {today}: {}", r.as_str()),
                None => println!("On track as of {today}"),
            }
        },
    );
    Ok(0)
}
