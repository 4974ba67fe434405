use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde_json::json;
use tracing::debug;

use crate::cli::{emit, finish, parse_opt_date, today_or, Ctx};
use crate::db::{connection, daily_plan_repo, record_repo, task_repo};
use crate::engine::{actual, lag, merge};
use crate::error::ClimblyError;
use crate::models::{DailyActualEntry, TaskStatus};
use crate::output;

pub fn run(from: Option<&str>, to: Option<&str>, today: Option<&str>, ctx: &Ctx) -> i32 {
    finish(run_inner(from, to, today, ctx), ctx.json)
}

fn run_inner(
    from: Option<&str>,
    to: Option<&str>,
    today: Option<&str>,
    ctx: &Ctx,
) -> Result<i32, ClimblyError> {
    let from = parse_opt_date(from)?;
    let to = parse_opt_date(to)?;
    let today = today_or(today)?;
    let conn = connection::open_db()?;

    let tasks = task_repo::list_visible_tasks(&conn, &ctx.user, None)?;
    let counts = task_repo::task_counts(&conn, &ctx.user)?;
    let task_ids: Vec<String> = tasks.iter().map(|t| t.id.clone()).collect();
    let planned = daily_plan_repo::aggregate_time_plan(&conn, &task_ids, from, to)?;

    let in_window = |date: NaiveDate| from.map_or(true, |f| date >= f) && to.map_or(true, |t| date <= t);
    let mut spent: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    let mut lagging = Vec::new();
    for task in &tasks {
        let records = record_repo::list_records_by_task(&conn, &task.id, None, None)?;
        let actuals = actual::daily_actuals(&records);
        for day in actuals.iter().filter(|a| in_window(a.target_date)) {
            *spent.entry(day.target_date).or_insert(0.0) += day.time_actual_value;
        }
        if task.status == TaskStatus::Active {
            let plan = daily_plan_repo::get_daily_plans(&conn, &task.id)?;
            if let Some(reason) = lag::lag_reason(&plan, &actuals, today) {
                lagging.push((task.clone(), reason));
            }
        }
    }
    let spent: Vec<DailyActualEntry> = spent
        .into_iter()
        .map(|(target_date, time)| DailyActualEntry {
            target_date,
            work_actual_value: 0.0,
            time_actual_value: time,
        })
        .collect();

    let rows = merge::merge(&planned, &spent);
    let totals = lag::totals(&rows);
    debug!(tasks = tasks.len(), lagging = lagging.len(), "built dashboard");

    emit(
        ctx,
        json!({
            "counts": output::json::counts_json(&counts),
            "totals": output::json::totals_json(&totals),
            "daily_time": rows.iter().map(|r| json!({
                "target_date": r.target_date,
                "time_plan_value": r.time_plan_value,
                "time_actual_value": r.time_actual_value
            })).collect::<Vec<_>>(),
            "lagging": lagging
                .iter()
                .map(|(t, reason)| output::json::lagging_json(t, *reason))
                .collect::<Vec<_>>()
        }),
        || {
            output::text::print_counts(&counts);
            output::text::print_totals(&totals);
            output::text::print_lagging(&lagging);
        },
    );
    Ok(0)
}
