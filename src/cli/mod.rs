pub mod commands;
pub mod dashboard;
pub mod init;
pub mod plan;
pub mod progress;
pub mod record;
pub mod share;
pub mod task;

pub use commands::*;

use chrono::{NaiveDate, Utc};
use serde_json::Value;

use crate::engine::{self, PlanRange};
use crate::error::ClimblyError;
use crate::models::Task;
use crate::output;

/// Per-invocation settings shared by every handler.
#[derive(Debug, Clone)]
pub struct Ctx {
    pub json: bool,
    pub user: String,
}

/// Turn a handler result into an exit code, printing the error first.
pub fn finish(result: Result<i32, ClimblyError>, json_output: bool) -> i32 {
    match result {
        Ok(code) => code,
        Err(e) => {
            tracing::debug!(code = e.code.as_str(), "command failed");
            if json_output {
                output::json::print(&output::json::error(&e));
            } else {
                eprintln!("Error: {}", e.message);
            }
            1
        }
    }
}

/// Print `data` in the success envelope, or run `text` for human output.
pub fn emit(ctx: &Ctx, data: Value, text: impl FnOnce()) {
    if ctx.json {
        output::json::print(&output::json::success(data));
    } else {
        text();
    }
}

pub(crate) fn parse_opt_date(value: Option<&str>) -> Result<Option<NaiveDate>, ClimblyError> {
    value.map(engine::parse_date).transpose().map_err(ClimblyError::from)
}

pub(crate) fn today_or(value: Option<&str>) -> Result<NaiveDate, ClimblyError> {
    Ok(parse_opt_date(value)?.unwrap_or_else(|| Utc::now().date_naive()))
}

pub(crate) fn range_of(task: &Task) -> PlanRange {
    PlanRange {
        start_date: Some(task.start_date),
        end_date: Some(task.end_date),
        target_time: task.target_time,
    }
}
