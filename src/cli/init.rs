use serde_json::json;
use tracing::info;

use crate::cli::{emit, finish, Ctx};
use crate::config::{self, Config};
use crate::db::connection;
use crate::error::ClimblyError;

pub fn run(ctx: &Ctx, user_flag: Option<&str>) -> i32 {
    finish(run_inner(ctx, user_flag), ctx.json)
}

fn run_inner(ctx: &Ctx, user_flag: Option<&str>) -> Result<i32, ClimblyError> {
    let path = connection::init_db()?;

    // Re-running init keeps the saved user unless a new one is given.
    let existing = config::config_path()?.exists();
    let config = match user_flag {
        Some(user) if !user.is_empty() => Config {
            user: user.to_string(),
        },
        _ if existing => Config::load(),
        _ => Config::default(),
    };
    config.save()?;
    info!(path = %path.display(), user = %config.user, "initialized");

    emit(
        ctx,
        json!({ "path": path.to_string_lossy(), "user": config.user }),
        || println!("Initialized climbly at {} (user: {})", path.display(), config.user),
    );
    Ok(0)
}
