use serde_json::json;
use tracing::info;

use crate::cli::commands::ShareCommands;
use crate::cli::{emit, finish, Ctx};
use crate::db::{auth_repo, connection, task_repo};
use crate::error::ClimblyError;
use crate::models::Role;
use crate::output;

pub fn run(cmd: ShareCommands, ctx: &Ctx) -> i32 {
    let result = match cmd {
        ShareCommands::Add { task, member, role } => run_add(&task, &member, &role, ctx),
        ShareCommands::List { task } => run_list(&task, ctx),
        ShareCommands::Remove { task, member } => run_remove(&task, &member, ctx),
    };
    finish(result, ctx.json)
}

fn run_add(reference: &str, member: &str, role: &str, ctx: &Ctx) -> Result<i32, ClimblyError> {
    let role = Role::from_str(role).ok_or_else(|| {
        ClimblyError::validation(format!("Invalid role '{role}'. Expected one of: read, write, admin"))
    })?;
    if member.trim().is_empty() {
        return Err(ClimblyError::validation("User must not be empty"));
    }
    let conn = connection::open_db()?;
    let task = task_repo::resolve_task(&conn, reference)?;
    auth_repo::require_role(&conn, &task, &ctx.user, Role::Admin)?;
    if member == task.created_by {
        return Err(ClimblyError::validation("The task creator always holds admin"));
    }

    auth_repo::grant(&conn, &task.id, member, role)?;
    info!(task_id = %task.id, user = member, role = role.as_str(), "granted access");

    emit(
        ctx,
        json!({ "granted": { "task_id": task.id, "user": member, "role": role.as_str() } }),
        || println!("Shared {} with {member} ({})", task.name, role.as_str()),
    );
    Ok(0)
}

fn run_list(reference: &str, ctx: &Ctx) -> Result<i32, ClimblyError> {
    let conn = connection::open_db()?;
    let task = task_repo::resolve_task(&conn, reference)?;
    auth_repo::require_role(&conn, &task, &ctx.user, Role::Read)?;
    let auths = auth_repo::list_auths(&conn, &task.id)?;

    emit(
        ctx,
        json!({
            "task_id": task.id,
            "created_by": task.created_by,
            "auths": auths.iter().map(output::json::auth_json).collect::<Vec<_>>()
        }),
        || {
            println!("{} (creator: {})", task.name, task.created_by);
            output::text::print_auths(&auths);
        },
    );
    Ok(0)
}

fn run_remove(reference: &str, member: &str, ctx: &Ctx) -> Result<i32, ClimblyError> {
    let conn = connection::open_db()?;
    let task = task_repo::resolve_task(&conn, reference)?;
    auth_repo::require_role(&conn, &task, &ctx.user, Role::Admin)?;
    if !auth_repo::revoke(&conn, &task.id, member)? {
        return Err(ClimblyError::validation(format!(
            "User '{member}' has no access to this task"
        )));
    }
    info!(task_id = %task.id, user = member, "revoked access");

    emit(
        ctx,
        json!({ "revoked": { "task_id": task.id, "user": member } }),
        || println!("Removed {member} from {}", task.name),
    );
    Ok(0)
}
