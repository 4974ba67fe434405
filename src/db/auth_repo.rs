use rusqlite::{params, Connection};

use crate::error::ClimblyError;
use crate::models::{Role, Task, TaskAuth};

pub fn grant(conn: &Connection, task_id: &str, user: &str, role: Role) -> Result<(), ClimblyError> {
    conn.execute(
        "INSERT INTO task_auths (task_id, user, role) VALUES (?1, ?2, ?3)
         ON CONFLICT (task_id, user) DO UPDATE SET role = excluded.role",
        params![task_id, user, role.as_str()],
    )?;
    Ok(())
}

pub fn revoke(conn: &Connection, task_id: &str, user: &str) -> Result<bool, ClimblyError> {
    let changed = conn.execute(
        "DELETE FROM task_auths WHERE task_id = ?1 AND user = ?2",
        params![task_id, user],
    )?;
    Ok(changed > 0)
}

pub fn list_auths(conn: &Connection, task_id: &str) -> Result<Vec<TaskAuth>, ClimblyError> {
    let mut stmt = conn.prepare(
        "SELECT task_id, user, role FROM task_auths WHERE task_id = ?1 ORDER BY user",
    )?;
    let auths = stmt
        .query_map(params![task_id], |row| {
            Ok(TaskAuth {
                task_id: row.get(0)?,
                user: row.get(1)?,
                role: Role::from_str(&row.get::<_, String>(2)?).unwrap_or(Role::Read),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(auths)
}

/// The role a user holds on a task. The creator is always admin.
pub fn role_of(conn: &Connection, task: &Task, user: &str) -> Result<Option<Role>, ClimblyError> {
    if task.created_by == user {
        return Ok(Some(Role::Admin));
    }
    let mut stmt = conn.prepare("SELECT role FROM task_auths WHERE task_id = ?1 AND user = ?2")?;
    let mut rows = stmt.query(params![task.id, user])?;
    match rows.next()? {
        Some(row) => Ok(Role::from_str(&row.get::<_, String>(0)?)),
        None => Ok(None),
    }
}

/// Fail with `PERMISSION_DENIED` unless `user` holds at least `needed`.
/// Users with no role at all get `TASK_NOT_FOUND` so task IDs don't leak.
pub fn require_role(conn: &Connection, task: &Task, user: &str, needed: Role) -> Result<Role, ClimblyError> {
    match role_of(conn, task, user)? {
        None => Err(ClimblyError::task_not_found(&task.id)),
        Some(role) if role >= needed => Ok(role),
        Some(_) => {
            let action = match needed {
                Role::Read => "read",
                Role::Write => "modify",
                Role::Admin => "administer",
            };
            Err(ClimblyError::permission_denied(user, action))
        }
    }
}
