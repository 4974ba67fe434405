use rusqlite::Connection;

use crate::error::ClimblyError;

pub fn run_migrations(conn: &Connection) -> Result<(), ClimblyError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS tasks (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            content TEXT NOT NULL DEFAULT '',
            category TEXT NOT NULL
                CHECK (category IN ('study', 'creation', 'other')),
            status TEXT NOT NULL DEFAULT 'active'
                CHECK (status IN ('active', 'completed', 'paused', 'cancelled')),
            start_date TEXT NOT NULL,
            end_date TEXT NOT NULL,
            target_time INTEGER NOT NULL CHECK (target_time >= 0),
            comment TEXT,
            created_by TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            CHECK (end_date >= start_date)
        );

        CREATE TABLE IF NOT EXISTS daily_plans (
            task_id TEXT NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
            target_date TEXT NOT NULL,
            work_plan_value REAL NOT NULL CHECK (work_plan_value >= 0 AND work_plan_value <= 100),
            time_plan_value REAL NOT NULL CHECK (time_plan_value >= 0),
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (task_id, target_date)
        );

        CREATE TABLE IF NOT EXISTS record_works (
            id TEXT PRIMARY KEY,
            task_id TEXT NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
            start_at TEXT NOT NULL,
            end_at TEXT NOT NULL,
            progress_value REAL CHECK (progress_value IS NULL OR progress_value >= 0),
            work_time INTEGER CHECK (work_time IS NULL OR work_time >= 0),
            note TEXT,
            created_by TEXT NOT NULL,
            last_updated_user TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS task_auths (
            task_id TEXT NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
            user TEXT NOT NULL,
            role TEXT NOT NULL CHECK (role IN ('read', 'write', 'admin')),
            PRIMARY KEY (task_id, user)
        );

        CREATE INDEX IF NOT EXISTS idx_tasks_creator ON tasks(created_by, status);
        CREATE INDEX IF NOT EXISTS idx_records_task ON record_works(task_id, start_at);
        CREATE INDEX IF NOT EXISTS idx_auths_user ON task_auths(user);
        ",
    )?;
    Ok(())
}
