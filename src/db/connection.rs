use std::env;
use std::fs;
use std::path::PathBuf;

use rusqlite::Connection;
use tracing::debug;

use crate::error::ClimblyError;

use super::migrations;

pub const DATA_DIR: &str = ".climbly";

/// Find the nearest directory holding a `.climbly` data dir, walking up from
/// the current directory.
pub fn find_root() -> Result<PathBuf, ClimblyError> {
    let mut dir = env::current_dir().map_err(|e| ClimblyError::database(e.to_string()))?;
    loop {
        if dir.join(DATA_DIR).is_dir() {
            return Ok(dir);
        }
        if !dir.pop() {
            return Err(ClimblyError::not_initialized());
        }
    }
}

/// Get the path to the climbly database.
pub fn db_path() -> Result<PathBuf, ClimblyError> {
    Ok(find_root()?.join(DATA_DIR).join("climbly.db"))
}

/// Open a connection to the database. Returns error if not initialized.
pub fn open_db() -> Result<Connection, ClimblyError> {
    let path = db_path()?;
    if !path.exists() {
        return Err(ClimblyError::not_initialized());
    }
    debug!(path = %path.display(), "opening database");
    let conn = Connection::open(&path)?;
    configure_connection(&conn)?;
    Ok(conn)
}

/// Initialize the database in the current directory (or the existing root):
/// create the data dir, the database, and run migrations.
pub fn init_db() -> Result<PathBuf, ClimblyError> {
    let root = match find_root() {
        Ok(root) => root,
        Err(_) => env::current_dir().map_err(|e| ClimblyError::database(e.to_string()))?,
    };
    let path = root.join(DATA_DIR).join("climbly.db");
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| ClimblyError::database(e.to_string()))?;
    }
    let conn = Connection::open(&path)?;
    configure_connection(&conn)?;
    migrations::run_migrations(&conn)?;
    Ok(path)
}

/// In-memory database with the full schema, for tests.
pub fn open_in_memory() -> Result<Connection, ClimblyError> {
    let conn = Connection::open_in_memory()?;
    configure_connection(&conn)?;
    migrations::run_migrations(&conn)?;
    Ok(conn)
}

fn configure_connection(conn: &Connection) -> Result<(), ClimblyError> {
    conn.execute_batch(
        "PRAGMA journal_mode=WAL;
         PRAGMA busy_timeout=5000;
         PRAGMA foreign_keys=ON;",
    )?;
    Ok(())
}

/// Run `f` inside `BEGIN IMMEDIATE … COMMIT`, rolling back on error.
pub fn with_transaction<T>(
    conn: &Connection,
    f: impl FnOnce(&Connection) -> Result<T, ClimblyError>,
) -> Result<T, ClimblyError> {
    conn.execute_batch("BEGIN IMMEDIATE")?;
    match f(conn) {
        Ok(value) => {
            conn.execute_batch("COMMIT")?;
            Ok(value)
        }
        Err(e) => {
            let _ = conn.execute_batch("ROLLBACK");
            Err(e)
        }
    }
}
