use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::{params, Connection};

use crate::error::ClimblyError;
use crate::models::RecordWork;

const RECORD_COLUMNS: &str = "id, task_id, start_at, end_at, progress_value, work_time, note,
                created_by, last_updated_user, created_at, updated_at";

#[derive(Debug, Clone, Default)]
pub struct RecordInput {
    pub start_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,
    pub progress_value: Option<f64>,
    pub work_time: Option<i64>,
    pub note: Option<String>,
}

impl RecordInput {
    pub fn is_empty(&self) -> bool {
        self.start_at.is_none()
            && self.end_at.is_none()
            && self.progress_value.is_none()
            && self.work_time.is_none()
            && self.note.is_none()
    }
}

/// Session bounds are stored as `YYYY-MM-DDTHH:MM:SSZ` so they sort as text.
fn stored_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn read_ts(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e)))
}

fn check_values(
    start_at: DateTime<Utc>,
    end_at: DateTime<Utc>,
    progress_value: Option<f64>,
    work_time: Option<i64>,
) -> Result<(), ClimblyError> {
    if end_at < start_at {
        return Err(ClimblyError::validation("Record end must not be before its start"));
    }
    if progress_value.is_some_and(|p| !p.is_finite() || p < 0.0) {
        return Err(ClimblyError::validation("Progress value must be a non-negative number"));
    }
    if work_time.is_some_and(|w| w < 0) {
        return Err(ClimblyError::validation("Work time must not be negative"));
    }
    Ok(())
}

pub fn create_record(
    conn: &Connection,
    id: &str,
    task_id: &str,
    input: &RecordInput,
    created_by: &str,
) -> Result<RecordWork, ClimblyError> {
    let start_at = input
        .start_at
        .ok_or_else(|| ClimblyError::validation("Record start is required"))?;
    let end_at = input
        .end_at
        .ok_or_else(|| ClimblyError::validation("Record end is required"))?;
    check_values(start_at, end_at, input.progress_value, input.work_time)?;

    conn.execute(
        "INSERT INTO record_works (id, task_id, start_at, end_at, progress_value, work_time, note, created_by)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            id,
            task_id,
            stored_ts(start_at),
            stored_ts(end_at),
            input.progress_value,
            input.work_time,
            input.note,
            created_by
        ],
    )?;
    get_record_by_id(conn, id)
}

pub fn get_record_by_id(conn: &Connection, id: &str) -> Result<RecordWork, ClimblyError> {
    conn.query_row(
        &format!("SELECT {RECORD_COLUMNS} FROM record_works WHERE id = ?1"),
        params![id],
        row_to_record,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => ClimblyError::record_not_found(id),
        _ => ClimblyError::from(e),
    })
}

/// Resolve a record by exact ID, then by unique ID prefix.
pub fn resolve_record(conn: &Connection, reference: &str) -> Result<RecordWork, ClimblyError> {
    if let Ok(record) = get_record_by_id(conn, reference) {
        return Ok(record);
    }
    let mut stmt = conn.prepare(&format!(
        "SELECT {RECORD_COLUMNS} FROM record_works WHERE id LIKE ?1 ORDER BY id"
    ))?;
    let prefix = format!("{reference}%");
    let mut records: Vec<RecordWork> = stmt
        .query_map(params![prefix], row_to_record)?
        .collect::<Result<Vec<_>, _>>()?;
    match records.len() {
        0 => Err(ClimblyError::record_not_found(reference)),
        1 => Ok(records.remove(0)),
        _ => {
            let candidates: Vec<String> = records.iter().map(|r| r.id.clone()).collect();
            Err(ClimblyError::ambiguous_ref(reference, &candidates))
        }
    }
}

/// Records of one task ordered by start, optionally limited to sessions
/// starting within `from..=to` (UTC dates).
pub fn list_records_by_task(
    conn: &Connection,
    task_id: &str,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<Vec<RecordWork>, ClimblyError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {RECORD_COLUMNS} FROM record_works WHERE task_id = ?1 ORDER BY start_at ASC"
    ))?;
    let records = stmt
        .query_map(params![task_id], row_to_record)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(records
        .into_iter()
        .filter(|r| {
            let day = r.start_at.date_naive();
            from.map_or(true, |f| day >= f) && to.map_or(true, |t| day <= t)
        })
        .collect())
}

/// Apply the fields present in `input`; absent fields keep their value.
pub fn update_record(
    conn: &Connection,
    id: &str,
    input: &RecordInput,
    user: &str,
) -> Result<RecordWork, ClimblyError> {
    if input.is_empty() {
        return Err(ClimblyError::validation("No fields to update"));
    }
    let current = get_record_by_id(conn, id)?;
    let start_at = input.start_at.unwrap_or(current.start_at);
    let end_at = input.end_at.unwrap_or(current.end_at);
    let progress_value = input.progress_value.or(current.progress_value);
    let work_time = input.work_time.or(current.work_time);
    let note = input.note.clone().or(current.note);
    check_values(start_at, end_at, progress_value, work_time)?;

    conn.execute(
        "UPDATE record_works SET start_at = ?1, end_at = ?2, progress_value = ?3,
                work_time = ?4, note = ?5, last_updated_user = ?6, updated_at = datetime('now')
         WHERE id = ?7",
        params![
            stored_ts(start_at),
            stored_ts(end_at),
            progress_value,
            work_time,
            note,
            user,
            id
        ],
    )?;
    get_record_by_id(conn, id)
}

pub fn delete_record(conn: &Connection, id: &str) -> Result<(), ClimblyError> {
    let changed = conn.execute("DELETE FROM record_works WHERE id = ?1", params![id])?;
    if changed == 0 {
        return Err(ClimblyError::record_not_found(id));
    }
    Ok(())
}

fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<RecordWork> {
    Ok(RecordWork {
        id: row.get(0)?,
        task_id: row.get(1)?,
        start_at: read_ts(row, 2)?,
        end_at: read_ts(row, 3)?,
        progress_value: row.get(4)?,
        work_time: row.get(5)?,
        note: row.get(6)?,
        created_by: row.get(7)?,
        last_updated_user: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{connection::open_in_memory, task_repo};
    use crate::engine::parse_timestamp;
    use crate::models::{TaskCategory, TaskFields, TaskStatus};

    fn setup(conn: &Connection) {
        let fields = TaskFields {
            name: "Blog".into(),
            content: String::new(),
            category: TaskCategory::Creation,
            status: TaskStatus::Active,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 31),
            target_time: 600,
            comment: None,
        };
        task_repo::create_task(conn, "t1", &fields, "ann").unwrap();
    }

    fn input(start: &str, end: &str) -> RecordInput {
        RecordInput {
            start_at: parse_timestamp(start),
            end_at: parse_timestamp(end),
            progress_value: Some(10.0),
            work_time: Some(45),
            note: Some("draft".into()),
        }
    }

    #[test]
    fn test_crud() {
        let conn = open_in_memory().unwrap();
        setup(&conn);
        let r = create_record(&conn, "r1", "t1", &input("2024-01-02T09:00:00Z", "2024-01-02T09:45:00Z"), "ann")
            .unwrap();
        assert_eq!(r.work_time, Some(45));
        assert_eq!(r.start_at, parse_timestamp("2024-01-02T09:00:00Z").unwrap());

        let patch = RecordInput {
            work_time: Some(50),
            ..Default::default()
        };
        let r = update_record(&conn, "r1", &patch, "bob").unwrap();
        assert_eq!(r.work_time, Some(50));
        assert_eq!(r.note.as_deref(), Some("draft"));
        assert_eq!(r.last_updated_user.as_deref(), Some("bob"));

        delete_record(&conn, "r1").unwrap();
        assert_eq!(
            get_record_by_id(&conn, "r1").unwrap_err().code.as_str(),
            "RECORD_NOT_FOUND"
        );
    }

    #[test]
    fn test_session_bounds_stored_as_rfc3339_utc() {
        let conn = open_in_memory().unwrap();
        setup(&conn);
        create_record(&conn, "r1", "t1", &input("2024-01-02T18:00:00+09:00", "2024-01-02 10:30"), "ann")
            .unwrap();
        let (start, end): (String, String) = conn
            .query_row("SELECT start_at, end_at FROM record_works WHERE id = 'r1'", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .unwrap();
        assert_eq!(start, "2024-01-02T09:00:00Z");
        assert_eq!(end, "2024-01-02T10:30:00Z");

        let r = get_record_by_id(&conn, "r1").unwrap();
        assert_eq!(r.start_at, parse_timestamp("2024-01-02T09:00:00Z").unwrap());
    }

    #[test]
    fn test_end_before_start_rejected() {
        let conn = open_in_memory().unwrap();
        setup(&conn);
        let err = create_record(&conn, "r1", "t1", &input("2024-01-02T10:00:00Z", "2024-01-02T09:00:00Z"), "ann")
            .unwrap_err();
        assert_eq!(err.code.as_str(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_date_filter() {
        let conn = open_in_memory().unwrap();
        setup(&conn);
        create_record(&conn, "r1", "t1", &input("2024-01-02T09:00:00Z", "2024-01-02T10:00:00Z"), "ann").unwrap();
        create_record(&conn, "r2", "t1", &input("2024-01-05T09:00:00Z", "2024-01-05T10:00:00Z"), "ann").unwrap();
        let from = NaiveDate::from_ymd_opt(2024, 1, 3);
        let records = list_records_by_task(&conn, "t1", from, None).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "r2");
    }
}
