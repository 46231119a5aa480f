use crate::models::SleepRecord;
use rusqlite::types::Value;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::{env, path::Path, path::PathBuf};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS sleep_records (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        start_time DATETIME NOT NULL,
        end_time DATETIME,
        is_completed BOOLEAN DEFAULT 0
    )";

const RECORD_COLUMNS: &str = "id, start_time, end_time, is_completed";

pub fn resolve_db_path() -> PathBuf {
    if let Ok(path) = env::var("SLEEP_DB_PATH") {
        return PathBuf::from(path);
    }

    PathBuf::from("baby_sleep.db")
}

pub fn open(path: &Path) -> rusqlite::Result<Connection> {
    Connection::open(path)
}

pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA)
}

fn read_record(row: &Row<'_>) -> rusqlite::Result<SleepRecord> {
    Ok(SleepRecord {
        id: row.get(0)?,
        start_time: stored_text(row.get(1)?).unwrap_or_default(),
        end_time: stored_text(row.get(2)?),
        is_completed: row.get::<_, Option<bool>>(3)?.unwrap_or(false),
    })
}

// Timestamp columns are read loosely. A non-text value comes back as text the
// timestamp parser rejects, so the row is skipped rather than failing the query.
fn stored_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Text(text) => Some(text),
        Value::Integer(number) => Some(number.to_string()),
        Value::Real(number) => Some(number.to_string()),
        Value::Blob(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
    }
}

/// Inserts a record; it is completed exactly when `end_time` is given.
pub fn insert_record(
    conn: &Connection,
    start_time: &str,
    end_time: Option<&str>,
) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO sleep_records (start_time, end_time, is_completed) VALUES (?1, ?2, ?3)",
        params![start_time, end_time, end_time.is_some()],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn find_record(conn: &Connection, id: i64) -> rusqlite::Result<Option<SleepRecord>> {
    conn.query_row(
        &format!("SELECT {RECORD_COLUMNS} FROM sleep_records WHERE id = ?1"),
        [id],
        read_record,
    )
    .optional()
}

pub fn record_exists(conn: &Connection, id: i64) -> rusqlite::Result<bool> {
    let found: Option<i64> = conn
        .query_row("SELECT id FROM sleep_records WHERE id = ?1", [id], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(found.is_some())
}

/// The most recently started record that has not been completed.
pub fn latest_open(conn: &Connection) -> rusqlite::Result<Option<SleepRecord>> {
    conn.query_row(
        &format!(
            "SELECT {RECORD_COLUMNS} FROM sleep_records
             WHERE is_completed = 0
             ORDER BY start_time DESC, id DESC LIMIT 1"
        ),
        [],
        read_record,
    )
    .optional()
}

pub fn close_record(conn: &Connection, id: i64, end_time: &str) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE sleep_records SET end_time = ?1, is_completed = 1 WHERE id = ?2",
        params![end_time, id],
    )
}

/// Rewrites the supplied times only. Setting an end time completes the record.
pub fn update_times(
    conn: &Connection,
    id: i64,
    start_time: Option<&str>,
    end_time: Option<&str>,
) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE sleep_records SET
             start_time = COALESCE(?1, start_time),
             end_time = COALESCE(?2, end_time),
             is_completed = CASE WHEN ?2 IS NULL THEN is_completed ELSE 1 END
         WHERE id = ?3",
        params![start_time, end_time, id],
    )
}

pub fn delete_record(conn: &Connection, id: i64) -> rusqlite::Result<usize> {
    conn.execute("DELETE FROM sleep_records WHERE id = ?1", [id])
}

/// Completed records whose start falls on `date` (`YYYY-MM-DD`), oldest first.
pub fn completed_on(conn: &Connection, date: &str) -> rusqlite::Result<Vec<SleepRecord>> {
    completed_between(conn, date, date)
}

/// Completed records whose start date lies in `from..=to`, oldest first.
pub fn completed_between(
    conn: &Connection,
    from: &str,
    to: &str,
) -> rusqlite::Result<Vec<SleepRecord>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {RECORD_COLUMNS} FROM sleep_records
         WHERE date(start_time) BETWEEN date(?1) AND date(?2)
         AND is_completed = 1
         ORDER BY start_time, id"
    ))?;
    let records = stmt
        .query_map(params![from, to], read_record)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(records)
}

/// Deletes every record started on `date`, open or not.
pub fn delete_started_on(conn: &Connection, date: &str) -> rusqlite::Result<usize> {
    conn.execute(
        "DELETE FROM sleep_records WHERE date(start_time) = date(?1)",
        [date],
    )
}
