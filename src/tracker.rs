//! Sleep session operations over the `sleep_records` table.
//!
//! Each operation opens its own connection and drops it on return; the
//! tracker itself only carries the database path.

use crate::errors::TrackerError;
use crate::models::{ActiveSession, DaySummary, NapEntry, SleepRecord, StatsResponse};
use crate::stats::{build_stats_at, window_start, NapSpan};
use crate::storage;
use crate::timestamps::{
    self, date_key, format_duration, format_hours, from_stored, ACTIVE_CLOCK_FORMAT,
    NAP_CLOCK_FORMAT,
};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use rusqlite::{Connection, TransactionBehavior};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct SleepTracker {
    db_path: PathBuf,
}

impl SleepTracker {
    /// Creates the tracker and its table if the database does not have it yet.
    pub fn open(db_path: impl Into<PathBuf>) -> Result<Self, TrackerError> {
        let tracker = Self {
            db_path: db_path.into(),
        };
        let conn = tracker.connect()?;
        storage::init_schema(&conn)?;
        Ok(tracker)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn connect(&self) -> Result<Connection, TrackerError> {
        Ok(storage::open(&self.db_path)?)
    }

    pub fn start(&self, start_time: Option<NaiveDateTime>) -> Result<i64, TrackerError> {
        let start_time = start_time.unwrap_or_else(timestamps::now);
        let conn = self.connect()?;
        let id = storage::insert_record(&conn, &timestamps::to_stored(start_time), None)?;
        info!(id, %start_time, "sleep session started");
        Ok(id)
    }

    /// Closes `sleep_id`, or the newest open session when no id is given.
    /// The end time is not checked against the start time.
    pub fn end(
        &self,
        sleep_id: Option<i64>,
        end_time: Option<NaiveDateTime>,
    ) -> Result<i64, TrackerError> {
        let conn = self.connect()?;
        let id = match sleep_id {
            Some(id) => id,
            None => storage::latest_open(&conn)?
                .map(|record| record.id)
                .ok_or(TrackerError::NoActiveSession)?,
        };

        let end_time = end_time.unwrap_or_else(timestamps::now);
        let updated = storage::close_record(&conn, id, &timestamps::to_stored(end_time))?;
        if updated == 0 {
            return Err(TrackerError::NapNotFound(id));
        }
        info!(id, %end_time, "sleep session ended");
        Ok(id)
    }

    pub fn get_day_summary(&self, date: Option<NaiveDate>) -> Result<DaySummary, TrackerError> {
        let date = date.unwrap_or_else(timestamps::today);
        let conn = self.connect()?;
        let records = storage::completed_on(&conn, &date_key(date))?;
        drop(conn);

        if records.is_empty() {
            return Ok(DaySummary::Empty {
                message: format!("No completed sleep sessions recorded for {}", date_key(date)),
                naps: Vec::new(),
            });
        }

        let mut total_sleep = Duration::zero();
        let mut naps = Vec::with_capacity(records.len());
        for record in &records {
            let Some((start, end)) = completed_span(record) else {
                continue;
            };
            let duration = end - start;
            total_sleep = total_sleep + duration;
            naps.push(NapEntry {
                id: record.id,
                start: start.format(NAP_CLOCK_FORMAT).to_string(),
                end: end.format(NAP_CLOCK_FORMAT).to_string(),
                duration: format_duration(duration),
            });
        }

        Ok(DaySummary::Recorded {
            date: date_key(date),
            naps,
            total_sleep_hours: format_hours(total_sleep),
            total_sleep_duration: format_duration(total_sleep),
        })
    }

    /// The newest open session. A stored start that cannot be parsed counts
    /// as no session.
    pub fn get_active_session(&self) -> Result<Option<ActiveSession>, TrackerError> {
        let conn = self.connect()?;
        let Some(record) = storage::latest_open(&conn)? else {
            return Ok(None);
        };

        match from_stored(&record.start_time) {
            Ok(start) => Ok(Some(ActiveSession {
                id: record.id,
                start_time: start.format(ACTIVE_CLOCK_FORMAT).to_string(),
            })),
            Err(err) => {
                warn!(
                    id = record.id,
                    raw = %record.start_time,
                    "unreadable active session start: {err}"
                );
                Ok(None)
            }
        }
    }

    pub fn add_manual_nap(
        &self,
        start_time: NaiveDateTime,
        end_time: NaiveDateTime,
    ) -> Result<i64, TrackerError> {
        if end_time <= start_time {
            return Err(TrackerError::EndNotAfterStart);
        }

        let conn = self.connect()?;
        let id = storage::insert_record(
            &conn,
            &timestamps::to_stored(start_time),
            Some(&timestamps::to_stored(end_time)),
        )?;
        info!(id, %start_time, %end_time, "manual nap added");
        Ok(id)
    }

    pub fn delete_nap(&self, nap_id: i64) -> Result<(), TrackerError> {
        let mut conn = self.connect()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        if !storage::record_exists(&tx, nap_id)? {
            return Err(TrackerError::NapNotFound(nap_id));
        }
        storage::delete_record(&tx, nap_id)?;
        tx.commit()?;
        info!(id = nap_id, "nap deleted");
        Ok(())
    }

    /// Rewrites whichever times are supplied. Ordering is only checked when
    /// both are.
    pub fn update_nap(
        &self,
        nap_id: i64,
        start_time: Option<NaiveDateTime>,
        end_time: Option<NaiveDateTime>,
    ) -> Result<(), TrackerError> {
        if let (Some(start), Some(end)) = (start_time, end_time) {
            if end <= start {
                return Err(TrackerError::EndNotAfterStart);
            }
        }

        let mut conn = self.connect()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        if !storage::record_exists(&tx, nap_id)? {
            return Err(TrackerError::NapNotFound(nap_id));
        }
        if start_time.is_some() || end_time.is_some() {
            let start = start_time.map(timestamps::to_stored);
            let end = end_time.map(timestamps::to_stored);
            storage::update_times(&tx, nap_id, start.as_deref(), end.as_deref())?;
        }
        tx.commit()?;
        info!(id = nap_id, ?start_time, ?end_time, "nap updated");
        Ok(())
    }

    /// Removes every record started on `date`, completed or not.
    pub fn clear_day_data(&self, date: Option<NaiveDate>) -> Result<usize, TrackerError> {
        let date = date.unwrap_or_else(timestamps::today);
        let conn = self.connect()?;
        let deleted = storage::delete_started_on(&conn, &date_key(date))?;
        info!(date = %date_key(date), deleted, "day data cleared");
        Ok(deleted)
    }

    pub fn find_nap(&self, nap_id: i64) -> Result<Option<SleepRecord>, TrackerError> {
        let conn = self.connect()?;
        Ok(storage::find_record(&conn, nap_id)?)
    }

    pub fn weekly_stats(&self, today: NaiveDate) -> Result<StatsResponse, TrackerError> {
        let conn = self.connect()?;
        let records =
            storage::completed_between(&conn, &date_key(window_start(today)), &date_key(today))?;
        drop(conn);

        let spans: Vec<NapSpan> = records
            .iter()
            .filter_map(completed_span)
            .map(|(start, end)| NapSpan {
                date: start.date(),
                duration: end - start,
            })
            .collect();
        Ok(build_stats_at(today, &spans))
    }
}

/// Parsed start/end of a completed record, or `None` (logged) when either
/// stored value is missing or malformed.
fn completed_span(record: &SleepRecord) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let Some(raw_end) = record.end_time.as_deref() else {
        warn!(id = record.id, "completed nap has no end time, skipping");
        return None;
    };
    match (from_stored(&record.start_time), from_stored(raw_end)) {
        (Ok(start), Ok(end)) => Some((start, end)),
        (Err(err), _) | (_, Err(err)) => {
            warn!(id = record.id, "error processing nap record: {err}");
            None
        }
    }
}
