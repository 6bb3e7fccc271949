use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use sojourner_core::reminder::ReminderPayload;
use tracing::instrument;

use crate::db::init_db;
use crate::error::{Result, SchedulerError};
use crate::types::Job;

/// Thread-safe, durable store for scheduled jobs.
///
/// Wraps a single SQLite connection in a `Mutex`. The single-node target
/// does not need a connection pool; every operation is one short statement.
pub struct JobStore {
    db: Mutex<Connection>,
}

impl JobStore {
    /// Wrap an already-open connection, initialising the schema if needed.
    pub fn new(conn: Connection) -> Result<Self> {
        init_db(&conn)?;
        Ok(Self {
            db: Mutex::new(conn),
        })
    }

    /// Persist a new job. Fails with `DuplicateId` when the ID is taken.
    #[instrument(skip(self, job), fields(job_id = %job.id))]
    pub fn insert(&self, job: &Job) -> Result<()> {
        let db = self.db.lock().unwrap();
        let res = db.execute(
            "INSERT INTO jobs (id, owner_id, channel_id, task_name, due_time, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                job.id,
                job.payload.owner_id as i64,
                job.payload.channel_id as i64,
                job.payload.task_name,
                job.due_time.to_rfc3339(),
                job.created_at.to_rfc3339(),
            ],
        );
        match res {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(SchedulerError::DuplicateId {
                id: job.id.clone(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a job by ID. Returns `NotFound` when no row is deleted.
    #[instrument(skip(self), fields(job_id = %id))]
    pub fn delete(&self, id: &str) -> Result<()> {
        let db = self.db.lock().unwrap();
        let n = db.execute("DELETE FROM jobs WHERE id = ?1", [id])?;
        if n == 0 {
            return Err(SchedulerError::NotFound { id: id.to_string() });
        }
        Ok(())
    }

    /// Retrieve a job by ID, returning `None` if it does not exist.
    pub fn get(&self, id: &str) -> Result<Option<Job>> {
        let db = self.db.lock().unwrap();
        match db.query_row(
            "SELECT id, owner_id, channel_id, task_name, due_time, created_at
             FROM jobs WHERE id = ?1",
            [id],
            row_to_job,
        ) {
            Ok(job) => Ok(Some(job)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(SchedulerError::Unavailable(e)),
        }
    }

    /// All jobs belonging to `owner_id`, soonest due first.
    #[instrument(skip(self), fields(owner_id))]
    pub fn list_by_owner(&self, owner_id: u64) -> Result<Vec<Job>> {
        let db = self.db.lock().unwrap();
        let mut stmt = db.prepare(
            "SELECT id, owner_id, channel_id, task_name, due_time, created_at
             FROM jobs
             WHERE owner_id = ?1
             ORDER BY due_time",
        )?;
        let rows = stmt.query_map([owner_id as i64], row_to_job)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Every persisted job, soonest due first. Used to rebuild the in-memory
    /// queue on startup.
    pub fn list_all(&self) -> Result<Vec<Job>> {
        let db = self.db.lock().unwrap();
        let mut stmt = db.prepare(
            "SELECT id, owner_id, channel_id, task_name, due_time, created_at
             FROM jobs
             ORDER BY due_time",
        )?;
        let rows = stmt.query_map([], row_to_job)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

/// Map a SQLite row to a [`Job`]. Malformed timestamps surface as conversion
/// errors rather than being skipped; a corrupt row must not vanish silently.
fn row_to_job(row: &rusqlite::Row<'_>) -> rusqlite::Result<Job> {
    Ok(Job {
        id: row.get(0)?,
        payload: ReminderPayload {
            owner_id: row.get::<_, i64>(1)? as u64,
            channel_id: row.get::<_, i64>(2)? as u64,
            task_name: row.get(3)?,
        },
        due_time: timestamp_column(row, 4)?,
        created_at: timestamp_column(row, 5)?,
    })
}

fn timestamp_column(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

/// True when `err` is a primary-key or unique-constraint violation.
fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn open_store() -> JobStore {
        let conn = Connection::open_in_memory().unwrap();
        JobStore::new(conn).unwrap()
    }

    fn sample_job(id: &str, owner: u64, due_in_secs: i64) -> Job {
        let now = Utc::now();
        Job {
            id: id.to_string(),
            payload: ReminderPayload {
                owner_id: owner,
                channel_id: 900_100_200,
                task_name: "Iron Ingot".to_string(),
            },
            due_time: now + Duration::seconds(due_in_secs),
            created_at: now,
        }
    }

    #[test]
    fn schema_init_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_db(&conn).unwrap();
        init_db(&conn).unwrap();
    }

    #[test]
    fn insert_then_get_round_trips() {
        let store = open_store();
        let job = sample_job("AbC12345", 42, 60);
        store.insert(&job).unwrap();

        let loaded = store.get("AbC12345").unwrap().expect("job should exist");
        assert_eq!(loaded, job);
    }

    #[test]
    fn get_missing_returns_none() {
        let store = open_store();
        assert!(store.get("ZZZZZZZZ").unwrap().is_none());
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let store = open_store();
        store.insert(&sample_job("AbC12345", 1, 60)).unwrap();

        let err = store.insert(&sample_job("AbC12345", 2, 90)).unwrap_err();
        assert!(matches!(err, SchedulerError::DuplicateId { ref id } if id == "AbC12345"));

        // The losing insert left nothing behind.
        let survivor = store.get("AbC12345").unwrap().unwrap();
        assert_eq!(survivor.payload.owner_id, 1);
    }

    #[test]
    fn delete_removes_row_and_twice_is_not_found() {
        let store = open_store();
        store.insert(&sample_job("AbC12345", 1, 60)).unwrap();

        store.delete("AbC12345").unwrap();
        assert!(store.get("AbC12345").unwrap().is_none());

        let err = store.delete("AbC12345").unwrap_err();
        assert!(matches!(err, SchedulerError::NotFound { .. }));
    }

    #[test]
    fn list_by_owner_is_scoped_and_sorted() {
        let store = open_store();
        store.insert(&sample_job("AAAAAAA1", 1, 300)).unwrap();
        store.insert(&sample_job("AAAAAAA2", 1, 10)).unwrap();
        store.insert(&sample_job("AAAAAAA3", 1, 100)).unwrap();
        store.insert(&sample_job("BBBBBBB1", 2, 50)).unwrap();

        let jobs = store.list_by_owner(1).unwrap();
        let ids: Vec<&str> = jobs.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, vec!["AAAAAAA2", "AAAAAAA3", "AAAAAAA1"]);

        assert!(store.list_by_owner(3).unwrap().is_empty());
    }

    #[test]
    fn mixed_precision_timestamps_order_chronologically() {
        use chrono::TimeZone;

        let store = open_store();
        let base = Utc.with_ymd_and_hms(2026, 9, 1, 12, 0, 0).unwrap();

        // to_rfc3339 emits 0, 3, 6, or 9 fractional digits depending on the
        // instant; the TEXT ordering must still match the chronological one.
        let cases = [
            ("AAAAAAA1", base + Duration::nanoseconds(125)),
            ("AAAAAAA2", base),
            ("AAAAAAA3", base + Duration::microseconds(250)),
            ("AAAAAAA4", base + Duration::milliseconds(500)),
        ];
        for (id, due) in cases {
            let mut job = sample_job(id, 1, 0);
            job.due_time = due;
            store.insert(&job).unwrap();
        }

        let ids: Vec<String> = store
            .list_by_owner(1)
            .unwrap()
            .into_iter()
            .map(|j| j.id)
            .collect();
        assert_eq!(ids, vec!["AAAAAAA2", "AAAAAAA1", "AAAAAAA3", "AAAAAAA4"]);
    }

    #[test]
    fn list_all_spans_owners() {
        let store = open_store();
        assert!(store.list_all().unwrap().is_empty());

        store.insert(&sample_job("AAAAAAA1", 1, 60)).unwrap();
        store.insert(&sample_job("BBBBBBB1", 2, 30)).unwrap();

        let jobs = store.list_all().unwrap();
        assert_eq!(jobs.len(), 2);
        // Soonest first.
        assert_eq!(jobs[0].id, "BBBBBBB1");
    }

    #[test]
    fn large_snowflake_ids_round_trip() {
        let store = open_store();
        let mut job = sample_job("AbC12345", u64::MAX / 2, 60);
        job.payload.channel_id = 1_234_567_890_123_456_789;
        store.insert(&job).unwrap();

        let loaded = store.get("AbC12345").unwrap().unwrap();
        assert_eq!(loaded.payload.owner_id, u64::MAX / 2);
        assert_eq!(loaded.payload.channel_id, 1_234_567_890_123_456_789);
    }
}
