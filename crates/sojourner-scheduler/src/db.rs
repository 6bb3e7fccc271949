use rusqlite::Connection;

use crate::error::Result;

/// Initialise the scheduler schema in `conn`.
///
/// Creates the `jobs` table (idempotent) and its indexes. Timestamps are
/// stored as RFC 3339 TEXT in UTC, so string comparison orders them
/// chronologically.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS jobs (
            id          TEXT    NOT NULL PRIMARY KEY,
            owner_id    INTEGER NOT NULL,
            channel_id  INTEGER NOT NULL,
            task_name   TEXT    NOT NULL,
            due_time    TEXT    NOT NULL,   -- RFC 3339, UTC
            created_at  TEXT    NOT NULL
        ) STRICT;

        -- Startup scan: SELECT ... ORDER BY due_time
        CREATE INDEX IF NOT EXISTS idx_jobs_due_time ON jobs (due_time);
        -- Per-owner listing, soonest first
        CREATE INDEX IF NOT EXISTS idx_jobs_owner ON jobs (owner_id, due_time);
        ",
    )?;
    Ok(())
}
