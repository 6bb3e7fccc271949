use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sojourner_core::reminder::ReminderPayload;

/// A persisted one-shot reminder job.
///
/// A row's presence in the `jobs` table means the job is scheduled; firing
/// and cancellation both delete the row, so there is no status column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// 8-character alphanumeric identifier, primary key.
    pub id: String,
    /// Delivery payload, stored as individual columns.
    #[serde(flatten)]
    pub payload: ReminderPayload,
    /// Absolute UTC instant at which the reminder fires.
    pub due_time: DateTime<Utc>,
    /// When the job was scheduled.
    pub created_at: DateTime<Utc>,
}
