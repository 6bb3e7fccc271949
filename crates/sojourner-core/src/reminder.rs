//! Reminder payload shared between the scheduler engine and dispatchers.

use serde::{Deserialize, Serialize};

/// What gets delivered when a job fires.
///
/// Created by the command layer when a reminder is scheduled; handed to the
/// configured dispatcher by the firing loop. Persisted in the `jobs` table as
/// individual columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderPayload {
    /// Snowflake id of the user the reminder belongs to.
    pub owner_id: u64,
    /// Snowflake id of the channel the reminder is delivered to.
    pub channel_id: u64,
    /// Human-readable task name, e.g. "Iron Ingot".
    pub task_name: String,
}
