use thiserror::Error;

/// Errors that can occur within the scheduler subsystem.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// A job with the generated ID already exists in the store.
    #[error("duplicate job id: {id}")]
    DuplicateId { id: String },

    /// ID generation gave up after the configured number of collision retries.
    #[error("id generation exhausted after {attempts} attempts")]
    CollisionExhausted { attempts: u32 },

    /// No job with the given ID exists in the store.
    #[error("job not found: {id}")]
    NotFound { id: String },

    /// The requested due time is invalid (not in the future).
    #[error("invalid schedule: {0}")]
    InvalidSchedule(String),

    /// Underlying SQLite / rusqlite failure. The operation was aborted and
    /// left no partial state behind.
    #[error("store unavailable: {0}")]
    Unavailable(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
