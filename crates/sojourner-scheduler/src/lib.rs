//! `sojourner-scheduler`: persistent one-shot reminder scheduling.
//!
//! # Overview
//!
//! Jobs are persisted to a SQLite `jobs` table and mirrored into an
//! in-memory due-time queue. The [`engine::ReminderScheduler`] sleeps until
//! the earliest due time, wakes, and dispatches every elapsed job exactly
//! once through the configured [`dispatch::Dispatcher`], deleting each row
//! afterwards. On startup the queue is rebuilt from the table, so pending
//! reminders survive restarts and any that became overdue while the process
//! was down fire immediately.
//!
//! The store is authoritative: the in-memory queue is a derived view, and
//! whenever the two disagree (a cancelled job whose queue entry is still
//! around) the row decides.

pub mod db;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod ident;
pub mod store;
pub mod types;

pub use dispatch::{DeliveryError, Dispatcher};
pub use engine::ReminderScheduler;
pub use error::{Result, SchedulerError};
pub use store::JobStore;
pub use types::Job;
