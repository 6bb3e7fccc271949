//! Delivery seam between the firing loop and the outside world.

use async_trait::async_trait;
use sojourner_core::reminder::ReminderPayload;
use thiserror::Error;

/// A delivery attempt failed.
///
/// Delivery is attempted exactly once per fired job; the engine logs this
/// error and deletes the job regardless.
#[derive(Debug, Error)]
#[error("delivery failed: {0}")]
pub struct DeliveryError(pub String);

/// Delivers fired reminders.
///
/// Implementations own their own timeout; the engine never cancels an
/// in-progress `dispatch` call.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    async fn dispatch(&self, reminder: &ReminderPayload) -> Result<(), DeliveryError>;
}
