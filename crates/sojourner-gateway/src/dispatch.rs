//! Dispatcher implementations for fired reminders.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sojourner_core::config::SojournerConfig;
use sojourner_core::reminder::ReminderPayload;
use sojourner_scheduler::{DeliveryError, Dispatcher};
use tracing::{info, warn};

const USER_AGENT: &str = concat!("sojourner-gateway/", env!("CARGO_PKG_VERSION"));

/// Delivers fired reminders to an external webhook as a JSON POST.
///
/// The request timeout lives on the client, so a hung endpoint can never
/// stall the firing loop for longer than `delivery.timeout_secs`.
pub struct WebhookDispatcher {
    client: reqwest::Client,
    url: String,
}

impl WebhookDispatcher {
    pub fn new(url: String, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl Dispatcher for WebhookDispatcher {
    async fn dispatch(&self, reminder: &ReminderPayload) -> Result<(), DeliveryError> {
        let resp = self
            .client
            .post(&self.url)
            .json(reminder)
            .send()
            .await
            .map_err(|e| DeliveryError(e.to_string()))?;

        resp.error_for_status()
            .map_err(|e| DeliveryError(e.to_string()))?;
        Ok(())
    }
}

/// Fallback dispatcher when no webhook is configured: logs the reminder so a
/// bare deployment still drains its queue.
pub struct LogDispatcher;

#[async_trait]
impl Dispatcher for LogDispatcher {
    async fn dispatch(&self, reminder: &ReminderPayload) -> Result<(), DeliveryError> {
        info!(
            owner_id = reminder.owner_id,
            channel_id = reminder.channel_id,
            task = %reminder.task_name,
            "reminder fired (no webhook configured)"
        );
        Ok(())
    }
}

/// Select the dispatcher implementation from config.
pub fn build_dispatcher(config: &SojournerConfig) -> anyhow::Result<Arc<dyn Dispatcher>> {
    match config.delivery.webhook_url {
        Some(ref url) => {
            info!(url = %url, "webhook dispatcher configured");
            Ok(Arc::new(WebhookDispatcher::new(
                url.clone(),
                Duration::from_secs(config.delivery.timeout_secs),
            )?))
        }
        None => {
            warn!("No delivery webhook configured; fired reminders will only be logged");
            Ok(Arc::new(LogDispatcher))
        }
    }
}
