use std::sync::Arc;

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::app::AppState;

/// GET /health. Liveness probe, returns server metadata.
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    let delivery = if state.config.delivery.webhook_url.is_some() {
        "webhook"
    } else {
        "log"
    };
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "recipes": state.recipes.len(),
        "delivery": delivery,
    }))
}
