use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};
use sojourner_core::config::SojournerConfig;
use sojourner_recipes::RecipeCatalog;
use sojourner_scheduler::ReminderScheduler;

/// Central shared state, passed as `Arc<AppState>` to all Axum handlers.
pub struct AppState {
    pub config: SojournerConfig,
    pub scheduler: Arc<ReminderScheduler>,
    pub recipes: RecipeCatalog,
}

impl AppState {
    pub fn new(
        config: SojournerConfig,
        scheduler: Arc<ReminderScheduler>,
        recipes: RecipeCatalog,
    ) -> Self {
        Self {
            config,
            scheduler,
            recipes,
        }
    }
}

/// Assemble the full Axum router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(crate::http::health::health_handler))
        .route(
            "/reminders",
            post(crate::http::reminders::schedule_handler)
                .get(crate::http::reminders::list_handler),
        )
        .route(
            "/reminders/{id}",
            delete(crate::http::reminders::cancel_handler),
        )
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}
