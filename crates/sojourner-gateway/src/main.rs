use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn};

mod app;
mod dispatch;
mod http;
mod update;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sojourner_gateway=info,sojourner_scheduler=info,tower_http=debug".into()),
        )
        .init();

    // load config: explicit SOJOURNER_CONFIG path > ~/.sojourner/sojourner.toml
    let config_path = std::env::var("SOJOURNER_CONFIG").ok();
    let config = sojourner_core::config::SojournerConfig::load(config_path.as_deref())
        .unwrap_or_else(|e| {
            warn!("Config load failed ({}), using defaults", e);
            sojourner_core::config::SojournerConfig::default()
        });

    let bind = config.gateway.bind.clone();
    let port = config.gateway.port;

    let db_path = &config.database.path;
    sojourner_core::config::ensure_parent_dir(db_path)?;
    info!(path = %db_path, "opening SQLite database");

    let db = rusqlite::Connection::open(db_path)?;
    db.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    let store = sojourner_scheduler::JobStore::new(db)?;

    let recipes = match sojourner_recipes::RecipeCatalog::load(std::path::Path::new(
        &config.recipes.path,
    )) {
        Ok(catalog) => {
            info!(count = catalog.len(), path = %config.recipes.path, "recipe catalog loaded");
            catalog
        }
        Err(e) => {
            warn!("Recipe catalog load failed ({}), starting with an empty catalog", e);
            sojourner_recipes::RecipeCatalog::default()
        }
    };

    let dispatcher = dispatch::build_dispatcher(&config)?;
    let scheduler = Arc::new(sojourner_scheduler::ReminderScheduler::new(
        store, dispatcher,
    ));

    // spawn the firing loop in the background
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let engine = Arc::clone(&scheduler);
    tokio::spawn(async move { engine.run(shutdown_rx).await });

    if config.update.check_on_start {
        tokio::spawn(update::check_update_on_startup());
    }

    let state = Arc::new(app::AppState::new(config, scheduler, recipes));
    let router = app::build_router(state);

    let addr: SocketAddr = format!("{}:{}", bind, port).parse()?;
    info!("Sojourner gateway listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // signal the firing loop to stop
    let _ = shutdown_tx.send(true);
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}
