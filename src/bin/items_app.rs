// src/bin/items_app.rs

use anyhow::Context;
use recordgate::infra::config::{Settings, DEFAULT_ITEMS_BIND_ADDR};
use recordgate::infra::{backend, logging};
use recordgate::transport;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings =
        Settings::from_env(DEFAULT_ITEMS_BIND_ADDR).context("loading configuration")?;
    logging::init_logging("items_app", &settings.log_level, settings.json_logs);

    // --- Remote store ---
    let (store, auth) = backend::connect(&settings)?;
    if let Err(e) = store.ping().await {
        // Requests still fail safely with an error flash until the store is back.
        warn!(error = %e, "remote store not reachable at startup");
    }

    let app_state = transport::http::AppState::new(
        store,
        auth,
        &settings.items_table,
        &settings.users_table,
    );

    // --- HTTP server ---
    let app = transport::http::create_items_router(app_state);
    let listener = tokio::net::TcpListener::bind(settings.bind_addr).await?;
    info!(addr = %settings.bind_addr, collection = %settings.items_table, "items app listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await?;

    Ok(())
}
