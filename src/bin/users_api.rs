// src/bin/users_api.rs

use anyhow::Context;
use recordgate::infra::config::{Settings, DEFAULT_USERS_BIND_ADDR};
use recordgate::infra::{backend, logging};
use recordgate::transport;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings =
        Settings::from_env(DEFAULT_USERS_BIND_ADDR).context("loading configuration")?;
    logging::init_logging("users_api", &settings.log_level, settings.json_logs);

    // --- Remote store + auth ---
    let (store, auth) = backend::connect(&settings)?;
    if let Err(e) = store.ping().await {
        warn!(error = %e, "remote store not reachable at startup");
    }

    let app_state = transport::http::AppState::new(
        store,
        auth,
        &settings.items_table,
        &settings.users_table,
    );

    // --- API server ---
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let app = transport::http::create_users_router(app_state)
        .merge(
            SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", transport::http::ApiDoc::openapi()),
        )
        .layer(cors);

    let listener = tokio::net::TcpListener::bind(settings.bind_addr).await?;
    info!(addr = %settings.bind_addr, collection = %settings.users_table, "users API listening");
    info!("Swagger UI available at /swagger-ui");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await?;

    Ok(())
}
