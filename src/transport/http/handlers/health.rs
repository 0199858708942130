use crate::transport::http::types::{ApiResponse, AppState};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy (remote store reachable)", body = ApiResponse),
        (status = 503, description = "Service is unhealthy (remote store unreachable)", body = ApiResponse)
    )
)]
pub async fn healthcheck_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse::ok(serde_json::json!({ "status": "ok" }))),
        )
            .into_response(),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiResponse {
                data: Some(serde_json::json!({ "status": "unhealthy" })),
                ..ApiResponse::error(format!("Remote store ping failed: {}", e))
            }),
        )
            .into_response(),
    }
}
