use crate::domain::model::Fields;
use crate::transport::http::handlers::common::json_outcome;
use crate::transport::http::types::{json_422, ApiResponse, AppState, UserInput};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "All user records", body = ApiResponse),
        (status = 502, description = "Remote store unavailable", body = ApiResponse)
    )
)]
pub async fn list_users_handler(State(state): State<AppState>) -> Response {
    json_outcome(state.users.list().await, StatusCode::OK)
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    params(
        ("id" = String, Path, description = "User record id")
    ),
    responses(
        (status = 200, description = "User record", body = ApiResponse),
        (status = 404, description = "No such user", body = ApiResponse),
        (status = 502, description = "Remote store unavailable", body = ApiResponse)
    )
)]
pub async fn get_user_handler(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    json_outcome(state.users.show(&id).await, StatusCode::OK)
}

#[utoipa::path(
    put,
    path = "/users/{id}",
    params(
        ("id" = String, Path, description = "User record id")
    ),
    request_body = UserInput,
    responses(
        (status = 200, description = "Updated user record", body = ApiResponse),
        (status = 202, description = "Store accepted the update without confirming it", body = ApiResponse),
        (status = 404, description = "No such user", body = ApiResponse),
        (status = 422, description = "Validation failed", body = ApiResponse)
    )
)]
pub async fn update_user_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    request: Result<Json<Fields>, JsonRejection>,
) -> Response {
    let Json(input) = match request {
        Ok(v) => v,
        Err(e) => return json_422(e, "{\"name\": ..., \"email\": ...}").into_response(),
    };
    json_outcome(state.users.submit_update(&id, &input).await, StatusCode::OK)
}

#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(
        ("id" = String, Path, description = "User record id")
    ),
    responses(
        (status = 200, description = "User deleted", body = ApiResponse),
        (status = 404, description = "Nothing was deleted", body = ApiResponse)
    )
)]
pub async fn delete_user_handler(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    json_outcome(state.users.destroy(&id).await, StatusCode::OK)
}
