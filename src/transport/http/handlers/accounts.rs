use crate::domain::model::Fields;
use crate::transport::http::handlers::common::json_outcome;
use crate::transport::http::types::{
    json_422, ApiResponse, AppState, BearerToken, LoginRequest, RegisterRequest,
};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};

#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account and user record created", body = ApiResponse),
        (status = 202, description = "Account created, user record unconfirmed", body = ApiResponse),
        (status = 400, description = "Registration refused by the auth service", body = ApiResponse),
        (status = 422, description = "Validation failed", body = ApiResponse)
    )
)]
pub async fn register_handler(
    State(state): State<AppState>,
    request: Result<Json<Fields>, JsonRejection>,
) -> Response {
    let Json(input) = match request {
        Ok(v) => v,
        Err(e) => {
            return json_422(e, "{\"name\": ..., \"email\": ..., \"password\": ...}")
                .into_response()
        }
    };
    json_outcome(state.accounts.register(&input).await, StatusCode::CREATED)
}

#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Access token issued", body = ApiResponse),
        (status = 401, description = "Invalid credentials", body = ApiResponse),
        (status = 422, description = "Validation failed", body = ApiResponse)
    )
)]
pub async fn login_handler(
    State(state): State<AppState>,
    request: Result<Json<Fields>, JsonRejection>,
) -> Response {
    let Json(input) = match request {
        Ok(v) => v,
        Err(e) => return json_422(e, "{\"email\": ..., \"password\": ...}").into_response(),
    };
    json_outcome(state.accounts.login(&input).await, StatusCode::OK)
}

#[utoipa::path(
    get,
    path = "/profile",
    responses(
        (status = 200, description = "The authenticated user", body = ApiResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ApiResponse)
    ),
    security(("bearer" = []))
)]
pub async fn profile_handler(
    State(state): State<AppState>,
    Extension(BearerToken(token)): Extension<BearerToken>,
) -> Response {
    json_outcome(state.accounts.profile(&token).await, StatusCode::OK)
}

/// Rejects requests without an `Authorization: Bearer` header and hands the
/// token to the handler.
pub async fn require_bearer(mut request: Request, next: Next) -> Response {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| {
            v.strip_prefix("Bearer ")
                .or_else(|| v.strip_prefix("bearer "))
        })
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string);

    match token {
        Some(token) => {
            request.extensions_mut().insert(BearerToken(token));
            next.run(request).await
        }
        None => (
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::error("Unauthenticated.")),
        )
            .into_response(),
    }
}
