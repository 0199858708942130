use crate::domain::model::{AuthSession, AuthUser};
use crate::transport::http::handlers::items::ITEMS_BASE;
use crate::transport::http::handlers::{accounts, health, items, users};
use crate::transport::http::types::{
    ApiResponse, AppState, LoginRequest, RegisterRequest, UserInput,
};
use axum::middleware;
use axum::response::Redirect;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthcheck_handler,
        accounts::register_handler,
        accounts::login_handler,
        accounts::profile_handler,
        users::list_users_handler,
        users::get_user_handler,
        users::update_user_handler,
        users::delete_user_handler
    ),
    components(schemas(
        ApiResponse,
        UserInput,
        RegisterRequest,
        LoginRequest,
        AuthSession,
        AuthUser
    )),
    modifiers(&BearerAuth)
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}

/// HTML item management: resource routes plus `_method` overrides for forms.
pub fn create_items_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { Redirect::to(ITEMS_BASE) }))
        .route("/health", get(health::healthcheck_handler))
        .route(
            "/items",
            get(items::index_handler).post(items::store_handler),
        )
        .route("/items/create", get(items::create_handler))
        .route(
            "/items/:id",
            get(items::show_handler)
                .put(items::update_handler)
                .patch(items::update_handler)
                .delete(items::destroy_handler)
                .post(items::method_override_handler),
        )
        .route("/items/:id/edit", get(items::edit_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// JSON user management API.
pub fn create_users_router(app_state: AppState) -> Router {
    let protected = Router::new()
        .route("/profile", get(accounts::profile_handler))
        .route_layer(middleware::from_fn(accounts::require_bearer));

    Router::new()
        .route("/health", get(health::healthcheck_handler))
        .route("/register", post(accounts::register_handler))
        .route("/login", post(accounts::login_handler))
        .route("/users", get(users::list_users_handler))
        .route(
            "/users/:id",
            get(users::get_user_handler)
                .put(users::update_user_handler)
                .delete(users::delete_user_handler),
        )
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
