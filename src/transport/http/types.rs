use crate::app::{AccountController, RecordController};
use crate::domain::model::{ItemResource, UserResource};
use crate::domain::validation::ValidationResult;
use crate::storage::{RemoteAuth, RemoteStore};
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RemoteStore>,
    pub items: Arc<RecordController<ItemResource>>,
    pub users: Arc<RecordController<UserResource>>,
    pub accounts: Arc<AccountController>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn RemoteStore>,
        auth: Arc<dyn RemoteAuth>,
        items_collection: &str,
        users_collection: &str,
    ) -> Self {
        let items = Arc::new(RecordController::new(
            store.clone(),
            ItemResource::new(items_collection),
        ));
        let users = Arc::new(RecordController::new(
            store.clone(),
            UserResource::new(users_collection),
        ));
        let accounts = Arc::new(AccountController::new(auth, users.clone()));
        Self {
            store,
            items,
            users,
            accounts,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub data: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Set when the store accepted a write without confirming it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    /// Field name -> validation messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub errors: Option<ValidationResult>,
}

impl ApiResponse {
    pub fn ok(data: JsonValue) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            warning: None,
            errors: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            warning: None,
            errors: None,
        }
    }
}

/// Body of `PUT /users/{id}`.
#[derive(Deserialize, Serialize, Debug, ToSchema)]
pub struct UserInput {
    pub name: String,
    pub email: String,
}

/// Body of `POST /register`.
#[derive(Deserialize, Serialize, Debug, ToSchema)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    /// At least 8 characters.
    pub password: String,
}

/// Body of `POST /login`.
#[derive(Deserialize, Serialize, Debug, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Access token extracted by the bearer-auth middleware.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

pub fn json_422(err: JsonRejection, expected: &str) -> (StatusCode, Json<ApiResponse>) {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ApiResponse::error(format!(
            "Invalid JSON body: {} (expected: {})",
            err, expected
        ))),
    )
}
