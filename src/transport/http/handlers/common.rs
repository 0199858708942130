use crate::domain::model::Fields;
use crate::domain::outcome::{ErrorKind, FlashLevel, Outcome, Payload};
use crate::transport::http::types::ApiResponse;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value as JsonValue};
use std::collections::HashMap;

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::ValidationFailed => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorKind::RemoteUnavailable => StatusCode::BAD_GATEWAY,
        ErrorKind::RemoteRejected => StatusCode::BAD_REQUEST,
        ErrorKind::AmbiguousWrite => StatusCode::ACCEPTED,
    }
}

fn payload_json(payload: Payload) -> JsonValue {
    let value = match payload {
        Payload::Records(records) => serde_json::to_value(records),
        Payload::Record(record) => serde_json::to_value(record),
        Payload::Form(form) => Ok(JsonValue::Object(form.values)),
        Payload::Session(session) => serde_json::to_value(session),
        Payload::User(user) => serde_json::to_value(user),
        Payload::Message(message) => Ok(json!({ "message": message })),
    };
    value.unwrap_or(JsonValue::Null)
}

/// Renders an outcome as a JSON envelope, answering `success_status` when the
/// operation succeeded.
pub fn json_outcome(outcome: Outcome, success_status: StatusCode) -> Response {
    match outcome {
        Outcome::Success(payload) => {
            (success_status, Json(ApiResponse::ok(payload_json(payload)))).into_response()
        }
        Outcome::Warning(message) => {
            let body = ApiResponse {
                success: true,
                data: None,
                error: None,
                warning: Some(message),
                errors: None,
            };
            (status_for(ErrorKind::AmbiguousWrite), Json(body)).into_response()
        }
        Outcome::Failure(failure) => {
            let mut body = ApiResponse::error(failure.message);
            if !failure.errors.is_empty() {
                body.errors = Some(failure.errors);
            }
            (status_for(failure.kind), Json(body)).into_response()
        }
        // JSON clients do not follow redirects; report the flash instead.
        Outcome::Redirect(redirect) => {
            let flash = redirect.flash;
            let message = flash.message.unwrap_or_default();
            match flash.level {
                FlashLevel::Success => {
                    (StatusCode::OK, Json(ApiResponse::ok(json!({ "message": message }))))
                        .into_response()
                }
                FlashLevel::Warning => json_outcome(Outcome::Warning(message), success_status),
                FlashLevel::Error => {
                    (StatusCode::BAD_REQUEST, Json(ApiResponse::error(message))).into_response()
                }
            }
        }
    }
}

/// Form fields as a record payload, without framework fields like `_method`.
pub fn form_fields(form: HashMap<String, String>) -> Fields {
    form.into_iter()
        .filter(|(k, _)| !k.starts_with('_'))
        .map(|(k, v)| (k, JsonValue::String(v)))
        .collect()
}
