//! HTML handlers for the items application.

use crate::domain::model::Resource;
use crate::domain::outcome::{ErrorKind, Flash, Outcome, Payload};
use crate::transport::http::flash;
use crate::transport::http::handlers::common::{form_fields, status_for};
use crate::transport::http::types::AppState;
use crate::transport::http::views;
use axum::extract::{Path, State};
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Form;
use std::collections::HashMap;

pub const ITEMS_BASE: &str = "/items";

fn render(state: &AppState, outcome: Outcome, flash: Option<Flash>) -> Response {
    let label = state.items.resource().label();
    let flash_ref = flash.as_ref();

    let mut response = match outcome {
        Outcome::Redirect(redirect) => {
            return flash::redirect_with(&redirect.target.path(ITEMS_BASE), &redirect.flash)
        }
        Outcome::Success(Payload::Records(records)) => {
            Html(views::index_page(ITEMS_BASE, label, &records, flash_ref)).into_response()
        }
        Outcome::Success(Payload::Record(record)) => {
            Html(views::show_page(ITEMS_BASE, label, &record, flash_ref)).into_response()
        }
        Outcome::Success(Payload::Form(form)) => {
            Html(views::form_page(ITEMS_BASE, label, &form, flash_ref)).into_response()
        }
        Outcome::Success(other) => {
            tracing::error!(payload = ?other, "payload has no page");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(views::message_page("Error", "Unexpected response.", flash_ref)),
            )
                .into_response()
        }
        Outcome::Warning(message) => (
            status_for(ErrorKind::AmbiguousWrite),
            Html(views::message_page("Warning", &message, flash_ref)),
        )
            .into_response(),
        Outcome::Failure(failure) => (
            status_for(failure.kind),
            Html(views::message_page("Error", &failure.message, flash_ref)),
        )
            .into_response(),
    };

    if flash.is_some() {
        response.headers_mut().append(SET_COOKIE, flash::clear());
    }
    response
}

pub async fn index_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let outcome = state.items.list().await;
    render(&state, outcome, flash::read(&headers))
}

pub async fn create_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let outcome = state.items.show_form(None).await;
    render(&state, outcome, flash::read(&headers))
}

pub async fn store_handler(
    State(state): State<AppState>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let outcome = state.items.submit_create(&form_fields(form)).await;
    render(&state, outcome, None)
}

pub async fn show_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let outcome = state.items.show(&id).await;
    render(&state, outcome, flash::read(&headers))
}

pub async fn edit_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let outcome = state.items.show_form(Some(&id)).await;
    render(&state, outcome, flash::read(&headers))
}

pub async fn update_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let outcome = state.items.submit_update(&id, &form_fields(form)).await;
    render(&state, outcome, None)
}

pub async fn destroy_handler(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let outcome = state.items.destroy(&id).await;
    render(&state, outcome, None)
}

/// HTML forms can only POST; `_method` selects the real verb.
pub async fn method_override_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let method = form
        .get("_method")
        .map(|m| m.trim().to_uppercase())
        .unwrap_or_default();

    let outcome = match method.as_str() {
        "PUT" | "PATCH" => state.items.submit_update(&id, &form_fields(form)).await,
        "DELETE" => state.items.destroy(&id).await,
        _ => {
            return (
                StatusCode::METHOD_NOT_ALLOWED,
                Html(views::message_page(
                    "Error",
                    "Unsupported form method.",
                    None,
                )),
            )
                .into_response()
        }
    };
    render(&state, outcome, None)
}
