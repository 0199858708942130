//! Flash messages carried across a redirect in a cookie.
//!
//! The cookie holds URL-safe base64 of the JSON-encoded [`Flash`] and is
//! cleared by the first page that renders it.

use crate::domain::outcome::Flash;
use axum::http::header::{COOKIE, LOCATION, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::Value as JsonValue;

pub const FLASH_COOKIE: &str = "recordgate_flash";

/// Browsers drop any cookie above 4096 bytes, attributes included.
const MAX_COOKIE_BYTES: usize = 4000;
const COOKIE_ATTRIBUTES: &str = "; Path=/; HttpOnly; SameSite=Lax";
/// Longest echoed input value kept once the cookie overflows.
const ECHO_VALUE_CHARS: usize = 256;
const MESSAGE_CHARS: usize = 1024;

pub fn encode(flash: &Flash) -> String {
    let json = serde_json::to_vec(flash).unwrap_or_default();
    URL_SAFE_NO_PAD.encode(json)
}

pub fn decode(value: &str) -> Option<Flash> {
    let bytes = URL_SAFE_NO_PAD.decode(value.trim()).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// Flash carried by the request's cookies, if any.
pub fn read(headers: &HeaderMap) -> Option<Flash> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == FLASH_COOKIE)
        .and_then(|(_, value)| decode(value))
}

fn cookie(value: &str, max_age: Option<u32>) -> HeaderValue {
    let mut cookie = format!("{}={}{}", FLASH_COOKIE, value, COOKIE_ATTRIBUTES);
    if let Some(age) = max_age {
        cookie.push_str(&format!("; Max-Age={}", age));
    }
    HeaderValue::from_str(&cookie).unwrap_or_else(|_| HeaderValue::from_static(""))
}

fn fits(encoded: &str) -> bool {
    FLASH_COOKIE.len() + 1 + encoded.len() + COOKIE_ATTRIBUTES.len() <= MAX_COOKIE_BYTES
}

fn truncate(value: &mut String, max_chars: usize) {
    if let Some((cut, _)) = value.char_indices().nth(max_chars) {
        value.truncate(cut);
    }
}

/// Encodes `flash` within the cookie size limit.
///
/// Echoed input is shortened, then dropped; the message and field errors are
/// always kept.
pub fn encode_bounded(flash: &Flash) -> String {
    let encoded = encode(flash);
    if fits(&encoded) {
        return encoded;
    }

    let mut bounded = flash.clone();
    for value in bounded.input.values_mut() {
        if let JsonValue::String(s) = value {
            truncate(s, ECHO_VALUE_CHARS);
        }
    }
    let encoded = encode(&bounded);
    if fits(&encoded) {
        return encoded;
    }

    bounded.input.clear();
    let encoded = encode(&bounded);
    if fits(&encoded) {
        return encoded;
    }

    // Remote fault details can be arbitrarily long.
    if let Some(message) = bounded.message.as_mut() {
        truncate(message, MESSAGE_CHARS);
    }
    tracing::warn!(
        field_errors = bounded.errors.len(),
        "flash still oversized after dropping echoed input"
    );
    encode(&bounded)
}

/// `Set-Cookie` value that deletes the flash cookie.
pub fn clear() -> HeaderValue {
    cookie("", Some(0))
}

/// 303 to `location`, leaving `flash` for the next page.
pub fn redirect_with(location: &str, flash: &Flash) -> Response {
    let mut headers = HeaderMap::new();
    if let Ok(loc) = HeaderValue::from_str(location) {
        headers.insert(LOCATION, loc);
    }
    headers.insert(SET_COOKIE, cookie(&encode_bounded(flash), None));
    (StatusCode::SEE_OTHER, headers).into_response()
}
