//! Client for a Supabase-style backend: PostgREST for records, GoTrue for auth.

pub mod auth;
pub mod rest;

pub use auth::SupabaseAuth;
pub use rest::SupabaseStore;

use crate::infra::config::SupabaseSettings;
use crate::storage::RemoteError;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use std::time::Duration;

/// HTTP client plus endpoint and API key, shared by the REST and auth clients.
#[derive(Debug, Clone)]
pub(crate) struct Connection {
    client: reqwest::Client,
    base_url: String,
    key: String,
}

impl Connection {
    pub(crate) fn new(settings: &SupabaseSettings, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("recordgate/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: settings.url.trim_end_matches('/').to_string(),
            key: settings.key.clone(),
        })
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Request carrying the API key, authorized as the service itself.
    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.request_as(method, path, &self.key)
    }

    /// Request carrying the API key, authorized with `bearer`.
    pub(crate) fn request_as(&self, method: Method, path: &str, bearer: &str) -> RequestBuilder {
        self.client
            .request(method, self.url(path))
            .headers(self.headers(bearer))
    }

    fn headers(&self, bearer: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(key) = HeaderValue::from_str(&self.key) {
            headers.insert("apikey", key);
        }
        if let Ok(auth) = HeaderValue::from_str(&format!("Bearer {}", bearer)) {
            headers.insert(AUTHORIZATION, auth);
        }
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }
}

pub(crate) fn transport_error(err: reqwest::Error) -> RemoteError {
    if err.is_timeout() {
        RemoteError::Unavailable(format!("request timed out: {}", err))
    } else if err.is_connect() {
        RemoteError::Unavailable(format!("connection failed: {}", err))
    } else {
        RemoteError::Unavailable(err.to_string())
    }
}

/// Error body fields used by PostgREST (`message`, `details`, `hint`) and
/// GoTrue (`msg`, `error_description`, `error`).
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    details: Option<String>,
    hint: Option<String>,
    msg: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

impl ErrorBody {
    fn describe(self, fallback: &str) -> String {
        let primary = self
            .message
            .or(self.msg)
            .or(self.error_description)
            .or(self.error);
        let mut parts: Vec<String> = primary.into_iter().collect();
        parts.extend(self.details);
        parts.extend(self.hint);
        if parts.is_empty() {
            fallback.to_string()
        } else {
            parts.join(" ")
        }
    }
}

/// Reads a non-success response into its status and a readable description.
pub(crate) async fn read_error(response: reqwest::Response) -> (StatusCode, String) {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let fallback = if text.trim().is_empty() {
        status.canonical_reason().unwrap_or("unknown error").to_string()
    } else {
        text.trim().to_string()
    };
    let details = serde_json::from_str::<ErrorBody>(&text)
        .unwrap_or_default()
        .describe(&fallback);
    (status, details)
}

/// Default status mapping: auth failures and server errors mean the store is
/// unusable, other client errors mean it declined this particular request.
pub(crate) fn status_error(status: StatusCode, details: String) -> RemoteError {
    match status.as_u16() {
        401 | 403 => RemoteError::Unavailable(format!(
            "store refused the API credentials (HTTP {}): {}",
            status.as_u16(),
            details
        )),
        s if s >= 500 => RemoteError::Unavailable(format!("HTTP {}: {}", s, details)),
        s => RemoteError::Rejected { status: s, details },
    }
}
