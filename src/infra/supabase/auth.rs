//! GoTrue-backed [`RemoteAuth`].

use super::{read_error, status_error, transport_error, Connection};
use crate::domain::model::{AuthSession, AuthUser};
use crate::infra::config::SupabaseSettings;
use crate::storage::{RemoteAuth, RemoteError};
use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, instrument};

#[derive(Debug, Clone)]
pub struct SupabaseAuth {
    conn: Connection,
}

#[derive(Debug, Deserialize)]
struct GoTrueUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

impl GoTrueUser {
    fn into_user(self, fallback_email: &str) -> AuthUser {
        AuthUser {
            id: self.id,
            email: self.email.unwrap_or_else(|| fallback_email.to_string()),
        }
    }
}

/// Sign-up answers with a session when auto-confirm is on, or a bare user
/// when email confirmation is pending.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session { user: GoTrueUser },
    User(GoTrueUser),
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
    user: GoTrueUser,
}

impl SupabaseAuth {
    pub fn new(settings: &SupabaseSettings, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            conn: Connection::new(settings, timeout)?,
        })
    }

    /// Sends `request`; `refused` lists statuses that mean bad credentials.
    async fn call<R: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        refused: &[StatusCode],
    ) -> Result<R, RemoteError> {
        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();

        if !status.is_success() {
            let (status, details) = read_error(response).await;
            if refused.contains(&status) {
                return Err(RemoteError::Unauthorized(details));
            }
            return Err(status_error(status, details));
        }

        response
            .json::<R>()
            .await
            .map_err(|e| RemoteError::Unavailable(format!("unexpected auth response: {}", e)))
    }
}

#[async_trait]
impl RemoteAuth for SupabaseAuth {
    #[instrument(skip(self, password))]
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, RemoteError> {
        debug!("signing up");
        let request = self
            .conn
            .request(Method::POST, "/auth/v1/signup")
            .json(&json!({ "email": email, "password": password }));

        let user = match self.call::<SignUpResponse>(request, &[]).await? {
            SignUpResponse::Session { user } | SignUpResponse::User(user) => user,
        };
        Ok(user.into_user(email))
    }

    #[instrument(skip(self, password))]
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, RemoteError> {
        debug!("signing in");
        let request = self
            .conn
            .request(Method::POST, "/auth/v1/token")
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }));

        let token: TokenResponse = self
            .call(
                request,
                &[StatusCode::BAD_REQUEST, StatusCode::UNAUTHORIZED],
            )
            .await?;
        Ok(AuthSession {
            access_token: token.access_token,
            token_type: token.token_type.unwrap_or_else(|| "bearer".to_string()),
            expires_in: token.expires_in,
            user: token.user.into_user(email),
        })
    }

    #[instrument(skip_all)]
    async fn user_for_token(&self, token: &str) -> Result<AuthUser, RemoteError> {
        let request = self.conn.request_as(Method::GET, "/auth/v1/user", token);
        let user: GoTrueUser = self
            .call(request, &[StatusCode::UNAUTHORIZED, StatusCode::FORBIDDEN])
            .await?;
        Ok(user.into_user(""))
    }
}
