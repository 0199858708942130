//! Remote record store and auth contracts.
//!
//! Every remote call is a network round trip; nothing is cached or retried,
//! so a transport fault leaves the outcome of a write unknown.

use crate::domain::model::{AuthSession, AuthUser, Fields, Record};
use crate::domain::outcome::ErrorKind;
use async_trait::async_trait;
use thiserror::Error;

/// Faults reported by the remote store or auth service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// Network failure, timeout, server error or rejected API credentials.
    #[error("remote store unavailable: {0}")]
    Unavailable(String),

    /// The store declined the payload (constraint violation, bad column...).
    #[error("remote store rejected the request (HTTP {status}): {details}")]
    Rejected { status: u16, details: String },

    /// The targeted record does not exist.
    #[error("record not found")]
    NotFound,

    /// Credentials or access token were refused.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
}

impl From<&RemoteError> for ErrorKind {
    fn from(err: &RemoteError) -> Self {
        match err {
            RemoteError::Unavailable(_) => ErrorKind::RemoteUnavailable,
            RemoteError::Rejected { .. } => ErrorKind::RemoteRejected,
            RemoteError::NotFound => ErrorKind::NotFound,
            RemoteError::Unauthorized(_) => ErrorKind::Unauthorized,
        }
    }
}

/// Confirmation returned for a create or update.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteAck {
    /// The stored record as echoed back by the store.
    Confirmed(Record),
    /// The store answered success but returned nothing to confirm the write.
    Unconfirmed,
}

/// CRUD access to named collections of a remote store.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// All records of `collection`; empty when there are none.
    async fn list_all(&self, collection: &str) -> Result<Vec<Record>, RemoteError>;

    /// `Ok(None)` when `id` does not exist.
    async fn get_by_id(&self, collection: &str, id: &str) -> Result<Option<Record>, RemoteError>;

    async fn create(&self, collection: &str, fields: &Fields) -> Result<WriteAck, RemoteError>;

    /// Fails with [`RemoteError::NotFound`] when no record matched `id`.
    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: &Fields,
    ) -> Result<WriteAck, RemoteError>;

    /// Whether a record was actually removed.
    async fn delete(&self, collection: &str, id: &str) -> Result<bool, RemoteError>;

    /// Cheap reachability probe used by the health endpoints.
    async fn ping(&self) -> Result<(), RemoteError>;
}

/// Password authentication delegated to the remote service.
#[async_trait]
pub trait RemoteAuth: Send + Sync {
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, RemoteError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, RemoteError>;

    /// Resolves an access token to its user.
    async fn user_for_token(&self, token: &str) -> Result<AuthUser, RemoteError>;
}
