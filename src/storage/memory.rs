//! In-process stand-ins for the remote store and auth service.
//!
//! Used by the test suite and by `STORE_BACKEND=memory` local runs. Faults and
//! unconfirmed writes can be switched on to exercise the error paths.

use super::remote::{RemoteAuth, RemoteError, RemoteStore, WriteAck};
use crate::domain::model::{AuthSession, AuthUser, Fields, Record};
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::RwLock;

/// Collections keyed by name, rows keyed by integer id.
pub struct MemoryStore {
    collections: RwLock<HashMap<String, BTreeMap<u64, Record>>>,
    next_id: AtomicU64,
    confirm_writes: AtomicBool,
    available: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            confirm_writes: AtomicBool::new(true),
            available: AtomicBool::new(true),
        }
    }

    /// When false, writes are applied but answered with [`WriteAck::Unconfirmed`].
    pub fn set_confirm_writes(&self, confirm: bool) {
        self.confirm_writes.store(confirm, Ordering::SeqCst);
    }

    /// When false, every call fails with [`RemoteError::Unavailable`].
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of records currently held in `collection`.
    pub async fn len(&self, collection: &str) -> usize {
        let collections = self.collections.read().await;
        collections.get(collection).map_or(0, BTreeMap::len)
    }

    fn check_available(&self) -> Result<(), RemoteError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(RemoteError::Unavailable("connection refused".to_string()))
        }
    }

    fn ack(&self, record: Record) -> WriteAck {
        if self.confirm_writes.load(Ordering::SeqCst) {
            WriteAck::Confirmed(record)
        } else {
            WriteAck::Unconfirmed
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn list_all(&self, collection: &str) -> Result<Vec<Record>, RemoteError> {
        self.check_available()?;
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|rows| rows.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn get_by_id(&self, collection: &str, id: &str) -> Result<Option<Record>, RemoteError> {
        self.check_available()?;
        let Ok(key) = id.parse::<u64>() else {
            return Ok(None);
        };
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|rows| rows.get(&key))
            .cloned())
    }

    async fn create(&self, collection: &str, fields: &Fields) -> Result<WriteAck, RemoteError> {
        self.check_available()?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let mut row = fields.clone();
        row.insert("id".to_string(), JsonValue::from(id));
        let record = Record::new(row);

        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id, record.clone());
        Ok(self.ack(record))
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: &Fields,
    ) -> Result<WriteAck, RemoteError> {
        self.check_available()?;
        let key = id.parse::<u64>().map_err(|_| RemoteError::NotFound)?;

        let mut collections = self.collections.write().await;
        let record = collections
            .get_mut(collection)
            .and_then(|rows| rows.get_mut(&key))
            .ok_or(RemoteError::NotFound)?;

        let mut row = record.clone().into_fields();
        for (k, v) in fields {
            if k != "id" {
                row.insert(k.clone(), v.clone());
            }
        }
        *record = Record::new(row);
        Ok(self.ack(record.clone()))
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, RemoteError> {
        self.check_available()?;
        let Ok(key) = id.parse::<u64>() else {
            return Ok(false);
        };
        let mut collections = self.collections.write().await;
        Ok(collections
            .get_mut(collection)
            .and_then(|rows| rows.remove(&key))
            .is_some())
    }

    async fn ping(&self) -> Result<(), RemoteError> {
        self.check_available()
    }
}

struct Account {
    user: AuthUser,
    password_hash: String,
}

/// Email/password accounts with opaque random access tokens.
pub struct MemoryAuth {
    accounts: RwLock<HashMap<String, Account>>,
    tokens: RwLock<HashMap<String, AuthUser>>,
    next_id: AtomicU64,
}

impl MemoryAuth {
    pub fn new() -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            tokens: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }
}

impl Default for MemoryAuth {
    fn default() -> Self {
        Self::new()
    }
}

fn hash_password(email: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(email.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

#[async_trait]
impl RemoteAuth for MemoryAuth {
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, RemoteError> {
        let email = email.to_lowercase();
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&email) {
            return Err(RemoteError::Rejected {
                status: 422,
                details: "User already registered".to_string(),
            });
        }
        let user = AuthUser {
            id: self.next_id.fetch_add(1, Ordering::SeqCst).to_string(),
            email: email.clone(),
        };
        accounts.insert(
            email.clone(),
            Account {
                user: user.clone(),
                password_hash: hash_password(&email, password),
            },
        );
        Ok(user)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, RemoteError> {
        let email = email.to_lowercase();
        let user = {
            let accounts = self.accounts.read().await;
            match accounts.get(&email) {
                Some(acc) if acc.password_hash == hash_password(&email, password) => {
                    acc.user.clone()
                }
                _ => {
                    return Err(RemoteError::Unauthorized(
                        "Invalid login credentials".to_string(),
                    ))
                }
            }
        };

        let token = hex::encode(rand::random::<[u8; 32]>());
        self.tokens.write().await.insert(token.clone(), user.clone());
        Ok(AuthSession {
            access_token: token,
            token_type: "bearer".to_string(),
            expires_in: Some(3600),
            user,
        })
    }

    async fn user_for_token(&self, token: &str) -> Result<AuthUser, RemoteError> {
        let tokens = self.tokens.read().await;
        tokens
            .get(token)
            .cloned()
            .ok_or_else(|| RemoteError::Unauthorized("Invalid or expired token".to_string()))
    }
}
