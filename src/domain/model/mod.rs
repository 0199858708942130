//! Record and resource definitions.

use crate::domain::outcome::Outcome;
use crate::domain::validation::ValidationResult;
use crate::storage::RemoteError;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;

pub mod items;
pub mod users;

pub use items::ItemResource;
pub use users::UserResource;

/// Field name -> value mapping used for input payloads and stored rows.
pub type Fields = serde_json::Map<String, JsonValue>;

/// One row of a remote collection.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Fields);

impl Record {
    pub fn new(fields: Fields) -> Self {
        Self(fields)
    }

    /// The store-assigned identifier, stringified (integer ids included).
    pub fn id(&self) -> Option<String> {
        self.0.get("id").and_then(id_to_string)
    }

    pub fn get(&self, field: &str) -> Option<&JsonValue> {
        self.0.get(field)
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(JsonValue::as_str)
    }

    pub fn fields(&self) -> &Fields {
        &self.0
    }

    pub fn into_fields(self) -> Fields {
        self.0
    }
}

impl From<Fields> for Record {
    fn from(fields: Fields) -> Self {
        Self(fields)
    }
}

pub fn id_to_string(id: &JsonValue) -> Option<String> {
    if let Some(s) = id.as_str() {
        return Some(s.to_string());
    }
    if let Some(i) = id.as_i64() {
        return Some(i.to_string());
    }
    if let Some(u) = id.as_u64() {
        return Some(u.to_string());
    }
    None
}

/// Timestamp format written into `created_at` / `updated_at`.
pub fn timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// A user as known to the remote auth service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
}

/// Result of a successful password sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AuthSession {
    pub access_token: String,
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    pub user: AuthUser,
}

/// Controller operation being performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Show,
    CreateForm,
    EditForm,
    Create,
    Update,
    Delete,
}

/// Operation plus the record id it targets, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub op: Operation,
    pub id: Option<String>,
}

impl Call {
    pub fn new(op: Operation) -> Self {
        Self { op, id: None }
    }

    pub fn with_id(op: Operation, id: &str) -> Self {
        Self {
            op,
            id: Some(id.to_string()),
        }
    }

    pub fn id(&self) -> &str {
        self.id.as_deref().unwrap_or_default()
    }
}

/// What actually happened during a controller operation, before it is turned
/// into a user-facing [`Outcome`].
#[derive(Debug)]
pub enum Completion {
    Listed(Vec<Record>),
    Found(Record),
    /// Blank (create) or pre-populated (edit) field template.
    FormReady(Fields),
    Written(Record),
    /// The store accepted the write but did not confirm it.
    Unconfirmed,
    Deleted(bool),
    Invalid {
        errors: ValidationResult,
        input: Fields,
    },
    Missing,
    Faulted {
        fault: RemoteError,
        input: Option<Fields>,
    },
}

/// Per-resource capabilities used by the generic record controller.
pub trait Resource: Send + Sync + 'static {
    /// Remote collection name.
    fn collection(&self) -> &str;

    /// Human readable singular name, e.g. `Item`.
    fn label(&self) -> &str;

    /// Fields accepted from input and forwarded to the store.
    fn writable_fields(&self) -> &[&'static str];

    /// Validates normalized input for a create or update.
    fn validate(&self, input: &Fields, op: Operation) -> ValidationResult;

    /// Builds the remote payload: whitelisted fields plus timestamps.
    ///
    /// `created_at` is only stamped on create; `id` is never forwarded.
    fn prepare(&self, input: &Fields, op: Operation, now: DateTime<Utc>) -> Fields {
        let mut data: Fields = self
            .writable_fields()
            .iter()
            .filter(|f| **f != "id")
            .filter_map(|f| input.get(*f).map(|v| (f.to_string(), v.clone())))
            .collect();

        let stamp = JsonValue::String(timestamp(now));
        if op == Operation::Create {
            data.insert("created_at".to_string(), stamp.clone());
        }
        data.insert("updated_at".to_string(), stamp);
        data
    }

    /// Field template for the create/edit forms.
    fn form_values(&self, record: Option<&Record>) -> Fields {
        self.writable_fields()
            .iter()
            .map(|f| {
                let v = record
                    .and_then(|r| r.get(f))
                    .cloned()
                    .unwrap_or(JsonValue::Null);
                (f.to_string(), v)
            })
            .collect()
    }

    /// Converts a completion into the outcome handed to the transport layer.
    fn map_outcome(&self, call: &Call, completion: Completion) -> Outcome;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn record_id_accepts_strings_and_integers() {
        let r: Record = serde_json::from_value(json!({"id": 7, "name": "x"})).unwrap();
        assert_eq!(r.id().as_deref(), Some("7"));
        let r: Record = serde_json::from_value(json!({"id": "abc"})).unwrap();
        assert_eq!(r.id().as_deref(), Some("abc"));
        assert_eq!(Record::default().id(), None);
    }

    #[test]
    fn prepare_stamps_equal_timestamps_on_create_only() {
        let input = json!({"id": 9, "name": "Widget", "description": "d", "extra": true});
        let input = input.as_object().unwrap();
        let now = Utc::now();

        let created = ItemResource::default().prepare(input, Operation::Create, now);
        assert_eq!(created.get("created_at"), created.get("updated_at"));
        assert!(created.get("id").is_none());
        assert!(created.get("extra").is_none());

        let updated = ItemResource::default().prepare(input, Operation::Update, now);
        assert!(updated.get("created_at").is_none());
        assert_eq!(updated["updated_at"], json!(timestamp(now)));
    }
}
