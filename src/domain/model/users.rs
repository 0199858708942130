use super::{Call, Completion, Fields, Operation, Resource};
use crate::domain::outcome::{ErrorKind, Failure, Form, Outcome, Payload, Target};
use crate::domain::validation::{validate, Rule, ValidationResult};

/// User records served by the JSON API.
pub struct UserResource {
    collection: String,
}

impl UserResource {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
        }
    }
}

impl Default for UserResource {
    fn default() -> Self {
        Self::new("users")
    }
}

impl Resource for UserResource {
    fn collection(&self) -> &str {
        &self.collection
    }

    fn label(&self) -> &str {
        "User"
    }

    fn writable_fields(&self) -> &[&'static str] {
        &["name", "email"]
    }

    fn validate(&self, input: &Fields, _op: Operation) -> ValidationResult {
        validate(
            input,
            &[
                ("name", &[Rule::Required, Rule::String, Rule::Max(255)]),
                (
                    "email",
                    &[Rule::Required, Rule::String, Rule::Email, Rule::Max(255)],
                ),
            ],
        )
    }

    fn map_outcome(&self, call: &Call, completion: Completion) -> Outcome {
        match (call.op, completion) {
            (_, Completion::Listed(records)) => Outcome::Success(Payload::Records(records)),
            (_, Completion::Found(record)) | (_, Completion::Written(record)) => {
                Outcome::Success(Payload::Record(record))
            }
            (op, Completion::FormReady(values)) => {
                let target = match op {
                    Operation::EditForm => Target::Edit(call.id().to_string()),
                    _ => Target::Create,
                };
                Outcome::Success(Payload::Form(Form { target, values }))
            }
            (Operation::Create, Completion::Unconfirmed) => {
                Outcome::Warning("User may not have been created. Please check the database.".into())
            }
            (_, Completion::Unconfirmed) => {
                Outcome::Warning("User may not have been updated. Please check the database.".into())
            }
            (_, Completion::Deleted(true)) => {
                Outcome::Success(Payload::Message("User deleted successfully.".into()))
            }
            (_, Completion::Deleted(false)) => {
                Outcome::failure(ErrorKind::NotFound, "Failed to delete user.")
            }
            (_, Completion::Invalid { errors, .. }) => Outcome::Failure(Failure::invalid(errors)),
            (_, Completion::Missing) => Outcome::failure(ErrorKind::NotFound, "User not found."),
            (op, Completion::Faulted { fault, .. }) => {
                let action = match op {
                    Operation::Create => "creating user",
                    Operation::Update => "updating user",
                    Operation::Delete => "deleting user",
                    Operation::List => "retrieving users",
                    _ => "retrieving user",
                };
                Outcome::failure(ErrorKind::from(&fault), format!("Error {}: {}", action, fault))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn email_must_be_valid() {
        let input = json!({"name": "Ada", "email": "ada-at-example"});
        let errors = UserResource::default().validate(input.as_object().unwrap(), Operation::Create);
        assert_eq!(
            errors.get("email"),
            ["The email field must be a valid email address."]
        );
        assert!(!errors.has("name"));
    }

    #[test]
    fn unconfirmed_update_is_a_warning() {
        let outcome = UserResource::default()
            .map_outcome(&Call::with_id(Operation::Update, "1"), Completion::Unconfirmed);
        assert!(matches!(outcome, Outcome::Warning(_)));
    }

    #[test]
    fn missing_user_is_not_found_failure() {
        let outcome = UserResource::default()
            .map_outcome(&Call::with_id(Operation::Show, "42"), Completion::Missing);
        match outcome {
            Outcome::Failure(f) => assert_eq!(f.kind, ErrorKind::NotFound),
            other => panic!("expected failure, got {:?}", other),
        }
    }
}
