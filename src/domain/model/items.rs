use super::{Call, Completion, Fields, Operation, Resource};
use crate::domain::outcome::{ErrorKind, Flash, Form, Outcome, Payload, Target};
use crate::domain::validation::{validate, Rule, ValidationResult};

/// Items managed through the HTML application.
///
/// Every completion except listing and rendering ends in a redirect with a
/// flash message, the listing page being the default landing target.
pub struct ItemResource {
    collection: String,
}

impl ItemResource {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
        }
    }
}

impl Default for ItemResource {
    fn default() -> Self {
        Self::new("items")
    }
}

impl Resource for ItemResource {
    fn collection(&self) -> &str {
        &self.collection
    }

    fn label(&self) -> &str {
        "Item"
    }

    fn writable_fields(&self) -> &[&'static str] {
        &["name", "description"]
    }

    fn validate(&self, input: &Fields, _op: Operation) -> ValidationResult {
        validate(
            input,
            &[
                ("name", &[Rule::Required, Rule::String, Rule::Max(255)]),
                ("description", &[Rule::Required, Rule::String]),
            ],
        )
    }

    fn map_outcome(&self, call: &Call, completion: Completion) -> Outcome {
        html_outcome(self.label(), call, completion)
    }
}

fn html_outcome(label: &str, call: &Call, completion: Completion) -> Outcome {
    let lower = label.to_lowercase();
    let not_found =
        || Outcome::redirect(Target::Index, Flash::error(format!("{} not found.", label)));
    // Where "back" leads for a failed write.
    let back = match call.op {
        Operation::Update | Operation::EditForm => Target::Edit(call.id().to_string()),
        _ => Target::Create,
    };

    match (call.op, completion) {
        (Operation::List, Completion::Listed(records)) => {
            Outcome::Success(Payload::Records(records))
        }
        (Operation::List, Completion::Faulted { fault, .. }) => Outcome::failure(
            ErrorKind::from(&fault),
            format!("Error retrieving {}s: {}", lower, fault),
        ),

        (Operation::Show, Completion::Found(record)) => Outcome::Success(Payload::Record(record)),
        (Operation::CreateForm, Completion::FormReady(values)) => {
            Outcome::Success(Payload::Form(Form {
                target: Target::Create,
                values,
            }))
        }
        (Operation::EditForm, Completion::FormReady(values)) => {
            Outcome::Success(Payload::Form(Form {
                target: Target::Edit(call.id().to_string()),
                values,
            }))
        }
        (Operation::Show | Operation::EditForm, Completion::Faulted { fault, .. }) => {
            Outcome::redirect(
                Target::Index,
                Flash::error(format!("Error retrieving {}: {}", lower, fault)),
            )
        }

        (Operation::Create | Operation::Update, Completion::Invalid { errors, input }) => {
            Outcome::redirect(back, Flash::invalid(errors, input))
        }
        (Operation::Create, Completion::Written(_)) => Outcome::redirect(
            Target::Index,
            Flash::success(format!("{} created successfully.", label)),
        ),
        (Operation::Update, Completion::Written(_)) => Outcome::redirect(
            Target::Index,
            Flash::success(format!("{} updated successfully.", label)),
        ),
        (Operation::Create, Completion::Unconfirmed) => Outcome::redirect(
            Target::Index,
            Flash::warning(format!(
                "{} may not have been created. Please check the database.",
                label
            )),
        ),
        (Operation::Update, Completion::Unconfirmed) => Outcome::redirect(
            Target::Index,
            Flash::warning(format!(
                "{} may not have been updated. Please check the database.",
                label
            )),
        ),
        (op @ (Operation::Create | Operation::Update), Completion::Faulted { fault, input }) => {
            let verb = if op == Operation::Create { "creating" } else { "updating" };
            let flash = Flash::error(format!("Error {} {}: {}", verb, lower, fault));
            Outcome::redirect(back, flash.with_input(input.unwrap_or_default()))
        }

        (Operation::Delete, Completion::Deleted(true)) => Outcome::redirect(
            Target::Index,
            Flash::success(format!("{} deleted successfully.", label)),
        ),
        (Operation::Delete, Completion::Deleted(false)) => Outcome::redirect(
            Target::Index,
            Flash::error(format!("Failed to delete {}.", lower)),
        ),
        (Operation::Delete, Completion::Faulted { fault, .. }) => Outcome::redirect(
            Target::Index,
            Flash::error(format!("Error deleting {}: {}", lower, fault)),
        ),

        (_, Completion::Missing) => not_found(),
        (op, other) => {
            tracing::error!(?op, completion = ?other, "unexpected completion for operation");
            Outcome::redirect(
                Target::Index,
                Flash::error(format!("Unexpected result while handling {}.", lower)),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::outcome::FlashLevel;
    use crate::storage::RemoteError;
    use serde_json::json;

    #[test]
    fn validation_messages_match_form_rules() {
        let input = json!({"name": "", "description": 5});
        let errors = ItemResource::default().validate(input.as_object().unwrap(), Operation::Create);
        assert_eq!(errors.get("name"), ["The name field is required."]);
        assert_eq!(errors.get("description"), ["The description field must be a string."]);
    }

    #[test]
    fn invalid_update_redirects_back_to_edit_form() {
        let call = Call::with_id(Operation::Update, "4");
        let mut errors = ValidationResult::new();
        errors.add("name", "The name field is required.");
        let outcome = ItemResource::default().map_outcome(
            &call,
            Completion::Invalid {
                errors,
                input: Fields::new(),
            },
        );
        match outcome {
            Outcome::Redirect(r) => {
                assert_eq!(r.target, Target::Edit("4".into()));
                assert!(r.flash.errors.has("name"));
            }
            other => panic!("expected redirect, got {:?}", other),
        }
    }

    #[test]
    fn list_fault_is_a_failure() {
        let outcome = ItemResource::default().map_outcome(
            &Call::new(Operation::List),
            Completion::Faulted {
                fault: RemoteError::Unavailable("connection refused".into()),
                input: None,
            },
        );
        match outcome {
            Outcome::Failure(f) => {
                assert_eq!(f.kind, ErrorKind::RemoteUnavailable);
                assert!(f.message.starts_with("Error retrieving items:"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn delete_false_is_error_flash() {
        let outcome = ItemResource::default().map_outcome(
            &Call::with_id(Operation::Delete, "1"),
            Completion::Deleted(false),
        );
        let flash = outcome.flash().unwrap();
        assert_eq!(flash.level, FlashLevel::Error);
        assert_eq!(flash.message.as_deref(), Some("Failed to delete item."));
    }
}
