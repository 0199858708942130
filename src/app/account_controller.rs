//! Registration, login and profile lookups for the users API.

use crate::app::record_controller::RecordController;
use crate::domain::model::{Fields, Operation, Resource, UserResource};
use crate::domain::outcome::{ErrorKind, Failure, Outcome, Payload};
use crate::domain::validation::{normalize, validate, Rule};
use crate::storage::{RemoteAuth, RemoteError};
use std::sync::Arc;
use tracing::{error, info, info_span, warn, Span};

const PASSWORD_RULES: &[Rule] = &[Rule::Required, Rule::String, Rule::Min(8)];

pub struct AccountController {
    auth: Arc<dyn RemoteAuth>,
    users: Arc<RecordController<UserResource>>,
    span: Span,
}

impl AccountController {
    pub fn new(auth: Arc<dyn RemoteAuth>, users: Arc<RecordController<UserResource>>) -> Self {
        Self {
            auth,
            users,
            span: info_span!("accounts"),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Creates the auth account, then the matching `users` record.
    pub async fn register(&self, input: &Fields) -> Outcome {
        let input = normalize(input);
        let mut errors = self.users.resource().validate(&input, Operation::Create);
        errors.merge(validate(&input, &[("password", PASSWORD_RULES)]));
        if !errors.is_empty() {
            return Outcome::Failure(Failure::invalid(errors));
        }

        let email = str_field(&input, "email");
        let password = str_field(&input, "password");
        let account = match self.auth.sign_up(email, password).await {
            Ok(user) => {
                info!(parent: &self.span, user_id = %user.id, "account registered");
                user
            }
            Err(fault) => {
                warn!(parent: &self.span, error = %fault, "registration refused");
                return Outcome::failure(
                    ErrorKind::from(&fault),
                    format!("Registration failed: {}", fault),
                );
            }
        };

        match self.users.submit_create(&input).await {
            Outcome::Failure(failure) => {
                // The auth account cannot be rolled back from here.
                error!(
                    parent: &self.span,
                    user_id = %account.id,
                    email = %account.email,
                    error = %failure.message,
                    "auth account created without a user record"
                );
                Outcome::Failure(Failure {
                    message: format!(
                        "The account for {} was created, but its user record could not be saved: {}",
                        account.email, failure.message
                    ),
                    ..failure
                })
            }
            outcome => outcome,
        }
    }

    pub async fn login(&self, input: &Fields) -> Outcome {
        let input = normalize(input);
        let errors = validate(
            &input,
            &[
                ("email", &[Rule::Required, Rule::String, Rule::Email]),
                ("password", &[Rule::Required, Rule::String]),
            ],
        );
        if !errors.is_empty() {
            return Outcome::Failure(Failure::invalid(errors));
        }

        let email = str_field(&input, "email");
        match self.auth.sign_in(email, str_field(&input, "password")).await {
            Ok(session) => {
                info!(parent: &self.span, user_id = %session.user.id, "login succeeded");
                Outcome::Success(Payload::Session(session))
            }
            Err(RemoteError::Unauthorized(_)) => {
                info!(parent: &self.span, "login refused");
                Outcome::failure(ErrorKind::Unauthorized, "Invalid credentials.")
            }
            Err(fault) => {
                warn!(parent: &self.span, error = %fault, "login failed");
                Outcome::failure(ErrorKind::from(&fault), format!("Login failed: {}", fault))
            }
        }
    }

    /// The user owning `token`.
    pub async fn profile(&self, token: &str) -> Outcome {
        match self.auth.user_for_token(token).await {
            Ok(user) => Outcome::Success(Payload::User(user)),
            Err(RemoteError::Unauthorized(_)) => {
                Outcome::failure(ErrorKind::Unauthorized, "Unauthenticated.")
            }
            Err(fault) => {
                warn!(parent: &self.span, error = %fault, "profile lookup failed");
                Outcome::failure(
                    ErrorKind::from(&fault),
                    format!("Error retrieving profile: {}", fault),
                )
            }
        }
    }
}

fn str_field<'a>(input: &'a Fields, field: &str) -> &'a str {
    input.get(field).and_then(|v| v.as_str()).unwrap_or_default()
}
