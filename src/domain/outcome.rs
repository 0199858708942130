//! Per-request operation outcomes handed from controllers to the transport.

use crate::domain::model::{AuthSession, AuthUser, Fields, Record};
use crate::domain::validation::ValidationResult;
use serde::{Deserialize, Serialize};

/// Failure category surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ValidationFailed,
    NotFound,
    RemoteUnavailable,
    RemoteRejected,
    AmbiguousWrite,
    Unauthorized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlashLevel {
    Success,
    Warning,
    Error,
}

impl FlashLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlashLevel::Success => "success",
            FlashLevel::Warning => "warning",
            FlashLevel::Error => "error",
        }
    }
}

/// Status carried across a redirect and shown once on the next page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "ValidationResult::is_empty")]
    pub errors: ValidationResult,
    /// Submitted input, echoed back so the form can be redisplayed.
    #[serde(default, skip_serializing_if = "Fields::is_empty")]
    pub input: Fields,
}

impl Flash {
    fn with_level(level: FlashLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: Some(message.into()),
            errors: ValidationResult::new(),
            input: Fields::new(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::with_level(FlashLevel::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::with_level(FlashLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::with_level(FlashLevel::Error, message)
    }

    /// Validation errors with no top-level message.
    pub fn invalid(errors: ValidationResult, input: Fields) -> Self {
        Self {
            level: FlashLevel::Error,
            message: None,
            errors,
            input,
        }
    }

    pub fn with_input(mut self, input: Fields) -> Self {
        self.input = input;
        self
    }
}

/// Page a redirect points at, relative to the resource's base path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Index,
    Create,
    Show(String),
    Edit(String),
}

impl Target {
    pub fn path(&self, base: &str) -> String {
        match self {
            Target::Index => base.to_string(),
            Target::Create => format!("{}/create", base),
            Target::Show(id) => format!("{}/{}", base, id),
            Target::Edit(id) => format!("{}/{}/edit", base, id),
        }
    }
}

/// Field template rendered as a create or edit form.
#[derive(Debug, Clone, PartialEq)]
pub struct Form {
    /// `Target::Create` or `Target::Edit(id)`.
    pub target: Target,
    pub values: Fields,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Records(Vec<Record>),
    Record(Record),
    Form(Form),
    Session(AuthSession),
    User(AuthUser),
    Message(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    pub kind: ErrorKind,
    pub message: String,
    pub errors: ValidationResult,
}

impl Failure {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            errors: ValidationResult::new(),
        }
    }

    pub fn invalid(errors: ValidationResult) -> Self {
        Self {
            kind: ErrorKind::ValidationFailed,
            message: "The given data was invalid.".to_string(),
            errors,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Redirect {
    pub target: Target,
    pub flash: Flash,
}

/// Result descriptor of a single controller operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success(Payload),
    Redirect(Redirect),
    /// The write may or may not have happened.
    Warning(String),
    Failure(Failure),
}

impl Outcome {
    pub fn redirect(target: Target, flash: Flash) -> Self {
        Outcome::Redirect(Redirect { target, flash })
    }

    pub fn failure(kind: ErrorKind, message: impl Into<String>) -> Self {
        Outcome::Failure(Failure::new(kind, message))
    }

    pub fn flash(&self) -> Option<&Flash> {
        match self {
            Outcome::Redirect(r) => Some(&r.flash),
            _ => None,
        }
    }

    /// Failure category of the outcome; writes the store did not confirm
    /// count as [`ErrorKind::AmbiguousWrite`].
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Outcome::Failure(f) => Some(f.kind),
            _ if self.is_warning() => Some(ErrorKind::AmbiguousWrite),
            _ => None,
        }
    }

    /// True for plain warnings and for redirects carrying a warning flash.
    pub fn is_warning(&self) -> bool {
        match self {
            Outcome::Warning(_) => true,
            Outcome::Redirect(r) => r.flash.level == FlashLevel::Warning,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_paths() {
        assert_eq!(Target::Index.path("/items"), "/items");
        assert_eq!(Target::Create.path("/items"), "/items/create");
        assert_eq!(Target::Show("3".into()).path("/items"), "/items/3");
        assert_eq!(Target::Edit("3".into()).path("/items"), "/items/3/edit");
    }

    #[test]
    fn warning_detection() {
        assert!(Outcome::Warning("maybe".into()).is_warning());
        assert!(Outcome::redirect(Target::Index, Flash::warning("maybe")).is_warning());
        assert!(!Outcome::redirect(Target::Index, Flash::success("ok")).is_warning());
    }

    #[test]
    fn warnings_carry_the_ambiguous_write_kind() {
        assert_eq!(
            Outcome::Warning("maybe".into()).error_kind(),
            Some(ErrorKind::AmbiguousWrite)
        );
        assert_eq!(
            Outcome::redirect(Target::Index, Flash::warning("maybe")).error_kind(),
            Some(ErrorKind::AmbiguousWrite)
        );
        assert_eq!(
            Outcome::failure(ErrorKind::NotFound, "gone").error_kind(),
            Some(ErrorKind::NotFound)
        );
        assert_eq!(Outcome::redirect(Target::Index, Flash::success("ok")).error_kind(), None);
    }

    #[test]
    fn flash_serialization_skips_empty_parts() {
        let json = serde_json::to_value(Flash::success("Saved.")).unwrap();
        assert_eq!(json, serde_json::json!({"level": "success", "message": "Saved."}));
    }
}
