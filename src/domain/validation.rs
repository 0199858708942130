//! Field-level input validation.
//!
//! Rules are declared per field and evaluated in order; every failing rule
//! contributes one message, so a form can show all problems at once.

use crate::domain::model::Fields;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

/// A single validation rule applied to one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Field must be present, non-null, and not blank.
    Required,
    /// Field must be a JSON string.
    String,
    /// String must have at most this many characters.
    Max(usize),
    /// String must have at least this many characters.
    Min(usize),
    /// String must look like an email address.
    Email,
}

/// Field name -> ordered list of messages. Empty means the input was accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationResult {
    errors: BTreeMap<String, Vec<String>>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of fields with at least one message.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Messages recorded for `field` (empty slice if none).
    pub fn get(&self, field: &str) -> &[String] {
        self.errors.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    pub fn merge(&mut self, other: ValidationResult) {
        for (field, messages) in other.errors {
            self.errors.entry(field).or_default().extend(messages);
        }
    }
}

/// Evaluates `rules` against `input`.
///
/// A field that fails `Required` is not checked further; an absent optional
/// field skips its remaining rules.
pub fn validate(input: &Fields, rules: &[(&str, &[Rule])]) -> ValidationResult {
    let mut result = ValidationResult::new();

    for (field, field_rules) in rules {
        let Some(value) = input.get(*field).filter(|v| !is_blank(v)) else {
            if field_rules.contains(&Rule::Required) {
                result.add(field, format!("The {} field is required.", label(field)));
            }
            continue;
        };

        for rule in field_rules.iter() {
            if let Some(message) = check(field, value, *rule) {
                result.add(field, message);
                // Length and format rules only make sense for strings.
                if *rule == Rule::String {
                    break;
                }
            }
        }
    }

    result
}

fn check(field: &str, value: &JsonValue, rule: Rule) -> Option<String> {
    let name = label(field);
    match rule {
        Rule::Required => None,
        Rule::String => {
            (!value.is_string()).then(|| format!("The {} field must be a string.", name))
        }
        Rule::Max(max) => {
            let len = value.as_str()?.chars().count();
            (len > max).then(|| {
                format!(
                    "The {} field must not be greater than {} characters.",
                    name, max
                )
            })
        }
        Rule::Min(min) => {
            let len = value.as_str()?.chars().count();
            (len < min)
                .then(|| format!("The {} field must be at least {} characters.", name, min))
        }
        Rule::Email => {
            let s = value.as_str()?;
            (!looks_like_email(s))
                .then(|| format!("The {} field must be a valid email address.", name))
        }
    }
}

fn is_blank(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => true,
        JsonValue::String(s) => s.trim().is_empty(),
        JsonValue::Array(a) => a.is_empty(),
        _ => false,
    }
}

fn label(field: &str) -> String {
    field.replace('_', " ")
}

fn looks_like_email(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !s.chars().any(char::is_whitespace)
        && domain.split('.').count() >= 2
        && domain.split('.').all(|part| !part.is_empty())
}

/// Trims string values and turns blank strings into nulls, the way form input
/// is normalized before validation.
pub fn normalize(input: &Fields) -> Fields {
    input
        .iter()
        .map(|(k, v)| {
            let v = match v {
                JsonValue::String(s) if s.trim().is_empty() => JsonValue::Null,
                JsonValue::String(s) => JsonValue::String(s.trim().to_string()),
                other => other.clone(),
            };
            (k.clone(), v)
        })
        .collect()
}
