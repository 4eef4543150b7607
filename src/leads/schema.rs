//! Declarative field rules and the single routine that checks a draft against them.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use validator::ValidateEmail;

use super::LeadDraft;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    /// Present and not blank.
    Required,
    /// Length in characters within `min..=max`.
    Text { min: usize, max: usize },
    Email,
    OneOf {
        choices: &'static [&'static str],
        prompt: &'static str,
    },
    Optional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldRule {
    pub field: &'static str,
    pub label: &'static str,
    #[serde(flatten)]
    pub kind: FieldKind,
}

impl FieldRule {
    pub fn is_required(&self) -> bool {
        !matches!(self.kind, FieldKind::Optional)
    }

    /// Returns the user-facing message when `value` breaks this rule.
    pub fn check(&self, value: &str) -> Option<String> {
        match self.kind {
            FieldKind::Required => value
                .trim()
                .is_empty()
                .then(|| format!("{} is required", self.label)),
            FieldKind::Text { min, max } => {
                let len = value.chars().count();
                if len == 0 {
                    Some(format!("{} is required", self.label))
                } else if len < min {
                    Some(format!("{} must be at least {min} characters", self.label))
                } else if len > max {
                    Some(format!("{} must be at most {max} characters", self.label))
                } else {
                    None
                }
            }
            FieldKind::Email => {
                (!value.validate_email()).then(|| "Please enter a valid email address".to_string())
            }
            FieldKind::OneOf { choices, prompt } => {
                (!choices.contains(&value)).then(|| prompt.to_string())
            }
            FieldKind::Optional => None,
        }
    }
}

/// Field name to message, one entry per failing field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.insert(field, message);
        errors
    }

    pub fn insert(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn remove(&mut self, field: &str) {
        self.0.remove(field);
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{joined}")
    }
}

impl std::error::Error for FieldErrors {}

/// Checks every rule of the draft's schema. All-or-nothing: any failing field fails the draft.
pub fn check<D: LeadDraft>(draft: &D) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::default();
    for rule in D::SCHEMA {
        let value = draft.field(rule.field).unwrap_or_default();
        if let Some(message) = rule.check(value) {
            errors.insert(rule.field, message);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
