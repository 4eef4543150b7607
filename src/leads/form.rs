//! Per-form state: the draft being edited and where the current submit attempt stands.

use thiserror::Error;

use super::schema::FieldErrors;
use super::LeadDraft;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    Idle,
    Validating,
    Invalid,
    Submitting,
    Succeeded,
    Failed,
}

/// How the last submit attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptResult {
    Invalid,
    Succeeded,
    Failed,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown field: {0}")]
pub struct UnknownField(pub String);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitBlocked {
    #[error("A submission is already in progress")]
    InFlight,

    #[error("Validation failed: {0}")]
    Invalid(FieldErrors),
}

#[derive(Debug, Clone)]
pub struct FormState<D: LeadDraft> {
    draft: D,
    phase: FormPhase,
    errors: FieldErrors,
    last_attempt: Option<AttemptResult>,
}

impl<D: LeadDraft> FormState<D> {
    pub fn new() -> Self {
        Self::with_draft(D::default())
    }

    pub fn with_draft(draft: D) -> Self {
        Self {
            draft,
            phase: FormPhase::Idle,
            errors: FieldErrors::default(),
            last_attempt: None,
        }
    }

    pub fn draft(&self) -> &D {
        &self.draft
    }

    #[cfg(test)]
    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    #[cfg(test)]
    pub fn last_attempt(&self) -> Option<AttemptResult> {
        self.last_attempt
    }

    /// The submit control is disabled while a request is outstanding.
    pub fn is_busy(&self) -> bool {
        self.phase == FormPhase::Submitting
    }

    pub fn update(&mut self, field: &str, value: impl Into<String>) -> Result<(), UnknownField> {
        let slot = self
            .draft
            .field_mut(field)
            .ok_or_else(|| UnknownField(field.to_string()))?;
        *slot = value.into();
        self.errors.remove(field);
        Ok(())
    }

    pub fn reset(&mut self) {
        self.draft = D::default();
        self.errors = FieldErrors::default();
    }

    /// Validates the draft. On success the form enters `Submitting` and the caller owns the
    /// accepted record until it reports back through [`FormState::finish`].
    pub fn begin_submit(&mut self) -> Result<D::Accepted, SubmitBlocked> {
        if self.is_busy() {
            return Err(SubmitBlocked::InFlight);
        }

        self.enter(FormPhase::Validating);
        match self.draft.accept() {
            Ok(accepted) => {
                self.errors = FieldErrors::default();
                self.enter(FormPhase::Submitting);
                Ok(accepted)
            }
            Err(errors) => {
                self.enter(FormPhase::Invalid);
                self.errors = errors.clone();
                self.last_attempt = Some(AttemptResult::Invalid);
                self.enter(FormPhase::Idle);
                Err(SubmitBlocked::Invalid(errors))
            }
        }
    }

    /// Ends the in-flight attempt. A success clears the draft; a failure keeps what the user typed.
    pub fn finish(&mut self, succeeded: bool) {
        if !self.is_busy() {
            return;
        }

        if succeeded {
            self.enter(FormPhase::Succeeded);
            self.reset();
            self.last_attempt = Some(AttemptResult::Succeeded);
        } else {
            self.enter(FormPhase::Failed);
            self.last_attempt = Some(AttemptResult::Failed);
        }
        self.enter(FormPhase::Idle);
    }

    fn enter(&mut self, phase: FormPhase) {
        tracing::debug!(
            form = D::TARGET.as_str(),
            from = ?self.phase,
            to = ?phase,
            last_attempt = ?self.last_attempt,
            "form phase change"
        );
        self.phase = phase;
    }
}

impl<D: LeadDraft> Default for FormState<D> {
    fn default() -> Self {
        Self::new()
    }
}
