use thiserror::Error;

use crate::validate::FieldError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    CollaboratorUnavailable,
    MalformedOutput,
    SchemaViolation,
    InvalidInput,
    CountMismatch,
    Cancelled,
}

impl ErrorKind {
    pub fn label(self) -> &'static str {
        match self {
            ErrorKind::CollaboratorUnavailable => "collaborator_unavailable",
            ErrorKind::MalformedOutput => "malformed_output",
            ErrorKind::SchemaViolation => "schema_violation",
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::CountMismatch => "count_mismatch",
            ErrorKind::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum CollaboratorError {
    #[error("{0}")]
    Unavailable(String),
    #[error("{0}")]
    Malformed(String),
}

#[derive(Debug, Clone, Error)]
pub enum SynthesisError {
    #[error("generation service unavailable: {0}")]
    CollaboratorUnavailable(String),
    #[error("generation service returned malformed output: {0}")]
    MalformedOutput(String),
    #[error("generated data failed validation: {}", summarize(.0))]
    SchemaViolation(Vec<FieldError>),
    #[error("invalid input: {}", summarize(.0))]
    InvalidInput(Vec<FieldError>),
    #[error("expected {expected} variations, received {received}")]
    CountMismatch { expected: usize, received: usize },
    #[error("synthesis cancelled")]
    Cancelled,
}

impl SynthesisError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SynthesisError::CollaboratorUnavailable(_) => ErrorKind::CollaboratorUnavailable,
            SynthesisError::MalformedOutput(_) => ErrorKind::MalformedOutput,
            SynthesisError::SchemaViolation(_) => ErrorKind::SchemaViolation,
            SynthesisError::InvalidInput(_) => ErrorKind::InvalidInput,
            SynthesisError::CountMismatch { .. } => ErrorKind::CountMismatch,
            SynthesisError::Cancelled => ErrorKind::Cancelled,
        }
    }

    pub fn invalid_input(path: &str, message: impl Into<String>) -> Self {
        SynthesisError::InvalidInput(vec![FieldError::new(path, message)])
    }

    pub(crate) fn is_retryable(&self) -> bool {
        matches!(
            self,
            SynthesisError::MalformedOutput(_)
                | SynthesisError::SchemaViolation(_)
                | SynthesisError::CountMismatch { .. }
        )
    }
}

impl From<CollaboratorError> for SynthesisError {
    fn from(err: CollaboratorError) -> Self {
        match err {
            CollaboratorError::Unavailable(detail) => SynthesisError::CollaboratorUnavailable(detail),
            CollaboratorError::Malformed(detail) => SynthesisError::MalformedOutput(detail),
        }
    }
}

fn summarize(errors: &[FieldError]) -> String {
    const SHOWN: usize = 3;
    let mut parts: Vec<String> = errors.iter().take(SHOWN).map(ToString::to_string).collect();
    if errors.len() > SHOWN {
        parts.push(format!("and {} more", errors.len() - SHOWN));
    }
    parts.join("; ")
}
