//! Domain-level errors.
//!
//! These errors represent business rule violations and domain logic failures.
//! They are independent of infrastructure concerns (HTTP, gRPC, database).

use thiserror::Error;
use validator::ValidationErrors;

/// Domain-specific errors for business rule violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Validation failed for a field or input
    #[error("{0}")]
    Validation(String),

    /// Supplied credentials were rejected
    #[error("{0}")]
    Password(String),

    /// The password hashing primitive failed
    #[error("password hashing failed: {0}")]
    Hashing(String),
}

impl DomainError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        DomainError::Validation(msg.into())
    }

    /// Create a password error
    pub fn password(msg: impl Into<String>) -> Self {
        DomainError::Password(msg.into())
    }

    /// Create a hashing error
    pub fn hashing(msg: impl Into<String>) -> Self {
        DomainError::Hashing(msg.into())
    }
}

impl From<ValidationErrors> for DomainError {
    /// Keeps the message of the first failing field, ordered by field name so
    /// the reported message is stable.
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        let message = fields
            .into_iter()
            .find_map(|(field, errors)| {
                errors.first().map(|error| {
                    error
                        .message
                        .as_ref()
                        .map(|msg| msg.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field))
                })
            })
            .unwrap_or_else(|| "Validation failed".to_string());

        DomainError::Validation(message)
    }
}

/// Result type alias for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
