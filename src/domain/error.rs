//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent business rule violations and fragment failures.
/// Every variant is deterministic for a given (request, fragment set) pair.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("fragment not found: {key}")]
    FragmentNotFound { key: String },

    #[error("malformed fragment {key}: {reason}")]
    FragmentMalformed { key: String, reason: String },

    #[error("expected exactly one clause titled '{prefix}...', found {found}")]
    MissingAnchorClause { prefix: String, found: usize },

    #[error("unresolved template variable: {name}")]
    UnresolvedVariable { name: String },

    #[error("invalid information role configuration: {0}")]
    InvalidRoleConfiguration(String),

    #[error("party scope mismatch: {0}")]
    PartyScopeMismatch(String),
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
