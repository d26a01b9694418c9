//! Domain error taxonomy.

use thiserror::Error;

/// Errors produced by domain-level checks, independent of any backing store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Operation requires a family membership")]
    NotInFamily,

    #[error("Family code does not resolve to a family")]
    InvalidCode,

    #[error("A creator cannot leave without nominating a successor")]
    MissingSuccessor,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl DomainError {
    pub fn forbidden(msg: impl Into<String>) -> Self {
        DomainError::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        DomainError::NotFound(msg.into())
    }
}
