use thiserror::Error;

use crate::infrastructure::consent::ConsentError;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Validation: {0}")]
    Validation(String),

    #[error("Already exists: {0}")]
    Conflict(String),

    #[error("Consent manager is not configured: {0}")]
    NotConfigured(String),

    #[error("Consent manager error: {0}")]
    Consent(#[from] ConsentError),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
