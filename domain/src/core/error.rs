//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Unknown intent: {0}")]
    UnknownIntent(String),

    #[error("Unknown tool kind: {0}")]
    UnknownToolKind(String),

    #[error("Invalid token record: {0}")]
    InvalidTokenRecord(String),

    #[error("Invalid tool descriptor: {0}")]
    InvalidDescriptor(String),
}
