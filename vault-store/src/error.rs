//! Error types for the record store and vault service.

use envelope_vault::{EnvelopeError, ErrorKind};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    RecordNotFound(String),
    /// A record with this id is already stored. Ids are random, so this is an
    /// invariant violation rather than a user error.
    DuplicateRecord(String),
    InvalidRequest(String),
    StorageError(String),
    Envelope(EnvelopeError),
}

impl StoreError {
    /// The engine's classification, when the failure came from the engine.
    pub fn envelope_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Envelope(e) => Some(e.kind()),
            _ => None,
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RecordNotFound(id) => write!(f, "record not found: {}", id),
            Self::DuplicateRecord(id) => write!(f, "duplicate record id: {}", id),
            Self::InvalidRequest(msg) => write!(f, "invalid request: {}", msg),
            Self::StorageError(msg) => write!(f, "storage error: {}", msg),
            Self::Envelope(e) => write!(f, "envelope error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Envelope(e) => Some(e),
            _ => None,
        }
    }
}

impl From<EnvelopeError> for StoreError {
    fn from(e: EnvelopeError) -> Self {
        Self::Envelope(e)
    }
}
