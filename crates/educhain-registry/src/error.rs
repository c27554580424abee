use std::fmt;

use educhain_ledger::LedgerError;

/// What a `NotFound` was looking for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subject {
    Credential(String),
    Holder(String),
    Request(String),
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Credential(id) => write!(f, "credential {}", id),
            Self::Holder(id) => write!(f, "credentials for holder {}", id),
            Self::Request(id) => write!(f, "verification request {}", id),
        }
    }
}

/// Registry errors. Every variant names the key or holder involved.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("not found: {0}")]
    NotFound(Subject),

    #[error("key already exists: {0}")]
    AlreadyExists(String),

    #[error("credential already revoked: {0}")]
    AlreadyRevoked(String),

    #[error("credential revoked: {0}")]
    Revoked(String),

    #[error("corrupt value at {key}: {reason}")]
    Corrupt { key: String, reason: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("ledger substrate failure: {0}")]
    SubstrateFailure(#[from] LedgerError),
}

impl RegistryError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub(crate) fn corrupt(key: &str, reason: impl fmt::Display) -> Self {
        Self::Corrupt {
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }
}
