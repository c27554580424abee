/// Ledger substrate errors.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("backend error: {0}")]
    Backend(String),

    #[error("ledger lock poisoned")]
    Poisoned,

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("write conflict on key {0}")]
    Conflict(String),

    #[error("namespace '{0}' not found")]
    UnknownNamespace(&'static str),
}

impl From<rocksdb::Error> for LedgerError {
    fn from(err: rocksdb::Error) -> Self {
        Self::Backend(err.to_string())
    }
}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        Self::Backend(err.to_string())
    }
}
