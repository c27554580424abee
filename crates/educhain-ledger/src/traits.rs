use std::fmt;

use crate::error::LedgerError;

/// Disjoint key spaces within the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Namespace {
    /// Credential records keyed by credential id.
    Credentials,
    /// Verification requests keyed by request id.
    Verifications,
}

impl Namespace {
    pub const ALL: [Namespace; 2] = [Namespace::Credentials, Namespace::Verifications];

    /// Column family / bucket name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Credentials => "credentials",
            Self::Verifications => "verifications",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored key and its raw value.
pub type Entry = (String, Vec<u8>);

/// One bounded page of a range scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanPage {
    /// Entries in ascending key order.
    pub entries: Vec<Entry>,
    /// Cursor to pass as `after` for the next page; `None` once exhausted.
    pub next: Option<String>,
}

/// Ordered, durable key-value ledger the registry runs on.
///
/// Implementations bridge the registry to a concrete substrate (an
/// embedded store, a permissioned ledger's world state, an in-memory map).
/// Every call is a single synchronous unit of work; the registry never
/// retries a failed call.
pub trait Ledger: Send + Sync {
    /// Read a value. `None` when the key is absent.
    fn get(&self, ns: Namespace, key: &str) -> Result<Option<Vec<u8>>, LedgerError>;

    /// Unconditionally write a value.
    fn put(&self, ns: Namespace, key: &str, value: &[u8]) -> Result<(), LedgerError>;

    /// Write `value` only if the current value equals `expected`
    /// (`None` = key absent). Atomic with respect to other writers of the
    /// same key. Returns `false` when the precondition did not hold.
    fn compare_and_put(
        &self,
        ns: Namespace,
        key: &str,
        expected: Option<&[u8]>,
        value: &[u8],
    ) -> Result<bool, LedgerError>;

    /// Return up to `limit` entries with `after < key < end`, in key order.
    /// `None` bounds are open.
    fn range_scan(
        &self,
        ns: Namespace,
        after: Option<&str>,
        end: Option<&str>,
        limit: usize,
    ) -> Result<ScanPage, LedgerError>;

    /// Entries whose JSON value has string field `field` equal to `value`.
    /// Returns `Ok(None)` when the substrate has no field index.
    fn query_field(
        &self,
        _ns: Namespace,
        _field: &str,
        _value: &str,
    ) -> Result<Option<Vec<Entry>>, LedgerError> {
        Ok(None)
    }
}
