use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::RwLock;

use crate::error::LedgerError;
use crate::traits::{Entry, Ledger, Namespace, ScanPage};

type Bucket = BTreeMap<String, Vec<u8>>;

/// Ordered in-memory ledger.
///
/// Useful for tests and for embedding the registry where durability is
/// provided elsewhere. Writes are serialized by a single lock, which also
/// makes `compare_and_put` atomic. With `with_field_index` it answers
/// field-equality queries the way a document-store world state would.
#[derive(Default)]
pub struct MemoryLedger {
    buckets: RwLock<BTreeMap<Namespace, Bucket>>,
    field_index: bool,
}

impl MemoryLedger {
    /// Create an empty ledger without a field index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty ledger that supports `query_field`.
    pub fn with_field_index() -> Self {
        Self {
            buckets: RwLock::default(),
            field_index: true,
        }
    }

    /// Number of keys stored in a namespace.
    pub fn len(&self, ns: Namespace) -> Result<usize, LedgerError> {
        let buckets = self.buckets.read().map_err(|_| LedgerError::Poisoned)?;
        Ok(buckets.get(&ns).map(BTreeMap::len).unwrap_or(0))
    }

    /// Whether a namespace holds no keys.
    pub fn is_empty(&self, ns: Namespace) -> Result<bool, LedgerError> {
        Ok(self.len(ns)? == 0)
    }
}

fn check_key(key: &str) -> Result<(), LedgerError> {
    if key.is_empty() {
        return Err(LedgerError::InvalidKey("empty key".into()));
    }
    Ok(())
}

impl Ledger for MemoryLedger {
    fn get(&self, ns: Namespace, key: &str) -> Result<Option<Vec<u8>>, LedgerError> {
        let buckets = self.buckets.read().map_err(|_| LedgerError::Poisoned)?;
        Ok(buckets.get(&ns).and_then(|b| b.get(key)).cloned())
    }

    fn put(&self, ns: Namespace, key: &str, value: &[u8]) -> Result<(), LedgerError> {
        check_key(key)?;
        let mut buckets = self.buckets.write().map_err(|_| LedgerError::Poisoned)?;
        buckets
            .entry(ns)
            .or_default()
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn compare_and_put(
        &self,
        ns: Namespace,
        key: &str,
        expected: Option<&[u8]>,
        value: &[u8],
    ) -> Result<bool, LedgerError> {
        check_key(key)?;
        let mut buckets = self.buckets.write().map_err(|_| LedgerError::Poisoned)?;
        let bucket = buckets.entry(ns).or_default();
        if bucket.get(key).map(Vec::as_slice) != expected {
            return Ok(false);
        }
        bucket.insert(key.to_string(), value.to_vec());
        Ok(true)
    }

    fn range_scan(
        &self,
        ns: Namespace,
        after: Option<&str>,
        end: Option<&str>,
        limit: usize,
    ) -> Result<ScanPage, LedgerError> {
        if limit == 0 {
            return Ok(ScanPage::default());
        }
        if let (Some(a), Some(e)) = (after, end) {
            if a >= e {
                return Ok(ScanPage::default());
            }
        }

        let buckets = self.buckets.read().map_err(|_| LedgerError::Poisoned)?;
        let Some(bucket) = buckets.get(&ns) else {
            return Ok(ScanPage::default());
        };

        let lower = after.map_or(Bound::Unbounded, Bound::Excluded);
        let upper = end.map_or(Bound::Unbounded, Bound::Excluded);
        let mut entries: Vec<Entry> = bucket
            .range::<str, _>((lower, upper))
            .take(limit + 1)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        let next = if entries.len() > limit {
            entries.truncate(limit);
            entries.last().map(|(k, _)| k.clone())
        } else {
            None
        };

        Ok(ScanPage { entries, next })
    }

    fn query_field(
        &self,
        ns: Namespace,
        field: &str,
        value: &str,
    ) -> Result<Option<Vec<Entry>>, LedgerError> {
        if !self.field_index {
            return Ok(None);
        }

        let buckets = self.buckets.read().map_err(|_| LedgerError::Poisoned)?;
        let Some(bucket) = buckets.get(&ns) else {
            return Ok(Some(Vec::new()));
        };

        let matches = bucket
            .iter()
            .filter(|(key, raw)| match serde_json::from_slice::<serde_json::Value>(raw) {
                Ok(doc) => doc.get(field).and_then(|v| v.as_str()) == Some(value),
                Err(_) => {
                    tracing::trace!(namespace = %ns, key = %key, "value not indexable");
                    false
                }
            })
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Ok(Some(matches))
    }
}
