//! RocksDB-backed local ledger substrate.

use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, Direction, IteratorMode, Options, DB};
use std::path::Path;
use std::sync::Mutex;

use crate::error::LedgerError;
use crate::traits::{Entry, Ledger, Namespace, ScanPage};

/// RocksDB ledger with one column family per namespace.
///
/// RocksDB has no compare-and-swap of its own, so writes go through a
/// process-wide mutex. No field index: holder lookups fall back to scans.
pub struct RocksLedger {
    db: DB,
    write_lock: Mutex<()>,
}

impl RocksLedger {
    /// Open or create a RocksDB database at the given path with column families.
    pub fn open(path: &Path) -> Result<Self, LedgerError> {
        std::fs::create_dir_all(path)?;

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors = Namespace::ALL
            .iter()
            .map(|ns| ColumnFamilyDescriptor::new(ns.as_str(), Options::default()))
            .collect::<Vec<_>>();

        let db = DB::open_cf_descriptors(&opts, path, cf_descriptors)?;
        tracing::debug!(path = %path.display(), "opened rocksdb ledger");

        Ok(Self {
            db,
            write_lock: Mutex::new(()),
        })
    }

    fn cf(&self, ns: Namespace) -> Result<&ColumnFamily, LedgerError> {
        self.db
            .cf_handle(ns.as_str())
            .ok_or(LedgerError::UnknownNamespace(ns.as_str()))
    }
}

fn decode_key(raw: &[u8]) -> Result<String, LedgerError> {
    String::from_utf8(raw.to_vec())
        .map_err(|e| LedgerError::InvalidKey(format!("non UTF-8 key: {}", e)))
}

impl Ledger for RocksLedger {
    fn get(&self, ns: Namespace, key: &str) -> Result<Option<Vec<u8>>, LedgerError> {
        let cf = self.cf(ns)?;
        Ok(self.db.get_cf(cf, key.as_bytes())?)
    }

    fn put(&self, ns: Namespace, key: &str, value: &[u8]) -> Result<(), LedgerError> {
        if key.is_empty() {
            return Err(LedgerError::InvalidKey("empty key".into()));
        }
        let cf = self.cf(ns)?;
        let _guard = self.write_lock.lock().map_err(|_| LedgerError::Poisoned)?;
        self.db.put_cf(cf, key.as_bytes(), value)?;
        Ok(())
    }

    fn compare_and_put(
        &self,
        ns: Namespace,
        key: &str,
        expected: Option<&[u8]>,
        value: &[u8],
    ) -> Result<bool, LedgerError> {
        if key.is_empty() {
            return Err(LedgerError::InvalidKey("empty key".into()));
        }
        let cf = self.cf(ns)?;
        let _guard = self.write_lock.lock().map_err(|_| LedgerError::Poisoned)?;
        let current = self.db.get_cf(cf, key.as_bytes())?;
        if current.as_deref() != expected {
            return Ok(false);
        }
        self.db.put_cf(cf, key.as_bytes(), value)?;
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
        let cf = self.cf(ns)?;
        let mode = match after {
            Some(a) => IteratorMode::From(a.as_bytes(), Direction::Forward),
            None => IteratorMode::Start,
        };

        let mut entries: Vec<Entry> = Vec::with_capacity(limit + 1);
        for item in self.db.iterator_cf(cf, mode) {
            let (raw_key, raw_value) = item?;
            let key = decode_key(&raw_key)?;
            if after == Some(key.as_str()) {
                continue;
            }
            if let Some(e) = end {
                if key.as_str() >= e {
                    break;
                }
            }
            entries.push((key, raw_value.into_vec()));
            if entries.len() > limit {
                break;
            }
        }

        let next = if entries.len() > limit {
            entries.truncate(limit);
            entries.last().map(|(k, _)| k.clone())
        } else {
            None
        };

        Ok(ScanPage { entries, next })
    }
}
